use std::path::PathBuf;

/// Result type alias for envlift operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for envlift operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unknown option names, malformed arguments, invalid scopes
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Transport failures: DNS, refused connections, TLS handshakes, timeouts
    #[error("network error for '{endpoint}': {message}")]
    Network { endpoint: String, message: String },

    /// Terminal non-2xx responses from the API
    #[error("{}", format_api_error(.status, .message))]
    Api {
        status: u16,
        message: String,
        body: Option<Vec<u8>>,
    },

    /// Fallback file missing, unreadable, or holding an undecodable payload
    #[error("fallback file '{path}': {message}")]
    Fallback {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Child process failed to spawn or exited unsuccessfully
    #[error("{}", format_command_error(.command, .args, .message, .exit_code))]
    CommandExecution {
        command: String,
        args: Vec<String>,
        message: String,
        exit_code: Option<i32>,
    },

    /// A response body that does not match the expected schema
    #[error("failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    /// File system operations
    #[error("file system {operation} operation failed for '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

fn format_api_error(status: &u16, message: &str) -> String {
    if message.is_empty() {
        format!("API request failed with status {status}")
    } else {
        format!("API request failed with status {status}: {message}")
    }
}

fn format_command_error(command: &str, args: &[String], message: &str, exit_code: &Option<i32>) -> String {
    let args_str = args.join(" ");
    let invocation = if args_str.is_empty() {
        command.to_string()
    } else {
        format!("{command} {args_str}")
    };
    match exit_code {
        Some(code) => format!("command '{invocation}' failed with exit code {code}: {message}"),
        None => format!("command '{invocation}' failed: {message}"),
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json {
            message: error.to_string(),
            source: error,
        }
    }
}

// Helper methods for creating errors with context
impl Error {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a network error
    #[must_use]
    pub fn network(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Network {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create an API error for a terminal response
    #[must_use]
    pub fn api(status: u16, message: impl Into<String>, body: Option<Vec<u8>>) -> Self {
        Error::Api {
            status,
            message: message.into(),
            body,
        }
    }

    /// Create a fallback error
    #[must_use]
    pub fn fallback(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Fallback {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a fallback error with a source error
    #[must_use]
    pub fn fallback_with_source(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::Fallback {
            path: path.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a command execution error
    #[must_use]
    pub fn command_execution(
        command: impl Into<String>,
        args: Vec<String>,
        message: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Error::CommandExecution {
            command: command.into(),
            args,
            message: message.into(),
            exit_code,
        }
    }

    /// Create a parse error
    #[must_use]
    pub fn parse(what: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Parse {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Create a file system error with context
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Whether a configured fallback file may stand in for this failure
    #[must_use]
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(self, Error::Network { .. } | Error::Api { .. })
    }

    /// Exit status the process should terminate with for this error
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::CommandExecution {
                exit_code: Some(code),
                ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }

    /// A short suggestion printed beneath the error message
    #[must_use]
    pub fn recovery_hint(&self) -> Option<String> {
        match self {
            Error::Configuration { .. } => Some(
                "Check the options with 'envlift configure debug'. \
                 Valid options are: token, project, config, api-host, verify-tls, enclave."
                    .to_string(),
            ),
            Error::Network { .. } => Some(
                "Check your network connection. Pass --fallback <FILE> to keep working \
                 from the last successful fetch while the service is unreachable."
                    .to_string(),
            ),
            Error::Api { status: 401 | 403, .. } => {
                Some("Check that your token is valid and has access to this project.".to_string())
            }
            Error::Fallback { .. } => Some(
                "The fallback file is written after a successful fetch. Run once without \
                 --fallback-only while the service is reachable."
                    .to_string(),
            ),
            Error::CommandExecution {
                exit_code: None, ..
            } => Some("Ensure the command is installed and in your PATH.".to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_includes_messages() {
        let err = Error::api(404, "project not found\nconfig not found", None);
        assert_eq!(
            err.to_string(),
            "API request failed with status 404: project not found\nconfig not found"
        );

        let err = Error::api(500, "", None);
        assert_eq!(err.to_string(), "API request failed with status 500");
    }

    #[test]
    fn test_command_error_display() {
        let err = Error::command_execution("printenv", vec!["HOME".into()], "exited", Some(3));
        assert_eq!(
            err.to_string(),
            "command 'printenv HOME' failed with exit code 3: exited"
        );

        let err = Error::command_execution("nope", vec![], "not found", None);
        assert_eq!(err.to_string(), "command 'nope' failed: not found");
    }

    #[test]
    fn test_fallback_eligibility() {
        assert!(Error::network("https://api", "connection refused").is_fallback_eligible());
        assert!(Error::api(503, "unavailable", None).is_fallback_eligible());
        assert!(!Error::configuration("bad").is_fallback_eligible());
        assert!(!Error::fallback("/tmp/x", "missing").is_fallback_eligible());
        assert!(!Error::parse("secrets payload", "eof").is_fallback_eligible());
    }

    #[test]
    fn test_exit_code_propagates_child_status() {
        assert_eq!(
            Error::command_execution("false", vec![], "exited", Some(7)).exit_code(),
            7
        );
        assert_eq!(
            Error::command_execution("missing", vec![], "spawn", None).exit_code(),
            1
        );
        assert_eq!(Error::configuration("x").exit_code(), 1);
    }
}
