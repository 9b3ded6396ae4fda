/// Constants used throughout the envlift codebase
use std::time::Duration;

// Environment variable names, one per configurable option
pub const ENVLIFT_TOKEN_VAR: &str = "ENVLIFT_TOKEN";
pub const ENVLIFT_PROJECT_VAR: &str = "ENVLIFT_PROJECT";
pub const ENVLIFT_CONFIG_VAR: &str = "ENVLIFT_CONFIG";
pub const ENVLIFT_API_HOST_VAR: &str = "ENVLIFT_API_HOST";
pub const ENVLIFT_NO_VERIFY_TLS_VAR: &str = "ENVLIFT_NO_VERIFY_TLS";
pub const ENVLIFT_ENCLAVE_VAR: &str = "ENVLIFT_ENCLAVE";

// Process-level settings
pub const ENVLIFT_CONFIG_FILE_VAR: &str = "ENVLIFT_CONFIG_FILE";
pub const ENVLIFT_LOG_VAR: &str = "ENVLIFT_LOG";

// Config file
pub const CONFIG_DIR_NAME: &str = "envlift";
pub const CONFIG_FILE_NAME: &str = "config.json";

// Built-in option defaults
pub const DEFAULT_API_HOST: &str = "https://api.envlift.io";
pub const DEFAULT_VERIFY_TLS: &str = "true";
pub const DEFAULT_ENCLAVE: &str = "false";

// HTTP transport
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);
pub const CLIENT_SDK: &str = "envlift-rust-cli";
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const SECRETS_ENDPOINT: &str = "/v2/variables";

/// Secret names never injected into a child environment
pub const EXCLUDED_SECRET_NAMES: &[&str] = &["PATH", "PS1", "HOME"];
