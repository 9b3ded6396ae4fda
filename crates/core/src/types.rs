use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_API_HOST, DEFAULT_ENCLAVE, DEFAULT_VERIFY_TLS, ENVLIFT_API_HOST_VAR,
    ENVLIFT_CONFIG_VAR, ENVLIFT_ENCLAVE_VAR, ENVLIFT_NO_VERIFY_TLS_VAR, ENVLIFT_PROJECT_VAR,
    ENVLIFT_TOKEN_VAR,
};
use crate::errors::{Error, Result};

/// Decoded secrets, keyed by secret name
pub type SecretsMap = BTreeMap<String, String>;

/// The fixed whitelist of configurable options
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigOption {
    Token,
    Project,
    Config,
    ApiHost,
    VerifyTls,
    Enclave,
}

impl ConfigOption {
    /// Every recognized option, in display order
    pub const ALL: [ConfigOption; 6] = [
        ConfigOption::Token,
        ConfigOption::Project,
        ConfigOption::Config,
        ConfigOption::ApiHost,
        ConfigOption::VerifyTls,
        ConfigOption::Enclave,
    ];

    /// Name as stored in the config file and accepted on the command line
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigOption::Token => "token",
            ConfigOption::Project => "project",
            ConfigOption::Config => "config",
            ConfigOption::ApiHost => "api-host",
            ConfigOption::VerifyTls => "verify-tls",
            ConfigOption::Enclave => "enclave",
        }
    }

    /// Environment variable consulted for this option
    #[must_use]
    pub fn env_var(self) -> &'static str {
        match self {
            ConfigOption::Token => ENVLIFT_TOKEN_VAR,
            ConfigOption::Project => ENVLIFT_PROJECT_VAR,
            ConfigOption::Config => ENVLIFT_CONFIG_VAR,
            ConfigOption::ApiHost => ENVLIFT_API_HOST_VAR,
            ConfigOption::VerifyTls => ENVLIFT_NO_VERIFY_TLS_VAR,
            ConfigOption::Enclave => ENVLIFT_ENCLAVE_VAR,
        }
    }

    /// True when the environment variable carries the negation of the option.
    /// `ENVLIFT_NO_VERIFY_TLS=true` means `verify-tls=false`.
    #[must_use]
    pub fn env_var_is_inverted(self) -> bool {
        matches!(self, ConfigOption::VerifyTls)
    }

    /// Options whose values must parse as booleans
    #[must_use]
    pub fn is_boolean(self) -> bool {
        matches!(self, ConfigOption::VerifyTls | ConfigOption::Enclave)
    }

    /// Built-in value used when nothing else defines the option
    #[must_use]
    pub fn default_value(self) -> Option<&'static str> {
        match self {
            ConfigOption::ApiHost => Some(DEFAULT_API_HOST),
            ConfigOption::VerifyTls => Some(DEFAULT_VERIFY_TLS),
            ConfigOption::Enclave => Some(DEFAULT_ENCLAVE),
            ConfigOption::Token | ConfigOption::Project | ConfigOption::Config => None,
        }
    }

    /// Validate a value for this option
    pub fn validate_value(self, value: &str) -> Result<()> {
        if self.is_boolean() {
            parse_bool(value).map_err(|_| {
                Error::configuration(format!(
                    "invalid value '{value}' for option '{}': expected true or false",
                    self.as_str()
                ))
            })?;
        }
        Ok(())
    }
}

impl fmt::Display for ConfigOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigOption {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ConfigOption::ALL
            .into_iter()
            .find(|option| option.as_str() == s)
            .ok_or_else(|| Error::configuration(format!("invalid option '{s}'")))
    }
}

/// Parse the boolean spellings accepted in flags, environment and the config file
pub fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(Error::configuration(format!(
            "invalid boolean value '{value}'"
        ))),
    }
}

/// Where a resolved value came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Flag,
    Environment,
    Scope(String),
    Default,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Flag => f.write_str("flag"),
            Provenance::Environment => f.write_str("environment"),
            Provenance::Scope(path) => f.write_str(path),
            Provenance::Default => f.write_str("default"),
        }
    }
}

/// An effective option value paired with its provenance. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedOption {
    pub option: ConfigOption,
    pub value: String,
    pub source: Provenance,
}

impl ResolvedOption {
    #[must_use]
    pub fn new(option: ConfigOption, value: impl Into<String>, source: Provenance) -> Self {
        Self {
            option,
            value: value.into(),
            source,
        }
    }
}
