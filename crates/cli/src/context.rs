//! Options shared by every command

use clap::Args;
use envlift_config::{ConfigStore, FlagProvider, Scope};
use envlift_core::{ConfigOption, Error, Result, DEFAULT_REQUEST_TIMEOUT};
use envlift_utils::XdgPaths;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file to read and write (defaults to the XDG config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub configuration: Option<PathBuf>,

    /// Directory whose stored options apply (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub scope: Option<String>,

    /// API token
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// API base URL
    #[arg(long, global = true, value_name = "URL")]
    pub api_host: Option<String>,

    /// Accept invalid TLS certificates
    #[arg(long, global = true)]
    pub no_verify_tls: bool,

    /// Never time out API requests
    #[arg(long, global = true, conflicts_with = "timeout")]
    pub no_timeout: bool,

    /// Per-request timeout in seconds
    #[arg(long, global = true, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Verbose logging on stderr
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Everything a command needs from the invocation
#[derive(Debug)]
pub struct Context {
    pub global: GlobalArgs,
    pub cwd: PathBuf,
    pub config_path: PathBuf,
}

impl Context {
    pub fn new(global: GlobalArgs) -> Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| Error::file_system(".", "get current directory", e))?;
        let config_path = match &global.configuration {
            Some(path) if path.as_os_str().is_empty() => {
                return Err(Error::configuration("invalid config file path"));
            }
            Some(path) => path.clone(),
            None => XdgPaths::config_file(),
        };
        tracing::debug!(config = %config_path.display(), "using config file");

        Ok(Self {
            global,
            cwd,
            config_path,
        })
    }

    /// `--scope`, or the current directory
    pub fn scope(&self) -> Result<Scope> {
        match &self.global.scope {
            Some(raw) => Scope::parse(raw, &self.cwd),
            None => Scope::parse(".", &self.cwd),
        }
    }

    /// `--scope`, or the root scope. Used when writing options.
    pub fn write_scope(&self) -> Result<Scope> {
        match &self.global.scope {
            Some(raw) => Scope::parse(raw, &self.cwd),
            None => Ok(Scope::root()),
        }
    }

    pub fn load_store(&self) -> Result<ConfigStore> {
        ConfigStore::load(&self.config_path)
    }

    /// Option overrides given as global flags
    pub fn flags(&self) -> FlagProvider {
        let mut flags = FlagProvider::new();
        flags.set_opt(ConfigOption::Token, self.global.token.clone());
        flags.set_opt(ConfigOption::ApiHost, self.global.api_host.clone());
        if self.global.no_verify_tls {
            flags.set(ConfigOption::VerifyTls, "false");
        }
        flags
    }

    /// Request deadline after applying `--timeout` and `--no-timeout`
    pub fn timeout(&self) -> Option<Duration> {
        if self.global.no_timeout {
            return None;
        }
        Some(
            self.global
                .timeout
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        )
    }
}
