//! Layered option resolution

use crate::providers::{DefaultProvider, EnvProvider, FlagProvider, ScopeChainProvider, ValueProvider};
use crate::scope::Scope;
use crate::store::ConfigStore;
use envlift_core::{parse_bool, ConfigOption, Error, ResolvedOption, Result};
use std::fmt;

/// Resolves effective option values by asking providers in priority order
pub struct ConfigResolver<'a> {
    providers: Vec<Box<dyn ValueProvider + 'a>>,
}

impl<'a> ConfigResolver<'a> {
    /// The standard chain: flags, environment, stored scopes, defaults
    pub fn new(flags: FlagProvider, env: EnvProvider, store: &'a ConfigStore) -> Self {
        Self::with_providers(vec![
            Box::new(flags),
            Box::new(env),
            Box::new(ScopeChainProvider::new(store)),
            Box::new(DefaultProvider),
        ])
    }

    /// A resolver over an explicit provider list, highest priority first
    pub fn with_providers(providers: Vec<Box<dyn ValueProvider + 'a>>) -> Self {
        Self { providers }
    }

    /// Resolve one option for `scope`; `None` when no provider defines it
    pub fn resolve(&self, option: ConfigOption, scope: &Scope) -> Result<Option<ResolvedOption>> {
        for provider in &self.providers {
            if let Some(resolved) = provider.lookup(option, scope)? {
                tracing::trace!(
                    option = %option,
                    provider = provider.name(),
                    source = %resolved.source,
                    "resolved option"
                );
                return Ok(Some(resolved));
            }
        }
        Ok(None)
    }

    /// Resolve an option given by name. Unknown names fail before any lookup.
    pub fn resolve_named(&self, name: &str, scope: &Scope) -> Result<Option<ResolvedOption>> {
        let option: ConfigOption = name.parse()?;
        self.resolve(option, scope)
    }

    /// Every whitelisted option, in display order
    pub fn resolve_all(&self, scope: &Scope) -> Result<Vec<(ConfigOption, Option<ResolvedOption>)>> {
        ConfigOption::ALL
            .into_iter()
            .map(|option| Ok((option, self.resolve(option, scope)?)))
            .collect()
    }

    /// Typed credentials needed to talk to the API for `scope`
    pub fn credentials(&self, scope: &Scope) -> Result<Credentials> {
        let value = |option: ConfigOption| -> Result<Option<String>> {
            Ok(self.resolve(option, scope)?.map(|resolved| resolved.value))
        };
        let flag = |option: ConfigOption| -> Result<bool> {
            match self.resolve(option, scope)? {
                Some(resolved) => parse_bool(&resolved.value).map_err(|_| {
                    Error::configuration(format!(
                        "invalid value '{}' for option '{option}' from {}",
                        resolved.value, resolved.source
                    ))
                }),
                None => Ok(false),
            }
        };

        let token = value(ConfigOption::Token)?.ok_or_else(|| {
            Error::configuration(format!(
                "you must provide a token for scope '{scope}' (set it with 'envlift configure set token <TOKEN>')"
            ))
        })?;
        let api_host = value(ConfigOption::ApiHost)?
            .ok_or_else(|| Error::configuration("no api-host configured"))?;

        Ok(Credentials {
            token,
            project: value(ConfigOption::Project)?,
            config: value(ConfigOption::Config)?,
            api_host,
            verify_tls: flag(ConfigOption::VerifyTls)?,
            enclave: flag(ConfigOption::Enclave)?,
        })
    }
}

/// Resolved values needed for an API call
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub project: Option<String>,
    pub config: Option<String>,
    pub api_host: String,
    pub verify_tls: bool,
    pub enclave: bool,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &mask_secret(&self.token))
            .field("project", &self.project)
            .field("config", &self.config)
            .field("api_host", &self.api_host)
            .field("verify_tls", &self.verify_tls)
            .field("enclave", &self.enclave)
            .finish()
    }
}

/// Hide all but the last four characters of a secret
#[must_use]
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{visible}", "*".repeat(chars.len() - 4))
}
