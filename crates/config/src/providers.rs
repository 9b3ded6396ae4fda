//! Value providers consulted during option resolution
//!
//! Each provider answers for a single source. The resolver asks them in
//! priority order and the first non-empty answer wins.

use crate::scope::Scope;
use crate::store::ConfigStore;
use envlift_core::{parse_bool, ConfigOption, Error, Provenance, ResolvedOption, Result};
use std::collections::BTreeMap;

/// A single source of option values
pub trait ValueProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Look up `option` for `scope`
    ///
    /// # Returns
    /// * `Ok(Some(value))` - This provider defines the option
    /// * `Ok(None)` - Not defined here; ask the next provider
    /// * `Err(error)` - The value exists but is malformed
    fn lookup(&self, option: ConfigOption, scope: &Scope) -> Result<Option<ResolvedOption>>;
}

/// Explicit command-line flags
#[derive(Debug, Clone, Default)]
pub struct FlagProvider {
    values: BTreeMap<ConfigOption, String>,
}

impl FlagProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a flag value. Empty values are treated as absent.
    #[must_use]
    pub fn with(mut self, option: ConfigOption, value: impl Into<String>) -> Self {
        self.set(option, value);
        self
    }

    pub fn set(&mut self, option: ConfigOption, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.values.remove(&option);
        } else {
            self.values.insert(option, value);
        }
    }

    /// Record a flag only when it was given
    pub fn set_opt(&mut self, option: ConfigOption, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            self.set(option, value);
        }
    }
}

impl ValueProvider for FlagProvider {
    fn name(&self) -> &'static str {
        "flag"
    }

    fn lookup(&self, option: ConfigOption, _scope: &Scope) -> Result<Option<ResolvedOption>> {
        let Some(value) = self.values.get(&option) else {
            return Ok(None);
        };
        option.validate_value(value)?;
        Ok(Some(ResolvedOption::new(option, value.as_str(), Provenance::Flag)))
    }
}

/// Snapshot of the `ENVLIFT_*` environment variables
#[derive(Debug, Clone, Default)]
pub struct EnvProvider {
    vars: BTreeMap<String, String>,
}

impl EnvProvider {
    /// Capture the option variables from the current process environment
    pub fn from_process() -> Self {
        let vars = ConfigOption::ALL
            .iter()
            .filter_map(|option| {
                let name = option.env_var();
                std::env::var(name).ok().map(|value| (name.to_string(), value))
            })
            .collect();
        Self { vars }
    }

    /// Build from an explicit variable map
    pub fn from_map<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ValueProvider for EnvProvider {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn lookup(&self, option: ConfigOption, _scope: &Scope) -> Result<Option<ResolvedOption>> {
        let var = option.env_var();
        let Some(raw) = self.vars.get(var).filter(|v| !v.is_empty()) else {
            return Ok(None);
        };

        let value = if option.is_boolean() {
            let flag = parse_bool(raw).map_err(|_| {
                Error::configuration(format!(
                    "invalid value '{raw}' for environment variable {var}: expected true or false"
                ))
            })?;
            // ENVLIFT_NO_VERIFY_TLS=true means verify-tls=false
            let flag = if option.env_var_is_inverted() { !flag } else { flag };
            flag.to_string()
        } else {
            raw.clone()
        };

        Ok(Some(ResolvedOption::new(option, value, Provenance::Environment)))
    }
}

/// Stored options, searched from the requested scope up to the root
#[derive(Debug, Clone, Copy)]
pub struct ScopeChainProvider<'a> {
    store: &'a ConfigStore,
}

impl<'a> ScopeChainProvider<'a> {
    pub fn new(store: &'a ConfigStore) -> Self {
        Self { store }
    }
}

impl ValueProvider for ScopeChainProvider<'_> {
    fn name(&self) -> &'static str {
        "scope"
    }

    fn lookup(&self, option: ConfigOption, scope: &Scope) -> Result<Option<ResolvedOption>> {
        let found = scope.ancestors().find_map(|ancestor| {
            self.store.lookup(&ancestor, option).map(|value| {
                ResolvedOption::new(option, value, Provenance::Scope(ancestor.key()))
            })
        });
        Ok(found)
    }
}

/// Built-in defaults
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultProvider;

impl ValueProvider for DefaultProvider {
    fn name(&self) -> &'static str {
        "default"
    }

    fn lookup(&self, option: ConfigOption, _scope: &Scope) -> Result<Option<ResolvedOption>> {
        Ok(option
            .default_value()
            .map(|value| ResolvedOption::new(option, value, Provenance::Default)))
    }
}
