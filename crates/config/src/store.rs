//! Persisted scope → option mapping

use crate::scope::Scope;
use envlift_core::{ConfigOption, Error, Result};
use envlift_utils::{write_atomic_private, FileLock};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Options stored for a single scope. Unknown names are kept but never resolved.
pub type ScopedOptions = BTreeMap<String, String>;

/// On-disk shape of the config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredConfig(BTreeMap<String, ScopedOptions>);

impl StoredConfig {
    /// Every stored scope key with its options
    pub fn scopes(&self) -> &BTreeMap<String, ScopedOptions> {
        &self.0
    }

    /// Options stored under keys that normalise to `scope`
    pub fn options_for(&self, scope: &Scope) -> Vec<&ScopedOptions> {
        self.0
            .iter()
            .filter(|(key, _)| Scope::from_stored_key(key).as_ref() == Some(scope))
            .map(|(_, options)| options)
            .collect()
    }

    /// Value of `option` defined exactly at `scope`, ignoring empty strings
    pub fn lookup(&self, scope: &Scope, option: ConfigOption) -> Option<&str> {
        self.options_for(scope)
            .into_iter()
            .filter_map(|options| options.get(option.as_str()))
            .map(String::as_str)
            .find(|value| !value.is_empty())
    }

    fn set(&mut self, scope: &Scope, pairs: &[(ConfigOption, String)]) {
        // An equivalent non-normalised key would otherwise keep shadowing the new value
        let options: Vec<ConfigOption> = pairs.iter().map(|(option, _)| *option).collect();
        self.unset(scope, &options);

        let entry = self.0.entry(scope.key()).or_default();
        for (option, value) in pairs {
            entry.insert(option.as_str().to_string(), value.clone());
        }
    }

    fn unset(&mut self, scope: &Scope, options: &[ConfigOption]) {
        // Stored keys may differ from the normalised form ("/a/" vs "/a")
        let keys: Vec<String> = self
            .0
            .keys()
            .filter(|key| Scope::from_stored_key(key).as_ref() == Some(scope))
            .cloned()
            .collect();

        for key in keys {
            if let Some(entry) = self.0.get_mut(&key) {
                for option in options {
                    entry.remove(option.as_str());
                }
                if entry.is_empty() {
                    self.0.remove(&key);
                }
            }
        }
    }
}

/// Access to the config file: pure data access, no network.
///
/// `set` and `unset` hold an exclusive advisory lock across the whole
/// read-modify-write and replace the file atomically, so concurrent
/// invocations serialise instead of dropping each other's changes.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    data: StoredConfig,
}

impl ConfigStore {
    /// Load the store at `path`. A missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = read_stored_config(&path)?;
        tracing::debug!(path = %path.display(), scopes = data.0.len(), "loaded config file");
        Ok(Self { path, data })
    }

    /// A store backed by `path` with the given contents, without touching disk
    pub fn with_data(path: impl Into<PathBuf>, data: StoredConfig) -> Self {
        Self {
            path: path.into(),
            data,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &StoredConfig {
        &self.data
    }

    /// Every stored scope key with its options, as written in the file
    pub fn all(&self) -> &BTreeMap<String, ScopedOptions> {
        self.data.scopes()
    }

    /// Options stored at exactly `scope`, merged across equivalent keys
    pub fn get(&self, scope: &Scope) -> ScopedOptions {
        let mut merged = ScopedOptions::new();
        for options in self.data.options_for(scope) {
            for (name, value) in options {
                merged.entry(name.clone()).or_insert_with(|| value.clone());
            }
        }
        merged
    }

    /// Value of `option` defined exactly at `scope`
    pub fn lookup(&self, scope: &Scope, option: ConfigOption) -> Option<&str> {
        self.data.lookup(scope, option)
    }

    /// Set options at `scope`, overwriting existing values.
    ///
    /// Every name and value is validated before the file is touched.
    pub fn set(&mut self, scope: &Scope, pairs: &[(String, String)]) -> Result<()> {
        if pairs.is_empty() {
            return Err(Error::configuration("no options given to set"));
        }
        let parsed = pairs
            .iter()
            .map(|(name, value)| {
                let option: ConfigOption = name.parse()?;
                option.validate_value(value)?;
                Ok((option, value.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        self.modify(|data| data.set(scope, &parsed))?;
        tracing::debug!(scope = %scope, count = parsed.len(), "stored options");
        Ok(())
    }

    /// Remove options from `scope`. A scope left without options is dropped.
    pub fn unset(&mut self, scope: &Scope, names: &[String]) -> Result<()> {
        if names.is_empty() {
            return Err(Error::configuration("no options given to unset"));
        }
        let options = names
            .iter()
            .map(|name| name.parse::<ConfigOption>())
            .collect::<Result<Vec<_>>>()?;

        self.modify(|data| data.unset(scope, &options))?;
        tracing::debug!(scope = %scope, count = options.len(), "removed options");
        Ok(())
    }

    fn modify(&mut self, change: impl FnOnce(&mut StoredConfig)) -> Result<()> {
        let _lock = FileLock::acquire(&self.path)?;

        // Re-read under the lock so writers that finished meanwhile are not lost
        let mut data = read_stored_config(&self.path)?;
        change(&mut data);

        let mut contents = serde_json::to_vec_pretty(&data)?;
        contents.push(b'\n');
        write_atomic_private(&self.path, &contents)?;

        self.data = data;
        Ok(())
    }
}

fn read_stored_config(path: &Path) -> Result<StoredConfig> {
    let contents = match fs::read(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(StoredConfig::default()),
        Err(e) => return Err(Error::file_system(path, "read config file", e)),
    };

    if contents.iter().all(u8::is_ascii_whitespace) {
        return Ok(StoredConfig::default());
    }

    serde_json::from_slice(&contents).map_err(|e| {
        Error::configuration(format!(
            "config file '{}' is not valid: {e}",
            path.display()
        ))
    })
}
