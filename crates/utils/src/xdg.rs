use envlift_core::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, ENVLIFT_CONFIG_FILE_VAR};
use std::env;
use std::path::PathBuf;

/// XDG Base Directory paths for envlift
pub struct XdgPaths;

impl XdgPaths {
    /// Get XDG_CONFIG_HOME/envlift or fallback
    pub fn config_dir() -> PathBuf {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|home| home.join(".config"))
                    .unwrap_or_else(|| PathBuf::from(".config"))
            })
            .join(CONFIG_DIR_NAME)
    }

    /// Location of the stored configuration.
    ///
    /// `ENVLIFT_CONFIG_FILE` wins over the XDG location.
    pub fn config_file() -> PathBuf {
        env::var(ENVLIFT_CONFIG_FILE_VAR)
            .ok()
            .filter(|file| !file.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| Self::config_dir().join(CONFIG_FILE_NAME))
    }
}
