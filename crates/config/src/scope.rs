//! Hierarchical configuration scopes

use envlift_core::{Error, Result};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// An absolute, lexically normalised directory path selecting stored options.
///
/// Scopes form a tree rooted at `/`; a scope inherits every option its
/// ancestors define unless it defines the option itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Scope(PathBuf);

impl Scope {
    /// The root scope, `/`
    #[must_use]
    pub fn root() -> Self {
        Scope(PathBuf::from("/"))
    }

    /// Parse a user-supplied scope, resolving relative paths against `cwd`
    pub fn parse(raw: &str, cwd: &Path) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::configuration("invalid scope: scope must not be empty"));
        }

        let expanded = shellexpand::tilde(raw);
        let path = Path::new(expanded.as_ref());
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            cwd.join(path)
        };

        normalize(&absolute)
            .map(Scope)
            .ok_or_else(|| Error::configuration(format!("invalid scope '{raw}'")))
    }

    /// Interpret a key from the config file. Relative or malformed keys never
    /// match any scope.
    #[must_use]
    pub fn from_stored_key(key: &str) -> Option<Self> {
        let path = Path::new(key);
        if !path.is_absolute() {
            return None;
        }
        normalize(path).map(Scope)
    }

    /// This scope followed by each parent, ending at the root
    pub fn ancestors(&self) -> impl Iterator<Item = Scope> + '_ {
        self.0.ancestors().map(|p| Scope(p.to_path_buf()))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// The key this scope is stored under
    #[must_use]
    pub fn key(&self) -> String {
        self.0.to_string_lossy().into_owned()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Fold `.` and `..` without touching the filesystem; `None` if `..` climbs
/// above the root.
fn normalize(path: &Path) -> Option<PathBuf> {
    let mut normalized = PathBuf::new();
    let mut depth = 0usize;

    for component in path.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                normalized.pop();
                depth -= 1;
            }
            Component::Normal(part) => {
                normalized.push(part);
                depth += 1;
            }
        }
    }

    Some(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cwd() -> PathBuf {
        PathBuf::from("/home/dev/app")
    }

    #[test]
    fn test_absolute_scope_is_normalized() {
        let scope = Scope::parse("/a/./b/../c/", &cwd()).unwrap();
        assert_eq!(scope.as_path(), Path::new("/a/c"));
        assert_eq!(scope.key(), "/a/c");
    }

    #[test]
    fn test_relative_scope_joins_cwd() {
        let scope = Scope::parse("service", &cwd()).unwrap();
        assert_eq!(scope.as_path(), Path::new("/home/dev/app/service"));

        let scope = Scope::parse(".", &cwd()).unwrap();
        assert_eq!(scope.as_path(), Path::new("/home/dev/app"));
    }

    #[test]
    fn test_invalid_scopes_are_configuration_errors() {
        assert!(matches!(
            Scope::parse("", &cwd()),
            Err(Error::Configuration { .. })
        ));
        assert!(matches!(
            Scope::parse("/..", &cwd()),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_ancestors_walk_to_root() {
        let scope = Scope::parse("/a/b", &cwd()).unwrap();
        let chain: Vec<String> = scope.ancestors().map(|s| s.key()).collect();
        assert_eq!(chain, vec!["/a/b", "/a", "/"]);

        let chain: Vec<String> = Scope::root().ancestors().map(|s| s.key()).collect();
        assert_eq!(chain, vec!["/"]);
    }

    #[test]
    fn test_stored_keys() {
        assert_eq!(
            Scope::from_stored_key("/a/b/"),
            Some(Scope(PathBuf::from("/a/b")))
        );
        assert_eq!(Scope::from_stored_key("relative/path"), None);
        assert_eq!(Scope::from_stored_key("/../etc"), None);
    }
}
