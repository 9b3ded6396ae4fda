//! Building the child process environment

use envlift_core::{SecretsMap, EXCLUDED_SECRET_NAMES};
use indexmap::IndexMap;
use std::ffi::OsString;

/// Append `secrets` to `base`, preserving the order of `base`.
///
/// Secrets named `PATH`, `PS1` or `HOME` are dropped. Any other secret
/// replaces a same-named inherited variable.
pub fn merge_environment<I>(base: I, secrets: &SecretsMap) -> IndexMap<OsString, OsString>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut env: IndexMap<OsString, OsString> = base.into_iter().collect();

    for (name, value) in secrets {
        if is_excluded(name) {
            tracing::debug!(name = %name, "not injecting reserved variable");
            continue;
        }
        env.insert(OsString::from(name), OsString::from(value));
    }
    env
}

fn is_excluded(name: &str) -> bool {
    EXCLUDED_SECRET_NAMES.contains(&name)
}
