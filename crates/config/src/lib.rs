//! Configuration storage and resolution for envlift
//!
//! Options live in a JSON file keyed by scope (a directory path). Resolution
//! asks an ordered list of providers (flags, environment, the scope chain,
//! built-in defaults) and returns the first answer together with where it came
//! from.

pub mod providers;
pub mod resolver;
pub mod scope;
pub mod store;

pub use providers::{DefaultProvider, EnvProvider, FlagProvider, ScopeChainProvider, ValueProvider};
pub use resolver::{mask_secret, ConfigResolver, Credentials};
pub use scope::Scope;
pub use store::{ConfigStore, ScopedOptions, StoredConfig};
