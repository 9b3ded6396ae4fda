//! Typed response bodies

use envlift_core::{Error, Result, SecretsMap};
use serde::Deserialize;
use std::collections::BTreeMap;

const SECRETS_PAYLOAD: &str = "secrets payload";

/// Body of a failed API call
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub messages: Vec<String>,
    #[serde(default)]
    pub success: Option<bool>,
}

impl ErrorResponse {
    /// All server messages, one per line
    pub fn message(&self) -> String {
        self.messages.join("\n")
    }
}

/// One secret as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SecretValue {
    #[serde(default)]
    pub raw: Option<String>,
    #[serde(default)]
    pub computed: Option<String>,
}

impl SecretValue {
    /// The value to inject: `computed`, else `raw`
    pub fn effective(&self) -> Option<&str> {
        self.computed.as_deref().or(self.raw.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct WrappedPayload {
    variables: BTreeMap<String, SecretValue>,
}

type FlatPayload = BTreeMap<String, SecretValue>;

/// Decode a secrets payload into `name -> value`.
///
/// Accepts both the API's `{"variables": {...}}` envelope and the bare
/// `{NAME: {"raw": .., "computed": ..}}` map.
pub fn parse_secrets(bytes: &[u8]) -> Result<SecretsMap> {
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| Error::parse(SECRETS_PAYLOAD, e.to_string()))?;

    let variables = match WrappedPayload::deserialize(&value) {
        Ok(wrapped) => wrapped.variables,
        Err(_) => FlatPayload::deserialize(&value)
            .map_err(|e| Error::parse(SECRETS_PAYLOAD, e.to_string()))?,
    };

    variables
        .into_iter()
        .map(|(name, secret)| {
            let value = secret.effective().map(str::to_string).ok_or_else(|| {
                Error::parse(
                    SECRETS_PAYLOAD,
                    format!("secret '{name}' has neither a computed nor a raw value"),
                )
            })?;
            Ok((name, value))
        })
        .collect()
}
