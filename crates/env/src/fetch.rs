//! Secret fetching with fallback to the local snapshot

use crate::fallback::FallbackCache;
use async_trait::async_trait;
use envlift_api::{parse_secrets, ApiClient, ClientConfig};
use envlift_config::{ConfigResolver, Credentials, Scope};
use envlift_core::{Error, Result, SecretsMap, DEFAULT_REQUEST_TIMEOUT};
use envlift_utils::RetryPolicy;
use std::fmt;
use std::time::Duration;

/// Where raw secrets payloads come from
#[async_trait]
pub trait SecretsSource: Send + Sync {
    /// Download the raw payload for the given credentials
    async fn fetch(&self, credentials: &Credentials) -> Result<Vec<u8>>;
}

/// The envlift API
#[derive(Debug, Clone)]
pub struct ApiSecretsSource {
    timeout: Option<Duration>,
    retry: RetryPolicy,
}

impl ApiSecretsSource {
    pub fn new(timeout: Option<Duration>, retry: RetryPolicy) -> Self {
        Self { timeout, retry }
    }
}

impl Default for ApiSecretsSource {
    fn default() -> Self {
        Self::new(Some(DEFAULT_REQUEST_TIMEOUT), RetryPolicy::default())
    }
}

#[async_trait]
impl SecretsSource for ApiSecretsSource {
    async fn fetch(&self, credentials: &Credentials) -> Result<Vec<u8>> {
        let config = ClientConfig::new(credentials.api_host.as_str())
            .with_verify_tls(credentials.verify_tls)
            .with_timeout(self.timeout)
            .with_retry(self.retry.clone());
        let client = ApiClient::new(config)?;
        client
            .fetch_secrets(
                &credentials.token,
                credentials.project.as_deref(),
                credentials.config.as_deref(),
            )
            .await
    }
}

/// How the fallback file takes part in a fetch
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Snapshot to update on success and read on failure
    pub fallback: Option<FallbackCache>,
    /// Never update the snapshot
    pub fallback_readonly: bool,
    /// Skip the network and serve the snapshot
    pub fallback_only: bool,
}

/// Where a set of secrets came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretsOrigin {
    /// Fresh from the service
    Remote,
    /// From the snapshot because fallback-only mode was requested
    FallbackOnly,
    /// From the snapshot because the service could not be used
    Fallback { reason: String },
}

impl SecretsOrigin {
    /// True when the service failed and stale secrets are being served
    pub fn is_degraded(&self) -> bool {
        matches!(self, SecretsOrigin::Fallback { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedSecrets {
    pub secrets: SecretsMap,
    pub origin: SecretsOrigin,
}

/// Progress of a single fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Start,
    Resolving,
    Fetching,
    Success,
    Fallback,
    CachedOk,
    Fatal,
    Done,
}

impl fmt::Display for FetchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchState::Start => "start",
            FetchState::Resolving => "resolving",
            FetchState::Fetching => "fetching",
            FetchState::Success => "success",
            FetchState::Fallback => "fallback",
            FetchState::CachedOk => "cached-ok",
            FetchState::Fatal => "fatal",
            FetchState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Resolves credentials, fetches secrets, and degrades to the fallback file.
///
/// The result is all-or-nothing: either a complete secrets map is returned
/// or the fetch fails.
pub struct SecretFetcher<S> {
    source: S,
}

impl<S: SecretsSource> SecretFetcher<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub async fn fetch(
        &self,
        resolver: &ConfigResolver<'_>,
        scope: &Scope,
        options: &FetchOptions,
    ) -> Result<FetchedSecrets> {
        transition(FetchState::Start);
        let result = self.run(resolver, scope, options).await;
        match &result {
            Ok(_) => transition(FetchState::Done),
            Err(_) => transition(FetchState::Fatal),
        }
        result
    }

    async fn run(
        &self,
        resolver: &ConfigResolver<'_>,
        scope: &Scope,
        options: &FetchOptions,
    ) -> Result<FetchedSecrets> {
        if options.fallback_only {
            let cache = options.fallback.as_ref().ok_or_else(|| {
                Error::configuration("fallback-only mode requires a fallback file path")
            })?;
            transition(FetchState::Fallback);
            let secrets = read_snapshot(cache)?;
            transition(FetchState::CachedOk);
            return Ok(FetchedSecrets {
                secrets,
                origin: SecretsOrigin::FallbackOnly,
            });
        }

        transition(FetchState::Resolving);
        let credentials = resolver.credentials(scope)?;
        tracing::debug!(?credentials, scope = %scope, "resolved credentials");

        transition(FetchState::Fetching);
        match self.source.fetch(&credentials).await {
            Ok(payload) => {
                // Only a payload that decodes is cached
                let secrets = parse_secrets(&payload)?;
                transition(FetchState::Success);

                if let Some(cache) = options.fallback.as_ref().filter(|_| !options.fallback_readonly) {
                    if let Err(e) = cache.write(&payload) {
                        tracing::warn!(error = %e, "failed to update fallback file");
                    }
                }

                Ok(FetchedSecrets {
                    secrets,
                    origin: SecretsOrigin::Remote,
                })
            }
            Err(error) if error.is_fallback_eligible() => {
                let Some(cache) = options.fallback.as_ref() else {
                    return Err(error);
                };
                transition(FetchState::Fallback);
                tracing::warn!(
                    error = %error,
                    path = %cache.path().display(),
                    "unable to fetch secrets, reading fallback file"
                );

                let secrets = read_snapshot(cache)?;
                transition(FetchState::CachedOk);
                Ok(FetchedSecrets {
                    secrets,
                    origin: SecretsOrigin::Fallback {
                        reason: error.to_string(),
                    },
                })
            }
            Err(error) => Err(error),
        }
    }
}

fn read_snapshot(cache: &FallbackCache) -> Result<SecretsMap> {
    let payload = cache.read()?;
    parse_secrets(&payload).map_err(|e| {
        Error::fallback_with_source(cache.path(), "unable to parse fallback file", e)
    })
}

fn transition(state: FetchState) {
    tracing::debug!(state = %state, "secret fetch");
}
