//! Secrets endpoint

use crate::client::{ApiClient, ApiRequest};
use envlift_core::{Result, SECRETS_ENDPOINT};

impl ApiClient {
    /// Download the raw secrets payload for a project and config.
    ///
    /// The body is returned undecoded so that callers can cache exactly what
    /// the server sent.
    pub async fn fetch_secrets(
        &self,
        token: &str,
        project: Option<&str>,
        config: Option<&str>,
    ) -> Result<Vec<u8>> {
        let mut request = ApiRequest::get(SECRETS_ENDPOINT).bearer(token);
        if let Some(project) = project {
            request = request.query("project", project);
        }
        if let Some(config) = config {
            request = request.query("config", config);
        }

        let response = self.execute(request).await?;
        tracing::debug!(
            bytes = response.body.len(),
            request_id = response.request_id.as_deref().unwrap_or("-"),
            "downloaded secrets"
        );
        Ok(response.body)
    }
}
