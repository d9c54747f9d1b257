//! HTTP registry dispatcher
//!
//! Posts the JSON report payload to the configured registry endpoint. One
//! shot: no retries here, the caller decides whether a failed submission is
//! worth repeating (the durable graph is already the system of record).

use async_trait::async_trait;
use url::Url;

use crate::error::DispatchError;
use crate::ports::ReportDispatcher;
use crate::report::ProvenanceReport;

/// [`ReportDispatcher`] over HTTP POST
#[derive(Debug, Clone, Default)]
pub struct HttpRegistryDispatcher {
    client: reqwest::Client,
}

impl HttpRegistryDispatcher {
    /// Create a dispatcher with a default client
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dispatcher reusing an existing client
    #[inline]
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReportDispatcher for HttpRegistryDispatcher {
    async fn submit(
        &self,
        registry: &Url,
        report: &ProvenanceReport,
    ) -> Result<u16, DispatchError> {
        let response = self
            .client
            .post(registry.clone())
            .json(report)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(status.as_u16())
        } else {
            Err(DispatchError::Rejected(status.as_u16()))
        }
    }
}
