//! Server identity and URI minting
//!
//! [`ServerIdentity`] holds the canonical base URL all resource identifiers
//! are minted from. It is validated once, up front, and passed by reference
//! wherever a URI is needed; there is deliberately no mutable "current
//! server URL" anywhere in the pipeline. The base URL must not change during
//! a job's start-to-completion span; that is configuration the surrounding
//! system enforces.

use url::form_urlencoded;
use url::Url;

use crate::error::ProvenanceError;
use crate::job::JobId;

/// The reporting server's own identity: a validated base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIdentity {
    base_url: Url,
}

impl ServerIdentity {
    /// Validate and wrap a base URL.
    ///
    /// # Errors
    /// Returns [`ProvenanceError::Configuration`] when the URL is empty,
    /// unparsable, or not usable as a base (e.g. `mailto:`). This is fatal:
    /// no phase may start without a valid identity.
    pub fn new(base_url: &str) -> Result<Self, ProvenanceError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ProvenanceError::Configuration(
                "base URL is empty".to_string(),
            ));
        }
        let parsed = Url::parse(trimmed).map_err(|e| {
            ProvenanceError::Configuration(format!("base URL `{trimmed}` is unparsable: {e}"))
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ProvenanceError::Configuration(format!(
                "base URL `{trimmed}` cannot be used as a base"
            )));
        }
        Ok(Self { base_url: parsed })
    }

    /// The validated base URL
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Mint the activity URI for a job.
    ///
    /// Pure function of (base URL, job id); phase 1 and phase 2 must and do
    /// get the identical URI.
    ///
    /// # Errors
    /// Returns [`ProvenanceError::Configuration`] if the minted URI fails to
    /// parse, which would mean the base URL itself is unusable.
    pub fn activity_uri(&self, job_id: JobId) -> Result<Url, ProvenanceError> {
        let raw = format!(
            "{}/secure/getJobObject.do?jobId={}",
            base_str(&self.base_url),
            job_id
        );
        Url::parse(&raw)
            .map_err(|e| ProvenanceError::Configuration(format!("cannot mint `{raw}`: {e}")))
    }

    /// Mint the retrieval URI for a file discovered in a job's storage
    /// namespace. The storage key is percent-encoded; keys routinely contain
    /// slashes and user-supplied names.
    ///
    /// # Errors
    /// Returns [`ProvenanceError::MalformedReference`] if the key produces an
    /// unparsable URI; callers skip that file and continue.
    pub fn job_file_uri(&self, job_id: JobId, storage_key: &str) -> Result<Url, ProvenanceError> {
        let encoded_key: String = form_urlencoded::byte_serialize(storage_key.as_bytes()).collect();
        let raw = format!(
            "{}/secure/jobFile.do?jobId={}&key={}",
            base_str(&self.base_url),
            job_id,
            encoded_key
        );
        Url::parse(&raw).map_err(|e| {
            ProvenanceError::MalformedReference(format!(
                "storage key `{storage_key}` yields unparsable URI: {e}"
            ))
        })
    }
}

/// Base URL without a trailing slash, so minted paths never double up.
fn base_str(base: &Url) -> &str {
    base.as_str().trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_base_url() {
        let err = ServerIdentity::new("   ").unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn rejects_unparsable_base_url() {
        let err = ServerIdentity::new("not a url").unwrap_err();
        assert!(matches!(err, ProvenanceError::Configuration(_)));
    }

    #[test]
    fn rejects_non_base_url() {
        let err = ServerIdentity::new("mailto:foo@test.com").unwrap_err();
        assert!(matches!(err, ProvenanceError::Configuration(_)));
    }

    #[test]
    fn activity_uri_matches_fixed_scheme() {
        let identity = ServerIdentity::new("http://host").unwrap();
        let uri = identity.activity_uri(JobId::new(1)).unwrap();
        assert_eq!(uri.as_str(), "http://host/secure/getJobObject.do?jobId=1");
    }

    #[test]
    fn activity_uri_is_stable_across_calls() {
        let identity = ServerIdentity::new("http://host").unwrap();
        let a = identity.activity_uri(JobId::new(9)).unwrap();
        let b = identity.activity_uri(JobId::new(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn trailing_slash_does_not_change_minted_uris() {
        let plain = ServerIdentity::new("http://host").unwrap();
        let slashed = ServerIdentity::new("http://host/").unwrap();
        assert_eq!(
            plain.activity_uri(JobId::new(1)).unwrap(),
            slashed.activity_uri(JobId::new(1)).unwrap()
        );
    }

    #[test]
    fn job_file_uri_includes_key() {
        let identity = ServerIdentity::new("http://portal-fake.vhirl.org").unwrap();
        let uri = identity.job_file_uri(JobId::new(1), "cloudKey").unwrap();
        assert_eq!(
            uri.as_str(),
            "http://portal-fake.vhirl.org/secure/jobFile.do?jobId=1&key=cloudKey"
        );
    }

    #[test]
    fn job_file_uri_encodes_awkward_keys() {
        let identity = ServerIdentity::new("http://host").unwrap();
        let uri = identity
            .job_file_uri(JobId::new(21), "job-0000000021/1000_yr map.png")
            .unwrap();
        assert!(uri.as_str().contains("key=job-0000000021%2F1000_yr+map.png"));
    }
}
