//! Custom root of trust for the notification service.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::ClientError;

/// A single root certificate that the notification client trusts.
///
/// Built once at startup. Parsing is eager: a context that exists is one a
/// TLS client has already accepted.
#[derive(Clone)]
pub struct TrustContext {
    root: reqwest::Certificate,
}

impl TrustContext {
    /// Parse a PEM-encoded root certificate
    pub fn from_pem(pem: &[u8]) -> Result<Self, ClientError> {
        let root = reqwest::Certificate::from_pem(pem).map_err(|e| {
            ClientError::Configuration(format!("Failed to parse root certificate: {}", e))
        })?;

        let context = Self { root };
        // Some TLS backends defer parsing until the client is built
        context.client_builder().build().map_err(|e| {
            ClientError::Configuration(format!("Root certificate rejected by TLS backend: {}", e))
        })?;

        Ok(context)
    }

    /// Read and parse a PEM-encoded root certificate from disk
    pub fn from_pem_file(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let pem = fs::read(path).map_err(|e| {
            ClientError::Configuration(format!(
                "Failed to read root certificate {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_pem(&pem)
    }

    /// A client builder that trusts this root and nothing else
    pub(crate) fn client_builder(&self) -> reqwest::ClientBuilder {
        reqwest::Client::builder()
            .tls_built_in_root_certs(false)
            .add_root_certificate(self.root.clone())
    }
}

impl fmt::Debug for TrustContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustContext").finish_non_exhaustive()
    }
}
