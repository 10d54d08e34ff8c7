//! HTTP probing of external references.

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// The target could not be reached, or did not answer in time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{url}: {message}")]
pub struct NetworkError {
    pub url: String,
    pub message: String,
}

/// Capability to query the status of a URL.
///
/// Redirects must not be followed: the status of the first response is
/// reported as is.
pub trait HttpProber: Send + Sync {
    /// Issue a `HEAD` request and return the response status code.
    fn head(&self, url: &Url, timeout: Duration) -> Result<u16, NetworkError>;
}

/// [`HttpProber`] backed by a blocking `reqwest` client.
pub struct ReqwestProber {
    client: Client,
}

impl ReqwestProber {
    /// Create a prober; `connect_timeout` bounds the connection phase of every request.
    pub fn new(connect_timeout: Duration) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .redirect(Policy::none())
            .connect_timeout(connect_timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| NetworkError {
                url: String::new(),
                message: format!("Failed to create HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

impl HttpProber for ReqwestProber {
    fn head(&self, url: &Url, timeout: Duration) -> Result<u16, NetworkError> {
        tracing::debug!("Checking URL: {}", url);
        let response = self
            .client
            .head(url.clone())
            .timeout(timeout)
            .send()
            .map_err(|e| NetworkError {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(response.status().as_u16())
    }
}
