//! Best-effort reachability probing of candidate stream URLs.
//!
//! A probe is a single liveness check: one GET with a bounded timeout, no
//! retries. Every failure mode - non-2xx status, network error, timeout,
//! malformed URL - collapses to [`Reachability::Unreachable`]; the probe
//! never returns an error past its boundary. Retry policy, if any, belongs
//! to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

/// Outcome of a single liveness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    /// The URL answered with a 2xx status.
    Reachable,
    /// Everything else: non-2xx, connection failure, timeout, bad URL.
    Unreachable,
}

/// Trait for probing a candidate stream URL.
///
/// The connection machine depends on this trait rather than a concrete HTTP
/// client, so tests can script probe outcomes and completion order.
#[async_trait]
pub trait StreamProbe: Send + Sync {
    /// Performs one best-effort liveness check against `url`.
    async fn probe(&self, url: &str) -> Reachability;
}

/// HTTP implementation of [`StreamProbe`] backed by a shared reqwest client.
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    /// Creates a probe whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns the underlying builder error if the HTTP client cannot be
    /// constructed (TLS backend initialization, essentially).
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Creates a probe over an existing client, keeping its configuration.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StreamProbe for HttpProbe {
    async fn probe(&self, url: &str) -> Reachability {
        match self.client.get(url).send().await {
            Ok(response) if response.status().is_success() => Reachability::Reachable,
            Ok(response) => {
                log::debug!("[Probe] {} answered with status {}", url, response.status());
                Reachability::Unreachable
            }
            Err(e) => {
                log::debug!("[Probe] {} failed: {}", url, e);
                Reachability::Unreachable
            }
        }
    }
}
