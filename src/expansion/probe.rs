use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use std::time::Duration;

use crate::core::constants::timeouts;
use crate::core::error::{ExpanderError, Result};

/// Cheap first tier: one request, no redirect following.
#[async_trait]
pub trait RedirectProbe: Send + Sync {
    /// The redirect target announced for `url`, or `None` when the response
    /// is not a redirect. Errors mean the probe could not be completed.
    async fn probe(&self, url: &str) -> Result<Option<String>>;
}

/// Settings shared by every HTTP client the engine builds.
#[derive(Debug, Clone, Default)]
pub struct NetworkOptions {
    /// HTTP/HTTPS proxy URL
    pub proxy: Option<String>,
    /// Accept invalid TLS certificates
    pub skip_ssl_verification: bool,
}

impl NetworkOptions {
    pub(crate) fn apply(&self, mut builder: reqwest::ClientBuilder) -> reqwest::ClientBuilder {
        if self.skip_ssl_verification {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ref proxy_url) = self.proxy {
            match reqwest::Proxy::all(proxy_url) {
                Ok(proxy) => builder = builder.proxy(proxy),
                Err(e) => log::warn!("Ignoring invalid proxy '{proxy_url}': {e}"),
            }
        }

        builder
    }
}

/// HEAD request with a fixed short timeout, reading the `Location` header of
/// a 3xx response.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(network: &NetworkOptions) -> Result<Self> {
        Self::with_timeout(
            network,
            Duration::from_millis(timeouts::PROBE_TIMEOUT_MILLIS),
        )
    }

    pub fn with_timeout(network: &NetworkOptions, timeout: Duration) -> Result<Self> {
        let user_agent = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

        let builder = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .user_agent(user_agent);

        let client = network.apply(builder).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RedirectProbe for HttpProbe {
    async fn probe(&self, url: &str) -> Result<Option<String>> {
        let base = reqwest::Url::parse(url)
            .map_err(|e| ExpanderError::Probe(format!("invalid URL '{url}': {e}")))?;

        let response = self.client.head(base.clone()).send().await?;
        let status = response.status();
        if !status.is_redirection() {
            log::debug!("Probe {url} -> {status}, no redirect");
            return Ok(None);
        }

        let Some(location) = response.headers().get(LOCATION) else {
            log::debug!("Probe {url} -> {status} without Location header");
            return Ok(None);
        };

        let location = location
            .to_str()
            .map_err(|e| ExpanderError::Probe(format!("unreadable Location header: {e}")))?;

        // Relative locations are resolved against the probed URL
        let target = base
            .join(location)
            .map_err(|e| ExpanderError::Probe(format!("invalid Location '{location}': {e}")))?;

        Ok(Some(target.to_string()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use mockito::Server;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    #[tokio::test]
    async fn test_probe__returns_absolute_location() -> TestResult {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("HEAD", "/abc")
            .with_status(301)
            .with_header("location", "https://example.com/a")
            .create_async()
            .await;

        let probe = HttpProbe::new(&NetworkOptions::default())?;
        let actual = probe.probe(&format!("{}/abc", server.url())).await?;

        assert_eq!(actual.as_deref(), Some("https://example.com/a"));
        Ok(())
    }

    #[tokio::test]
    async fn test_probe__resolves_relative_location() -> TestResult {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("HEAD", "/abc")
            .with_status(302)
            .with_header("location", "/landing?ref=short")
            .create_async()
            .await;

        let probe = HttpProbe::new(&NetworkOptions::default())?;
        let actual = probe.probe(&format!("{}/abc", server.url())).await?;

        assert_eq!(
            actual,
            Some(format!("{}/landing?ref=short", server.url()))
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_probe__non_redirect_is_none() -> TestResult {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("HEAD", "/page")
            .with_status(200)
            .create_async()
            .await;

        let probe = HttpProbe::new(&NetworkOptions::default())?;
        let actual = probe.probe(&format!("{}/page", server.url())).await?;

        assert_eq!(actual, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_probe__redirect_without_location_is_none() -> TestResult {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("HEAD", "/abc")
            .with_status(302)
            .create_async()
            .await;

        let probe = HttpProbe::new(&NetworkOptions::default())?;
        let actual = probe.probe(&format!("{}/abc", server.url())).await?;

        assert_eq!(actual, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_probe__connection_failure_is_error() -> TestResult {
        let probe =
            HttpProbe::with_timeout(&NetworkOptions::default(), Duration::from_millis(500))?;
        let result = probe.probe("http://127.0.0.1:1/unreachable").await;

        assert!(result.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_probe__invalid_url_is_probe_error() -> TestResult {
        let probe = HttpProbe::new(&NetworkOptions::default())?;
        let result = probe.probe("not a url").await;

        assert!(matches!(result, Err(ExpanderError::Probe(_))));
        Ok(())
    }

    #[test]
    fn test_network_options__invalid_proxy_is_ignored() {
        let network = NetworkOptions {
            proxy: Some("::not a proxy::".to_string()),
            skip_ssl_verification: true,
        };
        assert!(HttpProbe::new(&network).is_ok());
    }
}
