//! Page-navigation capability used by the fallback tier.
//!
//! A [`PageNavigator`] hands out isolated [`NavigatorPage`]s. Each page is
//! configured with a [`BrowserProfile`] when opened and owned by one caller
//! at a time, so headers and viewport never leak between resolutions.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use std::time::Duration;

use crate::core::constants::browser;
use crate::core::error::{ExpanderError, Result};
use crate::expansion::probe::NetworkOptions;

/// Identity a page presents to the sites it visits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserProfile {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for BrowserProfile {
    fn default() -> Self {
        Self {
            user_agent: browser::USER_AGENT.to_string(),
            accept: browser::ACCEPT.to_string(),
            accept_language: browser::ACCEPT_LANGUAGE.to_string(),
            viewport_width: browser::VIEWPORT_WIDTH,
            viewport_height: browser::VIEWPORT_HEIGHT,
        }
    }
}

#[async_trait]
pub trait PageNavigator: Send + Sync {
    /// Open a fresh, isolated page carrying `profile`.
    async fn open_page(&self, profile: &BrowserProfile) -> Result<Box<dyn NavigatorPage>>;

    /// Release whatever the navigator holds beyond its pages.
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
pub trait NavigatorPage: Send {
    /// Navigate to `url` and wait for the page to settle.
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// The URL the page currently shows.
    async fn current_url(&mut self) -> Result<String>;

    /// Drop per-navigation state so the page can serve another caller.
    async fn reset(&mut self) -> Result<()>;

    async fn close(&mut self) -> Result<()>;
}

static META_REFRESH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)<meta[^>]+http-equiv\s*=\s*["']?refresh["']?[^>]*content\s*=\s*["']?\s*\d*\s*;?\s*url\s*=\s*['"]?([^"'>\s]+)"#,
    )
    .expect("Failed to compile meta refresh pattern")
});

static SCRIPT_REDIRECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?:location(?:\.href)?\s*=\s*|location\.(?:replace|assign)\(\s*)["']([^"']+)["']"#,
    )
    .expect("Failed to compile script redirect pattern")
});

/// Navigator that fetches pages over plain HTTP.
///
/// Follows HTTP redirects, then looks for meta refresh and simple
/// `location` assignments in the HTML and follows those too. Scripts are not
/// executed, so redirects computed at runtime are out of reach; configure a
/// WebDriver endpoint for those.
#[derive(Debug, Clone, Default)]
pub struct HttpNavigator {
    network: NetworkOptions,
}

impl HttpNavigator {
    pub fn new(network: NetworkOptions) -> Self {
        Self { network }
    }
}

#[async_trait]
impl PageNavigator for HttpNavigator {
    async fn open_page(&self, profile: &BrowserProfile) -> Result<Box<dyn NavigatorPage>> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header_value(&profile.accept)?);
        headers.insert(ACCEPT_LANGUAGE, header_value(&profile.accept_language)?);

        let builder = reqwest::Client::builder()
            .redirect(Policy::limited(browser::MAX_HTTP_REDIRECTS))
            .user_agent(profile.user_agent.as_str())
            .default_headers(headers);

        let client = self.network.apply(builder).build()?;
        Ok(Box::new(HttpPage {
            client,
            current: None,
        }))
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| ExpanderError::InvalidArgument(format!("invalid header value '{value}': {e}")))
}

pub struct HttpPage {
    client: reqwest::Client,
    current: Option<reqwest::Url>,
}

impl HttpPage {
    /// Load `url` and return where it landed plus the start of an HTML body.
    ///
    /// An error status still counts as a landing: the page the redirect
    /// chain ends on is the expansion, whether or not the site serves it.
    async fn fetch(&self, url: reqwest::Url, timeout: Duration) -> Result<(reqwest::Url, String)> {
        let mut response = self.client.get(url).timeout(timeout).send().await?;
        let landed = response.url().clone();
        if !response.status().is_success() {
            log::debug!("Landed on {landed} with status {}", response.status());
        }
        if !is_html(response.headers()) {
            return Ok((landed, String::new()));
        }

        let mut body = Vec::new();
        while body.len() < browser::MAX_INSPECTED_BODY_BYTES {
            match response.chunk().await? {
                Some(chunk) => body.extend_from_slice(&chunk),
                None => break,
            }
        }
        body.truncate(browser::MAX_INSPECTED_BODY_BYTES);

        Ok((landed, String::from_utf8_lossy(&body).into_owned()))
    }
}

/// Whether a response may carry a client-side redirect. Untyped bodies are inspected.
fn is_html(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_none_or(|content_type| content_type.to_ascii_lowercase().contains("html"))
}

/// Target of a client-side redirect declared in `html`, resolved against `base`.
pub fn client_side_redirect(base: &reqwest::Url, html: &str) -> Option<reqwest::Url> {
    let target = META_REFRESH
        .captures(html)
        .or_else(|| SCRIPT_REDIRECT.captures(html))
        .and_then(|caps| caps.get(1))?
        .as_str();

    base.join(target)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

#[async_trait]
impl NavigatorPage for HttpPage {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<()> {
        let mut next = reqwest::Url::parse(url)
            .map_err(|e| ExpanderError::Navigation(format!("invalid URL '{url}': {e}")))?;

        for _ in 0..=browser::MAX_CLIENT_REDIRECTS {
            let (landed, body) = self.fetch(next, timeout).await?;
            let redirect = client_side_redirect(&landed, &body).filter(|target| *target != landed);
            self.current = Some(landed);

            match redirect {
                Some(target) => {
                    log::debug!("Client-side redirect to {target}");
                    next = target;
                }
                None => return Ok(()),
            }
        }

        Ok(())
    }

    async fn current_url(&mut self) -> Result<String> {
        self.current
            .as_ref()
            .map(|url| url.to_string())
            .ok_or_else(|| ExpanderError::Navigation("page has not navigated yet".to_string()))
    }

    async fn reset(&mut self) -> Result<()> {
        self.current = None;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.current = None;
        Ok(())
    }
}
