//! W3C WebDriver client for the navigation tier.
//!
//! Every page is its own browser session, so profiles never bleed between
//! callers. The WebDriver server (chromedriver, geckodriver, a Selenium grid)
//! is started and owned outside this process.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

use crate::core::error::{ExpanderError, Result};
use crate::expansion::navigator::{BrowserProfile, NavigatorPage, PageNavigator};
use crate::expansion::probe::NetworkOptions;

/// Slack added to the page-load timeout for the HTTP round trip itself.
const COMMAND_SLACK: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct WebDriverResponse {
    value: Value,
}

#[derive(Debug, Deserialize)]
struct NewSession {
    #[serde(rename = "sessionId")]
    session_id: String,
}

#[derive(Debug, Clone)]
pub struct WebDriverNavigator {
    endpoint: reqwest::Url,
    client: reqwest::Client,
}

impl WebDriverNavigator {
    pub fn new(endpoint: &str, network: &NetworkOptions) -> Result<Self> {
        let mut endpoint = reqwest::Url::parse(endpoint).map_err(|e| {
            ExpanderError::Config(format!("WebDriver URL '{endpoint}' is not valid: {e}"))
        })?;
        // Keep a trailing slash so joins append instead of replacing the last segment
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        let client = network.apply(reqwest::Client::builder()).build()?;
        Ok(Self { endpoint, client })
    }

    fn capabilities(profile: &BrowserProfile) -> Value {
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "pageLoadStrategy": "normal",
                    "goog:chromeOptions": {
                        "args": [
                            "--headless=new",
                            "--no-sandbox",
                            "--disable-gpu",
                            "--disable-dev-shm-usage",
                            "--disable-extensions",
                            format!("--user-agent={}", profile.user_agent),
                            format!("--window-size={},{}", profile.viewport_width, profile.viewport_height),
                            format!("--lang={}", primary_language(&profile.accept_language)),
                        ],
                        "prefs": {
                            "intl.accept_languages": profile.accept_language,
                        }
                    }
                }
            }
        })
    }
}

/// `en-US` out of `en-US,en;q=0.5`.
fn primary_language(accept_language: &str) -> &str {
    accept_language
        .split([',', ';'])
        .next()
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .unwrap_or("en-US")
}

async fn command(request: reqwest::RequestBuilder) -> Result<Value> {
    let response = request.send().await?;
    let status = response.status();
    let body: WebDriverResponse = response.json().await?;

    if status.is_success() {
        return Ok(body.value);
    }

    let message = body
        .value
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| body.value.get("error").and_then(Value::as_str))
        .unwrap_or("unknown WebDriver error");

    Err(ExpanderError::Navigation(format!(
        "WebDriver returned {status}: {message}"
    )))
}

#[async_trait]
impl PageNavigator for WebDriverNavigator {
    async fn open_page(&self, profile: &BrowserProfile) -> Result<Box<dyn NavigatorPage>> {
        let url = self
            .endpoint
            .join("session")
            .map_err(|e| ExpanderError::Navigation(e.to_string()))?;
        let value = command(
            self.client
                .post(url)
                .json(&Self::capabilities(profile)),
        )
        .await?;
        let session: NewSession = serde_json::from_value(value)?;

        log::debug!("Opened WebDriver session {}", session.session_id);
        let session_url = self
            .endpoint
            .join(&format!("session/{}/", session.session_id))
            .map_err(|e| ExpanderError::Navigation(e.to_string()))?;

        Ok(Box::new(WebDriverPage {
            client: self.client.clone(),
            session_url,
            open: true,
        }))
    }
}

pub struct WebDriverPage {
    client: reqwest::Client,
    session_url: reqwest::Url,
    open: bool,
}

impl WebDriverPage {
    fn url(&self, command: &str) -> Result<reqwest::Url> {
        self.session_url
            .join(command)
            .map_err(|e| ExpanderError::Navigation(e.to_string()))
    }

    async fn navigate_to(&self, url: &str, timeout: Duration) -> Result<()> {
        command(
            self.client
                .post(self.url("url")?)
                .timeout(timeout + COMMAND_SLACK)
                .json(&json!({ "url": url })),
        )
        .await
        .map(|_| ())
    }
}

#[async_trait]
impl NavigatorPage for WebDriverPage {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<()> {
        let page_load_millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        command(
            self.client
                .post(self.url("timeouts")?)
                .json(&json!({ "pageLoad": page_load_millis })),
        )
        .await?;

        self.navigate_to(url, timeout).await
    }

    async fn current_url(&mut self) -> Result<String> {
        let value = command(self.client.get(self.url("url")?)).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ExpanderError::Navigation("WebDriver returned no URL".to_string()))
    }

    async fn reset(&mut self) -> Result<()> {
        command(self.client.delete(self.url("cookie")?)).await?;
        self.navigate_to("about:blank", COMMAND_SLACK).await
    }

    async fn close(&mut self) -> Result<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;

        // DELETE /session/{id}, without the trailing slash
        let session = self.session_url.as_str().trim_end_matches('/');
        command(self.client.delete(session)).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use mockito::{Matcher, Server};

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_primary_language() {
        assert_eq!(primary_language("en-US,en;q=0.5"), "en-US");
        assert_eq!(primary_language("de"), "de");
        assert_eq!(primary_language(""), "en-US");
    }

    #[test]
    fn test_capabilities__carry_profile() {
        let profile = BrowserProfile {
            user_agent: "TestAgent/1.0".to_string(),
            viewport_width: 800,
            viewport_height: 600,
            ..Default::default()
        };
        let caps = WebDriverNavigator::capabilities(&profile);
        let args = caps["capabilities"]["alwaysMatch"]["goog:chromeOptions"]["args"]
            .as_array()
            .unwrap();

        assert!(args.contains(&json!("--user-agent=TestAgent/1.0")));
        assert!(args.contains(&json!("--window-size=800,600")));
        assert!(args.contains(&json!("--lang=en-US")));
    }

    #[test]
    fn test_new__rejects_invalid_endpoint() {
        assert!(WebDriverNavigator::new("not a url", &NetworkOptions::default()).is_err());
    }

    #[tokio::test]
    async fn test_session_lifecycle() -> TestResult {
        let mut server = Server::new_async().await;
        let new_session = server
            .mock("POST", "/wd/session")
            .match_body(Matcher::PartialJson(json!({
                "capabilities": { "alwaysMatch": { "browserName": "chrome" } }
            })))
            .with_status(200)
            .with_body(r#"{"value":{"sessionId":"s1","capabilities":{}}}"#)
            .create_async()
            .await;
        let timeouts = server
            .mock("POST", "/wd/session/s1/timeouts")
            .match_body(Matcher::Json(json!({ "pageLoad": 2000 })))
            .with_status(200)
            .with_body(r#"{"value":null}"#)
            .create_async()
            .await;
        let navigate = server
            .mock("POST", "/wd/session/s1/url")
            .match_body(Matcher::Json(json!({ "url": "https://sho.rt/abc" })))
            .with_status(200)
            .with_body(r#"{"value":null}"#)
            .create_async()
            .await;
        let current = server
            .mock("GET", "/wd/session/s1/url")
            .with_status(200)
            .with_body(r#"{"value":"https://example.com/final"}"#)
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/wd/session/s1")
            .with_status(200)
            .with_body(r#"{"value":null}"#)
            .expect(1)
            .create_async()
            .await;

        let navigator =
            WebDriverNavigator::new(&format!("{}/wd", server.url()), &NetworkOptions::default())?;
        let mut page = navigator.open_page(&BrowserProfile::default()).await?;
        page.goto("https://sho.rt/abc", Duration::from_secs(2)).await?;
        let actual = page.current_url().await?;
        page.close().await?;
        // Closing twice only deletes the session once
        page.close().await?;

        assert_eq!(actual, "https://example.com/final");
        new_session.assert_async().await;
        timeouts.assert_async().await;
        navigate.assert_async().await;
        current.assert_async().await;
        delete.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_navigation_error_is_reported() -> TestResult {
        let mut server = Server::new_async().await;
        let _session = server
            .mock("POST", "/session")
            .with_status(200)
            .with_body(r#"{"value":{"sessionId":"s2"}}"#)
            .create_async()
            .await;
        let _timeouts = server
            .mock("POST", "/session/s2/timeouts")
            .with_status(200)
            .with_body(r#"{"value":null}"#)
            .create_async()
            .await;
        let _navigate = server
            .mock("POST", "/session/s2/url")
            .with_status(500)
            .with_body(r#"{"value":{"error":"timeout","message":"page load timed out"}}"#)
            .create_async()
            .await;

        let navigator = WebDriverNavigator::new(&server.url(), &NetworkOptions::default())?;
        let mut page = navigator.open_page(&BrowserProfile::default()).await?;
        let err = page
            .goto("https://sho.rt/abc", Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, ExpanderError::Navigation(_)));
        assert!(err.to_string().contains("page load timed out"));
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_clears_cookies_and_blanks_page() -> TestResult {
        let mut server = Server::new_async().await;
        let _session = server
            .mock("POST", "/session")
            .with_status(200)
            .with_body(r#"{"value":{"sessionId":"s3"}}"#)
            .create_async()
            .await;
        let cookies = server
            .mock("DELETE", "/session/s3/cookie")
            .with_status(200)
            .with_body(r#"{"value":null}"#)
            .create_async()
            .await;
        let blank = server
            .mock("POST", "/session/s3/url")
            .match_body(Matcher::Json(json!({ "url": "about:blank" })))
            .with_status(200)
            .with_body(r#"{"value":null}"#)
            .create_async()
            .await;

        let navigator = WebDriverNavigator::new(&server.url(), &NetworkOptions::default())?;
        let mut page = navigator.open_page(&BrowserProfile::default()).await?;
        page.reset().await?;

        cookies.assert_async().await;
        blank.assert_async().await;
        Ok(())
    }
}
