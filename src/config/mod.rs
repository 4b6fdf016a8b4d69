//! Configuration management
//!
//! This module handles loading and managing configuration from
//! TOML files and CLI arguments, and derives the immutable
//! [`ExpansionConfig`] the engine is built from.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::constants::{browser, defaults, files, output_formats, timeouts};
use crate::core::error::{ExpanderError, Result};

/// Engine parameters, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionConfig {
    /// Resolutions in flight at once (>= 1)
    pub concurrency: usize,
    /// Navigation timeout in milliseconds (> 0)
    pub timeout_millis: u64,
    /// Additional attempts after the first failure
    pub max_retries: u32,
    /// Backoff step in milliseconds; retry `n` waits `n * step`
    pub retry_delay_millis: u64,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            concurrency: defaults::CONCURRENCY,
            timeout_millis: timeouts::DEFAULT_TIMEOUT_MILLIS,
            max_retries: defaults::MAX_RETRIES,
            retry_delay_millis: timeouts::DEFAULT_RETRY_DELAY_MS,
        }
    }
}

impl ExpansionConfig {
    pub fn new(concurrency: usize, timeout_millis: u64, max_retries: u32) -> Result<Self> {
        let config = Self {
            concurrency,
            timeout_millis,
            max_retries,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_retry_delay(mut self, retry_delay_millis: u64) -> Self {
        self.retry_delay_millis = retry_delay_millis;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_millis)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_millis)
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(ExpanderError::Config(
                "Concurrency cannot be 0. Expected a positive integer.".to_string(),
            ));
        }
        if self.timeout_millis == 0 {
            return Err(ExpanderError::Config(
                "Timeout cannot be 0. Expected a positive number of milliseconds.".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of concurrent URL resolutions
    pub concurrency: Option<usize>,

    /// Navigation timeout in seconds
    pub timeout: Option<u64>,

    /// Retry attempts after a failed resolution
    pub retries: Option<u32>,

    /// Backoff step between retries in milliseconds
    pub retry_delay: Option<u64>,

    /// User-Agent sent by the navigation tier
    pub user_agent: Option<String>,

    /// Accept-Language sent by the navigation tier
    pub accept_language: Option<String>,

    /// Viewport width for browser navigation
    pub viewport_width: Option<u32>,

    /// Viewport height for browser navigation
    pub viewport_height: Option<u32>,

    /// WebDriver endpoint; when set, navigation runs in a real browser
    pub webdriver_url: Option<String>,

    /// Extra shortener hostnames on top of the built-in registry
    pub shorteners: Option<Vec<String>>,

    /// HTTP/HTTPS proxy URL
    pub proxy: Option<String>,

    /// Skip SSL certificate verification
    pub skip_ssl_verification: Option<bool>,

    /// Suffix for generated output files
    pub output_suffix: Option<String>,

    /// Output format (text, json)
    pub output_format: Option<String>,

    /// Enable verbose logging
    pub verbose: Option<bool>,
}

impl Config {
    /// Load configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ExpanderError::Config(format!(
                "Could not read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            ExpanderError::Config(format!(
                "Invalid TOML in config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Try to find and load a config file in standard locations
    pub fn load_from_standard_locations() -> Self {
        Self::standard_locations()
            .into_iter()
            .find(|path| path.is_file())
            .and_then(|path| {
                Self::load_from_file(&path)
                    .inspect_err(|e| log::warn!("Ignoring config file '{}': {e}", path.display()))
                    .ok()
            })
            .unwrap_or_default()
    }

    fn standard_locations() -> Vec<PathBuf> {
        (0..=files::CONFIG_SEARCH_DEPTH)
            .map(|depth| PathBuf::from(format!("{}{}", "../".repeat(depth), files::CONFIG_FILE_NAME)))
            .collect()
    }

    /// Merge this config with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli_config: &CliConfig) {
        // Engine
        if let Some(concurrency) = cli_config.concurrency {
            self.concurrency = Some(concurrency);
        }
        if let Some(timeout) = cli_config.timeout {
            self.timeout = Some(timeout);
        }
        if let Some(retries) = cli_config.retries {
            self.retries = Some(retries);
        }
        if let Some(retry_delay) = cli_config.retry_delay {
            self.retry_delay = Some(retry_delay);
        }

        // Navigation
        if let Some(ref user_agent) = cli_config.user_agent {
            self.user_agent = Some(user_agent.clone());
        }
        if let Some(ref webdriver_url) = cli_config.webdriver_url {
            self.webdriver_url = Some(webdriver_url.clone());
        }
        if !cli_config.shorteners.is_empty() {
            let mut shorteners = self.shorteners.take().unwrap_or_default();
            shorteners.extend(cli_config.shorteners.iter().cloned());
            self.shorteners = Some(shorteners);
        }

        // Network & security
        if let Some(ref proxy) = cli_config.proxy {
            self.proxy = Some(proxy.clone());
        }
        if cli_config.skip_ssl_verification {
            self.skip_ssl_verification = Some(true);
        }

        // Output
        if let Some(ref suffix) = cli_config.output_suffix {
            self.output_suffix = Some(suffix.clone());
        }
        if let Some(ref output_format) = cli_config.output_format {
            self.output_format = Some(output_format.clone());
        }
        if cli_config.verbose {
            self.verbose = Some(true);
        }
    }

    /// The immutable engine parameters described by this config
    pub fn expansion_config(&self) -> Result<ExpansionConfig> {
        let timeout_seconds = self.timeout.unwrap_or(timeouts::DEFAULT_TIMEOUT_SECONDS);
        let config = ExpansionConfig {
            concurrency: self.concurrency.unwrap_or(defaults::CONCURRENCY),
            timeout_millis: timeout_seconds.saturating_mul(1000),
            max_retries: self.retries.unwrap_or(defaults::MAX_RETRIES),
            retry_delay_millis: self.retry_delay.unwrap_or(timeouts::DEFAULT_RETRY_DELAY_MS),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn output_suffix(&self) -> &str {
        self.output_suffix
            .as_deref()
            .unwrap_or(defaults::OUTPUT_SUFFIX)
    }

    pub fn output_format(&self) -> &str {
        self.output_format
            .as_deref()
            .unwrap_or(output_formats::DEFAULT)
    }

    pub fn viewport(&self) -> (u32, u32) {
        (
            self.viewport_width.unwrap_or(browser::VIEWPORT_WIDTH),
            self.viewport_height.unwrap_or(browser::VIEWPORT_HEIGHT),
        )
    }

    /// Settings that are valid but likely to cause trouble
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Some(concurrency) = self.concurrency
            && concurrency > defaults::HIGH_CONCURRENCY_WARNING
        {
            warnings.push(format!(
                "Concurrency of {concurrency} opens as many navigator pages at once. Consider using a smaller value."
            ));
        }
        warnings
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if let Some(concurrency) = self.concurrency {
            if concurrency == 0 {
                return Err(ExpanderError::Config(
                    "Concurrency cannot be 0. Expected a positive integer.".to_string(),
                ));
            }
            if concurrency > defaults::MAX_CONCURRENCY {
                return Err(ExpanderError::Config(format!(
                    "Concurrency of {concurrency} is extremely high. Expected at most {}.",
                    defaults::MAX_CONCURRENCY
                )));
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err(ExpanderError::Config(
                    "Timeout cannot be 0. Expected a positive integer representing seconds."
                        .to_string(),
                ));
            }
            if timeout > timeouts::MAX_TIMEOUT_SECONDS {
                return Err(ExpanderError::Config(format!(
                    "Timeout of {timeout} seconds is extremely large (>1 hour). Consider using a smaller value."
                )));
            }
        }

        if let Some(retries) = self.retries
            && retries > defaults::MAX_RETRIES_LIMIT
        {
            return Err(ExpanderError::Config(format!(
                "Retry attempts of {retries} is very high and may cause long delays. Consider using a smaller value."
            )));
        }

        for (name, dimension) in [
            ("width", self.viewport_width),
            ("height", self.viewport_height),
        ] {
            if dimension == Some(0) {
                return Err(ExpanderError::Config(format!(
                    "Viewport {name} cannot be 0. Expected a positive number of pixels."
                )));
            }
        }

        if let Some(ref suffix) = self.output_suffix
            && suffix.is_empty()
        {
            return Err(ExpanderError::Config(
                "Output suffix cannot be empty; it would overwrite the input file.".to_string(),
            ));
        }

        if let Some(ref format) = self.output_format
            && !output_formats::ALL.contains(&format.as_str())
        {
            return Err(ExpanderError::Config(format!(
                "Invalid output format '{format}'. Expected one of: {}.",
                output_formats::ALL.join(", ")
            )));
        }

        if let Some(ref url) = self.webdriver_url
            && reqwest::Url::parse(url).is_err()
        {
            return Err(ExpanderError::Config(format!(
                "WebDriver URL '{url}' is not a valid URL."
            )));
        }

        Ok(())
    }
}

/// Configuration options that can come from CLI
#[derive(Debug, Default)]
pub struct CliConfig {
    // Engine
    pub concurrency: Option<usize>, // --concurrency
    pub timeout: Option<u64>,       // --timeout
    pub retries: Option<u32>,       // --retries
    pub retry_delay: Option<u64>,   // --retry-delay

    // Navigation
    pub user_agent: Option<String>,    // --user-agent
    pub webdriver_url: Option<String>, // --webdriver
    pub shorteners: Vec<String>,       // --shortener

    // Network & security
    pub proxy: Option<String>,       // --proxy
    pub skip_ssl_verification: bool, // --insecure

    // Output
    pub output: Option<String>,        // --output
    pub output_suffix: Option<String>, // --suffix
    pub output_format: Option<String>, // --format
    pub quiet: bool,                   // --quiet
    pub verbose: bool,                 // --verbose
    pub no_progress: bool,             // --no-progress

    // Configuration
    pub config_file: Option<String>, // --config
    pub no_config: bool,             // --no-config
}
