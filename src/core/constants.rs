/// Application-wide constants to avoid magic values throughout the codebase.
///
/// This module centralizes all magic strings, numbers, and other literal values
/// used across the application, making them easier to maintain and modify.
/// Output format constants
pub mod output_formats {
    /// Text output format - human readable, emoji-enhanced output
    pub const TEXT: &str = "text";
    /// JSON output format - structured output for automation
    pub const JSON: &str = "json";

    /// Default output format
    pub const DEFAULT: &str = TEXT;

    /// All valid output formats
    pub const ALL: [&str; 2] = [TEXT, JSON];
}

/// Timeout and duration constants
pub mod timeouts {
    /// Default navigation timeout in milliseconds
    pub const DEFAULT_TIMEOUT_MILLIS: u64 = 30_000;
    /// Default navigation timeout in seconds (CLI / config unit)
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = DEFAULT_TIMEOUT_MILLIS / 1000;
    /// Maximum reasonable timeout in seconds (1 hour)
    pub const MAX_TIMEOUT_SECONDS: u64 = 3600;
    /// Fixed timeout for the HEAD probe, independent of the navigation timeout
    pub const PROBE_TIMEOUT_MILLIS: u64 = 5_000;
    /// Grace period after navigation settles, for script-driven redirects
    pub const SETTLE_GRACE_MILLIS: u64 = 1_000;
    /// Backoff step; the delay before retry `n` is `n * step`
    pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;
}

/// Default configuration values
pub mod defaults {
    /// Default number of resolutions in flight at once
    pub const CONCURRENCY: usize = 5;
    /// Default number of additional attempts after the first one fails
    pub const MAX_RETRIES: u32 = 2;
    /// Upper bound accepted for retries
    pub const MAX_RETRIES_LIMIT: u32 = 20;
    /// Upper bound accepted for concurrency
    pub const MAX_CONCURRENCY: usize = 256;
    /// Concurrency above which the CLI warns about resource usage
    pub const HIGH_CONCURRENCY_WARNING: usize = 50;
    /// Suffix inserted before the extension of generated output files
    pub const OUTPUT_SUFFIX: &str = "_expanded";
}

/// Browser profile used by the navigation tier
pub mod browser {
    /// Desktop Chrome user agent
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
    /// Accept header sent with navigations
    pub const ACCEPT: &str =
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
    /// Accept-Language header sent with navigations
    pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";
    /// Viewport width in pixels
    pub const VIEWPORT_WIDTH: u32 = 1280;
    /// Viewport height in pixels
    pub const VIEWPORT_HEIGHT: u32 = 800;
    /// HTTP redirects followed by the HTTP navigator
    pub const MAX_HTTP_REDIRECTS: usize = 10;
    /// Client-side (meta refresh / script) redirects followed by the HTTP navigator
    pub const MAX_CLIENT_REDIRECTS: usize = 3;
    /// Bytes of a page body inspected for client-side redirects
    pub const MAX_INSPECTED_BODY_BYTES: usize = 256 * 1024;
}

/// Error message constants
pub mod error_messages {
    /// Navigation exceeded its deadline
    pub const NAVIGATION_TIMED_OUT: &str = "navigation timed out";
    /// Navigator pool was shut down
    pub const POOL_CLOSED: &str = "navigator pool is closed";
    /// Unknown error fallback
    pub const UNKNOWN_ERROR: &str = "Unknown error";
}

/// Config file constants
pub mod files {
    /// Config file looked up in the working directory and its parents
    pub const CONFIG_FILE_NAME: &str = ".urlexpander.toml";
    /// Parent directories searched for a config file
    pub const CONFIG_SEARCH_DEPTH: usize = 3;
}

/// Display and formatting constants
pub mod display {
    /// Emoji for success status
    pub const SUCCESS_EMOJI: &str = "✅";
    /// Emoji for warning status
    pub const WARNING_EMOJI: &str = "⚠️";
    /// Emoji for error status
    pub const ERROR_EMOJI: &str = "❌";
    /// Emoji for an expanded URL
    pub const EXPANDED_EMOJI: &str = "🔗";
}
