use crate::config::{Config, ExpansionConfig};
use crate::core::types::{FileOutcome, ResolutionOutcome};
use log::{debug, error, info, warn};

/// Initialize the logger with appropriate level based on verbosity
pub fn init_logger(verbose: bool, quiet: bool) {
    let level = level_for(verbose, quiet);

    // A second initialisation (tests, embedding) keeps the first logger
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .try_init();

    debug!("Logger initialized with level: {level:?}");
}

fn level_for(verbose: bool, quiet: bool) -> log::LevelFilter {
    if quiet {
        log::LevelFilter::Off
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        // Resolution failures are warnings and stay visible by default
        log::LevelFilter::Warn
    }
}

/// Log configuration information
pub fn log_config_info(config: &Config, expansion: &ExpansionConfig) {
    info!(
        "Configuration: concurrency={}, timeout={}ms, retries={}, retry_delay={}ms",
        expansion.concurrency,
        expansion.timeout_millis,
        expansion.max_retries,
        expansion.retry_delay_millis
    );
    info!(
        "Navigation: {}",
        config
            .webdriver_url
            .as_deref()
            .map(|url| format!("webdriver at {url}"))
            .unwrap_or_else(|| "http".to_string())
    );
    info!(
        "HTTP: proxy={}, skip_ssl={}",
        config.proxy.as_deref().unwrap_or("none"),
        config.skip_ssl_verification.unwrap_or(false)
    );
}

/// Log what detection found in one text
pub fn log_detection(occurrences: usize, unique: usize, candidates: usize) {
    info!("Found {occurrences} URL occurrence(s), {unique} unique, {candidates} shortened");
}

/// Log one resolution outcome
pub fn log_expansion(outcome: &ResolutionOutcome) {
    if outcome.changes_url() {
        debug!("✓ {outcome}");
    } else if outcome.resolved {
        debug!("= {} (already final)", outcome.original_url);
    } else {
        debug!("✗ {outcome}");
    }
}

/// Log the outcome of processing one file
pub fn log_file_result(outcome: &FileOutcome) {
    match (&outcome.output_path, &outcome.error) {
        (Some(output), _) if outcome.success => info!(
            "Wrote {output} (from {})",
            outcome.input_path.as_deref().unwrap_or("?")
        ),
        (_, Some(message)) => warn!("File processing failed: {message}"),
        _ => warn!("File processing failed"),
    }
}

/// Log error information
pub fn log_error(message: &str, source: Option<&dyn std::error::Error>) {
    match source {
        Some(err) => error!("{message}: {err}"),
        None => error!("{message}"),
    }
}

/// Log warning information
pub fn log_warning(message: &str) {
    warn!("{message}");
}
