// Command-line interface definitions and parsing for urlexpander

use crate::config::CliConfig;
use crate::core::constants::output_formats;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Text or Markdown files to expand
    pub files: Vec<String>,

    // Core Options
    /// Concurrent resolutions (default: 5)
    #[arg(short = 'c', long, value_name = "COUNT", help_heading = "Core Options")]
    pub concurrency: Option<usize>,

    /// Navigation timeout in seconds (default: 30)
    #[arg(
        short = 't',
        long,
        value_name = "SECONDS",
        help_heading = "Core Options"
    )]
    pub timeout: Option<u64>,

    /// Retries after a failed resolution (default: 2)
    #[arg(short = 'r', long, value_name = "COUNT", help_heading = "Core Options")]
    pub retries: Option<u32>,

    /// Backoff step between retries in ms (default: 1000)
    #[arg(long, value_name = "MS", help_heading = "Core Options")]
    pub retry_delay: Option<u64>,

    // Output
    /// Output file (only with a single input file)
    #[arg(short = 'o', long, value_name = "FILE", help_heading = "Output")]
    pub output: Option<String>,

    /// Suffix appended to the input file name (default: _expanded)
    #[arg(long, value_name = "SUFFIX", help_heading = "Output")]
    pub suffix: Option<String>,

    /// Output format
    #[arg(long, value_name = "FORMAT", value_parser = output_formats::ALL, default_value = output_formats::DEFAULT, help_heading = "Output")]
    pub format: String,

    /// Suppress all output except errors
    #[arg(short = 'q', long, help_heading = "Output")]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long, help_heading = "Output")]
    pub verbose: bool,

    /// Disable progress bars
    #[arg(long, help_heading = "Output")]
    pub no_progress: bool,

    // Navigation
    /// User-Agent presented while navigating
    #[arg(long, value_name = "AGENT", help_heading = "Navigation")]
    pub user_agent: Option<String>,

    /// WebDriver endpoint for browser navigation (e.g. http://localhost:9515)
    #[arg(long, value_name = "URL", help_heading = "Navigation")]
    pub webdriver: Option<String>,

    /// Additional shortener hostname (repeatable)
    #[arg(long = "shortener", value_name = "HOST", help_heading = "Navigation")]
    pub shorteners: Vec<String>,

    // Network & Security
    /// HTTP/HTTPS proxy URL
    #[arg(long, value_name = "URL", help_heading = "Network & Security")]
    pub proxy: Option<String>,

    /// Skip SSL certificate verification
    #[arg(long, help_heading = "Network & Security")]
    pub insecure: bool,

    // Configuration
    /// Use specific config file
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Ignore config files
    #[arg(long, help_heading = "Configuration")]
    pub no_config: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate shell completions
    #[command(name = "completion-generate", arg_required_else_help = true)]
    CompletionGenerate {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Convert derive-based CLI arguments directly to CliConfig structure
pub fn cli_to_config(cli: &Cli) -> CliConfig {
    CliConfig {
        // Engine
        concurrency: cli.concurrency,
        timeout: cli.timeout,
        retries: cli.retries,
        retry_delay: cli.retry_delay,

        // Navigation
        user_agent: cli.user_agent.clone(),
        webdriver_url: cli.webdriver.clone(),
        shorteners: cli
            .shorteners
            .iter()
            .map(|host| host.trim().to_string())
            .filter(|host| !host.is_empty())
            .collect(),

        // Network & security
        proxy: cli.proxy.clone(),
        skip_ssl_verification: cli.insecure,

        // Output
        output: cli.output.clone(),
        output_suffix: cli.suffix.clone(),
        output_format: Some(cli.format.clone()),
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_progress: cli.no_progress,

        // Configuration
        config_file: cli.config.clone(),
        no_config: cli.no_config,
    }
}
