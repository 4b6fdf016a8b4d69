use clap::{CommandFactory, Parser};
use urlexpander::config::{CliConfig, Config};
use urlexpander::core::types::FileOutcome;
use urlexpander::pipeline::{Expander, output_path_for};
use urlexpander::reporting::logging;
use urlexpander::ui::completion::print_completions;
use urlexpander::ui::output;
use urlexpander::ui::{Cli, Commands, ProgressReporter, cli_to_config};

use std::path::{Path, PathBuf};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Handle completion commands first
    if let Some(Commands::CompletionGenerate { shell }) = cli.command {
        let mut app = Cli::command();
        print_completions(shell, &mut app);
        std::process::exit(0);
    }

    // Validate that files are provided when not using completions
    if cli.files.is_empty() {
        eprintln!("Error: No files provided");
        eprintln!("\nFor more information, try '--help'.");
        std::process::exit(1);
    }

    match run_urlexpander_logic(&cli).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Expand every input file with one shared engine and report the outcomes
pub async fn run_urlexpander_logic(cli: &Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let cli_config = cli_to_config(cli);
    let config = load_and_merge_config(&cli_config)?;
    config.validate()?;

    let quiet = cli_config.quiet;
    logging::init_logger(config.verbose.unwrap_or(false), quiet);
    for warning in config.warnings() {
        logging::log_warning(&warning);
    }

    let jobs = plan_outputs(&cli.files, cli_config.output.as_deref(), config.output_suffix())?;
    logging::log_config_info(&config, &config.expansion_config()?);

    let progress = Arc::new(ProgressReporter::new(ProgressReporter::should_enable(
        quiet,
        cli_config.no_progress,
    )));
    let expander = Expander::builder_from_config(&config)?
        .progress(progress.clone())
        .build()?;

    progress.start_files(jobs.len());
    let mut outcomes: Vec<FileOutcome> = Vec::with_capacity(jobs.len());
    for (input, output) in &jobs {
        outcomes.push(expander.process_file(input, output).await);
        progress.file_done();
    }
    progress.finish_files();
    progress.finish_and_clear();

    // Release the navigator even when some files failed
    if let Err(e) = expander.close().await {
        logging::log_error("Failed to release navigator", Some(&e));
    }

    output::display_results(&outcomes, config.output_format(), quiet)?;

    Ok(exit_code(&outcomes))
}

/// Load configuration from file or standard locations and merge with CLI config
pub fn load_and_merge_config(cli_config: &CliConfig) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if cli_config.no_config {
        Config::default()
    } else if let Some(ref config_file) = cli_config.config_file {
        Config::load_from_file(config_file).inspect_err(|e| {
            logging::log_error(
                &format!("Could not load config file '{config_file}'"),
                Some(e),
            );
        })?
    } else {
        Config::load_from_standard_locations()
    };

    // Merge CLI arguments with configuration (CLI takes precedence)
    config.merge_with_cli(cli_config);
    Ok(config)
}

/// Pair every input with the path its expansion is written to
pub fn plan_outputs(
    files: &[String],
    output: Option<&str>,
    suffix: &str,
) -> Result<Vec<(PathBuf, PathBuf)>, Box<dyn std::error::Error>> {
    match output {
        Some(output) if files.len() != 1 => Err(format!(
            "--output '{output}' needs exactly one input file, got {}",
            files.len()
        )
        .into()),
        Some(output) => Ok(vec![(PathBuf::from(&files[0]), PathBuf::from(output))]),
        None => Ok(files
            .iter()
            .map(|file| {
                let input = PathBuf::from(file);
                let output = output_path_for(Path::new(file), suffix);
                (input, output)
            })
            .collect()),
    }
}

/// 0 when every file was expanded, 1 otherwise
pub fn exit_code(outcomes: &[FileOutcome]) -> i32 {
    if outcomes.iter().all(|outcome| outcome.success) {
        0
    } else {
        1
    }
}
