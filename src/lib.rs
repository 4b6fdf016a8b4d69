//! Expand shortened URLs in text and Markdown documents.
//!
//! [`Expander`] finds bare and Markdown URLs, picks out the ones pointing at
//! known shortening services, resolves each to its destination and rewrites
//! the text, leaving every other byte untouched.
//!
//! ```no_run
//! use urlexpander::{ExpansionConfig, Expander};
//!
//! # async fn run() -> urlexpander::Result<()> {
//! let expander = Expander::new(ExpansionConfig::default())?;
//! let expanded = expander.process_text("see https://bit.ly/abc").await;
//! expander.close().await?;
//! # let _ = expanded;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod discovery;
pub mod expansion;
pub mod pipeline;
pub mod reporting;
pub mod rewrite;
pub mod ui;

// Re-export commonly used items
pub use config::{CliConfig, Config, ExpansionConfig};
pub use core::{ExpanderError, FileOutcome, OccurrenceKind, ResolutionOutcome, Result, UrlOccurrence};
pub use discovery::{Detect, ShortenerRegistry, UrlDetector, unique_urls};
pub use pipeline::{Expander, ExpanderBuilder, output_path_for};
pub use rewrite::rewrite;
