//! Core types and foundational components
//!
//! This module contains the fundamental data types, error handling,
//! and constants used throughout the application.

pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items for convenience
pub use error::{ExpanderError, Result};
pub use types::{FileOutcome, OccurrenceKind, ResolutionOutcome, UrlOccurrence};
