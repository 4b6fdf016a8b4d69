//! Expansion pipeline
//!
//! Composes detection, classification, batched resolution and rewriting,
//! and owns the file boundary.

pub mod expander;

// Re-export commonly used items
pub use expander::{Expander, ExpanderBuilder, output_path_for};
