//! URL discovery
//!
//! This module finds URL occurrences in text and decides which of
//! them point at URL-shortening services.

pub mod detector;
pub mod shorteners;

// Re-export commonly used items
pub use detector::{Detect, UrlDetector, unique_urls};
pub use shorteners::ShortenerRegistry;
