//! URL expansion
//!
//! Two resolution tiers (a redirect probe and a page navigator), the pool
//! that bounds navigator pages, the per-URL retry state machine and the
//! windowed batch scheduler on top of them.

pub mod batch;
pub mod navigator;
pub mod pool;
pub mod probe;
pub mod resolver;
pub mod webdriver;

// Re-export commonly used items
pub use batch::BatchScheduler;
pub use navigator::{BrowserProfile, HttpNavigator, NavigatorPage, PageNavigator};
pub use pool::{Navigate, NavigatorPool};
pub use probe::{HttpProbe, NetworkOptions, RedirectProbe};
pub use resolver::{RedirectResolver, Resolve, ResolutionState, RetryDecision, RetryPolicy};
pub use webdriver::WebDriverNavigator;
