use futures::future::join_all;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

use crate::core::types::ResolutionOutcome;
use crate::discovery::ShortenerRegistry;
use crate::expansion::resolver::Resolve;
use crate::ui::progress::ProgressReporter;

/// Resolves candidate URLs in windows of `concurrency`.
///
/// Every resolution in a window runs concurrently and the next window only
/// starts once the whole current one is done, so no more than `concurrency`
/// resolutions are ever in flight. The outcome map is filled between windows.
pub struct BatchScheduler {
    resolver: Arc<dyn Resolve>,
    registry: Arc<ShortenerRegistry>,
    concurrency: usize,
}

impl BatchScheduler {
    pub fn new(
        resolver: Arc<dyn Resolve>,
        registry: Arc<ShortenerRegistry>,
        concurrency: usize,
    ) -> Self {
        Self {
            resolver,
            registry,
            concurrency: concurrency.max(1),
        }
    }

    /// Outcome for every distinct URL in `urls`. URLs the registry does not
    /// classify as shortened come back unresolved without touching the network.
    pub async fn resolve_all(
        &self,
        urls: &[String],
        progress: Option<&ProgressReporter>,
    ) -> FxHashMap<String, ResolutionOutcome> {
        let mut outcomes =
            FxHashMap::with_capacity_and_hasher(urls.len(), Default::default());

        let mut seen = FxHashSet::default();
        let mut candidates = Vec::with_capacity(urls.len());
        for url in urls {
            if !seen.insert(url.as_str()) {
                continue;
            }
            if self.registry.is_shortened(url) {
                candidates.push(url.as_str());
            } else {
                log::debug!("Not a shortener, leaving as is: {url}");
                outcomes.insert(url.clone(), ResolutionOutcome::unresolved(url));
            }
        }

        if let Some(progress) = progress {
            progress.start_resolution(candidates.len());
        }

        for window in candidates.chunks(self.concurrency) {
            let resolved = join_all(window.iter().map(|url| self.resolver.resolve(url))).await;

            if let Some(progress) = progress {
                progress.advance(resolved.len());
            }
            for outcome in resolved {
                outcomes.insert(outcome.original_url.clone(), outcome);
            }
        }

        if let Some(progress) = progress {
            progress.finish_resolution();
        }

        outcomes
    }
}
