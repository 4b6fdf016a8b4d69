use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::{sleep, timeout};

use crate::core::constants::timeouts;
use crate::core::error::{ExpanderError, Result};
use crate::expansion::navigator::{BrowserProfile, NavigatorPage, PageNavigator};

/// Navigation tier as seen by the resolver: URL in, final URL out.
#[async_trait]
pub trait Navigate: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<String>;
}

/// Fixed-size pool of navigator pages.
///
/// At most `size` pages exist and each is checked out by exactly one caller.
/// Pages are opened lazily, reset when handed back and discarded when the
/// reset fails. [`NavigatorPool::close`] must be called once all work is done.
pub struct NavigatorPool {
    navigator: Arc<dyn PageNavigator>,
    profile: BrowserProfile,
    slots: Semaphore,
    idle: Mutex<Vec<Box<dyn NavigatorPage>>>,
    timeout: Duration,
    settle_grace: Duration,
    closed: AtomicBool,
}

impl NavigatorPool {
    pub fn new(
        navigator: Arc<dyn PageNavigator>,
        profile: BrowserProfile,
        size: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            navigator,
            profile,
            slots: Semaphore::new(size.max(1)),
            idle: Mutex::new(Vec::new()),
            timeout,
            settle_grace: Duration::from_millis(timeouts::SETTLE_GRACE_MILLIS),
            closed: AtomicBool::new(false),
        }
    }

    pub fn with_settle_grace(mut self, settle_grace: Duration) -> Self {
        self.settle_grace = settle_grace;
        self
    }

    /// Pages currently waiting for a caller.
    pub fn idle_pages(&self) -> usize {
        self.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    async fn checkout(&self) -> Result<Box<dyn NavigatorPage>> {
        let reused = self.idle.lock().ok().and_then(|mut idle| idle.pop());
        match reused {
            Some(page) => Ok(page),
            None => self.navigator.open_page(&self.profile).await,
        }
    }

    async fn checkin(&self, mut page: Box<dyn NavigatorPage>, healthy: bool) {
        if healthy && !self.is_closed() {
            match page.reset().await {
                Ok(()) => {
                    if let Ok(mut idle) = self.idle.lock() {
                        idle.push(page);
                        return;
                    }
                }
                Err(e) => log::debug!("Discarding page that failed to reset: {e}"),
            }
        }

        if let Err(e) = page.close().await {
            log::debug!("Failed to close page: {e}");
        }
    }

    async fn drive(&self, page: &mut dyn NavigatorPage, url: &str) -> Result<String> {
        match timeout(self.timeout, page.goto(url, self.timeout)).await {
            Ok(result) => result?,
            Err(_) => return Err(ExpanderError::NavigationTimeout(self.timeout)),
        }

        // Let script-driven redirects run after the page settled
        sleep(self.settle_grace).await;
        page.current_url().await
    }

    /// Close every idle page and shut the navigator down. Safe to call more
    /// than once, and when no page was ever opened.
    pub async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.slots.close();

        let pages: Vec<Box<dyn NavigatorPage>> = self
            .idle
            .lock()
            .map(|mut idle| idle.drain(..).collect())
            .unwrap_or_default();

        for mut page in pages {
            if let Err(e) = page.close().await {
                log::warn!("Failed to close page during shutdown: {e}");
            }
        }

        self.navigator.shutdown().await
    }
}

#[async_trait]
impl Navigate for NavigatorPool {
    async fn navigate(&self, url: &str) -> Result<String> {
        let _permit = self
            .slots
            .acquire()
            .await
            .map_err(|_| ExpanderError::PoolClosed)?;

        let mut page = self.checkout().await?;
        let result = self.drive(page.as_mut(), url).await;
        self.checkin(page, result.is_ok()).await;

        result.map_err(|e| match e {
            e if e.is_navigation() => e,
            other => ExpanderError::Navigation(other.to_string()),
        })
    }
}
