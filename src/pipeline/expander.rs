use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{Config, ExpansionConfig};
use crate::core::error::{ExpanderError, Result};
use crate::core::types::FileOutcome;
use crate::discovery::{Detect, ShortenerRegistry, UrlDetector, unique_urls};
use crate::expansion::{
    BatchScheduler, BrowserProfile, HttpNavigator, HttpProbe, NavigatorPool, NetworkOptions,
    PageNavigator, RedirectProbe, RedirectResolver, Resolve, RetryPolicy, WebDriverNavigator,
};
use crate::reporting::logging;
use crate::rewrite::rewrite;
use crate::ui::progress::ProgressReporter;

/// Assembles an [`Expander`]. Every collaborator has a default; tests and
/// embedders swap in their own.
pub struct ExpanderBuilder {
    config: ExpansionConfig,
    registry: ShortenerRegistry,
    network: NetworkOptions,
    profile: BrowserProfile,
    probe: Option<Arc<dyn RedirectProbe>>,
    navigator: Option<Arc<dyn PageNavigator>>,
    resolver: Option<Arc<dyn Resolve>>,
    progress: Option<Arc<ProgressReporter>>,
}

impl ExpanderBuilder {
    pub fn new(config: ExpansionConfig) -> Self {
        Self {
            config,
            registry: ShortenerRegistry::default(),
            network: NetworkOptions::default(),
            profile: BrowserProfile::default(),
            probe: None,
            navigator: None,
            resolver: None,
            progress: None,
        }
    }

    pub fn registry(mut self, registry: ShortenerRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn network(mut self, network: NetworkOptions) -> Self {
        self.network = network;
        self
    }

    pub fn profile(mut self, profile: BrowserProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn probe(mut self, probe: Arc<dyn RedirectProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn PageNavigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Replace the whole probe/navigate/retry stack.
    pub fn resolver(mut self, resolver: Arc<dyn Resolve>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn progress(mut self, progress: Arc<ProgressReporter>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn build(self) -> Result<Expander> {
        self.config.validate()?;

        let (resolver, pool) = match self.resolver {
            Some(resolver) => (resolver, None),
            None => {
                let probe: Arc<dyn RedirectProbe> = match self.probe {
                    Some(probe) => probe,
                    None => Arc::new(HttpProbe::new(&self.network)?),
                };
                let navigator: Arc<dyn PageNavigator> = match self.navigator {
                    Some(navigator) => navigator,
                    None => Arc::new(HttpNavigator::new(self.network.clone())),
                };
                let pool = Arc::new(NavigatorPool::new(
                    navigator,
                    self.profile,
                    self.config.concurrency,
                    self.config.timeout(),
                ));
                let resolver: Arc<dyn Resolve> = Arc::new(RedirectResolver::new(
                    probe,
                    pool.clone(),
                    RetryPolicy::from(&self.config),
                ));
                (resolver, Some(pool))
            }
        };

        let registry = Arc::new(self.registry);
        let scheduler = BatchScheduler::new(resolver, registry.clone(), self.config.concurrency);

        Ok(Expander {
            config: self.config,
            detector: UrlDetector::default(),
            registry,
            scheduler,
            pool,
            progress: self.progress,
        })
    }
}

/// The expansion engine: detect, classify, resolve, rewrite.
///
/// Navigator pages are opened on first use. Call [`Expander::close`] once
/// all work is done to release them.
pub struct Expander {
    config: ExpansionConfig,
    detector: UrlDetector,
    registry: Arc<ShortenerRegistry>,
    scheduler: BatchScheduler,
    pool: Option<Arc<NavigatorPool>>,
    progress: Option<Arc<ProgressReporter>>,
}

impl Expander {
    pub fn builder(config: ExpansionConfig) -> ExpanderBuilder {
        ExpanderBuilder::new(config)
    }

    pub fn new(config: ExpansionConfig) -> Result<Self> {
        ExpanderBuilder::new(config).build()
    }

    /// Engine configured from a merged [`Config`].
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::builder_from_config(config)?.build()
    }

    /// Builder preloaded from `config`, for callers that add a progress
    /// reporter or other collaborators on top.
    pub fn builder_from_config(config: &Config) -> Result<ExpanderBuilder> {
        let expansion = config.expansion_config()?;
        let network = NetworkOptions {
            proxy: config.proxy.clone(),
            skip_ssl_verification: config.skip_ssl_verification.unwrap_or(false),
        };

        let defaults = BrowserProfile::default();
        let (viewport_width, viewport_height) = config.viewport();
        let profile = BrowserProfile {
            user_agent: config.user_agent.clone().unwrap_or(defaults.user_agent),
            accept_language: config
                .accept_language
                .clone()
                .unwrap_or(defaults.accept_language),
            viewport_width,
            viewport_height,
            ..defaults
        };

        let registry =
            ShortenerRegistry::with_extra(config.shorteners.iter().flatten().map(String::as_str));

        let mut builder = ExpanderBuilder::new(expansion)
            .registry(registry)
            .profile(profile)
            .network(network.clone());

        if let Some(ref endpoint) = config.webdriver_url {
            builder = builder.navigator(Arc::new(WebDriverNavigator::new(endpoint, &network)?));
        }

        Ok(builder)
    }

    pub fn config(&self) -> &ExpansionConfig {
        &self.config
    }

    pub fn registry(&self) -> &ShortenerRegistry {
        &self.registry
    }

    /// Expand every shortened URL in `text`. Text without shortened URLs
    /// comes back unchanged, without any network activity.
    pub async fn process_text(&self, text: &str) -> String {
        let occurrences = self.detector.detect(text);
        if occurrences.is_empty() {
            return text.to_string();
        }

        let urls = unique_urls(&occurrences);
        let candidates: Vec<String> = urls
            .iter()
            .filter(|url| self.registry.is_shortened(url))
            .cloned()
            .collect();
        logging::log_detection(occurrences.len(), urls.len(), candidates.len());

        if candidates.is_empty() {
            return text.to_string();
        }

        let outcomes = self
            .scheduler
            .resolve_all(&candidates, self.progress.as_deref())
            .await;
        for url in &candidates {
            if let Some(outcome) = outcomes.get(url) {
                logging::log_expansion(outcome);
            }
        }

        rewrite(text, &occurrences, &outcomes)
    }

    /// Read `input`, expand it and write the result to `output`.
    ///
    /// Never fails: problems are reported in the returned [`FileOutcome`].
    pub async fn process_file(&self, input: &Path, output: &Path) -> FileOutcome {
        let outcome = match self.try_process_file(input, output).await {
            Ok(()) => FileOutcome::success(input, output),
            Err(e) => FileOutcome::failure(e.to_string()),
        };
        logging::log_file_result(&outcome);
        outcome
    }

    async fn try_process_file(&self, input: &Path, output: &Path) -> Result<()> {
        let text = tokio::fs::read_to_string(input).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExpanderError::FileNotFound(input.display().to_string())
            } else {
                ExpanderError::file(input, e)
            }
        })?;

        let expanded = self.process_text(&text).await;
        write_atomically(output, &expanded).await
    }

    /// Release navigator pages and the navigator itself. Idempotent.
    pub async fn close(&self) -> Result<()> {
        match self.pool {
            Some(ref pool) => pool.close().await,
            None => Ok(()),
        }
    }
}

/// `<stem><suffix><.ext>` next to `input`.
pub fn output_path_for(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match input.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    input.with_file_name(file_name)
}

/// Write through a temporary sibling and rename, so `path` never holds a
/// partial result.
async fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            ExpanderError::InvalidArgument(format!("output path '{}' has no file name", path.display()))
        })?;
    let tmp = path.with_file_name(format!(".{file_name}.{}.tmp", std::process::id()));

    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|e| ExpanderError::file(&tmp, e))?;

    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(ExpanderError::file(path, e));
    }
    Ok(())
}
