use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::sync::Mutex;
use std::time::Duration;

const FILE_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files expanded";
const URL_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.yellow/red}] {pos}/{len} URLs resolved ({eta})";

pub struct ProgressReporter {
    multi_progress: MultiProgress,
    file_progress: Mutex<Option<ProgressBar>>,
    url_progress: Mutex<Option<ProgressBar>>,
    enabled: bool,
}

impl ProgressReporter {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            file_progress: Mutex::new(None),
            url_progress: Mutex::new(None),
            enabled,
        }
    }

    /// Progress bars only go to an interactive stderr.
    pub fn should_enable(quiet: bool, no_progress: bool) -> bool {
        !quiet && !no_progress && std::io::stderr().is_terminal()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn bar(&self, total: usize, template: &str) -> ProgressBar {
        let pb = self.multi_progress.add(ProgressBar::new(total as u64));
        pb.set_style(
            ProgressStyle::default_bar()
                .template(template)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    }

    pub fn start_files(&self, total_files: usize) {
        if !self.enabled {
            return;
        }
        if let Ok(mut slot) = self.file_progress.lock() {
            *slot = Some(self.bar(total_files, FILE_TEMPLATE));
        }
    }

    pub fn file_done(&self) {
        if let Ok(slot) = self.file_progress.lock()
            && let Some(ref pb) = *slot
        {
            pb.inc(1);
        }
    }

    pub fn finish_files(&self) {
        if let Ok(mut slot) = self.file_progress.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_with_message("✓ All files processed");
        }
    }

    /// New URL bar for the current file; replaces the previous one.
    pub fn start_resolution(&self, total_urls: usize) {
        if !self.enabled {
            return;
        }
        let pb = self.bar(total_urls, URL_TEMPLATE);
        pb.enable_steady_tick(Duration::from_millis(120));
        if let Ok(mut slot) = self.url_progress.lock()
            && let Some(previous) = slot.replace(pb)
        {
            previous.finish_and_clear();
        }
    }

    pub fn advance(&self, resolved: usize) {
        if let Ok(slot) = self.url_progress.lock()
            && let Some(ref pb) = *slot
        {
            pb.inc(resolved as u64);
        }
    }

    pub fn finish_resolution(&self) {
        if let Ok(mut slot) = self.url_progress.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_and_clear();
        }
    }

    pub fn finish_and_clear(&self) {
        if self.enabled {
            self.multi_progress.clear().unwrap_or(());
        }
    }
}
