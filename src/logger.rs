use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::RwLock;

use crate::resolver::{ResolutionMethod, ResolutionResult};

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub enum VerbosityLevel {
    Silent = 0,   // Only errors and the final summary
    Summary = 1,  // Run-level progress (default)
    Detailed = 2, // Per-entity lines
    Debug = 3,    // Candidate-level probe lines
}

impl VerbosityLevel {
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return VerbosityLevel::Silent;
        }
        match verbose {
            0 => VerbosityLevel::Summary,
            1 => VerbosityLevel::Detailed,
            2.. => VerbosityLevel::Debug,
        }
    }
}

/// User-facing output for a resolution run.
///
/// All messages route through the progress bar when one is active so the bar
/// never tears. Diagnostics for developers go through `tracing`; this logger
/// is only for what an operator watches during a batch.
#[derive(Clone)]
pub struct ResolutionLogger {
    verbosity: VerbosityLevel,
    progress_bar: Arc<RwLock<Option<ProgressBar>>>,
    show_progress: bool,
}

impl ResolutionLogger {
    pub fn new(verbosity: VerbosityLevel, no_progress: bool) -> Self {
        // The bar draws to stderr; skip it for pipes and quiet runs.
        let show_progress = !no_progress
            && verbosity != VerbosityLevel::Silent
            && atty::is(atty::Stream::Stderr);
        Self {
            verbosity,
            progress_bar: Arc::new(RwLock::new(None)),
            show_progress,
        }
    }

    pub fn info(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Summary {
            self.print_message("INFO", message);
        }
    }

    pub fn warn(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Detailed {
            self.print_message("WARN", message);
        }
    }

    pub fn error(&self, message: &str) {
        // Errors are never hidden, not even by --quiet
        self.print_message("ERROR", message);
    }

    pub fn debug(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Debug {
            self.print_message("DEBUG", message);
        }
    }

    fn detailed_info(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Detailed {
            self.print_message("INFO", message);
        }
    }

    fn print_message(&self, level: &str, message: &str) {
        let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
        let msg = format!("[{}] {}: {}", timestamp, level, message);

        // Route through the bar when one is active so it keeps its line
        if let Ok(guard) = self.progress_bar.try_read() {
            if let Some(pb) = guard.as_ref() {
                pb.println(msg);
                return;
            }
        }

        eprintln!("{}", msg);
    }

    pub async fn start_progress(&self, total: u64) {
        if !self.show_progress {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );

        let mut guard = self.progress_bar.write().await;
        *guard = Some(pb);
    }

    pub async fn set_current_entity(&self, name: &str) {
        if let Some(pb) = self.progress_bar.read().await.as_ref() {
            pb.set_message(name.to_string());
        }
    }

    pub async fn advance(&self) {
        if let Some(pb) = self.progress_bar.read().await.as_ref() {
            pb.inc(1);
        }
    }

    pub async fn finish_progress(&self) {
        let mut guard = self.progress_bar.write().await;
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }

    pub fn log_entity_start(&self, index: usize, total: usize, name: &str) {
        self.detailed_info(&format!("[{}/{}] Resolving {:?}", index, total, name));
    }

    pub fn log_entity_outcome(&self, result: &ResolutionResult) {
        match result.method {
            ResolutionMethod::None => self.detailed_info(&format!(
                "No live site found for {:?}",
                result.entity_name
            )),
            method => self.detailed_info(&format!(
                "Resolved {:?} to {} (via {}, status {})",
                result.entity_name, result.best_domain, method, result.best_http_status
            )),
        }
    }

    pub fn log_export_success(&self, path: &str) {
        self.info(&format!("Results written to {}", path));
    }

    pub fn log_interrupted(&self) {
        self.error("Interrupt received, finishing up with completed entities");
    }
}
