//! Progress bar utilities for long-running operations
//!
//! Visual feedback while loading snapshots and computing multi-strategy
//! reports, using the indicatif crate.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress bar for per-strategy report computation
pub struct ReportProgress {
    pub progress: ProgressBar,
}

impl ReportProgress {
    pub fn new(total_strategies: usize) -> Self {
        let progress = ProgressBar::new(total_strategies as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}\n{msg}")
        {
            progress.set_style(style.progress_chars("#>-"));
        }

        Self { progress }
    }

    /// Record one finished strategy
    pub fn strategy_done(&self, strategy_id: &str, total_pnl: f64) {
        self.progress.inc(1);
        self.progress.set_message(format!("📊 {} pnl {:.2}", strategy_id, total_pnl));
    }

    pub fn finish(&self, strategies: usize) {
        self.progress
            .finish_with_message(format!("✅ Report complete! {} strategies", strategies));
    }
}

/// Spinner for quick operations
pub struct Spinner {
    pub spinner: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            spinner.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
        }
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message(message.to_string());

        Self { spinner }
    }

    pub fn finish(&self, message: &str) {
        self.spinner.finish_with_message(format!("✅ {}", message));
    }

    pub fn finish_with_error(&self, message: &str) {
        self.spinner.finish_with_message(format!("❌ {}", message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_progress() {
        let progress = ReportProgress::new(3);
        progress.strategy_done("S1", 12.5);
        assert_eq!(progress.progress.position(), 1);
        progress.finish(3);
    }

    #[test]
    fn test_spinner() {
        let spinner = Spinner::new("Loading snapshot...");
        spinner.finish("Loaded");
    }
}
