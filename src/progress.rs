use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal};
use std::time::Duration;

use crate::controller::TableView;

/// Progress indicator manager
pub struct ProgressManager {
    enabled: bool,
    verbose: bool,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(quiet: bool, verbose: bool) -> Self {
        // Only enable progress if we're in a terminal and not in quiet mode
        let enabled = !quiet && io::stderr().is_terminal();

        Self { enabled, verbose }
    }

    /// Create a spinner for searching
    pub fn create_search_spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.enabled {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"]),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Some(pb)
    }

    /// Show a simple message (for verbose mode)
    pub fn show_message(&self, message: &str) {
        if self.verbose && self.enabled {
            eprintln!("🔍 {}", message);
        }
    }

    /// Check if progress is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Spinner shown while the table is searching or loading
pub struct FetchProgress {
    spinner: Option<ProgressBar>,
}

impl FetchProgress {
    pub fn new(manager: &ProgressManager) -> Self {
        Self {
            spinner: manager.create_search_spinner(messages::LOADING),
        }
    }

    /// Reflect a published snapshot in the spinner message
    pub fn update(&self, view: &TableView) {
        if let Some(ref pb) = self.spinner {
            pb.set_message(messages::for_view(view));
        }
    }

    /// Finish and clear the progress
    pub fn finish_and_clear(&self) {
        if let Some(ref pb) = self.spinner {
            pb.finish_and_clear();
        }
    }
}

impl Drop for FetchProgress {
    fn drop(&mut self) {
        if let Some(ref pb) = self.spinner {
            pb.finish_and_clear();
        }
    }
}

/// Progress messages for different operations
pub mod messages {
    use crate::controller::TableView;

    pub const SEARCHING: &str = "Searching...";
    pub const LOADING: &str = "Loading citizens...";
    pub const LOADING_CITIES: &str = "Loading cities...";

    pub fn for_view(view: &TableView) -> String {
        if view.searching {
            SEARCHING.to_string()
        } else if view.loading {
            format!("Loading page {}...", view.page.page)
        } else {
            view.result.summary()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::FilterController;
    use crate::filter::TextField;

    #[test]
    fn test_progress_manager_quiet() {
        let manager = ProgressManager::new(true, false);
        assert!(!manager.is_enabled());
        assert!(manager.create_search_spinner("x").is_none());
    }

    #[test]
    fn test_progress_messages() {
        let mut controller = FilterController::new(10);
        assert_eq!(messages::for_view(&controller.snapshot()), "No data found");

        controller.initial_fetch();
        assert_eq!(messages::for_view(&controller.snapshot()), "Loading page 1...");

        controller.set_text_filter(TextField::Search, "ali");
        assert_eq!(messages::for_view(&controller.snapshot()), "Searching...");
    }

    #[test]
    fn test_fetch_progress_lifecycle() {
        let manager = ProgressManager::new(true, false); // Quiet mode
        let progress = FetchProgress::new(&manager);

        // Should work without panic even when disabled
        progress.update(&FilterController::new(10).snapshot());
        progress.finish_and_clear();
    }
}
