//! CLI presenter for output formatting

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::recording::format_elapsed;
use crate::domain::testimonial::Testimonial;

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Format recording progress as `mm:ss / mm:ss` with a bar
    pub fn format_progress(&self, elapsed_secs: u64, total_secs: u64) -> String {
        let percent = if total_secs > 0 {
            (elapsed_secs as f64 / total_secs as f64 * 100.0).min(100.0)
        } else {
            0.0
        };

        let bar_width = 20;
        let filled = ((percent / 100.0) * bar_width as f64) as usize;
        let empty = bar_width - filled;

        format!(
            "[{}{}] {} / {}",
            "█".repeat(filled).cyan(),
            "░".repeat(empty),
            format_elapsed(elapsed_secs),
            format_elapsed(total_secs)
        )
    }

    /// Update recording progress
    pub fn update_recording_progress(&self, elapsed_secs: u64, total_secs: u64) {
        let progress = self.format_progress(elapsed_secs, total_secs);
        self.update_spinner(&format!("Recording... {}", progress));
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Print one testimonial as a short block
    pub fn testimonial(&self, testimonial: &Testimonial) {
        let status = if testimonial.approved {
            "approved".green()
        } else {
            "pending".yellow()
        };
        let stars = testimonial
            .rating
            .map(|r| "★".repeat(usize::from(r)))
            .unwrap_or_default();

        println!(
            "{} [{}] {} <{}> {}",
            testimonial.id.bold(),
            status,
            testimonial.name,
            testimonial.email,
            stars.yellow()
        );
        let byline: Vec<&str> = [testimonial.position.as_deref(), testimonial.company.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !byline.is_empty() {
            println!("  {}", byline.join(", ").dimmed());
        }
        println!("  {}", testimonial.text);
        if let Some(url) = testimonial.media_url.as_deref().filter(|_| testimonial.has_media()) {
            println!("  {} {}", testimonial.media_type.to_string().cyan(), url);
        }
        println!(
            "  {}",
            testimonial.created_at.format("%Y-%m-%d %H:%M UTC").to_string().dimmed()
        );
    }

    /// Print a section heading
    pub fn heading(&self, title: &str, count: usize) {
        println!("{} ({})", title.bold(), count);
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}
