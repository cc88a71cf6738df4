//! Output formatting and progress display

use crate::cli::args::VerbosityLevel;
use crate::core::{EngineOutput, Selection};
use crate::utils::humanize::MetaSummary;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Output formatter for ytsift
pub struct OutputFormatter {
    verbosity: VerbosityLevel,
    spinner: Option<ProgressBar>,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            spinner: None,
        }
    }

    /// Show a spinner on stderr while the extraction engine runs
    pub fn start_spinner(&mut self, message: &str) {
        if self.verbosity == VerbosityLevel::Quiet {
            return;
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));

        self.spinner = Some(spinner);
    }

    /// Stop the spinner and clear its line
    pub fn finish_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print info message
    pub fn info(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            eprintln!("ℹ️  {}", message);
        }
    }

    /// Print success message
    pub fn success(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            eprintln!("✅ {}", message.green());
        }
    }

    /// Print error message
    pub fn error(&self, message: &str) {
        eprintln!("❌ {}", message.red().bold());
    }

    /// Print debug message
    pub fn debug(&self, message: &str) {
        if self.verbosity == VerbosityLevel::Verbose {
            eprintln!("🐛 {}", message.dimmed());
        }
    }

    /// Print the human-readable video summary
    pub fn print_summary(&self, summary: &MetaSummary) {
        for line in summary_lines(summary) {
            println!("{}", line);
        }
    }

    /// One-line per-category counts, shown before machine output in verbose mode
    pub fn print_category_counts(&self, output: &EngineOutput) {
        self.debug(&format!(
            "audio {} standard / {} DRC, video {} SDR / {} HDR, {} thumbnails",
            output.audio_only.standard.len(),
            output.audio_only.drc.len(),
            output.video_only.sdr.len(),
            output.video_only.hdr.len(),
            output.thumbnails.len()
        ));
    }

    /// Print resolved stream URLs, video first
    pub fn print_urls(&self, selection: &Selection<'_>) {
        for line in url_lines(selection) {
            println!("{}", line);
        }
    }
}

fn summary_lines(summary: &MetaSummary) -> Vec<String> {
    let mut lines = vec![
        format!("📹 {}", summary.title.bold()),
        format!("👤 {}", summary.channel),
    ];
    if let Some(duration) = &summary.duration {
        lines.push(format!("⏱️  {}", duration));
    }

    let counts: Vec<String> = [
        (&summary.views, "views"),
        (&summary.likes, "likes"),
        (&summary.comments, "comments"),
        (&summary.subscribers, "subscribers"),
    ]
    .into_iter()
    .filter_map(|(value, label)| value.as_ref().map(|v| format!("{} {}", v, label)))
    .collect();
    if !counts.is_empty() {
        lines.push(format!("📊 {}", counts.join(" | ")));
    }

    match (&summary.uploaded, &summary.upload_age) {
        (Some(date), Some(age)) => lines.push(format!("📅 {} ({})", date, age)),
        (Some(date), None) => lines.push(format!("📅 {}", date)),
        _ => {}
    }
    lines
}

fn url_lines(selection: &Selection<'_>) -> Vec<String> {
    selection
        .video
        .and_then(|v| v.url.clone())
        .into_iter()
        .chain(selection.audio.and_then(|a| a.url.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AudioFormat, VideoFormat};

    fn summary() -> MetaSummary {
        MetaSummary {
            title: "Never Gonna Give You Up".to_string(),
            channel: "Rick Astley".to_string(),
            duration: Some("3:32".to_string()),
            views: Some("1.5B".to_string()),
            likes: None,
            comments: Some("2.3M".to_string()),
            subscribers: None,
            uploaded: Some("25 Oct 2009".to_string()),
            upload_age: Some("14 years ago".to_string()),
        }
    }

    #[test]
    fn test_output_formatter_creation() {
        let formatter = OutputFormatter::new(VerbosityLevel::Normal);
        assert_eq!(formatter.verbosity, VerbosityLevel::Normal);
        assert!(formatter.spinner.is_none());
    }

    #[test]
    fn test_verbosity_levels() {
        let formatter = OutputFormatter::new(VerbosityLevel::Quiet);
        // These should not print anything in quiet mode
        formatter.info("test");
        formatter.success("test");
        formatter.debug("test");

        // Error should always print
        formatter.error("test");
    }

    #[test]
    fn test_spinner_quiet_mode() {
        let mut formatter = OutputFormatter::new(VerbosityLevel::Quiet);
        formatter.start_spinner("Extracting");
        assert!(formatter.spinner.is_none());
        formatter.finish_spinner();
    }

    #[test]
    fn test_spinner_normal_mode() {
        let mut formatter = OutputFormatter::new(VerbosityLevel::Normal);
        formatter.start_spinner("Extracting");
        assert!(formatter.spinner.is_some());

        formatter.finish_spinner();
        assert!(formatter.spinner.is_none());
    }

    #[test]
    fn test_summary_lines() {
        colored::control::set_override(false);
        let lines = summary_lines(&summary());

        assert_eq!(lines[0], "📹 Never Gonna Give You Up");
        assert_eq!(lines[1], "👤 Rick Astley");
        assert_eq!(lines[2], "⏱️  3:32");
        assert_eq!(lines[3], "📊 1.5B views | 2.3M comments");
        assert_eq!(lines[4], "📅 25 Oct 2009 (14 years ago)");
    }

    #[test]
    fn test_summary_lines_sparse() {
        let summary = MetaSummary {
            duration: None,
            views: None,
            comments: None,
            uploaded: None,
            upload_age: None,
            ..summary()
        };
        assert_eq!(summary_lines(&summary).len(), 2);
    }

    #[test]
    fn test_url_lines_video_first() {
        let audio = AudioFormat {
            format_id: "140".to_string(),
            url: Some("https://media.example/140".to_string()),
            ..Default::default()
        };
        let video = VideoFormat {
            format_id: "137".to_string(),
            url: Some("https://media.example/137".to_string()),
            ..Default::default()
        };

        let selection = Selection {
            audio: Some(&audio),
            video: Some(&video),
        };
        assert_eq!(
            url_lines(&selection),
            vec!["https://media.example/137", "https://media.example/140"]
        );

        let selection = Selection {
            audio: Some(&audio),
            video: None,
        };
        assert_eq!(url_lines(&selection), vec!["https://media.example/140"]);
    }
}
