//! Progress events and the sinks that display them.
//!
//! The merge loop reports each finished file as a [`ProgressEvent`] to a
//! [`ProgressSink`]. Sinks only observe; they cannot influence the merge.
//! Any `FnMut(&ProgressEvent)` closure is a sink, which is what tests use.
//!
//! # Examples
//!
//! ```
//! use pdffold::output::progress::{ProgressBar, ProgressEvent, ProgressSink, ProgressStyle};
//!
//! let mut progress = ProgressBar::new(2, ProgressStyle::Bar);
//! progress.emit(&ProgressEvent::ok(1, 2, "01_Intro.pdf"));
//! progress.emit(&ProgressEvent::skipped(2, 2, "broken.pdf", "invalid file header"));
//! ```

use serde::Serialize;
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Outcome of one file as seen by a progress sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    /// Pages were appended to the output.
    Ok,
    /// The file was left out.
    Skipped,
}

/// One file has been processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    /// 1-based position in merge order.
    pub index: usize,
    /// Number of files in the run.
    pub total: usize,
    /// File name (without directory).
    pub file_name: String,
    /// What happened to the file.
    pub status: ProgressStatus,
    /// Why the file was skipped.
    pub reason: Option<String>,
}

impl ProgressEvent {
    /// Event for a merged file.
    pub fn ok(index: usize, total: usize, file_name: impl Into<String>) -> Self {
        Self {
            index,
            total,
            file_name: file_name.into(),
            status: ProgressStatus::Ok,
            reason: None,
        }
    }

    /// Event for a skipped file.
    pub fn skipped(
        index: usize,
        total: usize,
        file_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            index,
            total,
            file_name: file_name.into(),
            status: ProgressStatus::Skipped,
            reason: Some(reason.into()),
        }
    }

    /// Whether this is the last file of the run.
    pub fn is_last(&self) -> bool {
        self.index >= self.total
    }
}

/// Receives progress events from the merge loop.
pub trait ProgressSink {
    /// Called once per file, in merge order.
    fn emit(&mut self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: FnMut(&ProgressEvent),
{
    fn emit(&mut self, event: &ProgressEvent) {
        self(event)
    }
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn emit(&mut self, _event: &ProgressEvent) {}
}

/// Style of progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStyle {
    /// Redrawn bar: `[=====>    ] 50% 5/10 3s`
    Bar,
    /// One line per file, for logs and pipes.
    Lines,
}

/// Terminal progress display.
pub struct ProgressBar {
    /// Total number of items.
    total: usize,
    /// Current progress.
    current: usize,
    /// Progress bar style.
    style: ProgressStyle,
    /// Optional message to display.
    message: Option<String>,
    /// Start time of the operation.
    start_time: Instant,
    /// Last update time (for rate limiting).
    last_update: Instant,
    /// Minimum time between redraws.
    update_interval: Duration,
    /// Whether anything is printed.
    enabled: bool,
}

impl ProgressBar {
    /// Create a new progress bar.
    pub fn new(total: usize, style: ProgressStyle) -> Self {
        let enabled = match style {
            ProgressStyle::Bar => Self::is_terminal(),
            ProgressStyle::Lines => true,
        };

        Self {
            total,
            current: 0,
            style,
            message: None,
            start_time: Instant::now(),
            last_update: Instant::now(),
            update_interval: Duration::from_millis(100),
            enabled,
        }
    }

    /// Bar on a terminal, one line per file otherwise.
    pub fn auto(total: usize) -> Self {
        let style = if Self::is_terminal() {
            ProgressStyle::Bar
        } else {
            ProgressStyle::Lines
        };
        Self::new(total, style)
    }

    /// Create a disabled progress bar (no output).
    pub fn disabled() -> Self {
        let mut pb = Self::new(0, ProgressStyle::Lines);
        pb.enabled = false;
        pb
    }

    fn is_terminal() -> bool {
        use std::io::IsTerminal;
        io::stdout().is_terminal()
    }

    /// Set the message to display with the progress bar.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Update the progress bar to a specific value.
    pub fn update(&mut self, current: usize) {
        self.current = current;

        if self.last_update.elapsed() < self.update_interval && current < self.total {
            return;
        }

        self.last_update = Instant::now();
        self.render();
    }

    /// Mark the progress bar as finished.
    pub fn finish(&mut self) {
        self.current = self.total;
        if self.enabled && self.style == ProgressStyle::Bar {
            self.render();
            println!();
        }
    }

    /// Clear the progress bar from the terminal.
    pub fn clear(&self) {
        if self.enabled && self.style == ProgressStyle::Bar {
            print!("\r\x1b[K");
            io::stdout().flush().ok();
        }
    }

    fn render(&self) {
        if !self.enabled || self.style != ProgressStyle::Bar {
            return;
        }

        print!("\r\x1b[K{}", self.render_bar());
        io::stdout().flush().ok();
    }

    fn render_bar(&self) -> String {
        let width = 30;
        let filled = (width * self.current) / self.total.max(1);
        let empty = width - filled.min(width);

        let bar = format!(
            "[{}{}]",
            "=".repeat(filled.saturating_sub(1)) + if filled > 0 { ">" } else { "" },
            " ".repeat(empty)
        );

        let mut parts = vec![
            bar,
            format!("{:.0}%", self.percent()),
            format!("{}/{}", self.current, self.total),
            format_duration(self.elapsed()),
        ];

        if let Some(eta) = self.eta() {
            parts.push(format!("ETA {}", format_duration(eta)));
        }

        if let Some(ref msg) = self.message {
            parts.push(msg.clone());
        }

        parts.join(" ")
    }

    fn render_line(event: &ProgressEvent) -> String {
        match (&event.status, &event.reason) {
            (ProgressStatus::Skipped, Some(reason)) => format!(
                "  [{}/{}] ⚠ {} (skipped: {reason})",
                event.index, event.total, event.file_name
            ),
            (ProgressStatus::Skipped, None) => format!(
                "  [{}/{}] ⚠ {} (skipped)",
                event.index, event.total, event.file_name
            ),
            (ProgressStatus::Ok, _) => {
                format!("  [{}/{}] {}", event.index, event.total, event.file_name)
            }
        }
    }

    /// Get the current progress percentage.
    pub fn percent(&self) -> f64 {
        if self.total > 0 {
            (self.current as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Get the elapsed time since start.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Estimate time remaining.
    pub fn eta(&self) -> Option<Duration> {
        if self.current == 0 || self.current >= self.total {
            return None;
        }

        let elapsed = self.start_time.elapsed();
        let rate = self.current as f64 / elapsed.as_secs_f64();
        let remaining = self.total - self.current;

        Some(Duration::from_secs_f64(remaining as f64 / rate))
    }
}

impl ProgressSink for ProgressBar {
    fn emit(&mut self, event: &ProgressEvent) {
        self.total = event.total;
        self.set_message(event.file_name.clone());

        if self.enabled {
            match self.style {
                ProgressStyle::Lines => println!("{}", Self::render_line(event)),
                ProgressStyle::Bar if event.status == ProgressStatus::Skipped => {
                    // Skips stay visible above the bar.
                    self.clear();
                    println!("{}", Self::render_line(event));
                }
                ProgressStyle::Bar => {}
            }
        }

        self.update(event.index);
        if event.is_last() {
            self.finish();
        }
    }
}

/// Format a duration as a human-readable string.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
