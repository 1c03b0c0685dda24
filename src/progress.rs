//! # Progress Reporting
//!
//! The archive pipeline emits one [`ProgressEvent`] for every file that
//! reaches a terminal state. [`BarSink`] renders them as a single updating
//! terminal line; a `Vec<ProgressEvent>` records them.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fmt;
use std::path::PathBuf;

/// Terminal state of one candidate file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformOutcome {
    Encrypted,
    /// Compiled artifact removed.
    Deleted,
    Skipped,
    /// The original file is left as it was.
    Failed(String),
}

impl fmt::Display for TransformOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformOutcome::Encrypted => write!(f, "encrypted"),
            TransformOutcome::Deleted => write!(f, "deleted"),
            TransformOutcome::Skipped => write!(f, "skipped"),
            TransformOutcome::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// 1-based position of the file in the run.
    pub index: usize,
    pub total: usize,
    pub path: PathBuf,
    pub outcome: TransformOutcome,
}

pub trait ProgressSink {
    fn start(&mut self, _total: usize) {}

    fn event(&mut self, event: &ProgressEvent);

    fn finish(&mut self) {}
}

impl ProgressSink for Vec<ProgressEvent> {
    fn event(&mut self, event: &ProgressEvent) {
        self.push(event.clone());
    }
}

/// Discards every event.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn event(&mut self, _event: &ProgressEvent) {}
}

const BAR_TEMPLATE: &str = "{msg} |{bar:32.green}| {pos}/{len} | {elapsed}";

/// Progress bar on stderr: message, fixed-width fill, `done/total` and
/// elapsed seconds. Hidden when stderr is not a terminal.
pub struct BarSink {
    bar: ProgressBar,
    message: String,
}

impl BarSink {
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_target(message, ProgressDrawTarget::stderr())
    }

    pub fn with_target(message: impl Into<String>, target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), target);
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("# ");
        bar.set_style(style);
        Self {
            bar,
            message: message.into(),
        }
    }
}

impl ProgressSink for BarSink {
    fn start(&mut self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.set_message(self.message.clone());
        self.bar.reset_elapsed();
    }

    fn event(&mut self, event: &ProgressEvent) {
        self.bar.set_position(event.index as u64);
    }

    fn finish(&mut self) {
        self.bar.finish();
    }
}
