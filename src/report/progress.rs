use std::io::{self, Write};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::error::{LoggerError, Result};

/// Which progress bars to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressMode {
    #[default]
    None,
    Epochs,
    Steps,
    Both,
}

impl ProgressMode {
    pub fn shows_epochs(self) -> bool {
        matches!(self, ProgressMode::Epochs | ProgressMode::Both)
    }

    pub fn shows_steps(self) -> bool {
        matches!(self, ProgressMode::Steps | ProgressMode::Both)
    }
}

impl FromStr for ProgressMode {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(ProgressMode::None),
            "epochs" => Ok(ProgressMode::Epochs),
            "steps" => Ok(ProgressMode::Steps),
            "both" => Ok(ProgressMode::Both),
            other => Err(LoggerError::UnknownProgressMode(other.to_string())),
        }
    }
}

/// Where the logger reports progress and its printed lines.
///
/// `advance_step` is called once per `log_step`, `advance_epoch` once per
/// successful epoch flush.
pub trait ProgressSink: Send {
    fn advance_step(&mut self);
    fn advance_epoch(&mut self);
    fn write_line(&mut self, line: &str) -> io::Result<()>;
    fn finish(&mut self) {}
}

/// Terminal progress bars.
///
/// The step bar restarts at every epoch. Lines are printed above the bars so
/// they are not overwritten. Without bars, or when the bars are not drawn
/// (stderr is not a terminal), lines go to the plain output, stdout unless
/// replaced with `with_output`.
pub struct Progress {
    multi: Option<MultiProgress>,
    epochs: Option<ProgressBar>,
    steps: Option<ProgressBar>,
    out: Box<dyn Write + Send>,
}

impl Progress {
    pub fn new(mode: ProgressMode, total_epochs: Option<u64>) -> Self {
        Progress::with_target(mode, total_epochs, ProgressDrawTarget::stderr())
    }

    /// Same bars, never drawn.
    pub fn hidden(mode: ProgressMode, total_epochs: Option<u64>) -> Self {
        Progress::with_target(mode, total_epochs, ProgressDrawTarget::hidden())
    }

    fn with_target(mode: ProgressMode, total_epochs: Option<u64>, target: ProgressDrawTarget) -> Self {
        let out: Box<dyn Write + Send> = Box::new(io::stdout());
        if mode == ProgressMode::None {
            return Progress { multi: None, epochs: None, steps: None, out };
        }
        let multi = MultiProgress::with_draw_target(target);
        let epochs = mode
            .shows_epochs()
            .then(|| multi.add(new_bar("epoch", total_epochs)));
        let steps = mode.shows_steps().then(|| multi.add(new_bar("step", None)));
        Progress { multi: Some(multi), epochs, steps, out }
    }

    /// Sends lines that cannot go above drawn bars to `out` instead of stdout.
    pub fn with_output(mut self, out: impl Write + Send + 'static) -> Self {
        self.out = Box::new(out);
        self
    }

    pub fn epoch_position(&self) -> Option<u64> {
        self.epochs.as_ref().map(ProgressBar::position)
    }

    pub fn step_position(&self) -> Option<u64> {
        self.steps.as_ref().map(ProgressBar::position)
    }
}

fn new_bar(prefix: &'static str, len: Option<u64>) -> ProgressBar {
    let (bar, template) = match len {
        Some(len) => (
            ProgressBar::new(len),
            "{prefix:>5} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}",
        ),
        None => (
            ProgressBar::no_length(),
            "{prefix:>5} [{elapsed_precise}] {pos} ({per_sec}) {msg}",
        ),
    };
    let style = ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    bar.set_style(style);
    bar.set_prefix(prefix);
    bar
}

impl ProgressSink for Progress {
    fn advance_step(&mut self) {
        if let Some(bar) = &self.steps {
            bar.inc(1);
        }
    }

    fn advance_epoch(&mut self) {
        if let Some(bar) = &self.epochs {
            bar.inc(1);
        }
        if let Some(bar) = &self.steps {
            bar.reset();
        }
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        match &self.multi {
            Some(multi) if !multi.is_hidden() => multi.println(line),
            _ => {
                writeln!(self.out, "{line}")?;
                self.out.flush()
            }
        }
    }

    fn finish(&mut self) {
        for bar in self.epochs.iter().chain(self.steps.iter()) {
            bar.finish();
        }
    }
}

/// What a `RecordingSink` has seen so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recorded {
    pub lines: Vec<String>,
    pub steps: usize,
    pub epochs: usize,
}

/// In-memory sink; clones share the same record.
///
/// Useful for forwarding epoch lines to something other than a terminal.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        RecordingSink::default()
    }

    pub fn snapshot(&self) -> Recorded {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn with<F: FnOnce(&mut Recorded)>(&self, f: F) {
        f(&mut self.inner.lock().unwrap_or_else(|e| e.into_inner()));
    }
}

impl ProgressSink for RecordingSink {
    fn advance_step(&mut self) {
        self.with(|r| r.steps += 1);
    }

    fn advance_epoch(&mut self) {
        self.with(|r| {
            r.epochs += 1;
            r.steps = 0;
        });
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.with(|r| r.lines.push(line.to_string()));
        Ok(())
    }
}
