use ndarray::ArrayD;

use crate::aggregate::{Aggregator, DerivedRule, Reduction};
use crate::config::{LoggerConfig, PlotEntry, PrintEntry};
use crate::error::{LoggerError, Result};
use crate::logger::logger::Logger;
use crate::report::{PlotSpec, PrintMode, PrintSpec, Printer, Progress, ProgressMode, ProgressSink};
use crate::track::{Direction, Tracker};

/// Assembles a `Logger`.
///
/// Every string tag is resolved here, so a built logger can no longer fail
/// on configuration: unknown aggregation modes, directions, print modes,
/// progress modes and plot kinds are all rejected by `from_config`.
///
/// ```rust
/// use ferrite_logger::{Direction, Logger, Reduction};
///
/// let logger = Logger::builder()
///     .aggregate("acc", Reduction::Max)
///     .derive(["correct", "seen"], "accuracy", |a| a[0].sum() / a[1].sum())
///     .track("val_loss", Direction::Minimize)
///     .build();
/// assert_eq!(logger.step(), 0);
/// ```
#[derive(Default)]
pub struct LoggerBuilder {
    aggregator: Aggregator,
    trackable: Option<String>,
    direction: Option<Direction>,
    prints: Vec<PrintSpec>,
    print_mode: PrintMode,
    progress_mode: ProgressMode,
    total_epochs: Option<u64>,
    plots: Vec<PlotSpec>,
    sink: Option<Box<dyn ProgressSink>>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        LoggerBuilder::default()
    }

    /// Resolves a JSON config into typed rules.
    pub fn from_config(config: &LoggerConfig) -> Result<Self> {
        let mut builder = LoggerBuilder::new();

        for (param, mode) in &config.aggregable {
            builder = builder.aggregate(param.clone(), mode.parse::<Reduction>()?);
        }

        builder.trackable = config.trackable.clone();
        builder.direction = config
            .tracking_mode
            .as_deref()
            .map(str::parse::<Direction>)
            .transpose()?;

        for entry in &config.prints {
            builder.prints.push(match entry {
                PrintEntry::Param(param) => PrintSpec::new(param.clone()),
                PrintEntry::WithBest(param, mode) => {
                    let direction = mode
                        .parse::<Direction>()
                        .map_err(|_| LoggerError::UnknownPrintMode(mode.clone()))?;
                    PrintSpec::with_best(param.clone(), direction)
                }
            });
        }
        if let Some(mode) = &config.print_mode {
            builder.print_mode = mode.parse()?;
        }
        if let Some(mode) = &config.progressbar {
            builder.progress_mode = mode.parse()?;
        }

        for PlotEntry { kind, params } in &config.plots {
            builder.plots.push(match kind.as_str() {
                "plot" => PlotSpec::Plot(params.clone()),
                "summary" => PlotSpec::Summary,
                other => return Err(LoggerError::UnknownPlotKind(other.to_string())),
            });
        }

        Ok(builder)
    }

    pub fn aggregate(mut self, param: impl Into<String>, reduction: Reduction) -> Self {
        self.aggregator.set_rule(param, reduction);
        self
    }

    /// Reduces `param` with a custom function over its concatenated epoch values.
    pub fn aggregate_with<F>(self, param: impl Into<String>, f: F) -> Self
    where
        F: Fn(&ArrayD<f64>) -> f64 + Send + Sync + 'static,
    {
        self.aggregate(param, Reduction::custom(f))
    }

    /// Adds a derived rule computing `output` from several inputs at once.
    pub fn derive<I, S, F>(mut self, inputs: I, output: impl Into<String>, f: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&[ArrayD<f64>]) -> f64 + Send + Sync + 'static,
    {
        self.aggregator.add_derived(DerivedRule::new(inputs, output, f));
        self
    }

    /// Default parameter and direction for best-epoch queries.
    pub fn track(mut self, param: impl Into<String>, direction: Direction) -> Self {
        self.trackable = Some(param.into());
        self.direction = Some(direction);
        self
    }

    pub fn print(mut self, spec: PrintSpec) -> Self {
        self.prints.push(spec);
        self
    }

    pub fn print_mode(mut self, mode: PrintMode) -> Self {
        self.print_mode = mode;
        self
    }

    pub fn progress(mut self, mode: ProgressMode) -> Self {
        self.progress_mode = mode;
        self
    }

    /// Gives the epoch bar a known length.
    pub fn total_epochs(mut self, epochs: u64) -> Self {
        self.total_epochs = Some(epochs);
        self
    }

    /// Replaces the terminal progress bars with another sink.
    pub fn progress_sink(mut self, sink: Box<dyn ProgressSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn plot(mut self, spec: PlotSpec) -> Self {
        self.plots.push(spec);
        self
    }

    pub fn build(self) -> Logger {
        let progress = match self.sink {
            Some(sink) => sink,
            None => Box::new(Progress::new(self.progress_mode, self.total_epochs)),
        };
        let printer = if self.prints.is_empty() && self.print_mode == PrintMode::Last {
            None
        } else {
            Some(Printer::new(self.prints, self.print_mode))
        };
        Logger::from_parts(
            self.aggregator,
            Tracker::new(self.trackable, self.direction),
            printer,
            self.plots,
            progress,
        )
    }
}
