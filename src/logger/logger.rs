use tracing::debug;

use crate::aggregate::Aggregator;
use crate::buffer::StepBuffer;
use crate::config::LoggerConfig;
use crate::error::Result;
use crate::history::History;
use crate::logger::builder::LoggerBuilder;
use crate::report::{Canvas, PlotSpec, Printer, ProgressSink};
use crate::track::{Direction, Tracker};
use crate::value::IntoValue;

/// Collects per-step values, folds them into per-epoch history and answers
/// best-epoch queries.
///
/// One logger belongs to one training loop. Call `log_step` as often as you
/// like during an epoch, then `log_epoch` once at its end:
///
/// ```rust
/// use ferrite_logger::{Direction, Logger};
///
/// let mut logger = Logger::builder().track("val_loss", Direction::Minimize).build();
/// for epoch in 0..3 {
///     for batch in 0..4 {
///         logger.log_step("train", [("loss", 1.0 / (epoch * 4 + batch + 1) as f64)]);
///     }
///     logger.log_step("val", [("loss", 0.5 - 0.1 * epoch as f64)]);
///     logger.log_epoch([("lr", 0.01)]).unwrap();
/// }
/// assert!(logger.is_best(None, None).unwrap());
/// assert_eq!(logger.history().get("train_loss").unwrap().len(), 3);
/// ```
pub struct Logger {
    buffer: StepBuffer,
    aggregator: Aggregator,
    history: History,
    tracker: Tracker,
    printer: Option<Printer>,
    plots: Vec<PlotSpec>,
    progress: Box<dyn ProgressSink>,
    step: usize,
}

impl Logger {
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Builds a logger from a JSON config, rejecting unknown tags.
    pub fn from_config(config: &LoggerConfig) -> Result<Logger> {
        Ok(LoggerBuilder::from_config(config)?.build())
    }

    pub(crate) fn from_parts(
        aggregator: Aggregator,
        tracker: Tracker,
        printer: Option<Printer>,
        plots: Vec<PlotSpec>,
        progress: Box<dyn ProgressSink>,
    ) -> Logger {
        Logger {
            buffer: StepBuffer::new(),
            aggregator,
            history: History::new(),
            tracker,
            printer,
            plots,
            progress,
            step: 0,
        }
    }

    /// Buffers one step's values under `step_type` (e.g. `"train"`, `"val"`).
    pub fn log_step<I, K, V>(&mut self, step_type: &str, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: IntoValue,
    {
        for (param, value) in values {
            self.buffer.record(step_type, param.as_ref(), value);
        }
        self.progress.advance_step();
    }

    /// Buffers a single value without counting a step.
    ///
    /// Handy when one step logs values of different types.
    pub fn log_value<V: IntoValue>(&mut self, step_type: &str, param: &str, value: V) {
        self.buffer.record(step_type, param, value);
    }

    /// Closes the epoch.
    ///
    /// Aggregates every buffered step-type, appends the results together with
    /// `values` to the history under one step index, clears the buffer and
    /// advances the step counter. Returns the step index used.
    ///
    /// On error nothing changes: history, buffer and counter are as before.
    pub fn log_epoch<I, K>(&mut self, values: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut batch = Vec::new();
        for step_type in self.buffer.step_types() {
            batch.extend(self.aggregator.aggregate(&self.buffer, step_type)?);
        }
        batch.extend(values.into_iter().map(|(k, v)| (k.into(), v)));

        let step = self.step;
        let logged = batch.len();
        self.history.log(step, batch)?;
        debug!(step, params = logged, "epoch logged");

        self.step += 1;
        self.buffer.reset();
        self.progress.advance_epoch();
        Ok(step)
    }

    /// `log_epoch` with no directly supplied values.
    pub fn flush(&mut self) -> Result<usize> {
        self.log_epoch(Vec::<(String, f64)>::new())
    }

    /// Whether the latest entry of the tracked parameter is the best so far.
    /// `None` arguments fall back to the configured trackable and direction.
    pub fn is_best(&self, param: Option<&str>, direction: Option<Direction>) -> Result<bool> {
        self.tracker.is_best(&self.history, param, direction)
    }

    /// Entries logged since the most recent best entry.
    pub fn steps_without_progress(
        &self,
        param: Option<&str>,
        direction: Option<Direction>,
    ) -> Result<usize> {
        self.tracker.steps_without_progress(&self.history, param, direction)
    }

    /// `(step, value)` of the most recent best entry.
    pub fn best(&self, param: Option<&str>, direction: Option<Direction>) -> Result<Option<(usize, f64)>> {
        self.tracker.best(&self.history, param, direction)
    }

    pub fn should_stop(
        &self,
        patience: usize,
        param: Option<&str>,
        direction: Option<Direction>,
    ) -> Result<bool> {
        self.tracker.should_stop(&self.history, patience, param, direction)
    }

    /// Writes the configured report line through the progress sink and
    /// returns it. Without configured prints this does nothing.
    pub fn print(&mut self) -> Result<Option<String>> {
        let Some(printer) = &self.printer else {
            return Ok(None);
        };
        let line = printer.format_line(&self.history)?;
        self.progress.write_line(&line)?;
        Ok(Some(line))
    }

    /// Draws every configured plot on `canvas`.
    pub fn plot(&self, canvas: &mut dyn Canvas) -> Result<()> {
        for spec in &self.plots {
            match spec {
                PlotSpec::Plot(params) => {
                    let series = params
                        .iter()
                        .map(|p| self.history.get(p))
                        .collect::<Result<Vec<_>>>()?;
                    canvas.draw_plot(&series)?;
                }
                PlotSpec::Summary => canvas.draw_summary(&self.history)?,
            }
        }
        Ok(())
    }

    /// Finishes the progress display.
    pub fn finish(&mut self) {
        self.progress.finish();
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn buffer(&self) -> &StepBuffer {
        &self.buffer
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Step index the next `log_epoch` will use.
    pub fn step(&self) -> usize {
        self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoggerError;
    use crate::report::{PrintSpec, Progress, ProgressMode, RecordingSink, TextCanvas};
    use approx::assert_relative_eq;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    fn quiet() -> LoggerBuilder {
        Logger::builder().progress_sink(Box::new(RecordingSink::new()))
    }

    #[test]
    fn test_epoch_shares_one_step() {
        let mut logger = quiet().build();
        logger.log_step("train", [("loss", 1.0)]);
        logger.log_step("val", [("acc", 0.5)]);
        assert_eq!(logger.log_epoch([("lr", 0.1)]).unwrap(), 0);

        let h = logger.history();
        for name in ["train_loss", "val_acc", "lr"] {
            assert_eq!(h.get(name).unwrap().steps(), &[0]);
        }
        assert_eq!(h.last_step(), Some(0));
        assert_eq!(logger.step(), 1);
        assert!(logger.buffer().is_empty());
    }

    #[test]
    fn test_mean_per_epoch() {
        let mut logger = quiet().build();
        for x in [1.0, 2.0, 3.0] {
            logger.log_step("train", [("loss", x)]);
        }
        logger.flush().unwrap();
        logger.log_step("train", [("loss", 10.0)]);
        logger.flush().unwrap();
        assert_eq!(logger.history().get("train_loss").unwrap().data(), &[2.0, 10.0]);
    }

    #[test]
    fn test_empty_epoch_still_advances() {
        let mut logger = quiet().build();
        assert_eq!(logger.flush().unwrap(), 0);
        assert_eq!(logger.flush().unwrap(), 1);
        assert!(logger.history().is_empty());
        assert_eq!(logger.history().last_step(), Some(1));
    }

    #[test]
    fn test_failed_flush_changes_nothing() {
        let mut logger = quiet().build();
        logger.log_step("train", [("loss", 1.0)]);
        logger.flush().unwrap();

        logger.log_step("train", [("loss", 2.0)]);
        logger.log_value("val", "note", "diverged");
        let err = logger.flush().unwrap_err();
        assert!(matches!(err, LoggerError::UnsupportedValueType { ref param, .. } if param == "note"));

        assert_eq!(logger.step(), 1);
        assert_eq!(logger.history().get("train_loss").unwrap().data(), &[1.0]);
        assert_eq!(logger.buffer().len(), 2);
    }

    #[test]
    fn test_direct_value_colliding_with_aggregate() {
        let mut logger = quiet().build();
        logger.log_step("train", [("loss", 1.0)]);
        assert!(matches!(
            logger.log_epoch([("train_loss", 3.0)]),
            Err(LoggerError::DuplicateParameter { .. })
        ));
        assert!(logger.history().is_empty());
    }

    #[test]
    fn test_derived_and_custom_rules() {
        let mut logger = quiet()
            .aggregate_with("loss", |a| a.sum())
            .derive(["correct", "seen"], "acc", |a| a[0].sum() / a[1].sum())
            .build();
        logger.log_step("val", [("loss", 0.5), ("correct", 3.0), ("seen", 4.0)]);
        logger.log_step("val", [("loss", 0.25), ("correct", 1.0), ("seen", 4.0)]);
        logger.flush().unwrap();

        let h = logger.history();
        assert_relative_eq!(h.get("val_loss").unwrap().data()[0], 0.75);
        assert_relative_eq!(h.get("val_acc").unwrap().data()[0], 0.5);
        assert!(!h.contains("val_correct"));
        assert!(!h.contains("val_seen"));
    }

    #[test]
    fn test_tracking_through_logger() {
        let mut logger = quiet().track("val_loss", Direction::Minimize).build();
        for v in [0.9, 0.4, 0.6, 0.4, 0.7] {
            logger.log_step("val", [("loss", v)]);
            logger.flush().unwrap();
        }
        assert!(!logger.is_best(None, None).unwrap());
        assert_eq!(logger.steps_without_progress(None, None).unwrap(), 1);
        assert_eq!(logger.best(None, None).unwrap(), Some((3, 0.4)));
        assert!(logger.should_stop(1, None, None).unwrap());
        assert!(!logger.should_stop(2, None, None).unwrap());
    }

    #[test]
    fn test_print_goes_through_sink() {
        let sink = RecordingSink::new();
        let mut logger = Logger::builder()
            .progress_sink(Box::new(sink.clone()))
            .print(PrintSpec::with_best("val_loss", Direction::Minimize))
            .build();
        logger.log_step("val", [("loss", 0.5)]);
        logger.flush().unwrap();
        logger.log_step("val", [("loss", 0.75)]);
        logger.flush().unwrap();

        let line = logger.print().unwrap();
        assert_eq!(line.as_deref(), Some("val_loss 0.7500 (0.5000)"));
        let recorded = sink.snapshot();
        assert_eq!(recorded.lines, vec!["val_loss 0.7500 (0.5000)".to_string()]);
        assert_eq!(recorded.epochs, 2);
    }

    #[test]
    fn test_print_without_config_is_noop() {
        let mut logger = quiet().build();
        assert_eq!(logger.print().unwrap(), None);
    }

    #[test]
    fn test_log_step_counts_steps() {
        let sink = RecordingSink::new();
        let mut logger = Logger::builder().progress_sink(Box::new(sink.clone())).build();
        logger.log_step("train", [("loss", 1.0)]);
        logger.log_step("train", [("loss", 1.0)]);
        logger.log_value("train", "lr", 0.1);
        assert_eq!(sink.snapshot().steps, 2);
    }

    #[test]
    fn test_plot() {
        let mut logger = quiet()
            .plot(PlotSpec::Plot(vec!["train_loss".into()]))
            .plot(PlotSpec::Summary)
            .build();
        logger.log_step("train", [("loss", 1.0)]);
        logger.log_epoch([("lr", 0.1)]).unwrap();

        let mut canvas = TextCanvas::new(Vec::new(), 10);
        logger.plot(&mut canvas).unwrap();
        let text = String::from_utf8(canvas.into_inner()).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_plot_unknown_param() {
        let logger = quiet().plot(PlotSpec::Plot(vec!["val_loss".into()])).build();
        let mut canvas = TextCanvas::new(Vec::new(), 10);
        assert!(matches!(logger.plot(&mut canvas), Err(LoggerError::UnknownParameter(_))));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_print_reaches_output_when_bars_are_not_drawn() {
        let out = Captured::default();
        let progress = Progress::hidden(ProgressMode::Epochs, Some(2)).with_output(out.clone());
        let mut logger = Logger::builder()
            .print(PrintSpec::new("train_loss"))
            .progress_sink(Box::new(progress))
            .build();
        for loss in [0.5, 0.25] {
            logger.log_step("train", [("loss", loss)]);
            logger.flush().unwrap();
            logger.print().unwrap();
        }
        let text = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
        assert_eq!(text, "train_loss 0.5000\ntrain_loss 0.2500\n");
    }

    #[test]
    fn test_print_write_failure_is_io_error() {
        let progress = Progress::hidden(ProgressMode::Epochs, None).with_output(Closed);
        let mut logger = Logger::builder()
            .print(PrintSpec::new("train_loss"))
            .progress_sink(Box::new(progress))
            .build();
        logger.log_step("train", [("loss", 0.5)]);
        logger.flush().unwrap();
        assert!(matches!(logger.print(), Err(LoggerError::Io(_))));
    }
}
