use std::str::FromStr;

use crate::error::{LoggerError, Result};
use crate::history::{History, Series};
use crate::track::Direction;

/// One parameter to print, optionally followed by its best value so far.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintSpec {
    pub param: String,
    pub best: Option<Direction>,
}

impl PrintSpec {
    pub fn new(param: impl Into<String>) -> Self {
        PrintSpec { param: param.into(), best: None }
    }

    pub fn with_best(param: impl Into<String>, direction: Direction) -> Self {
        PrintSpec { param: param.into(), best: Some(direction) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrintMode {
    /// Latest value of each configured parameter.
    #[default]
    Last,
    /// Latest value of every parameter in the history.
    All,
}

impl FromStr for PrintMode {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "last" => Ok(PrintMode::Last),
            "all" => Ok(PrintMode::All),
            other => Err(LoggerError::UnknownPrintMode(other.to_string())),
        }
    }
}

/// Formats the one-line epoch report.
#[derive(Debug, Clone, Default)]
pub struct Printer {
    specs: Vec<PrintSpec>,
    mode: PrintMode,
}

impl Printer {
    pub fn new(specs: Vec<PrintSpec>, mode: PrintMode) -> Self {
        Printer { specs, mode }
    }

    pub fn specs(&self) -> &[PrintSpec] {
        &self.specs
    }

    /// Builds the report line, e.g. `train_loss 0.4210  val_acc 0.8100 (0.8300)`.
    pub fn format_line(&self, history: &History) -> Result<String> {
        let fields = match self.mode {
            PrintMode::Last => self
                .specs
                .iter()
                .map(|spec| Ok(format_field(history.get(&spec.param)?, spec.best)))
                .collect::<Result<Vec<_>>>()?,
            PrintMode::All => history
                .iter()
                .map(|series| {
                    let best = self
                        .specs
                        .iter()
                        .find(|spec| spec.param == series.name)
                        .and_then(|spec| spec.best);
                    format_field(series, best)
                })
                .collect::<Vec<_>>(),
        };
        Ok(fields.join("  "))
    }
}

fn format_field(series: &Series, best: Option<Direction>) -> String {
    let last = series.last().map_or(f64::NAN, |(_, v)| v);
    match best.and_then(|direction| direction.last_extreme(series.data())) {
        Some((_, best)) => format!("{} {:.4} ({:.4})", series.name, last, best),
        None => format!("{} {:.4}", series.name, last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_history() -> History {
        let mut h = History::new();
        h.log(0, [("train_loss", 0.9), ("val_acc", 0.70)]).unwrap();
        h.log(1, [("train_loss", 0.5), ("val_acc", 0.83)]).unwrap();
        h.log(2, [("train_loss", 0.421), ("val_acc", 0.81)]).unwrap();
        h
    }

    #[test]
    fn test_last_mode() {
        let printer = Printer::new(
            vec![PrintSpec::new("train_loss"), PrintSpec::with_best("val_acc", Direction::Maximize)],
            PrintMode::Last,
        );
        assert_eq!(
            printer.format_line(&sample_history()).unwrap(),
            "train_loss 0.4210  val_acc 0.8100 (0.8300)"
        );
    }

    #[test]
    fn test_all_mode_lists_every_series() {
        let printer = Printer::new(vec![PrintSpec::with_best("train_loss", Direction::Minimize)], PrintMode::All);
        assert_eq!(
            printer.format_line(&sample_history()).unwrap(),
            "train_loss 0.4210 (0.4210)  val_acc 0.8100"
        );
    }

    #[test]
    fn test_missing_param() {
        let printer = Printer::new(vec![PrintSpec::new("val_loss")], PrintMode::Last);
        assert!(matches!(
            printer.format_line(&sample_history()),
            Err(LoggerError::UnknownParameter(_))
        ));
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("all".parse::<PrintMode>().unwrap(), PrintMode::All);
        assert!(matches!("exponential".parse::<PrintMode>(), Err(LoggerError::UnknownPrintMode(_))));
    }
}
