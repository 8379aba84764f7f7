use std::collections::{BTreeMap, BTreeSet};

use crate::error::{LoggerError, Result};
use crate::history::series::Series;

/// Append-only store of epoch-level values under one global step clock.
///
/// Every `log` call must use a step strictly greater than the previous call,
/// whichever parameters either call touched. History is never rewritten.
#[derive(Debug, Clone, Default)]
pub struct History {
    series: BTreeMap<String, Series>,
    last_step: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        History::default()
    }

    /// Appends `(step, value)` to each named parameter.
    ///
    /// The whole call is validated before anything is written, so on error
    /// the history is exactly as it was.
    pub fn log<I, K>(&mut self, step: usize, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        if let Some(last) = self.last_step {
            if step <= last {
                return Err(LoggerError::NonMonotonicStep { step, last });
            }
        }

        let batch: Vec<(String, f64)> = values.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let mut seen = BTreeSet::new();
        for (name, _) in &batch {
            if !seen.insert(name.as_str()) {
                return Err(LoggerError::DuplicateParameter { name: name.clone(), step });
            }
        }

        for (name, value) in batch {
            self.series
                .entry(name)
                .or_insert_with_key(|name| Series::new(name.clone()))
                .push(step, value);
        }
        self.last_step = Some(step);
        Ok(())
    }

    pub fn get(&self, param: &str) -> Result<&Series> {
        self.series
            .get(param)
            .ok_or_else(|| LoggerError::UnknownParameter(param.to_string()))
    }

    pub fn contains(&self, param: &str) -> bool {
        self.series.contains_key(param)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.series.values()
    }

    /// Step of the most recent `log` call.
    pub fn last_step(&self) -> Option<usize> {
        self.last_step
    }

    /// Number of parameters with at least one entry.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_and_get() {
        let mut h = History::new();
        h.log(0, [("loss", 1.0), ("acc", 0.5)]).unwrap();
        h.log(1, [("loss", 0.8)]).unwrap();
        let loss = h.get("loss").unwrap();
        assert_eq!(loss.data(), &[1.0, 0.8]);
        assert_eq!(loss.steps(), &[0, 1]);
        assert_eq!(h.get("acc").unwrap().iter().collect::<Vec<_>>(), vec![(0, 0.5)]);
        assert_eq!(h.last_step(), Some(1));
    }

    #[test]
    fn test_sparse_series() {
        let mut h = History::new();
        h.log(0, [("a", 1.0)]).unwrap();
        h.log(1, [("b", 2.0)]).unwrap();
        h.log(2, [("a", 3.0)]).unwrap();
        assert_eq!(h.get("a").unwrap().steps(), &[0, 2]);
        assert_eq!(h.get("b").unwrap().steps(), &[1]);
        assert_eq!(h.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_repeated_step_is_rejected() {
        let mut h = History::new();
        h.log(0, [("a", 1.0)]).unwrap();
        let err = h.log(0, [("b", 1.0)]).unwrap_err();
        assert!(matches!(err, LoggerError::NonMonotonicStep { step: 0, last: 0 }));
        assert!(!h.contains("b"));
    }

    #[test]
    fn test_decreasing_step_is_rejected() {
        let mut h = History::new();
        h.log(5, [("a", 1.0)]).unwrap();
        assert!(matches!(h.log(3, [("a", 2.0)]), Err(LoggerError::NonMonotonicStep { .. })));
        assert_eq!(h.get("a").unwrap().len(), 1);
    }

    #[test]
    fn test_empty_log_advances_clock() {
        let mut h = History::new();
        h.log(0, Vec::<(String, f64)>::new()).unwrap();
        assert!(h.is_empty());
        assert!(h.log(0, [("a", 1.0)]).is_err());
        assert!(h.log(1, [("a", 1.0)]).is_ok());
    }

    #[test]
    fn test_duplicate_in_one_call_leaves_history_untouched() {
        let mut h = History::new();
        let err = h.log(0, [("a", 1.0), ("b", 2.0), ("a", 3.0)]).unwrap_err();
        assert!(matches!(err, LoggerError::DuplicateParameter { ref name, step: 0 } if name == "a"));
        assert!(h.is_empty());
        assert_eq!(h.last_step(), None);
    }

    #[test]
    fn test_unknown_parameter() {
        let h = History::new();
        assert!(matches!(h.get("loss"), Err(LoggerError::UnknownParameter(ref p)) if p == "loss"));
    }
}
