use crate::error::{LoggerError, Result};
use crate::history::History;
use crate::track::direction::Direction;

/// True iff the last value of `track` is the extreme of the whole track.
///
/// Every repeat of the extreme counts as best.
pub fn is_best(track: &[f64], direction: Direction) -> bool {
    match direction.last_extreme(track) {
        Some((idx, _)) => idx + 1 == track.len(),
        None => false,
    }
}

/// Entries logged strictly after the most recent occurrence of the extreme.
///
/// A track with no comparable value has made no progress at all, so the
/// whole length is returned.
pub fn steps_without_progress(track: &[f64], direction: Direction) -> usize {
    match direction.last_extreme(track) {
        Some((idx, _)) => track.len() - 1 - idx,
        None => track.len(),
    }
}

/// Best-epoch queries over a `History`.
///
/// Holds an optional default parameter and direction; every query may
/// override either one. Neither has a fallback: a query that ends up without
/// a parameter or without a direction fails with `NoTrackableConfigured`
/// rather than assuming minimization.
#[derive(Debug, Clone, Default)]
pub struct Tracker {
    trackable: Option<String>,
    direction: Option<Direction>,
}

impl Tracker {
    pub fn new(trackable: Option<String>, direction: Option<Direction>) -> Self {
        Tracker { trackable, direction }
    }

    pub fn trackable(&self) -> Option<&str> {
        self.trackable.as_deref()
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Whether queries without overrides can be answered.
    pub fn is_configured(&self) -> bool {
        self.trackable.is_some() && self.direction.is_some()
    }

    fn resolve<'a>(
        &'a self,
        param: Option<&'a str>,
        direction: Option<Direction>,
    ) -> Result<(&'a str, Direction)> {
        let param = param.or(self.trackable.as_deref());
        let direction = direction.or(self.direction);
        match (param, direction) {
            (Some(param), Some(direction)) => Ok((param, direction)),
            _ => Err(LoggerError::NoTrackableConfigured),
        }
    }

    pub fn is_best(
        &self,
        history: &History,
        param: Option<&str>,
        direction: Option<Direction>,
    ) -> Result<bool> {
        let (param, direction) = self.resolve(param, direction)?;
        Ok(is_best(history.get(param)?.data(), direction))
    }

    pub fn steps_without_progress(
        &self,
        history: &History,
        param: Option<&str>,
        direction: Option<Direction>,
    ) -> Result<usize> {
        let (param, direction) = self.resolve(param, direction)?;
        Ok(steps_without_progress(history.get(param)?.data(), direction))
    }

    /// `(step, value)` of the most recent best entry.
    pub fn best(
        &self,
        history: &History,
        param: Option<&str>,
        direction: Option<Direction>,
    ) -> Result<Option<(usize, f64)>> {
        let (param, direction) = self.resolve(param, direction)?;
        let series = history.get(param)?;
        Ok(direction
            .last_extreme(series.data())
            .map(|(idx, value)| (series.steps()[idx], value)))
    }

    /// True once `patience` entries have passed without a new best.
    pub fn should_stop(
        &self,
        history: &History,
        patience: usize,
        param: Option<&str>,
        direction: Option<Direction>,
    ) -> Result<bool> {
        Ok(self.steps_without_progress(history, param, direction)? >= patience)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(name: &str, values: &[f64]) -> History {
        let mut h = History::new();
        for (step, &v) in values.iter().enumerate() {
            h.log(step, [(name, v)]).unwrap();
        }
        h
    }

    #[test]
    fn test_steps_without_progress_uses_last_tie() {
        let track = [1.0, 3.0, 2.0, 3.0, 1.0];
        assert_eq!(steps_without_progress(&track, Direction::Maximize), 1);
        assert_eq!(steps_without_progress(&track, Direction::Minimize), 0);
    }

    #[test]
    fn test_is_best_at_each_point() {
        let rising = [1.0, 2.0, 3.0];
        assert!(is_best(&rising, Direction::Maximize));
        assert!(!is_best(&[1.0, 2.0, 3.0, 0.5], Direction::Maximize));
        assert!(!is_best(&[3.0, 2.0, 1.0], Direction::Maximize));
        assert!(is_best(&[3.0, 2.0, 1.0], Direction::Minimize));
    }

    #[test]
    fn test_is_best_on_repeat_of_extreme() {
        assert!(is_best(&[2.0, 5.0, 5.0], Direction::Maximize));
        assert_eq!(steps_without_progress(&[2.0, 5.0, 5.0], Direction::Maximize), 0);
    }

    #[test]
    fn test_nan_track() {
        assert!(!is_best(&[f64::NAN, f64::NAN], Direction::Minimize));
        assert_eq!(steps_without_progress(&[f64::NAN, f64::NAN], Direction::Minimize), 2);
        assert!(!is_best(&[1.0, f64::NAN], Direction::Minimize));
        assert_eq!(steps_without_progress(&[1.0, f64::NAN], Direction::Minimize), 1);
    }

    #[test]
    fn test_tracker_defaults() {
        let h = history_of("val_loss", &[0.9, 0.5, 0.7]);
        let tracker = Tracker::new(Some("val_loss".into()), Some(Direction::Minimize));
        assert!(!tracker.is_best(&h, None, None).unwrap());
        assert_eq!(tracker.steps_without_progress(&h, None, None).unwrap(), 1);
        assert_eq!(tracker.best(&h, None, None).unwrap(), Some((1, 0.5)));
        assert!(tracker.is_best(&h, None, Some(Direction::Maximize)).is_ok());
    }

    #[test]
    fn test_explicit_arguments_override_defaults() {
        let mut h = history_of("val_loss", &[0.9, 0.5, 0.7]);
        h.log(3, [("val_acc", 0.8)]).unwrap();
        let tracker = Tracker::new(Some("val_loss".into()), Some(Direction::Minimize));
        assert!(tracker.is_best(&h, Some("val_acc"), Some(Direction::Maximize)).unwrap());
        assert_eq!(tracker.best(&h, Some("val_acc"), Some(Direction::Maximize)).unwrap(), Some((3, 0.8)));
    }

    #[test]
    fn test_missing_configuration() {
        let h = history_of("loss", &[1.0]);
        let tracker = Tracker::default();
        assert!(matches!(tracker.is_best(&h, None, None), Err(LoggerError::NoTrackableConfigured)));
        assert!(matches!(
            tracker.steps_without_progress(&h, Some("loss"), None),
            Err(LoggerError::NoTrackableConfigured)
        ));
        assert!(tracker.is_best(&h, Some("loss"), Some(Direction::Minimize)).unwrap());
    }

    #[test]
    fn test_is_configured_needs_param_and_direction() {
        assert!(!Tracker::default().is_configured());
        assert!(!Tracker::new(Some("val_loss".into()), None).is_configured());
        assert!(!Tracker::new(None, Some(Direction::Maximize)).is_configured());
        assert!(Tracker::new(Some("val_loss".into()), Some(Direction::Maximize)).is_configured());
    }

    #[test]
    fn test_config_without_tracking_is_not_configured() {
        let cfg = crate::LoggerConfig::from_json_str(r#"{"prints": ["train_loss"]}"#).unwrap();
        let logger = crate::Logger::from_config(&cfg).unwrap();
        assert!(!logger.tracker().is_configured());
    }

    #[test]
    fn test_unknown_tracked_parameter() {
        let tracker = Tracker::new(Some("val_loss".into()), Some(Direction::Minimize));
        assert!(matches!(
            tracker.is_best(&History::new(), None, None),
            Err(LoggerError::UnknownParameter(_))
        ));
    }

    #[test]
    fn test_should_stop() {
        let h = history_of("loss", &[1.0, 0.5, 0.6, 0.7]);
        let tracker = Tracker::new(Some("loss".into()), Some(Direction::Minimize));
        assert!(tracker.should_stop(&h, 2, None, None).unwrap());
        assert!(!tracker.should_stop(&h, 3, None, None).unwrap());
    }
}
