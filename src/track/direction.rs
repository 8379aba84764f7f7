use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::LoggerError;

/// Which way "better" points for a tracked parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Maximize,
    Minimize,
}

impl Direction {
    /// Orders `a` against `b` so that `Greater` means `a` is preferred.
    /// `None` when either side is NaN.
    pub fn compare(self, a: f64, b: f64) -> Option<Ordering> {
        match self {
            Direction::Maximize => a.partial_cmp(&b),
            Direction::Minimize => b.partial_cmp(&a),
        }
    }

    /// Index and value of the last occurrence of the extreme of `values`.
    ///
    /// NaN never counts as an extreme. Returns `None` when no value is
    /// comparable.
    pub fn last_extreme(self, values: &[f64]) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, &x) in values.iter().enumerate() {
            if x.is_nan() {
                continue;
            }
            match best {
                Some((_, current)) if self.compare(x, current) == Some(Ordering::Less) => {}
                _ => best = Some((idx, x)),
            }
        }
        best
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Maximize => "max",
            Direction::Minimize => "min",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "max" | "maximize" => Ok(Direction::Maximize),
            "min" | "minimize" => Ok(Direction::Minimize),
            other => Err(LoggerError::UnknownDirection(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_extreme_picks_last_tie() {
        assert_eq!(Direction::Maximize.last_extreme(&[1.0, 3.0, 2.0, 3.0, 1.0]), Some((3, 3.0)));
        assert_eq!(Direction::Minimize.last_extreme(&[1.0, 3.0, 2.0, 3.0, 1.0]), Some((4, 1.0)));
    }

    #[test]
    fn test_last_extreme_skips_nan() {
        assert_eq!(Direction::Minimize.last_extreme(&[f64::NAN, 2.0, f64::NAN]), Some((1, 2.0)));
        assert_eq!(Direction::Maximize.last_extreme(&[f64::NAN]), None);
        assert_eq!(Direction::Maximize.last_extreme(&[]), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!("max".parse::<Direction>().unwrap(), Direction::Maximize);
        assert_eq!("minimize".parse::<Direction>().unwrap(), Direction::Minimize);
        assert!(matches!("up".parse::<Direction>(), Err(LoggerError::UnknownDirection(_))));
    }

    #[test]
    fn test_display_round_trips() {
        for d in [Direction::Maximize, Direction::Minimize] {
            assert_eq!(d.to_string().parse::<Direction>().unwrap(), d);
        }
    }
}
