use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use ndarray::ArrayD;

use crate::error::LoggerError;

pub type ReduceFn = Arc<dyn Fn(&ArrayD<f64>) -> f64 + Send + Sync>;

/// How one parameter's epoch of values collapses into a single number.
///
/// Named reductions come from configuration (`"mean"`, `"max"`); anything else
/// is a `Custom` closure supplied through the builder.
#[derive(Clone)]
pub enum Reduction {
    Mean,
    Max,
    Custom(ReduceFn),
}

impl Reduction {
    pub fn custom<F>(f: F) -> Reduction
    where
        F: Fn(&ArrayD<f64>) -> f64 + Send + Sync + 'static,
    {
        Reduction::Custom(Arc::new(f))
    }

    /// Applies the reduction over every element of `values`.
    /// An empty array reduces to NaN for the named reductions.
    pub fn apply(&self, values: &ArrayD<f64>) -> f64 {
        match self {
            Reduction::Mean => values.mean().unwrap_or(f64::NAN),
            Reduction::Max => max_of(values),
            Reduction::Custom(f) => f(values),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Reduction::Mean => "mean",
            Reduction::Max => "max",
            Reduction::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reduction::{}", self.name())
    }
}

impl FromStr for Reduction {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mean" => Ok(Reduction::Mean),
            "max" => Ok(Reduction::Max),
            other => Err(LoggerError::UnknownAggregationMode(other.to_string())),
        }
    }
}

/// NaN-propagating maximum, matching what a float array library reports.
fn max_of(values: &ArrayD<f64>) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().copied().fold(f64::NEG_INFINITY, |acc, x| {
        if acc.is_nan() || x.is_nan() {
            f64::NAN
        } else {
            acc.max(x)
        }
    })
}
