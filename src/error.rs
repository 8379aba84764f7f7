use thiserror::Error;

/// Errors raised by the logger.
///
/// Every variant is a programmer error: a misconfigured logger or a driver
/// that logs the wrong thing. Nothing here is transient, so nothing is retried.
#[derive(Debug, Error)]
pub enum LoggerError {
    /// A buffered value is neither a number nor a numeric array.
    #[error("parameter `{param}` holds a value of unsupported type `{kind}`")]
    UnsupportedValueType { param: String, kind: String },

    /// Buffered values for one parameter cannot be concatenated.
    #[error("parameter `{param}` mixes incompatible shapes: expected {expected}, found {found}")]
    ShapeMismatch {
        param: String,
        expected: String,
        found: String,
    },

    /// A reduction tag other than `mean` or `max`.
    #[error("aggregation mode `{0}` is not one of \"mean\", \"max\" or a custom function")]
    UnknownAggregationMode(String),

    /// `History::log` called with a step that does not advance the clock.
    #[error("step {step} does not follow the last logged step {last}")]
    NonMonotonicStep { step: usize, last: usize },

    /// One `History::log` call named the same parameter twice.
    #[error("parameter `{name}` logged twice at step {step}")]
    DuplicateParameter { name: String, step: usize },

    /// Query for a parameter that was never logged.
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),

    /// Tracking query without a parameter or a direction.
    #[error("no trackable parameter and direction configured; set them on the logger or pass them explicitly")]
    NoTrackableConfigured,

    #[error("unknown tracking direction `{0}` (expected \"max\" or \"min\")")]
    UnknownDirection(String),

    #[error("unknown print mode `{0}`")]
    UnknownPrintMode(String),

    #[error("unknown progress bar mode `{0}` (expected \"none\", \"epochs\", \"steps\" or \"both\")")]
    UnknownProgressMode(String),

    #[error("unknown plot kind `{0}` (expected \"plot\" or \"summary\")")]
    UnknownPlotKind(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LoggerError>;
