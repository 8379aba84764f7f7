pub mod error;
pub mod value;
pub mod buffer;
pub mod aggregate;
pub mod history;
pub mod track;
pub mod report;
pub mod config;
pub mod logger;

// Convenience re-exports
pub use error::{LoggerError, Result};
pub use value::{IntoValue, Value};
pub use buffer::StepBuffer;
pub use aggregate::{Aggregator, DerivedRule, Reduction};
pub use history::{History, Series};
pub use track::{Direction, Tracker};
pub use report::{Canvas, PlotSpec, PrintMode, PrintSpec, Progress, ProgressMode, ProgressSink, RecordingSink, TextCanvas};
pub use config::LoggerConfig;
pub use logger::{Logger, LoggerBuilder};
