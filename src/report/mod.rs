pub mod printer;
pub mod progress;
pub mod canvas;

pub use printer::{PrintMode, PrintSpec, Printer};
pub use progress::{Progress, ProgressMode, ProgressSink, RecordingSink};
pub use canvas::{Canvas, PlotSpec, TextCanvas};
