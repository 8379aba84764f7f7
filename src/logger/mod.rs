pub mod builder;
pub mod logger;

pub use builder::LoggerBuilder;
pub use logger::Logger;
