pub mod series;
pub mod history;

pub use series::Series;
pub use history::History;
