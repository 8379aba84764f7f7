pub mod direction;
pub mod tracker;

pub use direction::Direction;
pub use tracker::{is_best, steps_without_progress, Tracker};
