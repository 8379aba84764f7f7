pub mod step_buffer;

pub use step_buffer::{concat_values, StepBuffer};
