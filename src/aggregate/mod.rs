pub mod reduction;
pub mod derived;
pub mod aggregator;

pub use reduction::{ReduceFn, Reduction};
pub use derived::{DeriveFn, DerivedRule};
pub use aggregator::Aggregator;
