pub mod value;
pub mod coerce;

pub use value::Value;
pub use coerce::IntoValue;
