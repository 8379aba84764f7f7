use ndarray::ArrayD;

/// A logged value after coercion.
///
/// Whatever the caller hands to `log_step` (a float, a `Vec`, an ndarray, a
/// JSON value, a tensor) ends up as one of these. `Unsupported` keeps the type
/// name of anything that is not numeric; it is stored like any other value
/// and rejected when the epoch is aggregated.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(f64),
    /// Host-memory array of any rank >= 1. 0-d arrays are stored as `Scalar`.
    Array(ArrayD<f64>),
    Unsupported { kind: String },
}

impl Value {
    pub fn unsupported(kind: impl Into<String>) -> Value {
        Value::Unsupported { kind: kind.into() }
    }

    /// Short type name used in error messages.
    pub fn kind(&self) -> &str {
        match self {
            Value::Scalar(_) => "scalar",
            Value::Array(_) => "array",
            Value::Unsupported { kind } => kind,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Value::Unsupported { .. })
    }

    /// Shape description for diagnostics: `scalar` or `[d0, d1, ...]`.
    pub fn shape_label(&self) -> String {
        match self {
            Value::Scalar(_) => "scalar".to_string(),
            Value::Array(array) => format!("{:?}", array.shape()),
            Value::Unsupported { kind } => kind.clone(),
        }
    }
}
