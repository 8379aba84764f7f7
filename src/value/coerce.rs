use ndarray::{Array, Array1, ArrayD, ArrayView, Dimension, IxDyn};

use crate::value::value::Value;

/// Conversion of anything a training loop may log into a host-memory `Value`.
///
/// Implementations never fail: values that are not numeric become
/// `Value::Unsupported` and are reported when the epoch is aggregated.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

macro_rules! scalar_into_value {
    ($($t:ty),*) => {
        $(
            impl IntoValue for $t {
                fn into_value(self) -> Value {
                    Value::Scalar(self as f64)
                }
            }
        )*
    };
}

scalar_into_value!(f64, f32, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Booleans count as 0/1, so a list of hits can be averaged into a rate.
impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Scalar(if self { 1.0 } else { 0.0 })
    }
}

impl IntoValue for Vec<f64> {
    fn into_value(self) -> Value {
        Value::Array(Array1::from(self).into_dyn())
    }
}

impl IntoValue for Vec<f32> {
    fn into_value(self) -> Value {
        self.into_iter().map(f64::from).collect::<Vec<_>>().into_value()
    }
}

impl IntoValue for &[f64] {
    fn into_value(self) -> Value {
        self.to_vec().into_value()
    }
}

impl IntoValue for &[f32] {
    fn into_value(self) -> Value {
        self.iter().copied().map(f64::from).collect::<Vec<_>>().into_value()
    }
}

impl<const N: usize> IntoValue for [f64; N] {
    fn into_value(self) -> Value {
        self.to_vec().into_value()
    }
}

impl<D: Dimension> IntoValue for Array<f64, D> {
    fn into_value(self) -> Value {
        from_dyn(self.into_dyn())
    }
}

impl<D: Dimension> IntoValue for Array<f32, D> {
    fn into_value(self) -> Value {
        from_dyn(self.mapv(f64::from).into_dyn())
    }
}

impl<'a, D: Dimension> IntoValue for ArrayView<'a, f64, D> {
    fn into_value(self) -> Value {
        from_dyn(self.to_owned().into_dyn())
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::unsupported("string")
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::unsupported("string")
    }
}

impl IntoValue for serde_json::Value {
    fn into_value(self) -> Value {
        from_json(&self)
    }
}

impl IntoValue for &serde_json::Value {
    fn into_value(self) -> Value {
        from_json(self)
    }
}

#[cfg(feature = "candle")]
impl IntoValue for &candle_core::Tensor {
    /// Copies the tensor to host memory as f64, keeping its shape. The copy
    /// carries no autograd graph.
    fn into_value(self) -> Value {
        let dims = self.dims().to_vec();
        let host = self
            .to_device(&candle_core::Device::Cpu)
            .and_then(|t| t.to_dtype(candle_core::DType::F64))
            .and_then(|t| t.flatten_all())
            .and_then(|t| t.to_vec1::<f64>());
        match host {
            Ok(data) if dims.is_empty() => data
                .first()
                .copied()
                .map(Value::Scalar)
                .unwrap_or_else(|| Value::unsupported("tensor")),
            Ok(data) => ArrayD::from_shape_vec(IxDyn(&dims), data)
                .map(Value::Array)
                .unwrap_or_else(|_| Value::unsupported("tensor")),
            Err(_) => Value::unsupported("tensor"),
        }
    }
}

#[cfg(feature = "candle")]
impl IntoValue for candle_core::Tensor {
    fn into_value(self) -> Value {
        (&self).into_value()
    }
}

fn from_dyn(array: ArrayD<f64>) -> Value {
    if array.ndim() == 0 {
        match array.iter().next() {
            Some(&x) => Value::Scalar(x),
            None => Value::unsupported("array"),
        }
    } else {
        Value::Array(array)
    }
}

/// Numbers become scalars, rectangular arrays of numbers become n-d arrays,
/// everything else is reported by its JSON kind.
pub fn from_json(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(x) => Value::Scalar(x),
            None => Value::unsupported("number"),
        },
        serde_json::Value::Bool(b) => b.into_value(),
        serde_json::Value::Null => Value::unsupported("null"),
        serde_json::Value::String(_) => Value::unsupported("string"),
        serde_json::Value::Object(_) => Value::unsupported("object"),
        serde_json::Value::Array(_) => {
            let shape = json_shape(value);
            let mut data = Vec::new();
            if !flatten_json(value, &shape, &mut data) {
                return Value::unsupported("ragged or non-numeric array");
            }
            ArrayD::from_shape_vec(IxDyn(&shape), data)
                .map(Value::Array)
                .unwrap_or_else(|_| Value::unsupported("array"))
        }
    }
}

/// Shape implied by following the first element at every nesting level.
fn json_shape(value: &serde_json::Value) -> Vec<usize> {
    let mut shape = Vec::new();
    let mut current = value;
    while let serde_json::Value::Array(items) = current {
        shape.push(items.len());
        match items.first() {
            Some(first) => current = first,
            None => break,
        }
    }
    shape
}

fn flatten_json(value: &serde_json::Value, shape: &[usize], out: &mut Vec<f64>) -> bool {
    match (value, shape.split_first()) {
        (serde_json::Value::Array(items), Some((&len, rest))) => {
            items.len() == len && items.iter().all(|item| flatten_json(item, rest, out))
        }
        (serde_json::Value::Number(n), None) => match n.as_f64() {
            Some(x) => {
                out.push(x);
                true
            }
            None => false,
        },
        _ => false,
    }
}
