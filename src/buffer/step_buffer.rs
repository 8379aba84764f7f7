use std::collections::BTreeMap;

use ndarray::{concatenate, Array1, ArrayD, ArrayViewD, Axis};

use crate::error::{LoggerError, Result};
use crate::value::{IntoValue, Value};

/// Raw values logged during the current epoch.
///
/// Keyed by step-type (`"train"`, `"val"`, ...) and then parameter name. Each
/// list keeps logging order and is never empty: a list is only created by
/// `record`, which pushes into it immediately.
#[derive(Debug, Clone, Default)]
pub struct StepBuffer {
    entries: BTreeMap<String, BTreeMap<String, Vec<Value>>>,
}

impl StepBuffer {
    pub fn new() -> Self {
        StepBuffer::default()
    }

    /// Coerces `value` and appends it to the list for `(step_type, param)`.
    pub fn record<V: IntoValue>(&mut self, step_type: &str, param: &str, value: V) {
        self.entries
            .entry(step_type.to_string())
            .or_default()
            .entry(param.to_string())
            .or_default()
            .push(value.into_value());
    }

    /// Buffered values for one parameter, in logging order.
    pub fn values(&self, step_type: &str, param: &str) -> Option<&[Value]> {
        self.entries
            .get(step_type)
            .and_then(|params| params.get(param))
            .map(Vec::as_slice)
    }

    pub fn contains(&self, step_type: &str, param: &str) -> bool {
        self.values(step_type, param).is_some()
    }

    pub fn step_types(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn params<'a>(&'a self, step_type: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .get(step_type)
            .into_iter()
            .flat_map(|params| params.keys().map(String::as_str))
    }

    /// Concatenates the buffered list of every requested parameter.
    ///
    /// Arrays are joined along axis 0; scalars are stacked into a 1-D array.
    /// The buffer is left as is; `reset` clears it once the epoch is done.
    pub fn gather<S: AsRef<str>>(&self, step_type: &str, params: &[S]) -> Result<Vec<ArrayD<f64>>> {
        params
            .iter()
            .map(|param| {
                let param = param.as_ref();
                let values = self.values(step_type, param).ok_or_else(|| {
                    LoggerError::UnknownParameter(format!("{step_type}/{param}"))
                })?;
                concat_values(param, values)
            })
            .collect()
    }

    /// Drops every step-type, parameter and value.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Total number of buffered values across all step-types.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .flat_map(|params| params.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Joins one parameter's buffered values into a single array.
///
/// The first value decides the layout: scalars stack into a 1-D array,
/// arrays concatenate along axis 0 and must agree on every trailing axis.
pub fn concat_values(param: &str, values: &[Value]) -> Result<ArrayD<f64>> {
    if let Some(bad) = values.iter().find(|v| !v.is_numeric()) {
        return Err(LoggerError::UnsupportedValueType {
            param: param.to_string(),
            kind: bad.kind().to_string(),
        });
    }

    match values.first() {
        None => Ok(Array1::<f64>::zeros(0).into_dyn()),
        Some(Value::Array(first)) => {
            let trailing = &first.shape()[1..];
            let mut views: Vec<ArrayViewD<'_, f64>> = Vec::with_capacity(values.len());
            for value in values {
                match value {
                    Value::Array(a) if &a.shape()[1..] == trailing => views.push(a.view()),
                    other => {
                        return Err(LoggerError::ShapeMismatch {
                            param: param.to_string(),
                            expected: trailing_label(trailing),
                            found: other.shape_label(),
                        })
                    }
                }
            }
            concatenate(Axis(0), &views).map_err(|e| LoggerError::ShapeMismatch {
                param: param.to_string(),
                expected: trailing_label(trailing),
                found: e.to_string(),
            })
        }
        Some(_) => values
            .iter()
            .map(|value| match value {
                Value::Scalar(x) => Ok(*x),
                other => Err(LoggerError::ShapeMismatch {
                    param: param.to_string(),
                    expected: "scalar".to_string(),
                    found: other.shape_label(),
                }),
            })
            .collect::<Result<Vec<f64>>>()
            .map(|data| Array1::from(data).into_dyn()),
    }
}

fn trailing_label(trailing: &[usize]) -> String {
    let mut label = String::from("[_");
    for dim in trailing {
        label.push_str(&format!(", {dim}"));
    }
    label.push(']');
    label
}
