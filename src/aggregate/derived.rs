use std::fmt;
use std::sync::Arc;

use ndarray::ArrayD;

pub type DeriveFn = Arc<dyn Fn(&[ArrayD<f64>]) -> f64 + Send + Sync>;

/// An epoch value computed jointly from several buffered parameters.
///
/// `func` receives one concatenated array per entry of `inputs`, in the same
/// order. Inputs consumed here are not mean-reduced on their own unless they
/// also carry an explicit reduction.
#[derive(Clone)]
pub struct DerivedRule {
    pub inputs: Vec<String>,
    pub output: String,
    func: DeriveFn,
}

impl DerivedRule {
    pub fn new<I, S, F>(inputs: I, output: impl Into<String>, func: F) -> DerivedRule
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&[ArrayD<f64>]) -> f64 + Send + Sync + 'static,
    {
        DerivedRule {
            inputs: inputs.into_iter().map(Into::into).collect(),
            output: output.into(),
            func: Arc::new(func),
        }
    }

    pub fn consumes(&self, param: &str) -> bool {
        self.inputs.iter().any(|input| input == param)
    }

    pub fn compute(&self, arrays: &[ArrayD<f64>]) -> f64 {
        (self.func)(arrays)
    }
}

impl fmt::Debug for DerivedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedRule")
            .field("inputs", &self.inputs)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}
