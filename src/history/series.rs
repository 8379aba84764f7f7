/// One parameter's values, each tagged with the global step it was logged at.
///
/// Steps are strictly increasing; a parameter that was not logged at some
/// epoch simply has no entry there.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub name: String,
    steps: Vec<usize>,
    values: Vec<f64>,
}

impl Series {
    pub fn new(name: impl Into<String>) -> Self {
        Series {
            name: name.into(),
            steps: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Callers guarantee `step` exceeds the last pushed step.
    pub(crate) fn push(&mut self, step: usize, value: f64) {
        debug_assert!(self.steps.last().map_or(true, |&last| step > last));
        self.steps.push(step);
        self.values.push(value);
    }

    pub fn data(&self) -> &[f64] {
        &self.values
    }

    pub fn steps(&self) -> &[usize] {
        &self.steps
    }

    pub fn last(&self) -> Option<(usize, f64)> {
        self.steps.last().copied().zip(self.values.last().copied())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(step, value)` pairs in logging order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.steps.iter().copied().zip(self.values.iter().copied())
    }
}
