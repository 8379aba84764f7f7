use std::collections::BTreeMap;

use tracing::debug;

use crate::aggregate::derived::DerivedRule;
use crate::aggregate::reduction::Reduction;
use crate::buffer::step_buffer::{concat_values, StepBuffer};
use crate::error::Result;

/// Turns one step-type's buffered values into epoch-level scalars.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    rules: BTreeMap<String, Reduction>,
    derived: Vec<DerivedRule>,
}

impl Aggregator {
    pub fn new() -> Self {
        Aggregator::default()
    }

    pub fn set_rule(&mut self, param: impl Into<String>, reduction: Reduction) {
        self.rules.insert(param.into(), reduction);
    }

    pub fn add_derived(&mut self, rule: DerivedRule) {
        self.derived.push(rule);
    }

    pub fn rule(&self, param: &str) -> Option<&Reduction> {
        self.rules.get(param)
    }

    pub fn derived(&self) -> &[DerivedRule] {
        &self.derived
    }

    pub fn is_derived_input(&self, param: &str) -> bool {
        self.derived.iter().any(|rule| rule.consumes(param))
    }

    /// Reduces every parameter buffered under `step_type`.
    ///
    /// Output names are `"{step_type}_{param}"` for reductions and
    /// `"{step_type}_{output}"` for derived rules. A parameter with no rule
    /// that no derived rule consumes is reduced with `Mean`, so nothing
    /// buffered is silently dropped. Rules whose parameters were not logged
    /// under this step-type are skipped.
    pub fn aggregate(&self, buffer: &StepBuffer, step_type: &str) -> Result<Vec<(String, f64)>> {
        let default_mean = Reduction::Mean;
        let mut out = Vec::new();

        for param in buffer.params(step_type) {
            let reduction = match self.rules.get(param) {
                Some(reduction) => reduction,
                None if self.is_derived_input(param) => continue,
                None => {
                    debug!(step_type, param, "no aggregation rule, reducing with mean");
                    &default_mean
                }
            };
            let values = buffer.values(step_type, param).unwrap_or_default();
            let array = concat_values(param, values)?;
            out.push((format!("{step_type}_{param}"), reduction.apply(&array)));
        }

        for rule in &self.derived {
            if let Some(missing) = rule.inputs.iter().find(|input| !buffer.contains(step_type, input)) {
                debug!(
                    step_type,
                    output = %rule.output,
                    missing = %missing,
                    "derived rule skipped, input not logged"
                );
                continue;
            }
            let arrays = buffer.gather(step_type, &rule.inputs)?;
            out.push((format!("{step_type}_{}", rule.output), rule.compute(&arrays)));
        }

        Ok(out)
    }
}
