use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// An entry of `prints`: a bare parameter name, or `[name, "max" | "min"]`
/// to also show the best value so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrintEntry {
    Param(String),
    WithBest(String, String),
}

/// An entry of `plots`: `{"kind": "plot", "params": [...]}` or `{"kind": "summary"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotEntry {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
}

/// JSON-serializable logger configuration.
///
/// Tags are kept as strings here and resolved by `LoggerBuilder::from_config`,
/// which rejects unknown values before any epoch is logged. Custom reductions
/// and derived rules are closures and can only be added through the builder.
///
/// Every field is optional:
///
/// ```json
/// {
///   "aggregable": {"loss": "mean", "acc": "max"},
///   "trackable": "val_loss",
///   "tracking_mode": "min",
///   "prints": ["train_loss", ["val_acc", "max"]],
///   "print_mode": "last",
///   "progressbar": "epochs",
///   "plots": [{"kind": "plot", "params": ["train_loss", "val_loss"]}, {"kind": "summary"}]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Parameter name -> `"mean"` or `"max"`.
    pub aggregable: BTreeMap<String, String>,
    pub trackable: Option<String>,
    /// `"max"` or `"min"`.
    pub tracking_mode: Option<String>,
    pub prints: Vec<PrintEntry>,
    /// `"last"` (default) or `"all"`.
    pub print_mode: Option<String>,
    /// `"none"` (default), `"epochs"`, `"steps"` or `"both"`.
    pub progressbar: Option<String>,
    pub plots: Vec<PlotEntry>,
}

impl LoggerConfig {
    pub fn from_json_str(text: &str) -> Result<LoggerConfig> {
        Ok(serde_json::from_str(text)?)
    }

    /// Deserializes a config from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<LoggerConfig> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}
