use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

pub const DEFAULT_HIDDEN_NODES: usize = 200;
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;
pub const DEFAULT_EPOCHS: usize = 1;

/// Training settings as read from a YAML file or the command line. Every field can be omitted.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub hidden_nodes: Option<usize>,
    pub learning_rate: Option<f64>,
    pub epochs: Option<usize>,
    // A fresh random seed when absent.
    pub seed: Option<u64>,
}

// What a run actually uses, after defaults have been filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub hidden_nodes: usize,
    pub learning_rate: f64,
    pub epochs: usize,
    pub seed: Option<u64>,
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a mapping.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    // merge configs where the second overwrites the first
    pub fn merge(self, other: Self) -> Self {
        Self {
            hidden_nodes: other.hidden_nodes.or(self.hidden_nodes),
            learning_rate: other.learning_rate.or(self.learning_rate),
            epochs: other.epochs.or(self.epochs),
            seed: other.seed.or(self.seed),
        }
    }

    pub fn resolve(self) -> Settings {
        Settings {
            hidden_nodes: self.hidden_nodes.unwrap_or(DEFAULT_HIDDEN_NODES),
            learning_rate: self.learning_rate.unwrap_or(DEFAULT_LEARNING_RATE),
            epochs: self.epochs.unwrap_or(DEFAULT_EPOCHS),
            seed: self.seed,
        }
    }
}
