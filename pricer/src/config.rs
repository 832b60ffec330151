use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use pricing::PricingDefaults;
use serde::Deserialize;

/// Contents of the optional TOML file. Rates here are decimal fractions.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PricerConfig {
    pub pricing: PricingDefaults,
}

impl PricerConfig {
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("invalid pricer configuration")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("could not read {}", path.display()))?;
                Self::from_toml(&raw)
            }
            None => Ok(Self::default()),
        }
    }
}
