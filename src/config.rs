use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::FrontierError;

/// How per-period mean log returns are turned into a yearly figure.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Annualization {
    /// `(1 + mean) ^ periods - 1`
    #[default]
    Compounded,
    /// `mean * periods`
    Additive,
}

impl Annualization {
    pub fn annualize(self, mean: f64, periods_per_year: f64) -> f64 {
        match self {
            Annualization::Compounded => (1.0 + mean).powf(periods_per_year) - 1.0,
            Annualization::Additive => mean * periods_per_year,
        }
    }
}

/// Configuration shared by every stage of the frontier pipeline
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct FrontierConfig {
    pub annualization: Annualization,
    // trading days per year for daily prices
    pub periods_per_year: f64,
    // weight resolution, 100 means 1% steps
    pub steps: u32,
    // decimals used when bucketing expected returns
    pub approximation_order: u32,
    // upper bound on the number of enumerated weight vectors
    pub max_portfolios: u64,
    pub risk_free_rate: f64,
}

impl Default for FrontierConfig {
    fn default() -> Self {
        Self {
            annualization: Annualization::Compounded,
            periods_per_year: 250.0,
            steps: 100,
            approximation_order: 3,
            max_portfolios: 5_000_000,
            risk_free_rate: 0.0,
        }
    }
}

impl FrontierConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), FrontierError> {
        if !(self.periods_per_year.is_finite() && self.periods_per_year > 0.0) {
            return Err(FrontierError::InvalidConfig(
                "periods_per_year must be positive".to_string(),
            ));
        }

        if self.steps == 0 {
            return Err(FrontierError::InvalidConfig(
                "steps must be greater than 0".to_string(),
            ));
        }

        // 10^approximation_order has to stay well inside f64 precision
        if self.approximation_order > 12 {
            return Err(FrontierError::InvalidConfig(
                "approximation_order must be at most 12".to_string(),
            ));
        }

        if self.max_portfolios == 0 {
            return Err(FrontierError::InvalidConfig(
                "max_portfolios must be greater than 0".to_string(),
            ));
        }

        if !self.risk_free_rate.is_finite() {
            return Err(FrontierError::InvalidConfig(
                "risk_free_rate must be finite".to_string(),
            ));
        }

        Ok(())
    }
}

/// Save configuration to JSON file
pub fn save_config(config: &FrontierConfig, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json).with_context(|| format!("writing config {}", path.display()))?;
    Ok(())
}

/// Load configuration from JSON file
pub fn load_config(path: &Path) -> Result<FrontierConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: FrontierConfig = serde_json::from_str(&json)?;
    config.validate()?;
    Ok(config)
}
