use serde::{Deserialize, Serialize};

/// Which shape the gamma formula and the volatility decay term of theta take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GreekConvention {
    /// gamma = e^(-qT) n(d1) / (S σ √T), decay term n(d1) S σ e^(-qT) / (2 √T)
    #[default]
    Textbook,
    /// gamma = e^(-qT) n(d1) σ √T / S, decay term n(d1) S σ e^(-qT) √T / 2,
    /// as the formulas were historically written out
    Multiplicative,
}

/// Inputs used whenever a record leaves the rate or the dividend yield blank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingDefaults {
    /// decimal fraction, e.g. 0.05
    pub risk_free_rate: f64,
    /// decimal fraction, e.g. 0.04
    pub dividend_yield: f64,
    pub convention: GreekConvention,
}

impl Default for PricingDefaults {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.05,
            dividend_yield: 0.04,
            convention: GreekConvention::Textbook,
        }
    }
}
