use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::config::PricingDefaults;
use crate::error::PricingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl FromStr for OptionType {
    type Err = PricingError;

    /// Accepts `call`, `calls`, `put` and `puts` in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" | "calls" => Ok(OptionType::Call),
            "put" | "puts" => Ok(OptionType::Put),
            _ => Err(PricingError::InvalidOptionType(s.to_owned())),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Greek {
    Price,
    Delta,
    Gamma,
    Vega,
    Theta,
}

impl FromStr for Greek {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "price" => Ok(Greek::Price),
            "delta" => Ok(Greek::Delta),
            "gamma" => Ok(Greek::Gamma),
            "vega" => Ok(Greek::Vega),
            "theta" => Ok(Greek::Theta),
            _ => Err(PricingError::InvalidGreek(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionParameters {
    pub option_type: OptionType,
    /// the asset's price at time t
    pub asset_price: f64,
    /// the strike or exercise price of the asset
    pub strike: f64,
    /// (T - t) in years, where T is the time of the option's expiration and t is the current time
    pub time_to_expiration: f64,
    /// the annualized (continuously compounded) risk-free interest rate
    pub rfr: f64,
    /// the annualized continuous dividend yield
    pub dividend_yield: f64,
    /// the annualized standard deviation of the stock's returns
    pub vola: f64,
}

impl OptionParameters {
    pub fn new(
        option_type: OptionType,
        asset_price: f64,
        strike: f64,
        time_to_expiration: f64,
        rfr: f64,
        dividend_yield: f64,
        vola: f64,
    ) -> Self {
        Self {
            option_type,
            asset_price,
            strike,
            time_to_expiration,
            rfr,
            dividend_yield,
            vola,
        }
    }

    /// Rate and dividend yield taken from `defaults`.
    pub fn with_defaults(
        option_type: OptionType,
        asset_price: f64,
        strike: f64,
        time_to_expiration: f64,
        vola: f64,
        defaults: &PricingDefaults,
    ) -> Self {
        Self::new(
            option_type,
            asset_price,
            strike,
            time_to_expiration,
            defaults.risk_free_rate,
            defaults.dividend_yield,
            vola,
        )
    }

    pub fn with_option_type(self, option_type: OptionType) -> Self {
        Self {
            option_type,
            ..self
        }
    }

    pub fn with_asset_price(self, asset_price: f64) -> Self {
        Self {
            asset_price,
            ..self
        }
    }

    pub fn with_strike(self, strike: f64) -> Self {
        Self { strike, ..self }
    }

    /// Rejects parameter sets for which d1 and d2 are undefined.
    pub fn validate(&self) -> Result<(), PricingError> {
        let positive = [
            ("spot", self.asset_price),
            ("strike", self.strike),
            ("time to expiration", self.time_to_expiration),
            ("volatility", self.vola),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(PricingError::degenerate(name, value));
            }
        }
        for (name, value) in [("risk-free rate", self.rfr), ("dividend yield", self.dividend_yield)] {
            if !value.is_finite() {
                return Err(PricingError::degenerate(name, value));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GreeksResult {
    pub price: f64,
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub theta: f64,
}

impl GreeksResult {
    pub fn get(&self, greek: Greek) -> f64 {
        match greek {
            Greek::Price => self.price,
            Greek::Delta => self.delta,
            Greek::Gamma => self.gamma,
            Greek::Vega => self.vega,
            Greek::Theta => self.theta,
        }
    }
}
