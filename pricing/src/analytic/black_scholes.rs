use crate::common::config::{GreekConvention, PricingDefaults};
use crate::common::models::{Greek, GreeksResult, OptionParameters, OptionType};
use crate::error::PricingError;
use probability::distribution::{Continuous, Distribution, Gaussian};

pub(crate) fn cdf(d: f64) -> f64 {
    let normal = Gaussian::new(0.0, 1.0);
    normal.distribution(d)
}

pub(crate) fn pdf(d: f64) -> f64 {
    let normal = Gaussian::new(0.0, 1.0);
    normal.density(d)
}

/// Half-to-even rounding at `decimals` places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10_f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

fn finite(name: &str, value: f64) -> Result<f64, PricingError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PricingError::degenerate(name, value))
    }
}

pub trait OptionPrice {
    type Params;
    fn price(&self, params: &Self::Params) -> Result<f64, PricingError>;
}

/// First and second order sensitivities on top of a price.
pub trait Sensitivities: OptionPrice {
    fn delta(&self, params: &Self::Params) -> Result<f64, PricingError>;
    fn gamma(&self, params: &Self::Params) -> Result<f64, PricingError>;
    fn vega(&self, params: &Self::Params) -> Result<f64, PricingError>;
    fn theta(&self, params: &Self::Params) -> Result<f64, PricingError>;

    fn greek(&self, greek: Greek, params: &Self::Params) -> Result<f64, PricingError> {
        match greek {
            Greek::Price => self.price(params),
            Greek::Delta => self.delta(params),
            Greek::Gamma => self.gamma(params),
            Greek::Vega => self.vega(params),
            Greek::Theta => self.theta(params),
        }
    }

    fn greeks(&self, params: &Self::Params) -> Result<GreeksResult, PricingError> {
        Ok(GreeksResult {
            price: self.price(params)?,
            delta: self.delta(params)?,
            gamma: self.gamma(params)?,
            vega: self.vega(params)?,
            theta: self.theta(params)?,
        })
    }
}

/// d1, d2 and the discount factors every quantity is built from.
#[derive(Debug, Clone, Copy)]
struct Terms {
    d1: f64,
    d2: f64,
    sqrt_t: f64,
    /// e^(-qT)
    div_factor: f64,
    /// e^(-rT)
    disc_factor: f64,
}

impl Terms {
    fn new(dp: &OptionParameters) -> Result<Self, PricingError> {
        dp.validate()?;
        let sqrt_t = dp.time_to_expiration.sqrt();
        let sigma_exp = dp.vola * sqrt_t;
        let d1 = ((dp.asset_price / dp.strike).ln()
            + (dp.rfr - dp.dividend_yield + dp.vola.powi(2) / 2.0) * dp.time_to_expiration)
            / sigma_exp;
        let d1 = finite("d1", d1)?;
        let d2 = d1 - sigma_exp;
        Ok(Self {
            d1,
            d2,
            sqrt_t,
            div_factor: (-dp.dividend_yield * dp.time_to_expiration).exp(),
            disc_factor: (-dp.rfr * dp.time_to_expiration).exp(),
        })
    }

    fn value(&self, dp: &OptionParameters) -> f64 {
        match dp.option_type {
            OptionType::Call => {
                dp.asset_price * self.div_factor * cdf(self.d1)
                    - dp.strike * self.disc_factor * cdf(self.d2)
            }
            OptionType::Put => {
                dp.strike * self.disc_factor * cdf(-self.d2)
                    - dp.asset_price * self.div_factor * cdf(-self.d1)
            }
        }
    }

    fn delta(&self, dp: &OptionParameters) -> f64 {
        match dp.option_type {
            OptionType::Call => self.div_factor * cdf(self.d1),
            OptionType::Put => self.div_factor * (cdf(self.d1) - 1.0),
        }
    }

    fn gamma(&self, dp: &OptionParameters, convention: GreekConvention) -> f64 {
        let sigma_exp = dp.vola * self.sqrt_t;
        let scaled_density = self.div_factor * pdf(self.d1) / dp.asset_price;
        match convention {
            GreekConvention::Textbook => scaled_density / sigma_exp,
            GreekConvention::Multiplicative => scaled_density * sigma_exp,
        }
    }

    /// Per one volatility point.
    fn vega(&self, dp: &OptionParameters) -> f64 {
        dp.asset_price * self.div_factor * self.sqrt_t * pdf(self.d1) / 100.0
    }

    /// Per calendar day.
    fn theta(&self, dp: &OptionParameters, convention: GreekConvention) -> f64 {
        let half_decay = pdf(self.d1) * dp.asset_price * dp.vola * self.div_factor / 2.0;
        let decay = match convention {
            GreekConvention::Textbook => half_decay / self.sqrt_t,
            GreekConvention::Multiplicative => half_decay * self.sqrt_t,
        };
        let carry = match dp.option_type {
            OptionType::Call => {
                dp.dividend_yield * dp.asset_price * self.div_factor * cdf(self.d1)
                    - dp.rfr * dp.strike * self.disc_factor * cdf(self.d2)
            }
            OptionType::Put => {
                dp.rfr * dp.strike * self.disc_factor * cdf(-self.d2)
                    - dp.dividend_yield * dp.asset_price * self.div_factor * cdf(-self.d1)
            }
        };
        (carry - decay) / 365.0
    }
}

pub fn d1(dp: &OptionParameters) -> Result<f64, PricingError> {
    Terms::new(dp).map(|terms| terms.d1)
}

pub fn d2(dp: &OptionParameters) -> Result<f64, PricingError> {
    Terms::new(dp).map(|terms| terms.d2)
}

/// European Put and Call option prices and Greeks for stocks paying a continuous dividend yield.
/// https://en.wikipedia.org/wiki/Black-Scholes_model
///
/// Prices are rounded to 3 decimals, Greeks to 4. Vega is per volatility point, theta per
/// calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlackScholesMerton {
    convention: GreekConvention,
}

impl BlackScholesMerton {
    pub fn new(convention: GreekConvention) -> Self {
        Self { convention }
    }

    pub fn from_defaults(defaults: &PricingDefaults) -> Self {
        Self::new(defaults.convention)
    }

    pub fn convention(&self) -> GreekConvention {
        self.convention
    }
}

impl OptionPrice for BlackScholesMerton {
    type Params = OptionParameters;

    fn price(&self, dp: &OptionParameters) -> Result<f64, PricingError> {
        let terms = Terms::new(dp)?;
        finite("price", terms.value(dp)).map(|v| round_to(v, 3))
    }
}

impl Sensitivities for BlackScholesMerton {
    fn delta(&self, dp: &OptionParameters) -> Result<f64, PricingError> {
        let terms = Terms::new(dp)?;
        finite("delta", terms.delta(dp)).map(|v| round_to(v, 4))
    }

    fn gamma(&self, dp: &OptionParameters) -> Result<f64, PricingError> {
        let terms = Terms::new(dp)?;
        finite("gamma", terms.gamma(dp, self.convention)).map(|v| round_to(v, 4))
    }

    fn vega(&self, dp: &OptionParameters) -> Result<f64, PricingError> {
        let terms = Terms::new(dp)?;
        finite("vega", terms.vega(dp)).map(|v| round_to(v, 4))
    }

    fn theta(&self, dp: &OptionParameters) -> Result<f64, PricingError> {
        let terms = Terms::new(dp)?;
        finite("theta", terms.theta(dp, self.convention)).map(|v| round_to(v, 4))
    }

    fn greeks(&self, dp: &OptionParameters) -> Result<GreeksResult, PricingError> {
        let terms = Terms::new(dp)?;
        Ok(GreeksResult {
            price: round_to(finite("price", terms.value(dp))?, 3),
            delta: round_to(finite("delta", terms.delta(dp))?, 4),
            gamma: round_to(finite("gamma", terms.gamma(dp, self.convention))?, 4),
            vega: round_to(finite("vega", terms.vega(dp))?, 4),
            theta: round_to(finite("theta", terms.theta(dp, self.convention))?, 4),
        })
    }
}
