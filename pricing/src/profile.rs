//! How a price or a Greek moves with the spot, all else fixed.

use ndarray::{Array1, Array2};

use crate::analytic::black_scholes::{BlackScholesMerton, Sensitivities};
use crate::common::models::{Greek, OptionParameters};
use crate::error::PricingError;

/// Spots `from, from + step, ...` strictly below `to`. Empty when `from == to`.
pub fn spot_ladder(from: f64, to: f64, step: f64) -> Result<Array1<f64>, PricingError> {
    if !from.is_finite() || !to.is_finite() {
        return Err(PricingError::DegenerateInputs(format!(
            "spot ladder bounds {from}..{to}"
        )));
    }
    if !(step.is_finite() && step > 0.0) {
        return Err(PricingError::degenerate("step", step));
    }
    if to < from {
        return Err(PricingError::DegenerateInputs(format!(
            "spot ladder runs backwards from {from} to {to}"
        )));
    }
    Ok(Array1::range(from, to, step))
}

pub fn spot_profile(
    engine: &BlackScholesMerton,
    base: &OptionParameters,
    spots: &Array1<f64>,
    greek: Greek,
) -> Result<Array1<f64>, PricingError> {
    spots
        .iter()
        .map(|&spot| engine.greek(greek, &base.with_asset_price(spot)))
        .collect::<Result<Vec<_>, _>>()
        .map(Array1::from)
}

/// One row per strike, one column per spot.
pub fn strike_grid(
    engine: &BlackScholesMerton,
    base: &OptionParameters,
    strikes: &[f64],
    spots: &Array1<f64>,
    greek: Greek,
) -> Result<Array2<f64>, PricingError> {
    let mut grid = Array2::zeros((strikes.len(), spots.len()));
    for (mut row, &strike) in grid.rows_mut().into_iter().zip(strikes) {
        let profile = spot_profile(engine, &base.with_strike(strike), spots, greek)?;
        row.assign(&profile);
    }
    Ok(grid)
}
