//! Conversion between loosely typed option records, as they come out of an option chain or a
//! spreadsheet, and [`OptionParameters`].
//!
//! Rates at this boundary are quoted in percent, volatility as a decimal fraction, maturity as
//! a calendar date or a year fraction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::common::config::PricingDefaults;
use crate::common::models::{GreeksResult, OptionParameters, OptionType};
use crate::error::PricingError;

/// Option chains use ISO dates, manual entry uses day first.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionRecord {
    #[serde(rename = "Ticker", alias = "ticker", default)]
    pub ticker: String,
    #[serde(rename = "Strike", alias = "strike", default)]
    pub strike: String,
    #[serde(rename = "Spot", alias = "spot", default)]
    pub spot: String,
    #[serde(rename = "Maturity", alias = "maturity", default)]
    pub maturity: String,
    #[serde(rename = "Volatility", alias = "volatility", default)]
    pub volatility: String,
    #[serde(rename = "Type", alias = "type", alias = "option_type", default)]
    pub option_type: String,
    /// percent
    #[serde(rename = "Risk Free Rate", alias = "risk_free_rate", default)]
    pub risk_free_rate: Option<String>,
    /// percent
    #[serde(rename = "Dividend Yield", alias = "dividend_yield", default)]
    pub dividend_yield: Option<String>,
}

/// Everything a record needs besides its own fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryContext {
    pub defaults: PricingDefaults,
    /// maturities given as dates are measured from this day
    pub valuation_date: NaiveDate,
}

impl BoundaryContext {
    pub fn new(defaults: PricingDefaults, valuation_date: NaiveDate) -> Self {
        Self {
            defaults,
            valuation_date,
        }
    }
}

fn parse_required(field: &'static str, raw: &str) -> Result<f64, PricingError> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(PricingError::missing(field, raw)),
    }
}

fn parse_percent(field: &'static str, raw: Option<&str>, fallback: f64) -> f64 {
    let raw = match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return fallback,
    };
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => value / 100.0,
        _ => {
            warn!(field, raw, fallback, "unparsable percentage, using default");
            fallback
        }
    }
}

/// Year fraction between `valuation_date` and the maturity, which is either a plain number of
/// years or a date.
pub fn year_fraction(raw: &str, valuation_date: NaiveDate) -> Result<f64, PricingError> {
    let trimmed = raw.trim();
    if let Ok(years) = trimmed.parse::<f64>() {
        return if years.is_finite() {
            Ok(years)
        } else {
            Err(PricingError::missing("maturity", raw))
        };
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .map(|date| (date - valuation_date).num_days() as f64 / DAYS_PER_YEAR)
        .ok_or_else(|| PricingError::missing("maturity", raw))
}

impl OptionRecord {
    pub fn to_parameters(&self, ctx: &BoundaryContext) -> Result<OptionParameters, PricingError> {
        let strike = parse_required("strike", &self.strike)?;
        let spot = parse_required("spot", &self.spot)?;
        let vola = parse_required("volatility", &self.volatility)?;
        let time_to_expiration = year_fraction(&self.maturity, ctx.valuation_date)?;
        let option_type: OptionType = self.option_type.parse()?;
        let rfr = parse_percent(
            "risk_free_rate",
            self.risk_free_rate.as_deref(),
            ctx.defaults.risk_free_rate,
        );
        let dividend_yield = parse_percent(
            "dividend_yield",
            self.dividend_yield.as_deref(),
            ctx.defaults.dividend_yield,
        );
        Ok(OptionParameters::new(
            option_type,
            spot,
            strike,
            time_to_expiration,
            rfr,
            dividend_yield,
            vola,
        ))
    }
}

/// One output row: the identifying fields of the record followed by its valuation.
///
/// For a record that could not be priced the identifying fields are copied from the input as
/// far as they can be read, so `strike` and `spot` may be blank and `option_type` holds the raw
/// text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedOption {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Strike")]
    pub strike: Option<f64>,
    #[serde(rename = "Spot")]
    pub spot: Option<f64>,
    #[serde(rename = "Maturity")]
    pub maturity: String,
    #[serde(rename = "Type")]
    pub option_type: String,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Delta")]
    pub delta: f64,
    #[serde(rename = "Gamma")]
    pub gamma: f64,
    #[serde(rename = "Vega")]
    pub vega: f64,
    #[serde(rename = "Theta")]
    pub theta: f64,
}

impl PricedOption {
    pub fn new(record: &OptionRecord, dp: &OptionParameters, greeks: GreeksResult) -> Self {
        Self {
            ticker: record.ticker.clone(),
            strike: Some(dp.strike),
            spot: Some(dp.asset_price),
            maturity: record.maturity.trim().to_owned(),
            option_type: dp.option_type.to_string(),
            price: greeks.price,
            delta: greeks.delta,
            gamma: greeks.gamma,
            vega: greeks.vega,
            theta: greeks.theta,
        }
    }

    /// Row for a record that was not priced, every output zero.
    pub fn zero_filled(record: &OptionRecord) -> Self {
        let passthrough = |raw: &str| raw.trim().parse::<f64>().ok().filter(|v| v.is_finite());
        Self {
            ticker: record.ticker.clone(),
            strike: passthrough(&record.strike),
            spot: passthrough(&record.spot),
            maturity: record.maturity.trim().to_owned(),
            option_type: record.option_type.trim().to_owned(),
            price: 0.0,
            delta: 0.0,
            gamma: 0.0,
            vega: 0.0,
            theta: 0.0,
        }
    }

    pub fn greeks(&self) -> GreeksResult {
        GreeksResult {
            price: self.price,
            delta: self.delta,
            gamma: self.gamma,
            vega: self.vega,
            theta: self.theta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn valuation_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn ctx() -> BoundaryContext {
        BoundaryContext::new(PricingDefaults::default(), valuation_date())
    }

    fn record(option_type: &str) -> OptionRecord {
        OptionRecord {
            ticker: "AAPL".to_owned(),
            strike: "185".to_owned(),
            spot: "182.5".to_owned(),
            maturity: "2025-01-14".to_owned(),
            volatility: "0.24".to_owned(),
            option_type: option_type.to_owned(),
            risk_free_rate: None,
            dividend_yield: None,
        }
    }

    #[test]
    fn record_to_parameters_uses_defaults() {
        let dp = record("call").to_parameters(&ctx()).unwrap();
        assert_eq!(dp.option_type, OptionType::Call);
        assert_eq!(dp.strike, 185.0);
        assert_eq!(dp.asset_price, 182.5);
        assert_eq!(dp.vola, 0.24);
        assert_eq!(dp.rfr, 0.05);
        assert_eq!(dp.dividend_yield, 0.04);
        assert_approx_eq!(dp.time_to_expiration, 365.0 / 365.0, 1e-12);
    }

    #[test]
    fn rates_are_percent_at_the_boundary() {
        let mut rec = record("PUTS");
        rec.risk_free_rate = Some("4.5".to_owned());
        rec.dividend_yield = Some(" 1 ".to_owned());
        let dp = rec.to_parameters(&ctx()).unwrap();
        assert_eq!(dp.option_type, OptionType::Put);
        assert_approx_eq!(dp.rfr, 0.045, 1e-12);
        assert_approx_eq!(dp.dividend_yield, 0.01, 1e-12);
    }

    #[test]
    fn blank_or_garbage_rates_fall_back_independently() {
        let mut rec = record("call");
        rec.risk_free_rate = Some("n/a".to_owned());
        rec.dividend_yield = Some("2".to_owned());
        let defaults = PricingDefaults {
            risk_free_rate: 0.01,
            dividend_yield: 0.0,
            ..PricingDefaults::default()
        };
        let dp = rec
            .to_parameters(&BoundaryContext::new(defaults, valuation_date()))
            .unwrap();
        assert_eq!(dp.rfr, 0.01);
        assert_approx_eq!(dp.dividend_yield, 0.02, 1e-12);

        rec.dividend_yield = Some("   ".to_owned());
        let dp = rec
            .to_parameters(&BoundaryContext::new(defaults, valuation_date()))
            .unwrap();
        assert_eq!(dp.dividend_yield, 0.0);
    }

    #[test]
    fn maturity_formats() {
        let today = valuation_date();
        assert_approx_eq!(year_fraction("2024-07-14", today).unwrap(), 181.0 / 365.0, 1e-12);
        assert_approx_eq!(year_fraction("14/07/2024", today).unwrap(), 181.0 / 365.0, 1e-12);
        assert_eq!(year_fraction(" 0.25 ", today).unwrap(), 0.25);
        assert_eq!(year_fraction("2024-01-15", today).unwrap(), 0.0);
        assert!(year_fraction("2023-12-15", today).unwrap() < 0.0);
        assert_eq!(
            year_fraction("next friday", today),
            Err(PricingError::missing("maturity", "next friday"))
        );
    }

    #[test]
    fn missing_numeric_fields() {
        let mut rec = record("call");
        rec.strike = String::new();
        assert_eq!(
            rec.to_parameters(&ctx()),
            Err(PricingError::MissingField {
                field: "strike",
                value: String::new()
            })
        );

        let mut rec = record("call");
        rec.volatility = "NaN".to_owned();
        assert!(matches!(
            rec.to_parameters(&ctx()),
            Err(PricingError::MissingField { field: "volatility", .. })
        ));

        let mut rec = record("call");
        rec.maturity = "soon".to_owned();
        assert!(matches!(
            rec.to_parameters(&ctx()),
            Err(PricingError::MissingField { field: "maturity", .. })
        ));
    }

    #[test]
    fn invalid_type_is_reported_after_numeric_fields() {
        assert_eq!(
            record("straddle").to_parameters(&ctx()),
            Err(PricingError::InvalidOptionType("straddle".to_owned()))
        );
        let mut rec = record("straddle");
        rec.spot = "abc".to_owned();
        assert!(matches!(
            rec.to_parameters(&ctx()),
            Err(PricingError::MissingField { field: "spot", .. })
        ));
    }

    #[test]
    fn records_read_from_csv_headers() {
        let data = "\
Ticker,Spot,Maturity,Type,Strike,Volatility
MSFT,410.2,2024-03-15,call,400,0.21
MSFT,410.2,2024-03-15,put,400,0.23
";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let records: Vec<OptionRecord> = reader
            .deserialize::<OptionRecord>()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].option_type, "put");
        assert_eq!(records[0].risk_free_rate, None);
        let dp = records[0].to_parameters(&ctx()).unwrap();
        assert_eq!(dp.strike, 400.0);
        assert_approx_eq!(dp.time_to_expiration, 60.0 / 365.0, 1e-12);
    }

    #[test]
    fn zero_filled_row_keeps_raw_fields() {
        let mut rec = record(" fly ");
        rec.spot = "n/a".to_owned();
        let row = PricedOption::zero_filled(&rec);
        assert_eq!(row.option_type, "fly");
        assert_eq!(row.strike, Some(185.0));
        assert_eq!(row.spot, None);
        assert_eq!(row.maturity, "2025-01-14");
        assert_eq!(row.greeks(), GreeksResult::default());

        let dp = record("Puts").to_parameters(&ctx()).unwrap();
        let priced = PricedOption::new(&record("Puts"), &dp, GreeksResult::default());
        assert_eq!(priced.option_type, "put");
    }
}
