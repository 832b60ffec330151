//! Independent evaluation of many options at once.
//!
//! Results always come back in input order, one per input, whether or not the `parallel`
//! feature is enabled.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info};

use crate::analytic::black_scholes::{BlackScholesMerton, Sensitivities};
use crate::common::models::{GreeksResult, OptionParameters};
use crate::error::PricingError;
use crate::record::{BoundaryContext, OptionRecord, PricedOption};

#[cfg(feature = "parallel")]
fn map_ordered<T, U, F>(items: &[T], f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(usize, &T) -> U + Sync + Send,
{
    items.par_iter().enumerate().map(|(i, item)| f(i, item)).collect()
}

#[cfg(not(feature = "parallel"))]
fn map_ordered<T, U, F>(items: &[T], f: F) -> Vec<U>
where
    F: Fn(usize, &T) -> U,
{
    items.iter().enumerate().map(|(i, item)| f(i, item)).collect()
}

pub fn evaluate_parameters(
    engine: &BlackScholesMerton,
    params: &[OptionParameters],
) -> Vec<Result<GreeksResult, PricingError>> {
    map_ordered(params, |_, dp| engine.greeks(dp))
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordFailure {
    /// position of the record in the input
    pub index: usize,
    /// the record as it was read
    pub record: OptionRecord,
    pub error: PricingError,
}

/// What the caller does with records that could not be priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    #[default]
    Skip,
    /// keep the row with every output set to zero
    ZeroFill,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    outcomes: Vec<Result<PricedOption, RecordFailure>>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn outcomes(&self) -> &[Result<PricedOption, RecordFailure>] {
        &self.outcomes
    }

    pub fn successes(&self) -> impl Iterator<Item = &PricedOption> {
        self.outcomes.iter().filter_map(|o| o.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &RecordFailure> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err())
    }

    /// Output rows in input order. Zero-filled rows carry whatever identifying fields could be
    /// read from the failed record.
    pub fn rows(&self, policy: FailurePolicy) -> Vec<PricedOption> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match (outcome, policy) {
                (Ok(priced), _) => Some(priced.clone()),
                (Err(_), FailurePolicy::Skip) => None,
                (Err(failure), FailurePolicy::ZeroFill) => {
                    Some(PricedOption::zero_filled(&failure.record))
                }
            })
            .collect()
    }
}

fn evaluate_record(
    engine: &BlackScholesMerton,
    record: &OptionRecord,
    ctx: &BoundaryContext,
) -> Result<PricedOption, PricingError> {
    let dp = record.to_parameters(ctx)?;
    let greeks = engine.greeks(&dp)?;
    Ok(PricedOption::new(record, &dp, greeks))
}

pub fn evaluate_records(
    engine: &BlackScholesMerton,
    records: &[OptionRecord],
    ctx: &BoundaryContext,
) -> BatchReport {
    let outcomes = map_ordered(records, |index, record| {
        evaluate_record(engine, record, ctx).map_err(|error| {
            debug!(index, ticker = %record.ticker, %error, "record not priced");
            RecordFailure {
                index,
                record: record.clone(),
                error,
            }
        })
    });
    let report = BatchReport { outcomes };
    info!(
        records = report.len(),
        priced = report.successes().count(),
        failed = report.failures().count(),
        "batch evaluated"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::PricingDefaults;
    use crate::common::models::OptionType;
    use chrono::NaiveDate;

    fn ctx() -> BoundaryContext {
        BoundaryContext::new(
            PricingDefaults::default(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        )
    }

    fn chain(n: usize) -> Vec<OptionRecord> {
        (0..n)
            .map(|i| OptionRecord {
                ticker: format!("T{i}"),
                strike: format!("{}", 80 + 5 * i),
                spot: "100".to_owned(),
                maturity: "2024-12-20".to_owned(),
                volatility: "0.3".to_owned(),
                option_type: if i % 2 == 0 { "call" } else { "Puts" }.to_owned(),
                risk_free_rate: None,
                dividend_yield: None,
            })
            .collect()
    }

    #[test]
    fn one_bad_type_does_not_abort_the_batch() {
        let engine = BlackScholesMerton::default();
        let mut records = chain(8);
        records[3].option_type = "straddle".to_owned();

        let report = evaluate_records(&engine, &records, &ctx());
        assert_eq!(report.len(), 8);
        assert_eq!(report.successes().count(), 7);

        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].index, 3);
        assert_eq!(failures[0].record, records[3]);
        assert_eq!(
            failures[0].error,
            PricingError::InvalidOptionType("straddle".to_owned())
        );

        let tickers: Vec<_> = report.successes().map(|p| p.ticker.as_str()).collect();
        assert_eq!(tickers, ["T0", "T1", "T2", "T4", "T5", "T6", "T7"]);
    }

    #[test]
    fn batch_matches_single_evaluation() {
        let engine = BlackScholesMerton::default();
        let records = chain(20);
        let report = evaluate_records(&engine, &records, &ctx());
        for (record, outcome) in records.iter().zip(report.outcomes()) {
            let dp = record.to_parameters(&ctx()).unwrap();
            let priced = outcome.as_ref().unwrap();
            assert_eq!(priced.greeks(), engine.greeks(&dp).unwrap());
            assert_eq!(priced.option_type, dp.option_type.to_string());
            assert_eq!(priced.strike, Some(dp.strike));
        }
    }

    #[test]
    fn degenerate_and_missing_fields_are_per_record() {
        let engine = BlackScholesMerton::default();
        let mut records = chain(4);
        records[0].volatility = "0".to_owned();
        records[2].spot = String::new();
        records[3].maturity = "2023-06-01".to_owned();

        let report = evaluate_records(&engine, &records, &ctx());
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(
            failures.iter().map(|f| f.index).collect::<Vec<_>>(),
            [0, 2, 3]
        );
        assert!(matches!(failures[0].error, PricingError::DegenerateInputs(_)));
        assert!(matches!(
            failures[1].error,
            PricingError::MissingField { field: "spot", .. }
        ));
        assert!(matches!(failures[2].error, PricingError::DegenerateInputs(_)));
    }

    #[test]
    fn failure_policies() {
        let engine = BlackScholesMerton::default();
        let mut records = chain(3);
        records[1].strike = "abc".to_owned();
        records[2].option_type = "fly".to_owned();
        let report = evaluate_records(&engine, &records, &ctx());

        let skipped = report.rows(FailurePolicy::Skip);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].ticker, "T0");

        let filled = report.rows(FailurePolicy::ZeroFill);
        assert_eq!(filled.len(), 3);
        assert_eq!(filled[0], skipped[0]);
        assert_eq!(filled[1].ticker, "T1");
        assert_eq!(filled[1].option_type, "Puts");
        assert_eq!(filled[1].strike, None);
        assert_eq!(filled[1].spot, Some(100.0));
        assert_eq!(filled[1].greeks(), GreeksResult::default());
        // an unreadable type is passed through, never replaced by call or put
        assert_eq!(filled[2].option_type, "fly");
        assert_eq!(filled[2].strike, Some(90.0));
        assert_eq!(filled[2].greeks(), GreeksResult::default());
    }

    #[test]
    fn parameter_batch_preserves_order() {
        let engine = BlackScholesMerton::default();
        let params: Vec<_> = (1..=50)
            .map(|i| {
                OptionParameters::new(OptionType::Call, 100.0, i as f64 * 4.0, 1.0, 0.05, 0.0, 0.2)
            })
            .collect();
        let results = evaluate_parameters(&engine, &params);
        assert_eq!(results.len(), 50);
        // call prices fall as the strike rises
        let prices: Vec<f64> = results.iter().map(|r| r.as_ref().unwrap().price).collect();
        assert!(prices.windows(2).all(|w| w[0] >= w[1]));
        assert!(evaluate_parameters(&engine, &[]).is_empty());
    }
}
