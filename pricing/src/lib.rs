//! Closed-form Black-Scholes-Merton prices and Greeks for European options
//! with a continuous dividend yield.
//!
//! ```
//! use pricing::analytic::black_scholes::{BlackScholesMerton, OptionPrice, Sensitivities};
//! use pricing::common::models::{OptionParameters, OptionType};
//!
//! let dp = OptionParameters::new(OptionType::Call, 100.0, 100.0, 1.0, 0.05, 0.0, 0.2);
//! let engine = BlackScholesMerton::default();
//! assert_eq!(engine.price(&dp).unwrap(), 10.451);
//! assert_eq!(engine.delta(&dp).unwrap(), 0.6368);
//! ```

pub mod analytic;
pub mod batch;
pub mod common;
pub mod error;
pub mod profile;
pub mod record;

pub use analytic::black_scholes::{BlackScholesMerton, OptionPrice, Sensitivities};
pub use batch::{evaluate_parameters, evaluate_records, BatchReport, FailurePolicy, RecordFailure};
pub use common::config::{GreekConvention, PricingDefaults};
pub use common::models::{Greek, GreeksResult, OptionParameters, OptionType};
pub use error::PricingError;
pub use record::{BoundaryContext, OptionRecord, PricedOption};
