use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    #[error("invalid option type `{0}`, expected call or put")]
    InvalidOptionType(String),
    #[error("unknown greek `{0}`, expected price, delta, gamma, vega or theta")]
    InvalidGreek(String),
    #[error("degenerate inputs: {0}")]
    DegenerateInputs(String),
    #[error("missing or unparsable field `{field}`: `{value}`")]
    MissingField { field: &'static str, value: String },
}

impl PricingError {
    pub(crate) fn degenerate(field: &str, value: f64) -> Self {
        PricingError::DegenerateInputs(format!("{field} = {value}"))
    }

    pub(crate) fn missing(field: &'static str, value: &str) -> Self {
        PricingError::MissingField {
            field,
            value: value.to_owned(),
        }
    }
}
