//! Error types for market values and aggregation
//!
//! Error taxonomy using thiserror

use thiserror::Error;

/// Exact integer arithmetic failures
///
/// Sums never wrap or saturate; a result outside the representable range is
/// reported instead.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("Integer overflow in {op}")]
    Overflow { op: &'static str },
}

/// Parse and construction errors for domain values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Chain id must not be empty")]
    EmptyChainId,

    #[error("Market id must be positive, got {0}")]
    NonPositiveMarketId(i64),

    #[error("Invalid metric: {0}")]
    InvalidMetric(String),

    #[error("Invalid cents amount: {0}")]
    InvalidCents(String),
}
