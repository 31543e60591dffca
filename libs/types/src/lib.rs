//! Types library for the TVL query service
//!
//! This library provides the core type definitions shared by the service and
//! the pure aggregation routines that compute Total Value Locked and
//! liquidity with exact integer arithmetic.
//!
//! # Modules
//! - `ids`: Identifiers (MarketId, ChainId)
//! - `numeric`: Exact integer currency amounts (Cents)
//! - `market`: Market records, detail views and the metric selector
//! - `aggregate`: Supply/borrow accumulation and metric derivation
//! - `errors`: Error taxonomy

// Public modules
pub mod ids;
pub mod numeric;
pub mod market;
pub mod aggregate;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::market::*;
    pub use crate::aggregate::*;
    pub use crate::errors::*;
}
