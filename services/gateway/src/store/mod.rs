//! Market store abstraction
//!
//! The service needs exactly two query shapes from storage: exact-match
//! selection of market records, and server-side sums over the same
//! selection.

mod sqlite;

pub use sqlite::{migrate, SqliteMarketStore};

use async_trait::async_trait;
use thiserror::Error;
use types::aggregate::Totals;
use types::errors::ArithmeticError;
use types::ids::ChainId;
use types::market::Market;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid market row {id}: {reason}")]
    InvalidRow { id: i64, reason: String },

    #[error("Aggregation failed: {0}")]
    Arithmetic(#[from] ArithmeticError),

    #[error("Store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Store connection poisoned")]
    Poisoned,
}

/// Read-only access to market records
///
/// `chain_id` of `None` selects every market.
#[async_trait]
pub trait MarketStore: Send + Sync {
    /// All markets on the given chain, in id order
    async fn find_markets(&self, chain_id: Option<&ChainId>) -> Result<Vec<Market>, StoreError>;

    /// Exact, case-sensitive lookup by name
    async fn find_by_name(&self, name: &str) -> Result<Option<Market>, StoreError>;

    /// Supply and borrow sums over the selection, computed by the store
    async fn sum_totals(&self, chain_id: Option<&ChainId>) -> Result<Totals, StoreError>;
}
