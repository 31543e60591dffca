//! Identifier types for market records
//!
//! `MarketId` is the store-assigned primary key. `ChainId` is the opaque
//! network partition key used to filter aggregates.

use crate::errors::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned market identifier
///
/// Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct MarketId(i64);

impl MarketId {
    /// Try to create a MarketId, returning None if not positive
    pub fn try_new(id: i64) -> Option<Self> {
        if id > 0 {
            Some(Self(id))
        } else {
            None
        }
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for MarketId {
    type Error = ParseError;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        Self::try_new(id).ok_or(ParseError::NonPositiveMarketId(id))
    }
}

impl From<MarketId> for i64 {
    fn from(id: MarketId) -> Self {
        id.0
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Blockchain/network partition key (e.g. "1", "56")
///
/// Opaque beyond being non-empty: no trimming, no case folding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChainId(String);

impl ChainId {
    /// Try to create a ChainId, returning None if empty
    pub fn try_new(chain_id: impl Into<String>) -> Option<Self> {
        let s = chain_id.into();
        if s.is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    /// Get the chain id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ChainId {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_new(s).ok_or(ParseError::EmptyChainId)
    }
}

impl From<ChainId> for String {
    fn from(chain_id: ChainId) -> Self {
        chain_id.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
