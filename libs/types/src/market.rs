//! Market records and their derived views

use crate::aggregate::Totals;
use crate::errors::{ArithmeticError, ParseError};
use crate::ids::{ChainId, MarketId};
use crate::numeric::Cents;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single named pool with supply/borrow totals on one chain
///
/// Owned by the store; the service only ever reads it. `borrow <= supply` is
/// expected upstream but not relied upon anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub id: MarketId,
    pub name: String,
    pub chain_id: ChainId,
    pub total_supply_cents: Cents,
    pub total_borrow_cents: Cents,
    pub created_at: DateTime<Utc>,
}

/// Detail view of one market with both metrics filled in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketDetail {
    pub id: MarketId,
    pub name: String,
    pub chain_id: ChainId,
    pub tvl: Cents,
    pub liquidity: Cents,
    pub total_supply_cents: Cents,
    pub total_borrow_cents: Cents,
}

impl MarketDetail {
    /// Build the detail view for a single market.
    ///
    /// Metrics come from the same accumulator used for aggregates, so a
    /// market's `tvl`/`liquidity` always equal the aggregate over the
    /// one-element set containing it.
    pub fn from_market(market: &Market) -> Result<Self, ArithmeticError> {
        let mut totals = Totals::default();
        totals.add(market)?;

        Ok(Self {
            id: market.id,
            name: market.name.clone(),
            chain_id: market.chain_id.clone(),
            tvl: totals.tvl(),
            liquidity: totals.liquidity()?,
            total_supply_cents: market.total_supply_cents,
            total_borrow_cents: market.total_borrow_cents,
        })
    }
}

/// Metric selector accepted by both query endpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Sum of supplied value
    #[default]
    Tvl,
    /// Sum of supplied minus borrowed value
    Liquidity,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Tvl => "tvl",
            Metric::Liquidity => "liquidity",
        }
    }
}

impl FromStr for Metric {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tvl" => Ok(Metric::Tvl),
            "liquidity" => Ok(Metric::Liquidity),
            other => Err(ParseError::InvalidMetric(other.to_string())),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
