//! Exact aggregation of market supply and borrow totals
//!
//! TVL is the sum of supply. Liquidity is defined as the difference of sums,
//! `sum(supply) - sum(borrow)`, whether the sums were folded here over
//! fetched records or computed by the store. With exact arithmetic this is
//! the same value as summing per-market differences.

use crate::errors::ArithmeticError;
use crate::market::{Market, Metric};
use crate::numeric::Cents;
use serde::Serialize;

/// Running supply and borrow sums over a market selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub supply: Cents,
    pub borrow: Cents,
    pub count: u64,
}

impl Totals {
    /// Build totals from store-side sums
    ///
    /// A SQL `SUM` over zero rows yields NULL; that is the empty selection,
    /// which sums to zero.
    pub fn from_sums(supply: Option<Cents>, borrow: Option<Cents>, count: u64) -> Self {
        Self {
            supply: supply.unwrap_or(Cents::ZERO),
            borrow: borrow.unwrap_or(Cents::ZERO),
            count,
        }
    }

    /// Accumulate one market
    pub fn add(&mut self, market: &Market) -> Result<(), ArithmeticError> {
        self.add_amounts(market.total_supply_cents, market.total_borrow_cents)
    }

    /// Accumulate one row's raw supply and borrow amounts
    pub fn add_amounts(&mut self, supply: Cents, borrow: Cents) -> Result<(), ArithmeticError> {
        self.supply = self.supply.checked_add(supply)?;
        self.borrow = self.borrow.checked_add(borrow)?;
        self.count += 1;
        Ok(())
    }

    /// Combine totals of two disjoint selections
    pub fn merge(self, other: Totals) -> Result<Totals, ArithmeticError> {
        Ok(Totals {
            supply: self.supply.checked_add(other.supply)?,
            borrow: self.borrow.checked_add(other.borrow)?,
            count: self.count + other.count,
        })
    }

    pub fn tvl(&self) -> Cents {
        self.supply
    }

    /// May be negative when aggregate borrow exceeds supply
    pub fn liquidity(&self) -> Result<Cents, ArithmeticError> {
        self.supply.checked_sub(self.borrow)
    }

    pub fn metric(&self, metric: Metric) -> Result<MetricValue, ArithmeticError> {
        match metric {
            Metric::Tvl => Ok(MetricValue::Tvl(self.tvl())),
            Metric::Liquidity => self.liquidity().map(MetricValue::Liquidity),
        }
    }
}

/// Fold markets into totals, starting from zero
pub fn fold_totals<'a, I>(markets: I) -> Result<Totals, ArithmeticError>
where
    I: IntoIterator<Item = &'a Market>,
{
    markets.into_iter().try_fold(Totals::default(), |mut totals, market| {
        totals.add(market)?;
        Ok(totals)
    })
}

pub fn tvl<'a, I>(markets: I) -> Result<Cents, ArithmeticError>
where
    I: IntoIterator<Item = &'a Market>,
{
    fold_totals(markets).map(|totals| totals.tvl())
}

pub fn liquidity<'a, I>(markets: I) -> Result<Cents, ArithmeticError>
where
    I: IntoIterator<Item = &'a Market>,
{
    fold_totals(markets)?.liquidity()
}

/// A single computed metric, keyed by its name when serialized
///
/// Flattened into a response body this yields `"tvl": n` or
/// `"liquidity": n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricValue {
    Tvl(Cents),
    Liquidity(Cents),
}
