//! Market aggregation and lookup
//!
//! TVL and liquidity are computed either by folding fetched records in
//! process or by delegating the sums to the store. Both paths end in the
//! same `Totals` accumulator and yield identical values.

use crate::store::{MarketStore, StoreError};
use std::sync::Arc;
use thiserror::Error;
use types::aggregate::{fold_totals, MetricValue, Totals};
use types::errors::ArithmeticError;
use types::ids::ChainId;
use types::market::{MarketDetail, Metric};
use types::numeric::Cents;

/// How aggregate sums are obtained from the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum AggregationStrategy {
    /// Fetch every matching record and fold in process
    Fold,
    /// Let the store compute SUM()
    #[default]
    Delegate,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Market not found: {name}")]
    NotFound { name: String },

    /// Cause is for server-side diagnostics only
    #[error("Internal computation failed")]
    Internal(#[source] anyhow::Error),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        ServiceError::Internal(err.into())
    }
}

impl From<ArithmeticError> for ServiceError {
    fn from(err: ArithmeticError) -> Self {
        ServiceError::Internal(err.into())
    }
}

pub struct MarketService {
    store: Arc<dyn MarketStore>,
    strategy: AggregationStrategy,
}

impl MarketService {
    pub fn new(store: Arc<dyn MarketStore>, strategy: AggregationStrategy) -> Self {
        Self { store, strategy }
    }

    pub fn strategy(&self) -> AggregationStrategy {
        self.strategy
    }

    async fn totals(&self, chain_id: Option<&ChainId>) -> Result<Totals, ServiceError> {
        match self.strategy {
            AggregationStrategy::Fold => {
                let markets = self.store.find_markets(chain_id).await?;
                Ok(fold_totals(&markets)?)
            }
            AggregationStrategy::Delegate => Ok(self.store.sum_totals(chain_id).await?),
        }
    }

    /// Sum of supply over markets on `chain_id`, or all markets
    pub async fn compute_tvl(&self, chain_id: Option<&ChainId>) -> Result<Cents, ServiceError> {
        tracing::debug!(chain_id = ?chain_id, "Calculating TVL");
        let totals = self.totals(chain_id).await?;
        let tvl = totals.tvl();
        tracing::info!(chain_id = ?chain_id, %tvl, market_count = totals.count, "TVL calculated");
        Ok(tvl)
    }

    /// Supply minus borrow over the same selection; may be negative
    pub async fn compute_liquidity(&self, chain_id: Option<&ChainId>) -> Result<Cents, ServiceError> {
        tracing::debug!(chain_id = ?chain_id, "Calculating liquidity");
        let totals = self.totals(chain_id).await?;
        let liquidity = totals.liquidity()?;
        tracing::info!(
            chain_id = ?chain_id,
            %liquidity,
            market_count = totals.count,
            "Liquidity calculated"
        );
        Ok(liquidity)
    }

    /// Run only the computation the selector asks for
    pub async fn compute_metric(
        &self,
        chain_id: Option<&ChainId>,
        metric: Metric,
    ) -> Result<MetricValue, ServiceError> {
        match metric {
            Metric::Tvl => self.compute_tvl(chain_id).await.map(MetricValue::Tvl),
            Metric::Liquidity => self.compute_liquidity(chain_id).await.map(MetricValue::Liquidity),
        }
    }

    pub async fn get_market(&self, name: &str) -> Result<MarketDetail, ServiceError> {
        tracing::debug!(name, "Getting market");
        if name.is_empty() {
            return Err(ServiceError::NotFound {
                name: String::new(),
            });
        }

        let Some(market) = self.store.find_by_name(name).await? else {
            tracing::warn!(name, "Market not found");
            return Err(ServiceError::NotFound {
                name: name.to_string(),
            });
        };

        tracing::info!(name, market_id = %market.id, "Market found");
        Ok(MarketDetail::from_market(&market)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use types::ids::MarketId;
    use types::market::Market;

    /// Vec-backed store that counts calls per query shape
    #[derive(Default)]
    struct VecStore {
        markets: Vec<Market>,
        fail: bool,
        find_calls: AtomicUsize,
        sum_calls: AtomicUsize,
    }

    impl VecStore {
        fn with(markets: Vec<Market>) -> Self {
            Self {
                markets,
                ..Default::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn check(&self) -> Result<(), StoreError> {
            if self.fail {
                Err(StoreError::Database(rusqlite::Error::InvalidQuery))
            } else {
                Ok(())
            }
        }

        fn selection(&self, chain_id: Option<&ChainId>) -> Vec<Market> {
            self.markets
                .iter()
                .filter(|m| chain_id.is_none_or(|c| &m.chain_id == c))
                .cloned()
                .collect()
        }
    }

    #[async_trait]
    impl MarketStore for VecStore {
        async fn find_markets(&self, chain_id: Option<&ChainId>) -> Result<Vec<Market>, StoreError> {
            self.find_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            Ok(self.selection(chain_id))
        }

        async fn find_by_name(&self, name: &str) -> Result<Option<Market>, StoreError> {
            self.check()?;
            Ok(self.markets.iter().find(|m| m.name == name).cloned())
        }

        async fn sum_totals(&self, chain_id: Option<&ChainId>) -> Result<Totals, StoreError> {
            self.sum_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            Ok(fold_totals(&self.selection(chain_id))?)
        }
    }

    fn market(id: i64, name: &str, chain: &str, supply: i64, borrow: i64) -> Market {
        Market {
            id: MarketId::try_new(id).unwrap(),
            name: name.to_string(),
            chain_id: ChainId::try_new(chain).unwrap(),
            total_supply_cents: Cents::from(supply),
            total_borrow_cents: Cents::from(borrow),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    fn fixture() -> Vec<Market> {
        vec![
            market(1, "Token 01", "1", 10482, 5915),
            market(2, "Token 02", "1", 20459, 5712),
            market(3, "Token 14", "56", 33008, 14091),
        ]
    }

    fn service(store: VecStore, strategy: AggregationStrategy) -> (Arc<VecStore>, MarketService) {
        let store = Arc::new(store);
        let service = MarketService::new(store.clone(), strategy);
        (store, service)
    }

    #[tokio::test]
    async fn test_tvl_and_liquidity_both_strategies() {
        for strategy in [AggregationStrategy::Fold, AggregationStrategy::Delegate] {
            let (_, svc) = service(VecStore::with(fixture()), strategy);
            let chain_1 = ChainId::try_new("1").unwrap();
            let chain_99 = ChainId::try_new("99").unwrap();

            assert_eq!(svc.compute_tvl(None).await.unwrap(), Cents::new(63949));
            assert_eq!(svc.compute_tvl(Some(&chain_1)).await.unwrap(), Cents::new(30941));
            assert_eq!(svc.compute_tvl(Some(&chain_99)).await.unwrap(), Cents::ZERO);
            assert_eq!(svc.compute_liquidity(None).await.unwrap(), Cents::new(38231));
            assert_eq!(svc.compute_liquidity(Some(&chain_99)).await.unwrap(), Cents::ZERO);
        }
    }

    #[tokio::test]
    async fn test_strategy_selects_query_shape() {
        let (store, svc) = service(VecStore::with(fixture()), AggregationStrategy::Fold);
        svc.compute_tvl(None).await.unwrap();
        assert_eq!(store.find_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.sum_calls.load(Ordering::SeqCst), 0);

        let (store, svc) = service(VecStore::with(fixture()), AggregationStrategy::Delegate);
        svc.compute_liquidity(None).await.unwrap();
        assert_eq!(store.find_calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.sum_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_compute_metric_returns_selected_only() {
        let (_, svc) = service(VecStore::with(fixture()), AggregationStrategy::Delegate);
        assert_eq!(
            svc.compute_metric(None, Metric::Tvl).await.unwrap(),
            MetricValue::Tvl(Cents::new(63949))
        );
        assert_eq!(
            svc.compute_metric(None, Metric::Liquidity).await.unwrap(),
            MetricValue::Liquidity(Cents::new(38231))
        );
    }

    #[tokio::test]
    async fn test_negative_liquidity_not_clamped() {
        let markets = vec![market(1, "Upside Down", "1", 100, 400)];
        let (_, svc) = service(VecStore::with(markets), AggregationStrategy::Fold);
        assert_eq!(svc.compute_liquidity(None).await.unwrap(), Cents::new(-300));
    }

    #[tokio::test]
    async fn test_get_market() {
        let (_, svc) = service(VecStore::with(fixture()), AggregationStrategy::Delegate);
        let detail = svc.get_market("Token 01").await.unwrap();
        assert_eq!(detail.id.value(), 1);
        assert_eq!(detail.tvl, Cents::new(10482));
        assert_eq!(detail.liquidity, Cents::new(4567));
    }

    #[tokio::test]
    async fn test_get_market_not_found() {
        let (_, svc) = service(VecStore::with(fixture()), AggregationStrategy::Delegate);
        let err = svc.get_market("NonExistent").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { ref name } if name == "NonExistent"));
        assert_eq!(err.to_string(), "Market not found: NonExistent");
    }

    #[tokio::test]
    async fn test_get_market_empty_name_skips_store() {
        // A failing store proves the query never ran.
        let (_, svc) = service(VecStore::failing(), AggregationStrategy::Delegate);
        let err = svc.get_market("").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_store_failure_is_internal() {
        for strategy in [AggregationStrategy::Fold, AggregationStrategy::Delegate] {
            let (_, svc) = service(VecStore::failing(), strategy);
            assert!(matches!(
                svc.compute_tvl(None).await.unwrap_err(),
                ServiceError::Internal(_)
            ));
            assert!(matches!(
                svc.compute_liquidity(None).await.unwrap_err(),
                ServiceError::Internal(_)
            ));
        }

        let (_, svc) = service(VecStore::failing(), AggregationStrategy::Delegate);
        let err = svc.get_market("Token 01").await.unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)));
        assert_eq!(err.to_string(), "Internal computation failed");
    }
}
