use crate::error::FieldError;
use crate::extract::{QueryParams, ValidateQuery};
use serde::Serialize;
use types::aggregate::MetricValue;
use types::ids::ChainId;
use types::market::{MarketDetail, Metric};

const EMPTY_STRING_MESSAGE: &str = "String must contain at least 1 character(s)";

/// Unit every amount in a success payload is denominated in
pub const CURRENCY: &str = "cents";

/// Validated `GET /tvl` parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TvlQuery {
    pub chain_id: Option<ChainId>,
    pub metric: Metric,
}

/// Validated `GET /markets` parameters
///
/// `metric` is accepted for symmetry with `/tvl`; the detail payload always
/// carries both metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketQuery {
    pub name: String,
    pub metric: Metric,
}

fn validate_metric(raw: Option<String>) -> Result<Metric, FieldError> {
    match raw {
        None => Ok(Metric::default()),
        Some(value) => value.parse().map_err(|_| {
            FieldError::new(
                "metric",
                format!(
                    "Invalid enum value. Expected 'tvl' | 'liquidity', received '{}'",
                    value
                ),
            )
            .with_received(value)
        }),
    }
}

fn validate_chain_id(raw: Option<String>) -> Result<Option<ChainId>, FieldError> {
    match raw {
        None => Ok(None),
        Some(value) => ChainId::try_new(value)
            .map(Some)
            .ok_or_else(|| FieldError::new("chainId", EMPTY_STRING_MESSAGE)),
    }
}

fn validate_name(raw: Option<String>) -> Result<String, FieldError> {
    match raw {
        None => Err(FieldError::new("name", "Required")),
        Some(value) if value.is_empty() => Err(FieldError::new("name", EMPTY_STRING_MESSAGE)),
        Some(value) => Ok(value),
    }
}

impl ValidateQuery for TvlQuery {
    fn validate(params: &QueryParams) -> Result<Self, Vec<FieldError>> {
        let chain_id = params.single("chainId").and_then(validate_chain_id);
        let metric = params.single("metric").and_then(validate_metric);

        match (chain_id, metric) {
            (Ok(chain_id), Ok(metric)) => Ok(TvlQuery { chain_id, metric }),
            (chain_id, metric) => Err([chain_id.err(), metric.err()].into_iter().flatten().collect()),
        }
    }
}

impl ValidateQuery for MarketQuery {
    fn validate(params: &QueryParams) -> Result<Self, Vec<FieldError>> {
        let name = params.single("name").and_then(validate_name);
        let metric = params.single("metric").and_then(validate_metric);

        match (name, metric) {
            (Ok(name), Ok(metric)) => Ok(MarketQuery { name, metric }),
            (name, metric) => Err([name.err(), metric.err()].into_iter().flatten().collect()),
        }
    }
}

/// Success envelope: `{ "success": true, "data": ... }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    pub chain_id: ChainId,
}

/// Body of `GET /tvl`: the selected metric under its own key, plus the
/// echoed filter when one was supplied
#[derive(Debug, Clone, Serialize)]
pub struct MetricData {
    #[serde(flatten)]
    pub value: MetricValue,
    pub currency: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Filters>,
}

impl MetricData {
    pub fn new(value: MetricValue, chain_id: Option<ChainId>) -> Self {
        Self {
            value,
            currency: CURRENCY,
            filters: chain_id.map(|chain_id| Filters { chain_id }),
        }
    }
}

/// Body of `GET /markets`
#[derive(Debug, Clone, Serialize)]
pub struct MarketData {
    #[serde(flatten)]
    pub market: MarketDetail,
    pub currency: &'static str,
}

impl From<MarketDetail> for MarketData {
    fn from(market: MarketDetail) -> Self {
        Self {
            market,
            currency: CURRENCY,
        }
    }
}
