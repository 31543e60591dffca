use crate::error::AppError;
use crate::extract::ValidatedQuery;
use crate::models::{ApiResponse, MetricData, TvlQuery};
use crate::state::AppState;
use axum::{extract::State, Json};

/// `GET /tvl`: one aggregate metric, optionally filtered by chain
pub async fn get_tvl(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<TvlQuery>,
) -> Result<Json<ApiResponse<MetricData>>, AppError> {
    tracing::debug!(chain_id = ?query.chain_id, metric = %query.metric, "GET /tvl request");

    let value = state
        .service
        .compute_metric(query.chain_id.as_ref(), query.metric)
        .await?;

    Ok(Json(ApiResponse::ok(MetricData::new(value, query.chain_id))))
}
