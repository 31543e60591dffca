use crate::error::AppError;
use crate::extract::ValidatedQuery;
use crate::models::{ApiResponse, MarketData, MarketQuery};
use crate::state::AppState;
use axum::{extract::State, Json};

/// `GET /markets`: detail for one market by exact name
///
/// Both metrics are always returned; `metric` does not change the shape.
pub async fn get_market(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<MarketQuery>,
) -> Result<Json<ApiResponse<MarketData>>, AppError> {
    tracing::debug!(name = %query.name, metric = %query.metric, "GET /markets request");

    let market = state.service.get_market(&query.name).await?;

    Ok(Json(ApiResponse::ok(MarketData::from(market))))
}
