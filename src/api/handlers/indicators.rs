//! Indicator request handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::INDICATOR_TAG;
use crate::api::dto::{
    AggregateResponse, DateRangeQuery, ErrorResponse, IndicatorTypeQuery, MinValueQuery,
};
use crate::dto::IndicatorDto;
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::ValidatedJson;

/// Routes:
/// - GET /                - List all indicators
/// - POST /               - Create an indicator
/// - GET /by-type         - Indicators of one type
/// - GET /by-date-range   - Indicators collected inside a window
/// - GET /above           - Indicators with value >= min
/// - GET /stats/average   - Mean value of a type
/// - GET /stats/max       - Largest value of a type
/// - GET /{id}            - Indicator by id
/// - PUT /{id}            - Replace an indicator
/// - DELETE /{id}         - Delete an indicator
pub fn indicator_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_indicators, create_indicator))
        .routes(routes!(get_by_type))
        .routes(routes!(get_by_date_range))
        .routes(routes!(get_above_value))
        .routes(routes!(get_average_value))
        .routes(routes!(get_max_value))
        .routes(routes!(get_indicator, update_indicator, delete_indicator))
}

#[utoipa::path(
    get,
    path = "/",
    tag = INDICATOR_TAG,
    responses((status = 200, description = "All indicators", body = Vec<IndicatorDto>))
)]
async fn list_indicators(State(state): State<AppState>) -> AppResult<Json<Vec<IndicatorDto>>> {
    let indicators = state
        .with_services(|s| async move { s.indicators.get_all().await })
        .await?;
    Ok(Json(indicators))
}

#[utoipa::path(
    post,
    path = "/",
    tag = INDICATOR_TAG,
    request_body = IndicatorDto,
    responses(
        (status = 201, description = "Indicator created", body = IndicatorDto),
        (status = 409, description = "Id already taken", body = ErrorResponse)
    )
)]
async fn create_indicator(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<IndicatorDto>,
) -> AppResult<(StatusCode, Json<IndicatorDto>)> {
    let created = state
        .with_services(|s| async move { s.indicators.create(payload).await })
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/by-type",
    tag = INDICATOR_TAG,
    params(IndicatorTypeQuery),
    responses((status = 200, description = "Indicators of the type", body = Vec<IndicatorDto>))
)]
async fn get_by_type(
    State(state): State<AppState>,
    Query(query): Query<IndicatorTypeQuery>,
) -> AppResult<Json<Vec<IndicatorDto>>> {
    let indicators = state
        .with_services(|s| async move { s.indicators.get_by_type(query.indicator_type).await })
        .await?;
    Ok(Json(indicators))
}

/// GET /api/indicators/by-date-range - Indicators collected in `[start, end]`
#[utoipa::path(
    get,
    path = "/by-date-range",
    tag = INDICATOR_TAG,
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Indicators inside the window", body = Vec<IndicatorDto>),
        (status = 400, description = "start is after end", body = ErrorResponse)
    )
)]
async fn get_by_date_range(
    State(state): State<AppState>,
    Query(range): Query<DateRangeQuery>,
) -> AppResult<Json<Vec<IndicatorDto>>> {
    let indicators = state
        .with_services(|s| async move {
            s.indicators.get_by_date_range(range.start, range.end).await
        })
        .await?;
    Ok(Json(indicators))
}

#[utoipa::path(
    get,
    path = "/above",
    tag = INDICATOR_TAG,
    params(MinValueQuery),
    responses((status = 200, description = "Indicators with value >= min", body = Vec<IndicatorDto>))
)]
async fn get_above_value(
    State(state): State<AppState>,
    Query(query): Query<MinValueQuery>,
) -> AppResult<Json<Vec<IndicatorDto>>> {
    let indicators = state
        .with_services(|s| async move { s.indicators.get_above_value(query.min).await })
        .await?;
    Ok(Json(indicators))
}

#[utoipa::path(
    get,
    path = "/stats/average",
    tag = INDICATOR_TAG,
    params(IndicatorTypeQuery),
    responses(
        (status = 200, description = "Mean value", body = AggregateResponse),
        (status = 404, description = "No indicator of the type", body = ErrorResponse)
    )
)]
async fn get_average_value(
    State(state): State<AppState>,
    Query(query): Query<IndicatorTypeQuery>,
) -> AppResult<Json<AggregateResponse>> {
    let indicator_type = query.indicator_type;
    let value = state
        .with_services(|s| async move { s.indicators.get_average_value(indicator_type).await })
        .await?;
    Ok(Json(AggregateResponse {
        indicator_type,
        value,
    }))
}

#[utoipa::path(
    get,
    path = "/stats/max",
    tag = INDICATOR_TAG,
    params(IndicatorTypeQuery),
    responses(
        (status = 200, description = "Largest value", body = AggregateResponse),
        (status = 404, description = "No indicator of the type", body = ErrorResponse)
    )
)]
async fn get_max_value(
    State(state): State<AppState>,
    Query(query): Query<IndicatorTypeQuery>,
) -> AppResult<Json<AggregateResponse>> {
    let indicator_type = query.indicator_type;
    let value = state
        .with_services(|s| async move { s.indicators.get_max_value(indicator_type).await })
        .await?;
    Ok(Json(AggregateResponse {
        indicator_type,
        value,
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = INDICATOR_TAG,
    params(("id" = i32, Path, description = "Indicator id")),
    responses(
        (status = 200, description = "Indicator", body = IndicatorDto),
        (status = 404, description = "Indicator not found", body = ErrorResponse)
    )
)]
async fn get_indicator(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<IndicatorDto>> {
    let indicator = state
        .with_services(|s| async move { s.indicators.get_by_id(id).await })
        .await?;
    Ok(Json(indicator))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = INDICATOR_TAG,
    params(("id" = i32, Path, description = "Indicator id")),
    request_body = IndicatorDto,
    responses(
        (status = 200, description = "Indicator updated", body = IndicatorDto),
        (status = 404, description = "Indicator not found", body = ErrorResponse)
    )
)]
async fn update_indicator(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(mut payload): ValidatedJson<IndicatorDto>,
) -> AppResult<Json<IndicatorDto>> {
    payload.id = id;
    let updated = state
        .with_services(|s| async move { s.indicators.update(payload).await })
        .await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = INDICATOR_TAG,
    params(("id" = i32, Path, description = "Indicator id")),
    responses(
        (status = 204, description = "Indicator deleted"),
        (status = 404, description = "Indicator not found", body = ErrorResponse)
    )
)]
async fn delete_indicator(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state
        .with_services(|s| async move { s.indicators.delete(id).await })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
