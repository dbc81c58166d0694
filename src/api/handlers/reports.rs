//! Report request handlers.
//!
//! Besides CRUD, reports expose their workflow (status, content, printing)
//! and their indicator collection as sub-resources.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::REPORT_TAG;
use crate::api::dto::{ContentRequest, ErrorResponse, StatusQuery, UpdateStatusRequest};
use crate::dto::{IndicatorDto, ReportDto};
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::ValidatedJson;

/// Routes:
/// - GET /                                  - List all reports
/// - POST /                                 - Create a report
/// - GET /by-status                         - Reports in one status
/// - GET /by-employee/{employee_id}         - Reports of an employee
/// - GET /{id}                              - Report by id
/// - PUT /{id}                              - Replace a report
/// - DELETE /{id}                           - Delete a report
/// - PUT /{id}/status                       - Change the status
/// - PUT /{id}/content                      - Set the content
/// - POST /{id}/print                       - Mark as printed
/// - GET /{id}/indicators                   - Attached indicators
/// - POST /{id}/indicators                  - Attach an indicator
/// - DELETE /{id}/indicators/{indicator_id} - Detach an indicator
pub fn report_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_reports, create_report))
        .routes(routes!(get_by_status))
        .routes(routes!(get_by_employee))
        .routes(routes!(get_report, update_report, delete_report))
        .routes(routes!(update_status))
        .routes(routes!(add_content))
        .routes(routes!(mark_as_printed))
        .routes(routes!(list_report_indicators, add_indicator))
        .routes(routes!(remove_indicator))
}

#[utoipa::path(
    get,
    path = "/",
    tag = REPORT_TAG,
    responses((status = 200, description = "All reports", body = Vec<ReportDto>))
)]
async fn list_reports(State(state): State<AppState>) -> AppResult<Json<Vec<ReportDto>>> {
    let reports = state
        .with_services(|s| async move { s.reports.get_all().await })
        .await?;
    Ok(Json(reports))
}

/// POST /api/reports - Create a report
///
/// The owning employee must exist.
#[utoipa::path(
    post,
    path = "/",
    tag = REPORT_TAG,
    request_body = ReportDto,
    responses(
        (status = 201, description = "Report created", body = ReportDto),
        (status = 409, description = "Id already taken or unknown employee", body = ErrorResponse)
    )
)]
async fn create_report(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ReportDto>,
) -> AppResult<(StatusCode, Json<ReportDto>)> {
    let created = state
        .with_services(|s| async move { s.reports.create(payload).await })
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/by-status",
    tag = REPORT_TAG,
    params(StatusQuery),
    responses((status = 200, description = "Reports in the status", body = Vec<ReportDto>))
)]
async fn get_by_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> AppResult<Json<Vec<ReportDto>>> {
    let reports = state
        .with_services(|s| async move { s.reports.get_by_status(query.status).await })
        .await?;
    Ok(Json(reports))
}

#[utoipa::path(
    get,
    path = "/by-employee/{employee_id}",
    tag = REPORT_TAG,
    params(("employee_id" = i32, Path, description = "Owning employee id")),
    responses((status = 200, description = "Reports of the employee", body = Vec<ReportDto>))
)]
async fn get_by_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<i32>,
) -> AppResult<Json<Vec<ReportDto>>> {
    let reports = state
        .with_services(|s| async move { s.reports.get_reports_by_employee_id(employee_id).await })
        .await?;
    Ok(Json(reports))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = REPORT_TAG,
    params(("id" = i32, Path, description = "Report id")),
    responses(
        (status = 200, description = "Report", body = ReportDto),
        (status = 404, description = "Report not found", body = ErrorResponse)
    )
)]
async fn get_report(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<ReportDto>> {
    let report = state
        .with_services(|s| async move { s.reports.get_by_id(id).await })
        .await?;
    Ok(Json(report))
}

/// PUT /api/reports/{id} - Replace a report
///
/// Attached indicators are kept.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = REPORT_TAG,
    params(("id" = i32, Path, description = "Report id")),
    request_body = ReportDto,
    responses(
        (status = 200, description = "Report updated", body = ReportDto),
        (status = 404, description = "Report not found", body = ErrorResponse)
    )
)]
async fn update_report(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(mut payload): ValidatedJson<ReportDto>,
) -> AppResult<Json<ReportDto>> {
    payload.id = id;
    let updated = state
        .with_services(|s| async move { s.reports.update(payload).await })
        .await?;
    Ok(Json(updated))
}

/// DELETE /api/reports/{id}
///
/// Attached indicators are deleted with the report.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = REPORT_TAG,
    params(("id" = i32, Path, description = "Report id")),
    responses(
        (status = 204, description = "Report deleted"),
        (status = 404, description = "Report not found", body = ErrorResponse)
    )
)]
async fn delete_report(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<StatusCode> {
    state
        .with_services(|s| async move { s.reports.delete(id).await })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/{id}/status",
    tag = REPORT_TAG,
    params(("id" = i32, Path, description = "Report id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ReportDto),
        (status = 404, description = "Report not found", body = ErrorResponse)
    )
)]
async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateStatusRequest>,
) -> AppResult<Json<ReportDto>> {
    let report = state
        .with_services(|s| async move { s.reports.update_status(id, request.status).await })
        .await?;
    Ok(Json(report))
}

/// PUT /api/reports/{id}/content - Set the report content
///
/// Replaces any previous content.
#[utoipa::path(
    put,
    path = "/{id}/content",
    tag = REPORT_TAG,
    params(("id" = i32, Path, description = "Report id")),
    request_body = ContentRequest,
    responses(
        (status = 200, description = "Content set", body = ReportDto),
        (status = 404, description = "Report not found", body = ErrorResponse)
    )
)]
async fn add_content(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<ContentRequest>,
) -> AppResult<Json<ReportDto>> {
    let report = state
        .with_services(|s| async move { s.reports.add_content(id, request.content).await })
        .await?;
    Ok(Json(report))
}

#[utoipa::path(
    post,
    path = "/{id}/print",
    tag = REPORT_TAG,
    params(("id" = i32, Path, description = "Report id")),
    responses(
        (status = 200, description = "Report marked as printed", body = ReportDto),
        (status = 404, description = "Report not found", body = ErrorResponse)
    )
)]
async fn mark_as_printed(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ReportDto>> {
    let report = state
        .with_services(|s| async move { s.reports.mark_as_printed(id).await })
        .await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/{id}/indicators",
    tag = REPORT_TAG,
    params(("id" = i32, Path, description = "Report id")),
    responses(
        (status = 200, description = "Attached indicators", body = Vec<IndicatorDto>),
        (status = 404, description = "Report not found", body = ErrorResponse)
    )
)]
async fn list_report_indicators(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<IndicatorDto>>> {
    let indicators = state
        .with_services(|s| async move { s.reports.get_indicators_by_report_id(id).await })
        .await?;
    Ok(Json(indicators))
}

/// POST /api/reports/{id}/indicators - Attach an indicator
///
/// Returns the full collection after attaching. An indicator the store does
/// not know yet is created with the report.
#[utoipa::path(
    post,
    path = "/{id}/indicators",
    tag = REPORT_TAG,
    params(("id" = i32, Path, description = "Report id")),
    request_body = IndicatorDto,
    responses(
        (status = 200, description = "Attached indicators", body = Vec<IndicatorDto>),
        (status = 404, description = "Report not found", body = ErrorResponse),
        (status = 409, description = "Indicator already attached", body = ErrorResponse)
    )
)]
async fn add_indicator(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(indicator): ValidatedJson<IndicatorDto>,
) -> AppResult<Json<Vec<IndicatorDto>>> {
    let indicators = state
        .with_services(|s| async move { s.reports.add_indicator_to_report(id, indicator).await })
        .await?;
    Ok(Json(indicators))
}

#[utoipa::path(
    delete,
    path = "/{id}/indicators/{indicator_id}",
    tag = REPORT_TAG,
    params(
        ("id" = i32, Path, description = "Report id"),
        ("indicator_id" = i32, Path, description = "Indicator id")
    ),
    responses(
        (status = 204, description = "Indicator detached"),
        (status = 404, description = "Report missing or indicator not attached", body = ErrorResponse)
    )
)]
async fn remove_indicator(
    State(state): State<AppState>,
    Path((id, indicator_id)): Path<(i32, i32)>,
) -> AppResult<StatusCode> {
    state
        .with_services(|s| async move {
            s.reports.remove_indicator_from_report(id, indicator_id).await
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
