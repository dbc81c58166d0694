//! Employee request handlers.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::EMPLOYEE_TAG;
use crate::api::dto::{AssignRoleRequest, EmailQuery, ErrorResponse, PageParams, RoleQuery};
use crate::dto::EmployeeDto;
use crate::error::AppResult;
use crate::security::SecurityContext;
use crate::state::AppState;
use crate::utils::ValidatedJson;

/// Routes:
/// - GET /               - List all employees
/// - POST /              - Create an employee
/// - GET /page           - One page of employees (administrators only)
/// - GET /search         - Employees holding a role
/// - GET /by-email       - Employee by exact email
/// - GET /{id}           - Employee by id
/// - PUT /{id}           - Replace an employee
/// - DELETE /{id}        - Delete an employee
/// - PUT /{id}/role      - Assign a role
pub fn employee_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_employees, create_employee))
        .routes(routes!(list_employees_page))
        .routes(routes!(search_by_role))
        .routes(routes!(get_by_email))
        .routes(routes!(get_employee, update_employee, delete_employee))
        .routes(routes!(assign_role))
}

#[utoipa::path(
    get,
    path = "/",
    tag = EMPLOYEE_TAG,
    responses((status = 200, description = "All employees", body = Vec<EmployeeDto>))
)]
async fn list_employees(State(state): State<AppState>) -> AppResult<Json<Vec<EmployeeDto>>> {
    let employees = state
        .with_services(|s| async move { s.employees.get_all().await })
        .await?;
    Ok(Json(employees))
}

/// POST /api/employees - Create an employee
///
/// The id is supplied by the client and must not be taken.
#[utoipa::path(
    post,
    path = "/",
    tag = EMPLOYEE_TAG,
    request_body = EmployeeDto,
    responses(
        (status = 201, description = "Employee created", body = EmployeeDto),
        (status = 400, description = "Invalid employee", body = ErrorResponse),
        (status = 409, description = "Id already taken", body = ErrorResponse)
    )
)]
async fn create_employee(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<EmployeeDto>,
) -> AppResult<(StatusCode, Json<EmployeeDto>)> {
    let created = state
        .with_services(|s| async move { s.employees.create(payload).await })
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/employees/page - One page of employees
///
/// Requires a bearer token of an administrator. Page size comes from
/// `pagination.employee_page_size`.
#[utoipa::path(
    get,
    path = "/page",
    tag = EMPLOYEE_TAG,
    params(PageParams),
    responses(
        (status = 200, description = "Requested page, possibly empty", body = Vec<EmployeeDto>),
        (status = 403, description = "Caller is not an administrator", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn list_employees_page(
    State(state): State<AppState>,
    Extension(security): Extension<SecurityContext>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Vec<EmployeeDto>>> {
    let page = state
        .with_services(|s| async move {
            s.employees
                .get_employees_filtered(&security, params.page)
                .await
        })
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/search",
    tag = EMPLOYEE_TAG,
    params(RoleQuery),
    responses((status = 200, description = "Employees holding the role", body = Vec<EmployeeDto>))
)]
async fn search_by_role(
    State(state): State<AppState>,
    Query(query): Query<RoleQuery>,
) -> AppResult<Json<Vec<EmployeeDto>>> {
    let employees = state
        .with_services(|s| async move { s.employees.search_by_role(query.role).await })
        .await?;
    Ok(Json(employees))
}

#[utoipa::path(
    get,
    path = "/by-email",
    tag = EMPLOYEE_TAG,
    params(EmailQuery),
    responses(
        (status = 200, description = "Matching employee", body = EmployeeDto),
        (status = 404, description = "No employee with this email", body = ErrorResponse)
    )
)]
async fn get_by_email(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> AppResult<Json<EmployeeDto>> {
    let employee = state
        .with_services(|s| async move { s.employees.get_by_email(&query.email).await })
        .await?;
    Ok(Json(employee))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = EMPLOYEE_TAG,
    params(("id" = i32, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee", body = EmployeeDto),
        (status = 404, description = "Employee not found", body = ErrorResponse)
    )
)]
async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<EmployeeDto>> {
    let employee = state
        .with_services(|s| async move { s.employees.get_by_id(id).await })
        .await?;
    Ok(Json(employee))
}

/// PUT /api/employees/{id} - Replace an employee
///
/// The path id wins over the id in the body.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = EMPLOYEE_TAG,
    params(("id" = i32, Path, description = "Employee id")),
    request_body = EmployeeDto,
    responses(
        (status = 200, description = "Employee updated", body = EmployeeDto),
        (status = 404, description = "Employee not found", body = ErrorResponse)
    )
)]
async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(mut payload): ValidatedJson<EmployeeDto>,
) -> AppResult<Json<EmployeeDto>> {
    payload.id = id;
    let updated = state
        .with_services(|s| async move { s.employees.update(payload).await })
        .await?;
    Ok(Json(updated))
}

/// DELETE /api/employees/{id}
///
/// An employee who still owns reports cannot be deleted (409).
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = EMPLOYEE_TAG,
    params(("id" = i32, Path, description = "Employee id")),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 404, description = "Employee not found", body = ErrorResponse),
        (status = 409, description = "Employee still owns reports", body = ErrorResponse)
    )
)]
async fn delete_employee(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<StatusCode> {
    state
        .with_services(|s| async move { s.employees.delete(id).await })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/{id}/role",
    tag = EMPLOYEE_TAG,
    params(("id" = i32, Path, description = "Employee id")),
    request_body = AssignRoleRequest,
    responses(
        (status = 200, description = "Role assigned", body = EmployeeDto),
        (status = 404, description = "Employee not found", body = ErrorResponse)
    )
)]
async fn assign_role(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<AssignRoleRequest>,
) -> AppResult<Json<EmployeeDto>> {
    let employee = state
        .with_services(|s| async move { s.employees.assign_role(id, request.role).await })
        .await?;
    Ok(Json(employee))
}
