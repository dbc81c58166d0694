//! Router configuration for the API.
//!
//! This module provides centralized route registration and middleware
//! configuration for the application.

use std::time::Duration;

use axum::{Router, http::StatusCode, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{
    error_response_middleware, logging_middleware, request_id_middleware,
    security_context_middleware,
};
use crate::state::AppState;

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Middleware is applied in reverse order of declaration (last added runs first):
/// 1. CORS and compression
/// 2. Request ID - generates/propagates request IDs
/// 3. Logging - logs requests with request IDs
/// 4. Error responses - JSON bodies with the request ID for every 4xx/5xx
/// 5. Timeout
/// 6. Bearer authentication, on `/api` only
///
/// # Routes
/// - `/api/employees`, `/api/indicators`, `/api/reports`
/// - `/health`, `/health/ready`, `/health/live`
/// - `/swagger-ui` and `/api-docs/openapi.json`
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    let api_routes = OpenApiRouter::new()
        .nest("/employees", handlers::employees::employee_routes())
        .nest("/indicators", handlers::indicators::indicator_routes())
        .nest("/reports", handlers::reports::report_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_context_middleware,
        ));

    let (router, openapi) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", api_routes)
        .merge(handlers::health::health_routes())
        .split_for_parts();

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(middleware::from_fn(error_response_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::dto::ErrorResponse;
    use crate::config::JwtConfig;
    use crate::dto::{EmployeeDto, IndicatorDto, ReportDto};
    use crate::models::{ReportStatus, Role};
    use crate::store::MemoryStore;
    use crate::utils::jwt::generate_access_token;
    use axum::body::Body;
    use axum::http::{Method, Request, header};
    use axum::response::Response;
    use serde::de::DeserializeOwned;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    const SECRET: &str = "router-test-secret-at-least-32-chars";

    fn app() -> Router {
        let jwt = JwtConfig {
            secret: SECRET.to_string(),
            access_token_expiration: 1,
        };
        let state = AppState::new(Arc::new(MemoryStore::new()), jwt, 2);
        create_router(state, Duration::from_secs(30))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
        send_with_token(app, method, uri, body, None).await
    }

    async fn send_with_token(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json<T: DeserializeOwned>(response: Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn employee(id: i32, role: &str) -> Value {
        json!({
            "id": id,
            "name": format!("Employee {id}"),
            "email": format!("employee{id}@ecotrack.test"),
            "phoneNumber": "+1-555-0100",
            "role": role
        })
    }

    fn indicator(id: i32, value: f64) -> Value {
        json!({
            "id": id,
            "name": format!("CO2-sensor-{id}"),
            "value": value,
            "type": "co2",
            "collectedAt": "2024-03-01T08:30:00"
        })
    }

    #[tokio::test]
    async fn employee_crud_round_trip() {
        let app = app();

        let response = send(&app, Method::POST, "/api/employees", Some(employee(1, "staff"))).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = send(&app, Method::GET, "/api/employees/1", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let fetched: EmployeeDto = json(response).await;
        assert_eq!(fetched.email, "employee1@ecotrack.test");
        assert_eq!(fetched.role, Role::Staff);

        let response = send(
            &app,
            Method::PUT,
            "/api/employees/1/role",
            Some(json!({"role": "manager"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let updated: EmployeeDto = json(response).await;
        assert_eq!(updated.role, Role::Manager);

        let response = send(&app, Method::GET, "/api/employees/search?role=manager", None).await;
        let managers: Vec<EmployeeDto> = json(response).await;
        assert_eq!(managers.len(), 1);

        let response = send(&app, Method::DELETE, "/api/employees/1", None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app, Method::GET, "/api/employees/1", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_create_is_conflict() {
        let app = app();
        send(&app, Method::POST, "/api/indicators", Some(indicator(1, 400.0))).await;

        let response = send(&app, Method::POST, "/api/indicators", Some(indicator(1, 500.0))).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let error: ErrorResponse = json(response).await;
        assert_eq!(error.code, "ALREADY_EXISTS");
        assert!(error.request_id.is_some());

        let response = send(&app, Method::GET, "/api/indicators", None).await;
        let all: Vec<IndicatorDto> = json(response).await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].value, 400.0);
    }

    #[tokio::test]
    async fn invalid_bodies_are_bad_requests() {
        let app = app();

        let mut invalid = employee(1, "staff");
        invalid["email"] = json!("not-an-email");
        let response = send(&app, Method::POST, "/api/employees", Some(invalid)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ErrorResponse = json(response).await;
        assert_eq!(error.code, "VALIDATION_ERROR");
        assert_eq!(error.details.as_deref(), Some("email"));

        let response = send(&app, Method::POST, "/api/employees", Some(json!({"id": 1}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ErrorResponse = json(response).await;
        assert_eq!(error.code, "BAD_REQUEST");
    }

    #[tokio::test]
    async fn employee_page_requires_administrator() {
        let app = app();
        for id in 1..=3 {
            send(&app, Method::POST, "/api/employees", Some(employee(id, "staff"))).await;
        }

        let response = send(&app, Method::GET, "/api/employees/page?page=0", None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let staff = generate_access_token(1, vec![Role::Staff], SECRET, 1).unwrap();
        let response =
            send_with_token(&app, Method::GET, "/api/employees/page", None, Some(&staff)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let admin = generate_access_token(1, vec![Role::Administrator], SECRET, 1).unwrap();
        let response = send_with_token(
            &app,
            Method::GET,
            "/api/employees/page?page=1",
            None,
            Some(&admin),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let page: Vec<EmployeeDto> = json(response).await;
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, 3);

        let response = send_with_token(
            &app,
            Method::GET,
            "/api/employees/page",
            None,
            Some("garbage"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn report_indicator_lifecycle() {
        let app = app();
        send(&app, Method::POST, "/api/employees", Some(employee(1, "manager"))).await;

        let report = json!({
            "id": 5,
            "employeeId": 1,
            "createdAt": "2024-03-02T10:00:00",
            "status": "draft"
        });
        let response = send(&app, Method::POST, "/api/reports", Some(report)).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = send(
            &app,
            Method::POST,
            "/api/reports/5/indicators",
            Some(indicator(9, 412.5)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let attached: Vec<IndicatorDto> = json(response).await;
        assert_eq!(attached.len(), 1);

        let response = send(&app, Method::GET, "/api/reports/5/indicators", None).await;
        let listed: Vec<IndicatorDto> = json(response).await;
        assert_eq!(listed[0].id, 9);

        let response = send(
            &app,
            Method::PUT,
            "/api/reports/5/status",
            Some(json!({"status": "approved"})),
        )
        .await;
        let approved: ReportDto = json(response).await;
        assert_eq!(approved.status, ReportStatus::Approved);

        let response = send(&app, Method::POST, "/api/reports/5/print", None).await;
        let printed: ReportDto = json(response).await;
        assert!(printed.is_printed);

        let response = send(&app, Method::DELETE, "/api/reports/5/indicators/9", None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = send(&app, Method::DELETE, "/api/reports/5/indicators/9", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&app, Method::GET, "/api/indicators/9", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn employee_owning_reports_is_kept() {
        let app = app();
        send(&app, Method::POST, "/api/employees", Some(employee(1, "staff"))).await;
        let report = json!({
            "id": 2,
            "employeeId": 1,
            "createdAt": "2024-03-02T10:00:00",
            "status": "pending"
        });
        send(&app, Method::POST, "/api/reports", Some(report)).await;

        let response = send(&app, Method::DELETE, "/api/employees/1", None).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let error: ErrorResponse = json(response).await;
        assert_eq!(error.code, "CONSTRAINT_VIOLATION");

        let response = send(&app, Method::GET, "/api/employees/1", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn indicator_aggregates() {
        let app = app();
        send(&app, Method::POST, "/api/indicators", Some(indicator(1, 400.0))).await;
        send(&app, Method::POST, "/api/indicators", Some(indicator(2, 500.0))).await;

        let response = send(&app, Method::GET, "/api/indicators/stats/average?type=co2", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = json(response).await;
        assert_eq!(body["value"], 450.0);
        assert_eq!(body["type"], "co2");

        let response = send(&app, Method::GET, "/api/indicators/stats/max?type=noise", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(
            &app,
            Method::GET,
            "/api/indicators/by-date-range?start=2024-04-01T00:00:00&end=2024-03-01T00:00:00",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_routes_get_error_bodies() {
        let app = app();
        let response = send(&app, Method::GET, "/api/nothing-here", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key("x-request-id"));
        let error: ErrorResponse = json(response).await;
        assert_eq!(error.code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn serves_health_and_openapi() {
        let app = app();
        let response = send(&app, Method::GET, "/health/live", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, Method::GET, "/api-docs/openapi.json", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let doc: Value = json(response).await;
        let paths = doc["paths"].as_object().unwrap();
        assert!(paths.keys().any(|p| p.starts_with("/api/employees")));
        assert!(paths.contains_key("/api/reports/{id}/indicators/{indicator_id}"));
        assert!(doc["components"]["securitySchemes"]["bearerAuth"].is_object());
    }
}
