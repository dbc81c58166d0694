use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub const EMPLOYEE_TAG: &str = "Employees";
pub const INDICATOR_TAG: &str = "Indicators";
pub const REPORT_TAG: &str = "Reports";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "EcoTrack",
        description = "Environmental indicator and report tracking API",
    ),
    modifiers(&SecurityAddon),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::models::Role,
            crate::models::IndicatorType,
            crate::models::ReportStatus,
        )
    ),
    tags(
        (name = EMPLOYEE_TAG, description = "Employee management endpoints"),
        (name = INDICATOR_TAG, description = "Environmental indicator endpoints"),
        (name = REPORT_TAG, description = "Report workflow endpoints"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token minted by `ecotrack token`"))
                    .build(),
            ),
        );
    }
}
