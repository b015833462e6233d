use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Finance Service API",
        version = "1.0.0",
        description = "Backend for the personal-finance dashboard.\n\n**Authentication:** account and dashboard endpoints require a JWT Bearer token.\n\n**Features:**\n- Email/password signup with emailed verification codes\n- Bank linking through the aggregation provider\n- Dashboard summaries: balances, income, net pay, deductions, expenses\n- Early-access waitlist",
    ),
    paths(
        // Auth endpoints
        crate::api::auth::signup,
        crate::api::auth::login,

        // Bank linking
        crate::api::plaid::plaid_login,

        // Dashboard
        crate::api::dashboard::status,

        // Health
        crate::api::health::health_check,
    ),
    components(
        schemas(
            crate::services::auth_service::SignupRequest,
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::VerifyRequest,
            crate::services::auth_service::AuthResponse,
            crate::services::plaid_service::PlaidLoginRequest,
            crate::services::early_access_service::EarlyAccessRequest,
            crate::services::dashboard_service::SourceSeries,
            crate::services::dashboard_service::CategoryTotal,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Signup, login, and email verification."),
        (name = "Plaid", description = "Bank linking through the aggregation provider."),
        (name = "Dashboard", description = "Derived summaries over the stored bank snapshot."),
        (name = "Health", description = "Liveness check."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Enter your JWT token"))
                        .build(),
                ),
            );
        }
    }
}
