use crate::database::MongoDB;
use crate::services::auth_service::Claims;
use crate::services::plaid_service::{self, PlaidClient, PlaidLoginRequest};
use crate::utils::error::ApiError;
use crate::utils::response::success_object;
use crate::utils::validation::validate_not_blank;
use actix_web::{web, HttpResponse};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/v1/plaidLogin",
    tag = "Plaid",
    request_body = PlaidLoginRequest,
    responses(
        (status = 200, description = "Bank linked, snapshot stored"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "No permission")
    ),
    security(("bearer_auth" = []))
)]
pub async fn plaid_login(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    plaid: web::Data<PlaidClient>,
    request: web::Json<PlaidLoginRequest>,
) -> HttpResponse {
    log::info!("🏦 POST /v1/plaidLogin - user: {}", user.sub);

    if let Err(errors) = validate_not_blank("plaid_public_token", &request.plaid_public_token) {
        return ApiError::ValidationFailed(errors).to_response();
    }

    match plaid_service::link_bank(&db, &plaid, &user.sub, &request.plaid_public_token).await {
        Ok(accounts) => HttpResponse::Ok().json(success_object(
            "Bank linked",
            json!({ "accounts": accounts }),
        )),
        Err(e) => {
            log::error!("❌ Bank link failed: {} - {}", user.sub, e);
            e.to_response()
        }
    }
}
