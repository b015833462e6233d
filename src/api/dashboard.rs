use crate::database::MongoDB;
use crate::services::auth_service::Claims;
use crate::services::dashboard_service::{
    deduction_categories, expenses_by_category, income_series, income_sources, month_labels,
    monthly_deductions, monthly_income, net_pay, sum_balances_by_kind, sum_current_balances,
    trailing_months,
};
use crate::services::snapshot_service;
use crate::utils::response::success_object;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;

#[utoipa::path(
    post,
    path = "/v1/dashboard/status",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Balance totals, overall and by account type"),
        (status = 401, description = "No permission or no linked bank")
    ),
    security(("bearer_auth" = []))
)]
pub async fn status(user: web::ReqData<Claims>, db: web::Data<MongoDB>) -> HttpResponse {
    log::info!("📊 POST /v1/dashboard/status - user: {}", user.sub);

    match snapshot_service::get_snapshot(&db, &user.sub).await {
        Ok(snapshot) => HttpResponse::Ok().json(success_object(
            "Dashboard status",
            json!({
                "bank_balance": sum_current_balances(&snapshot.balances),
                "credit_cards": sum_balances_by_kind(&snapshot.balances, "credit"),
                "savings": sum_balances_by_kind(&snapshot.balances, "savings"),
            }),
        )),
        Err(e) => {
            log::warn!("❌ Status failed: {} - {}", user.sub, e);
            e.to_response()
        }
    }
}

pub async fn income(user: web::ReqData<Claims>, db: web::Data<MongoDB>) -> HttpResponse {
    log::info!("📈 POST /v1/dashboard/income - user: {}", user.sub);

    match snapshot_service::get_snapshot(&db, &user.sub).await {
        Ok(snapshot) => {
            let months = trailing_months(Utc::now().date_naive());
            let sources = income_sources();
            let series = income_series(&snapshot.transactions, &sources, &months);
            HttpResponse::Ok().json(success_object(
                "Monthly income",
                json!({ "labels": month_labels(&months), "sources": series }),
            ))
        }
        Err(e) => {
            log::warn!("❌ Income failed: {} - {}", user.sub, e);
            e.to_response()
        }
    }
}

pub async fn deductions(user: web::ReqData<Claims>, db: web::Data<MongoDB>) -> HttpResponse {
    log::info!("📉 POST /v1/dashboard/deductions - user: {}", user.sub);

    match snapshot_service::get_snapshot(&db, &user.sub).await {
        Ok(snapshot) => {
            let months = trailing_months(Utc::now().date_naive());
            let categories = deduction_categories();
            let data = monthly_deductions(&snapshot.transactions, &categories, &months);
            HttpResponse::Ok().json(success_object(
                "Monthly deductions",
                json!({ "labels": month_labels(&months), "data": data }),
            ))
        }
        Err(e) => {
            log::warn!("❌ Deductions failed: {} - {}", user.sub, e);
            e.to_response()
        }
    }
}

pub async fn net_pay_summary(user: web::ReqData<Claims>, db: web::Data<MongoDB>) -> HttpResponse {
    log::info!("💰 POST /v1/dashboard/netpay - user: {}", user.sub);

    match snapshot_service::get_snapshot(&db, &user.sub).await {
        Ok(snapshot) => {
            let months = trailing_months(Utc::now().date_naive());
            let income = monthly_income(&snapshot.transactions, &income_sources(), &months);
            let deductions =
                monthly_deductions(&snapshot.transactions, &deduction_categories(), &months);
            HttpResponse::Ok().json(success_object(
                "Monthly net pay",
                json!({
                    "labels": month_labels(&months),
                    "data": net_pay(&income, &deductions),
                }),
            ))
        }
        Err(e) => {
            log::warn!("❌ Net pay failed: {} - {}", user.sub, e);
            e.to_response()
        }
    }
}

pub async fn expenses(user: web::ReqData<Claims>, db: web::Data<MongoDB>) -> HttpResponse {
    log::info!("🧾 POST /v1/dashboard/expenses - user: {}", user.sub);

    match snapshot_service::get_snapshot(&db, &user.sub).await {
        Ok(snapshot) => HttpResponse::Ok().json(success_object(
            "Expenses by category",
            json!({ "categories": expenses_by_category(&snapshot.transactions) }),
        )),
        Err(e) => {
            log::warn!("❌ Expenses failed: {} - {}", user.sub, e);
            e.to_response()
        }
    }
}
