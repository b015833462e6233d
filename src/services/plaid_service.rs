use crate::database::MongoDB;
use crate::models::{Account, BankSnapshot, Transaction};
use crate::services::snapshot_service;
use crate::utils::error::ApiError;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::env;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct PlaidLoginRequest {
    pub plaid_public_token: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenExchange {
    pub access_token: String,
    #[serde(default)]
    pub item_id: String,
}

/// Aggregation-provider client. Constructed once at startup and injected
/// into handlers via `web::Data`, never held as a global.
#[derive(Clone)]
pub struct PlaidClient {
    http: reqwest::Client,
    client_id: String,
    secret: String,
    base_url: String,
}

impl PlaidClient {
    pub fn from_env() -> Self {
        let environment = env::var("PLAID_ENV").unwrap_or_else(|_| "sandbox".to_string());
        Self {
            http: reqwest::Client::new(),
            client_id: env::var("PLAID_CLIENT_ID").unwrap_or_default(),
            secret: env::var("PLAID_SECRET").unwrap_or_default(),
            base_url: format!("https://{}.plaid.com", environment),
        }
    }

    /// All provider operations are JSON POSTs carrying the client
    /// credentials. Non-2xx responses abort with the raw body attached.
    async fn post(&self, path: &str, mut body: Value) -> Result<Value, ApiError> {
        if let Some(object) = body.as_object_mut() {
            object.insert("client_id".to_string(), json!(self.client_id));
            object.insert("secret".to_string(), json!(self.secret));
        }

        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Internal(format!("Provider request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(ApiError::Internal(format!(
                "Provider error {}: {}",
                status, detail
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to parse provider response: {}", e)))
    }

    pub async fn exchange_public_token(
        &self,
        public_token: &str,
    ) -> Result<TokenExchange, ApiError> {
        let response = self
            .post(
                "/item/public_token/exchange",
                json!({ "public_token": public_token }),
            )
            .await?;
        serde_json::from_value(response)
            .map_err(|e| ApiError::Internal(format!("Unexpected token exchange response: {}", e)))
    }

    pub async fn get_accounts(&self, access_token: &str) -> Result<Vec<Account>, ApiError> {
        let response = self
            .post("/accounts/get", json!({ "access_token": access_token }))
            .await?;
        take_array(response, "accounts")
    }

    /// Realtime balance fetch; same account shape, fresher numbers.
    pub async fn get_balances(&self, access_token: &str) -> Result<Vec<Account>, ApiError> {
        let response = self
            .post(
                "/accounts/balance/get",
                json!({ "access_token": access_token }),
            )
            .await?;
        take_array(response, "accounts")
    }

    pub async fn get_transactions(
        &self,
        access_token: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<Transaction>, ApiError> {
        let response = self
            .post(
                "/transactions/get",
                json!({
                    "access_token": access_token,
                    "start_date": start_date,
                    "end_date": end_date,
                }),
            )
            .await?;
        take_array(response, "transactions")
    }

    /// Identity payload is stored verbatim; nothing downstream reads it.
    pub async fn get_identity(&self, access_token: &str) -> Result<Vec<Value>, ApiError> {
        let response = self
            .post("/identity/get", json!({ "access_token": access_token }))
            .await?;
        take_array(response, "accounts")
    }
}

fn take_array<T: DeserializeOwned>(mut response: Value, field: &str) -> Result<Vec<T>, ApiError> {
    let array = response
        .get_mut(field)
        .map(Value::take)
        .unwrap_or_else(|| Value::Array(Vec::new()));
    serde_json::from_value(array)
        .map_err(|e| ApiError::Internal(format!("Unexpected provider payload: {}", e)))
}

/// Transaction fetch window: the trailing year ending today.
pub fn transaction_window(today: NaiveDate) -> (String, String) {
    let start = today
        .with_year(today.year() - 1)
        .unwrap_or(today - Duration::days(365));
    (
        start.format("%Y-%m-%d").to_string(),
        today.format("%Y-%m-%d").to_string(),
    )
}

/// Exchange the public token, pull the full snapshot in one concurrent
/// fan-out, and overwrite whatever was stored for this user.
pub async fn link_bank(
    db: &MongoDB,
    plaid: &PlaidClient,
    user_id: &str,
    public_token: &str,
) -> Result<Vec<Account>, ApiError> {
    let exchange = plaid.exchange_public_token(public_token).await?;
    let (start_date, end_date) = transaction_window(Utc::now().date_naive());

    let (accounts, balances, transactions, identity) = futures::try_join!(
        plaid.get_accounts(&exchange.access_token),
        plaid.get_balances(&exchange.access_token),
        plaid.get_transactions(&exchange.access_token, &start_date, &end_date),
        plaid.get_identity(&exchange.access_token),
    )?;

    log::info!(
        "🏦 Linked bank for user {}: {} accounts, {} transactions",
        user_id,
        accounts.len(),
        transactions.len()
    );

    let snapshot = BankSnapshot {
        _id: None,
        user_id: user_id.to_string(),
        item_id: exchange.item_id,
        access_token: exchange.access_token,
        accounts: accounts.clone(),
        balances,
        transactions,
        identity,
        created_at: None,
        updated_at: None,
    };

    snapshot_service::upsert_snapshot(db, snapshot).await?;

    Ok(accounts)
}
