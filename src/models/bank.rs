use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Account record as returned by the aggregation provider. Only the fields
/// the dashboard reads are typed; everything else the provider sends is
/// preserved verbatim in `extra`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Account {
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub balances: AccountBalances,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AccountBalances {
    #[serde(default)]
    pub available: Option<f64>,
    #[serde(default)]
    pub current: Option<f64>,
    #[serde(default)]
    pub limit: Option<f64>,
    #[serde(default)]
    pub iso_currency_code: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Transaction record from the provider. `date` stays in the provider's
/// `YYYY-MM-DD` form; `category` is the provider's label hierarchy, most
/// general label first.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Transaction {
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub category: Option<Vec<String>>,
    #[serde(default)]
    pub pending: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Latest raw financial data for one user (`banks` collection).
///
/// At most one document per `user_id`; replaced wholesale on every
/// successful provider link, never merged field by field.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BankSnapshot {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub user_id: String,
    pub item_id: String,
    pub access_token: String,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub balances: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub identity: Vec<serde_json::Value>,
    pub created_at: Option<BsonDateTime>,
    pub updated_at: Option<BsonDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_fields_survive_round_trip() {
        let raw = serde_json::json!({
            "account_id": "acc-1",
            "name": "Checking",
            "type": "depository",
            "subtype": "checking",
            "balances": { "available": 90.0, "current": 110.5, "iso_currency_code": "USD" },
            "mask": "0000",
            "official_name": "Plaid Gold Checking"
        });

        let account: Account = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(account.balances.current, Some(110.5));
        assert_eq!(account.extra["mask"], "0000");

        let back = serde_json::to_value(&account).unwrap();
        assert_eq!(back["official_name"], raw["official_name"]);
    }

    #[test]
    fn test_transaction_tolerates_missing_category() {
        let raw = serde_json::json!({
            "transaction_id": "tx-1",
            "account_id": "acc-1",
            "name": "United Airlines",
            "amount": 500.0,
            "date": "2026-03-14"
        });

        let tx: Transaction = serde_json::from_value(raw).unwrap();
        assert!(tx.category.is_none());
        assert!(!tx.pending);
    }
}
