use crate::database::{MongoDB, EARLY_ACCESS_COLLECTION};
use crate::models::EarlyAccessUser;
use crate::services::auth_service::normalize_email;
use crate::utils::error::ApiError;
use mongodb::bson::{doc, DateTime as BsonDateTime};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct EarlyAccessRequest {
    pub email: String,
}

// Waitlist entries are write-once; duplicates conflict.
pub async fn add_early_access_user(db: &MongoDB, email: &str) -> Result<(), ApiError> {
    let collection = db.collection::<EarlyAccessUser>(EARLY_ACCESS_COLLECTION);
    let email = normalize_email(email);

    let existing = collection
        .find_one(doc! { "email": &email })
        .await
        .map_err(ApiError::database)?;
    if existing.is_some() {
        return Err(ApiError::EmailAlreadyExists);
    }

    let entry = EarlyAccessUser {
        _id: None,
        id: Uuid::new_v4().to_string(),
        email,
        created_at: Some(BsonDateTime::now()),
    };

    collection
        .insert_one(&entry)
        .await
        .map_err(ApiError::database)?;

    log::info!("✅ Early access signup: {}", entry.email);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_duplicate_waitlist_email_conflicts() {
        dotenv::dotenv().ok();
        let uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017/finance_test".to_string());
        let db = MongoDB::new(&uri).await.unwrap();

        let email = format!("{}@example.com", Uuid::new_v4());
        assert!(add_early_access_user(&db, &email).await.is_ok());
        match add_early_access_user(&db, &email).await {
            Err(ApiError::EmailAlreadyExists) => {}
            other => panic!("expected EmailAlreadyExists, got {:?}", other.err()),
        }
    }
}
