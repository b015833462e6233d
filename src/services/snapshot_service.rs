use crate::database::{MongoDB, BANKS_COLLECTION};
use crate::models::BankSnapshot;
use crate::utils::error::ApiError;
use mongodb::bson::{doc, DateTime as BsonDateTime};

/// Explicit read-modify-write upsert keyed by user id: the existing
/// document keeps its `_id` and `created_at`, everything else is replaced
/// wholesale. At most one snapshot per user.
pub async fn upsert_snapshot(db: &MongoDB, mut snapshot: BankSnapshot) -> Result<(), ApiError> {
    let collection = db.collection::<BankSnapshot>(BANKS_COLLECTION);

    let existing = collection
        .find_one(doc! { "user_id": &snapshot.user_id })
        .await
        .map_err(ApiError::database)?;

    snapshot.updated_at = Some(BsonDateTime::now());

    match existing {
        Some(previous) => {
            snapshot._id = previous._id;
            snapshot.created_at = previous.created_at;
            collection
                .replace_one(doc! { "user_id": &snapshot.user_id }, &snapshot)
                .await
                .map_err(ApiError::database)?;
            log::info!("💾 Snapshot replaced for user {}", snapshot.user_id);
        }
        None => {
            snapshot.created_at = Some(BsonDateTime::now());
            collection
                .insert_one(&snapshot)
                .await
                .map_err(ApiError::database)?;
            log::info!("💾 Snapshot created for user {}", snapshot.user_id);
        }
    }

    Ok(())
}

/// The stored snapshot for a user, required by every dashboard endpoint.
pub async fn get_snapshot(db: &MongoDB, user_id: &str) -> Result<BankSnapshot, ApiError> {
    let collection = db.collection::<BankSnapshot>(BANKS_COLLECTION);
    collection
        .find_one(doc! { "user_id": user_id })
        .await
        .map_err(ApiError::database)?
        .ok_or(ApiError::NoPermission)
}
