use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Early-access waitlist entry (`early_access_users` collection).
/// Created once, never mutated.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EarlyAccessUser {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub id: String,
    pub email: String,
    pub created_at: Option<BsonDateTime>,
}
