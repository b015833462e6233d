use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use std::error::Error;

pub const USERS_COLLECTION: &str = "users";
pub const BANKS_COLLECTION: &str = "banks";
pub const EARLY_ACCESS_COLLECTION: &str = "early_access_users";

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool tuning
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Extract database name from URI or use default
        let db_name = uri
            .split('/')
            .last()
            .and_then(|s| s.split('?').next())
            .filter(|s| !s.is_empty())
            .unwrap_or("finance");

        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { client, db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Unique indexes backing the data-model invariants: one account per
    /// email, one bank snapshot per user, one waitlist entry per email.
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        log::info!("🔧 Creating database indexes...");

        let unique = || IndexOptions::builder().unique(true).build();

        let users = self
            .db
            .collection::<mongodb::bson::Document>(USERS_COLLECTION);
        let users_email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(unique())
            .build();
        match users.create_index(users_email_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(email)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let users_id_index = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .options(unique())
            .build();
        match users.create_index(users_id_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(user_id)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let banks = self
            .db
            .collection::<mongodb::bson::Document>(BANKS_COLLECTION);
        let banks_user_index = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .options(unique())
            .build();
        match banks.create_index(banks_user_index).await {
            Ok(_) => log::info!("   ✅ Index created: banks(user_id)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let early_access = self
            .db
            .collection::<mongodb::bson::Document>(EARLY_ACCESS_COLLECTION);
        let early_access_email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(unique())
            .build();
        match early_access.create_index(early_access_email_index).await {
            Ok(_) => log::info!("   ✅ Index created: early_access_users(email)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn health_check(&self) -> bool {
        self.db.list_collection_names().await.is_ok()
    }
}
