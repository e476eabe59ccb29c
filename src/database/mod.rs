use mongodb::{Client, Collection, Database};
use std::error::Error;

use crate::config::Config;

pub mod repositories;

pub use repositories::{MongoCenterRepository, MongoMembershipRepository, MongoUserRepository};

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(config: &Config) -> Result<Self, Box<dyn Error>> {
        let uri = config.database_url.as_str();
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        // Fail fast so a dead primary source degrades the reload instead of hanging it
        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Extract database name from URI or use default
        let db_name = uri
            .split('/')
            .last()
            .and_then(|s| s.split('?').next())
            .filter(|s| !s.is_empty() && !s.contains(':'))
            .unwrap_or("admin_dashboard");

        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };

        mongodb.ensure_indexes(config).await?;

        Ok(mongodb)
    }

    /// Indexes backing the per-center membership fetch and the active/deleted split
    async fn ensure_indexes(&self, config: &Config) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::doc;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        let memberships = self
            .database()
            .collection::<mongodb::bson::Document>(&config.memberships_collection);

        let membership_index = IndexModel::builder()
            .keys(doc! { "center_id": 1 })
            .build();

        match memberships.create_index(membership_index).await {
            Ok(_) => log::info!("   ✅ Index created: {}(center_id)", config.memberships_collection),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let users = self
            .database()
            .collection::<mongodb::bson::Document>(&config.users_collection);

        let deleted_index = IndexModel::builder()
            .keys(doc! { "deleted_at": 1 })
            .build();

        match users.create_index(deleted_index).await {
            Ok(_) => log::info!("   ✅ Index created: {}(deleted_at)", config.users_collection),
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
}
