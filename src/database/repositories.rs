// ==================== MONGODB SOURCES ====================
// Raw documents are read untyped and normalized through the model
// constructors, so `_id`/`id` and ObjectId/string differences never
// reach the engine.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::Collection;

use super::MongoDB;
use crate::models::{CenterRecord, MembershipRecord, UserRecord};
use crate::repositories::{CenterRepository, MembershipRepository, UserRepository};
use crate::utils::AppError;

async fn collect_documents(
    collection: &Collection<Document>,
    filter: Document,
) -> Result<Vec<Document>, AppError> {
    let mut cursor = collection.find(filter).await?;

    let mut documents = Vec::new();
    while let Some(document) = cursor.try_next().await? {
        documents.push(document);
    }
    Ok(documents)
}

/// Matches a reference stored either as a string or as an ObjectId.
fn id_candidates(id: &str) -> Vec<Bson> {
    let mut candidates = vec![Bson::String(id.to_string())];
    if let Ok(oid) = ObjectId::parse_str(id) {
        candidates.push(Bson::ObjectId(oid));
    }
    candidates
}

pub struct MongoUserRepository {
    users: Collection<Document>,
}

impl MongoUserRepository {
    pub fn new(db: &MongoDB, collection: &str) -> Self {
        Self {
            users: db.collection::<Document>(collection),
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn list_all(&self) -> Result<Vec<UserRecord>, AppError> {
        // `null` matches both a missing field and an explicit null
        let documents = collect_documents(&self.users, doc! { "deleted_at": Bson::Null }).await?;
        log::debug!("Fetched {} active user documents", documents.len());
        Ok(documents.iter().map(UserRecord::from_document).collect())
    }

    async fn list_deleted(&self) -> Result<Vec<UserRecord>, AppError> {
        let documents =
            collect_documents(&self.users, doc! { "deleted_at": { "$ne": Bson::Null } }).await?;
        log::debug!("Fetched {} deleted user documents", documents.len());
        Ok(documents.iter().map(UserRecord::from_document).collect())
    }
}

pub struct MongoCenterRepository {
    centers: Collection<Document>,
}

impl MongoCenterRepository {
    pub fn new(db: &MongoDB, collection: &str) -> Self {
        Self {
            centers: db.collection::<Document>(collection),
        }
    }
}

#[async_trait]
impl CenterRepository for MongoCenterRepository {
    async fn list_all(&self) -> Result<Vec<CenterRecord>, AppError> {
        let documents = collect_documents(&self.centers, doc! {}).await?;

        let total = documents.len();
        let centers: Vec<CenterRecord> = documents
            .iter()
            .filter_map(CenterRecord::from_document)
            .collect();

        if centers.len() < total {
            log::warn!("⚠️  Skipped {} center documents without an id", total - centers.len());
        }
        Ok(centers)
    }
}

pub struct MongoMembershipRepository {
    memberships: Collection<Document>,
}

impl MongoMembershipRepository {
    pub fn new(db: &MongoDB, collection: &str) -> Self {
        Self {
            memberships: db.collection::<Document>(collection),
        }
    }
}

#[async_trait]
impl MembershipRepository for MongoMembershipRepository {
    async fn list_by_center(&self, center_id: &str) -> Result<Vec<MembershipRecord>, AppError> {
        let filter = doc! { "center_id": { "$in": id_candidates(center_id) } };
        let documents = collect_documents(&self.memberships, filter)
            .await
            .map_err(|e| AppError::SourceFetchError(format!("center {}: {}", center_id, e)))?;

        Ok(documents.iter().map(MembershipRecord::from_document).collect())
    }
}
