use chrono::{DateTime, Utc};
use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

use super::document::{document_id, ref_id, role_name, string_field};
use crate::utils::timestamp::bson_to_datetime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
    Pending,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Suspended => "suspended",
            UserStatus::Pending => "pending",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "active" => Some(UserStatus::Active),
            "inactive" => Some(UserStatus::Inactive),
            "suspended" => Some(UserStatus::Suspended),
            "pending" => Some(UserStatus::Pending),
            _ => None,
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user row as delivered by the users collection, normalized.
///
/// `id` is empty when the source row carried no usable identifier; such
/// rows are dropped (and counted) by the deduplicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub status: UserStatus,
    pub roles: Vec<String>,
    /// Denormalized; may be stale until reconciled.
    pub center_id: Option<String>,
    pub center_name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub updated_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>)]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    pub fn new(id: &str, username: &str) -> Self {
        Self {
            id: id.to_string(),
            username: username.to_string(),
            email: String::new(),
            full_name: String::new(),
            status: UserStatus::Active,
            roles: Vec::new(),
            center_id: None,
            center_name: None,
            updated_at: None,
            created_at: None,
            deleted_at: None,
        }
    }

    /// Normalizes a raw users-collection document.
    pub fn from_document(doc: &Document) -> Self {
        let status = string_field(doc, "status")
            .and_then(|s| UserStatus::parse(&s))
            .or_else(|| match doc.get("is_active") {
                Some(Bson::Boolean(true)) => Some(UserStatus::Active),
                Some(Bson::Boolean(false)) => Some(UserStatus::Inactive),
                _ => None,
            })
            .unwrap_or(UserStatus::Inactive);

        let roles = match doc.get("roles") {
            Some(Bson::Array(items)) => items.iter().filter_map(role_name).collect(),
            _ => doc.get("role").and_then(role_name).into_iter().collect(),
        };

        let center_name = string_field(doc, "center_name").or_else(|| match doc.get("center_id") {
            Some(Bson::Document(center)) => string_field(center, "name"),
            _ => None,
        });

        let timestamp = |key: &str| doc.get(key).and_then(bson_to_datetime);

        Self {
            id: document_id(doc).unwrap_or_default(),
            username: string_field(doc, "username").unwrap_or_default(),
            email: string_field(doc, "email").unwrap_or_default(),
            full_name: string_field(doc, "full_name")
                .or_else(|| string_field(doc, "name"))
                .unwrap_or_default(),
            status,
            roles,
            center_id: ref_id(doc, "center_id"),
            center_name,
            updated_at: timestamp("updated_at"),
            created_at: timestamp("created_at"),
            deleted_at: timestamp("deleted_at"),
        }
    }

    /// `updated_at`, falling back to `created_at`.
    pub fn effective_timestamp(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// A user whose center fields have been settled against the membership index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
pub struct ReconciledUser(UserRecord);

impl ReconciledUser {
    pub(crate) fn from_record(record: UserRecord) -> Self {
        Self(record)
    }
}

impl Deref for ReconciledUser {
    type Target = UserRecord;

    fn deref(&self) -> &UserRecord {
        &self.0
    }
}
