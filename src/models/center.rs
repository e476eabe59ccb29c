use mongodb::bson::Document;
use serde::{Deserialize, Serialize};

use super::document::{document_id, ref_id, string_field};

/// Organizational center (collection: centers)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CenterRecord {
    pub id: String,
    pub name: String,
}

impl CenterRecord {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    /// `None` when the document has no usable id.
    pub fn from_document(doc: &Document) -> Option<Self> {
        Some(Self {
            id: document_id(doc)?,
            name: string_field(doc, "name").unwrap_or_default(),
        })
    }
}

/// Join row linking a user to a center (collection: center_memberships).
/// Authoritative for center assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipRecord {
    pub user_id: String,
    pub center_id: String,
    pub role_in_center: Option<String>,
}

impl MembershipRecord {
    pub fn new(user_id: &str, center_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            center_id: center_id.to_string(),
            role_in_center: None,
        }
    }

    /// Missing ids normalize to empty strings; the index builder skips
    /// rows without a user id.
    pub fn from_document(doc: &Document) -> Self {
        Self {
            user_id: ref_id(doc, "user_id").unwrap_or_default(),
            center_id: ref_id(doc, "center_id").unwrap_or_default(),
            role_in_center: string_field(doc, "role_in_center")
                .or_else(|| string_field(doc, "role")),
        }
    }
}

/// Value of the membership index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CenterAssignment {
    pub center_id: String,
    pub center_name: String,
}
