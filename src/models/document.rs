// ==================== INGESTION HELPERS ====================
// Raw backend documents are inconsistent: ids come as `_id` or `id`,
// as ObjectId or string, and references come as plain ids or embedded
// documents. Everything is normalized here, before the engine sees it.

use mongodb::bson::{Bson, Document};

/// Canonical string form of an id-like BSON value.
pub fn bson_to_id(value: &Bson) -> Option<String> {
    match value {
        Bson::ObjectId(oid) => Some(oid.to_hex()),
        Bson::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Bson::Int32(n) => Some(n.to_string()),
        Bson::Int64(n) => Some(n.to_string()),
        Bson::Document(inner) => document_id(inner),
        _ => None,
    }
}

/// `_id` first, then `id`. Empty or unusable values fall through.
pub fn document_id(doc: &Document) -> Option<String> {
    ["_id", "id"]
        .iter()
        .find_map(|key| doc.get(key).and_then(bson_to_id))
}

/// Reads an id-like field, accepting either a bare id or an embedded ref.
pub fn ref_id(doc: &Document, key: &str) -> Option<String> {
    doc.get(key).and_then(bson_to_id)
}

pub fn string_field(doc: &Document, key: &str) -> Option<String> {
    match doc.get(key) {
        Some(Bson::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Name of a role entry: a plain string or a `{name}` / `{_id}` ref.
pub fn role_name(value: &Bson) -> Option<String> {
    match value {
        Bson::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Bson::Document(inner) => string_field(inner, "name").or_else(|| document_id(inner)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, oid::ObjectId};

    #[test]
    fn test_underscore_id_wins_over_id() {
        let d = doc! { "_id": "a1", "id": "b2" };
        assert_eq!(document_id(&d), Some("a1".to_string()));
    }

    #[test]
    fn test_empty_underscore_id_falls_back() {
        let d = doc! { "_id": "  ", "id": "b2" };
        assert_eq!(document_id(&d), Some("b2".to_string()));
    }

    #[test]
    fn test_object_id_is_hex() {
        let oid = ObjectId::parse_str("65a1f0c2e4b0a1b2c3d4e5f6").unwrap();
        let d = doc! { "_id": oid };
        assert_eq!(document_id(&d), Some("65a1f0c2e4b0a1b2c3d4e5f6".to_string()));
    }

    #[test]
    fn test_missing_id() {
        assert_eq!(document_id(&doc! { "username": "ghost" }), None);
        assert_eq!(document_id(&doc! { "_id": Bson::Null }), None);
    }

    #[test]
    fn test_ref_id_accepts_embedded_document() {
        let d = doc! { "center_id": { "_id": "c9", "name": "North" } };
        assert_eq!(ref_id(&d, "center_id"), Some("c9".to_string()));
    }

    #[test]
    fn test_role_name_shapes() {
        assert_eq!(role_name(&Bson::String("Admin".into())), Some("Admin".to_string()));
        assert_eq!(
            role_name(&Bson::Document(doc! { "_id": "r1", "name": "Editor" })),
            Some("Editor".to_string())
        );
        assert_eq!(
            role_name(&Bson::Document(doc! { "_id": "r1" })),
            Some("r1".to_string())
        );
        assert_eq!(role_name(&Bson::Int32(3)), None);
    }
}
