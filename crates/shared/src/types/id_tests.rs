use super::*;
use std::str::FromStr;
use uuid::Uuid;

#[test]
fn test_new_ids_are_unique() {
    assert_ne!(StoredFileId::new(), StoredFileId::new());
}

#[test]
fn test_typed_id_uuid_conversions() {
    let uuid = Uuid::new_v4();
    let id = UserId::from(uuid);
    assert_eq!(id, UserId::from_uuid(uuid));
    assert_eq!(Uuid::from(id), uuid);
    assert_eq!(id.into_inner(), uuid);
}

#[test]
fn test_typed_id_display() {
    let uuid = Uuid::new_v4();
    let id = StoredFileId::from_uuid(uuid);
    assert_eq!(format!("{id}"), uuid.to_string());
}

#[test]
fn test_typed_id_from_str() {
    let uuid = Uuid::new_v4();
    let id = UserId::from_str(&uuid.to_string()).expect("valid uuid");
    assert_eq!(id.into_inner(), uuid);
    assert!(StoredFileId::from_str("invalid").is_err());
}

#[test]
fn test_typed_id_serializes_transparently() {
    let uuid = Uuid::new_v4();
    let json = serde_json::to_string(&StoredFileId::from_uuid(uuid)).expect("serialize");
    assert_eq!(json, format!("\"{uuid}\""));
}
