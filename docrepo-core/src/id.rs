//! Document identifier helpers.
//!
//! Documents are keyed by a 12-byte [`ObjectId`]. The all-zero value is the empty
//! sentinel: a document carrying it has not been assigned an identifier yet.

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// The empty identifier sentinel.
pub const EMPTY_ID: ObjectId = ObjectId::from_bytes([0; 12]);

/// Returns the empty identifier sentinel.
pub fn empty_id() -> ObjectId {
    EMPTY_ID
}

/// Returns a freshly generated identifier.
pub fn generate_id() -> ObjectId {
    ObjectId::new()
}

pub fn is_empty_id(id: &ObjectId) -> bool {
    *id == EMPTY_ID
}

pub fn is_not_empty_id(id: &ObjectId) -> bool {
    !is_empty_id(id)
}

/// Parses a 24 character hex string into an identifier.
///
/// # Errors
///
/// Returns [`DocumentStoreError::InvalidId`] if the string is not a valid identifier.
pub fn parse_id(id: &str) -> DocumentStoreResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| DocumentStoreError::InvalidId(id.to_string()))
}

/// Parses every string in `ids`, failing on the first malformed one.
pub fn parse_ids<S: AsRef<str>>(ids: &[S]) -> DocumentStoreResult<Vec<ObjectId>> {
    ids.iter()
        .map(|id| parse_id(id.as_ref()))
        .collect()
}

/// True iff `id` parses and is not the empty sentinel.
pub fn is_valid_not_empty_id(id: &str) -> bool {
    parse_id(id).is_ok_and(|id| is_not_empty_id(&id))
}

/// Creation time embedded in an identifier, second precision.
pub fn id_created_at(id: &ObjectId) -> DateTime<Utc> {
    id.timestamp().to_chrono()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn empty_sentinel_is_all_zero() {
        assert_eq!(empty_id().to_hex(), "000000000000000000000000");
        assert!(is_empty_id(&empty_id()));
        assert!(!is_not_empty_id(&empty_id()));
    }

    #[test]
    fn generated_ids_are_distinct_and_not_empty() {
        let ids = (0..500).map(|_| generate_id()).collect::<Vec<_>>();
        let unique = ids.iter().collect::<HashSet<_>>();

        assert_eq!(unique.len(), ids.len());
        assert!(ids.iter().all(is_not_empty_id));
    }

    #[test]
    fn valid_not_empty_id_requires_parse_and_non_sentinel() {
        let id = generate_id();

        assert!(is_valid_not_empty_id(&id.to_hex()));
        assert!(!is_valid_not_empty_id("000000000000000000000000"));
        assert!(!is_valid_not_empty_id("not-an-id"));
        assert!(!is_valid_not_empty_id(""));
        assert!(!is_valid_not_empty_id("65a1b2c3d4e5f6a7b8c9d0e"));
    }

    #[test]
    fn parse_ids_reports_the_bad_string() {
        let good = generate_id().to_hex();

        match parse_ids(&[good.as_str(), "zzz"]) {
            Err(DocumentStoreError::InvalidId(bad)) => assert_eq!(bad, "zzz"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn created_at_reflects_generation_time() {
        let before = Utc::now().timestamp();
        let created = id_created_at(&generate_id()).timestamp();

        assert!(created >= before - 1 && created <= Utc::now().timestamp());
    }
}
