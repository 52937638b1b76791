use uuid::Uuid;

use crate::models::record::RecordType;

/// Child collection holding a workout session's exercises.
pub const EXERCISES: &str = "exercises";
/// Child collection holding an exercise's sets (out-of-line layout).
pub const SETS: &str = "sets";

/// Address of a collection: `accounts/{account}/records/{type}/items`
/// or a child collection below one of its documents.
///
/// The hierarchy is expressed here once so call sites never concatenate
/// raw path strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath(String);

/// Address of a single document inside a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath(String);

impl CollectionPath {
    pub fn items(account_id: Uuid, record_type: RecordType) -> Self {
        Self(format!(
            "accounts/{}/records/{}/items",
            account_id,
            record_type.collection_name()
        ))
    }

    pub fn doc(&self, id: impl std::fmt::Display) -> DocumentPath {
        DocumentPath(format!("{}/{}", self.0, id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl DocumentPath {
    pub fn child(&self, collection: &str) -> CollectionPath {
        CollectionPath(format!("{}/{}", self.0, collection))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
