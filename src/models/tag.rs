use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A topical label. `id` is assigned by the database at insert time; a tag
/// produced by reconciliation that has not been persisted yet carries `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: Option<String>,
    pub title: String,
}

impl Tag {
    /// A new, unpersisted tag.
    pub fn new(title: impl Into<String>) -> Self {
        Tag {
            id: None,
            title: title.into(),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
