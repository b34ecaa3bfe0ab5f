use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::tag::Tag;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Article {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub body: String,
    pub slug: String,
    pub published: bool,
    pub created_at: i64,
    pub updated_at: i64,
    /// Loaded through the `article_tag` join table, not a column.
    #[sqlx(skip)]
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Article {
    /// The display form of the tag collection: titles joined with ", ".
    /// Empty string when the article has no tags.
    pub fn tag_string(&self) -> String {
        self.tags
            .iter()
            .map(|tag| tag.title.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Input for creating an article. `tag_string` is transient free text
/// ("rust, web, sqlite"); it is reconciled into tag rows on save and never
/// stored verbatim.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ArticleForm {
    #[validate(length(min = 10, max = 255))]
    pub title: String,
    #[validate(length(min = 10))]
    pub body: String,
    #[serde(default)]
    pub published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_string: Option<String>,
}

/// Partial update input. Absent fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ArticleUpdateForm {
    #[validate(length(min = 10, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 10))]
    pub body: Option<String>,
    pub published: Option<bool>,
    pub tag_string: Option<String>,
}
