use crate::db::Database;
use crate::error::AppResult;
use crate::models::tag::Tag;
use uuid::Uuid;

/// Split free-text tag input ("rust, web , rust") into candidate titles:
/// trimmed, empties dropped, deduplicated by exact match, first-seen order.
pub fn parse_tag_input(tag_input: &str) -> Vec<String> {
    let mut titles: Vec<String> = Vec::new();
    for token in tag_input.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if !titles.iter().any(|title| title == token) {
            titles.push(token.to_string());
        }
    }
    titles
}

/// Merge candidate titles with the tags the lookup found: existing tags come
/// first, then one unpersisted tag per title the lookup did not match, in
/// first-seen order.
pub fn reconcile(candidates: Vec<String>, existing: Vec<Tag>) -> Vec<Tag> {
    let mut remaining = candidates;
    for tag in &existing {
        if let Some(index) = remaining.iter().position(|title| *title == tag.title) {
            remaining.remove(index);
        }
    }

    let mut out = existing;
    out.extend(remaining.into_iter().map(Tag::new));
    out
}

pub struct TagService<'a> {
    db: &'a Database,
}

impl<'a> TagService<'a> {
    pub fn new(db: &'a Database) -> Self {
        TagService { db }
    }

    /// The existing-tag lookup: returns the persisted tags whose titles are
    /// in `titles`.
    pub async fn lookup_by_titles(&self, titles: &[String]) -> AppResult<Vec<Tag>> {
        if titles.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders: Vec<String> = (1..=titles.len()).map(|i| format!("${}", i)).collect();
        let query_str = format!(
            "SELECT id, title FROM tag WHERE title IN ({})",
            placeholders.join(", ")
        );

        let mut query = sqlx::query_as::<_, Tag>(&query_str);
        for title in titles {
            query = query.bind(title);
        }

        let tags = query.fetch_all(&self.db.pool).await?;
        Ok(tags)
    }

    /// Turn free-text tag input into the final tag collection for an
    /// article: parse, look up persisted titles, reuse the matches, and
    /// create an unpersisted tag for each title that is new.
    pub async fn build_tags(&self, tag_input: &str) -> AppResult<Vec<Tag>> {
        let candidates = parse_tag_input(tag_input);
        let existing = self.lookup_by_titles(&candidates).await?;
        Ok(reconcile(candidates, existing))
    }

    /// Insert a new tag row. A concurrent insert of the same title hits the
    /// unique title index and surfaces as a database error, propagated
    /// unchanged.
    pub async fn insert_tag(&self, title: &str) -> AppResult<Tag> {
        let id = Uuid::new_v4().to_string();

        sqlx::query("INSERT INTO tag (id, title) VALUES ($1, $2)")
            .bind(&id)
            .bind(title)
            .execute(&self.db.pool)
            .await?;

        tracing::debug!("Created tag '{}'", title);

        Ok(Tag {
            id: Some(id),
            title: title.to_string(),
        })
    }

    pub async fn get_all_tags(&self) -> AppResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>("SELECT id, title FROM tag ORDER BY title")
            .fetch_all(&self.db.pool)
            .await?;
        Ok(tags)
    }

    /// The tag collection of one article, in title order.
    pub async fn tags_for_article(&self, article_id: &str) -> AppResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.title
            FROM tag t
            INNER JOIN article_tag jt ON jt.tag_id = t.id
            WHERE jt.article_id = $1
            ORDER BY t.title
            "#,
        )
        .bind(article_id)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_database;

    #[test]
    fn test_parse_trims_and_drops_empty_tokens() {
        assert_eq!(parse_tag_input(" rust ,  , web,"), vec!["rust", "web"]);
        assert_eq!(parse_tag_input(""), Vec::<String>::new());
        assert_eq!(parse_tag_input("   "), Vec::<String>::new());
        assert_eq!(parse_tag_input(" , ,, "), Vec::<String>::new());
    }

    #[test]
    fn test_parse_dedupes_exact_match_first_seen() {
        // Comparison is exact: "go" and "Go" are distinct titles.
        assert_eq!(parse_tag_input("go, Go , go"), vec!["go", "Go"]);
    }

    #[test]
    fn test_reconcile_existing_first_then_new_in_input_order() {
        let candidates = parse_tag_input("a, b, c");
        let existing = vec![Tag {
            id: Some("7".to_string()),
            title: "b".to_string(),
        }];

        let result = reconcile(candidates, existing);
        assert_eq!(
            result,
            vec![
                Tag {
                    id: Some("7".to_string()),
                    title: "b".to_string(),
                },
                Tag::new("a"),
                Tag::new("c"),
            ]
        );
    }

    #[test]
    fn test_reconcile_no_matches_all_new() {
        let result = reconcile(parse_tag_input("x, y"), Vec::new());
        assert_eq!(result, vec![Tag::new("x"), Tag::new("y")]);
        assert!(result.iter().all(|tag| !tag.is_persisted()));
    }

    #[test]
    fn test_reconcile_output_titles_unique_and_non_empty() {
        let result = reconcile(parse_tag_input("go, Go , go, , web"), Vec::new());
        let titles: Vec<&str> = result.iter().map(|tag| tag.title.as_str()).collect();
        assert_eq!(titles, vec!["go", "Go", "web"]);
        for (i, title) in titles.iter().enumerate() {
            assert!(!title.is_empty());
            assert!(!titles[i + 1..].contains(title));
        }
    }

    #[tokio::test]
    async fn test_build_tags_empty_input() {
        let db = memory_database().await;
        let service = TagService::new(&db);

        assert!(service.build_tags("").await.unwrap().is_empty());
        assert!(service.build_tags("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_build_tags_reuses_persisted_rows() {
        let db = memory_database().await;
        let service = TagService::new(&db);

        let rust = service.insert_tag("rust").await.unwrap();
        let tags = service.build_tags("rust, web").await.unwrap();

        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0], rust);
        assert_eq!(tags[1], Tag::new("web"));
    }

    #[tokio::test]
    async fn test_build_tags_idempotent_once_persisted() {
        let db = memory_database().await;
        let service = TagService::new(&db);

        let first = service.build_tags("rust, web").await.unwrap();
        for tag in &first {
            assert!(!tag.is_persisted());
            service.insert_tag(&tag.title).await.unwrap();
        }

        // Every title now resolves through the lookup: zero new tags.
        let second = service.build_tags("rust, web").await.unwrap();
        assert_eq!(second.len(), 2);
        assert!(second.iter().all(|tag| tag.is_persisted()));
    }

    #[tokio::test]
    async fn test_duplicate_title_insert_is_a_database_error() {
        let db = memory_database().await;
        let service = TagService::new(&db);

        service.insert_tag("rust").await.unwrap();
        let err = service.insert_tag("rust").await.unwrap_err();
        assert!(matches!(err, crate::error::AppError::Database(_)));
    }
}
