use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::article::{Article, ArticleForm, ArticleUpdateForm};
use crate::models::tag::Tag;
use crate::services::tag::TagService;
use crate::utils::time::current_timestamp;
use uuid::Uuid;
use validator::Validate;

/// Maximum length of the slug column.
pub const SLUG_MAX_LENGTH: usize = 191;

const ARTICLE_COLUMNS: &str =
    "a.id, a.user_id, a.title, a.body, a.slug, a.published, a.created_at, a.updated_at";

/// Derive a URL-safe slug from an article title, capped to the column size.
/// Collisions are not resolved here; the unique slug index reports them.
pub fn slug_for_title(title: &str) -> String {
    let mut slugged = slug::slugify(title);
    slugged.truncate(SLUG_MAX_LENGTH);
    slugged.trim_end_matches('-').to_string()
}

/// Build the tagged-article query. With no requested titles it selects
/// articles that have zero tags (outer join, no match); otherwise articles
/// carrying at least one of the titles (inner join, membership). Grouping by
/// article id keeps an article matching several titles to a single row.
pub fn tagged_articles_query(title_count: usize) -> String {
    if title_count == 0 {
        return format!(
            "SELECT {} FROM article a \
             LEFT JOIN article_tag jt ON jt.article_id = a.id \
             LEFT JOIN tag t ON t.id = jt.tag_id \
             WHERE t.title IS NULL \
             GROUP BY a.id",
            ARTICLE_COLUMNS
        );
    }

    let placeholders: Vec<String> = (1..=title_count).map(|i| format!("${}", i)).collect();
    format!(
        "SELECT {} FROM article a \
         INNER JOIN article_tag jt ON jt.article_id = a.id \
         INNER JOIN tag t ON t.id = jt.tag_id \
         WHERE t.title IN ({}) \
         GROUP BY a.id",
        ARTICLE_COLUMNS,
        placeholders.join(", ")
    )
}

pub struct ArticleService<'a> {
    db: &'a Database,
}

impl<'a> ArticleService<'a> {
    pub fn new(db: &'a Database) -> Self {
        ArticleService { db }
    }

    /// Create an article. The save steps run in order: validate the form,
    /// reconcile the free-text tag input into tag records, derive the slug
    /// from the title, insert the row, persist the tags and join rows.
    pub async fn create_article(&self, user_id: &str, form: &ArticleForm) -> AppResult<Article> {
        form.validate()?;

        let tags = match form.tag_string.as_deref() {
            Some(tag_input) if !tag_input.trim().is_empty() => {
                TagService::new(self.db).build_tags(tag_input).await?
            }
            _ => Vec::new(),
        };

        let now = current_timestamp();
        let id = Uuid::new_v4().to_string();
        let slug = slug_for_title(&form.title);

        sqlx::query(
            r#"
            INSERT INTO article (id, user_id, title, body, slug, published, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&form.title)
        .bind(&form.body)
        .bind(&slug)
        .bind(form.published)
        .bind(now)
        .bind(now)
        .execute(&self.db.pool)
        .await?;

        self.attach_tags(&id, tags).await?;

        tracing::debug!("Created article '{}'", slug);

        self.get_article_by_id(&id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to create article".to_string()))
    }

    /// Partial update. A non-empty `tag_string` re-runs reconciliation and
    /// replaces the article's tag collection. The slug is set once at
    /// creation and never regenerated.
    pub async fn update_article(&self, id: &str, form: &ArticleUpdateForm) -> AppResult<Article> {
        form.validate()?;

        let existing = self
            .get_article_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Article not found".to_string()))?;

        let title = form.title.as_ref().unwrap_or(&existing.title);
        let body = form.body.as_ref().unwrap_or(&existing.body);
        let published = form.published.unwrap_or(existing.published);
        let now = current_timestamp();

        sqlx::query(
            r#"
            UPDATE article
            SET title = $1, body = $2, published = $3, updated_at = $4
            WHERE id = $5
            "#,
        )
        .bind(title)
        .bind(body)
        .bind(published)
        .bind(now)
        .bind(id)
        .execute(&self.db.pool)
        .await?;

        if let Some(tag_input) = form.tag_string.as_deref() {
            if !tag_input.trim().is_empty() {
                let tags = TagService::new(self.db).build_tags(tag_input).await?;
                sqlx::query("DELETE FROM article_tag WHERE article_id = $1")
                    .bind(id)
                    .execute(&self.db.pool)
                    .await?;
                self.attach_tags(id, tags).await?;
            }
        }

        self.get_article_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Article not found".to_string()))
    }

    pub async fn get_article_by_id(&self, id: &str) -> AppResult<Option<Article>> {
        let result = sqlx::query_as::<_, Article>(&format!(
            "SELECT {} FROM article a WHERE a.id = $1",
            ARTICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?;

        match result {
            Some(mut article) => {
                article.tags = TagService::new(self.db).tags_for_article(&article.id).await?;
                Ok(Some(article))
            }
            None => Ok(None),
        }
    }

    pub async fn get_article_by_slug(&self, slug: &str) -> AppResult<Option<Article>> {
        let result = sqlx::query_as::<_, Article>(&format!(
            "SELECT {} FROM article a WHERE a.slug = $1",
            ARTICLE_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.db.pool)
        .await?;

        match result {
            Some(mut article) => {
                article.tags = TagService::new(self.db).tags_for_article(&article.id).await?;
                Ok(Some(article))
            }
            None => Ok(None),
        }
    }

    pub async fn list_articles(&self) -> AppResult<Vec<Article>> {
        let articles = sqlx::query_as::<_, Article>(&format!(
            "SELECT {} FROM article a ORDER BY a.created_at DESC",
            ARTICLE_COLUMNS
        ))
        .fetch_all(&self.db.pool)
        .await?;

        self.load_tags(articles).await
    }

    /// Articles matching any of the requested tag titles; with an empty
    /// request, articles that have no tags at all.
    pub async fn find_tagged(&self, titles: &[String]) -> AppResult<Vec<Article>> {
        let query_str = tagged_articles_query(titles.len());

        let mut query = sqlx::query_as::<_, Article>(&query_str);
        for title in titles {
            query = query.bind(title);
        }

        let articles = query.fetch_all(&self.db.pool).await?;
        self.load_tags(articles).await
    }

    /// Delete an article and its join rows. Tags themselves are shared
    /// across articles and stay.
    pub async fn delete_article(&self, id: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM article_tag WHERE article_id = $1")
            .bind(id)
            .execute(&self.db.pool)
            .await?;

        let result = sqlx::query("DELETE FROM article WHERE id = $1")
            .bind(id)
            .execute(&self.db.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Article not found".to_string()));
        }

        Ok(())
    }

    /// Persist any unpersisted tags, then write the join rows.
    async fn attach_tags(&self, article_id: &str, tags: Vec<Tag>) -> AppResult<()> {
        let tag_service = TagService::new(self.db);

        for tag in tags {
            let tag = if tag.is_persisted() {
                tag
            } else {
                tag_service.insert_tag(&tag.title).await?
            };

            let tag_id = tag
                .id
                .ok_or_else(|| AppError::Internal("Tag missing id after insert".to_string()))?;

            sqlx::query("INSERT INTO article_tag (article_id, tag_id) VALUES ($1, $2)")
                .bind(article_id)
                .bind(&tag_id)
                .execute(&self.db.pool)
                .await?;
        }

        Ok(())
    }

    async fn load_tags(&self, articles: Vec<Article>) -> AppResult<Vec<Article>> {
        let tag_service = TagService::new(self.db);
        let mut out = Vec::with_capacity(articles.len());
        for mut article in articles {
            article.tags = tag_service.tags_for_article(&article.id).await?;
            out.push(article);
        }
        Ok(out)
    }
}
