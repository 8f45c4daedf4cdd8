//! Post repository.

use std::sync::Arc;

use crate::entities::{
    Bookmark, Category, Post, PostTag, Tag, User, bookmark, category, post, post::PostStatus,
    post_tag, tag, user,
};
use quill_common::AppResult;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
    prelude::DateTimeWithTimeZone,
    sea_query::{Expr, Func, Query},
};

/// Filters for listing posts. Every filter is optional and they combine with AND.
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub status: Option<PostStatus>,
    /// Category slug
    pub category: Option<String>,
    /// Author username (case-insensitive)
    pub author: Option<String>,
    /// Tag slugs; a post matches if it has any of them
    pub tags: Vec<String>,
    /// Inclusive lower bound on `published_at`
    pub published_from: Option<DateTimeWithTimeZone>,
    /// Exclusive upper bound on `published_at`
    pub published_before: Option<DateTimeWithTimeZone>,
    /// Case-insensitive substring of title or body
    pub search: Option<String>,
    /// Only posts bookmarked by this user
    pub bookmarked_by: Option<String>,
}

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Ok(Post::find_by_id(id).one(self.db.as_ref()).await?)
    }

    /// Find a post by ID on a specific connection (usually a transaction).
    pub async fn find_by_id_on<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<Option<post::Model>> {
        Ok(Post::find_by_id(id).one(conn).await?)
    }

    /// Find posts by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<post::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Ok(Post::find()
            .filter(post::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await?)
    }

    /// Check whether a slug is used by another post (case-insensitive).
    pub async fn slug_exists<C: ConnectionTrait>(
        &self,
        conn: &C,
        slug: &str,
        exclude_id: Option<&str>,
    ) -> AppResult<bool> {
        let mut query = Post::find()
            .filter(Expr::expr(Func::lower(Expr::col(post::Column::Slug))).eq(slug.to_lowercase()));

        if let Some(id) = exclude_id {
            query = query.filter(post::Column::Id.ne(id));
        }

        Ok(query.count(conn).await? > 0)
    }

    /// Insert a new post.
    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: post::ActiveModel,
    ) -> AppResult<post::Model> {
        Ok(model.insert(conn).await?)
    }

    /// Update a post.
    pub async fn update<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: post::ActiveModel,
    ) -> AppResult<post::Model> {
        Ok(model.update(conn).await?)
    }

    /// Delete a post row.
    pub async fn delete<C: ConnectionTrait>(&self, conn: &C, id: &str) -> AppResult<()> {
        Post::delete_by_id(id).exec(conn).await?;
        Ok(())
    }

    /// Detach every post from a category.
    pub async fn clear_category<C: ConnectionTrait>(
        &self,
        conn: &C,
        category_id: &str,
    ) -> AppResult<u64> {
        let result = Post::update_many()
            .col_expr(post::Column::CategoryId, Expr::value(Option::<String>::None))
            .filter(post::Column::CategoryId.eq(category_id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }

    /// List posts matching `query`, newest publication first.
    ///
    /// Returns the page of posts and the total number of matches.
    pub async fn list(
        &self,
        query: &PostQuery,
        offset: u64,
        limit: u64,
    ) -> AppResult<(Vec<post::Model>, u64)> {
        let select = Self::filtered(query);
        let total = select.clone().count(self.db.as_ref()).await?;

        let posts = select
            .order_by_desc(post::Column::PublishedAt)
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        Ok((posts, total))
    }

    fn filtered(query: &PostQuery) -> Select<Post> {
        let mut select = Post::find();

        if let Some(status) = query.status {
            select = select.filter(post::Column::Status.eq(status));
        }

        if let Some(slug) = &query.category {
            select = select.filter(
                post::Column::CategoryId.in_subquery(
                    Query::select()
                        .column(category::Column::Id)
                        .from(Category)
                        .and_where(category::Column::Slug.eq(slug.as_str()))
                        .to_owned(),
                ),
            );
        }

        if let Some(username) = &query.author {
            select = select.filter(
                post::Column::AuthorId.in_subquery(
                    Query::select()
                        .column(user::Column::Id)
                        .from(User)
                        .and_where(user::Column::UsernameLower.eq(username.to_lowercase()))
                        .to_owned(),
                ),
            );
        }

        if !query.tags.is_empty() {
            select = select.filter(
                post::Column::Id.in_subquery(
                    Query::select()
                        .column(post_tag::Column::PostId)
                        .from(PostTag)
                        .and_where(
                            post_tag::Column::TagId.in_subquery(
                                Query::select()
                                    .column(tag::Column::Id)
                                    .from(Tag)
                                    .and_where(tag::Column::Slug.is_in(query.tags.clone()))
                                    .to_owned(),
                            ),
                        )
                        .to_owned(),
                ),
            );
        }

        if let Some(from) = query.published_from {
            select = select.filter(post::Column::PublishedAt.gte(from));
        }

        if let Some(before) = query.published_before {
            select = select.filter(post::Column::PublishedAt.lt(before));
        }

        if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term.to_lowercase());
            select = select.filter(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(post::Column::Title))).like(pattern.clone()))
                    .add(Expr::expr(Func::lower(Expr::col(post::Column::Body))).like(pattern)),
            );
        }

        if let Some(user_id) = &query.bookmarked_by {
            select = select.filter(
                post::Column::Id.in_subquery(
                    Query::select()
                        .column(bookmark::Column::PostId)
                        .from(Bookmark)
                        .and_where(bookmark::Column::UserId.eq(user_id.as_str()))
                        .to_owned(),
                ),
            );
        }

        select
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::{insert_category, insert_post, insert_tag, insert_user, setup_test_db};
    use chrono::{Duration, Utc};
    use sea_orm::Set;

    async fn publish(db: &DatabaseConnection, id: &str, days_ago: i64) {
        let post = Post::find_by_id(id).one(db).await.unwrap().unwrap();
        let mut active: post::ActiveModel = post.into();
        active.status = Set(PostStatus::Published);
        active.body = Set("body".to_string());
        active.published_at = Set(Some((Utc::now() - Duration::days(days_ago)).into()));
        active.update(db).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_orders_by_published_at_desc() {
        let db = Arc::new(setup_test_db().await.unwrap());
        insert_user(&db, "u1", "alice", false).await;
        insert_post(&db, "p1", "u1", "Old", "old").await;
        insert_post(&db, "p2", "u1", "New", "new").await;
        publish(&db, "p1", 3).await;
        publish(&db, "p2", 1).await;

        let repo = PostRepository::new(db);
        let query = PostQuery {
            status: Some(PostStatus::Published),
            ..Default::default()
        };
        let (posts, total) = repo.list(&query, 0, 10).await.unwrap();

        assert_eq!(total, 2);
        assert_eq!(posts[0].id, "p2");
        assert_eq!(posts[1].id, "p1");
    }

    #[tokio::test]
    async fn test_list_filters_by_author_category_and_search() {
        let db = Arc::new(setup_test_db().await.unwrap());
        insert_user(&db, "u1", "Alice", false).await;
        insert_user(&db, "u2", "bob", false).await;
        insert_category(&db, "c1", "Rust", "rust").await;
        let post = insert_post(&db, "p1", "u1", "Learning Rust", "learning-rust").await;
        insert_post(&db, "p2", "u2", "Cooking", "cooking").await;

        let mut active: post::ActiveModel = post.into();
        active.category_id = Set(Some("c1".to_string()));
        active.update(db.as_ref()).await.unwrap();

        let repo = PostRepository::new(db);

        let by_author = PostQuery {
            author: Some("ALICE".to_string()),
            ..Default::default()
        };
        let (posts, _) = repo.list(&by_author, 0, 10).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "p1");

        let by_category = PostQuery {
            category: Some("rust".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.list(&by_category, 0, 10).await.unwrap().1, 1);

        let by_search = PostQuery {
            search: Some("cook".to_string()),
            ..Default::default()
        };
        let (posts, _) = repo.list(&by_search, 0, 10).await.unwrap();
        assert_eq!(posts[0].id, "p2");
    }

    #[tokio::test]
    async fn test_list_filters_by_any_tag_without_duplicates() {
        let db = Arc::new(setup_test_db().await.unwrap());
        insert_user(&db, "u1", "alice", false).await;
        insert_post(&db, "p1", "u1", "One", "one").await;
        insert_post(&db, "p2", "u1", "Two", "two").await;
        insert_tag(&db, "t1", "Rust", "rust").await;
        insert_tag(&db, "t2", "Go", "go").await;

        for (id, post_id, tag_id) in [("l1", "p1", "t1"), ("l2", "p1", "t2"), ("l3", "p2", "t2")] {
            post_tag::ActiveModel {
                id: Set(id.to_string()),
                post_id: Set(post_id.to_string()),
                tag_id: Set(tag_id.to_string()),
                created_at: Set(Utc::now().into()),
            }
            .insert(db.as_ref())
            .await
            .unwrap();
        }

        let repo = PostRepository::new(db);
        let query = PostQuery {
            tags: vec!["rust".to_string(), "go".to_string()],
            ..Default::default()
        };
        let (posts, total) = repo.list(&query, 0, 10).await.unwrap();

        assert_eq!(total, 2);
        assert_eq!(posts.len(), 2);
    }

    #[tokio::test]
    async fn test_clear_category() {
        let db = Arc::new(setup_test_db().await.unwrap());
        insert_user(&db, "u1", "alice", false).await;
        insert_category(&db, "c1", "Rust", "rust").await;
        let post = insert_post(&db, "p1", "u1", "One", "one").await;
        let mut active: post::ActiveModel = post.into();
        active.category_id = Set(Some("c1".to_string()));
        active.update(db.as_ref()).await.unwrap();

        let repo = PostRepository::new(db.clone());
        assert_eq!(repo.clear_category(db.as_ref(), "c1").await.unwrap(), 1);
        assert!(repo.find_by_id("p1").await.unwrap().unwrap().category_id.is_none());
    }

    #[tokio::test]
    async fn test_slug_exists_excludes_self() {
        let db = Arc::new(setup_test_db().await.unwrap());
        insert_user(&db, "u1", "alice", false).await;
        insert_post(&db, "p1", "u1", "One", "one").await;

        let repo = PostRepository::new(db.clone());
        assert!(repo.slug_exists(db.as_ref(), "ONE", None).await.unwrap());
        assert!(!repo.slug_exists(db.as_ref(), "one", Some("p1")).await.unwrap());
    }
}
