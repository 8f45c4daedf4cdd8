//! Test utilities for database operations.
//!
//! Tests run against an in-memory `SQLite` database with all migrations
//! applied. The pool is limited to a single connection so every handle sees
//! the same in-memory database.

#![allow(clippy::expect_used, missing_docs)]

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, DbErr, Set};
use sea_orm_migration::MigratorTrait;
use tracing::debug;

use crate::entities::{category, comment, post, profile, tag, user};
use crate::migrations::Migrator;

/// Connect to a fresh in-memory database and run migrations.
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opt).await?;
    Migrator::up(&db, None).await?;

    debug!("Created in-memory test database");
    Ok(db)
}

/// Insert a user (with an empty profile).
///
/// The email is `{username}@example.com` lowercased and the token is
/// `token-{id}`. The password column holds a placeholder, not a real hash.
pub async fn insert_user(
    db: &DatabaseConnection,
    id: &str,
    username: &str,
    is_staff: bool,
) -> user::Model {
    let now = Utc::now();
    let model = user::ActiveModel {
        id: Set(id.to_string()),
        username: Set(username.to_string()),
        username_lower: Set(username.to_lowercase()),
        email: Set(format!("{}@example.com", username.to_lowercase())),
        password: Set("!".to_string()),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        is_staff: Set(is_staff),
        token: Set(Some(format!("token-{id}"))),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .expect("insert user");

    profile::ActiveModel {
        user_id: Set(id.to_string()),
        display_name: Set(String::new()),
        bio: Set(String::new()),
        avatar: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .expect("insert profile");

    model
}

pub async fn insert_category(
    db: &DatabaseConnection,
    id: &str,
    name: &str,
    slug: &str,
) -> category::Model {
    let now = Utc::now();
    category::ActiveModel {
        id: Set(id.to_string()),
        name: Set(name.to_string()),
        slug: Set(slug.to_string()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .expect("insert category")
}

pub async fn insert_tag(db: &DatabaseConnection, id: &str, name: &str, slug: &str) -> tag::Model {
    let now = Utc::now();
    tag::ActiveModel {
        id: Set(id.to_string()),
        name: Set(name.to_string()),
        slug: Set(slug.to_string()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .expect("insert tag")
}

/// Insert a draft post.
pub async fn insert_post(
    db: &DatabaseConnection,
    id: &str,
    author_id: &str,
    title: &str,
    slug: &str,
) -> post::Model {
    let now = Utc::now();
    post::ActiveModel {
        id: Set(id.to_string()),
        author_id: Set(author_id.to_string()),
        title: Set(title.to_string()),
        slug: Set(slug.to_string()),
        body: Set(String::new()),
        status: Set(post::PostStatus::Draft),
        category_id: Set(None),
        published_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .expect("insert post")
}

/// Insert a visible comment.
pub async fn insert_comment(
    db: &DatabaseConnection,
    id: &str,
    post_id: &str,
    author_id: &str,
    parent_id: Option<&str>,
) -> comment::Model {
    let now = Utc::now();
    comment::ActiveModel {
        id: Set(id.to_string()),
        post_id: Set(post_id.to_string()),
        author_id: Set(author_id.to_string()),
        parent_id: Set(parent_id.map(ToString::to_string)),
        body: Set(format!("comment {id}")),
        status: Set(comment::CommentStatus::Visible),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .expect("insert comment")
}
