//! Schema integration tests.
//!
//! Run the migrations against an in-memory `SQLite` database and check the
//! constraints the services rely on: foreign key actions and unique pairs.

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use quill_common::AppError;
use quill_db::entities::{
    Category, Post, PostLike, Profile, User, category, post, post_like, profile, user,
};
use quill_db::migrations::Migrator;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, Set,
};
use sea_orm_migration::MigratorTrait;

async fn connect() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

async fn seed_user(db: &DatabaseConnection, id: &str) -> user::Model {
    let now = Utc::now();
    let user = user::ActiveModel {
        id: Set(id.to_string()),
        username: Set(id.to_string()),
        username_lower: Set(id.to_lowercase()),
        email: Set(format!("{id}@example.com")),
        password: Set("!".to_string()),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        is_staff: Set(false),
        token: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .unwrap();

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
    .unwrap();

    user
}

async fn seed_post(db: &DatabaseConnection, id: &str, author_id: &str, category_id: Option<&str>) {
    let now = Utc::now();
    post::ActiveModel {
        id: Set(id.to_string()),
        author_id: Set(author_id.to_string()),
        title: Set(id.to_string()),
        slug: Set(id.to_string()),
        body: Set(String::new()),
        status: Set(post::PostStatus::Draft),
        category_id: Set(category_id.map(ToString::to_string)),
        published_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .unwrap();
}

fn like(id: &str, post_id: &str, user_id: &str) -> post_like::ActiveModel {
    post_like::ActiveModel {
        id: Set(id.to_string()),
        post_id: Set(post_id.to_string()),
        user_id: Set(user_id.to_string()),
        created_at: Set(Utc::now().into()),
    }
}

#[tokio::test]
async fn test_migrations_roll_back_and_reapply() {
    let db = connect().await;

    Migrator::down(&db, None).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    assert_eq!(User::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_deleting_user_cascades() {
    let db = connect().await;
    let alice = seed_user(&db, "alice").await;
    seed_user(&db, "bob").await;
    seed_post(&db, "p1", "alice", None).await;
    like("l1", "p1", "bob").insert(&db).await.unwrap();

    alice.delete(&db).await.unwrap();

    assert_eq!(Post::find().count(&db).await.unwrap(), 0);
    assert_eq!(PostLike::find().count(&db).await.unwrap(), 0);
    assert_eq!(Profile::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_deleting_category_nulls_posts() {
    let db = connect().await;
    seed_user(&db, "alice").await;
    let now = Utc::now();
    let news = category::ActiveModel {
        id: Set("c1".to_string()),
        name: Set("News".to_string()),
        slug: Set("news".to_string()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&db)
    .await
    .unwrap();
    seed_post(&db, "p1", "alice", Some("c1")).await;

    news.delete(&db).await.unwrap();

    assert_eq!(Category::find().count(&db).await.unwrap(), 0);
    let post = Post::find_by_id("p1").one(&db).await.unwrap().unwrap();
    assert!(post.category_id.is_none());
}

#[tokio::test]
async fn test_duplicate_like_is_a_conflict() {
    let db = connect().await;
    seed_user(&db, "alice").await;
    seed_post(&db, "p1", "alice", None).await;
    like("l1", "p1", "alice").insert(&db).await.unwrap();

    let err: AppError = like("l2", "p1", "alice").insert(&db).await.unwrap_err().into();

    assert!(matches!(err, AppError::Conflict(_)));
}
