//! Create post and post_tag tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Post::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Post::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Post::AuthorId).string_len(32).not_null())
                    .col(ColumnDef::new(Post::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Post::Slug).string_len(210).not_null())
                    .col(ColumnDef::new(Post::Body).text().not_null().default(""))
                    .col(
                        ColumnDef::new(Post::Status)
                            .string_len(16)
                            .not_null()
                            .default("DRAFT"),
                    )
                    .col(ColumnDef::new(Post::CategoryId).string_len(32))
                    .col(ColumnDef::new(Post::PublishedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Post::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Post::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_author_id")
                            .from(Post::Table, Post::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_category_id")
                            .from(Post::Table, Post::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_post_slug")
                    .table(Post::Table)
                    .col(Post::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Public listing: published posts, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_post_status_published_at")
                    .table(Post::Table)
                    .col(Post::Status)
                    .col(Post::PublishedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_post_author_id_created_at")
                    .table(Post::Table)
                    .col(Post::AuthorId)
                    .col(Post::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostTag::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PostTag::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PostTag::PostId).string_len(32).not_null())
                    .col(ColumnDef::new(PostTag::TagId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(PostTag::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_tag_post_id")
                            .from(PostTag::Table, PostTag::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_tag_tag_id")
                            .from(PostTag::Table, PostTag::TagId)
                            .to(Tag::Table, Tag::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_post_tag_tag_id_post_id")
                    .table(PostTag::Table)
                    .col(PostTag::TagId)
                    .col(PostTag::PostId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_post_tag_post_id")
                    .table(PostTag::Table)
                    .col(PostTag::PostId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostTag::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Post::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Post {
    Table,
    Id,
    AuthorId,
    Title,
    Slug,
    Body,
    Status,
    CategoryId,
    PublishedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum PostTag {
    Table,
    Id,
    PostId,
    TagId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Category {
    Table,
    Id,
}

#[derive(Iden)]
enum Tag {
    Table,
    Id,
}
