//! Create post_like, comment_like and bookmark tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PostLike::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PostLike::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(PostLike::PostId).string_len(32).not_null())
                    .col(ColumnDef::new(PostLike::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(PostLike::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_like_post_id")
                            .from(PostLike::Table, PostLike::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_like_user_id")
                            .from(PostLike::Table, PostLike::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_post_like_post_id_user_id")
                    .table(PostLike::Table)
                    .col(PostLike::PostId)
                    .col(PostLike::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CommentLike::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CommentLike::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(CommentLike::CommentId).string_len(32).not_null())
                    .col(ColumnDef::new(CommentLike::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(CommentLike::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_like_comment_id")
                            .from(CommentLike::Table, CommentLike::CommentId)
                            .to(Comment::Table, Comment::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_like_user_id")
                            .from(CommentLike::Table, CommentLike::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comment_like_comment_id_user_id")
                    .table(CommentLike::Table)
                    .col(CommentLike::CommentId)
                    .col(CommentLike::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Bookmark::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Bookmark::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Bookmark::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Bookmark::PostId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Bookmark::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookmark_user_id")
                            .from(Bookmark::Table, Bookmark::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookmark_post_id")
                            .from(Bookmark::Table, Bookmark::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookmark_user_id_post_id")
                    .table(Bookmark::Table)
                    .col(Bookmark::UserId)
                    .col(Bookmark::PostId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bookmark::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CommentLike::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PostLike::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PostLike {
    Table,
    Id,
    PostId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum CommentLike {
    Table,
    Id,
    CommentId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum Bookmark {
    Table,
    Id,
    UserId,
    PostId,
    CreatedAt,
}

#[derive(Iden)]
enum Post {
    Table,
    Id,
}

#[derive(Iden)]
enum Comment {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
