//! Business logic services.

#![allow(missing_docs)]

pub mod category;
pub mod comment;
pub mod post;
pub mod profile;
pub mod reaction;
pub mod tag;
pub mod user;

pub use category::{CategoryPatch, CategoryService, CreateCategoryInput};
pub use comment::{CommentFilter, CommentPatch, CommentService, CreateCommentInput};
pub use post::{CreatePostInput, PostFilter, PostPatch, PostService};
pub use profile::{AvatarUpload, ProfilePatch, ProfileService};
pub use reaction::ReactionService;
pub use tag::{CreateTagInput, TagPatch, TagService};
pub use user::{RegisterInput, UserService};

use quill_db::entities::user as user_entity;

/// Authors may modify their own content; staff may modify anything.
pub(crate) fn can_modify(actor: &user_entity::Model, author_id: &str) -> bool {
    actor.is_staff || actor.id == author_id
}
