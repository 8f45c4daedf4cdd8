//! Database entities.

pub mod bookmark;
pub mod category;
pub mod comment;
pub mod comment_like;
pub mod post;
pub mod post_like;
pub mod post_tag;
pub mod profile;
pub mod tag;
pub mod user;

pub use bookmark::Entity as Bookmark;
pub use category::Entity as Category;
pub use comment::Entity as Comment;
pub use comment_like::Entity as CommentLike;
pub use post::Entity as Post;
pub use post_like::Entity as PostLike;
pub use post_tag::Entity as PostTag;
pub use profile::Entity as Profile;
pub use tag::Entity as Tag;
pub use user::Entity as User;
