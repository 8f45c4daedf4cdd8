//! Database repositories.

mod bookmark;
mod category;
mod comment;
mod comment_like;
mod post;
mod post_like;
mod post_tag;
mod profile;
mod tag;
mod user;

pub use bookmark::BookmarkRepository;
pub use category::CategoryRepository;
pub use comment::CommentRepository;
pub use comment_like::CommentLikeRepository;
pub use post::{PostQuery, PostRepository};
pub use post_like::PostLikeRepository;
pub use post_tag::PostTagRepository;
pub use profile::ProfileRepository;
pub use tag::TagRepository;
pub use user::UserRepository;
