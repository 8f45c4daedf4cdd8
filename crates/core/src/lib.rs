//! Core business logic for Quill.
//!
//! Services validate input, enforce authorization and run multi-step writes
//! inside a single database transaction.

pub mod pagination;
pub mod services;
pub mod slug;
pub mod text;

pub use pagination::{Page, Pagination};
pub use services::*;
