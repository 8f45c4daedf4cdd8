//! Common utilities and shared types for Quill.
//!
//! This crate provides foundational components used across all Quill crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Storage**: File storage backends for uploaded avatars
//!
//! # Example
//!
//! ```no_run
//! use quill_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {} for {}", id, config.server.url);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use storage::{LocalStorage, StorageBackend, UploadedFile, generate_storage_key};
