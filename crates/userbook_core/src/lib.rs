//! Core domain logic for UserBook.
//! This crate is the single source of truth for user/book business invariants.

pub mod config;
pub mod db;
pub mod dto;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validation;

pub use config::{default_log_level, CoreConfig, LogSettings};
pub use dto::{BookRequest, UserBookRequest, UserBookResponse, UserRequest};
pub use logging::{init_logging, logging_status};
pub use model::book::{Book, BookId};
pub use model::user::{User, UserId};
pub use repo::book_repo::{BookRepository, SqliteBookRepository};
pub use repo::memory::{MemoryStorage, MemoryUnitOfWork};
pub use repo::storage::{SqliteStorage, SqliteUnitOfWork, Storage, UnitOfWork};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::user_book_service::{
    ServiceResult, UserBookService, UserBookServiceError, ValidationError,
};
pub use validation::{is_valid_book, is_valid_user, keep_only_valid};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
