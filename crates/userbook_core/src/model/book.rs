//! Book domain record.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

/// Storage-assigned book identifier.
pub type BookId = i64;

/// A book owned by one user.
///
/// Ownership is a plain reference to [`UserId`]; storage does not check that
/// the owner exists when the book is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// `None` until the record has been persisted.
    pub id: Option<BookId>,
    /// Required by storage on every write.
    pub owner_id: Option<UserId>,
    pub title: String,
    pub author: String,
    pub page_count: i64,
}

impl Book {
    /// Creates an unpersisted, unattached book record.
    pub fn new(title: impl Into<String>, author: impl Into<String>, page_count: i64) -> Self {
        Self {
            id: None,
            owner_id: None,
            title: title.into(),
            author: author.into(),
            page_count,
        }
    }

    /// Attaches this book to its owner.
    pub fn owned_by(mut self, owner_id: UserId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }
}
