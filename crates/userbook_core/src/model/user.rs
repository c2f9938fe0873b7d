//! User domain record.

use serde::{Deserialize, Serialize};

/// Storage-assigned user identifier.
pub type UserId = i64;

/// A person owning zero or more books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// `None` until the record has been persisted.
    pub id: Option<UserId>,
    pub full_name: String,
    pub title: String,
    /// Valid range is `1..=119`; see [`crate::validation::is_valid_user`].
    pub age: i32,
}

impl User {
    /// Creates an unpersisted user record.
    pub fn new(full_name: impl Into<String>, title: impl Into<String>, age: i32) -> Self {
        Self {
            id: None,
            full_name: full_name.into(),
            title: title.into(),
            age,
        }
    }

    /// Returns a copy of this record carrying the given identifier.
    pub fn with_id(mut self, id: UserId) -> Self {
        self.id = Some(id);
        self
    }
}
