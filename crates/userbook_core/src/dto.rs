//! Request/response shapes exchanged with boundary layers.
//!
//! # Responsibility
//! - Describe the JSON contract of user+books requests and responses.
//! - Map request payloads onto unpersisted domain records.
//!
//! # Invariants
//! - `UserBookRequest::books == None` (absent list) is distinct from an empty list.
//! - `UserBookResponse::book_ids` is never absent; it serializes as `[]` when empty.
//! - Missing or `null` text fields map to empty strings and missing or `null`
//!   numbers to `0`, so validation rejects them instead of deserialization.

use crate::model::book::{Book, BookId};
use crate::model::user::{User, UserId};
use serde::{Deserialize, Deserializer, Serialize};

/// User portion of a [`UserBookRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub age: i32,
}

/// One book entry of a [`UserBookRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(deserialize_with = "null_as_default")]
    pub page_count: i64,
}

/// Combined user + books write request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBookRequest {
    #[serde(default)]
    pub user: Option<UserRequest>,
    /// Individual `null` entries are skipped by the workflows.
    #[serde(default)]
    pub books: Option<Vec<Option<BookRequest>>>,
}

/// Result of every user+books workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBookResponse {
    pub user_id: UserId,
    /// Creation order for creates, storage fetch order otherwise.
    pub book_ids: Vec<BookId>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl UserRequest {
    /// Convenience constructor used by callers building requests in code.
    pub fn new(full_name: impl Into<String>, title: impl Into<String>, age: i32) -> Self {
        Self {
            full_name: full_name.into(),
            title: title.into(),
            age,
        }
    }

    /// Maps this payload onto an unpersisted [`User`].
    pub fn to_user(&self) -> User {
        User::new(self.full_name.as_str(), self.title.as_str(), self.age)
    }
}

impl BookRequest {
    pub fn new(title: impl Into<String>, author: impl Into<String>, page_count: i64) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            page_count,
        }
    }

    /// Maps this payload onto an unpersisted, unattached [`Book`].
    pub fn to_book(&self) -> Book {
        Book::new(self.title.as_str(), self.author.as_str(), self.page_count)
    }
}

impl UserBookRequest {
    /// Creates a request from a user payload and a book list.
    pub fn new(user: UserRequest, books: Vec<BookRequest>) -> Self {
        Self {
            user: Some(user),
            books: Some(books.into_iter().map(Some).collect()),
        }
    }

    /// Maps the user payload, or `None` when the request carries no user.
    pub fn map_user(&self) -> Option<User> {
        self.user.as_ref().map(UserRequest::to_user)
    }

    /// Maps every present book entry in input order.
    ///
    /// Returns `None` when the request has no book list at all.
    pub fn map_books(&self) -> Option<Vec<Book>> {
        self.books
            .as_ref()
            .map(|entries| entries.iter().flatten().map(BookRequest::to_book).collect())
    }
}
