//! Book repository contract and SQLite implementation.
//!
//! # Invariants
//! - Every write requires `owner_id`; the owner row itself is not checked.
//! - `list_book_ids_by_owner` returns ids in ascending (creation) order.

use crate::model::book::{Book, BookId};
use crate::model::user::UserId;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Repository interface for book persistence.
pub trait BookRepository {
    /// Inserts a new book and returns it with the assigned id.
    fn create_book(&self, book: &Book) -> RepoResult<Book>;
    /// Updates the book with `book.id`, or inserts it when that id is unknown.
    fn update_book(&self, book: &Book) -> RepoResult<Book>;
    /// Loads one book by id.
    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>>;
    /// Deletes one book by id; missing ids are ignored.
    fn delete_book(&self, id: BookId) -> RepoResult<()>;
    /// Lists ids of all books owned by `owner_id`, possibly empty.
    fn list_book_ids_by_owner(&self, owner_id: UserId) -> RepoResult<Vec<BookId>>;
}

/// SQLite-backed book repository using raw parameterized statements.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Skips schema checks; callers must have verified the connection.
    pub(crate) fn on_checked(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn create_book(&self, book: &Book) -> RepoResult<Book> {
        let owner_id = require_owner(book)?;
        self.conn.execute(
            "INSERT INTO books (owner_id, title, author, page_count)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                owner_id,
                book.title.as_str(),
                book.author.as_str(),
                book.page_count,
            ],
        )?;

        let mut created = book.clone();
        created.id = Some(self.conn.last_insert_rowid());
        Ok(created)
    }

    fn update_book(&self, book: &Book) -> RepoResult<Book> {
        let owner_id = require_owner(book)?;
        let Some(id) = book.id else {
            return self.create_book(book);
        };

        let changed = self.conn.execute(
            "UPDATE books
             SET
                owner_id = ?1,
                title = ?2,
                author = ?3,
                page_count = ?4
             WHERE id = ?5;",
            params![
                owner_id,
                book.title.as_str(),
                book.author.as_str(),
                book.page_count,
                id,
            ],
        )?;

        if changed == 0 {
            return self.create_book(book);
        }
        Ok(book.clone())
    }

    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        let book = self
            .conn
            .query_row(
                "SELECT id, owner_id, title, author, page_count FROM books WHERE id = ?1;",
                [id],
                parse_book_row,
            )
            .optional()?;
        Ok(book)
    }

    fn delete_book(&self, id: BookId) -> RepoResult<()> {
        self.conn.execute("DELETE FROM books WHERE id = ?1;", [id])?;
        Ok(())
    }

    fn list_book_ids_by_owner(&self, owner_id: UserId) -> RepoResult<Vec<BookId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM books WHERE owner_id = ?1 ORDER BY id ASC;")?;
        let ids = stmt
            .query_map([owner_id], |row| row.get::<_, BookId>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }
}

pub(crate) fn require_owner(book: &Book) -> RepoResult<UserId> {
    book.owner_id
        .ok_or_else(|| RepoError::InvalidData("book owner id is required".to_string()))
}

fn parse_book_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: Some(row.get("id")?),
        owner_id: Some(row.get("owner_id")?),
        title: row.get("title")?,
        author: row.get("author")?,
        page_count: row.get("page_count")?,
    })
}
