//! Transactional storage capability and its SQLite adapter.
//!
//! # Responsibility
//! - Group user and book repositories behind one unit of work.
//! - Let services swap persistence engines without code changes.
//!
//! # Invariants
//! - Writes made through a unit of work are visible only after `commit`.
//! - Dropping a unit of work without `commit` rolls back all of its writes.

use crate::model::book::{Book, BookId};
use crate::model::user::{User, UserId};
use crate::repo::book_repo::{BookRepository, SqliteBookRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::{ensure_connection_ready, RepoResult};
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// One atomic unit of work over users and books.
pub trait UnitOfWork: UserRepository + BookRepository + Sized {
    /// Persists every write made through this unit of work.
    fn commit(self) -> RepoResult<()>;
}

/// Persistence engine able to open units of work.
pub trait Storage {
    type UnitOfWork<'tx>: UnitOfWork
    where
        Self: 'tx;

    /// Starts a new unit of work.
    fn begin(&mut self) -> RepoResult<Self::UnitOfWork<'_>>;
}

/// SQLite storage over a migrated connection.
pub struct SqliteStorage<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteStorage<'conn> {
    /// Creates storage from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl Storage for SqliteStorage<'_> {
    type UnitOfWork<'tx>
        = SqliteUnitOfWork<'tx>
    where
        Self: 'tx;

    fn begin(&mut self) -> RepoResult<SqliteUnitOfWork<'_>> {
        // Immediate: take the write lock up front so a workflow never fails
        // halfway on SQLITE_BUSY lock upgrade.
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(SqliteUnitOfWork { tx })
    }
}

/// Open SQLite transaction; rolls back on drop.
pub struct SqliteUnitOfWork<'conn> {
    tx: Transaction<'conn>,
}

impl SqliteUnitOfWork<'_> {
    fn users(&self) -> SqliteUserRepository<'_> {
        SqliteUserRepository::on_checked(&self.tx)
    }

    fn books(&self) -> SqliteBookRepository<'_> {
        SqliteBookRepository::on_checked(&self.tx)
    }
}

impl UserRepository for SqliteUnitOfWork<'_> {
    fn create_user(&self, user: &User) -> RepoResult<User> {
        self.users().create_user(user)
    }

    fn update_user(&self, user: &User) -> RepoResult<User> {
        self.users().update_user(user)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.users().get_user(id)
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        self.users().delete_user(id)
    }
}

impl BookRepository for SqliteUnitOfWork<'_> {
    fn create_book(&self, book: &Book) -> RepoResult<Book> {
        self.books().create_book(book)
    }

    fn update_book(&self, book: &Book) -> RepoResult<Book> {
        self.books().update_book(book)
    }

    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        self.books().get_book(id)
    }

    fn delete_book(&self, id: BookId) -> RepoResult<()> {
        self.books().delete_book(id)
    }

    fn list_book_ids_by_owner(&self, owner_id: UserId) -> RepoResult<Vec<BookId>> {
        self.books().list_book_ids_by_owner(owner_id)
    }
}

impl UnitOfWork for SqliteUnitOfWork<'_> {
    fn commit(self) -> RepoResult<()> {
        self.tx.commit()?;
        Ok(())
    }
}
