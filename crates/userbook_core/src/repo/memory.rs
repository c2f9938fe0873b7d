//! Embedded in-memory table storage.
//!
//! # Responsibility
//! - Provide a process-local storage adapter with the same observable
//!   behavior as the SQLite adapter.
//!
//! # Invariants
//! - Ids start at 1 and grow monotonically per table.
//! - A unit of work snapshots the tables on its first write and `commit`
//!   swaps the snapshot in; read-only units of work never copy.
//! - A snapshot copies every table: the first write of a unit of work costs
//!   O(stored rows).

use crate::model::book::{Book, BookId};
use crate::model::user::{User, UserId};
use crate::repo::book_repo::{require_owner, BookRepository};
use crate::repo::storage::{Storage, UnitOfWork};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoResult;
use std::cell::RefCell;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    books: BTreeMap<BookId, Book>,
    last_user_id: UserId,
    last_book_id: BookId,
}

impl Tables {
    fn insert_user(&mut self, user: &User) -> User {
        self.last_user_id += 1;
        let created = user.clone().with_id(self.last_user_id);
        self.users.insert(self.last_user_id, created.clone());
        created
    }

    fn insert_book(&mut self, book: &Book) -> Book {
        self.last_book_id += 1;
        let mut created = book.clone();
        created.id = Some(self.last_book_id);
        self.books.insert(self.last_book_id, created.clone());
        created
    }
}

/// In-memory storage; every call outside a unit of work applies immediately.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    tables: RefCell<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub fn user_count(&self) -> usize {
        self.tables.borrow().users.len()
    }

    /// Number of stored books.
    pub fn book_count(&self) -> usize {
        self.tables.borrow().books.len()
    }
}

impl UserRepository for MemoryStorage {
    fn create_user(&self, user: &User) -> RepoResult<User> {
        Ok(self.tables.borrow_mut().insert_user(user))
    }

    fn update_user(&self, user: &User) -> RepoResult<User> {
        let mut tables = self.tables.borrow_mut();
        match user.id {
            Some(id) if tables.users.contains_key(&id) => {
                tables.users.insert(id, user.clone());
                Ok(user.clone())
            }
            _ => Ok(tables.insert_user(user)),
        }
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        Ok(self.tables.borrow().users.get(&id).cloned())
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        self.tables.borrow_mut().users.remove(&id);
        Ok(())
    }
}

impl BookRepository for MemoryStorage {
    fn create_book(&self, book: &Book) -> RepoResult<Book> {
        require_owner(book)?;
        Ok(self.tables.borrow_mut().insert_book(book))
    }

    fn update_book(&self, book: &Book) -> RepoResult<Book> {
        require_owner(book)?;
        let mut tables = self.tables.borrow_mut();
        match book.id {
            Some(id) if tables.books.contains_key(&id) => {
                tables.books.insert(id, book.clone());
                Ok(book.clone())
            }
            _ => Ok(tables.insert_book(book)),
        }
    }

    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        Ok(self.tables.borrow().books.get(&id).cloned())
    }

    fn delete_book(&self, id: BookId) -> RepoResult<()> {
        self.tables.borrow_mut().books.remove(&id);
        Ok(())
    }

    fn list_book_ids_by_owner(&self, owner_id: UserId) -> RepoResult<Vec<BookId>> {
        Ok(self
            .tables
            .borrow()
            .books
            .values()
            .filter(|book| book.owner_id == Some(owner_id))
            .filter_map(|book| book.id)
            .collect())
    }
}

impl Storage for MemoryStorage {
    type UnitOfWork<'tx>
        = MemoryUnitOfWork<'tx>
    where
        Self: 'tx;

    fn begin(&mut self) -> RepoResult<MemoryUnitOfWork<'_>> {
        Ok(MemoryUnitOfWork {
            target: self,
            staged: RefCell::new(None),
        })
    }
}

/// Copy-on-write unit of work over [`MemoryStorage`].
pub struct MemoryUnitOfWork<'store> {
    target: &'store mut MemoryStorage,
    // Snapshot of `target`, taken on the first write.
    staged: RefCell<Option<MemoryStorage>>,
}

impl MemoryUnitOfWork<'_> {
    fn read<T>(&self, op: impl FnOnce(&MemoryStorage) -> RepoResult<T>) -> RepoResult<T> {
        match self.staged.borrow().as_ref() {
            Some(staged) => op(staged),
            None => op(&*self.target),
        }
    }

    fn write<T>(&self, op: impl FnOnce(&MemoryStorage) -> RepoResult<T>) -> RepoResult<T> {
        let mut staged = self.staged.borrow_mut();
        op(staged.get_or_insert_with(|| self.target.clone()))
    }

    #[cfg(test)]
    fn has_snapshot(&self) -> bool {
        self.staged.borrow().is_some()
    }
}

impl UserRepository for MemoryUnitOfWork<'_> {
    fn create_user(&self, user: &User) -> RepoResult<User> {
        self.write(|tables| tables.create_user(user))
    }

    fn update_user(&self, user: &User) -> RepoResult<User> {
        self.write(|tables| tables.update_user(user))
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.read(|tables| tables.get_user(id))
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        self.write(|tables| tables.delete_user(id))
    }
}

impl BookRepository for MemoryUnitOfWork<'_> {
    fn create_book(&self, book: &Book) -> RepoResult<Book> {
        self.write(|tables| tables.create_book(book))
    }

    fn update_book(&self, book: &Book) -> RepoResult<Book> {
        self.write(|tables| tables.update_book(book))
    }

    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        self.read(|tables| tables.get_book(id))
    }

    fn delete_book(&self, id: BookId) -> RepoResult<()> {
        self.write(|tables| tables.delete_book(id))
    }

    fn list_book_ids_by_owner(&self, owner_id: UserId) -> RepoResult<Vec<BookId>> {
        self.read(|tables| tables.list_book_ids_by_owner(owner_id))
    }
}

impl UnitOfWork for MemoryUnitOfWork<'_> {
    fn commit(self) -> RepoResult<()> {
        let Self { target, staged } = self;
        if let Some(staged) = staged.into_inner() {
            *target = staged;
        }
        Ok(())
    }
}
