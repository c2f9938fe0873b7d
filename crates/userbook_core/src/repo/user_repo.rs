//! User repository contract and SQLite implementation.
//!
//! # Invariants
//! - `create_user` ignores any caller-supplied id.
//! - `update_user` is an upsert: unknown or absent ids produce a fresh row.
//! - `delete_user` does not touch books.

use crate::model::user::{User, UserId};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Repository interface for user persistence.
pub trait UserRepository {
    /// Inserts a new user and returns it with the assigned id.
    fn create_user(&self, user: &User) -> RepoResult<User>;
    /// Updates the user with `user.id`, or inserts it when that id is unknown.
    fn update_user(&self, user: &User) -> RepoResult<User>;
    /// Loads one user by id.
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Deletes one user by id; missing ids are ignored.
    fn delete_user(&self, id: UserId) -> RepoResult<()>;
}

/// SQLite-backed user repository using raw parameterized statements.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
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

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<User> {
        self.conn.execute(
            "INSERT INTO users (full_name, title, age) VALUES (?1, ?2, ?3);",
            params![user.full_name.as_str(), user.title.as_str(), user.age],
        )?;

        Ok(user.clone().with_id(self.conn.last_insert_rowid()))
    }

    fn update_user(&self, user: &User) -> RepoResult<User> {
        let Some(id) = user.id else {
            return self.create_user(user);
        };

        let changed = self.conn.execute(
            "UPDATE users
             SET
                full_name = ?1,
                title = ?2,
                age = ?3
             WHERE id = ?4;",
            params![user.full_name.as_str(), user.title.as_str(), user.age, id],
        )?;

        if changed == 0 {
            return self.create_user(user);
        }
        Ok(user.clone())
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, full_name, title, age FROM users WHERE id = ?1;",
                [id],
                |row| Ok(parse_user_row(row)),
            )
            .optional()?;

        row.transpose()
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        self.conn.execute("DELETE FROM users WHERE id = ?1;", [id])?;
        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let id: UserId = row.get("id")?;
    let age: i64 = row.get("age")?;
    let age = i32::try_from(age)
        .map_err(|_| RepoError::InvalidData(format!("age `{age}` out of range in users.age")))?;

    Ok(User {
        id: Some(id),
        full_name: row.get("full_name")?,
        title: row.get("title")?,
        age,
    })
}
