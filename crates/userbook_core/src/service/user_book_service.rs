//! User + books orchestration service.
//!
//! # Responsibility
//! - Compose validation and storage calls into the create/update/get/delete
//!   workflows for a user and the books it owns.
//! - Run every workflow inside exactly one storage unit of work.
//!
//! # Invariants
//! - Any storage error aborts the workflow and rolls back all of its writes.
//! - Invalid book entries are dropped via `keep_only_valid`, never reported.
//! - Update replaces the owned book set wholesale (delete all, insert all).
//! - Delete cascades from the user to its books here, not in storage.
//! - Log events carry ids and counts only, never user-provided text.

use crate::dto::{UserBookRequest, UserBookResponse};
use crate::model::book::{Book, BookId};
use crate::model::user::{User, UserId};
use crate::repo::book_repo::BookRepository;
use crate::repo::storage::{Storage, UnitOfWork};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use crate::validation::{is_valid_user, keep_only_valid};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, UserBookServiceError>;

/// Request-level validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Request carries no user payload.
    UserMissing,
    /// Workflow requires a user id but none was given.
    UserIdMissing,
    /// User payload fails field validation.
    InvalidUser,
    /// Request carries no book list (an empty list is fine).
    BookListMissing,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::UserMissing => "user cannot be null",
            Self::UserIdMissing => "user id cannot be null",
            Self::InvalidUser => "invalid user data",
            Self::BookListMissing => "book list cannot be null",
        };
        f.write_str(message)
    }
}

impl Error for ValidationError {}

/// Errors surfaced by [`UserBookService`] workflows.
#[derive(Debug)]
pub enum UserBookServiceError {
    /// Request was rejected before any data was changed.
    Validation(ValidationError),
    /// Lookup targeted a user id that is not stored.
    NotFound(UserId),
    /// Storage failure; the unit of work was rolled back.
    Repo(RepoError),
}

impl UserBookServiceError {
    /// Stable machine-readable code used in logs and boundary responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::NotFound(_) => "not_found",
            Self::Repo(_) => "storage_failed",
        }
    }
}

impl Display for UserBookServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "user not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UserBookServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ValidationError> for UserBookServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for UserBookServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Facade running user+books workflows against one storage engine.
pub struct UserBookService<S: Storage> {
    storage: S,
}

impl<S: Storage> UserBookService<S> {
    /// Creates a service using the provided storage adapter.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Read access to the underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutable access to the underlying storage, e.g. to open ad-hoc reads.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Returns the underlying storage, consuming the service.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Creates a user and all valid books from `request`.
    ///
    /// # Contract
    /// - Absent user, invalid user or absent book list fails with
    ///   [`UserBookServiceError::Validation`] and writes nothing.
    /// - Absent and invalid book entries are skipped; the returned ids keep
    ///   the input order of the remaining entries.
    pub fn create_user_with_books(
        &mut self,
        request: &UserBookRequest,
    ) -> ServiceResult<UserBookResponse> {
        let op = OperationLog::start("user_book_create", None);
        op.finish(create_with_books(&mut self.storage, request))
    }

    /// Upserts the user with `user_id` and replaces its whole book set.
    ///
    /// # Contract
    /// - An unknown `user_id` creates a new user with a fresh id.
    /// - Returned book ids are re-read from storage after replacement.
    pub fn update_user_with_books(
        &mut self,
        request: &UserBookRequest,
        user_id: Option<UserId>,
    ) -> ServiceResult<UserBookResponse> {
        let op = OperationLog::start("user_book_update", user_id);
        op.finish(update_with_books(&mut self.storage, request, user_id))
    }

    /// Loads the user id and the ids of all books it owns.
    pub fn get_user_with_books(&mut self, user_id: Option<UserId>) -> ServiceResult<UserBookResponse> {
        let op = OperationLog::start("user_book_get", user_id);
        op.finish(get_with_books(&mut self.storage, user_id))
    }

    /// Deletes the user and every book it owns.
    ///
    /// # Contract
    /// - `None` is a no-op that never touches storage.
    /// - Missing users and books are not errors, so repeated calls succeed.
    pub fn delete_user_with_books(&mut self, user_id: Option<UserId>) -> ServiceResult<()> {
        let Some(user_id) = user_id else {
            debug!("event=user_book_delete module=service status=skipped reason=no_user_id");
            return Ok(());
        };
        let op = OperationLog::start("user_book_delete", Some(user_id));
        op.finish(delete_with_books(&mut self.storage, user_id))
    }
}

fn create_with_books<S: Storage>(
    storage: &mut S,
    request: &UserBookRequest,
) -> ServiceResult<UserBookResponse> {
    let user = map_valid_user(request)?;
    let books = request.map_books().ok_or(ValidationError::BookListMissing)?;

    let uow = storage.begin()?;
    let created = uow.create_user(&user)?;
    let user_id = assigned_user_id(&created)?;
    let book_ids = create_books(&uow, user_id, books)?;
    uow.commit()?;

    Ok(UserBookResponse { user_id, book_ids })
}

fn update_with_books<S: Storage>(
    storage: &mut S,
    request: &UserBookRequest,
    user_id: Option<UserId>,
) -> ServiceResult<UserBookResponse> {
    let user_id = user_id.ok_or(ValidationError::UserIdMissing)?;
    let user = map_valid_user(request)?.with_id(user_id);
    let books = request.map_books().ok_or(ValidationError::BookListMissing)?;

    let uow = storage.begin()?;
    let updated = uow.update_user(&user)?;
    let owner_id = assigned_user_id(&updated)?;
    if owner_id != user_id {
        debug!(
            "event=user_upsert module=service status=ok requested_id={user_id} assigned_id={owner_id}"
        );
    }

    delete_books(&uow, &uow.list_book_ids_by_owner(owner_id)?)?;
    create_books(&uow, owner_id, books)?;
    let book_ids = uow.list_book_ids_by_owner(owner_id)?;
    uow.commit()?;

    Ok(UserBookResponse {
        user_id: owner_id,
        book_ids,
    })
}

fn get_with_books<S: Storage>(
    storage: &mut S,
    user_id: Option<UserId>,
) -> ServiceResult<UserBookResponse> {
    let user_id = user_id.ok_or(ValidationError::UserIdMissing)?;

    let uow = storage.begin()?;
    let user = uow
        .get_user(user_id)?
        .ok_or(UserBookServiceError::NotFound(user_id))?;
    let user_id = assigned_user_id(&user)?;
    let book_ids = uow.list_book_ids_by_owner(user_id)?;
    uow.commit()?;

    Ok(UserBookResponse { user_id, book_ids })
}

fn delete_with_books<S: Storage>(storage: &mut S, user_id: UserId) -> ServiceResult<()> {
    let uow = storage.begin()?;
    // Collected before the user row goes away; the cascade uses this list.
    let book_ids = uow.list_book_ids_by_owner(user_id)?;
    uow.delete_user(user_id)?;
    delete_books(&uow, &book_ids)?;
    uow.commit()?;
    Ok(())
}

fn map_valid_user(request: &UserBookRequest) -> Result<User, ValidationError> {
    let user = request.map_user().ok_or(ValidationError::UserMissing)?;
    if !is_valid_user(&user) {
        return Err(ValidationError::InvalidUser);
    }
    Ok(user)
}

fn create_books<R: BookRepository>(
    repo: &R,
    owner_id: UserId,
    books: Vec<Book>,
) -> ServiceResult<Vec<BookId>> {
    keep_only_valid(books)
        .into_iter()
        .map(|book| {
            let created = repo.create_book(&book.owned_by(owner_id))?;
            created.id.ok_or_else(|| {
                RepoError::InvalidData("storage returned a book without id".to_string()).into()
            })
        })
        .collect()
}

fn delete_books<R: BookRepository>(repo: &R, book_ids: &[BookId]) -> ServiceResult<()> {
    for book_id in book_ids {
        repo.delete_book(*book_id)?;
    }
    Ok(())
}

fn assigned_user_id(user: &User) -> Result<UserId, RepoError> {
    user.id
        .ok_or_else(|| RepoError::InvalidData("storage returned a user without id".to_string()))
}

/// Metadata-only start/finish events for one workflow invocation.
struct OperationLog {
    event: &'static str,
    op_id: Uuid,
    started_at: Instant,
}

impl OperationLog {
    fn start(event: &'static str, user_id: Option<UserId>) -> Self {
        let op_id = Uuid::new_v4();
        match user_id {
            Some(user_id) => {
                info!("event={event} module=service status=start op_id={op_id} user_id={user_id}")
            }
            None => info!("event={event} module=service status=start op_id={op_id}"),
        }
        Self {
            event,
            op_id,
            started_at: Instant::now(),
        }
    }

    fn finish<T: Outcome>(self, result: ServiceResult<T>) -> ServiceResult<T> {
        let duration_ms = self.started_at.elapsed().as_millis();
        match &result {
            Ok(value) => info!(
                "event={} module=service status=ok op_id={} duration_ms={duration_ms}{}",
                self.event,
                self.op_id,
                value.summary()
            ),
            Err(err @ UserBookServiceError::Repo(_)) => error!(
                "event={} module=service status=error op_id={} duration_ms={duration_ms} error_code={} error={err}",
                self.event,
                self.op_id,
                err.code()
            ),
            Err(err) => warn!(
                "event={} module=service status=rejected op_id={} duration_ms={duration_ms} error_code={} error={err}",
                self.event,
                self.op_id,
                err.code()
            ),
        }
        result
    }
}

trait Outcome {
    fn summary(&self) -> String;
}

impl Outcome for UserBookResponse {
    fn summary(&self) -> String {
        format!(" user_id={} book_count={}", self.user_id, self.book_ids.len())
    }
}

impl Outcome for () {
    fn summary(&self) -> String {
        String::new()
    }
}
