use userbook_core::db::migrations::latest_version;
use userbook_core::db::open_db_in_memory;
use userbook_core::{
    Book, BookRepository, RepoError, SqliteBookRepository, SqliteStorage, SqliteUserRepository,
    Storage, UnitOfWork, User, UserRepository,
};
use rusqlite::Connection;

#[test]
fn create_and_get_user_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let created = repo.create_user(&User::new("A B", "reader", 30)).unwrap();
    let id = created.id.unwrap();

    let loaded = repo.get_user(id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.full_name, "A B");
    assert_eq!(loaded.age, 30);
}

#[test]
fn create_user_ignores_supplied_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let created = repo
        .create_user(&User::new("A B", "reader", 30).with_id(500))
        .unwrap();
    assert_eq!(created.id, Some(1));
    assert!(repo.get_user(500).unwrap().is_none());
}

#[test]
fn update_existing_user_keeps_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let created = repo.create_user(&User::new("A B", "reader", 30)).unwrap();
    let mut changed = created.clone();
    changed.title = "writer".to_string();
    changed.age = 31;

    let updated = repo.update_user(&changed).unwrap();
    assert_eq!(updated.id, created.id);

    let loaded = repo.get_user(created.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded.title, "writer");
    assert_eq!(loaded.age, 31);
}

#[test]
fn update_unknown_user_inserts_with_fresh_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    repo.create_user(&User::new("first", "reader", 30)).unwrap();

    let upserted = repo
        .update_user(&User::new("ghost", "reader", 40).with_id(99))
        .unwrap();
    assert_eq!(upserted.id, Some(2));
    assert!(repo.get_user(99).unwrap().is_none());
}

#[test]
fn delete_user_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let id = repo
        .create_user(&User::new("A B", "reader", 30))
        .unwrap()
        .id
        .unwrap();
    repo.delete_user(id).unwrap();
    repo.delete_user(id).unwrap();
    repo.delete_user(12345).unwrap();

    assert!(repo.get_user(id).unwrap().is_none());
}

#[test]
fn books_are_listed_by_owner_in_creation_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let first = repo.create_book(&Book::new("T1", "Au", 10).owned_by(1)).unwrap();
    let other = repo.create_book(&Book::new("T2", "Au", 20).owned_by(2)).unwrap();
    let second = repo.create_book(&Book::new("T3", "Au", 30).owned_by(1)).unwrap();

    assert_eq!(
        repo.list_book_ids_by_owner(1).unwrap(),
        vec![first.id.unwrap(), second.id.unwrap()]
    );
    assert_eq!(repo.list_book_ids_by_owner(2).unwrap(), vec![other.id.unwrap()]);
    assert!(repo.list_book_ids_by_owner(3).unwrap().is_empty());
}

#[test]
fn book_owner_is_not_checked_against_users() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let created = repo
        .create_book(&Book::new("orphan", "Au", 10).owned_by(777))
        .unwrap();
    let loaded = repo.get_book(created.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded.owner_id, Some(777));
}

#[test]
fn book_without_owner_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let err = repo.create_book(&Book::new("T1", "Au", 10)).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn update_book_upserts_and_delete_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let mut book = repo.create_book(&Book::new("T1", "Au", 10).owned_by(1)).unwrap();
    book.page_count = 11;
    let updated = repo.update_book(&book).unwrap();
    assert_eq!(updated.id, book.id);
    assert_eq!(repo.get_book(book.id.unwrap()).unwrap().unwrap().page_count, 11);

    let mut unknown = Book::new("T2", "Au", 5).owned_by(1);
    unknown.id = Some(400);
    let inserted = repo.update_book(&unknown).unwrap();
    assert_ne!(inserted.id, Some(400));

    repo.delete_book(book.id.unwrap()).unwrap();
    repo.delete_book(book.id.unwrap()).unwrap();
    assert!(repo.get_book(book.id.unwrap()).unwrap().is_none());
}

#[test]
fn uncommitted_unit_of_work_rolls_back() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut storage = SqliteStorage::try_new(&mut conn).unwrap();
        let uow = storage.begin().unwrap();
        let user = uow.create_user(&User::new("A B", "reader", 30)).unwrap();
        uow.create_book(&Book::new("T1", "Au", 10).owned_by(user.id.unwrap()))
            .unwrap();
    }

    assert_eq!(count_rows(&conn, "users"), 0);
    assert_eq!(count_rows(&conn, "books"), 0);
}

#[test]
fn committed_unit_of_work_persists() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut storage = SqliteStorage::try_new(&mut conn).unwrap();
        let uow = storage.begin().unwrap();
        uow.create_user(&User::new("A B", "reader", 30)).unwrap();
        uow.commit().unwrap();
    }

    assert_eq!(count_rows(&conn, "users"), 1);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteUserRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_books_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            full_name TEXT NOT NULL,
            title TEXT NOT NULL,
            age INTEGER NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteBookRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("books"))
    ));
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
