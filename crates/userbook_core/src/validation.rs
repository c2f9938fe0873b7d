//! Field-level validation for user and book records.
//!
//! # Responsibility
//! - Decide whether a record may be persisted.
//! - Provide the named filter used to drop invalid book entries.
//!
//! # Invariants
//! - All functions are pure; none of them touch storage.
//! - Invalid books are dropped silently, never reported as errors.

use crate::model::book::Book;
use crate::model::user::User;
use log::debug;

const MIN_AGE_EXCLUSIVE: i32 = 0;
const MAX_AGE_EXCLUSIVE: i32 = 120;

/// Returns whether `user` has a non-blank name and title and an age in `1..=119`.
pub fn is_valid_user(user: &User) -> bool {
    is_present(&user.full_name)
        && is_present(&user.title)
        && user.age > MIN_AGE_EXCLUSIVE
        && user.age < MAX_AGE_EXCLUSIVE
}

/// Returns whether `book` has a non-blank title and author and a positive page count.
pub fn is_valid_book(book: &Book) -> bool {
    is_present(&book.title) && is_present(&book.author) && book.page_count > 0
}

/// Keeps books that pass [`is_valid_book`], preserving input order.
///
/// Rejected entries are not reported to the caller; only their count is
/// logged.
pub fn keep_only_valid(books: impl IntoIterator<Item = Book>) -> Vec<Book> {
    let mut dropped = 0usize;
    let valid = books
        .into_iter()
        .filter(|book| {
            let keep = is_valid_book(book);
            if !keep {
                dropped += 1;
            }
            keep
        })
        .collect::<Vec<_>>();

    if dropped > 0 {
        debug!(
            "event=books_filtered module=validation status=ok kept={} dropped={dropped}",
            valid.len()
        );
    }
    valid
}

fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::{is_valid_book, is_valid_user, keep_only_valid};
    use crate::model::book::Book;
    use crate::model::user::User;

    #[test]
    fn user_age_bounds_are_exclusive() {
        assert!(!is_valid_user(&User::new("A B", "reader", 0)));
        assert!(is_valid_user(&User::new("A B", "reader", 1)));
        assert!(is_valid_user(&User::new("A B", "reader", 119)));
        assert!(!is_valid_user(&User::new("A B", "reader", 120)));
        assert!(!is_valid_user(&User::new("A B", "reader", -5)));
    }

    #[test]
    fn user_with_blank_text_fields_is_rejected() {
        assert!(!is_valid_user(&User::new("", "reader", 30)));
        assert!(!is_valid_user(&User::new("A B", "  \t", 30)));
    }

    #[test]
    fn book_requires_title_author_and_positive_pages() {
        assert!(is_valid_book(&Book::new("T1", "Au", 1)));
        assert!(!is_valid_book(&Book::new(" ", "Au", 10)));
        assert!(!is_valid_book(&Book::new("T1", "", 10)));
        assert!(!is_valid_book(&Book::new("T1", "Au", 0)));
        assert!(!is_valid_book(&Book::new("T1", "Au", -3)));
    }

    #[test]
    fn keep_only_valid_drops_invalid_entries_and_preserves_order() {
        let books = vec![
            Book::new("first", "Au", 10),
            Book::new("", "Au", 50),
            Book::new("second", "Au", 20),
            Book::new("third", "Au", 0),
            Book::new("fourth", "Au", 40),
        ];

        let titles = keep_only_valid(books)
            .into_iter()
            .map(|book| book.title)
            .collect::<Vec<_>>();
        assert_eq!(titles, vec!["first", "second", "fourth"]);
    }

    #[test]
    fn keep_only_valid_on_empty_input_is_empty() {
        assert!(keep_only_valid(Vec::new()).is_empty());
    }
}
