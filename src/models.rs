//! Domain records owned by the catalog store. These stay plain data holders:
//! the store is the only place that mutates them, and every other layer works
//! with cloned snapshots or ids.

use std::fmt;

/// Identifier assigned to a book by the store.
pub type BookId = u32;
/// Identifier assigned to a member by the store.
pub type MemberId = u32;

/// First id handed out for books. Books and members use different bases so an
/// id typed into a form is recognisable at a glance.
pub const FIRST_BOOK_ID: BookId = 1000;
/// First id handed out for members.
pub const FIRST_MEMBER_ID: MemberId = 5000;
/// Largest id accepted from a catalog file. Ids are signed 32-bit values in
/// the file format, which also leaves the counters room to keep counting
/// after the highest loaded id.
pub const MAX_STORED_ID: u32 = i32::MAX as u32;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single copy of a book in the catalog.
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    /// Set while some member holds the book. Mirrors the member side of the
    /// relationship; only borrow/return and load change it.
    pub borrowed: bool,
}

impl Book {
    pub(crate) fn new(id: BookId, title: &str, author: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            author: author.to_string(),
            borrowed: false,
        }
    }

    /// `Title - Author`, dropping the hyphen when the author is blank.
    pub fn display_title(&self) -> String {
        if self.author.trim().is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.author)
        }
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_title())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A library member and the books they currently hold.
pub struct Member {
    pub id: MemberId,
    pub name: String,
    /// Held book ids in the order they were borrowed. The list is not
    /// deduplicated; a hand-edited members file can repeat an id.
    pub borrowed_books: Vec<BookId>,
}

impl Member {
    pub(crate) fn new(id: MemberId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            borrowed_books: Vec::new(),
        }
    }

    pub fn holds(&self, book_id: BookId) -> bool {
        self.borrowed_books.contains(&book_id)
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_title_skips_blank_author() {
        let mut book = Book::new(FIRST_BOOK_ID, "Dune", "Herbert");
        assert_eq!(book.display_title(), "Dune - Herbert");

        book.author = "  ".to_string();
        assert_eq!(book.to_string(), "Dune");
    }

    #[test]
    fn new_records_start_empty() {
        let book = Book::new(1000, "Dune", "Herbert");
        assert!(!book.borrowed);

        let member = Member::new(5000, "Alice");
        assert!(member.borrowed_books.is_empty());
        assert!(!member.holds(1000));
    }
}
