use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::error::{CatalogError, RecordRef, Result};
use crate::models::{
    Book, BookId, Member, MemberId, FIRST_BOOK_ID, FIRST_MEMBER_ID, MAX_STORED_ID,
};

use super::codec::{decode_book, decode_member, encode_book, encode_member};

/// Owns every book and member and keeps the two sides of a loan in step: a
/// book is flagged borrowed exactly when one member lists its id.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    books: BTreeMap<BookId, Book>,
    members: BTreeMap<MemberId, Member>,
    next_book_id: BookId,
    next_member_id: MemberId,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    pub fn new() -> Self {
        Self {
            books: BTreeMap::new(),
            members: BTreeMap::new(),
            next_book_id: FIRST_BOOK_ID,
            next_member_id: FIRST_MEMBER_ID,
        }
    }

    /// Fails only once the book counter has passed [`MAX_STORED_ID`], which
    /// takes a loaded file whose ids already reach the top of the range.
    pub fn add_book(&mut self, title: &str, author: &str) -> Result<BookId> {
        let id = allocate(&mut self.next_book_id, "book")?;
        self.books.insert(id, Book::new(id, title, author));
        Ok(id)
    }

    pub fn add_member(&mut self, name: &str) -> Result<MemberId> {
        let id = allocate(&mut self.next_member_id, "member")?;
        self.members.insert(id, Member::new(id, name));
        Ok(id)
    }

    /// Hand `book_id` to `member_id`. Every check runs before either record
    /// is touched.
    pub fn borrow_book(&mut self, member_id: MemberId, book_id: BookId) -> Result<()> {
        let member = self
            .members
            .get_mut(&member_id)
            .ok_or(CatalogError::NotFound(RecordRef::Member(member_id)))?;
        let book = self
            .books
            .get_mut(&book_id)
            .ok_or(CatalogError::NotFound(RecordRef::Book(book_id)))?;

        if book.borrowed {
            return Err(CatalogError::AlreadyBorrowed(book_id));
        }

        book.borrowed = true;
        member.borrowed_books.push(book_id);
        Ok(())
    }

    /// Take `book_id` back from `member_id`, dropping only the first matching
    /// entry from the member's list.
    pub fn return_book(&mut self, member_id: MemberId, book_id: BookId) -> Result<()> {
        let member = self
            .members
            .get_mut(&member_id)
            .ok_or(CatalogError::NotFound(RecordRef::Member(member_id)))?;
        let book = self
            .books
            .get_mut(&book_id)
            .ok_or(CatalogError::NotFound(RecordRef::Book(book_id)))?;

        if !book.borrowed {
            return Err(CatalogError::NotBorrowed(book_id));
        }
        let position = member
            .borrowed_books
            .iter()
            .position(|held| *held == book_id)
            .ok_or(CatalogError::NotBorrowedByMember {
                member: member_id,
                book: book_id,
            })?;

        book.borrowed = false;
        member.borrowed_books.remove(position);
        Ok(())
    }

    /// Snapshot of every book, ordered by id.
    pub fn list_books(&self) -> Vec<Book> {
        self.books.values().cloned().collect()
    }

    /// Snapshot of every member, ordered by id.
    pub fn list_members(&self) -> Vec<Member> {
        self.members.values().cloned().collect()
    }

    pub fn book(&self, id: BookId) -> Option<&Book> {
        self.books.get(&id)
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.get(&id)
    }

    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty() && self.members.is_empty()
    }

    /// Id the next `add_book` call will return.
    pub fn next_book_id(&self) -> BookId {
        self.next_book_id
    }

    /// Id the next `add_member` call will return.
    pub fn next_member_id(&self) -> MemberId {
        self.next_member_id
    }

    pub(crate) fn books(&self) -> impl Iterator<Item = &Book> {
        self.books.values()
    }

    pub(crate) fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    /// Render the catalog as `(books, members)` text, one record per line.
    pub fn serialize(&self) -> (String, String) {
        let mut books = String::new();
        for book in self.books.values() {
            books.push_str(&encode_book(book));
            books.push('\n');
        }

        let mut members = String::new();
        for member in self.members.values() {
            members.push_str(&encode_member(member));
            members.push('\n');
        }

        (books, members)
    }

    /// Replace the whole catalog with the contents of the two blobs.
    ///
    /// Current state is discarded before the blobs are parsed. If any line is
    /// malformed the store is left empty with both counters back at their
    /// seeds. Member lists are not checked against the book records; see
    /// [`super::audit`] for that.
    pub fn deserialize(&mut self, books: &str, members: &str) -> Result<()> {
        self.clear();
        let loaded = self.load_records(books, members);
        if loaded.is_err() {
            self.clear();
        }
        loaded
    }

    fn load_records(&mut self, books: &str, members: &str) -> Result<()> {
        for (idx, line) in books.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let book = decode_book(idx + 1, line)?;
            // Decoded ids never exceed MAX_STORED_ID, so this cannot overflow.
            self.next_book_id = self.next_book_id.max(book.id + 1);
            // First row wins when an id repeats.
            if let Entry::Vacant(slot) = self.books.entry(book.id) {
                slot.insert(book);
            }
        }

        for (idx, line) in members.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let member = decode_member(idx + 1, line)?;
            self.next_member_id = self.next_member_id.max(member.id + 1);
            if let Entry::Vacant(slot) = self.members.entry(member.id) {
                slot.insert(member);
            }
        }

        Ok(())
    }

    fn clear(&mut self) {
        self.books.clear();
        self.members.clear();
        self.next_book_id = FIRST_BOOK_ID;
        self.next_member_id = FIRST_MEMBER_ID;
    }
}

/// Hand out `counter` and advance it. Ids above [`MAX_STORED_ID`] are never
/// issued, so every assigned id survives a save and load.
fn allocate(counter: &mut u32, kind: &'static str) -> Result<u32> {
    let id = *counter;
    if id > MAX_STORED_ID {
        return Err(CatalogError::IdsExhausted(kind));
    }
    *counter = id + 1;
    Ok(id)
}
