//! Cross-reference report over a loaded catalog.
//!
//! Loading never rejects a members file whose lists disagree with the books
//! file. This module only describes such disagreements so the caller can warn
//! about them; it never repairs anything.

use std::collections::BTreeMap;
use std::fmt;

use crate::models::{BookId, MemberId};

use super::store::CatalogStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    /// A member lists a book id that has no record.
    DanglingLoan { member: MemberId, book: BookId },
    /// A book is flagged borrowed but nobody holds it.
    UnheldBorrowedBook { book: BookId },
    /// A member holds a book whose flag says it is on the shelf.
    UnflaggedLoan { member: MemberId, book: BookId },
    /// More than one member lists the same book.
    SharedLoan { book: BookId, members: Vec<MemberId> },
    /// A member lists the same book more than once.
    DuplicateLoan { member: MemberId, book: BookId },
}

impl Inconsistency {
    fn sort_key(&self) -> (BookId, MemberId) {
        match self {
            Inconsistency::DanglingLoan { member, book }
            | Inconsistency::UnflaggedLoan { member, book }
            | Inconsistency::DuplicateLoan { member, book } => (*book, *member),
            Inconsistency::UnheldBorrowedBook { book } => (*book, 0),
            Inconsistency::SharedLoan { book, members } => {
                (*book, members.first().copied().unwrap_or(0))
            }
        }
    }
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inconsistency::DanglingLoan { member, book } => {
                write!(f, "member {member} holds unknown book {book}")
            }
            Inconsistency::UnheldBorrowedBook { book } => {
                write!(f, "book {book} is marked borrowed but no member holds it")
            }
            Inconsistency::UnflaggedLoan { member, book } => {
                write!(f, "member {member} holds book {book}, which is not marked borrowed")
            }
            Inconsistency::SharedLoan { book, members } => {
                let ids: Vec<String> = members.iter().map(|id| id.to_string()).collect();
                write!(f, "book {book} is held by members {}", ids.join(", "))
            }
            Inconsistency::DuplicateLoan { member, book } => {
                write!(f, "member {member} lists book {book} more than once")
            }
        }
    }
}

/// Collect every disagreement between member lists and book flags, ordered by
/// book id and then member id.
pub fn audit(store: &CatalogStore) -> Vec<Inconsistency> {
    let mut findings = Vec::new();
    let mut holders: BTreeMap<BookId, Vec<MemberId>> = BTreeMap::new();

    for member in store.members() {
        let mut seen: Vec<BookId> = Vec::with_capacity(member.borrowed_books.len());
        for &book_id in &member.borrowed_books {
            if seen.contains(&book_id) {
                findings.push(Inconsistency::DuplicateLoan {
                    member: member.id,
                    book: book_id,
                });
                continue;
            }
            seen.push(book_id);

            match store.book(book_id) {
                None => findings.push(Inconsistency::DanglingLoan {
                    member: member.id,
                    book: book_id,
                }),
                Some(book) => {
                    if !book.borrowed {
                        findings.push(Inconsistency::UnflaggedLoan {
                            member: member.id,
                            book: book_id,
                        });
                    }
                    holders.entry(book_id).or_default().push(member.id);
                }
            }
        }
    }

    for book in store.books() {
        match holders.get(&book.id) {
            Some(members) if members.len() > 1 => findings.push(Inconsistency::SharedLoan {
                book: book.id,
                members: members.clone(),
            }),
            None if book.borrowed => {
                findings.push(Inconsistency::UnheldBorrowedBook { book: book.id })
            }
            _ => {}
        }
    }

    findings.sort_by_key(Inconsistency::sort_key);
    findings
}
