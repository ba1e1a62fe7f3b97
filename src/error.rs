//! Error type shared by the catalog store, codec and file persistence.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::{BookId, MemberId};

/// Which kind of record an id was supposed to resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordRef {
    Book(BookId),
    Member(MemberId),
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordRef::Book(id) => write!(f, "Book {id}"),
            RecordRef::Member(id) => write!(f, "Member {id}"),
        }
    }
}

/// The two persisted blobs, used to point parse errors at the right file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFile {
    Books,
    Members,
}

impl fmt::Display for RecordFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordFile::Books => f.write_str("books"),
            RecordFile::Members => f.write_str("members"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0} not found.")]
    NotFound(RecordRef),

    #[error("Book {0} is already borrowed.")]
    AlreadyBorrowed(BookId),

    #[error("Book {0} was not borrowed.")]
    NotBorrowed(BookId),

    #[error("Member {member} did not borrow book {book}.")]
    NotBorrowedByMember { member: MemberId, book: BookId },

    #[error("No {0} ids left to assign.")]
    IdsExhausted(&'static str),

    #[error("{file} data, line {line}: {reason}")]
    Parse {
        file: RecordFile,
        line: usize,
        reason: String,
    },

    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CatalogError {
    pub(crate) fn parse(file: RecordFile, line: usize, reason: impl Into<String>) -> Self {
        CatalogError::Parse {
            file,
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_record() {
        let err = CatalogError::NotFound(RecordRef::Member(5001));
        assert_eq!(err.to_string(), "Member 5001 not found.");

        let err = CatalogError::NotBorrowedByMember {
            member: 5000,
            book: 1002,
        };
        assert_eq!(err.to_string(), "Member 5000 did not borrow book 1002.");
    }

    #[test]
    fn parse_error_points_at_file_and_line() {
        let err = CatalogError::parse(RecordFile::Books, 3, "expected 4 fields, found 2");
        assert_eq!(
            err.to_string(),
            "books data, line 3: expected 4 fields, found 2"
        );
    }
}
