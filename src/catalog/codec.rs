//! Line codec for the two flat files.
//!
//! Books: `id,title,author,flag` where the flag is `1` or `0`.
//! Members: `id,name` followed by one field per held book id.
//!
//! Text fields are written verbatim. A comma inside a title, author or name
//! shifts the columns of that row, so the UI refuses commas on input.

use crate::error::{CatalogError, RecordFile, Result};
use crate::models::{Book, Member, MAX_STORED_ID};

const DELIMITER: char = ',';
const BOOK_FIELDS: usize = 4;
const MEMBER_MIN_FIELDS: usize = 2;

pub fn encode_book(book: &Book) -> String {
    format!(
        "{}{d}{}{d}{}{d}{}",
        book.id,
        book.title,
        book.author,
        if book.borrowed { "1" } else { "0" },
        d = DELIMITER
    )
}

pub fn decode_book(line_no: usize, line: &str) -> Result<Book> {
    let fields: Vec<&str> = line.split(DELIMITER).collect();
    if fields.len() != BOOK_FIELDS {
        return Err(CatalogError::parse(
            RecordFile::Books,
            line_no,
            format!("expected {BOOK_FIELDS} fields, found {}", fields.len()),
        ));
    }

    let id = parse_id(RecordFile::Books, line_no, "book id", fields[0])?;
    let borrowed = match fields[3].trim() {
        "1" => true,
        "0" => false,
        other => {
            return Err(CatalogError::parse(
                RecordFile::Books,
                line_no,
                format!("borrowed flag must be 0 or 1, found '{other}'"),
            ))
        }
    };

    Ok(Book {
        id,
        title: fields[1].to_string(),
        author: fields[2].to_string(),
        borrowed,
    })
}

pub fn encode_member(member: &Member) -> String {
    let mut line = format!("{}{}{}", member.id, DELIMITER, member.name);
    for book_id in &member.borrowed_books {
        line.push(DELIMITER);
        line.push_str(&book_id.to_string());
    }
    line
}

pub fn decode_member(line_no: usize, line: &str) -> Result<Member> {
    let fields: Vec<&str> = line.split(DELIMITER).collect();
    if fields.len() < MEMBER_MIN_FIELDS {
        return Err(CatalogError::parse(
            RecordFile::Members,
            line_no,
            format!(
                "expected at least {MEMBER_MIN_FIELDS} fields, found {}",
                fields.len()
            ),
        ));
    }

    let id = parse_id(RecordFile::Members, line_no, "member id", fields[0])?;
    let borrowed_books = fields[2..]
        .iter()
        .map(|raw| parse_id(RecordFile::Members, line_no, "borrowed book id", raw))
        .collect::<Result<Vec<_>>>()?;

    Ok(Member {
        id,
        name: fields[1].to_string(),
        borrowed_books,
    })
}

/// Ids are positive and no larger than [`MAX_STORED_ID`].
fn parse_id(file: RecordFile, line_no: usize, what: &str, raw: &str) -> Result<u32> {
    let raw = raw.trim();
    let id = raw.parse::<u32>().map_err(|_| {
        CatalogError::parse(file, line_no, format!("{what} '{raw}' is not a valid id"))
    })?;
    if id == 0 || id > MAX_STORED_ID {
        return Err(CatalogError::parse(
            file,
            line_no,
            format!("{what} {id} is out of range"),
        ));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_line_layout() {
        let mut book = Book::new(1000, "Dune", "Herbert");
        assert_eq!(encode_book(&book), "1000,Dune,Herbert,0");
        book.borrowed = true;
        assert_eq!(encode_book(&book), "1000,Dune,Herbert,1");
    }

    #[test]
    fn decode_book_reads_flag() {
        let book = decode_book(1, "1002,Emma,Austen,1").unwrap();
        assert_eq!(book.id, 1002);
        assert_eq!(book.title, "Emma");
        assert_eq!(book.author, "Austen");
        assert!(book.borrowed);
    }

    #[test]
    fn decode_book_rejects_short_line() {
        let err = decode_book(7, "1000,Dune,Herbert").unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Parse {
                file: RecordFile::Books,
                line: 7,
                ..
            }
        ));
    }

    #[test]
    fn decode_book_rejects_embedded_comma() {
        // A title written with a comma ends up as five columns.
        assert!(decode_book(1, "1000,Dune, Part One,Herbert,0").is_err());
    }

    #[test]
    fn decode_book_rejects_bad_id_and_flag() {
        assert!(decode_book(1, "abc,Dune,Herbert,0").is_err());
        assert!(decode_book(1, "-4,Dune,Herbert,0").is_err());
        assert!(decode_book(1, "1000,Dune,Herbert,yes").is_err());
    }

    #[test]
    fn member_line_keeps_order() {
        let member = decode_member(1, "5000,Alice,1000,1002").unwrap();
        assert_eq!(member.id, 5000);
        assert_eq!(member.name, "Alice");
        assert_eq!(member.borrowed_books, vec![1000, 1002]);
        assert_eq!(encode_member(&member), "5000,Alice,1000,1002");
    }

    #[test]
    fn member_without_loans() {
        let member = decode_member(1, "5001,Bob").unwrap();
        assert!(member.borrowed_books.is_empty());
        assert_eq!(encode_member(&member), "5001,Bob");
    }

    #[test]
    fn decode_member_rejects_malformed_lines() {
        assert!(decode_member(1, "5000").is_err());
        assert!(decode_member(1, "5000,Alice,").is_err());
        assert!(decode_member(1, "5000,Alice,10x2").is_err());
    }

    #[test]
    fn ids_outside_stored_range_are_rejected() {
        let err = decode_book(2, "0,Dune,Herbert,0").unwrap_err();
        assert_eq!(err.to_string(), "books data, line 2: book id 0 is out of range");

        let err = decode_book(1, "4294967295,Dune,Herbert,0").unwrap_err();
        assert_eq!(
            err.to_string(),
            "books data, line 1: book id 4294967295 is out of range"
        );
        assert!(decode_member(1, "2147483648,Alice").is_err());
        assert!(decode_member(1, "5000,Alice,0").is_err());

        let book = decode_book(1, "2147483647,Dune,Herbert,0").unwrap();
        assert_eq!(book.id, MAX_STORED_ID);
    }

    #[test]
    fn numeric_fields_tolerate_whitespace() {
        let book = decode_book(1, " 1000 ,Dune,Herbert, 0").unwrap();
        assert_eq!(book.id, 1000);
        assert!(!book.borrowed);
    }
}
