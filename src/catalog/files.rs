use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{CatalogError, Result};

use super::store::CatalogStore;

/// Default books file name, resolved against the data directory.
pub const BOOKS_FILE_NAME: &str = "books.csv";
/// Default members file name, resolved against the data directory.
pub const MEMBERS_FILE_NAME: &str = "members.csv";

/// The pair of flat files a catalog is saved to and loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFiles {
    pub books: PathBuf,
    pub members: PathBuf,
}

impl CatalogFiles {
    pub fn new(books: impl Into<PathBuf>, members: impl Into<PathBuf>) -> Self {
        Self {
            books: books.into(),
            members: members.into(),
        }
    }

    /// `books.csv` and `members.csv` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(BOOKS_FILE_NAME), dir.join(MEMBERS_FILE_NAME))
    }

    /// Overwrite both files with the current catalog. Last save wins.
    pub fn save(&self, store: &CatalogStore) -> Result<()> {
        let (books, members) = store.serialize();
        write_file(&self.books, &books)?;
        write_file(&self.members, &members)
    }

    /// Replace the store's contents with what is on disk.
    ///
    /// Missing files count as empty. Both files are read before the store is
    /// touched, so an unreadable file leaves the current catalog in place.
    pub fn load(&self, store: &mut CatalogStore) -> Result<()> {
        let books = read_file(&self.books)?;
        let members = read_file(&self.members)?;
        store.deserialize(&books, &members)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_file(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(contents),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(source) => Err(CatalogError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_then_load_restores_catalog() {
        let temp = TempDir::new().unwrap();
        let files = CatalogFiles::in_dir(temp.path());

        let mut store = CatalogStore::new();
        let dune = store.add_book("Dune", "Herbert").unwrap();
        let alice = store.add_member("Alice").unwrap();
        store.borrow_book(alice, dune).unwrap();
        files.save(&store).unwrap();

        assert_eq!(
            fs::read_to_string(temp.path().join("books.csv")).unwrap(),
            "1000,Dune,Herbert,1\n"
        );

        let mut restored = CatalogStore::new();
        files.load(&mut restored).unwrap();
        assert_eq!(restored.list_books(), store.list_books());
        assert_eq!(restored.list_members(), store.list_members());
    }

    #[test]
    fn missing_files_load_as_empty() {
        let temp = TempDir::new().unwrap();
        let files = CatalogFiles::in_dir(temp.path());

        let mut store = CatalogStore::new();
        store.add_book("Dune", "Herbert").unwrap();
        files.load(&mut store).unwrap();

        assert!(store.is_empty());
        assert_eq!(store.add_book("Emma", "Austen").unwrap(), 1000);
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let temp = TempDir::new().unwrap();
        let files = CatalogFiles::in_dir(&temp.path().join("missing-dir"));

        let mut store = CatalogStore::new();
        store.add_book("Dune", "Herbert").unwrap();
        let err = files.save(&store).unwrap_err();
        assert!(matches!(err, CatalogError::Io { ref path, .. } if path == &files.books));
    }

    #[test]
    fn unreadable_file_keeps_current_state() {
        let temp = TempDir::new().unwrap();
        // A directory where the books file should be cannot be read as text.
        fs::create_dir(temp.path().join("books.csv")).unwrap();
        let files = CatalogFiles::in_dir(temp.path());

        let mut store = CatalogStore::new();
        store.add_member("Alice").unwrap();
        assert!(matches!(files.load(&mut store), Err(CatalogError::Io { .. })));
        assert_eq!(store.member_count(), 1);
    }
}
