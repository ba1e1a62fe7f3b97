//! In-memory library catalog with flat-file persistence and a terminal menu.
//!
//! `catalog` is the core: it owns books and members, keeps loans consistent
//! and reads/writes the two CSV-like files. `ui` is a thin front-end over it.
pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod ui;

/// The store and its persistence, used by `main.rs` and the integration tests.
pub use catalog::{audit, CatalogFiles, CatalogStore, Inconsistency};

pub use error::{CatalogError, RecordFile, RecordRef};

/// Record types handed out as snapshots by the store.
pub use models::{
    Book, BookId, Member, MemberId, FIRST_BOOK_ID, FIRST_MEMBER_ID, MAX_STORED_ID,
};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
