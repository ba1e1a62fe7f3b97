//! Catalog core split across logical submodules.

mod audit;
mod codec;
mod files;
mod store;

pub use audit::{audit, Inconsistency};
pub use codec::{decode_book, decode_member, encode_book, encode_member};
pub use files::{CatalogFiles, BOOKS_FILE_NAME, MEMBERS_FILE_NAME};
pub use store::CatalogStore;
