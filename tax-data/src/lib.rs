//! Loaders that turn external documents into core types.
//!
//! - [`WageEntryLoader`] reads W-2 wage rows from CSV into a wage ledger
//! - [`load_return_from_file`] reads a TOML return document

mod return_loader;
mod wage_loader;

pub use return_loader::{ReturnLoadError, load_return_from_file, load_return_from_str};
pub use wage_loader::{WageEntryLoader, WageEntryRecord, WageLoaderError};
