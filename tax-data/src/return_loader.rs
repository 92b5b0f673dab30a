use std::path::{Path, PathBuf};

use tax_core::TaxReturn;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ReturnLoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid return document: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Parse a return document.
///
/// Keys are the form's camelCase field names. Every key is optional; a
/// missing key keeps the blank default, and unknown keys are ignored.
pub fn load_return_from_str(document: &str) -> Result<TaxReturn, ReturnLoadError> {
    let tax_return: TaxReturn = toml::from_str(document)?;
    Ok(tax_return)
}

pub fn load_return_from_file(path: impl AsRef<Path>) -> Result<TaxReturn, ReturnLoadError> {
    let path = path.as_ref();
    debug!("Reading return document {}", path.display());
    let document = std::fs::read_to_string(path).map_err(|source| ReturnLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_return_from_str(&document)
}
