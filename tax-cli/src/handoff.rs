use std::path::{Path, PathBuf};

use tax_core::{FinalizedReturn, HandoffError, SubmissionHandoff};
use tracing::info;

/// Writes the finalized return to a TOML file.
///
/// An existing file is only replaced when `overwrite` is set.
#[derive(Debug, Clone)]
pub struct FileHandoff {
    path: PathBuf,
    overwrite: bool,
}

impl FileHandoff {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            overwrite: false,
        }
    }

    pub fn overwrite(
        mut self,
        overwrite: bool,
    ) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SubmissionHandoff for FileHandoff {
    fn hand_off(
        &mut self,
        filing: &FinalizedReturn,
    ) -> Result<(), HandoffError> {
        if !self.overwrite && self.path.exists() {
            return Err(HandoffError::Rejected(format!(
                "'{}' already exists",
                self.path.display()
            )));
        }

        let document = toml::to_string_pretty(filing)
            .map_err(|e| HandoffError::Rejected(format!("cannot serialize return: {e}")))?;
        std::fs::write(&self.path, document).map_err(|e| {
            HandoffError::Transport(format!("cannot write '{}': {e}", self.path.display()))
        })?;

        info!("Wrote finalized return to {}", self.path.display());
        Ok(())
    }
}
