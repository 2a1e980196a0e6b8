//! In-memory output files.

use std::fs;
use std::path::{Path, PathBuf};

use super::error::EngineError;
use crate::warning::Warnings;

/// One rendered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    /// File name inside the run directory.
    pub name: String,
    /// Encoded content.
    pub bytes: Vec<u8>,
}

/// Every rendered file of a run, plus all warnings collected so far.
#[derive(Debug, Clone, Default)]
pub struct OutputBundle {
    files: Vec<OutputFile>,
    /// Run warnings, including codec warnings.
    pub warnings: Warnings,
}

impl OutputBundle {
    /// Adds a file.
    pub fn add(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.files.push(OutputFile {
            name: name.into(),
            bytes,
        });
    }

    /// Files in render order.
    #[must_use]
    pub fn files(&self) -> &[OutputFile] {
        &self.files
    }

    /// Content of a file by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files
            .iter()
            .find(|file| file.name == name)
            .map(|file| file.bytes.as_slice())
    }

    /// Writes every file into `dir`, creating it when needed.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Write` for the first file or directory that
    /// cannot be written.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>, EngineError> {
        fs::create_dir_all(dir).map_err(|source| EngineError::Write {
            path: dir.display().to_string(),
            source,
        })?;

        self.files
            .iter()
            .map(|file| {
                let path = dir.join(&file.name);
                fs::write(&path, &file.bytes).map_err(|source| EngineError::Write {
                    path: path.display().to_string(),
                    source,
                })?;
                Ok(path)
            })
            .collect()
    }
}
