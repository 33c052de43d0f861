use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory unusable: {0}")]
    OutputDir(String),
    #[error("invalid file name: {0:?}")]
    InvalidFileName(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Makes sure `dir` is a writable directory, creating it when absent.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    let unusable = |e: io::Error| PersistError::OutputDir(format!("{}: {e}", dir.display()));
    match fs::metadata(dir) {
        Ok(meta) if !meta.is_dir() => {
            return Err(PersistError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(unusable)?;
        }
        Err(e) => return Err(unusable(e)),
    }
    NamedTempFile::new_in(dir).map_err(unusable)?;
    Ok(())
}

/// Only bare names are accepted; a server-supplied name never picks the directory.
fn check_file_name(name: &str) -> Result<(), PersistError> {
    let path_like = name.contains(['/', '\\']) || matches!(name, "" | "." | "..");
    if path_like {
        Err(PersistError::InvalidFileName(name.to_string()))
    } else {
        Ok(())
    }
}

/// Saves downloaded artifacts under one directory. Content lands in a temp
/// file first and is renamed into place, so a file under its final name is
/// always complete.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, file_name: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        check_file_name(file_name)?;
        ensure_output_dir(&self.dir)?;

        let mut staged = NamedTempFile::new_in(&self.dir)?;
        staged.write_all(content)?;
        staged.as_file_mut().sync_all()?;

        let target = self.dir.join(file_name);
        // Downloading the same task again replaces the earlier artifact.
        if target.is_file() {
            fs::remove_file(&target)?;
        }
        staged
            .persist(&target)
            .map_err(|err| PersistError::Io(err.error))?;
        Ok(target)
    }
}
