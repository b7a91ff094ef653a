use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use log::{debug, warn};

/// A temporary file removed when the guard is dropped
///
/// The pipeline creates two kinds of temporary files: the archive made from an
/// unpacked EPUB directory and the JSON report written by the validator. Both are
/// owned by a `TempFile`, so they are removed on every path out of the pipeline.
#[derive(Debug)]
pub struct TempFile {
    path: PathBuf,
    removed: bool,
}

impl TempFile {
    /// Creates a new empty temporary file with the given suffix
    ///
    /// The file name is unique, independent calls never share a temporary file.
    pub fn create(suffix: &str) -> io::Result<(Self, File)> {
        let (file, path) = tempfile::Builder::new()
            .prefix("epubchecker-")
            .suffix(suffix)
            .tempfile()?
            .keep()
            .map_err(|err| err.error)?;

        debug!("created temporary file {}", path.display());
        Ok((
            Self {
                path,
                removed: false,
            },
            file,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the file now and reports the failure, if any
    pub fn close(mut self) -> io::Result<()> {
        self.removed = true;
        remove_if_exists(&self.path)
    }
}

impl AsRef<Path> for TempFile {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFile {
    /// Remove temporary file when dropped
    fn drop(&mut self) {
        if self.removed {
            return;
        }

        if let Err(err) = remove_if_exists(&self.path) {
            warn!("{}", err);
        };
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("removed temporary file {}", path.display());
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

/// Converts a path relative to the archive root into a ZIP entry name
///
/// ZIP entry names always use forward slashes.
pub fn zip_entry_name(relative_path: &Path) -> String {
    relative_path.to_string_lossy().replace('\\', "/")
}
