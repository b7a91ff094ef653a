//! Epub Archiver
//!
//! This module packages an unpacked EPUB directory into a ZIP container that
//! the validator can consume.
//!
//! ## Layout
//!
//! - Every immediate child of the directory becomes a top-level entry.
//! - Subdirectories are added recursively under their own name.
//! - The `mimetype` file is written first and stored without compression,
//!   as required by the OCF container format. Everything else is deflated.
//!
//! ## Notes
//!
//! - The archive is written to a fresh temporary file. The returned [TempFile]
//!   removes it when dropped.
//! - The archive is fully written and flushed before [epub_from_directory] returns.

use std::{
    fs::{self, File},
    io,
    path::Path,
};

use log::{debug, warn};
use walkdir::WalkDir;
use zip::{CompressionMethod, ZipWriter, write::FileOptions};

use crate::{
    error::CheckerError,
    utils::{TempFile, zip_entry_name},
};

/// Name of the entry holding the media type of the container
pub const MIMETYPE: &str = "mimetype";

type ArchiveOptions = FileOptions<'static, ()>;

/// Archives an unpacked EPUB directory into a temporary `.epub` file
///
/// # Parameters
/// - `epub_root`: The directory to archive
///
/// # Return
/// - `Ok(TempFile)`: The temporary archive, removed when the guard is dropped
/// - `Err(CheckerError)`: Reading the directory or writing the archive failed;
///   the partial archive has been removed
pub fn epub_from_directory<P: AsRef<Path>>(epub_root: P) -> Result<TempFile, CheckerError> {
    let epub_root = epub_root.as_ref();
    let (archive, file) = TempFile::create(".epub")?;

    debug!(
        "archiving {} into {}",
        epub_root.display(),
        archive.path().display()
    );
    write_archive(epub_root, file)?;

    Ok(archive)
}

fn write_archive(epub_root: &Path, file: File) -> Result<(), CheckerError> {
    let stored = FileOptions::<()>::default().compression_method(CompressionMethod::Stored);
    let deflated = FileOptions::<()>::default().compression_method(CompressionMethod::Deflated);

    let mut children = fs::read_dir(epub_root)?.collect::<Result<Vec<_>, _>>()?;
    children.sort_by_key(|entry| (entry.file_name() != MIMETYPE, entry.file_name()));

    let mut zip = ZipWriter::new(file);
    for child in children {
        let path = child.path();
        let name = child.file_name().to_string_lossy().to_string();

        if name == MIMETYPE && path.is_file() {
            add_file(&mut zip, &path, name, stored)?;
        } else if path.is_dir() {
            add_directory(&mut zip, epub_root, &path, deflated)?;
        } else if path.is_file() {
            add_file(&mut zip, &path, name, deflated)?;
        } else {
            warn!("Skipping \"{}\": not a file or directory.", path.display());
        }
    }

    let file = zip.finish()?;
    file.sync_all()?;

    Ok(())
}

fn add_file(
    zip: &mut ZipWriter<File>,
    path: &Path,
    name: String,
    options: ArchiveOptions,
) -> Result<(), CheckerError> {
    debug!("adding {}", name);
    zip.start_file(name, options)?;
    io::copy(&mut File::open(path)?, zip)?;

    Ok(())
}

fn add_directory(
    zip: &mut ZipWriter<File>,
    epub_root: &Path,
    dir: &Path,
    options: ArchiveOptions,
) -> Result<(), CheckerError> {
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();

        let relative_path = path.strip_prefix(epub_root).map_err(io::Error::other)?;
        let target_path = zip_entry_name(relative_path);

        if path.is_file() {
            add_file(zip, path, target_path, options)?;
        } else if path.is_dir() {
            zip.add_directory(target_path, options)?;
        } else {
            warn!("Skipping \"{}\": not a file or directory.", path.display());
        }
    }

    Ok(())
}
