//! Folder packaging for directory uploads
//!
//! A directory is turned into a single `.tar.gz` written to a uniquely named
//! temporary file. The file lives exactly as long as its `FolderArchive`.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tar::HeaderMode;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

const ARCHIVE_PREFIX: &str = "backupchan-";
const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// A packaged directory on disk, deleted when dropped
pub struct FolderArchive {
    file: NamedTempFile,
    upload_name: String,
}

impl FolderArchive {
    /// Package `folder` into a new archive inside `archive_dir`
    ///
    /// The folder's base name becomes the root of the archive. If anything
    /// fails half-way, the partial file is removed before the error returns.
    pub fn create(folder: &Path, archive_dir: &Path) -> io::Result<Self> {
        let base_name = folder_base_name(folder)?.ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Folder has no base name: {:?}", folder),
            )
        })?;

        let file = tempfile::Builder::new()
            .prefix(ARCHIVE_PREFIX)
            .suffix(ARCHIVE_SUFFIX)
            .rand_bytes(16)
            .tempfile_in(archive_dir)?;

        debug!("Packaging {:?} into {:?}", folder, file.path());

        let encoder = GzEncoder::new(file.as_file().try_clone()?, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder.mode(HeaderMode::Deterministic);
        builder.follow_symlinks(false);

        // Walk the canonical tree so the archive itself can be recognised
        // when `archive_dir` lies inside `folder`.
        let root = folder.canonicalize()?;
        let own_path = file.path().canonicalize()?;
        append_tree(&mut builder, &root, Path::new(&base_name), &own_path)?;

        let mut written = builder.into_inner()?.finish()?;
        written.flush()?;

        let archive = Self {
            file,
            upload_name: format!("{}{}", base_name, ARCHIVE_SUFFIX),
        };
        info!(
            "Created archive '{}' ({} bytes)",
            archive.upload_name,
            archive.len()?
        );

        Ok(archive)
    }

    /// Temporary location of the archive
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// File name to upload under: `<folder-name>.tar.gz`
    pub fn upload_name(&self) -> &str {
        &self.upload_name
    }

    pub fn len(&self) -> io::Result<u64> {
        Ok(self.file.as_file().metadata()?.len())
    }

    pub fn is_empty(&self) -> io::Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Fresh read handle positioned at the start of the archive
    pub fn reader(&self) -> io::Result<File> {
        self.file.reopen()
    }
}

impl Drop for FolderArchive {
    fn drop(&mut self) {
        let path = self.file.path();
        match fs::remove_file(path) {
            Ok(()) => debug!("Removed temporary archive: {:?}", path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove temporary archive {:?}: {}", path, e),
        }
    }
}

/// Base name of a folder, resolved on the canonical path
///
/// `.` and trailing slashes resolve to the real directory name; the
/// filesystem root has none.
pub fn folder_base_name(folder: &Path) -> io::Result<Option<String>> {
    let canonical = folder.canonicalize()?;
    Ok(canonical
        .file_name()
        .map(|name| name.to_string_lossy().into_owned()))
}

/// Default directory for temporary archives
pub fn default_archive_dir() -> PathBuf {
    std::env::temp_dir()
}

/// Append `src` as `name`, then its children in sorted order, leaving out `skip`
fn append_tree<W: Write>(
    builder: &mut tar::Builder<W>,
    src: &Path,
    name: &Path,
    skip: &Path,
) -> io::Result<()> {
    builder.append_dir(name, src)?;

    let mut entries = fs::read_dir(src)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        if path == skip {
            continue;
        }
        let entry_name = name.join(entry.file_name());

        // file_type() does not follow symlinks, so linked directories are
        // stored as links instead of being walked.
        if entry.file_type()?.is_dir() {
            append_tree(builder, &path, &entry_name, skip)?;
        } else {
            builder.append_path_with_name(&path, &entry_name)?;
        }
    }

    Ok(())
}
