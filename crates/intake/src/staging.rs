//! Per-request temporary storage.
//!
//! A [`StagingArea`] owns one temporary directory. Every staged upload and
//! every derived artifact (such as an annotated copy) lives inside it, so
//! dropping the area removes all of them, whichever way the request ends.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::{StagedImage, ValidatedImage};

#[derive(Debug)]
pub struct StagingArea {
    dir: tempfile::TempDir,
}

impl StagingArea {
    /// Creates a fresh directory under the system temp location.
    pub fn new() -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("inspection-").tempdir()?;
        Ok(Self { dir })
    }

    /// Creates a fresh directory under `parent`.
    pub fn new_in(parent: impl AsRef<Path>) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("inspection-")
            .tempdir_in(parent)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `image` under a unique name (`<index>-<uuid>.<ext>`).
    pub fn stage(&self, index: usize, image: &ValidatedImage) -> io::Result<StagedImage> {
        let name = format!(
            "{index}-{}.{}",
            uuid::Uuid::new_v4().simple(),
            image.media_type.extension()
        );
        let path = self.dir.path().join(name);
        fs::write(&path, &image.data)?;

        Ok(StagedImage {
            index,
            filename: image.filename.clone(),
            media_type: image.media_type,
            width: image.width,
            height: image.height,
            path,
        })
    }

    /// Sibling path for an artifact derived from `staged`, e.g.
    /// `0-<uuid>-annotated.png`. Nothing is created.
    pub fn derived_path(&self, staged: &StagedImage, suffix: &str) -> PathBuf {
        let stem = staged
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| staged.index.to_string());
        self.dir
            .path()
            .join(format!("{stem}-{suffix}.{}", staged.media_type.extension()))
    }

    /// Removes the directory now, reporting any error instead of ignoring it.
    pub fn close(self) -> io::Result<()> {
        self.dir.close()
    }
}
