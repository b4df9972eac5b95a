//! Per-request scratch files
//!
//! Every file handed out here is removed when its guard goes out of scope,
//! whether the request succeeded, failed, or panicked.

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use uuid::Uuid;

use crate::error::{Result, SynthesisError};

const WAVEFORM_PREFIX: &str = "temp_";
const COMPRESSED_PREFIX: &str = "output_";

/// Shared output directory for scratch files
#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: Arc<PathBuf>,
}

impl ScratchDir {
    /// Create the directory if absent and sweep files left by an earlier crash
    pub fn prepare(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        std::fs::create_dir_all(&root)
            .map_err(|e| SynthesisError::Io(format!("failed to create output directory {}: {e}", root.display())))?;

        let removed = sweep_stale(&root)
            .map_err(|e| SynthesisError::Io(format!("failed to scan output directory {}: {e}", root.display())))?;

        if removed > 0 {
            tracing::info!(dir = %root.display(), removed, "removed stale scratch files");
        }

        Ok(Self { root: Arc::new(root) })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Draw a fresh request token and the scratch paths derived from it
    ///
    /// Nothing is created on disk except the directory itself, which is
    /// recreated if it disappeared since startup.
    pub async fn allocate(&self) -> Result<ScratchSet> {
        tokio::fs::create_dir_all(self.root.as_path()).await.map_err(|e| {
            SynthesisError::Io(format!("failed to create output directory {}: {e}", self.root.display()))
        })?;

        let token = Uuid::new_v4();

        Ok(ScratchSet {
            token,
            waveform: ScratchFile::new(self.root.join(format!("{WAVEFORM_PREFIX}{token}.wav"))),
            compressed: ScratchFile::new(self.root.join(format!("{COMPRESSED_PREFIX}{token}.opus"))),
        })
    }
}

/// Scratch paths belonging to one request
#[derive(Debug)]
pub struct ScratchSet {
    pub token: Uuid,
    /// Engine output
    pub waveform: ScratchFile,
    /// Transcoder output
    pub compressed: ScratchFile,
}

/// A path that is removed when the guard is dropped
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file now instead of at the end of the request
    pub fn discard(self) {
        drop(self);
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::trace!(path = %self.path.display(), "removed scratch file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %self.path.display(), "failed to remove scratch file: {e}"),
        }
    }
}

fn is_scratch_name(name: &str) -> bool {
    (name.starts_with(WAVEFORM_PREFIX) && name.ends_with(".wav"))
        || (name.starts_with(COMPRESSED_PREFIX) && name.ends_with(".opus"))
}

fn sweep_stale(root: &Path) -> io::Result<usize> {
    let mut removed = 0;

    for entry in std::fs::read_dir(root)? {
        let entry = entry?;

        if !entry.file_type()?.is_file() || !entry.file_name().to_str().is_some_and(is_scratch_name) {
            continue;
        }

        match std::fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!(path = %entry.path().display(), "failed to remove stale scratch file: {e}"),
        }
    }

    Ok(removed)
}
