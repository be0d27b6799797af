//! Request Workspace
//!
//! Per-request scratch directory holding the source and compiled artifacts.
//!
//! Every analysis gets a fresh directory (`memlens-XXXXXX`), so two concurrent
//! requests never share artifact paths. Cleanup runs when the [`Workspace`] is
//! dropped, on success and failure alike. Cleanup failures are logged and never
//! surfaced.

use crate::error::AnalysisError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// Who owns a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Owned by the request; deleted by cleanup
    Transient,
    /// Owned by the caller; never deleted
    Retained,
}

/// Source file submitted for analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceArtifact {
    path: PathBuf,
    disposition: Disposition,
}

impl SourceArtifact {
    /// A source file the request owns and cleanup removes
    pub fn transient(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            disposition: Disposition::Transient,
        }
    }

    /// A caller-owned source file that cleanup leaves alone
    pub fn retained(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            disposition: Disposition::Retained,
        }
    }

    /// Location of the source file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether cleanup may delete the file
    pub fn disposition(&self) -> Disposition {
        self.disposition
    }

    /// File name used to label results
    pub fn label(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Executable produced by the build stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledArtifact {
    path: PathBuf,
}

impl CompiledArtifact {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Location of the executable
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Scoped directory owning one request's artifacts
#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    root: PathBuf,
    source: SourceArtifact,
    output: PathBuf,
}

impl Workspace {
    /// Create a workspace for an existing source artifact.
    ///
    /// `parent` selects where the directory is created; `None` uses the system temp dir.
    pub fn create(parent: Option<&Path>, source: SourceArtifact) -> Result<Self, AnalysisError> {
        let dir = match parent {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                tempfile::Builder::new()
                    .prefix("memlens-")
                    .tempdir_in(parent)?
            }
            None => tempfile::Builder::new().prefix("memlens-").tempdir()?,
        };
        let root = dir.path().to_path_buf();

        let stem = source
            .path()
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "program".to_string());
        let output = root.join(format!("{}.out", stem));
        debug!("created workspace {}", root.display());

        Ok(Self {
            dir: Some(dir),
            root,
            source,
            output,
        })
    }

    /// Copy a caller-owned file into a fresh workspace and analyze the copy.
    ///
    /// The copy is transient; the caller's file is never touched by cleanup.
    pub fn stage(parent: Option<&Path>, original: &Path) -> Result<Self, AnalysisError> {
        let file_name = original.file_name().ok_or_else(|| {
            AnalysisError::MalformedRequest(format!(
                "{} does not name a file",
                original.display()
            ))
        })?;

        let mut workspace = Self::create(parent, SourceArtifact::retained(original))?;
        let staged = workspace.path().join(file_name);
        std::fs::copy(original, &staged)?;
        workspace.source = SourceArtifact::transient(staged);
        Ok(workspace)
    }

    /// Workspace directory
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Source artifact this workspace was created for
    pub fn source(&self) -> &SourceArtifact {
        &self.source
    }

    /// Where the build stage writes the executable
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Delete the artifacts and the directory. Safe to call more than once.
    pub fn cleanup(&mut self) {
        remove_file_logged(&self.output);
        if self.source.disposition() == Disposition::Transient {
            remove_file_logged(self.source.path());
        }
        if let Some(dir) = self.dir.take() {
            match dir.close() {
                Ok(()) => debug!("removed workspace {}", self.root.display()),
                Err(e) => warn!("failed to remove workspace {}: {}", self.root.display(), e),
            }
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn remove_file_logged(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("removed {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("failed to remove {}: {}", path.display(), e),
    }
}
