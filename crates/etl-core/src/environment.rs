//! Working folder layout and the environment handed to every step

use crate::control::ControlStore;
use crate::error::{EtlError, Result};
use etl_common::FolderKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The fixed set of working directories under a root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderLayout {
    root: PathBuf,
}

impl FolderLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `root/<segment>` for the given kind. No filesystem access.
    pub fn resolve(&self, kind: FolderKind) -> PathBuf {
        self.root.join(kind.segment())
    }

    /// All folders with their resolved paths, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (FolderKind, PathBuf)> + '_ {
        FolderKind::ALL
            .into_iter()
            .map(move |kind| (kind, self.resolve(kind)))
    }
}

/// Shared context passed by reference to every step.
///
/// Built once per process. The root never changes after construction; the
/// control store is attached explicitly when one is configured.
#[derive(Debug, Clone)]
pub struct Environment {
    layout: FolderLayout,
    control: Option<ControlStore>,
}

impl Environment {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            layout: FolderLayout::new(root),
            control: None,
        }
    }

    /// Attach a connected control store
    pub fn with_control(mut self, control: ControlStore) -> Self {
        self.control = Some(control);
        self
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    pub fn layout(&self) -> &FolderLayout {
        &self.layout
    }

    pub fn resolve(&self, kind: FolderKind) -> PathBuf {
        self.layout.resolve(kind)
    }

    pub fn control(&self) -> Option<&ControlStore> {
        self.control.as_ref()
    }

    /// The attached control store, or [`EtlError::ControlStoreUnavailable`]
    pub fn require_control(&self) -> Result<&ControlStore> {
        self.control.as_ref().ok_or(EtlError::ControlStoreUnavailable)
    }

    /// Create every working folder that does not exist yet.
    ///
    /// Safe to call repeatedly. Returns the folders with their paths so
    /// callers can report them.
    pub fn ensure_folders(&self) -> Result<Vec<(FolderKind, PathBuf)>> {
        let mut folders = Vec::with_capacity(FolderKind::ALL.len());

        for (kind, path) in self.layout.iter() {
            info!(folder = %kind, path = %path.display(), "Checking folder");

            if path.is_dir() {
                debug!(folder = %kind, "Folder already exists");
            } else if path.exists() {
                return Err(EtlError::filesystem(
                    &path,
                    std::io::Error::new(
                        std::io::ErrorKind::AlreadyExists,
                        "path exists but is not a directory",
                    ),
                ));
            } else {
                std::fs::create_dir_all(&path).map_err(|e| EtlError::filesystem(&path, e))?;
                info!(folder = %kind, path = %path.display(), "Created folder");
            }

            folders.push((kind, path));
        }

        Ok(folders)
    }
}
