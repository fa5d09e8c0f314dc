//! Filesystem collaborator used by the execution pipeline.
//!
//! Every mutating call honours the session's dry-run flag: when it is on,
//! nothing touches disk and the call returns [`WriteOutcome::Skipped`] with a
//! description of what would have happened.

use crate::error::Result;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(PathBuf),
    Skipped(String),
}

impl WriteOutcome {
    pub fn was_written(&self) -> bool {
        matches!(self, WriteOutcome::Written(_))
    }
}

pub trait Filesystem {
    fn read(&self, path: &Path) -> Result<String>;
    fn write(&self, path: &Path, content: &str) -> Result<WriteOutcome>;
    /// Sorted entries under `path` (files and directories). With `recursive`
    /// the walk descends into subdirectories.
    fn list(&self, path: &Path, recursive: bool) -> Result<Vec<PathBuf>>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn create_dir(&self, path: &Path) -> Result<WriteOutcome>;
    fn remove_file(&self, path: &Path) -> Result<WriteOutcome>;
    fn copy(&self, from: &Path, to: &Path) -> Result<WriteOutcome>;

    /// True when mutating calls are skipped.
    fn is_dry_run(&self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// WorkspaceFs
// ---------------------------------------------------------------------------

/// Real filesystem rooted at a workspace. Relative paths resolve against the
/// root.
#[derive(Debug, Clone)]
pub struct WorkspaceFs {
    root: PathBuf,
    dry_run: bool,
    ignore: Vec<String>,
}

impl WorkspaceFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dry_run: false,
            ignore: Vec::new(),
        }
    }

    pub fn dry_run(mut self, on: bool) -> Self {
        self.dry_run = on;
        self
    }

    /// Directory names `list` never descends into or returns.
    pub fn ignoring(mut self, names: &[String]) -> Self {
        self.ignore = names.to_vec();
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn skip(&self, name: &str) -> bool {
        name.starts_with('.') || self.ignore.iter().any(|i| i == name)
    }

    fn walk(&self, dir: &Path, recursive: bool, out: &mut Vec<PathBuf>) -> Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if self.skip(&name) {
                continue;
            }
            let path = entry.path();
            let is_dir = entry.file_type()?.is_dir();
            out.push(path.clone());
            if recursive && is_dir {
                self.walk(&path, true, out)?;
            }
        }
        Ok(())
    }
}

impl Filesystem for WorkspaceFs {
    fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn read(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(self.resolve(path))?)
    }

    fn write(&self, path: &Path, content: &str) -> Result<WriteOutcome> {
        let target = self.resolve(path);
        if self.dry_run {
            return Ok(WriteOutcome::Skipped(format!(
                "would write {} ({} chars)",
                target.display(),
                content.chars().count()
            )));
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, content)?;
        Ok(WriteOutcome::Written(target))
    }

    fn list(&self, path: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
        let mut out = Vec::new();
        self.walk(&self.resolve(path), recursive, &mut out)?;
        out.sort();
        Ok(out)
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.resolve(path).is_dir()
    }

    fn create_dir(&self, path: &Path) -> Result<WriteOutcome> {
        let target = self.resolve(path);
        if self.dry_run {
            return Ok(WriteOutcome::Skipped(format!(
                "would create directory {}",
                target.display()
            )));
        }
        crate::io::ensure_dir(&target)?;
        Ok(WriteOutcome::Written(target))
    }

    fn remove_file(&self, path: &Path) -> Result<WriteOutcome> {
        let target = self.resolve(path);
        if self.dry_run {
            return Ok(WriteOutcome::Skipped(format!("would delete {}", target.display())));
        }
        std::fs::remove_file(&target)?;
        Ok(WriteOutcome::Written(target))
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<WriteOutcome> {
        let (src, dst) = (self.resolve(from), self.resolve(to));
        if self.dry_run {
            return Ok(WriteOutcome::Skipped(format!(
                "would copy {} -> {}",
                src.display(),
                dst.display()
            )));
        }
        std::fs::copy(&src, &dst)?;
        Ok(WriteOutcome::Written(dst))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
