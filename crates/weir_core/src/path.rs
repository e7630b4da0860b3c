//! The named-directory key scheme that makes custody-store entries portable
//! across machines with different directory roots (spec §3, invariant 3).

use std::path::{Path, PathBuf};

/// One of the three directories a build walks or writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirName {
    Input,
    Output,
    Working,
}

impl DirName {
    /// The virtual-key prefix used in cache files and diagnostics.
    pub const fn prefix(self) -> &'static str {
        match self {
            DirName::Input => "input_dir",
            DirName::Output => "output_dir",
            DirName::Working => "working_dir",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "input_dir" => Some(DirName::Input),
            "output_dir" => Some(DirName::Output),
            "working_dir" => Some(DirName::Working),
            _ => None,
        }
    }
}

/// The three resolved, absolute directories a build runs over (spec's
/// `ContextDirs`). `custody_cache` is a file, not a directory, and lives on
/// [`crate::settings::Settings`] instead.
#[derive(Debug, Clone)]
pub struct ContextDirs {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub working_dir: PathBuf,
}

impl ContextDirs {
    /// The absolute root for a named directory.
    pub fn root(&self, name: DirName) -> &Path {
        match name {
            DirName::Input => &self.input_dir,
            DirName::Output => &self.output_dir,
            DirName::Working => &self.working_dir,
        }
    }

    /// Classify an absolute path as lying under one of the three named
    /// directories, returning that name and the path relative to it.
    pub fn classify(&self, path: &Path) -> Option<(DirName, PathBuf)> {
        [
            (DirName::Input, &self.input_dir),
            (DirName::Output, &self.output_dir),
            (DirName::Working, &self.working_dir),
        ]
        .into_iter()
        .find_map(|(name, root)| path.strip_prefix(root).ok().map(|rel| (name, rel.to_path_buf())))
    }

    /// Render an absolute path as a virtual, directory-prefixed custody key
    /// (e.g. `input_dir/foo/bar.md`). `None` if the path lies outside all
    /// three known directories.
    pub fn to_key(&self, path: &Path) -> Option<String> {
        let (name, rel) = self.classify(path)?;
        Some(format!("{}/{}", name.prefix(), path_to_slash(&rel)))
    }

    /// Build a `glob_manifest`-style key: a pattern rooted in a named
    /// directory, e.g. `working_dir:*.py`.
    pub fn glob_key(&self, dir: DirName, pattern: &str) -> String {
        format!("{}:{pattern}", dir.prefix())
    }

    /// Resolve a virtual key produced by [`Self::to_key`] back to an
    /// absolute path.
    pub fn from_key(&self, key: &str) -> Option<PathBuf> {
        let (prefix, rel) = key.split_once('/')?;
        let name = DirName::from_prefix(prefix)?;
        Some(self.root(name).join(rel))
    }
}

/// Render a relative path with `/` separators regardless of platform, so
/// cache keys are stable across operating systems.
pub fn path_to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
