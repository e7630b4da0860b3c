//! Path calculators: turn a matched source path plus its witness into a
//! destination path in another named directory (spec §4.4, §9).

use std::path::{Path, PathBuf};

use crate::path::DirName;
use crate::witness::MatchWitness;

/// Computes a destination path for a matched source. Implementations may
/// use the witness (e.g. a regex's `stem`/`ext` captures) or ignore it.
pub trait PathCalc: Send + Sync {
    /// `source` is the path relative to its own named directory. Returns a
    /// path relative to `self.dest_dir()`.
    fn compute(&self, source: &Path, witness: &MatchWitness) -> PathBuf;

    /// The named directory the computed path is relative to.
    fn dest_dir(&self) -> DirName;
}

/// Places the output at the same relative path, in a different named
/// directory. The bread-and-butter "copy this file over" calculator.
pub struct DirRelative {
    dir: DirName,
}

impl DirRelative {
    pub fn new(dir: DirName) -> Self {
        Self { dir }
    }
}

impl PathCalc for DirRelative {
    fn compute(&self, source: &Path, _witness: &MatchWitness) -> PathBuf {
        source.to_path_buf()
    }

    fn dest_dir(&self) -> DirName {
        self.dir
    }
}

/// Like [`DirRelative`], but swaps the extension for a fixed one, falling
/// back to the witness's `ext` capture, then to the source's own extension.
pub struct WithExtension {
    dir: DirName,
    extension: String,
}

impl WithExtension {
    pub fn new(dir: DirName, extension: impl Into<String>) -> Self {
        Self { dir, extension: extension.into() }
    }
}

impl PathCalc for WithExtension {
    fn compute(&self, source: &Path, _witness: &MatchWitness) -> PathBuf {
        source.with_extension(&self.extension)
    }

    fn dest_dir(&self) -> DirName {
        self.dir
    }
}

/// Rewrites `foo/bar.md` to `foo/bar/index.html` (or whatever filename and
/// extension are configured), the conventional "pretty URL" layout for
/// generated web pages.
pub struct WebIndex {
    dir: DirName,
    index_name: String,
}

impl WebIndex {
    pub fn new(dir: DirName, index_name: impl Into<String>) -> Self {
        Self { dir, index_name: index_name.into() }
    }
}

impl PathCalc for WebIndex {
    fn compute(&self, source: &Path, _witness: &MatchWitness) -> PathBuf {
        let stem = source.file_stem().unwrap_or_default();
        let index_stem = Path::new(&self.index_name).file_stem().unwrap_or_default();

        // A source already named like the index file (e.g. `index.md` next
        // to `index.html`) is left in place rather than nested under its
        // own stem, so a top-level `index.md` produces `index.html`, not
        // `index/index.html`.
        if stem == index_stem {
            return match source.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.join(&self.index_name),
                _ => PathBuf::from(&self.index_name),
            };
        }

        match source.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                parent.join(stem).join(&self.index_name)
            }
            _ => Path::new(stem).join(&self.index_name),
        }
    }

    fn dest_dir(&self) -> DirName {
        self.dir
    }
}

/// Places the output at a fixed path regardless of the source, resolving
/// the open question of whether a bare destination path should be
/// supported directly: it is, via this calculator.
pub struct Verbatim {
    dir: DirName,
    path: PathBuf,
}

impl Verbatim {
    pub fn new(dir: DirName, path: impl Into<PathBuf>) -> Self {
        Self { dir, path: path.into() }
    }
}

impl PathCalc for Verbatim {
    fn compute(&self, _source: &Path, _witness: &MatchWitness) -> PathBuf {
        self.path.clone()
    }

    fn dest_dir(&self) -> DirName {
        self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_relative_preserves_path() {
        let calc = DirRelative::new(DirName::Output);
        assert_eq!(calc.compute(Path::new("a/b.md"), &MatchWitness::Unit), PathBuf::from("a/b.md"));
        assert_eq!(calc.dest_dir(), DirName::Output);
    }

    #[test]
    fn with_extension_swaps_suffix() {
        let calc = WithExtension::new(DirName::Output, "html");
        assert_eq!(calc.compute(Path::new("a/b.md"), &MatchWitness::Unit), PathBuf::from("a/b.html"));
    }

    #[test]
    fn web_index_nests_under_stem() {
        let calc = WebIndex::new(DirName::Output, "index.html");
        assert_eq!(
            calc.compute(Path::new("posts/hello.md"), &MatchWitness::Unit),
            PathBuf::from("posts/hello/index.html")
        );
    }

    #[test]
    fn web_index_handles_top_level_file() {
        let calc = WebIndex::new(DirName::Output, "index.html");
        assert_eq!(calc.compute(Path::new("hello.md"), &MatchWitness::Unit), PathBuf::from("hello/index.html"));
    }

    #[test]
    fn web_index_leaves_existing_index_unchanged() {
        let calc = WebIndex::new(DirName::Output, "index.html");
        assert_eq!(calc.compute(Path::new("index.md"), &MatchWitness::Unit), PathBuf::from("index.html"));
        assert_eq!(
            calc.compute(Path::new("posts/index.md"), &MatchWitness::Unit),
            PathBuf::from("posts/index.html")
        );
    }

    #[test]
    fn verbatim_ignores_source() {
        let calc = Verbatim::new(DirName::Output, "CNAME");
        assert_eq!(calc.compute(Path::new("anything"), &MatchWitness::Unit), PathBuf::from("CNAME"));
    }
}
