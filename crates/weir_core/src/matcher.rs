//! Matchers: predicates over a path that hand a [`MatchWitness`] to path
//! calculators and transforms on success (spec §4.3).

use std::path::Path;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use rustc_hash::FxHashMap;

use crate::path::{ContextDirs, DirName};
use crate::witness::{MatchWitness, RegexCapture};

/// Something that can test a path against a build's resolved directories
/// and, on success, hand back a witness carrying whatever it captured.
/// `path` is always absolute; a matcher that cares about which named
/// directory a path falls under inspects `dirs` itself rather than relying
/// on the engine to have pre-filtered by directory.
pub trait Matcher: Send + Sync {
    fn test(&self, dirs: &ContextDirs, path: &Path) -> MatchWitness;

    /// Short-circuiting AND: `other` only runs if `self` matched.
    fn and<M: Matcher + 'static>(self, other: M) -> And
    where
        Self: Sized + 'static,
    {
        And(Arc::new(self), Arc::new(other))
    }

    /// Short-circuiting OR: `other` only runs if `self` did not match.
    fn or<M: Matcher + 'static>(self, other: M) -> Or
    where
        Self: Sized + 'static,
    {
        Or(Arc::new(self), Arc::new(other))
    }

    /// Negation. The resulting witness carries no captures.
    fn negate(self) -> Not
    where
        Self: Sized + 'static,
    {
        Not(Arc::new(self))
    }
}

/// Case/multiline options for [`RegexMatcher`], mirroring the subset of
/// `regex::RegexBuilder` flags a filename pattern plausibly needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegexFlags {
    pub case_insensitive: bool,
    pub multi_line: bool,
    pub dot_matches_new_line: bool,
}

/// Matches a path's string form against a regex, requiring a full match.
/// Named capture groups `stem` and `ext` are the conventional ones path
/// calculators look for. An optional `parent_dir` restricts the match to
/// paths under that named directory and tests against the path relative to
/// it; with no `parent_dir`, the path is classified against whichever of
/// the three named directories contains it.
pub struct RegexMatcher {
    regex: Regex,
    parent_dir: Option<DirName>,
}

impl RegexMatcher {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self { regex: Regex::new(pattern)?, parent_dir: None })
    }

    /// Build a matcher with case/multiline options applied before
    /// compilation.
    pub fn with_flags(pattern: &str, flags: RegexFlags) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(flags.case_insensitive)
            .multi_line(flags.multi_line)
            .dot_matches_new_line(flags.dot_matches_new_line)
            .build()?;
        Ok(Self { regex, parent_dir: None })
    }

    /// Restrict matches to paths under `dir`, testing the pattern against
    /// the path relative to it rather than whichever directory `classify`
    /// would otherwise pick.
    pub fn parent_dir(mut self, dir: DirName) -> Self {
        self.parent_dir = Some(dir);
        self
    }
}

impl Matcher for RegexMatcher {
    fn test(&self, dirs: &ContextDirs, path: &Path) -> MatchWitness {
        let rel = match self.parent_dir {
            Some(dir) => match path.strip_prefix(dirs.root(dir)) {
                Ok(rel) => rel.to_path_buf(),
                Err(_) => return MatchWitness::None,
            },
            None => match dirs.classify(path) {
                Some((_, rel)) => rel,
                None => return MatchWitness::None,
            },
        };

        let text = crate::path::path_to_slash(&rel);
        match self.regex.captures(&text) {
            Some(caps) if caps.get(0).is_some_and(|m| m.as_str() == text) => {
                let mut named = FxHashMap::default();
                for name in self.regex.capture_names().flatten() {
                    if let Some(m) = caps.name(name) {
                        named.insert(name.to_string(), m.as_str().to_string());
                    }
                }
                MatchWitness::Regex(Arc::new(RegexCapture { full: text, named }))
            }
            _ => MatchWitness::None,
        }
    }
}

/// Matches any path ending in one of a fixed set of extensions.
pub struct ExtensionMatcher {
    extensions: Vec<String>,
}

impl ExtensionMatcher {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { extensions: extensions.into_iter().map(Into::into).collect() }
    }
}

impl Matcher for ExtensionMatcher {
    fn test(&self, dirs: &ContextDirs, path: &Path) -> MatchWitness {
        let Some((_, rel)) = dirs.classify(path) else {
            return MatchWitness::None;
        };
        let ext = rel.extension().and_then(|e| e.to_str());
        match ext {
            Some(ext) if self.extensions.iter().any(|e| e == ext) => {
                let stem = rel.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
                let mut named = FxHashMap::default();
                named.insert("stem".to_string(), stem.to_string());
                named.insert("ext".to_string(), ext.to_string());
                MatchWitness::Regex(Arc::new(RegexCapture {
                    full: crate::path::path_to_slash(&rel),
                    named,
                }))
            }
            _ => MatchWitness::None,
        }
    }
}

/// Matches everything under any named directory. Useful as a catch-all
/// final rule.
pub struct Any;

impl Matcher for Any {
    fn test(&self, dirs: &ContextDirs, path: &Path) -> MatchWitness {
        if dirs.classify(path).is_some() { MatchWitness::Unit } else { MatchWitness::None }
    }
}

/// Restricts an arbitrary matcher to paths under a single named directory.
/// This is what [`crate::rule::RuleBuilder::source_dir`] composes under the
/// hood: directory scoping is a property of the matcher, not something the
/// engine pre-filters by before the matcher ever runs.
pub struct WithinDir(DirName, Arc<dyn Matcher>);

impl WithinDir {
    pub fn new(dir: DirName, matcher: Arc<dyn Matcher>) -> Self {
        Self(dir, matcher)
    }
}

impl Matcher for WithinDir {
    fn test(&self, dirs: &ContextDirs, path: &Path) -> MatchWitness {
        match dirs.classify(path) {
            Some((dir, _)) if dir == self.0 => self.1.test(dirs, path),
            _ => MatchWitness::None,
        }
    }
}

pub struct And(Arc<dyn Matcher>, Arc<dyn Matcher>);

impl Matcher for And {
    fn test(&self, dirs: &ContextDirs, path: &Path) -> MatchWitness {
        let left = self.0.test(dirs, path);
        if !left.is_match() {
            return MatchWitness::None;
        }
        let right = self.1.test(dirs, path);
        if right.is_match() { right } else { MatchWitness::None }
    }
}

pub struct Or(Arc<dyn Matcher>, Arc<dyn Matcher>);

impl Matcher for Or {
    fn test(&self, dirs: &ContextDirs, path: &Path) -> MatchWitness {
        let left = self.0.test(dirs, path);
        if left.is_match() { left } else { self.1.test(dirs, path) }
    }
}

pub struct Not(Arc<dyn Matcher>);

impl Matcher for Not {
    fn test(&self, dirs: &ContextDirs, path: &Path) -> MatchWitness {
        if self.0.test(dirs, path).is_match() { MatchWitness::None } else { MatchWitness::Unit }
    }
}
