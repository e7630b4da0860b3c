//! Resolved, validated configuration for an [`crate::engine::Engine`] run
//! (spec §4.1).

use std::path::{Path, PathBuf};

use crate::error::EngineError;
use crate::path::ContextDirs;

/// What to do when a rule's transform fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop the whole build at the first transform failure.
    #[default]
    Abort,
    /// Record the failure and keep processing other files.
    Continue,
}

/// The fully resolved configuration for a build: the three named
/// directories, where the custody cache lives, and how to behave on
/// transform errors and loop detection.
#[derive(Debug, Clone)]
pub struct Settings {
    dirs: ContextDirs,
    custody_cache: Option<PathBuf>,
    error_policy: ErrorPolicy,
    max_passes: usize,
    max_repeats_per_rule: usize,
    purge_dirs: bool,
}

impl Settings {
    pub fn builder(input_dir: impl Into<PathBuf>) -> SettingsBuilder {
        SettingsBuilder {
            input_dir: input_dir.into(),
            output_dir: None,
            working_dir: None,
            custody_cache: None,
            custody_cache_disabled: false,
            error_policy: ErrorPolicy::default(),
            max_passes: 100,
            max_repeats_per_rule: 8,
            purge_dirs: false,
        }
    }

    pub fn dirs(&self) -> &ContextDirs {
        &self.dirs
    }

    /// Where the custody cache is persisted, or `None` if caching is
    /// disabled for this run (spec §4.1) — every file is then judged stale
    /// and nothing is written back at the end of the run.
    pub fn custody_cache(&self) -> Option<&Path> {
        self.custody_cache.as_deref()
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        self.error_policy
    }

    pub fn max_passes(&self) -> usize {
        self.max_passes
    }

    pub fn max_repeats_per_rule(&self) -> usize {
        self.max_repeats_per_rule
    }

    /// Whether `output_dir` and `working_dir` should be wiped before the
    /// run starts.
    pub fn purge_dirs(&self) -> bool {
        self.purge_dirs
    }

    /// A flattened snapshot of the directories, useful for `--check`
    /// diagnostics and logging. `custody_cache` is omitted when caching is
    /// disabled.
    pub fn parameters(&self) -> Vec<(&'static str, PathBuf)> {
        let mut params = vec![
            ("input_dir", self.dirs.input_dir.clone()),
            ("output_dir", self.dirs.output_dir.clone()),
            ("working_dir", self.dirs.working_dir.clone()),
        ];
        if let Some(cache) = &self.custody_cache {
            params.push(("custody_cache", cache.clone()));
        }
        params
    }

    /// The resolved directories plus the engine version, recorded in the
    /// custody cache file on save and compared on load: any mismatch
    /// forces a full rebuild rather than trusting stale records against a
    /// changed layout (spec §4.1).
    pub fn cache_parameters(&self) -> std::collections::BTreeMap<String, String> {
        std::collections::BTreeMap::from([
            ("input_dir".to_string(), self.dirs.input_dir.to_string_lossy().into_owned()),
            ("output_dir".to_string(), self.dirs.output_dir.to_string_lossy().into_owned()),
            ("working_dir".to_string(), self.dirs.working_dir.to_string_lossy().into_owned()),
            ("engine_version".to_string(), env!("CARGO_PKG_VERSION").to_string()),
        ])
    }
}

/// Builds a [`Settings`], filling in working/output directory and custody
/// cache defaults relative to `input_dir` when not given explicitly.
pub struct SettingsBuilder {
    input_dir: PathBuf,
    output_dir: Option<PathBuf>,
    working_dir: Option<PathBuf>,
    custody_cache: Option<PathBuf>,
    custody_cache_disabled: bool,
    error_policy: ErrorPolicy,
    max_passes: usize,
    max_repeats_per_rule: usize,
    purge_dirs: bool,
}

impl SettingsBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Use an explicit path for the custody cache, instead of the default
    /// `{working_dir}/.custody.json`.
    pub fn custody_cache(mut self, path: impl Into<PathBuf>) -> Self {
        self.custody_cache = Some(path.into());
        self.custody_cache_disabled = false;
        self
    }

    /// Disable the custody cache entirely (spec §4.1): every file is
    /// judged stale on every run, and no cache file is read or written.
    pub fn disable_custody_cache(mut self) -> Self {
        self.custody_cache_disabled = true;
        self.custody_cache = None;
        self
    }

    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn max_passes(mut self, max: usize) -> Self {
        self.max_passes = max;
        self
    }

    pub fn max_repeats_per_rule(mut self, max: usize) -> Self {
        self.max_repeats_per_rule = max;
        self
    }

    /// Delete `output_dir` and `working_dir` before the run starts, for a
    /// guaranteed-clean rebuild at the cost of the custody cache's
    /// incremental benefit.
    pub fn purge_dirs(mut self, purge: bool) -> Self {
        self.purge_dirs = purge;
        self
    }

    /// Validate and resolve the builder into [`Settings`]. `input_dir` must
    /// exist and must not coincide with `output_dir`, per spec invariant 1.
    pub fn build(self) -> Result<Settings, EngineError> {
        if !self.input_dir.is_dir() {
            return Err(EngineError::Configuration(format!(
                "input_dir `{}` does not exist or is not a directory",
                self.input_dir.display()
            )));
        }

        let output_dir = self.output_dir.unwrap_or_else(|| self.input_dir.join("build"));
        let working_dir = self.working_dir.unwrap_or_else(|| self.input_dir.with_file_name("_working"));

        if output_dir == self.input_dir {
            return Err(EngineError::Configuration(
                "output_dir must not be the same directory as input_dir".to_string(),
            ));
        }

        let custody_cache = if self.custody_cache_disabled {
            None
        } else {
            Some(self.custody_cache.unwrap_or_else(|| working_dir.join(".custody.json")))
        };

        Ok(Settings {
            dirs: ContextDirs { input_dir: self.input_dir, output_dir, working_dir },
            custody_cache,
            error_policy: self.error_policy,
            max_passes: self.max_passes,
            max_repeats_per_rule: self.max_repeats_per_rule,
            purge_dirs: self.purge_dirs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_input_dir() {
        let result = Settings::builder("/does/not/exist/ever").build();
        assert!(result.is_err());
    }

    #[test]
    fn rejects_output_dir_equal_to_input_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let result = Settings::builder(tmp.path()).output_dir(tmp.path()).build();
        assert!(result.is_err());
    }

    #[test]
    fn fills_in_defaults_relative_to_input_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("content");
        std::fs::create_dir(&input).unwrap();
        let settings = Settings::builder(&input).build().unwrap();
        assert_eq!(settings.dirs().output_dir, input.join("build"));
        assert_eq!(settings.dirs().working_dir, tmp.path().join("_working"));
    }

    #[test]
    fn custody_cache_defaults_to_a_path_under_working_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("content");
        std::fs::create_dir(&input).unwrap();
        let settings = Settings::builder(&input).working_dir(tmp.path().join("work")).build().unwrap();
        assert_eq!(settings.custody_cache(), Some(tmp.path().join("work").join(".custody.json")).as_deref());
    }

    #[test]
    fn disable_custody_cache_yields_no_path() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("content");
        std::fs::create_dir(&input).unwrap();
        let settings = Settings::builder(&input).disable_custody_cache().build().unwrap();
        assert_eq!(settings.custody_cache(), None);
    }

    #[test]
    fn honors_explicit_overrides() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("content");
        std::fs::create_dir(&input).unwrap();
        let settings = Settings::builder(&input)
            .output_dir(tmp.path().join("dist"))
            .working_dir(tmp.path().join("tmp"))
            .error_policy(ErrorPolicy::Continue)
            .build()
            .unwrap();
        assert_eq!(settings.dirs().output_dir, tmp.path().join("dist"));
        assert_eq!(settings.error_policy(), ErrorPolicy::Continue);
    }
}
