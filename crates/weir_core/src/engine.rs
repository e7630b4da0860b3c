//! The engine: discovers input files, applies rules, and drives the
//! working-directory fixpoint until no rule produces anything new (spec
//! §4.7, §5).

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::WalkDir;

use crate::custody::{CustodyEntry, CustodyStore};
use crate::error::EngineError;
use crate::path::{ContextDirs, DirName};
use crate::rule::{Rule, RuleOutcome};
use crate::settings::{ErrorPolicy, Settings};

/// The outcome of a full [`Engine::run`].
#[derive(Debug, Default)]
pub struct BuildReport {
    pub processed: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    /// Files a rule matched but explicitly dropped (empty or all-stop
    /// path-calculator sequence) — handled, but no output produced.
    pub dropped: Vec<PathBuf>,
    pub orphans_removed: Vec<PathBuf>,
    /// Transform failures recorded instead of aborting, when
    /// [`ErrorPolicy::Continue`] is in effect.
    pub errors: Vec<EngineError>,
}

type KindChecker = Arc<dyn Fn(&CustodyEntry) -> bool + Send + Sync>;

/// Ties a set of [`Rule`]s to [`Settings`] and runs them to a fixpoint.
pub struct Engine {
    rules: Vec<Rule>,
    settings: Settings,
    custom_kinds: Vec<(String, KindChecker)>,
}

impl Engine {
    pub fn new(settings: Settings, rules: Vec<Rule>) -> Self {
        Self { rules, settings, custom_kinds: Vec::new() }
    }

    /// Register a staleness checker for a custom [`CustodyEntry::Custom`]
    /// kind, forwarded to the custody store on every run. See
    /// [`CustodyStore::register_kind`].
    pub fn with_custom_kind(
        mut self,
        kind: impl Into<String>,
        checker: impl Fn(&CustodyEntry) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.custom_kinds.push((kind.into(), Arc::new(checker)));
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Walk a named directory in deterministic order, yielding every
    /// regular file beneath it. Symlinks are followed; directories are not
    /// yielded.
    fn discover(&self, dir: DirName) -> Vec<PathBuf> {
        let root = self.settings.dirs().root(dir);
        if !root.exists() {
            return Vec::new();
        }
        let mut paths: Vec<PathBuf> = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect();
        paths.sort();
        paths
    }

    /// Run the full build: discover `input_dir`, apply rules to every
    /// input file, then drive the `working_dir` fixpoint until no new
    /// files appear, finally sweeping orphaned outputs.
    pub fn run(&self, cancel: &AtomicBool) -> Result<BuildReport, EngineError> {
        let dirs = self.settings.dirs().clone();
        if self.settings.purge_dirs() {
            for dir in [&dirs.output_dir, &dirs.working_dir] {
                if dir.exists() {
                    std::fs::remove_dir_all(dir).map_err(|e| {
                        EngineError::Configuration(format!("failed to purge {}: {e}", dir.display()))
                    })?;
                }
            }
        }
        let params = self.settings.cache_parameters();
        let (mut custody, _load_outcome) = CustodyStore::load(self.settings.custody_cache(), &params)?;
        for (kind, checker) in &self.custom_kinds {
            let checker = Arc::clone(checker);
            custody.register_kind(kind.clone(), move |entry| checker(entry));
        }

        let mut report = BuildReport::default();
        let mut repeat_counts: HashMap<(String, PathBuf), usize> = HashMap::new();
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut queue: Vec<PathBuf> = Vec::new();

        for path in self.discover(DirName::Input) {
            if cancel.load(Ordering::SeqCst) {
                return Err(EngineError::Cancelled);
            }
            self.scan_one(&path, &dirs, &mut custody, &mut repeat_counts, &mut report, &mut seen, &mut queue)?;
        }

        let mut passes = 0usize;
        while !queue.is_empty() {
            passes += 1;
            if passes > self.settings.max_passes() {
                return Err(EngineError::Cycle(self.settings.max_passes()));
            }
            if cancel.load(Ordering::SeqCst) {
                return Err(EngineError::Cancelled);
            }

            let this_pass: Vec<PathBuf> = queue.drain(..).collect();
            for path in this_pass {
                if !path.exists() {
                    continue;
                }
                self.scan_one(&path, &dirs, &mut custody, &mut repeat_counts, &mut report, &mut seen, &mut queue)?;
            }

            for path in self.discover(DirName::Working) {
                if seen.insert(path.clone()) {
                    queue.push(path);
                }
            }
        }

        report.orphans_removed = custody.sweep_orphans(&dirs)?;
        custody.save(self.settings.custody_cache(), &params)?;
        Ok(report)
    }

    /// Apply the first matching rule to `path`, updating `report` and
    /// enqueuing any freshly produced `working_dir` output for the next
    /// fixpoint pass.
    #[allow(clippy::too_many_arguments)]
    fn scan_one(
        &self,
        path: &std::path::Path,
        dirs: &ContextDirs,
        custody: &mut CustodyStore,
        repeat_counts: &mut HashMap<(String, PathBuf), usize>,
        report: &mut BuildReport,
        seen: &mut HashSet<PathBuf>,
        queue: &mut Vec<PathBuf>,
    ) -> Result<(), EngineError> {
        if dirs.classify(path).is_none() {
            return Ok(());
        }

        for rule in &self.rules {
            let outcome = match rule.apply(path, dirs, custody) {
                Ok(outcome) => outcome,
                Err(err) => {
                    return match self.settings.error_policy() {
                        ErrorPolicy::Abort => Err(err),
                        ErrorPolicy::Continue => {
                            report.errors.push(err);
                            Ok(())
                        }
                    };
                }
            };

            match outcome {
                RuleOutcome::NoMatch => continue,
                RuleOutcome::Dropped => {
                    report.dropped.push(path.to_path_buf());
                    return Ok(());
                }
                RuleOutcome::Skipped { outputs } => {
                    report.skipped.extend(outputs);
                    return Ok(());
                }
                RuleOutcome::Processed { outputs, halt } => {
                    let key = (rule.name().to_string(), path.to_path_buf());
                    let count = repeat_counts.entry(key).or_insert(0);
                    *count += 1;
                    if *count > self.settings.max_repeats_per_rule() {
                        return Err(EngineError::Loop {
                            rule: rule.name().to_string(),
                            path: path.to_path_buf(),
                            limit: self.settings.max_repeats_per_rule(),
                        });
                    }

                    if !halt {
                        for output in &outputs {
                            if dirs.classify(output).map(|(d, _)| d) == Some(DirName::Working)
                                && seen.insert(output.clone())
                            {
                                queue.push(output.clone());
                            }
                        }
                    }
                    report.processed.extend(outputs);
                    return Ok(());
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::ExtensionMatcher;
    use crate::path_calc::WithExtension;
    use crate::transform::Copy;
    use std::fs;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn end_to_end_copies_matching_files() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("content");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("a.md"), b"hello").unwrap();
        fs::write(input.join("a.png"), b"binary").unwrap();

        let settings = Settings::builder(&input)
            .output_dir(tmp.path().join("out"))
            .working_dir(tmp.path().join("work"))
            .build()
            .unwrap();

        let rule = Rule::builder("copy-md")
            .source_dir(DirName::Input)
            .matcher(ExtensionMatcher::new(["md"]))
            .path_calc(WithExtension::new(DirName::Output, "md"))
            .transform(Copy)
            .build()
            .unwrap();

        let engine = Engine::new(settings, vec![rule]);
        let cancel = AtomicBool::new(false);
        let report = engine.run(&cancel).unwrap();

        assert_eq!(report.processed, vec![tmp.path().join("out").join("a.md")]);
        assert!(tmp.path().join("out").join("a.md").exists());
        assert!(!tmp.path().join("out").join("a.png").exists());
    }

    #[test]
    fn second_run_skips_unchanged_input() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("content");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("a.md"), b"hello").unwrap();

        let settings = Settings::builder(&input)
            .output_dir(tmp.path().join("out"))
            .working_dir(tmp.path().join("work"))
            .build()
            .unwrap();

        let rule = || {
            Rule::builder("copy-md")
                .source_dir(DirName::Input)
                .matcher(ExtensionMatcher::new(["md"]))
                .path_calc(WithExtension::new(DirName::Output, "md"))
                .transform(Copy)
                .build()
                .unwrap()
        };

        let engine1 = Engine::new(settings.clone(), vec![rule()]);
        let cancel = AtomicBool::new(false);
        engine1.run(&cancel).unwrap();

        let engine2 = Engine::new(settings, vec![rule()]);
        let report2 = engine2.run(&cancel).unwrap();
        assert!(report2.processed.is_empty());
        assert_eq!(report2.skipped, vec![tmp.path().join("out").join("a.md")]);
    }

    #[test]
    fn working_dir_fixpoint_chains_rules() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("content");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("a.step1"), b"hello").unwrap();

        let settings = Settings::builder(&input)
            .output_dir(tmp.path().join("out"))
            .working_dir(tmp.path().join("work"))
            .build()
            .unwrap();

        let to_working = Rule::builder("stage-1")
            .source_dir(DirName::Input)
            .matcher(ExtensionMatcher::new(["step1"]))
            .path_calc(WithExtension::new(DirName::Working, "step2"))
            .transform(Copy)
            .build()
            .unwrap();

        let to_output = Rule::builder("stage-2")
            .source_dir(DirName::Working)
            .matcher(ExtensionMatcher::new(["step2"]))
            .path_calc(WithExtension::new(DirName::Output, "final"))
            .transform(Copy)
            .build()
            .unwrap();

        let engine = Engine::new(settings, vec![to_working, to_output]);
        let cancel = AtomicBool::new(false);
        let report = engine.run(&cancel).unwrap();

        assert!(tmp.path().join("out").join("a.final").exists());
        assert_eq!(report.processed.len(), 2);
    }

    #[test]
    fn orphaned_output_is_removed_when_source_disappears() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("content");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("a.md"), b"hello").unwrap();

        let settings = Settings::builder(&input)
            .output_dir(tmp.path().join("out"))
            .working_dir(tmp.path().join("work"))
            .build()
            .unwrap();

        let rule = || {
            Rule::builder("copy-md")
                .source_dir(DirName::Input)
                .matcher(ExtensionMatcher::new(["md"]))
                .path_calc(WithExtension::new(DirName::Output, "md"))
                .transform(Copy)
                .build()
                .unwrap()
        };

        let cancel = AtomicBool::new(false);
        Engine::new(settings.clone(), vec![rule()]).run(&cancel).unwrap();
        assert!(tmp.path().join("out").join("a.md").exists());

        fs::remove_file(input.join("a.md")).unwrap();
        let report = Engine::new(settings, vec![rule()]).run(&cancel).unwrap();
        assert_eq!(report.orphans_removed, vec![tmp.path().join("out").join("a.md")]);
        assert!(!tmp.path().join("out").join("a.md").exists());
    }

    #[test]
    fn drop_rule_records_file_without_producing_output() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("content");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join(".DS_Store"), b"junk").unwrap();

        let settings = Settings::builder(&input)
            .output_dir(tmp.path().join("out"))
            .working_dir(tmp.path().join("work"))
            .build()
            .unwrap();

        let drop_rule = Rule::builder("drop-dotfiles")
            .source_dir(DirName::Input)
            .matcher(crate::matcher::RegexMatcher::new(r"\..+").unwrap())
            .build()
            .unwrap();

        let engine = Engine::new(settings, vec![drop_rule]);
        let cancel = AtomicBool::new(false);
        let report = engine.run(&cancel).unwrap();

        assert_eq!(report.dropped, vec![input.join(".DS_Store")]);
        assert!(report.processed.is_empty());
        assert!(!tmp.path().join("out").exists() || fs::read_dir(tmp.path().join("out")).unwrap().next().is_none());
    }

    #[test]
    fn purge_dirs_wipes_output_before_run() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("content");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("a.md"), b"hello").unwrap();

        let out = tmp.path().join("out");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("stale.leftover"), b"old").unwrap();

        let settings = Settings::builder(&input)
            .output_dir(&out)
            .working_dir(tmp.path().join("work"))
            .purge_dirs(true)
            .build()
            .unwrap();

        let rule = Rule::builder("copy-md")
            .source_dir(DirName::Input)
            .matcher(ExtensionMatcher::new(["md"]))
            .path_calc(WithExtension::new(DirName::Output, "md"))
            .transform(Copy)
            .build()
            .unwrap();

        let engine = Engine::new(settings, vec![rule]);
        let cancel = AtomicBool::new(false);
        engine.run(&cancel).unwrap();

        assert!(!out.join("stale.leftover").exists());
        assert!(out.join("a.md").exists());
    }
}
