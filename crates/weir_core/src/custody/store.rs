//! The custody store: a content-addressed record of which inputs produced
//! which outputs, used to skip transforms whose inputs have not changed
//! since the last run (spec §4.2, §4.6, §4.7 orphan sweep).

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::entry::{hash_file, CustodyEntry, PathMeta};
use crate::error::CustodyError;
use crate::path::ContextDirs;
use crate::transform::Source;

/// Cheap pre-check before falling back to a full content hash: if a path's
/// modification time and size match what was last recorded, treat it as
/// unchanged without reading its contents (spec §4.2 step 3b). Returns
/// `false` (forcing the hash path) whenever `m_time` wasn't recorded or the
/// path can't be stat'd, never claiming freshness it can't back up.
fn stat_matches_recorded(path: &Path, prior: &PathMeta) -> bool {
    let Some(prior_m_time) = prior.m_time else { return false };
    let Ok(metadata) = std::fs::metadata(path) else { return false };
    if metadata.len() != prior.len {
        return false;
    }
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs_f64())
        == Some(prior_m_time)
}

/// Why [`CustodyStore::refresh_needed`] judged an output stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StalenessReason {
    /// No record exists for this source from any prior run.
    NoPriorRecord,
    /// A source's content hash no longer matches the recorded one.
    HashChanged,
    /// A declared output no longer exists on disk.
    OutputMissing,
    /// An output's on-disk content no longer matches the hash recorded the
    /// last time it was produced — it was modified by something other than
    /// this rule (spec §4.2 step 4).
    OutputModifiedExternally,
    /// A custom-kind entry has no registered staleness checker; treated
    /// conservatively as stale.
    NoCheckerRegistered(String),
    /// A registered checker inspected the stored entry and reported it stale.
    CheckerReportedStale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshNeeded {
    Fresh,
    Stale(StalenessReason),
}

/// What happened when loading a cache file from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Loaded an existing, valid cache file whose parameters matched.
    Found,
    /// No cache file existed; starting from an empty store.
    Missing,
    /// A cache file existed but could not be parsed; starting from an
    /// empty store rather than failing the build.
    Corrupt,
    /// A cache file existed and parsed, but its recorded parameters (the
    /// resolved directories, the engine version) no longer match this run;
    /// discarded in favor of a full rebuild (spec §4.1).
    ParametersChanged,
}

/// An output-artifact key's dependency edges: which source keys
/// contributed to it, and — for each — the full sibling output-key list
/// that source participates in producing (supports fan-out).
type GraphEntry = BTreeMap<String, Vec<String>>;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    parameters: BTreeMap<String, String>,
    meta: BTreeMap<String, CustodyEntry>,
    graph: BTreeMap<String, GraphEntry>,
}

type Checker = Arc<dyn Fn(&CustodyEntry) -> bool + Send + Sync>;

/// Tracks, across a single build, which source keys produced which output
/// keys, and whether declared dependencies (file or custom-kind) have
/// changed since the last build that was persisted to disk.
pub struct CustodyStore {
    /// Entries carried over or freshly computed this run; persisted on save.
    /// Keyed by artifact key regardless of whether it is a source or an
    /// output — a path can be both across different rules.
    meta: BTreeMap<String, CustodyEntry>,
    /// A read-only snapshot of last run's entries, used to compare hashes.
    previous_meta: BTreeMap<String, CustodyEntry>,
    /// output key -> { source key -> sibling output keys }, accumulated
    /// this run.
    graph: BTreeMap<String, GraphEntry>,
    /// Same shape, as of the last persisted run. Used only to compute
    /// orphans at the end of a run.
    previous_graph: BTreeMap<String, GraphEntry>,
    checkers: FxHashMap<String, Checker>,
}

impl CustodyStore {
    /// A store with no prior history, as if this were the first build.
    pub fn new() -> Self {
        Self {
            meta: BTreeMap::new(),
            previous_meta: BTreeMap::new(),
            graph: BTreeMap::new(),
            previous_graph: BTreeMap::new(),
            checkers: FxHashMap::default(),
        }
    }

    /// Load a cache file written by a previous [`Self::save`]. `parameters`
    /// is this run's resolved directories and engine version; a mismatch
    /// against what is recorded in the cache file forces a full rebuild
    /// rather than trusting stale records (spec §4.1). Never fails the
    /// build on a corrupt or missing file; check [`LoadOutcome`] to decide
    /// whether to log a warning. `path` is `None` when caching is disabled
    /// (spec §4.1): every file is then judged stale, and [`Self::save`]
    /// becomes a no-op.
    pub fn load(path: Option<&Path>, parameters: &BTreeMap<String, String>) -> Result<(Self, LoadOutcome), CustodyError> {
        let Some(path) = path else {
            return Ok((Self::new(), LoadOutcome::Missing));
        };

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok((Self::new(), LoadOutcome::Missing));
            }
            Err(e) => return Err(CustodyError::Io(path.to_path_buf(), e)),
        };

        let cache: CacheFile = match serde_json::from_slice(&bytes) {
            Ok(cache) => cache,
            Err(_) => return Ok((Self::new(), LoadOutcome::Corrupt)),
        };

        if &cache.parameters != parameters {
            return Ok((Self::new(), LoadOutcome::ParametersChanged));
        }

        Ok((
            Self {
                previous_meta: cache.meta,
                previous_graph: cache.graph,
                meta: BTreeMap::new(),
                graph: BTreeMap::new(),
                checkers: FxHashMap::default(),
            },
            LoadOutcome::Found,
        ))
    }

    /// Persist this run's meta and dependency graph, to be loaded by the
    /// next run via [`Self::load`]. Written to a sibling temp file and
    /// renamed over `path` so a crash or disk-full mid-write never leaves a
    /// partially written file where a previously valid cache was (spec
    /// §4.2's write-then-rename requirement). A no-op when `path` is
    /// `None` (caching disabled).
    pub fn save(&self, path: Option<&Path>, parameters: &BTreeMap<String, String>) -> Result<(), CustodyError> {
        let Some(path) = path else { return Ok(()) };
        let cache = CacheFile {
            parameters: parameters.clone(),
            meta: self.meta.clone(),
            graph: self.graph.clone(),
        };
        let json = serde_json::to_vec_pretty(&cache)
            .map_err(|e| CustodyError::Write(path.to_path_buf(), std::io::Error::other(e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CustodyError::Write(path.to_path_buf(), e))?;
        }

        let tmp_path = path.with_extension(match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{ext}.tmp"),
            None => "tmp".to_string(),
        });
        std::fs::write(&tmp_path, json).map_err(|e| CustodyError::Write(path.to_path_buf(), e))?;
        std::fs::rename(&tmp_path, path).map_err(|e| CustodyError::Write(path.to_path_buf(), e))
    }

    /// Register a staleness predicate for a custom entry kind (see
    /// [`CustodyEntry::Custom`]). The predicate receives the stored entry
    /// and returns `true` if it is still fresh.
    pub fn register_kind(&mut self, kind: impl Into<String>, checker: impl Fn(&CustodyEntry) -> bool + Send + Sync + 'static) {
        self.checkers.insert(kind.into(), Arc::new(checker));
    }

    fn source_key(&self, dirs: &ContextDirs, source: &Source) -> Result<String, CustodyError> {
        match source {
            Source::Path(p) => dirs.to_key(p).ok_or_else(|| CustodyError::UnknownPath(p.clone())),
            Source::Custom { key, .. } => Ok(key.clone()),
        }
    }

    /// Decide whether a rule's transform needs to run, implementing spec
    /// §4.2's staleness algorithm: every declared output must exist and
    /// match its recorded hash, and every declared source must have a
    /// prior record that still matches.
    pub fn refresh_needed(
        &self,
        dirs: &ContextDirs,
        sources: &[Source],
        outputs: &[PathBuf],
    ) -> Result<RefreshNeeded, CustodyError> {
        for output in outputs {
            if !output.exists() {
                return Ok(RefreshNeeded::Stale(StalenessReason::OutputMissing));
            }
        }

        for source in sources {
            match source {
                Source::Path(p) => {
                    let key = dirs.to_key(p).ok_or_else(|| CustodyError::UnknownPath(p.clone()))?;
                    match self.previous_meta.get(&key) {
                        None => return Ok(RefreshNeeded::Stale(StalenessReason::NoPriorRecord)),
                        Some(CustodyEntry::Path(prior)) => {
                            if !stat_matches_recorded(p, prior) {
                                let current = hash_file(p)?;
                                if current.hash != prior.hash {
                                    return Ok(RefreshNeeded::Stale(StalenessReason::HashChanged));
                                }
                            }
                        }
                        Some(_) => return Ok(RefreshNeeded::Stale(StalenessReason::NoPriorRecord)),
                    }
                }
                Source::Custom { key, kind, .. } => match self.previous_meta.get(key) {
                    None => return Ok(RefreshNeeded::Stale(StalenessReason::NoPriorRecord)),
                    Some(entry) => match self.checkers.get(kind) {
                        Some(checker) if checker(entry) => {}
                        Some(_) => return Ok(RefreshNeeded::Stale(StalenessReason::CheckerReportedStale)),
                        None => return Ok(RefreshNeeded::Stale(StalenessReason::NoCheckerRegistered(kind.clone()))),
                    },
                },
            }
        }

        for output in outputs {
            let key = dirs.to_key(output).ok_or_else(|| CustodyError::UnknownPath(output.clone()))?;
            if let Some(CustodyEntry::Path(prior)) = self.previous_meta.get(&key) {
                if !stat_matches_recorded(output, prior) {
                    let current = hash_file(output)?;
                    if current.hash != prior.hash {
                        return Ok(RefreshNeeded::Stale(StalenessReason::OutputModifiedExternally));
                    }
                }
            }
        }

        Ok(RefreshNeeded::Fresh)
    }

    /// Record that a transform ran and produced `outputs` from `sources`.
    pub fn add_step(&mut self, dirs: &ContextDirs, sources: &[Source], outputs: &[PathBuf]) -> Result<(), CustodyError> {
        let output_keys: Vec<String> = outputs
            .iter()
            .map(|p| dirs.to_key(p).ok_or_else(|| CustodyError::UnknownPath(p.clone())))
            .collect::<Result<_, _>>()?;
        for (output, key) in outputs.iter().zip(&output_keys) {
            self.meta.insert(key.clone(), CustodyEntry::Path(hash_file(output)?));
        }

        let mut source_keys = Vec::with_capacity(sources.len());
        for source in sources {
            let key = self.source_key(dirs, source)?;
            match source {
                Source::Path(p) => self.meta.insert(key.clone(), CustodyEntry::Path(hash_file(p)?)),
                Source::Custom { kind, data, .. } => {
                    self.meta.insert(key.clone(), CustodyEntry::Custom { kind: kind.clone(), data: data.clone() })
                }
            };
            source_keys.push(key);
        }

        for output_key in &output_keys {
            let entry = self.graph.entry(output_key.clone()).or_default();
            for source_key in &source_keys {
                entry.insert(source_key.clone(), output_keys.clone());
            }
        }
        Ok(())
    }

    /// Record that a rule's outputs were judged fresh and the transform did
    /// not run, carrying forward the previous run's meta and graph edges so
    /// the outputs are not later swept as orphans.
    pub fn skip_step(&mut self, dirs: &ContextDirs, sources: &[Source], outputs: &[PathBuf]) -> Result<(), CustodyError> {
        let output_keys: Vec<String> = outputs
            .iter()
            .map(|p| dirs.to_key(p).ok_or_else(|| CustodyError::UnknownPath(p.clone())))
            .collect::<Result<_, _>>()?;
        for key in &output_keys {
            if let Some(entry) = self.previous_meta.get(key) {
                self.meta.insert(key.clone(), entry.clone());
            }
        }

        let mut source_keys = Vec::with_capacity(sources.len());
        for source in sources {
            let key = self.source_key(dirs, source)?;
            if let Some(entry) = self.previous_meta.get(&key) {
                self.meta.insert(key.clone(), entry.clone());
            }
            source_keys.push(key);
        }

        for output_key in &output_keys {
            let entry = self.graph.entry(output_key.clone()).or_default();
            for source_key in &source_keys {
                let carried = self
                    .previous_graph
                    .get(output_key)
                    .and_then(|m| m.get(source_key))
                    .cloned()
                    .unwrap_or_else(|| output_keys.clone());
                entry.insert(source_key.clone(), carried);
            }
        }
        Ok(())
    }

    /// Reconstruct the source list a prior run recorded for `outputs`
    /// (union across all of them), so a rule can probe freshness against
    /// sources a transform declared on a previous run (e.g. a template)
    /// without having invoked the transform yet this run. Empty if no
    /// prior run touched any of `outputs`.
    pub fn recorded_sources(&self, dirs: &ContextDirs, outputs: &[PathBuf]) -> Vec<Source> {
        let mut keys = Vec::new();
        let mut seen = HashSet::new();
        for output in outputs {
            let Some(output_key) = dirs.to_key(output) else { continue };
            let Some(edges) = self.previous_graph.get(&output_key) else { continue };
            for source_key in edges.keys() {
                if seen.insert(source_key.clone()) {
                    keys.push(source_key.clone());
                }
            }
        }

        keys.into_iter()
            .filter_map(|key| match self.previous_meta.get(&key)? {
                CustodyEntry::Path(_) => dirs.from_key(&key).map(Source::Path),
                CustodyEntry::Custom { kind, data } => {
                    Some(Source::Custom { key: key.clone(), kind: kind.clone(), data: data.clone() })
                }
                CustodyEntry::GlobManifest(_) => None,
            })
            .collect()
    }

    /// Declare a non-filesystem dependency under a custom kind, e.g. a
    /// fetched URL's ETag. Staleness is later decided by whatever checker
    /// was registered for `kind` via [`Self::register_kind`].
    pub fn declare_custom(&mut self, key: impl Into<String>, kind: impl Into<String>, data: serde_json::Value) {
        self.meta.insert(key.into(), CustodyEntry::Custom { kind: kind.into(), data });
    }

    /// Outputs (by artifact key) that existed in the previous run's graph
    /// but were not reproduced or carried forward this run, deleting them
    /// from disk and returning their absolute paths (spec §4.7).
    pub fn sweep_orphans(&self, dirs: &ContextDirs) -> Result<Vec<PathBuf>, CustodyError> {
        let current: HashSet<&str> = self.graph.keys().map(String::as_str).collect();
        let mut removed = Vec::new();

        for output_key in self.previous_graph.keys() {
            if current.contains(output_key.as_str()) {
                continue;
            }
            if let Some(abs) = dirs.from_key(output_key) {
                if abs.exists() {
                    std::fs::remove_file(&abs).map_err(|e| CustodyError::Io(abs.clone(), e))?;
                }
                removed.push(abs);
            }
        }
        Ok(removed)
    }
}

impl Default for CustodyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn dirs(root: &Path) -> ContextDirs {
        ContextDirs { input_dir: root.join("in"), output_dir: root.join("out"), working_dir: root.join("work") }
    }

    fn params() -> BTreeMap<String, String> {
        BTreeMap::from([("engine_version".to_string(), "test".to_string())])
    }

    #[test]
    fn fresh_store_reports_no_prior_record() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = dirs(tmp.path());
        fs::create_dir_all(&dirs.input_dir).unwrap();
        fs::create_dir_all(&dirs.output_dir).unwrap();
        let input = dirs.input_dir.join("a.txt");
        let output = dirs.output_dir.join("a.txt");
        fs::write(&input, b"x").unwrap();
        fs::write(&output, b"x").unwrap();

        let store = CustodyStore::new();
        assert_eq!(
            store.refresh_needed(&dirs, &[Source::Path(input)], &[output]).unwrap(),
            RefreshNeeded::Stale(StalenessReason::NoPriorRecord)
        );
    }

    #[test]
    fn unchanged_input_is_fresh_after_add_step_and_save_load() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = dirs(tmp.path());
        fs::create_dir_all(&dirs.input_dir).unwrap();
        fs::create_dir_all(&dirs.output_dir).unwrap();
        let input = dirs.input_dir.join("a.txt");
        let output = dirs.output_dir.join("a.txt");
        fs::write(&input, b"x").unwrap();
        fs::write(&output, b"x").unwrap();

        let mut store = CustodyStore::new();
        store.add_step(&dirs, &[Source::Path(input.clone())], &[output.clone()]).unwrap();
        let cache_path = tmp.path().join("cache.json");
        store.save(Some(&cache_path), &params()).unwrap();

        let (loaded, outcome) = CustodyStore::load(Some(&cache_path), &params()).unwrap();
        assert_eq!(outcome, LoadOutcome::Found);
        assert_eq!(
            loaded.refresh_needed(&dirs, &[Source::Path(input)], &[output]).unwrap(),
            RefreshNeeded::Fresh
        );
    }

    #[test]
    fn changed_input_is_stale() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = dirs(tmp.path());
        fs::create_dir_all(&dirs.input_dir).unwrap();
        fs::create_dir_all(&dirs.output_dir).unwrap();
        let input = dirs.input_dir.join("a.txt");
        let output = dirs.output_dir.join("a.txt");
        fs::write(&input, b"x").unwrap();
        fs::write(&output, b"x").unwrap();

        let mut store = CustodyStore::new();
        store.add_step(&dirs, &[Source::Path(input.clone())], &[output.clone()]).unwrap();

        fs::write(&input, b"y").unwrap();
        assert_eq!(
            store.refresh_needed(&dirs, &[Source::Path(input)], &[output]).unwrap(),
            RefreshNeeded::Stale(StalenessReason::HashChanged)
        );
    }

    #[test]
    fn missing_output_is_stale_even_if_input_unchanged() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = dirs(tmp.path());
        fs::create_dir_all(&dirs.input_dir).unwrap();
        fs::create_dir_all(&dirs.output_dir).unwrap();
        let input = dirs.input_dir.join("a.txt");
        let output = dirs.output_dir.join("a.txt");
        fs::write(&input, b"x").unwrap();
        fs::write(&output, b"x").unwrap();

        let mut store = CustodyStore::new();
        store.add_step(&dirs, &[Source::Path(input.clone())], &[output.clone()]).unwrap();
        fs::remove_file(&output).unwrap();

        assert_eq!(
            store.refresh_needed(&dirs, &[Source::Path(input)], &[output]).unwrap(),
            RefreshNeeded::Stale(StalenessReason::OutputMissing)
        );
    }

    #[test]
    fn externally_modified_output_is_stale() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = dirs(tmp.path());
        fs::create_dir_all(&dirs.input_dir).unwrap();
        fs::create_dir_all(&dirs.output_dir).unwrap();
        let input = dirs.input_dir.join("a.txt");
        let output = dirs.output_dir.join("a.txt");
        fs::write(&input, b"x").unwrap();
        fs::write(&output, b"x").unwrap();

        let mut store = CustodyStore::new();
        store.add_step(&dirs, &[Source::Path(input.clone())], &[output.clone()]).unwrap();

        fs::write(&output, b"tampered").unwrap();
        assert_eq!(
            store.refresh_needed(&dirs, &[Source::Path(input)], &[output]).unwrap(),
            RefreshNeeded::Stale(StalenessReason::OutputModifiedExternally)
        );
    }

    #[test]
    fn sweep_orphans_deletes_outputs_not_reproduced() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = dirs(tmp.path());
        fs::create_dir_all(&dirs.input_dir).unwrap();
        fs::create_dir_all(&dirs.output_dir).unwrap();
        let input = dirs.input_dir.join("a.txt");
        let output = dirs.output_dir.join("a.txt");
        fs::write(&input, b"x").unwrap();
        fs::write(&output, b"x").unwrap();

        let mut store = CustodyStore::new();
        store.add_step(&dirs, &[Source::Path(input.clone())], &[output.clone()]).unwrap();
        let cache_path = tmp.path().join("cache.json");
        store.save(Some(&cache_path), &params()).unwrap();

        fs::remove_file(&input).unwrap();
        let (empty_run, _) = CustodyStore::load(Some(&cache_path), &params()).unwrap();
        let removed = empty_run.sweep_orphans(&dirs).unwrap();
        assert_eq!(removed, vec![output.clone()]);
        assert!(!output.exists());
    }

    #[test]
    fn parameter_mismatch_forces_full_rebuild() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = dirs(tmp.path());
        fs::create_dir_all(&dirs.input_dir).unwrap();
        fs::create_dir_all(&dirs.output_dir).unwrap();
        let input = dirs.input_dir.join("a.txt");
        let output = dirs.output_dir.join("a.txt");
        fs::write(&input, b"x").unwrap();
        fs::write(&output, b"x").unwrap();

        let mut store = CustodyStore::new();
        store.add_step(&dirs, &[Source::Path(input)], &[output]).unwrap();
        let cache_path = tmp.path().join("cache.json");
        store.save(Some(&cache_path), &params()).unwrap();

        let other_params = BTreeMap::from([("engine_version".to_string(), "different".to_string())]);
        let (_loaded, outcome) = CustodyStore::load(Some(&cache_path), &other_params).unwrap();
        assert_eq!(outcome, LoadOutcome::ParametersChanged);
    }

    #[test]
    fn custom_kind_uses_registered_checker() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = dirs(tmp.path());
        fs::create_dir_all(&dirs.output_dir).unwrap();
        let output = dirs.output_dir.join("fetched.json");
        fs::write(&output, b"{}").unwrap();
        let input_key = dirs.to_key(&dirs.input_dir.join("feed.url")).unwrap();

        let mut store = CustodyStore::new();
        store.declare_custom(input_key.clone(), "url", serde_json::json!({"etag": "abc"}));
        let cache_path = tmp.path().join("cache.json");
        store.save(Some(&cache_path), &params()).unwrap();

        let source = Source::Custom { key: input_key, kind: "url".into(), data: serde_json::json!({}) };

        let (mut loaded, _) = CustodyStore::load(Some(&cache_path), &params()).unwrap();
        loaded.register_kind("url", |entry| entry.custom_kind().map(|k| k == "url").unwrap_or(false));
        assert_eq!(
            loaded.refresh_needed(&dirs, std::slice::from_ref(&source), &[output.clone()]).unwrap(),
            RefreshNeeded::Fresh
        );

        loaded.register_kind("url", |_entry| false);
        assert_eq!(
            loaded.refresh_needed(&dirs, std::slice::from_ref(&source), &[output]).unwrap(),
            RefreshNeeded::Stale(StalenessReason::CheckerReportedStale)
        );
    }

    #[test]
    fn custom_kind_without_checker_is_conservatively_stale() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = dirs(tmp.path());
        fs::create_dir_all(&dirs.output_dir).unwrap();
        let output = dirs.output_dir.join("fetched.json");
        fs::write(&output, b"{}").unwrap();
        let input_key = dirs.to_key(&dirs.input_dir.join("feed.url")).unwrap();

        let mut store = CustodyStore::new();
        store.declare_custom(input_key.clone(), "url", serde_json::json!({}));
        let cache_path = tmp.path().join("cache.json");
        store.save(Some(&cache_path), &params()).unwrap();

        let source = Source::Custom { key: input_key, kind: "url".into(), data: serde_json::json!({}) };
        let (loaded, _) = CustodyStore::load(Some(&cache_path), &params()).unwrap();
        assert_eq!(
            loaded.refresh_needed(&dirs, &[source], &[output]).unwrap(),
            RefreshNeeded::Stale(StalenessReason::NoCheckerRegistered("url".into()))
        );
    }
}
