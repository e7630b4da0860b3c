//! Rules tie a matcher, an ordered list of path calculators, and a
//! transform together and implement the per-file evaluation algorithm
//! (spec §4.6).

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::custody::{CustodyStore, RefreshNeeded};
use crate::error::{EngineError, RuleError};
use crate::matcher::{Matcher, WithinDir};
use crate::path::{ContextDirs, DirName};
use crate::path_calc::PathCalc;
use crate::transform::{Source, SourceRef, Transform};

/// One element of a rule's path-calculator sequence. A `Stop` sentinel
/// does not itself compute a destination; its position determines the
/// rule's halt behavior (see [`Rule::apply`]).
pub enum PathCalcOrStop {
    Calc(Arc<dyn PathCalc>),
    Stop,
}

/// What happened when a rule was applied to a path.
pub enum RuleOutcome {
    /// The matcher did not match; the rule has nothing to say about this
    /// path.
    NoMatch,
    /// The matcher matched, but the rule's path-calculator sequence was
    /// empty (or consisted entirely of stop sentinels): the file is
    /// considered handled with no outputs produced.
    Dropped,
    /// The matcher matched but the custody store judged every declared
    /// output fresh; the transform did not run.
    Skipped { outputs: Vec<PathBuf> },
    /// The transform ran and (re)produced the listed outputs.
    Processed { outputs: Vec<PathBuf>, halt: bool },
}

/// A single rule: `if matcher matches, compute a destination for every
/// path calculator, and run transform unless the custody store says every
/// output is still fresh`.
pub struct Rule {
    name: String,
    matcher: Arc<dyn Matcher>,
    path_calcs: Vec<PathCalcOrStop>,
    transform: Option<Arc<dyn Transform>>,
}

impl Rule {
    pub fn builder(name: impl Into<String>) -> RuleBuilder {
        RuleBuilder {
            name: name.into(),
            source_dir: None,
            matcher: None,
            path_calcs: Vec::new(),
            transform: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply this rule to an absolute path, implementing spec §4.6:
    /// 1. Run the matcher against the full set of named directories; on no
    ///    match, return `NoMatch`. Directory scoping, if any, is the
    ///    matcher's own decision (see [`WithinDir`]).
    /// 2. Partition the path-calc sequence into calculators and a halt
    ///    flag; an all-stop or empty sequence drops the file.
    /// 3. Run every calculator to get the full output list, deduplicated,
    ///    rejecting any destination outside the three named directories.
    /// 4. Ask the custody store whether a refresh is needed across all
    ///    declared outputs; if not, record a skip and return.
    /// 5. Run the transform.
    /// 6. Verify every computed destination exists on disk afterward.
    /// 7. Record the step in the custody store and return.
    pub fn apply(
        &self,
        abs_path: &std::path::Path,
        dirs: &ContextDirs,
        custody: &mut CustodyStore,
    ) -> Result<RuleOutcome, EngineError> {
        let witness = self.matcher.test(dirs, abs_path);
        if !witness.is_match() {
            return Ok(RuleOutcome::NoMatch);
        }

        let (_, rel_path) = dirs.classify(abs_path).ok_or_else(|| {
            EngineError::Configuration(format!(
                "{} matched rule `{}` but is not under input_dir, output_dir, or working_dir",
                abs_path.display(),
                self.name
            ))
        })?;
        let rel_path = rel_path.as_path();

        let halt = self.path_calcs.is_empty()
            || !self.path_calcs.iter().any(|c| matches!(c, PathCalcOrStop::Calc(_)))
            || matches!(self.path_calcs.last(), Some(PathCalcOrStop::Stop));

        let calcs: Vec<&Arc<dyn PathCalc>> = self
            .path_calcs
            .iter()
            .filter_map(|c| match c {
                PathCalcOrStop::Calc(calc) => Some(calc),
                PathCalcOrStop::Stop => None,
            })
            .collect();

        if calcs.is_empty() {
            return Ok(RuleOutcome::Dropped);
        }

        let mut outputs = Vec::with_capacity(calcs.len());
        let mut seen = HashSet::new();
        for calc in &calcs {
            let dest_rel = calc.compute(rel_path, &witness);
            let dest_abs = dirs.root(calc.dest_dir()).join(dest_rel);
            if dirs.classify(&dest_abs).is_none() {
                return Err(RuleError::PathOutsideDirs(dest_abs).into());
            }
            if seen.insert(dest_abs.clone()) {
                outputs.push(dest_abs);
            }
        }

        let default_sources = vec![Source::Path(abs_path.to_path_buf())];

        // A prior run may have declared extra sources (e.g. a template) we
        // have no way of knowing about until the transform runs again; probe
        // freshness against whatever was recorded for these outputs last
        // time, falling back to just the matched input on a first run.
        let recorded_sources = custody.recorded_sources(dirs, &outputs);
        let probe_sources = if recorded_sources.is_empty() { default_sources.clone() } else { recorded_sources };

        match custody.refresh_needed(dirs, &probe_sources, &outputs)? {
            RefreshNeeded::Fresh => {
                custody.skip_step(dirs, &probe_sources, &outputs)?;
                return Ok(RuleOutcome::Skipped { outputs });
            }
            RefreshNeeded::Stale(_reason) => {}
        }

        let transform = self.transform.as_ref().ok_or_else(|| {
            EngineError::Configuration(format!("rule `{}` has path calculators but no transform", self.name))
        })?;

        let source = SourceRef { abs_path, rel_path, witness: &witness };
        let outcome = transform.run(source, &outputs).map_err(|source| EngineError::Transform {
            transform: self.name.clone(),
            input: abs_path.to_path_buf(),
            source,
        })?;

        for dest in &outputs {
            if !dest.exists() {
                return Err(RuleError::MissingDeclaredOutput { input: abs_path.to_path_buf(), output: dest.clone() }
                    .into());
            }
        }

        let final_sources = outcome.sources.unwrap_or(default_sources);
        let final_outputs: Vec<PathBuf> = outcome.outputs.map(|o| o.into_vec()).unwrap_or_else(|| outputs.clone());

        custody.add_step(dirs, &final_sources, &final_outputs)?;

        Ok(RuleOutcome::Processed { outputs: final_outputs, halt })
    }
}

/// Builds a [`Rule`], requiring a matcher before `build()` will succeed.
/// A rule with no path calculators (or only stop sentinels) is a drop
/// rule and needs no transform.
pub struct RuleBuilder {
    name: String,
    source_dir: Option<DirName>,
    matcher: Option<Arc<dyn Matcher>>,
    path_calcs: Vec<PathCalcOrStop>,
    transform: Option<Arc<dyn Transform>>,
}

impl RuleBuilder {
    /// Restrict this rule's matcher to paths under `dir`. Implemented by
    /// wrapping whatever matcher is configured in [`WithinDir`] at
    /// `build()` time — directory scoping lives in the matcher, not in a
    /// separate field the engine pre-filters on.
    pub fn source_dir(mut self, dir: DirName) -> Self {
        self.source_dir = Some(dir);
        self
    }

    pub fn matcher(mut self, matcher: impl Matcher + 'static) -> Self {
        self.matcher = Some(Arc::new(matcher));
        self
    }

    /// Append a path calculator to the sequence.
    pub fn path_calc(mut self, calc: impl PathCalc + 'static) -> Self {
        self.path_calcs.push(PathCalcOrStop::Calc(Arc::new(calc)));
        self
    }

    /// Append a stop sentinel. A trailing stop halts the rule (its
    /// outputs are not re-enqueued into the working-directory fixpoint).
    pub fn stop(mut self) -> Self {
        self.path_calcs.push(PathCalcOrStop::Stop);
        self
    }

    pub fn transform(mut self, transform: impl Transform + 'static) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }

    pub fn build(self) -> Result<Rule, RuleError> {
        let matcher = self.matcher.ok_or_else(|| RuleError::Incomplete(self.name.clone(), "matcher"))?;
        let matcher: Arc<dyn Matcher> = match self.source_dir {
            Some(dir) => Arc::new(WithinDir::new(dir, matcher)),
            None => matcher,
        };
        Ok(Rule { name: self.name.clone(), matcher, path_calcs: self.path_calcs, transform: self.transform })
    }
}
