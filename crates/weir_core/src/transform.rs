//! Transforms: the step that actually reads a source and writes one or
//! more declared outputs (spec §4.5).

use std::path::{Path, PathBuf};

use smallvec::SmallVec;

use crate::error::TransformError;
use crate::witness::MatchWitness;

/// A reference to a rule's matched source, as handed to a transform.
pub struct SourceRef<'a> {
    /// Absolute path to the source file.
    pub abs_path: &'a Path,
    /// Path relative to the source's own named directory.
    pub rel_path: &'a Path,
    pub witness: &'a MatchWitness,
}

/// Most transforms declare exactly one source or output, so the common
/// case needs no heap allocation.
pub type Outputs = SmallVec<[PathBuf; 1]>;

/// A custody-tracked dependency a transform declares explicitly, beyond
/// the file it was invoked on (e.g. a template, a fetched URL) — spec's
/// "explicit pair (sources, outputs)".
#[derive(Debug, Clone)]
pub enum Source {
    /// A file dependency, hashed like any other `path`-kind custody entry.
    Path(PathBuf),
    /// A non-filesystem dependency, checked via a registered custody kind
    /// (see [`crate::custody::CustodyStore::register_kind`]).
    Custom { key: String, kind: String, data: serde_json::Value },
}

/// What a transform did. `sources` and `outputs` default to `[input_path]`
/// and the declared output list respectively when left `None`; a
/// transform only needs to set them to override the defaults (fan-in via
/// extra sources, or a subset/superset of the declared outputs).
#[derive(Default)]
pub struct TransformOutcome {
    pub sources: Option<Vec<Source>>,
    pub outputs: Option<Outputs>,
}

impl TransformOutcome {
    /// Accept the default sources (`[input_path]`) and default outputs
    /// (the rule's computed output list). The common case.
    pub fn defaults() -> Self {
        Self::default()
    }

    /// Declare the outputs explicitly, keeping the default source.
    pub fn with_outputs(outputs: impl Into<Outputs>) -> Self {
        Self { sources: None, outputs: Some(outputs.into()) }
    }

    /// Declare both sources and outputs explicitly.
    pub fn with_sources_and_outputs(sources: Vec<Source>, outputs: impl Into<Outputs>) -> Self {
        Self { sources: Some(sources), outputs: Some(outputs.into()) }
    }
}

/// The user-supplied unit of work a [`crate::rule::Rule`] dispatches to once
/// a matcher succeeds and its path calculators have produced a list of
/// destinations.
pub trait Transform: Send + Sync {
    /// `outputs` is the full list computed by the rule's path calculators,
    /// in order, already deduplicated. Every path in `outputs` must exist
    /// on disk once this call returns (spec §6 calling convention),
    /// regardless of whether the returned [`TransformOutcome`] overrides
    /// the default output list for custody bookkeeping purposes.
    fn run(&self, source: SourceRef<'_>, outputs: &[PathBuf]) -> Result<TransformOutcome, TransformError>;
}

/// Copies the source byte-for-byte to every declared output.
pub struct Copy;

impl Transform for Copy {
    fn run(&self, source: SourceRef<'_>, outputs: &[PathBuf]) -> Result<TransformOutcome, TransformError> {
        for dest in outputs {
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(source.abs_path, dest)?;
        }
        Ok(TransformOutcome::defaults())
    }
}

/// Runs an arbitrary closure as a transform. Lets callers define one-off
/// transforms inline without naming a type.
pub struct FnTransform<F>(pub F)
where
    F: Fn(SourceRef<'_>, &[PathBuf]) -> Result<TransformOutcome, TransformError> + Send + Sync;

impl<F> Transform for FnTransform<F>
where
    F: Fn(SourceRef<'_>, &[PathBuf]) -> Result<TransformOutcome, TransformError> + Send + Sync,
{
    fn run(&self, source: SourceRef<'_>, outputs: &[PathBuf]) -> Result<TransformOutcome, TransformError> {
        (self.0)(source, outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::witness::MatchWitness;
    use std::fs;

    #[test]
    fn copy_writes_bytes_to_every_declared_output() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.txt");
        fs::write(&src, b"hello").unwrap();
        let dest1 = dir.path().join("out1").join("a.txt");
        let dest2 = dir.path().join("out2").join("a.txt");

        let outcome = Copy
            .run(
                SourceRef { abs_path: &src, rel_path: Path::new("a.txt"), witness: &MatchWitness::Unit },
                &[dest1.clone(), dest2.clone()],
            )
            .unwrap();

        assert!(outcome.outputs.is_none());
        assert_eq!(fs::read(&dest1).unwrap(), b"hello");
        assert_eq!(fs::read(&dest2).unwrap(), b"hello");
    }

    #[test]
    fn fn_transform_runs_closure() {
        let t = FnTransform(|_source, outputs: &[PathBuf]| Ok(TransformOutcome::with_outputs(outputs.to_vec())));
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.txt");
        fs::write(&src, b"x").unwrap();
        let dest = dir.path().join("b.txt");
        let outcome = t
            .run(
                SourceRef { abs_path: &src, rel_path: Path::new("a.txt"), witness: &MatchWitness::Unit },
                &[dest.clone()],
            )
            .unwrap();
        assert_eq!(outcome.outputs.unwrap().as_slice(), [dest]);
    }
}
