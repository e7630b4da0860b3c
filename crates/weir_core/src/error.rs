//! Error taxonomy for the pipeline engine (see spec §7).

use std::path::PathBuf;

use thiserror::Error;

/// An error raised by a [`crate::transform::Transform`]. Transforms may wrap
/// arbitrary external failures (a missing binary, a parse error, an I/O
/// fault), so the engine only requires `std::error::Error`.
pub type TransformError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from constructing or evaluating a [`crate::rule::Rule`].
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid regex pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("path calculator produced `{0}`, which lies outside input_dir, output_dir, and working_dir")]
    PathOutsideDirs(PathBuf),

    #[error("transform for `{input}` did not produce declared output `{output}`")]
    MissingDeclaredOutput { input: PathBuf, output: PathBuf },

    #[error("rule `{0}` is missing its {1}")]
    Incomplete(String, &'static str),
}

/// Errors from the custody store (see spec §4.2, §7).
#[derive(Debug, Error)]
pub enum CustodyError {
    #[error("failed to read cache file `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse cache file `{0}`")]
    Parse(PathBuf, #[source] serde_json::Error),

    #[error("failed to write cache file `{0}`")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("path `{0}` does not lie under input_dir, output_dir, or working_dir")]
    UnknownPath(PathBuf),

    #[error("failed to hash `{0}`")]
    Hash(PathBuf, #[source] std::io::Error),
}

/// Top-level errors surfaced by the [`crate::engine::Engine`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Custody(#[from] CustodyError),

    #[error("transform `{transform}` failed while processing `{input}`")]
    Transform {
        transform: String,
        input: PathBuf,
        #[source]
        source: TransformError,
    },

    #[error("working-directory fixpoint did not converge after {0} passes")]
    Cycle(usize),

    #[error("rule `{rule}` re-produced `{path}` more than {limit} times; aborting to avoid an infinite loop")]
    Loop {
        rule: String,
        path: PathBuf,
        limit: usize,
    },

    #[error("build cancelled")]
    Cancelled,

    #[error("I/O error during `{context}`")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}
