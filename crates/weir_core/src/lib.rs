//! Core infrastructure for rule-driven file-processing pipelines: matchers,
//! path calculators, transforms, and a content-addressed custody store that
//! together drive incremental rebuilds over three named directories.

pub mod custody;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod path;
pub mod path_calc;
pub mod rule;
pub mod settings;
pub mod transform;
pub mod witness;

pub use custody::{CustodyEntry, CustodyStore, LoadOutcome, RefreshNeeded, StalenessReason};
pub use engine::{BuildReport, Engine};
pub use error::{CustodyError, EngineError, RuleError, TransformError};
pub use matcher::{And, Any, ExtensionMatcher, Matcher, Not, Or, RegexFlags, RegexMatcher, WithinDir};
pub use path::{ContextDirs, DirName};
pub use path_calc::{DirRelative, PathCalc, Verbatim, WebIndex, WithExtension};
pub use rule::{PathCalcOrStop, Rule, RuleBuilder, RuleOutcome};
pub use settings::{ErrorPolicy, Settings, SettingsBuilder};
pub use transform::{Copy, FnTransform, Outputs, Source, SourceRef, Transform, TransformOutcome};
pub use witness::{MatchWitness, RegexCapture};
