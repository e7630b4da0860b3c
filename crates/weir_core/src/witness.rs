//! `MatchWitness`: the payload a matcher returns on success (spec §3, §4.3).

use std::any::Any;
use std::sync::Arc;

use rustc_hash::FxHashMap;

/// Named captures pulled out of a successful regex match. `stem` and `ext`
/// are the two names path calculators look for when swapping extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegexCapture {
    pub full: String,
    pub named: FxHashMap<String, String>,
}

impl RegexCapture {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }

    pub fn stem(&self) -> Option<&str> {
        self.get("stem")
    }

    pub fn ext(&self) -> Option<&str> {
        self.get("ext")
    }
}

/// The value a matcher returns. Its concrete shape is opaque to the engine;
/// it is forwarded unmodified to the rule's path calculators.
#[derive(Clone)]
pub enum MatchWitness {
    /// No match.
    None,
    /// No payload carried, e.g. the result of [`crate::matcher::not`].
    Unit,
    /// A regex matcher's captures.
    Regex(Arc<RegexCapture>),
    /// A user-defined witness, type-erased.
    Custom(Arc<dyn Any + Send + Sync>),
}

impl MatchWitness {
    pub fn is_match(&self) -> bool {
        !matches!(self, MatchWitness::None)
    }

    /// Borrow the regex captures, if this witness came from a regex matcher.
    pub fn as_regex(&self) -> Option<&RegexCapture> {
        match self {
            MatchWitness::Regex(caps) => Some(caps),
            _ => None,
        }
    }

    /// Downcast a custom witness to a concrete type.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            MatchWitness::Custom(any) => any.downcast_ref::<T>(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_not_a_match() {
        assert!(!MatchWitness::None.is_match());
        assert!(MatchWitness::Unit.is_match());
    }

    #[test]
    fn regex_capture_lookup() {
        let mut named = FxHashMap::default();
        named.insert("stem".to_string(), "post".to_string());
        named.insert("ext".to_string(), "md".to_string());
        let cap = RegexCapture { full: "post.md".into(), named };
        assert_eq!(cap.stem(), Some("post"));
        assert_eq!(cap.ext(), Some("md"));
        assert_eq!(cap.get("missing"), None);
    }

    #[test]
    fn custom_witness_downcasts() {
        let w = MatchWitness::Custom(Arc::new(42_i32));
        assert_eq!(w.downcast_ref::<i32>(), Some(&42));
        assert_eq!(w.downcast_ref::<String>(), None);
    }
}
