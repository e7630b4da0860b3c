//! The units the custody store keeps records of (spec §4.2).

use std::path::Path;
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};

use crate::error::CustodyError;

/// Content metadata for a single path. `hash` is the authoritative
/// freshness signal; `m_time` and `len` back a cheap short-circuit so
/// `refresh_needed` can skip re-hashing a file whose modification time and
/// size are unchanged from the last recorded run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathMeta {
    pub hash: String,
    pub len: u64,
    /// Seconds since the Unix epoch, as reported by the filesystem. `None`
    /// if the platform or filesystem couldn't report a modification time.
    pub m_time: Option<f64>,
}

/// A recorded match set for a glob-style dependency, e.g. "every `.py`
/// file under `working_dir`". Used by transforms that depend on a set of
/// files rather than a single one (spec's `glob_manifest` keys).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GlobManifestMeta {
    pub matched: Vec<String>,
}

/// One record in the custody store: either a file's content hash, a
/// recorded glob match set, or an opaque record for a non-filesystem
/// dependency (see [`crate::custody::CustodyStore::register_kind`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CustodyEntry {
    Path(PathMeta),
    GlobManifest(GlobManifestMeta),
    Custom { kind: String, data: serde_json::Value },
}

impl CustodyEntry {
    pub fn as_path_meta(&self) -> Option<&PathMeta> {
        match self {
            CustodyEntry::Path(meta) => Some(meta),
            _ => None,
        }
    }

    pub fn custom_kind(&self) -> Option<&str> {
        match self {
            CustodyEntry::Custom { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

/// Hash a file's contents with blake3, hex-encoded for storage, alongside
/// its modification time and size for the staleness short-circuit.
pub fn hash_file(path: &Path) -> Result<PathMeta, CustodyError> {
    let bytes = std::fs::read(path).map_err(|e| CustodyError::Hash(path.to_path_buf(), e))?;
    let hash = blake3::hash(&bytes);
    let m_time = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs_f64());
    Ok(PathMeta { hash: hex::encode(hash.as_bytes()), len: bytes.len() as u64, m_time })
}
