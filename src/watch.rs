//! Watches `input_dir` and `working_dir` for changes and reruns the engine,
//! debouncing bursts of filesystem events into a single rebuild.

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::time::Duration;

use anyhow::Result;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use weir_core::Engine;

use crate::log;

const DEBOUNCE: Duration = Duration::from_millis(200);

/// What kind of filesystem change triggered a rebuild, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeKind {
    Created,
    Modified,
    Removed,
    Other,
}

fn classify_change(kind: &EventKind) -> ChangeKind {
    match kind {
        EventKind::Create(_) => ChangeKind::Created,
        EventKind::Modify(_) => ChangeKind::Modified,
        EventKind::Remove(_) => ChangeKind::Removed,
        _ => ChangeKind::Other,
    }
}

fn rebuild_reason(events: &[Event]) -> String {
    let mut created = 0;
    let mut modified = 0;
    let mut removed = 0;
    let mut other = 0;
    for event in events {
        match classify_change(&event.kind) {
            ChangeKind::Created => created += 1,
            ChangeKind::Modified => modified += 1,
            ChangeKind::Removed => removed += 1,
            ChangeKind::Other => other += 1,
        }
    }
    let mut parts = Vec::new();
    if created > 0 {
        parts.push(format!("{created} created"));
    }
    if modified > 0 {
        parts.push(format!("{modified} modified"));
    }
    if removed > 0 {
        parts.push(format!("{removed} removed"));
    }
    if other > 0 {
        parts.push(format!("{other} other"));
    }
    if parts.is_empty() { "filesystem change".to_string() } else { parts.join(", ") }
}

/// Watch `input_dir` for changes, rebuilding via `engine` each time,
/// debouncing rapid bursts into one rebuild. Runs until `cancel` is set.
pub fn watch(engine: &Engine, input_dir: &Path, cancel: &AtomicBool) -> Result<()> {
    let (tx, rx) = channel::<notify::Result<Event>>();
    let mut watcher = notify::recommended_watcher(tx)?;
    watcher.watch(input_dir, RecursiveMode::Recursive)?;

    log!("watch"; "watching {} for changes", input_dir.display());

    let mut pending: Vec<Event> = Vec::new();
    loop {
        if cancel.load(std::sync::atomic::Ordering::SeqCst) {
            return Ok(());
        }

        match rx.recv_timeout(DEBOUNCE) {
            Ok(Ok(event)) => {
                pending.push(event);
                continue;
            }
            Ok(Err(e)) => {
                log!("error"; "watch error: {e}");
                continue;
            }
            Err(RecvTimeoutError::Timeout) => {
                if pending.is_empty() {
                    continue;
                }
            }
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        }

        let reason = rebuild_reason(&pending);
        pending.clear();
        log!("watch"; "rebuilding ({reason})");

        match engine.run(cancel) {
            Ok(report) => {
                log!("watch"; "done: {} processed, {} skipped", report.processed.len(), report.skipped.len());
            }
            Err(e) => log!("error"; "rebuild failed: {e}"),
        }
    }
}
