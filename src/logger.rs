//! Logging utilities with colored output and progress bars.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `ProgressBars` for displaying multiple progress bars simultaneously
//!
//! # Example
//!
//! ```ignore
//! // Simple logging
//! log!("build"; "processed {} files", count);
//!
//! // Progress bars for parallel tasks
//! let progress = ProgressBars::new(&[("input_dir", 100), ("working_dir", 50)]);
//! progress.inc(0);
//! progress.inc(1);
//! progress.finish();
//! ```

use colored::{ColoredString, Colorize};
use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType, size},
};
use std::{
    io::{Write, stdout},
    sync::{
        Mutex, OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
};

/// Cached terminal width (fetched once on first use)
static TERMINAL_WIDTH: OnceLock<u16> = OnceLock::new();

// ============================================================================
// Layout Constants
// ============================================================================
//
// Progress bar format: "[module] [████░░░░] 42/100"
//                       ^------^ ^-------^ ^----^
//                       prefix   bar       count

/// Length of brackets around module name: "[]"
const BRACKET_LEN: usize = 2;
/// Space after prefix: "[module] " <- this space
const SPACE_AFTER_PREFIX: usize = 1;
/// Bar wrapper: " []" (space + brackets around progress bar)
const BAR_WRAPPER_LEN: usize = 3;
/// Space before count: "...] 42/100" <- this space
const SPACE_BEFORE_COUNT: usize = 1;
/// Minimum progress bar width in characters
const MIN_BAR_WIDTH: usize = 10;
/// Maximum progress bar width in characters
const MAX_BAR_WIDTH: usize = 40;

/// Calculate total prefix length for a module name.
#[inline]
const fn calc_prefix_len(module_len: usize) -> usize {
    module_len + BRACKET_LEN + SPACE_AFTER_PREFIX
}

/// Get terminal width, cached after first call.
/// Falls back to 120 columns if detection fails.
fn get_terminal_width() -> u16 {
    *TERMINAL_WIDTH.get_or_init(|| size().map(|(w, _)| w).unwrap_or(120))
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

// ============================================================================
// Progress Bars
// ============================================================================

/// Manages multiple progress bars displayed on separate terminal lines.
///
/// Each bar occupies one line and updates in place using ANSI cursor control.
///
/// # Thread Safety
/// Uses a mutex to synchronize terminal updates; the engine itself is
/// single-threaded, but the dev server and watcher may log concurrently.
pub struct ProgressBars {
    bars: Vec<ProgressBar>,
    lock: Mutex<()>,
}

/// Internal state for a single progress bar.
struct ProgressBar {
    prefix: ColoredString,
    prefix_len: usize,
    total: usize,
    current: AtomicUsize,
    row: usize,
}

impl ProgressBars {
    /// Create progress bars for multiple modules.
    ///
    /// # Arguments
    /// * `modules` - Slice of (module_name, total_count) tuples
    pub fn new(modules: &[(&'static str, usize)]) -> Self {
        let mut stdout = stdout().lock();
        for _ in 0..modules.len() {
            writeln!(stdout).ok();
        }
        stdout.flush().ok();

        let bars = modules
            .iter()
            .enumerate()
            .map(|(row, (module, total))| {
                let prefix = colorize_prefix(module, &module.to_ascii_lowercase());
                ProgressBar {
                    prefix,
                    prefix_len: calc_prefix_len(module.len()),
                    total: *total,
                    current: AtomicUsize::new(0),
                    row,
                }
            })
            .collect();

        Self { bars, lock: Mutex::new(()) }
    }

    /// Increment progress for the bar at the given index.
    #[inline]
    pub fn inc(&self, index: usize) {
        if let Some(bar) = self.bars.get(index) {
            let current = bar.current.fetch_add(1, Ordering::Relaxed) + 1;
            self.display(bar, current);
        }
    }

    /// Render a progress bar at its designated row.
    fn display(&self, bar: &ProgressBar, current: usize) {
        let _guard = self.lock.lock().ok();

        let width = get_terminal_width() as usize;

        let progress_text = format!("{}/{}", current, bar.total);
        let overhead = bar.prefix_len + BAR_WRAPPER_LEN + SPACE_BEFORE_COUNT + progress_text.len();
        let available = width.saturating_sub(overhead);
        let bar_width = available.clamp(MIN_BAR_WIDTH, MAX_BAR_WIDTH);

        let filled = if bar.total > 0 { (current * bar_width) / bar.total } else { 0 };
        let empty = bar_width.saturating_sub(filled);

        let progress_bar: String = "█".repeat(filled) + &"░".repeat(empty);

        let mut stdout = stdout().lock();
        let lines_up = self.bars.len() - bar.row;
        execute!(stdout, cursor::MoveUp(lines_up as u16)).ok();
        execute!(stdout, Clear(ClearType::CurrentLine)).ok();
        write!(stdout, "{} [{}] {}", bar.prefix, progress_bar, progress_text).ok();
        execute!(stdout, cursor::MoveDown(lines_up as u16)).ok();
        write!(stdout, "\r").ok();
        stdout.flush().ok();
    }

    /// Clear all progress bars from the terminal.
    pub fn finish(&self) {
        let _guard = self.lock.lock().ok();

        let mut stdout = stdout().lock();

        execute!(stdout, cursor::MoveUp(self.bars.len() as u16)).ok();
        for _ in &self.bars {
            execute!(stdout, Clear(ClearType::CurrentLine)).ok();
            execute!(stdout, cursor::MoveDown(1)).ok();
        }

        execute!(stdout, cursor::MoveUp(self.bars.len() as u16)).ok();
        stdout.flush().ok();
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix, truncated to fit the
/// terminal width.
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);
    let width = get_terminal_width() as usize;

    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();

    let prefix_len = calc_prefix_len(module.len());
    let max_msg_len = width.saturating_sub(prefix_len);

    let message = if message.len() > max_msg_len { truncate_str(message, max_msg_len) } else { message };

    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Apply color to a module prefix based on module name.
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module_lower {
        "serve" => prefix.bright_blue().bold(),
        "watch" => prefix.bright_green().bold(),
        "error" => prefix.bright_red().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}

/// Truncate a string to fit within max_len bytes, landing on a UTF-8
/// character boundary.
#[inline]
fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_prefix_len_short_module() {
        assert_eq!(calc_prefix_len(1), 4);
    }

    #[test]
    fn test_calc_prefix_len_typical_module() {
        assert_eq!(calc_prefix_len(7), 10);
    }

    #[test]
    fn test_calc_prefix_len_empty() {
        assert_eq!(calc_prefix_len(0), 3);
    }

    #[test]
    fn test_calc_prefix_len_long_module() {
        assert_eq!(calc_prefix_len(12), 15);
    }

    #[test]
    fn test_truncate_str_short_string() {
        assert_eq!(truncate_str("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_str_exact_length() {
        assert_eq!(truncate_str("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_str_needs_truncation() {
        assert_eq!(truncate_str("hello world", 5), "hello");
    }

    #[test]
    fn test_truncate_str_unicode_boundary() {
        assert_eq!(truncate_str("你好", 4), "你");
    }

    #[test]
    fn test_truncate_str_unicode_exact() {
        assert_eq!(truncate_str("你好", 3), "你");
    }

    #[test]
    fn test_truncate_str_unicode_full() {
        assert_eq!(truncate_str("你好", 6), "你好");
    }

    #[test]
    fn test_truncate_str_empty() {
        assert_eq!(truncate_str("", 10), "");
    }

    #[test]
    fn test_truncate_str_zero_limit() {
        assert_eq!(truncate_str("hello", 0), "");
    }

    #[test]
    fn test_truncate_str_mixed_unicode() {
        assert_eq!(truncate_str("a你b", 4), "a你");
        assert_eq!(truncate_str("a你b", 3), "a");
        assert_eq!(truncate_str("a你b", 2), "a");
    }

    #[test]
    fn test_constants_values() {
        assert_eq!(BRACKET_LEN, 2);
        assert_eq!(SPACE_AFTER_PREFIX, 1);
        assert_eq!(BAR_WRAPPER_LEN, 3);
        assert_eq!(SPACE_BEFORE_COUNT, 1);
        assert_eq!(MIN_BAR_WIDTH, 10);
        assert_eq!(MAX_BAR_WIDTH, 40);
    }

    #[test]
    fn test_bar_width_constraints() {
        assert!(MIN_BAR_WIDTH < MAX_BAR_WIDTH);
    }
}
