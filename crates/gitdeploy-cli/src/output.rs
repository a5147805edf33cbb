//! Terminal output for the gitdeploy CLI.
//!
//! Progress lines go to stdout and are silenced by `--quiet`. Problems go to
//! stderr unconditionally, and machine-readable output always prints.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::{ColoredString, Colorize};
use gitdeploy_core::Repository;

static QUIET: AtomicBool = AtomicBool::new(false);

/// Set quiet mode for the whole process.
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Done,
    Failed,
    Attention,
    Step,
}

impl Mark {
    fn glyph(self) -> ColoredString {
        match self {
            Self::Done => "✓".green(),
            Self::Failed => "✗".red(),
            Self::Attention => "!".yellow(),
            Self::Step => "→".blue(),
        }
    }

    const fn is_problem(self) -> bool {
        matches!(self, Self::Failed | Self::Attention)
    }
}

fn marked(mark: Mark, msg: &str) {
    if mark.is_problem() {
        eprintln!("{} {msg}", mark.glyph());
    } else if !is_quiet() {
        println!("{} {msg}", mark.glyph());
    }
}

pub fn success(msg: &str) {
    marked(Mark::Done, msg);
}

pub fn error(msg: &str) {
    marked(Mark::Failed, msg);
}

pub fn warn(msg: &str) {
    marked(Mark::Attention, msg);
}

pub fn info(msg: &str) {
    marked(Mark::Step, msg);
}

/// Unprefixed line, silenced by quiet mode.
pub fn detail(msg: &str) {
    if !is_quiet() {
        println!("{msg}");
    }
}

/// Supporting lines for an error or warning, printed with it on stderr.
pub fn problem_detail(msg: &str) {
    eprintln!("{msg}");
}

/// Output that scripts consume, e.g. JSON reports.
pub fn essential(msg: &str) {
    println!("{msg}");
}

/// Indented hook line shown under a repository.
pub fn hook(command: &str) {
    detail(&format!("    hook: {command}"));
}

/// Section separator.
pub fn rule() {
    detail(&"─".repeat(50).dimmed().to_string());
}

/// Bold id followed by the dimmed sync mapping.
#[must_use]
pub fn repository_line(repository: &Repository) -> String {
    format!("{} {}", repository.id().bold(), repository.to_string().dimmed())
}
