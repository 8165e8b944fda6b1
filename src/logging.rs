//! Colored terminal output for the orchestrator's human-facing log lines.
//!
//! Diagnostic logging goes through `tracing`; these helpers cover the
//! operator-visible narrative (status prefixes, section banners) that the
//! original shell orchestrator printed, using plain ANSI codes.

const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[0;31m";
const GREEN: &str = "\x1b[0;32m";
const YELLOW: &str = "\x1b[1;33m";
const CYAN: &str = "\x1b[0;36m";
const WHITE: &str = "\x1b[1;37m";

const SECTION_LINE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Print a white `[INFO]` line.
pub fn info(msg: &str) {
    println!("{WHITE}[INFO]{RESET} {msg}");
}

/// Print a green `[SUCCESS]` line.
pub fn success(msg: &str) {
    println!("{GREEN}[SUCCESS]{RESET} {msg}");
}

/// Print a yellow `[WARNING]` line.
pub fn warning(msg: &str) {
    println!("{YELLOW}[WARNING]{RESET} {msg}");
}

/// Print a red `[ERROR]` line.
pub fn error(msg: &str) {
    println!("{RED}[ERROR]{RESET} {msg}");
}

/// Print a cyan box-draw section banner with a title.
pub fn section(title: &str) {
    println!("\n{CYAN}{SECTION_LINE}{RESET}");
    println!("{CYAN}{title}{RESET}");
    println!("{CYAN}{SECTION_LINE}{RESET}\n");
}
