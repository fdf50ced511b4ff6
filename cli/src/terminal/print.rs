//! Human-facing output.
//!
//! Everything is emitted as a `tracing` event on [`PRINT_TARGET`] so it
//! interleaves cleanly with log lines and the progress bar.

use std::cell::Cell;

use colored::*;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::terminal::colors;

pub const TOTAL_WIDTH: usize = 64;

/// Events on this target are written verbatim, without a level symbol.
pub const PRINT_TARGET: &str = "assetronics::print";

const TREE_KEY_WIDTH: usize = 8;

thread_local! {
    /// Column the `:` of [`key_value`] lines is aligned to.
    pub static KEY_COLUMN: Cell<usize> = const { Cell::new(0) }
}

#[macro_export]
macro_rules! mprint {
    () => {
        $crate::terminal::print::print("");
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg);
    };
}

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, "{}", msg);
}

fn rule(fill: &str, title: Option<ColoredString>, title_width: usize) -> String {
    let remaining: usize = TOTAL_WIDTH.saturating_sub(title_width);
    let left: String = fill.repeat(remaining / 2);
    let right: String = fill.repeat(remaining - remaining / 2);
    match title {
        Some(title) => format!(
            "{}{}{}",
            left.color(colors::SEPARATOR),
            title,
            right.color(colors::SEPARATOR)
        ),
        None => format!("{}{}", left, right).color(colors::SEPARATOR).to_string(),
    }
}

pub fn banner(q_level: u8) {
    if q_level > 0 {
        return;
    }
    let text: String = format!("⟦ ASSETRONICS AGENT v{} ⟧", env!("CARGO_PKG_VERSION"));
    let width: usize = UnicodeWidthStr::width(text.as_str());
    print(&rule("═", Some(text.bright_green().bold()), width));
}

pub fn header(msg: &str, q_level: u8) {
    if q_level > 0 {
        return;
    }
    let title: String = format!("⟦ {} ⟧", msg.to_uppercase());
    let width: usize = UnicodeWidthStr::width(title.as_str());
    print(&rule("─", Some(title.bright_green()), width));
}

pub fn fat_separator() {
    print(&rule("═", None, 0));
}

/// `> Key.......: value`, aligned on [`KEY_COLUMN`]. Empty values read `unknown`.
pub fn key_value(key: &str, value: &str) {
    let dots: String = ".".repeat((KEY_COLUMN.get() + 1).saturating_sub(key.len()));
    let value: ColoredString = if value.is_empty() {
        "unknown".color(colors::EMPTY)
    } else {
        value.color(colors::TEXT_DEFAULT)
    };
    print(&format!(
        "{} {}{}{} {}",
        ">".color(colors::SEPARATOR),
        key.color(colors::PRIMARY),
        dots.color(colors::SEPARATOR),
        ":".color(colors::SEPARATOR),
        value
    ));
}

/// One discovered device: `[idx] name` followed by its details as branches.
pub fn device_tree(idx: usize, name: &str, details: &[(String, ColoredString)]) {
    print(&format!(
        "{}{}{} {}",
        "[".color(colors::SEPARATOR),
        idx.to_string().color(colors::ACCENT),
        "]".color(colors::SEPARATOR),
        name.color(colors::PRIMARY)
    ));

    for (i, (key, value)) in details.iter().enumerate() {
        let branch: &str = if i + 1 == details.len() { "└─" } else { "├─" };
        let dots: String = ".".repeat(TREE_KEY_WIDTH.saturating_sub(key.len()));
        print(&format!(
            " {} {}{}{} {}",
            branch.color(colors::SEPARATOR),
            key.color(colors::TEXT_DEFAULT),
            dots.color(colors::SEPARATOR),
            ":".color(colors::SEPARATOR),
            value
        ));
    }
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{}{}{}", space, msg, space));
}

const NO_HOSTS: &str = r#"
         _   _  ___    _   _  ___  ____ _____ ____
        | \ | |/ _ \  | | | |/ _ \/ ___|_   _/ ___|
        |  \| | | | | | |_| | | | \___ \ | | \___ \
        | |\  | |_| | |  _  | |_| |___) || |  ___) |
        |_| \_|\___/  |_| |_|\___/|____/ |_| |____/
"#;

pub fn no_results() {
    print(&format!("{}", NO_HOSTS.red().bold()));
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
