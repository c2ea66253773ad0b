//! Shared CLI output helpers.
//!
//! Color scheme (respects NO_COLOR):
//! - Green: success, creates
//! - Red: errors, deletes
//! - Yellow: warnings, updates and replacements
//! - Cyan: addresses, ids, hints
//! - Dimmed: secondary info

use colored::Colorize;
use std::fmt::Display;

use crate::core::plan::Action;

const RULE_WIDTH: usize = 56;

fn colors_enabled() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Print a success message with checkmark (green).
///
/// Example: `✓ apply complete`
pub fn success(msg: &str) {
    if colors_enabled() {
        println!("{} {}", "✓".green(), msg);
    } else {
        println!("✓ {}", msg);
    }
}

/// Print an error message to stderr (red).
pub fn error(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", "✗".red(), msg);
    } else {
        eprintln!("✗ {}", msg);
    }
}

/// Print a warning message (yellow).
pub fn warn(msg: &str) {
    if colors_enabled() {
        println!("{} {}", "⚠".yellow(), msg);
    } else {
        println!("⚠ {}", msg);
    }
}

/// Print a hint message (cyan).
///
/// Example: `→ run: opsync apply`
pub fn hint(msg: &str) {
    if colors_enabled() {
        println!("{} {}", "→".cyan(), msg.cyan());
    } else {
        println!("→ {}", msg);
    }
}

pub fn header(title: &str) {
    if colors_enabled() {
        println!("{}", title.bold());
    } else {
        println!("{}", title);
    }
}

/// Print a key-value pair (label dimmed, value bold).
pub fn kv(label: &str, value: impl Display) {
    if colors_enabled() {
        println!("  {:<12} {}", label.dimmed(), value.to_string().bold());
    } else {
        println!("  {:<12} {}", label, value);
    }
}

pub fn rule() {
    if colors_enabled() {
        println!("{}", "─".repeat(RULE_WIDTH).dimmed());
    } else {
        println!("{}", "─".repeat(RULE_WIDTH));
    }
}

pub fn dimmed(msg: &str) {
    if colors_enabled() {
        println!("{}", msg.dimmed());
    } else {
        println!("{}", msg);
    }
}

/// Print a section header with a separator line.
pub fn section(title: &str) {
    println!();
    header(title);
    rule();
}

/// Format an address or id in cyan.
pub fn key(k: &str) -> String {
    if colors_enabled() {
        k.cyan().to_string()
    } else {
        k.to_string()
    }
}

/// Print one planned change.
///
/// Example: `  + vault.engineering (create)`
pub fn change(action: Action, address: &str) {
    let symbol = format!("{:>3}", action.symbol());
    if colors_enabled() {
        let symbol = match action {
            Action::Create => symbol.green(),
            Action::Delete => symbol.red(),
            Action::Update | Action::Replace => symbol.yellow(),
            Action::NoOp => symbol.normal(),
        };
        println!("{} {} {}", symbol, address.bold(), format!("({})", action).dimmed());
    } else {
        println!("{} {} ({})", symbol, address, action);
    }
}

/// Print an indented detail line under a change.
pub fn detail(msg: &str) {
    if colors_enabled() {
        println!("      {}", msg.dimmed());
    } else {
        println!("      {}", msg);
    }
}

/// Print raw data (JSON) to stdout.
pub fn data(content: &str) {
    println!("{}", content);
}
