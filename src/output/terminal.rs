//! Styled terminal output.
//!
//! Status lines, section headers, boxes and banners used by every mode.
//! Color is handled by the `colored` crate; `--no-color` flips its global
//! override.

use crate::config::TERM_WIDTH;
use colored::Colorize;

pub const BULLET: &str = "•";
pub const ARROW: &str = "→";
pub const CHECK: &str = "✓";
pub const CROSS: &str = "✗";
pub const WARN_ICON: &str = "⚠";
pub const INFO_ICON: &str = "ℹ";

const BOX_H: &str = "═";
const LINE_H: &str = "─";
const LINE_V: &str = "│";

/// Application title banner shown at startup.
pub fn banner() {
    let w = TERM_WIDTH;
    let title = "Azure NSG SSH/RDP Access Manager";
    let subtitle = "Secure remote access configuration tool";
    println!();
    println!("  {}", format!("╔{}╗", BOX_H.repeat(w - 4)).cyan());
    println!(
        "  {}  {}{}{}",
        "║".cyan(),
        title.white().bold(),
        " ".repeat(w - title.len() - 8),
        "║".cyan()
    );
    println!(
        "  {}  {}{}{}",
        "║".cyan(),
        subtitle.dimmed(),
        " ".repeat(w - subtitle.len() - 8),
        "║".cyan()
    );
    println!("  {}", format!("╚{}╝", BOX_H.repeat(w - 4)).cyan());
    println!();
}

/// Major section header with centered title.
pub fn section(title: &str) {
    let w = TERM_WIDTH;
    let label = format!(" {title} ");
    let line_len = w.saturating_sub(label.chars().count() + 2);
    let left = line_len / 2;
    let right = line_len - left;
    println!();
    println!(
        "  {}{}{}",
        LINE_H.repeat(left).blue(),
        label.white().bold(),
        LINE_H.repeat(right).blue()
    );
    println!();
}

/// Minor subsection header.
pub fn subsection(title: &str) {
    println!("  {} {}", LINE_H.repeat(3).dimmed(), title.bold());
}

pub fn info(msg: &str) {
    println!("  {}  {msg}", INFO_ICON.blue());
}

pub fn success(msg: &str) {
    println!("  {}  {}", CHECK.green(), msg.green());
}

pub fn warn(msg: &str) {
    println!("  {}  {}", WARN_ICON.yellow(), msg.yellow());
}

pub fn error(msg: &str) {
    println!("  {}  {}", CROSS.red(), msg.red());
}

/// Skip/bypass message for redundant operations.
pub fn skip(msg: &str) {
    println!("  {}  {}", ARROW.magenta(), msg.magenta());
}

/// Indented detail line under a primary message.
pub fn detail(msg: &str) {
    println!("       {}", msg.dimmed());
}

pub fn bullet(msg: &str) {
    println!("    {} {msg}", BULLET.cyan());
}

pub fn key_value(key: &str, value: &str) {
    println!("    {} {}", format!("{key}:").dimmed(), value.white());
}

/// Multi-line note inside a single-line box.
pub fn box_note(lines: &[String]) {
    let w = TERM_WIDTH;
    let inner_w = w - 6;
    println!("  {}", format!("┌{}┐", LINE_H.repeat(inner_w + 2)).cyan());
    for line in lines {
        let mut text = line.clone();
        let len = text.chars().count();
        if len > inner_w {
            text = text.chars().take(inner_w).collect();
        }
        let padding = inner_w.saturating_sub(text.chars().count());
        println!(
            "  {} {}{} {}",
            LINE_V.cyan(),
            text,
            " ".repeat(padding),
            LINE_V.cyan()
        );
    }
    println!("  {}", format!("└{}┘", LINE_H.repeat(inner_w + 2)).cyan());
}

/// Green bordered banner for successful completion.
pub fn completion_banner(message: &str) {
    let w = TERM_WIDTH;
    let label = format!(" {CHECK} {message} ");
    let padding = w.saturating_sub(label.chars().count() + 4);
    let left = padding / 2;
    let right = padding - left;
    println!();
    println!("  {}", format!("╔{}╗", BOX_H.repeat(w - 4)).green());
    println!(
        "  {}{}{}{}{}",
        "║".green(),
        " ".repeat(left),
        label.green().bold(),
        " ".repeat(right),
        "║".green()
    );
    println!("  {}", format!("╚{}╝", BOX_H.repeat(w - 4)).green());
    println!();
}

/// Highlighted header when starting to process a VM, with an optional
/// `[i/n]` progress counter.
pub fn vm_header(vm_name: &str, index: usize, total: usize) {
    let w = TERM_WIDTH;
    let counter = if total > 0 {
        format!(" [{index}/{total}]")
    } else {
        String::new()
    };
    let label = format!(" Processing: {vm_name}{counter} ");
    let line_len = w.saturating_sub(label.chars().count());
    let left = line_len / 2;
    let right = line_len - left;
    println!();
    println!(
        "  {}{}{}",
        BOX_H.repeat(left).yellow(),
        label.white().bold(),
        BOX_H.repeat(right).yellow()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    // Output helpers only print; these just pin that nothing panics on
    // edge-case widths.
    #[test]
    fn test_render_does_not_panic() {
        colored::control::set_override(false);
        banner();
        section("Authentication");
        subsection("NSG: nsg-web");
        vm_header("a-vm-with-a-rather-long-name-that-still-fits", 2, 5);
        vm_header("vm", 0, 0);
        box_note(&[
            "Possible reasons:".to_string(),
            format!("  {BULLET} VM has no public IP assigned"),
            "x".repeat(200),
        ]);
        completion_banner("All tasks completed successfully");
        colored::control::unset_override();
    }
}
