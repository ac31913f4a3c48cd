//! VM selection table rendering.

use crate::config::TERM_WIDTH;
use crate::models::VmListEntry;
use colored::Colorize;

/// Truncate a value to `width` characters, ellipsizing overflow.
pub fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let head: String = value.chars().take(width.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

/// Formatted table of VMs with index numbers, names and resource groups.
pub fn vm_table(vms: &[VmListEntry]) {
    let w = TERM_WIDTH;
    let rg_width = w - 45;

    println!("  {}", format!("┌{}┐", "─".repeat(w - 4)).bright_black());
    let header = format!(" {:>5}  {:<30}  {:<rg_width$}", "#", "VM Name", "Resource Group");
    println!(
        "  {}{}{}",
        "│".bright_black(),
        header.bold(),
        "│".bright_black()
    );
    println!("  {}", format!("├{}┤", "─".repeat(w - 4)).bright_black());

    for (idx, vm) in vms.iter().enumerate() {
        let num = format!("[{}]", idx + 1);
        let name = truncate(&vm.name, 28);
        let rg = truncate(&vm.resource_group, rg_width.saturating_sub(2));
        let row = format!(
            " {num:>5}  {}  {}",
            format!("{name:<30}").white(),
            format!("{rg:<rg_width$}").dimmed()
        );
        println!("  {}{row}{}", "│".bright_black(), "│".bright_black());
    }

    println!("  {}", format!("└{}┘", "─".repeat(w - 4)).bright_black());
    println!("  {}", format!("Total: {} VM(s)", vms.len()).dimmed());
}
