//! VM target selection.
//!
//! Selection strings accept single indexes, comma lists, ranges and "all",
//! mixed freely: `1,3,5`, `2-5`, `1,4-6`, `all`. Indexes are 1-based as
//! shown in the table; invalid or out-of-range tokens are warned about and
//! skipped rather than aborting the whole selection.

use crate::models::VmListEntry;
use crate::output::{prompt, table, terminal};
use std::error::Error;

/// Parse a selection string into zero-based indexes, deduplicated in
/// first-appearance order.
pub fn parse_vm_selection(input: &str, total: usize) -> Vec<usize> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("all") {
        return (0..total).collect();
    }

    let mut selected: Vec<usize> = Vec::new();
    let push = |index: usize, selected: &mut Vec<usize>| {
        if index == 0 || index > total {
            terminal::warn(&format!("Ignoring out-of-range selection: {index}"));
        } else if !selected.contains(&(index - 1)) {
            selected.push(index - 1);
        }
    };

    for token in input.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if let Some((low, high)) = token.split_once('-') {
            match (low.trim().parse::<usize>(), high.trim().parse::<usize>()) {
                (Ok(low), Ok(high)) if low <= high => {
                    for index in low..=high {
                        push(index, &mut selected);
                    }
                }
                _ => terminal::warn(&format!("Ignoring invalid range: {token}")),
            }
        } else {
            match token.parse::<usize>() {
                Ok(index) => push(index, &mut selected),
                Err(_) => terminal::warn(&format!("Ignoring invalid selection: {token}")),
            }
        }
    }
    selected
}

/// Show the VM table and prompt until a non-empty selection (or quit).
/// Returns an empty vector when the user quits.
pub fn select_vms_interactively(
    vms: &[VmListEntry],
) -> Result<Vec<VmListEntry>, Box<dyn Error>> {
    table::vm_table(vms);
    loop {
        let input = prompt::styled_input("Select VMs (e.g. 1,3,5 or 2-5 or all, q to quit): ")?;
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("q") || input.eq_ignore_ascii_case("quit") {
            return Ok(Vec::new());
        }
        let indexes = parse_vm_selection(&input, vms.len());
        if indexes.is_empty() {
            terminal::warn("No valid selection, try again");
            continue;
        }
        let selected: Vec<VmListEntry> = indexes.into_iter().map(|i| vms[i].clone()).collect();
        terminal::info(&format!("Selected {} VM(s):", selected.len()));
        for vm in &selected {
            terminal::bullet(&format!("{} ({})", vm.name, vm.resource_group));
        }
        if prompt::confirm_yes("Proceed with these VMs? [y/N]: ")? {
            return Ok(selected);
        }
    }
}
