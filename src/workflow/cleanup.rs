//! Duplicate rule cleanup.
//!
//! Runs standalone in `--cleanup-only` mode and as the first step of the
//! grant workflow, so duplicate detection always sees a clean rule list.

use super::discover;
use crate::azure::Provider;
use crate::models::{leaf_name, NsgLocator, SecurityRule};
use crate::output::terminal;
use crate::processing::find_duplicate_rules;
use std::collections::HashSet;
use std::error::Error;

/// Delete all duplicate rules in one NSG, keeping the lowest-priority
/// survivor of each group. Returns the number of deleted rules.
pub fn dedupe_nsg<P: Provider>(
    provider: &P,
    locator: &NsgLocator,
    rules: &[SecurityRule],
) -> Result<usize, Box<dyn Error>> {
    let duplicates = find_duplicate_rules(rules);
    for dup in &duplicates {
        terminal::warn(&format!(
            "Removing duplicate rule '{}' (priority {}), kept '{}' (priority {})",
            dup.name, dup.priority, dup.kept_name, dup.kept_priority
        ));
        provider.delete_rule(locator, &dup.name)?;
    }
    Ok(duplicates.len())
}

/// Deduplicate every NSG attached to one VM. `processed` carries NSG IDs
/// already handled this run; shared NSGs are cleaned once.
pub fn cleanup_vm<P: Provider>(
    provider: &P,
    vm_id: &str,
    vm_name: &str,
    processed: &mut HashSet<String>,
) -> Result<usize, Box<dyn Error>> {
    let vm = provider.show_vm(vm_id)?;
    let nsg_ids = discover::find_attached_nsgs(provider, &vm)?;
    if nsg_ids.is_empty() {
        terminal::info(&format!("No NSGs attached to '{vm_name}'"));
        return Ok(0);
    }

    let mut removed = 0;
    for nsg_id in nsg_ids {
        if !processed.insert(nsg_id.clone()) {
            terminal::skip(&format!(
                "NSG '{}' already cleaned this run",
                leaf_name(&nsg_id)
            ));
            continue;
        }
        let locator = NsgLocator::parse(&nsg_id)?;
        terminal::subsection(&format!("NSG: {}", locator.name));
        let rules = provider.list_rules(&locator)?;
        let count = dedupe_nsg(provider, &locator, &rules)?;
        if count == 0 {
            terminal::success("No duplicate rules");
        } else {
            terminal::success(&format!("Removed {count} duplicate rule(s)"));
        }
        removed += count;
    }
    Ok(removed)
}
