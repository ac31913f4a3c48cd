//! Removal of all custom rules from a VM's NSGs.
//!
//! Destructive: lists everything that will be deleted and requires the
//! literal token DELETE before touching anything. Azure default rules are
//! never candidates.

use super::discover;
use crate::azure::Provider;
use crate::models::{NsgLocator, SecurityRule};
use crate::output::{prompt, terminal};
use std::error::Error;

/// Remove every custom rule from every NSG attached to one VM.
/// Returns the number of rules actually deleted.
pub fn remove_custom_rules<P: Provider>(
    provider: &P,
    vm_id: &str,
    vm_name: &str,
) -> Result<usize, Box<dyn Error>> {
    let vm = provider.show_vm(vm_id)?;
    let nsg_ids = discover::find_attached_nsgs(provider, &vm)?;
    if nsg_ids.is_empty() {
        terminal::info(&format!("No NSGs attached to '{vm_name}'"));
        return Ok(0);
    }

    let mut targets: Vec<(NsgLocator, Vec<SecurityRule>)> = Vec::new();
    for nsg_id in &nsg_ids {
        let locator = NsgLocator::parse(nsg_id)?;
        let rules: Vec<SecurityRule> = provider
            .list_rules(&locator)?
            .into_iter()
            .filter(|r| !r.is_default())
            .collect();
        if !rules.is_empty() {
            targets.push((locator, rules));
        }
    }
    if targets.is_empty() {
        terminal::info("No custom rules to remove");
        return Ok(0);
    }

    terminal::warn("The following custom rules will be PERMANENTLY deleted:");
    for (locator, rules) in &targets {
        terminal::subsection(&format!("NSG: {}", locator.name));
        for rule in rules {
            terminal::bullet(&format!(
                "{} (priority {}, {} port {} from {})",
                rule.name,
                rule.priority,
                rule.access,
                rule.display_port(),
                rule.display_source()
            ));
        }
    }

    if !prompt::confirm_token("Type DELETE to confirm: ", "DELETE")? {
        terminal::skip("Removal cancelled");
        return Ok(0);
    }

    let mut deleted = 0;
    for (locator, rules) in &targets {
        for rule in rules {
            match provider.delete_rule(locator, &rule.name) {
                Ok(()) => {
                    terminal::success(&format!("Deleted '{}' from '{}'", rule.name, locator.name));
                    deleted += 1;
                }
                Err(e) => terminal::error(&format!("Failed to delete '{}': {e}", rule.name)),
            }
        }
    }
    Ok(deleted)
}
