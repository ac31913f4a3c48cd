//! The grant workflow: ensure one VM is reachable from the caller's IP.
//!
//! Per VM: classify the OS, discover (or create) the governing NSGs, then
//! for each NSG deduplicate, check whether an existing rule already decides
//! the candidate traffic, and only create a new allow rule when nothing
//! does.

use super::{cleanup, discover};
use crate::azure::{NewRule, Provider};
use crate::models::{AccessProfile, NsgLocator, PortConfig, SecurityRule};
use crate::output::terminal;
use crate::processing::{classify_vm, find_available_priority, find_effective_rule, EffectiveAccess};
use chrono::Utc;
use std::error::Error;
use std::net::Ipv4Addr;

/// Rule name: `Allow-{Service}-{ip-with-hyphens}-{unix-ts}`. Encoding the
/// source IP makes rules self-describing in the portal; the timestamp keeps
/// names unique across runs.
pub fn rule_name(service: &str, ip: Ipv4Addr) -> String {
    format!(
        "Allow-{service}-{}-{}",
        ip.to_string().replace('.', "-"),
        Utc::now().timestamp()
    )
}

/// Run the full grant workflow for one VM.
pub fn process_vm<P: Provider>(
    provider: &P,
    vm_id: &str,
    source_ip: Ipv4Addr,
    ports: &PortConfig,
) -> Result<AccessProfile, Box<dyn Error>> {
    let vm = provider.show_vm(vm_id)?;
    let profile = classify_vm(&vm, ports);
    terminal::key_value("OS", &profile.os.to_string());
    terminal::key_value("Service", profile.service());
    terminal::key_value("Port", &profile.port.to_string());

    let nsg_ids = discover::ensure_nsgs(provider, &vm)?;
    for nsg_id in &nsg_ids {
        let locator = NsgLocator::parse(nsg_id)?;
        terminal::subsection(&format!("NSG: {}", locator.name));
        let rules = provider.list_rules(&locator)?;
        let removed = cleanup::dedupe_nsg(provider, &locator, &rules)?;
        // Re-fetch after deletions so priority allocation sees reality.
        let rules = if removed > 0 {
            provider.list_rules(&locator)?
        } else {
            rules
        };
        ensure_rule(provider, &locator, &rules, source_ip, &profile)?;
    }
    Ok(profile)
}

fn ensure_rule<P: Provider>(
    provider: &P,
    locator: &NsgLocator,
    rules: &[SecurityRule],
    source_ip: Ipv4Addr,
    profile: &AccessProfile,
) -> Result<(), Box<dyn Error>> {
    match find_effective_rule(rules, source_ip, profile.port) {
        EffectiveAccess::AlreadyAllowed(rule) => {
            terminal::skip(&format!(
                "Access already granted by rule '{}' (priority {})",
                rule.name, rule.priority
            ));
            terminal::detail(&format!(
                "Source {}, port {}",
                rule.display_source(),
                rule.display_port()
            ));
        }
        EffectiveAccess::DeniedBy(rule) => {
            terminal::warn(&format!(
                "Traffic is denied by rule '{}' (priority {}); a new allow rule would be shadowed",
                rule.name, rule.priority
            ));
            terminal::detail(&format!(
                "Remove or reprioritize '{}' to open {} access",
                rule.name,
                profile.service()
            ));
        }
        EffectiveAccess::NoMatch => {
            let priority = find_available_priority(rules)?;
            let name = rule_name(profile.service(), source_ip);
            let rule = NewRule {
                name: name.clone(),
                priority,
                source_prefix: format!("{source_ip}/32"),
                destination_port: profile.port,
                description: format!(
                    "Allow {} from {} to {} ({}) port {}",
                    profile.service(),
                    source_ip,
                    profile.vm_name,
                    profile.os,
                    profile.port
                ),
            };
            provider.create_rule(locator, &rule)?;
            terminal::success(&format!("Created rule '{name}' at priority {priority}"));
            terminal::detail(&format!(
                "Source {source_ip}/32, destination port {}",
                profile.port
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_name_format() {
        let name = rule_name("SSH", "203.0.113.50".parse().unwrap());
        assert!(name.starts_with("Allow-SSH-203-0-113-50-"));
        let ts = name.rsplit('-').next().unwrap();
        assert!(ts.parse::<i64>().is_ok());
    }
}
