//! NSG discovery for a VM.
//!
//! Rules must land at every level that filters the VM's traffic: the NIC's
//! own NSG and the NSG of each subnet its IP configurations sit in. A
//! missing NSG at either level gets created and attached on the spot, so
//! the grant step always has somewhere to write.

use crate::azure::Provider;
use crate::models::resource_id::segment_value;
use crate::models::{leaf_name, SubnetLocator, Vm};
use crate::output::terminal;
use std::error::Error;

/// Collect the NSG IDs governing a VM's traffic, without creating anything.
///
/// Per NIC: the NIC-level NSG plus the subnet-level NSG of every distinct
/// subnet. Duplicates across levels and NICs collapse in first-appearance
/// order.
pub fn find_attached_nsgs<P: Provider>(
    provider: &P,
    vm: &Vm,
) -> Result<Vec<String>, Box<dyn Error>> {
    let mut nsg_ids: Vec<String> = Vec::new();
    for nic_id in vm.nic_ids() {
        let nic = provider.show_nic(&nic_id)?;
        if let Some(nsg) = &nic.network_security_group {
            push_unique(&mut nsg_ids, &nsg.id);
        }
        for subnet_id in nic.subnet_ids() {
            let locator = SubnetLocator::parse(&subnet_id)?;
            let subnet = provider.show_subnet(&locator)?;
            if let Some(nsg) = &subnet.network_security_group {
                push_unique(&mut nsg_ids, &nsg.id);
            }
        }
    }
    Ok(nsg_ids)
}

/// Like [`find_attached_nsgs`], but any level missing an NSG gets one
/// created and attached before its ID is returned. An attach failure is
/// the operation's failure; a created-but-unattached NSG is never
/// silently accepted.
pub fn ensure_nsgs<P: Provider>(provider: &P, vm: &Vm) -> Result<Vec<String>, Box<dyn Error>> {
    let mut nsg_ids: Vec<String> = Vec::new();
    let nic_ids = vm.nic_ids();
    if nic_ids.is_empty() {
        return Err(format!("VM '{}' has no network interfaces", vm.name).into());
    }

    for nic_id in nic_ids {
        let nic = provider.show_nic(&nic_id)?;

        match &nic.network_security_group {
            Some(nsg) => push_unique(&mut nsg_ids, &nsg.id),
            None => {
                let nic_name = leaf_name(&nic_id);
                let resource_group = segment_value(&nic_id, "resourceGroups")?;
                let name = auto_nsg_name(nic_name, "nic");
                terminal::warn(&format!("NIC '{nic_name}' has no NSG attached"));
                terminal::info(&format!(
                    "Creating NSG '{name}' in resource group '{resource_group}'"
                ));
                let nsg = provider.create_nsg(&resource_group, &name, &vm.location)?;
                provider.attach_nsg_to_nic(&nic_id, &nsg.id)?;
                terminal::success(&format!("NSG '{name}' attached to NIC '{nic_name}'"));
                push_unique(&mut nsg_ids, &nsg.id);
            }
        }

        for subnet_id in nic.subnet_ids() {
            let locator = SubnetLocator::parse(&subnet_id)?;
            let subnet = provider.show_subnet(&locator)?;
            match &subnet.network_security_group {
                Some(nsg) => push_unique(&mut nsg_ids, &nsg.id),
                None => {
                    let name = auto_nsg_name(&locator.name, "subnet");
                    terminal::warn(&format!("Subnet '{}' has no NSG attached", locator.name));
                    terminal::info(&format!(
                        "Creating NSG '{name}' in resource group '{}'",
                        locator.resource_group
                    ));
                    let nsg = provider.create_nsg(&locator.resource_group, &name, &vm.location)?;
                    provider.attach_nsg_to_subnet(&locator, &nsg.id)?;
                    terminal::success(&format!(
                        "NSG '{name}' attached to subnet '{}'",
                        locator.name
                    ));
                    push_unique(&mut nsg_ids, &nsg.id);
                }
            }
        }
    }
    Ok(nsg_ids)
}

/// Name for an auto-created NSG: `nsg-{scope}-{nic|subnet}-{unix-ts}`.
/// The timestamp keeps retries from colliding with a half-created NSG.
pub fn auto_nsg_name(scope: &str, kind: &str) -> String {
    format!("nsg-{scope}-{kind}-{}", chrono::Utc::now().timestamp())
}

fn push_unique(ids: &mut Vec<String>, id: &str) {
    if !ids.iter().any(|existing| existing == id) {
        ids.push(id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_nsg_name_format() {
        let name = auto_nsg_name("nic-web-01", "nic");
        assert!(name.starts_with("nsg-nic-web-01-nic-"));
        let ts = name.rsplit('-').next().unwrap();
        assert!(ts.parse::<i64>().is_ok());
    }

    #[test]
    fn test_push_unique() {
        let mut ids = Vec::new();
        push_unique(&mut ids, "/nsg/a");
        push_unique(&mut ids, "/nsg/b");
        push_unique(&mut ids, "/nsg/a");
        assert_eq!(ids, vec!["/nsg/a", "/nsg/b"]);
    }
}
