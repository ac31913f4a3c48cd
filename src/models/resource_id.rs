//! Azure resource ID parsing.
//!
//! Resource IDs are `/`-separated paths like
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Network/networkSecurityGroups/{name}`.
//! The helpers here extract the segments the workflows need without pulling
//! in a full ARM client.

use std::error::Error;

/// Extract the value following a path segment, case-insensitively.
///
/// `segment_value(id, "resourceGroups")` returns the resource group name.
pub fn segment_value(resource_id: &str, segment: &str) -> Result<String, Box<dyn Error>> {
    let parts: Vec<&str> = resource_id.split('/').collect();
    let idx = parts
        .iter()
        .position(|p| p.eq_ignore_ascii_case(segment))
        .ok_or_else(|| format!("No '{segment}' segment in resource id: {resource_id}"))?;
    parts
        .get(idx + 1)
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .ok_or_else(|| format!("Empty '{segment}' segment in resource id: {resource_id}").into())
}

/// The trailing name component of a resource ID.
pub fn leaf_name(resource_id: &str) -> &str {
    resource_id.rsplit('/').next().unwrap_or(resource_id)
}

/// Whether a string looks like a full Azure resource ID.
pub fn is_resource_id(value: &str) -> bool {
    value.starts_with("/subscriptions/")
}

/// Resource group and name of an NSG, parsed from its resource ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NsgLocator {
    pub resource_group: String,
    pub name: String,
}

impl NsgLocator {
    pub fn parse(nsg_id: &str) -> Result<NsgLocator, Box<dyn Error>> {
        Ok(NsgLocator {
            resource_group: segment_value(nsg_id, "resourceGroups")?,
            name: segment_value(nsg_id, "networkSecurityGroups")?,
        })
    }
}

/// Resource group, VNet and subnet names parsed from a subnet resource ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetLocator {
    pub resource_group: String,
    pub vnet_name: String,
    pub name: String,
}

impl SubnetLocator {
    pub fn parse(subnet_id: &str) -> Result<SubnetLocator, Box<dyn Error>> {
        Ok(SubnetLocator {
            resource_group: segment_value(subnet_id, "resourceGroups")?,
            vnet_name: segment_value(subnet_id, "virtualNetworks")?,
            name: segment_value(subnet_id, "subnets")?,
        })
    }
}
