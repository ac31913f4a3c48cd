//! Network-side descriptors: NICs, subnets and public IP resources.

use super::vm::ResourceRef;
use serde::{Deserialize, Serialize};

/// A network interface as returned by `az network nic show`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Nic {
    pub name: String,
    pub primary: Option<bool>,
    pub network_security_group: Option<ResourceRef>,
    pub ip_configurations: Vec<IpConfiguration>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct IpConfiguration {
    pub name: String,
    pub primary: Option<bool>,
    pub subnet: Option<ResourceRef>,
    pub public_ip_address: Option<ResourceRef>,
}

impl Nic {
    /// Distinct subnet IDs across this NIC's IP configurations, in order of
    /// first appearance.
    pub fn subnet_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for ip_config in &self.ip_configurations {
            if let Some(subnet) = &ip_config.subnet {
                if !ids.contains(&subnet.id) {
                    ids.push(subnet.id.clone());
                }
            }
        }
        ids
    }
}

/// A subnet as returned by `az network vnet subnet show`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Subnet {
    pub name: String,
    pub network_security_group: Option<ResourceRef>,
}

/// A public IP resource as returned by `az network public-ip show`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicIp {
    pub ip_address: Option<String>,
    pub public_ip_allocation_method: Option<String>,
}

impl PublicIp {
    /// The assigned address, treating empty / "none" as unassigned
    /// (dynamic allocation on a deallocated VM leaves the field blank).
    pub fn assigned_address(&self) -> Option<&str> {
        self.ip_address
            .as_deref()
            .filter(|ip| !ip.is_empty() && !ip.eq_ignore_ascii_case("none"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subnet_ids_deduped() {
        let nic: Nic = serde_json::from_str(
            r#"{
                "name": "nic-a",
                "ipConfigurations": [
                    {"name": "ipconfig1", "subnet": {"id": "/sub/a"}},
                    {"name": "ipconfig2", "subnet": {"id": "/sub/a"}},
                    {"name": "ipconfig3", "subnet": {"id": "/sub/b"}},
                    {"name": "ipconfig4"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(nic.subnet_ids(), vec!["/sub/a", "/sub/b"]);
    }

    #[test]
    fn test_assigned_address() {
        let with_ip = PublicIp {
            ip_address: Some("198.51.100.7".to_string()),
            public_ip_allocation_method: Some("Static".to_string()),
        };
        assert_eq!(with_ip.assigned_address(), Some("198.51.100.7"));

        let empty = PublicIp {
            ip_address: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(empty.assigned_address(), None);

        let none_literal = PublicIp {
            ip_address: Some("None".to_string()),
            ..Default::default()
        };
        assert_eq!(none_literal.assigned_address(), None);
    }
}
