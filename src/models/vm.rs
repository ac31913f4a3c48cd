//! Virtual machine descriptors as returned by `az vm` commands.
//!
//! Only the fields the workflows consume are modelled; everything else in
//! the `az` JSON is ignored by serde.

use serde::{Deserialize, Serialize};

/// A VM as returned by `az vm show`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Vm {
    pub name: String,
    pub location: String,
    pub os_profile: Option<OsProfile>,
    pub storage_profile: Option<StorageProfile>,
    pub network_profile: Option<NetworkProfile>,
}

impl Vm {
    /// Resource IDs of all NICs attached to this VM.
    pub fn nic_ids(&self) -> Vec<String> {
        self.network_profile
            .as_ref()
            .map(|np| np.network_interfaces.iter().map(|n| n.id.clone()).collect())
            .unwrap_or_default()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct OsProfile {
    /// Present on Windows VMs; contents are irrelevant, presence is the signal.
    pub windows_configuration: Option<serde_json::Value>,
    pub linux_configuration: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageProfile {
    pub os_disk: Option<OsDisk>,
    pub image_reference: Option<ImageReference>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct OsDisk {
    pub os_type: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageReference {
    pub publisher: Option<String>,
    pub offer: Option<String>,
    pub sku: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkProfile {
    pub network_interfaces: Vec<ResourceRef>,
}

/// A bare `{ "id": ... }` reference to another resource.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceRef {
    pub id: String,
}

/// One row of `az vm list` with the projection the tool requests.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct VmListEntry {
    pub name: String,
    pub id: String,
    pub resource_group: String,
}

/// Power and provisioning state from `az vm get-instance-view`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PowerState {
    pub power_state: Option<String>,
    pub provisioning_state: Option<String>,
}

impl PowerState {
    pub fn display(&self) -> &str {
        self.power_state.as_deref().unwrap_or("Unknown")
    }

    pub fn is_running(&self) -> bool {
        self.power_state.as_deref() == Some("VM running")
    }

    pub fn is_deallocated(&self) -> bool {
        self.display().to_lowercase().contains("deallocated")
    }

    pub fn is_stopped(&self) -> bool {
        !self.is_deallocated() && self.display().to_lowercase().contains("stopped")
    }
}

/// The current subscription context from `az account show`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Subscription {
    pub name: String,
    pub id: String,
}

/// Access token metadata from `az account get-access-token`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessToken {
    pub expires_on: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_state_flags() {
        let running = PowerState {
            power_state: Some("VM running".to_string()),
            provisioning_state: Some("Succeeded".to_string()),
        };
        assert!(running.is_running());
        assert!(!running.is_deallocated());
        assert!(!running.is_stopped());

        let dealloc = PowerState {
            power_state: Some("VM deallocated".to_string()),
            ..Default::default()
        };
        assert!(!dealloc.is_running());
        assert!(dealloc.is_deallocated());
        assert!(!dealloc.is_stopped());

        let stopped = PowerState {
            power_state: Some("VM stopped".to_string()),
            ..Default::default()
        };
        assert!(stopped.is_stopped());

        let unknown = PowerState::default();
        assert_eq!(unknown.display(), "Unknown");
        assert!(!unknown.is_running());
    }

    #[test]
    fn test_vm_nic_ids() {
        let vm: Vm = serde_json::from_str(
            r#"{
                "name": "vm-a",
                "location": "westeurope",
                "networkProfile": {
                    "networkInterfaces": [
                        {"id": "/subscriptions/0/resourceGroups/rg/providers/Microsoft.Network/networkInterfaces/nic-a"}
                    ]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(vm.nic_ids().len(), 1);
        assert!(vm.nic_ids()[0].ends_with("nic-a"));
    }
}
