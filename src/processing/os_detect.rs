//! OS family classification for VMs.
//!
//! Decides whether a VM is Linux (SSH) or Windows (RDP) from its descriptor.
//! Strategies are tried in order; absence of a signal falls through to the
//! next, and only total exhaustion triggers the Linux default.

use crate::models::{AccessProfile, OsFamily, PortConfig, Vm};

/// Markers in image reference publisher/offer/sku that indicate Windows.
const WINDOWS_MARKERS: [&str; 5] = [
    "windows",
    "windowsserver",
    "windowsdesktop",
    "microsoftwindows",
    "win",
];

/// Classify a VM descriptor as Linux or Windows and resolve the service port.
pub fn classify_vm(vm: &Vm, ports: &PortConfig) -> AccessProfile {
    let os = os_family(vm).unwrap_or_else(|| {
        log::warn!(
            "Could not detect OS for VM '{}', defaulting to Linux (SSH)",
            vm.name
        );
        OsFamily::Linux
    });

    AccessProfile {
        os,
        port: ports.port_for(os),
        vm_name: vm.name.clone(),
    }
}

/// Returns None when no strategy yields a definitive signal.
pub fn os_family(vm: &Vm) -> Option<OsFamily> {
    // Strategy 1: osProfile configuration objects
    if let Some(os_profile) = &vm.os_profile {
        if os_profile.windows_configuration.is_some() {
            return Some(OsFamily::Windows);
        }
        if os_profile.linux_configuration.is_some() {
            return Some(OsFamily::Linux);
        }
    }

    let storage = vm.storage_profile.as_ref();

    // Strategy 2: osDisk.osType field
    if let Some(os_type) = storage
        .and_then(|s| s.os_disk.as_ref())
        .and_then(|d| d.os_type.as_deref())
    {
        if os_type.eq_ignore_ascii_case("windows") {
            return Some(OsFamily::Windows);
        }
        if os_type.eq_ignore_ascii_case("linux") {
            return Some(OsFamily::Linux);
        }
    }

    // Strategy 3: image reference keywords
    if let Some(image) = storage.and_then(|s| s.image_reference.as_ref()) {
        let fields = [&image.publisher, &image.offer, &image.sku];
        let looks_windows = fields.iter().any(|f| {
            f.as_deref().map_or(false, |v| {
                let v = v.to_lowercase();
                WINDOWS_MARKERS.iter().any(|kw| v.contains(kw))
            })
        });
        if looks_windows {
            return Some(OsFamily::Windows);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vm::{ImageReference, OsDisk, OsProfile, StorageProfile};

    fn vm_with(os_profile: Option<OsProfile>, storage: Option<StorageProfile>) -> Vm {
        Vm {
            name: "vm-test".to_string(),
            location: "westeurope".to_string(),
            os_profile,
            storage_profile: storage,
            network_profile: None,
        }
    }

    #[test]
    fn test_windows_profile_wins_over_image_reference() {
        // Windows configuration profile must classify as Windows/RDP
        // regardless of image reference fields.
        let vm = vm_with(
            Some(OsProfile {
                windows_configuration: Some(serde_json::json!({})),
                linux_configuration: None,
            }),
            Some(StorageProfile {
                os_disk: None,
                image_reference: Some(ImageReference {
                    publisher: Some("Canonical".to_string()),
                    offer: Some("ubuntu-server".to_string()),
                    sku: Some("22_04-lts".to_string()),
                }),
            }),
        );
        let profile = classify_vm(&vm, &PortConfig::default());
        assert_eq!(profile.os, OsFamily::Windows);
        assert_eq!(profile.service(), "RDP");
        assert_eq!(profile.port, 3389);
    }

    #[test]
    fn test_linux_os_disk_without_profile() {
        // No OS profile, Linux-typed OS disk, no image reference.
        let vm = vm_with(
            None,
            Some(StorageProfile {
                os_disk: Some(OsDisk {
                    os_type: Some("Linux".to_string()),
                }),
                image_reference: None,
            }),
        );
        let profile = classify_vm(&vm, &PortConfig::default());
        assert_eq!(profile.os, OsFamily::Linux);
        assert_eq!(profile.service(), "SSH");
        assert_eq!(profile.port, 22);
    }

    #[test]
    fn test_image_reference_markers() {
        let vm = vm_with(
            None,
            Some(StorageProfile {
                os_disk: None,
                image_reference: Some(ImageReference {
                    publisher: Some("MicrosoftWindowsServer".to_string()),
                    offer: None,
                    sku: None,
                }),
            }),
        );
        assert_eq!(os_family(&vm), Some(OsFamily::Windows));
    }

    #[test]
    fn test_default_linux_when_exhausted() {
        let vm = vm_with(None, None);
        assert_eq!(os_family(&vm), None);
        let profile = classify_vm(&vm, &PortConfig::default());
        assert_eq!(profile.os, OsFamily::Linux);
    }

    #[test]
    fn test_port_override_applied() {
        let vm = vm_with(
            None,
            Some(StorageProfile {
                os_disk: Some(OsDisk {
                    os_type: Some("linux".to_string()),
                }),
                image_reference: None,
            }),
        );
        let profile = classify_vm(&vm, &PortConfig::new(Some(2222), None));
        assert_eq!(profile.port, 2222);
    }
}
