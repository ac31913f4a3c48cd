//! Service access configuration: which port to open for which OS family.

use crate::config::{DEFAULT_RDP_PORT, DEFAULT_SSH_PORT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Linux,
    Windows,
}

impl OsFamily {
    pub fn service(&self) -> &'static str {
        match self {
            OsFamily::Linux => "SSH",
            OsFamily::Windows => "RDP",
        }
    }
}

impl std::fmt::Display for OsFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            OsFamily::Linux => write!(f, "Linux"),
            OsFamily::Windows => write!(f, "Windows"),
        }
    }
}

/// SSH/RDP port configuration, with CLI overrides applied.
#[derive(Debug, Clone, Copy)]
pub struct PortConfig {
    pub ssh_port: u16,
    pub rdp_port: u16,
}

impl Default for PortConfig {
    fn default() -> Self {
        PortConfig {
            ssh_port: DEFAULT_SSH_PORT,
            rdp_port: DEFAULT_RDP_PORT,
        }
    }
}

impl PortConfig {
    pub fn new(ssh_port: Option<u16>, rdp_port: Option<u16>) -> Self {
        PortConfig {
            ssh_port: ssh_port.unwrap_or(DEFAULT_SSH_PORT),
            rdp_port: rdp_port.unwrap_or(DEFAULT_RDP_PORT),
        }
    }

    pub fn port_for(&self, os: OsFamily) -> u16 {
        match os {
            OsFamily::Linux => self.ssh_port,
            OsFamily::Windows => self.rdp_port,
        }
    }

    pub fn ssh_is_custom(&self) -> bool {
        self.ssh_port != DEFAULT_SSH_PORT
    }

    pub fn rdp_is_custom(&self) -> bool {
        self.rdp_port != DEFAULT_RDP_PORT
    }
}

/// Resolved access profile for one VM: OS family, service and port.
#[derive(Debug, Clone)]
pub struct AccessProfile {
    pub os: OsFamily,
    pub port: u16,
    pub vm_name: String,
}

impl AccessProfile {
    pub fn service(&self) -> &'static str {
        self.os.service()
    }
}
