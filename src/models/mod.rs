//! Data models for resources read from the `az` CLI.
//!
//! All of these are transient: re-fetched at the start of each run,
//! held in memory, discarded at exit.

pub mod access;
pub mod ipv4;
pub mod network;
pub mod nsg;
pub mod resource_id;
pub mod vm;

pub use access::{AccessProfile, OsFamily, PortConfig};
pub use ipv4::Cidr;
pub use network::{IpConfiguration, Nic, PublicIp, Subnet};
pub use nsg::{Nsg, RuleSignature, SecurityRule};
pub use resource_id::{is_resource_id, leaf_name, NsgLocator, SubnetLocator};
pub use vm::{AccessToken, PowerState, ResourceRef, Subscription, Vm, VmListEntry};
