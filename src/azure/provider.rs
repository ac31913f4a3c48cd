//! The narrow interface between the workflows and the Azure CLI.
//!
//! Every read and write of cloud state goes through [`Provider`], so the
//! matching/deduplication/allocation logic can be exercised against
//! synthetic responses without spawning any external process.

use crate::models::{
    AccessToken, Nic, Nsg, NsgLocator, PowerState, PublicIp, SecurityRule, Subnet, SubnetLocator,
    Subscription, Vm, VmListEntry,
};
use std::fmt;

/// Categorized provider failure, replacing string matching on stderr at
/// call sites.
#[derive(Debug)]
pub enum ProviderError {
    /// The `az` binary is not installed or not on PATH.
    CliMissing(String),
    /// The command failed because the access token is expired or missing.
    AuthExpired(String),
    /// The command ran and the provider rejected it.
    Command(String),
    /// The command succeeded but its output could not be parsed.
    Parse(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProviderError::CliMissing(msg) => write!(f, "Azure CLI not found: {msg}"),
            ProviderError::AuthExpired(msg) => write!(f, "Azure access token expired: {msg}"),
            ProviderError::Command(msg) => write!(f, "Azure CLI command failed: {msg}"),
            ProviderError::Parse(msg) => write!(f, "Failed to parse Azure CLI output: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Parameters for a new inbound allow rule.
#[derive(Debug, Clone)]
pub struct NewRule {
    pub name: String,
    pub priority: u32,
    pub source_prefix: String,
    pub destination_port: u16,
    pub description: String,
}

/// Capabilities the workflows need from the cloud provider.
pub trait Provider {
    fn current_subscription(&self) -> Result<Subscription, ProviderError>;

    fn list_vms(&self) -> Result<Vec<VmListEntry>, ProviderError>;
    fn show_vm(&self, resource_id: &str) -> Result<Vm, ProviderError>;
    fn vm_power_state(&self, resource_id: &str) -> Result<PowerState, ProviderError>;
    fn start_vm(&self, resource_id: &str) -> Result<(), ProviderError>;
    /// Aggregated `az vm list-ip-addresses` lookup, used when walking the
    /// NICs finds no assigned address.
    fn vm_public_ip_fallback(&self, resource_id: &str) -> Result<Option<String>, ProviderError>;

    fn show_nic(&self, nic_id: &str) -> Result<Nic, ProviderError>;
    fn show_subnet(&self, subnet: &SubnetLocator) -> Result<Subnet, ProviderError>;
    fn show_public_ip(&self, public_ip_id: &str) -> Result<PublicIp, ProviderError>;

    fn create_nsg(
        &self,
        resource_group: &str,
        name: &str,
        location: &str,
    ) -> Result<Nsg, ProviderError>;
    fn attach_nsg_to_nic(&self, nic_id: &str, nsg_id: &str) -> Result<(), ProviderError>;
    fn attach_nsg_to_subnet(
        &self,
        subnet: &SubnetLocator,
        nsg_id: &str,
    ) -> Result<(), ProviderError>;

    fn list_rules(&self, nsg: &NsgLocator) -> Result<Vec<SecurityRule>, ProviderError>;
    fn create_rule(&self, nsg: &NsgLocator, rule: &NewRule) -> Result<(), ProviderError>;
    fn delete_rule(&self, nsg: &NsgLocator, rule_name: &str) -> Result<(), ProviderError>;

    fn get_access_token(&self) -> Result<AccessToken, ProviderError>;
    /// Interactive browser login; only used when silent refresh fails.
    fn login(&self) -> Result<(), ProviderError>;
}
