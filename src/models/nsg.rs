//! Network security groups and their rules.

use crate::config::DEFAULT_RULE_FLOOR;
use serde::{Deserialize, Serialize};

/// An NSG as returned by `az network nsg create/show`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Nsg {
    pub id: String,
    pub name: String,
    pub location: String,
    pub security_rules: Vec<SecurityRule>,
}

/// A single security rule as returned by `az network nsg rule list`.
///
/// Azure exposes singular and plural forms for source/destination prefixes
/// and port specs; either may be populated depending on how the rule was
/// created.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityRule {
    pub name: String,
    pub priority: u32,
    pub direction: String,
    pub access: String,
    pub protocol: String,
    pub source_address_prefix: Option<String>,
    pub source_address_prefixes: Vec<String>,
    pub source_port_range: Option<String>,
    pub source_port_ranges: Vec<String>,
    pub destination_address_prefix: Option<String>,
    pub destination_address_prefixes: Vec<String>,
    pub destination_port_range: Option<String>,
    pub destination_port_ranges: Vec<String>,
    pub description: Option<String>,
}

/// Equivalence key for duplicate detection: exact (lowercased) field
/// equality, not semantic CIDR overlap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleSignature {
    pub direction: String,
    pub access: String,
    pub protocol: String,
    pub source_prefix: String,
    pub source_port: String,
    pub destination_prefix: String,
    pub destination_port: String,
}

impl SecurityRule {
    /// Azure-managed default rules live at priority >= 65000 and are never
    /// matched, deduplicated or deleted.
    pub fn is_default(&self) -> bool {
        self.priority >= DEFAULT_RULE_FLOOR
    }

    pub fn signature(&self) -> RuleSignature {
        let lower = |s: &Option<String>| s.as_deref().unwrap_or("").to_lowercase();
        RuleSignature {
            direction: self.direction.to_lowercase(),
            access: self.access.to_lowercase(),
            protocol: self.protocol.to_lowercase(),
            source_prefix: lower(&self.source_address_prefix),
            source_port: lower(&self.source_port_range),
            destination_prefix: lower(&self.destination_address_prefix),
            destination_port: lower(&self.destination_port_range),
        }
    }

    /// All source prefixes, singular field first.
    pub fn source_prefixes(&self) -> Vec<&str> {
        let mut prefixes: Vec<&str> = Vec::new();
        if let Some(p) = self.source_address_prefix.as_deref() {
            if !p.is_empty() {
                prefixes.push(p);
            }
        }
        prefixes.extend(self.source_address_prefixes.iter().map(|p| p.as_str()));
        prefixes
    }

    /// All destination port specs, singular field first.
    pub fn destination_port_specs(&self) -> Vec<&str> {
        let mut specs: Vec<&str> = Vec::new();
        if let Some(p) = self.destination_port_range.as_deref() {
            if !p.is_empty() {
                specs.push(p);
            }
        }
        specs.extend(self.destination_port_ranges.iter().map(|p| p.as_str()));
        specs
    }

    /// Human-readable source for reporting.
    pub fn display_source(&self) -> String {
        let prefixes = self.source_prefixes();
        if prefixes.is_empty() {
            "*".to_string()
        } else {
            prefixes.join(", ")
        }
    }

    /// Human-readable destination port for reporting.
    pub fn display_port(&self) -> String {
        let specs = self.destination_port_specs();
        if specs.is_empty() {
            "*".to_string()
        } else {
            specs.join(", ")
        }
    }
}
