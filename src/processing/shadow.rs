//! Existing-access detection.
//!
//! Before creating an allow rule, scan the NSG's custom rules in provider
//! evaluation order (ascending priority) and find the first rule whose
//! source and destination port cover the candidate. An Allow match means
//! access is already granted; a Deny match means a new, higher-numbered
//! allow rule would be shadowed and useless.

use crate::models::{Cidr, SecurityRule};
use std::net::Ipv4Addr;

/// Outcome of scanning existing rules for a (source IP, port) candidate.
#[derive(Debug, Clone)]
pub enum EffectiveAccess {
    /// The first matching rule allows the traffic; no new rule needed.
    AlreadyAllowed(SecurityRule),
    /// The first matching rule denies the traffic; a new allow rule would
    /// be shadowed by it.
    DeniedBy(SecurityRule),
    /// No existing rule covers the candidate.
    NoMatch,
}

/// Whether a rule port spec covers a target port: wildcard, exact value,
/// or numeric range containment ("1000-2000").
pub fn port_covers(rule_port: &str, target: u16) -> bool {
    let rule_port = rule_port.trim();
    if rule_port.is_empty() {
        return false;
    }
    if rule_port == "*" {
        return true;
    }
    if rule_port == target.to_string() {
        return true;
    }
    if let Some((low, high)) = rule_port.split_once('-') {
        if let (Ok(low), Ok(high)) = (low.trim().parse::<u16>(), high.trim().parse::<u16>()) {
            return low <= target && target <= high;
        }
    }
    false
}

/// Whether a rule source spec covers an IP: wildcard token, exact IP,
/// `{ip}/32`, or CIDR containment.
///
/// CIDR containment deliberately counts partial coverage: a `10.0.0.0/24`
/// allow covers a `/32` candidate inside it, so no redundant rule is added.
pub fn source_covers(rule_source: &str, ip: Ipv4Addr) -> bool {
    let rule_source = rule_source.trim();
    if rule_source.is_empty() {
        return false;
    }
    if matches!(rule_source, "*" | "Internet" | "Any") {
        return true;
    }
    if rule_source == ip.to_string() || rule_source == format!("{ip}/32") {
        return true;
    }
    if rule_source.contains('/') {
        if let Ok(cidr) = Cidr::new(rule_source) {
            return cidr.contains(ip);
        }
    }
    false
}

/// Scan custom rules in ascending priority order; the first rule matching
/// the candidate's direction/protocol/source/port decides the outcome.
pub fn find_effective_rule(rules: &[SecurityRule], ip: Ipv4Addr, port: u16) -> EffectiveAccess {
    let mut sorted: Vec<&SecurityRule> = rules.iter().filter(|r| !r.is_default()).collect();
    sorted.sort_by_key(|r| r.priority);

    for rule in sorted {
        if !rule.direction.eq_ignore_ascii_case("inbound") {
            continue;
        }
        let protocol = rule.protocol.to_lowercase();
        if protocol != "tcp" && protocol != "*" {
            continue;
        }
        if !rule.source_prefixes().iter().any(|p| source_covers(p, ip)) {
            continue;
        }
        if !rule
            .destination_port_specs()
            .iter()
            .any(|p| port_covers(p, port))
        {
            continue;
        }

        return if rule.access.eq_ignore_ascii_case("allow") {
            EffectiveAccess::AlreadyAllowed(rule.clone())
        } else {
            EffectiveAccess::DeniedBy(rule.clone())
        };
    }

    EffectiveAccess::NoMatch
}
