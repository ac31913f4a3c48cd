//! NSG rule de-duplication.
//!
//! Within one NSG, rules with identical signatures collapse to the single
//! survivor with the lowest priority number. Azure default rules (priority
//! >= 65000) are excluded entirely.

use crate::models::SecurityRule;
use itertools::Itertools;

/// A duplicate rule slated for deletion, with the survivor it duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRule {
    pub name: String,
    pub priority: u32,
    pub kept_name: String,
    pub kept_priority: u32,
}

/// Find all duplicates among custom rules. The lowest-priority-number rule
/// in each signature group is kept; the rest are reported for deletion,
/// ordered by priority within each group.
pub fn find_duplicate_rules(rules: &[SecurityRule]) -> Vec<DuplicateRule> {
    let groups = rules
        .iter()
        .filter(|r| !r.is_default())
        .map(|r| (r.signature(), r))
        .into_group_map();

    let mut duplicates: Vec<DuplicateRule> = Vec::new();
    for (_, mut group) in groups {
        if group.len() < 2 {
            continue;
        }
        group.sort_by_key(|r| r.priority);
        let kept = group[0];
        for dup in &group[1..] {
            duplicates.push(DuplicateRule {
                name: dup.name.clone(),
                priority: dup.priority,
                kept_name: kept.name.clone(),
                kept_priority: kept.priority,
            });
        }
    }

    // Group-map iteration order is unstable; sort for deterministic reports.
    duplicates.sort_by_key(|d| d.priority);
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, priority: u32, src: &str, port: &str) -> SecurityRule {
        SecurityRule {
            name: name.to_string(),
            priority,
            direction: "Inbound".to_string(),
            access: "Allow".to_string(),
            protocol: "Tcp".to_string(),
            source_address_prefix: Some(src.to_string()),
            source_port_range: Some("*".to_string()),
            destination_address_prefix: Some("*".to_string()),
            destination_port_range: Some(port.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_lowest_priority_survives() {
        let rules = vec![
            rule("b", 200, "203.0.113.50/32", "22"),
            rule("a", 100, "203.0.113.50/32", "22"),
            rule("c", 300, "203.0.113.50/32", "22"),
        ];
        let dups = find_duplicate_rules(&rules);
        assert_eq!(dups.len(), 2);
        assert_eq!(dups[0].name, "b");
        assert_eq!(dups[0].kept_name, "a");
        assert_eq!(dups[0].kept_priority, 100);
        assert_eq!(dups[1].name, "c");
        assert_eq!(dups[1].kept_name, "a");
    }

    #[test]
    fn test_distinct_rules_untouched() {
        let rules = vec![
            rule("ssh", 100, "203.0.113.50/32", "22"),
            rule("rdp", 110, "203.0.113.50/32", "3389"),
            rule("other-ip", 120, "198.51.100.7/32", "22"),
        ];
        assert!(find_duplicate_rules(&rules).is_empty());
    }

    #[test]
    fn test_default_rules_never_considered() {
        let mut deny_a = rule("DenyAllInBound", 65500, "*", "*");
        deny_a.access = "Deny".to_string();
        let mut deny_b = rule("DenyAllInBound-copy", 65400, "*", "*");
        deny_b.access = "Deny".to_string();
        // Identical signatures at default priorities must not be reported.
        let rules = vec![deny_a, deny_b, rule("ssh", 100, "203.0.113.50/32", "22")];
        assert!(find_duplicate_rules(&rules).is_empty());
    }

    #[test]
    fn test_case_insensitive_duplicates() {
        let mut upper = rule("upper", 250, "203.0.113.50/32", "22");
        upper.access = "ALLOW".to_string();
        upper.protocol = "TCP".to_string();
        let rules = vec![rule("lower", 150, "203.0.113.50/32", "22"), upper];
        let dups = find_duplicate_rules(&rules);
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].name, "upper");
        assert_eq!(dups[0].kept_name, "lower");
    }
}
