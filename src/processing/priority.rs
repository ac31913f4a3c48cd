//! Priority allocation for new NSG rules.

use crate::config::{PRIORITY_END, PRIORITY_START};
use crate::models::SecurityRule;
use std::collections::HashSet;
use std::error::Error;

/// Return the smallest unused priority in the custom band (100..4096).
///
/// Fails only when every slot is taken, with a pointer at manual cleanup.
pub fn find_available_priority(rules: &[SecurityRule]) -> Result<u32, Box<dyn Error>> {
    let used: HashSet<u32> = rules.iter().map(|r| r.priority).collect();
    for priority in PRIORITY_START..PRIORITY_END {
        if !used.contains(&priority) {
            return Ok(priority);
        }
    }
    Err(format!(
        "No free rule priority in {PRIORITY_START}-{} - remove unused rules from the NSG first",
        PRIORITY_END - 1
    )
    .into())
}
