//! Pure rule-matching logic, unit-testable against synthetic rule lists.
//!
//! - [`os_detect`] - Linux/Windows classification from VM descriptors
//! - [`dedup`] - duplicate rule detection
//! - [`priority`] - free priority slot search
//! - [`shadow`] - existing-access / deny-shadowing detection

pub mod dedup;
pub mod os_detect;
pub mod priority;
pub mod shadow;

pub use dedup::{find_duplicate_rules, DuplicateRule};
pub use os_detect::classify_vm;
pub use priority::find_available_priority;
pub use shadow::{find_effective_rule, EffectiveAccess};
