//! Network side effects: public IP detection and TCP probing.

pub mod probe;
pub mod public_ip;

pub use probe::{tcp_probe, ProbeOutcome};
pub use public_ip::{detect_public_ip, parse_override};
