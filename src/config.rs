//! Compile-time defaults shared across the crate.

use std::time::Duration;

/// Default destination port for SSH (Linux VMs).
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Default destination port for RDP (Windows VMs).
pub const DEFAULT_RDP_PORT: u16 = 3389;

/// Lowest priority usable for custom NSG rules.
pub const PRIORITY_START: u32 = 100;

/// One past the highest priority usable for custom NSG rules.
pub const PRIORITY_END: u32 = 4096;

/// Rules at or above this priority are Azure defaults and never touched.
pub const DEFAULT_RULE_FLOOR: u32 = 65000;

/// Public IP echo services, queried in order until one answers.
pub const IP_ECHO_SERVICES: [&str; 3] = [
    "https://api.ipify.org",
    "https://ifconfig.me/ip",
    "https://checkip.amazonaws.com",
];

/// Per-service timeout for public IP detection.
pub const IP_DETECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for a single TCP connect probe.
pub const TCP_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Warm-up wait after starting a VM before re-testing connectivity.
pub const VM_START_WARMUP: Duration = Duration::from_secs(10);

/// Refresh the access token when it expires within this many seconds.
pub const TOKEN_REFRESH_HORIZON_SECS: i64 = 300;

/// Terminal rendering width for banners, boxes and tables.
pub const TERM_WIDTH: usize = 78;
