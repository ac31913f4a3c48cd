//! TCP connectivity probe.
//!
//! Distinguishes the failure modes that matter when a freshly created NSG
//! rule does not work yet: refused (host reachable, port closed), timed
//! out (filtered), no route, and DNS failure.

use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;

/// Result of a single TCP connect attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// Handshake completed; latency in milliseconds.
    Open { latency_ms: f64 },
    /// Active rejection, usually an RST from the host itself.
    Refused,
    /// No response within the probe timeout; typical of a filtering NSG.
    TimedOut { secs: u64 },
    /// No route to host (errno 113 / WSAEHOSTUNREACH).
    NoRoute,
    /// Network unreachable (errno 101 / WSAENETUNREACH).
    NetworkUnreachable,
    /// Hostname did not resolve.
    DnsFailure(String),
    /// Anything else the OS reported.
    Other(String),
}

impl ProbeOutcome {
    pub fn is_open(&self) -> bool {
        matches!(self, ProbeOutcome::Open { .. })
    }

    /// Human-readable description for the connectivity report.
    pub fn message(&self) -> String {
        match self {
            ProbeOutcome::Open { latency_ms } => {
                format!("Port open, connected in {latency_ms:.0} ms")
            }
            ProbeOutcome::Refused => {
                "Connection refused (host reachable, service not listening)".to_string()
            }
            ProbeOutcome::TimedOut { secs } => {
                format!("Connection timed out after {secs}s (traffic likely filtered)")
            }
            ProbeOutcome::NoRoute => "No route to host".to_string(),
            ProbeOutcome::NetworkUnreachable => "Network unreachable".to_string(),
            ProbeOutcome::DnsFailure(e) => format!("Hostname resolution failed: {e}"),
            ProbeOutcome::Other(e) => format!("Connection failed: {e}"),
        }
    }
}

/// Attempt a TCP connection to `host:port` within `timeout`.
pub async fn tcp_probe(host: &str, port: u16, timeout: Duration) -> ProbeOutcome {
    let addr: SocketAddr = match tokio::net::lookup_host((host, port)).await {
        Ok(mut addrs) => match addrs.next() {
            Some(addr) => addr,
            None => return ProbeOutcome::DnsFailure(format!("no addresses for {host}")),
        },
        Err(e) => return ProbeOutcome::DnsFailure(e.to_string()),
    };

    let start = Instant::now();
    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_stream)) => ProbeOutcome::Open {
            latency_ms: start.elapsed().as_secs_f64() * 1000.0,
        },
        Ok(Err(e)) => classify_connect_error(&e),
        Err(_) => ProbeOutcome::TimedOut {
            secs: timeout.as_secs(),
        },
    }
}

fn classify_connect_error(e: &io::Error) -> ProbeOutcome {
    // Raw errno first: std maps some of these to Uncategorized.
    match e.raw_os_error() {
        Some(113) | Some(10065) => return ProbeOutcome::NoRoute,
        Some(101) | Some(10051) => return ProbeOutcome::NetworkUnreachable,
        _ => {}
    }
    match e.kind() {
        io::ErrorKind::ConnectionRefused => ProbeOutcome::Refused,
        io::ErrorKind::TimedOut => ProbeOutcome::TimedOut { secs: 0 },
        _ => ProbeOutcome::Other(e.to_string()),
    }
}
