//! Command line interface.

use clap::Parser;

/// Grant, verify and clean up SSH/RDP access to Azure VMs through NSG
/// rules scoped to the caller's public IP.
#[derive(Parser, Debug)]
#[command(name = "azure-nsg-access", version, about)]
pub struct Args {
    /// Target a single VM by its full Azure resource ID
    #[arg(long, conflicts_with = "all")]
    pub resource_id: Option<String>,

    /// Target every VM in the current subscription
    #[arg(long)]
    pub all: bool,

    /// Use this public IPv4 address instead of detecting it
    #[arg(long)]
    pub ip: Option<String>,

    /// Destination port for SSH rules on Linux VMs
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub ssh_port: Option<u16>,

    /// Destination port for RDP rules on Windows VMs
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub rdp_port: Option<u16>,

    /// Prompt before starting stopped VMs during connectivity tests
    #[arg(short, long)]
    pub interactive: bool,

    /// Only remove duplicate NSG rules; create nothing
    #[arg(long, conflicts_with_all = ["test_only", "remove_rules"])]
    pub cleanup_only: bool,

    /// Test connectivity after creating rules
    #[arg(long, conflicts_with = "test_only")]
    pub test: bool,

    /// Only test connectivity; change nothing
    #[arg(long, conflicts_with = "remove_rules")]
    pub test_only: bool,

    /// Remove all custom rules from the targeted VMs' NSGs
    #[arg(long)]
    pub remove_rules: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// What the run does, derived from the mode flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Create allow rules (the default), optionally testing afterwards.
    Grant,
    CleanupOnly,
    TestOnly,
    RemoveRules,
}

impl Args {
    /// Whether this run is interactive: explicitly requested with `-i`, or
    /// implied by selecting VMs through the picker instead of
    /// `--resource-id`/`--all`. Gates every optional prompt, including the
    /// offer to start a stopped VM.
    pub fn interactive_session(&self) -> bool {
        self.interactive || (self.resource_id.is_none() && !self.all)
    }

    pub fn mode(&self) -> Mode {
        if self.cleanup_only {
            Mode::CleanupOnly
        } else if self.test_only {
            Mode::TestOnly
        } else if self.remove_rules {
            Mode::RemoveRules
        } else {
            Mode::Grant
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_is_grant() {
        let args = Args::try_parse_from(["azure-nsg-access"]).unwrap();
        assert_eq!(args.mode(), Mode::Grant);
        assert!(!args.all);
        assert!(args.resource_id.is_none());
    }

    #[test]
    fn test_mode_flags() {
        let args = Args::try_parse_from(["azure-nsg-access", "--cleanup-only"]).unwrap();
        assert_eq!(args.mode(), Mode::CleanupOnly);
        let args = Args::try_parse_from(["azure-nsg-access", "--test-only"]).unwrap();
        assert_eq!(args.mode(), Mode::TestOnly);
        let args = Args::try_parse_from(["azure-nsg-access", "--remove-rules"]).unwrap();
        assert_eq!(args.mode(), Mode::RemoveRules);
    }

    #[test]
    fn test_interactive_session_derivation() {
        // A bare run selects VMs through the picker and is interactive.
        let args = Args::try_parse_from(["azure-nsg-access"]).unwrap();
        assert!(args.interactive_session());

        // Flag-driven targeting is non-interactive unless -i is passed.
        let args = Args::try_parse_from(["azure-nsg-access", "--all"]).unwrap();
        assert!(!args.interactive_session());
        let args = Args::try_parse_from([
            "azure-nsg-access",
            "--resource-id",
            "/subscriptions/0/x",
        ])
        .unwrap();
        assert!(!args.interactive_session());

        let args = Args::try_parse_from(["azure-nsg-access", "--all", "-i"]).unwrap();
        assert!(args.interactive_session());
    }

    #[test]
    fn test_port_range_enforced() {
        assert!(Args::try_parse_from(["azure-nsg-access", "--ssh-port", "2222"]).is_ok());
        assert!(Args::try_parse_from(["azure-nsg-access", "--ssh-port", "0"]).is_err());
        assert!(Args::try_parse_from(["azure-nsg-access", "--rdp-port", "70000"]).is_err());
    }

    #[test]
    fn test_conflicting_flags_rejected() {
        assert!(Args::try_parse_from([
            "azure-nsg-access",
            "--resource-id",
            "/subscriptions/0/x",
            "--all"
        ])
        .is_err());
        assert!(Args::try_parse_from(["azure-nsg-access", "--test", "--test-only"]).is_err());
        assert!(
            Args::try_parse_from(["azure-nsg-access", "--cleanup-only", "--remove-rules"]).is_err()
        );
    }
}
