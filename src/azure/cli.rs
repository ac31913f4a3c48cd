//! Azure CLI command execution.
//!
//! [`AzCli`] is the live [`Provider`]: every call shells out to `az`,
//! requests JSON output, and parses the response. A command that fails with
//! an expired-token error is retried exactly once after a token refresh.

use super::provider::{NewRule, Provider, ProviderError};
use crate::models::{
    AccessToken, Nic, Nsg, NsgLocator, PowerState, PublicIp, SecurityRule, Subnet, SubnetLocator,
    Subscription, Vm, VmListEntry,
};
use crate::output::terminal;
use colored::Colorize;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::process::{Command, Stdio};
use std::sync::OnceLock;

/// Patterns in `az` stderr that indicate an expired or missing token.
static AUTH_FAILURE_REGEX: OnceLock<Regex> = OnceLock::new();

fn auth_failure_regex() -> &'static Regex {
    AUTH_FAILURE_REGEX.get_or_init(|| {
        Regex::new(r"AADSTS\d+|az login|expired").expect("Invalid Regex")
    })
}

/// Whether stderr text indicates an authentication/token failure.
pub fn is_auth_failure(stderr: &str) -> bool {
    auth_failure_regex().is_match(stderr)
}

/// `az` sometimes prints warning lines before the JSON body; skip to the
/// first line that opens an object or array.
pub fn strip_to_json(output: &str) -> &str {
    let trimmed = output.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') || trimmed.starts_with('"') {
        return trimmed;
    }
    let mut offset = 0usize;
    for line in output.split_inclusive('\n') {
        let stripped = line.trim_start();
        if stripped.starts_with('{') || stripped.starts_with('[') {
            return output[offset..].trim();
        }
        offset += line.len();
    }
    trimmed
}

/// The installed Azure CLI, with the platform-appropriate binary name.
#[derive(Debug, Clone)]
pub struct AzCli {
    az_bin: &'static str,
    platform: &'static str,
}

fn is_wsl() -> bool {
    std::fs::read_to_string("/proc/version")
        .map(|v| v.to_lowercase().contains("microsoft"))
        .unwrap_or(false)
}

fn az_on_path() -> bool {
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join("az").is_file()))
        .unwrap_or(false)
}

impl AzCli {
    /// Detect the runtime environment and pick the `az` binary to invoke.
    /// WSL prefers a native Linux `az`, falling back to the Windows
    /// `az.cmd` when none is on PATH.
    pub fn discover() -> AzCli {
        if cfg!(windows) {
            AzCli {
                az_bin: "az",
                platform: "Windows",
            }
        } else if is_wsl() {
            if az_on_path() {
                AzCli {
                    az_bin: "az",
                    platform: "WSL (native az)",
                }
            } else {
                AzCli {
                    az_bin: "az.cmd",
                    platform: "WSL (Windows az)",
                }
            }
        } else {
            AzCli {
                az_bin: "az",
                platform: "Linux/macOS",
            }
        }
    }

    pub fn platform(&self) -> &'static str {
        self.platform
    }

    /// Run `az` with the given arguments and return stdout. No retry.
    fn run(&self, args: &[&str]) -> Result<String, ProviderError> {
        let display = format!("{} {}", self.az_bin, args.join(" "));
        log::debug!("run({cmd})", cmd = display.on_blue());

        let output = Command::new(self.az_bin).args(args).output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProviderError::CliMissing(format!(
                    "'{}' is not installed or not on PATH ({e})",
                    self.az_bin
                ))
            } else {
                ProviderError::Command(format!("Failed to execute '{}': {e}", self.az_bin))
            }
        })?;

        if output.status.success() {
            log::debug!("Success cmd: {display}");
            log::debug!("Success output.stdout.len(): {}", output.stdout.len());

            if output.stdout.len() > 500_000 {
                return Err(ProviderError::Parse(format!(
                    "Response too large: {} bytes for command: {display}",
                    output.stdout.len()
                )));
            }
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            log::trace!(
                "code={code:?}, status={status}\n┎######\nstderr=\n{stderr}\n┖######",
                code = output.status.code(),
                status = output.status,
                stderr = stderr.red()
            );
            log::warn!(
                "{failed} to run {cmd}",
                failed = "failed".on_red(),
                cmd = display.on_blue()
            );
            if is_auth_failure(&stderr) {
                Err(ProviderError::AuthExpired(stderr))
            } else {
                Err(ProviderError::Command(stderr))
            }
        }
    }

    /// Run with the single-call refresh-and-retry behaviour: when the
    /// failure is an expired token, refresh once and retry this command
    /// only.
    fn run_with_refresh(&self, args: &[&str]) -> Result<String, ProviderError> {
        match self.run(args) {
            Err(ProviderError::AuthExpired(msg)) => {
                terminal::warn("Access token expired or not found. Refreshing...");
                log::warn!("Auth failure, refreshing token: {msg}");
                self.refresh_token()?;
                self.run(args)
            }
            other => other,
        }
    }

    /// Run with `--output json` appended and parse the response.
    fn run_json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T, ProviderError> {
        let mut full: Vec<&str> = args.to_vec();
        full.extend(["--output", "json"]);
        let output = self.run_with_refresh(&full)?;
        parse_json(&output)
    }

    /// Silent refresh via `account get-access-token`; interactive
    /// `az login` as the fallback.
    pub fn refresh_token(&self) -> Result<(), ProviderError> {
        terminal::info("Attempting to refresh Azure CLI token...");
        match self.run(&["account", "get-access-token", "--output", "json"]) {
            Ok(_) => {
                terminal::success("Token refreshed successfully.");
                Ok(())
            }
            Err(_) => {
                terminal::info("Token refresh failed. Initiating interactive login...");
                self.run_interactive(&["login"])?;
                terminal::success("Token refreshed successfully.");
                Ok(())
            }
        }
    }

    /// Run with inherited stdio, for the interactive login flow.
    fn run_interactive(&self, args: &[&str]) -> Result<(), ProviderError> {
        let status = Command::new(self.az_bin)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ProviderError::CliMissing(format!(
                        "'{}' is not installed or not on PATH ({e})",
                        self.az_bin
                    ))
                } else {
                    ProviderError::Command(format!("Failed to execute '{}': {e}", self.az_bin))
                }
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(ProviderError::AuthExpired(
                "Azure login failed. Please run 'az login' manually.".to_string(),
            ))
        }
    }
}

/// Parse a JSON body, tolerating leading warning lines and reporting the
/// failing path on error.
fn parse_json<T: DeserializeOwned>(output: &str) -> Result<T, ProviderError> {
    let body = strip_to_json(output);
    let mut deserializer = serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        log::error!("OUTPUT START:\n\n{}\n\nOUTPUT END\n", output);
        ProviderError::Parse(format!("path={} error={}", e.path(), e))
    })
}

impl Provider for AzCli {
    fn current_subscription(&self) -> Result<Subscription, ProviderError> {
        self.run_json(&["account", "show"])
    }

    fn list_vms(&self) -> Result<Vec<VmListEntry>, ProviderError> {
        self.run_json(&[
            "vm",
            "list",
            "--query",
            "[].{name:name, id:id, resourceGroup:resourceGroup}",
        ])
    }

    fn show_vm(&self, resource_id: &str) -> Result<Vm, ProviderError> {
        self.run_json(&["vm", "show", "--ids", resource_id])
    }

    fn vm_power_state(&self, resource_id: &str) -> Result<PowerState, ProviderError> {
        self.run_json(&[
            "vm",
            "get-instance-view",
            "--ids",
            resource_id,
            "--query",
            "{powerState: instanceView.statuses[?starts_with(code, 'PowerState/')].displayStatus | [0], provisioningState: provisioningState}",
        ])
    }

    fn start_vm(&self, resource_id: &str) -> Result<(), ProviderError> {
        self.run_with_refresh(&["vm", "start", "--ids", resource_id])
            .map(|_| ())
    }

    fn vm_public_ip_fallback(&self, resource_id: &str) -> Result<Option<String>, ProviderError> {
        let ip: Option<String> = self.run_json(&[
            "vm",
            "list-ip-addresses",
            "--ids",
            resource_id,
            "--query",
            "[0].virtualMachine.network.publicIpAddresses[0].ipAddress",
        ])?;
        Ok(ip.filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("none")))
    }

    fn show_nic(&self, nic_id: &str) -> Result<Nic, ProviderError> {
        self.run_json(&["network", "nic", "show", "--ids", nic_id])
    }

    fn show_subnet(&self, subnet: &SubnetLocator) -> Result<Subnet, ProviderError> {
        self.run_json(&[
            "network",
            "vnet",
            "subnet",
            "show",
            "--resource-group",
            &subnet.resource_group,
            "--vnet-name",
            &subnet.vnet_name,
            "--name",
            &subnet.name,
        ])
    }

    fn show_public_ip(&self, public_ip_id: &str) -> Result<PublicIp, ProviderError> {
        self.run_json(&["network", "public-ip", "show", "--ids", public_ip_id])
    }

    fn create_nsg(
        &self,
        resource_group: &str,
        name: &str,
        location: &str,
    ) -> Result<Nsg, ProviderError> {
        // `az network nsg create` wraps the NSG in a "NewNSG" envelope on
        // some CLI versions and returns it bare on others.
        let value: serde_json::Value = self.run_json(&[
            "network",
            "nsg",
            "create",
            "--resource-group",
            resource_group,
            "--name",
            name,
            "--location",
            location,
        ])?;
        let nsg_value = value.get("NewNSG").cloned().unwrap_or(value);
        serde_json::from_value(nsg_value)
            .map_err(|e| ProviderError::Parse(format!("nsg create response: {e}")))
    }

    fn attach_nsg_to_nic(&self, nic_id: &str, nsg_id: &str) -> Result<(), ProviderError> {
        let resource_group = crate::models::resource_id::segment_value(nic_id, "resourceGroups")
            .map_err(|e| ProviderError::Command(e.to_string()))?;
        let nic_name = crate::models::leaf_name(nic_id);
        self.run_json::<serde_json::Value>(&[
            "network",
            "nic",
            "update",
            "--resource-group",
            &resource_group,
            "--name",
            nic_name,
            "--network-security-group",
            nsg_id,
        ])
        .map(|_| ())
    }

    fn attach_nsg_to_subnet(
        &self,
        subnet: &SubnetLocator,
        nsg_id: &str,
    ) -> Result<(), ProviderError> {
        self.run_json::<serde_json::Value>(&[
            "network",
            "vnet",
            "subnet",
            "update",
            "--resource-group",
            &subnet.resource_group,
            "--vnet-name",
            &subnet.vnet_name,
            "--name",
            &subnet.name,
            "--network-security-group",
            nsg_id,
        ])
        .map(|_| ())
    }

    fn list_rules(&self, nsg: &NsgLocator) -> Result<Vec<SecurityRule>, ProviderError> {
        self.run_json(&[
            "network",
            "nsg",
            "rule",
            "list",
            "--nsg-name",
            &nsg.name,
            "--resource-group",
            &nsg.resource_group,
        ])
    }

    fn create_rule(&self, nsg: &NsgLocator, rule: &NewRule) -> Result<(), ProviderError> {
        let priority = rule.priority.to_string();
        let port = rule.destination_port.to_string();
        self.run_json::<serde_json::Value>(&[
            "network",
            "nsg",
            "rule",
            "create",
            "--resource-group",
            &nsg.resource_group,
            "--nsg-name",
            &nsg.name,
            "--name",
            &rule.name,
            "--priority",
            &priority,
            "--direction",
            "Inbound",
            "--access",
            "Allow",
            "--protocol",
            "Tcp",
            "--source-address-prefixes",
            &rule.source_prefix,
            "--source-port-ranges",
            "*",
            "--destination-address-prefixes",
            "*",
            "--destination-port-ranges",
            &port,
            "--description",
            &rule.description,
        ])
        .map(|_| ())
    }

    fn delete_rule(&self, nsg: &NsgLocator, rule_name: &str) -> Result<(), ProviderError> {
        self.run_with_refresh(&[
            "network",
            "nsg",
            "rule",
            "delete",
            "--resource-group",
            &nsg.resource_group,
            "--nsg-name",
            &nsg.name,
            "--name",
            rule_name,
        ])
        .map(|_| ())
    }

    fn get_access_token(&self) -> Result<AccessToken, ProviderError> {
        // Plain run: a failure here must not trigger the refresh retry,
        // it IS the refresh probe.
        let output = self.run(&["account", "get-access-token", "--output", "json"])?;
        parse_json(&output)
    }

    fn login(&self) -> Result<(), ProviderError> {
        self.run_interactive(&["login"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_auth_failure() {
        assert!(is_auth_failure(
            "AADSTS700082: The refresh token has expired"
        ));
        assert!(is_auth_failure("Please run 'az login' to setup account."));
        assert!(is_auth_failure("token expired, reauthenticate"));
        assert!(!is_auth_failure(
            "ResourceNotFound: The Resource 'vm-a' was not found"
        ));
    }

    #[test]
    fn test_strip_to_json_clean() {
        assert_eq!(strip_to_json("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_to_json("  [1, 2]\n"), "[1, 2]");
    }

    #[test]
    fn test_strip_to_json_with_warnings() {
        let noisy = "WARNING: new CLI version available\n{\"name\": \"vm-a\"}";
        assert_eq!(strip_to_json(noisy), "{\"name\": \"vm-a\"}");
    }

    #[test]
    fn test_parse_json_with_warning_prefix() {
        let noisy = "WARNING: something\n[{\"name\": \"r\", \"priority\": 100}]";
        let rules: Vec<SecurityRule> = parse_json(noisy).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].priority, 100);
    }
}
