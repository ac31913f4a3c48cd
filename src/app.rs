//! Top-level orchestration: authenticate, pick targets, dispatch the mode.

use crate::args::{Args, Mode};
use crate::azure::{ensure_authenticated, AzCli, Provider};
use crate::models::resource_id::segment_value;
use crate::models::{is_resource_id, leaf_name, PortConfig, VmListEntry};
use crate::net;
use crate::output::{prompt, terminal};
use crate::processing::classify_vm;
use crate::workflow::{cleanup, connectivity, grant, removal, select};
use std::collections::HashSet;
use std::error::Error;
use std::net::Ipv4Addr;

pub async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    terminal::banner();

    let cli = AzCli::discover();
    terminal::section("Authentication");
    terminal::key_value("Platform", cli.platform());
    ensure_authenticated(&cli)?;
    let subscription = cli.current_subscription()?;
    terminal::key_value(
        "Subscription",
        &format!("{} ({})", subscription.name, subscription.id),
    );

    if args.mode() == Mode::CleanupOnly && args.resource_id.is_none() && !args.all {
        return Err("--cleanup-only requires --resource-id or --all".into());
    }

    let vms = resolve_targets(&cli, &args)?;
    if vms.is_empty() {
        terminal::info("No VMs selected, nothing to do");
        return Ok(());
    }

    let ports = PortConfig::new(args.ssh_port, args.rdp_port);
    if ports.ssh_is_custom() {
        terminal::info(&format!("Using custom SSH port {}", ports.ssh_port));
    }
    if ports.rdp_is_custom() {
        terminal::info(&format!("Using custom RDP port {}", ports.rdp_port));
    }

    match args.mode() {
        Mode::Grant => run_grant(&cli, &args, &vms, &ports).await,
        Mode::CleanupOnly => run_cleanup(&cli, &vms),
        Mode::TestOnly => run_test_only(&cli, &args, &vms, &ports).await,
        Mode::RemoveRules => run_removal(&cli, &vms),
    }
}

/// Resolve the target VM list from `--resource-id`, `--all`, or an
/// interactive selection.
fn resolve_targets<P: Provider>(
    provider: &P,
    args: &Args,
) -> Result<Vec<VmListEntry>, Box<dyn Error>> {
    if let Some(resource_id) = &args.resource_id {
        if !is_resource_id(resource_id) {
            return Err(format!(
                "--resource-id must be a full resource ID starting with /subscriptions/, got: {resource_id}"
            )
            .into());
        }
        return Ok(vec![VmListEntry {
            name: leaf_name(resource_id).to_string(),
            id: resource_id.clone(),
            resource_group: segment_value(resource_id, "resourceGroups")?,
        }]);
    }

    terminal::section("VM Selection");
    let vms = provider.list_vms()?;
    if vms.is_empty() {
        terminal::warn("No VMs found in this subscription");
        return Ok(Vec::new());
    }
    if args.all {
        terminal::info(&format!("Targeting all {} VM(s)", vms.len()));
        return Ok(vms);
    }
    select::select_vms_interactively(&vms)
}

async fn resolve_source_ip(args: &Args) -> Result<Ipv4Addr, Box<dyn Error>> {
    if let Some(ip) = &args.ip {
        let ip = net::parse_override(ip)?;
        terminal::info(&format!("Using provided IP address {ip}"));
        return Ok(ip);
    }
    terminal::info("Detecting public IP address...");
    let client = reqwest::Client::new();
    net::detect_public_ip(&client).await
}

async fn run_grant(
    provider: &AzCli,
    args: &Args,
    vms: &[VmListEntry],
    ports: &PortConfig,
) -> Result<(), Box<dyn Error>> {
    terminal::section("Public IP Detection");
    let source_ip = resolve_source_ip(args).await?;
    terminal::success(&format!("Using source address {source_ip}"));

    let interactive = args.interactive_session();
    // When no mode flag decided it, ask; only in the interactive flow.
    let run_test = args.test
        || (interactive
            && prompt::confirm_yes("Test connectivity after configuring? [y/N]: ")?);

    terminal::section("NSG Configuration");
    let total = vms.len();
    let mut failures = 0;
    for (i, vm) in vms.iter().enumerate() {
        terminal::vm_header(&vm.name, i + 1, total);
        match grant::process_vm(provider, &vm.id, source_ip, ports) {
            Ok(profile) => {
                if run_test {
                    let reachable = connectivity::test_connectivity(
                        provider,
                        &vm.id,
                        &vm.name,
                        profile.service(),
                        profile.port,
                        interactive,
                    )
                    .await;
                    if let Err(e) = reachable {
                        terminal::error(&format!("Connectivity test failed: {e}"));
                        failures += 1;
                    }
                }
            }
            Err(e) => {
                terminal::error(&format!("Failed to process '{}': {e}", vm.name));
                failures += 1;
            }
        }
    }
    finish(failures, total)
}

fn run_cleanup(provider: &AzCli, vms: &[VmListEntry]) -> Result<(), Box<dyn Error>> {
    terminal::section("Duplicate Rule Cleanup");
    let total = vms.len();
    let mut failures = 0;
    let mut processed: HashSet<String> = HashSet::new();
    for (i, vm) in vms.iter().enumerate() {
        terminal::vm_header(&vm.name, i + 1, total);
        if let Err(e) = cleanup::cleanup_vm(provider, &vm.id, &vm.name, &mut processed) {
            terminal::error(&format!("Cleanup failed for '{}': {e}", vm.name));
            failures += 1;
        }
    }
    finish(failures, total)
}

async fn run_test_only(
    provider: &AzCli,
    args: &Args,
    vms: &[VmListEntry],
    ports: &PortConfig,
) -> Result<(), Box<dyn Error>> {
    terminal::section("Connectivity Test");
    let interactive = args.interactive_session();
    let total = vms.len();
    let mut failures = 0;
    let mut unreachable = 0;
    for (i, vm) in vms.iter().enumerate() {
        terminal::vm_header(&vm.name, i + 1, total);
        let outcome = async {
            let descriptor = provider.show_vm(&vm.id)?;
            let profile = classify_vm(&descriptor, ports);
            connectivity::test_connectivity(
                provider,
                &vm.id,
                &vm.name,
                profile.service(),
                profile.port,
                interactive,
            )
            .await
        }
        .await;
        match outcome {
            Ok(true) => {}
            // An unreachable port is a result, not a tool failure.
            Ok(false) => unreachable += 1,
            Err(e) => {
                terminal::error(&format!("Connectivity test failed for '{}': {e}", vm.name));
                failures += 1;
            }
        }
    }
    if unreachable > 0 {
        terminal::warn(&format!("{unreachable} of {total} VM(s) were not reachable"));
    }
    finish(failures, total)
}

fn run_removal(provider: &AzCli, vms: &[VmListEntry]) -> Result<(), Box<dyn Error>> {
    terminal::section("Rule Removal");
    let total = vms.len();
    let mut failures = 0;
    for (i, vm) in vms.iter().enumerate() {
        terminal::vm_header(&vm.name, i + 1, total);
        if let Err(e) = removal::remove_custom_rules(provider, &vm.id, &vm.name) {
            terminal::error(&format!("Removal failed for '{}': {e}", vm.name));
            failures += 1;
        }
    }
    finish(failures, total)
}

/// Per-VM failures are reported inline and do not change the exit code;
/// only unrecoverable setup failures do.
fn finish(failures: usize, total: usize) -> Result<(), Box<dyn Error>> {
    if failures == 0 {
        terminal::completion_banner("All tasks completed successfully");
    } else {
        terminal::warn(&format!(
            "{failures} of {total} VM(s) reported errors, see output above"
        ));
    }
    Ok(())
}
