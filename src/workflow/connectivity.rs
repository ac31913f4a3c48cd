//! Post-grant connectivity verification.
//!
//! Checks the VM is running (offering to start it in interactive mode),
//! resolves its public IP by walking the NICs, then probes the service
//! port over TCP and reports what happened.

use super::discover;
use crate::azure::Provider;
use crate::config::{TCP_PROBE_TIMEOUT, VM_START_WARMUP};
use crate::models::Vm;
use crate::net::{tcp_probe, ProbeOutcome};
use crate::output::terminal::{self, BULLET, CHECK};
use crate::output::prompt;
use colored::Colorize;
use std::error::Error;

/// Probe one VM's service port. Returns whether the port was reachable.
pub async fn test_connectivity<P: Provider>(
    provider: &P,
    vm_id: &str,
    vm_name: &str,
    service: &str,
    port: u16,
    interactive: bool,
) -> Result<bool, Box<dyn Error>> {
    terminal::subsection(&format!("Connectivity: {vm_name} ({service} port {port})"));

    let state = provider.vm_power_state(vm_id)?;
    let mut just_started = false;
    if !state.is_running() {
        terminal::warn(&format!("VM is not running (state: {})", state.display()));
        terminal::detail(&format!("Start it with: az vm start --ids {vm_id}"));
        if state.is_deallocated() {
            terminal::detail("Dynamic public IPs are released while a VM is deallocated");
        } else if state.is_stopped() {
            // Stopped-but-not-deallocated VMs still bill for compute.
            terminal::detail(&format!(
                "A stopped VM keeps incurring compute charges; release it with: az vm deallocate --ids {vm_id}"
            ));
        }
        if interactive && prompt::confirm_yes("Start the VM now? [y/N]: ")? {
            terminal::info("Starting VM...");
            provider.start_vm(vm_id)?;
            terminal::info(&format!(
                "Waiting {}s for the VM to boot",
                VM_START_WARMUP.as_secs()
            ));
            tokio::time::sleep(VM_START_WARMUP).await;
            just_started = true;
        } else {
            return Ok(false);
        }
    }

    let vm = provider.show_vm(vm_id)?;
    let Some(ip) = resolve_public_ip(provider, &vm, vm_id)? else {
        no_public_ip_note(provider, &vm, vm_name)?;
        return Ok(false);
    };
    terminal::key_value("Public IP", &ip);

    let mut outcome = tcp_probe(&ip, port, TCP_PROBE_TIMEOUT).await;
    if !outcome.is_open() && just_started {
        terminal::info("Port not reachable yet, retrying once");
        tokio::time::sleep(VM_START_WARMUP).await;
        outcome = tcp_probe(&ip, port, TCP_PROBE_TIMEOUT).await;
    }

    report_outcome(&outcome, service, &ip, port);
    Ok(outcome.is_open())
}

/// Walk the VM's NICs for an assigned public IP; fall back to the
/// aggregated list-ip-addresses lookup when none is found.
fn resolve_public_ip<P: Provider>(
    provider: &P,
    vm: &Vm,
    vm_id: &str,
) -> Result<Option<String>, Box<dyn Error>> {
    for nic_id in vm.nic_ids() {
        let nic = provider.show_nic(&nic_id)?;
        for ip_config in &nic.ip_configurations {
            if let Some(pip_ref) = &ip_config.public_ip_address {
                let pip = provider.show_public_ip(&pip_ref.id)?;
                match pip.assigned_address() {
                    Some(addr) => return Ok(Some(addr.to_string())),
                    // Dynamic allocation releases the address while the VM
                    // is deallocated.
                    None => terminal::detail(&format!(
                        "Public IP resource '{}' has no assigned address",
                        crate::models::leaf_name(&pip_ref.id)
                    )),
                }
            }
        }
    }
    Ok(provider.vm_public_ip_fallback(vm_id)?)
}

fn report_outcome(outcome: &ProbeOutcome, service: &str, ip: &str, port: u16) {
    match outcome {
        ProbeOutcome::Open { latency_ms } => {
            let latency = format!("{latency_ms:.0} ms");
            let latency = if *latency_ms < 50.0 {
                latency.green()
            } else if *latency_ms < 150.0 {
                latency.yellow()
            } else {
                latency.red()
            };
            println!(
                "  {}  {} ({latency})",
                CHECK.green(),
                format!("{service} port {port} is reachable on {ip}").green()
            );
        }
        other => {
            terminal::error(&other.message());
            terminal::box_note(&[
                "Possible reasons:".to_string(),
                format!("  {BULLET} NSG rule changes can take up to a minute to propagate"),
                format!("  {BULLET} The OS firewall may be blocking port {port}"),
                format!("  {BULLET} The {service} service may not be listening"),
                format!("  {BULLET} Another NSG or firewall sits between you and the VM"),
            ]);
        }
    }
}

fn no_public_ip_note<P: Provider>(
    provider: &P,
    vm: &Vm,
    vm_name: &str,
) -> Result<(), Box<dyn Error>> {
    terminal::error(&format!("No public IP address found for '{vm_name}'"));
    let mut lines = vec![
        "Possible reasons:".to_string(),
        format!("  {BULLET} The VM has no public IP resource assigned"),
        format!("  {BULLET} Dynamic IPs are released while the VM is deallocated"),
        format!("  {BULLET} Access may be via VPN, Bastion or a load balancer"),
    ];
    // An NSG-less VM cannot be reached from the internet at all.
    if discover::find_attached_nsgs(provider, vm)?.is_empty() {
        lines.push(format!("  {BULLET} No NSG is attached to this VM"));
    }
    terminal::box_note(&lines);
    Ok(())
}
