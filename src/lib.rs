//! Grant, verify and clean up SSH/RDP access to Azure VMs by managing
//! NSG rules scoped to the caller's public IP, driven through the `az`
//! CLI.

pub mod app;
pub mod args;
pub mod azure;
pub mod config;
pub mod models;
pub mod net;
pub mod output;
pub mod processing;
pub mod workflow;
