//! `devices` and `device` command implementations.

use anyhow::{Context, Result};
use console::style;
use espdeploy::{Device, detect_ports};

use crate::config::Config;
use crate::serial::port_label;
use crate::{Cli, CliError};

/// Hint shown when a device does not respond to the probe.
const PROBE_HINT: &str = "Ensure the device is properly connected (try holding BOOT while \
plugging in, then release it after a few seconds) and flashed with MicroPython. \
'espdeploy flash' can install the firmware.";

/// List available serial ports and mark the selected one.
pub(crate) fn cmd_devices(config: &Config, json: bool) {
    let ports = detect_ports();
    let selected = config.port.as_deref();

    if json {
        let list: Vec<serde_json::Value> = ports
            .iter()
            .map(|p| {
                serde_json::json!({
                    "name": p.name,
                    "bridge": p.bridge.name(),
                    "known": p.bridge.is_known(),
                    "vid": p.vid,
                    "pid": p.pid,
                    "manufacturer": p.manufacturer,
                    "product": p.product,
                    "serial": p.serial,
                    "selected": Some(p.name.as_str()) == selected,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&list).unwrap_or_default()
        );
        return;
    }

    if ports.is_empty() {
        eprintln!("No serial ports found.");
        return;
    }

    eprintln!("{}", style("Available serial ports:").bold());
    for port in &ports {
        let marker = if Some(port.name.as_str()) == selected {
            style("*").green().bold().to_string()
        } else {
            " ".to_string()
        };
        eprintln!("  {marker} {}", port_label(port));
    }

    match selected {
        Some(sel) if !ports.iter().any(|p| p.name == sel) => {
            eprintln!(
                "\n{} The selected port '{sel}' is not available. Please reconfigure.",
                style("Warning:").yellow().bold()
            );
        }
        Some(sel) => {
            eprintln!("\nSelected port: {} (use 'espdeploy device <PORT>' to change it).", style(sel).cyan());
        }
        None => {
            eprintln!("\nNo port selected. Use 'espdeploy device <PORT>' to set one.");
        }
    }
}

/// Set or test the selected serial port.
pub(crate) fn cmd_device(
    cli: &Cli,
    config: &mut Config,
    port_name: Option<&str>,
    force: bool,
) -> Result<()> {
    match port_name {
        Some(name) => set_port(config, name, force),
        None => match config.port.clone() {
            Some(current) => {
                eprintln!("Current selected port is {}. Testing...", style(&current).cyan());
                test_port(&current)
            }
            None => {
                eprintln!("No serial port currently selected or configured.");
                cmd_devices(config, false);
                if !cli.quiet {
                    eprintln!("\nUse 'espdeploy device <PORT>' to set one.");
                }
                Ok(())
            }
        },
    }
}

fn set_port(config: &mut Config, name: &str, force: bool) -> Result<()> {
    let available = detect_ports();
    if !available
        .iter()
        .any(|p| p.name == name || p.name.eq_ignore_ascii_case(name))
    {
        let names: Vec<&str> = available.iter().map(|p| p.name.as_str()).collect();
        let listed = if names.is_empty() {
            "none".to_string()
        } else {
            names.join(", ")
        };
        return Err(CliError::Usage(format!(
            "port {name} not found among available ports: {listed}"
        ))
        .into());
    }

    let probe = test_port(name);
    if let Err(err) = probe {
        if !force {
            return Err(err.context(format!(
                "device test failed. To set {name} anyway, use --force"
            )));
        }
        eprintln!("{} setting port despite failed test (--force)", style("⚠").yellow());
    }

    config
        .save_port(name)
        .with_context(|| format!("saving selected port {name}"))?;
    eprintln!("Selected serial port set to {}.", style(name).cyan());
    Ok(())
}

fn test_port(name: &str) -> Result<()> {
    let dev = Device::new(name);
    match dev.probe() {
        Ok(()) => {
            eprintln!("{} Device on {name} responded.", style("✓").green());
            Ok(())
        }
        Err(err) => {
            eprintln!("{} No response on {name}.", style("✗").red());
            eprintln!("{PROBE_HINT}");
            Err(err.into())
        }
    }
}
