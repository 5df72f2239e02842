//! Serial port resolution and interactive selection.
//!
//! Priority: `--port` flag (or `ESPDEPLOY_PORT`) > configured port >
//! interactive pick among detected ports. Non-interactive runs never prompt;
//! an unresolvable port is a usage error so scripts get exit code 2.

use anyhow::Result;
use console::style;
use dialoguer::{Error as DialoguerError, Select, theme::ColorfulTheme};
use espdeploy::{DetectedPort, detect_ports};
use log::debug;
use std::io::IsTerminal;

use crate::{Cli, CliError, config::Config};

fn usage_err(message: impl Into<String>) -> anyhow::Error {
    CliError::Usage(message.into()).into()
}

/// Resolve the serial port for a device-touching command.
pub(crate) fn resolve_port(cli: &Cli, config: &Config) -> Result<String> {
    if let Some(port) = &cli.port {
        return Ok(port.clone());
    }

    if let Some(port) = &config.port {
        debug!("using port from config: {port}");
        return Ok(port.clone());
    }

    let ports = detect_ports();
    if ports.is_empty() {
        return Err(usage_err(
            "no serial ports found. Connect the device, then use 'espdeploy devices'",
        ));
    }

    if cli.non_interactive || !interactive_terminal() {
        return Err(usage_err(
            "no device port selected. Use 'espdeploy device <PORT>' or --port",
        ));
    }

    let port = select_port_interactive(ports)?;
    eprintln!(
        "{} using {} for this invocation; run 'espdeploy device {}' to remember it",
        style("ℹ").blue(),
        style(&port).cyan(),
        port
    );
    Ok(port)
}

fn interactive_terminal() -> bool {
    std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
}

fn map_prompt_error(err: DialoguerError) -> anyhow::Error {
    match err {
        DialoguerError::IO(io_err) => {
            if io_err.kind() == std::io::ErrorKind::Interrupted {
                CliError::Cancelled("port selection cancelled".to_string()).into()
            } else {
                CliError::Usage("port selection prompt failed".to_string()).into()
            }
        }
    }
}

/// Format one detected port for display.
pub(crate) fn port_label(port: &DetectedPort) -> String {
    let bridge = if port.bridge.is_known() {
        format!(" [{}]", style(port.bridge.name()).yellow())
    } else if let (Some(vid), Some(pid)) = (port.vid, port.pid) {
        format!(" ({vid:04X}:{pid:04X})")
    } else {
        String::new()
    };

    let product = port
        .product
        .as_ref()
        .map(|p| format!(" - {}", style(p).dim()))
        .unwrap_or_default();

    format!("{}{bridge}{product}", style(&port.name).cyan())
}

fn select_port_interactive(mut ports: Vec<DetectedPort>) -> Result<String> {
    // Likely dev boards first.
    ports.sort_by_key(|p| !p.is_likely_board());

    if ports.len() == 1 {
        return Ok(ports.remove(0).name);
    }

    eprintln!(
        "{} {} serial ports detected",
        style("ℹ").blue(),
        ports.len()
    );

    let labels: Vec<String> = ports.iter().map(port_label).collect();
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select a serial port")
        .items(&labels)
        .default(0)
        .interact_opt()
        .map_err(map_prompt_error)?;

    match selection {
        Some(index) => Ok(ports
            .into_iter()
            .nth(index)
            .map(|p| p.name)
            .unwrap_or_default()),
        None => Err(CliError::Cancelled("port selection cancelled".to_string()).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use espdeploy::UsbBridge;

    fn port(name: &str, bridge: UsbBridge) -> DetectedPort {
        DetectedPort {
            name: name.to_string(),
            bridge,
            vid: Some(0x303A),
            pid: Some(0x1001),
            manufacturer: None,
            product: Some("USB JTAG/serial debug unit".to_string()),
            serial: None,
        }
    }

    #[test]
    fn test_flag_wins_over_config() {
        let cli = Cli::try_parse_from_flag("/dev/ttyS9");
        let config = Config {
            port: Some("/dev/ttyACM0".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_port(&cli, &config).unwrap(), "/dev/ttyS9");
    }

    #[test]
    fn test_config_used_when_no_flag() {
        let cli = Cli::try_parse_from_flagless();
        let config = Config {
            port: Some("/dev/ttyACM0".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_port(&cli, &config).unwrap(), "/dev/ttyACM0");
    }

    #[test]
    fn test_port_label_known_bridge() {
        console::set_colors_enabled_stderr(false);
        console::set_colors_enabled(false);
        let label = port_label(&port("/dev/ttyACM0", UsbBridge::Espressif));
        assert!(label.contains("/dev/ttyACM0"));
        assert!(label.contains("Espressif USB"));
        assert!(label.contains("USB JTAG/serial debug unit"));
    }

    #[test]
    fn test_port_label_unknown_bridge_shows_vid_pid() {
        console::set_colors_enabled(false);
        let label = port_label(&port("/dev/ttyUSB0", UsbBridge::Unknown));
        assert!(label.contains("303A:1001"));
    }

    // Small helpers so tests can build a Cli without touching process args.
    impl Cli {
        fn try_parse_from_flag(port: &str) -> Self {
            use clap::Parser;
            Self::parse_from(["espdeploy", "--port", port, "devices"])
        }

        fn try_parse_from_flagless() -> Self {
            use clap::Parser;
            Self::parse_from(["espdeploy", "devices"])
        }
    }
}
