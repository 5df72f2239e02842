//! espdeploy CLI - deploy MicroPython files to ESP32 boards.
//!
//! ## Features
//!
//! - Upload/download files and directory trees over mpremote
//! - Run scripts on the board and stream their output
//! - List and tree the on-device filesystem
//! - Flash MicroPython firmware via esptool (URL or local image)
//! - Device diagnostics (memory, filesystem usage)
//! - Shell completion generation

use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use console::style;
use env_logger::Env;
use log::debug;

mod commands;
mod config;
mod serial;

use config::Config;

/// Set by the Ctrl-C handler; long command loops poll this between steps.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Whether the user pressed Ctrl-C since startup.
pub(crate) fn was_interrupted() -> bool {
    INTERRUPTED.load(Ordering::Relaxed)
}

/// Failure classes with dedicated exit codes.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    /// Bad invocation or unusable setup; exit code 2.
    #[error("{0}")]
    Usage(String),
    /// The user declined or interrupted a prompt; exit code 130.
    #[error("{0}")]
    Cancelled(String),
}

/// espdeploy - deploy MicroPython files to ESP32 boards over serial.
///
/// Environment variables:
///   ESPDEPLOY_PORT              - Default serial port
///   ESPDEPLOY_NON_INTERACTIVE   - Non-interactive mode (disable prompts)
#[derive(Parser)]
#[command(name = "espdeploy")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = "Use 'espdeploy <command> --help' for more information on a command.")]
pub(crate) struct Cli {
    /// Serial port to use (overrides the configured port).
    #[arg(short, long, global = true, env = "ESPDEPLOY_PORT")]
    pub port: Option<String>,

    /// Verbose output level (-v, -vv for increasing detail).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Non-interactive mode (fail instead of prompting).
    #[arg(long, global = true, env = "ESPDEPLOY_NON_INTERACTIVE")]
    pub non_interactive: bool,

    /// Path to a configuration file.
    #[arg(long = "config", global = true, value_name = "PATH")]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// List available serial ports and show the selected one.
    Devices {
        /// Output the port list as JSON on stdout.
        #[arg(long)]
        json: bool,
    },

    /// Set or test the selected serial port.
    Device {
        /// The port to select. If omitted, tests the current one.
        #[arg(value_name = "PORT")]
        port_name: Option<String>,

        /// Persist the port even if the device test fails.
        #[arg(short, long)]
        force: bool,
    },

    /// Upload a file or directory to the board.
    Upload {
        /// Local file or directory. A trailing '/' on a directory uploads
        /// its contents; without it the directory itself is recreated.
        local_source: String,

        /// Remote parent directory. If omitted, uploads to the device root.
        remote_destination: Option<String>,
    },

    /// Download a file or directory from the board.
    Download {
        /// Remote file or directory. A trailing '/' on a directory (or '//'
        /// for the root) downloads its contents; without it the directory
        /// itself is recreated locally.
        #[arg(value_name = "REMOTE_PATH")]
        remote_source: String,

        /// Local directory to download into, or a filename for a single
        /// remote file. Defaults to the current directory.
        #[arg(value_name = "LOCAL_PATH")]
        local_destination: Option<String>,
    },

    /// Run a Python script that is already on the board.
    Run {
        /// Script path relative to the device root.
        #[arg(value_name = "SCRIPT", default_value = "main.py")]
        script: String,
    },

    /// List files on the board (recursive).
    List {
        /// Remote directory (default: root).
        #[arg(value_name = "REMOTE_DIR")]
        remote_directory: Option<String>,
    },

    /// Display the on-device file tree.
    Tree {
        /// Remote directory (default: root).
        #[arg(value_name = "REMOTE_DIR")]
        remote_directory: Option<String>,
    },

    /// Delete a file or directory on the board.
    Delete {
        /// Remote path. Omitting it (or '/') deletes all root contents,
        /// with confirmation.
        #[arg(value_name = "REMOTE_PATH")]
        remote_path: Option<String>,

        /// Skip the confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Download (if URL) and flash MicroPython firmware onto the board.
    Flash {
        /// Firmware URL or local .bin path. Defaults to the official
        /// ESP32_GENERIC_C3 build.
        #[arg(value_name = "SOURCE")]
        firmware_source: Option<String>,

        /// Baud rate for write_flash.
        #[arg(long, default_value_t = espdeploy::DEFAULT_FLASH_BAUD)]
        baud: u32,

        /// Skip the confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Run diagnostic commands on the board.
    Diagnostics,

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (auto-detected if omitted).
        #[arg(value_enum)]
        shell: Option<Shell>,
    },
}

fn main() {
    let cli = Cli::parse();

    // NO_COLOR and TTY detection (clig.dev practice).
    if env::var("NO_COLOR").is_ok() || !console::Term::stderr().is_term() {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    // Logging from verbosity flags.
    let log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_target(cli.verbose >= 2)
        .format_timestamp(if cli.verbose >= 2 {
            Some(env_logger::TimestampPrecision::Millis)
        } else {
            None
        })
        .init();

    debug!(
        "espdeploy v{} (verbose level: {})",
        env!("CARGO_PKG_VERSION"),
        cli.verbose
    );

    let _ = ctrlc::set_handler(|| {
        INTERRUPTED.store(true, Ordering::Relaxed);
    });

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{} {err:#}", style("Error:").red().bold());
            std::process::exit(exit_code_for(&err));
        }
    }
}

/// Map an error to the CLI exit-code contract: 2 for usage problems, 130 for
/// cancelled prompts, 1 otherwise.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<CliError>() {
        Some(CliError::Usage(_)) => 2,
        Some(CliError::Cancelled(_)) => 130,
        None => 1,
    }
}

fn run(cli: &Cli) -> Result<i32> {
    let mut config = if let Some(ref path) = cli.config_path {
        Config::load_from_path(path)
    } else {
        Config::load()
    };

    match &cli.command {
        Commands::Devices { json } => {
            commands::devices::cmd_devices(&config, *json);
            Ok(0)
        }
        Commands::Device { port_name, force } => {
            commands::devices::cmd_device(cli, &mut config, port_name.as_deref(), *force)?;
            Ok(0)
        }
        Commands::Upload {
            local_source,
            remote_destination,
        } => {
            let port = serial::resolve_port(cli, &config)?;
            commands::transfer::cmd_upload(
                cli,
                &port,
                local_source,
                remote_destination.as_deref(),
            )?;
            Ok(0)
        }
        Commands::Download {
            remote_source,
            local_destination,
        } => {
            let port = serial::resolve_port(cli, &config)?;
            commands::transfer::cmd_download(
                cli,
                &port,
                remote_source,
                local_destination.as_deref(),
            )?;
            Ok(0)
        }
        Commands::Run { script } => {
            let port = serial::resolve_port(cli, &config)?;
            commands::run::cmd_run(&port, script)
        }
        Commands::List { remote_directory } => {
            let port = serial::resolve_port(cli, &config)?;
            commands::listing::cmd_list(&port, remote_directory.as_deref())?;
            Ok(0)
        }
        Commands::Tree { remote_directory } => {
            let port = serial::resolve_port(cli, &config)?;
            commands::listing::cmd_tree(&port, remote_directory.as_deref())?;
            Ok(0)
        }
        Commands::Delete { remote_path, yes } => {
            let port = serial::resolve_port(cli, &config)?;
            commands::delete::cmd_delete(cli, &port, remote_path.as_deref(), *yes)?;
            Ok(0)
        }
        Commands::Flash {
            firmware_source,
            baud,
            yes,
        } => {
            let port = serial::resolve_port(cli, &config)?;
            commands::flash::cmd_flash(cli, &port, firmware_source.as_deref(), *baud, *yes)?;
            Ok(0)
        }
        Commands::Diagnostics => {
            let port = serial::resolve_port(cli, &config)?;
            commands::diag::cmd_diagnostics(&port)?;
            Ok(0)
        }
        Commands::Completions { shell } => {
            commands::completions::cmd_completions(*shell)?;
            Ok(0)
        }
    }
}
