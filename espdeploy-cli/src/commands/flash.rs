//! `flash` command implementation.
//!
//! Orchestrates esptool: resolve/download the firmware image, erase, write,
//! then verify the board actually comes back up running MicroPython.

use std::thread;

use anyhow::{Context, Result};
use console::style;
use espdeploy::flash::REBOOT_DELAY;
use espdeploy::{Device, FirmwareSource, Flasher, fetch_firmware};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;

use crate::commands::confirm;
use crate::{Cli, CliError, was_interrupted};

fn ensure_not_interrupted() -> Result<()> {
    if was_interrupted() {
        return Err(CliError::Cancelled("flashing interrupted".to_string()).into());
    }
    Ok(())
}

/// Flash MicroPython firmware onto the board.
pub(crate) fn cmd_flash(
    cli: &Cli,
    port: &str,
    firmware_source: Option<&str>,
    baud: u32,
    yes: bool,
) -> Result<()> {
    let source = firmware_source.map_or_else(FirmwareSource::default_url, FirmwareSource::parse);

    if source.is_official() {
        if let FirmwareSource::Url(url) = &source {
            eprintln!("Using official firmware: {url}");
        }
        eprintln!("Pass a URL or a local .bin path to flash a different build.");
    }

    eprintln!();
    eprintln!(
        "{} Ensure the board is in bootloader mode:",
        style("IMPORTANT:").yellow().bold()
    );
    eprintln!("  unplug USB, press and HOLD the BOOT button, plug in USB, wait 2-3 seconds, then release BOOT.");

    let flasher = Flasher::new(port, baud);
    flasher
        .check_installed()
        .context("esptool is required for flashing (install it with: pip install esptool)")?;

    if !yes && !confirm("Proceed with flashing?", cli.non_interactive)? {
        return Err(CliError::Cancelled("flashing cancelled".to_string()).into());
    }

    // Resolve the image, with a byte progress bar for URL downloads.
    let pb = if cli.quiet || matches!(source, FirmwareSource::File(_)) {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::no_length();
        #[allow(clippy::unwrap_used)] // Static template string
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        pb.set_message("downloading firmware");
        pb
    };

    let image = fetch_firmware(&source, &mut |done, total| {
        if let Some(total) = total {
            pb.set_length(total);
        }
        pb.set_position(done);
    })?;
    pb.finish_and_clear();
    if image.is_downloaded() && !cli.quiet {
        eprintln!("{} firmware downloaded", style("✓").green());
    }

    ensure_not_interrupted()?;

    eprintln!("\nStep 1: Erasing flash on {port}...");
    if let Err(err) = flasher.erase() {
        if espdeploy::bridge::esptool::is_connect_failure(&err.to_string()) {
            eprintln!(
                "{} This commonly means the device is not in bootloader mode.",
                style("Hint:").yellow()
            );
            eprintln!("Please follow the BOOT button procedure and try again.");
        }
        return Err(err.into());
    }
    eprintln!("{} Flash erase completed.", style("✓").green());

    ensure_not_interrupted()?;

    let image_name = image
        .path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| image.path().display().to_string());
    eprintln!("\nStep 2: Writing firmware '{image_name}' to {port} at baud {baud}...");
    flasher.write(image.path())?;
    eprintln!("{} Firmware writing completed.", style("✓").green());

    ensure_not_interrupted()?;

    eprintln!("\nStep 3: Verifying MicroPython installation...");
    eprintln!("Waiting a few seconds for the board to reboot...");
    thread::sleep(REBOOT_DELAY);

    let dev = Device::new(port);
    match dev.verify_micropython() {
        Ok(name) => {
            debug!("interpreter reported '{name}'");
            eprintln!("{} MicroPython confirmed on {port}.", style("✓").green());
        }
        Err(err) => {
            eprintln!(
                "The board may not have rebooted correctly, or flashing was unsuccessful \
                 despite esptool's report."
            );
            eprintln!(
                "Try unplugging and replugging the device, then 'espdeploy device' to test \
                 communication."
            );
            return Err(err.into());
        }
    }

    eprintln!(
        "\n{} MicroPython flashed and verified successfully!",
        style("✓").green().bold()
    );
    eprintln!("Unplug and replug the device now to start it in normal mode.");
    Ok(())
}
