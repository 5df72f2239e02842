//! Firmware flashing orchestration.
//!
//! Resolves the firmware source (URL or local file), then drives esptool
//! through its erase and write steps. The serial/bootloader protocol itself
//! is entirely esptool's business.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::bridge::esptool::Esptool;
use crate::error::{Error, Result};

/// Official MicroPython build flashed when no source is given.
pub const DEFAULT_FIRMWARE_URL: &str =
    "https://micropython.org/resources/firmware/ESP32_GENERIC_C3-20250415-v1.25.0.bin";

/// Default baud rate for `write_flash`.
pub const DEFAULT_FLASH_BAUD: u32 = 230_400;

/// How long the board gets to reboot before post-flash verification.
pub const REBOOT_DELAY: Duration = Duration::from_secs(5);

/// Download chunk size.
const CHUNK: usize = 8192;

/// Where the firmware image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirmwareSource {
    /// Download from an HTTP(S) URL.
    Url(String),
    /// Use a local `.bin` file.
    File(PathBuf),
}

impl FirmwareSource {
    /// Classify a raw argument as URL or local path.
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(raw.to_string())
        } else {
            Self::File(PathBuf::from(raw))
        }
    }

    /// The official default firmware.
    pub fn default_url() -> Self {
        Self::Url(DEFAULT_FIRMWARE_URL.to_string())
    }

    /// Whether this points at the official firmware archive.
    pub fn is_official(&self) -> bool {
        match self {
            Self::Url(u) => u.contains("micropython.org/resources/firmware/"),
            Self::File(_) => false,
        }
    }
}

/// A firmware image ready to flash. Downloaded images live in a temp file
/// that is removed when this value drops.
#[derive(Debug)]
pub struct FirmwareImage {
    path: PathBuf,
    temp: Option<NamedTempFile>,
}

impl FirmwareImage {
    /// Path of the image on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the image was downloaded (as opposed to user-supplied).
    pub fn is_downloaded(&self) -> bool {
        self.temp.is_some()
    }
}

/// Resolve a firmware source to an on-disk image, downloading if needed.
///
/// `progress` is called with (bytes so far, total if known) while a URL
/// source is being fetched.
pub fn fetch_firmware(
    source: &FirmwareSource,
    progress: &mut dyn FnMut(u64, Option<u64>),
) -> Result<FirmwareImage> {
    match source {
        FirmwareSource::File(path) => {
            if !path.is_file() {
                return Err(Error::FirmwareMissing(path.clone()));
            }
            let path = std::path::absolute(path)?;
            info!("using local firmware file {}", path.display());
            Ok(FirmwareImage { path, temp: None })
        }
        FirmwareSource::Url(url) => {
            info!("downloading firmware from {url}");
            let mut response = reqwest::blocking::get(url)?.error_for_status()?;
            let total = response.content_length();

            let mut temp = tempfile::Builder::new()
                .prefix("espdeploy-fw-")
                .suffix(".bin")
                .tempfile()?;

            let mut buf = [0u8; CHUNK];
            let mut downloaded: u64 = 0;
            loop {
                let n = response.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                temp.write_all(&buf[..n])?;
                downloaded += n as u64;
                progress(downloaded, total);
            }
            temp.flush()?;
            debug!("firmware downloaded to {}", temp.path().display());

            Ok(FirmwareImage {
                path: temp.path().to_path_buf(),
                temp: Some(temp),
            })
        }
    }
}

/// Drives esptool's erase and write steps against one port.
#[derive(Debug)]
pub struct Flasher {
    esptool: Esptool,
    baud: u32,
}

impl Flasher {
    /// Create a flasher for the given port and write baud rate.
    pub fn new(port: impl Into<String>, baud: u32) -> Self {
        Self {
            esptool: Esptool::new(port),
            baud,
        }
    }

    /// The write baud rate.
    pub fn baud(&self) -> u32 {
        self.baud
    }

    /// Check that esptool is installed and answering.
    pub fn check_installed(&self) -> Result<()> {
        let out = self.esptool.version()?;
        if out.success() {
            debug!("esptool present: {}", out.stdout.trim());
            Ok(())
        } else {
            Err(Error::Flash(format!(
                "esptool --version failed: {}",
                out.error_text()
            )))
        }
    }

    /// Erase the entire flash.
    pub fn erase(&self) -> Result<()> {
        let out = self.esptool.erase_flash()?;
        if out.success() {
            Ok(())
        } else {
            Err(Error::Flash(format!(
                "erase failed: {}",
                out.error_text()
            )))
        }
    }

    /// Write the firmware image at offset 0x0.
    pub fn write(&self, image: &Path) -> Result<()> {
        let out = self.esptool.write_flash(self.baud, image)?;
        if out.success() {
            Ok(())
        } else {
            Err(Error::Flash(format!(
                "write failed: {}",
                out.error_text()
            )))
        }
    }
}
