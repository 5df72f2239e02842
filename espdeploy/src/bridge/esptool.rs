//! esptool client.
//!
//! Used only for firmware operations. Erase and write stream their output to
//! the console so the user sees esptool's own progress reporting.

use std::path::Path;
use std::time::Duration;

use crate::bridge::{OutputMode, ToolOutput, run_tool};
use crate::error::Result;

/// Chip identifier passed to esptool.
pub const CHIP: &str = "esp32c3";

/// Budget for a full erase or write pass.
const FLASH_TIMEOUT: Duration = Duration::from_secs(180);

/// Budget for the `--version` install check.
const VERSION_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for the `esptool` flasher, bound to one port.
#[derive(Debug, Clone)]
pub struct Esptool {
    port: String,
}

impl Esptool {
    /// Binary name invoked for every operation.
    pub const TOOL: &'static str = "esptool";

    /// Create a client for the given serial port.
    pub fn new(port: impl Into<String>) -> Self {
        Self { port: port.into() }
    }

    /// The serial port this client targets.
    pub fn port(&self) -> &str {
        &self.port
    }

    /// `esptool --version`, captured. Used as an install check before
    /// prompting the user to put the board into bootloader mode.
    pub fn version(&self) -> Result<ToolOutput> {
        run_tool(
            Self::TOOL,
            &["--version".to_string()],
            OutputMode::Captured,
            Some(VERSION_TIMEOUT),
        )
    }

    /// `erase_flash`, streamed.
    pub fn erase_flash(&self) -> Result<ToolOutput> {
        let args = vec![
            "--chip".to_string(),
            CHIP.to_string(),
            "--port".to_string(),
            self.port.clone(),
            "erase_flash".to_string(),
        ];
        run_tool(Self::TOOL, &args, OutputMode::Streamed, Some(FLASH_TIMEOUT))
    }

    /// `write_flash -z 0x0 <image>` at the given baud rate, streamed.
    pub fn write_flash(&self, baud: u32, image: &Path) -> Result<ToolOutput> {
        let args = vec![
            "--chip".to_string(),
            CHIP.to_string(),
            "--port".to_string(),
            self.port.clone(),
            "--baud".to_string(),
            baud.to_string(),
            "write_flash".to_string(),
            "-z".to_string(),
            "0x0".to_string(),
            image.to_string_lossy().replace('\\', "/"),
        ];
        run_tool(Self::TOOL, &args, OutputMode::Streamed, Some(FLASH_TIMEOUT))
    }
}

/// Whether esptool's error text looks like a bootloader-mode connection
/// failure (the common first-run mistake).
pub fn is_connect_failure(detail: &str) -> bool {
    detail.contains("Could not connect to an Espressif device")
        || detail.contains("Failed to connect to ESP32")
}
