//! # espdeploy
//!
//! A library for deploying MicroPython files to ESP32-class boards over a
//! serial connection.
//!
//! All device interaction is delegated to two external command-line tools,
//! consumed as black boxes:
//!
//! - **mpremote** for filesystem access and code execution on the board
//!   (`fs ls`, `fs cp`, `fs mkdir`, `fs rm`, `fs stat`, `fs df`, `exec`)
//! - **esptool** for firmware operations (`erase_flash`, `write_flash`)
//!
//! This crate provides:
//!
//! - Subprocess bridges for both tools with per-operation timeouts
//! - Remote path normalization, including the trailing-slash "contents of"
//!   convention used by `upload` and `download`
//! - Upload/download planning that maps local/remote trees onto individual
//!   `fs cp` / `fs mkdir` invocations
//! - Parsing of `fs stat` and `fs ls -r` output
//! - Firmware fetch (URL or local file) and flash orchestration
//! - Serial port discovery
//!
//! ## Example
//!
//! ```rust,no_run
//! use espdeploy::{Device, RemotePath};
//!
//! fn main() -> espdeploy::Result<()> {
//!     let dev = Device::new("/dev/ttyACM0");
//!     dev.probe()?;
//!
//!     let kind = dev.stat(&RemotePath::new("main.py"))?;
//!     println!("main.py on device: {kind:?}");
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod detect;
pub mod device;
pub mod error;
pub mod flash;
pub mod remote;
pub mod transfer;

pub use {
    bridge::{Esptool, Mpremote, ToolOutput},
    detect::{DetectedPort, UsbBridge, detect_ports},
    device::Device,
    error::{Error, Result},
    flash::{
        DEFAULT_FIRMWARE_URL, DEFAULT_FLASH_BAUD, FirmwareImage, FirmwareSource, Flasher,
        fetch_firmware,
    },
    remote::{
        listing::{ListEntry, Tree, parse_ls_names, parse_ls_recursive, relative_to},
        path::{RemoteArg, RemotePath},
        stat::PathKind,
    },
    transfer::{
        DownloadPlan, FileCopy, UploadKind, UploadPlan, plan_download_file, plan_download_tree,
        plan_upload,
    },
};
