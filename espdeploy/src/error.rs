//! Error types for espdeploy.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for espdeploy operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for espdeploy operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (local file operations, subprocess plumbing).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// External tool binary not found on PATH.
    #[error("{tool} command not found. Is it installed and in PATH?")]
    ToolMissing {
        /// Name of the missing binary.
        tool: String,
    },

    /// External tool did not finish within the allowed time.
    #[error("{tool} timed out after {seconds}s")]
    Timeout {
        /// Name of the binary that timed out.
        tool: String,
        /// The timeout that was exceeded.
        seconds: u64,
    },

    /// A device operation reported failure (non-zero exit status).
    #[error("{what}: {detail}")]
    Command {
        /// What was being attempted.
        what: String,
        /// Error text captured from the tool.
        detail: String,
    },

    /// Remote path does not exist on the device.
    #[error("remote path ':{0}' not found on device")]
    RemoteMissing(String),

    /// Remote path exists but is not a file.
    #[error("remote path ':{0}' is not a file")]
    RemoteNotAFile(String),

    /// A directory component on the device is occupied by a file.
    #[error("remote path ':{0}' exists and is a file, cannot create directory")]
    RemoteFileInWay(String),

    /// Local source path does not exist.
    #[error("local path '{0}' does not exist")]
    LocalMissing(PathBuf),

    /// Local firmware file does not exist.
    #[error("firmware file '{0}' not found")]
    FirmwareMissing(PathBuf),

    /// HTTP error while downloading firmware.
    #[error("firmware download failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Flashing step failed.
    #[error("flash error: {0}")]
    Flash(String),

    /// Post-flash MicroPython verification failed.
    #[error("verification failed: {0}")]
    Verify(String),
}
