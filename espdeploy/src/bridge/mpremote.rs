//! mpremote client.
//!
//! Every call is a full `mpremote connect <port> ...` invocation; mpremote
//! owns the serial protocol. Timeouts are per operation class and deliberately
//! generous; slow boards stall rather than fail.

use std::thread;
use std::time::Duration;

use crate::bridge::{OutputMode, ToolOutput, run_tool};
use crate::error::Result;

/// Per-operation timeouts.
pub mod timeouts {
    use std::time::Duration;

    /// `fs stat`.
    pub const STAT: Duration = Duration::from_secs(10);
    /// `fs ls` and `fs ls -r`.
    pub const LS: Duration = Duration::from_secs(20);
    /// `fs mkdir`.
    pub const MKDIR: Duration = Duration::from_secs(15);
    /// `fs cp` of a single file.
    pub const CP_FILE: Duration = Duration::from_secs(120);
    /// Recursive `fs rm`.
    pub const RM: Duration = Duration::from_secs(60);
    /// Short `exec` snippets.
    pub const EXEC: Duration = Duration::from_secs(20);
    /// `fs df`.
    pub const DF: Duration = Duration::from_secs(10);
}

/// Settle delay after filesystem mutations on the board. The on-device VFS
/// needs a beat between operations; this fixed sleep is the only pacing
/// policy (no retries, no backoff).
pub const FS_OPERATION_DELAY: Duration = Duration::from_millis(300);

/// Client for the `mpremote` serial bridge, bound to one port.
#[derive(Debug, Clone)]
pub struct Mpremote {
    port: String,
}

impl Mpremote {
    /// Binary name invoked for every operation.
    pub const TOOL: &'static str = "mpremote";

    /// Create a client for the given serial port.
    pub fn new(port: impl Into<String>) -> Self {
        Self { port: port.into() }
    }

    /// The serial port this client connects to.
    pub fn port(&self) -> &str {
        &self.port
    }

    fn run(&self, args: &[&str], mode: OutputMode, timeout: Option<Duration>) -> Result<ToolOutput> {
        let mut full: Vec<String> = vec!["connect".to_string(), self.port.clone()];
        full.extend(args.iter().map(ToString::to_string));
        run_tool(Self::TOOL, &full, mode, timeout)
    }

    /// `fs ls <target>`, captured.
    pub fn fs_ls(&self, target: &str) -> Result<ToolOutput> {
        self.run(&["fs", "ls", target], OutputMode::Captured, Some(timeouts::LS))
    }

    /// `fs ls -r <target>`, captured.
    pub fn fs_ls_recursive(&self, target: &str) -> Result<ToolOutput> {
        self.run(
            &["fs", "ls", "-r", target],
            OutputMode::Captured,
            Some(timeouts::LS),
        )
    }

    /// `fs ls <target>` streamed to the console (diagnostics).
    pub fn fs_ls_streamed(&self, target: &str) -> Result<ToolOutput> {
        self.run(&["fs", "ls", target], OutputMode::Streamed, Some(timeouts::LS))
    }

    /// `fs stat <target>`, captured.
    pub fn fs_stat(&self, target: &str) -> Result<ToolOutput> {
        self.run(
            &["fs", "stat", target],
            OutputMode::Captured,
            Some(timeouts::STAT),
        )
    }

    /// `fs mkdir <target>`, captured.
    pub fn fs_mkdir(&self, target: &str) -> Result<ToolOutput> {
        self.run(
            &["fs", "mkdir", target],
            OutputMode::Captured,
            Some(timeouts::MKDIR),
        )
    }

    /// `fs rm -r <target>`, captured.
    pub fn fs_rm_recursive(&self, target: &str) -> Result<ToolOutput> {
        self.run(
            &["fs", "rm", "-r", target],
            OutputMode::Captured,
            Some(timeouts::RM),
        )
    }

    /// `fs cp <src> <dest>`, captured. Either side may be a `:`-prefixed
    /// device path.
    pub fn fs_cp(&self, src: &str, dest: &str) -> Result<ToolOutput> {
        self.run(
            &["fs", "cp", src, dest],
            OutputMode::Captured,
            Some(timeouts::CP_FILE),
        )
    }

    /// `fs df` streamed to the console.
    pub fn fs_df_streamed(&self) -> Result<ToolOutput> {
        self.run(&["fs", "df"], OutputMode::Streamed, Some(timeouts::DF))
    }

    /// `exec <code>`, captured, with the standard exec timeout.
    pub fn exec(&self, code: &str) -> Result<ToolOutput> {
        self.run(&["exec", code], OutputMode::Captured, Some(timeouts::EXEC))
    }

    /// `exec <code>` streamed to the console. `timeout: None` lets the code
    /// run until it finishes or the user interrupts (used by `run`).
    pub fn exec_streamed(&self, code: &str, timeout: Option<Duration>) -> Result<ToolOutput> {
        self.run(&["exec", code], OutputMode::Streamed, timeout)
    }

    /// Sleep the full settle delay (after a filesystem mutation).
    pub fn settle(&self) {
        thread::sleep(FS_OPERATION_DELAY);
    }

    /// Sleep half the settle delay (after a listing).
    pub fn settle_brief(&self) {
        thread::sleep(FS_OPERATION_DELAY / 2);
    }
}
