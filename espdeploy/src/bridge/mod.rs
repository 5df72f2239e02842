//! Subprocess bridges to the external device tools.
//!
//! Everything this crate does on a device happens by spawning `mpremote` or
//! `esptool` and inspecting the exit status and captured output. There is no
//! protocol implementation here.

pub mod esptool;
pub mod mpremote;

pub use esptool::Esptool;
pub use mpremote::Mpremote;

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::error::{Error, Result};

/// Interval between `try_wait` polls while a timeout is armed.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Captured result of one external tool invocation.
///
/// A non-zero exit status is not an `Error`: callers inspect [`success`] and
/// decide, mirroring how the tools themselves report device-side failures.
///
/// [`success`]: ToolOutput::success
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Exit code, if the process exited normally.
    pub status: Option<i32>,
    /// Captured stdout (empty in streamed mode).
    pub stdout: String,
    /// Captured stderr (empty in streamed mode).
    pub stderr: String,
}

impl ToolOutput {
    /// Whether the tool exited with status zero.
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Best-effort error text: stderr first, then stdout (mpremote sometimes
    /// reports errors on stdout), then the exit status.
    pub fn error_text(&self) -> String {
        let err = self.stderr.trim();
        if !err.is_empty() {
            return err.to_string();
        }
        let out = self.stdout.trim();
        if !out.is_empty() {
            return out.to_string();
        }
        match self.status {
            Some(code) => format!("exited with status {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// How the child's stdout/stderr are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputMode {
    /// Pipe and collect both streams.
    Captured,
    /// Let the child write to our console (interactive/long-running output).
    Streamed,
}

/// Run an external tool to completion, optionally bounded by a timeout.
///
/// On timeout the child is killed and [`Error::Timeout`] is returned. A
/// missing binary maps to [`Error::ToolMissing`].
pub(crate) fn run_tool(
    tool: &str,
    args: &[String],
    mode: OutputMode,
    timeout: Option<Duration>,
) -> Result<ToolOutput> {
    trace!("spawning {tool} {}", args.join(" "));

    let mut cmd = Command::new(tool);
    cmd.args(args);
    if mode == OutputMode::Captured {
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    }

    let mut child = cmd.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::ToolMissing {
                tool: tool.to_string(),
            }
        } else {
            Error::Io(e)
        }
    })?;

    // Drain pipes on background threads so the child cannot block on a full
    // pipe while we poll for exit.
    let stdout_reader = child.stdout.take().map(spawn_reader);
    let stderr_reader = child.stderr.take().map(spawn_reader);

    let status = wait_with_timeout(&mut child, tool, timeout)?;

    let stdout = stdout_reader.map(join_reader).unwrap_or_default();
    let stderr = stderr_reader.map(join_reader).unwrap_or_default();

    let output = ToolOutput {
        status: status.code(),
        stdout,
        stderr,
    };
    if !output.success() {
        debug!("{tool} exited with {:?}: {}", output.status, output.error_text());
    }
    Ok(output)
}

fn spawn_reader<R: Read + Send + 'static>(mut stream: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = String::new();
        let _ = stream.read_to_string(&mut buf);
        buf
    })
}

fn join_reader(handle: thread::JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}

fn wait_with_timeout(
    child: &mut Child,
    tool: &str,
    timeout: Option<Duration>,
) -> Result<std::process::ExitStatus> {
    let Some(limit) = timeout else {
        return Ok(child.wait()?);
    };

    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::Timeout {
                tool: tool.to_string(),
                seconds: limit.as_secs(),
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_tool_output_success() {
        let out = ToolOutput {
            status: Some(0),
            ..Default::default()
        };
        assert!(out.success());

        let out = ToolOutput {
            status: Some(1),
            ..Default::default()
        };
        assert!(!out.success());

        let out = ToolOutput {
            status: None,
            ..Default::default()
        };
        assert!(!out.success());
    }

    #[test]
    fn test_error_text_prefers_stderr() {
        let out = ToolOutput {
            status: Some(1),
            stdout: "on stdout".to_string(),
            stderr: "on stderr\n".to_string(),
        };
        assert_eq!(out.error_text(), "on stderr");
    }

    #[test]
    fn test_error_text_falls_back_to_stdout() {
        let out = ToolOutput {
            status: Some(1),
            stdout: "mpremote: no device\n".to_string(),
            stderr: String::new(),
        };
        assert_eq!(out.error_text(), "mpremote: no device");
    }

    #[test]
    fn test_error_text_falls_back_to_status() {
        let out = ToolOutput {
            status: Some(3),
            ..Default::default()
        };
        assert_eq!(out.error_text(), "exited with status 3");
    }

    #[test]
    fn test_missing_tool_is_distinct_error() {
        let err = run_tool(
            "definitely-not-a-real-binary-xyz",
            &[],
            OutputMode::Captured,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::ToolMissing { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_stdout_and_stderr() {
        let _ = env_logger::builder().is_test(true).try_init();
        let out = run_tool(
            "sh",
            &args(&["-c", "echo out; echo err >&2"]),
            OutputMode::Captured,
            Some(Duration::from_secs(5)),
        )
        .unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "out");
        assert_eq!(out.stderr.trim(), "err");
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_not_an_error() {
        let out = run_tool(
            "sh",
            &args(&["-c", "exit 7"]),
            OutputMode::Captured,
            Some(Duration::from_secs(5)),
        )
        .unwrap();
        assert!(!out.success());
        assert_eq!(out.status, Some(7));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_child() {
        let started = Instant::now();
        let err = run_tool(
            "sleep",
            &args(&["30"]),
            OutputMode::Captured,
            Some(Duration::from_millis(200)),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
