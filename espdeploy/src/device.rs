//! High-level device operations on top of the mpremote bridge.

use std::path::Path;

use log::{debug, info};

use crate::bridge::mpremote::{Mpremote, timeouts};
use crate::bridge::ToolOutput;
use crate::error::{Error, Result};
use crate::remote::listing::{ListEntry, parse_ls_names, parse_ls_recursive};
use crate::remote::path::RemotePath;
use crate::remote::stat::{PathKind, is_exists, is_missing, parse_stat_output};

/// A MicroPython board reachable through mpremote on one serial port.
#[derive(Debug, Clone)]
pub struct Device {
    mp: Mpremote,
}

impl Device {
    /// Create a device handle for the given serial port.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            mp: Mpremote::new(port),
        }
    }

    /// The serial port in use.
    pub fn port(&self) -> &str {
        self.mp.port()
    }

    /// The underlying mpremote client.
    pub fn bridge(&self) -> &Mpremote {
        &self.mp
    }

    /// Stat a remote path. `Ok(None)` means the path does not exist (or the
    /// stat output was unusable, which callers treat the same way).
    pub fn stat(&self, path: &RemotePath) -> Result<Option<PathKind>> {
        let out = self.mp.fs_stat(&path.stat_target())?;
        if out.success() {
            Ok(parse_stat_output(&out.stdout))
        } else {
            if !is_missing(&out.stderr) {
                debug!("stat '{path}' failed: {}", out.error_text());
            }
            Ok(None)
        }
    }

    /// Cheap responsiveness check: list the device root.
    pub fn probe(&self) -> Result<()> {
        let out = self.mp.fs_ls(":")?;
        if out.success() {
            info!("device on {} responded", self.port());
            Ok(())
        } else {
            Err(Error::Command {
                what: format!("no response from device on {}", self.port()),
                detail: out.error_text(),
            })
        }
    }

    /// Confirm the board is actually running MicroPython; returns the
    /// reported implementation name.
    pub fn verify_micropython(&self) -> Result<String> {
        let out = self.mp.exec("import sys; print(sys.implementation.name)")?;
        if !out.success() {
            return Err(Error::Verify(out.error_text()));
        }
        let name = out.stdout.trim().to_lowercase();
        if name.contains("micropython") {
            Ok(name)
        } else {
            Err(Error::Verify(format!(
                "unexpected interpreter response: {}",
                out.stdout.trim()
            )))
        }
    }

    /// Recursively ensure a directory exists on the device, creating each
    /// path component in order. An `EEXIST` from mkdir is accepted only when
    /// a follow-up stat confirms the component is a directory.
    pub fn ensure_dir(&self, dir: &RemotePath) -> Result<()> {
        for prefix in dir.prefixes() {
            match self.stat(&prefix)? {
                Some(PathKind::Dir) => continue,
                Some(_) => return Err(Error::RemoteFileInWay(prefix.as_str().to_string())),
                None => {}
            }

            let out = self.mp.fs_mkdir(&prefix.cp_target())?;
            if out.success() {
                debug!("created remote directory '{prefix}'");
                self.mp.settle();
                continue;
            }
            if is_exists(&out.stderr) {
                // Lost a race with the board or mpremote quirk; re-check.
                match self.stat(&prefix)? {
                    Some(PathKind::Dir) => {
                        self.mp.settle_brief();
                        continue;
                    }
                    _ => return Err(Error::RemoteFileInWay(prefix.as_str().to_string())),
                }
            }
            return Err(Error::Command {
                what: format!("creating remote directory '{prefix}'"),
                detail: out.error_text(),
            });
        }
        Ok(())
    }

    /// Copy one local file onto the device.
    pub fn copy_to_device(&self, local: &Path, target: &RemotePath) -> Result<()> {
        let src = local.to_string_lossy().replace('\\', "/");
        let out = self.mp.fs_cp(&src, &target.cp_target())?;
        if out.success() {
            self.mp.settle();
            Ok(())
        } else {
            Err(Error::Command {
                what: format!("uploading '{}'", local.display()),
                detail: out.error_text(),
            })
        }
    }

    /// Copy one file from the device to a local path.
    pub fn copy_from_device(&self, remote: &RemotePath, local: &Path) -> Result<()> {
        let dest = local.to_string_lossy().replace('\\', "/");
        let out = self.mp.fs_cp(&remote.cp_target(), &dest)?;
        if out.success() {
            self.mp.settle();
            Ok(())
        } else {
            Err(Error::Command {
                what: format!("downloading '{remote}'"),
                detail: out.error_text(),
            })
        }
    }

    /// Recursive listing under a directory. A missing path yields an empty
    /// listing; callers stat first when the distinction matters.
    pub fn list_recursive(&self, dir: &RemotePath) -> Result<Vec<ListEntry>> {
        let out = self.mp.fs_ls_recursive(&dir.ls_target())?;
        if out.success() {
            let entries = parse_ls_recursive(&out.stdout, dir);
            self.mp.settle_brief();
            Ok(entries)
        } else if is_missing(&out.stderr) {
            Ok(Vec::new())
        } else {
            Err(Error::Command {
                what: format!("listing '{dir}'"),
                detail: out.error_text(),
            })
        }
    }

    /// Names of the items directly under the device root.
    pub fn root_items(&self) -> Result<Vec<String>> {
        let out = self.mp.fs_ls(":")?;
        if out.success() {
            Ok(parse_ls_names(&out.stdout))
        } else {
            Err(Error::Command {
                what: "listing device root".to_string(),
                detail: out.error_text(),
            })
        }
    }

    /// Recursively delete a path on the device.
    pub fn remove_recursive(&self, path: &RemotePath) -> Result<()> {
        let out = self.mp.fs_rm_recursive(&path.cp_target())?;
        self.mp.settle();
        if out.success() {
            Ok(())
        } else {
            Err(Error::Command {
                what: format!("deleting '{path}'"),
                detail: out.error_text(),
            })
        }
    }

    /// Run a script on the device, streaming its output to the console.
    ///
    /// The script is executed with `exec(open(...).read())` and no timeout;
    /// it may run until it finishes or the user interrupts. Returns the
    /// mpremote exit code.
    pub fn run_script(&self, script: &RemotePath) -> Result<i32> {
        match self.stat(script)? {
            None => return Err(Error::RemoteMissing(script.as_str().to_string())),
            Some(PathKind::File) => {}
            Some(_) => return Err(Error::RemoteNotAFile(script.as_str().to_string())),
        }

        let escaped = script.absolute().replace('\'', "\\'");
        let code = format!("exec(open('{escaped}').read())");
        info!("running '{script}' on {}", self.port());
        let out = self.mp.exec_streamed(&code, None)?;
        Ok(out.status.unwrap_or(1))
    }

    /// Run a short code snippet with output streamed to the console
    /// (diagnostics).
    pub fn exec_console(&self, code: &str) -> Result<ToolOutput> {
        self.mp.exec_streamed(code, Some(timeouts::EXEC))
    }

    /// `fs df` streamed to the console.
    pub fn df_console(&self) -> Result<ToolOutput> {
        self.mp.fs_df_streamed()
    }

    /// `fs ls :/` streamed to the console.
    pub fn ls_root_console(&self) -> Result<ToolOutput> {
        self.mp.fs_ls_streamed(":/")
    }
}
