//! `run` command implementation.

use anyhow::Result;
use espdeploy::{Device, RemotePath};

/// Run a script that is already on the board, streaming its output. Returns
/// the mpremote exit code so script failures propagate to ours.
pub(crate) fn cmd_run(port: &str, script: &str) -> Result<i32> {
    let path = RemotePath::new(script);
    let dev = Device::new(port);

    eprintln!("Checking for '{path}' on device...");
    let code = dev.run_script(&path)?;
    Ok(code)
}
