//! `delete` command implementation.

use anyhow::{Result, bail};
use console::style;
use espdeploy::{Device, Error, RemotePath};

use crate::commands::confirm;
use crate::{Cli, CliError, was_interrupted};

/// Delete a remote path, or with no path the entire root contents (with
/// confirmation).
pub(crate) fn cmd_delete(
    cli: &Cli,
    port: &str,
    remote_path: Option<&str>,
    yes: bool,
) -> Result<()> {
    let dev = Device::new(port);

    let is_root_delete = remote_path.is_none_or(|p| {
        let trimmed = p.trim();
        trimmed.is_empty() || trimmed == "/"
    });

    if is_root_delete {
        delete_root_contents(cli, &dev, yes)
    } else {
        delete_single(
            &dev,
            &RemotePath::new(remote_path.unwrap_or_default()),
        )
    }
}

fn delete_root_contents(cli: &Cli, dev: &Device, yes: bool) -> Result<()> {
    eprintln!(
        "{} This deletes every file and directory from the root of the device.",
        style("WARNING:").red().bold()
    );
    if !yes && !confirm("Delete all files on the device?", cli.non_interactive)? {
        return Err(CliError::Cancelled("operation cancelled".to_string()).into());
    }

    eprintln!("Fetching root directory contents for deletion...");
    let items = dev.root_items()?;
    if items.is_empty() {
        eprintln!("Root directory is already empty.");
        return Ok(());
    }

    eprintln!("Items to delete from root: {}", items.join(", "));
    let mut failed = 0usize;
    for item in &items {
        if was_interrupted() {
            return Err(CliError::Cancelled("deletion interrupted".to_string()).into());
        }
        let path = RemotePath::new(item);
        eprintln!("Deleting '{path}'...");
        if let Err(err) = dev.remove_recursive(&path) {
            failed += 1;
            eprintln!("  {} {err}", style("✗").red());
        }
    }

    if failed == 0 {
        eprintln!("Deletion of root contents complete.");
        Ok(())
    } else {
        bail!("{failed} item(s) could not be deleted");
    }
}

fn delete_single(dev: &Device, path: &RemotePath) -> Result<()> {
    let kind = dev
        .stat(path)?
        .ok_or_else(|| Error::RemoteMissing(path.as_str().to_string()))?;

    eprintln!("Deleting '{path}' ({} detected)...", kind.noun());
    dev.remove_recursive(path)?;
    eprintln!("Deleted '{path}'.");
    Ok(())
}
