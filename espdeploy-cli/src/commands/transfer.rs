//! `upload` and `download` command implementations.

use std::fs;

use anyhow::{Result, bail};
use console::style;
use espdeploy::{
    Device, Error, PathKind, RemoteArg, RemotePath, UploadKind, plan_download_file,
    plan_download_tree, plan_upload,
};

use crate::{Cli, CliError, was_interrupted};

fn check_interrupted(what: &str) -> Result<()> {
    if was_interrupted() {
        return Err(CliError::Cancelled(format!("{what} interrupted")).into());
    }
    Ok(())
}

/// Whether `path` equals or sits under any of `dirs`.
fn is_under(path: &RemotePath, dirs: &[RemotePath]) -> bool {
    dirs.iter().any(|d| {
        path.as_str() == d.as_str() || path.as_str().starts_with(&format!("{}/", d.as_str()))
    })
}

/// Upload a local file or directory to the board.
pub(crate) fn cmd_upload(
    cli: &Cli,
    port: &str,
    local_source: &str,
    remote_destination: Option<&str>,
) -> Result<()> {
    let plan = plan_upload(local_source, remote_destination)?;
    for warning in &plan.warnings {
        eprintln!("{} {warning}", style("⚠").yellow());
    }

    let dev = Device::new(port);

    match plan.kind {
        UploadKind::File => {
            eprintln!(
                "Uploading file '{}' to '{}' on device...",
                plan.local.display(),
                plan.base
            );
        }
        UploadKind::DirAsItem => {
            eprintln!(
                "Uploading local directory '{}' as '{}' on device...",
                plan.local.display(),
                plan.base
            );
        }
        UploadKind::DirContents => {
            eprintln!(
                "Uploading contents of '{}' to '{}' on device...",
                plan.local.display(),
                plan.base
            );
        }
    }

    // mkdir failures under the upload base skip that subtree; a failure on
    // the base (or its parents) aborts the whole upload.
    let mut failed_dirs: Vec<RemotePath> = Vec::new();
    for dir in &plan.ensure_dirs {
        check_interrupted("upload")?;
        if is_under(dir, &failed_dirs) {
            continue;
        }
        if !cli.quiet {
            eprintln!("Ensuring remote directory '{dir}' exists...");
        }
        let critical = plan.base.as_str() == dir.as_str()
            || plan
                .base
                .as_str()
                .starts_with(&format!("{}/", dir.as_str()));
        match dev.ensure_dir(dir) {
            Ok(()) => {}
            Err(err) if critical => return Err(err.into()),
            Err(err) => {
                eprintln!(
                    "  {} {err}. Skipping contents of '{dir}'.",
                    style("✗").red()
                );
                failed_dirs.push(dir.clone());
            }
        }
    }

    if plan.kind == UploadKind::File {
        let copy = &plan.copies[0];
        dev.copy_to_device(&copy.local, &copy.remote)?;
        eprintln!("File upload complete.");
        return Ok(());
    }

    if plan.copies.is_empty() {
        eprintln!(
            "{} local directory '{}' has no files. Nothing to upload.",
            style("⚠").yellow(),
            plan.local.display()
        );
        return Ok(());
    }

    let mut copied = 0usize;
    let mut failed = 0usize;
    let mut skipped = 0usize;
    for copy in &plan.copies {
        check_interrupted("upload")?;
        if is_under(&copy.remote, &failed_dirs) {
            skipped += 1;
            continue;
        }
        let rel = copy.local.strip_prefix(&plan.local).unwrap_or(&copy.local);
        if !cli.quiet {
            eprintln!("  Uploading '{}' to '{}'...", rel.display(), copy.remote);
        }
        match dev.copy_to_device(&copy.local, &copy.remote) {
            Ok(()) => copied += 1,
            Err(err) => {
                failed += 1;
                eprintln!("    {} {err}", style("✗").red());
            }
        }
    }

    eprintln!("Directory upload processed. {copied} files uploaded.");
    if failed > 0 || skipped > 0 {
        bail!("{} file(s) failed or were skipped", failed + skipped);
    }
    Ok(())
}

/// Download a remote file or directory from the board.
pub(crate) fn cmd_download(
    cli: &Cli,
    port: &str,
    remote_source: &str,
    local_destination: Option<&str>,
) -> Result<()> {
    let arg = RemoteArg::parse(remote_source);
    let dev = Device::new(port);

    eprintln!("Checking remote path '{}'...", arg.path);
    let kind = dev
        .stat(&arg.path)?
        .ok_or_else(|| Error::RemoteMissing(arg.path.as_str().to_string()))?;

    match kind {
        PathKind::File => {
            let plan = plan_download_file(&arg.path, local_destination)?;
            for dir in &plan.dirs {
                fs::create_dir_all(dir)?;
            }
            let (remote, local) = &plan.files[0];
            eprintln!(
                "Downloading remote file '{remote}' to '{}'...",
                local.display()
            );
            dev.copy_from_device(remote, local)?;
            eprintln!("File download complete.");
            Ok(())
        }
        PathKind::Dir => {
            if arg.contents {
                eprintln!("Downloading contents of remote directory '{}'...", arg.path);
            } else {
                eprintln!("Downloading remote directory '{}'...", arg.path);
            }

            let entries = dev.list_recursive(&arg.path)?;
            if entries.is_empty() {
                eprintln!(
                    "Remote directory '{}' is empty. Nothing to download.",
                    arg.path
                );
                return Ok(());
            }

            let plan = plan_download_tree(&entries, &arg.path, arg.contents, local_destination)?;

            let mut dirs_created = 0usize;
            for dir in &plan.dirs {
                if !cli.quiet {
                    eprintln!("  Ensuring local directory '{}' exists...", dir.display());
                }
                fs::create_dir_all(dir)?;
                dirs_created += 1;
            }

            let mut downloaded = 0usize;
            let mut failed = 0usize;
            for (remote, local) in &plan.files {
                check_interrupted("download")?;
                if !cli.quiet {
                    eprintln!(
                        "  Downloading remote file '{remote}' to '{}'...",
                        local.display()
                    );
                }
                match dev.copy_from_device(remote, local) {
                    Ok(()) => downloaded += 1,
                    Err(err) => {
                        failed += 1;
                        eprintln!("    {} {err}", style("✗").red());
                    }
                }
            }

            eprintln!(
                "Directory download processed. {dirs_created} local directories created, \
                 {downloaded} files downloaded."
            );
            if failed > 0 {
                bail!("{failed} file(s) failed to download");
            }
            Ok(())
        }
        PathKind::Unknown => {
            bail!(
                "remote path '{}' is neither a file nor a directory",
                arg.path
            );
        }
    }
}
