//! `list` and `tree` command implementations.
//!
//! Status lines go to stderr; the listing data itself goes to stdout so it
//! can be piped.

use anyhow::{Result, bail};
use espdeploy::{Device, Error, PathKind, RemotePath, Tree, relative_to};

fn checked_directory(dev: &Device, path: &RemotePath) -> Result<()> {
    if path.is_root() {
        return Ok(());
    }
    match dev.stat(path)? {
        None => Err(Error::RemoteMissing(path.as_str().to_string()).into()),
        Some(PathKind::Dir) => Ok(()),
        Some(kind) => bail!(
            "'{path}' is a {}, not a directory. Use 'download' for files.",
            kind.noun()
        ),
    }
}

/// Recursively list a remote directory.
pub(crate) fn cmd_list(port: &str, remote_directory: Option<&str>) -> Result<()> {
    let path = remote_directory.map_or_else(RemotePath::root, RemotePath::new);
    let dev = Device::new(port);

    checked_directory(&dev, &path)?;

    eprintln!("Listing contents of '{path}'...");
    let mut entries = dev.list_recursive(&path)?;
    if entries.is_empty() {
        eprintln!("Directory '{path}' is empty.");
        return Ok(());
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    for entry in &entries {
        if let Some(rel) = relative_to(&entry.path, &path) {
            let suffix = if entry.is_dir { "/" } else { "" };
            println!("{rel}{suffix}");
        }
    }
    Ok(())
}

/// Display a remote directory as a tree.
pub(crate) fn cmd_tree(port: &str, remote_directory: Option<&str>) -> Result<()> {
    let path = remote_directory.map_or_else(RemotePath::root, RemotePath::new);
    let dev = Device::new(port);

    checked_directory(&dev, &path)?;

    eprintln!("Tree for '{path}' on device:");
    let entries = dev.list_recursive(&path)?;
    if entries.is_empty() {
        eprintln!("Directory '{path}' is empty.");
        return Ok(());
    }

    let rels: Vec<String> = entries
        .iter()
        .filter_map(|e| relative_to(&e.path, &path))
        .collect();
    let tree = Tree::from_paths(&rels);
    if tree.is_empty() {
        eprintln!("Directory '{path}' is empty.");
        return Ok(());
    }

    if path.is_root() {
        println!(".");
    } else {
        println!("{}", path.name());
    }
    print!("{}", tree.render());
    Ok(())
}
