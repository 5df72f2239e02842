//! Upload planning.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::remote::path::RemotePath;
use crate::transfer::{FileCopy, UploadPlan};

/// Shape of an upload, for messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    /// A single local file.
    File,
    /// A local directory, recreated on the device under its own name.
    DirAsItem,
    /// The contents of a local directory, mirrored into the destination.
    DirContents,
}

/// Compute the plan for `upload LOCAL [REMOTE_PARENT]`.
///
/// A trailing separator on a local directory means "its contents"; without
/// one the directory itself is recreated remotely. `remote_parent` is the
/// device directory the item (or contents) lands in; `None` means the root.
pub fn plan_upload(local_raw: &str, remote_parent: Option<&str>) -> Result<UploadPlan> {
    let had_trailing_slash = local_raw.ends_with('/') || local_raw.ends_with('\\');

    let mut cleaned = local_raw.trim_end_matches(['/', '\\']);
    if cleaned.is_empty() {
        // "/" on its own survives normalization.
        cleaned = local_raw;
    }

    let abs = std::path::absolute(cleaned)?;
    if !abs.exists() {
        return Err(Error::LocalMissing(PathBuf::from(local_raw)));
    }

    let parent = remote_parent.map_or_else(RemotePath::root, RemotePath::new);
    let mut warnings = Vec::new();

    if abs.is_file() {
        if had_trailing_slash {
            warnings.push(format!(
                "trailing slash on local file '{local_raw}' is ignored"
            ));
        }
        let name = file_name(&abs)?;
        let target = parent.join(&name);
        let ensure_dirs = if parent.is_root() {
            Vec::new()
        } else {
            vec![parent.clone()]
        };
        return Ok(UploadPlan {
            kind: UploadKind::File,
            local: abs.clone(),
            base: target.clone(),
            ensure_dirs,
            copies: vec![FileCopy {
                local: abs,
                remote: target,
            }],
            warnings,
        });
    }

    if !abs.is_dir() {
        // Sockets, broken symlinks and friends.
        return Err(Error::LocalMissing(PathBuf::from(local_raw)));
    }

    let (kind, base) = if had_trailing_slash {
        (UploadKind::DirContents, parent.clone())
    } else {
        (UploadKind::DirAsItem, parent.join(&file_name(&abs)?))
    };

    let mut ensure_dirs = Vec::new();
    if kind == UploadKind::DirContents {
        if !base.is_root() {
            ensure_dirs.push(base.clone());
        }
    } else {
        if !parent.is_root() {
            ensure_dirs.push(parent.clone());
        }
        ensure_dirs.push(base.clone());
    }

    let mut rel_dirs = Vec::new();
    let mut rel_files = Vec::new();
    walk_local(&abs, Path::new(""), &mut rel_dirs, &mut rel_files)?;

    for rel in &rel_dirs {
        ensure_dirs.push(base.join(&slashed(rel)));
    }
    let copies = rel_files
        .iter()
        .map(|rel| FileCopy {
            local: abs.join(rel),
            remote: base.join(&slashed(rel)),
        })
        .collect();

    Ok(UploadPlan {
        kind,
        local: abs,
        base,
        ensure_dirs,
        copies,
        warnings,
    })
}

/// Depth-first walk collecting relative directory and file paths, each level
/// in name order, parents before children.
fn walk_local(
    root: &Path,
    rel: &Path,
    dirs: &mut Vec<PathBuf>,
    files: &mut Vec<PathBuf>,
) -> io::Result<()> {
    let mut entries: Vec<_> = fs::read_dir(root.join(rel))?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(std::fs::DirEntry::file_name);

    for entry in entries {
        let file_type = entry.file_type()?;
        let child = rel.join(entry.file_name());
        if file_type.is_dir() {
            dirs.push(child.clone());
            walk_local(root, &child, dirs, files)?;
        } else if file_type.is_file() {
            files.push(child);
        }
        // Anything else (sockets, device nodes) is skipped.
    }
    Ok(())
}

fn slashed(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::LocalMissing(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(path).unwrap();
    }

    fn remote_strs(paths: &[RemotePath]) -> Vec<String> {
        paths.iter().map(|p| p.as_str().to_string()).collect()
    }

    #[test]
    fn test_single_file_to_root() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("main.py");
        touch(&file);

        let plan = plan_upload(file.to_str().unwrap(), None).unwrap();
        assert_eq!(plan.kind, UploadKind::File);
        assert!(plan.ensure_dirs.is_empty());
        assert_eq!(plan.copies.len(), 1);
        assert_eq!(plan.copies[0].remote.as_str(), "main.py");
        assert_eq!(plan.copies[0].local, file);
    }

    #[test]
    fn test_single_file_into_nested_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("wifi.py");
        touch(&file);

        let plan = plan_upload(file.to_str().unwrap(), Some("/lib/net/")).unwrap();
        assert_eq!(remote_strs(&plan.ensure_dirs), vec!["lib/net"]);
        assert_eq!(plan.copies[0].remote.as_str(), "lib/net/wifi.py");
    }

    #[test]
    fn test_trailing_slash_on_file_warns() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("main.py");
        touch(&file);

        let raw = format!("{}/", file.to_str().unwrap());
        let plan = plan_upload(&raw, None).unwrap();
        assert_eq!(plan.kind, UploadKind::File);
        assert_eq!(plan.warnings.len(), 1);
    }

    #[test]
    fn test_dir_as_item() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("app");
        touch(&dir.join("main.py"));
        touch(&dir.join("sub").join("helper.py"));

        let plan = plan_upload(dir.to_str().unwrap(), None).unwrap();
        assert_eq!(plan.kind, UploadKind::DirAsItem);
        assert_eq!(plan.base.as_str(), "app");
        assert_eq!(remote_strs(&plan.ensure_dirs), vec!["app", "app/sub"]);

        let targets: Vec<&str> = plan.copies.iter().map(|c| c.remote.as_str()).collect();
        assert_eq!(targets, vec!["app/main.py", "app/sub/helper.py"]);
    }

    #[test]
    fn test_dir_as_item_under_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("app");
        touch(&dir.join("main.py"));

        let plan = plan_upload(dir.to_str().unwrap(), Some("proj")).unwrap();
        assert_eq!(plan.base.as_str(), "proj/app");
        assert_eq!(remote_strs(&plan.ensure_dirs), vec!["proj", "proj/app"]);
        assert_eq!(plan.copies[0].remote.as_str(), "proj/app/main.py");
    }

    #[test]
    fn test_dir_contents_to_root() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("app");
        touch(&dir.join("main.py"));
        touch(&dir.join("sub").join("helper.py"));

        let raw = format!("{}/", dir.to_str().unwrap());
        let plan = plan_upload(&raw, None).unwrap();
        assert_eq!(plan.kind, UploadKind::DirContents);
        assert!(plan.base.is_root());
        assert_eq!(remote_strs(&plan.ensure_dirs), vec!["sub"]);

        let targets: Vec<&str> = plan.copies.iter().map(|c| c.remote.as_str()).collect();
        assert_eq!(targets, vec!["main.py", "sub/helper.py"]);
    }

    #[test]
    fn test_dir_contents_into_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("app");
        touch(&dir.join("a.py"));

        let raw = format!("{}/", dir.to_str().unwrap());
        let plan = plan_upload(&raw, Some("deployed")).unwrap();
        assert_eq!(plan.base.as_str(), "deployed");
        assert_eq!(remote_strs(&plan.ensure_dirs), vec!["deployed"]);
        assert_eq!(plan.copies[0].remote.as_str(), "deployed/a.py");
    }

    #[test]
    fn test_empty_dir_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("empty");
        fs::create_dir(&dir).unwrap();

        let raw = format!("{}/", dir.to_str().unwrap());
        let plan = plan_upload(&raw, None).unwrap();
        assert!(plan.copies.is_empty());
        assert!(plan.ensure_dirs.is_empty());
    }

    #[test]
    fn test_missing_local_source() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope.py");
        let err = plan_upload(missing.to_str().unwrap(), None).unwrap_err();
        assert!(matches!(err, Error::LocalMissing(_)));
    }

    #[test]
    fn test_walk_is_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("d");
        touch(&dir.join("b.py"));
        touch(&dir.join("a.py"));
        touch(&dir.join("c").join("x.py"));

        let plan = plan_upload(dir.to_str().unwrap(), None).unwrap();
        let targets: Vec<&str> = plan.copies.iter().map(|c| c.remote.as_str()).collect();
        assert_eq!(targets, vec!["d/a.py", "d/b.py", "d/c/x.py"]);
    }
}
