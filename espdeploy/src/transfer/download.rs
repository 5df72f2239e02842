//! Download planning.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::remote::listing::{ListEntry, relative_to};
use crate::remote::path::RemotePath;
use crate::transfer::DownloadPlan;

/// Compute the plan for downloading a single remote file.
///
/// A local destination ending in a separator, or naming an existing
/// directory, receives the file *into* it under its remote basename; any
/// other destination is the exact target file path. With no destination the
/// file lands in the current directory.
pub fn plan_download_file(remote: &RemotePath, local_dest: Option<&str>) -> Result<DownloadPlan> {
    let basename = remote.name().to_string();

    let target = match local_dest {
        Some(raw) => {
            let dest = std::path::absolute(raw.trim_end_matches(['/', '\\']))?;
            let wants_dir = raw.ends_with('/') || raw.ends_with('\\') || dest.is_dir();
            if wants_dir {
                dest.join(&basename)
            } else {
                dest
            }
        }
        None => std::path::absolute(Path::new(&basename))?,
    };

    let mut plan = DownloadPlan::default();
    if let Some(parent) = target.parent() {
        plan.dirs.push(parent.to_path_buf());
    }
    plan.files.push((remote.clone(), target));
    Ok(plan)
}

/// Compute the plan for downloading a remote directory tree.
///
/// `entries` is the recursive listing under `base`. With `contents` the tree
/// is mirrored straight into `local_dest` (or the current directory); without
/// it the remote directory itself is recreated under the destination.
pub fn plan_download_tree(
    entries: &[ListEntry],
    base: &RemotePath,
    contents: bool,
    local_dest: Option<&str>,
) -> Result<DownloadPlan> {
    let dest_root = std::path::absolute(local_dest.unwrap_or("."))?;
    let local_base = if contents {
        dest_root
    } else {
        dest_root.join(base.name())
    };

    let mut plan = DownloadPlan {
        dirs: vec![local_base.clone()],
        files: Vec::new(),
    };

    let mut dir_rels: Vec<String> = Vec::new();
    let mut file_rels: Vec<String> = Vec::new();
    for entry in entries {
        let Some(rel) = relative_to(&entry.path, base) else {
            continue;
        };
        if entry.is_dir {
            dir_rels.push(rel);
        } else {
            file_rels.push(rel);
        }
    }
    dir_rels.sort();
    file_rels.sort();

    for rel in dir_rels {
        plan.dirs.push(join_rel(&local_base, &rel));
    }
    for rel in file_rels {
        let remote = base.join(&rel);
        plan.files.push((remote, join_rel(&local_base, &rel)));
    }

    Ok(plan)
}

fn join_rel(base: &Path, rel: &str) -> PathBuf {
    let mut out = base.to_path_buf();
    for part in rel.split('/').filter(|p| !p.is_empty()) {
        out.push(part);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, is_dir: bool) -> ListEntry {
        ListEntry {
            path: path.to_string(),
            is_dir,
        }
    }

    #[test]
    fn test_file_into_existing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let remote = RemotePath::new("logs/today.txt");
        let plan = plan_download_file(&remote, Some(tmp.path().to_str().unwrap())).unwrap();
        assert_eq!(plan.files.len(), 1);
        assert_eq!(plan.files[0].1, tmp.path().join("today.txt"));
    }

    #[test]
    fn test_file_with_trailing_slash_dest() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = format!("{}/out/", tmp.path().to_str().unwrap());
        let remote = RemotePath::new("main.py");
        let plan = plan_download_file(&remote, Some(&dest)).unwrap();
        assert_eq!(plan.files[0].1, tmp.path().join("out").join("main.py"));
        assert!(plan.dirs.contains(&tmp.path().join("out")));
    }

    #[test]
    fn test_file_renamed_target() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("copy.py");
        let remote = RemotePath::new("main.py");
        let plan = plan_download_file(&remote, Some(dest.to_str().unwrap())).unwrap();
        assert_eq!(plan.files[0].1, dest);
    }

    #[test]
    fn test_file_default_dest_uses_basename() {
        let remote = RemotePath::new("lib/wifi.py");
        let plan = plan_download_file(&remote, None).unwrap();
        assert_eq!(
            plan.files[0].1.file_name().unwrap().to_str().unwrap(),
            "wifi.py"
        );
    }

    #[test]
    fn test_tree_dir_as_item() {
        let tmp = tempfile::tempdir().unwrap();
        let base = RemotePath::new("logs");
        let entries = vec![
            entry("/logs/a.txt", false),
            entry("/logs/old", true),
            entry("/logs/old/b.txt", false),
        ];
        let plan =
            plan_download_tree(&entries, &base, false, Some(tmp.path().to_str().unwrap())).unwrap();

        let local_base = tmp.path().join("logs");
        assert_eq!(plan.dirs, vec![local_base.clone(), local_base.join("old")]);
        assert_eq!(
            plan.files,
            vec![
                (RemotePath::new("logs/a.txt"), local_base.join("a.txt")),
                (
                    RemotePath::new("logs/old/b.txt"),
                    local_base.join("old").join("b.txt")
                ),
            ]
        );
    }

    #[test]
    fn test_tree_contents_mode() {
        let tmp = tempfile::tempdir().unwrap();
        let base = RemotePath::new("logs");
        let entries = vec![entry("/logs/a.txt", false)];
        let plan =
            plan_download_tree(&entries, &base, true, Some(tmp.path().to_str().unwrap())).unwrap();

        // Contents land directly in the destination, no "logs" level.
        assert_eq!(plan.dirs, vec![tmp.path().to_path_buf()]);
        assert_eq!(plan.files[0].1, tmp.path().join("a.txt"));
    }

    #[test]
    fn test_tree_root_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let base = RemotePath::root();
        let entries = vec![
            entry("/boot.py", false),
            entry("/lib", true),
            entry("/lib/x.py", false),
        ];
        let plan =
            plan_download_tree(&entries, &base, true, Some(tmp.path().to_str().unwrap())).unwrap();
        assert_eq!(plan.files.len(), 2);
        assert_eq!(plan.files[0].1, tmp.path().join("boot.py"));
        assert_eq!(plan.files[1].1, tmp.path().join("lib").join("x.py"));
    }

    #[test]
    fn test_tree_skips_entries_outside_base() {
        let tmp = tempfile::tempdir().unwrap();
        let base = RemotePath::new("logs");
        let entries = vec![entry("/other/a.txt", false), entry("/logs/b.txt", false)];
        let plan =
            plan_download_tree(&entries, &base, false, Some(tmp.path().to_str().unwrap())).unwrap();
        assert_eq!(plan.files.len(), 1);
        assert!(plan.files[0].1.ends_with("logs/b.txt"));
    }

    #[test]
    fn test_tree_empty_listing() {
        let tmp = tempfile::tempdir().unwrap();
        let base = RemotePath::new("empty");
        let plan =
            plan_download_tree(&[], &base, false, Some(tmp.path().to_str().unwrap())).unwrap();
        assert_eq!(plan.dirs.len(), 1);
        assert!(plan.files.is_empty());
    }
}
