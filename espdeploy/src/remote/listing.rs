//! Parsing of `mpremote fs ls` output and tree rendering.
//!
//! `fs ls -r` prints one entry per line, `<size> <path>` with the path
//! relative to the listed directory and a trailing `/` on directories.
//! mpremote also echoes the command target as a header line; that and any
//! `stat` echoes are filtered out.

use std::collections::BTreeMap;

use crate::remote::path::RemotePath;

/// One entry from a recursive listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// Absolute device path (leading slash, no trailing slash).
    pub path: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

/// Parse `fs ls -r` stdout into absolute entries under `base`.
pub fn parse_ls_recursive(stdout: &str, base: &RemotePath) -> Vec<ListEntry> {
    let base_abs = base.absolute();
    let mut out = Vec::new();

    for line in stdout.lines() {
        let Some(name) = entry_name(line, base) else {
            continue;
        };

        let is_dir = name.ends_with('/');
        let name = name.trim_end_matches('/');
        if name.is_empty() {
            continue;
        }

        let path = if base.is_root() {
            format!("/{name}")
        } else {
            format!("{base_abs}/{name}")
        };
        out.push(ListEntry { path, is_dir });
    }

    out
}

/// Parse plain `fs ls :` stdout into root item names (no slashes).
pub fn parse_ls_names(stdout: &str) -> Vec<String> {
    let mut out = Vec::new();
    for line in stdout.lines() {
        let Some(name) = entry_name(line, &RemotePath::root()) else {
            continue;
        };
        let name = name.trim_matches('/');
        if !name.is_empty() {
            out.push(name.to_string());
        }
    }
    out
}

/// Extract the entry name from one listing line, or `None` for headers,
/// echoes and blanks. Entries are `<size> <name>` with the size column
/// optional; names may contain spaces.
fn entry_name<'a>(line: &'a str, base: &RemotePath) -> Option<&'a str> {
    let content = line.trim();
    if content.is_empty() {
        return None;
    }
    let lower = content.to_lowercase();
    if lower.starts_with("ls ") || lower.starts_with("stat ") {
        return None;
    }
    // The echoed target line, e.g. ":" or ":/lib".
    if content == base.stat_target() || content == base.ls_target() || content == ":" {
        return None;
    }

    match content.split_once(char::is_whitespace) {
        Some((size, rest)) if size.chars().all(|c| c.is_ascii_digit()) && !rest.trim().is_empty() => {
            Some(rest.trim_start())
        }
        _ => Some(content),
    }
}

/// Project an absolute entry path to a path relative to `base`.
///
/// Returns `None` when the entry is not strictly under `base`.
pub fn relative_to(abs: &str, base: &RemotePath) -> Option<String> {
    if base.is_root() {
        let rel = abs.strip_prefix('/')?;
        (!rel.is_empty()).then(|| rel.to_string())
    } else {
        let prefix = format!("{}/", base.absolute());
        let rel = abs.strip_prefix(&prefix)?;
        (!rel.is_empty()).then(|| rel.to_string())
    }
}

/// A directory tree assembled from relative paths, for `tree` output.
#[derive(Debug, Default)]
pub struct Tree {
    children: BTreeMap<String, Tree>,
}

impl Tree {
    /// Build a tree from relative entry paths (`a/b/c.py` style).
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::default();
        for p in paths {
            tree.insert(p.as_ref());
        }
        tree
    }

    /// Insert one relative path, creating intermediate nodes.
    pub fn insert(&mut self, rel: &str) {
        let mut node = self;
        for part in rel.split('/').filter(|p| !p.is_empty()) {
            node = node.children.entry(part.to_string()).or_default();
        }
    }

    /// Whether the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Render with box-drawing connectors, one line per node. The caller
    /// prints the root label.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, "");
        out
    }

    fn render_into(&self, out: &mut String, prefix: &str) {
        let last = self.children.len().saturating_sub(1);
        for (i, (name, child)) in self.children.iter().enumerate() {
            let connector = if i == last { "└── " } else { "├── " };
            out.push_str(prefix);
            out.push_str(connector);
            out.push_str(name);
            out.push('\n');
            if !child.is_empty() {
                let extension = if i == last { "    " } else { "│   " };
                child.render_into(out, &format!("{prefix}{extension}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT_LS_R: &str = "\
ls :/
         139 boot.py
           0 lib/
         412 lib/wifi.py
           0 lib/net/
         300 lib/net/http.py
";

    #[test]
    fn test_parse_recursive_root() {
        let entries = parse_ls_recursive(ROOT_LS_R, &RemotePath::root());
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "/boot.py",
                "/lib",
                "/lib/wifi.py",
                "/lib/net",
                "/lib/net/http.py"
            ]
        );
        assert!(!entries[0].is_dir);
        assert!(entries[1].is_dir);
        assert!(entries[3].is_dir);
    }

    #[test]
    fn test_parse_recursive_subdir() {
        let stdout = "ls :/lib\n         412 wifi.py\n           0 net/\n         300 net/http.py\n";
        let base = RemotePath::new("lib");
        let entries = parse_ls_recursive(stdout, &base);
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/lib/wifi.py", "/lib/net", "/lib/net/http.py"]);
    }

    #[test]
    fn test_parse_names_with_spaces() {
        let stdout = "         100 my notes.txt\n";
        let entries = parse_ls_recursive(stdout, &RemotePath::root());
        assert_eq!(entries[0].path, "/my notes.txt");
    }

    #[test]
    fn test_parse_line_without_size_column() {
        let stdout = "boot.py\nlib/\n";
        let entries = parse_ls_recursive(stdout, &RemotePath::root());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "/boot.py");
        assert!(entries[1].is_dir);
    }

    #[test]
    fn test_parse_skips_echo_lines() {
        let stdout = "ls :/\nstat :/lib\n:\n\n         10 a.py\n";
        let entries = parse_ls_recursive(stdout, &RemotePath::root());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "/a.py");
    }

    #[test]
    fn test_parse_root_names_for_delete() {
        let stdout = "ls :\n         139 boot.py\n           0 lib/\n";
        assert_eq!(parse_ls_names(stdout), vec!["boot.py", "lib"]);
    }

    #[test]
    fn test_relative_to_root() {
        assert_eq!(
            relative_to("/lib/wifi.py", &RemotePath::root()),
            Some("lib/wifi.py".to_string())
        );
        assert_eq!(relative_to("/", &RemotePath::root()), None);
    }

    #[test]
    fn test_relative_to_subdir() {
        let base = RemotePath::new("lib");
        assert_eq!(
            relative_to("/lib/net/http.py", &base),
            Some("net/http.py".to_string())
        );
        // Not under the base.
        assert_eq!(relative_to("/boot.py", &base), None);
        // The base itself is not a child.
        assert_eq!(relative_to("/lib", &base), None);
    }

    #[test]
    fn test_tree_render() {
        let tree = Tree::from_paths(["boot.py", "lib/wifi.py", "lib/net/http.py", "zz.py"]);
        let rendered = tree.render();
        assert_eq!(
            rendered,
            "\
├── boot.py
├── lib
│   ├── net
│   │   └── http.py
│   └── wifi.py
└── zz.py
"
        );
    }

    #[test]
    fn test_tree_empty_dir_is_leaf() {
        let tree = Tree::from_paths(["logs"]);
        assert_eq!(tree.render(), "└── logs\n");
    }

    #[test]
    fn test_tree_empty() {
        let tree = Tree::default();
        assert!(tree.is_empty());
        assert_eq!(tree.render(), "");
    }
}
