//! Remote path normalization.
//!
//! Paths on the device are stored normalized: forward slashes, no leading or
//! trailing separators, the empty string meaning the filesystem root. Whether
//! the user *wrote* a trailing slash is significant — `upload dir/` deploys
//! the directory's contents while `upload dir` deploys the directory itself —
//! so that intent is captured separately in [`RemoteArg`] before
//! normalization throws it away.
//!
//! mpremote addresses the device with several `:` spellings depending on the
//! subcommand (`:` for a root stat, `:/` as a root copy target, `:name`
//! elsewhere); the `*_target` accessors produce the right one.

use std::fmt;

/// A normalized path on the device filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemotePath {
    inner: String,
}

impl RemotePath {
    /// Normalize a raw path string. Backslashes are accepted as separators;
    /// leading, trailing and repeated separators are stripped. The result
    /// may be the root (empty) path.
    pub fn new(raw: &str) -> Self {
        let cleaned = raw.trim().replace('\\', "/");
        let inner = cleaned
            .split('/')
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        Self { inner }
    }

    /// The device root.
    pub fn root() -> Self {
        Self {
            inner: String::new(),
        }
    }

    /// Whether this is the device root.
    pub fn is_root(&self) -> bool {
        self.inner.is_empty()
    }

    /// The normalized path without leading slash; empty for root.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Absolute form with a leading slash (`/` for root).
    pub fn absolute(&self) -> String {
        format!("/{}", self.inner)
    }

    /// Append a (possibly multi-component) relative path.
    pub fn join(&self, name: &str) -> Self {
        if self.is_root() {
            Self::new(name)
        } else {
            Self::new(&format!("{}/{}", self.inner, name))
        }
    }

    /// Parent directory; the root is its own parent.
    pub fn parent(&self) -> Self {
        match self.inner.rsplit_once('/') {
            Some((head, _)) => Self {
                inner: head.to_string(),
            },
            None => Self::root(),
        }
    }

    /// Final component; empty for root.
    pub fn name(&self) -> &str {
        self.inner.rsplit('/').next().unwrap_or("")
    }

    /// Path components from the root down.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.inner.split('/').filter(|c| !c.is_empty())
    }

    /// Every prefix of this path, shortest first (`a`, `a/b`, `a/b/c`).
    /// Empty for the root. This is the mkdir order for [`ensure_dir`].
    ///
    /// [`ensure_dir`]: crate::device::Device::ensure_dir
    pub fn prefixes(&self) -> Vec<Self> {
        let mut out = Vec::new();
        let mut acc = String::new();
        for part in self.components() {
            if acc.is_empty() {
                acc.push_str(part);
            } else {
                acc.push('/');
                acc.push_str(part);
            }
            out.push(Self { inner: acc.clone() });
        }
        out
    }

    /// mpremote target for `fs stat` (`:` for root, `:/path` otherwise).
    pub fn stat_target(&self) -> String {
        if self.is_root() {
            ":".to_string()
        } else {
            format!(":/{}", self.inner)
        }
    }

    /// mpremote target for `fs ls` (`:/` for root, `:/path` otherwise).
    pub fn ls_target(&self) -> String {
        format!(":/{}", self.inner)
    }

    /// mpremote target for `fs cp` / `fs mkdir` / `fs rm`
    /// (`:/` for root, `:path` otherwise).
    pub fn cp_target(&self) -> String {
        if self.is_root() {
            ":/".to_string()
        } else {
            format!(":{}", self.inner)
        }
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, ":/")
        } else {
            write!(f, ":{}", self.inner)
        }
    }
}

/// A user-supplied remote path argument with its trailing-slash intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteArg {
    /// The normalized path.
    pub path: RemotePath,
    /// Whether the argument ended with a separator, i.e. "the contents of"
    /// rather than "the item itself". `/` and `//` both mean the contents of
    /// the root.
    pub contents: bool,
}

impl RemoteArg {
    /// Parse a raw argument, capturing the trailing-slash intent before
    /// normalization.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let contents = trimmed.ends_with('/') || trimmed.ends_with('\\');
        Self {
            path: RemotePath::new(trimmed),
            contents,
        }
    }
}
