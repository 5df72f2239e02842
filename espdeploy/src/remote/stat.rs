//! Parsing of `mpremote fs stat` output.
//!
//! mpremote prints the raw `uos.stat` tuple; the first field is the mode
//! word, classified with the usual `S_IFDIR`/`S_IFREG` bits.

use regex::Regex;

/// Directory bit in the stat mode word.
pub const S_IFDIR: u32 = 0x4000;
/// Regular-file bit in the stat mode word.
pub const S_IFREG: u32 = 0x8000;

/// Classification of a remote path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Regular file.
    File,
    /// Directory.
    Dir,
    /// Mode bits matched neither file nor directory.
    Unknown,
}

impl PathKind {
    /// Lowercase noun for messages ("is a file, not a directory").
    pub fn noun(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Dir => "directory",
            Self::Unknown => "unknown object",
        }
    }
}

/// Extract the path kind from captured `fs stat` stdout.
///
/// Returns `None` when no stat tuple can be found or the mode field does not
/// parse; callers treat that the same as an absent path.
pub fn parse_stat_output(stdout: &str) -> Option<PathKind> {
    let re = Regex::new(r"\(([\s\S]*?)\)").ok()?;
    let tuple = re.captures(stdout)?.get(1)?.as_str();
    let mode: u32 = tuple.split(',').next()?.trim().parse().ok()?;

    if mode & S_IFDIR == S_IFDIR {
        Some(PathKind::Dir)
    } else if mode & S_IFREG == S_IFREG {
        Some(PathKind::File)
    } else {
        Some(PathKind::Unknown)
    }
}

/// Whether stderr from a failed stat/ls means "path does not exist" rather
/// than a communication problem.
pub fn is_missing(stderr: &str) -> bool {
    stderr.contains("No such file or directory") || stderr.contains("ENOENT")
}

/// Whether stderr from a failed mkdir means "already exists".
pub fn is_exists(stderr: &str) -> bool {
    stderr.contains("EEXIST") || stderr.contains("File exists")
}
