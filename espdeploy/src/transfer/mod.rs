//! Upload/download planning.
//!
//! The mirroring decisions — what a trailing slash means, where a file lands,
//! which directories must exist first — are computed up front into plain data
//! plans. Executing a plan is then a straight walk over `fs mkdir`/`fs cp`
//! calls, and the decisions stay testable without a board attached.

pub mod download;
pub mod upload;

pub use download::{plan_download_file, plan_download_tree};
pub use upload::{UploadKind, plan_upload};

use std::path::PathBuf;

use crate::remote::path::RemotePath;

/// One local-file-to-device copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCopy {
    /// Absolute local source path.
    pub local: PathBuf,
    /// Remote destination path.
    pub remote: RemotePath,
}

/// Plan for an `upload` invocation.
#[derive(Debug)]
pub struct UploadPlan {
    /// What shape of upload this is (single file, directory, contents).
    pub kind: UploadKind,
    /// Absolute local source.
    pub local: PathBuf,
    /// Remote base the content lands in (the item path for single items).
    pub base: RemotePath,
    /// Remote directories to ensure, parents before children.
    pub ensure_dirs: Vec<RemotePath>,
    /// File copies, grouped by directory.
    pub copies: Vec<FileCopy>,
    /// Non-fatal notes for the user (e.g. ignored trailing slash).
    pub warnings: Vec<String>,
}

/// Plan for a `download` invocation.
#[derive(Debug, Default)]
pub struct DownloadPlan {
    /// Local directories to create, parents before children.
    pub dirs: Vec<PathBuf>,
    /// Device-to-local file copies.
    pub files: Vec<(RemotePath, PathBuf)>,
}
