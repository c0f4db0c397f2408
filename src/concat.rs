//! # Concat Executor
//!
//! Joins an ordered set of files into one output through ffmpeg's concat
//! demuxer. It is the inverse of [`crate::segment`]: stream order is the input
//! order, exactly.
//!
//! ## Sources:
//! - Explicit list: argument order is kept as given
//! - Directory: regular files (symlinks followed) in lexicographic order,
//!   filtered by extension
//!
//! The list file handed to ffmpeg lives in a uniquely named temp file that is
//! removed when the run ends, whether ffmpeg succeeded or not.
//!
//! Copy mode requires every input to share codec parameters; that is not checked.

use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::args;
use crate::error::{Result, VideoToolsError};
use crate::profile::{EncodeProfile, StreamMode};
use crate::toolkit::{ensure_success, MediaToolkit};
use crate::utils::{normalize_extension, path_arg};

/// Where the concat inputs come from
#[derive(Debug, Clone, PartialEq)]
pub enum ConcatSource {
    Explicit(Vec<PathBuf>),
    Directory { dir: PathBuf, ext: Option<String> },
}

impl ConcatSource {
    /// Exactly one of `dir` and `inputs` must be supplied.
    pub fn from_args(dir: Option<PathBuf>, ext: Option<String>, inputs: Vec<PathBuf>) -> Result<Self> {
        match (dir, inputs.is_empty()) {
            (Some(_), false) => Err(VideoToolsError::InvalidArguments(
                "provide either --dir or input files, not both".to_string(),
            )),
            (None, true) => Err(VideoToolsError::InvalidArguments(
                "provide either --dir or one or more input files".to_string(),
            )),
            (Some(dir), true) => Ok(Self::Directory { dir, ext }),
            (None, false) => Ok(Self::Explicit(inputs)),
        }
    }

    /// Resolves the ordered input list and checks every file exists.
    pub fn resolve(&self) -> Result<Vec<PathBuf>> {
        let inputs = match self {
            Self::Explicit(paths) => paths.clone(),
            Self::Directory { dir, ext } => scan_directory(dir, ext.as_deref())?,
        };

        if inputs.is_empty() {
            return Err(VideoToolsError::InvalidArguments("no input files found".to_string()));
        }

        // fail fast on the first missing path
        if let Some(missing) = inputs.iter().find(|p| !p.is_file()) {
            return Err(VideoToolsError::MissingInput(missing.clone()));
        }

        Ok(inputs)
    }
}

/// Regular files directly under `dir`, by file name, optionally one extension only.
fn scan_directory(dir: &Path, ext: Option<&str>) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(VideoToolsError::NotFound(dir.to_path_buf()));
    }

    let wanted = ext.map(|e| normalize_extension(e).to_lowercase());
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| VideoToolsError::Io(e.into()))?;
        // follows symlinks; dangling ones are skipped
        if !entry.path().is_file() {
            continue;
        }

        let path = entry.into_path();
        if let Some(ref wanted) = wanted {
            let actual = path
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()).to_lowercase());
            if actual.as_deref() != Some(wanted.as_str()) {
                continue;
            }
        }
        files.push(path);
    }

    debug!("Found {} concat inputs in {}", files.len(), dir.display());
    Ok(files)
}

/// One line of the concat demuxer list: `file '<path>'`, quotes escaped.
pub fn list_entry(path: &Path) -> String {
    format!("file '{}'", path_arg(path).replace('\'', "'\\''"))
}

/// One concatenation run
#[derive(Debug, Clone)]
pub struct ConcatRequest {
    pub source: ConcatSource,
    pub output: PathBuf,
    pub mode: StreamMode,
}

impl ConcatRequest {
    pub fn to_args(&self, list_file: &Path, profile: &EncodeProfile) -> Vec<String> {
        let mut cmd = args![
            "-hide_banner",
            "-y",
            "-f",
            "concat",
            "-safe",
            "0",
            "-i",
            path_arg(list_file),
        ];
        cmd.extend(self.mode.args(profile));
        cmd.push(path_arg(&self.output));
        cmd
    }
}

/// Result of a concatenation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcatReport {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
}

/// Writes the ordered list file; dropping the handle deletes it.
fn write_list_file(inputs: &[PathBuf]) -> Result<NamedTempFile> {
    let mut list = tempfile::Builder::new()
        .prefix("video-tools-concat-")
        .suffix(".txt")
        .tempfile()?;
    for input in inputs {
        writeln!(list, "{}", list_entry(input))?;
    }
    list.flush()?;
    Ok(list)
}

pub async fn run<T: MediaToolkit>(
    toolkit: &T,
    request: &ConcatRequest,
    profile: &EncodeProfile,
) -> Result<ConcatReport> {
    let mut inputs = Vec::new();
    for input in request.source.resolve()? {
        // the list file lives in the temp dir, so relative paths would break
        inputs.push(tokio::fs::canonicalize(&input).await?);
    }

    if let Some(parent) = request.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let list_file = write_list_file(&inputs)?;
    debug!("Concat list written to {}", list_file.path().display());

    let status = toolkit
        .execute(&request.to_args(list_file.path(), profile))
        .await;
    drop(list_file);
    ensure_success(toolkit.tool_name(), status?)?;

    info!("✅ Joined {} files into {}", inputs.len(), request.output.display());
    Ok(ConcatReport {
        inputs,
        output: request.output.clone(),
    })
}
