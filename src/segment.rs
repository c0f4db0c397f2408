//! # Segment Executor
//!
//! Splits one source into `{prefix}_000{ext}`, `{prefix}_001{ext}`, … of a fixed
//! duration using ffmpeg's segment muxer. All input streams are mapped and
//! timestamps restart in every segment.
//!
//! ## Modes:
//! - `Copy`: no re-encode, cuts land on the nearest keyframe
//! - `Reencode`: exact cuts, using the fallback profile (libx264 veryfast)
//!
//! ffmpeg reports the files it wrote through a flat segment list, so leftovers
//! of an earlier run in the same directory are never counted. Files with
//! colliding names are overwritten. After a failure the output directory is
//! left as ffmpeg left it.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::args;
use crate::error::{Result, VideoToolsError};
use crate::profile::{EncodeProfile, StreamMode};
use crate::toolkit::{ensure_success, MediaToolkit};
use crate::utils::{normalize_extension, path_arg};

/// Parses plain seconds (`"90"`, `"12.5"`) or `HH:MM:SS[.fraction]`.
pub fn parse_segment_time(value: &str) -> Result<f64> {
    let value = value.trim();
    let format_error = || VideoToolsError::FormatError(value.to_string());
    let number = |part: &str| -> Result<f64> {
        part.trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(format_error)
    };

    if !value.contains(':') {
        return number(value);
    }

    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() != 3 {
        return Err(format_error());
    }

    let hours = number(parts[0])?;
    let minutes = number(parts[1])?;
    let seconds = number(parts[2])?;
    Ok(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Output extension: explicit choice, else the source's, else `.mp4`.
pub fn output_extension(source: &Path, ext: Option<&str>) -> String {
    match ext {
        Some(ext) if !ext.is_empty() => normalize_extension(ext),
        _ => source
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_else(|| ".mp4".to_string()),
    }
}

/// One segmentation run
#[derive(Debug, Clone)]
pub struct SegmentRequest {
    pub source: PathBuf,
    pub segment_seconds: f64,
    pub out_dir: PathBuf,
    pub prefix: String,
    pub ext: Option<String>,
    pub mode: StreamMode,
}

impl SegmentRequest {
    /// `{out_dir}/{prefix}_%03d{ext}`
    pub fn output_template(&self) -> PathBuf {
        let ext = output_extension(&self.source, self.ext.as_deref());
        self.out_dir.join(format!("{}_%03d{}", self.prefix, ext))
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.segment_seconds.is_finite() && self.segment_seconds > 0.0) {
            return Err(VideoToolsError::InvalidTarget(format!(
                "--segment-time must be > 0 (got {})",
                self.segment_seconds
            )));
        }
        if self.prefix.is_empty() {
            return Err(VideoToolsError::InvalidArguments("--prefix must not be empty".to_string()));
        }
        Ok(())
    }

    /// ffmpeg arguments for this run; written file names go to `segment_list`
    pub fn to_args(&self, segment_list: &Path, profile: &EncodeProfile) -> Vec<String> {
        let mut cmd = args!["-hide_banner", "-y", "-i", path_arg(&self.source), "-map", "0"];
        cmd.extend(self.mode.args(profile));
        cmd.extend(args![
            "-f",
            "segment",
            // full precision, so what is validated is what ffmpeg sees
            "-segment_time",
            self.segment_seconds,
            "-segment_list",
            path_arg(segment_list),
            "-segment_list_type",
            "flat",
            "-reset_timestamps",
            "1",
            path_arg(&self.output_template()),
        ]);
        cmd
    }
}

/// Ordered outputs of one segmentation run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SegmentSet {
    pub files: Vec<PathBuf>,
}

impl SegmentSet {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Flat segment list: one file name per line, relative to the output directory.
fn read_segment_list(listing: &str, out_dir: &Path) -> Vec<PathBuf> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|name| out_dir.join(name))
        .collect()
}

/// Runs the segmentation and collects the files ffmpeg reports writing.
pub async fn run<T: MediaToolkit>(
    toolkit: &T,
    request: &SegmentRequest,
    profile: &EncodeProfile,
) -> Result<SegmentSet> {
    request.validate()?;
    if !request.source.exists() {
        return Err(VideoToolsError::NotFound(request.source.clone()));
    }

    tokio::fs::create_dir_all(&request.out_dir).await?;
    debug!("Segmenting into {}", request.out_dir.display());

    let segment_list: NamedTempFile = tempfile::Builder::new()
        .prefix("video-tools-segments-")
        .suffix(".txt")
        .tempfile()?;

    let status = toolkit
        .execute(&request.to_args(segment_list.path(), profile))
        .await?;
    ensure_success(toolkit.tool_name(), status)?;

    let listing = tokio::fs::read_to_string(segment_list.path()).await?;
    let files = read_segment_list(&listing, &request.out_dir);

    info!(
        "✅ {} segments of {:.3}s written to {}",
        files.len(),
        request.segment_seconds,
        request.out_dir.display()
    );
    Ok(SegmentSet { files })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::fake::FakeToolkit;
    use tempfile::TempDir;

    fn request(dir: &Path, source: PathBuf, mode: StreamMode) -> SegmentRequest {
        SegmentRequest {
            source,
            segment_seconds: 30.0,
            out_dir: dir.join("chunks"),
            prefix: "chunk".to_string(),
            ext: None,
            mode,
        }
    }

    #[test]
    fn test_parse_segment_time() {
        assert_eq!(parse_segment_time("01:02:03").unwrap(), 3723.0);
        assert_eq!(parse_segment_time("90").unwrap(), 90.0);
        assert_eq!(parse_segment_time(" 12.5 ").unwrap(), 12.5);
        assert_eq!(parse_segment_time("00:00:01.5").unwrap(), 1.5);
    }

    #[test]
    fn test_parse_segment_time_rejects_bad_shapes() {
        assert!(matches!(parse_segment_time("1:2"), Err(VideoToolsError::FormatError(_))));
        assert!(matches!(parse_segment_time("1:2:3:4"), Err(VideoToolsError::FormatError(_))));
        assert!(matches!(parse_segment_time("ten"), Err(VideoToolsError::FormatError(_))));
        assert!(matches!(parse_segment_time("00:xx:10"), Err(VideoToolsError::FormatError(_))));
    }

    #[test]
    fn test_output_extension() {
        assert_eq!(output_extension(Path::new("a/movie.mkv"), None), ".mkv");
        assert_eq!(output_extension(Path::new("a/movie"), None), ".mp4");
        assert_eq!(output_extension(Path::new("a/movie.mkv"), Some("ts")), ".ts");
        assert_eq!(output_extension(Path::new("a/movie.mkv"), Some(".mp4")), ".mp4");
    }

    #[test]
    fn test_read_segment_list() {
        let files = read_segment_list("chunk_000.mp4\nchunk_001.mp4\n\n", Path::new("/out"));
        assert_eq!(files, vec![PathBuf::from("/out/chunk_000.mp4"), PathBuf::from("/out/chunk_001.mp4")]);
    }

    #[test]
    fn test_copy_args() {
        let req = SegmentRequest {
            source: PathBuf::from("/media/in.mov"),
            segment_seconds: 90.0,
            out_dir: PathBuf::from("/media/out"),
            prefix: "part".to_string(),
            ext: None,
            mode: StreamMode::Copy,
        };

        assert_eq!(
            req.to_args(Path::new("/tmp/list.txt"), &EncodeProfile::segment_default()),
            vec![
                "-hide_banner", "-y", "-i", "/media/in.mov", "-map", "0", "-c", "copy", "-f", "segment",
                "-segment_time", "90", "-segment_list", "/tmp/list.txt", "-segment_list_type", "flat",
                "-reset_timestamps", "1", "/media/out/part_%03d.mov",
            ]
        );
    }

    #[test]
    fn test_segment_time_keeps_full_precision() {
        let mut req = request(Path::new("/tmp"), PathBuf::from("/tmp/in.mp4"), StreamMode::Copy);
        req.segment_seconds = 0.0004;
        assert!(req.validate().is_ok());

        let args = req.to_args(Path::new("/tmp/list.txt"), &EncodeProfile::segment_default());
        assert!(args.windows(2).any(|w| w == ["-segment_time", "0.0004"]));
        assert!(!args.iter().any(|a| a == "0.000"));
    }

    #[test]
    fn test_reencode_args_use_profile() {
        let mut req = request(Path::new("/tmp"), PathBuf::from("/tmp/in.mp4"), StreamMode::Reencode);
        req.ext = Some("mkv".to_string());

        let args = req.to_args(Path::new("/tmp/list.txt"), &EncodeProfile::segment_default());
        assert!(args.windows(2).any(|w| w == ["-preset", "veryfast"]));
        assert!(!args.iter().any(|a| a == "copy"));
        assert_eq!(args.last().unwrap(), "/tmp/chunks/chunk_%03d.mkv");
    }

    #[tokio::test]
    async fn test_run_collects_contiguous_segments() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("in.mp4");
        std::fs::write(&source, b"video").unwrap();

        let toolkit = FakeToolkit::new().with_segment_outputs(3);
        let req = request(dir.path(), source, StreamMode::Copy);
        let set = run(&toolkit, &req, &EncodeProfile::segment_default()).await.unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(set.files[0], dir.path().join("chunks/chunk_000.mp4"));
        assert_eq!(set.files[2], dir.path().join("chunks/chunk_002.mp4"));
        assert_eq!(toolkit.calls.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_run_ignores_stale_segments() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("in.mp4");
        std::fs::write(&source, b"video").unwrap();

        // leftovers of an earlier, longer run
        let chunks = dir.path().join("chunks");
        std::fs::create_dir_all(&chunks).unwrap();
        for index in 0..6 {
            std::fs::write(chunks.join(format!("chunk_{:03}.mp4", index)), b"old").unwrap();
        }

        let toolkit = FakeToolkit::new().with_segment_outputs(2);
        let req = request(dir.path(), source, StreamMode::Copy);
        let set = run(&toolkit, &req, &EncodeProfile::segment_default()).await.unwrap();

        assert_eq!(set.files, vec![chunks.join("chunk_000.mp4"), chunks.join("chunk_001.mp4")]);

        // the segment list is a temp file removed after the run
        let args = toolkit.last_call();
        let pos = args.iter().position(|a| a == "-segment_list").unwrap();
        assert!(!Path::new(&args[pos + 1]).exists());
    }

    #[tokio::test]
    async fn test_run_surfaces_tool_status() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("in.mp4");
        std::fs::write(&source, b"video").unwrap();

        let toolkit = FakeToolkit::new().with_status(1);
        let req = request(dir.path(), source, StreamMode::Copy);
        let result = run(&toolkit, &req, &EncodeProfile::segment_default()).await;

        assert!(matches!(result, Err(VideoToolsError::ExternalToolError { status: 1, .. })));
        // out dir is created before ffmpeg runs
        assert!(dir.path().join("chunks").is_dir());
    }

    #[tokio::test]
    async fn test_run_missing_source() {
        let dir = TempDir::new().unwrap();
        let toolkit = FakeToolkit::new();
        let req = request(dir.path(), dir.path().join("missing.mp4"), StreamMode::Copy);

        let result = run(&toolkit, &req, &EncodeProfile::segment_default()).await;
        assert!(matches!(result, Err(VideoToolsError::NotFound(_))));
        assert!(toolkit.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_run_rejects_zero_duration() {
        let dir = TempDir::new().unwrap();
        let toolkit = FakeToolkit::new();
        let mut req = request(dir.path(), dir.path().join("in.mp4"), StreamMode::Copy);
        req.segment_seconds = 0.0;

        let result = run(&toolkit, &req, &EncodeProfile::segment_default()).await;
        assert!(matches!(result, Err(VideoToolsError::InvalidTarget(_))));
    }
}
