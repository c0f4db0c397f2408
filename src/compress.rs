//! # Size-Targeted Compression
//!
//! Probe, judge, encode. Innocent sources get a CRF encode; wicked ones get a
//! capped bitrate (`-b:v`/`-maxrate` at the planned video rate, `-bufsize`
//! twice that). Both are downscaled to at most `max_width` and muxed with
//! `+faststart`.
//!
//! The innocent path does not aim at the target size at all; that is a
//! quality-first choice, not a size guarantee.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::args;
use crate::bitrate::{self, BitratePlan, BitratePolicy};
use crate::error::{Result, VideoToolsError};
use crate::toolkit::{ensure_success, MediaToolkit};
use crate::utils::path_arg;

/// ffmpeg arguments that realize `plan` for `input` -> `output`
pub fn compress_args(input: &Path, output: &Path, plan: &BitratePlan, policy: &BitratePolicy) -> Vec<String> {
    let mut cmd = args!["-hide_banner", "-y", "-i", path_arg(input)];

    match plan.video_kbps {
        None => cmd.extend(args![
            "-c:v",
            "libx264",
            "-preset",
            policy.preset,
            "-crf",
            policy.quality_crf,
        ]),
        Some(video) => cmd.extend(args![
            "-c:v",
            "libx264",
            "-b:v",
            format!("{}k", video),
            "-maxrate",
            format!("{}k", video),
            "-bufsize",
            format!("{}k", video * 2),
            "-preset",
            policy.preset,
        ]),
    }

    cmd.extend(args![
        "-c:a",
        "aac",
        "-b:a",
        format!("{}k", plan.audio_kbps),
        "-vf",
        format!("scale='min({},iw)':-2", policy.max_width),
        "-movflags",
        "+faststart",
        path_arg(output),
    ]);
    cmd
}

/// Compresses `input` into `output` under `policy` and returns the plan used.
pub async fn run<T: MediaToolkit>(
    toolkit: &T,
    input: &Path,
    output: &Path,
    policy: &BitratePolicy,
) -> Result<BitratePlan> {
    if input == output {
        return Err(VideoToolsError::InvalidArguments(
            "output must differ from input".to_string(),
        ));
    }

    let metadata = toolkit.probe(input).await?;
    let plan = bitrate::plan(&metadata, policy)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let status = toolkit
        .execute(&compress_args(input, output, &plan, policy))
        .await?;
    ensure_success(toolkit.tool_name(), status)?;

    info!("🎬 Compressed {} -> {}", input.display(), output.display());
    Ok(plan)
}

/// Default output path: `<stem>_compressed.mp4` next to the input
pub fn default_output(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    input.with_file_name(format!("{}_compressed.mp4", stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitrate::BitrateMode;
    use crate::probe::MediaMetadata;
    use crate::toolkit::fake::FakeToolkit;
    use tempfile::TempDir;

    const MB: u64 = 1024 * 1024;

    fn fixture(duration: f64, size_bytes: u64) -> (TempDir, PathBuf, FakeToolkit) {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("talk.mov");
        std::fs::write(&input, b"video").unwrap();
        let metadata = MediaMetadata::new(&input, duration, size_bytes, None).unwrap();
        (dir, input, FakeToolkit::new().with_metadata(metadata))
    }

    #[tokio::test]
    async fn test_innocent_uses_crf() {
        let (dir, input, toolkit) = fixture(600.0, 100 * MB);
        let output = dir.path().join("out.mp4");

        let plan = run(&toolkit, &input, &output, &BitratePolicy::default()).await.unwrap();
        assert_eq!(plan.mode, BitrateMode::Innocent);

        let args = toolkit.last_call();
        assert!(args.windows(2).any(|w| w == ["-crf", "23"]));
        assert!(args.windows(2).any(|w| w == ["-b:a", "96k"]));
        assert!(!args.iter().any(|a| a == "-b:v"));
    }

    #[tokio::test]
    async fn test_wicked_uses_capped_bitrate() {
        let (dir, input, toolkit) = fixture(600.0, 1000 * MB);
        let output = dir.path().join("nested/out.mp4");

        let plan = run(&toolkit, &input, &output, &BitratePolicy::default()).await.unwrap();
        assert_eq!(plan.video_kbps, Some(3317));

        let args = toolkit.last_call();
        assert!(args.windows(2).any(|w| w == ["-b:v", "3317k"]));
        assert!(args.windows(2).any(|w| w == ["-maxrate", "3317k"]));
        assert!(args.windows(2).any(|w| w == ["-bufsize", "6634k"]));
        assert!(args.windows(2).any(|w| w == ["-vf", "scale='min(1280,iw)':-2"]));
        assert_eq!(args.last().unwrap(), output.to_str().unwrap());
        assert!(dir.path().join("nested").is_dir());
    }

    #[tokio::test]
    async fn test_failure_is_surfaced() {
        let (dir, input, toolkit) = fixture(600.0, 1000 * MB);
        let toolkit = toolkit.with_status(255);

        let result = run(&toolkit, &input, &dir.path().join("o.mp4"), &BitratePolicy::default()).await;
        assert!(matches!(result, Err(VideoToolsError::ExternalToolError { status: 255, .. })));
    }

    #[tokio::test]
    async fn test_missing_input() {
        let dir = TempDir::new().unwrap();
        let toolkit = FakeToolkit::new();
        let result = run(
            &toolkit,
            &dir.path().join("nope.mp4"),
            &dir.path().join("o.mp4"),
            &BitratePolicy::default(),
        )
        .await;
        assert!(matches!(result, Err(VideoToolsError::NotFound(_))));
    }

    #[test]
    fn test_default_output() {
        assert_eq!(default_output(Path::new("/v/talk.mov")), PathBuf::from("/v/talk_compressed.mp4"));
    }
}
