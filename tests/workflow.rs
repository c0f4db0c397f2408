//! End-to-end chunk -> concat workflows.
//!
//! The fake toolkit covers planning and ordering without ffmpeg installed;
//! the real round trip is `#[ignore]`d and needs ffmpeg/ffprobe on PATH.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use video_tools::chunk::{self, SegmentBounds};
use video_tools::concat::{self, ConcatRequest, ConcatSource};
use video_tools::segment::{self, SegmentRequest};
use video_tools::{EncodeProfile, FfmpegToolkit, MediaMetadata, MediaToolkit, Result, StreamMode, ToolPathResolver};

/// Pretends to be ffmpeg: segment runs write `count` numbered files,
/// concat runs record the list file contents.
struct ScriptedToolkit {
    metadata: MediaMetadata,
    calls: RefCell<Vec<Vec<String>>>,
    lists: RefCell<Vec<String>>,
}

impl MediaToolkit for ScriptedToolkit {
    async fn probe(&self, _path: &Path) -> Result<MediaMetadata> {
        Ok(self.metadata)
    }

    async fn execute(&self, args: &[String]) -> Result<i32> {
        self.calls.borrow_mut().push(args.to_vec());

        if let Some(pos) = args.iter().position(|a| a == "-segment_time") {
            let seconds: f64 = args[pos + 1].parse().unwrap();
            let count = (self.metadata.duration_seconds / seconds).ceil() as usize;
            let template = args.last().unwrap();
            let mut listing = String::new();
            for index in 0..count {
                let path = template.replace("%03d", &format!("{:03}", index));
                std::fs::write(&path, b"seg")?;
                listing.push_str(&format!("{}\n", Path::new(&path).file_name().unwrap().to_string_lossy()));
            }
            let list = args.iter().position(|a| a == "-segment_list").unwrap();
            std::fs::write(&args[list + 1], listing)?;
        }

        if args.iter().any(|a| a == "concat") {
            let pos = args.iter().position(|a| a == "-i").unwrap();
            self.lists.borrow_mut().push(std::fs::read_to_string(&args[pos + 1])?);
        }

        Ok(0)
    }
}

#[tokio::test]
async fn chunk_by_size_then_join_directory() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("lecture.mkv");
    std::fs::write(&source, b"source").unwrap();

    // 100 MB over 100 s, 25 MB chunks -> 25 s segments -> 4 files
    let toolkit = ScriptedToolkit {
        metadata: MediaMetadata::new(&source, 100.0, 100 * 1024 * 1024, None).unwrap(),
        calls: RefCell::new(Vec::new()),
        lists: RefCell::new(Vec::new()),
    };

    let metadata = toolkit.probe(&source).await.unwrap();
    let plan = chunk::plan(&metadata, 25.0, SegmentBounds::default()).unwrap();
    assert!((plan.segment_seconds - 25.0).abs() < 1e-9);

    let request = SegmentRequest {
        source: source.clone(),
        segment_seconds: plan.segment_seconds,
        out_dir: dir.path().join("parts"),
        prefix: "part".to_string(),
        ext: None,
        mode: StreamMode::Copy,
    };
    let set = segment::run(&toolkit, &request, &EncodeProfile::segment_default()).await.unwrap();
    assert_eq!(set.len(), 4);
    assert!(set.files.iter().all(|f| f.extension().unwrap() == "mkv"));

    // a stray file that must not be picked up
    std::fs::write(dir.path().join("parts/notes.txt"), b"x").unwrap();

    let join = ConcatRequest {
        source: ConcatSource::from_args(Some(dir.path().join("parts")), Some("mkv".to_string()), vec![]).unwrap(),
        output: dir.path().join("joined.mkv"),
        mode: StreamMode::Copy,
    };
    let report = concat::run(&toolkit, &join, &EncodeProfile::concat_default()).await.unwrap();

    let names: Vec<String> = report
        .inputs
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["part_000.mkv", "part_001.mkv", "part_002.mkv", "part_003.mkv"]);

    let list = &toolkit.lists.borrow()[0];
    assert_eq!(list.lines().count(), 4);
    assert!(list.lines().next().unwrap().ends_with("part_000.mkv'"));
    assert_eq!(toolkit.calls.borrow().len(), 2);
}

fn have_ffmpeg() -> bool {
    let resolver = ToolPathResolver::new();
    resolver.resolve_tool("ffmpeg").is_some() && resolver.resolve_tool("ffprobe").is_some()
}

#[tokio::test]
#[ignore = "needs ffmpeg and ffprobe on PATH"]
async fn copy_round_trip_preserves_duration() {
    if !have_ffmpeg() {
        return;
    }

    let dir = TempDir::new().unwrap();
    let source: PathBuf = dir.path().join("source.mp4");
    let status = std::process::Command::new("ffmpeg")
        .args([
            "-hide_banner", "-loglevel", "error", "-y",
            "-f", "lavfi", "-i", "testsrc=duration=12:size=320x240:rate=25",
            "-f", "lavfi", "-i", "sine=frequency=440:duration=12",
            "-c:v", "libx264", "-g", "25", "-c:a", "aac", "-shortest",
        ])
        .arg(&source)
        .status()
        .unwrap();
    assert!(status.success());

    let toolkit = FfmpegToolkit::new(&ToolPathResolver::new());
    let original = toolkit.probe(&source).await.unwrap();

    let request = SegmentRequest {
        source: source.clone(),
        segment_seconds: 4.0,
        out_dir: dir.path().join("chunks"),
        prefix: "chunk".to_string(),
        ext: None,
        mode: StreamMode::Copy,
    };
    let set = segment::run(&toolkit, &request, &EncodeProfile::segment_default()).await.unwrap();
    assert!(set.len() >= 3);

    let join = ConcatRequest {
        source: ConcatSource::Explicit(set.files.clone()),
        output: dir.path().join("joined.mp4"),
        mode: StreamMode::Copy,
    };
    concat::run(&toolkit, &join, &EncodeProfile::concat_default()).await.unwrap();

    let joined = toolkit.probe(&dir.path().join("joined.mp4")).await.unwrap();
    // keyframe snapping allows a little drift
    assert!((joined.duration_seconds - original.duration_seconds).abs() < 1.0);
}
