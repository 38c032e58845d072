use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use tempfile::TempDir;
use tubescribe_core::{
    CaptionLookup, CaptionProvider, Extractor, ExtractorConfig, Playlist, PlaylistEntry, Result,
    ScribeError, TranscriptType, UnavailableReason, VideoMetadata, VideoSource, parse_vtt_cues,
    write_all,
};

const LESSON_VTT: &str = "WEBVTT\nKind: captions\nLanguage: en\n\n1\n00:00:00.000 --> 00:00:02.000\nWelcome to the bootcamp\n\n2\n00:01:05.500 --> 00:01:08.000\nLet's build something\n";

struct PlaylistFixture {
    entries: Vec<PlaylistEntry>,
    videos: HashMap<String, VideoMetadata>,
}

#[async_trait]
impl VideoSource for PlaylistFixture {
    async fn playlist(&self, url: &str) -> Result<Playlist> {
        Ok(Playlist {
            title: "VibeCoders Bootcamp".to_string(),
            uploader: Some("VibeCoders".to_string()),
            url: url.to_string(),
            entries: self.entries.clone(),
        })
    }

    async fn video(&self, url: &str) -> Result<VideoMetadata> {
        self.videos
            .get(url)
            .cloned()
            .ok_or_else(|| ScribeError::ExtractionFailed {
                url: url.to_string(),
                reason: "private video".to_string(),
            })
    }
}

/// Serves captions from memory for the ids it knows.
struct FixtureCaptions {
    kind: TranscriptType,
    tracks: HashMap<&'static str, &'static str>,
}

#[async_trait]
impl CaptionProvider for FixtureCaptions {
    fn transcript_type(&self) -> TranscriptType {
        self.kind
    }

    async fn lookup(&self, video: &VideoMetadata, _lang: &str) -> Result<CaptionLookup> {
        Ok(match self.tracks.get(video.id.as_str()) {
            Some(vtt) => CaptionLookup::Found(parse_vtt_cues(vtt)),
            None => CaptionLookup::Unavailable(UnavailableReason::NotFound),
        })
    }
}

fn entry(index: u32, id: &str, title: &str) -> PlaylistEntry {
    PlaylistEntry {
        index,
        video_id: id.to_string(),
        title: title.to_string(),
    }
}

fn metadata(id: &str, title: &str, duration: f64) -> VideoMetadata {
    VideoMetadata {
        id: id.to_string(),
        title: Some(title.to_string()),
        duration: Some(duration),
        uploader: Some("VibeCoders".to_string()),
        upload_date: Some("20240301".to_string()),
        ..Default::default()
    }
}

fn fixture() -> PlaylistFixture {
    let entries = vec![
        entry(1, "aaaaaaaaaaa", "Welcome"),
        entry(2, "bbbbbbbbbbb", "Tools: Cursor / Claude?"),
        entry(3, "ccccccccccc", "Private"),
        entry(4, "ddddddddddd", "Demo day"),
    ];
    let videos = HashMap::from([
        (entries[0].watch_url(), metadata("aaaaaaaaaaa", "Welcome", 300.0)),
        (
            entries[1].watch_url(),
            metadata("bbbbbbbbbbb", "Tools: Cursor / Claude?", 1200.0),
        ),
        (entries[3].watch_url(), metadata("ddddddddddd", "Demo day", 3600.0)),
    ]);
    PlaylistFixture { entries, videos }
}

fn providers() -> Vec<Box<dyn CaptionProvider>> {
    vec![
        Box::new(FixtureCaptions {
            kind: TranscriptType::Manual,
            tracks: HashMap::from([("aaaaaaaaaaa", LESSON_VTT)]),
        }),
        Box::new(FixtureCaptions {
            kind: TranscriptType::AutoGenerated,
            tracks: HashMap::from([("aaaaaaaaaaa", LESSON_VTT), ("bbbbbbbbbbb", LESSON_VTT)]),
        }),
    ]
}

#[tokio::test]
async fn extraction_writes_consistent_artifacts() {
    let tmp = TempDir::new().unwrap();
    let source = fixture();
    let providers = providers();
    let config = ExtractorConfig {
        output_dir: tmp.path().to_path_buf(),
        delay: Duration::ZERO,
        ..Default::default()
    };

    let ctx = Extractor::new(&source, &providers, &config)
        .run(|_| {})
        .await
        .unwrap();

    assert_eq!(ctx.summary.video_count, 4);
    assert_eq!(ctx.summary.videos.len(), 3);
    assert_eq!(ctx.failed, vec!["Video 3", "Demo day"]);

    let types: Vec<Option<TranscriptType>> = ctx
        .summary
        .videos
        .iter()
        .map(|v| v.transcript.as_ref().map(|t| t.transcript_type))
        .collect();
    assert_eq!(
        types,
        vec![
            Some(TranscriptType::Manual),
            Some(TranscriptType::AutoGenerated),
            None
        ]
    );

    let files = write_all(&ctx.summary, &ctx.failed, &config.output_dir)
        .await
        .unwrap();

    let names: Vec<String> = files
        .lessons
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "lesson_01_Welcome.md",
            "lesson_02_Tools_Cursor__Claude.md",
            "lesson_04_Demo_day.md"
        ]
    );

    let lesson = std::fs::read_to_string(&files.lessons[0]).unwrap();
    assert!(lesson.contains("[00:00] Welcome to the bootcamp\n[01:05] Let's build something"));
    assert!(lesson.contains("**Published**: 2024-03-01"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&files.json).unwrap()).unwrap();
    let csv = std::fs::read_to_string(&files.csv).unwrap();
    let report = std::fs::read_to_string(&files.report).unwrap();

    let json_videos = json["videos"].as_array().unwrap();
    let json_with = json_videos
        .iter()
        .filter(|v| v["has_transcript"] == true)
        .count();
    let csv_rows: Vec<&str> = csv.lines().skip(1).collect();
    let csv_with = csv_rows.iter().filter(|r| r.contains("✅")).count();

    assert_eq!(json_videos.len(), 3);
    assert_eq!(json["summary"]["total_videos"], 3);
    assert_eq!(json["playlist_info"]["playlist_video_count"], 4);
    assert_eq!(csv_rows.len(), 3);
    assert!(report.contains("Playlist Videos: 4\n"));
    assert!(report.contains("Total Videos: 3\n"));
    assert_eq!(json_with, 2);
    assert_eq!(csv_with, 2);
    assert!(report.contains("Videos with Transcripts: 2\n"));
    assert!(report.contains("Total Duration: 01:25:00\n"));
    assert!(report.contains("- Video 3\n- Demo day\n"));

    let master = std::fs::read_to_string(&files.master).unwrap();
    assert!(master.contains("- [Lesson 2: Tools: Cursor / Claude?](#tools--cursor---claude-)"));
}

#[tokio::test]
async fn rewriting_reports_is_byte_identical() {
    let tmp = TempDir::new().unwrap();
    let source = fixture();
    let providers = providers();
    let config = ExtractorConfig {
        output_dir: tmp.path().to_path_buf(),
        delay: Duration::ZERO,
        ..Default::default()
    };
    let ctx = Extractor::new(&source, &providers, &config)
        .run(|_| {})
        .await
        .unwrap();

    let first = write_all(&ctx.summary, &ctx.failed, tmp.path()).await.unwrap();
    let json_before = std::fs::read(&first.json).unwrap();
    let csv_before = std::fs::read(&first.csv).unwrap();

    let second = write_all(&ctx.summary, &ctx.failed, tmp.path()).await.unwrap();
    assert_eq!(std::fs::read(&second.json).unwrap(), json_before);
    assert_eq!(std::fs::read(&second.csv).unwrap(), csv_before);
}
