//! Caption availability survey and week-by-week curriculum mapping.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::fs;
use tracing::warn;

use crate::{
    error::Result,
    format::{format_minutes_seconds, format_thousands, truncate_chars},
    output::{get_analysis_json_path, get_mapping_path},
    provider::select_track,
    source::VideoSource,
    types::{PlaylistEntry, TranscriptType, VideoMetadata},
};

const LESSONS_PER_WEEK: u32 = 3;
const LAST_WEEK: u32 = 6;
const TITLE_PREVIEW_CHARS: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzedVideo {
    pub lesson_number: u32,
    pub title: String,
    pub url: String,
    pub duration: u64,
    pub uploader: String,
    pub upload_date: String,
    pub description: String,
    pub view_count: u64,
    pub has_transcript: bool,
    pub transcript_type: Option<TranscriptType>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurriculumAnalysis {
    pub playlist_title: String,
    pub playlist_url: String,
    pub playlist_uploader: Option<String>,
    pub total_videos: usize,
    pub extraction_date: DateTime<Local>,
    pub videos: Vec<AnalyzedVideo>,
}

impl CurriculumAnalysis {
    pub fn with_transcript_count(&self) -> usize {
        self.videos.iter().filter(|v| v.has_transcript).count()
    }

    pub fn total_duration_seconds(&self) -> u64 {
        self.videos.iter().map(|v| v.duration).sum()
    }
}

#[derive(Debug)]
pub enum AnalysisEvent<'a> {
    PlaylistLoaded {
        title: &'a str,
        video_count: usize,
    },
    VideoStarted {
        entry: &'a PlaylistEntry,
        total: usize,
    },
    VideoAnalyzed {
        video: &'a AnalyzedVideo,
    },
    VideoFailed {
        entry: &'a PlaylistEntry,
    },
}

/// Which week a lesson lands in: three lessons a week, everything past
/// lesson 15 in week 6.
pub fn suggested_week(lesson_number: u32) -> u32 {
    (lesson_number.saturating_sub(1) / LESSONS_PER_WEEK + 1).min(LAST_WEEK)
}

/// Caption availability without downloading anything. Manual wins.
pub fn caption_availability(video: &VideoMetadata, lang: &str) -> Option<TranscriptType> {
    [TranscriptType::Manual, TranscriptType::AutoGenerated]
        .into_iter()
        .find(|kind| select_track(video, *kind, lang).is_ok())
}

pub fn analyze_video(
    lesson_number: u32,
    url: String,
    video: &VideoMetadata,
    lang: &str,
) -> AnalyzedVideo {
    let transcript_type = caption_availability(video, lang);
    AnalyzedVideo {
        lesson_number,
        title: video.title.clone().unwrap_or_else(|| "Unknown".to_string()),
        url,
        duration: video.duration_seconds(),
        uploader: video.author(),
        upload_date: video.upload_date.clone().unwrap_or_default(),
        description: video.description.clone().unwrap_or_default(),
        view_count: video.view_count.unwrap_or(0),
        has_transcript: transcript_type.is_some(),
        transcript_type,
    }
}

/// Survey every video of a playlist. Videos whose metadata cannot be fetched
/// are left out of the analysis.
pub async fn analyze_playlist(
    source: &dyn VideoSource,
    playlist_url: &str,
    lang: &str,
    delay: Duration,
    mut on_event: impl FnMut(AnalysisEvent<'_>),
) -> Result<CurriculumAnalysis> {
    let playlist = source.playlist(playlist_url).await?;
    on_event(AnalysisEvent::PlaylistLoaded {
        title: &playlist.title,
        video_count: playlist.entries.len(),
    });

    let mut analysis = CurriculumAnalysis {
        playlist_title: playlist.title.clone(),
        playlist_url: playlist_url.to_string(),
        playlist_uploader: playlist.uploader.clone(),
        total_videos: playlist.entries.len(),
        extraction_date: Local::now(),
        videos: Vec::new(),
    };

    let total = playlist.entries.len();
    for (i, entry) in playlist.entries.iter().enumerate() {
        on_event(AnalysisEvent::VideoStarted { entry, total });

        let url = entry.watch_url();
        match source.video(&url).await {
            Ok(meta) => {
                analysis
                    .videos
                    .push(analyze_video(entry.index, url, &meta, lang));
                if let Some(video) = analysis.videos.last() {
                    on_event(AnalysisEvent::VideoAnalyzed { video });
                }
            }
            Err(error) => {
                warn!(lesson = entry.index, video_id = %entry.video_id, %error, "video skipped");
                on_event(AnalysisEvent::VideoFailed { entry });
            }
        }

        if i + 1 < total && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    Ok(analysis)
}

pub fn render_mapping(analysis: &CurriculumAnalysis, lang: &str) -> String {
    let mut output = String::new();

    output.push_str("# YouTube Content Mapping\n\n");
    output.push_str(&format!("**Playlist**: {}\n", analysis.playlist_title));
    output.push_str(&format!("**Total Videos**: {}\n", analysis.total_videos));
    output.push_str(&format!(
        "**Extracted**: {}\n\n",
        analysis.extraction_date.format("%Y-%m-%d %H:%M")
    ));

    output.push_str("## Video List\n\n");
    output.push_str("| # | Title | Duration | Transcript | Views | Suggested Week |\n");
    output.push_str("|---|-------|----------|-----------|-------|----------------|\n");
    for video in &analysis.videos {
        let views = if video.view_count > 0 {
            format_thousands(video.view_count)
        } else {
            "N/A".to_string()
        };
        let mark = if video.has_transcript { "✅" } else { "❌" };
        output.push_str(&format!(
            "| {} | {}... | {} | {} | {} | Week {} |\n",
            video.lesson_number,
            truncate_chars(&video.title, TITLE_PREVIEW_CHARS),
            format_minutes_seconds(video.duration),
            mark,
            views,
            suggested_week(video.lesson_number)
        ));
    }

    let analyzed = analysis.videos.len();
    let with = analysis.with_transcript_count();
    output.push_str("\n## Transcript Availability\n\n");
    output.push_str(&format!(
        "- Videos with transcripts: {}/{}\n",
        with, analyzed
    ));
    output.push_str(&format!(
        "- Videos without transcripts: {}/{}\n",
        analyzed - with,
        analyzed
    ));

    output.push_str("\n## Next Steps\n\n");
    output.push_str("1. Download transcripts using yt-dlp with subtitle options\n");
    output.push_str("2. Map videos to specific curriculum weeks\n");
    output.push_str("3. Create sandbox exercises based on video content\n");
    output.push_str("4. Fill gaps with additional materials\n");

    output.push_str("\n## Download Command\n\n");
    output.push_str("To download transcripts for a specific video:\n");
    output.push_str("```bash\n");
    output.push_str(&format!(
        "yt-dlp --write-sub --write-auto-sub --sub-lang {} --skip-download [VIDEO_URL]\n",
        lang
    ));
    output.push_str("```\n");

    output
}

pub async fn write_analysis(
    analysis: &CurriculumAnalysis,
    lang: &str,
    output_dir: &Path,
) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(output_dir).await?;

    let json_path = get_analysis_json_path(output_dir);
    let mut json = serde_json::to_string_pretty(analysis)?;
    json.push('\n');
    fs::write(&json_path, json).await?;

    let mapping_path = get_mapping_path(output_dir);
    fs::write(&mapping_path, render_mapping(analysis, lang)).await?;

    Ok((json_path, mapping_path))
}
