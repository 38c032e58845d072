//! The five artifacts of an extraction run.
//!
//! Every renderer is a pure function of the [`PlaylistSummary`]; dates come
//! from `extraction_date`, so rendering the same summary twice is byte-identical.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs;

use crate::{
    error::{Result, ScribeError},
    format::{format_hms, sanitize_anchor},
    output::{
        get_csv_path, get_json_path, get_lesson_path, get_lessons_dir, get_master_path,
        get_report_path,
    },
    types::{PlaylistSummary, VideoRecord},
};

pub const TRANSCRIPT_MARK: &str = "✅";
pub const NO_TRANSCRIPT_MARK: &str = "❌";

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Serialize)]
struct PlaylistInfo<'a> {
    title: &'a str,
    url: &'a str,
    /// Entries listed by the playlist, including videos that could not be fetched.
    playlist_video_count: usize,
    extraction_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub total_videos: usize,
    pub with_transcript: usize,
    pub without_transcript: usize,
}

impl Totals {
    pub fn of(summary: &PlaylistSummary) -> Self {
        Self {
            total_videos: summary.videos.len(),
            with_transcript: summary.with_transcript_count(),
            without_transcript: summary.without_transcript_count(),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonDocument<'a> {
    playlist_info: PlaylistInfo<'a>,
    summary: Totals,
    videos: &'a [VideoRecord],
}

#[derive(Debug, Clone)]
pub struct ReportFiles {
    pub lessons: Vec<PathBuf>,
    pub master: PathBuf,
    pub json: PathBuf,
    pub csv: PathBuf,
    pub report: PathBuf,
}

pub fn render_lesson(video: &VideoRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "# Lesson {}: {}\n\n",
        video.lesson_number, video.title
    ));
    output.push_str(&format!("**Video URL**: {}\n", video.url));
    output.push_str(&format!("**Duration**: {}\n", video.duration_formatted));
    output.push_str(&format!("**Author**: {}\n", video.author));
    if let Some(date) = video.publish_date {
        output.push_str(&format!("**Published**: {}\n", date));
    }
    output.push_str("\n---\n\n");

    match &video.transcript {
        Some(transcript) => {
            output.push_str("## Transcript\n\n");
            output.push_str(&format!("*Type: {}*\n\n", transcript.transcript_type));
            output.push_str("### With Timestamps\n\n");
            output.push_str(&transcript.with_timestamps);
            output.push_str("\n\n### Text Only\n\n");
            output.push_str(&transcript.text_only);
            output.push('\n');
        }
        None => {
            output.push_str("## ⚠️ No Transcript Available\n\n");
            output.push_str("This video does not have a transcript available. ");
            output.push_str(
                "You may need to transcribe it manually or use a third-party service.\n",
            );
        }
    }

    output
}

pub fn render_master(summary: &PlaylistSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "# {} - Complete Curriculum Content\n\n",
        summary.title
    ));
    output.push_str(&format!(
        "Generated: {}\n\n",
        summary.extraction_date.format(DATE_FORMAT)
    ));

    output.push_str("## Table of Contents\n\n");
    for video in &summary.videos {
        output.push_str(&format!(
            "- [Lesson {}: {}](#{})\n",
            video.lesson_number,
            video.title,
            sanitize_anchor(&video.title)
        ));
    }
    output.push_str("\n---\n\n");

    for video in &summary.videos {
        output.push_str(&format!(
            "## Lesson {}: {}\n\n",
            video.lesson_number, video.title
        ));
        output.push_str(&format!(
            "**Duration**: {} | **[Watch on YouTube]({})**\n\n",
            video.duration_formatted, video.url
        ));

        match &video.transcript {
            Some(transcript) => {
                output.push_str("### Content\n\n");
                output.push_str(&transcript.text_only);
                output.push_str("\n\n");
            }
            None => output.push_str("### ⚠️ No Transcript Available\n\n"),
        }
        output.push_str("---\n\n");
    }

    output
}

/// The video sequence as JSON, raw caption entries left out.
pub fn render_json(summary: &PlaylistSummary) -> Result<String> {
    let document = JsonDocument {
        playlist_info: PlaylistInfo {
            title: &summary.title,
            url: &summary.url,
            playlist_video_count: summary.video_count,
            extraction_date: summary.extraction_date.to_rfc3339(),
        },
        summary: Totals::of(summary),
        videos: &summary.videos,
    };
    let mut json = serde_json::to_string_pretty(&document)?;
    json.push('\n');
    Ok(json)
}

pub fn render_csv(summary: &PlaylistSummary) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Lesson", "Title", "Duration", "Has Transcript", "URL"])?;
    for video in &summary.videos {
        let mark = if video.has_transcript {
            TRANSCRIPT_MARK
        } else {
            NO_TRANSCRIPT_MARK
        };
        writer.write_record([
            video.lesson_number.to_string().as_str(),
            video.title.as_str(),
            video.duration_formatted.as_str(),
            mark,
            video.url.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ScribeError::IoError(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn render_report(summary: &PlaylistSummary, failed: &[String]) -> String {
    let totals = Totals::of(summary);
    let mut output = String::new();

    output.push_str("YOUTUBE PLAYLIST EXTRACTION REPORT\n");
    output.push_str(&format!("{}\n\n", "=".repeat(50)));
    output.push_str(&format!(
        "Extraction Date: {}\n",
        summary.extraction_date.format(DATE_FORMAT)
    ));
    output.push_str(&format!("Playlist: {}\n", summary.title));
    output.push_str(&format!("Playlist URL: {}\n", summary.url));
    output.push_str(&format!("Playlist Videos: {}\n\n", summary.video_count));

    output.push_str("SUMMARY\n");
    output.push_str(&format!("{}\n", "-".repeat(30)));
    output.push_str(&format!("Total Videos: {}\n", totals.total_videos));
    output.push_str(&format!(
        "Videos with Transcripts: {}\n",
        totals.with_transcript
    ));
    output.push_str(&format!(
        "Videos without Transcripts: {}\n",
        totals.without_transcript
    ));
    output.push_str(&format!("Failed Videos: {}\n\n", failed.len()));

    if !failed.is_empty() {
        output.push_str("FAILED VIDEOS\n");
        output.push_str(&format!("{}\n", "-".repeat(30)));
        for title in failed {
            output.push_str(&format!("- {}\n", title));
        }
        output.push('\n');
    }

    let total = summary.total_duration_seconds();
    let average = total
        .checked_div(summary.videos.len() as u64)
        .unwrap_or(0);
    output.push_str("VIDEO DETAILS\n");
    output.push_str(&format!("{}\n", "-".repeat(30)));
    output.push_str(&format!("Total Duration: {}\n", format_hms(total)));
    output.push_str(&format!("Average Duration: {}\n", format_hms(average)));

    output
}

/// Write one markdown file per lesson into `<output_dir>/lessons`.
pub async fn write_lessons(summary: &PlaylistSummary, output_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(get_lessons_dir(output_dir)).await?;

    let mut paths = Vec::with_capacity(summary.videos.len());
    for video in &summary.videos {
        let path = get_lesson_path(output_dir, video);
        fs::write(&path, render_lesson(video)).await?;
        paths.push(path);
    }
    Ok(paths)
}

/// Write all five artifacts. The first write failure aborts.
pub async fn write_all(
    summary: &PlaylistSummary,
    failed: &[String],
    output_dir: &Path,
) -> Result<ReportFiles> {
    fs::create_dir_all(output_dir).await?;

    let lessons = write_lessons(summary, output_dir).await?;

    let master = get_master_path(output_dir);
    fs::write(&master, render_master(summary)).await?;

    let json = get_json_path(output_dir);
    fs::write(&json, render_json(summary)?).await?;

    let csv = get_csv_path(output_dir);
    fs::write(&csv, render_csv(summary)?).await?;

    let report = get_report_path(output_dir);
    fs::write(&report, render_report(summary, failed)).await?;

    Ok(ReportFiles {
        lessons,
        master,
        json,
        csv,
        report,
    })
}
