use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::format::format_duration_or_unknown;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranscriptType {
    #[serde(rename = "manual")]
    Manual,
    #[serde(rename = "auto-generated")]
    AutoGenerated,
}

impl TranscriptType {
    pub fn label(&self) -> &'static str {
        match self {
            TranscriptType::Manual => "manual",
            TranscriptType::AutoGenerated => "auto-generated",
        }
    }
}

impl fmt::Display for TranscriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One caption cue: when it starts and what it says.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionEntry {
    pub start_time_seconds: f64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub transcript_type: TranscriptType,
    pub with_timestamps: String,
    pub text_only: String,
    #[serde(skip_serializing, default)]
    pub raw_entries: Vec<CaptionEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    pub lesson_number: u32,
    pub title: String,
    pub url: String,
    pub video_id: String,
    pub duration_seconds: u64,
    pub duration_formatted: String,
    pub author: String,
    pub publish_date: Option<NaiveDate>,
    pub has_transcript: bool,
    pub transcript: Option<TranscriptRecord>,
}

impl VideoRecord {
    pub fn new(
        lesson_number: u32,
        title: String,
        url: String,
        video_id: String,
        duration_seconds: u64,
        author: String,
        publish_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            lesson_number,
            title,
            url,
            video_id,
            duration_seconds,
            duration_formatted: format_duration_or_unknown(duration_seconds),
            author,
            publish_date,
            has_transcript: false,
            transcript: None,
        }
    }

    pub fn attach_transcript(&mut self, transcript: TranscriptRecord) {
        self.has_transcript = true;
        self.transcript = Some(transcript);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub title: String,
    pub url: String,
    pub video_count: usize,
    pub extraction_date: DateTime<Local>,
    pub videos: Vec<VideoRecord>,
}

impl PlaylistSummary {
    pub fn with_transcript_count(&self) -> usize {
        self.videos.iter().filter(|v| v.has_transcript).count()
    }

    pub fn without_transcript_count(&self) -> usize {
        self.videos.len() - self.with_transcript_count()
    }

    pub fn total_duration_seconds(&self) -> u64 {
        self.videos.iter().map(|v| v.duration_seconds).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub index: u32,
    pub video_id: String,
    pub title: String,
}

impl PlaylistEntry {
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}

#[derive(Debug, Clone)]
pub struct Playlist {
    pub title: String,
    pub uploader: Option<String>,
    pub url: String,
    pub entries: Vec<PlaylistEntry>,
}

/// A single rendition of a caption track as listed by yt-dlp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CaptionTrack {
    #[serde(default)]
    pub ext: String,
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
}

pub type TrackTable = BTreeMap<String, Vec<CaptionTrack>>;

/// Per-video fields read from `yt-dlp -J`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoMetadata {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub subtitles: Option<TrackTable>,
    #[serde(default)]
    pub automatic_captions: Option<TrackTable>,
}

impl VideoMetadata {
    pub fn duration_seconds(&self) -> u64 {
        self.duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .map(|d| d as u64)
            .unwrap_or(0)
    }

    pub fn author(&self) -> String {
        self.uploader
            .clone()
            .or_else(|| self.channel.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// `upload_date` arrives as `YYYYMMDD`.
    pub fn publish_date(&self) -> Option<NaiveDate> {
        self.upload_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y%m%d").ok())
    }

    pub fn tracks(&self, kind: TranscriptType) -> Option<&TrackTable> {
        match kind {
            TranscriptType::Manual => self.subtitles.as_ref(),
            TranscriptType::AutoGenerated => self.automatic_captions.as_ref(),
        }
    }

    pub fn has_any_captions(&self) -> bool {
        [TranscriptType::Manual, TranscriptType::AutoGenerated]
            .iter()
            .filter_map(|kind| self.tracks(*kind))
            .any(|table| table.values().any(|renditions| !renditions.is_empty()))
    }
}
