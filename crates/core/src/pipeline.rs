use std::{path::PathBuf, time::Duration};

use chrono::Local;
use tracing::{info, warn};

use crate::{
    error::{Result, ScribeError},
    provider::{CaptionProvider, TranscriptOutcome, UnavailableReason, fetch_transcript},
    source::{VideoSource, YTDLP},
    types::{PlaylistEntry, PlaylistSummary, TranscriptType, VideoRecord},
};

pub const DEFAULT_PLAYLIST_URL: &str =
    "https://www.youtube.com/playlist?list=PLf2m23nhTg1P5BsOHUOXyQz5RhfUSSVUi";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub playlist_url: String,
    pub output_dir: PathBuf,
    pub language: String,
    /// Pause between two videos.
    pub delay: Duration,
    pub ytdlp_binary: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            playlist_url: DEFAULT_PLAYLIST_URL.to_string(),
            output_dir: PathBuf::from("vibecoder_bootcamp_content"),
            language: DEFAULT_LANGUAGE.to_string(),
            delay: DEFAULT_DELAY,
            ytdlp_binary: YTDLP.to_string(),
        }
    }
}

/// Progress notifications for whoever drives the run.
#[derive(Debug)]
pub enum ExtractionEvent<'a> {
    PlaylistLoaded {
        title: &'a str,
        video_count: usize,
    },
    VideoStarted {
        entry: &'a PlaylistEntry,
        total: usize,
    },
    VideoProcessed {
        record: &'a VideoRecord,
        transcript_type: Option<TranscriptType>,
        unavailable: Option<&'a UnavailableReason>,
    },
    VideoFailed {
        entry: &'a PlaylistEntry,
        error: &'a ScribeError,
    },
}

/// Everything one run accumulates.
#[derive(Debug)]
pub struct ExtractionContext {
    pub summary: PlaylistSummary,
    /// Titles of videos without a transcript, or `Video N` when the video
    /// itself could not be fetched.
    pub failed: Vec<String>,
}

impl ExtractionContext {
    pub fn new(playlist_url: &str) -> Self {
        Self {
            summary: PlaylistSummary {
                title: String::new(),
                url: playlist_url.to_string(),
                video_count: 0,
                extraction_date: Local::now(),
                videos: Vec::new(),
            },
            failed: Vec::new(),
        }
    }
}

pub struct Extractor<'a> {
    source: &'a dyn VideoSource,
    providers: &'a [Box<dyn CaptionProvider>],
    config: &'a ExtractorConfig,
}

impl<'a> Extractor<'a> {
    pub fn new(
        source: &'a dyn VideoSource,
        providers: &'a [Box<dyn CaptionProvider>],
        config: &'a ExtractorConfig,
    ) -> Self {
        Self {
            source,
            providers,
            config,
        }
    }

    /// Fetch one video and its captions.
    pub async fn process_entry(
        &self,
        entry: &PlaylistEntry,
    ) -> Result<(VideoRecord, Option<UnavailableReason>)> {
        let url = entry.watch_url();
        let meta = self.source.video(&url).await?;

        let mut record = VideoRecord::new(
            entry.index,
            meta.title.clone().unwrap_or_else(|| entry.title.clone()),
            url,
            entry.video_id.clone(),
            meta.duration_seconds(),
            meta.author(),
            meta.publish_date(),
        );

        match fetch_transcript(self.providers, &meta, &self.config.language).await {
            TranscriptOutcome::Found(transcript) => {
                record.attach_transcript(transcript);
                Ok((record, None))
            }
            TranscriptOutcome::Unavailable(reason) => Ok((record, Some(reason))),
        }
    }

    /// Run the whole playlist, one video at a time.
    ///
    /// A failing video is recorded in `failed` and never stops the batch; only
    /// a playlist that cannot be read is an error.
    pub async fn run(
        &self,
        mut on_event: impl FnMut(ExtractionEvent<'_>),
    ) -> Result<ExtractionContext> {
        let mut ctx = ExtractionContext::new(&self.config.playlist_url);

        let playlist = self.source.playlist(&self.config.playlist_url).await?;
        ctx.summary.title = playlist.title.clone();
        ctx.summary.video_count = playlist.entries.len();
        info!(title = %playlist.title, videos = playlist.entries.len(), "playlist loaded");
        on_event(ExtractionEvent::PlaylistLoaded {
            title: &playlist.title,
            video_count: playlist.entries.len(),
        });

        let total = playlist.entries.len();
        for (i, entry) in playlist.entries.iter().enumerate() {
            on_event(ExtractionEvent::VideoStarted { entry, total });

            match self.process_entry(entry).await {
                Ok((record, unavailable)) => {
                    if !record.has_transcript {
                        ctx.failed.push(record.title.clone());
                    }
                    let transcript_type = record.transcript.as_ref().map(|t| t.transcript_type);
                    ctx.summary.videos.push(record);
                    if let Some(record) = ctx.summary.videos.last() {
                        on_event(ExtractionEvent::VideoProcessed {
                            record,
                            transcript_type,
                            unavailable: unavailable.as_ref(),
                        });
                    }
                }
                Err(error) => {
                    warn!(lesson = entry.index, video_id = %entry.video_id, %error, "video skipped");
                    ctx.failed.push(format!("Video {}", entry.index));
                    on_event(ExtractionEvent::VideoFailed {
                        entry,
                        error: &error,
                    });
                }
            }

            if i + 1 < total && !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }
        }

        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::{
        provider::default_providers,
        types::{CaptionTrack, Playlist, TrackTable, VideoMetadata},
    };

    struct FakeSource {
        entries: Vec<PlaylistEntry>,
        videos: HashMap<String, VideoMetadata>,
    }

    #[async_trait]
    impl VideoSource for FakeSource {
        async fn playlist(&self, url: &str) -> Result<Playlist> {
            Ok(Playlist {
                title: "Bootcamp".to_string(),
                uploader: None,
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
                    reason: "Video unavailable".to_string(),
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

    fn config() -> ExtractorConfig {
        ExtractorConfig {
            delay: Duration::ZERO,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn video_without_any_captions_is_recorded_as_failed() {
        let e = entry(1, "aaaaaaaaaaa", "Silent lesson");
        let meta = VideoMetadata {
            id: "aaaaaaaaaaa".to_string(),
            title: Some("Silent lesson".to_string()),
            duration: Some(90.0),
            subtitles: Some(TrackTable::new()),
            automatic_captions: Some(TrackTable::new()),
            ..Default::default()
        };
        let source = FakeSource {
            videos: HashMap::from([(e.watch_url(), meta)]),
            entries: vec![e],
        };
        let providers = default_providers(&reqwest::Client::new());
        let cfg = config();

        let ctx = Extractor::new(&source, &providers, &cfg)
            .run(|_| {})
            .await
            .unwrap();

        let video = &ctx.summary.videos[0];
        assert!(!video.has_transcript);
        assert!(video.transcript.is_none());
        assert_eq!(video.duration_formatted, "00:01:30");
        assert_eq!(ctx.failed, vec!["Silent lesson".to_string()]);
    }

    #[tokio::test]
    async fn fetch_failures_are_isolated() {
        let ok = entry(1, "aaaaaaaaaaa", "First");
        let gone = entry(2, "bbbbbbbbbbb", "Removed");
        let last = entry(3, "ccccccccccc", "Third");

        let meta = |id: &str, title: &str| VideoMetadata {
            id: id.to_string(),
            title: Some(title.to_string()),
            subtitles: Some(TrackTable::from([(
                "de".to_string(),
                vec![CaptionTrack {
                    ext: "vtt".to_string(),
                    url: "https://example.invalid/de.vtt".to_string(),
                    name: None,
                }],
            )])),
            ..Default::default()
        };
        let source = FakeSource {
            videos: HashMap::from([
                (ok.watch_url(), meta("aaaaaaaaaaa", "First")),
                (last.watch_url(), meta("ccccccccccc", "Third")),
            ]),
            entries: vec![ok, gone, last],
        };
        let providers = default_providers(&reqwest::Client::new());
        let cfg = config();

        let mut events = Vec::new();
        let ctx = Extractor::new(&source, &providers, &cfg)
            .run(|event| {
                events.push(match event {
                    ExtractionEvent::PlaylistLoaded { .. } => "loaded",
                    ExtractionEvent::VideoStarted { .. } => "started",
                    ExtractionEvent::VideoProcessed { .. } => "processed",
                    ExtractionEvent::VideoFailed { .. } => "failed",
                })
            })
            .await
            .unwrap();

        let lessons: Vec<u32> = ctx.summary.videos.iter().map(|v| v.lesson_number).collect();
        assert_eq!(lessons, vec![1, 3]);
        assert_eq!(ctx.summary.video_count, 3);
        assert_eq!(ctx.failed, vec!["First", "Video 2", "Third"]);
        assert_eq!(
            events,
            vec![
                "loaded",
                "started",
                "processed",
                "started",
                "failed",
                "started",
                "processed"
            ]
        );
    }
}
