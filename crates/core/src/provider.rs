//! Caption providers and the manual -> auto-generated fallback.

use std::fmt;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{
    error::{Result, ScribeError},
    format::build_transcript,
    types::{CaptionEntry, CaptionTrack, TranscriptRecord, TranscriptType, VideoMetadata},
    vtt::{parse_vtt_cues, parse_vtt_cues_rolling},
};

const VTT_EXT: &str = "vtt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnavailableReason {
    /// The video offers no captions at all.
    Disabled,
    /// Captions exist, but not in the requested language.
    NotFound,
    Other(String),
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailableReason::Disabled => f.write_str("captions are disabled"),
            UnavailableReason::NotFound => f.write_str("no caption track found"),
            UnavailableReason::Other(reason) => f.write_str(reason),
        }
    }
}

#[derive(Debug)]
pub enum CaptionLookup {
    Found(Vec<CaptionEntry>),
    Unavailable(UnavailableReason),
}

#[derive(Debug)]
pub enum TranscriptOutcome {
    Found(TranscriptRecord),
    Unavailable(UnavailableReason),
}

/// A source of one kind of caption track.
///
/// `Ok(CaptionLookup::Unavailable(_))` is an expected outcome and lets the next
/// provider in the chain run. `Err(_)` is unexpected and ends the chain.
#[async_trait]
pub trait CaptionProvider: Send + Sync {
    fn transcript_type(&self) -> TranscriptType;

    async fn lookup(&self, video: &VideoMetadata, lang: &str) -> Result<CaptionLookup>;
}

/// Pick the WebVTT rendition of a `kind` track in `lang`.
///
/// Exact language codes win; otherwise the first regional variant
/// (`en-US`, `en-orig`) in code order is used.
pub fn select_track<'a>(
    video: &'a VideoMetadata,
    kind: TranscriptType,
    lang: &str,
) -> std::result::Result<&'a CaptionTrack, UnavailableReason> {
    if !video.has_any_captions() {
        return Err(UnavailableReason::Disabled);
    }

    let table = video.tracks(kind).ok_or(UnavailableReason::NotFound)?;
    let regional_prefix = format!("{lang}-");
    let renditions = table
        .get(lang)
        .filter(|r| !r.is_empty())
        .or_else(|| {
            table
                .iter()
                .find(|(code, r)| code.starts_with(&regional_prefix) && !r.is_empty())
                .map(|(_, r)| r)
        })
        .ok_or(UnavailableReason::NotFound)?;

    renditions
        .iter()
        .find(|t| t.ext == VTT_EXT)
        .ok_or_else(|| UnavailableReason::Other(format!("no WebVTT rendition of {lang} track")))
}

/// Downloads the track yt-dlp listed for the video over HTTP.
pub struct TrackProvider {
    kind: TranscriptType,
    client: reqwest::Client,
}

impl TrackProvider {
    pub fn manual(client: reqwest::Client) -> Self {
        Self {
            kind: TranscriptType::Manual,
            client,
        }
    }

    pub fn auto_generated(client: reqwest::Client) -> Self {
        Self {
            kind: TranscriptType::AutoGenerated,
            client,
        }
    }

    async fn download(&self, video_id: &str, track: &CaptionTrack) -> Result<String> {
        let response = self.client.get(&track.url).send().await?;
        if !response.status().is_success() {
            return Err(ScribeError::CaptionFetchFailed {
                video_id: video_id.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl CaptionProvider for TrackProvider {
    fn transcript_type(&self) -> TranscriptType {
        self.kind
    }

    async fn lookup(&self, video: &VideoMetadata, lang: &str) -> Result<CaptionLookup> {
        let track = match select_track(video, self.kind, lang) {
            Ok(track) => track,
            Err(reason) => return Ok(CaptionLookup::Unavailable(reason)),
        };

        let body = self.download(&video.id, track).await?;
        let entries = match self.kind {
            TranscriptType::Manual => parse_vtt_cues(&body),
            TranscriptType::AutoGenerated => parse_vtt_cues_rolling(&body),
        };
        if entries.is_empty() {
            return Ok(CaptionLookup::Unavailable(UnavailableReason::Other(
                format!("{} track has no cues", self.kind),
            )));
        }
        Ok(CaptionLookup::Found(entries))
    }
}

/// Manual captions first, auto-generated second.
pub fn default_providers(client: &reqwest::Client) -> Vec<Box<dyn CaptionProvider>> {
    vec![
        Box::new(TrackProvider::manual(client.clone())),
        Box::new(TrackProvider::auto_generated(client.clone())),
    ]
}

/// Try each provider in order and stop at the first that has captions.
pub async fn fetch_transcript(
    providers: &[Box<dyn CaptionProvider>],
    video: &VideoMetadata,
    lang: &str,
) -> TranscriptOutcome {
    let mut last_reason = UnavailableReason::NotFound;

    for provider in providers {
        let kind = provider.transcript_type();
        match provider.lookup(video, lang).await {
            Ok(CaptionLookup::Found(entries)) => {
                debug!(video_id = %video.id, %kind, cues = entries.len(), "caption track found");
                return TranscriptOutcome::Found(build_transcript(kind, entries));
            }
            Ok(CaptionLookup::Unavailable(reason)) => {
                debug!(video_id = %video.id, %kind, %reason, "caption track unavailable");
                last_reason = reason;
            }
            Err(e) => {
                warn!(video_id = %video.id, %kind, error = %e, "caption lookup failed");
                return TranscriptOutcome::Unavailable(UnavailableReason::Other(e.to_string()));
            }
        }
    }

    TranscriptOutcome::Unavailable(last_reason)
}
