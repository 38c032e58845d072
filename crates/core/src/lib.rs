//! Tubescribe Core Library
//!
//! Fetches YouTube playlist metadata and caption tracks through yt-dlp, parses
//! WebVTT, and renders lesson markdown, JSON, CSV and text reports.

pub mod digest;
pub mod error;
pub mod format;
pub mod mapping;
pub mod output;
pub mod pipeline;
pub mod provider;
pub mod report;
pub mod source;
pub mod types;
pub mod vtt;

// Re-export commonly used items at crate root
pub use error::{Result, ScribeError};
pub use format::{
    build_transcript, format_hms, format_timestamp, format_transcript_with_timestamps,
    sanitize_anchor, sanitize_filename,
};
pub use pipeline::{
    DEFAULT_PLAYLIST_URL, ExtractionContext, ExtractionEvent, Extractor, ExtractorConfig,
};
pub use provider::{
    CaptionLookup, CaptionProvider, TrackProvider, TranscriptOutcome, UnavailableReason,
    default_providers, fetch_transcript,
};
pub use report::{ReportFiles, write_all};
pub use source::{VideoSource, YtDlp, install_ytdlp};
pub use types::{
    CaptionEntry, Playlist, PlaylistEntry, PlaylistSummary, TranscriptRecord, TranscriptType,
    VideoMetadata, VideoRecord,
};
pub use vtt::{parse_vtt_cues, parse_vtt_cues_rolling, parse_vtt_file, parse_vtt_text};
