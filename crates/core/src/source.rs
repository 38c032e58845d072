use std::{
    path::{Path, PathBuf},
    process::Output,
};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::{
    error::{Result, ScribeError},
    types::{Playlist, PlaylistEntry, VideoMetadata},
};

pub const YTDLP: &str = "yt-dlp";

/// Where playlist listings and per-video metadata come from.
#[async_trait]
pub trait VideoSource: Send + Sync {
    async fn playlist(&self, url: &str) -> Result<Playlist>;
    async fn video(&self, url: &str) -> Result<VideoMetadata>;
}

#[derive(Debug, Deserialize)]
struct RawPlaylist {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    uploader: Option<String>,
    #[serde(default)]
    entries: Vec<Option<RawPlaylistEntry>>,
}

#[derive(Debug, Deserialize)]
struct RawPlaylistEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// Extract the 11-character video id from a YouTube URL.
pub fn extract_video_id(url: &str) -> Option<String> {
    fn id_at(rest: &str) -> Option<String> {
        let candidate: String = rest.chars().take(11).collect();
        let valid = candidate.chars().count() == 11
            && candidate
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        valid.then_some(candidate)
    }

    for (idx, _) in url.char_indices() {
        let rest = &url[idx..];
        let found = if let Some(after) = rest.strip_prefix("v=") {
            id_at(after)
        } else if let Some(after) = rest.strip_prefix('/') {
            id_at(after)
        } else {
            None
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Turn `yt-dlp --flat-playlist -J` output into a [`Playlist`].
///
/// Lesson numbers are playlist positions, so an entry that cannot be used
/// leaves a gap instead of shifting the lessons after it.
pub fn parse_playlist_json(url: &str, json: &str) -> Result<Playlist> {
    let raw: RawPlaylist = serde_json::from_str(json)?;

    let entries = raw
        .entries
        .into_iter()
        .enumerate()
        .filter_map(|(idx, entry)| {
            let index = idx as u32 + 1;
            let Some(entry) = entry else {
                warn!(index, "playlist entry is empty, skipping");
                return None;
            };
            let video_id = entry
                .id
                .filter(|id| id.len() == 11)
                .or_else(|| entry.url.as_deref().and_then(extract_video_id));
            match video_id {
                Some(video_id) => Some(PlaylistEntry {
                    index,
                    video_id,
                    title: entry.title.unwrap_or_else(|| "Unknown".to_string()),
                }),
                None => {
                    warn!(index, title = ?entry.title, "playlist entry has no video id, skipping");
                    None
                }
            }
        })
        .collect();

    Ok(Playlist {
        title: raw.title.unwrap_or_else(|| "Unknown Playlist".to_string()),
        uploader: raw.uploader,
        url: url.to_string(),
        entries,
    })
}

/// yt-dlp driven as a subprocess.
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: String,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new(YTDLP)
    }
}

impl YtDlp {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    async fn run(&self, args: &[&str], target: &str) -> Result<Output> {
        debug!(binary = %self.binary, ?args, url = target, "running yt-dlp");
        let output = Command::new(&self.binary)
            .args(args)
            .arg(target)
            .output()
            .await
            .map_err(|e| ScribeError::from_spawn(&self.binary, e))?;

        if !output.status.success() {
            return Err(ScribeError::ExtractionFailed {
                url: target.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }

    /// Check that the binary can be spawned, returning its version string.
    pub async fn version(&self) -> Result<String> {
        let output = self.run(&[], "--version").await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Download every subtitle of a playlist as `<dir>/<index>-<title>.<lang>.vtt`.
    pub async fn download_subtitles(
        &self,
        playlist_url: &str,
        lang: &str,
        output_dir: &Path,
    ) -> Result<()> {
        let template = output_dir.join("%(playlist_index)s-%(title)s.%(ext)s");
        let template = template.to_string_lossy();
        self.run(
            &[
                "--write-sub",
                "--write-auto-sub",
                "--sub-lang",
                lang,
                "--skip-download",
                "--sub-format",
                "vtt",
                "--output",
                &*template,
            ],
            playlist_url,
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl VideoSource for YtDlp {
    async fn playlist(&self, url: &str) -> Result<Playlist> {
        let output = self
            .run(&["--flat-playlist", "-J", "--no-warnings"], url)
            .await?;
        parse_playlist_json(url, &String::from_utf8_lossy(&output.stdout))
    }

    async fn video(&self, url: &str) -> Result<VideoMetadata> {
        let output = self
            .run(&["-J", "--skip-download", "--no-playlist", "--no-warnings"], url)
            .await?;
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

/// Try `pip install yt-dlp`. Returns whether pip reported success.
pub async fn install_ytdlp() -> Result<bool> {
    let status = Command::new("pip")
        .args(["install", YTDLP])
        .status()
        .await
        .map_err(|e| ScribeError::from_spawn("pip", e))?;
    Ok(status.success())
}

/// All `.vtt` files in `dir`, sorted by file name.
pub async fn list_vtt_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "vtt") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
