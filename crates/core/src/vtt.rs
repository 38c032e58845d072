//! WebVTT subtitle parsing.
//!
//! Two views of the same file: [`parse_vtt_text`] flattens a file into one
//! transcript string, [`parse_vtt_cues`] keeps cue start times so the result
//! can be rendered with timestamps.

use std::path::Path;

use tokio::fs;
use tracing::warn;

use crate::types::CaptionEntry;

pub const HEADER: &str = "WEBVTT";
pub const CUE_SEPARATOR: &str = "-->";

fn is_cue_index(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c.is_ascii_digit())
}

/// Flatten WebVTT content into plain text.
///
/// Drops the `WEBVTT` header token, timing lines, numeric cue indices and
/// blank lines; every other line is trimmed and joined with a single space.
pub fn parse_vtt_text(content: &str) -> String {
    content
        .lines()
        .map(str::trim)
        .filter(|line| {
            !line.is_empty()
                && *line != HEADER
                && !line.contains(CUE_SEPARATOR)
                && !is_cue_index(line)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Read and flatten a `.vtt` file. Unreadable files are logged and yield an
/// empty transcript.
pub async fn parse_vtt_file(path: &Path) -> String {
    match fs::read_to_string(path).await {
        Ok(content) => parse_vtt_text(&content),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read subtitle file");
            String::new()
        }
    }
}

/// Parse `HH:MM:SS.mmm` or `MM:SS.mmm` into seconds.
pub fn parse_cue_timestamp(raw: &str) -> Option<f64> {
    let raw = raw.trim().replace(',', ".");
    let parts: Vec<&str> = raw.split(':').collect();
    let (hours, mins, secs) = match parts.as_slice() {
        [h, m, s] => (h.parse::<u64>().ok()?, m.parse::<u64>().ok()?, *s),
        [m, s] => (0, m.parse::<u64>().ok()?, *s),
        _ => return None,
    };
    let secs: f64 = secs.parse().ok()?;
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    let whole = hours
        .checked_mul(3600)?
        .checked_add(mins.checked_mul(60)?)?;
    Some(whole as f64 + secs)
}

/// Remove inline cue markup (`<c>`, `<00:00:01.000>`, `<v Speaker>`) and the
/// common character references.
fn strip_cue_markup(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_tag = false;
    for ch in line.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

fn is_metadata_block(first_line: &str) -> bool {
    first_line.starts_with(HEADER)
        || first_line.starts_with("NOTE")
        || first_line.starts_with("STYLE")
        || first_line.starts_with("REGION")
}

/// Parse WebVTT content into timed caption entries, keeping every cue.
pub fn parse_vtt_cues(content: &str) -> Vec<CaptionEntry> {
    parse_cues(content, false)
}

/// Like [`parse_vtt_cues`], for auto-generated tracks.
///
/// Rolling auto-generated captions repeat the previous cue's line at the top
/// of the next cue; a line equal to one from the immediately preceding cue is
/// dropped so the transcript reads once.
pub fn parse_vtt_cues_rolling(content: &str) -> Vec<CaptionEntry> {
    parse_cues(content, true)
}

fn parse_cues(content: &str, collapse_rolling: bool) -> Vec<CaptionEntry> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut entries = Vec::new();
    let mut previous_lines: Vec<String> = Vec::new();

    let mut block: Vec<&str> = Vec::new();
    let mut lines = content.lines().map(|l| l.trim_end_matches('\r'));
    loop {
        let next = lines.next();
        match next {
            Some(line) if !line.is_empty() => {
                block.push(line);
                continue;
            }
            _ => {}
        }

        if let Some(first) = block.first()
            && !is_metadata_block(first.trim())
            && let Some(timing_idx) = block.iter().position(|l| l.contains(CUE_SEPARATOR))
        {
            let timing = block[timing_idx];
            let start = timing
                .split(CUE_SEPARATOR)
                .next()
                .and_then(|s| s.split_whitespace().next())
                .and_then(parse_cue_timestamp);

            if let Some(start) = start {
                let cue_lines: Vec<String> = block[timing_idx + 1..]
                    .iter()
                    .map(|l| strip_cue_markup(l))
                    .filter(|l| !l.is_empty())
                    .collect();

                let fresh: Vec<&str> = cue_lines
                    .iter()
                    .filter(|l| !collapse_rolling || !previous_lines.contains(l))
                    .map(String::as_str)
                    .collect();

                if !fresh.is_empty() {
                    entries.push(CaptionEntry {
                        start_time_seconds: start,
                        text: fresh.join(" "),
                    });
                }
                if !cue_lines.is_empty() {
                    previous_lines = cue_lines;
                }
            }
        }
        block.clear();

        if next.is_none() {
            break;
        }
    }

    entries
}
