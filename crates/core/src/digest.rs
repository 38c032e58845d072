//! One markdown digest of every subtitle file downloaded for a playlist.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tokio::fs;

use crate::{error::Result, format::truncate_chars, output::get_digest_path, vtt::parse_vtt_file};

const PREVIEW_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestEntry {
    pub title: String,
    pub text: String,
}

/// yt-dlp tags subtitle files with the track language: `en`, `en-US`, `pt-BR`.
fn is_language_tag(tag: &str) -> bool {
    let mut subtags = tag.split('-');
    let primary_ok = subtags.next().is_some_and(|primary| {
        (2..=3).contains(&primary.len()) && primary.chars().all(|c| c.is_ascii_alphabetic())
    });
    primary_ok
        && subtags.all(|sub| {
            (1..=8).contains(&sub.len()) && sub.chars().all(|c| c.is_ascii_alphanumeric())
        })
}

/// `03-Prompting Basics.en-US.vtt` -> `Prompting Basics`
pub fn title_from_file_name(file_name: &str) -> String {
    let stem = file_name.strip_suffix(".vtt").unwrap_or(file_name);
    let stem = match stem.rsplit_once('.') {
        Some((rest, tag)) if is_language_tag(tag) => rest,
        _ => stem,
    };

    match stem.split_once('-') {
        Some((_, title)) => title.to_string(),
        None => stem.to_string(),
    }
}

fn digest_anchor(position: usize, title: &str) -> String {
    format!("{}-{}", position, title.to_lowercase().replace(' ', "-"))
}

pub fn render_digest(entries: &[DigestEntry], generated: DateTime<Local>) -> String {
    let mut output = String::new();

    output.push_str("# All Video Transcripts\n\n");
    output.push_str(&format!(
        "Generated: {}\n\n",
        generated.format("%Y-%m-%d %H:%M")
    ));

    output.push_str("## Table of Contents\n\n");
    for (i, entry) in entries.iter().enumerate() {
        let position = i + 1;
        output.push_str(&format!(
            "{}. [{}](#{})\n",
            position,
            entry.title,
            digest_anchor(position, &entry.title)
        ));
    }
    output.push_str("\n---\n\n");

    for (i, entry) in entries.iter().enumerate() {
        output.push_str(&format!("## {}. {}\n\n", i + 1, entry.title));

        if entry.text.is_empty() {
            output.push_str("*Transcript not available or could not be parsed*\n");
        } else {
            output.push_str("**Preview:**\n");
            output.push_str(&format!(
                "> {}...\n\n",
                truncate_chars(&entry.text, PREVIEW_CHARS)
            ));
            output.push_str("**Full Transcript:**\n\n");
            output.push_str(&entry.text);
        }
        output.push_str("\n\n---\n\n");
    }

    output
}

/// Parse each subtitle file in order. Files that cannot be read become
/// entries with empty text.
pub async fn collect_entries(files: &[PathBuf]) -> Vec<DigestEntry> {
    let mut entries = Vec::with_capacity(files.len());
    for path in files {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        entries.push(DigestEntry {
            title: title_from_file_name(&file_name),
            text: parse_vtt_file(path).await,
        });
    }
    entries
}

pub async fn write_digest(
    entries: &[DigestEntry],
    generated: DateTime<Local>,
    output_dir: &Path,
) -> Result<PathBuf> {
    let path = get_digest_path(output_dir);
    fs::write(&path, render_digest(entries, generated)).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn titles_lose_index_and_extension() {
        assert_eq!(
            title_from_file_name("03-Prompting Basics.en.vtt"),
            "Prompting Basics"
        );
        assert_eq!(title_from_file_name("1-Intro - Part 2.vtt"), "Intro - Part 2");
        assert_eq!(title_from_file_name("Standalone.de.vtt"), "Standalone");
    }

    #[test]
    fn regional_language_suffixes_are_stripped() {
        assert_eq!(title_from_file_name("04-Deploying.en-US.vtt"), "Deploying");
        assert_eq!(title_from_file_name("05-Aula.pt-BR.vtt"), "Aula");
        assert_eq!(
            title_from_file_name("06-Next.js in 10 minutes.en-GB.vtt"),
            "Next.js in 10 minutes"
        );
        assert_eq!(title_from_file_name("07-Version 2.0 notes.vtt"), "Version 2.0 notes");
    }

    #[test]
    fn digest_has_toc_preview_and_fallback() {
        let long_text = "word ".repeat(200).trim_end().to_string();
        let entries = vec![
            DigestEntry {
                title: "Getting Started".to_string(),
                text: long_text.clone(),
            },
            DigestEntry {
                title: "Broken File".to_string(),
                text: String::new(),
            },
        ];
        let generated = Local.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();

        let md = render_digest(&entries, generated);
        assert!(md.contains("Generated: 2024-05-06 07:08\n"));
        assert!(md.contains("1. [Getting Started](#1-getting-started)\n"));
        assert!(md.contains("2. [Broken File](#2-broken-file)\n"));
        assert!(md.contains(&format!("> {}...\n", &long_text[..500])));
        assert!(md.contains(&format!("**Full Transcript:**\n\n{long_text}\n")));
        assert!(md.contains("## 2. Broken File\n\n*Transcript not available or could not be parsed*\n"));
    }

    #[tokio::test]
    async fn unreadable_files_become_empty_entries() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("1-Hello.en.vtt");
        let bad = dir.path().join("2-Binary.en.vtt");
        fs::write(&good, "WEBVTT\n\n00:00.000 --> 00:01.000\nhi there\n")
            .await
            .unwrap();
        fs::write(&bad, [0xff_u8, 0xfe, 0x00, 0xd8]).await.unwrap();

        let entries = collect_entries(&[good, bad]).await;
        assert_eq!(
            entries,
            vec![
                DigestEntry {
                    title: "Hello".to_string(),
                    text: "hi there".to_string(),
                },
                DigestEntry {
                    title: "Binary".to_string(),
                    text: String::new(),
                },
            ]
        );
    }
}
