use crate::types::{CaptionEntry, TranscriptRecord, TranscriptType};

const FILENAME_MAX_CHARS: usize = 50;
const FORBIDDEN_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Format seconds as MM:SS timestamp
pub fn format_timestamp(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let mins = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{:02}:{:02}", mins, secs)
}

/// Format caption entries as `[MM:SS] text` lines
pub fn format_transcript_with_timestamps(entries: &[CaptionEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            format!(
                "[{}] {}",
                format_timestamp(entry.start_time_seconds),
                entry.text.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_transcript_text_only(entries: &[CaptionEntry]) -> String {
    entries
        .iter()
        .map(|entry| entry.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn build_transcript(
    transcript_type: TranscriptType,
    raw_entries: Vec<CaptionEntry>,
) -> TranscriptRecord {
    TranscriptRecord {
        transcript_type,
        with_timestamps: format_transcript_with_timestamps(&raw_entries),
        text_only: format_transcript_text_only(&raw_entries),
        raw_entries,
    }
}

/// Format whole seconds as HH:MM:SS. Hours are not wrapped at a day.
pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let mins = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, mins, secs)
}

pub fn format_duration_or_unknown(total_seconds: u64) -> String {
    if total_seconds == 0 {
        "Unknown".to_string()
    } else {
        format_hms(total_seconds)
    }
}

/// `M:SS`, used in the curriculum mapping table.
pub fn format_minutes_seconds(total_seconds: u64) -> String {
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// `Hh Mm`, used for the playlist total.
pub fn format_hours_minutes(total_seconds: u64) -> String {
    format!("{}h {}m", total_seconds / 3600, (total_seconds % 3600) / 60)
}

pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Make a title safe to use as part of a file name.
pub fn sanitize_filename(title: &str) -> String {
    title
        .chars()
        .filter(|c| !FORBIDDEN_FILENAME_CHARS.contains(c))
        .map(|c| if c == ' ' { '_' } else { c })
        .take(FILENAME_MAX_CHARS)
        .collect()
}

/// Markdown anchor: lower-case, everything outside `[a-z0-9-]` becomes `-`.
pub fn sanitize_anchor(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// First `max_chars` characters, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(start: f64, text: &str) -> CaptionEntry {
        CaptionEntry {
            start_time_seconds: start,
            text: text.to_string(),
        }
    }

    #[test]
    fn timestamps_do_not_wrap_at_the_hour() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(65.9), "01:05");
        assert_eq!(format_timestamp(3725.0), "62:05");
    }

    #[test]
    fn transcript_invariants_hold() {
        let entries = vec![
            entry(0.0, "Hello"),
            entry(1.5, "world,"),
            entry(61.0, "again"),
        ];
        let record = build_transcript(TranscriptType::Manual, entries.clone());

        let joined = entries
            .iter()
            .map(|e| e.text.clone())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(record.text_only, joined);
        assert_eq!(record.with_timestamps.lines().count(), entries.len());
        assert_eq!(
            record.with_timestamps,
            "[00:00] Hello\n[00:01] world,\n[01:01] again"
        );
    }

    #[test]
    fn timestamp_lines_are_non_decreasing() {
        let entries: Vec<_> = (0..200).map(|i| entry(i as f64 * 37.3, "x")).collect();
        let formatted = format_transcript_with_timestamps(&entries);
        let stamps: Vec<(u32, u32)> = formatted
            .lines()
            .map(|line| {
                let (m, s) = line[1..line.find(']').unwrap()].split_once(':').unwrap();
                (m.parse().unwrap(), s.parse().unwrap())
            })
            .collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn hms_formatting() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(3661), "01:01:01");
        assert_eq!(format_hms(90_000), "25:00:00");
        assert_eq!(format_duration_or_unknown(0), "Unknown");
        assert_eq!(format_minutes_seconds(125), "2:05");
        assert_eq!(format_hours_minutes(7_500), "2h 5m");
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000), "1,000");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn sanitized_filenames_are_safe() {
        let titles = [
            "Intro: What is <Vibe> Coding?",
            "a/b\\c|d\"e*f",
            "   leading and trailing   ",
            "Ünïcödé titles — with dashes and a very long tail that keeps going and going",
            "",
        ];
        for title in titles {
            let name = sanitize_filename(title);
            assert!(
                !name.contains(|c: char| "<>:\"/\\|?* ".contains(c)),
                "{name:?} still has forbidden characters"
            );
            assert!(name.chars().count() <= 50);
        }
        assert_eq!(
            sanitize_filename("Intro: What is <Vibe> Coding?"),
            "Intro_What_is_Vibe_Coding"
        );
    }

    #[test]
    fn anchors_replace_everything_but_alphanumerics_and_hyphens() {
        assert_eq!(sanitize_anchor("Lesson 1: Setup & Tools"), "lesson-1--setup---tools");
        assert_eq!(sanitize_anchor("pre-work"), "pre-work");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
