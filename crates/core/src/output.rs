use std::path::{Path, PathBuf};

use crate::{format::sanitize_filename, types::VideoRecord};

/// Get the directory holding one markdown file per lesson
pub fn get_lessons_dir(output_dir: &Path) -> PathBuf {
    output_dir.join("lessons")
}

/// File name for a single lesson, e.g. `lesson_03_Prompting_Basics.md`
pub fn lesson_file_name(video: &VideoRecord) -> String {
    format!(
        "lesson_{:02}_{}.md",
        video.lesson_number,
        sanitize_filename(&video.title)
    )
}

pub fn get_lesson_path(output_dir: &Path, video: &VideoRecord) -> PathBuf {
    get_lessons_dir(output_dir).join(lesson_file_name(video))
}

pub fn get_master_path(output_dir: &Path) -> PathBuf {
    output_dir.join("master_curriculum.md")
}

pub fn get_json_path(output_dir: &Path) -> PathBuf {
    output_dir.join("playlist_data.json")
}

pub fn get_csv_path(output_dir: &Path) -> PathBuf {
    output_dir.join("video_summary.csv")
}

pub fn get_report_path(output_dir: &Path) -> PathBuf {
    output_dir.join("extraction_report.txt")
}

pub fn get_analysis_json_path(output_dir: &Path) -> PathBuf {
    output_dir.join("playlist_summary.json")
}

pub fn get_mapping_path(output_dir: &Path) -> PathBuf {
    output_dir.join("curriculum_mapping.md")
}

pub fn get_digest_path(output_dir: &Path) -> PathBuf {
    output_dir.join("all_transcripts_summary.md")
}
