use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Result, bail};
use console::{Term, style};
use indicatif::ProgressBar;
use tokio::fs;
use tracing::info;

use tubescribe_core::{
    DEFAULT_PLAYLIST_URL, ExtractionEvent, Extractor, ExtractorConfig, ScribeError,
    UnavailableReason, YtDlp, default_providers,
    digest::{collect_entries, write_digest},
    format::{format_hours_minutes, format_minutes_seconds, format_thousands},
    install_ytdlp,
    mapping::{AnalysisEvent, analyze_playlist, write_analysis},
    output::{get_lessons_dir, get_master_path},
    source::list_vtt_files,
    write_all,
};

use crate::{
    Cli, prompt,
    ui::{self, create_progress_bar, create_spinner, fail, format_duration, ok},
};

const EXTRACT_DIR: &str = "vibecoder_bootcamp_content";
const ANALYZE_DIR: &str = "vibecoder_curriculum_analysis";
const SUBTITLES_DIR: &str = "vibecoder_transcripts";

fn playlist_url(cli: &Cli) -> String {
    cli.url
        .clone()
        .unwrap_or_else(|| DEFAULT_PLAYLIST_URL.to_string())
}

fn output_dir(cli: &Cli, default: &str) -> PathBuf {
    cli.output
        .clone()
        .unwrap_or_else(|| PathBuf::from(default))
}

fn unavailable_line(title: &str, reason: &UnavailableReason) -> String {
    match reason {
        UnavailableReason::Disabled => format!("Transcripts disabled for: {}", title),
        UnavailableReason::NotFound => format!("No transcript found for: {}", title),
        UnavailableReason::Other(detail) => {
            format!("Error getting transcript for {}: {}", title, detail)
        }
    }
}

pub async fn run_extract(cli: &Cli) -> Result<()> {
    ui::print_banner("Playlist Transcript Extractor");

    let term = Term::stdout();
    let mut url = playlist_url(cli);
    if !cli.yes && cli.url.is_none() && prompt::ask_yes_no(&term, "Use default playlist URL?")? == "n"
    {
        let custom = prompt::ask(&term, "Enter YouTube playlist URL:")?;
        if !custom.is_empty() {
            url = custom;
        }
    }

    let config = ExtractorConfig {
        playlist_url: url,
        output_dir: output_dir(cli, EXTRACT_DIR),
        language: cli.lang.clone(),
        delay: Duration::from_millis(cli.delay_ms),
        ytdlp_binary: cli.ytdlp.clone(),
    };

    println!(
        "\n{} {}",
        style("Playlist:").dim(),
        style(&config.playlist_url).cyan()
    );
    println!(
        "{} {}",
        style("Output:").dim(),
        style(config.output_dir.display()).cyan()
    );

    if !cli.yes && prompt::ask_yes_no(&term, "\nProceed with extraction?")? != "y" {
        println!("{} Extraction cancelled", fail());
        return Ok(());
    }

    info!(?config, "starting extraction");
    fs::create_dir_all(&config.output_dir).await?;
    ui::rule();

    let total_start = Instant::now();
    let ytdlp = YtDlp::new(config.ytdlp_binary.as_str());
    let client = reqwest::Client::new();
    let providers = default_providers(&client);
    let extractor = Extractor::new(&ytdlp, &providers, &config);

    let spinner = create_spinner("Extracting playlist information...");
    let mut bar: Option<ProgressBar> = None;
    let result = extractor
        .run(|event| match event {
            ExtractionEvent::PlaylistLoaded { title, video_count } => {
                spinner.finish_with_message(format!(
                    "{} Found playlist: {} {}",
                    ok(),
                    style(title).bold(),
                    style(format!("({} videos)", video_count)).dim()
                ));
                bar = Some(create_progress_bar(video_count as u64));
            }
            ExtractionEvent::VideoStarted { entry, total } => {
                if let Some(bar) = &bar {
                    bar.set_message(format!("[{}/{}] {}", entry.index, total, entry.title));
                }
            }
            ExtractionEvent::VideoProcessed {
                record,
                unavailable,
                ..
            } => {
                if let Some(bar) = &bar {
                    if let Some(reason) = unavailable {
                        bar.println(format!(
                            "   {} {}",
                            ui::warn(),
                            unavailable_line(&record.title, reason)
                        ));
                    }
                    bar.inc(1);
                }
            }
            ExtractionEvent::VideoFailed { entry, error } => {
                if let Some(bar) = &bar {
                    bar.println(format!(
                        "   {} Error processing video {}: {}",
                        fail(),
                        entry.index,
                        error
                    ));
                    bar.inc(1);
                }
            }
        })
        .await;

    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }
    let ctx = match result {
        Ok(ctx) => ctx,
        Err(e) => {
            spinner.finish_with_message(format!("{} Failed to extract playlist information", fail()));
            return Err(e.into());
        }
    };

    if ctx.summary.videos.is_empty() {
        bail!("No videos were processed successfully");
    }

    println!(
        "{} Successfully processed {} videos {}",
        ok(),
        ctx.summary.videos.len(),
        style(format!("[{}]", format_duration(total_start.elapsed()))).dim()
    );
    if !ctx.failed.is_empty() {
        println!(
            "{} Failed to get transcripts for {} videos",
            ui::warn(),
            ctx.failed.len()
        );
    }

    let spinner = create_spinner("Saving extracted content...");
    let files = write_all(&ctx.summary, &ctx.failed, &config.output_dir).await?;
    spinner.finish_with_message(format!(
        "{} Saved {} lesson files and 4 reports",
        ok(),
        files.lessons.len()
    ));

    ui::rule();
    println!("\n{}", style("Summary").bold());
    println!("  - Total Videos: {}", ctx.summary.videos.len());
    println!(
        "  - With Transcripts: {}",
        ctx.summary.with_transcript_count()
    );
    println!(
        "  - Without Transcripts: {}",
        ctx.summary.without_transcript_count()
    );

    println!("\n{}", style("Generated Files").bold());
    println!(
        "  - Individual lesson files in: {}",
        style(get_lessons_dir(&config.output_dir).display()).cyan()
    );
    println!(
        "  - Master curriculum document: {}",
        style(get_master_path(&config.output_dir).display()).cyan()
    );
    println!("  - JSON data: {}", style(files.json.display()).cyan());
    println!("  - Summary CSV: {}", style(files.csv.display()).cyan());
    println!(
        "  - Extraction report: {}",
        style(files.report.display()).cyan()
    );

    println!(
        "\n{} {}\n",
        style("Total time:").dim(),
        style(format_duration(total_start.elapsed())).cyan().bold()
    );
    println!("Next steps:");
    println!("1. Review the extracted transcripts in the lessons folder");
    println!("2. Map each video to the appropriate week in your curriculum");
    println!("3. Create sandbox exercises based on the content");

    Ok(())
}

pub async fn run_analyze(cli: &Cli) -> Result<()> {
    ui::print_banner("Playlist Analyzer");

    let url = playlist_url(cli);
    let output_dir = output_dir(cli, ANALYZE_DIR);
    let ytdlp = YtDlp::new(cli.ytdlp.as_str());

    let version = ytdlp.version().await?;
    println!("{} yt-dlp {}", ok(), style(version).dim());
    println!("{} {}", style("Analyzing playlist:").dim(), style(&url).cyan());
    ui::rule();

    let spinner = create_spinner("Extracting playlist information...");
    let mut bar: Option<ProgressBar> = None;
    let result = analyze_playlist(
        &ytdlp,
        &url,
        &cli.lang,
        Duration::from_millis(cli.delay_ms),
        |event| match event {
            AnalysisEvent::PlaylistLoaded { title, video_count } => {
                spinner.finish_with_message(format!(
                    "{} Playlist: {} {}",
                    ok(),
                    style(title).bold(),
                    style(format!("({} videos)", video_count)).dim()
                ));
                bar = Some(create_progress_bar(video_count as u64));
            }
            AnalysisEvent::VideoStarted { entry, total } => {
                if let Some(bar) = &bar {
                    bar.set_message(format!("[{}/{}] {}", entry.index, total, entry.title));
                }
            }
            AnalysisEvent::VideoAnalyzed { video } => {
                if let Some(bar) = &bar {
                    let status = match video.transcript_type {
                        Some(kind) => format!("{} Transcript available ({})", ok(), kind),
                        None => format!("{} No transcript available", ui::warn()),
                    };
                    bar.println(format!(
                        "[{}] {}\n   {}\n   Duration: {}  Views: {}",
                        video.lesson_number,
                        video.title,
                        status,
                        format_minutes_seconds(video.duration),
                        format_thousands(video.view_count)
                    ));
                    bar.inc(1);
                }
            }
            AnalysisEvent::VideoFailed { entry } => {
                if let Some(bar) = &bar {
                    bar.println(format!(
                        "[{}] {}\n   {} Error processing video",
                        entry.index,
                        entry.title,
                        fail()
                    ));
                    bar.inc(1);
                }
            }
        },
    )
    .await;

    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }
    let analysis = match result {
        Ok(analysis) => analysis,
        Err(e) => {
            spinner.finish_with_message(format!("{} Failed to extract playlist information", fail()));
            return Err(e.into());
        }
    };

    let (json_path, mapping_path) = write_analysis(&analysis, &cli.lang, &output_dir).await?;

    ui::rule();
    println!("{} Analysis complete", ok());
    println!("  - {}: complete data in JSON format", style(json_path.display()).cyan());
    println!(
        "  - {}: markdown summary with week suggestions",
        style(mapping_path.display()).cyan()
    );
    println!(
        "\nVideos with transcripts: {}/{}",
        analysis.with_transcript_count(),
        analysis.videos.len()
    );
    println!(
        "Total playlist duration: {}",
        format_hours_minutes(analysis.total_duration_seconds())
    );
    println!(
        "\n{} Download subtitle files with: {} subtitles",
        style("Note:").dim(),
        style("tubescribe").cyan()
    );

    Ok(())
}

pub async fn run_subtitles(cli: &Cli) -> Result<()> {
    ui::print_banner("Subtitle Downloader");

    let url = playlist_url(cli);
    let output_dir = output_dir(cli, SUBTITLES_DIR);
    fs::create_dir_all(&output_dir).await?;
    println!(
        "{} {}",
        style("Output directory:").dim(),
        style(output_dir.display()).cyan()
    );

    let ytdlp = YtDlp::new(cli.ytdlp.as_str());
    let total_start = Instant::now();
    let spinner = create_spinner("Downloading subtitles, this may take a few minutes...");
    match ytdlp.download_subtitles(&url, &cli.lang, &output_dir).await {
        Ok(()) => spinner.finish_with_message(format!(
            "{} Downloaded subtitles {}",
            ok(),
            style(format!("[{}]", format_duration(total_start.elapsed()))).dim()
        )),
        Err(ScribeError::MissingDependency { tool }) => {
            spinner.finish_with_message(format!("{} {} not found. Installing...", fail(), tool));
            if install_ytdlp().await? {
                println!("{} yt-dlp installed. Please run the command again.", ok());
            } else {
                println!("{} Installation failed. Install yt-dlp manually.", fail());
            }
            return Ok(());
        }
        Err(e) => {
            spinner.finish_with_message(format!("{} Error downloading subtitles", fail()));
            return Err(e.into());
        }
    }

    let files = list_vtt_files(&output_dir).await?;
    println!("{} Found {} subtitle files", ok(), files.len());

    let spinner = create_spinner("Building transcript summary...");
    let entries = collect_entries(&files).await;
    let path = write_digest(&entries, chrono::Local::now(), &output_dir).await?;
    let size_kb = fs::metadata(&path).await?.len() as f64 / 1024.0;
    spinner.finish_with_message(format!(
        "{} Summary created: {} {}",
        ok(),
        style(path.display()).cyan(),
        style(format!("({:.1} KB)", size_kb)).dim()
    ));

    Ok(())
}
