//! audiolibro - Convert TXT, PDF and EPUB books into per-chapter narrated MP3 files

mod config;
mod error;
mod extract;
mod jobs;
mod library;
mod text;
mod voices;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::AppConfig;
use indicatif::{ProgressBar, ProgressStyle};
use jobs::{ConversionRequest, Dispatcher, JobId, JobRecord, JobRegistry, JobStatus};
use library::{AnalyzedDocument, DocumentStore};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use text::ChapterUnit;
use tts_client::{SynthesisRequest, TtsProvider};

#[derive(Parser, Debug)]
#[command(name = "audiolibro")]
#[command(about = "Convert TXT, PDF and EPUB books into narrated MP3 files, one per chapter", long_about = None)]
#[command(version)]
struct Args {
    /// Enable debug output
    #[arg(short, long, global = true, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Detect the chapters of a document
    Analyze {
        /// Path to a .txt, .pdf or .epub file
        file: PathBuf,

        /// Split on this literal text instead of the chapter headings
        #[arg(long)]
        delimiter: Option<String>,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Narrate the selected chapters into MP3 files
    Convert {
        /// Path to a .txt, .pdf or .epub file
        file: PathBuf,

        /// Split on this literal text instead of the chapter headings
        #[arg(long)]
        delimiter: Option<String>,

        /// Chapters to convert (e.g., "3", "0-10", "1,4,7-9"). Default: all
        #[arg(long)]
        chapters: Option<String>,

        /// Voice preset (alvaro, alonso, jorge, dalia) or full voice id
        #[arg(long)]
        voice: Option<String>,

        /// Output directory (default: from config, else ./output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Narration provider (edge-tts, openai)
        #[arg(long)]
        provider: Option<String>,
    },
    /// Narrator voices
    Voices {
        #[command(subcommand)]
        action: VoicesAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum VoicesAction {
    /// List voice presets
    List,
    /// Narrate a short preview sentence
    Sample {
        /// Voice preset or full voice id
        voice: String,

        /// Output file (default: sample_<voice>.mp3)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Narration provider (edge-tts, openai)
        #[arg(long)]
        provider: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set default voice
    SetVoice {
        /// Preset key or full voice id
        voice: String,
    },
    /// Set default output directory
    SetOutputDir {
        /// Directory for produced audio
        path: PathBuf,
    },
    /// Set default narration provider
    SetProvider {
        /// Provider name (edge-tts, openai)
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    match args.command {
        Commands::Analyze {
            file,
            delimiter,
            json,
        } => handle_analyze(&file, delimiter.as_deref(), json),
        Commands::Convert {
            file,
            delimiter,
            chapters,
            voice,
            output,
            provider,
        } => {
            handle_convert(ConvertArgs {
                file,
                delimiter,
                chapters,
                voice,
                output,
                provider,
            })
            .await
        }
        Commands::Voices { action } => handle_voices_command(action).await,
        Commands::Config { action } => handle_config_command(action),
    }
}

/// Log to stderr at info (debug with --debug). RUST_LOG overrides both.
fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Extract and segment a document, re-splitting on `delimiter` when given.
fn analyze_document(
    store: &DocumentStore,
    file: &Path,
    delimiter: Option<&str>,
) -> Result<Arc<AnalyzedDocument>> {
    if !file.exists() {
        anyhow::bail!("File not found: {}", file.display());
    }

    let document = store
        .analyze(file)
        .with_context(|| format!("Failed to analyze {}", file.display()))?;

    match delimiter {
        Some(d) if !d.trim().is_empty() => Ok(store.reanalyze(&document.id, Some(d))?),
        _ => Ok(document),
    }
}

#[derive(Serialize)]
struct AnalysisSummary<'a> {
    id: &'a str,
    filename: String,
    delimiter: Option<&'a str>,
    analyzed_at: chrono::DateTime<chrono::Utc>,
    total_chars: usize,
    chapters: Vec<&'a ChapterUnit>,
}

fn handle_analyze(file: &Path, delimiter: Option<&str>, json: bool) -> Result<()> {
    let store = DocumentStore::new();
    let document = analyze_document(&store, file, delimiter)?;

    if json {
        let summary = AnalysisSummary {
            id: &document.id,
            filename: document.filename(),
            delimiter: document.delimiter.as_deref(),
            analyzed_at: document.analyzed_at,
            total_chars: document.chapters.total_chars(),
            chapters: document.chapters.iter().map(|c| c.as_ref()).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "{}: {} chapter(s), {} chars",
        document.filename(),
        document.chapters.len(),
        document.chapters.total_chars()
    );
    println!();
    println!("{:>4}  {:<30} {:>10}", "ID", "TITLE", "CHARS");
    for chapter in document.chapters.iter() {
        println!(
            "{:>4}  {:<30} {:>10}",
            chapter.id, chapter.title, chapter.char_count
        );
    }

    Ok(())
}

struct ConvertArgs {
    file: PathBuf,
    delimiter: Option<String>,
    chapters: Option<String>,
    voice: Option<String>,
    output: Option<PathBuf>,
    provider: Option<String>,
}

async fn handle_convert(args: ConvertArgs) -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    let store = DocumentStore::new();
    let document = analyze_document(&store, &args.file, args.delimiter.as_deref())?;

    let ids = match &args.chapters {
        Some(selection) => parse_chapter_selection(selection, document.chapters.len())?,
        None => Vec::new(),
    };
    let chapters = document.select(&ids);
    if chapters.is_empty() {
        anyhow::bail!(
            "No chapters selected. {} has chapters 0-{}",
            document.filename(),
            document.chapters.len().saturating_sub(1)
        );
    }

    let voice = voices::resolve(args.voice.as_deref().unwrap_or(&config.voice));
    let output_directory = args.output.unwrap_or_else(|| config.output_dir());
    let provider = load_provider(args.provider.as_deref().or(config.provider.as_deref()))?;

    eprintln!("Book: {}", document.filename());
    eprintln!("Chapters: {} of {}", chapters.len(), document.chapters.len());
    eprintln!("Voice: {} ({})", voice.label, voice.id);
    eprintln!("Output: {}", output_directory.display());

    let registry = Arc::new(JobRegistry::new());
    let dispatcher = Dispatcher::new(Arc::clone(&registry), provider)
        .with_policy(config.backoff_policy())
        .with_min_chars(config.min_chars);

    let job_id = dispatcher.submit(ConversionRequest {
        chapters,
        voice,
        output_directory: output_directory.clone(),
        book_name: document.book_name(),
    })?;

    let record = watch_progress(&registry, &job_id).await?;

    if record.status == JobStatus::Failed {
        anyhow::bail!(
            "Conversion failed after {} of {} chapter(s): {}",
            record.completed_chapter_ids.len(),
            record.total_chapters,
            record.error_message.as_deref().unwrap_or("unknown error")
        );
    }

    let outputs = registry.list_outputs(&job_id)?;
    eprintln!(
        "\n{} file(s) in {}:",
        outputs.len(),
        output_directory.display()
    );
    for output in &outputs {
        eprintln!(
            "  {} ({:.1} KB)",
            output.filename,
            output.size_bytes as f64 / 1024.0
        );
    }

    Ok(())
}

fn load_provider(name: Option<&str>) -> Result<Arc<dyn TtsProvider>> {
    let tts_config = tts_client::Config::load().context("Failed to load TTS configuration")?;
    let provider = tts_client::get_provider(name, &tts_config)?;
    provider.is_available()?;
    Ok(Arc::from(provider))
}

/// Render job progress until the job completes or fails.
async fn watch_progress(registry: &JobRegistry, id: &JobId) -> Result<JobRecord> {
    let mut rx = registry.subscribe(id)?;

    let total = rx.borrow().total_chapters;
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed}) {msg}")?
            .progress_chars("#>-"),
    );

    loop {
        let record = rx.borrow_and_update().clone();
        pb.set_position(record.completed_chapter_ids.len() as u64);
        pb.set_message(progress_message(&record));

        if record.status.is_terminal() {
            break;
        }
        // Sender dropped: the worker is gone, its last record is final
        if rx.changed().await.is_err() {
            break;
        }
    }

    let record = registry.get_status(id)?;
    if record.status == JobStatus::Completed {
        pb.finish_with_message("Conversion complete!");
    } else {
        pb.abandon_with_message(format!(
            "{} at {:.0}%",
            record.status,
            record.percent_complete()
        ));
    }
    Ok(record)
}

fn progress_message(record: &JobRecord) -> String {
    match (record.status, record.pause_remaining_seconds) {
        (JobStatus::Paused, Some(remaining)) => {
            format!("paused {}s to avoid rate limiting", remaining)
        }
        (JobStatus::Pending, _) => "starting...".to_string(),
        _ => record.current_chapter_title.clone(),
    }
}

/// Parse a chapter selection such as "3", "0-10" or "1,4,7-9" into ids.
///
/// Ranges are inclusive and clamped to the `total` chapters available.
fn parse_chapter_selection(selection: &str, total: usize) -> Result<Vec<usize>> {
    let mut ids = Vec::new();

    for part in selection.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if let Some((start, end)) = part.split_once('-') {
            let start: usize = start
                .trim()
                .parse()
                .with_context(|| format!("Invalid start chapter in '{}'", part))?;
            let end: usize = end
                .trim()
                .parse()
                .with_context(|| format!("Invalid end chapter in '{}'", part))?;
            if start > end {
                anyhow::bail!("Invalid chapter range '{}': start is after end", part);
            }
            ids.extend(start..=end.min(total.saturating_sub(1)));
        } else {
            let id: usize = part
                .parse()
                .with_context(|| format!("Invalid chapter number '{}'", part))?;
            ids.push(id);
        }
    }

    if ids.is_empty() {
        anyhow::bail!("Invalid chapter selection. Use e.g. '3', '0-10' or '1,4,7-9'");
    }

    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

async fn handle_voices_command(action: VoicesAction) -> Result<()> {
    match action {
        VoicesAction::List => {
            let config = AppConfig::load().context("Failed to load configuration")?;
            let default = voices::resolve(&config.voice);

            println!(
                "  {:<8} {:<20} {:<8} {:<10} {}",
                "KEY", "VOICE", "NAME", "REGION", "GENDER"
            );
            for preset in voices::PRESETS {
                let marker = if preset.id == default.id { "*" } else { " " };
                println!(
                    "{} {:<8} {:<20} {:<8} {:<10} {}",
                    marker, preset.key, preset.id, preset.name, preset.region, preset.gender
                );
            }
        }
        VoicesAction::Sample {
            voice,
            output,
            provider,
        } => {
            let config = AppConfig::load().context("Failed to load configuration")?;
            let voice = voices::resolve(&voice);
            let output = output.unwrap_or_else(|| {
                PathBuf::from(format!("sample_{}.mp3", voice.label.to_lowercase()))
            });
            let provider = load_provider(provider.as_deref().or(config.provider.as_deref()))?;

            let request =
                SynthesisRequest::new(voices::sample_text(&voice.id), &voice.id, &output);
            provider
                .synthesize(&request)
                .await
                .with_context(|| format!("Failed to narrate sample with {}", voice.id))?;

            println!("Sample for {} written to {}", voice.label, output.display());
        }
    }
    Ok(())
}

fn handle_config_command(action: ConfigAction) -> Result<()> {
    let mut config = AppConfig::load().context("Failed to load configuration")?;

    match action {
        ConfigAction::Show => {
            println!("Configuration file: {:?}", AppConfig::config_path()?);
            println!();
            let voice = voices::resolve(&config.voice);
            println!("voice = \"{}\" ({})", config.voice, voice.id);
            match &config.output_dir {
                Some(dir) => println!("output_dir = \"{}\"", dir.display()),
                None => println!("output_dir = (default: ./output)"),
            }
            match &config.provider {
                Some(provider) => println!("provider = \"{}\"", provider),
                None => println!("provider = (tts default)"),
            }
            println!("pause_every = {}", config.pause_every);
            println!("pause_seconds = {}", config.pause_seconds);
            println!("min_chars = {}", config.min_chars);
        }
        ConfigAction::SetVoice { voice } => {
            let resolved = voices::resolve(&voice);
            if voices::find_preset(&voice).is_none() && resolved.id != voice {
                log::warn!(
                    "'{}' is not a known voice; {} will be used",
                    voice,
                    resolved.id
                );
            }
            config.voice = voice;
            config.save()?;
            println!("Default voice set to: {} ({})", resolved.label, resolved.id);
        }
        ConfigAction::SetOutputDir { path } => {
            config.output_dir = Some(path.clone());
            config.save()?;
            println!("Default output directory set to: {}", path.display());
        }
        ConfigAction::SetProvider { name } => {
            tts_client::ProviderKind::from_str(&name)?;
            config.provider = Some(name.clone());
            config.save()?;
            println!("Default provider set to: {}", name);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_chapter() {
        assert_eq!(parse_chapter_selection("3", 10).unwrap(), vec![3]);
    }

    #[test]
    fn test_parse_range_is_inclusive_and_clamped() {
        assert_eq!(parse_chapter_selection("0-3", 10).unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(parse_chapter_selection("8-20", 10).unwrap(), vec![8, 9]);
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(
            parse_chapter_selection("1, 4,7-9", 10).unwrap(),
            vec![1, 4, 7, 8, 9]
        );
        assert_eq!(parse_chapter_selection("5,2,5", 10).unwrap(), vec![2, 5]);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_chapter_selection("", 10).is_err());
        assert!(parse_chapter_selection("abc", 10).is_err());
        assert!(parse_chapter_selection("5-2", 10).is_err());
        assert!(parse_chapter_selection("1-x", 10).is_err());
    }

    #[test]
    fn test_progress_message() {
        let mut record = JobRecord::new(3, "Jorge");
        assert_eq!(progress_message(&record), "starting...");

        record.status = JobStatus::Running;
        record.current_chapter_title = "Chapter 2".to_string();
        assert_eq!(progress_message(&record), "Chapter 2");

        record.status = JobStatus::Paused;
        record.pause_remaining_seconds = Some(42);
        assert_eq!(progress_message(&record), "paused 42s to avoid rate limiting");
    }

    #[test]
    fn test_cli_parses_convert() {
        let args = Args::try_parse_from([
            "audiolibro",
            "convert",
            "libro.epub",
            "--chapters",
            "1,4",
            "--voice",
            "dalia",
            "--debug",
        ])
        .unwrap();
        assert!(args.debug);
        match args.command {
            Commands::Convert {
                file,
                chapters,
                voice,
                ..
            } => {
                assert_eq!(file, PathBuf::from("libro.epub"));
                assert_eq!(chapters.as_deref(), Some("1,4"));
                assert_eq!(voice.as_deref(), Some("dalia"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
