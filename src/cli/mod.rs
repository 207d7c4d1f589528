//! # CLI Module
//!
//! Command-line interface for the media sorter.
//!
//! ## Usage
//! ```bash
//! # Sort everything under a source tree
//! media-sort run ~/unsorted_photos ~/sorted_photos
//!
//! # More workers, JSON summary
//! media-sort run ~/unsorted_photos ~/sorted_photos --workers 16 --output json
//!
//! # Narrate every file
//! media-sort run ~/unsorted_photos ~/sorted_photos --verbose
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use media_sorter::core::{CountersSnapshot, SortConfig, Sorter};
use media_sorter::error::Result;
use media_sorter::events::{Event, EventChannel, FileEvent, PipelineEvent, WalkEvent};
use std::path::PathBuf;
use std::thread;

/// Media Sorter - file your photos and videos by capture date
#[derive(Parser, Debug)]
#[command(name = "media-sort")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sort a source tree into a destination tree
    Run {
        /// Directory to sort (files are moved out of it)
        source: PathBuf,

        /// Destination root for the sorted tree
        dest: PathBuf,

        /// Worker thread count (default: 2x cores, minimum 4)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Task queue capacity; the walk blocks when it fills
        #[arg(long, default_value = "1000")]
        queue_capacity: usize,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Narrate each file as it is handled
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (counts only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    media_sorter::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            source,
            dest,
            workers,
            queue_capacity,
            output,
            verbose,
        } => run_sort(source, dest, workers, queue_capacity, output, verbose),
    }
}

fn run_sort(
    source: PathBuf,
    dest: PathBuf,
    workers: Option<usize>,
    queue_capacity: usize,
    output: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();

    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Media Sorter").bold().cyan(),
            style(env!("CARGO_PKG_VERSION")).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let mut config = SortConfig::new(source, dest);
    if let Some(workers) = workers {
        config.workers = workers.max(1);
    }
    config.queue_capacity = queue_capacity.max(1);

    let (sender, receiver) = EventChannel::new();
    let sorter = Sorter::new(config)?.with_events(sender);

    // Progress bar for pretty output
    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let term_clone = term.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Walk(WalkEvent::Completed { files_found }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_length(files_found);
                    }
                }
                Event::File(file_event) => {
                    // Renamed always accompanies a Placed for the same file
                    if !matches!(file_event, FileEvent::Renamed { .. }) {
                        if let Some(ref pb) = progress_clone {
                            pb.inc(1);
                        }
                    }
                    if verbose {
                        narrate(&term_clone, &file_event);
                    }
                }
                Event::Pipeline(PipelineEvent::Completed { .. }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.finish_and_clear();
                    }
                }
                _ => {}
            }
        }
    });

    // Run the pipeline
    let snapshot = sorter.run()?;

    // Drop the sorter (and its event sender) to signal the event thread
    drop(sorter);
    event_thread.join().ok();

    match output {
        OutputFormat::Pretty => print_pretty_summary(&term, &snapshot),
        OutputFormat::Json => print_json_summary(&snapshot),
        OutputFormat::Minimal => print_minimal_summary(&snapshot),
    }

    Ok(())
}

fn narrate(term: &Term, event: &FileEvent) {
    let line = match event {
        FileEvent::Placed {
            path, final_path, ..
        } => format!(
            "{} {} -> {}",
            style("placed").green(),
            path.display(),
            final_path.display()
        ),
        FileEvent::Renamed { path, new_name } => format!(
            "{} {} as {}",
            style("renamed").yellow(),
            path.display(),
            new_name
        ),
        FileEvent::Duplicate { path, .. } => {
            format!("{} {}", style("duplicate").yellow(), path.display())
        }
        FileEvent::Deleted { path, .. } => {
            format!("{} {}", style("deleted").dim(), path.display())
        }
        FileEvent::Error { path, kind } => {
            format!("{} {} ({})", style("error").red(), path.display(), kind)
        }
    };
    term.write_line(&line).ok();
}

fn print_pretty_summary(term: &Term, snapshot: &CountersSnapshot) {
    term.write_line("").ok();
    term.write_line(&format!("{} Sort Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} files found, {} processed",
        style(snapshot.files_found).cyan(),
        style(snapshot.files_processed).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} photos and {} videos filed by capture year",
        style(snapshot.images_placed).cyan(),
        style(snapshot.videos_placed).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} files without a date (sorted by extension)",
        style(snapshot.no_date).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} HEIC files converted",
        style(snapshot.converted).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} archives extracted, {} moved whole",
        style(snapshot.archives_extracted).cyan(),
        style(snapshot.archives_moved).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} duplicates deleted, {} non-media files deleted",
        style(snapshot.duplicates_deleted).yellow(),
        style(snapshot.non_media_deleted).dim()
    ))
    .ok();

    if snapshot.skipped > 0 {
        term.write_line(&format!(
            "  {} files skipped (already in destination)",
            style(snapshot.skipped).dim()
        ))
        .ok();
    }
    term.write_line(&format!(
        "  {} successful operations",
        style(snapshot.successful_operations()).cyan()
    ))
    .ok();

    term.write_line("").ok();
    if snapshot.errors > 0 {
        term.write_line(&format!(
            "  {} {} files had errors - check the errors folder",
            style("⚠").yellow(),
            style(snapshot.errors).red()
        ))
        .ok();
    } else {
        term.write_line(&format!(
            "  {} All files processed without errors",
            style("🎉").green()
        ))
        .ok();
    }
}

fn print_json_summary(snapshot: &CountersSnapshot) {
    match serde_json::to_string_pretty(snapshot) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize summary: {e}"),
    }
}

fn print_minimal_summary(snapshot: &CountersSnapshot) {
    println!(
        "placed={} no_date={} duplicates={} errors={}",
        snapshot.images_placed + snapshot.videos_placed,
        snapshot.no_date,
        snapshot.duplicates_deleted,
        snapshot.errors
    );
}
