//! tachy - speed reader for ebooks and documents

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use tachy::{
    ACCEPTED_EXTENSIONS, Format, Pacer, PeakRate, Settings, SourceDocument, extract_text,
    extract_words,
};

#[derive(Parser)]
#[command(name = "tachy")]
#[command(version, about = "Speed reader for ebooks and documents", long_about = None)]
#[command(after_help = "EXAMPLES:
    tachy read book.epub             Read at the default peak of 650 wpm
    tachy read book.azw3 --wpm 400   Read with a slower peak
    tachy words notes.docx --json    Print the word list as JSON")]
struct Cli {
    /// Log extraction details to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the extracted text of a document
    Text {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the words a document is read as, one per line
    Words {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print a JSON array instead
        #[arg(long)]
        json: bool,
    },

    /// Read a document word by word in the terminal
    Read {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Peak rate in words per minute (100-1200)
        #[arg(long, value_name = "WPM")]
        wpm: Option<PeakRate>,

        /// Word index to start from
        #[arg(long, value_name = "N", allow_negative_numbers = true)]
        start: Option<i64>,

        /// Settings file (TOML)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// List the supported file extensions
    Formats,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Text { file } => print_text(&file),
        Command::Words { file, json } => print_words(&file, json),
        Command::Read {
            file,
            wpm,
            start,
            config,
        } => read(&file, wpm, start, config.as_deref()),
        Command::Formats => {
            print_formats();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print_text(path: &Path) -> Result<(), String> {
    let doc = SourceDocument::open(path).map_err(|e| e.to_string())?;
    let text = extract_text(&doc).map_err(|e| e.to_string())?;
    println!("{text}");
    Ok(())
}

fn print_words(path: &Path, json: bool) -> Result<(), String> {
    let doc = SourceDocument::open(path).map_err(|e| e.to_string())?;
    let words = extract_words(&doc).map_err(|e| e.to_string())?;

    if json {
        let out = serde_json::to_string_pretty(words.as_slice()).map_err(|e| e.to_string())?;
        println!("{out}");
    } else {
        let mut stdout = io::stdout().lock();
        for word in words.iter() {
            writeln!(stdout, "{word}").map_err(|e| e.to_string())?;
        }
    }
    Ok(())
}

fn print_formats() {
    for ext in ACCEPTED_EXTENSIONS {
        if let Ok(format) = Format::from_extension(ext) {
            println!(".{ext:<6}{format}");
        }
    }
    println!(".kfx   not supported: convert to EPUB with Calibre first");
}

fn read(
    path: &Path,
    wpm: Option<PeakRate>,
    start: Option<i64>,
    config: Option<&Path>,
) -> Result<(), String> {
    let settings = match config {
        Some(config) => Settings::load(config).map_err(|e| e.to_string())?,
        None => Settings::default(),
    };
    let doc = SourceDocument::open(path).map_err(|e| e.to_string())?;
    let words = extract_words(&doc).map_err(|e| e.to_string())?;

    let peak = wpm.unwrap_or(settings.pacing.peak_wpm);
    let mut pacer = Pacer::with_peak_rate(words, peak);

    let now = Instant::now();
    if let Some(start) = start {
        pacer.seek(start, now);
    }
    pacer.toggle(now);

    let mut stdout = io::stdout().lock();
    let show_progress = settings.display.show_progress;
    show_word(&mut stdout, &pacer, show_progress).map_err(|e| e.to_string())?;
    while let Some(due) = pacer.next_due() {
        std::thread::sleep(due.saturating_duration_since(Instant::now()));
        if pacer.poll(Instant::now()) {
            show_word(&mut stdout, &pacer, show_progress).map_err(|e| e.to_string())?;
        }
    }
    writeln!(stdout).map_err(|e| e.to_string())?;
    Ok(())
}

/// Redraw the current line with the word on display.
fn show_word(out: &mut impl Write, pacer: &Pacer, show_progress: bool) -> io::Result<()> {
    let Some(word) = pacer.current_word() else {
        return Ok(());
    };
    // \x1b[2K clears the previous (possibly longer) word
    write!(out, "\r\x1b[2K")?;
    if show_progress {
        let snapshot = pacer.snapshot();
        write!(
            out,
            "[{:>5}/{} {:>4} wpm] ",
            snapshot.index + 1,
            snapshot.total,
            snapshot.rate_wpm
        )?;
    }
    write!(out, "{word}")?;
    out.flush()
}
