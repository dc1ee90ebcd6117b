//! Command-line front end for sqlsplit.
//!
//! Usage:
//!   sqlsplit [FILE] [--annotated] [--prefix NAME] [--format text|json] [--config PATH]
//!
//! Reads FILE, or stdin when FILE is omitted or `-`, and prints the statements.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sqlsplit_config::Config;
use sqlsplit_syntax::{RuneStream, Splitter, split_annotated_reader};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

mod output;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "sqlsplit", version)]
#[command(about = "Split SQL migration scripts into individual statements")]
struct Args {
    /// Script to split; stdin when omitted or `-`
    file: Option<PathBuf>,

    /// Split on `-- +<prefix> StatementBegin/End` markers instead of `;`
    #[arg(long)]
    annotated: bool,

    /// Marker prefix for --annotated (default from config, else "goose")
    #[arg(long)]
    prefix: Option<String>,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Config file to use instead of ~/.config/sqlsplit/config.toml
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();

    let config = Config::load_or_default(args.config.as_deref())
        .context("Failed to load config file")?;
    log::debug!("Using config: {config:?}");

    let input = open_input(args.file.as_deref())?;
    let rendered = if args.annotated {
        let prefix = args.prefix.as_deref().unwrap_or(&config.marker_prefix);
        let split = split_annotated_reader(input, prefix).context("Failed to read script")?;
        match args.format {
            Format::Text => output::blocks_text(&split.blocks),
            Format::Json => output::blocks_json(&split.blocks)?,
        }
    } else {
        let statements = Splitter::with_options(RuneStream::new(input), config.split_options())
            .split()
            .context("Failed to split script")?;
        match args.format {
            Format::Text => output::statements_text(&statements),
            Format::Json => output::statements_json(&statements)?,
        }
    };

    let mut stdout = io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    if args.format == Format::Json {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}

fn open_input(file: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match file {
        Some(path) if path != Path::new("-") => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open '{}'", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(io::stdin().lock())),
    }
}
