use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use artemis_tools::{
    core_session, decode_capture, format_decode_pretty, inspect_capture, world_from_capture,
    InspectReport,
};
use clap::{Parser, Subcommand, ValueEnum};
use glob::Pattern;
use tracing_subscriber::EnvFilter;
use wire::Version;

#[derive(Parser)]
#[command(
    name = "artemis-tools",
    version,
    about = "Artemis capture inspection and decoding tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List frame preambles and sizes.
    Inspect {
        /// Capture file, or a directory of captures.
        capture_path: PathBuf,
        /// Optional glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Sort inspected captures.
        #[arg(long, value_enum)]
        sort: Option<InspectSort>,
        /// Limit the number of inspected captures (after sorting).
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Decode every frame of a capture.
    Decode {
        capture_file: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = DecodeFormat::Json)]
        format: DecodeFormat,
        /// Assume this server version (e.g. 2.1.1) when the capture starts
        /// after the version packet.
        #[arg(long, value_parser = parse_version)]
        server_version: Option<Version>,
    },
    /// Replay a capture and print the merged world as JSON.
    World {
        capture_file: PathBuf,
        #[arg(long, value_parser = parse_version)]
        server_version: Option<Version>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectSort {
    Size,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecodeFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Inspect {
            capture_path,
            glob,
            sort,
            limit,
        } => {
            let limits = wire::Limits::default();
            if capture_path.is_dir() {
                let entries = collect_capture_entries(&capture_path, glob.as_deref())?;
                let mut entries = maybe_sort_entries(entries, sort);
                let limit = limit.or(sort.map(|InspectSort::Size| 10));
                if let Some(limit) = limit {
                    entries.truncate(limit);
                }
                for entry in entries {
                    let bytes = read_capture(&entry.path)?;
                    println!("== {} ({} bytes) ==", entry.path.display(), entry.size);
                    print_inspect_report(&inspect_capture(&bytes, &limits));
                }
            } else {
                let bytes = read_capture(&capture_path)?;
                print_inspect_report(&inspect_capture(&bytes, &limits));
            }
        }
        Command::Decode {
            capture_file,
            format,
            server_version,
        } => {
            let bytes = read_capture(&capture_file)?;
            let mut session = core_session(server_version)?;
            let report = decode_capture(&bytes, &mut session);
            match format {
                DecodeFormat::Json => {
                    let json = serde_json::to_string_pretty(&report).context("serialize json")?;
                    println!("{json}");
                }
                DecodeFormat::Pretty => {
                    print!("{}", format_decode_pretty(&report));
                }
            }
        }
        Command::World {
            capture_file,
            server_version,
        } => {
            let bytes = read_capture(&capture_file)?;
            let world = world_from_capture(&bytes, server_version)?;
            let json = serde_json::to_string_pretty(&world).context("serialize json")?;
            println!("{json}");
        }
    }
    Ok(())
}

fn read_capture(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read capture {}", path.display()))
}

fn parse_version(value: &str) -> Result<Version> {
    let parts = value
        .split('.')
        .map(|part| {
            part.parse::<u32>()
                .with_context(|| format!("invalid version part {part:?}"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Version::new(parts))
}

struct CaptureEntry {
    path: PathBuf,
    size: u64,
}

fn collect_capture_entries(dir: &Path, glob: Option<&str>) -> Result<Vec<CaptureEntry>> {
    let mut entries = Vec::new();
    let pattern = match glob {
        Some(value) => Some(Pattern::new(value).context("invalid glob pattern")?),
        None => None,
    };

    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        let size = entry.metadata()?.len();
        entries.push(CaptureEntry { path, size });
    }
    Ok(entries)
}

fn maybe_sort_entries(
    mut entries: Vec<CaptureEntry>,
    sort: Option<InspectSort>,
) -> Vec<CaptureEntry> {
    match sort {
        Some(InspectSort::Size) => {
            entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
        }
        None => entries.sort_by(|a, b| a.path.cmp(&b.path)),
    }
    entries
}

fn print_inspect_report(report: &InspectReport) {
    println!(
        "frames: {} payload: {} bytes",
        report.frames.len(),
        report.total_payload_bytes()
    );
    for frame in &report.frames {
        println!(
            "  @{:<8} {:<6} 0x{:08x} {} bytes",
            frame.offset, frame.connection_type, frame.packet_type, frame.payload_len
        );
    }
    if report.trailing_bytes > 0 {
        println!("trailing: {} bytes (partial frame)", report.trailing_bytes);
    }
    if let Some(error) = &report.error {
        println!("stopped: {error}");
    }
}
