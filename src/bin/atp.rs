//! ATP CLI binary.
//!
//! Inspect and exercise the ATP framing engine.
//!
//! # Commands
//!
//! - `split` - Show how an input is cut into frames
//! - `loopback` - Run a full initiator/responder round trip in-process
//! - `config` - Print the effective configuration

use std::io::{self, Read};
use std::path::PathBuf;

use atp::{
    config::{Config, FramingConfig},
    protocol::{Initiator, Responder},
    transport::LoopbackTransport,
    Framer, Result as AtpResult, VERSION,
};
use bytes::Bytes;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;

#[derive(Parser)]
#[command(name = "atp")]
#[command(version = VERSION)]
#[command(about = "ATP - bounded-packet framing protocol engine", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/atp/config.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the frame layout of an input
    Split {
        /// Input text (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Packet size including the frame header (default: request_packet_size)
        #[arg(short, long)]
        packet_size: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send an input through an in-process responder and print the response
    Loopback {
        /// Input text (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// What the responder does with the request
        #[arg(long, value_enum, default_value = "echo")]
        processor: ProcessorKind,

        /// Print session statistics
        #[arg(short, long)]
        stats: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProcessorKind {
    /// Return the request unchanged
    Echo,
    /// Return the request bytes in reverse order
    Reverse,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = load_config(cli.config)?;

    match cli.command {
        Commands::Split {
            input,
            file,
            packet_size,
            json,
        } => cmd_split(&config.framing, input, file, packet_size, json),

        Commands::Loopback {
            input,
            file,
            processor,
            stats,
        } => cmd_loopback(&config.framing, input, file, processor, stats),

        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        },
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    let file_config = match path {
        Some(path) => Config::from_file(path)?,
        None => match Config::default_path().filter(|p| p.exists()) {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                Config::from_file(path)?
            },
            None => Config::default(),
        },
    };

    let config = file_config.merge(Config::from_env());
    config.framing.validate()?;
    Ok(config)
}

fn cmd_split(
    framing: &FramingConfig,
    input: Option<String>,
    file: Option<PathBuf>,
    packet_size: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let content = read_input(input, file)?;
    let packet_size = packet_size.unwrap_or(framing.request_packet_size);
    let framing = FramingConfig {
        request_packet_size: packet_size,
        ..framing.clone()
    };
    framing.validate()?;

    let framer = Framer::new(framing.request_payload_size())?;
    let queue = framer.split(Bytes::from(content))?;

    if json {
        let frames: Vec<_> = queue
            .iter()
            .map(|frame| {
                json!({
                    "frame_number": frame.header.frame_number,
                    "frame_offset": frame.header.frame_offset,
                    "frame_length": frame.header.frame_length,
                    "buffer_length": frame.header.buffer_length,
                    "flags": frame.flags().to_string(),
                })
            })
            .collect();
        let output = json!({
            "packet_size": packet_size,
            "payload_size": framer.max_payload(),
            "frames": frames,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "{} frames (packet {} bytes, payload {} bytes)",
            queue.len(),
            packet_size,
            framer.max_payload()
        );
        for frame in &queue {
            println!("  {}", frame.header);
        }
    }

    Ok(())
}

fn cmd_loopback(
    framing: &FramingConfig,
    input: Option<String>,
    file: Option<PathBuf>,
    processor: ProcessorKind,
    stats: bool,
) -> anyhow::Result<()> {
    let content = read_input(input, file)?;

    let process = move |request: &[u8]| -> AtpResult<Vec<u8>> {
        Ok(match processor {
            ProcessorKind::Echo => request.to_vec(),
            ProcessorKind::Reverse => request.iter().rev().copied().collect(),
        })
    };

    let responder = Responder::new(process, framing)?;
    let mut initiator = Initiator::new(LoopbackTransport::new(responder), framing)?;

    let response = initiator.send(content)?;
    println!("{}", String::from_utf8_lossy(&response));

    if stats {
        let transport = initiator.transport();
        let report = json!({
            "round_trips": transport.round_trips(),
            "initiator": initiator.stats(),
            "responder": transport.responder().stats(),
        });
        eprintln!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

fn read_input(input: Option<String>, file: Option<PathBuf>) -> anyhow::Result<Vec<u8>> {
    if let Some(path) = file {
        Ok(std::fs::read(path)?)
    } else if let Some(s) = input {
        if s == "-" {
            read_stdin()
        } else {
            Ok(s.into_bytes())
        }
    } else {
        read_stdin()
    }
}

fn read_stdin() -> anyhow::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    io::stdin().read_to_end(&mut buffer)?;
    Ok(buffer)
}
