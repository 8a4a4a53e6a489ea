use il2p_cli::commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "il2p")]
#[command(about = "IL2P - Improved Layer 2 Protocol codec for 4-level FSK packet radio", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode AX.25 frames into an IL2P byte stream
    Encode {
        /// Input JSON file (array of frames)
        #[arg(short, long)]
        input: String,

        /// Output file for the byte stream
        #[arg(short, long)]
        output: String,

        /// Use 16 parity symbols per block
        #[arg(long)]
        max_fec: bool,

        /// Append the CRC trailer
        #[arg(long)]
        crc: bool,

        /// Use the 4-byte sync word
        #[arg(long)]
        short_sync: bool,
    },

    /// Scan a byte stream and recover frames
    Scan {
        /// Input file to scan
        #[arg(short, long)]
        input: String,

        /// Output JSON file for recovered frames
        #[arg(short, long)]
        output: Option<String>,

        /// Show statistics only
        #[arg(long)]
        stats_only: bool,

        /// Frames carry the CRC trailer
        #[arg(long)]
        crc: bool,

        /// Look for the 4-byte sync word
        #[arg(long)]
        short_sync: bool,
    },

    /// Modulate frames into 16-bit little-endian samples
    Modulate {
        /// Input JSON file (array of frames)
        #[arg(short, long)]
        input: String,

        /// Output file for raw samples
        #[arg(short, long)]
        output: String,

        /// Modem configuration (JSON)
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Demodulate 16-bit little-endian samples
    Demod {
        /// Input file with raw samples
        #[arg(short, long)]
        input: String,

        /// Output JSON file for received frames
        #[arg(short, long)]
        output: Option<String>,

        /// Modem configuration (JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// Negate every sample before decoding
        #[arg(long)]
        invert: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Execute command
    match cli.command {
        Commands::Encode {
            input,
            output,
            max_fec,
            crc,
            short_sync,
        } => commands::encode::execute(&input, &output, max_fec, crc, short_sync),

        Commands::Scan {
            input,
            output,
            stats_only,
            crc,
            short_sync,
        } => commands::scan::execute(&input, output.as_deref(), stats_only, crc, short_sync),

        Commands::Modulate {
            input,
            output,
            config,
        } => commands::modulate::execute(&input, &output, config.as_deref()),

        Commands::Demod {
            input,
            output,
            config,
            invert,
        } => commands::demod::execute(&input, output.as_deref(), config.as_deref(), invert),
    }
}
