use super::RecoveredFrame;
use anyhow::{Context, Result};
use il2p_core::{
    scanner::{scan_stream_with_stats, ScanOptions},
    SyncKind,
};
use std::fs;
use tracing::info;

pub fn execute(
    input: &str,
    output: Option<&str>,
    stats_only: bool,
    crc: bool,
    short_sync: bool,
) -> Result<()> {
    info!("Scanning file: {}", input);

    // Read input file
    let data = fs::read(input).with_context(|| format!("Failed to read input file: {}", input))?;

    info!("File size: {} bytes", data.len());

    let options = ScanOptions {
        crc,
        sync: if short_sync {
            SyncKind::Short
        } else {
            SyncKind::Long
        },
    };
    let (located_frames, stats) = scan_stream_with_stats(&data, &options);

    // Print statistics
    println!("\n=== Scan Results ===");
    println!("Bytes scanned:     {} bytes", stats.bytes_scanned);
    println!("Sync words found:  {}", stats.syncs_found);
    println!("Valid frames:      {}", stats.frames_found);
    println!("Decode failures:   {}", stats.decode_failures);
    println!("Symbols corrected: {}", stats.corrected_symbols);
    println!("Bytes recovered:   {} bytes", stats.bytes_recovered);
    println!("Recovery rate:     {:.2}%", stats.recovery_rate());
    println!();

    if stats_only {
        return Ok(());
    }

    let recovered: Vec<RecoveredFrame> = located_frames
        .iter()
        .map(|lf| RecoveredFrame::from_decoded(lf.offset, &lf.frame))
        .collect();

    if let Some(output_path) = output {
        super::write_json(output_path, &recovered)?;
    } else {
        println!("=== Recovered Frames ===");
        for frame in &recovered {
            println!("@ offset {}: {}", frame.position, frame.summary());
        }
    }

    Ok(())
}
