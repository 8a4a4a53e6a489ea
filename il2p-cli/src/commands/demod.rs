use super::RecoveredFrame;
use anyhow::{bail, Context as _, Result};
use colored::*;
use il2p_core::{Context, FrameCollector, Receiver, RxStats};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use tracing::info;

/// Samples handed to the receiver per call
pub const BLOCK_SAMPLES: usize = 480;

pub fn execute(input: &str, output: Option<&str>, config: Option<&str>, invert: bool) -> Result<()> {
    info!("Demodulating samples from {}", input);

    let config = super::load_config(config)?;
    let raw = fs::read(input).with_context(|| format!("Failed to read input file: {}", input))?;
    if raw.len() % 2 != 0 {
        bail!("Sample file has an odd length ({} bytes)", raw.len());
    }
    let samples: Vec<i16> = raw
        .chunks_exact(2)
        .map(|b| {
            let s = i16::from_le_bytes([b[0], b[1]]);
            if invert {
                s.saturating_neg()
            } else {
                s
            }
        })
        .collect();

    info!(
        "{} samples ({:.2} s at {} Hz)",
        samples.len(),
        samples.len() as f64 / f64::from(config.sample_rate),
        config.sample_rate
    );

    let (frames, stats) = demodulate(Context::new(config)?, &samples, true);

    println!("\n=== Receiver Results ===");
    println!("Sync words:          {}", stats.syncs);
    println!("Frames delivered:    {}", stats.frames.to_string().green());
    print_drop("Header failures:", stats.header_failures);
    print_drop("Payload failures:", stats.payload_failures);
    print_drop("Spurious corrections:", stats.spurious_corrections);
    print_drop("CRC failures:", stats.crc_failures);
    println!("Symbols corrected:   {}", stats.corrected_symbols);

    if stats.dropped() == 0 && stats.frames > 0 {
        println!("{} Every detected frame was decoded", "✓".green());
    } else if stats.frames == 0 {
        println!("{} No frames decoded", "✗".red());
    } else {
        println!("{} {} frames dropped", "✗".red(), stats.dropped());
    }
    println!();

    let recovered: Vec<RecoveredFrame> = frames
        .iter()
        .enumerate()
        .map(|(i, packet)| RecoveredFrame::from_packet(i, packet))
        .collect();

    if let Some(output_path) = output {
        super::write_json(output_path, &recovered)?;
    } else {
        println!("=== Received Frames ===");
        for frame in &recovered {
            println!("#{}: {}", frame.position, frame.summary());
        }
    }

    Ok(())
}

/// Feed samples through a receiver in fixed blocks
pub fn demodulate(
    mut ctx: Context,
    samples: &[i16],
    progress: bool,
) -> (Vec<bytes::Bytes>, RxStats) {
    let mut rx = Receiver::new(&ctx.config);
    let mut sink = FrameCollector::new();

    let bar = if progress {
        let bar = ProgressBar::new(samples.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner} [{bar:40}] {pos}/{len} samples {msg}")
        {
            bar.set_style(style.progress_chars("█▉▊▋▌▍▎▏ "));
        }
        bar
    } else {
        ProgressBar::hidden()
    };

    for block in samples.chunks(BLOCK_SAMPLES) {
        rx.push_samples(&mut ctx, block, &mut sink);
        bar.inc(block.len() as u64);
        bar.set_message(format!("{} frames", sink.frames.len()));
    }
    bar.finish_and_clear();

    (sink.frames, rx.stats())
}

fn print_drop(label: &str, count: usize) {
    if count > 0 {
        println!("{:<21}{}", label, count.to_string().red());
    } else {
        println!("{:<21}{}", label, count);
    }
}
