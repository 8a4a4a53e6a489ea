use anyhow::{bail, Context as _, Result};
use il2p_core::{Context, Il2pError, SampleBuffer, Transmitter};
use std::fs;
use tracing::{debug, info};

/// Samples produced per transmitter call
pub const BLOCK_SAMPLES: usize = 480;

pub fn execute(input: &str, output: &str, config: Option<&str>) -> Result<()> {
    info!("Modulating frames from {} to {}", input, output);

    let config = super::load_config(config)?;
    let sample_rate = config.sample_rate;
    let frames = super::load_frames(input)?;
    let samples = modulate(Context::new(config)?, &frames)?;

    let mut raw = Vec::with_capacity(samples.len() * 2);
    for s in &samples {
        raw.extend_from_slice(&s.to_le_bytes());
    }
    fs::write(output, &raw).with_context(|| format!("Failed to write output file: {}", output))?;

    info!(
        "Wrote {} samples ({:.2} s)",
        samples.len(),
        samples.len() as f64 / f64::from(sample_rate)
    );
    Ok(())
}

/// Run the transmitter until every frame and its tail have been sent
///
/// Time only advances through the samples produced, so while channel access
/// holds a transmission back the output carries silence.
pub fn modulate(mut ctx: Context, frames: &[bytes::Bytes]) -> Result<Vec<i16>> {
    let mut tx = Transmitter::new(&ctx.config);
    let mut samples = Vec::new();
    let mut pending = frames.iter().enumerate().peekable();

    loop {
        while let Some((i, frame)) = pending.peek() {
            match tx.write_frame(&ctx, frame) {
                Ok(queued) => {
                    debug!("Queued frame {} ({} bytes)", i, queued);
                    pending.next();
                }
                Err(Il2pError::FifoFull { needed, .. }) if !tx.is_idle() => {
                    debug!("FIFO full, {} bytes waiting", needed);
                    break;
                }
                Err(e) => bail!("Frame {} cannot be sent: {}", i, e),
            }
        }
        if pending.peek().is_none() && tx.is_idle() {
            break;
        }

        let mut block = SampleBuffer::with_limit(BLOCK_SAMPLES);
        tx.process(&mut ctx, &mut block);
        let produced = if block.is_empty() {
            samples.resize(samples.len() + BLOCK_SAMPLES, 0);
            BLOCK_SAMPLES
        } else {
            let len = block.len();
            samples.extend(block.drain());
            len
        };
        ctx.channel.tick(produced);
    }

    Ok(samples)
}
