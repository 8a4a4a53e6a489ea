use anyhow::{Context, Result};
use il2p_core::{
    constants::PREAMBLE_BYTE,
    encoder::{EncodeOptions, Encoder},
    FecLevel, SyncKind,
};
use std::fs;
use tracing::info;

/// Idle bytes written ahead of each sync word
pub const STREAM_PREAMBLE_BYTES: usize = 8;

pub fn execute(input: &str, output: &str, max_fec: bool, crc: bool, short_sync: bool) -> Result<()> {
    info!("Encoding frames from {} to {}", input, output);

    let frames = super::load_frames(input)?;
    let encoder = Encoder::new(EncodeOptions {
        fec: if max_fec { FecLevel::Max } else { FecLevel::Normal },
        crc,
    });
    let sync = if short_sync {
        SyncKind::Short
    } else {
        SyncKind::Long
    };

    let mut output_data = Vec::new();
    for (i, ax25) in frames.iter().enumerate() {
        let encoded = encoder
            .encode(ax25)
            .with_context(|| format!("Failed to encode frame {}", i))?;

        output_data.extend(std::iter::repeat(PREAMBLE_BYTE).take(STREAM_PREAMBLE_BYTES));
        output_data.extend_from_slice(sync.bytes());
        output_data.extend_from_slice(&encoded);

        info!(
            "Encoded frame {} ({} AX.25 bytes, {} on air, {:?})",
            i,
            ax25.len(),
            encoded.len(),
            encoder.header_type(ax25)?
        );
    }

    fs::write(output, &output_data)
        .with_context(|| format!("Failed to write output file: {}", output))?;

    info!(
        "Successfully encoded {} frames ({} bytes total)",
        frames.len(),
        output_data.len()
    );

    Ok(())
}
