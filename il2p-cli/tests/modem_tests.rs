use std::fs;
use tempfile::tempdir;

use il2p_cli::commands::{demod, modulate};
use il2p_cli::FrameInput;
use il2p_core::{Context, ModemConfig};

fn frames() -> Vec<bytes::Bytes> {
    ["first", "second", "third"]
        .iter()
        .map(|info| {
            FrameInput::Ui {
                dest: "APRS".into(),
                source: "N0CALL-7".into(),
                via: Vec::new(),
                info: (*info).into(),
            }
            .to_ax25()
            .unwrap()
        })
        .collect()
}

#[test]
fn test_modulate_demodulate_in_memory() {
    let config = ModemConfig::il2p_crc();
    let frames = frames();
    let samples = modulate::modulate(Context::new(config.clone()).unwrap(), &frames).unwrap();

    let (received, stats) = demod::demodulate(Context::new(config).unwrap(), &samples, false);
    assert_eq!(received, frames);
    assert_eq!(stats.dropped(), 0);
}

#[test]
fn test_half_duplex_waits_in_silence() {
    let config = ModemConfig::default();
    assert!(!config.duplex);
    let frames = frames();
    let samples = modulate::modulate(Context::new(config.clone()).unwrap(), &frames).unwrap();

    // At the default persistence the generator first allows a key-up in the
    // fifth slot
    let slot = config.slot_samples();
    assert!(samples[..slot].iter().all(|&s| s == 0));
    let (received, _) = demod::demodulate(Context::new(config).unwrap(), &samples, false);
    assert_eq!(received, frames);
}

#[test]
fn test_modulate_demod_files() {
    let td = tempdir().unwrap();
    let input = td.path().join("frames.json");
    let config_path = td.path().join("modem.json");
    let samples = td.path().join("samples.raw");
    let output = td.path().join("received.json");

    fs::write(
        &input,
        r#"[{"dest": "CQ", "source": "N0CALL", "info": "hello world"}]"#,
    )
    .unwrap();
    fs::write(&config_path, r#"{"sync": "short", "crc": true, "duplex": true}"#).unwrap();

    modulate::execute(
        input.to_str().unwrap(),
        samples.to_str().unwrap(),
        Some(config_path.to_str().unwrap()),
    )
    .unwrap();
    assert_eq!(fs::metadata(&samples).unwrap().len() % 2, 0);

    demod::execute(
        samples.to_str().unwrap(),
        Some(output.to_str().unwrap()),
        Some(config_path.to_str().unwrap()),
        false,
    )
    .unwrap();

    let frames: Vec<serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["info"], "hello world");
}

#[test]
fn test_demod_inverted_file() {
    let td = tempdir().unwrap();
    let input = td.path().join("frames.json");
    let samples = td.path().join("samples.raw");
    let output = td.path().join("received.json");
    let config = ModemConfig {
        duplex: true,
        ..ModemConfig::default()
    };
    let config_path = td.path().join("modem.json");
    fs::write(&config_path, serde_json::to_string(&config).unwrap()).unwrap();
    fs::write(&input, r#"[{"dest": "CQ", "source": "N0CALL", "info": "flipped"}]"#).unwrap();

    modulate::execute(
        input.to_str().unwrap(),
        samples.to_str().unwrap(),
        Some(config_path.to_str().unwrap()),
    )
    .unwrap();

    // Flip polarity on disk, then undo it with --invert
    let raw = fs::read(&samples).unwrap();
    let flipped: Vec<u8> = raw
        .chunks_exact(2)
        .flat_map(|b| (-i16::from_le_bytes([b[0], b[1]])).to_le_bytes())
        .collect();
    fs::write(&samples, flipped).unwrap();

    demod::execute(
        samples.to_str().unwrap(),
        Some(output.to_str().unwrap()),
        Some(config_path.to_str().unwrap()),
        true,
    )
    .unwrap();

    let frames: Vec<serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(frames.len(), 1);
}

#[test]
fn test_demod_rejects_odd_length() {
    let td = tempdir().unwrap();
    let samples = td.path().join("odd.raw");
    fs::write(&samples, [0u8; 3]).unwrap();
    assert!(demod::execute(samples.to_str().unwrap(), None, None, false).is_err());
}
