use std::fs;
use tempfile::tempdir;

use il2p_cli::commands::{encode, scan};

const FRAMES_JSON: &str = r#"[
    {"dest": "APRS", "source": "N0CALL-9", "info": "!4903.50N/07201.75W-Test"},
    {"dest": "CQ", "source": "N0CALL", "via": ["WIDE1-1"], "info": "via a digipeater"},
    {"raw": "968264888aaee4969668908a946fb1"}
]"#;

fn write_input(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("frames.json");
    fs::write(&path, FRAMES_JSON).unwrap();
    path
}

#[test]
fn test_encode_then_scan() {
    let td = tempdir().unwrap();
    let input = write_input(td.path());
    let stream = td.path().join("frames.il2p");
    let output = td.path().join("recovered.json");

    encode::execute(input.to_str().unwrap(), stream.to_str().unwrap(), false, false, false).unwrap();
    assert!(stream.exists());

    scan::execute(
        stream.to_str().unwrap(),
        Some(output.to_str().unwrap()),
        false,
        false,
        false,
    )
    .unwrap();

    let json = fs::read_to_string(&output).unwrap();
    let frames: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0]["header_type"], "Type1");
    assert_eq!(frames[0]["source"], "N0CALL-9");
    assert_eq!(frames[0]["info"], "!4903.50N/07201.75W-Test");
    assert_eq!(frames[1]["header_type"], "Type0");
    assert_eq!(frames[2]["raw"], "968264888aaee4969668908a946fb1");
}

#[test]
fn test_encode_max_fec_crc_short_sync() {
    let td = tempdir().unwrap();
    let input = write_input(td.path());
    let stream = td.path().join("frames.il2p");
    let output = td.path().join("recovered.json");

    encode::execute(input.to_str().unwrap(), stream.to_str().unwrap(), true, true, true).unwrap();
    scan::execute(
        stream.to_str().unwrap(),
        Some(output.to_str().unwrap()),
        false,
        true,
        true,
    )
    .unwrap();

    let frames: Vec<serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(frames.len(), 3);
}

#[test]
fn test_scan_recovers_after_damage() {
    let td = tempdir().unwrap();
    let input = write_input(td.path());
    let stream = td.path().join("frames.il2p");
    let output = td.path().join("recovered.json");

    encode::execute(input.to_str().unwrap(), stream.to_str().unwrap(), false, false, false).unwrap();

    // Single byte errors in the first frame are within the FEC budget
    let mut data = fs::read(&stream).unwrap();
    data[20] ^= 0xFF;
    data[30] ^= 0x01;
    fs::write(&stream, &data).unwrap();

    scan::execute(
        stream.to_str().unwrap(),
        Some(output.to_str().unwrap()),
        false,
        false,
        false,
    )
    .unwrap();

    let frames: Vec<serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0]["corrected"], 2);
}

#[test]
fn test_scan_stats_only() {
    let td = tempdir().unwrap();
    let input = write_input(td.path());
    let stream = td.path().join("frames.il2p");

    encode::execute(input.to_str().unwrap(), stream.to_str().unwrap(), false, false, false).unwrap();

    // Should complete successfully without creating output file
    scan::execute(stream.to_str().unwrap(), None, true, false, false).unwrap();
}

#[test]
fn test_encode_rejects_bad_input() {
    let td = tempdir().unwrap();
    let input = td.path().join("bad.json");
    let stream = td.path().join("out.il2p");

    fs::write(&input, r#"[{"dest": "not a call!", "source": "N0CALL"}]"#).unwrap();
    assert!(encode::execute(input.to_str().unwrap(), stream.to_str().unwrap(), false, false, false).is_err());

    fs::write(&input, r#"[{"raw": "zz"}]"#).unwrap();
    assert!(encode::execute(input.to_str().unwrap(), stream.to_str().unwrap(), false, false, false).is_err());

    assert!(scan::execute("/nonexistent/file.il2p", None, false, false, false).is_err());
}
