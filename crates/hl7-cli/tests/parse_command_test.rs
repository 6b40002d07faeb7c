use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const ADMISSION: &str = "MSH|^~\\&|ADT1|GOOD HEALTH HOSPITAL|GHH LAB|GHH|20230101120000||ADT^A01^ADT_A01|MSG00001|P|2.5\r\
EVN|A01|20230101120000\r\
PID|1||PATID1234^^^GOOD HEALTH HOSPITAL^MR||EVERYMAN^ADAM^A||19610615|M\r\
PV1|1|I|2000^2012^01";

const RESULT: &str = "MSH|^~\\&|LAB|GHH|EHR|GHH|20230102090000||ORU^R01|MSG00002|P|2.5\r\
PID|1||PATID1234||EVERYMAN^ADAM\r\
OBR|1|845439|1045813|88304\r\
OBX|1|NM|GLU^Glucose||105|mg/dL|70-110|N|||F";

fn cargo_bin() -> PathBuf {
    if let Ok(path) = env::var("CARGO_BIN_EXE_hl7") {
        return PathBuf::from(path);
    }

    let target_dir = env::var("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| repo_root().join("target"));
    let executable_name = format!("hl7{}", std::env::consts::EXE_SUFFIX);
    let fallback = target_dir.join("debug").join(executable_name);

    if fallback.exists() {
        return fallback;
    }

    panic!(
        "CARGO_BIN_EXE_hl7 is not set and fallback binary was not found at {}",
        fallback.display()
    );
}

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn write_temp_file(extension: &str, content: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("hl7-cli-")
        .suffix(extension)
        .tempfile()
        .expect("temporary file should be created");
    file.write_all(content).expect("temporary file should be writable");
    file
}

fn run_hl7(args: &[&str]) -> Output {
    Command::new(cargo_bin())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run hl7")
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[test]
fn parse_command_outputs_json_to_stdout() {
    let input = write_temp_file(".hl7", format!("{ADMISSION}\n{RESULT}\n").as_bytes());

    let output = run_hl7(&["parse", &path_arg(input.path()), "--pretty"]);

    assert!(
        output.status.success(),
        "expected parse to succeed; stdout: {}; stderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout should be UTF-8");
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("stdout should contain valid JSON");
    let messages = parsed["messages"]
        .as_array()
        .expect("parse output should carry a messages array");
    assert_eq!(messages.len(), 2);
    assert!(messages.iter().all(|m| m.get("segments").is_some()));
    assert_eq!(parsed["provenance"]["encoding"], "utf-8");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Parse summary: messages=2, errors=0"), "{stderr}");
}

#[test]
fn parse_command_keeps_nameless_records() {
    let input = write_temp_file(".hl7", format!("{ADMISSION}\nMSH|^~\\&|X\r|nameless\n").as_bytes());

    let output = run_hl7(&["parse", &path_arg(input.path())]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).expect("stdout should be UTF-8");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let segments = parsed["messages"][1]["segments"]
        .as_array()
        .expect("second message should carry segments");
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[1]["name"], "");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Parse summary: messages=2, errors=0"), "{stderr}");
}

#[test]
fn parse_command_honours_forced_encoding() {
    let mut bytes = b"MSH|^~\\&|A||||||ADT^A08|1|P|2.5\rPID|1||42||M".to_vec();
    bytes.push(0xFC);
    bytes.extend_from_slice(b"LLER");
    let input = write_temp_file(".hl7", &bytes);

    let output = run_hl7(&["--encoding", "latin1", "parse", &path_arg(input.path())]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout should be UTF-8");
    assert!(stdout.contains("MüLLER"));
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(parsed["provenance"]["encoding"], "windows-1252");
}

#[test]
fn types_command_lists_distinct_types() {
    let input = write_temp_file(
        ".hl7",
        format!("{RESULT}\n{ADMISSION}\n{RESULT}\n").as_bytes(),
    );

    let output = run_hl7(&["types", &path_arg(input.path())]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let types: Vec<&str> = stdout.lines().collect();
    assert_eq!(types, vec!["ADT^A01^ADT_A01", "ORU^R01"]);
}

#[test]
fn missing_input_returns_read_exit_code() {
    let output = run_hl7(&["parse", "/nonexistent/input.hl7"]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR:"), "{stderr}");
    assert!(stderr.contains("/nonexistent/input.hl7"), "{stderr}");
}

#[test]
fn generous_timeout_does_not_interfere() {
    let input = write_temp_file(".hl7", ADMISSION.as_bytes());

    let output = run_hl7(&["--timeout-secs", "60", "types", &path_arg(input.path())]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "ADT^A01^ADT_A01");
}
