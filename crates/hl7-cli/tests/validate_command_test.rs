use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const ADMISSION: &str = "MSH|^~\\&|ADT1|GOOD HEALTH HOSPITAL|GHH LAB|GHH|20230101120000||ADT^A01^ADT_A01|MSG00001|P|2.5\r\
EVN|A01|20230101120000\r\
PID|1||PATID1234^^^GOOD HEALTH HOSPITAL^MR||EVERYMAN^ADAM^A||19610615|M\r\
PV1|1|I|2000^2012^01";

// PID-7 is not a timestamp: a data type warning and nothing else.
const ADMISSION_WITH_WARNING: &str = "MSH|^~\\&|ADT1|GOOD HEALTH HOSPITAL|GHH LAB|GHH|20230101120000||ADT^A01^ADT_A01|MSG00003|P|2.5\r\
EVN|A01|20230101120000\r\
PID|1||PATID1234^^^GOOD HEALTH HOSPITAL^MR||EVERYMAN^ADAM^A||06/15/1961|M\r\
PV1|1|I|2000^2012^01";

const NO_HEADER: &str = "PID|1||PATID1234||EVERYMAN^ADAM";

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

fn assert_exit_code(output: &Output, expected: i32) {
    let actual = output.status.code().unwrap_or(-1);
    assert_eq!(
        actual,
        expected,
        "unexpected exit code; stdout: {}; stderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn validate_returns_success_for_clean_admission() {
    let input = write_temp_file(".hl7", ADMISSION.as_bytes());
    let output = run_hl7(&["validate", &path_arg(input.path())]);

    assert_exit_code(&output, 0);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Message 1 ADT^A01^ADT_A01 [MSG00001]: valid"));
    assert!(stdout.contains("Validation summary: messages=1, valid=1, errors=0, warnings=0"));
}

#[test]
fn validate_returns_failure_exit_code_for_errors() {
    let input = write_temp_file(".hl7", format!("{NO_HEADER}\n").as_bytes());
    let output = run_hl7(&["validate", &path_arg(input.path())]);

    assert_exit_code(&output, 1);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("First segment must be MSH, found PID"));
    assert!(stdout.contains("errors=1"));
}

#[test]
fn warnings_only_fail_under_strict() {
    let input = write_temp_file(".hl7", ADMISSION_WITH_WARNING.as_bytes());

    let lenient = run_hl7(&["validate", &path_arg(input.path())]);
    assert_exit_code(&lenient, 0);
    let stdout = String::from_utf8_lossy(&lenient.stdout);
    assert!(stdout.contains("does not match data type TS"), "{stdout}");
    assert!(stdout.contains("errors=0, warnings=1"), "{stdout}");

    let strict = run_hl7(&["validate", &path_arg(input.path()), "--strict"]);
    assert_exit_code(&strict, 1);
}

#[test]
fn validate_json_format() {
    let input = write_temp_file(".hl7", format!("{NO_HEADER}\n{ADMISSION}\n").as_bytes());
    let output = run_hl7(&["validate", &path_arg(input.path()), "--format", "json"]);

    assert_exit_code(&output, 1);

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should contain valid JSON");
    assert_eq!(report["message_count"], 2);
    assert_eq!(report["valid_count"], 1);
    assert_eq!(report["messages"][0]["findings"][0]["level"], "ERROR");
    assert_eq!(report["messages"][1]["valid"], true);
}

#[test]
fn custom_schema_adds_required_segment() {
    let input = write_temp_file(".hl7", ADMISSION.as_bytes());
    let schema = write_temp_file(
        ".yaml",
        br#"
segments:
  - name: ZPI
    fields:
      - { position: 1, name: Set ID, data_type: SI, required: true }
messages:
  - { message_type: "ADT^A01", required_segments: [MSH, EVN, PID, PV1, ZPI] }
"#,
    );

    let output = run_hl7(&[
        "validate",
        &path_arg(input.path()),
        "--schema",
        &path_arg(schema.path()),
    ]);

    assert_exit_code(&output, 1);
    assert!(String::from_utf8_lossy(&output.stdout).contains("Required segment ZPI is missing"));
}

#[test]
fn invalid_schema_returns_config_exit_code() {
    let input = write_temp_file(".hl7", ADMISSION.as_bytes());
    let schema = write_temp_file(".json", b"{ not json");

    let output = run_hl7(&[
        "validate",
        &path_arg(input.path()),
        "-s",
        &path_arg(schema.path()),
    ]);

    assert_exit_code(&output, 3);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR:"), "{stderr}");
    assert!(stderr.contains("Failed to load schema"), "{stderr}");
}

#[test]
fn missing_schema_returns_config_exit_code() {
    let input = write_temp_file(".hl7", ADMISSION.as_bytes());
    let output = run_hl7(&[
        "validate",
        &path_arg(input.path()),
        "-s",
        "/nonexistent/schema.yaml",
    ]);

    assert_exit_code(&output, 3);
}
