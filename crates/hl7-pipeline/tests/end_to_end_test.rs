//! End-to-end tests: bytes on disk to validated collections

use hl7_ir::{FindingKind, ValidationLevel};
use hl7_parser::Hl7Serializer;
use hl7_pipeline::{BatchConfig, BatchProcessor, CollectionLoader};
use hl7_schema::SchemaRegistry;
use std::io::Write;
use std::sync::Arc;

const ADMISSION: &str = "MSH|^~\\&|ADT1|GOOD HEALTH HOSPITAL|GHH LAB|GHH|20230101120000||ADT^A01^ADT_A01|MSG00001|P|2.5\r\
EVN|A01|20230101120000\r\
PID|1||PATID1234^^^GOOD HEALTH HOSPITAL^MR||EVERYMAN^ADAM^A||19610615|M\r\
PV1|1|I|2000^2012^01";

const RESULT: &str = "MSH|^~\\&|LAB|GHH|EHR|GHH|20230102090000||ORU^R01|MSG00002|P|2.5\r\
PID|1||PATID1234||EVERYMAN^ADAM\r\
OBR|1|845439|1045813|88304\r\
OBX|1|NM|GLU^Glucose||105|mg/dL|70-110|N|||F";

fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file
}

fn registry() -> Arc<SchemaRegistry> {
    Arc::new(SchemaRegistry::builtin().unwrap())
}

#[test]
fn test_file_to_validated_collection() -> anyhow::Result<()> {
    let file = write_temp(format!("{ADMISSION}\r\n\r\n{RESULT}\r\n").as_bytes());
    let processor = BatchProcessor::new(BatchConfig::default().workers(2), registry())?;

    let collection = processor.process_file(file.path())?;
    assert_eq!(collection.len(), 2);
    assert_eq!(collection.provenance().encoding, "utf-8");
    assert_eq!(collection.message_types(), vec!["ADT^A01^ADT_A01", "ORU^R01"]);

    let admission = collection.get(0).unwrap();
    assert!(admission.findings().is_empty(), "{:?}", admission.findings());

    let result = collection.get(1).unwrap();
    assert!(result.is_valid(), "{:?}", result.findings());
    assert_eq!(result.navigate("OBX.3.2")?.as_deref(), Some("Glucose"));
    Ok(())
}

#[test]
fn test_reserialized_messages_rebuild_the_blob() -> anyhow::Result<()> {
    let blob = format!("{ADMISSION}\r\r{RESULT}");
    let collection = CollectionLoader::new().load_bytes(blob.as_bytes());
    assert_eq!(Hl7Serializer::new().serialize_collection(&collection), blob);
    Ok(())
}

#[test]
fn test_latin1_file_with_forced_encoding() -> anyhow::Result<()> {
    let mut bytes = b"MSH|^~\\&|A||||||ADT^A08|1|P|2.5\rPID|1||42||M".to_vec();
    bytes.push(0xFC);
    bytes.extend_from_slice(b"LLER^J\xD6RG");
    let file = write_temp(&bytes);

    let processor = BatchProcessor::new(
        BatchConfig::default().workers(1).encoding("iso-8859-1"),
        registry(),
    )?;
    let collection = processor.process_file(file.path())?;
    assert_eq!(collection.provenance().encoding, "windows-1252");
    assert_eq!(
        collection.get(0).unwrap().navigate("PID.5")?.as_deref(),
        Some("MüLLER^JÖRG")
    );
    Ok(())
}

#[test]
fn test_invalid_utf8_is_replaced_not_fatal() -> anyhow::Result<()> {
    let file = write_temp(b"MSH|^~\\&|A||||||ADT^A08|1|P|2.5\rPID|1||42||\xFF\xFE\xFD");
    let collection = CollectionLoader::new().load_file(file.path())?;
    let name = collection.get(0).unwrap().navigate("PID.5")?.unwrap_or_default();
    assert!(name.contains('\u{FFFD}'));
    Ok(())
}

#[test]
fn test_mixed_batch_report() -> anyhow::Result<()> {
    let blob = format!("garbage without header\n{ADMISSION}\nMSH|^~\\&|X\r|nameless\n{RESULT}");
    let processor = BatchProcessor::new(BatchConfig::default().workers(3), registry())?;
    let mut collection = processor.process_text(&blob);
    let report = processor.validate_collection(&mut collection);

    assert_eq!(report.message_count, 4);
    assert_eq!(report.valid_count, 2);
    assert_eq!(report.count(ValidationLevel::Critical), 0);

    let first = &report.messages[0].findings;
    assert_eq!(
        first.iter().filter(|f| f.kind == FindingKind::HeaderMissing).count(),
        1
    );
    let third = &report.messages[2].findings;
    assert!(third.iter().any(|f| f.kind == FindingKind::UnnamedSegment));
    assert!(third.iter().any(|f| f.kind == FindingKind::RequiredFieldMissing));
    Ok(())
}

#[test]
fn test_missing_file() {
    let processor = BatchProcessor::new(BatchConfig::default().workers(1), registry()).unwrap();
    let error = processor
        .process_file(std::path::Path::new("/nonexistent/batch.hl7"))
        .unwrap_err();
    assert!(error.to_string().contains("/nonexistent/batch.hl7"));
}
