//! Builtin catalog: common segments, data types, message types and code tables

use crate::codetable::CodeTable;
use crate::model::{FieldDefinition as F, MessageDefinition, SegmentDefinition};

/// Data type tag to validation pattern
pub const DATA_TYPE_PATTERNS: &[(&str, &str)] = &[
    ("ST", r"^.{0,200}$"),
    ("TX", r"^.*$"),
    ("FT", r"^.*$"),
    ("NM", r"^[+-]?\d*\.?\d*$"),
    ("SI", r"^[+-]?\d{1,4}$"),
    ("ID", r"^[A-Z0-9]*$"),
    ("IS", r"^[A-Z0-9]*$"),
    ("DT", r"^\d{8}$"),
    ("TM", r"^\d{2,6}$"),
    ("TS", r"^\d{8,14}$"),
    ("HD", r"^.*$"),
    ("EI", r"^.*$"),
    ("CX", r"^.*$"),
    ("XPN", r"^.*$"),
    ("XAD", r"^.*$"),
    ("XTN", r"^.*$"),
    ("CE", r"^.*$"),
    ("CF", r"^.*$"),
    ("CNE", r"^.*$"),
    ("CWE", r"^.*$"),
];

pub const SEGMENT_DESCRIPTIONS: &[(&str, &str)] = &[
    ("MSH", "Message Header - Contains message routing and identification information"),
    ("EVN", "Event Type - Identifies the trigger event that initiated the message"),
    ("PID", "Patient Identification - Contains patient demographic information"),
    ("PD1", "Patient Additional Demographic - Additional patient demographic information"),
    ("NK1", "Next of Kin/Associated Parties - Information about patient's next of kin"),
    ("PV1", "Patient Visit - Information about the patient's visit or encounter"),
    ("PV2", "Patient Visit - Additional Information - Additional visit information"),
    ("OBR", "Observation Request - Information about the observation/test request"),
    ("OBX", "Observation/Result - Contains observation values and results"),
    ("NTE", "Notes and Comments - Free text notes and comments"),
    ("AL1", "Patient Allergy Information - Information about patient allergies"),
    ("DG1", "Diagnosis - Diagnosis information"),
    ("PR1", "Procedures - Procedure information"),
    ("GT1", "Guarantor - Financial guarantor information"),
    ("IN1", "Insurance - Primary insurance information"),
    ("IN2", "Insurance Additional Information - Additional insurance information"),
    ("IN3", "Insurance Additional Information, Certification - Insurance certification"),
    ("ACC", "Accident - Accident information"),
    ("UB1", "UB82 - UB82 billing information"),
    ("UB2", "UB92 Data - UB92 billing information"),
    ("MRG", "Merge Patient Information - Patient merge information"),
    ("PDA", "Patient Death and Autopsy - Death and autopsy information"),
];

pub const MESSAGE_CODES: &[(&str, &str)] = &[
    ("ADT", "Admit, Discharge, Transfer"),
    ("ORU", "Observation Result"),
    ("ORM", "Order Message"),
    ("ORR", "Order Response"),
    ("SIU", "Scheduling Information"),
    ("MDM", "Medical Document Management"),
    ("ACK", "General Acknowledgment"),
    ("QRY", "Query"),
    ("DSR", "Display Response"),
];

/// Builtin segment definitions
#[must_use]
pub fn segments() -> Vec<SegmentDefinition> {
    vec![msh(), pid(), pv1(), obx(), evn(), nk1()]
}

fn msh() -> SegmentDefinition {
    SegmentDefinition::new("MSH", "Message Header")
        .required()
        .with_field(F::new(1, "Field Separator", "ST").required().length(1, 1))
        .with_field(F::new(2, "Encoding Characters", "ST").required().length(4, 4))
        .with_field(F::new(3, "Sending Application", "HD").max_length(227))
        .with_field(F::new(4, "Sending Facility", "HD").max_length(227))
        .with_field(F::new(5, "Receiving Application", "HD").max_length(227))
        .with_field(F::new(6, "Receiving Facility", "HD").max_length(227))
        .with_field(F::new(7, "Date/Time of Message", "TS").max_length(26))
        .with_field(F::new(8, "Security", "ST").max_length(40))
        .with_field(F::new(9, "Message Type", "MSG").required().max_length(15))
        .with_field(F::new(10, "Message Control ID", "ST").required().max_length(20))
        .with_field(F::new(11, "Processing ID", "PT").required().max_length(3))
        .with_field(F::new(12, "Version ID", "VID").required().max_length(60))
        .with_field(F::new(13, "Sequence Number", "NM").max_length(15))
        .with_field(F::new(14, "Continuation Pointer", "ST").max_length(180))
        .with_field(F::new(15, "Accept Acknowledgment Type", "ID").max_length(2))
        .with_field(F::new(16, "Application Acknowledgment Type", "ID").max_length(2))
        .with_field(F::new(17, "Country Code", "ID").max_length(3))
        .with_field(F::new(18, "Character Set", "ID").repeatable().max_length(16))
        .with_field(F::new(19, "Principal Language of Message", "CE").max_length(250))
}

fn pid() -> SegmentDefinition {
    SegmentDefinition::new("PID", "Patient Identification")
        .required()
        .with_field(F::new(1, "Set ID - PID", "SI").max_length(4))
        .with_field(F::new(2, "Patient ID", "CX").max_length(20))
        .with_field(F::new(3, "Patient Identifier List", "CX").required().repeatable().max_length(250))
        .with_field(F::new(4, "Alternate Patient ID - PID", "CX").repeatable().max_length(20))
        .with_field(F::new(5, "Patient Name", "XPN").required().repeatable().max_length(250))
        .with_field(F::new(6, "Mother's Maiden Name", "XPN").repeatable().max_length(250))
        .with_field(F::new(7, "Date/Time of Birth", "TS").max_length(26))
        .with_field(F::new(8, "Administrative Sex", "IS").max_length(1).table("0001"))
        .with_field(F::new(9, "Patient Alias", "XPN").repeatable().max_length(250))
        .with_field(F::new(10, "Race", "CE").repeatable().max_length(250))
        .with_field(F::new(11, "Patient Address", "XAD").repeatable().max_length(250))
        .with_field(F::new(12, "County Code", "IS").max_length(4))
        .with_field(F::new(13, "Phone Number - Home", "XTN").repeatable().max_length(250))
        .with_field(F::new(14, "Phone Number - Business", "XTN").repeatable().max_length(250))
        .with_field(F::new(15, "Primary Language", "CE").max_length(250))
        .with_field(F::new(16, "Marital Status", "CE").max_length(250).table("0002"))
        .with_field(F::new(17, "Religion", "CE").max_length(250))
        .with_field(F::new(18, "Patient Account Number", "CX").max_length(250))
        .with_field(F::new(19, "SSN Number - Patient", "ST").max_length(16))
        .with_field(F::new(20, "Driver's License Number - Patient", "DLN").max_length(25))
}

fn pv1() -> SegmentDefinition {
    SegmentDefinition::new("PV1", "Patient Visit")
        .with_field(F::new(1, "Set ID - PV1", "SI").max_length(4))
        .with_field(F::new(2, "Patient Class", "IS").required().max_length(1).table("0004"))
        .with_field(F::new(3, "Assigned Patient Location", "PL").max_length(80))
        .with_field(F::new(4, "Admission Type", "IS").max_length(2).table("0007"))
        .with_field(F::new(5, "Preadmit Number", "CX").max_length(250))
        .with_field(F::new(6, "Prior Patient Location", "PL").max_length(80))
        .with_field(F::new(7, "Attending Doctor", "XCN").repeatable().max_length(250))
        .with_field(F::new(8, "Referring Doctor", "XCN").repeatable().max_length(250))
        .with_field(F::new(9, "Consulting Doctor", "XCN").repeatable().max_length(250))
        .with_field(F::new(10, "Hospital Service", "IS").max_length(3).table("0069"))
}

fn obx() -> SegmentDefinition {
    SegmentDefinition::new("OBX", "Observation/Result")
        .repeatable()
        .with_field(F::new(1, "Set ID - OBX", "SI").max_length(4))
        .with_field(F::new(2, "Value Type", "ID").max_length(2).table("0125"))
        .with_field(F::new(3, "Observation Identifier", "CE").required().max_length(250))
        .with_field(F::new(4, "Observation Sub-ID", "ST").max_length(20))
        .with_field(F::new(5, "Observation Value", "Varies").repeatable().max_length(99_999))
        .with_field(F::new(6, "Units", "CE").max_length(250))
        .with_field(F::new(7, "References Range", "ST").max_length(60))
        .with_field(F::new(8, "Abnormal Flags", "IS").repeatable().max_length(5).table("0078"))
        .with_field(F::new(9, "Probability", "NM").max_length(5))
        .with_field(F::new(10, "Nature of Abnormal Test", "ID").repeatable().max_length(2).table("0080"))
        .with_field(F::new(11, "Observation Result Status", "ID").required().max_length(1).table("0085"))
}

fn evn() -> SegmentDefinition {
    SegmentDefinition::new("EVN", "Event Type")
        .with_field(F::new(1, "Event Type Code", "ID").max_length(3))
        .with_field(F::new(2, "Recorded Date/Time", "TS").required().max_length(26))
        .with_field(F::new(3, "Date/Time Planned Event", "TS").max_length(26))
        .with_field(F::new(4, "Event Reason Code", "IS").max_length(3))
        .with_field(F::new(5, "Operator ID", "XCN").repeatable().max_length(250))
        .with_field(F::new(6, "Event Occurred", "TS").max_length(26))
}

fn nk1() -> SegmentDefinition {
    SegmentDefinition::new("NK1", "Next of Kin/Associated Parties")
        .repeatable()
        .with_field(F::new(1, "Set ID - NK1", "SI").required().max_length(4))
        .with_field(F::new(2, "Name", "XPN").repeatable().max_length(250))
        .with_field(F::new(3, "Relationship", "CE").max_length(250))
        .with_field(F::new(4, "Address", "XAD").repeatable().max_length(250))
        .with_field(F::new(5, "Phone Number", "XTN").repeatable().max_length(250))
}

/// Builtin message definitions
#[must_use]
pub fn messages() -> Vec<MessageDefinition> {
    let adt = |event: &str, description: &str| {
        MessageDefinition::new(format!("ADT^{event}"), description)
            .require("MSH")
            .require("EVN")
            .require("PID")
            .allow("NK1")
            .require("PV1")
    };

    vec![
        adt("A01", "Admit/Visit Notification"),
        adt("A04", "Register a Patient"),
        adt("A08", "Update Patient Information"),
        MessageDefinition::new("ORU^R01", "Unsolicited Observation Message")
            .require("MSH")
            .require("PID")
            .allow("PV1")
            .require("OBR")
            .require("OBX"),
        MessageDefinition::new("ACK", "General Acknowledgment")
            .require("MSH")
            .require("MSA"),
    ]
}

/// Builtin code tables
#[must_use]
pub fn code_tables() -> Vec<CodeTable> {
    vec![
        CodeTable::new("0001", "Administrative Sex").with_codes(&[
            ("F", "Female"),
            ("M", "Male"),
            ("O", "Other"),
            ("U", "Unknown"),
            ("A", "Ambiguous"),
            ("N", "Not applicable"),
        ]),
        CodeTable::new("0002", "Marital Status").with_codes(&[
            ("A", "Separated"),
            ("D", "Divorced"),
            ("M", "Married"),
            ("S", "Single"),
            ("W", "Widowed"),
            ("C", "Common law"),
            ("G", "Living together"),
            ("P", "Domestic partner"),
            ("R", "Registered domestic partner"),
            ("E", "Legally separated"),
            ("N", "Annulled"),
            ("I", "Interlocutory"),
            ("B", "Unmarried"),
            ("U", "Unknown"),
            ("O", "Other"),
            ("T", "Unreported"),
        ]),
        CodeTable::new("0004", "Patient Class").with_codes(&[
            ("E", "Emergency"),
            ("I", "Inpatient"),
            ("O", "Outpatient"),
            ("P", "Preadmit"),
            ("R", "Recurring patient"),
            ("B", "Obstetrics"),
            ("C", "Commercial account"),
            ("N", "Not applicable"),
            ("U", "Unknown"),
        ]),
        CodeTable::new("0007", "Admission Type").with_codes(&[
            ("A", "Accident"),
            ("E", "Emergency"),
            ("L", "Labor and delivery"),
            ("R", "Routine"),
            ("N", "Newborn"),
            ("U", "Urgent"),
            ("C", "Elective"),
        ]),
        CodeTable::new("0069", "Hospital Service").with_codes(&[
            ("CAR", "Cardiac Service"),
            ("MED", "Medical Service"),
            ("PUL", "Pulmonary Service"),
            ("SUR", "Surgical Service"),
            ("URO", "Urology Service"),
        ]),
        CodeTable::new("0078", "Abnormal Flags").with_codes(&[
            ("L", "Below low normal"),
            ("H", "Above high normal"),
            ("LL", "Below lower panic limits"),
            ("HH", "Above upper panic limits"),
            ("<", "Below absolute low-off instrument scale"),
            (">", "Above absolute high-off instrument scale"),
            ("N", "Normal"),
            ("A", "Abnormal"),
            ("AA", "Very abnormal"),
            ("null", "No range defined, or normal ranges don't apply"),
            ("U", "Significant change up"),
            ("D", "Significant change down"),
            ("B", "Better"),
            ("W", "Worse"),
            ("S", "Susceptible"),
            ("R", "Resistant"),
            ("I", "Intermediate"),
            ("MS", "Moderately susceptible"),
            ("VS", "Very susceptible"),
        ]),
        CodeTable::new("0080", "Nature of Abnormal Testing").with_codes(&[
            ("A", "An age-based population"),
            ("N", "None - generic normal range"),
            ("R", "A race-based population"),
            ("S", "A sex-based population"),
        ]),
        CodeTable::new("0085", "Observation Result Status").with_codes(&[
            ("C", "Record coming over is a correction and thus replaces a final result"),
            ("D", "Deletes the OBX record"),
            ("F", "Final results; Can only be changed with a corrected result"),
            ("I", "Specimen in lab; results pending"),
            ("N", "Not asked; used to affirmatively document that the observation was not sought when the question could have been asked"),
            ("O", "Order detail description only (no result)"),
            ("P", "Preliminary results"),
            ("R", "Results entered -- not verified"),
            ("S", "Partial results"),
            ("U", "Results status change to final without retransmitting results already sent as 'preliminary'"),
            ("W", "Post original as wrong, e.g., transmitted for wrong patient"),
            ("X", "Results cannot be obtained for this observation"),
        ]),
        CodeTable::new("0125", "Value Type").with_codes(&[
            ("AD", "Address"),
            ("CE", "Coded element"),
            ("CF", "Coded element with formatted values"),
            ("CK", "Composite ID with check digit"),
            ("CN", "Composite ID and name"),
            ("CP", "Composite price"),
            ("CX", "Extended composite ID with check digit"),
            ("DT", "Date"),
            ("ED", "Encapsulated data"),
            ("FT", "Formatted text"),
            ("MO", "Money"),
            ("NM", "Numeric"),
            ("PN", "Person name"),
            ("RP", "Reference pointer"),
            ("SN", "Structured numeric"),
            ("ST", "String"),
            ("TM", "Time"),
            ("TN", "Telephone number"),
            ("TS", "Time stamp"),
            ("TX", "Text"),
            ("XAD", "Extended address"),
            ("XCN", "Extended composite ID number and name"),
            ("XON", "Extended composite name and ID for organizations"),
            ("XPN", "Extended person name"),
            ("XTN", "Extended telecommunications number"),
        ]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_counts() {
        assert_eq!(DATA_TYPE_PATTERNS.len(), 20);
        assert_eq!(SEGMENT_DESCRIPTIONS.len(), 22);
        assert_eq!(MESSAGE_CODES.len(), 9);
        assert_eq!(code_tables().len(), 9);
    }

    #[test]
    fn test_msh_header_fields() {
        let msh = msh();
        let separator = msh.field(1).unwrap();
        assert_eq!(separator.min_length, Some(1));
        assert_eq!(separator.max_length, Some(1));
        assert!(msh.field(2).unwrap().required);
        assert!(msh.field(18).unwrap().repeatable);
    }

    #[test]
    fn test_adt_messages_require_visit() {
        let adt = &messages()[0];
        assert_eq!(adt.message_type, "ADT^A01");
        assert_eq!(adt.required_segments, vec!["MSH", "EVN", "PID", "PV1"]);
        assert_eq!(adt.segments, vec!["MSH", "EVN", "PID", "NK1", "PV1"]);
    }
}
