//! Known HL7 v2 version tags

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Version tag carried in MSH-12
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Hl7Version {
    #[serde(rename = "2.1")]
    V2_1,
    #[serde(rename = "2.2")]
    V2_2,
    #[serde(rename = "2.3")]
    V2_3,
    #[serde(rename = "2.3.1")]
    V2_3_1,
    #[serde(rename = "2.4")]
    V2_4,
    #[serde(rename = "2.5")]
    V2_5,
    #[serde(rename = "2.5.1")]
    V2_5_1,
    #[serde(rename = "2.6")]
    V2_6,
    #[serde(rename = "2.7")]
    V2_7,
    #[serde(rename = "2.7.1")]
    V2_7_1,
    #[serde(rename = "2.8")]
    V2_8,
    #[serde(rename = "2.8.1")]
    V2_8_1,
    #[serde(rename = "2.8.2")]
    V2_8_2,
    #[serde(rename = "2.9")]
    V2_9,
}

impl Hl7Version {
    /// Every known version, oldest first
    pub const ALL: [Self; 14] = [
        Self::V2_1,
        Self::V2_2,
        Self::V2_3,
        Self::V2_3_1,
        Self::V2_4,
        Self::V2_5,
        Self::V2_5_1,
        Self::V2_6,
        Self::V2_7,
        Self::V2_7_1,
        Self::V2_8,
        Self::V2_8_1,
        Self::V2_8_2,
        Self::V2_9,
    ];

    /// Wire tag (e.g. "2.5.1")
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V2_1 => "2.1",
            Self::V2_2 => "2.2",
            Self::V2_3 => "2.3",
            Self::V2_3_1 => "2.3.1",
            Self::V2_4 => "2.4",
            Self::V2_5 => "2.5",
            Self::V2_5_1 => "2.5.1",
            Self::V2_6 => "2.6",
            Self::V2_7 => "2.7",
            Self::V2_7_1 => "2.7.1",
            Self::V2_8 => "2.8",
            Self::V2_8_1 => "2.8.1",
            Self::V2_8_2 => "2.8.2",
            Self::V2_9 => "2.9",
        }
    }

    /// Match a tag exactly (surrounding whitespace ignored). Unknown tags give `None`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        Self::ALL.into_iter().find(|v| v.as_str() == tag)
    }
}

impl fmt::Display for Hl7Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Hl7Version {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::from_tag(s).ok_or_else(|| crate::Error::not_found(format!("version {s}")))
    }
}
