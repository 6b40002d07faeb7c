//! Dotted paths addressing a value inside a message
//!
//! Syntax: `SEG[n].F[r].C.S`, e.g. `PID.5.1`, `OBX[2].5`, `PID.3[1].1`.
//! The segment occurrence `n` and the repetition `r` are 0-based and
//! optional. Field, component and subcomponent positions are 1-based.

use crate::{Error, Result};
use std::fmt;

/// A parsed path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    /// Segment name
    pub segment: String,
    /// Occurrence of the segment among same-named segments (0-based)
    pub occurrence: usize,
    /// Field position (1-based)
    pub field: Option<usize>,
    /// Repetition of the field (0-based); `None` addresses the whole field
    pub repetition: Option<usize>,
    /// Component position (1-based)
    pub component: Option<usize>,
    /// Subcomponent position (1-based)
    pub subcomponent: Option<usize>,
}

impl FieldPath {
    /// Parse a path string
    pub fn parse(path: &str) -> Result<Self> {
        let parts: Vec<&str> = path.trim().split('.').collect();
        if parts.len() > 4 {
            return Err(Error::invalid_path(path, "too many levels"));
        }

        let (segment, occurrence) = split_index(path, parts[0])?;
        if segment.is_empty() || !segment.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::invalid_path(path, "segment name must be alphanumeric"));
        }
        let occurrence = occurrence.unwrap_or(0);

        let (field, repetition) = match parts.get(1) {
            Some(part) => {
                let (position, repetition) = split_index(path, part)?;
                (Some(parse_position(path, position)?), repetition)
            }
            None => (None, None),
        };

        let component = parts
            .get(2)
            .map(|part| parse_position(path, part))
            .transpose()?;
        let subcomponent = parts
            .get(3)
            .map(|part| parse_position(path, part))
            .transpose()?;

        Ok(Self {
            segment: segment.to_string(),
            occurrence,
            field,
            repetition,
            component,
            subcomponent,
        })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segment)?;
        if self.occurrence > 0 {
            write!(f, "[{}]", self.occurrence)?;
        }
        if let Some(field) = self.field {
            write!(f, ".{field}")?;
            if let Some(repetition) = self.repetition {
                write!(f, "[{repetition}]")?;
            }
        }
        if let Some(component) = self.component {
            write!(f, ".{component}")?;
        }
        if let Some(subcomponent) = self.subcomponent {
            write!(f, ".{subcomponent}")?;
        }
        Ok(())
    }
}

/// Split `NAME[3]` into `("NAME", Some(3))`.
fn split_index<'a>(path: &str, part: &'a str) -> Result<(&'a str, Option<usize>)> {
    let Some(open) = part.find('[') else {
        return Ok((part, None));
    };
    let close = part
        .find(']')
        .ok_or_else(|| Error::invalid_path(path, format!("unclosed bracket in '{part}'")))?;
    if close < open || close != part.len() - 1 {
        return Err(Error::invalid_path(path, format!("misplaced bracket in '{part}'")));
    }
    let index = part[open + 1..close]
        .parse()
        .map_err(|_| Error::invalid_path(path, format!("invalid index in '{part}'")))?;
    Ok((&part[..open], Some(index)))
}

fn parse_position(path: &str, text: &str) -> Result<usize> {
    match text.parse::<usize>() {
        Ok(0) => Err(Error::invalid_path(path, "positions are 1-based")),
        Ok(position) => Ok(position),
        Err(_) => Err(Error::invalid_path(path, format!("invalid position '{text}'"))),
    }
}
