//! Identifier classification
//!
//! The shape of an EDIFACT identifier tells which definition file holds it:
//!
//! | shape                    | level                  | service when          |
//! |--------------------------|------------------------|-----------------------|
//! | 6 uppercase letters      | message                | AUTACK, CONTRL, KEYMAN |
//! | 3 uppercase letters      | segment                | leading `U`           |
//! | `S`/`C`/`E` + 3 digits   | composite data element | leading `S`           |
//! | 4 digits                 | data element           | value below 1000      |

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::NodeKind;

static MESSAGE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{6}$").expect("message id pattern is valid"));
static SEGMENT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("segment id pattern is valid"));
static ELEMENT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([SCE0-9])[0-9]{3}$").expect("element id pattern is valid"));

const SERVICE_MESSAGES: [&str; 3] = ["AUTACK", "CONTRL", "KEYMAN"];

/// Definition file family an identifier lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Message,
    Segment,
    CompositeDataElement,
    DataElement,
    Code,
}

impl Level {
    /// File stem (or directory name for messages) of the definition file.
    #[must_use]
    pub fn file_stem(self) -> &'static str {
        match self {
            Level::Message => "messages",
            Level::Segment => "segments",
            Level::CompositeDataElement => "composite_data_elements",
            Level::DataElement => "data_elements",
            Level::Code => "codes",
        }
    }

    /// Node kind defined at this level, `None` for code lists.
    #[must_use]
    pub fn node_kind(self) -> Option<NodeKind> {
        match self {
            Level::Message => Some(NodeKind::Message),
            Level::Segment => Some(NodeKind::Segment),
            Level::CompositeDataElement => Some(NodeKind::CompositeDataElement),
            Level::DataElement => Some(NodeKind::DataElement),
            Level::Code => None,
        }
    }
}

/// Whether a definition belongs to the syntax rules or to a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Defined by the syntax version (`service_v<N>`)
    Service,
    /// Defined by a message directory such as `D96A`
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub level: Level,
    pub scope: Scope,
}

/// Classify an identifier by its shape, `None` when it matches no known shape.
#[must_use]
pub fn classify(id: &str) -> Option<Classification> {
    if MESSAGE_ID.is_match(id) {
        let scope = if SERVICE_MESSAGES.contains(&id) {
            Scope::Service
        } else {
            Scope::User
        };
        return Some(Classification {
            level: Level::Message,
            scope,
        });
    }

    if SEGMENT_ID.is_match(id) {
        let scope = if id.starts_with('U') {
            Scope::Service
        } else {
            Scope::User
        };
        return Some(Classification {
            level: Level::Segment,
            scope,
        });
    }

    let captures = ELEMENT_ID.captures(id)?;
    let classification = match &captures[1] {
        "S" => Classification {
            level: Level::CompositeDataElement,
            scope: Scope::Service,
        },
        "C" | "E" => Classification {
            level: Level::CompositeDataElement,
            scope: Scope::User,
        },
        _ => Classification {
            level: Level::DataElement,
            scope: code_scope(id),
        },
    };
    Some(classification)
}

/// Scope of a data element's code list: ids below 1000 are service codes.
#[must_use]
pub fn code_scope(id: &str) -> Scope {
    match id.parse::<u32>() {
        Ok(number) if number >= 1000 => Scope::User,
        _ => Scope::Service,
    }
}
