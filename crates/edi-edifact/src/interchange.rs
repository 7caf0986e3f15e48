//! Interchange document

use edi_tree::{CompositeElement, Element, Role};
use serde::{Deserialize, Serialize};

use crate::serializer::EdifactSerializer;
use crate::syntax::Separators;
use crate::xml::XmlWriter;

/// Id of the root container of every interchange
pub const INTERCHANGE_ID: &str = "interchange";

/// A parsed (or hand-built) interchange
///
/// The tree root holds `UNB`, then functional groups or messages, then
/// `UNZ`. The separators are the ones the interchange was read with and the
/// ones it is written with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interchange {
    pub root: CompositeElement,
    pub separators: Separators,
    /// Whether a `UNA` segment precedes the interchange
    pub has_service_string_advice: bool,
}

impl Interchange {
    /// Empty interchange with default separators, written with a `UNA` segment
    #[must_use]
    pub fn new() -> Self {
        Self::with_separators(Separators::default())
    }

    #[must_use]
    pub fn with_separators(separators: Separators) -> Self {
        Self {
            root: CompositeElement::new(Role::Interchange, INTERCHANGE_ID),
            separators,
            has_service_string_advice: true,
        }
    }

    /// Append a top-level element (envelope segment, group or message)
    pub fn push(&mut self, element: impl Into<Element>) -> usize {
        self.root.push(element)
    }

    /// Wire format
    #[must_use]
    pub fn to_edi(&self) -> String {
        EdifactSerializer::serialize_interchange(self)
    }

    /// Wire format of one element, using this interchange's separators
    #[must_use]
    pub fn element_to_edi(&self, element: &Element) -> String {
        EdifactSerializer::new(self.separators).serialize(element)
    }

    /// XML projection
    #[must_use]
    pub fn to_xml(&self, verbose: bool) -> String {
        XmlWriter::new(&self.separators, verbose).write_composite(&self.root)
    }

    /// XML projection of one element, using this interchange's separators
    #[must_use]
    pub fn element_to_xml(&self, element: &Element, verbose: bool) -> String {
        XmlWriter::new(&self.separators, verbose).write(element)
    }

    /// Descendants whose id or name equals `value`
    #[must_use]
    pub fn find(&self, value: &str) -> Vec<&Element> {
        self.root.find(value)
    }

    /// Escape a plain value for storage in a data element
    #[must_use]
    pub fn escape(&self, value: &str) -> String {
        self.separators.escape(value)
    }

    /// Plain text of a stored value
    #[must_use]
    pub fn unescape(&self, value: &str) -> String {
        self.separators.unescape(value)
    }
}

impl Default for Interchange {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edi_tree::DataElement;

    #[test]
    fn test_new_interchange() {
        let interchange = Interchange::new();
        assert_eq!(interchange.root.role, Role::Interchange);
        assert_eq!(interchange.root.id, "interchange");
        assert!(interchange.has_service_string_advice);
        assert!(interchange.root.is_empty());
    }

    #[test]
    fn test_escape_accessors() {
        let interchange = Interchange::new();
        let stored = interchange.escape("5+ boxes: 10'");
        assert_eq!(stored, "5?+ boxes?: 10?'");
        assert_eq!(interchange.unescape(&stored), "5+ boxes: 10'");
    }

    #[test]
    fn test_find_in_tree() {
        let mut interchange = Interchange::new();
        interchange.push(
            CompositeElement::new(Role::Segment, "UNZ")
                .with_child(DataElement::new("0036", "1").with_name("Interchange control count")),
        );
        let found = interchange.find("Interchange control count");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value(), Some("1"));
        assert!(interchange.find("interchange").is_empty());
    }

    #[test]
    fn test_json_keeps_separators_and_tree() {
        let mut interchange = Interchange::with_separators(Separators {
            segment: '~',
            ..Separators::default()
        });
        interchange.push(CompositeElement::new(Role::Segment, "UNZ").with_child(DataElement::new("0036", "1")));

        let json = serde_json::to_value(&interchange).unwrap();
        assert_eq!(json["separators"]["segment"], "~");
        assert_eq!(json["root"]["role"], "interchange");

        let back: Interchange = serde_json::from_value(json).unwrap();
        assert_eq!(back, interchange);
    }

    #[test]
    fn test_xml_of_empty_interchange() {
        let xml = Interchange::new().to_xml(false);
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<interchange id=\"interchange\">\n</interchange>"
        );
    }
}
