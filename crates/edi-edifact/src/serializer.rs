//! EDIFACT serializer
//!
//! Renders a document tree back to the wire format. Values are written
//! verbatim (they are stored escaped); trailing empty elements of a segment
//! and trailing empty components of a composite are dropped.

use edi_tree::{CompositeElement, Element, Role};

use crate::interchange::Interchange;
use crate::syntax::Separators;

/// Serializer for EDIFACT documents
#[derive(Debug, Clone, Copy, Default)]
pub struct EdifactSerializer {
    separators: Separators,
}

impl EdifactSerializer {
    /// Create a new EDIFACT serializer
    #[must_use]
    pub fn new(separators: Separators) -> Self {
        Self { separators }
    }

    /// Render an interchange, with its UNA prefix when it has one
    #[must_use]
    pub fn serialize_interchange(interchange: &Interchange) -> String {
        let serializer = Self::new(interchange.separators);
        let mut out = String::new();
        if interchange.has_service_string_advice {
            out.push_str(&interchange.separators.to_una());
            out.push('\n');
        }
        serializer.write_composite(&interchange.root, &mut out);
        out
    }

    /// Render any element of a tree
    #[must_use]
    pub fn serialize(&self, element: &Element) -> String {
        let mut out = String::new();
        self.write_element(element, &mut out);
        out
    }

    fn write_element(&self, element: &Element, out: &mut String) {
        match element {
            Element::Data(data) => out.push_str(&data.value),
            Element::Composite(composite) => self.write_composite(composite, out),
        }
    }

    fn write_composite(&self, composite: &CompositeElement, out: &mut String) {
        match composite.role {
            Role::Segment => {
                let mut tokens = vec![composite.id.clone()];
                tokens.extend(composite.iter().map(|child| self.serialize(child)));
                // the tag always stays
                let keep = tokens.iter().rposition(|token| !token.is_empty()).map_or(1, |last| last + 1);
                tokens.truncate(keep);
                out.push_str(&tokens.join(self.separators.element.to_string().as_str()));
                out.push(self.separators.segment);
                out.push('\n');
            }
            Role::CompositeDataElement => {
                let mut tokens: Vec<String> = composite.iter().map(|child| self.serialize(child)).collect();
                let keep = tokens.iter().rposition(|token| !token.is_empty()).map_or(1, |last| last + 1);
                tokens.truncate(keep);
                out.push_str(&tokens.join(self.separators.component.to_string().as_str()));
            }
            _ => {
                for child in composite {
                    self.write_element(child, out);
                }
            }
        }
    }
}
