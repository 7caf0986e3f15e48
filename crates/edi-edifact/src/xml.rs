//! XML projection of a document tree
//!
//! Containers become elements named after their role, leaves become
//! `<e{id}>` elements holding the unescaped value. Repetition wrappers are
//! transparent: their children are written at the wrapper's own level.

use std::borrow::Cow;

use edi_tree::{CompositeElement, DataElement, Element, Visitor, walk};
use quick_xml::escape::escape;

use crate::syntax::Separators;

const DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;
const INDENT: usize = 4;

/// Visitor collecting one line per XML tag
pub struct XmlWriter<'s> {
    separators: &'s Separators,
    verbose: bool,
    indent: usize,
    lines: Vec<String>,
}

impl<'s> XmlWriter<'s> {
    /// Values are unescaped with `separators`; `verbose` adds description comments.
    #[must_use]
    pub fn new(separators: &'s Separators, verbose: bool) -> Self {
        Self {
            separators,
            verbose,
            indent: 0,
            lines: Vec::new(),
        }
    }

    /// Render any element; containers get the XML declaration
    #[must_use]
    pub fn write(mut self, element: &Element) -> String {
        match element {
            Element::Composite(composite) => self.write_composite(composite),
            Element::Data(data) => {
                self.data(data, 0);
                self.lines.join("\n")
            }
        }
    }

    /// Render a container with the XML declaration
    #[must_use]
    pub fn write_composite(mut self, root: &CompositeElement) -> String {
        self.lines.push(DECLARATION.to_string());
        walk(root, &mut self);
        self.lines.join("\n")
    }

    fn blank(&self) -> String {
        " ".repeat(self.indent)
    }
}

fn attribute(name: &str, value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        format!(" {name}=\"{}\"", escape(value))
    }
}

impl Visitor for XmlWriter<'_> {
    fn enter(&mut self, composite: &CompositeElement, _depth: usize) {
        if composite.role.is_transparent() {
            return;
        }
        let line = format!(
            "{}<{}{}{}>",
            self.blank(),
            composite.role.tag(),
            attribute("id", &composite.id),
            attribute("name", &composite.name)
        );
        self.lines.push(line);
        self.indent += INDENT;
    }

    fn leave(&mut self, composite: &CompositeElement, _depth: usize) {
        if composite.role.is_transparent() {
            return;
        }
        self.indent = self.indent.saturating_sub(INDENT);
        let line = format!("{}</{}>", self.blank(), composite.role.tag());
        self.lines.push(line);
    }

    fn data(&mut self, data: &DataElement, _depth: usize) {
        let blank = self.blank();
        if self.verbose && !data.description.is_empty() {
            self.lines
                .push(format!("{blank}<!-- {} -->", comment_text(&data.description)));
        }
        let tag = format!("e{}", data.id.to_lowercase());
        let value = self.separators.unescape(&data.value);
        self.lines.push(format!(
            "{blank}<{tag} name=\"{}\">{}</{tag}>",
            escape(data.name.as_str()),
            escape(value.as_str())
        ));
    }
}

/// `--` may not appear inside an XML comment
fn comment_text(text: &str) -> Cow<'_, str> {
    if text.contains("--") {
        Cow::Owned(text.replace("--", "- -"))
    } else {
        escape(text)
    }
}
