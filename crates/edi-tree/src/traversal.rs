//! Traversal and cursor APIs for navigating the document tree

use crate::node::{CompositeElement, DataElement, Element};
use crate::{Error, Result};

/// A cursor positioned on a container of the tree
pub struct Cursor<'a> {
    /// Current container
    node: &'a CompositeElement,

    /// Path to current container (for error reporting)
    path: Vec<String>,
}

/// Visitor driven by [`walk`]
pub trait Visitor {
    /// Called when entering a container, before its children
    fn enter(&mut self, composite: &CompositeElement, depth: usize);

    /// Called when leaving a container, after its children
    fn leave(&mut self, _composite: &CompositeElement, _depth: usize) {}

    /// Called for every leaf
    fn data(&mut self, data: &DataElement, depth: usize);

    /// Returns true if traversal should continue
    fn should_continue(&self) -> bool {
        true
    }
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the given container
    pub fn new(node: &'a CompositeElement) -> Self {
        Self {
            node,
            path: vec![node.id.clone()],
        }
    }

    /// Get the current container
    #[must_use]
    pub fn node(&self) -> &'a CompositeElement {
        self.node
    }

    /// Get the current path
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Descend into the first child container whose id or name is `key`
    ///
    /// # Errors
    ///
    /// Fails when no such child exists or when it is a leaf.
    pub fn child(&self, key: &str) -> Result<Cursor<'a>> {
        let element = self
            .node
            .child(key)
            .ok_or_else(|| Error::node_not_found(self.joined(key)))?;
        self.descend(element, key.to_string())
    }

    /// Descend into the child container at `index`
    ///
    /// # Errors
    ///
    /// Fails when `index` is out of range or the child is a leaf.
    pub fn child_at(&self, index: usize) -> Result<Cursor<'a>> {
        let step = format!("[{index}]");
        let element = self
            .node
            .get(index)
            .ok_or_else(|| Error::node_not_found(self.joined(&step)))?;
        self.descend(element, step)
    }

    /// All direct children whose id or name is `key`
    #[must_use]
    pub fn children(&self, key: &str) -> Vec<&'a Element> {
        self.node
            .iter()
            .filter(|element| element.id() == key || element.name() == key)
            .collect()
    }

    /// Navigate using a path (e.g. `"SG2_container/SG2_group[1]/NAD/3035"`)
    ///
    /// Each step names a child by id or name; `KEY[n]` selects the n-th
    /// matching child. Every step but the last must reach a container.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] for malformed or empty paths,
    /// [`Error::NodeNotFound`] when a step has no match and
    /// [`Error::TypeMismatch`] when a step tries to descend into a leaf.
    pub fn navigate(&self, path: &str) -> Result<&'a Element> {
        let steps: Vec<&str> = path.split('/').filter(|step| !step.is_empty()).collect();
        let Some((last, intermediate)) = steps.split_last() else {
            return Err(Error::invalid_path(path, "path has no steps"));
        };

        let mut cursor = Cursor {
            node: self.node,
            path: self.path.clone(),
        };
        for step in intermediate {
            let element = cursor.resolve(step)?;
            cursor = cursor.descend(element, (*step).to_string())?;
        }
        cursor.resolve(last)
    }

    fn resolve(&self, step: &str) -> Result<&'a Element> {
        let (key, index) = parse_step(step)?;
        self.children(key)
            .get(index)
            .copied()
            .ok_or_else(|| Error::node_not_found(self.joined(step)))
    }

    fn descend(&self, element: &'a Element, step: String) -> Result<Cursor<'a>> {
        let mut path = self.path.clone();
        path.push(step);
        match element {
            Element::Composite(node) => Ok(Cursor { node, path }),
            Element::Data(_) => Err(Error::type_mismatch(
                path.join("/"),
                "container",
                element.kind_label(),
            )),
        }
    }

    fn joined(&self, step: &str) -> String {
        format!("{}/{}", self.path.join("/"), step)
    }
}

/// Split `KEY[n]` into its key and index; a bare key means index 0
fn parse_step(step: &str) -> Result<(&str, usize)> {
    let Some(open) = step.find('[') else {
        return Ok((step, 0));
    };
    let close = step
        .find(']')
        .filter(|close| *close > open)
        .ok_or_else(|| Error::invalid_path(step, "unclosed bracket"))?;
    if close + 1 != step.len() {
        return Err(Error::invalid_path(step, "trailing characters after index"));
    }
    let index = step[open + 1..close]
        .parse()
        .map_err(|_| Error::invalid_path(step, "index is not a number"))?;
    Ok((&step[..open], index))
}

/// Pre-order iterator over the descendants of a container
pub struct Descendants<'a> {
    stack: Vec<std::slice::Iter<'a, Element>>,
}

impl<'a> Descendants<'a> {
    pub(crate) fn new(root: &'a CompositeElement) -> Self {
        Self {
            stack: vec![root.iter()],
        }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(element) => {
                    if let Element::Composite(composite) = element {
                        self.stack.push(composite.iter());
                    }
                    return Some(element);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Walk the tree using a visitor
pub fn walk<V: Visitor + ?Sized>(root: &CompositeElement, visitor: &mut V) {
    walk_composite(root, visitor, 0);
}

fn walk_composite<V: Visitor + ?Sized>(composite: &CompositeElement, visitor: &mut V, depth: usize) {
    if !visitor.should_continue() {
        return;
    }

    visitor.enter(composite, depth);
    for child in composite {
        if !visitor.should_continue() {
            break;
        }
        match child {
            Element::Composite(inner) => walk_composite(inner, visitor, depth + 1),
            Element::Data(data) => visitor.data(data, depth + 1),
        }
    }
    visitor.leave(composite, depth);
}
