//! Element primitives of the document tree.
//!
//! A tree is made of [`CompositeElement`] containers and [`DataElement`]
//! leaves. Containers carry a [`Role`] naming the grammar construct they
//! stand for; leaves carry the raw (still escaped) wire value.

use serde::{Deserialize, Serialize};

use crate::{Descendants, Error, Result};

/// Grammar construct a container stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Root of a document, `UNB` to `UNZ`.
    Interchange,
    /// `UNG` to `UNE` envelope.
    FunctionalGroup,
    /// `UNH` to `UNT` envelope.
    Message,
    /// Schema-defined group of segments inside a message.
    SegmentGroup,
    /// Repeated occurrences of one segment.
    SegmentContainer,
    /// Repeated occurrences of one segment group.
    SegmentGroupContainer,
    Segment,
    CompositeDataElement,
}

impl Role {
    /// Lowercase tag used by the XML projection.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Role::Interchange => "interchange",
            Role::FunctionalGroup => "functionalgroup",
            Role::Message => "message",
            Role::SegmentGroup => "segmentgroup",
            Role::SegmentContainer => "segmentcontainer",
            Role::SegmentGroupContainer => "segmentgroupcontainer",
            Role::Segment => "segment",
            Role::CompositeDataElement => "compositedataelement",
        }
    }

    /// Synthetic repetition wrappers are invisible in projections.
    #[must_use]
    pub fn is_transparent(self) -> bool {
        matches!(self, Role::SegmentContainer | Role::SegmentGroupContainer)
    }
}

/// Leaf holding a single raw value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataElement {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Wire value, escaped exactly as it appeared in (or will be written to) the interchange
    pub value: String,
}

impl DataElement {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Ordered container of child elements
///
/// Children are addressed by dense indices starting at zero; insertion order
/// is document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeElement {
    pub role: Role,
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    children: Vec<Element>,
}

impl CompositeElement {
    /// Create an empty container
    pub fn new(role: Role, id: impl Into<String>) -> Self {
        Self {
            role,
            id: id.into(),
            name: String::new(),
            description: String::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder form of [`push`](Self::push).
    #[must_use]
    pub fn with_child(mut self, child: impl Into<Element>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append a child and return its index.
    pub fn push(&mut self, child: impl Into<Element>) -> usize {
        self.children.push(child.into());
        self.children.len() - 1
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Element> {
        self.children.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.children.get_mut(index)
    }

    /// Replace the child at `index`, or append when `index == len()`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] when `index` would leave a gap.
    pub fn set(&mut self, index: usize, child: impl Into<Element>) -> Result<()> {
        let len = self.children.len();
        match index.cmp(&len) {
            std::cmp::Ordering::Less => {
                self.children[index] = child.into();
                Ok(())
            }
            std::cmp::Ordering::Equal => {
                self.children.push(child.into());
                Ok(())
            }
            std::cmp::Ordering::Greater => Err(Error::IndexOutOfRange {
                id: self.id.clone(),
                index,
                len,
            }),
        }
    }

    /// Remove the child at `index`, shifting later children down.
    pub fn remove(&mut self, index: usize) -> Option<Element> {
        (index < self.children.len()).then(|| self.children.remove(index))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    #[must_use]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Shallow iteration over direct children.
    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.children.iter()
    }

    /// Pre-order iteration over every descendant, excluding `self`.
    #[must_use]
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants::new(self)
    }

    /// Collect descendants whose id or name equals `value`, in document order.
    #[must_use]
    pub fn find(&self, value: &str) -> Vec<&Element> {
        self.descendants()
            .filter(|element| element.id() == value || element.name() == value)
            .collect()
    }

    /// First direct child whose id or name equals `key`.
    #[must_use]
    pub fn child(&self, key: &str) -> Option<&Element> {
        self.children
            .iter()
            .find(|element| element.id() == key || element.name() == key)
    }
}

impl<'a> IntoIterator for &'a CompositeElement {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}

/// Any node of the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    Composite(CompositeElement),
    Data(DataElement),
}

impl Element {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Element::Composite(composite) => &composite.id,
            Element::Data(data) => &data.id,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Element::Composite(composite) => &composite.name,
            Element::Data(data) => &data.name,
        }
    }

    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Element::Composite(composite) => &composite.description,
            Element::Data(data) => &data.description,
        }
    }

    /// Raw value of a leaf, `None` for containers.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Element::Composite(_) => None,
            Element::Data(data) => Some(&data.value),
        }
    }

    /// Role of a container, `None` for leaves.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        match self {
            Element::Composite(composite) => Some(composite.role),
            Element::Data(_) => None,
        }
    }

    #[must_use]
    pub fn as_composite(&self) -> Option<&CompositeElement> {
        match self {
            Element::Composite(composite) => Some(composite),
            Element::Data(_) => None,
        }
    }

    pub fn as_composite_mut(&mut self) -> Option<&mut CompositeElement> {
        match self {
            Element::Composite(composite) => Some(composite),
            Element::Data(_) => None,
        }
    }

    #[must_use]
    pub fn as_data(&self) -> Option<&DataElement> {
        match self {
            Element::Data(data) => Some(data),
            Element::Composite(_) => None,
        }
    }

    pub fn as_data_mut(&mut self) -> Option<&mut DataElement> {
        match self {
            Element::Data(data) => Some(data),
            Element::Composite(_) => None,
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Element::Data(_))
    }

    /// Short label used in error messages.
    pub(crate) fn kind_label(&self) -> &'static str {
        match self {
            Element::Composite(composite) => composite.role.tag(),
            Element::Data(_) => "data element",
        }
    }
}

impl From<CompositeElement> for Element {
    fn from(composite: CompositeElement) -> Self {
        Element::Composite(composite)
    }
}

impl From<DataElement> for Element {
    fn from(data: DataElement) -> Self {
        Element::Data(data)
    }
}
