//! Schema model definitions

use serde::{Deserialize, Serialize};

/// What a schema node describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Message,
    Group,
    Segment,
    CompositeDataElement,
    DataElement,
}

impl NodeKind {
    /// Human readable label used in error messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Message => "message",
            NodeKind::Group => "segment group",
            NodeKind::Segment => "segment",
            NodeKind::CompositeDataElement => "composite data element",
            NodeKind::DataElement => "data element",
        }
    }
}

/// Declared representation of a data element value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// `a`: no digits allowed
    Alpha,
    /// `n`: digits with an optional decimal part
    Numeric,
    /// `an`: anything
    Alphanumeric,
    #[default]
    Unspecified,
}

impl DataType {
    /// Parse the directory notation (`a`, `n`, `an`).
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "a" => Some(DataType::Alpha),
            "n" => Some(DataType::Numeric),
            "an" => Some(DataType::Alphanumeric),
            "" => Some(DataType::Unspecified),
            _ => None,
        }
    }
}

/// A node of a message, segment, composite or data element definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaNode {
    pub id: String,
    pub kind: NodeKind,
    pub required: bool,
    /// Maximum consecutive occurrences, at least 1
    pub max_repeat: usize,
    pub name: String,
    pub description: String,
    pub data_type: DataType,
    /// Exact length a non-empty value must have
    pub length: Option<usize>,
    pub max_length: Option<usize>,
    pub children: Vec<SchemaNode>,
}

impl SchemaNode {
    /// Create an optional, non-repeating node without constraints
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            required: false,
            max_repeat: 1,
            name: String::new(),
            description: String::new(),
            data_type: DataType::Unspecified,
            length: None,
            max_length: None,
            children: Vec::new(),
        }
    }

    pub fn segment(id: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Segment)
    }

    pub fn group(id: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Group)
    }

    pub fn message(id: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Message)
    }

    pub fn composite(id: impl Into<String>) -> Self {
        Self::new(id, NodeKind::CompositeDataElement)
    }

    pub fn data_element(id: impl Into<String>) -> Self {
        Self::new(id, NodeKind::DataElement)
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn with_max_repeat(mut self, max_repeat: usize) -> Self {
        self.max_repeat = max_repeat.max(1);
        self
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

    #[must_use]
    pub fn with_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    #[must_use]
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    #[must_use]
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: SchemaNode) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = SchemaNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Ids of the segments that can open an instance of this group
    ///
    /// Leading optional segments may be absent, so every segment child up to
    /// and including the first required one can start an instance.
    #[must_use]
    pub fn opening_segment_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        for child in self.children.iter().filter(|child| child.kind == NodeKind::Segment) {
            ids.push(child.id.as_str());
            if child.required {
                break;
            }
        }
        ids
    }

    /// Whether the node repeats and must be wrapped in a container
    #[must_use]
    pub fn is_repeatable(&self) -> bool {
        self.max_repeat > 1
    }
}

/// One entry of a code list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Code {
    pub code: String,
    #[serde(default, alias = "desc")]
    pub description: String,
}

impl Code {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }
}
