//! Schema-driven EDIFACT parser
//!
//! The tokenizer produces the envelope skeleton; this module matches each
//! message's flat segment list against its message definition and builds
//! the nested document tree. Every segment, composite and data element is
//! resolved through the [`SchemaProvider`] under the message's directory and
//! the interchange's syntax version.

use std::path::Path;
use std::sync::Arc;

use edi_schema::{NodeKind, SchemaNode, SchemaProvider};
use edi_tree::{CompositeElement, DataElement, Element, Role};
use edi_validation::{Constraint, ElementValidator, StrictnessLevel, translate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::interchange::Interchange;
use crate::syntax::Separators;
use crate::tokenizer::{RawGroup, RawMessage, SegmentToken, tokenize};
use crate::{Error, Result};

/// Id of every functional group container
pub const FUNCTIONAL_GROUP_ID: &str = "functional_group";

/// Forward jumps the matcher may take inside one message to resynchronize
/// on a required segment that is out of place
const MAX_RECOVERIES: usize = 2;

/// Parser configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserOptions {
    /// Reject values that violate their declared length or type
    #[serde(default)]
    pub strict_validation: bool,
    /// Replace coded values by the description from their code list
    #[serde(default)]
    pub translate_codes: bool,
}

impl ParserOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn strict_validation(mut self, strict: bool) -> Self {
        self.strict_validation = strict;
        self
    }

    #[must_use]
    pub fn translate_codes(mut self, translate: bool) -> Self {
        self.translate_codes = translate;
        self
    }
}

/// Parser for EDIFACT interchanges
#[derive(Clone)]
pub struct EdifactParser {
    provider: Arc<dyn SchemaProvider>,
    options: ParserOptions,
}

impl EdifactParser {
    /// Create a parser resolving definitions through `provider`
    pub fn new(provider: Arc<dyn SchemaProvider>) -> Self {
        Self {
            provider,
            options: ParserOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn options(&self) -> ParserOptions {
        self.options
    }

    /// Parse the interchange stored in `path`
    ///
    /// # Errors
    ///
    /// [`Error::FileNotFound`] when the file cannot be read, otherwise the
    /// errors of [`parse_str`](Self::parse_str).
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Interchange> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::FileNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Parsing interchange from {:?}", path);
        self.parse_str(&text)
    }

    /// Parse an interchange from text
    ///
    /// # Errors
    ///
    /// [`Error::Syntax`] for structural violations,
    /// [`Error::MappingNotFound`] when a definition is missing,
    /// [`Error::Validation`] for invalid values in strict mode,
    /// [`Error::Configuration`] when the decimal mark cannot be used and
    /// [`Error::Schema`] for unreadable definitions.
    pub fn parse_str(&self, text: &str) -> Result<Interchange> {
        let tokens = tokenize(text)?;
        let syntax_version = tokens
            .header
            .component(0, 1)
            .and_then(|version| version.trim().parse::<u8>().ok());
        let validator = ElementValidator::new(
            StrictnessLevel::from_strict(self.options.strict_validation),
            tokens.separators.decimal,
        )?;
        let context = Context {
            provider: self.provider.as_ref(),
            options: self.options,
            validator,
            separators: tokens.separators,
            syntax_version,
        };
        let envelope = context.envelope();

        let mut interchange = Interchange::with_separators(tokens.separators);
        interchange.has_service_string_advice = tokens.has_service_string_advice;
        interchange.push(envelope.segment(&tokens.header)?);

        if tokens.groups.is_empty() {
            if tokens.messages.is_empty() {
                return Err(Error::Syntax(
                    "an interchange must contain at least one message".to_string(),
                ));
            }
            for message in &tokens.messages {
                interchange.push(context.message(message)?);
            }
        } else {
            for group in &tokens.groups {
                interchange.push(context.functional_group(group)?);
            }
        }

        interchange.push(envelope.segment(&tokens.trailer)?);
        debug!(
            groups = tokens.groups.len(),
            messages = tokens.messages.len(),
            "Parsed interchange"
        );
        Ok(interchange)
    }

    /// Check an interchange by parsing its own wire format
    ///
    /// # Errors
    ///
    /// The error the wire format fails with.
    pub fn validate(&self, interchange: &Interchange) -> Result<()> {
        self.parse_str(&interchange.to_edi()).map(|_| ())
    }

    #[must_use]
    pub fn is_valid(&self, interchange: &Interchange) -> bool {
        self.validate(interchange).is_ok()
    }
}

/// State shared by one parse
struct Context<'p> {
    provider: &'p dyn SchemaProvider,
    options: ParserOptions,
    validator: ElementValidator,
    separators: Separators,
    syntax_version: Option<u8>,
}

impl Context<'_> {
    /// Scope of envelope segments, which belong to no directory
    fn envelope(&self) -> Scope<'_> {
        Scope {
            ctx: self,
            directory: None,
        }
    }

    fn functional_group(&self, raw: &RawGroup<'_>) -> Result<CompositeElement> {
        if raw.messages.is_empty() {
            return Err(Error::Syntax(format!(
                "functional group must contain at least one message (segment {})",
                raw.header.position
            )));
        }

        let envelope = self.envelope();
        let mut group = CompositeElement::new(Role::FunctionalGroup, FUNCTIONAL_GROUP_ID);
        group.push(envelope.segment(&raw.header)?);
        for message in &raw.messages {
            group.push(self.message(message)?);
        }
        group.push(envelope.segment(&raw.trailer)?);
        Ok(group)
    }

    fn message(&self, raw: &RawMessage<'_>) -> Result<CompositeElement> {
        let unh = raw
            .segments
            .first()
            .ok_or_else(|| Error::Syntax("empty message".to_string()))?;
        let identifier = unh
            .elements
            .get(1)
            .filter(|components| components.len() >= 3)
            .ok_or_else(|| {
                Error::Syntax(format!(
                    "missing or malformed \"UNH\" segment in message (segment {})",
                    unh.position
                ))
            })?;
        let message_type = identifier[0];
        let directory = format!("{}{}", identifier[1], identifier[2]);

        let scope = Scope {
            ctx: self,
            directory: Some(directory.as_str()),
        };
        let schema = scope.lookup(message_type)?;
        let mut input = Input::new(&raw.segments);
        let message = scope.message(message_type, &schema, &mut input)?;
        debug!(
            message = message_type,
            directory = %directory,
            segments = raw.segments.len(),
            "Matched message"
        );
        Ok(message)
    }
}

/// Unconsumed segments of one message
struct Input<'t, 'a> {
    segments: &'t [SegmentToken<'a>],
    pos: usize,
}

impl<'t, 'a> Input<'t, 'a> {
    fn new(segments: &'t [SegmentToken<'a>]) -> Self {
        Self { segments, pos: 0 }
    }

    fn peek(&self) -> Option<&'t SegmentToken<'a>> {
        self.segments.get(self.pos)
    }

    fn next_tag(&self) -> Option<&'a str> {
        self.peek().map(|token| token.tag)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.segments.len()
    }
}

/// Lookup coordinates for the elements being matched
struct Scope<'c> {
    ctx: &'c Context<'c>,
    directory: Option<&'c str>,
}

impl Scope<'_> {
    fn lookup(&self, id: &str) -> Result<Arc<SchemaNode>> {
        Ok(self
            .ctx
            .provider
            .lookup(id, self.directory, self.ctx.syntax_version)?)
    }

    fn message(
        &self,
        id: &str,
        schema: &SchemaNode,
        input: &mut Input<'_, '_>,
    ) -> Result<CompositeElement> {
        let mut message = CompositeElement::new(Role::Message, id)
            .with_name(schema.name.as_str())
            .with_description(schema.description.as_str());
        let children = &schema.children;
        let mut cursor = 0;
        let mut recoveries = 0;

        while let Some(token) = input.peek() {
            let Some(node) = children.get(cursor) else {
                return Err(Error::Syntax(format!(
                    "unexpected segment \"{}\" in message \"{id}\" (segment {})",
                    token.tag, token.position
                )));
            };

            match node.kind {
                NodeKind::Segment if node.id == token.tag => {
                    message.push(self.segment_occurrences(node, input)?);
                }
                NodeKind::Segment => {
                    if node.required {
                        if let Some(target) = self.recover(children, cursor, token.tag, recoveries) {
                            debug!(
                                message = id,
                                missing = %node.id,
                                found = token.tag,
                                "Skipping ahead in message definition"
                            );
                            cursor = target;
                            recoveries += 1;
                            continue;
                        }
                        return Err(Error::Syntax(format!(
                            "segment \"{}\" required in message \"{id}\", found \"{}\" (segment {})",
                            node.id, token.tag, token.position
                        )));
                    }
                }
                NodeKind::Group => {
                    if let Some(group) = self.group(node, input, node.required)? {
                        message.push(group);
                    }
                }
                _ => return Err(misplaced_definition(node, id)),
            }
            cursor += 1;
        }

        if let Some(missing) = children[cursor..].iter().find(|child| child.required) {
            return Err(Error::Syntax(format!(
                "{} \"{}\" is required in message \"{id}\"",
                missing.kind.label(),
                missing.id
            )));
        }
        Ok(message)
    }

    /// Position of a later definition child for `tag`, unless recovery is exhausted
    fn recover(
        &self,
        children: &[SchemaNode],
        cursor: usize,
        tag: &str,
        recoveries: usize,
    ) -> Option<usize> {
        if self.ctx.options.strict_validation || recoveries >= MAX_RECOVERIES {
            return None;
        }
        children
            .iter()
            .enumerate()
            .skip(cursor + 1)
            .find(|(_, child)| child.id == tag)
            .map(|(index, _)| index)
    }

    /// One segment, or every consecutive occurrence of a repeatable one
    fn segment_occurrences(&self, node: &SchemaNode, input: &mut Input<'_, '_>) -> Result<Element> {
        if !node.is_repeatable() {
            let token = input
                .peek()
                .ok_or_else(|| Error::Syntax(format!("segment \"{}\" is required", node.id)))?;
            let segment = self.segment(token)?;
            input.advance();
            return Ok(segment.into());
        }

        let mut container =
            CompositeElement::new(Role::SegmentContainer, format!("{}_container", node.id));
        while let Some(token) = input.peek().filter(|token| token.tag == node.id) {
            if container.len() == node.max_repeat {
                return Err(Error::Syntax(format!(
                    "segment \"{}\" cannot be repeated more than {} times",
                    node.id, node.max_repeat
                )));
            }
            container.push(self.segment(token)?);
            input.advance();
        }
        Ok(container.into())
    }

    /// A segment group, or every consecutive instance of a repeatable one
    fn group(
        &self,
        node: &SchemaNode,
        input: &mut Input<'_, '_>,
        required: bool,
    ) -> Result<Option<Element>> {
        if !node.is_repeatable() {
            return match self.group_instance(node, input, required)? {
                Some(group) => Ok(Some(group.into())),
                None if required => Err(group_required(node)),
                None => Ok(None),
            };
        }

        let mut container =
            CompositeElement::new(Role::SegmentGroupContainer, format!("{}_container", node.id));
        // only the first instance inherits the requirement
        let mut instance_required = required;
        loop {
            if container.len() == node.max_repeat {
                if input
                    .next_tag()
                    .is_some_and(|tag| node.opening_segment_ids().contains(&tag))
                {
                    return Err(Error::Syntax(format!(
                        "segment group \"{}\" cannot be repeated more than {} times",
                        node.id, node.max_repeat
                    )));
                }
                break;
            }
            match self.group_instance(node, input, instance_required)? {
                Some(group) => {
                    container.push(group);
                    instance_required = false;
                }
                None => break,
            }
        }

        if container.is_empty() {
            return if required {
                Err(group_required(node))
            } else {
                Ok(None)
            };
        }
        Ok(Some(container.into()))
    }

    fn group_instance(
        &self,
        node: &SchemaNode,
        input: &mut Input<'_, '_>,
        required: bool,
    ) -> Result<Option<CompositeElement>> {
        if required && input.is_empty() {
            return Err(group_required(node));
        }

        let mut group = CompositeElement::new(Role::SegmentGroup, format!("{}_group", node.id))
            .with_name(node.name.as_str())
            .with_description(node.description.as_str());
        for child in &node.children {
            match child.kind {
                NodeKind::Segment => {
                    let matches = input.next_tag() == Some(child.id.as_str());
                    if !matches {
                        if required && child.required {
                            return Err(Error::Syntax(format!(
                                "segment \"{}\" is required in group \"{}\"{}",
                                child.id,
                                node.id,
                                input
                                    .peek()
                                    .map(|token| format!(", found \"{}\" (segment {})", token.tag, token.position))
                                    .unwrap_or_default()
                            )));
                        }
                        if child.required || input.is_empty() {
                            break;
                        }
                        continue;
                    }
                    group.push(self.segment_occurrences(child, input)?);
                }
                NodeKind::Group => {
                    // a nested group is only mandatory once its parent instance exists
                    let nested_required = child.required && (required || !group.is_empty());
                    if let Some(nested) = self.group(child, input, nested_required)? {
                        group.push(nested);
                    }
                }
                _ => return Err(misplaced_definition(child, &node.id)),
            }
        }

        Ok((!group.is_empty()).then_some(group))
    }

    fn segment(&self, token: &SegmentToken<'_>) -> Result<CompositeElement> {
        let definition = self.lookup(token.tag)?;
        let mut segment = CompositeElement::new(Role::Segment, token.tag)
            .with_name(definition.name.as_str())
            .with_description(definition.description.as_str());

        for (index, components) in token.elements.iter().enumerate() {
            let Some(slot) = definition.children.get(index) else {
                return Err(Error::Syntax(format!(
                    "invalid token \"{}\" in segment \"{}\" (segment {})",
                    components.join(self.ctx.separators.component.to_string().as_str()),
                    token.tag,
                    token.position
                )));
            };
            match slot.kind {
                NodeKind::DataElement => {
                    if components.len() > 1 {
                        warn!(
                            segment = token.tag,
                            position = token.position,
                            "data element \"{}\" holds {} components, keeping the first",
                            slot.id,
                            components.len()
                        );
                    }
                    let value = components.first().copied().unwrap_or_default();
                    segment.push(self.data_element(&slot.id, value)?);
                }
                NodeKind::CompositeDataElement => {
                    segment.push(self.composite(slot, components, token)?);
                }
                _ => return Err(misplaced_definition(slot, token.tag)),
            }
        }

        if let Some(missing) = definition
            .children
            .iter()
            .skip(token.elements.len())
            .find(|child| child.required)
        {
            return Err(Error::Syntax(format!(
                "{} \"{}\" is required in segment \"{}\" (segment {})",
                missing.kind.label(),
                missing.id,
                token.tag,
                token.position
            )));
        }
        Ok(segment)
    }

    fn composite(
        &self,
        slot: &SchemaNode,
        components: &[&str],
        token: &SegmentToken<'_>,
    ) -> Result<CompositeElement> {
        if components.is_empty() {
            if slot.required {
                return Err(Error::Syntax(format!(
                    "composite data element \"{}\" is required in segment \"{}\" (segment {})",
                    slot.id, token.tag, token.position
                )));
            }
            return Ok(CompositeElement::new(Role::CompositeDataElement, slot.id.as_str()));
        }

        let definition = self.lookup(&slot.id)?;
        let mut composite = CompositeElement::new(Role::CompositeDataElement, slot.id.as_str())
            .with_name(definition.name.as_str())
            .with_description(definition.description.as_str());
        for (index, value) in components.iter().enumerate() {
            let Some(component) = definition.children.get(index) else {
                return Err(Error::Syntax(format!(
                    "invalid token \"{value}\" in composite data element \"{}\" (segment {})",
                    slot.id, token.position
                )));
            };
            composite.push(self.data_element(&component.id, value)?);
        }

        if let Some(missing) = definition
            .children
            .iter()
            .skip(components.len())
            .find(|child| child.required)
        {
            return Err(Error::Syntax(format!(
                "\"{}\" is required in composite data element \"{}\" (segment {})",
                missing.id, slot.id, token.position
            )));
        }
        Ok(composite)
    }

    fn data_element(&self, id: &str, raw: &str) -> Result<DataElement> {
        let definition = self.lookup(id)?;
        self.ctx
            .validator
            .validate(id, raw, &Constraint::from(&*definition))?;

        let mut element = DataElement::new(id, raw)
            .with_name(definition.name.as_str())
            .with_description(definition.description.as_str());
        if self.ctx.options.translate_codes && !raw.is_empty() {
            if let Some(description) = self.describe(id, raw) {
                element.value = self.ctx.separators.escape(&description);
            }
        }
        Ok(element)
    }

    /// Description of a coded value; unreadable code lists only produce a warning
    fn describe(&self, id: &str, raw: &str) -> Option<String> {
        match self
            .ctx
            .provider
            .codes_for(id, self.directory, self.ctx.syntax_version)
        {
            Ok(codes) => translate(raw, &codes).map(str::to_string),
            Err(err) => {
                warn!("code list of data element \"{}\" unavailable: {}", id, err);
                None
            }
        }
    }
}

fn group_required(node: &SchemaNode) -> Error {
    Error::Syntax(format!("segment group \"{}\" is required", node.id))
}

fn misplaced_definition(node: &SchemaNode, owner: &str) -> Error {
    Error::Schema(edi_schema::Error::InvalidFormat(format!(
        "{} \"{}\" cannot appear in \"{owner}\"",
        node.kind.label(),
        node.id
    )))
}
