//! Interchange tokenizer
//!
//! Splits raw interchange text into segments, elements and components and
//! sorts the segments into the envelope skeleton: header, functional groups
//! or messages, trailer. Values stay escaped and borrow from the input.

use tracing::trace;

use crate::syntax::{Separators, split};
use crate::{Error, Result};

/// One segment: its tag and its elements, each split into components
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentToken<'a> {
    pub tag: &'a str,
    /// An empty element has no components
    pub elements: Vec<Vec<&'a str>>,
    /// 1-based position of the segment in the interchange
    pub position: usize,
}

impl SegmentToken<'_> {
    /// Component `component` of element `element`, if present
    #[must_use]
    pub fn component(&self, element: usize, component: usize) -> Option<&str> {
        self.elements
            .get(element)
            .and_then(|components| components.get(component))
            .copied()
    }
}

/// Segments of one message, `UNH` first and `UNT` last
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage<'a> {
    pub segments: Vec<SegmentToken<'a>>,
}

/// A functional group: `UNG`, its messages, `UNE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGroup<'a> {
    pub header: SegmentToken<'a>,
    pub messages: Vec<RawMessage<'a>>,
    pub trailer: SegmentToken<'a>,
}

/// Tokenized interchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens<'a> {
    pub separators: Separators,
    pub has_service_string_advice: bool,
    pub header: SegmentToken<'a>,
    pub groups: Vec<RawGroup<'a>>,
    pub messages: Vec<RawMessage<'a>>,
    pub trailer: SegmentToken<'a>,
}

/// Group being collected, header seen but no trailer yet
struct OpenGroup<'a> {
    header: SegmentToken<'a>,
    messages: Vec<RawMessage<'a>>,
}

/// Read the service string advice, if any, and return the remaining text
fn service_string_advice(text: &str) -> (Separators, bool, &str) {
    if let Some(separators) = Separators::from_una(text) {
        // "UNA" plus six single characters
        let end = text
            .char_indices()
            .nth(9)
            .map_or(text.len(), |(pos, _)| pos);
        return (separators, true, text[end..].trim_start());
    }
    (Separators::default(), false, text)
}

/// Split the segment text into tokens
fn segment_tokens<'a>(body: &'a str, separators: &Separators) -> Result<Vec<SegmentToken<'a>>> {
    let mut tokens = Vec::new();
    for piece in split(body, separators.segment, separators.release, true) {
        let piece = piece.trim_start().trim_end_matches(['\r', '\n']);
        if piece.is_empty() {
            continue;
        }

        let position = tokens.len() + 1;
        let mut elements = split(piece, separators.element, separators.release, false).into_iter();
        let tag = elements.next().unwrap_or_default().trim_end();
        if tag.is_empty() {
            return Err(Error::Syntax(format!(
                "segment {position} has no tag: \"{piece}\""
            )));
        }

        let elements = elements
            .map(|element| {
                if element.is_empty() {
                    Vec::new()
                } else {
                    split(element, separators.component, separators.release, false)
                }
            })
            .collect();
        tokens.push(SegmentToken {
            tag,
            elements,
            position,
        });
    }
    Ok(tokens)
}

/// Tokenize a whole interchange
///
/// # Errors
///
/// Returns [`Error::Syntax`] when the envelope structure is broken: missing
/// or misplaced `UNB`/`UNZ`, unbalanced `UNG`/`UNE` or `UNH`/`UNT`, segments
/// outside a message, segments after `UNZ`, or groups mixed with ungrouped
/// messages.
pub fn tokenize(buffer: &str) -> Result<Tokens<'_>> {
    let (separators, has_service_string_advice, body) = service_string_advice(buffer.trim());
    trace!(?separators, has_service_string_advice, "Read service string advice");

    let mut header: Option<SegmentToken<'_>> = None;
    let mut trailer: Option<SegmentToken<'_>> = None;
    let mut groups = Vec::new();
    let mut messages = Vec::new();
    let mut open_group: Option<OpenGroup<'_>> = None;
    let mut open_message: Option<Vec<SegmentToken<'_>>> = None;

    for token in segment_tokens(body, &separators)? {
        if let Some(unz) = &trailer {
            return Err(Error::Syntax(format!(
                "unexpected segment {} after {} (segment {})",
                token.tag, unz.tag, token.position
            )));
        }
        if header.is_none() && token.tag != "UNB" {
            return Err(Error::Syntax("missing or misplaced UNB segment".to_string()));
        }

        match token.tag {
            "UNB" => {
                if header.is_some() {
                    return Err(unexpected(&token));
                }
                header = Some(token);
            }
            "UNG" => {
                if open_group.is_some() || open_message.is_some() {
                    return Err(unexpected(&token));
                }
                open_group = Some(OpenGroup {
                    header: token,
                    messages: Vec::new(),
                });
            }
            "UNH" => {
                if open_message.is_some() {
                    return Err(unexpected(&token));
                }
                open_message = Some(vec![token]);
            }
            "UNT" => {
                let Some(mut segments) = open_message.take() else {
                    return Err(unexpected(&token));
                };
                segments.push(token);
                let message = RawMessage { segments };
                match open_group.as_mut() {
                    Some(group) => group.messages.push(message),
                    None => messages.push(message),
                }
            }
            "UNE" => {
                if open_message.is_some() {
                    return Err(unexpected(&token));
                }
                let Some(group) = open_group.take() else {
                    return Err(unexpected(&token));
                };
                groups.push(RawGroup {
                    header: group.header,
                    messages: group.messages,
                    trailer: token,
                });
            }
            "UNZ" => {
                if open_message.is_some() {
                    return Err(Error::Syntax("unterminated message before UNZ".to_string()));
                }
                if open_group.is_some() {
                    return Err(Error::Syntax(
                        "unterminated functional group before UNZ".to_string(),
                    ));
                }
                trailer = Some(token);
            }
            _ => match open_message.as_mut() {
                Some(segments) => segments.push(token),
                None => return Err(unexpected(&token)),
            },
        }
    }

    let header = header.ok_or_else(|| Error::Syntax("missing or misplaced UNB segment".to_string()))?;
    if open_message.is_some() {
        return Err(Error::Syntax("unterminated message".to_string()));
    }
    if open_group.is_some() {
        return Err(Error::Syntax("unterminated functional group".to_string()));
    }
    let trailer = trailer.ok_or_else(|| Error::Syntax("missing UNZ segment".to_string()))?;
    if !groups.is_empty() && !messages.is_empty() {
        return Err(Error::Syntax(
            "functional groups and messages cannot be mixed in the same interchange".to_string(),
        ));
    }

    Ok(Tokens {
        separators,
        has_service_string_advice,
        header,
        groups,
        messages,
        trailer,
    })
}

fn unexpected(token: &SegmentToken<'_>) -> Error {
    Error::Syntax(format!(
        "unexpected segment {} (segment {})",
        token.tag, token.position
    ))
}
