//! Inline artefact extraction.
//!
//! Assistant text may embed diagram source inside an open/close envelope,
//! e.g. `before <mermaid>graph TD; A-->B</mermaid> after`. The extractor
//! splits the text into prose and artefact segments in one forward scan.
//!
//! Rules:
//! - The first close token after an open token ends the payload; there is
//!   no escape for a literal close token inside a payload.
//! - An open token with no close token is left as prose, along with
//!   everything after it.
//! - Empty prose runs are dropped, so adjacent artefacts produce no text
//!   segment between them and empty input produces no segments at all.

use tutor_types::config::ArtefactSyntax;
use crate::ports::DiagramRenderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtefactKind {
    Diagram,
}

/// A borrowed slice of the input, before rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span<'a> {
    Text(&'a str),
    Artefact { ordinal: usize, source: &'a str },
}

/// A parsed segment; artefacts carry their rendered element
#[derive(Debug, Clone, PartialEq)]
pub enum ArtefactSegment<E> {
    Text(String),
    Artefact {
        kind: ArtefactKind,
        element_id: String,
        source: String,
        element: E,
    },
}

impl<E> ArtefactSegment<E> {
    pub fn is_text(&self) -> bool {
        matches!(self, ArtefactSegment::Text(_))
    }
}

#[derive(Debug, Clone)]
pub struct ArtefactExtractor {
    syntax: ArtefactSyntax,
}

impl ArtefactExtractor {
    pub fn new(syntax: ArtefactSyntax) -> Self {
        Self { syntax }
    }

    pub fn syntax(&self) -> &ArtefactSyntax {
        &self.syntax
    }

    /// Deterministic element id for the `ordinal`-th artefact of a message.
    pub fn element_id(message_id: &str, ordinal: usize) -> String {
        format!("artefact-{}-{}", message_id, ordinal)
    }

    /// Split `text` into prose and artefact spans without rendering anything.
    pub fn scan<'a>(&self, text: &'a str) -> Vec<Span<'a>> {
        let open = self.syntax.open.as_str();
        let close = self.syntax.close.as_str();
        let mut spans = Vec::new();
        let mut rest = text;
        let mut ordinal = 0;

        while let Some(start) = rest.find(open) {
            let after_open = &rest[start + open.len()..];
            let Some(end) = after_open.find(close) else {
                break;
            };
            if start > 0 {
                spans.push(Span::Text(&rest[..start]));
            }
            spans.push(Span::Artefact {
                ordinal,
                source: &after_open[..end],
            });
            ordinal += 1;
            rest = &after_open[end + close.len()..];
        }

        if !rest.is_empty() {
            spans.push(Span::Text(rest));
        }
        spans
    }

    /// Parse and render. Every artefact, including an empty one, goes to the renderer.
    pub fn extract<R: DiagramRenderer>(
        &self,
        text: &str,
        message_id: &str,
        renderer: &R,
    ) -> Vec<ArtefactSegment<R::Element>> {
        self.scan(text)
            .into_iter()
            .map(|span| match span {
                Span::Text(t) => ArtefactSegment::Text(t.to_string()),
                Span::Artefact { ordinal, source } => {
                    let element_id = Self::element_id(message_id, ordinal);
                    let element = renderer.render_diagram(&element_id, source);
                    ArtefactSegment::Artefact {
                        kind: ArtefactKind::Diagram,
                        element_id,
                        source: source.to_string(),
                        element,
                    }
                }
            })
            .collect()
    }

    /// The prose of `text` with every complete artefact envelope removed.
    pub fn strip(&self, text: &str) -> String {
        self.scan(text)
            .into_iter()
            .filter_map(|span| match span {
                Span::Text(t) => Some(t),
                Span::Artefact { .. } => None,
            })
            .collect()
    }
}

impl Default for ArtefactExtractor {
    fn default() -> Self {
        Self::new(ArtefactSyntax::default())
    }
}
