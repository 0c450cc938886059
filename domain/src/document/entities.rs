//! Document content model and chunks.

use serde::{Deserialize, Serialize};

/// Kind of a normalized content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    #[default]
    Paragraph,
    Heading,
    Table,
    ImageCaption,
}

/// One block of a parsed document, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    pub kind: BlockKind,
    pub text: String,
}

impl TextBlock {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Paragraph,
            text: text.into(),
        }
    }

    pub fn heading(text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Heading,
            text: text.into(),
        }
    }

    /// Render the block into the flattened text stream.
    fn render(&self) -> String {
        let text = self.text.trim();
        match self.kind {
            BlockKind::Heading if !text.starts_with('#') => format!("# {}", text),
            BlockKind::ImageCaption => format!("[image] {}", text),
            _ => text.to_string(),
        }
    }
}

/// Normalized content produced by a document parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedDocument {
    /// Identifier of the source (file name, upload id)
    pub source: String,
    pub blocks: Vec<TextBlock>,
}

impl NormalizedDocument {
    pub fn new(source: impl Into<String>, blocks: Vec<TextBlock>) -> Self {
        Self {
            source: source.into(),
            blocks,
        }
    }

    /// Flatten blocks into one text stream.
    ///
    /// Blocks are separated by a blank line so every block boundary is a
    /// paragraph boundary for the chunker. Headings are rendered as
    /// markdown headings.
    pub fn flatten(&self) -> String {
        self.blocks
            .iter()
            .map(TextBlock::render)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|b| b.text.trim().is_empty())
    }
}

/// Byte range `[start, end)` into the normalized document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A bounded-size, context-preserving segment of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: String,
    /// 0-based position in document order
    pub ordinal: usize,
    pub text: String,
    pub approx_token_count: usize,
    pub source_span: SourceSpan,
}
