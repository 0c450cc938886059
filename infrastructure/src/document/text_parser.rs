//! Plain text and markdown [`DocumentParser`].
//!
//! Block rules, applied line by line:
//! - `#`-prefixed lines are headings
//! - consecutive `|`-prefixed lines form one table
//! - `![caption](src)` lines are image captions
//! - everything else is paragraph text; blank lines end a paragraph

use policy_application::{DocumentParseError, DocumentParser};
use policy_domain::{BlockKind, NormalizedDocument, TextBlock};
use std::path::Path;
use tracing::debug;

const SUPPORTED_EXTENSIONS: [&str; 4] = ["txt", "text", "md", "markdown"];

#[derive(Debug, Default, Clone, Copy)]
pub struct TextDocumentParser;

impl TextDocumentParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse already-loaded text. `source` names the document.
    pub fn parse_str(&self, source: &str, text: &str) -> NormalizedDocument {
        let text = text.replace("\r\n", "\n");
        let mut blocks = Vec::new();
        let mut current: Option<TextBlock> = None;

        fn flush(current: &mut Option<TextBlock>, blocks: &mut Vec<TextBlock>) {
            if let Some(block) = current.take()
                && !block.text.trim().is_empty()
            {
                blocks.push(block);
            }
        }

        for line in text.lines() {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                flush(&mut current, &mut blocks);
            } else if trimmed.starts_with('#') {
                flush(&mut current, &mut blocks);
                blocks.push(TextBlock::heading(trimmed.trim_start_matches('#').trim()));
            } else if let Some(caption) = image_caption(trimmed) {
                flush(&mut current, &mut blocks);
                blocks.push(TextBlock {
                    kind: BlockKind::ImageCaption,
                    text: caption.to_string(),
                });
            } else {
                let kind = if trimmed.starts_with('|') {
                    BlockKind::Table
                } else {
                    BlockKind::Paragraph
                };
                match current.as_mut() {
                    Some(block) if block.kind == kind => {
                        block.text.push('\n');
                        block.text.push_str(trimmed);
                    }
                    _ => {
                        flush(&mut current, &mut blocks);
                        current = Some(TextBlock {
                            kind,
                            text: trimmed.to_string(),
                        });
                    }
                }
            }
        }
        flush(&mut current, &mut blocks);

        NormalizedDocument::new(source, blocks)
    }
}

/// `![caption](src)` → `caption`; falls back to `src` for an empty caption.
fn image_caption(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("![")?;
    let (caption, rest) = rest.split_once("](")?;
    let src = rest.strip_suffix(')')?;
    let caption = caption.trim();
    Some(if caption.is_empty() { src.trim() } else { caption })
}

impl DocumentParser for TextDocumentParser {
    fn parse(&self, path: &Path) -> Result<NormalizedDocument, DocumentParseError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if !ext.is_empty() && !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(DocumentParseError::UnsupportedFormat(format!(
                "{} (supported: {})",
                path.display(),
                SUPPORTED_EXTENSIONS.join(", ")
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|source| DocumentParseError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let document = self.parse_str(&source, &text);
        debug!("Parsed {} into {} blocks", source, document.blocks.len());
        Ok(document)
    }
}
