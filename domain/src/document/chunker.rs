//! Deterministic document chunker.
//!
//! Splits normalized text into chunks of at most `max_tokens` approximate
//! tokens. Boundaries are chosen in this order of preference:
//!
//! 1. paragraph boundaries (blank lines, markdown headings)
//! 2. sentence boundaries inside an oversized paragraph
//! 3. word boundaries inside an oversized sentence
//!
//! A single word that alone exceeds the budget becomes its own chunk; it is
//! the only case where `approx_token_count > max_tokens`.
//!
//! Chunk texts are exact slices of the normalized text (see
//! [`DocumentChunk::source_span`]), so re-inserting the whitespace between
//! spans reconstructs the document byte for byte.

use super::entities::{DocumentChunk, NormalizedDocument, SourceSpan};
use crate::core::error::ChunkingError;

/// Default token budget per chunk.
pub const DEFAULT_MAX_TOKENS: usize = 400;

/// Approximate token count: a quarter of the character count, but never
/// fewer than the number of whitespace-separated words.
pub fn approx_token_count(text: &str) -> usize {
    let by_chars = text.chars().count().div_ceil(4);
    let words = text.split_whitespace().count();
    by_chars.max(words)
}

/// Normalize line endings to `\n`.
pub fn normalize(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Chunk `text` with the given budget.
pub fn chunk(text: &str, max_tokens: usize) -> Result<Vec<DocumentChunk>, ChunkingError> {
    Chunker::new(max_tokens).chunk(text)
}

/// Paragraph-preserving chunker.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    max_tokens: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TOKENS)
    }
}

impl Chunker {
    pub fn new(max_tokens: usize) -> Self {
        Self { max_tokens }
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Chunk a parsed document; block boundaries become split points.
    pub fn chunk_document(
        &self,
        document: &NormalizedDocument,
    ) -> Result<Vec<DocumentChunk>, ChunkingError> {
        self.chunk(&document.flatten())
    }

    /// Chunk raw text.
    ///
    /// Spans in the returned chunks index into `normalize(text)`.
    pub fn chunk(&self, text: &str) -> Result<Vec<DocumentChunk>, ChunkingError> {
        if self.max_tokens == 0 {
            return Err(ChunkingError::ZeroBudget);
        }
        let text = normalize(text);
        if text.trim().is_empty() {
            return Err(ChunkingError::EmptyInput);
        }

        let units = self.units(&text);
        let spans = self.pack_units(&text, &units);

        Ok(spans
            .into_iter()
            .enumerate()
            .map(|(ordinal, (start, end))| {
                let slice = &text[start..end];
                DocumentChunk {
                    id: format!("chunk-{:04}", ordinal),
                    ordinal,
                    text: slice.to_string(),
                    approx_token_count: approx_token_count(slice),
                    source_span: SourceSpan { start, end },
                }
            })
            .collect())
    }

    fn fits(&self, text: &str) -> bool {
        approx_token_count(text) <= self.max_tokens
    }

    /// Break the text into packable units no larger than the budget
    /// (except single oversize words).
    fn units(&self, text: &str) -> Vec<Unit> {
        let mut units = Vec::new();
        for para in paragraphs(text) {
            if self.fits(&text[para.start..para.end]) {
                units.push(para);
                continue;
            }
            for (s_start, s_end) in sentence_spans(text, para.start, para.end) {
                if self.fits(&text[s_start..s_end]) {
                    units.push(Unit::body(s_start, s_end));
                    continue;
                }
                let words = word_spans(text, s_start, s_end);
                for (w_start, w_end) in self.pack_spans(text, &words) {
                    units.push(Unit::body(w_start, w_end));
                }
            }
        }
        units
    }

    /// Greedily merge adjacent spans while the merged slice fits.
    fn pack_spans(&self, text: &str, spans: &[(usize, usize)]) -> Vec<(usize, usize)> {
        let mut packed = Vec::new();
        let mut current: Option<(usize, usize)> = None;
        for &(start, end) in spans {
            current = match current {
                None => Some((start, end)),
                Some((c_start, _)) if self.fits(&text[c_start..end]) => Some((c_start, end)),
                Some(done) => {
                    packed.push(done);
                    Some((start, end))
                }
            };
        }
        packed.extend(current);
        packed
    }

    /// Pack units into chunk spans. A heading is never left as the last
    /// unit of a chunk when the following unit would not fit with it.
    fn pack_units(&self, text: &str, units: &[Unit]) -> Vec<(usize, usize)> {
        let mut packed = Vec::new();
        let mut current: Option<(usize, usize)> = None;

        for (idx, unit) in units.iter().enumerate() {
            current = match current {
                None => Some((unit.start, unit.end)),
                Some((c_start, c_end)) => {
                    let fits = self.fits(&text[c_start..unit.end]);
                    let strands_heading = unit.heading
                        && units
                            .get(idx + 1)
                            .is_some_and(|next| !self.fits(&text[c_start..next.end]));
                    if fits && !strands_heading {
                        Some((c_start, unit.end))
                    } else {
                        packed.push((c_start, c_end));
                        Some((unit.start, unit.end))
                    }
                }
            };
        }
        packed.extend(current);
        packed
    }
}

#[derive(Debug, Clone, Copy)]
struct Unit {
    start: usize,
    end: usize,
    heading: bool,
}

impl Unit {
    fn body(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            heading: false,
        }
    }
}

fn is_heading(line: &str) -> bool {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    (1..=6).contains(&hashes) && line[hashes..].starts_with(' ')
}

/// Trimmed paragraph spans. Blank lines separate paragraphs; a markdown
/// heading line is always a paragraph of its own.
fn paragraphs(text: &str) -> Vec<Unit> {
    let mut out = Vec::new();
    let mut current: Option<(usize, usize)> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        let content = line.trim();
        if content.is_empty() {
            if let Some((start, end)) = current.take() {
                out.push(Unit::body(start, end));
            }
            continue;
        }

        let start = line_start + (line.len() - line.trim_start().len());
        let end = start + content.len();

        if is_heading(content) {
            if let Some((p_start, p_end)) = current.take() {
                out.push(Unit::body(p_start, p_end));
            }
            out.push(Unit {
                start,
                end,
                heading: true,
            });
            continue;
        }

        current = match current {
            Some((p_start, _)) => Some((p_start, end)),
            None => Some((start, end)),
        };
    }

    if let Some((start, end)) = current {
        out.push(Unit::body(start, end));
    }
    out
}

/// Push `slice[from..to]` trimmed, offset by `base`, if non-empty.
fn push_trimmed(slice: &str, from: usize, to: usize, base: usize, spans: &mut Vec<(usize, usize)>) {
    let piece = &slice[from..to];
    let trimmed = piece.trim();
    if trimmed.is_empty() {
        return;
    }
    let start = base + from + (piece.len() - piece.trim_start().len());
    spans.push((start, start + trimmed.len()));
}

/// Sentence spans inside `text[start..end]`. A sentence ends at `.`, `!`
/// or `?` followed by whitespace or the end of the range, so decimals such
/// as `80.5%` do not split.
fn sentence_spans(text: &str, start: usize, end: usize) -> Vec<(usize, usize)> {
    let slice = &text[start..end];
    let mut spans = Vec::new();
    let mut sentence_start = 0;
    let mut chars = slice.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
        if at_boundary {
            let sentence_end = i + c.len_utf8();
            push_trimmed(slice, sentence_start, sentence_end, start, &mut spans);
            sentence_start = sentence_end;
        }
    }
    if sentence_start < slice.len() {
        push_trimmed(slice, sentence_start, slice.len(), start, &mut spans);
    }
    spans
}

/// Whitespace-separated word spans inside `text[start..end]`.
fn word_spans(text: &str, start: usize, end: usize) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut word_start = None;
    for (i, c) in text[start..end].char_indices() {
        if c.is_whitespace() {
            if let Some(s) = word_start.take() {
                spans.push((start + s, start + i));
            }
        } else if word_start.is_none() {
            word_start = Some(i);
        }
    }
    if let Some(s) = word_start {
        spans.push((start + s, end));
    }
    spans
}
