//! Span/block/document data model
//!
//! All offsets are character offsets (Unicode scalar values), never byte offsets.

use anyhow::{bail, Result};
use std::fmt;
use std::str::FromStr;

/// Boolean formatting attributes that can be toggled on a range
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormatFlag {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Superscript,
    Subscript,
}

impl FormatFlag {
    pub const ALL: [FormatFlag; 6] = [
        FormatFlag::Bold,
        FormatFlag::Italic,
        FormatFlag::Underline,
        FormatFlag::Strikethrough,
        FormatFlag::Superscript,
        FormatFlag::Subscript,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FormatFlag::Bold => "bold",
            FormatFlag::Italic => "italic",
            FormatFlag::Underline => "underline",
            FormatFlag::Strikethrough => "strikethrough",
            FormatFlag::Superscript => "superscript",
            FormatFlag::Subscript => "subscript",
        }
    }
}

impl FromStr for FormatFlag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bold" => Ok(FormatFlag::Bold),
            "italic" => Ok(FormatFlag::Italic),
            "underline" => Ok(FormatFlag::Underline),
            "strikethrough" => Ok(FormatFlag::Strikethrough),
            "superscript" => Ok(FormatFlag::Superscript),
            "subscript" => Ok(FormatFlag::Subscript),
            other => bail!("Unknown format: {}", other),
        }
    }
}

/// Formatting vector carried by every span.
///
/// Color and font values keep the CSS value text they were read from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextFormat {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub superscript: bool,
    pub subscript: bool,
    pub font_family: Option<String>,
    pub font_size: Option<String>,
    pub color: Option<String>,
    pub background: Option<String>,
    pub link: Option<String>,
}

impl TextFormat {
    /// Create a plain (unformatted) format
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style flag setter
    pub fn with(mut self, flag: FormatFlag) -> Self {
        self.set_flag(flag, true);
        self
    }

    pub fn with_link(mut self, href: impl Into<String>) -> Self {
        self.link = Some(href.into());
        self
    }

    pub fn flag(&self, flag: FormatFlag) -> bool {
        match flag {
            FormatFlag::Bold => self.bold,
            FormatFlag::Italic => self.italic,
            FormatFlag::Underline => self.underline,
            FormatFlag::Strikethrough => self.strikethrough,
            FormatFlag::Superscript => self.superscript,
            FormatFlag::Subscript => self.subscript,
        }
    }

    pub fn set_flag(&mut self, flag: FormatFlag, value: bool) {
        match flag {
            FormatFlag::Bold => self.bold = value,
            FormatFlag::Italic => self.italic = value,
            FormatFlag::Underline => self.underline = value,
            FormatFlag::Strikethrough => self.strikethrough = value,
            FormatFlag::Superscript => self.superscript = value,
            FormatFlag::Subscript => self.subscript = value,
        }
    }

    /// True when no attribute is set
    pub fn is_plain(&self) -> bool {
        *self == TextFormat::default()
    }

    /// True when any of the CSS-backed attributes is set
    pub fn has_style(&self) -> bool {
        self.color.is_some()
            || self.background.is_some()
            || self.font_family.is_some()
            || self.font_size.is_some()
    }
}

impl fmt::Display for TextFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = FormatFlag::ALL
            .iter()
            .filter(|flag| self.flag(**flag))
            .map(|flag| flag.name().to_string())
            .collect();
        if let Some(link) = &self.link {
            parts.push(format!("link={}", link));
        }
        if let Some(color) = &self.color {
            parts.push(format!("color={}", color));
        }
        if let Some(background) = &self.background {
            parts.push(format!("background={}", background));
        }
        if let Some(family) = &self.font_family {
            parts.push(format!("font-family={}", family));
        }
        if let Some(size) = &self.font_size {
            parts.push(format!("font-size={}", size));
        }

        if parts.is_empty() {
            f.write_str("plain")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// An atomic run of text with one formatting vector
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub format: TextFormat,
}

impl Span {
    pub fn new(text: impl Into<String>, format: TextFormat) -> Self {
        Self {
            text: text.into(),
            format,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, TextFormat::default())
    }

    /// Empty span carrying the given format
    pub fn empty(format: TextFormat) -> Self {
        Self::new(String::new(), format)
    }

    pub fn char_len(&self) -> usize {
        char_len(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Split this span at a character offset, keeping the left part and
    /// returning the right part with the same format
    pub fn split_off(&mut self, offset: usize) -> Span {
        let at = byte_index(&self.text, offset);
        let right = self.text.split_off(at);
        Span::new(right, self.format.clone())
    }
}

/// Structural type of a block
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Paragraph,
    /// Heading level, always within 1..=6
    Heading(u8),
}

impl BlockKind {
    /// Heading of the given level, or None for levels outside 1..=6
    pub fn heading(level: u8) -> Option<Self> {
        (1..=6).contains(&level).then_some(BlockKind::Heading(level))
    }

    /// Look up a block kind from an HTML tag name (`div` reads as a paragraph)
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "p" | "div" => Some(BlockKind::Paragraph),
            "h1" => Some(BlockKind::Heading(1)),
            "h2" => Some(BlockKind::Heading(2)),
            "h3" => Some(BlockKind::Heading(3)),
            "h4" => Some(BlockKind::Heading(4)),
            "h5" => Some(BlockKind::Heading(5)),
            "h6" => Some(BlockKind::Heading(6)),
            _ => None,
        }
    }

    pub fn tag_name(&self) -> &'static str {
        match self {
            BlockKind::Paragraph => "p",
            BlockKind::Heading(1) => "h1",
            BlockKind::Heading(2) => "h2",
            BlockKind::Heading(3) => "h3",
            BlockKind::Heading(4) => "h4",
            BlockKind::Heading(5) => "h5",
            BlockKind::Heading(_) => "h6",
        }
    }

    /// Stable block-type identifier used by hosts
    pub fn type_id(&self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::Heading(1) => "heading1",
            BlockKind::Heading(2) => "heading2",
            BlockKind::Heading(3) => "heading3",
            BlockKind::Heading(4) => "heading4",
            BlockKind::Heading(5) => "heading5",
            BlockKind::Heading(_) => "heading6",
        }
    }

    /// False for headings constructed with a level outside 1..=6
    pub fn is_valid(&self) -> bool {
        match self {
            BlockKind::Paragraph => true,
            BlockKind::Heading(level) => (1..=6).contains(level),
        }
    }

    pub fn is_paragraph(&self) -> bool {
        matches!(self, BlockKind::Paragraph)
    }
}

impl FromStr for BlockKind {
    type Err = anyhow::Error;

    /// Accepts either a type identifier (`heading2`) or a tag name (`h2`)
    fn from_str(s: &str) -> Result<Self> {
        if let Some(kind) = BlockKind::from_tag(s) {
            return Ok(kind);
        }
        match s {
            "paragraph" => Ok(BlockKind::Paragraph),
            _ => match s.strip_prefix("heading").and_then(|n| n.parse::<u8>().ok()) {
                Some(level) => match BlockKind::heading(level) {
                    Some(kind) => Ok(kind),
                    None => bail!("Heading level out of range: {}", level),
                },
                None => bail!("Unknown block type: {}", s),
            },
        }
    }
}

/// Horizontal alignment of a block
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// Exact mapping from a CSS `text-align` value
    pub fn from_css(value: &str) -> Option<Self> {
        match value {
            "left" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" => Some(Alignment::Right),
            "justify" => Some(Alignment::Justify),
            _ => None,
        }
    }

    pub fn css_value(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }
}

/// One structural unit of a document: a non-empty run of spans
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    kind: BlockKind,
    alignment: Alignment,
    spans: Vec<Span>,
}

impl Block {
    /// Create an empty block of the given kind
    pub fn new(kind: BlockKind) -> Self {
        Self::with_spans(kind, Vec::new())
    }

    pub fn paragraph() -> Self {
        Self::new(BlockKind::Paragraph)
    }

    /// Create a block from spans; an empty span list becomes one empty span
    pub fn with_spans(kind: BlockKind, mut spans: Vec<Span>) -> Self {
        if spans.is_empty() {
            spans.push(Span::default());
        }
        Self {
            kind,
            alignment: Alignment::Left,
            spans,
        }
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.alignment = alignment;
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Mutable span access for in-crate edits. Callers restore the
    /// non-empty invariant through `ensure_span` or `normalize`.
    pub(crate) fn spans_mut(&mut self) -> &mut Vec<Span> {
        &mut self.spans
    }

    /// Consume the block, returning its spans
    pub fn into_spans(self) -> Vec<Span> {
        self.spans
    }

    /// Rebuild this block with another kind, keeping spans and alignment
    pub fn into_kind(self, kind: BlockKind) -> Self {
        Self { kind, ..self }
    }

    /// Plain text of the block
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn char_len(&self) -> usize {
        self.spans.iter().map(Span::char_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(Span::is_empty)
    }

    /// Map a block-global character offset to (span index, offset within span).
    ///
    /// An offset on a boundary between two spans maps to the end of the
    /// earlier one. Offsets past the end clamp to the last span's end.
    pub fn locate(&self, offset: usize) -> (usize, usize) {
        let mut start = 0;
        for (index, span) in self.spans.iter().enumerate() {
            let len = span.char_len();
            if offset <= start + len {
                return (index, offset - start);
            }
            start += len;
        }

        let last = self.spans.len() - 1;
        (last, self.spans[last].char_len())
    }

    /// Make sure a span boundary exists at `offset` (clamped to the block
    /// length) and return the index of the first span starting there.
    pub fn split_at(&mut self, offset: usize) -> usize {
        let offset = offset.min(self.char_len());
        if offset == 0 {
            return 0;
        }

        let (index, local) = self.locate(offset);
        let len = self.spans[index].char_len();
        if local == len {
            return index + 1;
        }
        if local == 0 {
            return index;
        }

        let right = self.spans[index].split_off(local);
        self.spans.insert(index + 1, right);
        index + 1
    }

    /// Restore the non-empty invariant after an edit removed every span
    pub(crate) fn ensure_span(&mut self, format: TextFormat) {
        if self.spans.is_empty() {
            self.spans.push(Span::empty(format));
        }
    }

    /// Merge adjacent format-equal spans and drop empty ones. A block that
    /// would end up with no spans keeps one empty span with the format of
    /// its first span.
    pub fn normalize(&mut self) {
        let fallback = self
            .spans
            .first()
            .map(|s| s.format.clone())
            .unwrap_or_default();

        let mut merged: Vec<Span> = Vec::with_capacity(self.spans.len());
        for span in self.spans.drain(..) {
            if span.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(last) if last.format == span.format => last.text.push_str(&span.text),
                _ => merged.push(span),
            }
        }

        if merged.is_empty() {
            merged.push(Span::empty(fallback));
        }
        self.spans = merged;
    }
}

/// The document root: an ordered, non-empty list of blocks.
///
/// `Clone` is a deep copy; spans own their text, so a clone shares nothing
/// with the original.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A document with a single empty paragraph
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::paragraph()],
        }
    }

    /// Build a document from blocks; no blocks yields one empty paragraph
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        if blocks.is_empty() {
            Self::new()
        } else {
            Self { blocks }
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Consume the document, returning its blocks
    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub(crate) fn block_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.blocks.get_mut(index)
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Block texts joined with newlines
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// True for a document holding exactly one empty, default paragraph
    pub fn is_structurally_empty(&self) -> bool {
        match self.blocks.as_slice() {
            [only] => only.kind().is_paragraph() && only.is_empty(),
            _ => false,
        }
    }

    pub fn normalize(&mut self) {
        for block in &mut self.blocks {
            block.normalize();
        }
    }
}

pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte index of a character offset, clamped to the string length
pub(crate) fn byte_index(s: &str, offset: usize) -> usize {
    s.char_indices().nth(offset).map_or(s.len(), |(i, _)| i)
}
