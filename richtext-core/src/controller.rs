//! Document controller: the single writer of the live document
//!
//! Every public mutator validates its coordinates first. Invalid input is a
//! no-op: nothing is snapshotted, nothing changes, no notification fires.
//! Applied mutations push one snapshot into the history, edit the document,
//! normalize it, bump the revision and notify listeners exactly once.

use crossbeam_channel::{Receiver, Sender};
use std::fmt;

use crate::history::History;
use crate::model::{
    byte_index, Alignment, Block, BlockKind, Document, FormatFlag, Span, TextFormat,
};
use crate::parse;
use crate::position::Position;
use crate::serialize;
use crate::text_diff;

/// Boolean formatting state at a caret
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActiveFormats {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub superscript: bool,
    pub subscript: bool,
}

impl From<&TextFormat> for ActiveFormats {
    fn from(format: &TextFormat) -> Self {
        Self {
            bold: format.bold,
            italic: format.italic,
            underline: format.underline,
            strikethrough: format.strikethrough,
            superscript: format.superscript,
            subscript: format.subscript,
        }
    }
}

/// Value-carrying span attributes settable on a range
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleAttr {
    Link,
    Color,
    Background,
    FontFamily,
    FontSize,
}

impl StyleAttr {
    fn slot(self, format: &mut TextFormat) -> &mut Option<String> {
        match self {
            StyleAttr::Link => &mut format.link,
            StyleAttr::Color => &mut format.color,
            StyleAttr::Background => &mut format.background,
            StyleAttr::FontFamily => &mut format.font_family,
            StyleAttr::FontSize => &mut format.font_size,
        }
    }
}

/// Sent to subscribers after every applied mutation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChangeEvent {
    pub revision: u64,
}

/// Handle returned by `on_change`, used to remove the listener again
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut()>;

/// Owns the live document and its undo/redo history
pub struct DocumentController {
    doc: Document,
    history: History,
    revision: u64,
    listeners: Vec<(ListenerId, Listener)>,
    subscribers: Vec<Sender<ChangeEvent>>,
    next_listener: u64,
}

impl Default for DocumentController {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DocumentController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentController")
            .field("doc", &self.doc)
            .field("history", &self.history)
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl DocumentController {
    /// Controller over a single empty paragraph
    pub fn new() -> Self {
        Self::with_document(Document::new())
    }

    pub fn with_document(doc: Document) -> Self {
        Self::with_history(doc, History::new())
    }

    pub fn with_history(mut doc: Document, history: History) -> Self {
        doc.normalize();
        Self {
            doc,
            history,
            revision: 0,
            listeners: Vec::new(),
            subscribers: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Serialize the live document
    pub fn html(&self) -> String {
        serialize::serialize(&self.doc)
    }

    /// Number of applied mutations (including undo/redo) so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Register a listener fired after every applied mutation
    pub fn on_change(&mut self, listener: impl FnMut() + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Queue-based alternative to `on_change`
    pub fn subscribe(&mut self) -> Receiver<ChangeEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    fn notify(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener();
        }

        let event = ChangeEvent {
            revision: self.revision,
        };
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }

    /// Snapshot, apply `edit`, normalize, notify
    fn commit<R>(&mut self, op: &str, edit: impl FnOnce(&mut Document) -> R) -> R {
        self.history.push_state(&self.doc);
        let result = edit(&mut self.doc);
        self.doc.normalize();
        self.changed(op);
        result
    }

    fn changed(&mut self, op: &str) {
        self.revision += 1;
        log::trace!("{} applied at revision {}", op, self.revision);
        self.notify();
    }

    fn block_len(&self, op: &str, block: usize) -> Option<usize> {
        let len = self.doc.block(block).map(Block::char_len);
        if len.is_none() {
            log::debug!(
                "{}: block {} out of range ({} blocks), ignoring",
                op,
                block,
                self.doc.len()
            );
        }
        len
    }

    /// Insert text at `offset`, inheriting the format of the covering span
    pub fn insert_text(&mut self, block: usize, offset: usize, text: &str) {
        if text.is_empty() {
            log::debug!("insert_text: empty text, ignoring");
            return;
        }
        if self.block_len("insert_text", block).is_none() {
            return;
        }

        self.commit("insert_text", |doc| {
            if let Some(target) = doc.block_mut(block) {
                insert_inheriting(target, offset, text);
            }
        });
    }

    /// Insert text carrying exactly `format` (a pending caret format)
    pub fn insert_formatted_text(
        &mut self,
        block: usize,
        offset: usize,
        text: &str,
        format: TextFormat,
    ) {
        if text.is_empty() {
            log::debug!("insert_formatted_text: empty text, ignoring");
            return;
        }
        if self.block_len("insert_formatted_text", block).is_none() {
            return;
        }

        self.commit("insert_formatted_text", |doc| {
            if let Some(target) = doc.block_mut(block) {
                insert_span(target, offset, Span::new(text, format));
            }
        });
    }

    /// Delete `length` characters starting at `start`
    pub fn delete_text(&mut self, block: usize, start: usize, length: usize) {
        let Some(len) = self.block_len("delete_text", block) else {
            return;
        };
        if length == 0 || start >= len {
            log::debug!(
                "delete_text: empty range {}+{} in block of {}, ignoring",
                start,
                length,
                len
            );
            return;
        }

        let end = start.saturating_add(length).min(len);
        self.commit("delete_text", |doc| {
            if let Some(target) = doc.block_mut(block) {
                delete_span_range(target, start, end);
            }
        });
    }

    /// Sync a block to text edited externally, keeping formatting outside
    /// the changed middle. The inserted middle uses `pending` if given, else
    /// the format at the edit point.
    pub fn update_block_text(
        &mut self,
        block: usize,
        old_text: &str,
        new_text: &str,
        pending: Option<TextFormat>,
    ) {
        if self.block_len("update_block_text", block).is_none() {
            return;
        }
        let Some(edit) = text_diff::compute(old_text, new_text) else {
            log::debug!("update_block_text: text unchanged, ignoring");
            return;
        };

        self.commit("update_block_text", |doc| {
            let Some(target) = doc.block_mut(block) else {
                return;
            };
            let len = target.char_len();
            let start = edit.start.min(len);
            let end = start.saturating_add(edit.delete_len).min(len);
            if end > start {
                delete_span_range(target, start, end);
            }
            if !edit.insert.is_empty() {
                match pending {
                    Some(format) => insert_span(target, start, Span::new(edit.insert, format)),
                    None => insert_inheriting(target, start, &edit.insert),
                }
            }
        });
    }

    /// Delete everything between two positions, joining the end block into
    /// the start block when they differ. Returns the resulting caret.
    pub fn delete_range(&mut self, from: Position, to: Position) -> Option<Position> {
        let (start, end) = Position::ordered(from, to);
        let start_len = self.block_len("delete_range", start.block)?;
        let end_len = self.block_len("delete_range", end.block)?;

        let start = Position::new(start.block, start.offset.min(start_len));
        let end = Position::new(end.block, end.offset.min(end_len));
        if start == end {
            log::debug!("delete_range: empty range at {:?}, ignoring", start);
            return None;
        }

        self.commit("delete_range", |doc| {
            let blocks = doc.blocks_mut();
            if start.block == end.block {
                delete_span_range(&mut blocks[start.block], start.offset, end.offset);
                return;
            }

            delete_span_range(&mut blocks[start.block], start.offset, start_len);
            let mut removed: Vec<Block> = blocks.drain(start.block + 1..=end.block).collect();
            if let Some(mut last) = removed.pop() {
                delete_span_range(&mut last, 0, end.offset);
                blocks[start.block].spans_mut().extend(last.into_spans());
            }
        });
        Some(start)
    }

    /// Toggle a boolean format over `[start, end)`. The range counts as
    /// active when every non-empty span inside already has the flag.
    pub fn toggle_format(&mut self, block: usize, start: usize, end: usize, flag: FormatFlag) {
        let Some(len) = self.block_len("toggle_format", block) else {
            return;
        };
        if end <= start || start >= len {
            log::debug!("toggle_format: empty range {}..{}, ignoring", start, end);
            return;
        }

        let end = end.min(len);
        self.commit("toggle_format", |doc| {
            let Some(target) = doc.block_mut(block) else {
                return;
            };
            let first = target.split_at(start);
            let last = target.split_at(end);
            let spans = &mut target.spans_mut()[first..last];

            // Boundary splits leave no span straddling the range
            let active = spans
                .iter()
                .filter(|s| !s.is_empty())
                .all(|s| s.format.flag(flag));

            for span in spans.iter_mut() {
                span.format.set_flag(flag, !active);
            }
        });
    }

    /// `toggle_format` addressed by format name; unknown names are ignored
    pub fn toggle_format_named(&mut self, block: usize, start: usize, end: usize, name: &str) {
        match name.parse::<FormatFlag>() {
            Ok(flag) => self.toggle_format(block, start, end, flag),
            Err(err) => log::debug!("toggle_format: {}, ignoring", err),
        }
    }

    /// Set or clear a value attribute (link, color, font) over `[start, end)`
    pub fn set_style(
        &mut self,
        block: usize,
        start: usize,
        end: usize,
        attr: StyleAttr,
        value: Option<String>,
    ) {
        let Some(len) = self.block_len("set_style", block) else {
            return;
        };
        if end <= start || start >= len {
            log::debug!("set_style: empty range {}..{}, ignoring", start, end);
            return;
        }

        let end = end.min(len);
        self.commit("set_style", |doc| {
            let Some(target) = doc.block_mut(block) else {
                return;
            };
            let first = target.split_at(start);
            let last = target.split_at(end);
            for span in &mut target.spans_mut()[first..last] {
                *attr.slot(&mut span.format) = value.clone();
            }
        });
    }

    /// Boolean formats of the span covering `offset`
    pub fn get_format_at(&self, block: usize, offset: usize) -> ActiveFormats {
        self.format_at(block, offset)
            .map(|format| ActiveFormats::from(&format))
            .unwrap_or_default()
    }

    /// Full format of the span covering `offset`; None for a missing or
    /// empty block
    pub fn format_at(&self, block: usize, offset: usize) -> Option<TextFormat> {
        let target = self.doc.block(block).filter(|b| !b.is_empty())?;
        let (index, _) = target.locate(offset);
        Some(target.spans()[index].format.clone())
    }

    /// Split a block at `offset`. The left half keeps the block's kind and
    /// alignment; the right half becomes a new paragraph right after it.
    /// Returns the new block's index.
    pub fn split_block(&mut self, block: usize, offset: usize) -> Option<usize> {
        self.block_len("split_block", block)?;

        self.commit("split_block", |doc| {
            let blocks = doc.blocks_mut();
            let target = &mut blocks[block];
            let index = target.split_at(offset);
            let right = target.spans_mut().split_off(index);

            // An empty half keeps the neighbouring format for the caret
            let left_format = target
                .spans()
                .last()
                .or(right.first())
                .map(|s| s.format.clone())
                .unwrap_or_default();
            let right_format = right
                .first()
                .map(|s| s.format.clone())
                .unwrap_or_else(|| left_format.clone());
            target.ensure_span(left_format);

            let mut new_block = Block::with_spans(BlockKind::Paragraph, right);
            if new_block.spans().len() == 1 && new_block.is_empty() {
                new_block = Block::with_spans(BlockKind::Paragraph, vec![Span::empty(right_format)]);
            }
            blocks.insert(block + 1, new_block);
        });
        Some(block + 1)
    }

    /// Append a block onto its predecessor and remove it. Returns the caret
    /// offset in the merged block (the predecessor's previous length).
    pub fn merge_with_previous(&mut self, block: usize) -> Option<usize> {
        self.block_len("merge_with_previous", block)?;
        if block == 0 {
            log::debug!("merge_with_previous: first block has no predecessor, ignoring");
            return None;
        }

        let caret = self.commit("merge_with_previous", |doc| {
            let blocks = doc.blocks_mut();
            let removed = blocks.remove(block);
            let previous = &mut blocks[block - 1];
            let caret = previous.char_len();
            previous.spans_mut().extend(removed.into_spans());
            previous.normalize();
            caret
        });
        Some(caret)
    }

    /// Rebuild a block with another kind, keeping spans and alignment
    pub fn change_block_type(&mut self, block: usize, kind: BlockKind) {
        if !kind.is_valid() {
            log::debug!("change_block_type: invalid kind {:?}, ignoring", kind);
            return;
        }
        if self.block_len("change_block_type", block).is_none() {
            return;
        }
        if self.doc.blocks()[block].kind() == kind {
            log::debug!("change_block_type: block {} is already {:?}", block, kind);
            return;
        }

        self.commit("change_block_type", |doc| {
            let blocks = doc.blocks_mut();
            let old = std::mem::replace(&mut blocks[block], Block::paragraph());
            blocks[block] = old.into_kind(kind);
        });
    }

    pub fn set_alignment(&mut self, block: usize, alignment: Alignment) {
        if self.block_len("set_alignment", block).is_none()
            || self.doc.blocks()[block].alignment() == alignment
        {
            return;
        }

        self.commit("set_alignment", |doc| {
            if let Some(target) = doc.block_mut(block) {
                target.set_alignment(alignment);
            }
        });
    }

    /// Paste a parsed fragment at a caret. Returns the caret after the
    /// pasted content.
    ///
    /// A fragment of exactly one paragraph is spliced inline. Otherwise the
    /// target is split; a leading paragraph joins the left half, a trailing
    /// paragraph joins the right half, and everything else is inserted whole
    /// in between.
    pub fn insert_parsed_document(
        &mut self,
        block: usize,
        offset: usize,
        fragment: Document,
    ) -> Option<Position> {
        let len = self.block_len("insert_parsed_document", block)?;
        let offset = offset.min(len);

        let inline = fragment.len() == 1 && fragment.blocks()[0].kind().is_paragraph();
        if inline && fragment.blocks()[0].is_empty() {
            log::debug!("insert_parsed_document: empty fragment, ignoring");
            return None;
        }

        if inline {
            let pasted = fragment.blocks()[0].char_len();
            self.commit("insert_parsed_document", |doc| {
                let target = &mut doc.blocks_mut()[block];
                let index = target.split_at(offset);
                let spans = fragment.into_blocks().into_iter().flat_map(Block::into_spans);
                target.spans_mut().splice(index..index, spans);
            });
            return Some(Position::new(block, offset + pasted));
        }

        let caret = self.commit("insert_parsed_document", |doc| {
            let mut incoming = fragment.into_blocks().into_iter();
            let first = incoming.next();
            let last = incoming.next_back();
            let inner: Vec<Block> = incoming.collect();

            let blocks = doc.blocks_mut();
            let target = &mut blocks[block];
            let split = target.split_at(offset);
            let tail = target.spans_mut().split_off(split);

            let mut between = Vec::new();
            match first {
                Some(b) if b.kind().is_paragraph() => target.spans_mut().extend(b.into_spans()),
                Some(b) => between.push(b),
                None => {}
            }
            target.ensure_span(TextFormat::default());
            between.extend(inner);

            let (mut head, caret) = match last {
                Some(b) if b.kind().is_paragraph() => {
                    let len = b.char_len();
                    (b.into_spans(), len)
                }
                Some(b) => {
                    between.push(b);
                    (Vec::new(), 0)
                }
                None => (Vec::new(), 0),
            };
            head.extend(tail);

            let right_index = block + 1 + between.len();
            let right = Block::with_spans(BlockKind::Paragraph, head);
            blocks.splice(
                block + 1..block + 1,
                between.into_iter().chain(std::iter::once(right)),
            );
            Position::new(right_index, caret)
        });
        Some(caret)
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo(&self.doc) {
            Some(previous) => {
                self.doc = previous;
                self.changed("undo");
                true
            }
            None => {
                log::debug!("undo: history empty");
                false
            }
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(&self.doc) {
            Some(next) => {
                self.doc = next;
                self.changed("redo");
                true
            }
            None => {
                log::debug!("redo: nothing to redo");
                false
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Forget all undo/redo state
    pub fn reset_history(&mut self) {
        self.history.reset();
    }

    /// Replace the whole document (undoable)
    pub fn set_document(&mut self, doc: Document) {
        self.commit("set_document", move |current| *current = doc);
    }

    /// Parse HTML and replace the document with it (undoable)
    pub fn set_html(&mut self, html: &str) {
        self.set_document(parse::parse_str(html));
    }

    /// Replace the document with a single empty paragraph (undoable)
    pub fn clear(&mut self) {
        self.set_document(Document::new());
    }
}

/// Insert into the span covering `offset`, taking on its format
fn insert_inheriting(block: &mut Block, offset: usize, text: &str) {
    let (index, local) = block.locate(offset);
    let span = &mut block.spans_mut()[index];
    let at = byte_index(&span.text, local);
    span.text.insert_str(at, text);
}

/// Insert a whole span at `offset`, splitting whatever span covers it
fn insert_span(block: &mut Block, offset: usize, span: Span) {
    let index = block.split_at(offset);
    block.spans_mut().insert(index, span);
}

/// Remove `[start, end)`. A block emptied this way keeps one empty span in
/// the format of the first removed span.
fn delete_span_range(block: &mut Block, start: usize, end: usize) {
    let first = block.split_at(start);
    let last = block.split_at(end);
    let removed: Vec<Span> = block.spans_mut().drain(first..last).collect();
    let format = removed
        .into_iter()
        .next()
        .map(|s| s.format)
        .unwrap_or_default();
    block.ensure_span(format);
}
