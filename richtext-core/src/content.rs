//! Import/export at the host boundary
//!
//! The engine itself is configuration-free; the options in [`Config`] only
//! shape the HTML that crosses into and out of it.

use std::borrow::Cow;

use crate::config::{Config, InputConfig, OutputConfig};
use crate::controller::DocumentController;
use crate::history::History;
use crate::model::Document;
use crate::{parse, serialize};

/// Pre-process raw host HTML and parse it
pub fn import_html(raw: Option<&str>, config: &InputConfig) -> Document {
    let Some(raw) = raw else {
        return Document::new();
    };
    parse::parse_str(&prepare(raw, config))
}

/// Serialize for the host. An empty document exports as "" when
/// `collapse_empty` is set.
pub fn export_html(doc: &Document, config: &OutputConfig) -> String {
    if config.collapse_empty && doc.is_structurally_empty() {
        return String::new();
    }
    serialize::serialize(doc)
}

/// Build a controller over imported content, with history sized from config
pub fn open(raw: Option<&str>, config: &Config) -> DocumentController {
    let doc = import_html(raw, &config.input);
    DocumentController::with_history(doc, History::with_capacity(config.history.capacity))
}

fn prepare<'a>(raw: &'a str, config: &InputConfig) -> Cow<'a, str> {
    let mut text = Cow::Borrowed(raw);

    if config.normalize_newlines && text.contains('\r') {
        text = Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"));
    }
    if config.normalize_quotes && text.contains(is_curly_quote) {
        text = Cow::Owned(
            text.chars()
                .map(|c| match c {
                    '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => '\'',
                    '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => '"',
                    other => other,
                })
                .collect(),
        );
    }
    if config.newlines_to_breaks && text.contains('\n') {
        text = Cow::Owned(text.replace('\n', "<br>"));
    }

    text
}

fn is_curly_quote(c: char) -> bool {
    matches!(
        c,
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' | '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}'
    )
}
