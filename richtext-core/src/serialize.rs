//! Document to HTML serializer
//!
//! Output is canonical: inline tags always nest in the order
//! `a`, `b`, `i`, `u`, `s`, `sup`, `sub`, `span` (outer to inner).

use crate::model::{Alignment, Block, Document, Span, TextFormat};
use std::fmt::Write as _;

/// Serialize a document to HTML
pub fn serialize(doc: &Document) -> String {
    let mut out = String::new();
    for block in doc.blocks() {
        write_block(&mut out, block);
    }
    out
}

/// Serialize a single block, tag included
pub fn serialize_block(block: &Block) -> String {
    let mut out = String::new();
    write_block(&mut out, block);
    out
}

fn write_block(out: &mut String, block: &Block) {
    let tag = block.kind().tag_name();
    out.push('<');
    out.push_str(tag);
    if block.alignment() != Alignment::Left {
        let _ = write!(out, " style=\"text-align: {}\"", block.alignment().css_value());
    }
    out.push('>');

    for span in block.spans().iter().filter(|s| !s.is_empty()) {
        write_span(out, span);
    }

    let _ = write!(out, "</{}>", tag);
}

fn write_span(out: &mut String, span: &Span) {
    let format = &span.format;
    let tags = inline_tags(format);

    if let Some(href) = &format.link {
        out.push_str("<a href=\"");
        escape_attr(out, href);
        out.push_str("\">");
    }
    for tag in &tags {
        let _ = write!(out, "<{}>", tag);
    }
    let style = span_style(format);
    if let Some(style) = &style {
        out.push_str("<span style=\"");
        escape_attr(out, style);
        out.push_str("\">");
    }

    for (i, line) in span.text.split('\n').enumerate() {
        if i > 0 {
            out.push_str("<br>");
        }
        escape_text(out, line);
    }

    if style.is_some() {
        out.push_str("</span>");
    }
    for tag in tags.iter().rev() {
        let _ = write!(out, "</{}>", tag);
    }
    if format.link.is_some() {
        out.push_str("</a>");
    }
}

/// Flag tags in canonical outer-to-inner order
fn inline_tags(format: &TextFormat) -> Vec<&'static str> {
    [
        (format.bold, "b"),
        (format.italic, "i"),
        (format.underline, "u"),
        (format.strikethrough, "s"),
        (format.superscript, "sup"),
        (format.subscript, "sub"),
    ]
    .into_iter()
    .filter_map(|(on, tag)| on.then_some(tag))
    .collect()
}

fn span_style(format: &TextFormat) -> Option<String> {
    if !format.has_style() {
        return None;
    }

    let declarations: Vec<String> = [
        ("color", &format.color),
        ("background-color", &format.background),
        ("font-family", &format.font_family),
        ("font-size", &format.font_size),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.as_ref().map(|v| format!("{}: {}", name, v)))
    .collect();

    Some(declarations.join("; "))
}

fn escape_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            _ => escape_text(out, c.encode_utf8(&mut [0; 4])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockKind, FormatFlag};
    use crate::parse::parse_str;

    #[test]
    fn test_serialize_empty_document() {
        assert_eq!(serialize(&Document::new()), "<p></p>");
    }

    #[test]
    fn test_serialize_plain_and_bold() {
        let doc = Document::from_blocks(vec![Block::with_spans(
            BlockKind::Paragraph,
            vec![
                Span::plain("Hello "),
                Span::new("World", TextFormat::new().with(FormatFlag::Bold)),
            ],
        )]);
        assert_eq!(serialize(&doc), "<p>Hello <b>World</b></p>");
    }

    #[test]
    fn test_serialize_canonical_nesting() {
        let format = TextFormat::new()
            .with(FormatFlag::Subscript)
            .with(FormatFlag::Italic)
            .with(FormatFlag::Bold)
            .with(FormatFlag::Strikethrough)
            .with(FormatFlag::Underline)
            .with_link("https://x.test");
        let doc = Document::from_blocks(vec![Block::with_spans(
            BlockKind::Paragraph,
            vec![Span::new("x", format)],
        )]);
        assert_eq!(
            serialize(&doc),
            "<p><a href=\"https://x.test\"><b><i><u><s><sub>x</sub></s></u></i></b></a></p>"
        );
    }

    #[test]
    fn test_serialize_alignment_only_when_not_default() {
        let doc = Document::from_blocks(vec![
            Block::with_spans(BlockKind::Heading(2), vec![Span::plain("a")])
                .with_alignment(Alignment::Center),
            Block::with_spans(BlockKind::Paragraph, vec![Span::plain("b")]),
        ]);
        assert_eq!(
            serialize(&doc),
            "<h2 style=\"text-align: center\">a</h2><p>b</p>"
        );
    }

    #[test]
    fn test_serialize_escapes() {
        let format = TextFormat::new().with_link("a\"b&c");
        let doc = Document::from_blocks(vec![Block::with_spans(
            BlockKind::Paragraph,
            vec![Span::plain("1 < 2 & 3 > 0 \"q\""), Span::new("l", format)],
        )]);
        assert_eq!(
            serialize(&doc),
            "<p>1 &lt; 2 &amp; 3 &gt; 0 \"q\"<a href=\"a&quot;b&amp;c\">l</a></p>"
        );
    }

    #[test]
    fn test_serialize_newline_as_br() {
        let doc = Document::from_blocks(vec![Block::with_spans(
            BlockKind::Paragraph,
            vec![Span::new("a\nb", TextFormat::new().with(FormatFlag::Bold))],
        )]);
        assert_eq!(serialize(&doc), "<p><b>a<br>b</b></p>");
    }

    #[test]
    fn test_serialize_span_style() {
        let format = TextFormat {
            color: Some("red".to_string()),
            font_size: Some("12px".to_string()),
            ..TextFormat::default()
        };
        let doc = Document::from_blocks(vec![Block::with_spans(
            BlockKind::Paragraph,
            vec![Span::new("x", format)],
        )]);
        assert_eq!(
            serialize(&doc),
            "<p><span style=\"color: red; font-size: 12px\">x</span></p>"
        );
    }

    #[test]
    fn test_serialize_skips_empty_spans() {
        let doc = Document::from_blocks(vec![Block::with_spans(
            BlockKind::Paragraph,
            vec![
                Span::new("", TextFormat::new().with(FormatFlag::Bold)),
                Span::plain("x"),
            ],
        )]);
        assert_eq!(serialize(&doc), "<p>x</p>");
    }

    #[test]
    fn test_round_trip_is_stable() {
        let inputs = [
            "<p>Hello <b>World</b></p>",
            "<h1 style=\"text-align: right\">T</h1><p><i>a</i><br>b</p>",
            "<div><strong><em>x</em></strong> &amp; <a href=\"u?a=1&amp;b\">y</a></div>",
            "<p><span style=\"color: blue\"><sup>2</sup></span></p><br><p></p>",
            "loose text <u>under</u>",
        ];
        for input in inputs {
            let once = serialize(&parse_str(input));
            let twice = serialize(&parse_str(&once));
            assert_eq!(once, twice, "unstable round trip for {}", input);
        }
    }
}
