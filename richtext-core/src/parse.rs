//! HTML to document parser
//!
//! Parsing is permissive and never fails. The input is lexed into tokens,
//! assembled into a small element tree, and the tree is walked top-down with
//! inline formatting inherited from ancestors. Unsupported tags are
//! transparent: their children are walked, their own tag adds nothing.

use crate::model::{Alignment, Block, BlockKind, Document, Span, TextFormat};

/// Elements nested deeper than this are flattened into their parent
const MAX_DEPTH: usize = 256;

/// Parse optional HTML into a document. Absent or empty input yields a
/// single empty paragraph.
pub fn parse(html: Option<&str>) -> Document {
    match html {
        Some(html) => parse_str(html),
        None => Document::new(),
    }
}

/// Parse an HTML string into a document
pub fn parse_str(html: &str) -> Document {
    if html.is_empty() {
        return Document::new();
    }

    let tokens = tokenize(html);
    let tree = build_tree(tokens);

    let mut walker = TreeWalker::default();
    walker.walk(&tree, &TextFormat::default());
    walker.finish()
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Start {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    End {
        name: String,
    },
    Text(String),
}

fn tokenize(html: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut rest = html;

    while let Some(lt) = rest.find('<') {
        text.push_str(&rest[..lt]);
        rest = &rest[lt..];

        if let Some(comment) = rest.strip_prefix("<!--") {
            rest = match comment.find("-->") {
                Some(end) => &comment[end + 3..],
                None => "",
            };
            continue;
        }
        if rest.starts_with("<!") || rest.starts_with("<?") {
            rest = match rest.find('>') {
                Some(end) => &rest[end + 1..],
                None => "",
            };
            continue;
        }

        let after = &rest[1..];
        let starts_name = |s: &str| s.starts_with(|c: char| c.is_ascii_alphabetic());
        let is_tag = starts_name(after) || after.strip_prefix('/').is_some_and(starts_name);
        if !is_tag {
            // A lone '<' is literal text
            text.push('<');
            rest = after;
            continue;
        }

        let Some(end) = find_tag_end(rest) else {
            log::debug!("unterminated tag treated as text");
            text.push_str(rest);
            rest = "";
            break;
        };

        flush_text(&mut tokens, &mut text);
        let token = parse_tag(&rest[1..end]);
        rest = &rest[end + 1..];

        if let Token::Start {
            name,
            self_closing: false,
            ..
        } = &token
        {
            if name == "script" || name == "style" {
                rest = skip_raw_text(rest, name);
                continue;
            }
        }
        tokens.push(token);
    }

    text.push_str(rest);
    flush_text(&mut tokens, &mut text);
    tokens
}

fn flush_text(tokens: &mut Vec<Token>, text: &mut String) {
    if !text.is_empty() {
        tokens.push(Token::Text(decode_entities(text)));
        text.clear();
    }
}

/// Byte index of the `>` closing the tag that starts at `input[0]`,
/// ignoring any `>` inside quoted attribute values
fn find_tag_end(input: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut prev = '<';

    for (i, c) in input.char_indices().skip(1) {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '>' => return Some(i),
            None if (c == '"' || c == '\'') && prev == '=' => quote = Some(c),
            None => {}
        }
        if !c.is_whitespace() {
            prev = c;
        }
    }
    None
}

/// Skip the content of a raw-text element up to and including its end tag
fn skip_raw_text<'a>(input: &'a str, name: &str) -> &'a str {
    let closing = format!("</{}", name);
    match input.to_ascii_lowercase().find(&closing) {
        Some(start) => match input[start..].find('>') {
            Some(end) => &input[start + end + 1..],
            None => "",
        },
        None => "",
    }
}

fn parse_tag(content: &str) -> Token {
    let content = content.trim();
    let self_closing = content.ends_with('/');
    let content = content.trim_end_matches('/').trim_end();

    if let Some(name) = content.strip_prefix('/') {
        let name = name
            .split(|c: char| c.is_whitespace())
            .next()
            .unwrap_or_default();
        return Token::End {
            name: name.to_ascii_lowercase(),
        };
    }

    let (name, attrs_str) = match content.find(|c: char| c.is_whitespace()) {
        Some(idx) => (&content[..idx], &content[idx..]),
        None => (content, ""),
    };

    Token::Start {
        name: name.to_ascii_lowercase(),
        attrs: parse_attributes(attrs_str),
        self_closing,
    }
}

/// Parse `key="value"` pairs, respecting single, double, or missing quotes.
/// Keys are lowercased; valueless attributes get an empty value.
fn parse_attributes(attrs_str: &str) -> Vec<(String, String)> {
    let mut result = Vec::new();
    let mut chars = attrs_str.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let mut key = String::new();
        while let Some(c) = chars.next_if(|c| *c != '=' && !c.is_whitespace()) {
            key.push(c);
        }
        if key.is_empty() {
            // Stray '=' or end of input
            if chars.next().is_none() {
                break;
            }
            continue;
        }

        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        if chars.next_if_eq(&'=').is_none() {
            result.push((key.to_ascii_lowercase(), String::new()));
            continue;
        }

        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let mut value = String::new();
        match chars.next_if(|c| *c == '"' || *c == '\'') {
            Some(quote) => {
                for c in chars.by_ref() {
                    if c == quote {
                        break;
                    }
                    value.push(c);
                }
            }
            None => {
                while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                    value.push(c);
                }
            }
        }

        result.push((key.to_ascii_lowercase(), decode_entities(&value)));
    }

    result
}

/// Decode character references; unknown references stay literal
fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        if let Some(semi) = rest[1..].find(';').filter(|&semi| semi <= 10) {
            if let Some(c) = decode_reference(&rest[1..1 + semi]) {
                out.push(c);
                rest = &rest[semi + 2..];
                continue;
            }
        }

        out.push('&');
        rest = &rest[1..];
    }

    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        "ndash" => Some('\u{2013}'),
        "mdash" => Some('\u{2014}'),
        "hellip" => Some('\u{2026}'),
        "copy" => Some('\u{00A9}'),
        _ => {
            let number = name.strip_prefix('#')?;
            let code_point = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse::<u32>().ok()?,
            };
            char::from_u32(code_point)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    fn new(name: String, attrs: Vec<(String, String)>) -> Self {
        Self {
            name,
            attrs,
            children: Vec::new(),
        }
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn is_void(name: &str) -> bool {
    matches!(
        name,
        "br" | "img" | "hr" | "wbr" | "input" | "meta" | "link"
    )
}

/// Assemble tokens into an element tree rooted at an anonymous element
fn build_tree(tokens: Vec<Token>) -> Vec<Node> {
    let mut stack = vec![Element::new(String::new(), Vec::new())];

    for token in tokens {
        match token {
            Token::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    match top.children.last_mut() {
                        Some(Node::Text(prev)) => prev.push_str(&text),
                        _ => top.children.push(Node::Text(text)),
                    }
                }
            }
            Token::Start {
                name,
                attrs,
                self_closing,
            } => {
                let element = Element::new(name, attrs);
                if self_closing || is_void(&element.name) {
                    if let Some(top) = stack.last_mut() {
                        top.children.push(Node::Element(element));
                    }
                } else if stack.len() > MAX_DEPTH {
                    log::debug!("flattening <{}> beyond depth {}", element.name, MAX_DEPTH);
                } else {
                    stack.push(element);
                }
            }
            Token::End { name } => {
                match (1..stack.len()).rev().find(|&i| stack[i].name == name) {
                    Some(index) => close_to(&mut stack, index),
                    None => log::debug!("ignoring unmatched </{}>", name),
                }
            }
        }
    }

    close_to(&mut stack, 1);
    stack.pop().map(|root| root.children).unwrap_or_default()
}

/// Pop open elements until only `len` remain, attaching each to its parent
fn close_to(stack: &mut Vec<Element>, len: usize) {
    while stack.len() > len.max(1) {
        if let Some(element) = stack.pop() {
            if let Some(parent) = stack.last_mut() {
                parent.children.push(Node::Element(element));
            }
        }
    }
}

/// Block under construction
#[derive(Debug)]
struct PendingBlock {
    kind: BlockKind,
    alignment: Alignment,
    spans: Vec<Span>,
    /// Opened by a block tag rather than implied by stray inline content
    explicit: bool,
    /// Source indentation seen since the last run; becomes one space if more
    /// text follows on the same line
    pending_space: Option<TextFormat>,
}

impl PendingBlock {
    fn new(kind: BlockKind, alignment: Alignment, explicit: bool) -> Self {
        Self {
            kind,
            alignment,
            spans: Vec::new(),
            explicit,
            pending_space: None,
        }
    }

    fn has_content(&self) -> bool {
        self.spans.iter().any(|s| !s.is_empty())
    }

    /// True before any text and right after a line break
    fn at_line_start(&self) -> bool {
        self.spans
            .iter()
            .rev()
            .find(|s| !s.is_empty())
            .map_or(true, |s| s.text.ends_with('\n'))
    }

    fn push(&mut self, span: Span) {
        if let Some(format) = self.pending_space.take() {
            self.spans.push(Span::new(" ", format));
        }
        self.spans.push(span);
    }

    fn into_block(self) -> Block {
        Block::with_spans(self.kind, self.spans).with_alignment(self.alignment)
    }
}

#[derive(Debug, Default)]
struct TreeWalker {
    blocks: Vec<Block>,
    current: Option<PendingBlock>,
    /// Kinds of the block elements enclosing the walk position
    outer: Vec<(BlockKind, Alignment)>,
}

impl TreeWalker {
    fn walk(&mut self, nodes: &[Node], format: &TextFormat) {
        for node in nodes {
            match node {
                Node::Text(text) => self.text(text, format),
                Node::Element(element) if element.name == "br" => self.line_break(format),
                Node::Element(element) => match BlockKind::from_tag(&element.name) {
                    Some(kind) => self.block(element, kind, format),
                    None => {
                        let inner = inline_format(element, format);
                        self.walk(&element.children, &inner);
                    }
                },
            }
        }
    }

    fn block(&mut self, element: &Element, kind: BlockKind, format: &TextFormat) {
        let alignment = element
            .attr("style")
            .and_then(text_align)
            .unwrap_or_default();

        // Content of an enclosing block so far ends here
        if let Some(outer) = self.current.take() {
            if outer.has_content() {
                self.blocks.push(outer.into_block());
            }
        }

        self.current = Some(PendingBlock::new(kind, alignment, true));
        self.outer.push((kind, alignment));
        self.walk(&element.children, format);
        self.outer.pop();
        self.flush();

        if let Some(&(kind, alignment)) = self.outer.last() {
            self.current = Some(PendingBlock::new(kind, alignment, false));
        }
    }

    fn text(&mut self, text: &str, format: &TextFormat) {
        let blank = text.trim().is_empty();
        if self.current.is_none() {
            if blank {
                return;
            }
            self.current = Some(PendingBlock::new(BlockKind::Paragraph, Alignment::Left, false));
        }
        let Some(block) = &mut self.current else {
            return;
        };

        if blank {
            if !text.contains(is_source_break) {
                block.push(Span::new(text, format.clone()));
            } else if !block.at_line_start() {
                // Indentation between tags: a word gap inside a line, nothing at its edges
                block.pending_space = Some(format.clone());
            }
            return;
        }

        let is_ws = |c: char| c.is_ascii_whitespace();
        let lead = &text[..text.len() - text.trim_start_matches(is_ws).len()];
        let trail = &text[text.trim_end_matches(is_ws).len()..];
        let body = text.trim_matches(is_ws);

        let mut run = String::with_capacity(text.len());
        if !lead.contains(is_source_break) {
            run.push_str(lead);
        } else if !block.at_line_start() && block.pending_space.is_none() {
            block.pending_space = Some(format.clone());
        }
        run.push_str(&collapse_source_breaks(body));
        let trailing_break = trail.contains(is_source_break);
        if !trailing_break {
            run.push_str(trail);
        }

        block.push(Span::new(run, format.clone()));
        if trailing_break {
            block.pending_space = Some(format.clone());
        }
    }

    fn line_break(&mut self, format: &TextFormat) {
        match &mut self.current {
            Some(block) => {
                block.pending_space = None;
                block.spans.push(Span::new("\n", format.clone()));
            }
            None => self.blocks.push(Block::paragraph()),
        }
    }

    fn flush(&mut self) {
        if let Some(block) = self.current.take() {
            if block.explicit || block.has_content() {
                self.blocks.push(block.into_block());
            }
        }
    }

    fn finish(mut self) -> Document {
        self.flush();
        let mut doc = Document::from_blocks(self.blocks);
        doc.normalize();
        doc
    }
}

fn is_source_break(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\t')
}

/// Collapse every whitespace run holding a raw newline or tab to one space.
/// Only `<br>` produces a line break in the model.
fn collapse_source_breaks(text: &str) -> String {
    if !text.contains(is_source_break) {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut run = String::new();
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            run.push(c);
            continue;
        }
        end_run(&mut out, &mut run);
        out.push(c);
    }
    end_run(&mut out, &mut run);
    out
}

fn end_run(out: &mut String, run: &mut String) {
    if run.contains(is_source_break) {
        out.push(' ');
    } else {
        out.push_str(run);
    }
    run.clear();
}

/// Format of an inline element's content, inherited from `parent`
fn inline_format(element: &Element, parent: &TextFormat) -> TextFormat {
    let mut format = parent.clone();
    match element.name.as_str() {
        "b" | "strong" => format.bold = true,
        "i" | "em" => format.italic = true,
        "u" | "ins" => format.underline = true,
        "s" | "strike" | "del" => format.strikethrough = true,
        "sup" => format.superscript = true,
        "sub" => format.subscript = true,
        "a" => {
            if let Some(href) = element.attr("href") {
                format.link = Some(href.to_string());
            }
        }
        "span" => {
            if let Some(style) = element.attr("style") {
                for (name, value) in declarations(style) {
                    match name.as_str() {
                        "color" => format.color = Some(value),
                        "background-color" | "background" => format.background = Some(value),
                        "font-family" => format.font_family = Some(value),
                        "font-size" => format.font_size = Some(value),
                        _ => {}
                    }
                }
            }
        }
        "font" => {
            if let Some(color) = element.attr("color") {
                format.color = Some(color.to_string());
            }
            if let Some(face) = element.attr("face") {
                format.font_family = Some(face.to_string());
            }
        }
        _ => {}
    }
    format
}

/// Split an inline style attribute into (lowercased property, value) pairs
fn declarations(style: &str) -> impl Iterator<Item = (String, String)> + '_ {
    style.split(';').filter_map(|declaration| {
        let (name, value) = declaration.split_once(':')?;
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        Some((name.trim().to_ascii_lowercase(), value.to_string()))
    })
}

fn text_align(style: &str) -> Option<Alignment> {
    declarations(style)
        .filter(|(name, _)| name == "text-align")
        .find_map(|(_, value)| Alignment::from_css(&value.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FormatFlag;
    use crate::serialize::serialize;

    fn spans(doc: &Document, block: usize) -> Vec<(String, TextFormat)> {
        doc.blocks()[block]
            .spans()
            .iter()
            .map(|s| (s.text.clone(), s.format.clone()))
            .collect()
    }

    #[test]
    fn test_parse_empty_and_none() {
        for doc in [parse(None), parse(Some("")), parse_str("")] {
            assert_eq!(doc.len(), 1);
            assert!(doc.is_structurally_empty());
        }
    }

    #[test]
    fn test_parse_paragraph_with_bold() {
        let doc = parse_str("<p>Hello <b>World</b></p>");
        assert_eq!(doc.len(), 1);
        assert_eq!(
            spans(&doc, 0),
            vec![
                ("Hello ".to_string(), TextFormat::new()),
                ("World".to_string(), TextFormat::new().with(FormatFlag::Bold)),
            ]
        );
    }

    #[test]
    fn test_parse_inline_aliases() {
        let doc = parse_str(
            "<p><strong>a</strong><em>b</em><ins>c</ins><del>d</del><strike>e</strike><sup>f</sup><sub>g</sub></p>",
        );
        let block = &doc.blocks()[0];
        let formats: Vec<_> = block.spans().iter().map(|s| s.format.clone()).collect();
        assert!(formats[0].bold);
        assert!(formats[1].italic);
        assert!(formats[2].underline);
        // d and e share strikethrough and merge
        assert_eq!(block.spans()[3].text, "de");
        assert!(formats[3].strikethrough);
        assert!(formats[4].superscript);
        assert!(formats[5].subscript);
    }

    #[test]
    fn test_parse_nested_inheritance() {
        let doc = parse_str("<p><b>x<i>y</i></b></p>");
        let block = &doc.blocks()[0];
        assert_eq!(block.spans().len(), 2);
        assert!(block.spans()[1].format.bold);
        assert!(block.spans()[1].format.italic);
    }

    #[test]
    fn test_parse_link_href() {
        let doc = parse_str(r#"<p><a href="https://example.com/?a=1&amp;b=2">link</a></p>"#);
        let span = &doc.blocks()[0].spans()[0];
        assert_eq!(span.format.link.as_deref(), Some("https://example.com/?a=1&b=2"));
    }

    #[test]
    fn test_parse_headings_and_div() {
        let doc = parse_str("<h1>Title</h1><div>Body</div><h6>Small</h6>");
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.blocks()[0].kind(), BlockKind::Heading(1));
        assert_eq!(doc.blocks()[1].kind(), BlockKind::Paragraph);
        assert_eq!(doc.blocks()[2].kind(), BlockKind::Heading(6));
    }

    #[test]
    fn test_parse_br_inside_block() {
        let doc = parse_str("<p>a<br>b<br/>c</p>");
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.blocks()[0].text(), "a\nb\nc");
    }

    #[test]
    fn test_parse_top_level_br_is_empty_paragraph() {
        let doc = parse_str("<p>a</p><br><p>b</p>");
        assert_eq!(doc.len(), 3);
        assert!(doc.blocks()[1].is_empty());
    }

    #[test]
    fn test_parse_bare_text_wrapped() {
        let doc = parse_str("just text");
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.blocks()[0].text(), "just text");

        let doc = parse_str("lead <b>bold</b><p>para</p>tail");
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.blocks()[0].text(), "lead bold");
        assert_eq!(doc.blocks()[2].text(), "tail");
    }

    #[test]
    fn test_parse_whitespace_between_blocks_ignored() {
        let doc = parse_str("<p>a</p>\n  <p>b</p>\n");
        assert_eq!(doc.len(), 2);

        let doc = parse_str("<p>\n  <b>a</b>\n</p>");
        assert_eq!(doc.blocks()[0].text(), "a");
    }

    #[test]
    fn test_parse_source_newline_is_a_space() {
        let doc = parse_str("<p>line one\nline two</p>");
        assert_eq!(doc.blocks()[0].text(), "line one line two");

        let doc = parse_str("<p>a\r\n\t  b</p>");
        assert_eq!(doc.blocks()[0].text(), "a b");
        assert_eq!(serialize(&doc), "<p>a b</p>");
    }

    #[test]
    fn test_parse_indentation_between_inline_runs_keeps_gap() {
        let doc = parse_str("<p><b>a</b>\n<i>b</i></p>");
        assert_eq!(doc.blocks()[0].text(), "a b");
        assert_eq!(serialize(&doc), "<p><b>a</b> <i>b</i></p>");

        let doc = parse_str("<p>a<br>\n  b\n</p>");
        assert_eq!(doc.blocks()[0].text(), "a\nb");
    }

    #[test]
    fn test_parse_unknown_tags_transparent() {
        let doc = parse_str("<p><custom-tag><b>x</b></custom-tag><mark>y</mark></p>");
        let block = &doc.blocks()[0];
        assert_eq!(block.text(), "xy");
        assert!(block.spans()[0].format.bold);
        assert!(block.spans()[1].format.is_plain());
    }

    #[test]
    fn test_parse_alignment() {
        let doc = parse_str(
            r#"<p style="text-align: center">a</p><p style="color: red; text-align:RIGHT;">b</p><p style="text-align: middle">c</p>"#,
        );
        assert_eq!(doc.blocks()[0].alignment(), Alignment::Center);
        assert_eq!(doc.blocks()[1].alignment(), Alignment::Right);
        assert_eq!(doc.blocks()[2].alignment(), Alignment::Left);
    }

    #[test]
    fn test_parse_span_style() {
        let doc = parse_str(
            r#"<p><span style="color: #ff0000; background-color: yellow; font-family: Georgia; font-size: 14px">x</span></p>"#,
        );
        let format = &doc.blocks()[0].spans()[0].format;
        assert_eq!(format.color.as_deref(), Some("#ff0000"));
        assert_eq!(format.background.as_deref(), Some("yellow"));
        assert_eq!(format.font_family.as_deref(), Some("Georgia"));
        assert_eq!(format.font_size.as_deref(), Some("14px"));
    }

    #[test]
    fn test_parse_entities() {
        let doc = parse_str("<p>&lt;tag&gt; &amp; &#65;&#x42; &bogus; a & b</p>");
        assert_eq!(doc.blocks()[0].text(), "<tag> & AB &bogus; a & b");
    }

    #[test]
    fn test_parse_nested_blocks() {
        let doc = parse_str("<div><p>one</p><p>two</p></div>");
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.blocks()[0].text(), "one");
        assert_eq!(doc.blocks()[1].text(), "two");

        let doc = parse_str("<div>a<p>b</p>c</div>");
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.blocks()[2].text(), "c");
    }

    #[test]
    fn test_parse_malformed_input() {
        let doc = parse_str("<p>unclosed <b>bold");
        assert_eq!(doc.blocks()[0].text(), "unclosed bold");
        assert!(doc.blocks()[0].spans()[1].format.bold);

        let doc = parse_str("</i>a < b <p");
        assert_eq!(doc.blocks()[0].text(), "a < b <p");

        let doc = parse_str("<p>x</b></p>");
        assert_eq!(doc.blocks()[0].text(), "x");
    }

    #[test]
    fn test_parse_skips_comments_and_scripts() {
        let doc = parse_str("<!DOCTYPE html><!-- note --><p>a<script>var x = '<p>';</script>b</p>");
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.blocks()[0].text(), "ab");
    }

    #[test]
    fn test_parse_quoted_gt_in_attribute() {
        let doc = parse_str(r#"<p><a href="a>b">x</a></p>"#);
        assert_eq!(doc.blocks()[0].spans()[0].format.link.as_deref(), Some("a>b"));
    }

    #[test]
    fn test_parse_deep_nesting_does_not_overflow() {
        let html = "<span>".repeat(5000) + "deep" + &"</span>".repeat(5000);
        let doc = parse_str(&html);
        assert_eq!(doc.blocks()[0].text(), "deep");
    }

    #[test]
    fn test_parse_attributes() {
        let attrs = parse_attributes(r#" href='x y' data-flag title=plain "#);
        assert_eq!(
            attrs,
            vec![
                ("href".to_string(), "x y".to_string()),
                ("data-flag".to_string(), String::new()),
                ("title".to_string(), "plain".to_string()),
            ]
        );
    }
}
