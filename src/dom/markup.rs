//! Row markup parsing and serialisation.
//!
//! Per-row markup produced by the host is a flat sequence of cell elements
//! (`<td ...>...</td><td ...>...</td>`). This module parses it into a small
//! fragment tree so the patcher can compare cells property by property, and
//! serialises fragments back into canonical markup.
//!
//! The parser is forgiving in the way an HTML fragment parser is: unclosed
//! elements are closed at end of input, stray closing tags are dropped and
//! comments are skipped. It never fails.

use std::fmt::Write as _;

/// Elements that never have children and have no closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "col", "hr", "img", "input", "link", "meta", "wbr"];

/// A parsed markup node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An element with attributes and children.
    Element(Element),
    /// Decoded character data.
    Text(String),
}

/// A parsed element.
///
/// Attribute names are lowercased; values are entity-decoded. When an
/// attribute repeats, the first occurrence wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Lowercased tag name.
    pub tag: String,
    /// Attributes in source order.
    pub attrs: Vec<(String, String)>,
    /// Child nodes.
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element with no attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Look up an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The `class` attribute, or the empty string.
    pub fn class_name(&self) -> &str {
        self.attr("class").unwrap_or("")
    }

    /// Number of element children (text nodes excluded).
    pub fn child_element_count(&self) -> usize {
        self.children
            .iter()
            .filter(|child| matches!(child, Node::Element(_)))
            .count()
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        text_content(&self.children)
    }

    /// Serialised markup of the children.
    pub fn inner_html(&self) -> String {
        serialize(&self.children)
    }

    fn set_attr_if_absent(&mut self, name: String, value: String) {
        if self.attr(&name).is_none() {
            self.attrs.push((name, value));
        }
    }
}

/// Whether `tag` is a void element.
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Parse a markup fragment.
///
/// # Examples
///
/// ```
/// # use cdrscroll::dom::markup::{parse_fragment, Node};
/// let nodes = parse_fragment(r#"<td class="a">x</td><td>y</td>"#);
/// assert_eq!(nodes.len(), 2);
/// let Node::Element(first) = &nodes[0] else { panic!() };
/// assert_eq!(first.class_name(), "a");
/// assert_eq!(first.text_content(), "x");
/// ```
pub fn parse_fragment(input: &str) -> Vec<Node> {
    Parser::new(input).run()
}

/// Parse a row's markup and keep only its top-level elements (the cells).
pub fn parse_cells(input: &str) -> Vec<Element> {
    parse_fragment(input)
        .into_iter()
        .filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
        .collect()
}

/// Concatenated text of a node list.
pub fn text_content(nodes: &[Node]) -> String {
    let mut out = String::new();
    collect_text(nodes, &mut out);
    out
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => collect_text(&el.children, out),
        }
    }
}

/// Serialise a node list into canonical markup.
///
/// # Examples
///
/// ```
/// # use cdrscroll::dom::markup::{parse_fragment, serialize};
/// let nodes = parse_fragment("<td class=x data-n=1>a &amp; b<br></td>");
/// assert_eq!(serialize(&nodes), r#"<td class="x" data-n="1">a &amp; b<br></td>"#);
/// ```
pub fn serialize(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(&escape_text(text)),
        Node::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in &el.attrs {
                let _ = write!(out, " {}=\"{}\"", name, escape_attr(value));
            }
            out.push('>');
            if is_void(&el.tag) {
                return;
            }
            for child in &el.children {
                write_node(child, out);
            }
            let _ = write!(out, "</{}>", el.tag);
        }
    }
}

/// Escape character data for markup output.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape an attribute value for double-quoted output.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Decode the character references the row renderers emit.
///
/// Unknown or malformed references are kept verbatim.
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp..];
        match after.find(';').filter(|&semi| semi <= 10) {
            Some(semi) => match decode_reference(&after[1..semi]) {
                Some(ch) => {
                    out.push(ch);
                    rest = &after[semi + 1..];
                }
                None => {
                    out.push('&');
                    rest = &after[1..];
                }
            },
            None => {
                out.push('&');
                rest = &after[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    roots: Vec<Node>,
    open: Vec<Element>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            roots: Vec::new(),
            open: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Node> {
        while self.pos < self.input.len() {
            let rest = &self.input[self.pos..];
            if rest.starts_with("<!--") {
                self.skip_comment();
            } else if rest.starts_with("</") {
                self.close_tag();
            } else if rest.starts_with('<') && starts_tag_name(&rest[1..]) {
                self.open_tag();
            } else {
                self.text();
            }
        }

        while let Some(el) = self.open.pop() {
            self.push(Node::Element(el));
        }
        self.roots
    }

    fn push(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    fn skip_comment(&mut self) {
        let body = self.pos + 4;
        self.pos = match self.input[body..].find("-->") {
            Some(end) => body + end + 3,
            None => self.input.len(),
        };
    }

    fn text(&mut self) {
        // A lone '<' that does not start a tag is character data.
        let start = self.pos;
        let first_len = self.input[start..].chars().next().map_or(1, char::len_utf8);
        let search_from = start + first_len;
        let end = self.input[search_from..]
            .find('<')
            .map_or(self.input.len(), |i| search_from + i);
        self.pos = end;

        let text = decode_entities(&self.input[start..end]);
        if let Some(Node::Text(prev)) = self
            .open
            .last_mut()
            .map_or(self.roots.last_mut(), |p| p.children.last_mut())
        {
            prev.push_str(&text);
            return;
        }
        self.push(Node::Text(text));
    }

    fn close_tag(&mut self) {
        let body = self.pos + 2;
        let end = self.input[body..]
            .find('>')
            .map_or(self.input.len(), |i| body + i);
        let name = self.input[body..end].trim().to_ascii_lowercase();
        self.pos = (end + 1).min(self.input.len());

        let Some(depth) = self.open.iter().rposition(|el| el.tag == name) else {
            return;
        };
        while self.open.len() > depth {
            if let Some(el) = self.open.pop() {
                self.push(Node::Element(el));
            }
        }
    }

    fn open_tag(&mut self) {
        self.pos += 1;
        let name = self.take_while(|c| !c.is_ascii_whitespace() && c != '>' && c != '/');
        let mut el = Element::new(name.to_ascii_lowercase());
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            let rest = &self.input[self.pos..];
            if rest.is_empty() {
                break;
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                self_closing = true;
                break;
            }
            if rest.starts_with('>') {
                self.pos += 1;
                break;
            }
            if rest.starts_with('/') {
                self.pos += 1;
                continue;
            }

            let attr_name = self
                .take_while(|c| !c.is_ascii_whitespace() && c != '=' && c != '>' && c != '/')
                .to_ascii_lowercase();
            self.skip_whitespace();
            let value = if self.input[self.pos..].starts_with('=') {
                self.pos += 1;
                self.skip_whitespace();
                self.attr_value()
            } else {
                String::new()
            };
            el.set_attr_if_absent(attr_name, value);
        }

        if self_closing || is_void(&el.tag) {
            self.push(Node::Element(el));
        } else {
            self.open.push(el);
        }
    }

    fn attr_value(&mut self) -> String {
        let rest = &self.input[self.pos..];
        let raw = match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let body = self.pos + 1;
                let end = self.input[body..]
                    .find(quote)
                    .map_or(self.input.len(), |i| body + i);
                self.pos = (end + 1).min(self.input.len());
                &self.input[body..end]
            }
            _ => self.take_while(|c| !c.is_ascii_whitespace() && c != '>'),
        };
        decode_entities(raw)
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        let rest = &self.input[start..];
        let len = rest.find(|c: char| !keep(c)).unwrap_or(rest.len());
        self.pos = start + len;
        &self.input[start..start + len]
    }

    fn skip_whitespace(&mut self) {
        self.take_while(|c| c.is_ascii_whitespace());
    }
}

fn starts_tag_name(rest: &str) -> bool {
    rest.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}
