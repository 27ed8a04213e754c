//! Parsing of `strings.xml` resource documents.
//!
//! The structured path builds an [`Element`] tree with `quick-xml` and pulls
//! `<resources><string>` entries out of it. When the document is malformed or
//! has no string elements, a regex extractor is run over the raw text instead.
//! That fallback cannot see strings whose value contains nested markup.
//!
//! [`parse_raw`] keeps the top-level children as source text instead, so an
//! existing locale file can be rewritten without touching what it already has.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::error::ParseError;
use crate::model::StringEntry;

/// Minimal XML tree: text runs and elements with attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Text(String),
    Node {
        name: String,
        attributes: BTreeMap<String, String>,
        children: Vec<Element>,
    },
}

impl Element {
    fn node(name: String, attributes: BTreeMap<String, String>) -> Self {
        Element::Node {
            name,
            attributes,
            children: Vec::new(),
        }
    }

    /// Concatenated text of this element and all descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Element::Text(text) => out.push_str(text),
            Element::Node { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Element::Node { name, .. } => Some(name),
            Element::Text(_) => None,
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        match self {
            Element::Node { attributes, .. } => attributes.get(key).map(String::as_str),
            Element::Text(_) => None,
        }
    }

    fn push_child(&mut self, child: Element) {
        if let Element::Node { children, .. } = self {
            children.push(child);
        }
    }
}

/// Entries of a parsed document, plus why the structured parse was abandoned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub entries: Vec<StringEntry>,
    pub fallback_reason: Option<ParseError>,
}

/// Parse a resource document. Never fails: malformed input yields whatever the
/// regex fallback can recover, possibly nothing.
pub fn parse(content: &str) -> Vec<StringEntry> {
    parse_with_report(content).entries
}

pub fn parse_with_report(content: &str) -> Parsed {
    match parse_document(content).and_then(|root| extract_strings(&root)) {
        Ok(entries) => Parsed {
            entries,
            fallback_reason: None,
        },
        Err(reason) => Parsed {
            entries: parse_with_regex(content),
            fallback_reason: Some(reason),
        },
    }
}

/// Build the element tree of a whole document
pub fn parse_document(content: &str) -> Result<Element, ParseError> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(false);
    reader.check_end_names(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let (name, attributes) = read_start(&start)?;
                stack.push(Element::node(name, attributes));
            }
            Ok(Event::Empty(start)) => {
                let (name, attributes) = read_start(&start)?;
                attach(Element::node(name, attributes), &mut stack, &mut root)?;
            }
            Ok(Event::End(_)) => {
                let finished = stack
                    .pop()
                    .ok_or_else(|| ParseError::Malformed("unexpected closing tag".to_string()))?;
                attach(finished, &mut stack, &mut root)?;
            }
            Ok(Event::Text(text)) => {
                let text = text
                    .unescape()
                    .map_err(|e| ParseError::Malformed(e.to_string()))?;
                if let Some(parent) = stack.last_mut() {
                    parent.push_child(Element::Text(text.into_owned()));
                }
            }
            Ok(Event::CData(cdata)) => {
                let text = std::str::from_utf8(&cdata)
                    .map_err(|e| ParseError::Malformed(e.to_string()))?;
                if let Some(parent) = stack.last_mut() {
                    parent.push_child(Element::Text(text.to_string()));
                }
            }
            Ok(Event::Eof) => break,
            // Declarations, comments, processing instructions, doctype
            Ok(_) => {}
            Err(e) => return Err(ParseError::Malformed(e.to_string())),
        }
    }

    if let Some(open) = stack.pop() {
        return Err(ParseError::Unclosed(
            open.name().unwrap_or_default().to_string(),
        ));
    }
    root.ok_or(ParseError::Empty)
}

fn read_start(start: &BytesStart<'_>) -> Result<(String, BTreeMap<String, String>), ParseError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = BTreeMap::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ParseError::Malformed(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| ParseError::Malformed(e.to_string()))?
            .into_owned();
        attributes.insert(key, value);
    }
    Ok((name, attributes))
}

fn attach(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push_child(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(ParseError::Malformed(
            "more than one root element".to_string(),
        )),
    }
}

/// Pull `<string>` entries out of a `<resources>` root
pub fn extract_strings(root: &Element) -> Result<Vec<StringEntry>, ParseError> {
    let Element::Node { name, children, .. } = root else {
        return Err(ParseError::NoStrings);
    };
    if name != "resources" {
        return Err(ParseError::NoStrings);
    }

    let strings: Vec<&Element> = children
        .iter()
        .filter(|child| child.name() == Some("string"))
        .collect();
    if strings.is_empty() {
        return Err(ParseError::NoStrings);
    }

    Ok(strings
        .into_iter()
        .map(|element| StringEntry {
            key: element.attribute("name").unwrap_or_default().to_string(),
            value: element.text_content(),
            translatable: element.attribute("translatable") != Some("false"),
        })
        .filter(|entry| !entry.key.is_empty() && !entry.value.is_empty())
        .collect())
}

/// Top-level children of a `<resources>` document as they appear in the source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResources {
    /// Attributes of the `<resources>` tag, such as namespace declarations
    pub root_attributes: String,
    /// `<string>` elements by `name`, markup and attributes untouched
    pub strings: BTreeMap<String, String>,
    /// Every other element and comment, in document order
    pub others: Vec<String>,
}

/// Slice the top-level children of `<resources>` out of `content` verbatim
pub fn parse_raw(content: &str) -> Result<RawResources, ParseError> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(false);
    reader.check_end_names(true);

    let mut raw = RawResources::default();
    let mut depth = 0usize;
    let mut open: Option<(usize, Option<String>)> = None;

    loop {
        let before = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|e| ParseError::Malformed(e.to_string()))?;
        match event {
            Event::Start(start) => {
                if depth == 0 {
                    if start.name().as_ref() != b"resources" {
                        return Err(ParseError::NoStrings);
                    }
                    raw.root_attributes = String::from_utf8_lossy(start.attributes_raw())
                        .trim()
                        .to_string();
                }
                if depth == 1 {
                    open = Some((before, string_name(&start)?));
                }
                depth += 1;
            }
            Event::Empty(start) if depth == 0 && start.name().as_ref() != b"resources" => {
                return Err(ParseError::NoStrings);
            }
            Event::Empty(start) if depth == 1 => {
                let slice = content[before..reader.buffer_position()].to_string();
                raw.push(string_name(&start)?, slice);
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 1 {
                    if let Some((from, name)) = open.take() {
                        raw.push(name, content[from..reader.buffer_position()].to_string());
                    }
                }
            }
            Event::Comment(_) if depth == 1 => {
                raw.others
                    .push(content[before..reader.buffer_position()].to_string());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(ParseError::Unclosed("resources".to_string()));
    }
    Ok(raw)
}

impl RawResources {
    fn push(&mut self, string_name: Option<String>, slice: String) {
        match string_name {
            Some(name) => {
                self.strings.insert(name, slice);
            }
            None => self.others.push(slice),
        }
    }
}

/// `name` of a `<string>` start tag; `None` for any other element
fn string_name(start: &BytesStart<'_>) -> Result<Option<String>, ParseError> {
    if start.name().as_ref() != b"string" {
        return Ok(None);
    }
    let (_, attributes) = read_start(start)?;
    Ok(attributes.get("name").filter(|n| !n.is_empty()).cloned())
}

fn string_element_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<string\s+name="([^"]+)"([^>]*)>([^<]+)</string>"#)
            .expect("string element pattern is invalid - this is a bug")
    })
}

/// Lossy extraction for documents the structured parser rejects
pub fn parse_with_regex(content: &str) -> Vec<StringEntry> {
    string_element_regex()
        .captures_iter(content)
        .map(|caps| {
            let raw = &caps[3];
            let value = quick_xml::escape::unescape(raw)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| raw.to_string());
            StringEntry {
                key: caps[1].to_string(),
                value,
                translatable: !caps[2].contains(r#"translatable="false""#),
            }
        })
        .filter(|entry| !entry.key.is_empty() && !entry.value.is_empty())
        .collect()
}
