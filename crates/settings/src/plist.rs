//! Minimal element tree for property-list documents.
//!
//! Only element names, nesting and text content are kept. Attributes,
//! comments, processing instructions and the doctype are dropped.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::theme::ThemeLoadError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    children: Vec<Node>,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Direct child elements named `name`.
    pub fn child_elements<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter_map(move |node| match node {
            Node::Element(element) if element.name == name => Some(element),
            _ => None,
        })
    }

    /// All descendant elements named `name` in document order, excluding `self`.
    pub fn descendants<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_descendants(name, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for node in &self.children {
            if let Node::Element(element) = node {
                if element.name == name {
                    found.push(element);
                }
                element.collect_descendants(name, found);
            }
        }
    }

    /// First descendant element named `name`.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children.iter().find_map(|node| match node {
            Node::Element(element) if element.name == name => Some(element),
            Node::Element(element) => element.find(name),
            Node::Text(_) => None,
        })
    }

    /// Text of the first child node, if that node is text.
    pub fn text(&self) -> Option<&str> {
        match self.children.first() {
            Some(Node::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Node::Text(existing)) = self.children.last_mut() {
            existing.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_string()));
        }
    }
}

/// Parses UTF-8 `input` into its root element.
pub fn parse(input: &str) -> Result<Element, ThemeLoadError> {
    build_tree(Reader::from_str(input))
}

/// Parses raw document bytes into its root element.
/// 依 XML 宣告或 BOM 的編碼解析原始位元組。
///
/// The encoding is taken from a byte-order mark or the `encoding` of the XML
/// declaration and defaults to UTF-8.
pub fn parse_bytes(input: &[u8]) -> Result<Element, ThemeLoadError> {
    build_tree(Reader::from_reader(input))
}

fn build_tree(mut reader: Reader<&[u8]>) -> Result<Element, ThemeLoadError> {
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let qname = start.name();
                let name = reader.decoder().decode(qname.as_ref())?;
                stack.push(Element::new(name.into_owned()));
            }
            Event::Empty(start) => {
                let qname = start.name();
                let name = reader.decoder().decode(qname.as_ref())?;
                attach(&mut stack, &mut root, Element::new(name.into_owned()));
            }
            Event::End(_) => {
                let element = stack.pop().ok_or(ThemeLoadError::InvalidFormat(
                    "unexpected closing tag",
                ))?;
                attach(&mut stack, &mut root, element);
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.push_text(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.push_text(&reader.decoder().decode(&data)?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(ThemeLoadError::InvalidFormat("unclosed element at end of input"));
    }
    root.ok_or(ThemeLoadError::InvalidFormat("document has no root element"))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}
