//! A small owned XML element tree.
//!
//! Only what report enrichment needs: elements, attributes, text and
//! comments. Names keep their namespace prefix; lookups go by local name.
//! Whitespace between child elements is layout and is not kept, the writer
//! re-indents.
//!
//! The XML declaration is rewritten as UTF-8 1.0. Document type declarations
//! and processing instructions are dropped; report documents are validated
//! against their XML schema, not a DTD.

use std::borrow::Cow;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesDecl, BytesEnd, BytesRef, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{DocumentError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

fn local(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.children.push(Node::Text(text.into()));
        element
    }

    pub fn local_name(&self) -> &str {
        local(&self.name)
    }

    pub fn prefix(&self) -> Option<&str> {
        self.name.rsplit_once(':').map(|(prefix, _)| prefix)
    }

    /// Name for a new child in this element's namespace prefix.
    pub fn qualified(&self, local_name: &str) -> String {
        match self.prefix() {
            Some(prefix) => format!("{prefix}:{local_name}"),
            None => local_name.to_string(),
        }
    }

    pub fn attribute(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| local(key) == local_name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|(key, _)| local(key) == local(name))
        {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn children_named<'a>(
        &'a self,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements()
            .filter(move |element| element.local_name() == local_name)
    }

    pub fn child(&self, local_name: &str) -> Option<&Element> {
        self.elements()
            .find(|element| element.local_name() == local_name)
    }

    pub fn child_mut(&mut self, local_name: &str) -> Option<&mut Element> {
        self.elements_mut()
            .find(|element| element.local_name() == local_name)
    }

    /// Concatenated text content of this element (not of descendants).
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace the text content, keeping child elements and comments.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.retain(|node| !matches!(node, Node::Text(_)));
        self.children.push(Node::Text(text.into()));
    }

    /// Insert `element` among the children following `order`, a list of
    /// local names in their required sequence.
    ///
    /// The new element goes right after the last child that sorts before
    /// it. Children not named in `order` do not move. Elements not named in
    /// `order` are appended.
    pub fn insert_ordered(&mut self, element: Element, order: &[&str]) -> &mut Element {
        let rank = |name: &str| order.iter().position(|candidate| *candidate == name);
        let index = match rank(element.local_name()) {
            Some(target) => self
                .children
                .iter()
                .enumerate()
                .filter_map(|(index, node)| match node {
                    Node::Element(child) => rank(child.local_name())
                        .filter(|r| *r < target)
                        .map(|_| index + 1),
                    _ => None,
                })
                .max()
                .unwrap_or(0),
            None => self.children.len(),
        };
        self.children.insert(index, Node::Element(element));
        let Node::Element(inserted) = &mut self.children[index] else {
            unreachable!("an element was inserted at {index}");
        };
        inserted
    }

    fn push_text(&mut self, text: &str) {
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_string()));
        }
    }

    /// Drop whitespace-only text between child elements.
    fn drop_layout_whitespace(&mut self) {
        if self.elements().next().is_some() {
            self.children
                .retain(|node| !matches!(node, Node::Text(text) if text.trim().is_empty()));
        }
    }

    fn from_start(start: &BytesStart<'_>, position: u64) -> Result<Self> {
        let mut element = Self::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| malformed(position, e))?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|e| malformed(position, e))?
                .into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }
}

fn malformed(position: u64, error: impl std::fmt::Display) -> DocumentError {
    DocumentError::Malformed {
        position,
        message: error.to_string(),
    }
}

fn resolve_reference(reference: &BytesRef<'_>, position: u64) -> Result<Cow<'static, str>> {
    if let Some(ch) = reference
        .resolve_char_ref()
        .map_err(|e| malformed(position, e))?
    {
        return Ok(Cow::Owned(ch.to_string()));
    }
    let name = reference.decode().map_err(|e| malformed(position, e))?;
    resolve_predefined_entity(&name)
        .map(Cow::Borrowed)
        .ok_or_else(|| malformed(position, format!("unknown entity &{name};")))
}

/// Parse a complete document into its root element.
pub fn parse(bytes: &[u8]) -> Result<Element> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let position = reader.buffer_position();
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| malformed(reader.error_position(), e))?
        {
            Event::Start(start) => stack.push(Element::from_start(&start, position)?),
            Event::Empty(start) => {
                let element = Element::from_start(&start, position)?;
                attach(&mut stack, &mut root, element, position)?;
            }
            Event::End(_) => {
                let mut element = stack
                    .pop()
                    .ok_or_else(|| malformed(position, "unexpected closing tag"))?;
                element.drop_layout_whitespace();
                attach(&mut stack, &mut root, element, position)?;
            }
            Event::Text(text) => {
                let text = text.decode().map_err(|e| malformed(position, e))?;
                if let Some(parent) = stack.last_mut() {
                    parent.push_text(&text);
                }
            }
            Event::CData(data) => {
                let text = data.decode().map_err(|e| malformed(position, e))?;
                if let Some(parent) = stack.last_mut() {
                    parent.push_text(&text);
                }
            }
            Event::GeneralRef(reference) => {
                let text = resolve_reference(&reference, position)?;
                if let Some(parent) = stack.last_mut() {
                    parent.push_text(&text);
                }
            }
            Event::Comment(comment) => {
                if let Some(parent) = stack.last_mut() {
                    let text = comment.decode().map_err(|e| malformed(position, e))?;
                    parent.children.push(Node::Comment(text.into_owned()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(malformed(
            reader.buffer_position(),
            format!("unclosed element <{}>", open.name),
        ));
    }
    root.ok_or(DocumentError::Empty)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
    position: u64,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err(malformed(position, "more than one root element")),
    }
    Ok(())
}

/// Serialize `root` as an indented UTF-8 document.
pub fn write(root: &Element) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| DocumentError::Write(e.to_string()))?;
    write_element(&mut writer, root)?;
    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| DocumentError::Write(e.to_string()));
    }
    writer
        .write_event(Event::Start(start))
        .map_err(|e| DocumentError::Write(e.to_string()))?;
    for child in &element.children {
        match child {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|e| DocumentError::Write(e.to_string()))?,
            Node::Comment(comment) => writer
                .write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))
                .map_err(|e| DocumentError::Write(e.to_string()))?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| DocumentError::Write(e.to_string()))
}
