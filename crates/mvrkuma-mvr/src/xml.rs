//! Lossless XML element tree.
//!
//! Scene descriptions are edited in place: a fixture gets a new network and
//! everything else (user data, whitespace, comments, attributes this crate
//! knows nothing about) must survive the write. `quick-xml` streams events;
//! this module folds them into an owned tree and serializes it back.

use std::fmt::Write as _;

use quick_xml::Reader;
use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};

use crate::error::Error;

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attribute(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(slot) = self.attributes.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value;
        } else {
            self.attributes.push((key.to_owned(), value));
        }
    }

    pub fn remove_attribute(&mut self, key: &str) {
        self.attributes.retain(|(k, _)| k != key);
    }

    /// Child elements with their index in `children`.
    pub fn elements(&self) -> impl Iterator<Item = (usize, &Element)> {
        self.children.iter().enumerate().filter_map(|(i, node)| match node {
            Node::Element(e) => Some((i, e)),
            _ => None,
        })
    }

    pub fn children_named<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a Element> + use<'a, 'n> {
        self.elements()
            .map(|(_, e)| e)
            .filter(move |e| e.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().map(|(_, e)| e).find(|e| e.name == name)
    }

    pub fn child_index(&self, name: &str) -> Option<usize> {
        self.elements().find(|(_, e)| e.name == name).map(|(i, _)| i)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    /// Element at `index` in `children`, if that node is an element.
    pub fn element_at_mut(&mut self, index: usize) -> Option<&mut Element> {
        match self.children.get_mut(index) {
            Some(Node::Element(e)) => Some(e),
            _ => None,
        }
    }

    /// Concatenated text and CDATA content, trimmed.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            if let Node::Text(t) | Node::CData(t) = node {
                out.push_str(t);
            }
        }
        out.trim().to_owned()
    }

    /// Text of the first child named `name`, `None` when absent or blank.
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name)
            .map(Element::text)
            .filter(|t| !t.is_empty())
    }
}

// ── Parsing ──────────────────────────────────────────────────────────

/// Parse a document and return its root element.
///
/// Prolog content (declaration, comments before the root) is not kept;
/// [`to_string`] always writes a UTF-8 declaration.
pub fn parse(xml: &str) -> Result<Element, Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event().map_err(Error::xml)? {
            Event::Start(start) => stack.push(open_element(&start)?),
            Event::Empty(start) => {
                let element = open_element(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::Xml("unbalanced closing tag".into()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    let text = text.unescape().map_err(Error::xml)?;
                    parent.children.push(Node::Text(text.into_owned()));
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    let data = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    parent.children.push(Node::CData(data));
                }
            }
            Event::Comment(comment) => {
                if let Some(parent) = stack.last_mut() {
                    let body = String::from_utf8_lossy(&comment.into_inner()).into_owned();
                    parent.children.push(Node::Comment(body));
                }
            }
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }

    if !stack.is_empty() {
        return Err(Error::Xml("document ended inside an element".into()));
    }
    root.ok_or_else(|| Error::Xml("document has no root element".into()))
}

fn open_element(start: &BytesStart<'_>) -> Result<Element, Error> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(Error::xml)?
        .to_owned();
    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(Error::xml)?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(Error::xml)?
            .to_owned();
        let value = attr.unescape_value().map_err(Error::xml)?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<(), Error> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(element));
        Ok(())
    } else if root.is_none() {
        *root = Some(element);
        Ok(())
    } else {
        Err(Error::Xml("more than one root element".into()))
    }
}

// ── Serialization ────────────────────────────────────────────────────

/// Serialize a root element as a standalone UTF-8 document.
pub fn to_string(root: &Element) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\" ?>\n");
    write_element(&mut out, root);
    out
}

fn write_element(out: &mut String, element: &Element) {
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attributes {
        let _ = write!(out, " {key}=\"{}\"", escape(value.as_str()));
    }
    if element.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for node in &element.children {
        match node {
            Node::Element(child) => write_element(out, child),
            Node::Text(text) => out.push_str(&partial_escape(text.as_str())),
            Node::CData(data) => {
                out.push_str("<![CDATA[");
                out.push_str(data);
                out.push_str("]]>");
            }
            Node::Comment(body) => {
                out.push_str("<!--");
                out.push_str(body);
                out.push_str("-->");
            }
        }
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_nested_elements_and_attributes() {
        let root = parse(r#"<A x="1"><B y="a &amp; b">text</B><C/></A>"#).unwrap();
        assert_eq!(root.name, "A");
        assert_eq!(root.attribute("x"), Some("1"));
        let b = root.child("B").unwrap();
        assert_eq!(b.attribute("y"), Some("a & b"));
        assert_eq!(b.text(), "text");
        assert!(root.child("C").unwrap().children.is_empty());
    }

    #[test]
    fn child_outlives_the_lookup_name() {
        let root = parse("<A><B n=\"1\"/><B n=\"2\"/><C/></A>").unwrap();
        let found = {
            let name = String::from("B");
            root.child(&name)
        };
        assert_eq!(found.and_then(|e| e.attribute("n")), Some("1"));

        let all: Vec<&str> = root
            .children_named("B")
            .filter_map(|e| e.attribute("n"))
            .collect();
        assert_eq!(all, vec!["1", "2"]);
    }

    #[test]
    fn preserves_whitespace_comments_and_unknown_nodes() {
        let xml = "<Root>\n  <!-- keep me -->\n  <Unknown foo=\"bar\"><![CDATA[raw <data>]]></Unknown>\n</Root>";
        let root = parse(xml).unwrap();
        let written = to_string(&root);
        assert!(written.ends_with(xml), "{written}");
    }

    #[test]
    fn set_attribute_keeps_position() {
        let mut e = Element::new("N").with_attribute("a", "1").with_attribute("b", "2");
        e.set_attribute("a", "9");
        assert_eq!(
            e.attributes,
            vec![("a".to_owned(), "9".to_owned()), ("b".to_owned(), "2".to_owned())]
        );
    }

    #[test]
    fn escapes_on_write() {
        let e = Element::new("N")
            .with_attribute("name", "\"Spot\" <1>")
            .with_text("a < b & c");
        let written = to_string(&e);
        assert!(written.contains(r#"name="&quot;Spot&quot; &lt;1&gt;""#), "{written}");
        assert!(written.contains("a &lt; b &amp; c"), "{written}");
        assert_eq!(parse(&written).unwrap(), e);
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(parse("").is_err());
        assert!(parse("<A><B></A>").is_err());
        assert!(parse("<A/><B/>").is_err());
    }
}
