// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A minimal lossless XML tree over `quick-xml` events.
//!
//! Every element, attribute, text run, CDATA section and comment inside the
//! root survives a parse/write cycle, so fix-ups only touch what they name.
//! Text and attribute values are stored in their escaped form and unescaped
//! on access.

use std::borrow::Cow;

use quick_xml::escape::{escape, unescape};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};

use crate::error::{FeedError, WriteError};

pub const ITUNES_NAMESPACE: &str = "http://www.itunes.com/dtds/podcast-1.0.dtd";
pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

const INDENT_CHAR: u8 = b' ';
const INDENT_SIZE: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    /// Escaped character data
    Text(String),
    CData(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    /// `(qualified name, escaped value)` in document order
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Element holding a single text node
    pub fn with_text(name: impl Into<String>, text: &str) -> Self {
        let mut element = Self::new(name);
        element.set_text(text);
        element
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Qualified name as written in the document (`itunes:image`)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without its namespace prefix
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    pub fn attribute(&self, key: &str) -> Option<String> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, raw)| unescape_lossy(raw))
    }

    /// Replace an attribute's value, appending it when absent
    pub fn set_attribute(&mut self, key: &str, value: &str) {
        let raw = escape(value).into_owned();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = raw,
            None => self.attributes.push((key.to_string(), raw)),
        }
    }

    /// Concatenated text and CDATA content, `None` for an element without any
    pub fn text(&self) -> Option<String> {
        let mut text: Option<String> = None;
        for child in &self.children {
            match child {
                XmlNode::Text(raw) => text
                    .get_or_insert_with(String::new)
                    .push_str(&unescape_lossy(raw)),
                XmlNode::CData(data) => text.get_or_insert_with(String::new).push_str(data),
                _ => {}
            }
        }
        text
    }

    /// Replace all text and CDATA content with `value`
    pub fn set_text(&mut self, value: &str) {
        self.children
            .retain(|child| !matches!(child, XmlNode::Text(_) | XmlNode::CData(_)));
        self.children.push(XmlNode::Text(escape(value).into_owned()));
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn children_named<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a XmlElement> + use<'a, 'n> {
        self.elements().filter(move |element| element.name == name)
    }

    pub fn children_named_mut<'a>(
        &'a mut self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a mut XmlElement> {
        self.elements_mut().filter(move |element| element.name == name)
    }

    /// First child element with the given qualified name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children_named(name).next()
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|element| element.name == name)
    }

    /// Append a child element after all existing children
    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// Drop child elements for which `keep` returns `false`; other nodes stay
    pub fn retain_elements(&mut self, mut keep: impl FnMut(&XmlElement) -> bool) {
        self.children.retain(|child| match child {
            XmlNode::Element(element) => keep(element),
            _ => true,
        });
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, quick_xml::Error> {
        let mut element = Self::new(lossy(start.name().as_ref()));
        for attribute in start.attributes() {
            let attribute = attribute.map_err(quick_xml::Error::from)?;
            // Values are rewritten inside double quotes
            let raw = lossy(&attribute.value).replace('"', "&quot;");
            element
                .attributes
                .push((lossy(attribute.key.as_ref()), raw));
        }
        Ok(element)
    }
}

/// A parsed XML document: the root element and everything beneath it
///
/// The prolog (declaration, doctype, comments outside the root) is not kept;
/// [`Document::to_xml`] always writes a fresh UTF-8 declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: XmlElement,
}

impl Document {
    pub fn new(root: XmlElement) -> Self {
        Self { root }
    }

    /// Build the tree from raw bytes
    ///
    /// Fails on malformed markup, mismatched or unclosed tags, non-UTF-8
    /// input, or a document without a root element.
    pub fn parse(xml_bytes: &[u8]) -> Result<Self, FeedError> {
        let source = std::str::from_utf8(xml_bytes)?;
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);

        let mut reader = Reader::from_str(source);
        let mut open: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => open.push(XmlElement::from_start(&start)?),
                Event::Empty(start) => {
                    let element = XmlElement::from_start(&start)?;
                    attach(&mut open, &mut root, element);
                }
                Event::End(_) => {
                    if let Some(element) = open.pop() {
                        attach(&mut open, &mut root, element);
                    }
                }
                Event::Text(text) => append(&mut open, XmlNode::Text(lossy(&text))),
                Event::CData(data) => append(&mut open, XmlNode::CData(lossy(&data))),
                Event::Comment(comment) => append(&mut open, XmlNode::Comment(lossy(&comment))),
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(unclosed) = open.pop() {
            return Err(FeedError::UnclosedElement {
                name: unclosed.name,
            });
        }
        root.map(Self::new).ok_or(FeedError::EmptyDocument)
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut XmlElement {
        &mut self.root
    }

    /// Prefix bound to `uri` on the root element, declaring it when missing
    ///
    /// A new declaration uses `preferred`, numbered if that prefix is
    /// already bound to another namespace.
    pub fn declare_namespace(&mut self, uri: &str, preferred: &str) -> String {
        let declared = self.root.attributes.iter().find_map(|(key, raw)| {
            key.strip_prefix("xmlns:")
                .filter(|_| unescape_lossy(raw) == uri)
                .map(str::to_string)
        });
        if let Some(prefix) = declared {
            return prefix;
        }

        let mut prefix = preferred.to_string();
        let mut suffix = 1;
        while self.root.attribute(&format!("xmlns:{prefix}")).is_some() {
            suffix += 1;
            prefix = format!("{preferred}{suffix}");
        }
        self.root.set_attribute(&format!("xmlns:{prefix}"), uri);
        prefix
    }

    /// Serialize with two-space indentation and an XML declaration
    ///
    /// Whitespace-only text between child elements is dropped so the
    /// writer's indentation replaces the origin's.
    pub fn to_xml(&self) -> Result<Vec<u8>, WriteError> {
        let mut writer = Writer::new_with_indent(Vec::new(), INDENT_CHAR, INDENT_SIZE);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(serialize_failed)?;
        write_element(&mut writer, &self.root)?;
        Ok(writer.into_inner())
    }
}

/// Prefixes the feed binds the iTunes and Atom namespaces to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    itunes: String,
    atom: String,
}

impl Namespaces {
    /// Resolve both prefixes, declaring the namespaces on the root if needed
    pub fn declare(document: &mut Document) -> Self {
        Self {
            itunes: document.declare_namespace(ITUNES_NAMESPACE, "itunes"),
            atom: document.declare_namespace(ATOM_NAMESPACE, "atom"),
        }
    }

    /// Qualified name of an iTunes element, e.g. `itunes:explicit`
    pub fn itunes(&self, local: &str) -> String {
        format!("{}:{}", self.itunes, local)
    }

    pub fn atom(&self, local: &str) -> String {
        format!("{}:{}", self.atom, local)
    }
}

impl Default for Namespaces {
    fn default() -> Self {
        Self {
            itunes: "itunes".to_string(),
            atom: "atom".to_string(),
        }
    }
}

fn attach(open: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match open.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None => {
            // Anything after the first root element is not part of the document
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn append(open: &mut [XmlElement], node: XmlNode) {
    if let Some(parent) = open.last_mut() {
        parent.children.push(node);
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> Result<(), WriteError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, raw) in &element.attributes {
        // Values are already escaped
        start.push_attribute(Attribute {
            key: QName(key.as_bytes()),
            value: Cow::Borrowed(raw.as_bytes()),
        });
    }

    let has_elements = element.elements().next().is_some();
    let children: Vec<&XmlNode> = element
        .children
        .iter()
        .filter(|child| !(has_elements && is_blank_text(child)))
        .collect();

    if children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(serialize_failed);
    }

    writer
        .write_event(Event::Start(start))
        .map_err(serialize_failed)?;
    for child in children {
        match child {
            XmlNode::Element(child) => write_element(writer, child)?,
            XmlNode::Text(raw) => writer
                .write_event(Event::Text(BytesText::from_escaped(raw.as_str())))
                .map_err(serialize_failed)?,
            XmlNode::CData(data) => writer
                .write_event(Event::CData(BytesCData::new(data.as_str())))
                .map_err(serialize_failed)?,
            XmlNode::Comment(raw) => writer
                .write_event(Event::Comment(BytesText::from_escaped(raw.as_str())))
                .map_err(serialize_failed)?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(serialize_failed)
}

fn is_blank_text(node: &XmlNode) -> bool {
    matches!(node, XmlNode::Text(raw) if raw.trim().is_empty())
}

fn serialize_failed(e: impl std::fmt::Display) -> WriteError {
    WriteError::SerializeFailed(e.to_string())
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn unescape_lossy(raw: &str) -> String {
    unescape(raw)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
    <title>Tom &amp; Jerry</title>
    <author>Road Crew</author>
    <itunes:title>Road Trip Radio (Official)</itunes:title>
    <x-custom level="3">kept</x-custom>
    <description><![CDATA[<p>Stories</p>]]></description>
    <!-- generated upstream -->
    <item>
      <itunes:title>Episode One</itunes:title>
      <enclosure url="https://cdn.example/ep1.mp3?a=1&amp;b=2" type="audio/mpeg"/>
    </item>
  </channel>
</rss>"#;

    fn channel(document: &Document) -> &XmlElement {
        document.root().child("channel").unwrap()
    }

    // === Parse tests ===

    #[test]
    fn parse_unescapes_text_and_attributes() {
        let document = Document::parse(FEED.as_bytes()).unwrap();
        let channel = channel(&document);

        assert_eq!(
            channel.child("title").and_then(XmlElement::text).as_deref(),
            Some("Tom & Jerry")
        );
        let enclosure = channel.child("item").unwrap().child("enclosure").unwrap();
        assert_eq!(
            enclosure.attribute("url").as_deref(),
            Some("https://cdn.example/ep1.mp3?a=1&b=2")
        );
        assert_eq!(enclosure.attribute("length"), None);
    }

    #[test]
    fn parse_reads_cdata_as_text() {
        let document = Document::parse(FEED.as_bytes()).unwrap();
        assert_eq!(
            channel(&document)
                .child("description")
                .and_then(XmlElement::text)
                .as_deref(),
            Some("<p>Stories</p>")
        );
    }

    #[test]
    fn parse_skips_byte_order_mark() {
        let mut bytes = "\u{feff}".as_bytes().to_vec();
        bytes.extend_from_slice(b"<rss><channel/></rss>");

        let document = Document::parse(&bytes).unwrap();
        assert_eq!(document.root().name(), "rss");
    }

    #[test]
    fn parse_rejects_unclosed_element() {
        let err = Document::parse(b"<rss><channel><title>x</title>").unwrap_err();
        match err {
            FeedError::UnclosedElement { name } => assert_eq!(name, "channel"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parse_rejects_mismatched_tags() {
        let err = Document::parse(b"<rss><channel></item></rss>").unwrap_err();
        assert!(matches!(err, FeedError::Xml(_)));
    }

    #[test]
    fn parse_rejects_document_without_root() {
        let err = Document::parse(b"<?xml version=\"1.0\"?>\n<!-- nothing -->").unwrap_err();
        assert!(matches!(err, FeedError::EmptyDocument));
    }

    // === Round trip tests ===

    #[test]
    fn unknown_elements_survive_round_trip() {
        let document = Document::parse(FEED.as_bytes()).unwrap();
        let xml = String::from_utf8(document.to_xml().unwrap()).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("<author>Road Crew</author>"));
        assert!(xml.contains("<itunes:title>Road Trip Radio (Official)</itunes:title>"));
        assert!(xml.contains("<itunes:title>Episode One</itunes:title>"));
        assert!(xml.contains(r#"<x-custom level="3">kept</x-custom>"#));
        assert!(xml.contains("<![CDATA[<p>Stories</p>]]>"));
        assert!(xml.contains("<!-- generated upstream -->"));
        assert!(xml.contains("Tom &amp; Jerry"));
        assert!(xml.contains("ep1.mp3?a=1&amp;b=2"));

        let reparsed = Document::parse(xml.as_bytes()).unwrap();
        let rewritten = String::from_utf8(reparsed.to_xml().unwrap()).unwrap();
        assert_eq!(rewritten, xml);
    }

    #[test]
    fn output_is_indented() {
        let document = Document::parse(b"<rss><channel><title>x</title></channel></rss>").unwrap();
        let xml = String::from_utf8(document.to_xml().unwrap()).unwrap();

        assert!(xml.contains("\n  <channel>"));
        assert!(xml.contains("\n    <title>x</title>"));
    }

    // === Mutation tests ===

    #[test]
    fn set_text_and_attribute_escape_values() {
        let mut element = XmlElement::new("enclosure").with_attribute("url", "a?x=1&y=2");
        element.set_text("R&D");

        assert_eq!(element.attribute("url").as_deref(), Some("a?x=1&y=2"));
        assert_eq!(element.text().as_deref(), Some("R&D"));

        let xml = String::from_utf8(Document::new(element).to_xml().unwrap()).unwrap();
        assert!(xml.contains(r#"url="a?x=1&amp;y=2""#));
        assert!(xml.contains(">R&amp;D<"));
    }

    #[test]
    fn single_quoted_attribute_keeps_double_quotes() {
        let document = Document::parse(br#"<rss><channel title='say "hi"'/></rss>"#).unwrap();
        let channel = channel(&document);
        assert_eq!(channel.attribute("title").as_deref(), Some(r#"say "hi""#));

        let xml = String::from_utf8(document.to_xml().unwrap()).unwrap();
        assert!(xml.contains(r#"title="say &quot;hi&quot;""#));
    }

    #[test]
    fn set_attribute_replaces_in_place() {
        let mut element = XmlElement::new("enclosure")
            .with_attribute("url", "a")
            .with_attribute("length", "0");
        element.set_attribute("length", "42");

        assert_eq!(element.attribute("length").as_deref(), Some("42"));
        assert_eq!(element.attributes.len(), 2);
    }

    #[test]
    fn retain_elements_keeps_other_nodes() {
        let mut element = XmlElement::new("channel");
        element.push_child(XmlElement::new("a"));
        element.children.push(XmlNode::Comment(" note ".to_string()));
        element.push_child(XmlElement::new("b"));

        element.retain_elements(|child| child.name() != "a");

        assert_eq!(element.children.len(), 2);
        assert!(element.child("b").is_some());
    }

    #[test]
    fn local_name_drops_prefix() {
        assert_eq!(XmlElement::new("rdf:RDF").local_name(), "RDF");
        assert_eq!(XmlElement::new("rss").local_name(), "rss");
    }

    // === Namespace tests ===

    #[test]
    fn declare_namespace_reuses_existing_prefix() {
        let mut document = Document::parse(
            br#"<rss xmlns:podcast="http://www.itunes.com/dtds/podcast-1.0.dtd"><channel/></rss>"#,
        )
        .unwrap();

        let namespaces = Namespaces::declare(&mut document);

        assert_eq!(namespaces.itunes("explicit"), "podcast:explicit");
        assert_eq!(namespaces.atom("link"), "atom:link");
        assert_eq!(
            document.root().attribute("xmlns:atom").as_deref(),
            Some(ATOM_NAMESPACE)
        );
    }

    #[test]
    fn declare_namespace_avoids_taken_prefix() {
        let mut document =
            Document::parse(br#"<rss xmlns:atom="urn:other"><channel/></rss>"#).unwrap();

        let prefix = document.declare_namespace(ATOM_NAMESPACE, "atom");

        assert_eq!(prefix, "atom2");
        assert_eq!(
            document.root().attribute("xmlns:atom").as_deref(),
            Some("urn:other")
        );
    }
}
