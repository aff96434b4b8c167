//! Pull-based reading of XML-RPC documents.
//!
//! Reading happens in two layers. [`XmlCursor`] wraps a generic
//! [`quick_xml::Reader`] and presents the document as a sequence of elements,
//! end tags and text, each with its nesting depth. [`NodeReader`] walks that
//! cursor with a recursive-descent state machine and produces the flat stream
//! of XML-RPC [`Node`]s.
//!
//! [`Node`]: crate::events::Node

mod parser;
mod state;

pub use parser::NodeReader;

use crate::errors::{Error, Result};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::BufRead;

/// Creates a lazy stream of the nodes of a `<methodCall>` document.
pub fn parse_request<R: BufRead>(reader: R) -> NodeReader<R> {
    NodeReader::request(reader)
}

/// Creates a lazy stream of the nodes of a `<methodResponse>` document.
pub fn parse_response<R: BufRead>(reader: R) -> NodeReader<R> {
    NodeReader::response(reader)
}

/// Creates a lazy stream of the nodes of a document that consists of a
/// single `<value>` element.
pub fn parse_value<R: BufRead>(reader: R) -> NodeReader<R> {
    NodeReader::value(reader)
}

/// Type of the node under an [`XmlCursor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum XmlNodeType {
    /// Cursor is before the first node or after the end of input
    None,
    /// Start tag or empty element tag
    Element,
    /// End tag. Empty elements do not have one
    EndElement,
    /// Text with at least one non-whitespace character
    Text,
    /// Text of spaces, tabs and line breaks only
    Whitespace,
}

/// Unit of the input, after merging of adjacent text pieces
#[derive(Debug)]
enum Raw {
    Start(String),
    Empty(String),
    End(String),
    Text(String),
    Eof,
}

/// Returns `true` if `text` consists of XML whitespace only.
#[inline]
pub(crate) fn is_whitespace(text: &str) -> bool {
    text.bytes().all(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
}

/// A forward-only cursor over the elements of an XML document.
///
/// Each call to [`read`](Self::read) moves the cursor to the next node of the
/// document. Comments and processing instructions are skipped, adjacent text,
/// CDATA sections and references are merged into one text node with all
/// references resolved. Whitespace outside of the root element is skipped.
///
/// Depth follows the element nesting: the root element has depth 0, text
/// directly inside it has depth 1, and an end tag has the depth of its start
/// tag.
pub struct XmlCursor<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    /// A non-text unit read while merging text
    lookahead: Option<Raw>,
    /// Number of currently opened elements
    open: usize,
    /// `true` if any event was received from the reader
    started: bool,
    /// `true` when the root element was closed
    root_done: bool,
    eof: bool,

    node: XmlNodeType,
    name: String,
    value: String,
    depth: usize,
    empty: bool,
}

impl<R: BufRead> XmlCursor<R> {
    /// Creates a cursor positioned before the first node of `reader`.
    pub fn new(reader: R) -> Self {
        let mut reader = Reader::from_reader(reader);
        let config = reader.config_mut();
        config.expand_empty_elements = false;
        config.check_end_names = true;
        config.trim_text(false);

        Self {
            reader,
            buf: Vec::new(),
            lookahead: None,
            open: 0,
            started: false,
            root_done: false,
            eof: false,
            node: XmlNodeType::None,
            name: String::new(),
            value: String::new(),
            depth: 0,
            empty: false,
        }
    }

    /// Type of the current node.
    #[inline]
    pub fn node_type(&self) -> XmlNodeType {
        self.node
    }

    /// Name of the current element or end tag. Empty for other nodes.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text of the current text or whitespace node. Empty for other nodes.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Depth of the current node.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns `true` if the current node is an empty element `<name/>`.
    #[inline]
    pub fn is_empty_element(&self) -> bool {
        self.node == XmlNodeType::Element && self.empty
    }

    /// Returns `true` if the current node is an element with the given name.
    #[inline]
    pub fn is_element(&self, name: &str) -> bool {
        self.node == XmlNodeType::Element && self.name == name
    }

    /// Moves to the next node. Returns `false` at the end of the document.
    pub fn read(&mut self) -> Result<bool> {
        if self.eof {
            self.set(XmlNodeType::None, 0);
            return Ok(false);
        }
        loop {
            match self.next_raw()? {
                Raw::Start(name) => {
                    self.check_single_root()?;
                    self.name = name;
                    self.set(XmlNodeType::Element, self.open);
                    self.open += 1;
                }
                Raw::Empty(name) => {
                    self.check_single_root()?;
                    self.name = name;
                    self.set(XmlNodeType::Element, self.open);
                    self.empty = true;
                    if self.open == 0 {
                        self.root_done = true;
                    }
                }
                Raw::End(name) => {
                    self.open = self
                        .open
                        .checked_sub(1)
                        .ok_or_else(|| Error::ill_formed(format!("Unexpected end tag </{}>", name)))?;
                    self.name = name;
                    self.set(XmlNodeType::EndElement, self.open);
                    if self.open == 0 {
                        self.root_done = true;
                    }
                }
                Raw::Text(text) => {
                    let whitespace = is_whitespace(&text);
                    if self.open == 0 {
                        if whitespace {
                            continue;
                        }
                        return Err(Error::ill_formed("Data at the root level is invalid"));
                    }
                    self.set(
                        if whitespace {
                            XmlNodeType::Whitespace
                        } else {
                            XmlNodeType::Text
                        },
                        self.open,
                    );
                    self.value = text;
                }
                Raw::Eof => {
                    if self.open > 0 {
                        return Err(Error::ill_formed(
                            "Unexpected end of file while parsing an element",
                        ));
                    }
                    if !self.root_done {
                        return Err(Error::ill_formed("Root element is missing"));
                    }
                    self.eof = true;
                    self.set(XmlNodeType::None, 0);
                    return Ok(false);
                }
            }
            return Ok(true);
        }
    }

    /// Moves to the root element if the cursor is before it.
    pub fn move_to_content(&mut self) -> Result<()> {
        while self.node != XmlNodeType::Element {
            if !self.read()? {
                return Err(Error::ill_formed("Root element is missing"));
            }
        }
        Ok(())
    }

    /// Reads the text content of the current element and moves past its end
    /// tag.
    ///
    /// The element must contain text only; a child element is an error.
    pub fn read_element_content(&mut self) -> Result<String> {
        let name = std::mem::take(&mut self.name);
        if self.empty {
            self.read()?;
            return Ok(String::new());
        }
        let mut content = String::new();
        loop {
            if !self.read()? {
                return Err(Error::ill_formed(format!(
                    "Unexpected end of file inside <{}>",
                    name
                )));
            }
            match self.node {
                XmlNodeType::Text | XmlNodeType::Whitespace => content.push_str(&self.value),
                XmlNodeType::EndElement => break,
                XmlNodeType::Element => {
                    return Err(Error::InvalidProtocol(format!(
                        "Element {} cannot contain child element {}",
                        name, self.name
                    )))
                }
                XmlNodeType::None => {}
            }
        }
        self.read()?;
        Ok(content)
    }

    fn set(&mut self, node: XmlNodeType, depth: usize) {
        if !matches!(node, XmlNodeType::Element | XmlNodeType::EndElement) {
            self.name.clear();
        }
        self.value.clear();
        self.node = node;
        self.depth = depth;
        self.empty = false;
    }

    fn check_single_root(&self) -> Result<()> {
        if self.root_done {
            return Err(Error::ill_formed("There are multiple root elements"));
        }
        Ok(())
    }

    /// Returns the next unit of input, merging adjacent text pieces into one
    fn next_raw(&mut self) -> Result<Raw> {
        let raw = match self.lookahead.take() {
            Some(raw) => raw,
            None => self.fetch()?,
        };
        match raw {
            Raw::Text(mut text) => loop {
                match self.fetch()? {
                    Raw::Text(more) => text.push_str(&more),
                    other => {
                        self.lookahead = Some(other);
                        return Ok(Raw::Text(text));
                    }
                }
            },
            raw => Ok(raw),
        }
    }

    /// Reads the next event of interest from the XML reader
    fn fetch(&mut self) -> Result<Raw> {
        loop {
            self.buf.clear();
            let event = self.reader.read_event_into(&mut self.buf)?;
            let decoder = self.reader.decoder();
            let first = !self.started;
            self.started = true;

            return Ok(match event {
                Event::Start(e) => Raw::Start(decoder.decode(e.name().as_ref())?.into_owned()),
                Event::Empty(e) => Raw::Empty(decoder.decode(e.name().as_ref())?.into_owned()),
                Event::End(e) => Raw::End(decoder.decode(e.name().as_ref())?.into_owned()),
                Event::Text(e) => Raw::Text(e.decode()?.into_owned()),
                Event::CData(e) => Raw::Text(e.decode()?.into_owned()),
                Event::GeneralRef(e) => {
                    if let Some(ch) = e.resolve_char_ref().map_err(quick_xml::Error::from)? {
                        Raw::Text(ch.to_string())
                    } else {
                        let name = e.decode()?;
                        match resolve_predefined_entity(&name) {
                            Some(text) => Raw::Text(text.to_string()),
                            None => {
                                return Err(Error::ill_formed(format!(
                                    "Reference to undeclared entity '{}'",
                                    name
                                )))
                            }
                        }
                    }
                }
                Event::Decl(_) if first => continue,
                Event::Decl(_) => {
                    return Err(Error::ill_formed(
                        "XML declaration is allowed only at the start of the document",
                    ))
                }
                Event::DocType(_) => {
                    return Err(Error::ill_formed("DTD is prohibited in XML-RPC documents"))
                }
                Event::Comment(_) | Event::PI(_) => continue,
                Event::Eof => Raw::Eof,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Reads the whole document and returns (type, name or value, depth) of
    /// every node
    fn nodes(xml: &str) -> Vec<(XmlNodeType, String, usize)> {
        let mut cursor = XmlCursor::new(xml.as_bytes());
        let mut nodes = Vec::new();
        while cursor.read().unwrap() {
            let text = match cursor.node_type() {
                XmlNodeType::Text | XmlNodeType::Whitespace => cursor.value().to_string(),
                _ => cursor.name().to_string(),
            };
            nodes.push((cursor.node_type(), text, cursor.depth()));
        }
        nodes
    }

    #[test]
    fn depths() {
        use XmlNodeType::*;

        assert_eq!(
            nodes("<?xml version=\"1.0\"?>\n<a>\n <b>text</b><c/></a>\n"),
            vec![
                (Element, "a".into(), 0),
                (Whitespace, "\n ".into(), 1),
                (Element, "b".into(), 1),
                (Text, "text".into(), 2),
                (EndElement, "b".into(), 1),
                (Element, "c".into(), 1),
                (EndElement, "a".into(), 0),
            ]
        );
    }

    #[test]
    fn merges_text() {
        use XmlNodeType::*;

        assert_eq!(
            nodes("<a>1 &lt; 2<!-- skipped --> &#x26; <![CDATA[<3>]]></a>"),
            vec![
                (Element, "a".into(), 0),
                (Text, "1 < 2 & <3>".into(), 1),
                (EndElement, "a".into(), 0),
            ]
        );
    }

    #[test]
    fn element_content() {
        let mut cursor = XmlCursor::new("<a><b>x&amp;y</b><c/><d></d></a>".as_bytes());
        cursor.move_to_content().unwrap();
        cursor.read().unwrap();
        assert_eq!(cursor.read_element_content().unwrap(), "x&y");
        assert!(cursor.is_element("c"));
        assert_eq!(cursor.read_element_content().unwrap(), "");
        assert!(cursor.is_element("d"));
        assert_eq!(cursor.read_element_content().unwrap(), "");
        assert_eq!(cursor.node_type(), XmlNodeType::EndElement);
        assert_eq!(cursor.name(), "a");
    }

    #[test]
    fn child_in_content() {
        let mut cursor = XmlCursor::new("<a><b>x<c/></b></a>".as_bytes());
        cursor.move_to_content().unwrap();
        cursor.read().unwrap();
        match cursor.read_element_content() {
            Err(Error::InvalidProtocol(_)) => {}
            x => panic!("Expected `Err(InvalidProtocol)`, but got `{:?}`", x),
        }
    }

    fn read_all(xml: &str) -> Result<()> {
        let mut cursor = XmlCursor::new(xml.as_bytes());
        while cursor.read()? {}
        Ok(())
    }

    #[test]
    fn ill_formed() {
        for xml in [
            "",
            "   ",
            "text<a/>",
            "<a>",
            "<a></b>",
            "<a/><b/>",
            "<!DOCTYPE a><a/>",
            "<a>&unknown;</a>",
        ] {
            match read_all(xml) {
                Err(Error::IllFormedXml { .. }) => {}
                x => panic!("Expected `Err(IllFormedXml)` for {:?}, but got `{:?}`", xml, x),
            }
        }
    }
}
