//! Recursive-descent parser of XML-RPC documents, turned inside out into an
//! iterator.

use super::state::Step;
use super::{XmlCursor, XmlNodeType};
use crate::errors::{Error, Result};
use crate::events::{Node, NodeKind, ScalarKind};
use std::io::BufRead;

/// Elements which must never be skipped while looking for an end tag.
const STRUCTURAL: [&str; 2] = ["name", "value"];

/// A lazy stream of XML-RPC [`Node`]s read from an XML document.
///
/// The reader performs no read-ahead beyond what is needed to classify the
/// current element: each call to [`next`](Iterator::next) parses just enough of
/// the input to produce one node. The stream ends when the root element is
/// closed. After the first error the stream is exhausted.
///
/// ```
/// use quick_xmlrpc::events::{Node, NodeKind, ScalarKind};
/// use quick_xmlrpc::reader::parse_response;
///
/// let xml = "<methodResponse><params><param>\
///            <value><i4>42</i4></value>\
///            </param></params></methodResponse>";
/// let nodes: Vec<Node> = parse_response(xml.as_bytes())
///     .collect::<Result<_, _>>()
///     .unwrap();
///
/// assert_eq!(nodes, vec![
///     Node::new(0, NodeKind::ResponseMarker),
///     Node::scalar(0, ScalarKind::Int, "42"),
/// ]);
/// ```
pub struct NodeReader<R> {
    cursor: XmlCursor<R>,
    steps: Vec<Step>,
    /// Number of opened structs and arrays
    depth: usize,
}

impl<R: BufRead> NodeReader<R> {
    fn with_step(reader: R, step: Step) -> Self {
        Self {
            cursor: XmlCursor::new(reader),
            steps: vec![step],
            depth: 0,
        }
    }

    /// Creates a reader of a `<methodCall>` document.
    pub fn request(reader: R) -> Self {
        Self::with_step(reader, Step::Request)
    }

    /// Creates a reader of a `<methodResponse>` document.
    pub fn response(reader: R) -> Self {
        Self::with_step(reader, Step::Response)
    }

    /// Creates a reader of a document that consists of one `<value>` element.
    pub fn value(reader: R) -> Self {
        Self::with_step(reader, Step::ValueDocument)
    }

    /// Produces the next node, or `None` when the document is over.
    pub fn next_node(&mut self) -> Result<Option<Node>> {
        while let Some(step) = self.steps.pop() {
            if let Some(node) = self.run(step)? {
                trace!("{:?}", node);
                return Ok(Some(node));
            }
        }
        Ok(None)
    }

    fn node(&self, kind: NodeKind) -> Option<Node> {
        Some(Node::new(self.depth, kind))
    }

    /// Performs one step and returns the node it produced, if any
    fn run(&mut self, step: Step) -> Result<Option<Node>> {
        match step {
            Step::Request => {
                self.cursor.move_to_content()?;
                if !self.cursor.is_element("methodCall") {
                    return Err(Error::InvalidProtocol(
                        "Request XML not valid XML-RPC - root element not methodCall.".into(),
                    ));
                }
                let root = self.cursor.depth();
                self.move_to_child("methodName", None, true)?;
                let name = self.cursor.read_element_content()?;
                if name.is_empty() {
                    return Err(Error::InvalidProtocol(
                        "Request XML not valid XML-RPC - empty methodName.".into(),
                    ));
                }
                self.steps.push(Step::EndElement(root));
                self.steps.push(Step::RequestParams);
                Ok(self.node(NodeKind::MethodName(name)))
            }
            Step::RequestParams => {
                // the cursor may already stand on `<params/>` right after `</methodName>`
                if !self.cursor.is_element("params") && !self.move_to_sibling("params", false)? {
                    return Ok(None);
                }
                self.steps.push(Step::EndElement(self.cursor.depth()));
                self.steps.push(Step::Params {
                    first: true,
                    multiple: true,
                });
                Ok(self.node(NodeKind::ParamsMarker))
            }
            Step::Response => {
                self.cursor.move_to_content()?;
                if !self.cursor.is_element("methodResponse") {
                    return Err(Error::InvalidProtocol(
                        "Response XML not valid XML-RPC - root element not methodResponse.".into(),
                    ));
                }
                self.steps.push(Step::EndElement(self.cursor.depth()));
                self.move_to_child("params", Some("fault"), true)?;

                self.steps.push(Step::EndElement(self.cursor.depth()));
                if self.cursor.name() == "params" {
                    self.steps.push(Step::Params {
                        first: true,
                        multiple: false,
                    });
                    Ok(self.node(NodeKind::ResponseMarker))
                } else {
                    self.steps.push(Step::FaultValue);
                    Ok(self.node(NodeKind::FaultMarker))
                }
            }
            Step::ValueDocument => {
                self.cursor.move_to_content()?;
                if !self.cursor.is_element("value") {
                    return Err(Error::InvalidProtocol(format!(
                        "Expected element value, found {}",
                        self.cursor.name()
                    )));
                }
                self.read_value()
            }
            Step::Params { first, multiple } => {
                let found = if first {
                    self.move_to_child("param", None, false)?
                } else {
                    self.move_to_sibling("param", false)?
                };
                if found {
                    if multiple {
                        self.steps.push(Step::Params {
                            first: false,
                            multiple,
                        });
                    }
                    self.steps.push(Step::Param);
                }
                Ok(None)
            }
            Step::Param => {
                self.steps.push(Step::EndElement(self.cursor.depth()));
                self.move_to_child("value", None, true)?;
                self.read_value()
            }
            Step::FaultValue => {
                self.move_to_child("value", None, true)?;
                self.read_value()
            }
            Step::Value => self.read_value(),
            Step::Members { first } => {
                let found = if first {
                    self.move_to_child("member", None, false)?
                } else {
                    self.move_to_sibling("member", false)?
                };
                if !found {
                    return Ok(None);
                }
                let member = self.cursor.depth();

                self.move_to_child("name", None, true)?;
                let name = self.cursor.read_element_content()?;
                if name.is_empty() {
                    return Err(Error::InvalidProtocol(
                        "Struct contains member with empty name element.".into(),
                    ));
                }
                while self.cursor.node_type() == XmlNodeType::Whitespace {
                    self.cursor.read()?;
                }
                if !self.cursor.is_element("value") {
                    return Err(Error::InvalidProtocol(format!(
                        "Struct member {} is not followed by a value element.",
                        name
                    )));
                }

                self.steps.push(Step::Members { first: false });
                self.steps.push(Step::EndElement(member));
                self.steps.push(Step::Value);
                Ok(self.node(NodeKind::StructMember(name)))
            }
            Step::StructClose { depth } => {
                self.move_to_end_element(depth)?;
                self.depth -= 1;
                Ok(self.node(NodeKind::StructEnd))
            }
            Step::ArrayValues { first } => {
                let found = if first {
                    self.move_to_child("data", None, false)?;
                    self.move_to_child("value", None, false)?
                } else {
                    self.move_to_sibling("value", false)?
                };
                if found {
                    self.steps.push(Step::ArrayValues { first: false });
                    self.steps.push(Step::Value);
                }
                Ok(None)
            }
            Step::ArrayClose => {
                self.depth -= 1;
                Ok(self.node(NodeKind::ArrayEnd))
            }
            Step::EndElement(depth) => {
                self.move_to_end_element(depth)?;
                Ok(None)
            }
        }
    }

    /// Parses the `<value>` element under the cursor.
    ///
    /// Produces the node of a scalar, the begin marker of a struct or array,
    /// or nothing for an unknown child element.
    fn read_value(&mut self) -> Result<Option<Node>> {
        self.steps.push(Step::EndElement(self.cursor.depth()));
        if self.cursor.is_empty_element() {
            return Ok(Some(Node::implicit(self.depth, "")));
        }

        self.cursor.read()?;
        let mut text = String::new();
        match self.cursor.node_type() {
            XmlNodeType::Text => return Ok(Some(Node::implicit(self.depth, self.cursor.value()))),
            XmlNodeType::Whitespace => {
                text.push_str(self.cursor.value());
                self.cursor.read()?;
            }
            _ => {}
        }

        match self.cursor.node_type() {
            XmlNodeType::EndElement => Ok(Some(Node::implicit(self.depth, text))),
            XmlNodeType::Element => match self.cursor.name() {
                "struct" => {
                    let node = self.node(NodeKind::StructBegin);
                    self.depth += 1;
                    self.steps.push(Step::StructClose {
                        depth: self.cursor.depth(),
                    });
                    self.steps.push(Step::Members { first: true });
                    Ok(node)
                }
                "array" => {
                    let node = self.node(NodeKind::ArrayBegin);
                    self.depth += 1;
                    self.steps.push(Step::ArrayClose);
                    self.steps.push(Step::ArrayValues { first: true });
                    Ok(node)
                }
                "nil" => Ok(Some(Node::scalar(self.depth, ScalarKind::Nil, ""))),
                name => match ScalarKind::from_tag(name) {
                    Some(kind) => {
                        let text = self.cursor.read_element_content()?;
                        Ok(Some(Node::scalar(self.depth, kind, text)))
                    }
                    None => Ok(None),
                },
            },
            _ => Ok(None),
        }
    }

    /// Moves to the first child element named `name1` or `name2`, skipping
    /// everything else. Returns `false` if the current element has no such
    /// child; the cursor is then after the current element.
    fn move_to_child(&mut self, name1: &str, name2: Option<&str>, required: bool) -> Result<bool> {
        let depth = self.cursor.depth();
        if !self.cursor.is_empty_element() {
            self.cursor.read()?;
            while self.cursor.depth() > depth {
                if self.cursor.depth() == depth + 1
                    && self.cursor.node_type() == XmlNodeType::Element
                    && (self.cursor.name() == name1 || Some(self.cursor.name()) == name2)
                {
                    return Ok(true);
                }
                if !self.cursor.read()? {
                    break;
                }
            }
        }
        if required {
            return Err(Error::InvalidProtocol(match name2 {
                Some(name2) => format!("Missing element: {} or {}", name1, name2),
                None => format!("Missing element: {}", name1),
            }));
        }
        Ok(false)
    }

    /// Moves to the next element named `name` on the same level, skipping
    /// everything else. The current element itself matches unless it is
    /// empty. Returns `false` if the parent element ends first.
    fn move_to_sibling(&mut self, name: &str, required: bool) -> Result<bool> {
        if !self.cursor.is_empty_element() && self.cursor.is_element(name) {
            return Ok(true);
        }
        let depth = self.cursor.depth();
        if self.cursor.read()? {
            while self.cursor.depth() >= depth {
                if self.cursor.depth() == depth && self.cursor.is_element(name) {
                    return Ok(true);
                }
                if !self.cursor.read()? {
                    break;
                }
            }
        }
        if required {
            return Err(Error::InvalidProtocol(format!("Missing element {}", name)));
        }
        Ok(false)
    }

    /// Moves to the end of the element at the given depth.
    ///
    /// Meeting a `<name>` or `<value>` element on the way is an error: it
    /// means the document has more members or values than its structure
    /// allows.
    fn move_to_end_element(&mut self, depth: usize) -> Result<bool> {
        if self.cursor.depth() == depth
            && (self.cursor.is_empty_element()
                || self.cursor.node_type() == XmlNodeType::EndElement)
        {
            return Ok(true);
        }
        while self.cursor.depth() >= depth {
            if !self.cursor.read()? {
                break;
            }
            if self.cursor.node_type() == XmlNodeType::Element
                && STRUCTURAL.contains(&self.cursor.name())
            {
                return Err(Error::InvalidProtocol(format!(
                    "Unexpected element {}",
                    self.cursor.name()
                )));
            }
            if self.cursor.depth() == depth && self.cursor.node_type() == XmlNodeType::EndElement {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl<R: BufRead> Iterator for NodeReader<R> {
    type Item = Result<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_node() {
            Ok(Some(node)) => Some(Ok(node)),
            Ok(None) => None,
            Err(e) => {
                self.steps.clear();
                Some(Err(e))
            }
        }
    }
}
