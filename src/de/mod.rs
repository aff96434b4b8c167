//! Mapping of XML-RPC node streams onto values.
//!
//! The [`ValueMapper`] pulls [`Node`]s from a [`NodeReader`] (or any other
//! iterator of nodes) and builds a [`Value`] for each XML-RPC value, guided by
//! the target [`Type`]:
//!
//! - [`Type::Any`] infers the shape from the wire: a struct becomes a
//!   [`Struct`], an array an [`Array`] typed by its elements when they all have
//!   the same type;
//! - a scalar type checks the wire kind and parses the text;
//! - [`Type::Record`] maps a struct member by member onto a record type;
//! - [`Type::MultiDimArray`] maps nested arrays onto a rectangular array.
//!
//! Every error message ends with the mapping stack at the failure point.
//!
//! # Examples
//!
//! ```
//! use quick_xmlrpc::de::ValueMapper;
//! use quick_xmlrpc::reader::parse_value;
//! use quick_xmlrpc::{MappingAction, NonStandard, Type, Value};
//!
//! let xml = "<value><array><data>\
//!            <value><i4>1</i4></value>\
//!            <value><i4>2</i4></value>\
//!            </data></array></value>";
//! let mut mapper = ValueMapper::new(parse_value(xml.as_bytes()), "value", NonStandard::NONE);
//! let value = mapper.map_value(&Type::Any, MappingAction::Error).unwrap();
//!
//! match value {
//!     Value::Array(array) => {
//!         assert_eq!(array.elem, Type::Int);
//!         assert_eq!(array.items, vec![Value::Int(1), Value::Int(2)]);
//!     }
//!     _ => unreachable!(),
//! }
//! ```
//!
//! [`Node`]: crate::events::Node
//! [`NodeReader`]: crate::reader::NodeReader
//! [`Struct`]: crate::Struct
//! [`Array`]: crate::value::Array

mod map;
mod seq;
mod simple_type;
mod var;

use crate::config::NonStandard;
use crate::errors::{Error, Result};
use crate::events::{Node, NodeKind, ScalarKind};
use crate::mapping::MappingStack;
use crate::types::{MappingAction, Type};
use crate::value::Value;

/// Builds [`Value`]s from a stream of XML-RPC nodes.
pub struct ValueMapper<I> {
    nodes: I,
    peek: Option<Node>,
    non_standard: NonStandard,
    stack: MappingStack,
}

impl<I> ValueMapper<I>
where
    I: Iterator<Item = Result<Node>>,
{
    /// Creates a mapper for a document of the given kind, such as `request`
    /// or `response`. The kind starts every diagnostic message.
    pub fn new(nodes: I, kind: &str, non_standard: NonStandard) -> Self {
        Self {
            nodes,
            peek: None,
            non_standard,
            stack: MappingStack::new(kind),
        }
    }

    /// The conformance flags of the mapper.
    #[inline]
    pub fn non_standard(&self) -> NonStandard {
        self.non_standard
    }

    /// The diagnostic trail at the current position.
    #[inline]
    pub fn stack(&self) -> &MappingStack {
        &self.stack
    }

    #[inline]
    pub(crate) fn stack_mut(&mut self) -> &mut MappingStack {
        &mut self.stack
    }

    /// Returns the next node without consuming it.
    pub fn peek(&mut self) -> Result<Option<&Node>> {
        if self.peek.is_none() {
            self.peek = self.nodes.next().transpose()?;
        }
        Ok(self.peek.as_ref())
    }

    /// Consumes the next node.
    pub fn next_node(&mut self) -> Result<Option<Node>> {
        if let Some(node) = self.peek.take() {
            return Ok(Some(node));
        }
        self.nodes.next().transpose()
    }

    /// Consumes the next node, which must exist.
    fn next_required(&mut self) -> Result<Node> {
        match self.next_node()? {
            Some(node) => Ok(node),
            None => Err(Error::InvalidProtocol(format!(
                "{} ends unexpectedly {}",
                self.stack.kind(),
                self.stack
            ))),
        }
    }

    /// Returns `true` if the next node ends the current array.
    fn at_array_end(&mut self) -> Result<bool> {
        match self.peek()? {
            Some(node) => Ok(node.kind == NodeKind::ArrayEnd),
            None => Err(Error::InvalidProtocol(format!(
                "{} ends inside an array {}",
                self.stack.kind(),
                self.stack
            ))),
        }
    }

    /// Consumes the first node of the next value.
    fn next_value(&mut self) -> Result<Node> {
        let node = self.next_required()?;
        if node.is_value() {
            Ok(node)
        } else {
            Err(Error::InvalidProtocol(format!(
                "{} contains {:?} where value expected {}",
                self.stack.kind(),
                node.kind,
                self.stack
            )))
        }
    }

    /// Maps the next value onto `ty`.
    ///
    /// `missing` is the policy for record members absent from the wire, unless
    /// the record type or the member overrides it.
    pub fn map_value(&mut self, ty: &Type, missing: MappingAction) -> Result<Value> {
        let node = self.next_value()?;
        let target = ty.strip_nullable();
        match node.kind {
            NodeKind::Scalar {
                kind: ScalarKind::Nil,
                ..
            } => self.map_nil(ty),
            NodeKind::Scalar {
                kind,
                text,
                implicit,
            } => {
                if implicit {
                    self.check_implicit(target)?;
                }
                self.map_scalar(kind, text, target)
            }
            NodeKind::StructBegin => self.map_struct(target, missing),
            NodeKind::ArrayBegin => self.map_array(target, missing),
            // `next_value` returns only value nodes
            _ => Err(Error::InvalidProtocol(format!(
                "{} contains unexpected node {}",
                self.stack.kind(),
                self.stack
            ))),
        }
    }

    /// Consumes the next value without mapping it.
    pub fn skip_value(&mut self) -> Result<()> {
        let node = self.next_value()?;
        if matches!(node.kind, NodeKind::StructBegin | NodeKind::ArrayBegin) {
            loop {
                let next = self.next_required()?;
                if next.depth == node.depth
                    && matches!(next.kind, NodeKind::StructEnd | NodeKind::ArrayEnd)
                {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Runs `f` with `entry` pushed on the mapping stack.
    pub(crate) fn on_stack<T, F, S>(&mut self, entry: S, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
        S: Into<String>,
    {
        self.stack.push(entry);
        let result = f(self);
        self.stack.pop();
        result
    }

    fn map_nil(&self, ty: &Type) -> Result<Value> {
        if ty.accepts_nil() {
            return Ok(Value::Nil);
        }
        Err(Error::InvalidProtocol(format!(
            "{} contains <nil> value which cannot be mapped to type {} {}",
            self.stack.kind(),
            ty,
            self.stack
        )))
    }

    fn check_implicit(&self, target: &Type) -> Result<()> {
        match target {
            Type::Any | Type::String | Type::Enum(_) => Ok(()),
            _ => Err(Error::TypeMismatch(format!(
                "{} contains implicit string value where {} expected {}",
                self.stack.kind(),
                target.xmlrpc_name(),
                self.stack
            ))),
        }
    }

    /// Error for a value of wire type `actual` where `expected` is declared.
    fn mismatch(&self, actual: &str, expected: &Type) -> Error {
        Error::TypeMismatch(format!(
            "{} contains {} value where {} expected {}",
            self.stack.kind(),
            actual,
            expected.xmlrpc_name(),
            self.stack
        ))
    }
}
