//! Defines the XML-RPC nodes produced by the [`NodeReader`].
//!
//! A node is an atomic unit of an XML-RPC document: an envelope marker, one
//! scalar value, or a boundary of a struct or an array. For example, the
//! response
//!
//! ```xml
//! <methodResponse>
//!   <params>
//!     <param>
//!       <value><struct>
//!         <member><name>id</name><value><i4>7</i4></value></member>
//!       </struct></value>
//!     </param>
//!   </params>
//! </methodResponse>
//! ```
//!
//! consists of the nodes `ResponseMarker`, `StructBegin`, `StructMember("id")`,
//! `Scalar(Int, "7")` and `StructEnd`.
//!
//! [`NodeReader`]: crate::reader::NodeReader

use std::fmt;

/// Kind of a scalar value, one per XML-RPC scalar tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// `<i4>` or `<int>`
    Int,
    /// `<i8>`
    Long,
    /// `<double>`
    Double,
    /// `<boolean>`
    Boolean,
    /// `<string>`, or text without any tag
    String,
    /// `<dateTime.iso8601>`
    DateTime,
    /// `<base64>`
    Base64,
    /// `<nil/>`
    Nil,
}

impl ScalarKind {
    /// Returns the kind for a scalar tag name, if it is one.
    pub fn from_tag(name: &str) -> Option<Self> {
        Some(match name {
            "i4" | "int" => Self::Int,
            "i8" => Self::Long,
            "double" => Self::Double,
            "boolean" => Self::Boolean,
            "string" => Self::String,
            "dateTime.iso8601" => Self::DateTime,
            "base64" => Self::Base64,
            "nil" => Self::Nil,
            _ => return None,
        })
    }

    /// Name of the kind used in diagnostic messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "integer",
            Self::Long => "i8",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::DateTime => "dateTime",
            Self::Base64 => "base64",
            Self::Nil => "nil",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a [`Node`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Content of the `<methodName>` of a request
    MethodName(String),
    /// The `<params>` element of a request
    ParamsMarker,
    /// The `<params>` element of a response
    ResponseMarker,
    /// The `<fault>` element of a response
    FaultMarker,
    /// A scalar value
    Scalar {
        /// Kind of the value
        kind: ScalarKind,
        /// Text of the value, with all references resolved
        text: String,
        /// `true` if the value was given without a type tag, as bare text in
        /// `<value>` or as an empty `<value/>`. Implicit values are always
        /// strings.
        implicit: bool,
    },
    /// Start of a `<struct>` value
    StructBegin,
    /// Name of a struct member. Always followed by exactly one value
    StructMember(String),
    /// End of a `<struct>` value
    StructEnd,
    /// Start of an `<array>` value
    ArrayBegin,
    /// End of an `<array>` value
    ArrayEnd,
}

/// An event in the flat stream of an XML-RPC document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    /// Number of structs and arrays opened when the node was produced. An end
    /// marker has the same depth as its begin marker.
    pub depth: usize,
    /// Payload of the node
    pub kind: NodeKind,
}

impl Node {
    /// Creates a new node at the given depth.
    #[inline]
    pub fn new(depth: usize, kind: NodeKind) -> Self {
        Self { depth, kind }
    }

    /// Creates a scalar value node.
    pub fn scalar<S: Into<String>>(depth: usize, kind: ScalarKind, text: S) -> Self {
        Self::new(
            depth,
            NodeKind::Scalar {
                kind,
                text: text.into(),
                implicit: false,
            },
        )
    }

    /// Creates a string value node for text given without a type tag.
    pub fn implicit<S: Into<String>>(depth: usize, text: S) -> Self {
        Self::new(
            depth,
            NodeKind::Scalar {
                kind: ScalarKind::String,
                text: text.into(),
                implicit: true,
            },
        )
    }

    /// Returns `true` if the node starts a value: a scalar, or the beginning
    /// of a struct or an array.
    pub fn is_value(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Scalar { .. } | NodeKind::StructBegin | NodeKind::ArrayBegin
        )
    }
}
