//! Streaming XML-RPC reader, value mapper and writer.
//!
//! ## Description
//!
//! - [`reader`]: a pull-based tokenizer that turns `<methodCall>`,
//!   `<methodResponse>` and `<value>` documents into a flat stream of
//!   [`Node`](events::Node)s, without building a DOM
//! - [`de`]: a [`ValueMapper`](de::ValueMapper) that builds [`Value`]s from
//!   the node stream, checked against a target [`Type`]
//! - [`se`]: a [`Serializer`](se::Serializer) that writes native values back
//!   as XML-RPC through a [`Writer`]
//! - [`RequestSerializer`], [`RequestDeserializer`], [`ResponseSerializer`]
//!   and [`ResponseDeserializer`] frame values in the method call and method
//!   response envelopes
//!
//! Native types take part in the mapping through the [`ToXmlRpc`] and
//! [`FromXmlRpc`] traits. Structs and enums implement them with the
//! [`impl_record!`] and [`impl_enum!`] macros.
//!
//! ## Examples
//!
//! ```
//! use quick_xmlrpc::{impl_record, FormatSettings, NonStandard};
//! use quick_xmlrpc::{RequestSerializer, ResponseDeserializer};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct State {
//!     name: String,
//!     population: i32,
//! }
//!
//! impl_record! {
//!     State {
//!         name: String,
//!         population: i32,
//!     }
//! }
//!
//! // write a call
//! let mut request = Vec::new();
//! RequestSerializer::new(FormatSettings::default())
//!     .serialize(&mut request, "examples.getState", &(41,))
//!     .unwrap();
//!
//! // read the answer
//! let response = r#"<?xml version="1.0"?>
//! <methodResponse>
//!   <params>
//!     <param>
//!       <value><struct>
//!         <member><name>name</name><value><string>South Dakota</string></value></member>
//!         <member><name>population</name><value><i4>909824</i4></value></member>
//!       </struct></value>
//!     </param>
//!   </params>
//! </methodResponse>"#;
//! let state: State = ResponseDeserializer::new(NonStandard::NONE)
//!     .deserialize_into(response.as_bytes())
//!     .unwrap();
//!
//! assert_eq!(state, State { name: "South Dakota".into(), population: 909824 });
//! ```
//!
//! ## Features
//!
//! `quick-xmlrpc` supports the following features:
#![cfg_attr(
    feature = "document-features",
    cfg_attr(doc, doc = ::document_features::document_features!())
)]
#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![recursion_limit = "1024"]

#[macro_use]
extern crate log;

#[macro_use]
mod macros;

mod config;
pub mod convert;
pub mod datetime;
pub mod de;
mod errors;
pub mod events;
mod mapping;
pub mod reader;
mod request;
mod response;
pub mod se;
mod service;
mod types;
pub mod value;
mod writer;

// reexports
pub use crate::config::{FormatSettings, NonStandard};
pub use crate::convert::{FromXmlRpc, Params, ToXmlRpc};
pub use crate::errors::{Error, Result};
pub use crate::mapping::MappingStack;
pub use crate::request::{Request, RequestDeserializer, RequestSerializer};
pub use crate::response::{Fault, ResponseDeserializer, ResponseSerializer};
pub use crate::service::{MethodSignature, Service};
pub use crate::types::{
    record_from_value, Enum, EnumMapping, EnumRepr, EnumType, MappingAction, MappingActions,
    Member, MemberVisitor, NullMappingAction, Record, RecordDesc, RecordType, Type,
};
pub use crate::value::{Array, ByteBuf, EnumValue, MultiArray, RecordValue, Struct, Value};
pub use crate::writer::Writer;
