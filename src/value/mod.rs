//! Dynamically typed XML-RPC values.
//!
//! A [`Value`] is what the [`ValueMapper`] produces: every value of an
//! XML-RPC document, shaped by the target [`Type`] when one is given. Typed
//! native values are then extracted with [`FromXmlRpc`].
//!
//! [`ValueMapper`]: crate::de::ValueMapper
//! [`FromXmlRpc`]: crate::FromXmlRpc

mod array;
mod byte_buf;
mod structs;

pub use array::MultiArray;
pub use byte_buf::ByteBuf;
pub use structs::{Iter, Struct};

use crate::types::{EnumType, RecordType, Type};
use chrono::NaiveDateTime;

/// Any XML-RPC value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// `<i4>` or `<int>`
    Int(i32),
    /// `<i8>`
    Long(i64),
    /// `<boolean>`
    Boolean(bool),
    /// `<string>`, or a value without type tag
    String(String),
    /// `<double>`
    Double(f64),
    /// `<dateTime.iso8601>`, always in UTC
    DateTime(NaiveDateTime),
    /// `<base64>`
    Base64(Vec<u8>),
    /// `<struct>` mapped without a record type
    Struct(Struct),
    /// `<struct>` mapped onto a record type
    Record(RecordValue),
    /// `<array>`
    Array(Array),
    /// Nested `<array>`s mapped onto a rectangular array
    MultiDimArray(MultiDimArray),
    /// Integer or string mapped onto an enum
    Enum(EnumValue),
    /// `<nil/>`
    Nil,
}

impl Value {
    /// Returns the type of the value. `Nil` has no type of its own and
    /// reports [`Type::Any`].
    pub fn value_type(&self) -> Type {
        match self {
            Value::Int(_) => Type::Int,
            Value::Long(_) => Type::Long,
            Value::Boolean(_) => Type::Boolean,
            Value::String(_) => Type::String,
            Value::Double(_) => Type::Double,
            Value::DateTime(_) => Type::DateTime,
            Value::Base64(_) => Type::Base64,
            Value::Struct(_) => Type::Struct,
            Value::Record(r) => Type::Record(r.ty),
            Value::Array(a) => Type::Array(Box::new(a.elem.clone())),
            Value::MultiDimArray(a) => Type::MultiDimArray(Box::new(a.elem.clone()), a.lengths.len()),
            Value::Enum(e) => Type::Enum(e.ty),
            Value::Nil => Type::Any,
        }
    }

    /// Returns `true` for `Nil`.
    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Returns the string if the value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if the value is an `<i4>` or an `<i8>` in range.
    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Value::Int(n) => Some(n),
            Value::Long(n) => i32::try_from(n).ok(),
            _ => None,
        }
    }

    /// Returns the struct if the value is a generic struct.
    pub fn as_struct(&self) -> Option<&Struct> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the items if the value is an array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(&a.items),
            _ => None,
        }
    }
}

impl From<Struct> for Value {
    fn from(value: Struct) -> Self {
        Value::Struct(value)
    }
}

impl From<Array> for Value {
    fn from(value: Array) -> Self {
        Value::Array(value)
    }
}

/// A struct mapped onto a record type.
///
/// Members are keyed by their name in the record, not by their wire name, and
/// only members present on the wire are listed.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordValue {
    /// The record type
    pub ty: RecordType,
    /// Mapped members in wire order
    pub members: Vec<(&'static str, Value)>,
}

impl RecordValue {
    /// Returns the value of member `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.members.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }
}

/// An array with the type of its elements.
#[derive(Clone, Debug, PartialEq)]
pub struct Array {
    /// Declared or inferred type of the elements. [`Type::Any`] when the
    /// elements have different types.
    pub elem: Type,
    /// Elements in order
    pub items: Vec<Value>,
}

impl Array {
    /// Creates an array of values of any type.
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            elem: Type::Any,
            items,
        }
    }

    /// Creates an array typed by the single type of all its non-nil items.
    ///
    /// If the items have different types, or there are no non-nil items, the
    /// element type is [`Type::Any`].
    pub fn infer(items: Vec<Value>) -> Self {
        let mut elem = None;
        for item in items.iter().filter(|item| !item.is_nil()) {
            let ty = item.value_type();
            match &elem {
                None => elem = Some(ty),
                Some(found) if *found == ty => {}
                Some(_) => {
                    elem = Some(Type::Any);
                    break;
                }
            }
        }
        Self {
            elem: elem.unwrap_or(Type::Any),
            items,
        }
    }
}

/// A rectangular array.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiDimArray {
    /// Type of the elements
    pub elem: Type,
    /// Length of each dimension
    pub lengths: Vec<usize>,
    /// Elements in row-major order
    pub items: Vec<Value>,
}

/// A value of an enum type.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumValue {
    /// The enum type
    pub ty: EnumType,
    /// Name of the variant
    pub name: &'static str,
    /// Underlying value of the variant
    pub number: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn homogeneous() {
        let array = Array::infer(vec![Value::Int(1), Value::Nil, Value::Int(3)]);
        assert_eq!(array.elem, Type::Int);
    }

    #[test]
    fn heterogeneous() {
        let array = Array::infer(vec![
            Value::Int(12),
            Value::String("Egypt".into()),
            Value::Boolean(false),
        ]);
        assert_eq!(array.elem, Type::Any);
    }

    #[test]
    fn nested_arrays_of_different_types() {
        let ints = Value::Array(Array::infer(vec![Value::Int(1)]));
        let mixed = Value::Array(Array::infer(vec![Value::Int(1), Value::Long(2)]));
        assert_eq!(
            Array::infer(vec![ints.clone(), ints.clone()]).elem,
            Type::Array(Box::new(Type::Int))
        );
        assert_eq!(Array::infer(vec![ints, mixed]).elem, Type::Any);
    }

    #[test]
    fn empty_and_nil_only() {
        assert_eq!(Array::infer(vec![]).elem, Type::Any);
        assert_eq!(Array::infer(vec![Value::Nil]).elem, Type::Any);
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::Long(7).as_i32(), Some(7));
        assert_eq!(Value::Long(i64::MAX).as_i32(), None);
        assert_eq!(Value::String("a".into()).as_str(), Some("a"));
        assert!(Value::Nil.as_struct().is_none());
    }
}
