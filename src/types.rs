//! Descriptions of the types that XML-RPC values are mapped onto.
//!
//! The mapper is guided by a [`Type`]: it checks the wire kind of every value
//! against it and decides how to build arrays and structs. Aggregates and enums
//! describe themselves through the [`Record`] and [`Enum`] traits, which are
//! usually implemented with the [`impl_record!`] and [`impl_enum!`] macros.
//!
//! [`impl_record!`]: crate::impl_record
//! [`impl_enum!`]: crate::impl_enum

use crate::convert::{FromXmlRpc, ToXmlRpc};
use crate::errors::Result;
use crate::events::ScalarKind;
use crate::value::Value;
use std::fmt;

#[cfg(feature = "serde-types")]
use serde::{Deserialize, Serialize};

/// The type a value is mapped onto.
#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    /// No constraint: the shape is inferred from the value itself
    Any,
    /// `<i4>` or `<int>`
    Int,
    /// `<i8>`
    Long,
    /// `<boolean>`
    Boolean,
    /// `<string>`
    String,
    /// `<double>`
    Double,
    /// `<dateTime.iso8601>`
    DateTime,
    /// `<base64>`
    Base64,
    /// A struct mapped onto an ordered [`Struct`](crate::Struct)
    Struct,
    /// An array of any values
    GenericArray,
    /// An array which elements are of the given type
    Array(Box<Type>),
    /// A rectangular array of the given element type and rank
    MultiDimArray(Box<Type>, usize),
    /// A struct mapped onto a [`Record`]
    Record(RecordType),
    /// An integer or string mapped onto an [`Enum`]
    Enum(EnumType),
    /// The inner type, or `<nil/>`
    Nullable(Box<Type>),
    /// No value at all. Serialized as an empty string.
    Void,
}

impl Type {
    /// Returns the type without its `Nullable` wrappers.
    pub fn strip_nullable(&self) -> &Type {
        match self {
            Type::Nullable(inner) => inner.strip_nullable(),
            ty => ty,
        }
    }

    /// Returns `true` if `<nil/>` may be mapped onto this type.
    ///
    /// Only integers, booleans, doubles and enums reject it. Native types
    /// which cannot hold nil reject [`Value::Nil`](crate::Value::Nil) when
    /// they are extracted with [`FromXmlRpc`](crate::FromXmlRpc).
    pub fn accepts_nil(&self) -> bool {
        !matches!(
            self,
            Type::Int | Type::Long | Type::Boolean | Type::Double | Type::Enum(_)
        )
    }

    /// Returns the scalar kind expected on the wire for a scalar type. An enum
    /// is expected as the integer kind of its representation.
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        Some(match self.strip_nullable() {
            Type::Int => ScalarKind::Int,
            Type::Long => ScalarKind::Long,
            Type::Boolean => ScalarKind::Boolean,
            Type::String => ScalarKind::String,
            Type::Double => ScalarKind::Double,
            Type::DateTime => ScalarKind::DateTime,
            Type::Base64 => ScalarKind::Base64,
            Type::Enum(e) => return e.repr.wire_kind(),
            _ => return None,
        })
    }

    /// Name of the XML-RPC type used in diagnostic messages.
    pub fn xmlrpc_name(&self) -> &'static str {
        match self {
            Type::Any => "any",
            Type::Struct | Type::Record(_) => "struct",
            Type::GenericArray | Type::Array(_) | Type::MultiDimArray(..) => "array",
            Type::Nullable(inner) => inner.xmlrpc_name(),
            Type::Void => "void",
            Type::Enum(e) => match e.repr.wire_kind() {
                Some(kind) => kind.as_str(),
                None => "enum",
            },
            ty => match ty.scalar_kind() {
                Some(kind) => kind.as_str(),
                None => "any",
            },
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::Any => f.write_str("Value"),
            Type::Int => f.write_str("i32"),
            Type::Long => f.write_str("i64"),
            Type::Boolean => f.write_str("bool"),
            Type::String => f.write_str("String"),
            Type::Double => f.write_str("f64"),
            Type::DateTime => f.write_str("NaiveDateTime"),
            Type::Base64 => f.write_str("ByteBuf"),
            Type::Struct => f.write_str("Struct"),
            Type::GenericArray => f.write_str("Array"),
            Type::Array(elem) => write!(f, "Vec<{}>", elem),
            Type::MultiDimArray(elem, rank) => write!(f, "MultiArray<{}, {}>", elem, rank),
            Type::Record(r) => f.write_str(r.name),
            Type::Enum(e) => f.write_str(e.name),
            Type::Nullable(inner) => write!(f, "Option<{}>", inner),
            Type::Void => f.write_str("()"),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// What to do with a declared record member that is absent from the wire
/// struct.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(Deserialize, Serialize))]
pub enum MappingAction {
    /// Leave the member at its default value
    Ignore,
    /// Fail with [`Error::MissingRequiredMember`](crate::Error::MissingRequiredMember)
    Error,
}

/// What to do with a record member without value when it is serialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(Deserialize, Serialize))]
pub enum NullMappingAction {
    /// Omit the member
    Ignore,
    /// Fail with [`Error::NullMember`](crate::Error::NullMember)
    Error,
    /// Write the member with a `<nil />` value
    Nil,
}

/// How enum values are serialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(Deserialize, Serialize))]
pub enum EnumMapping {
    /// As the variant name, in a `<string>`
    String,
    /// As the underlying number, in an `<i4>` or `<i8>`
    Number,
}

/// Policies applied while a value is serialized. Record types and their
/// members may override them, and the override is inherited by nested values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(Deserialize, Serialize))]
pub struct MappingActions {
    /// Policy for members without value
    pub null_mapping: NullMappingAction,
    /// Representation of enums
    pub enum_mapping: EnumMapping,
}

impl MappingActions {
    /// Returns the actions with the given overrides applied.
    pub fn merge(self, null: Option<NullMappingAction>, enums: Option<EnumMapping>) -> Self {
        Self {
            null_mapping: null.unwrap_or(self.null_mapping),
            enum_mapping: enums.unwrap_or(self.enum_mapping),
        }
    }
}

impl Default for MappingActions {
    fn default() -> Self {
        Self {
            null_mapping: NullMappingAction::Ignore,
            enum_mapping: EnumMapping::Number,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// A member of a record type.
#[derive(Clone, Debug, PartialEq)]
pub struct Member {
    /// Name of the member in the record
    pub name: &'static str,
    /// Name of the member on the wire, when it differs from `name`
    pub wire_name: Option<&'static str>,
    /// Declared type of the member
    pub ty: Type,
    /// Override of the missing member policy
    pub missing: Option<MappingAction>,
    /// Override of the null mapping policy
    pub null_mapping: Option<NullMappingAction>,
    /// Override of the enum mapping policy
    pub enum_mapping: Option<EnumMapping>,
    /// The member is never read from nor written to the wire. Wire data for
    /// it is an error.
    pub non_serialized: bool,
}

impl Member {
    /// Creates a description of a member of type `T`.
    pub fn new<T: FromXmlRpc>(name: &'static str) -> Self {
        Self::of_type(name, T::xmlrpc_type())
    }

    /// Creates a description of a member of the given type.
    pub fn of_type(name: &'static str, ty: Type) -> Self {
        Self {
            name,
            wire_name: None,
            ty,
            missing: None,
            null_mapping: None,
            enum_mapping: None,
            non_serialized: false,
        }
    }

    /// Sets the name of the member on the wire.
    pub fn rename(mut self, wire_name: &'static str) -> Self {
        self.wire_name = Some(wire_name);
        self
    }

    /// Overrides the missing member policy.
    pub fn missing(mut self, action: MappingAction) -> Self {
        self.missing = Some(action);
        self
    }

    /// Overrides the null mapping policy.
    pub fn null_mapping(mut self, action: NullMappingAction) -> Self {
        self.null_mapping = Some(action);
        self
    }

    /// Overrides the enum mapping policy.
    pub fn enum_mapping(mut self, mapping: EnumMapping) -> Self {
        self.enum_mapping = Some(mapping);
        self
    }

    /// Excludes the member from mapping.
    pub fn non_serialized(mut self) -> Self {
        self.non_serialized = true;
        self
    }

    /// Name of the member on the wire.
    #[inline]
    pub fn wire_name(&self) -> &'static str {
        self.wire_name.unwrap_or(self.name)
    }
}

/// Full description of a record type.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordDesc {
    /// Name of the type, used in diagnostics
    pub name: &'static str,
    /// Members in declaration order
    pub members: Vec<Member>,
    /// Type-level missing member policy
    pub missing: Option<MappingAction>,
    /// Type-level null mapping policy
    pub null_mapping: Option<NullMappingAction>,
    /// Type-level enum mapping policy
    pub enum_mapping: Option<EnumMapping>,
}

impl RecordDesc {
    /// Creates a description of a record without members.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            members: Vec::new(),
            missing: None,
            null_mapping: None,
            enum_mapping: None,
        }
    }

    /// Adds a member.
    pub fn member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    /// Sets the type-level missing member policy.
    pub fn missing(mut self, action: MappingAction) -> Self {
        self.missing = Some(action);
        self
    }

    /// Sets the type-level null mapping policy.
    pub fn null_mapping(mut self, action: NullMappingAction) -> Self {
        self.null_mapping = Some(action);
        self
    }

    /// Sets the type-level enum mapping policy.
    pub fn enum_mapping(mut self, mapping: EnumMapping) -> Self {
        self.enum_mapping = Some(mapping);
        self
    }

    /// Finds the member that receives the wire member `wire_name`.
    ///
    /// A renamed member is found by its wire name first; a member is also
    /// found by its own name.
    pub fn find(&self, wire_name: &str) -> Option<&Member> {
        self.members
            .iter()
            .find(|m| m.wire_name == Some(wire_name))
            .or_else(|| self.members.iter().find(|m| m.name == wire_name))
    }

    /// Finds a member by its own name.
    pub fn get(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// A lazily described record type.
///
/// The description is produced on demand, so record types may refer to
/// themselves through `Option<Box<Self>>` members.
#[derive(Clone, Copy)]
pub struct RecordType {
    /// Name of the type
    pub name: &'static str,
    describe: fn() -> RecordDesc,
}

impl RecordType {
    /// Creates a record type from its name and a function that describes it.
    pub const fn new(name: &'static str, describe: fn() -> RecordDesc) -> Self {
        Self { name, describe }
    }

    /// Returns the type of record `R`.
    pub fn of<R: Record>() -> Self {
        Self {
            name: R::NAME,
            describe: R::describe,
        }
    }

    /// Builds the full description of the type.
    pub fn describe(&self) -> RecordDesc {
        (self.describe)()
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "RecordType({})", self.name)
    }
}

/// A struct-like type that XML-RPC structs are mapped onto.
///
/// Implement it with [`impl_record!`](crate::impl_record).
pub trait Record: Default + 'static {
    /// Name of the type, used in diagnostics
    const NAME: &'static str;

    /// Describes members and mapping policies of the type.
    fn describe() -> RecordDesc;

    /// Passes every member, in declaration order, to `visitor`.
    fn visit_members<V: MemberVisitor>(&self, visitor: &mut V) -> Result<()>;

    /// Assigns a mapped value to the member `name`. Unknown names are ignored.
    fn set_member(&mut self, name: &str, value: Value) -> Result<()>;
}

/// Receives the members of a [`Record`].
pub trait MemberVisitor {
    /// Visits member `name` with its current value.
    fn visit<T: ToXmlRpc + ?Sized>(&mut self, name: &'static str, value: &T) -> Result<()>;
}

/// Builds a record from a mapped struct value.
pub fn record_from_value<R: Record>(value: Value) -> Result<R> {
    match value {
        Value::Record(record) if record.ty.name == R::NAME => {
            let mut result = R::default();
            for (name, member) in record.members {
                result.set_member(name, member)?;
            }
            Ok(result)
        }
        other => Err(crate::convert::conversion_error(&other, R::NAME)),
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// Underlying integer type of an [`Enum`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnumRepr {
    /// `i8`
    I8,
    /// `u8`
    U8,
    /// `i16`
    I16,
    /// `u16`
    U16,
    /// `i32`
    I32,
    /// `u32`
    U32,
    /// `i64`
    I64,
    /// `u64`
    U64,
}

impl EnumRepr {
    /// Kind of the integer scalar an enum of this representation is mapped
    /// from. Types up to 32 bits that fit into `i32` use `<i4>`, `u32` and
    /// `i64` use `<i8>`. `u64` has no XML-RPC representation.
    pub fn wire_kind(self) -> Option<ScalarKind> {
        match self {
            Self::I8 | Self::U8 | Self::I16 | Self::U16 | Self::I32 => Some(ScalarKind::Int),
            Self::U32 | Self::I64 => Some(ScalarKind::Long),
            Self::U64 => None,
        }
    }

    /// Returns `true` if `value` is in range of the representation.
    pub fn fits(self, value: i64) -> bool {
        let (min, max) = match self {
            Self::I8 => (i64::from(i8::MIN), i64::from(i8::MAX)),
            Self::U8 => (0, i64::from(u8::MAX)),
            Self::I16 => (i64::from(i16::MIN), i64::from(i16::MAX)),
            Self::U16 => (0, i64::from(u16::MAX)),
            Self::I32 => (i64::from(i32::MIN), i64::from(i32::MAX)),
            Self::U32 => (0, i64::from(u32::MAX)),
            Self::I64 => (i64::MIN, i64::MAX),
            Self::U64 => (0, i64::MAX),
        };
        min <= value && value <= max
    }
}

/// Description of an enum type.
#[derive(Clone, Copy, Debug)]
pub struct EnumType {
    /// Name of the type
    pub name: &'static str,
    /// Underlying integer type
    pub repr: EnumRepr,
    /// Variant names and values, in declaration order
    pub variants: &'static [(&'static str, i64)],
}

impl EnumType {
    /// Returns the type of enum `E`.
    pub fn of<E: Enum>() -> Self {
        Self {
            name: E::NAME,
            repr: E::REPR,
            variants: E::VARIANTS,
        }
    }

    /// Finds a variant by name, ignoring ASCII case.
    pub fn find_name(&self, name: &str) -> Option<(&'static str, i64)> {
        self.variants
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .copied()
    }

    /// Finds a variant by value.
    pub fn find_number(&self, number: i64) -> Option<(&'static str, i64)> {
        self.variants.iter().find(|(_, v)| *v == number).copied()
    }
}

impl PartialEq for EnumType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// A fieldless enum that is mapped from integers or variant names.
///
/// Implement it with [`impl_enum!`](crate::impl_enum).
pub trait Enum: Copy + 'static {
    /// Name of the type, used in diagnostics
    const NAME: &'static str;
    /// Underlying integer type
    const REPR: EnumRepr;
    /// Variant names and values, in declaration order
    const VARIANTS: &'static [(&'static str, i64)];

    /// Value of the variant.
    fn to_number(self) -> i64;

    /// Variant with the given value.
    fn from_number(number: i64) -> Option<Self>;
}
