//! Macros that describe native types to the mapper and the serializer.

/// Implements [`Record`], [`ToXmlRpc`] and [`FromXmlRpc`] for a struct with
/// named fields, so that it is mapped from and written as an XML-RPC struct.
///
/// The struct must implement [`Default`], and each field type must implement
/// both [`ToXmlRpc`] and [`FromXmlRpc`]. Members are written in the order they
/// are listed.
///
/// Options are given in brackets after the type name for the whole type, and
/// after `=>` for a single member:
///
/// | Option                  | Applies to    | Meaning
/// |-------------------------|---------------|------------------------------------------
/// | `rename = "wireName"`   | member        | Name of the member on the wire
/// | `missing = Error`       | type, member  | Missing member policy, [`MappingAction`]
/// | `null = Nil`            | type, member  | Null mapping policy, [`NullMappingAction`]
/// | `enums = String`        | type, member  | Enum mapping policy, [`EnumMapping`]
/// | `non_serialized = true` | member        | Never read nor written
///
/// ```
/// use quick_xmlrpc::{impl_record, Record};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Book {
///     title: String,
///     pages: i32,
///     isbn: Option<String>,
/// }
///
/// impl_record! {
///     Book [missing = Ignore] {
///         title: String => { missing = Error },
///         pages: i32 => { rename = "pageCount" },
///         isbn: Option<String> => { null = Nil },
///     }
/// }
///
/// let desc = Book::describe();
/// assert_eq!(desc.members[1].wire_name(), "pageCount");
/// ```
///
/// [`Record`]: crate::Record
/// [`ToXmlRpc`]: crate::ToXmlRpc
/// [`FromXmlRpc`]: crate::FromXmlRpc
/// [`MappingAction`]: crate::MappingAction
/// [`NullMappingAction`]: crate::NullMappingAction
/// [`EnumMapping`]: crate::EnumMapping
#[macro_export]
macro_rules! impl_record {
    (@type $desc:ident, missing = $action:ident) => {
        $desc.missing($crate::MappingAction::$action)
    };
    (@type $desc:ident, null = $action:ident) => {
        $desc.null_mapping($crate::NullMappingAction::$action)
    };
    (@type $desc:ident, enums = $mapping:ident) => {
        $desc.enum_mapping($crate::EnumMapping::$mapping)
    };
    (@member $member:ident, rename = $name:literal) => {
        $member.rename($name)
    };
    (@member $member:ident, non_serialized = true) => {
        $member.non_serialized()
    };
    (@member $member:ident, non_serialized = false) => {
        $member
    };
    (@member $member:ident, $($option:tt)+) => {
        $crate::impl_record!(@type $member, $($option)+)
    };
    (
        $ty:ident $([ $($tkey:ident = $tval:tt),* $(,)? ])? {
            $( $field:ident : $fty:ty $(=> { $($key:ident = $val:tt),* $(,)? })? ),* $(,)?
        }
    ) => {
        impl $crate::Record for $ty {
            const NAME: &'static str = stringify!($ty);

            fn describe() -> $crate::RecordDesc {
                let desc = $crate::RecordDesc::new(stringify!($ty));
                $($( let desc = $crate::impl_record!(@type desc, $tkey = $tval); )*)?
                $(
                    let member = $crate::Member::new::<$fty>(stringify!($field));
                    $($( let member = $crate::impl_record!(@member member, $key = $val); )*)?
                    let desc = desc.member(member);
                )*
                desc
            }

            fn visit_members<V: $crate::MemberVisitor>(&self, visitor: &mut V) -> $crate::Result<()> {
                $( visitor.visit(stringify!($field), &self.$field)?; )*
                Ok(())
            }

            fn set_member(&mut self, name: &str, value: $crate::Value) -> $crate::Result<()> {
                match name {
                    $(
                        stringify!($field) => {
                            self.$field = <$fty as $crate::FromXmlRpc>::from_value(value)?;
                        }
                    )*
                    _ => {}
                }
                Ok(())
            }
        }

        impl $crate::ToXmlRpc for $ty {
            fn serialize<W: ::std::io::Write>(
                &self,
                ser: &mut $crate::se::Serializer<'_, W>,
            ) -> $crate::Result<()> {
                ser.serialize_record(self)
            }
        }

        impl $crate::FromXmlRpc for $ty {
            fn xmlrpc_type() -> $crate::Type {
                $crate::Type::Record($crate::RecordType::of::<Self>())
            }

            fn from_value(value: $crate::Value) -> $crate::Result<Self> {
                $crate::record_from_value(value)
            }
        }
    };
}

/// Implements [`Enum`], [`ToXmlRpc`] and [`FromXmlRpc`] for a fieldless enum.
///
/// The underlying integer type decides how numbers are read and written:
/// `i8`, `u8`, `i16`, `u16` and `i32` use `<i4>`, `u32` and `i64` use `<i8>`.
/// `u64` enums can only be mapped by name. The enum must be `Copy`.
///
/// ```
/// use quick_xmlrpc::{impl_enum, Enum};
///
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// enum Color {
///     Red = 1,
///     Green = 2,
/// }
///
/// impl_enum! {
///     Color: i32 { Red = 1, Green = 2 }
/// }
///
/// assert_eq!(Color::Green.to_number(), 2);
/// assert_eq!(Color::from_number(1), Some(Color::Red));
/// ```
///
/// [`Enum`]: crate::Enum
/// [`ToXmlRpc`]: crate::ToXmlRpc
/// [`FromXmlRpc`]: crate::FromXmlRpc
#[macro_export]
macro_rules! impl_enum {
    (@repr i8) => { $crate::EnumRepr::I8 };
    (@repr u8) => { $crate::EnumRepr::U8 };
    (@repr i16) => { $crate::EnumRepr::I16 };
    (@repr u16) => { $crate::EnumRepr::U16 };
    (@repr i32) => { $crate::EnumRepr::I32 };
    (@repr u32) => { $crate::EnumRepr::U32 };
    (@repr i64) => { $crate::EnumRepr::I64 };
    (@repr u64) => { $crate::EnumRepr::U64 };
    (
        $ty:ident : $repr:ident { $( $variant:ident = $value:literal ),* $(,)? }
    ) => {
        impl $crate::Enum for $ty {
            const NAME: &'static str = stringify!($ty);
            const REPR: $crate::EnumRepr = $crate::impl_enum!(@repr $repr);
            const VARIANTS: &'static [(&'static str, i64)] = &[ $( (stringify!($variant), $value) ),* ];

            fn to_number(self) -> i64 {
                match self {
                    $( $ty::$variant => $value, )*
                }
            }

            fn from_number(number: i64) -> Option<Self> {
                match number {
                    $( $value => Some($ty::$variant), )*
                    _ => None,
                }
            }
        }

        impl $crate::ToXmlRpc for $ty {
            fn serialize<W: ::std::io::Write>(
                &self,
                ser: &mut $crate::se::Serializer<'_, W>,
            ) -> $crate::Result<()> {
                ser.serialize_enum(
                    &$crate::EnumType::of::<Self>(),
                    $crate::Enum::to_number(*self),
                )
            }
        }

        impl $crate::FromXmlRpc for $ty {
            fn xmlrpc_type() -> $crate::Type {
                $crate::Type::Enum($crate::EnumType::of::<Self>())
            }

            fn from_value(value: $crate::Value) -> $crate::Result<Self> {
                let ty = $crate::EnumType::of::<Self>();
                let number = $crate::convert::enum_number(value, &ty)?;
                <Self as $crate::Enum>::from_number(number).ok_or_else(|| {
                    $crate::Error::InvalidEnumValue(format!(
                        "{} is not a value of enum {}",
                        number,
                        ty.name
                    ))
                })
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::types::{EnumMapping, EnumRepr, Enum, MappingAction, NullMappingAction, Record, Type};
    use crate::value::{EnumValue, RecordValue, Value};
    use crate::{FromXmlRpc, RecordType};
    use pretty_assertions::assert_eq;

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Shape {
        Circle = -1,
        Square = 4,
    }

    impl_enum! {
        Shape: i16 { Circle = -1, Square = 4 }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Figure {
        name: String,
        sides: Option<i32>,
        shape: Option<Shape>,
        scratch: Vec<i32>,
    }

    impl_record! {
        Figure [missing = Ignore, enums = String] {
            name: String => { rename = "Name", missing = Error },
            sides: Option<i32> => { null = Nil },
            shape: Option<Shape> => { enums = Number },
            scratch: Vec<i32> => { non_serialized = true },
        }
    }

    #[test]
    fn enum_description() {
        assert_eq!(Shape::NAME, "Shape");
        assert_eq!(Shape::REPR, EnumRepr::I16);
        assert_eq!(Shape::VARIANTS, &[("Circle", -1), ("Square", 4)]);
        assert_eq!(Shape::Circle.to_number(), -1);
        assert_eq!(Shape::from_number(4), Some(Shape::Square));
        assert_eq!(Shape::from_number(3), None);
    }

    #[test]
    fn enum_from_value() {
        let value = Value::Enum(EnumValue {
            ty: crate::EnumType::of::<Shape>(),
            name: "Square",
            number: 4,
        });
        assert_eq!(Shape::from_value(value).unwrap(), Shape::Square);
        assert!(Shape::from_value(Value::Int(4)).is_err());
    }

    #[test]
    fn record_description() {
        let desc = Figure::describe();
        assert_eq!(desc.name, "Figure");
        assert_eq!(desc.missing, Some(MappingAction::Ignore));
        assert_eq!(desc.enum_mapping, Some(EnumMapping::String));

        let names: Vec<_> = desc.members.iter().map(|m| m.wire_name()).collect();
        assert_eq!(names, vec!["Name", "sides", "shape", "scratch"]);
        assert_eq!(desc.members[0].missing, Some(MappingAction::Error));
        assert_eq!(desc.members[1].ty, Type::Nullable(Box::new(Type::Int)));
        assert_eq!(desc.members[1].null_mapping, Some(NullMappingAction::Nil));
        assert_eq!(desc.members[2].enum_mapping, Some(EnumMapping::Number));
        assert!(desc.members[3].non_serialized);
    }

    #[test]
    fn record_from_value() {
        let value = Value::Record(RecordValue {
            ty: RecordType::of::<Figure>(),
            members: vec![("name", Value::String("box".into())), ("sides", Value::Int(4))],
        });
        assert_eq!(
            Figure::from_value(value).unwrap(),
            Figure {
                name: "box".into(),
                sides: Some(4),
                ..Figure::default()
            }
        );
        assert!(Figure::from_value(Value::Nil).is_err());
    }
}
