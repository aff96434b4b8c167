//! Conversions between native Rust types and XML-RPC values.
//!
//! [`ToXmlRpc`] writes a native value through a [`Serializer`]. [`FromXmlRpc`]
//! declares the [`Type`] a value is mapped onto and extracts the native value
//! from the mapped [`Value`].

use crate::errors::{Error, Result};
use crate::se::Serializer;
use crate::types::{EnumType, Type};
use crate::value::{Array, ByteBuf, MultiArray, MultiDimArray, Struct, Value};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// A type that can be written as an XML-RPC value.
pub trait ToXmlRpc {
    /// Writes `self` as one `<value>` element.
    fn serialize<W: Write>(&self, ser: &mut Serializer<'_, W>) -> Result<()>;

    /// Returns `true` if `self` has no value, like `None`. Record members
    /// without value are written according to the null mapping policy.
    fn is_nil(&self) -> bool {
        false
    }
}

/// A type that XML-RPC values can be mapped onto.
pub trait FromXmlRpc: Sized {
    /// The type that guides the mapping of a value for `Self`.
    fn xmlrpc_type() -> Type;

    /// Extracts `Self` from a value mapped onto [`xmlrpc_type`](Self::xmlrpc_type).
    fn from_value(value: Value) -> Result<Self>;
}

/// Error for a mapped value that does not have the shape of type `target`.
pub(crate) fn conversion_error(value: &Value, target: &str) -> Error {
    if value.is_nil() {
        return Error::InvalidProtocol(format!(
            "<nil> value cannot be mapped to type {}",
            target
        ));
    }
    Error::TypeMismatch(format!(
        "value of type {} cannot be converted to {}",
        value.value_type(),
        target
    ))
}

macro_rules! scalar {
    ($ty:ty, $xmlrpc:expr, $variant:ident, $method:ident) => {
        impl ToXmlRpc for $ty {
            #[inline]
            fn serialize<W: Write>(&self, ser: &mut Serializer<'_, W>) -> Result<()> {
                ser.$method(*self)
            }
        }

        impl FromXmlRpc for $ty {
            fn xmlrpc_type() -> Type {
                $xmlrpc
            }

            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(conversion_error(&other, stringify!($ty))),
                }
            }
        }
    };
}

scalar!(i32, Type::Int, Int, serialize_i32);
scalar!(bool, Type::Boolean, Boolean, serialize_bool);
scalar!(f64, Type::Double, Double, serialize_f64);

impl ToXmlRpc for i64 {
    #[inline]
    fn serialize<W: Write>(&self, ser: &mut Serializer<'_, W>) -> Result<()> {
        ser.serialize_i64(*self)
    }
}

impl FromXmlRpc for i64 {
    fn xmlrpc_type() -> Type {
        Type::Long
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Long(v) => Ok(v),
            Value::Int(v) => Ok(i64::from(v)),
            other => Err(conversion_error(&other, "i64")),
        }
    }
}

impl ToXmlRpc for str {
    #[inline]
    fn serialize<W: Write>(&self, ser: &mut Serializer<'_, W>) -> Result<()> {
        ser.serialize_str(self)
    }
}

impl ToXmlRpc for String {
    #[inline]
    fn serialize<W: Write>(&self, ser: &mut Serializer<'_, W>) -> Result<()> {
        ser.serialize_str(self)
    }
}

impl FromXmlRpc for String {
    fn xmlrpc_type() -> Type {
        Type::String
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(conversion_error(&other, "String")),
        }
    }
}

impl ToXmlRpc for NaiveDateTime {
    #[inline]
    fn serialize<W: Write>(&self, ser: &mut Serializer<'_, W>) -> Result<()> {
        ser.serialize_date_time(self)
    }
}

impl FromXmlRpc for NaiveDateTime {
    fn xmlrpc_type() -> Type {
        Type::DateTime
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            other => Err(conversion_error(&other, "NaiveDateTime")),
        }
    }
}

impl ToXmlRpc for DateTime<Utc> {
    #[inline]
    fn serialize<W: Write>(&self, ser: &mut Serializer<'_, W>) -> Result<()> {
        ser.serialize_date_time(&self.naive_utc())
    }
}

impl FromXmlRpc for DateTime<Utc> {
    fn xmlrpc_type() -> Type {
        Type::DateTime
    }

    fn from_value(value: Value) -> Result<Self> {
        NaiveDateTime::from_value(value).map(|dt| Utc.from_utc_datetime(&dt))
    }
}

impl ToXmlRpc for ByteBuf {
    #[inline]
    fn serialize<W: Write>(&self, ser: &mut Serializer<'_, W>) -> Result<()> {
        ser.serialize_bytes(self)
    }
}

impl FromXmlRpc for ByteBuf {
    fn xmlrpc_type() -> Type {
        Type::Base64
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Base64(bytes) => Ok(ByteBuf(bytes)),
            other => Err(conversion_error(&other, "ByteBuf")),
        }
    }
}

impl ToXmlRpc for Struct {
    #[inline]
    fn serialize<W: Write>(&self, ser: &mut Serializer<'_, W>) -> Result<()> {
        ser.serialize_struct(self)
    }
}

impl FromXmlRpc for Struct {
    fn xmlrpc_type() -> Type {
        Type::Struct
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Struct(s) => Ok(s),
            other => Err(conversion_error(&other, "Struct")),
        }
    }
}

impl ToXmlRpc for Value {
    #[inline]
    fn serialize<W: Write>(&self, ser: &mut Serializer<'_, W>) -> Result<()> {
        ser.serialize_value(self)
    }

    #[inline]
    fn is_nil(&self) -> bool {
        Value::is_nil(self)
    }
}

impl FromXmlRpc for Value {
    fn xmlrpc_type() -> Type {
        Type::Any
    }

    #[inline]
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl ToXmlRpc for Array {
    #[inline]
    fn serialize<W: Write>(&self, ser: &mut Serializer<'_, W>) -> Result<()> {
        ser.serialize_seq(&self.items)
    }
}

impl FromXmlRpc for Array {
    fn xmlrpc_type() -> Type {
        Type::GenericArray
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(a) => Ok(a),
            other => Err(conversion_error(&other, "Array")),
        }
    }
}

/// `()` is the value of a method without return value.
impl ToXmlRpc for () {
    #[inline]
    fn serialize<W: Write>(&self, ser: &mut Serializer<'_, W>) -> Result<()> {
        ser.serialize_void()
    }
}

impl FromXmlRpc for () {
    fn xmlrpc_type() -> Type {
        Type::Void
    }

    fn from_value(_value: Value) -> Result<Self> {
        Ok(())
    }
}

impl<T: ToXmlRpc> ToXmlRpc for [T] {
    #[inline]
    fn serialize<W: Write>(&self, ser: &mut Serializer<'_, W>) -> Result<()> {
        ser.serialize_seq(self)
    }
}

impl<T: ToXmlRpc> ToXmlRpc for Vec<T> {
    #[inline]
    fn serialize<W: Write>(&self, ser: &mut Serializer<'_, W>) -> Result<()> {
        ser.serialize_seq(self)
    }
}

impl<T: FromXmlRpc> FromXmlRpc for Vec<T> {
    fn xmlrpc_type() -> Type {
        Type::Array(Box::new(T::xmlrpc_type()))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(a) => a.items.into_iter().map(T::from_value).collect(),
            other => Err(conversion_error(&other, &Self::xmlrpc_type().to_string())),
        }
    }
}

impl<T: ToXmlRpc, const R: usize> ToXmlRpc for MultiArray<T, R> {
    #[inline]
    fn serialize<W: Write>(&self, ser: &mut Serializer<'_, W>) -> Result<()> {
        ser.serialize_multi_dim(&self.lengths(), self.items())
    }
}

impl<T: FromXmlRpc, const R: usize> FromXmlRpc for MultiArray<T, R> {
    fn xmlrpc_type() -> Type {
        Type::MultiDimArray(Box::new(T::xmlrpc_type()), R)
    }

    fn from_value(value: Value) -> Result<Self> {
        let target = Self::xmlrpc_type().to_string();
        match value {
            Value::MultiDimArray(MultiDimArray { lengths, items, .. }) => {
                let lengths: [usize; R] = match lengths.try_into() {
                    Ok(lengths) => lengths,
                    Err(lengths) => {
                        let value = Value::MultiDimArray(MultiDimArray {
                            elem: Type::Any,
                            lengths,
                            items,
                        });
                        return Err(conversion_error(&value, &target));
                    }
                };
                let items = items
                    .into_iter()
                    .map(T::from_value)
                    .collect::<Result<Vec<_>>>()?;
                MultiArray::new(lengths, items).ok_or_else(|| {
                    Error::TypeMismatch(format!(
                        "items of multi-dimensional array do not match lengths {:?}",
                        lengths
                    ))
                })
            }
            other => Err(conversion_error(&other, &target)),
        }
    }
}

impl<T: ToXmlRpc> ToXmlRpc for Option<T> {
    #[inline]
    fn serialize<W: Write>(&self, ser: &mut Serializer<'_, W>) -> Result<()> {
        match self {
            Some(value) => value.serialize(ser),
            None => ser.serialize_nil(),
        }
    }

    #[inline]
    fn is_nil(&self) -> bool {
        self.is_none()
    }
}

impl<T: FromXmlRpc> FromXmlRpc for Option<T> {
    fn xmlrpc_type() -> Type {
        Type::Nullable(Box::new(T::xmlrpc_type()))
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Nil => Ok(None),
            value => T::from_value(value).map(Some),
        }
    }
}

impl<T: ToXmlRpc + ?Sized> ToXmlRpc for &T {
    #[inline]
    fn serialize<W: Write>(&self, ser: &mut Serializer<'_, W>) -> Result<()> {
        (**self).serialize(ser)
    }

    #[inline]
    fn is_nil(&self) -> bool {
        (**self).is_nil()
    }
}

impl<T: ToXmlRpc + ?Sized> ToXmlRpc for Box<T> {
    #[inline]
    fn serialize<W: Write>(&self, ser: &mut Serializer<'_, W>) -> Result<()> {
        (**self).serialize(ser)
    }

    #[inline]
    fn is_nil(&self) -> bool {
        (**self).is_nil()
    }
}

impl<T: FromXmlRpc> FromXmlRpc for Box<T> {
    fn xmlrpc_type() -> Type {
        T::xmlrpc_type()
    }

    fn from_value(value: Value) -> Result<Self> {
        T::from_value(value).map(Box::new)
    }
}

/// Values shared through `Rc` are not tracked themselves: the struct, record
/// or array inside is.
impl<T: ToXmlRpc + ?Sized> ToXmlRpc for Rc<T> {
    #[inline]
    fn serialize<W: Write>(&self, ser: &mut Serializer<'_, W>) -> Result<()> {
        (**self).serialize(ser)
    }

    #[inline]
    fn is_nil(&self) -> bool {
        (**self).is_nil()
    }
}

impl<T: FromXmlRpc> FromXmlRpc for Rc<T> {
    fn xmlrpc_type() -> Type {
        T::xmlrpc_type()
    }

    fn from_value(value: Value) -> Result<Self> {
        T::from_value(value).map(Rc::new)
    }
}

impl<T: ToXmlRpc> ToXmlRpc for RefCell<T> {
    fn serialize<W: Write>(&self, ser: &mut Serializer<'_, W>) -> Result<()> {
        match self.try_borrow() {
            Ok(value) => value.serialize(ser),
            Err(_) => Err(Error::RecursiveStructure(format!(
                "{} contains value which is mutably borrowed {}",
                ser.stack().kind(),
                ser.stack()
            ))),
        }
    }

    fn is_nil(&self) -> bool {
        self.try_borrow().map(|value| value.is_nil()).unwrap_or(false)
    }
}

impl<T: FromXmlRpc> FromXmlRpc for RefCell<T> {
    fn xmlrpc_type() -> Type {
        T::xmlrpc_type()
    }

    fn from_value(value: Value) -> Result<Self> {
        T::from_value(value).map(RefCell::new)
    }
}

/// Converts an enum value mapped onto `ty` into its number.
#[doc(hidden)]
pub fn enum_number(value: Value, ty: &EnumType) -> Result<i64> {
    match value {
        Value::Enum(e) if e.ty == *ty => Ok(e.number),
        other => Err(conversion_error(&other, ty.name)),
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// The parameters of a method call.
///
/// Implemented for tuples of up to eight [`ToXmlRpc`] values, for slices and
/// for vectors.
///
/// ```
/// use quick_xmlrpc::Params;
///
/// assert_eq!((1, "two", 3.0).len(), 3);
/// assert_eq!(().len(), 0);
/// ```
pub trait Params {
    /// Number of parameters.
    fn len(&self) -> usize;

    /// Returns `true` if there are no parameters.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes every parameter as a `<param>` element.
    fn serialize_params<W: Write>(&self, ser: &mut Serializer<'_, W>) -> Result<()>;
}

impl<T: ToXmlRpc> Params for [T] {
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn serialize_params<W: Write>(&self, ser: &mut Serializer<'_, W>) -> Result<()> {
        for (i, param) in self.iter().enumerate() {
            ser.serialize_param(i + 1, param)?;
        }
        Ok(())
    }
}

impl<T: ToXmlRpc> Params for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn serialize_params<W: Write>(&self, ser: &mut Serializer<'_, W>) -> Result<()> {
        self.as_slice().serialize_params(ser)
    }
}

impl<P: Params + ?Sized> Params for &P {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn serialize_params<W: Write>(&self, ser: &mut Serializer<'_, W>) -> Result<()> {
        (**self).serialize_params(ser)
    }
}

impl Params for () {
    fn len(&self) -> usize {
        0
    }

    fn serialize_params<W: Write>(&self, _ser: &mut Serializer<'_, W>) -> Result<()> {
        Ok(())
    }
}

macro_rules! tuple_params {
    ($count:expr => $($name:ident : $index:tt),+) => {
        impl<$($name: ToXmlRpc),+> Params for ($($name,)+) {
            fn len(&self) -> usize {
                $count
            }

            fn serialize_params<W: Write>(&self, ser: &mut Serializer<'_, W>) -> Result<()> {
                $(ser.serialize_param($index + 1, &self.$index)?;)+
                Ok(())
            }
        }
    };
}

tuple_params!(1 => A: 0);
tuple_params!(2 => A: 0, B: 1);
tuple_params!(3 => A: 0, B: 1, C: 2);
tuple_params!(4 => A: 0, B: 1, C: 2, D: 3);
tuple_params!(5 => A: 0, B: 1, C: 2, D: 3, E: 4);
tuple_params!(6 => A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
tuple_params!(7 => A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
tuple_params!(8 => A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormatSettings;
    use crate::writer::Writer;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn to_string<T: ToXmlRpc + ?Sized>(value: &T) -> String {
        let settings = FormatSettings::default().use_indentation(false);
        let mut writer = Writer::with_settings(Vec::new(), &settings);
        let mut ser = Serializer::new(&mut writer, &settings);
        value.serialize(&mut ser).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn option() {
        assert_eq!(to_string(&Some(1)), "<value><i4>1</i4></value>");
        assert_eq!(to_string(&None::<i32>), "<value><nil /></value>");
        assert!(None::<i32>.is_nil());
        assert!(Rc::new(None::<bool>).is_nil());

        assert_eq!(Option::<i32>::from_value(Value::Nil).unwrap(), None);
        assert_eq!(Option::<i32>::from_value(Value::Int(3)).unwrap(), Some(3));
        assert_eq!(
            Option::<i32>::xmlrpc_type(),
            Type::Nullable(Box::new(Type::Int))
        );
    }

    #[test]
    fn widening() {
        assert_eq!(i64::from_value(Value::Int(-5)).unwrap(), -5);
        match i32::from_value(Value::Long(5)) {
            Err(Error::TypeMismatch(e)) => {
                assert_eq!(e, "value of type i64 cannot be converted to i32")
            }
            x => panic!("Expected Err(TypeMismatch(..)), but got {:?}", x),
        }
    }

    #[test]
    fn date_time() {
        let naive = NaiveDate::from_ymd_opt(1998, 7, 17)
            .unwrap()
            .and_hms_opt(14, 8, 55)
            .unwrap();
        let utc = DateTime::<Utc>::from_value(Value::DateTime(naive)).unwrap();
        assert_eq!(utc.naive_utc(), naive);
        assert_eq!(
            to_string(&utc),
            "<value><dateTime.iso8601>19980717T14:08:55</dateTime.iso8601></value>"
        );
    }

    #[test]
    fn vectors() {
        assert_eq!(
            Vec::<String>::xmlrpc_type(),
            Type::Array(Box::new(Type::String))
        );
        let value = Value::Array(Array::new(vec![Value::Int(1), Value::Int(2)]));
        assert_eq!(Vec::<i32>::from_value(value).unwrap(), vec![1, 2]);
        assert_eq!(
            to_string(&[true, false][..]),
            "<value><array><data>\
             <value><boolean>1</boolean></value>\
             <value><boolean>0</boolean></value>\
             </data></array></value>"
        );
    }

    #[test]
    fn multi_array() {
        let value = Value::MultiDimArray(MultiDimArray {
            elem: Type::Int,
            lengths: vec![2, 1],
            items: vec![Value::Int(1), Value::Int(2)],
        });
        let array = MultiArray::<i32, 2>::from_value(value.clone()).unwrap();
        assert_eq!(array.get([1, 0]), Some(&2));
        assert!(MultiArray::<i32, 3>::from_value(value).is_err());
    }

    #[test]
    fn shared_cells() {
        let shared = Rc::new(RefCell::new(vec![1]));
        assert_eq!(
            to_string(&vec![shared.clone(), shared.clone()]),
            "<value><array><data>\
             <value><array><data><value><i4>1</i4></value></data></array></value>\
             <value><array><data><value><i4>1</i4></value></data></array></value>\
             </data></array></value>"
        );
    }

    #[test]
    fn params() {
        assert_eq!(Params::len(&(1, "a")), 2);
        assert_eq!(Params::len(&vec![1, 2, 3]), 3);
        assert!(Params::is_empty(&()));
        assert!(Params::is_empty(&Vec::<i32>::new()));
    }
}
