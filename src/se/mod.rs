//! Serialization of native values to XML-RPC.
//!
//! The [`Serializer`] writes one `<value>` element per call through a
//! [`Writer`]. Native types describe how they are written by implementing
//! [`ToXmlRpc`], which calls back into the serializer:
//!
//! ```
//! use quick_xmlrpc::se::Serializer;
//! use quick_xmlrpc::{FormatSettings, ToXmlRpc, Writer};
//!
//! let settings = FormatSettings::default().use_indentation(false);
//! let mut writer = Writer::with_settings(Vec::new(), &settings);
//! let mut ser = Serializer::new(&mut writer, &settings);
//! vec![1, 2].serialize(&mut ser).unwrap();
//!
//! assert_eq!(
//!     String::from_utf8(writer.into_inner()).unwrap(),
//!     "<value><array><data><value><i4>1</i4></value><value><i4>2</i4></value></data></array></value>"
//! );
//! ```
//!
//! Structs, arrays and records are tracked by address while their content is
//! written: meeting the same value again inside itself fails with
//! [`Error::RecursiveStructure`] instead of looping forever.
//!
//! [`ToXmlRpc`]: crate::ToXmlRpc

mod var;

use crate::config::FormatSettings;
use crate::convert::ToXmlRpc;
use crate::datetime;
use crate::errors::{Error, Result};
use crate::mapping::MappingStack;
use crate::types::{EnumMapping, EnumType, MappingActions, Record};
use crate::value::{RecordValue, Struct, Value};
use crate::writer::Writer;
use crate::events::ScalarKind;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDateTime;
use std::any::type_name;
use std::io::Write;

/// Writes native values as XML-RPC `<value>` elements.
pub struct Serializer<'w, W: Write> {
    writer: &'w mut Writer<W>,
    int_tag: &'static str,
    use_string_tag: bool,
    /// Policies in effect for the value being written
    actions: MappingActions,
    /// Address and type name of every struct, record and array which content
    /// is being written
    ancestors: Vec<(usize, &'static str)>,
    stack: MappingStack,
}

impl<'w, W: Write> Serializer<'w, W> {
    /// Creates a serializer that writes into `writer`. Only the scalar related
    /// settings are used here, the shape of the output is decided by the
    /// writer itself.
    pub fn new(writer: &'w mut Writer<W>, settings: &FormatSettings) -> Self {
        Self {
            writer,
            int_tag: settings.int_tag(),
            use_string_tag: settings.use_string_tag,
            actions: MappingActions::default(),
            ancestors: Vec::new(),
            stack: MappingStack::new("value"),
        }
    }

    /// Replaces the default null and enum mapping policies.
    pub fn with_actions(mut self, actions: MappingActions) -> Self {
        self.actions = actions;
        self
    }

    /// Policies in effect for the value being written.
    #[inline]
    pub fn actions(&self) -> MappingActions {
        self.actions
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

    /// The underlying writer.
    #[inline]
    pub fn writer(&mut self) -> &mut Writer<W> {
        self.writer
    }

    fn scalar(&mut self, tag: &'static str, text: &str) -> Result<()> {
        self.writer.start("value")?;
        self.writer.element(tag, text)?;
        self.writer.end()
    }

    /// Writes an `<i4>`, or an `<int>` when requested by the settings.
    pub fn serialize_i32(&mut self, value: i32) -> Result<()> {
        let tag = self.int_tag;
        self.scalar(tag, &value.to_string())
    }

    /// Writes an `<i8>`.
    pub fn serialize_i64(&mut self, value: i64) -> Result<()> {
        self.scalar("i8", &value.to_string())
    }

    /// Writes a `<boolean>` as `1` or `0`.
    pub fn serialize_bool(&mut self, value: bool) -> Result<()> {
        self.scalar("boolean", if value { "1" } else { "0" })
    }

    /// Writes a `<double>` in the shortest form that parses back to the same
    /// number. Infinities and NaN have no XML-RPC representation.
    pub fn serialize_f64(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::InvalidScalarValue(format!(
                "{} contains double value {} which cannot be serialized {}",
                self.stack.kind(),
                value,
                self.stack
            )));
        }
        self.scalar("double", &value.to_string())
    }

    /// Writes a `<string>`, or bare text when the settings ask to omit the
    /// string tag.
    pub fn serialize_str(&mut self, value: &str) -> Result<()> {
        if self.use_string_tag {
            return self.scalar("string", value);
        }
        self.writer.start("value")?;
        self.writer.text(value)?;
        self.writer.end()
    }

    /// Writes a `<dateTime.iso8601>` in the canonical compact form.
    pub fn serialize_date_time(&mut self, value: &NaiveDateTime) -> Result<()> {
        self.scalar("dateTime.iso8601", &datetime::format(value))
    }

    /// Writes a `<base64>` with the standard alphabet and no line breaks.
    pub fn serialize_bytes(&mut self, value: &[u8]) -> Result<()> {
        self.scalar("base64", &STANDARD.encode(value))
    }

    /// Writes `<value><nil /></value>`.
    pub fn serialize_nil(&mut self) -> Result<()> {
        self.writer.start("value")?;
        self.writer.empty("nil")?;
        self.writer.end()
    }

    /// Writes the value of a method without return value, an empty
    /// `<string>`. The string tag is written regardless of the settings, so
    /// that the value is never an empty `<value>` element.
    pub fn serialize_void(&mut self) -> Result<()> {
        self.scalar("string", "")
    }

    /// Writes an `<array>` of `items`.
    pub fn serialize_seq<T: ToXmlRpc>(&mut self, items: &[T]) -> Result<()> {
        // empty slices all share the same dangling address and cannot contain
        // themselves anyway
        if items.is_empty() {
            self.open_array()?;
            return self.close_array();
        }
        self.guarded(items.as_ptr() as usize, type_name::<[T]>(), |ser| {
            ser.open_array()?;
            for (i, item) in items.iter().enumerate() {
                ser.on_stack(format!("element {}", i), |ser| item.serialize(ser))?;
            }
            ser.close_array()
        })
    }

    /// Writes a rectangular array as nested `<array>`s, one per dimension.
    ///
    /// `items` are in row-major order and their number must be the product of
    /// `lengths`.
    pub fn serialize_multi_dim<T: ToXmlRpc>(&mut self, lengths: &[usize], items: &[T]) -> Result<()> {
        let count: usize = lengths.iter().product();
        if count != items.len() {
            return Err(Error::InvalidProtocol(format!(
                "{} contains multi-dimensional array with lengths {:?} and {} items {}",
                self.stack.kind(),
                lengths,
                items.len(),
                self.stack
            )));
        }
        if items.is_empty() {
            return self.write_dims(lengths, items);
        }
        self.guarded(items.as_ptr() as usize, type_name::<[T]>(), |ser| {
            ser.write_dims(lengths, items)
        })
    }

    fn write_dims<T: ToXmlRpc>(&mut self, lengths: &[usize], items: &[T]) -> Result<()> {
        let (len, inner) = match lengths.split_first() {
            Some(split) => split,
            None => {
                return match items.first() {
                    Some(item) => item.serialize(self),
                    None => Ok(()),
                }
            }
        };
        let chunk: usize = inner.iter().product();
        self.open_array()?;
        for i in 0..*len {
            let part = items.get(i * chunk..(i + 1) * chunk).unwrap_or(&[]);
            self.on_stack(format!("element {}", i), |ser| ser.write_dims(inner, part))?;
        }
        self.close_array()
    }

    /// Writes a generic struct, members in insertion order.
    pub fn serialize_struct(&mut self, value: &Struct) -> Result<()> {
        self.guarded(value as *const Struct as usize, type_name::<Struct>(), |ser| {
            ser.open_struct()?;
            for (name, member) in value {
                ser.write_member(name, |ser| {
                    ser.on_stack(format!("member {}", name), |ser| member.serialize(ser))
                })?;
            }
            ser.close_struct()
        })
    }

    /// Writes a record as a struct, members in declaration order.
    ///
    /// Mapping policies of the record type and of its members override the
    /// current ones for the members and everything nested in them.
    pub fn serialize_record<R: Record>(&mut self, record: &R) -> Result<()> {
        self.guarded(record as *const R as usize, type_name::<R>(), |ser| {
            let desc = R::describe();
            let label = format!("struct mapped to type {}", desc.name);
            ser.with_record_actions(&desc, |ser, base| {
                ser.open_struct()?;
                ser.on_stack(label, |ser| {
                    record.visit_members(&mut var::MemberWriter::new(ser, &desc, base))
                })?;
                ser.close_struct()
            })
        })
    }

    /// Writes a mapped record value. Members absent from the value are written
    /// as members without value, so the null mapping policy applies to them.
    pub fn serialize_record_value(&mut self, record: &RecordValue) -> Result<()> {
        self.guarded(
            record as *const RecordValue as usize,
            type_name::<RecordValue>(),
            |ser| {
                let desc = record.ty.describe();
                let label = format!("struct mapped to type {}", desc.name);
                ser.with_record_actions(&desc, |ser, base| {
                    ser.open_struct()?;
                    ser.on_stack(label, |ser| {
                        let nil = Value::Nil;
                        for member in &desc.members {
                            let value = record.get(member.name).unwrap_or(&nil);
                            ser.serialize_member(base, member, value)?;
                        }
                        Ok(())
                    })?;
                    ser.close_struct()
                })
            },
        )
    }

    /// Writes a variant of enum `ty` as its name or its number, as the enum
    /// mapping policy says.
    pub fn serialize_enum(&mut self, ty: &EnumType, number: i64) -> Result<()> {
        match self.actions.enum_mapping {
            EnumMapping::String => match ty.find_number(number) {
                Some((name, _)) => self.serialize_str(name),
                None => Err(self.invalid_enum(ty, number)),
            },
            EnumMapping::Number => match ty.repr.wire_kind() {
                Some(ScalarKind::Int) => match i32::try_from(number) {
                    Ok(n) => self.serialize_i32(n),
                    Err(_) => Err(self.invalid_enum(ty, number)),
                },
                Some(_) => self.serialize_i64(number),
                None => Err(self.invalid_enum(ty, number)),
            },
        }
    }

    fn invalid_enum(&self, ty: &EnumType, number: i64) -> Error {
        Error::InvalidEnumValue(format!(
            "{} contains value {} of enum {} which cannot be serialized {}",
            self.stack.kind(),
            number,
            ty.name,
            self.stack
        ))
    }

    /// Writes any dynamic value.
    pub fn serialize_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Int(n) => self.serialize_i32(*n),
            Value::Long(n) => self.serialize_i64(*n),
            Value::Boolean(b) => self.serialize_bool(*b),
            Value::String(s) => self.serialize_str(s),
            Value::Double(d) => self.serialize_f64(*d),
            Value::DateTime(dt) => self.serialize_date_time(dt),
            Value::Base64(bytes) => self.serialize_bytes(bytes),
            Value::Struct(s) => self.serialize_struct(s),
            Value::Record(r) => self.serialize_record_value(r),
            Value::Array(a) => self.serialize_seq(&a.items),
            Value::MultiDimArray(a) => self.serialize_multi_dim(&a.lengths, &a.items),
            Value::Enum(e) => self.serialize_enum(&e.ty, e.number),
            Value::Nil => self.serialize_nil(),
        }
    }

    /// Writes `<param>` with the value of parameter `index`, counted from 1.
    pub fn serialize_param<T: ToXmlRpc + ?Sized>(&mut self, index: usize, value: &T) -> Result<()> {
        self.writer.start("param")?;
        self.on_stack(format!("parameter {}", index), |ser| value.serialize(ser))?;
        self.writer.end()
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

    /// Runs `f` with the value at `address` of type `name` marked as being
    /// written. Fails if it is already marked.
    pub(crate) fn guarded<F>(&mut self, address: usize, name: &'static str, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        if self.ancestors.contains(&(address, name)) {
            return Err(Error::RecursiveStructure(format!(
                "{} contains value of type {} which contains itself {}",
                self.stack.kind(),
                name,
                self.stack
            )));
        }
        self.ancestors.push((address, name));
        let result = f(self);
        self.ancestors.pop();
        result
    }

    fn open_array(&mut self) -> Result<()> {
        self.writer.start("value")?;
        self.writer.start("array")?;
        self.writer.start("data")
    }

    fn close_array(&mut self) -> Result<()> {
        self.writer.end()?;
        self.writer.end()?;
        self.writer.end()
    }

    fn open_struct(&mut self) -> Result<()> {
        self.writer.start("value")?;
        self.writer.start("struct")
    }

    fn close_struct(&mut self) -> Result<()> {
        self.writer.end()?;
        self.writer.end()
    }

    /// Writes `<member><name>name</name>...</member>`, where `f` writes the
    /// value.
    fn write_member<F>(&mut self, name: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.writer.start("member")?;
        self.writer.element("name", name)?;
        f(self)?;
        self.writer.end()
    }
}
