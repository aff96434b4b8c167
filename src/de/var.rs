//! Mapping of integers and strings onto enums.

use super::ValueMapper;
use crate::errors::{Error, Result};
use crate::events::{Node, ScalarKind};
use crate::types::{EnumType, Type};
use crate::value::{EnumValue, Value};

impl<I> ValueMapper<I>
where
    I: Iterator<Item = Result<Node>>,
{
    /// Maps a scalar onto enum `ty`.
    ///
    /// Strings are matched against variant names ignoring case. Integers must
    /// be of the kind of the enum representation, `<i4>` for types up to 32
    /// bits and `<i8>` for `u32` and `i64`, and must be the value of a variant.
    pub(super) fn map_enum(&mut self, kind: ScalarKind, text: &str, ty: &EnumType) -> Result<Value> {
        let wire = match ty.repr.wire_kind() {
            Some(wire) => wire,
            None => {
                return Err(Error::InvalidEnumValue(format!(
                    "{} contains {} which cannot be mapped to enum {} {}",
                    self.stack.kind(),
                    kind,
                    ty.name,
                    self.stack
                )))
            }
        };
        match kind {
            ScalarKind::String => self.on_stack("string", |m| match ty.find_name(text) {
                Some((name, number)) => Ok(enum_value(ty, name, number)),
                None => Err(m.invalid_enum("string")),
            }),
            kind if kind == wire => {
                let label = if kind == ScalarKind::Int { "int" } else { "i8" };
                self.on_stack(label, |m| {
                    let number = match text.trim().parse::<i64>() {
                        Ok(n) if ty.repr.fits(n) => n,
                        _ => return Err(m.invalid_enum(label)),
                    };
                    match ty.find_number(number) {
                        Some((name, number)) => Ok(enum_value(ty, name, number)),
                        None => Err(Error::InvalidEnumValue(format!(
                            "{} contains {} mapped to undefined enum value {}",
                            m.stack.kind(),
                            label,
                            m.stack
                        ))),
                    }
                })
            }
            kind => Err(self.mismatch(kind.as_str(), &Type::Enum(*ty))),
        }
    }

    fn invalid_enum(&self, wire: &str) -> Error {
        Error::InvalidEnumValue(format!(
            "{} contains invalid or out of range {} value mapped to enum {}",
            self.stack.kind(),
            wire,
            self.stack
        ))
    }
}

fn enum_value(ty: &EnumType, name: &'static str, number: i64) -> Value {
    Value::Enum(EnumValue {
        ty: *ty,
        name,
        number,
    })
}
