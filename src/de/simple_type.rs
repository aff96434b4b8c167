//! Mapping of scalar values.

use super::ValueMapper;
use crate::config::NonStandard;
use crate::datetime;
use crate::errors::{Error, Result};
use crate::events::{Node, ScalarKind};
use crate::types::Type;
use crate::value::Value;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

impl<I> ValueMapper<I>
where
    I: Iterator<Item = Result<Node>>,
{
    /// Maps the text of a scalar of the given kind onto `target`, which is
    /// not nullable.
    pub(super) fn map_scalar(&mut self, kind: ScalarKind, text: String, target: &Type) -> Result<Value> {
        if let Type::Enum(e) = target {
            return self.map_enum(kind, &text, e);
        }
        if *target != Type::Any && target.scalar_kind() != Some(kind) {
            return Err(self.mismatch(kind.as_str(), target));
        }

        let label = kind.as_str();
        match kind {
            ScalarKind::Int => self.on_stack(label, |m| match text.trim().parse() {
                Ok(n) => Ok(Value::Int(n)),
                Err(_) => Err(m.invalid("int")),
            }),
            ScalarKind::Long => self.on_stack(label, |m| match text.trim().parse() {
                Ok(n) => Ok(Value::Long(n)),
                Err(_) => Err(m.invalid("i8")),
            }),
            ScalarKind::Boolean => self.on_stack(label, |m| match text.as_str() {
                "1" => Ok(Value::Boolean(true)),
                "0" => Ok(Value::Boolean(false)),
                _ => Err(m.invalid("boolean")),
            }),
            ScalarKind::Double => self.on_stack(label, |m| match text.trim().parse::<f64>() {
                // `inf`, `NaN` and overflowing literals cannot be written back
                Ok(n) if n.is_finite() => Ok(Value::Double(n)),
                _ => Err(m.invalid("double")),
            }),
            ScalarKind::String => self.on_stack(label, |_| Ok(Value::String(text))),
            ScalarKind::DateTime => self.on_stack(label, |m| match m.parse_date_time(&text) {
                Some(dt) => Ok(Value::DateTime(dt)),
                None => Err(m.invalid("dateTime")),
            }),
            ScalarKind::Base64 => self.on_stack(label, |m| match decode_base64(&text) {
                Some(bytes) => Ok(Value::Base64(bytes)),
                None => Err(m.invalid("base64")),
            }),
            // handled by `map_value`
            ScalarKind::Nil => Ok(Value::Nil),
        }
    }

    fn parse_date_time(&self, text: &str) -> Option<chrono::NaiveDateTime> {
        let flags = self.non_standard;
        if text.is_empty() && flags.contains(NonStandard::MAP_EMPTY_DATE_TIME_TO_MIN_VALUE) {
            return Some(datetime::min_value());
        }
        let lenient = flags.contains(NonStandard::ALLOW_NON_STANDARD_DATE_TIME);
        if let Some(dt) = datetime::parse(text, lenient) {
            return Some(dt);
        }
        if flags.contains(NonStandard::MAP_ZEROS_DATE_TIME_TO_MIN_VALUE)
            && datetime::is_zero_date(text)
        {
            return Some(datetime::min_value());
        }
        None
    }

    fn invalid(&self, what: &str) -> Error {
        Error::InvalidScalarValue(format!(
            "{} contains invalid {} value {}",
            self.stack.kind(),
            what,
            self.stack
        ))
    }
}

/// Decodes standard base64, ignoring whitespace so that line-wrapped payloads
/// are accepted.
fn decode_base64(text: &str) -> Option<Vec<u8>> {
    if text.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD.decode(compact).ok()
    } else {
        STANDARD.decode(text).ok()
    }
}
