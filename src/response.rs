//! Reading and writing of `<methodResponse>` documents.

use crate::config::{FormatSettings, NonStandard};
use crate::convert::{FromXmlRpc, ToXmlRpc};
use crate::de::ValueMapper;
use crate::errors::{Error, Result};
use crate::events::{Node, NodeKind};
use crate::reader::parse_response;
use crate::se::Serializer;
use crate::service::MethodSignature;
use crate::types::{MappingAction, MappingActions, NullMappingAction, Type};
use crate::value::{Struct, Value};
use crate::writer::Writer;
use std::fmt;
use std::io::{BufRead, Write};

#[cfg(feature = "serde-types")]
use serde::{Deserialize, Serialize};

/// A fault returned by a server instead of a value.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(Deserialize, Serialize))]
pub struct Fault {
    /// Value of the `faultCode` member
    pub code: i32,
    /// Value of the `faultString` member
    pub string: String,
}

impl Fault {
    /// Creates a fault.
    pub fn new<S: Into<String>>(code: i32, string: S) -> Self {
        Self {
            code,
            string: string.into(),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Server returned a fault exception: [{}] {}",
            self.code, self.string
        )
    }
}

/// Writes method responses.
#[derive(Clone, Debug, Default)]
pub struct ResponseSerializer {
    settings: FormatSettings,
    actions: MappingActions,
}

impl ResponseSerializer {
    /// Creates a serializer that formats documents according to `settings`.
    pub fn new(settings: FormatSettings) -> Self {
        Self {
            settings,
            actions: MappingActions::default(),
        }
    }

    /// Sets the null and enum mapping policies used for the returned value.
    pub fn with_actions(mut self, actions: MappingActions) -> Self {
        self.actions = actions;
        self
    }

    fn start<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        if !self.settings.omit_xml_declaration {
            writer.write_declaration()?;
        }
        writer.start("methodResponse")
    }

    /// Writes a response that returns `value`. A `()` value is written as an
    /// empty string.
    ///
    /// ```
    /// use quick_xmlrpc::{FormatSettings, ResponseSerializer};
    ///
    /// let ser = ResponseSerializer::new(FormatSettings::default().use_indentation(false));
    /// let mut xml = Vec::new();
    /// ser.serialize(&mut xml, "South Dakota").unwrap();
    ///
    /// assert_eq!(
    ///     String::from_utf8(xml).unwrap(),
    ///     "<?xml version=\"1.0\"?><methodResponse><params><param>\
    ///      <value><string>South Dakota</string></value>\
    ///      </param></params></methodResponse>"
    /// );
    /// ```
    pub fn serialize<W, T>(&self, writer: W, value: &T) -> Result<()>
    where
        W: Write,
        T: ToXmlRpc + ?Sized,
    {
        debug!("serializing response");
        let mut writer = Writer::with_settings(writer, &self.settings);
        self.start(&mut writer)?;
        writer.start("params")?;
        let mut ser = Serializer::new(&mut writer, &self.settings).with_actions(self.actions);
        ser.stack_mut().set_kind("response");
        ser.serialize_param(1, value)?;
        writer.end()?;
        writer.end()?;
        writer.flush()
    }

    /// Writes a fault response.
    ///
    /// ```
    /// use quick_xmlrpc::{Fault, FormatSettings, ResponseSerializer};
    ///
    /// let ser = ResponseSerializer::new(FormatSettings::default().use_indentation(false));
    /// let mut xml = Vec::new();
    /// ser.serialize_fault(&mut xml, &Fault::new(4, "Too many parameters.")).unwrap();
    ///
    /// assert_eq!(
    ///     String::from_utf8(xml).unwrap(),
    ///     "<?xml version=\"1.0\"?><methodResponse><fault><value><struct>\
    ///      <member><name>faultCode</name><value><i4>4</i4></value></member>\
    ///      <member><name>faultString</name><value><string>Too many parameters.</string></value></member>\
    ///      </struct></value></fault></methodResponse>"
    /// );
    /// ```
    pub fn serialize_fault<W: Write>(&self, writer: W, fault: &Fault) -> Result<()> {
        debug!("serializing fault response {}", fault.code);
        let mut writer = Writer::with_settings(writer, &self.settings);
        self.start(&mut writer)?;
        writer.start("fault")?;

        let mut value = Struct::new();
        value.insert("faultCode", Value::Int(fault.code));
        value.insert("faultString", Value::String(fault.string.clone()));
        let actions = self.actions.merge(Some(NullMappingAction::Error), None);
        let mut ser = Serializer::new(&mut writer, &self.settings).with_actions(actions);
        ser.stack_mut().set_kind("fault response");
        ser.serialize_struct(&value)?;

        writer.end()?;
        writer.end()?;
        writer.flush()
    }
}

/// Reads method responses.
///
/// A fault response is returned as [`Error::Fault`].
///
/// ```
/// use quick_xmlrpc::{Error, NonStandard, ResponseDeserializer};
///
/// let xml = "<methodResponse><fault><value><struct>\
///            <member><name>faultCode</name><value><int>4</int></value></member>\
///            <member><name>faultString</name><value><string>Too many parameters.</string></value></member>\
///            </struct></value></fault></methodResponse>";
///
/// match ResponseDeserializer::new(NonStandard::NONE).deserialize_into::<String, _>(xml.as_bytes()) {
///     Err(Error::Fault(fault)) => {
///         assert_eq!(fault.code, 4);
///         assert_eq!(fault.string, "Too many parameters.");
///     }
///     x => panic!("{:?}", x),
/// }
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ResponseDeserializer {
    non_standard: NonStandard,
}

impl ResponseDeserializer {
    /// Creates a deserializer with the given conformance flags.
    pub fn new(non_standard: NonStandard) -> Self {
        Self { non_standard }
    }

    /// Reads one `<methodResponse>` document and maps the returned value onto
    /// `ty`. A response without value, or a [`Type::Void`] target, gives
    /// [`Value::Nil`].
    pub fn deserialize<R: BufRead>(&self, mut reader: R, ty: &Type) -> Result<Value> {
        let allow_whitespace = self
            .non_standard
            .contains(NonStandard::ALLOW_INVALID_HTTP_CONTENT);
        if !has_content(&mut reader, allow_whitespace)? {
            return Err(Error::ill_formed(
                "Response from server does not contain valid XML.",
            ));
        }

        let mut mapper = ValueMapper::new(parse_response(reader), "response", self.non_standard);
        let marker = match mapper.next_node()? {
            Some(node) => node.kind,
            None => {
                return Err(Error::InvalidProtocol(
                    "Response XML not valid XML-RPC - missing params or fault element.".into(),
                ))
            }
        };
        match marker {
            NodeKind::ResponseMarker => {
                debug!("response with value");
                if mapper.peek()?.is_none() {
                    return Ok(Value::Nil);
                }
                if *ty == Type::Void {
                    mapper.skip_value()?;
                    return Ok(Value::Nil);
                }
                mapper.map_value(ty, MappingAction::Error)
            }
            NodeKind::FaultMarker => {
                let fault = map_fault(&mut mapper)?;
                debug!("fault response {}", fault);
                Err(Error::Fault(fault))
            }
            kind => Err(Error::InvalidProtocol(format!(
                "Response XML not valid XML-RPC - {:?} where params or fault expected.",
                kind
            ))),
        }
    }

    /// Reads the response to a call of `method` and maps the returned value
    /// onto the declared return type of the method.
    ///
    /// ```
    /// use quick_xmlrpc::{MethodSignature, NonStandard, ResponseDeserializer, Value};
    ///
    /// let method = MethodSignature::new("examples.getStateName").param::<i32>().returns::<String>();
    /// let xml = "<methodResponse><params><param>\
    ///            <value>South Dakota</value>\
    ///            </param></params></methodResponse>";
    ///
    /// let value = ResponseDeserializer::new(NonStandard::NONE)
    ///     .deserialize_for(xml.as_bytes(), &method)
    ///     .unwrap();
    /// assert_eq!(value, Value::String("South Dakota".into()));
    /// ```
    pub fn deserialize_for<R: BufRead>(&self, reader: R, method: &MethodSignature) -> Result<Value> {
        debug!("reading response of {}", method.name);
        self.deserialize(reader, &method.returns)
    }

    /// Reads one `<methodResponse>` document and converts the returned value
    /// to `T`.
    pub fn deserialize_into<T: FromXmlRpc, R: BufRead>(&self, reader: R) -> Result<T> {
        let value = self.deserialize(reader, &T::xmlrpc_type())?;
        T::from_value(value)
    }
}

/// Returns `false` if the input is empty. With `skip_whitespace`, leading
/// whitespace that some HTTP servers put before the XML declaration is
/// consumed first.
fn has_content<R: BufRead>(reader: &mut R, skip_whitespace: bool) -> Result<bool> {
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(false);
        }
        if !skip_whitespace {
            return Ok(true);
        }
        let len = buf.len();
        let skipped = buf
            .iter()
            .take_while(|b| matches!(b, b'\r' | b'\n' | b' ' | b'\t'))
            .count();
        reader.consume(skipped);
        if skipped < len {
            return Ok(true);
        }
    }
}

/// Maps the value of a `<fault>` element.
fn map_fault<I>(mapper: &mut ValueMapper<I>) -> Result<Fault>
where
    I: Iterator<Item = Result<Node>>,
{
    mapper.stack_mut().set_kind("fault response");
    let strings = mapper
        .non_standard()
        .contains(NonStandard::ALLOW_STRING_FAULT_CODE);

    let value = match mapper.map_value(&Type::Struct, MappingAction::Error)? {
        Value::Struct(value) => value,
        _ => return Err(invalid_fault(mapper, "fault value is not a struct")),
    };

    let mut code = None;
    let mut string = None;
    for (name, member) in value {
        if name.eq_ignore_ascii_case("faultCode") {
            code = Some(match member {
                Value::Int(code) => code,
                Value::String(text) if strings => match text.trim().parse() {
                    Ok(code) => code,
                    Err(_) => return Err(invalid_fault(mapper, "faultCode is not a number")),
                },
                _ => return Err(invalid_fault(mapper, "faultCode is not an integer")),
            });
        } else if name.eq_ignore_ascii_case("faultString") {
            string = Some(match member {
                Value::String(text) => text,
                _ => return Err(invalid_fault(mapper, "faultString is not a string")),
            });
        }
    }
    match (code, string) {
        (Some(code), Some(string)) => Ok(Fault { code, string }),
        (None, _) => Err(invalid_fault(mapper, "missing faultCode")),
        (_, None) => Err(invalid_fault(mapper, "missing faultString")),
    }
}

fn invalid_fault<I>(mapper: &ValueMapper<I>, problem: &str) -> Error
where
    I: Iterator<Item = Result<Node>>,
{
    Error::InvalidProtocol(format!(
        "{} contains invalid fault: {} {}",
        mapper.stack().kind(),
        problem,
        mapper.stack()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn has_content_skips_whitespace() {
        let mut input: &[u8] = b"\r\n \t<?xml";
        assert!(has_content(&mut input, true).unwrap());
        assert_eq!(input, b"<?xml");

        let mut input: &[u8] = b" \n";
        assert!(!has_content(&mut input, true).unwrap());

        let mut input: &[u8] = b" <x/>";
        assert!(has_content(&mut input, false).unwrap());
        assert_eq!(input, b" <x/>");
    }

    #[test]
    fn fault_display() {
        assert_eq!(
            Fault::new(4, "Too many parameters.").to_string(),
            "Server returned a fault exception: [4] Too many parameters."
        );
    }
}
