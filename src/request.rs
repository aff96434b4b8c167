//! Reading and writing of `<methodCall>` documents.

use crate::config::{FormatSettings, NonStandard};
use crate::convert::{FromXmlRpc, Params};
use crate::de::ValueMapper;
use crate::errors::{Error, Result};
use crate::events::NodeKind;
use crate::reader::parse_request;
use crate::se::Serializer;
use crate::service::{MethodSignature, Service};
use crate::types::{MappingAction, MappingActions, Type};
use crate::value::{Array, Value};
use crate::writer::Writer;
use std::io::{BufRead, Write};

/// A decoded method call.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    /// Name of the called method
    pub method: String,
    /// Arguments in order. The variable tail of a method, if any, is the last
    /// argument, an array.
    pub params: Vec<Value>,
}

impl Request {
    /// Converts argument `index`, counted from 0, to `T`.
    pub fn param<T: FromXmlRpc>(&self, index: usize) -> Result<T> {
        match self.params.get(index) {
            Some(value) => T::from_value(value.clone()),
            None => Err(Error::InvalidParameterCount(format!(
                "Request contains {} param elements, parameter {} requested.",
                self.params.len(),
                index + 1
            ))),
        }
    }
}

/// Writes method calls.
///
/// ```
/// use quick_xmlrpc::{FormatSettings, RequestSerializer};
///
/// let ser = RequestSerializer::new(FormatSettings::default().use_indentation(false));
/// let mut xml = Vec::new();
/// ser.serialize(&mut xml, "examples.getStateName", &(41,)).unwrap();
///
/// assert_eq!(
///     String::from_utf8(xml).unwrap(),
///     "<?xml version=\"1.0\"?><methodCall><methodName>examples.getStateName</methodName>\
///      <params><param><value><i4>41</i4></value></param></params></methodCall>"
/// );
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestSerializer {
    settings: FormatSettings,
    actions: MappingActions,
}

impl RequestSerializer {
    /// Creates a serializer that formats documents according to `settings`.
    pub fn new(settings: FormatSettings) -> Self {
        Self {
            settings,
            actions: MappingActions::default(),
        }
    }

    /// Sets the null and enum mapping policies used for the parameters.
    pub fn with_actions(mut self, actions: MappingActions) -> Self {
        self.actions = actions;
        self
    }

    /// Writes a call of `method` with `params` into `writer`.
    pub fn serialize<W, P>(&self, writer: W, method: &str, params: &P) -> Result<()>
    where
        W: Write,
        P: Params + ?Sized,
    {
        debug!("serializing call of {} with {} params", method, params.len());
        let mut writer = Writer::with_settings(writer, &self.settings);
        if !self.settings.omit_xml_declaration {
            writer.write_declaration()?;
        }
        writer.start("methodCall")?;
        writer.element("methodName", method)?;
        if self.settings.use_empty_params_tag || !params.is_empty() {
            writer.start("params")?;
            let mut ser = Serializer::new(&mut writer, &self.settings).with_actions(self.actions);
            ser.stack_mut().set_kind("request");
            params.serialize_params(&mut ser)?;
            writer.end()?;
        }
        writer.end()?;
        writer.flush()
    }
}

/// Reads method calls.
///
/// Without a [`Service`], every parameter is mapped with its shape inferred
/// from the wire. With one, the method must be provided by the service and
/// its parameters are mapped onto the declared types.
///
/// ```
/// use quick_xmlrpc::{MethodSignature, NonStandard, RequestDeserializer, Service, Value};
///
/// let service = Service::new().method(MethodSignature::new("add").param::<i32>().param::<i32>());
/// let xml = "<methodCall><methodName>add</methodName><params>\
///            <param><value><i4>1</i4></value></param>\
///            <param><value><i4>2</i4></value></param>\
///            </params></methodCall>";
///
/// let request = RequestDeserializer::new(NonStandard::NONE)
///     .with_service(&service)
///     .deserialize(xml.as_bytes())
///     .unwrap();
/// assert_eq!(request.method, "add");
/// assert_eq!(request.params, vec![Value::Int(1), Value::Int(2)]);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestDeserializer<'s> {
    non_standard: NonStandard,
    service: Option<&'s Service>,
}

impl<'s> RequestDeserializer<'s> {
    /// Creates a deserializer with the given conformance flags.
    pub fn new(non_standard: NonStandard) -> Self {
        Self {
            non_standard,
            service: None,
        }
    }

    /// Checks calls against the methods of `service`.
    pub fn with_service(mut self, service: &'s Service) -> Self {
        self.service = Some(service);
        self
    }

    /// Reads one `<methodCall>` document.
    pub fn deserialize<R: BufRead>(&self, reader: R) -> Result<Request> {
        let mut mapper = ValueMapper::new(parse_request(reader), "request", self.non_standard);

        let method = match mapper.next_node()? {
            Some(node) => match node.kind {
                NodeKind::MethodName(name) => name,
                kind => {
                    return Err(Error::InvalidProtocol(format!(
                        "Request XML not valid XML-RPC - {:?} where methodName expected.",
                        kind
                    )))
                }
            },
            None => {
                return Err(Error::InvalidProtocol(
                    "Request XML not valid XML-RPC - missing methodName.".into(),
                ))
            }
        };
        debug!("request for method {}", method);

        let signature = match self.service {
            Some(service) => match service.get(&method) {
                Some(signature) => Some(signature),
                None => {
                    return Err(Error::UnsupportedMethod(format!(
                        "unsupported method called: {}",
                        method
                    )))
                }
            },
            None => None,
        };

        let has_params = match mapper.peek()? {
            Some(node) => node.kind == NodeKind::ParamsMarker,
            None => false,
        };
        if !has_params {
            if signature.map_or(false, |s| !s.params.is_empty()) {
                return Err(Error::InvalidParameterCount(
                    "Method takes parameters and params element is missing.".into(),
                ));
            }
            let params = match signature.and_then(|s| s.varargs.as_ref()) {
                Some(elem) => vec![empty_tail(elem)],
                None => Vec::new(),
            };
            return Ok(Request { method, params });
        }
        mapper.next_node()?;

        let params = match signature {
            Some(signature) => map_params(&mut mapper, signature)?,
            None => {
                let mut params = Vec::new();
                while mapper.peek()?.is_some() {
                    let label = format!("parameter {}", params.len() + 1);
                    params.push(mapper.on_stack(label, |m| m.map_value(&Type::Any, MappingAction::Error))?);
                }
                params
            }
        };
        Ok(Request { method, params })
    }
}

fn empty_tail(elem: &Type) -> Value {
    Value::Array(Array {
        elem: elem.clone(),
        items: Vec::new(),
    })
}

/// Maps the parameters of a call of a method with a known signature.
fn map_params<I>(mapper: &mut ValueMapper<I>, signature: &MethodSignature) -> Result<Vec<Value>>
where
    I: Iterator<Item = Result<crate::events::Node>>,
{
    let mut params = Vec::new();
    let mut tail = Vec::new();

    while mapper.peek()?.is_some() {
        let index = params.len() + tail.len();
        let ty = match (signature.params.get(index), &signature.varargs) {
            (Some(ty), _) => ty,
            (None, Some(ty)) => ty,
            (None, None) => {
                return Err(Error::InvalidParameterCount(
                    "Request contains too many param elements based on method signature.".into(),
                ))
            }
        };
        let label = format!("parameter {}", index + 1);
        let value = mapper.on_stack(label, |m| m.map_value(ty, MappingAction::Error))?;
        if index < signature.params.len() {
            params.push(value);
        } else {
            tail.push(value);
        }
    }

    if params.len() < signature.params.len() {
        return Err(Error::InvalidParameterCount(
            "Request contains too few param elements based on method signature.".into(),
        ));
    }
    if let Some(elem) = &signature.varargs {
        params.push(Value::Array(Array {
            elem: elem.clone(),
            items: tail,
        }));
    }
    Ok(params)
}
