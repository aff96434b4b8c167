//! Utility functions for integration tests

#![allow(dead_code)]

use quick_xmlrpc::{
    FormatSettings, FromXmlRpc, NonStandard, Params, RequestDeserializer, RequestSerializer,
    Request, ResponseDeserializer, ResponseSerializer, Result, Service, ToXmlRpc,
};

/// Settings that write the whole document on one line without declaration.
pub fn compact() -> FormatSettings {
    FormatSettings::default()
        .use_indentation(false)
        .omit_xml_declaration(true)
}

/// Writes a method call with `settings` and returns it as a string.
pub fn request<P>(settings: FormatSettings, method: &str, params: &P) -> Result<String>
where
    P: Params + ?Sized,
{
    let mut xml = Vec::new();
    RequestSerializer::new(settings).serialize(&mut xml, method, params)?;
    Ok(String::from_utf8(xml).expect("serializer produces UTF-8"))
}

/// Writes a method response with `settings` and returns it as a string.
pub fn response<T>(settings: FormatSettings, value: &T) -> Result<String>
where
    T: ToXmlRpc + ?Sized,
{
    let mut xml = Vec::new();
    ResponseSerializer::new(settings).serialize(&mut xml, value)?;
    Ok(String::from_utf8(xml).expect("serializer produces UTF-8"))
}

/// Reads a method call checked against `service`.
pub fn read_request(xml: &str, service: &Service) -> Result<Request> {
    RequestDeserializer::new(NonStandard::NONE)
        .with_service(service)
        .deserialize(xml.as_bytes())
}

/// Reads the value of a method response as `T`.
pub fn read_response<T: FromXmlRpc>(xml: &str) -> Result<T> {
    ResponseDeserializer::new(NonStandard::NONE).deserialize_into(xml.as_bytes())
}

/// Wraps the value XML in a one-parameter method response.
pub fn wrap_response(value: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?><methodResponse><params><param>{}</param></params></methodResponse>",
        value
    )
}

/// Panics with a uniform message when `$result` does not match the error
/// variant, otherwise compares the message.
macro_rules! assert_error {
    ($result:expr, $variant:ident, $message:expr) => {
        match $result {
            Err(quick_xmlrpc::Error::$variant(e)) => pretty_assertions::assert_eq!(e, $message),
            x => panic!(
                concat!("Expected Err(", stringify!($variant), "(..)), but got {:?}"),
                x
            ),
        }
    };
}
