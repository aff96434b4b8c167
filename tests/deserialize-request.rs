//! Reading of method calls with and without a service description

use pretty_assertions::assert_eq;
use quick_xmlrpc::{
    impl_record, Array, MethodSignature, NonStandard, RequestDeserializer, Service, Struct, Type,
    Value,
};

#[macro_use]
mod helpers;
use helpers::read_request;

#[derive(Debug, Default, PartialEq)]
struct Range {
    low: i32,
    high: i32,
}

impl_record! {
    Range {
        low: i32 => { rename = "lowerBound" },
        high: i32 => { rename = "upperBound" },
    }
}

fn service() -> Service {
    Service::new()
        .method(MethodSignature::new("examples.getStateName").param::<i32>().returns::<String>())
        .method(MethodSignature::new("examples.inRange").param::<Range>().param::<i32>())
        .method(MethodSignature::new("examples.sum").varargs::<i32>().returns::<i32>())
        .method(
            MethodSignature::new("examples.log")
                .param::<String>()
                .varargs::<String>(),
        )
        .method(MethodSignature::new("system.listMethods").returns::<Vec<String>>())
}

fn call(method: &str, params: &[&str]) -> String {
    let mut xml = format!("<methodCall><methodName>{}</methodName><params>", method);
    for param in params {
        xml.push_str("<param>");
        xml.push_str(param);
        xml.push_str("</param>");
    }
    xml.push_str("</params></methodCall>");
    xml
}

#[test]
fn without_service() {
    let xml = call(
        "anything",
        &[
            "<value><i4>1</i4></value>",
            "<value>text</value>",
            "<value><struct><member><name>a</name><value><nil/></value></member></struct></value>",
        ],
    );
    let request = RequestDeserializer::new(NonStandard::NONE)
        .deserialize(xml.as_bytes())
        .unwrap();

    let mut expected = Struct::new();
    expected.insert("a", Value::Nil);
    assert_eq!(request.method, "anything");
    assert_eq!(
        request.params,
        vec![
            Value::Int(1),
            Value::String("text".into()),
            Value::Struct(expected),
        ]
    );
}

#[test]
fn typed_params() {
    let xml = call(
        "examples.inRange",
        &[
            "<value><struct>\
             <member><name>upperBound</name><value><i4>139</i4></value></member>\
             <member><name>lowerBound</name><value><i4>18</i4></value></member>\
             </struct></value>",
            "<value><i4>21</i4></value>",
        ],
    );
    let request = read_request(&xml, &service()).unwrap();

    assert_eq!(request.method, "examples.inRange");
    assert_eq!(request.param::<Range>(0).unwrap(), Range { low: 18, high: 139 });
    assert_eq!(request.param::<i32>(1).unwrap(), 21);
}

#[test]
fn varargs() {
    let xml = call(
        "examples.sum",
        &[
            "<value><i4>1</i4></value>",
            "<value><int>2</int></value>",
            "<value><i4>3</i4></value>",
        ],
    );
    let request = read_request(&xml, &service()).unwrap();
    assert_eq!(
        request.params,
        vec![Value::Array(Array {
            elem: Type::Int,
            items: vec![Value::Int(1), Value::Int(2), Value::Int(3)],
        })]
    );
    assert_eq!(request.param::<Vec<i32>>(0).unwrap(), vec![1, 2, 3]);

    let xml = call("examples.log", &["<value>warning</value>"]);
    let request = read_request(&xml, &service()).unwrap();
    assert_eq!(request.param::<String>(0).unwrap(), "warning");
    assert_eq!(request.param::<Vec<String>>(1).unwrap(), Vec::<String>::new());
}

#[test]
fn zero_arguments() {
    let service = service();

    let request = read_request(
        "<methodCall><methodName>system.listMethods</methodName></methodCall>",
        &service,
    )
    .unwrap();
    assert_eq!(request.params, vec![]);

    let request = read_request(
        "<methodCall><methodName>system.listMethods</methodName><params/></methodCall>",
        &service,
    )
    .unwrap();
    assert_eq!(request.params, vec![]);

    // a method with only a variable tail may be called without params element
    let request = read_request(
        "<methodCall><methodName>examples.sum</methodName></methodCall>",
        &service,
    )
    .unwrap();
    assert_eq!(request.param::<Vec<i32>>(0).unwrap(), Vec::<i32>::new());
}

mod errors {
    use super::*;

    #[test]
    fn unsupported_method() {
        let xml = call("examples.unknown", &[]);
        assert_error!(
            read_request(&xml, &service()),
            UnsupportedMethod,
            "unsupported method called: examples.unknown"
        );
    }

    #[test]
    fn missing_params_element() {
        assert_error!(
            read_request(
                "<methodCall><methodName>examples.getStateName</methodName></methodCall>",
                &service(),
            ),
            InvalidParameterCount,
            "Method takes parameters and params element is missing."
        );
    }

    #[test]
    fn too_few() {
        let xml = call("examples.inRange", &["<value><struct/></value>"]);
        assert_error!(
            read_request(&xml, &service()),
            MissingRequiredMember,
            "request contains struct value with missing non-optional members: low high \
             [request : parameter 1 : struct mapped to type Range]"
        );

        let xml = call(
            "examples.inRange",
            &["<value><struct>\
               <member><name>lowerBound</name><value><i4>1</i4></value></member>\
               <member><name>upperBound</name><value><i4>2</i4></value></member>\
               </struct></value>"],
        );
        assert_error!(
            read_request(&xml, &service()),
            InvalidParameterCount,
            "Request contains too few param elements based on method signature."
        );
    }

    #[test]
    fn too_many() {
        let xml = call(
            "examples.getStateName",
            &["<value><i4>1</i4></value>", "<value><i4>2</i4></value>"],
        );
        assert_error!(
            read_request(&xml, &service()),
            InvalidParameterCount,
            "Request contains too many param elements based on method signature."
        );
    }

    #[test]
    fn wrong_type() {
        let xml = call("examples.getStateName", &["<value><string>41</string></value>"]);
        assert_error!(
            read_request(&xml, &service()),
            TypeMismatch,
            "request contains string value where integer expected [request : parameter 1]"
        );

        let xml = call("examples.sum", &["<value><i4>1</i4></value>", "<value><i8>2</i8></value>"]);
        assert_error!(
            read_request(&xml, &service()),
            TypeMismatch,
            "request contains i8 value where integer expected [request : parameter 2]"
        );
    }

    #[test]
    fn invalid_scalar() {
        let xml = call("examples.getStateName", &["<value><i4>4x1</i4></value>"]);
        assert_error!(
            read_request(&xml, &service()),
            InvalidScalarValue,
            "request contains invalid int value [request : parameter 1 : integer]"
        );
    }
}
