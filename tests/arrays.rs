//! Arrays in responses: element type inference and typed arrays

use pretty_assertions::assert_eq;
use quick_xmlrpc::{Array, MultiArray, NonStandard, ResponseDeserializer, Type, Value};

#[macro_use]
mod helpers;
use helpers::{compact, read_response, response, wrap_response};

fn array(items: &[&str]) -> String {
    let mut xml = String::from("<value><array><data>");
    for item in items {
        xml.push_str(item);
    }
    xml.push_str("</data></array></value>");
    wrap_response(&xml)
}

fn read(xml: &str) -> Value {
    ResponseDeserializer::new(NonStandard::NONE)
        .deserialize(xml.as_bytes(), &Type::Any)
        .unwrap()
}

#[test]
fn homogeneous() {
    let xml = array(&["<value><i4>12</i4></value>", "<value><int>-4</int></value>"]);
    assert_eq!(
        read(&xml),
        Value::Array(Array {
            elem: Type::Int,
            items: vec![Value::Int(12), Value::Int(-4)],
        })
    );
}

#[test]
fn nil_does_not_break_inference() {
    let xml = array(&["<value><nil/></value>", "<value>a</value>", "<value><string>b</string></value>"]);
    assert_eq!(
        read(&xml),
        Value::Array(Array {
            elem: Type::String,
            items: vec![Value::Nil, Value::String("a".into()), Value::String("b".into())],
        })
    );
}

#[test]
fn heterogeneous() {
    let xml = array(&[
        "<value><i4>12</i4></value>",
        "<value><string>Egypt</string></value>",
        "<value><boolean>0</boolean></value>",
    ]);
    let value = read(&xml);
    assert_eq!(
        value,
        Value::Array(Array {
            elem: Type::Any,
            items: vec![
                Value::Int(12),
                Value::String("Egypt".into()),
                Value::Boolean(false),
            ],
        })
    );

    // written back in the same shape
    assert_eq!(
        response(compact(), &value).unwrap(),
        wrap_response(
            "<value><array><data>\
             <value><i4>12</i4></value>\
             <value><string>Egypt</string></value>\
             <value><boolean>0</boolean></value>\
             </data></array></value>"
        )
        .replace("<?xml version=\"1.0\"?>", "")
    );
}

#[test]
fn empty() {
    let xml = wrap_response("<value><array><data/></array></value>");
    assert_eq!(read(&xml), Value::Array(Array::new(vec![])));
    assert_eq!(read_response::<Vec<String>>(&xml).unwrap(), Vec::<String>::new());

    // `<data>` itself may be missing
    let xml = wrap_response("<value><array/></value>");
    assert_eq!(read_response::<Vec<i32>>(&xml).unwrap(), Vec::<i32>::new());
}

#[test]
fn typed() {
    let xml = array(&["<value><i8>1</i8></value>", "<value><i8>2</i8></value>"]);
    assert_eq!(read_response::<Vec<i64>>(&xml).unwrap(), vec![1, 2]);
    assert_eq!(read_response::<Vec<Option<i64>>>(&array(&["<value><nil/></value>"])).unwrap(), vec![None]);

    let xml = array(&["<value><i4>1</i4></value>", "<value><string>2</string></value>"]);
    assert_error!(
        read_response::<Vec<i32>>(&xml),
        TypeMismatch,
        "response contains string value where integer expected \
         [response : array mapped to type Vec<i32> : element 1]"
    );
}

#[test]
fn nested() {
    let xml = array(&[
        "<value><array><data><value><i4>1</i4></value></data></array></value>",
        "<value><array><data/></array></value>",
    ]);
    assert_eq!(
        read_response::<Vec<Vec<i32>>>(&xml).unwrap(),
        vec![vec![1], vec![]]
    );
}

#[test]
fn multi_dimensional() {
    let xml = array(&[
        "<value><array><data><value><i4>1</i4></value><value><i4>2</i4></value></data></array></value>",
        "<value><array><data><value><i4>3</i4></value><value><i4>4</i4></value></data></array></value>",
        "<value><array><data><value><i4>5</i4></value><value><i4>6</i4></value></data></array></value>",
    ]);
    let matrix: MultiArray<i32, 2> = read_response(&xml).unwrap();
    assert_eq!(matrix.lengths(), [3, 2]);
    assert_eq!(matrix.items(), &[1, 2, 3, 4, 5, 6]);
    assert_eq!(matrix.get([2, 0]), Some(&5));

    let ragged = array(&[
        "<value><array><data><value><i4>1</i4></value><value><i4>2</i4></value></data></array></value>",
        "<value><array><data><value><i4>3</i4></value></data></array></value>",
    ]);
    assert_error!(
        read_response::<MultiArray<i32, 2>>(&ragged),
        InvalidProtocol,
        "response contains ragged array: dimension 1 has lengths 2 and 1 \
         [response : array mapped to type MultiArray<i32, 2>]"
    );
}

#[test]
fn not_an_array() {
    assert_error!(
        read_response::<Vec<i32>>(&wrap_response("<value><i4>1</i4></value>")),
        TypeMismatch,
        "response contains integer value where array expected [response]"
    );
}
