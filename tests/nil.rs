//! Members without value and the `<nil/>` extension

use pretty_assertions::assert_eq;
use quick_xmlrpc::{
    impl_record, Error, FormatSettings, MappingActions, NonStandard, NullMappingAction, RecordType,
    ResponseDeserializer, ResponseSerializer, Struct, Type, Value,
};

#[macro_use]
mod helpers;
use helpers::{compact, read_response, response, wrap_response};

#[derive(Debug, Default, PartialEq)]
struct Contact {
    name: String,
    email: Option<String>,
    phone: Option<String>,
}

impl_record! {
    Contact [missing = Ignore] {
        name: String => { missing = Error },
        email: Option<String> => { null = Nil },
        phone: Option<String>,
    }
}

#[derive(Debug, Default, PartialEq)]
struct Strict {
    note: Option<String>,
}

impl_record! {
    Strict [null = Error] {
        note: Option<String>,
    }
}

#[derive(Debug, Default, PartialEq)]
struct Book {
    title: String,
    author: Option<Contact>,
}

impl_record! {
    Book [null = Nil] {
        title: String,
        author: Option<Contact>,
    }
}

fn anonymous() -> Contact {
    Contact {
        name: "anonymous".into(),
        email: None,
        phone: None,
    }
}

#[test]
fn member_policies() {
    assert_eq!(
        response(compact(), &anonymous()).unwrap(),
        "<methodResponse><params><param><value><struct>\
         <member><name>name</name><value><string>anonymous</string></value></member>\
         <member><name>email</name><value><nil /></value></member>\
         </struct></value></param></params></methodResponse>"
    );
}

#[test]
fn indented() {
    let mut xml = Vec::new();
    ResponseSerializer::new(FormatSettings::default().indentation(4))
        .serialize(&mut xml, &anonymous())
        .unwrap();
    assert_eq!(
        String::from_utf8(xml).unwrap(),
        r#"<?xml version="1.0"?>
<methodResponse>
    <params>
        <param>
            <value>
                <struct>
                    <member>
                        <name>name</name>
                        <value>
                            <string>anonymous</string>
                        </value>
                    </member>
                    <member>
                        <name>email</name>
                        <value>
                            <nil />
                        </value>
                    </member>
                </struct>
            </value>
        </param>
    </params>
</methodResponse>"#
    );
}

#[test]
fn type_policy_is_inherited() {
    // `Book` writes nils, and so does the `Contact` inside it, except where
    // `Contact` says otherwise
    let book = Book {
        title: "Untitled".into(),
        author: Some(anonymous()),
    };
    assert_eq!(
        response(compact(), &book).unwrap(),
        "<methodResponse><params><param><value><struct>\
         <member><name>title</name><value><string>Untitled</string></value></member>\
         <member><name>author</name><value><struct>\
         <member><name>name</name><value><string>anonymous</string></value></member>\
         <member><name>email</name><value><nil /></value></member>\
         <member><name>phone</name><value><nil /></value></member>\
         </struct></value></member>\
         </struct></value></param></params></methodResponse>"
    );

    let book = Book {
        title: "Untitled".into(),
        author: None,
    };
    assert_eq!(
        response(compact(), &book).unwrap(),
        "<methodResponse><params><param><value><struct>\
         <member><name>title</name><value><string>Untitled</string></value></member>\
         <member><name>author</name><value><nil /></value></member>\
         </struct></value></param></params></methodResponse>"
    );
}

#[test]
fn serializer_policy() {
    // the type decides over the serializer
    let mut xml = Vec::new();
    let result = ResponseSerializer::new(compact())
        .with_actions(MappingActions::default().merge(Some(NullMappingAction::Nil), None))
        .serialize(&mut xml, &Strict { note: None });
    assert!(matches!(result, Err(Error::NullMember(_))));

    // the serializer decides where neither the type nor the member do
    let mut xml = Vec::new();
    assert_error!(
        ResponseSerializer::new(compact())
            .with_actions(MappingActions::default().merge(Some(NullMappingAction::Error), None))
            .serialize(&mut xml, &anonymous()),
        NullMember,
        "response contains member without value which cannot be serialized \
         [response : parameter 1 : struct mapped to type Contact : member phone]"
    );
}

#[test]
fn null_member_error() {
    assert_error!(
        response(compact(), &Strict { note: None }),
        NullMember,
        "response contains member without value which cannot be serialized \
         [response : parameter 1 : struct mapped to type Strict : member note]"
    );
    assert_eq!(
        response(compact(), &Strict { note: Some("ok".into()) }).unwrap(),
        "<methodResponse><params><param><value><struct>\
         <member><name>note</name><value><string>ok</string></value></member>\
         </struct></value></param></params></methodResponse>"
    );
}

#[test]
fn generic_structs_keep_nil() {
    let mut value = Struct::new();
    value.insert("a", Value::Nil);
    assert_eq!(
        response(compact(), &value).unwrap(),
        "<methodResponse><params><param><value><struct>\
         <member><name>a</name><value><nil /></value></member>\
         </struct></value></param></params></methodResponse>"
    );
}

#[test]
fn read_nil() {
    let xml = wrap_response(
        "<value><struct>\
         <member><name>name</name><value>x</value></member>\
         <member><name>email</name><value><nil/></value></member>\
         </struct></value>",
    );
    assert_eq!(
        read_response::<Contact>(&xml).unwrap(),
        Contact {
            name: "x".into(),
            email: None,
            phone: None,
        }
    );

    let xml = wrap_response(
        "<value><struct>\
         <member><name>name</name><value><nil/></value></member>\
         </struct></value>",
    );
    assert_error!(
        read_response::<Contact>(&xml),
        InvalidProtocol,
        "<nil> value cannot be mapped to type String"
    );

    assert_eq!(read_response::<Option<i32>>(&wrap_response("<value><nil/></value>")).unwrap(), None);
    assert_eq!(read_response::<Value>(&wrap_response("<value><nil/></value>")).unwrap(), Value::Nil);
}

#[test]
fn nil_onto_reference_types() {
    let nil = wrap_response("<value><nil/></value>");
    let read = |ty: Type| {
        ResponseDeserializer::new(NonStandard::NONE).deserialize(nil.as_bytes(), &ty)
    };

    assert_eq!(read(Type::Array(Box::new(Type::Int))).unwrap(), Value::Nil);
    assert_eq!(read(Type::Record(RecordType::of::<Contact>())).unwrap(), Value::Nil);
    assert_eq!(read(Type::String).unwrap(), Value::Nil);
    assert_eq!(read(Type::DateTime).unwrap(), Value::Nil);
    assert_error!(
        read(Type::Int),
        InvalidProtocol,
        "response contains <nil> value which cannot be mapped to type i32 [response]"
    );

    // native types without a nil value refuse it
    assert_error!(
        read_response::<Vec<i32>>(&nil),
        InvalidProtocol,
        "<nil> value cannot be mapped to type Vec<i32>"
    );
    assert_error!(
        read_response::<Contact>(&nil),
        InvalidProtocol,
        "<nil> value cannot be mapped to type Contact"
    );
    assert_eq!(read_response::<Option<Vec<i32>>>(&nil).unwrap(), None);
    assert_eq!(read_response::<Option<Contact>>(&nil).unwrap(), None);
}
