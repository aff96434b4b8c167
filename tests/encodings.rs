//! Documents in encodings other than UTF-8

use encoding_rs::WINDOWS_1251;
use pretty_assertions::assert_eq;
use quick_xmlrpc::{FormatSettings, NonStandard, ResponseDeserializer, ResponseSerializer};

/// "Привет" in windows-1251
const HELLO: &[u8] = &[0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2];

fn cp1251(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}

#[test]
fn write() {
    let settings = FormatSettings::default()
        .use_indentation(false)
        .encoding(WINDOWS_1251);
    let mut xml = Vec::new();
    ResponseSerializer::new(settings)
        .serialize(&mut xml, "Привет")
        .unwrap();

    assert_eq!(
        xml,
        cp1251(&[
            b"<?xml version=\"1.0\" encoding=\"windows-1251\"?>",
            b"<methodResponse><params><param><value><string>",
            HELLO,
            b"</string></value></param></params></methodResponse>",
        ])
    );
}

#[test]
fn utf8_has_no_encoding_declaration() {
    let settings = FormatSettings::default().use_indentation(false);
    let mut xml = Vec::new();
    ResponseSerializer::new(settings).serialize(&mut xml, "Привет").unwrap();
    assert!(xml.starts_with(b"<?xml version=\"1.0\"?>"));
    assert_eq!(String::from_utf8(xml).unwrap().matches("Привет").count(), 1);
}

#[test]
fn read() {
    let xml = cp1251(&[
        b"<?xml version=\"1.0\" encoding=\"windows-1251\"?>",
        b"<methodResponse><params><param><value>",
        HELLO,
        b"</value></param></params></methodResponse>",
    ]);
    let value: String = ResponseDeserializer::new(NonStandard::NONE)
        .deserialize_into(xml.as_slice())
        .unwrap();
    assert_eq!(value, "Привет");
}

#[test]
fn roundtrip() {
    let settings = FormatSettings::default().encoding(WINDOWS_1251);
    let mut xml = Vec::new();
    ResponseSerializer::new(settings)
        .serialize(&mut xml, &vec!["Мир".to_string(), "peace".to_string()])
        .unwrap();

    let value: Vec<String> = ResponseDeserializer::new(NonStandard::NONE)
        .deserialize_into(xml.as_slice())
        .unwrap();
    assert_eq!(value, vec!["Мир", "peace"]);
}
