//! A module to handle `Writer`

use std::io::{self, Write};

use crate::config::FormatSettings;
use crate::errors::Result;
use quick_xml::escape::partial_escape;

#[cfg(feature = "encoding")]
use encoding_rs::{Encoding, UTF_8};

/// An element which start tag is already written
#[derive(Debug)]
struct Element {
    name: &'static str,
    /// At least one child element was written
    has_children: bool,
    /// Text was written directly into the element. Children of such elements
    /// are not indented, otherwise the indentation would change the text.
    mixed: bool,
}

/// XML writer specialized for XML-RPC documents.
///
/// XML-RPC documents have no attributes, no comments and no namespaces, so the
/// writer only knows elements and text. Start tags are closed lazily: an
/// element closed right after its start is written as `<name></name>`, or as
/// `<name />` when empty element tags are requested.
///
/// ```
/// use quick_xmlrpc::{FormatSettings, Writer};
///
/// let mut writer = Writer::with_settings(Vec::new(), &FormatSettings::default());
/// writer.start("value").unwrap();
/// writer.element("string", "a < b").unwrap();
/// writer.end().unwrap();
///
/// let xml = String::from_utf8(writer.into_inner()).unwrap();
/// assert_eq!(xml, "<value>\n  <string>a &lt; b</string>\n</value>");
/// ```
pub struct Writer<W: Write> {
    /// underlying writer
    writer: W,
    /// Number of spaces per nesting level, `None` to write everything on one
    /// line
    indent: Option<usize>,
    empty_tags: bool,
    stack: Vec<Element>,
    /// The last start tag still misses its closing `>`
    pending: bool,
    /// Something was written already
    started: bool,
    #[cfg(feature = "encoding")]
    encoding: &'static Encoding,
}

impl<W: Write> Writer<W> {
    /// Creates a Writer that writes the whole document on one line with full
    /// end tags.
    pub fn new(inner: W) -> Writer<W> {
        Writer {
            writer: inner,
            indent: None,
            empty_tags: false,
            stack: Vec::new(),
            pending: false,
            started: false,
            #[cfg(feature = "encoding")]
            encoding: UTF_8,
        }
    }

    /// Creates a Writer which output is shaped by `settings`.
    pub fn with_settings(inner: W, settings: &FormatSettings) -> Writer<W> {
        let mut writer = Self::new(inner);
        if settings.use_indentation {
            writer.indent = Some(settings.indentation);
        }
        writer.empty_tags = settings.use_empty_element_tags;
        #[cfg(feature = "encoding")]
        {
            writer.encoding = settings.encoding;
        }
        writer
    }

    /// Consumes this `Writer`, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Get a mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Writes the XML declaration. The encoding is only announced when it is
    /// not UTF-8.
    pub fn write_declaration(&mut self) -> Result<()> {
        #[cfg(feature = "encoding")]
        {
            if self.encoding != UTF_8 {
                let name = self.encoding.name();
                return self.write_wrapped("<?xml version=\"1.0\" encoding=\"", name, "\"?>");
            }
        }
        self.write_str("<?xml version=\"1.0\"?>")
    }

    /// Writes the start tag of element `name`.
    pub fn start(&mut self, name: &'static str) -> Result<()> {
        self.close_start_tag()?;
        self.child_indent()?;
        self.write_wrapped("<", name, "")?;
        self.pending = true;
        self.stack.push(Element {
            name,
            has_children: false,
            mixed: false,
        });
        Ok(())
    }

    /// Writes the end tag of the innermost open element.
    pub fn end(&mut self) -> Result<()> {
        let element = match self.stack.pop() {
            Some(element) => element,
            None => {
                return Err(io::Error::new(io::ErrorKind::InvalidInput, "no open element").into())
            }
        };
        if self.pending {
            self.pending = false;
            return if self.empty_tags {
                self.write_str(" />")
            } else {
                self.write_wrapped("></", element.name, ">")
            };
        }
        if element.has_children && !element.mixed {
            self.indent(self.stack.len())?;
        }
        self.write_wrapped("</", element.name, ">")
    }

    /// Writes an element that is always self-closed, like `<nil />`.
    pub fn empty(&mut self, name: &'static str) -> Result<()> {
        self.close_start_tag()?;
        self.child_indent()?;
        self.write_wrapped("<", name, " />")
    }

    /// Writes escaped text into the innermost open element. Empty text writes
    /// nothing.
    pub fn text(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.close_start_tag()?;
        if let Some(parent) = self.stack.last_mut() {
            parent.mixed = true;
        }
        self.write_str(&partial_escape(text))
    }

    /// Writes an element with text content.
    pub fn element(&mut self, name: &'static str, text: &str) -> Result<()> {
        self.start(name)?;
        self.text(text)?;
        self.end()
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn close_start_tag(&mut self) -> Result<()> {
        if self.pending {
            self.pending = false;
            self.write_str(">")?;
        }
        Ok(())
    }

    /// Starts a line for a new child of the innermost open element
    fn child_indent(&mut self) -> Result<()> {
        let mixed = match self.stack.last_mut() {
            Some(parent) => {
                parent.has_children = true;
                parent.mixed
            }
            None => false,
        };
        if mixed {
            Ok(())
        } else {
            self.indent(self.stack.len())
        }
    }

    fn indent(&mut self, level: usize) -> Result<()> {
        if let Some(size) = self.indent {
            if self.started {
                self.write_str("\n")?;
                for _ in 0..size * level {
                    self.write_str(" ")?;
                }
            }
        }
        Ok(())
    }

    #[inline]
    fn write_wrapped(&mut self, before: &str, value: &str, after: &str) -> Result<()> {
        self.write_str(before)?;
        self.write_str(value)?;
        self.write_str(after)
    }

    fn write_str(&mut self, value: &str) -> Result<()> {
        self.started = true;
        #[cfg(feature = "encoding")]
        {
            if self.encoding != UTF_8 {
                let (bytes, _, _) = self.encoding.encode(value);
                self.writer.write_all(&bytes)?;
                return Ok(());
            }
        }
        self.writer.write_all(value.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write<F>(settings: &FormatSettings, f: F) -> String
    where
        F: FnOnce(&mut Writer<&mut Vec<u8>>) -> Result<()>,
    {
        let mut buffer = Vec::new();
        let mut writer = Writer::with_settings(&mut buffer, settings);
        f(&mut writer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    fn value(writer: &mut Writer<&mut Vec<u8>>) -> Result<()> {
        writer.start("value")?;
        writer.start("array")?;
        writer.start("data")?;
        writer.start("value")?;
        writer.empty("nil")?;
        writer.end()?;
        writer.start("value")?;
        writer.element("string", "")?;
        writer.end()?;
        writer.end()?;
        writer.end()?;
        writer.end()
    }

    #[test]
    fn compact() {
        let settings = FormatSettings::default().use_indentation(false);
        assert_eq!(
            write(&settings, value),
            "<value><array><data><value><nil /></value>\
             <value><string></string></value></data></array></value>"
        );
    }

    #[test]
    fn indented() {
        let settings = FormatSettings::default().indentation(4);
        assert_eq!(
            write(&settings, |w| {
                w.write_declaration()?;
                value(w)
            }),
            "<?xml version=\"1.0\"?>
<value>
    <array>
        <data>
            <value>
                <nil />
            </value>
            <value>
                <string></string>
            </value>
        </data>
    </array>
</value>"
        );
    }

    #[test]
    fn empty_element_tags() {
        let settings = FormatSettings::default()
            .use_indentation(false)
            .use_empty_element_tags(true);
        assert_eq!(
            write(&settings, |w| {
                w.start("params")?;
                w.end()?;
                w.element("string", "")
            }),
            "<params /><string />"
        );
    }

    #[test]
    fn text_is_inline() {
        let settings = FormatSettings::default();
        assert_eq!(
            write(&settings, |w| {
                w.start("value")?;
                w.text("<a> & \"b\"")?;
                w.end()
            }),
            "<value>&lt;a&gt; &amp; \"b\"</value>"
        );
    }

    #[test]
    fn unbalanced_end() {
        let mut writer = Writer::new(Vec::new());
        assert!(writer.end().is_err());
    }
}
