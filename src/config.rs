//! Conformance flags for reading and formatting settings for writing documents.

#[cfg(feature = "serde-types")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Set of relaxations of the XML-RPC specification, needed to talk to servers
/// which do not follow it exactly.
///
/// The flags are fixed before a document is read and are never changed while
/// it is mapped. Combine them with `|`:
///
/// ```
/// use quick_xmlrpc::NonStandard;
///
/// let flags = NonStandard::ALLOW_NON_STANDARD_DATE_TIME | NonStandard::ALLOW_STRING_FAULT_CODE;
/// assert!(flags.contains(NonStandard::ALLOW_STRING_FAULT_CODE));
/// assert!(!flags.contains(NonStandard::IGNORE_DUPLICATE_MEMBERS));
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-types", derive(Deserialize, Serialize))]
pub struct NonStandard(u8);

impl NonStandard {
    /// Strict conformance.
    pub const NONE: Self = Self(0);
    /// Skip whitespace before the XML declaration of a response body.
    pub const ALLOW_INVALID_HTTP_CONTENT: Self = Self(1 << 0);
    /// Accept hyphenated dates, `HHmmss` times, `Z` and numeric UTC offsets
    /// in `dateTime.iso8601` values.
    pub const ALLOW_NON_STANDARD_DATE_TIME: Self = Self(1 << 1);
    /// Accept a fault code given as a `<string>` holding a number.
    pub const ALLOW_STRING_FAULT_CODE: Self = Self(1 << 2);
    /// Keep the first of several struct members with the same name instead of
    /// failing.
    pub const IGNORE_DUPLICATE_MEMBERS: Self = Self(1 << 3);
    /// Map an empty `dateTime.iso8601` to [`datetime::min_value`](crate::datetime::min_value).
    pub const MAP_EMPTY_DATE_TIME_TO_MIN_VALUE: Self = Self(1 << 4);
    /// Map an all-zero `dateTime.iso8601` to [`datetime::min_value`](crate::datetime::min_value).
    pub const MAP_ZEROS_DATE_TIME_TO_MIN_VALUE: Self = Self(1 << 5);
    /// Every relaxation.
    pub const ALL: Self = Self(0b11_1111);

    /// Returns `true` if all flags of `other` are set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets all flags of `other`.
    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Returns `true` if no relaxation is enabled.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for NonStandard {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for NonStandard {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.insert(rhs);
    }
}

impl fmt::Debug for NonStandard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const NAMES: [(NonStandard, &str); 6] = [
            (NonStandard::ALLOW_INVALID_HTTP_CONTENT, "ALLOW_INVALID_HTTP_CONTENT"),
            (NonStandard::ALLOW_NON_STANDARD_DATE_TIME, "ALLOW_NON_STANDARD_DATE_TIME"),
            (NonStandard::ALLOW_STRING_FAULT_CODE, "ALLOW_STRING_FAULT_CODE"),
            (NonStandard::IGNORE_DUPLICATE_MEMBERS, "IGNORE_DUPLICATE_MEMBERS"),
            (NonStandard::MAP_EMPTY_DATE_TIME_TO_MIN_VALUE, "MAP_EMPTY_DATE_TIME_TO_MIN_VALUE"),
            (NonStandard::MAP_ZEROS_DATE_TIME_TO_MIN_VALUE, "MAP_ZEROS_DATE_TIME_TO_MIN_VALUE"),
        ];
        if self.is_empty() {
            return f.write_str("NONE");
        }
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// Settings that control the shape of written documents.
///
/// The defaults produce
///
/// ```xml
/// <?xml version="1.0"?>
/// <methodCall>
///   <methodName>Echo</methodName>
///   <params>
///     <param>
///       <value>
///         <i4>1</i4>
///       </value>
///     </param>
///   </params>
/// </methodCall>
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(Deserialize, Serialize))]
#[non_exhaustive]
pub struct FormatSettings {
    /// Number of spaces added for each nesting level.
    ///
    /// Default: `2`
    pub indentation: usize,
    /// Whether each element is written on its own line. When `false`, the whole
    /// document is written on one line and [`indentation`](Self::indentation)
    /// is ignored.
    ///
    /// Default: `true`
    pub use_indentation: bool,
    /// Whether elements without content are written as `<string />` instead of
    /// `<string></string>`. `<nil />` is always self-closed.
    ///
    /// Default: `false`
    pub use_empty_element_tags: bool,
    /// Whether the `<params>` element is written for a call without parameters.
    ///
    /// Default: `true`
    pub use_empty_params_tag: bool,
    /// Whether 32-bit integers are tagged `<int>` instead of `<i4>`.
    ///
    /// Default: `false`
    pub use_int_tag: bool,
    /// Whether strings are wrapped in a `<string>` element instead of written
    /// as bare text of `<value>`.
    ///
    /// Default: `true`
    pub use_string_tag: bool,
    /// Whether the `<?xml version="1.0"?>` declaration is omitted.
    ///
    /// Default: `false`
    pub omit_xml_declaration: bool,
    /// Encoding of the written document. It is announced in the XML declaration
    /// when it is not UTF-8.
    ///
    /// Default: UTF-8
    #[cfg(feature = "encoding")]
    #[cfg_attr(feature = "serde-types", serde(skip, default = "utf8"))]
    pub encoding: &'static encoding_rs::Encoding,
}

#[cfg(all(feature = "encoding", feature = "serde-types"))]
fn utf8() -> &'static encoding_rs::Encoding {
    encoding_rs::UTF_8
}

impl FormatSettings {
    /// Sets [`indentation`](Self::indentation).
    pub fn indentation(mut self, indentation: usize) -> Self {
        self.indentation = indentation;
        self
    }

    /// Sets [`use_indentation`](Self::use_indentation).
    pub fn use_indentation(mut self, value: bool) -> Self {
        self.use_indentation = value;
        self
    }

    /// Sets [`use_empty_element_tags`](Self::use_empty_element_tags).
    pub fn use_empty_element_tags(mut self, value: bool) -> Self {
        self.use_empty_element_tags = value;
        self
    }

    /// Sets [`use_empty_params_tag`](Self::use_empty_params_tag).
    pub fn use_empty_params_tag(mut self, value: bool) -> Self {
        self.use_empty_params_tag = value;
        self
    }

    /// Sets [`use_int_tag`](Self::use_int_tag).
    pub fn use_int_tag(mut self, value: bool) -> Self {
        self.use_int_tag = value;
        self
    }

    /// Sets [`use_string_tag`](Self::use_string_tag).
    pub fn use_string_tag(mut self, value: bool) -> Self {
        self.use_string_tag = value;
        self
    }

    /// Sets [`omit_xml_declaration`](Self::omit_xml_declaration).
    pub fn omit_xml_declaration(mut self, value: bool) -> Self {
        self.omit_xml_declaration = value;
        self
    }

    /// Sets [`encoding`](Self::encoding).
    #[cfg(feature = "encoding")]
    pub fn encoding(mut self, encoding: &'static encoding_rs::Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Name of the tag used for 32-bit integers.
    pub(crate) fn int_tag(&self) -> &'static str {
        if self.use_int_tag {
            "int"
        } else {
            "i4"
        }
    }
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            indentation: 2,
            use_indentation: true,
            use_empty_element_tags: false,
            use_empty_params_tag: true,
            use_int_tag: false,
            use_string_tag: true,
            omit_xml_declaration: false,
            #[cfg(feature = "encoding")]
            encoding: encoding_rs::UTF_8,
        }
    }
}
