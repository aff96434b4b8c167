//! Diagnostic trail of a mapping call.

use std::fmt::{self, Write};

/// Ordered list of human-readable locations, from the document root to the
/// value being mapped or serialized.
///
/// The stack has no effect on control flow: it only feeds error messages, so a
/// failure deep inside a large document can be localized without parsing it
/// again.
///
/// ```
/// use quick_xmlrpc::MappingStack;
///
/// let mut stack = MappingStack::new("response");
/// stack.push("parameter 1");
/// stack.push("member id mapped to type i32");
/// assert_eq!(stack.dump(), "[response : parameter 1 : member id mapped to type i32]");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MappingStack {
    kind: String,
    entries: Vec<String>,
}

impl MappingStack {
    /// Creates an empty stack for a document of the given kind, such as
    /// `request` or `response`.
    pub fn new<S: Into<String>>(kind: S) -> Self {
        Self {
            kind: kind.into(),
            entries: Vec::new(),
        }
    }

    /// Kind of the mapped document.
    #[inline]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub(crate) fn set_kind<S: Into<String>>(&mut self, kind: S) {
        self.kind = kind.into();
    }

    /// Adds a location on top of the stack.
    #[inline]
    pub fn push<S: Into<String>>(&mut self, entry: S) {
        self.entries.push(entry.into());
    }

    /// Removes the topmost location.
    #[inline]
    pub fn pop(&mut self) -> Option<String> {
        self.entries.pop()
    }

    /// Number of locations on the stack.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no location was pushed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the stack as `[kind : first : ... : last]`.
    pub fn dump(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MappingStack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_char('[')?;
        f.write_str(&self.kind)?;
        for entry in &self.entries {
            f.write_str(" : ")?;
            f.write_str(entry)?;
        }
        f.write_char(']')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn dump() {
        let mut stack = MappingStack::new("request");
        assert_eq!(stack.dump(), "[request]");

        stack.push("parameter 2");
        stack.push("array mapped to type Vec<i32>");
        stack.push("element 0");
        assert_eq!(
            stack.dump(),
            "[request : parameter 2 : array mapped to type Vec<i32> : element 0]"
        );

        assert_eq!(stack.pop(), Some("element 0".to_string()));
        assert_eq!(stack.len(), 2);
        assert_eq!(
            stack.dump(),
            "[request : parameter 2 : array mapped to type Vec<i32>]"
        );
    }
}
