//! Pending work of a [`NodeReader`](super::NodeReader).

/// A unit of work of the recursive-descent parser.
///
/// The parser keeps a stack of steps instead of a call stack, so it can stop
/// after each produced node and resume on the next call. A step that enters a
/// nested construct pushes its continuation first and the nested steps after
/// it, so the nested steps run first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Step {
    /// Root of a `<methodCall>` document
    Request,
    /// Optional `<params>` after the `<methodName>` of a request
    RequestParams,
    /// Root of a `<methodResponse>` document
    Response,
    /// Root of a document with a single `<value>`
    ValueDocument,
    /// Next `<param>` inside `<params>`. `first` is `true` for the first
    /// `<param>`, which is a child of `<params>`; the following are siblings
    /// of the previous one. When `multiple` is `false` only the first
    /// `<param>` is read.
    Params { first: bool, multiple: bool },
    /// A `<param>` element
    Param,
    /// `<value>` of a `<fault>`
    FaultValue,
    /// A `<value>` element
    Value,
    /// Next `<member>` of a `<struct>`
    Members { first: bool },
    /// End of a `<struct>` which starts at the given depth
    StructClose { depth: usize },
    /// Next `<value>` inside the `<data>` of an `<array>`
    ArrayValues { first: bool },
    /// End of an `<array>`
    ArrayClose,
    /// Skip to the end tag of the element at the given depth
    EndElement(usize),
}
