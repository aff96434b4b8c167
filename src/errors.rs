//! Error management module

use crate::response::Fault;
use quick_xml::encoding::EncodingError;
use std::fmt;
use std::io::Error as IoError;
use std::sync::Arc;

/// The error type used by this crate.
///
/// Every variant that is raised while a document is mapped carries, at the
/// end of its message, the mapping stack at the failure point, for example
/// `[request : parameter 1 : member x mapped to type Y]`.
#[derive(Clone, Debug)]
pub enum Error {
    /// IO error on the output sink.
    ///
    /// `Arc<IoError>` instead of `IoError` since `IoError` is not `Clone`.
    Io(Arc<IoError>),
    /// The underlying XML is not well-formed, or the input was empty.
    IllFormedXml {
        /// Description of the problem
        message: String,
        /// Error reported by the XML reader, if the problem was found there
        cause: Option<quick_xml::Error>,
    },
    /// Well-formed XML that is not a valid XML-RPC document.
    InvalidProtocol(String),
    /// The wire type of a value conflicts with the declared target type.
    TypeMismatch(String),
    /// A scalar's text does not parse under its declared kind or overflows it.
    InvalidScalarValue(String),
    /// A value does not correspond to any defined member of the target enum.
    InvalidEnumValue(String),
    /// Required members of a typed struct were absent from the wire struct.
    MissingRequiredMember(String),
    /// Wire data was supplied for a member excluded from mapping.
    NonSerializableMemberConflict(String),
    /// Request parameter count does not satisfy the method's declared arity.
    InvalidParameterCount(String),
    /// Request names a method that the service does not provide.
    UnsupportedMethod(String),
    /// Serialization met a value that is already on the ancestor chain.
    RecursiveStructure(String),
    /// A record member without value was serialized under the `Error` null
    /// mapping policy.
    NullMember(String),
    /// Server answered with a well-formed fault response.
    Fault(Fault),
}

impl Error {
    /// Creates a new `Error::IllFormedXml` without an underlying cause
    pub(crate) fn ill_formed<S: Into<String>>(message: S) -> Self {
        Error::IllFormedXml {
            message: message.into(),
            cause: None,
        }
    }
}

impl From<IoError> for Error {
    /// Creates a new `Error::Io` from the given error
    #[inline]
    fn from(error: IoError) -> Error {
        Error::Io(Arc::new(error))
    }
}

impl From<quick_xml::Error> for Error {
    /// Creates a new `Error::IllFormedXml` caused by the given reader error
    #[inline]
    fn from(error: quick_xml::Error) -> Error {
        Error::IllFormedXml {
            message: error.to_string(),
            cause: Some(error),
        }
    }
}

impl From<EncodingError> for Error {
    #[inline]
    fn from(error: EncodingError) -> Error {
        quick_xml::Error::from(error).into()
    }
}

/// A specialized `Result` type where the error is hard-wired to [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::IllFormedXml { message, .. } => write!(f, "ill-formed XML: {}", message),
            Error::InvalidProtocol(e) => write!(f, "invalid XML-RPC protocol: {}", e),
            Error::TypeMismatch(e) => write!(f, "type mismatch: {}", e),
            Error::InvalidScalarValue(e) => write!(f, "invalid value: {}", e),
            Error::InvalidEnumValue(e) => write!(f, "invalid enum value: {}", e),
            Error::MissingRequiredMember(e) => write!(f, "missing member: {}", e),
            Error::NonSerializableMemberConflict(e) => write!(f, "non-serialized member: {}", e),
            Error::InvalidParameterCount(e) => write!(f, "invalid parameter count: {}", e),
            Error::UnsupportedMethod(e) => write!(f, "unsupported method: {}", e),
            Error::RecursiveStructure(e) => write!(f, "recursive data structure: {}", e),
            Error::NullMember(e) => write!(f, "null member: {}", e),
            Error::Fault(fault) => write!(f, "{}", fault),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e.as_ref()),
            Error::IllFormedXml {
                cause: Some(cause), ..
            } => Some(cause),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::error::Error as _;

    #[test]
    fn display() {
        assert_eq!(
            Error::InvalidProtocol("Missing element methodName".into()).to_string(),
            "invalid XML-RPC protocol: Missing element methodName"
        );
        assert_eq!(
            Error::ill_formed("empty document").to_string(),
            "ill-formed XML: empty document"
        );
    }

    #[test]
    fn source() {
        let io = Error::from(IoError::new(std::io::ErrorKind::Other, "broken pipe"));
        assert_eq!(io.source().map(|e| e.to_string()), Some("broken pipe".into()));
        assert!(Error::TypeMismatch("x".into()).source().is_none());
    }
}
