//! Descriptions of the methods a server provides.
//!
//! A [`Service`] tells the [`RequestDeserializer`] which methods exist and
//! onto which types their parameters are mapped.
//!
//! ```
//! use quick_xmlrpc::{MethodSignature, Service, Type};
//!
//! let service = Service::new()
//!     .method(MethodSignature::new("examples.getStateName").param::<i32>().returns::<String>())
//!     .method(MethodSignature::new("system.listMethods").returns::<Vec<String>>());
//!
//! let method = service.get("examples.getStateName").unwrap();
//! assert_eq!(method.params, vec![Type::Int]);
//! assert!(service.get("examples.unknown").is_none());
//! ```
//!
//! [`RequestDeserializer`]: crate::RequestDeserializer

use crate::convert::FromXmlRpc;
use crate::types::Type;

/// Signature of one method.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodSignature {
    /// Name of the method as it appears in `<methodName>`
    pub name: String,
    /// Types of the fixed parameters, in order
    pub params: Vec<Type>,
    /// Type of each parameter of the variable tail, if the method takes one.
    /// The tail is collected into one array argument.
    pub varargs: Option<Type>,
    /// Type of the returned value
    pub returns: Type,
}

impl MethodSignature {
    /// Creates a signature of a method without parameters that returns any
    /// value.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            varargs: None,
            returns: Type::Any,
        }
    }

    /// Adds a parameter of type `T`.
    pub fn param<T: FromXmlRpc>(self) -> Self {
        self.param_type(T::xmlrpc_type())
    }

    /// Adds a parameter of the given type.
    pub fn param_type(mut self, ty: Type) -> Self {
        self.params.push(ty);
        self
    }

    /// Accepts any number of trailing parameters of type `T`.
    pub fn varargs<T: FromXmlRpc>(self) -> Self {
        self.varargs_type(T::xmlrpc_type())
    }

    /// Accepts any number of trailing parameters of the given type.
    pub fn varargs_type(mut self, ty: Type) -> Self {
        self.varargs = Some(ty);
        self
    }

    /// Sets the return type to `T`.
    pub fn returns<T: FromXmlRpc>(self) -> Self {
        self.returns_type(T::xmlrpc_type())
    }

    /// Sets the return type.
    pub fn returns_type(mut self, ty: Type) -> Self {
        self.returns = ty;
        self
    }

    /// Returns `true` if the method takes at least one parameter.
    pub fn takes_params(&self) -> bool {
        !self.params.is_empty() || self.varargs.is_some()
    }
}

/// A set of method signatures.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Service {
    methods: Vec<MethodSignature>,
}

impl Service {
    /// Creates a service without methods.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a method. A method with the same name is replaced.
    pub fn method(mut self, signature: MethodSignature) -> Self {
        self.methods.retain(|m| m.name != signature.name);
        self.methods.push(signature);
        self
    }

    /// Finds the method called `name`.
    pub fn get(&self, name: &str) -> Option<&MethodSignature> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Iterates over the methods in the order they were added.
    pub fn methods(&self) -> impl Iterator<Item = &MethodSignature> {
        self.methods.iter()
    }
}
