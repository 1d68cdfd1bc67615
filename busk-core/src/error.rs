//! Error types for Busk.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`Error`] - Top-level error type for all Busk operations
//! - [`RegistrationError`] - Errors while declaring interfaces on a type
//! - [`DispatchError`] - Errors on the exporting side that are not bus replies
//! - [`ProxyError`] - Errors raised to the caller of a proxy
//! - [`NameError`] - Invalid bus identifiers
//! - [`BusError`] - A named bus error, as carried by error replies

use crate::message::MessageType;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Well-known error names used as the discriminator of error replies.
pub mod error_name {
    /// The interface or member of a method call is not known to the object.
    pub const UNKNOWN_METHOD: &str = "org.freedesktop.DBus.Error.UnknownMethod";
    /// No object is exported at the requested path.
    pub const UNKNOWN_OBJECT: &str = "org.freedesktop.DBus.Error.UnknownObject";
    /// The arguments of a method call could not be used by the handler.
    pub const INVALID_ARGS: &str = "org.freedesktop.DBus.Error.InvalidArgs";
    /// Generic handler failure.
    pub const FAILED: &str = "org.freedesktop.DBus.Error.Failed";
}

/// Top-level error type for all Busk operations.
#[derive(Error, Debug)]
pub enum Error {
    /// An error occurred while registering interfaces.
    #[error("registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// An error occurred on the exporting side.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// An error occurred while using a proxy.
    #[error("proxy error: {0}")]
    Proxy(#[from] ProxyError),

    /// An invalid bus identifier was supplied.
    #[error(transparent)]
    Name(#[from] NameError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Invalid bus identifiers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// Not a valid dotted interface name.
    #[error("invalid interface name: {0:?}")]
    Interface(String),

    /// Not a valid method or signal name.
    #[error("invalid member name: {0:?}")]
    Member(String),

    /// Not a valid slash-delimited object path.
    #[error("invalid object path: {0:?}")]
    ObjectPath(String),

    /// A method prototype string could not be parsed.
    #[error("invalid method prototype: {0:?}")]
    Prototype(String),
}

/// Errors raised while a type declares its interfaces.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// A method or signal was declared with no interface in scope.
    #[error("no interface in scope for declaration `{0}`")]
    UndefinedInterface(String),

    /// An interface scope was opened while another one is still open.
    #[error("cannot open interface `{requested}` while `{open}` is still open")]
    ScopeAlreadyOpen {
        /// The interface whose scope is open.
        open: String,
        /// The interface that was requested.
        requested: String,
    },

    /// A declared name is not a valid bus identifier.
    #[error(transparent)]
    Name(#[from] NameError),
}

/// Errors on the exporting side.
///
/// Bad interface or member names in incoming calls are never reported here;
/// they become error replies on the bus.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The object has no owning connection yet.
    #[error("object \"{0}\" is not exported")]
    NotExported(String),

    /// The object (or path) was already exported.
    #[error("object \"{0}\" is already exported")]
    AlreadyExported(String),

    /// The signal is not declared on the interface.
    #[error("signal \"{signal}\" is not declared on interface \"{interface}\"")]
    UnknownSignal {
        /// Interface name.
        interface: String,
        /// Signal name.
        signal: String,
    },

    /// The number of signal arguments does not match the declaration.
    #[error("signal \"{signal}\" takes {expected} arguments, {given} given")]
    SignalArguments {
        /// Signal name.
        signal: String,
        /// Declared argument count.
        expected: usize,
        /// Supplied argument count.
        given: usize,
    },

    /// The connection refused the outgoing message.
    #[error("connection rejected outgoing message")]
    Send(#[source] BoxError),
}

/// Errors raised to the caller of a proxy.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The bus collaborator failed to carry out a request.
    #[error("bus request failed")]
    Bus(#[source] BoxError),

    /// The introspection document could not be parsed.
    #[error("introspection data could not be parsed")]
    Parse(#[source] BoxError),

    /// The remote object answered with an error reply.
    #[error(transparent)]
    Remote(BusError),

    /// A forwarded call found no method to resolve to.
    #[error("{}", no_such("method", name, interface.as_deref(), path))]
    NoMethod {
        /// Object path of the proxy.
        path: String,
        /// The attempted name.
        name: String,
        /// The default interface, when one was consulted.
        interface: Option<String>,
    },

    /// A signal registration found no default interface to resolve to.
    #[error("{}", no_such("signal", name, interface.as_deref(), path))]
    NoSignal {
        /// Object path of the proxy.
        path: String,
        /// The attempted signal name.
        name: String,
        /// The configured default interface, if any.
        interface: Option<String>,
    },

    /// The interface does not declare the member.
    #[error("method \"{member}\" is not declared on interface \"{interface}\"")]
    UnknownMember {
        /// Interface name.
        interface: String,
        /// Member name.
        member: String,
    },

    /// The interface does not declare the signal.
    #[error("signal \"{signal}\" is not declared on interface \"{interface}\"")]
    UnknownSignal {
        /// Interface name.
        interface: String,
        /// Signal name.
        signal: String,
    },

    /// Wrong number of arguments for a remote method.
    #[error("wrong number of arguments ({given} for {expected}) calling \"{member}\"")]
    ArgumentCount {
        /// Member name.
        member: String,
        /// Declared input count.
        expected: usize,
        /// Supplied argument count.
        given: usize,
    },

    /// The bus answered a call with something other than a return or error.
    #[error("unexpected reply of type {0}")]
    UnexpectedReply(MessageType),

    /// An invalid bus identifier was supplied.
    #[error(transparent)]
    Name(#[from] NameError),
}

fn no_such(kind: &str, name: &str, interface: Option<&str>, path: &str) -> String {
    match interface {
        Some(interface) => {
            format!("undefined {kind} `{name}' for interface `{interface}' on object `{path}'")
        }
        None => format!("undefined {kind} `{name}' for object `{path}'"),
    }
}

/// A named bus error.
///
/// Handlers return this to choose the error name of the reply; proxies
/// receive it when a remote call answers with an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{name}: {message}")]
pub struct BusError {
    /// Reverse-dotted error name.
    pub name: String,
    /// Human-readable description.
    pub message: String,
}

impl BusError {
    /// Create a new named error.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// A generic `Failed` error.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(error_name::FAILED, message)
    }

    /// An `InvalidArgs` error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::new(error_name::INVALID_ARGS, message)
    }
}

// Convenience conversions
impl From<BoxError> for Error {
    fn from(err: BoxError) -> Self {
        Error::Custom(err)
    }
}

impl From<BusError> for ProxyError {
    fn from(err: BusError) -> Self {
        ProxyError::Remote(err)
    }
}
