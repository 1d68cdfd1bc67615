//! # busk-core
//!
//! Descriptors, messages and collaborator traits for the Busk message-bus
//! binding.
//!
//! This crate has minimal dependencies and is meant to be imported by
//! transports and introspection parsers that plug into `busk-std` without
//! needing its dispatch and proxy machinery.
//!
//! # Building Blocks
//!
//! ## Descriptors ([`Interface`], [`Method`], [`Signal`])
//!
//! Schema objects: a name plus ordered argument signatures. They describe what
//! an object offers; they never execute anything.
//!
//! ## Tables ([`InterfaceTable`])
//!
//! The interfaces of one exportable type, keyed by name. Tables derived for a
//! subtype share interfaces with their parent and copy them on first write.
//!
//! ## Messages ([`Message`], [`Value`])
//!
//! The in-memory form of calls, replies and signals. Encoding is the
//! transport's job.
//!
//! ## Collaborators ([`Connection`], [`Bus`], [`IntrospectionParser`])
//!
//! The seams to the outside world: an outgoing queue for the exporting side,
//! a request/response channel for proxies, and a document parser.
//!
//! # Error Types
//!
//! - [`Error`] - Top-level error type
//! - [`RegistrationError`] - Interface declaration errors
//! - [`DispatchError`] - Exporting-side errors
//! - [`ProxyError`] - Calling-side errors
//! - [`BusError`] - Named errors carried by error replies

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod bus;
mod descriptor;
mod error;
mod message;
mod name;
mod table;
mod value;

// Re-exports
pub use bus::{Bus, Connection, DynBus, IntrospectionParser, MatchRule, Node, SignalHandler};
pub use descriptor::{Arg, Interface, Method, Signal};
pub use error::{
    BoxError, BusError, DispatchError, Error, NameError, ProxyError, RegistrationError,
    error_name,
};
pub use message::{Message, MessageFlags, MessageType};
pub use name::{MAX_NAME_LEN, ObjectPath, validate_interface_name, validate_member_name};
pub use table::InterfaceTable;
pub use value::{ArgError, Args, FromValue, IntoReturn, Value};
