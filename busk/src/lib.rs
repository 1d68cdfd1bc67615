//! # busk - Call Routing and Proxies for a Message Bus
//!
//! `busk` is the routing layer of a message-bus binding. It sits between a
//! transport (which moves [`Message`]s) and application code:
//!
//! - **Exporting**: types declare their interfaces once with a [`Registrar`];
//!   [`ExportedObject`] turns incoming method calls into handler invocations
//!   and replies; [`ObjectServer`] routes calls by path.
//! - **Calling**: [`ProxyObject`] introspects a remote object on first need,
//!   caches its interfaces and forwards calls by shortcut or default
//!   interface.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use busk::prelude::*;
//! use std::sync::OnceLock;
//!
//! struct Player;
//!
//! impl Exportable for Player {
//!     fn registration() -> &'static Registration<Self> {
//!         static REGISTRATION: OnceLock<Registration<Player>> = OnceLock::new();
//!         REGISTRATION.get_or_init(|| {
//!             let mut registrar = Registrar::new();
//!             registrar
//!                 .interface("org.example.Player", |r| {
//!                     r.method("Volume", &[], &["u"], |_: &Player, _: Args| 11u32)?;
//!                     Ok(())
//!                 })
//!                 .expect("valid player interface");
//!             registrar.finish()
//!         })
//!     }
//! }
//!
//! let mut server = ObjectServer::new(connection);
//! server.export(ExportedObject::new(ObjectPath::new("/player")?, Player))?;
//! server.process(&incoming)?;
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use busk_core::{
    // Descriptors
    Arg,
    // Values
    ArgError,
    Args,
    // Error types
    BoxError,
    // Collaborators
    Bus,
    BusError,
    Connection,
    DispatchError,
    DynBus,
    Error,
    FromValue,
    Interface,
    InterfaceTable,
    IntoReturn,
    IntrospectionParser,
    // Names
    MAX_NAME_LEN,
    MatchRule,
    // Messages
    Message,
    MessageFlags,
    MessageType,
    Method,
    NameError,
    Node,
    ObjectPath,
    ProxyError,
    RegistrationError,
    Signal,
    SignalHandler,
    Value,
    error_name,
    validate_interface_name,
    validate_member_name,
};

// Exporting side
pub use busk_std::{
    Dispatch, Exportable, ExportedObject, MethodHandler, MethodKey, ObjectServer, Registrar,
    Registration,
};

// Calling side
pub use busk_std::{ApiOptions, Output, ProxyInterface, ProxyObject, Shortcuts};

/// Proxy support module.
pub mod proxy {
    pub use busk_std::proxy::{
        ApiOptions, Output, PROPERTIES, ProxyInterface, ProxyObject, RESERVED_NAMES, Shortcuts,
    };
}

/// Object server support module.
pub mod server {
    pub use busk_std::server::{INTROSPECTABLE, ObjectServer};
}

/// Testing utilities.
pub mod testing {
    pub use busk_std::testing::{MockBus, RecordingConnection, StaticParser};
}

/// Prelude module - common imports for Busk.
///
/// # Usage
///
/// ```rust,ignore
/// use busk::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Values
        Args,
        // Errors
        BoxError,
        // Collaborators
        Bus,
        BusError,
        Connection,
        // Exporting
        Dispatch,
        Exportable,
        ExportedObject,
        Interface,
        IntrospectionParser,
        Message,
        ObjectPath,
        ObjectServer,
        // Calling
        Output,
        ProxyError,
        ProxyObject,
        Registrar,
        Registration,
        Value,
    };
}
