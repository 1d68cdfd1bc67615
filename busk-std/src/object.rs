//! # Exported Objects
//!
//! An [`ExportedObject`] pairs an instance of an [`Exportable`] type with the
//! path it is reachable at. Incoming method calls are routed through the
//! type's [`Registration`]: interface lookup, member lookup, handler call,
//! reply. Every method call yields exactly one reply, and nothing a handler
//! does (returning an error or panicking) stops the dispatcher.
//!
//! [`Registration`]: crate::Registration

use crate::registration::Exportable;
use busk_core::{
    ArgError, Args, BoxError, BusError, Connection, DispatchError, InterfaceTable, Message,
    MessageType, ObjectPath, Value, error_name,
};
use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

/// Object-safe view of an exported object, used by [`ObjectServer`] to hold
/// objects of different types.
///
/// [`ObjectServer`]: crate::ObjectServer
pub trait Dispatch: Send + Sync {
    /// Path the object is exported at.
    fn path(&self) -> &ObjectPath;

    /// Interfaces of the object's type.
    fn interfaces(&self) -> &InterfaceTable;

    /// The owning connection, once exported.
    fn connection(&self) -> Option<&Arc<dyn Connection>>;

    /// Bind the object to its owning connection. Allowed exactly once.
    fn attach(&mut self, connection: Arc<dyn Connection>) -> Result<(), DispatchError>;

    /// Build the reply to `message`, or `None` if it is not a method call.
    fn handle(&self, message: &Message) -> Option<Message>;

    /// Emit a declared signal through the owning connection.
    fn emit(&self, interface: &str, signal: &str, args: Vec<Value>) -> Result<(), DispatchError>;

    /// Route `message` and queue the reply on the owning connection.
    fn dispatch(&self, message: &Message) -> Result<(), DispatchError> {
        let connection = self
            .connection()
            .ok_or_else(|| DispatchError::NotExported(self.path().to_string()))?;
        match self.handle(message) {
            Some(reply) => connection.send(reply).map_err(DispatchError::Send),
            None => Ok(()),
        }
    }
}

/// An instance of an [`Exportable`] type at a bus path.
pub struct ExportedObject<T: Exportable> {
    path: ObjectPath,
    inner: T,
    connection: Option<Arc<dyn Connection>>,
}

impl<T: Exportable> ExportedObject<T> {
    /// Wrap `inner` for export at `path`.
    pub fn new(path: ObjectPath, inner: T) -> Self {
        Self {
            path,
            inner,
            connection: None,
        }
    }

    /// The wrapped instance.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Whether the object has an owning connection.
    pub fn is_exported(&self) -> bool {
        self.connection.is_some()
    }
}

impl<T: Exportable> Dispatch for ExportedObject<T> {
    fn path(&self) -> &ObjectPath {
        &self.path
    }

    fn interfaces(&self) -> &InterfaceTable {
        T::registration().table()
    }

    fn connection(&self) -> Option<&Arc<dyn Connection>> {
        self.connection.as_ref()
    }

    fn attach(&mut self, connection: Arc<dyn Connection>) -> Result<(), DispatchError> {
        if self.connection.is_some() {
            return Err(DispatchError::AlreadyExported(self.path.to_string()));
        }
        self.connection = Some(connection);
        Ok(())
    }

    fn handle(&self, message: &Message) -> Option<Message> {
        if message.message_type() != MessageType::MethodCall {
            return None;
        }

        let registration = T::registration();
        let path = message.path().unwrap_or(&self.path);
        let interface = message.interface().unwrap_or_default();
        let member = message.member().unwrap_or_default();

        let Some(descriptor) = registration.table().get(interface) else {
            return Some(unknown_method(
                message,
                format!("Interface \"{interface}\" of object \"{path}\" doesn't exist"),
            ));
        };
        let (Some(method), Some(handler)) = (
            descriptor.method(member),
            registration.handler(interface, member),
        ) else {
            return Some(unknown_method(
                message,
                format!(
                    "Method \"{member}\" on interface \"{interface}\" of object \"{path}\" doesn't exist"
                ),
            ));
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(%path, interface, member, "dispatching method call");

        let args = Args::new(message.params().to_vec());
        let outcome = catch_unwind(AssertUnwindSafe(|| handler(&self.inner, args)))
            .unwrap_or_else(|payload| Err(panic_error(payload)));

        match outcome {
            Ok(values) => {
                let mut reply = Message::method_return(message);
                // Extra values and missing values are both dropped by the zip.
                for (arg, value) in method.outputs().iter().zip(values) {
                    reply.add_param(arg.signature.as_str(), value);
                }
                Some(reply)
            }
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(%path, interface, member, error = %err, "method handler failed");

                Some(failure_reply(message, err))
            }
        }
    }

    fn emit(&self, interface: &str, signal: &str, args: Vec<Value>) -> Result<(), DispatchError> {
        let connection = self
            .connection
            .as_ref()
            .ok_or_else(|| DispatchError::NotExported(self.path.to_string()))?;
        let declared = T::registration()
            .table()
            .get(interface)
            .and_then(|i| i.signal(signal))
            .ok_or_else(|| DispatchError::UnknownSignal {
                interface: interface.to_owned(),
                signal: signal.to_owned(),
            })?;
        if declared.args().len() != args.len() {
            return Err(DispatchError::SignalArguments {
                signal: signal.to_owned(),
                expected: declared.args().len(),
                given: args.len(),
            });
        }

        let mut message = Message::signal(self.path.clone(), interface, signal);
        for (arg, value) in declared.args().iter().zip(args) {
            message.add_param(arg.signature.as_str(), value);
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(path = %self.path, interface, signal, "emitting signal");

        connection.send(message).map_err(DispatchError::Send)
    }
}

fn unknown_method(call: &Message, text: String) -> Message {
    Message::error(call, error_name::UNKNOWN_METHOD, text)
}

/// Convert a handler failure into an error reply annotated with the call.
///
/// A [`BusError`] keeps its own name, an [`ArgError`] becomes `InvalidArgs`,
/// anything else becomes `Failed`.
fn failure_reply(call: &Message, err: BoxError) -> Message {
    let (name, text) = if let Some(bus) = err.downcast_ref::<BusError>() {
        (bus.name.clone(), bus.message.clone())
    } else if err.downcast_ref::<ArgError>().is_some() {
        (error_name::INVALID_ARGS.to_owned(), err.to_string())
    } else {
        (error_name::FAILED.to_owned(), err.to_string())
    };
    Message::error(call, name, format!("{text}; caused by {call}"))
}

fn panic_error(payload: Box<dyn Any + Send>) -> BoxError {
    let text = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_owned());
    format!("method handler panicked: {text}").into()
}
