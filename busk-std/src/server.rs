//! Path-based routing of incoming calls to exported objects.

use crate::object::Dispatch;
use busk_core::{
    Arg, Connection, DispatchError, Interface, InterfaceTable, Message, MessageType, Method,
    ObjectPath, Value, error_name,
};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

/// Name of the standard introspection interface.
pub const INTROSPECTABLE: &str = "org.freedesktop.DBus.Introspectable";

/// Owns the exported objects of one connection and routes calls to them by
/// path.
///
/// Besides forwarding to objects, the server answers
/// `org.freedesktop.DBus.Introspectable.Introspect` for every exported path
/// and every intermediate node above one.
pub struct ObjectServer {
    connection: Arc<dyn Connection>,
    objects: BTreeMap<ObjectPath, Box<dyn Dispatch>>,
    introspectable: Interface,
}

impl ObjectServer {
    /// A server replying through `connection`.
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        Self {
            connection,
            objects: BTreeMap::new(),
            introspectable: introspectable_interface(),
        }
    }

    /// Export `object` at its path and bind it to the server's connection.
    pub fn export<D: Dispatch + 'static>(&mut self, mut object: D) -> Result<(), DispatchError> {
        let path = object.path().clone();
        if self.objects.contains_key(&path) {
            return Err(DispatchError::AlreadyExported(path.to_string()));
        }
        object.attach(Arc::clone(&self.connection))?;

        #[cfg(feature = "tracing")]
        tracing::debug!(%path, "exported object");

        self.objects.insert(path, Box::new(object));
        Ok(())
    }

    /// Remove the object at `path`.
    pub fn unexport(&mut self, path: &ObjectPath) -> Option<Box<dyn Dispatch>> {
        self.objects.remove(path)
    }

    /// The object at `path`.
    pub fn get(&self, path: &ObjectPath) -> Option<&dyn Dispatch> {
        self.objects.get(path).map(Box::as_ref)
    }

    /// Emit a declared signal from the object exported at `path`.
    pub fn emit(
        &self,
        path: &ObjectPath,
        interface: &str,
        signal: &str,
        args: Vec<Value>,
    ) -> Result<(), DispatchError> {
        self.objects
            .get(path)
            .ok_or_else(|| DispatchError::NotExported(path.to_string()))?
            .emit(interface, signal, args)
    }

    /// Names of the direct children of `path` that lead to exported objects.
    pub fn subnodes(&self, path: &ObjectPath) -> Vec<String> {
        self.objects
            .keys()
            .filter_map(|exported| path.child_toward(exported))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    /// The introspection document of `path`, or `None` when nothing is
    /// exported at or below it.
    pub fn introspect(&self, path: &ObjectPath) -> Option<String> {
        let children = self.subnodes(path);
        let object = self.objects.get(path);
        if object.is_none() && children.is_empty() {
            return None;
        }
        let empty = InterfaceTable::new();
        let table = object.map_or(&empty, |o| o.interfaces());
        Some(table.to_xml(
            path.as_str(),
            [&self.introspectable],
            children.iter().map(String::as_str),
        ))
    }

    /// Route one incoming message.
    ///
    /// Method calls always get exactly one reply; other message kinds are
    /// ignored.
    pub fn process(&self, message: &Message) -> Result<(), DispatchError> {
        if message.message_type() != MessageType::MethodCall {
            return Ok(());
        }
        let path = message.path().cloned().unwrap_or_else(ObjectPath::root);

        if message.interface() == Some(INTROSPECTABLE) && message.member() == Some("Introspect") {
            if let Some(document) = self.introspect(&path) {
                let reply = Message::method_return(message).with_param("s", document);
                return self.send(reply);
            }
        }

        match self.objects.get(&path) {
            Some(object) => object.dispatch(message),
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!(%path, "call for unknown object");

                self.send(Message::error(
                    message,
                    error_name::UNKNOWN_OBJECT,
                    format!("Object \"{path}\" doesn't exist"),
                ))
            }
        }
    }

    fn send(&self, reply: Message) -> Result<(), DispatchError> {
        self.connection.send(reply).map_err(DispatchError::Send)
    }
}

fn introspectable_interface() -> Interface {
    let introspect = Method::new("Introspect")
        .expect("Introspect is a valid member name")
        .with_output(Arg::new("data", "s"));
    Interface::new(INTROSPECTABLE)
        .expect("the introspection interface name is valid")
        .with_method(introspect)
}
