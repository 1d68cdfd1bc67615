//! # Interface Registration
//!
//! A type declares the interfaces it exports with a [`Registrar`]: open an
//! interface scope, declare methods (each bound to a handler) and signals,
//! close the scope. [`Registrar::finish`] freezes the result into a
//! [`Registration`], which [`ExportedObject`] consults on every call.
//!
//! The registrar is an ordinary value owned by the code defining one type, so
//! the interface currently in scope is never visible to another thread.
//! Types usually keep their registration in a process-wide once-cell (see
//! [`Exportable`]), which serializes concurrent first use.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut registrar = Registrar::<Player>::new();
//! registrar.interface("org.example.Player", |r| {
//!     r.method("Play", &["s"], &[], |p: &Player, args: Args| p.play(args.get(0)?))?
//!         .signal("Stopped", &["u"])?;
//!     Ok(())
//! })?;
//! let registration = registrar.finish();
//! ```
//!
//! [`ExportedObject`]: crate::ExportedObject

use busk_core::{
    Args, BoxError, Interface, InterfaceTable, IntoReturn, Method, NameError, RegistrationError,
    Signal, Value, validate_interface_name,
};
use std::{collections::HashMap, fmt, sync::Arc};

/// A handler bound to one method of one interface.
pub type MethodHandler<T> = Arc<dyn Fn(&T, Args) -> Result<Vec<Value>, BoxError> + Send + Sync>;

/// Structured handler key, so same-named methods of different interfaces never
/// collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodKey {
    /// Interface name.
    pub interface: String,
    /// Method name.
    pub member: String,
}

impl MethodKey {
    /// Build a key.
    pub fn new(interface: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            member: member.into(),
        }
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.interface, self.member)
    }
}

/// A type whose instances can be exported on a bus.
pub trait Exportable: Send + Sync + Sized + 'static {
    /// The frozen registration shared by every instance of the type.
    fn registration() -> &'static Registration<Self>;
}

/// The frozen interfaces and handlers of one exportable type.
pub struct Registration<T> {
    table: InterfaceTable,
    handlers: HashMap<MethodKey, MethodHandler<T>>,
}

impl<T> Registration<T> {
    /// The interface table of the type.
    pub fn table(&self) -> &InterfaceTable {
        &self.table
    }

    /// The handler bound to `interface.member`.
    pub fn handler(&self, interface: &str, member: &str) -> Option<&MethodHandler<T>> {
        self.handlers.get(&MethodKey::new(interface, member))
    }

    /// Number of bound handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl<T> Clone for Registration<T> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            handlers: self.handlers.clone(),
        }
    }
}

impl<T> fmt::Debug for Registration<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.handlers.keys().collect();
        keys.sort();
        f.debug_struct("Registration")
            .field("table", &self.table)
            .field("handlers", &keys)
            .finish()
    }
}

/// The definition-time context of one exportable type.
pub struct Registrar<T> {
    table: InterfaceTable,
    handlers: HashMap<MethodKey, MethodHandler<T>>,
    current: Option<String>,
}

impl<T: 'static> Default for Registrar<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Registrar<T> {
    /// A registrar starting from an empty table.
    pub fn new() -> Self {
        Self {
            table: InterfaceTable::new(),
            handlers: HashMap::new(),
            current: None,
        }
    }

    /// A registrar for a type that extends `P`.
    ///
    /// The new type starts with every interface of `parent` (shared, copied on
    /// first write) and every parent handler, invoked on the part of `T` that
    /// `project` selects. Later declarations never affect `parent`.
    pub fn inherit<P: 'static>(parent: &Registration<P>, project: fn(&T) -> &P) -> Self {
        let handlers = parent
            .handlers
            .iter()
            .map(|(key, handler)| {
                let handler = Arc::clone(handler);
                let lifted: MethodHandler<T> =
                    Arc::new(move |obj: &T, args: Args| handler(project(obj), args));
                (key.clone(), lifted)
            })
            .collect();
        Self {
            table: parent.table.inherit(),
            handlers,
            current: None,
        }
    }

    /// Open the scope of `name`; later declarations attach to it.
    pub fn begin_interface(&mut self, name: &str) -> Result<&mut Self, RegistrationError> {
        if let Some(open) = &self.current {
            return Err(RegistrationError::ScopeAlreadyOpen {
                open: open.clone(),
                requested: name.to_owned(),
            });
        }
        validate_interface_name(name)?;
        if !self.table.contains(name) {
            self.table.insert(Interface::new(name)?);
        }
        self.current = Some(name.to_owned());
        Ok(self)
    }

    /// Close the current scope.
    pub fn end_interface(&mut self) -> &mut Self {
        self.current = None;
        self
    }

    /// The interface currently in scope.
    pub fn current_interface(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Run `declare` inside the scope of `name`.
    ///
    /// The scope is closed again whether or not `declare` succeeds.
    pub fn interface<F>(&mut self, name: &str, declare: F) -> Result<&mut Self, RegistrationError>
    where
        F: FnOnce(&mut Self) -> Result<(), RegistrationError>,
    {
        self.begin_interface(name)?;
        let result = declare(&mut *self);
        self.end_interface();
        result?;
        Ok(self)
    }

    /// Declare a method with unnamed input and output signatures.
    pub fn method<F, R>(
        &mut self,
        name: &str,
        inputs: &[&str],
        outputs: &[&str],
        handler: F,
    ) -> Result<&mut Self, RegistrationError>
    where
        F: Fn(&T, Args) -> R + Send + Sync + 'static,
        R: IntoReturn,
    {
        let method = self.in_scope(name, || Method::from_signatures(name, inputs, outputs))?;
        self.bind(method, handler)
    }

    /// Declare a method from a prototype such as `"in name:s, out ok:b"`.
    pub fn method_proto<F, R>(
        &mut self,
        name: &str,
        prototype: &str,
        handler: F,
    ) -> Result<&mut Self, RegistrationError>
    where
        F: Fn(&T, Args) -> R + Send + Sync + 'static,
        R: IntoReturn,
    {
        let method = self.in_scope(name, || Method::from_prototype(name, prototype))?;
        self.bind(method, handler)
    }

    /// Declare a signal with unnamed parameter signatures.
    pub fn signal(&mut self, name: &str, args: &[&str]) -> Result<&mut Self, RegistrationError> {
        let signal = self.in_scope(name, || Signal::from_signatures(name, args))?;
        let interface = self.scope(name)?.to_owned();
        self.table.entry_mut(&interface)?.add_signal(signal);
        Ok(self)
    }

    /// Freeze the declarations.
    pub fn finish(self) -> Registration<T> {
        Registration {
            table: self.table,
            handlers: self.handlers,
        }
    }

    fn scope(&self, declaration: &str) -> Result<&str, RegistrationError> {
        self.current
            .as_deref()
            .ok_or_else(|| RegistrationError::UndefinedInterface(declaration.to_owned()))
    }

    // The scope is checked before the descriptor is built, so a declaration
    // outside any interface reports `UndefinedInterface` even if its name is
    // also malformed.
    fn in_scope<D>(
        &self,
        name: &str,
        build: impl FnOnce() -> Result<D, NameError>,
    ) -> Result<D, RegistrationError> {
        self.scope(name)?;
        Ok(build()?)
    }

    fn bind<F, R>(&mut self, method: Method, handler: F) -> Result<&mut Self, RegistrationError>
    where
        F: Fn(&T, Args) -> R + Send + Sync + 'static,
        R: IntoReturn,
    {
        let interface = self.scope(method.name())?.to_owned();
        let key = MethodKey::new(interface.as_str(), method.name());
        self.table.entry_mut(&interface)?.add_method(method);

        #[cfg(feature = "tracing")]
        tracing::trace!(method = %key, "bound method handler");

        let handler: MethodHandler<T> =
            Arc::new(move |obj: &T, args: Args| handler(obj, args).into_return());
        self.handlers.insert(key, handler);
        Ok(self)
    }
}
