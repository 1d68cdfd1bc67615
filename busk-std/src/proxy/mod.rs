//! # Proxies
//!
//! A [`ProxyObject`] is the client-side handle of a remote object. It learns
//! the object's interfaces by introspection, once, on first need:
//!
//! ```text
//! ProxyObject::call("Play")
//!     ├── not introspected? ── Bus::introspect ─► IntrospectionParser ─► cache + shortcuts
//!     ├── "Play" is a shortcut? ── forward to its interface
//!     ├── default interface present? ── forward there
//!     └── otherwise ── ProxyError::NoMethod
//! ```
//!
//! Introspection replaces shortcut bindings wholesale; lookups through
//! [`ProxyObject::interface`] never consult shortcuts.

mod api;
mod interface;
mod shortcut;

pub use api::{ApiOptions, Output};
pub use interface::{PROPERTIES, ProxyInterface};
pub use shortcut::{RESERVED_NAMES, Shortcuts};

use busk_core::{
    Args, DynBus, Interface, IntrospectionParser, ObjectPath, ProxyError, Value,
};
use futures::executor::block_on;
use interface::Binding;
use std::{collections::BTreeMap, sync::Arc};

/// Client-side handle of a remote object.
pub struct ProxyObject {
    binding: Arc<Binding>,
    parser: Arc<dyn IntrospectionParser>,
    introspected: bool,
    interfaces: BTreeMap<String, ProxyInterface>,
    subnodes: Vec<String>,
    default_iface: Option<String>,
    shortcuts: Shortcuts,
}

impl ProxyObject {
    /// A proxy for `path` on `destination`, not yet introspected.
    pub fn new(
        bus: Arc<dyn DynBus>,
        parser: Arc<dyn IntrospectionParser>,
        destination: impl Into<String>,
        path: ObjectPath,
    ) -> Self {
        Self {
            binding: Arc::new(Binding {
                bus,
                destination: destination.into(),
                path,
                api: ApiOptions::default(),
            }),
            parser,
            introspected: false,
            interfaces: BTreeMap::new(),
            subnodes: Vec::new(),
            default_iface: None,
            shortcuts: Shortcuts::default(),
        }
    }

    /// Use `api` to shape return values.
    pub fn with_api(mut self, api: ApiOptions) -> Self {
        Arc::make_mut(&mut self.binding).api = api;
        for iface in self.interfaces.values_mut() {
            iface.rebind(Arc::clone(&self.binding));
        }
        self
    }

    /// Forward unresolved names to `interface`.
    pub fn with_default_iface(mut self, interface: impl Into<String>) -> Self {
        self.set_default_iface(Some(interface.into()));
        self
    }

    /// Set or clear the default interface.
    pub fn set_default_iface(&mut self, interface: Option<String>) {
        self.default_iface = interface;
    }

    /// The configured default interface, present or not.
    pub fn default_iface(&self) -> Option<&str> {
        self.default_iface.as_deref()
    }

    /// Bus name of the remote peer.
    pub fn destination(&self) -> &str {
        &self.binding.destination
    }

    /// Path of the remote object.
    pub fn path(&self) -> &ObjectPath {
        &self.binding.path
    }

    /// Return-value shaping in effect.
    pub fn api(&self) -> ApiOptions {
        self.binding.api
    }

    /// Whether introspection has run at least once.
    pub fn is_introspected(&self) -> bool {
        self.introspected
    }

    /// Child node names from the last introspection.
    pub fn subnodes(&self) -> &[String] {
        &self.subnodes
    }

    /// Shortcut bindings from the last introspection.
    pub fn shortcuts(&self) -> &Shortcuts {
        &self.shortcuts
    }

    /// The interface a shortcut name forwards to.
    pub fn shortcut(&self, name: &str) -> Option<&str> {
        self.shortcuts.get(name)
    }

    /// Introspect the remote object, blocking until the document arrives.
    ///
    /// See [`ProxyObject::introspect_async`].
    pub fn introspect(&mut self) -> Result<String, ProxyError> {
        block_on(self.introspect_async())
    }

    /// Fetch and parse the introspection document and rebuild the cache.
    ///
    /// Always queries the bus. Interfaces in the document replace cached
    /// entries of the same name, and every cached entry absent from the
    /// document is kept. Shortcuts are recomputed over the whole cache, so
    /// kept entries still count toward ambiguity. Returns the raw document.
    pub async fn introspect_async(&mut self) -> Result<String, ProxyError> {
        let document = self
            .binding
            .bus
            .introspect(&self.binding.destination, &self.binding.path)
            .await
            .map_err(ProxyError::Bus)?;
        let node = self.parser.parse(&document).map_err(ProxyError::Parse)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            destination = %self.binding.destination,
            path = %self.binding.path,
            interfaces = node.interfaces.len(),
            subnodes = node.subnodes.len(),
            "introspected remote object"
        );

        for descriptor in node.interfaces {
            self.insert(descriptor);
        }
        self.subnodes = node.subnodes;
        self.introspected = true;
        self.shortcuts = Shortcuts::resolve(
            self.interfaces.values().map(ProxyInterface::descriptor),
            RESERVED_NAMES,
        );
        Ok(document)
    }

    /// Every interface of the remote object, introspecting on first use.
    pub fn interfaces(&mut self) -> Result<impl Iterator<Item = &ProxyInterface>, ProxyError> {
        self.ensure_introspected()?;
        Ok(self.interfaces.values())
    }

    /// The interface called `name`, introspecting on first use.
    pub fn interface(&mut self, name: &str) -> Result<Option<&ProxyInterface>, ProxyError> {
        self.ensure_introspected()?;
        Ok(self.interfaces.get(name))
    }

    /// Whether the remote object has interface `name`, introspecting on first
    /// use.
    pub fn has_iface(&mut self, name: &str) -> Result<bool, ProxyError> {
        self.ensure_introspected()?;
        Ok(self.interfaces.contains_key(name))
    }

    /// Add an interface without introspecting.
    ///
    /// Shortcuts are left as they are until the next introspection.
    pub fn set_interface(&mut self, descriptor: Interface) -> Option<ProxyInterface> {
        self.insert(descriptor)
    }

    /// Call `name` through a shortcut or the default interface, blocking
    /// until the reply arrives.
    pub fn call(&mut self, name: &str, args: Vec<Value>) -> Result<Output, ProxyError> {
        block_on(self.call_async(name, args))
    }

    /// Call `name` through a shortcut or the default interface.
    ///
    /// A shortcut wins over the default interface. A name the default
    /// interface does not declare fails with [`ProxyError::NoMethod`] naming
    /// that interface; every other failure propagates unchanged.
    pub async fn call_async(&mut self, name: &str, args: Vec<Value>) -> Result<Output, ProxyError> {
        if !self.introspected {
            self.introspect_async().await?;
        }

        if let Some(target) = self.shortcuts.get(name).and_then(|i| self.interfaces.get(i)) {
            let target = target.clone();
            return target.call_async(name, args).await;
        }

        let Some(target) = self.usable_default().cloned() else {
            return Err(self.no_method(name, None));
        };
        match target.call_async(name, args).await {
            Err(ProxyError::UnknownMember { .. }) => {
                Err(self.no_method(name, Some(target.name().to_owned())))
            }
            other => other,
        }
    }

    /// Run `handler` for every `name` signal of the default interface.
    pub fn on_signal<F>(&mut self, name: &str, handler: F) -> Result<(), ProxyError>
    where
        F: Fn(Args) + Send + Sync + 'static,
    {
        self.ensure_introspected()?;
        match self.usable_default() {
            Some(target) => target.on_signal(name, handler),
            None => Err(ProxyError::NoSignal {
                path: self.binding.path.to_string(),
                name: name.to_owned(),
                interface: self.default_iface.clone(),
            }),
        }
    }

    fn ensure_introspected(&mut self) -> Result<(), ProxyError> {
        if !self.introspected {
            self.introspect()?;
        }
        Ok(())
    }

    fn insert(&mut self, descriptor: Interface) -> Option<ProxyInterface> {
        let name = descriptor.name().to_owned();
        let iface = ProxyInterface::new(Arc::new(descriptor), Arc::clone(&self.binding));
        self.interfaces.insert(name, iface)
    }

    fn usable_default(&self) -> Option<&ProxyInterface> {
        self.default_iface
            .as_deref()
            .and_then(|name| self.interfaces.get(name))
    }

    fn no_method(&self, name: &str, interface: Option<String>) -> ProxyError {
        #[cfg(feature = "tracing")]
        tracing::debug!(path = %self.binding.path, name, "no method to forward to");

        ProxyError::NoMethod {
            path: self.binding.path.to_string(),
            name: name.to_owned(),
            interface,
        }
    }
}

impl std::fmt::Debug for ProxyObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyObject")
            .field("destination", &self.binding.destination)
            .field("path", &self.binding.path)
            .field("introspected", &self.introspected)
            .field("interfaces", &self.interfaces.keys().collect::<Vec<_>>())
            .field("default_iface", &self.default_iface)
            .finish()
    }
}
