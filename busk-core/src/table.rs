//! Per-type interface tables.

use crate::{
    descriptor::{Interface, escape},
    error::NameError,
};
use std::{collections::BTreeMap, fmt::Write, sync::Arc};

/// An ordered mapping from interface name to [`Interface`].
///
/// Interfaces are reference counted so a table derived with
/// [`inherit`](Self::inherit) shares them with its parent until it writes to
/// one. The first write through [`entry_mut`](Self::entry_mut) clones the
/// shared interface, so a derived table never alters the table it came from.
#[derive(Debug, Clone, Default)]
pub struct InterfaceTable {
    interfaces: BTreeMap<String, Arc<Interface>>,
}

impl InterfaceTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table for a derived type, sharing every interface with `self`.
    pub fn inherit(&self) -> Self {
        self.clone()
    }

    /// Look up an interface.
    pub fn get(&self, name: &str) -> Option<&Interface> {
        self.interfaces.get(name).map(Arc::as_ref)
    }

    /// Look up an interface with its shared handle.
    pub fn get_shared(&self, name: &str) -> Option<&Arc<Interface>> {
        self.interfaces.get(name)
    }

    /// Whether the interface exists.
    pub fn contains(&self, name: &str) -> bool {
        self.interfaces.contains_key(name)
    }

    /// Mutable access to an interface, creating it when absent.
    ///
    /// An interface still shared with another table is cloned first.
    pub fn entry_mut(&mut self, name: &str) -> Result<&mut Interface, NameError> {
        if !self.interfaces.contains_key(name) {
            let interface = Interface::new(name)?;
            self.interfaces.insert(name.to_owned(), Arc::new(interface));
        }
        let shared = self
            .interfaces
            .get_mut(name)
            .ok_or_else(|| NameError::Interface(name.to_owned()))?;
        Ok(Arc::make_mut(shared))
    }

    /// Insert a complete interface, replacing any interface of the same name.
    pub fn insert(&mut self, interface: Interface) -> Option<Arc<Interface>> {
        self.interfaces
            .insert(interface.name().to_owned(), Arc::new(interface))
    }

    /// Whether both tables hold the very same interface object for `name`.
    pub fn shares(&self, other: &InterfaceTable, name: &str) -> bool {
        match (self.interfaces.get(name), other.interfaces.get(name)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Interface names, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.interfaces.keys().map(String::as_str)
    }

    /// Interfaces, in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Interface> {
        self.interfaces.values().map(Arc::as_ref)
    }

    /// Number of interfaces.
    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    /// Render a complete introspection document for an object at `path`.
    ///
    /// `extra` interfaces (such as the introspection interface itself) come
    /// first, followed by the table's own; `children` become `<node/>` entries.
    pub fn to_xml<'i, 'c>(
        &self,
        path: &str,
        extra: impl IntoIterator<Item = &'i Interface>,
        children: impl IntoIterator<Item = &'c str>,
    ) -> String {
        let mut out = String::from(INTROSPECT_DOCTYPE);
        let _ = writeln!(out, "<node name=\"{}\">", escape(path));
        for interface in extra {
            interface.write_xml(&mut out);
        }
        for interface in self.iter() {
            interface.write_xml(&mut out);
        }
        for child in children {
            let _ = writeln!(out, "  <node name=\"{}\"/>", escape(child));
        }
        out.push_str("</node>\n");
        out
    }
}

const INTROSPECT_DOCTYPE: &str = "<!DOCTYPE node PUBLIC \"-//freedesktop//DTD D-BUS Object Introspection 1.0//EN\"\n\"http://www.freedesktop.org/standards/dbus/1.0/introspect.dtd\">\n";
