//! Unambiguous method names across a proxy's interfaces.

use busk_core::Interface;
use std::collections::{BTreeMap, BTreeSet};

/// Names of the proxy's own operations. A remote method with one of these
/// names is never turned into a shortcut.
pub const RESERVED_NAMES: &[&str] = &[
    "api",
    "call",
    "call_async",
    "default_iface",
    "destination",
    "has_iface",
    "interface",
    "interfaces",
    "introspect",
    "introspect_async",
    "is_introspected",
    "new",
    "on_signal",
    "path",
    "set_default_iface",
    "set_interface",
    "shortcut",
    "shortcuts",
    "subnodes",
    "with_api",
    "with_default_iface",
];

/// Method name → interface bindings for direct calls on a proxy.
///
/// A method becomes a shortcut when exactly one of the proxy's interfaces
/// declares it and its name is not reserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shortcuts {
    bindings: BTreeMap<String, String>,
}

impl Shortcuts {
    /// Compute the shortcuts of `interfaces`, skipping `reserved` names.
    pub fn resolve<'a>(
        interfaces: impl IntoIterator<Item = &'a Interface>,
        reserved: &[&str],
    ) -> Self {
        let mut ambiguous = BTreeSet::new();
        let mut seen_once: BTreeMap<String, String> = BTreeMap::new();

        for interface in interfaces {
            for method in interface.methods() {
                let name = method.name();
                if ambiguous.contains(name) || reserved.contains(&name) {
                    continue;
                }
                match seen_once.get(name) {
                    Some(owner) if owner != interface.name() => {
                        seen_once.remove(name);
                        ambiguous.insert(name.to_owned());
                    }
                    Some(_) => {}
                    None => {
                        seen_once.insert(name.to_owned(), interface.name().to_owned());
                    }
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            shortcuts = seen_once.len(),
            ambiguous = ambiguous.len(),
            "resolved shortcut methods"
        );

        Self {
            bindings: seen_once,
        }
    }

    /// The interface bound to `member`.
    pub fn get(&self, member: &str) -> Option<&str> {
        self.bindings.get(member).map(String::as_str)
    }

    /// Whether `member` is a shortcut.
    pub fn contains(&self, member: &str) -> bool {
        self.bindings.contains_key(member)
    }

    /// `(member, interface)` pairs, ordered by member.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings
            .iter()
            .map(|(member, interface)| (member.as_str(), interface.as_str()))
    }

    /// Number of shortcuts.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether there are no shortcuts.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
