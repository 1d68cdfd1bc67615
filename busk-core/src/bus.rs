//! # Collaborator traits
//!
//! The routing layer never touches sockets. It talks to three collaborators:
//!
//! - [`Connection`]: the exporting side's outgoing message queue.
//! - [`Bus`]: the calling side's request/response channel and signal router.
//! - [`IntrospectionParser`]: turns an introspection document into
//!   [`Interface`] descriptors.
//!
//! [`Bus`] is async; [`DynBus`] is its object-safe form, implemented for every
//! `Bus` so proxies can hold an `Arc<dyn DynBus>`.

use crate::{
    descriptor::Interface,
    error::BoxError,
    message::{Message, MessageType},
    name::ObjectPath,
};
use std::{fmt, future::Future, pin::Pin, sync::Arc};

/// The outgoing side of a bus connection.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot carry outgoing messages",
    label = "missing `Connection` implementation",
    note = "Implement `Connection::send` to queue replies and signals."
)]
pub trait Connection: Send + Sync {
    /// Queue a message for delivery.
    fn send(&self, message: Message) -> Result<(), BoxError>;
}

impl<C: Connection + ?Sized> Connection for Arc<C> {
    fn send(&self, message: Message) -> Result<(), BoxError> {
        (**self).send(message)
    }
}

/// Callback invoked for every signal matching a registered [`MatchRule`].
pub type SignalHandler = Box<dyn Fn(&Message) + Send + Sync>;

/// Selects the signals a handler receives.
///
/// Unset fields match anything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchRule {
    /// Message kind.
    pub message_type: Option<MessageType>,
    /// Sender bus name.
    pub sender: Option<String>,
    /// Object path.
    pub path: Option<ObjectPath>,
    /// Interface name.
    pub interface: Option<String>,
    /// Member name.
    pub member: Option<String>,
}

impl MatchRule {
    /// A rule for one signal of one remote object.
    pub fn signal(
        sender: impl Into<String>,
        path: ObjectPath,
        interface: impl Into<String>,
        member: impl Into<String>,
    ) -> Self {
        Self {
            message_type: Some(MessageType::Signal),
            sender: Some(sender.into()),
            path: Some(path),
            interface: Some(interface.into()),
            member: Some(member.into()),
        }
    }

    /// Whether `message` satisfies every set field.
    pub fn matches(&self, message: &Message) -> bool {
        fn field(rule: Option<&str>, actual: Option<&str>) -> bool {
            rule.is_none_or(|expected| actual == Some(expected))
        }

        self.message_type
            .is_none_or(|kind| kind == message.message_type())
            && field(self.sender.as_deref(), message.sender())
            && self.path.as_ref().is_none_or(|p| message.path() == Some(p))
            && field(self.interface.as_deref(), message.interface())
            && field(self.member.as_deref(), message.member())
    }
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(kind) = self.message_type {
            parts.push(format!("type='{kind}'"));
        }
        if let Some(sender) = &self.sender {
            parts.push(format!("sender='{sender}'"));
        }
        if let Some(path) = &self.path {
            parts.push(format!("path='{path}'"));
        }
        if let Some(interface) = &self.interface {
            parts.push(format!("interface='{interface}'"));
        }
        if let Some(member) = &self.member {
            parts.push(format!("member='{member}'"));
        }
        f.write_str(&parts.join(","))
    }
}

/// The calling side of a bus connection.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot serve as a bus",
    label = "missing `Bus` implementation",
    note = "Implement `introspect`, `call` and `add_match` for `{Self}`."
)]
pub trait Bus: Send + Sync {
    /// Fetch the introspection document of `path` on `destination`.
    fn introspect(
        &self,
        destination: &str,
        path: &ObjectPath,
    ) -> impl Future<Output = Result<String, BoxError>> + Send;

    /// Send a method call and wait for its reply (return or error).
    fn call(&self, message: Message) -> impl Future<Output = Result<Message, BoxError>> + Send;

    /// Route signals matching `rule` to `handler`.
    fn add_match(&self, rule: MatchRule, handler: SignalHandler) -> Result<(), BoxError>;
}

/// Object-safe version of [`Bus`].
pub trait DynBus: Send + Sync {
    /// See [`Bus::introspect`].
    fn introspect<'a>(
        &'a self,
        destination: &'a str,
        path: &'a ObjectPath,
    ) -> Pin<Box<dyn Future<Output = Result<String, BoxError>> + Send + 'a>>;

    /// See [`Bus::call`].
    fn call<'a>(
        &'a self,
        message: Message,
    ) -> Pin<Box<dyn Future<Output = Result<Message, BoxError>> + Send + 'a>>;

    /// See [`Bus::add_match`].
    fn add_match(&self, rule: MatchRule, handler: SignalHandler) -> Result<(), BoxError>;
}

impl<T: Bus> DynBus for T {
    fn introspect<'a>(
        &'a self,
        destination: &'a str,
        path: &'a ObjectPath,
    ) -> Pin<Box<dyn Future<Output = Result<String, BoxError>> + Send + 'a>> {
        Box::pin(Bus::introspect(self, destination, path))
    }

    fn call<'a>(
        &'a self,
        message: Message,
    ) -> Pin<Box<dyn Future<Output = Result<Message, BoxError>> + Send + 'a>> {
        Box::pin(Bus::call(self, message))
    }

    fn add_match(&self, rule: MatchRule, handler: SignalHandler) -> Result<(), BoxError> {
        Bus::add_match(self, rule, handler)
    }
}

/// A parsed introspection document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    /// Interfaces of the node itself.
    pub interfaces: Vec<Interface>,
    /// Names of the direct child nodes.
    pub subnodes: Vec<String>,
}

/// Turns an introspection document into descriptors.
pub trait IntrospectionParser: Send + Sync {
    /// Parse `document`.
    fn parse(&self, document: &str) -> Result<Node, BoxError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> ObjectPath {
        ObjectPath::new("/org/example/Player").unwrap()
    }

    #[test]
    fn test_match_rule_matches_signal() {
        let rule = MatchRule::signal(":1.7", path(), "org.example.Player", "Stopped");
        let hit = Message::signal(path(), "org.example.Player", "Stopped").with_sender(":1.7");
        let other_member = Message::signal(path(), "org.example.Player", "Started").with_sender(":1.7");
        let other_sender = Message::signal(path(), "org.example.Player", "Stopped").with_sender(":1.8");

        assert!(rule.matches(&hit));
        assert!(!rule.matches(&other_member));
        assert!(!rule.matches(&other_sender));
    }

    #[test]
    fn test_empty_rule_matches_everything() {
        let call = Message::method_call(path(), "org.example.Player", "Play");
        assert!(MatchRule::default().matches(&call));
    }

    #[test]
    fn test_match_rule_display() {
        let rule = MatchRule::signal(":1.7", path(), "org.example.Player", "Stopped");
        assert_eq!(
            rule.to_string(),
            "type='signal',sender=':1.7',path='/org/example/Player',interface='org.example.Player',member='Stopped'"
        );
    }
}
