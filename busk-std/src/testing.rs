//! Test doubles for the bus collaborators.
//!
//! - [`RecordingConnection`]: a [`Connection`] that keeps every sent message.
//! - [`MockBus`]: a [`Bus`] with canned introspection documents, scripted
//!   call replies and in-process signal delivery.
//! - [`StaticParser`]: an [`IntrospectionParser`] backed by a lookup table.

use busk_core::{
    BoxError, Bus, Connection, IntrospectionParser, MatchRule, Message, Node, ObjectPath,
    SignalHandler,
};
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

// ============================================================================
// Recording Connection
// ============================================================================

/// A connection that records every message it is asked to send.
///
/// Clones share the same record.
///
/// # Example
///
/// ```rust,ignore
/// let connection = RecordingConnection::new();
/// server = ObjectServer::new(Arc::new(connection.clone()));
///
/// server.process(&call)?;
/// assert_eq!(connection.count(), 1);
/// ```
#[derive(Clone, Default)]
pub struct RecordingConnection {
    sent: Arc<Mutex<Vec<Message>>>,
}

impl RecordingConnection {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of every message sent so far.
    pub fn messages(&self) -> Vec<Message> {
        self.sent.lock().unwrap().clone()
    }

    /// Drain the record.
    pub fn take(&self) -> Vec<Message> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    /// Number of messages sent so far.
    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// The most recent message.
    pub fn last(&self) -> Option<Message> {
        self.sent.lock().unwrap().last().cloned()
    }
}

impl Connection for RecordingConnection {
    fn send(&self, message: Message) -> Result<(), BoxError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

// ============================================================================
// Mock Bus
// ============================================================================

type Responder = Arc<dyn Fn(&Message) -> Result<Message, BoxError> + Send + Sync>;

/// An in-process bus for proxy tests.
///
/// Introspection documents are registered per `(destination, path)` and the
/// number of introspection requests is counted. Method calls are answered by
/// a responder closure (by default an empty method return). Signals passed to
/// [`MockBus::emit_signal`] reach every handler whose rule matches.
///
/// Clones share all state.
#[derive(Clone)]
pub struct MockBus {
    documents: Arc<Mutex<HashMap<(String, String), String>>>,
    responder: Responder,
    introspections: Arc<AtomicUsize>,
    calls: Arc<Mutex<Vec<Message>>>,
    matches: Arc<Mutex<Vec<(MatchRule, SignalHandler)>>>,
}

impl MockBus {
    /// A bus with no documents that answers every call with an empty return.
    pub fn new() -> Self {
        Self {
            documents: Arc::new(Mutex::new(HashMap::new())),
            responder: Arc::new(|call| Ok(Message::method_return(call))),
            introspections: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            matches: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Serve `document` for `path` on `destination`.
    pub fn with_document(
        self,
        destination: impl Into<String>,
        path: &str,
        document: impl Into<String>,
    ) -> Self {
        self.set_document(destination, path, document);
        self
    }

    /// Replace the document served for `path` on `destination`.
    pub fn set_document(
        &self,
        destination: impl Into<String>,
        path: &str,
        document: impl Into<String>,
    ) {
        self.documents
            .lock()
            .unwrap()
            .insert((destination.into(), path.to_owned()), document.into());
    }

    /// Answer method calls with `responder`.
    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&Message) -> Result<Message, BoxError> + Send + Sync + 'static,
    {
        self.responder = Arc::new(responder);
        self
    }

    /// Number of introspection requests served or refused.
    pub fn introspect_count(&self) -> usize {
        self.introspections.load(Ordering::SeqCst)
    }

    /// Every method call received so far.
    pub fn calls(&self) -> Vec<Message> {
        self.calls.lock().unwrap().clone()
    }

    /// The most recent method call.
    pub fn last_call(&self) -> Option<Message> {
        self.calls.lock().unwrap().last().cloned()
    }

    /// Rules registered through [`Bus::add_match`].
    pub fn match_rules(&self) -> Vec<MatchRule> {
        self.matches
            .lock()
            .unwrap()
            .iter()
            .map(|(rule, _)| rule.clone())
            .collect()
    }

    /// Deliver `signal` to every matching handler; returns how many ran.
    pub fn emit_signal(&self, signal: &Message) -> usize {
        let matches = self.matches.lock().unwrap();
        let mut delivered = 0;
        for (rule, handler) in matches.iter() {
            if rule.matches(signal) {
                handler(signal);
                delivered += 1;
            }
        }
        delivered
    }
}

impl Default for MockBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for MockBus {
    async fn introspect(&self, destination: &str, path: &ObjectPath) -> Result<String, BoxError> {
        self.introspections.fetch_add(1, Ordering::SeqCst);
        self.documents
            .lock()
            .unwrap()
            .get(&(destination.to_owned(), path.as_str().to_owned()))
            .cloned()
            .ok_or_else(|| format!("no introspection data for {destination} at {path}").into())
    }

    async fn call(&self, message: Message) -> Result<Message, BoxError> {
        self.calls.lock().unwrap().push(message.clone());
        (self.responder)(&message)
    }

    fn add_match(&self, rule: MatchRule, handler: SignalHandler) -> Result<(), BoxError> {
        self.matches.lock().unwrap().push((rule, handler));
        Ok(())
    }
}

// ============================================================================
// Static Parser
// ============================================================================

/// A parser that looks documents up in a table instead of reading XML.
///
/// # Example
///
/// ```rust,ignore
/// let parser = StaticParser::new().with("player", Node {
///     interfaces: vec![player_interface()],
///     subnodes: vec![],
/// });
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticParser {
    nodes: HashMap<String, Node>,
}

impl StaticParser {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `document` as `node`.
    pub fn with(mut self, document: impl Into<String>, node: Node) -> Self {
        self.nodes.insert(document.into(), node);
        self
    }
}

impl IntrospectionParser for StaticParser {
    fn parse(&self, document: &str) -> Result<Node, BoxError> {
        self.nodes
            .get(document)
            .cloned()
            .ok_or_else(|| format!("unparseable introspection document: {document:?}").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use busk_core::MessageType;

    fn path() -> ObjectPath {
        ObjectPath::new("/player").unwrap()
    }

    #[test]
    fn test_recording_connection_shares_state() {
        let connection = RecordingConnection::new();
        let clone = connection.clone();
        clone
            .send(Message::signal(path(), "org.example.Player", "Stopped"))
            .unwrap();

        assert_eq!(connection.count(), 1);
        assert_eq!(connection.take().len(), 1);
        assert_eq!(clone.count(), 0);
    }

    #[tokio::test]
    async fn test_mock_bus_counts_introspection() {
        let bus = MockBus::new().with_document("org.example", "/player", "doc");

        assert_eq!(Bus::introspect(&bus, "org.example", &path()).await.unwrap(), "doc");
        assert!(Bus::introspect(&bus, "org.other", &path()).await.is_err());
        assert_eq!(bus.introspect_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_bus_default_reply() {
        let bus = MockBus::new();
        let call = Message::method_call(path(), "org.example.Player", "Play").with_serial(9);
        let reply = Bus::call(&bus, call).await.unwrap();

        assert_eq!(reply.message_type(), MessageType::MethodReturn);
        assert_eq!(reply.reply_serial(), Some(9));
        assert_eq!(bus.calls().len(), 1);
    }

    #[test]
    fn test_mock_bus_delivers_matching_signals() {
        let bus = MockBus::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        bus.add_match(
            MatchRule::signal("org.example", path(), "org.example.Player", "Stopped"),
            Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();

        let hit = Message::signal(path(), "org.example.Player", "Stopped").with_sender("org.example");
        let miss = Message::signal(path(), "org.example.Player", "Started").with_sender("org.example");
        assert_eq!(bus.emit_signal(&hit), 1);
        assert_eq!(bus.emit_signal(&miss), 0);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_static_parser() {
        let parser = StaticParser::new().with("empty", Node::default());
        assert_eq!(parser.parse("empty").unwrap(), Node::default());
        assert!(parser.parse("other").is_err());
    }
}
