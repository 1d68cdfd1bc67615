//! In-memory bus messages.
//!
//! A [`Message`] carries the header fields the routing layer cares about plus
//! an ordered body of `(signature, value)` pairs. Serializing it is left to the
//! transport.

use crate::{name::ObjectPath, value::Value};
use bitflags::bitflags;
use std::fmt;

/// The kind of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// A request addressed to a path/interface/member triple.
    MethodCall,
    /// A successful reply.
    MethodReturn,
    /// An error reply.
    Error,
    /// A broadcast emission.
    Signal,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MessageType::MethodCall => "method_call",
            MessageType::MethodReturn => "method_return",
            MessageType::Error => "error",
            MessageType::Signal => "signal",
        })
    }
}

bitflags! {
    /// Header flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MessageFlags: u8 {
        /// The caller does not wait for a reply.
        const NO_REPLY_EXPECTED = 0x1;
        /// The bus must not launch a service to handle the call.
        const NO_AUTO_START = 0x2;
    }
}

/// A bus message.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    message_type: MessageType,
    flags: MessageFlags,
    serial: u32,
    reply_serial: Option<u32>,
    path: Option<ObjectPath>,
    interface: Option<String>,
    member: Option<String>,
    error_name: Option<String>,
    destination: Option<String>,
    sender: Option<String>,
    signature: Vec<String>,
    body: Vec<Value>,
}

impl Message {
    fn empty(message_type: MessageType) -> Self {
        Self {
            message_type,
            flags: MessageFlags::empty(),
            serial: 0,
            reply_serial: None,
            path: None,
            interface: None,
            member: None,
            error_name: None,
            destination: None,
            sender: None,
            signature: Vec::new(),
            body: Vec::new(),
        }
    }

    /// A method call to `interface.member` on `path`.
    pub fn method_call(
        path: ObjectPath,
        interface: impl Into<String>,
        member: impl Into<String>,
    ) -> Self {
        Self {
            path: Some(path),
            interface: Some(interface.into()),
            member: Some(member.into()),
            ..Self::empty(MessageType::MethodCall)
        }
    }

    /// A successful reply to `call`.
    pub fn method_return(call: &Message) -> Self {
        Self {
            reply_serial: Some(call.serial),
            destination: call.sender.clone(),
            ..Self::empty(MessageType::MethodReturn)
        }
    }

    /// An error reply to `call` with a single string describing the failure.
    pub fn error(call: &Message, error_name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut reply = Self {
            reply_serial: Some(call.serial),
            destination: call.sender.clone(),
            error_name: Some(error_name.into()),
            ..Self::empty(MessageType::Error)
        };
        reply.add_param("s", Value::Str(text.into()));
        reply
    }

    /// A signal emitted from `path`.
    pub fn signal(
        path: ObjectPath,
        interface: impl Into<String>,
        member: impl Into<String>,
    ) -> Self {
        Self {
            path: Some(path),
            interface: Some(interface.into()),
            member: Some(member.into()),
            ..Self::empty(MessageType::Signal)
        }
    }

    /// Set the destination.
    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Set the sender.
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Set the serial.
    pub fn with_serial(mut self, serial: u32) -> Self {
        self.serial = serial;
        self
    }

    /// Set the header flags.
    pub fn with_flags(mut self, flags: MessageFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Append a parameter (builder form).
    pub fn with_param(mut self, signature: impl Into<String>, value: impl Into<Value>) -> Self {
        self.add_param(signature, value);
        self
    }

    /// Append a parameter.
    pub fn add_param(&mut self, signature: impl Into<String>, value: impl Into<Value>) {
        self.signature.push(signature.into());
        self.body.push(value.into());
    }

    /// Message kind.
    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    /// Header flags.
    pub fn flags(&self) -> MessageFlags {
        self.flags
    }

    /// Whether the sender waits for a reply.
    pub fn expects_reply(&self) -> bool {
        self.message_type == MessageType::MethodCall
            && !self.flags.contains(MessageFlags::NO_REPLY_EXPECTED)
    }

    /// Serial number.
    pub fn serial(&self) -> u32 {
        self.serial
    }

    /// Serial of the call this message answers.
    pub fn reply_serial(&self) -> Option<u32> {
        self.reply_serial
    }

    /// Object path.
    pub fn path(&self) -> Option<&ObjectPath> {
        self.path.as_ref()
    }

    /// Interface name.
    pub fn interface(&self) -> Option<&str> {
        self.interface.as_deref()
    }

    /// Member name.
    pub fn member(&self) -> Option<&str> {
        self.member.as_deref()
    }

    /// Error name of an error reply.
    pub fn error_name(&self) -> Option<&str> {
        self.error_name.as_deref()
    }

    /// Text of an error reply, its first string parameter.
    pub fn error_text(&self) -> Option<&str> {
        self.body.first().and_then(Value::as_str)
    }

    /// Destination.
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    /// Sender.
    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    /// One signature per parameter.
    pub fn signatures(&self) -> &[String] {
        &self.signature
    }

    /// Concatenated body signature.
    pub fn signature(&self) -> String {
        self.signature.concat()
    }

    /// Ordered parameters.
    pub fn params(&self) -> &[Value] {
        &self.body
    }

    /// Consume into the ordered parameters.
    pub fn into_params(self) -> Vec<Value> {
        self.body
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn or_dash(field: Option<&str>) -> &str {
            field.unwrap_or("-")
        }

        write!(
            f,
            "{} sender={} -> dest={} serial={} reply_serial={} path={}; interface={}; member={} error_name={}",
            self.message_type,
            or_dash(self.sender()),
            or_dash(self.destination()),
            self.serial,
            self.reply_serial
                .map_or_else(|| "-".to_owned(), |s| s.to_string()),
            or_dash(self.path.as_ref().map(ObjectPath::as_str)),
            or_dash(self.interface()),
            or_dash(self.member()),
            or_dash(self.error_name()),
        )
    }
}
