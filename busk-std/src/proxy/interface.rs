//! One remote interface bound to a destination and path.

use super::api::{ApiOptions, Output};
use busk_core::{
    Args, BusError, DynBus, Interface, MatchRule, Message, MessageType, Method, ObjectPath,
    ProxyError, Signal, Value,
};
use futures::executor::block_on;
use std::sync::Arc;

/// Name of the standard properties interface.
pub const PROPERTIES: &str = "org.freedesktop.DBus.Properties";

/// Where calls through a proxy go.
#[derive(Clone)]
pub(crate) struct Binding {
    pub(crate) bus: Arc<dyn DynBus>,
    pub(crate) destination: String,
    pub(crate) path: ObjectPath,
    pub(crate) api: ApiOptions,
}

impl Binding {
    /// Send `message` and unpack the reply.
    async fn round_trip(&self, message: Message) -> Result<Vec<Value>, ProxyError> {
        let reply = self
            .bus
            .call(message.with_destination(self.destination.as_str()))
            .await
            .map_err(ProxyError::Bus)?;
        match reply.message_type() {
            MessageType::MethodReturn => Ok(reply.into_params()),
            MessageType::Error => Err(BusError::new(
                reply.error_name().unwrap_or_default(),
                reply.error_text().unwrap_or_default(),
            )
            .into()),
            other => Err(ProxyError::UnexpectedReply(other)),
        }
    }
}

/// A remote interface: its descriptor plus the object it lives on.
///
/// Cheap to clone; clones share the descriptor and the bus.
#[derive(Clone)]
pub struct ProxyInterface {
    descriptor: Arc<Interface>,
    binding: Arc<Binding>,
}

impl ProxyInterface {
    pub(crate) fn new(descriptor: Arc<Interface>, binding: Arc<Binding>) -> Self {
        Self {
            descriptor,
            binding,
        }
    }

    pub(crate) fn rebind(&mut self, binding: Arc<Binding>) {
        self.binding = binding;
    }

    /// Interface name.
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    /// The interface descriptor.
    pub fn descriptor(&self) -> &Interface {
        &self.descriptor
    }

    /// A declared method.
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.descriptor.method(name)
    }

    /// A declared signal.
    pub fn signal(&self, name: &str) -> Option<&Signal> {
        self.descriptor.signal(name)
    }

    /// Call `member` with `args` and wait for the reply.
    pub fn call(&self, member: &str, args: Vec<Value>) -> Result<Output, ProxyError> {
        block_on(self.call_async(member, args))
    }

    /// Call `member` with `args`.
    ///
    /// The argument count must match the declared inputs. An error reply
    /// surfaces as [`ProxyError::Remote`].
    pub async fn call_async(&self, member: &str, args: Vec<Value>) -> Result<Output, ProxyError> {
        let method = self
            .descriptor
            .method(member)
            .ok_or_else(|| ProxyError::UnknownMember {
                interface: self.name().to_owned(),
                member: member.to_owned(),
            })?;
        if method.inputs().len() != args.len() {
            return Err(ProxyError::ArgumentCount {
                member: member.to_owned(),
                expected: method.inputs().len(),
                given: args.len(),
            });
        }

        let mut message = Message::method_call(self.binding.path.clone(), self.name(), member);
        for (arg, value) in method.inputs().iter().zip(args) {
            message.add_param(arg.signature.as_str(), value);
        }

        let values = self.binding.round_trip(message).await?;
        Ok(self.binding.api.shape(values))
    }

    /// Run `handler` with the arguments of every `name` signal from the
    /// remote object.
    pub fn on_signal<F>(&self, name: &str, handler: F) -> Result<(), ProxyError>
    where
        F: Fn(Args) + Send + Sync + 'static,
    {
        if self.descriptor.signal(name).is_none() {
            return Err(ProxyError::UnknownSignal {
                interface: self.name().to_owned(),
                signal: name.to_owned(),
            });
        }
        let rule = MatchRule::signal(
            self.binding.destination.as_str(),
            self.binding.path.clone(),
            self.name(),
            name,
        );

        #[cfg(feature = "tracing")]
        tracing::debug!(%rule, "registering signal handler");

        self.binding
            .bus
            .add_match(
                rule,
                Box::new(move |signal: &Message| handler(Args::new(signal.params().to_vec()))),
            )
            .map_err(ProxyError::Bus)
    }

    /// Read property `name` of this interface.
    pub fn get_property(&self, name: &str) -> Result<Value, ProxyError> {
        block_on(async {
            let message = self.properties_call("Get").with_param("s", name);
            self.binding
                .round_trip(message)
                .await?
                .into_iter()
                .next()
                .map(Value::unwrap_variant)
                .ok_or(ProxyError::UnexpectedReply(MessageType::MethodReturn))
        })
    }

    /// Write property `name` of this interface.
    pub fn set_property(&self, name: &str, value: impl Into<Value>) -> Result<(), ProxyError> {
        let value: Value = value.into();
        let message = self
            .properties_call("Set")
            .with_param("s", name)
            .with_param("v", value.into_variant());
        block_on(self.binding.round_trip(message)).map(drop)
    }

    /// Every property of this interface, in reply order.
    pub fn all_properties(&self) -> Result<Vec<(String, Value)>, ProxyError> {
        let values = block_on(self.binding.round_trip(self.properties_call("GetAll")))?;
        match values.into_iter().next() {
            Some(Value::Dict(entries)) => entries
                .into_iter()
                .map(|(key, value)| match key.as_str() {
                    Some(key) => Ok((key.to_owned(), value.unwrap_variant())),
                    None => Err(ProxyError::UnexpectedReply(MessageType::MethodReturn)),
                })
                .collect(),
            _ => Err(ProxyError::UnexpectedReply(MessageType::MethodReturn)),
        }
    }

    fn properties_call(&self, member: &str) -> Message {
        Message::method_call(self.binding.path.clone(), PROPERTIES, member)
            .with_param("s", self.name())
    }
}

impl std::fmt::Debug for ProxyInterface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyInterface")
            .field("name", &self.name())
            .field("destination", &self.binding.destination)
            .field("path", &self.binding.path)
            .finish()
    }
}
