//! # busk-std
//!
//! Object dispatch, registration and proxies for the Busk message-bus
//! binding.
//!
//! This crate provides:
//! - **Registration**: [`Registrar`], [`Registration`], [`Exportable`]
//! - **Exporting**: [`ExportedObject`], [`ObjectServer`]
//! - **Proxies**: [`ProxyObject`], [`ProxyInterface`], [`Shortcuts`]
//! - **Testing**: [`testing`] doubles for the bus collaborators

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use busk_core;

// Modules
pub mod object;
pub mod proxy;
pub mod registration;
pub mod server;
pub mod testing;

pub use object::{Dispatch, ExportedObject};
pub use proxy::{ApiOptions, Output, ProxyInterface, ProxyObject, Shortcuts};
pub use registration::{Exportable, MethodHandler, MethodKey, Registrar, Registration};
pub use server::ObjectServer;
