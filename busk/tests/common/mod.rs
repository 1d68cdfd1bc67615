#![allow(dead_code)]

use busk::{
    Args, BoxError, BusError, Exportable, Interface, Message, Method, ObjectPath, Registrar,
    Registration, Signal,
};
use lazy_static::lazy_static;
use std::sync::{
    OnceLock,
    atomic::{AtomicU32, Ordering},
};

pub const PLAYER: &str = "org.example.Player";
pub const BASE: &str = "org.example.Base";
pub const DERIVED: &str = "org.example.Derived";
pub const BUSY: &str = "org.example.Error.Busy";

// ============================================================================
// Exported Types
// ============================================================================

pub struct Player {
    pub volume: AtomicU32,
}

impl Player {
    pub fn new(volume: u32) -> Self {
        Self {
            volume: AtomicU32::new(volume),
        }
    }
}

lazy_static! {
    static ref PLAYER_REGISTRATION: Registration<Player> = {
        let mut registrar = Registrar::new();
        registrar
            .interface(PLAYER, |r| {
                r.method("Volume", &[], &["u"], |p: &Player, _: Args| {
                    p.volume.load(Ordering::SeqCst)
                })?
                .method("SetVolume", &["u"], &[], |p: &Player, args: Args| {
                    p.volume.store(args.get::<u32>(0)?, Ordering::SeqCst);
                    Ok::<(), BoxError>(())
                })?
                .method("Status", &[], &["s", "u"], |p: &Player, _: Args| {
                    ("playing", p.volume.load(Ordering::SeqCst))
                })?
                .method("Extra", &[], &["s"], |_: &Player, _: Args| ("kept", "dropped"))?
                .method("Short", &[], &["s", "u"], |_: &Player, _: Args| "only")?
                .method("Fail", &[], &[], |_: &Player, _: Args| {
                    Err::<(), BoxError>("jammed".into())
                })?
                .method("Busy", &[], &[], |_: &Player, _: Args| {
                    Err::<(), _>(BusError::new(BUSY, "player is busy"))
                })?
                .method("Panic", &[], &["u"], |_: &Player, _: Args| -> u32 {
                    panic!("boom")
                })?
                .signal("Stopped", &["u"])?;
                Ok(())
            })
            .expect("valid player interface");
        registrar.finish()
    };
}

impl Exportable for Player {
    fn registration() -> &'static Registration<Self> {
        &PLAYER_REGISTRATION
    }
}

pub struct Base {
    pub name: String,
}

impl Exportable for Base {
    fn registration() -> &'static Registration<Self> {
        static REGISTRATION: OnceLock<Registration<Base>> = OnceLock::new();
        REGISTRATION.get_or_init(|| {
            let mut registrar = Registrar::new();
            registrar
                .interface(BASE, |r| {
                    r.method("Name", &[], &["s"], |b: &Base, _: Args| b.name.clone())?;
                    Ok(())
                })
                .expect("valid base interface");
            registrar.finish()
        })
    }
}

/// Extends `Base` and adds a method to the inherited interface.
pub struct Derived {
    pub base: Base,
    pub level: u32,
}

impl Exportable for Derived {
    fn registration() -> &'static Registration<Self> {
        static REGISTRATION: OnceLock<Registration<Derived>> = OnceLock::new();
        REGISTRATION.get_or_init(|| {
            let mut registrar =
                Registrar::<Derived>::inherit(Base::registration(), |d: &Derived| &d.base);
            registrar
                .interface(BASE, |r| {
                    r.method("Level", &[], &["u"], |d: &Derived, _: Args| d.level)?;
                    Ok(())
                })
                .expect("valid base interface")
                .interface(DERIVED, |r| {
                    r.signal("Promoted", &["u"])?;
                    Ok(())
                })
                .expect("valid derived interface");
            registrar.finish()
        })
    }
}

/// Extends `Base` without touching the inherited interface.
pub struct Sibling {
    pub base: Base,
}

impl Exportable for Sibling {
    fn registration() -> &'static Registration<Self> {
        static REGISTRATION: OnceLock<Registration<Sibling>> = OnceLock::new();
        REGISTRATION.get_or_init(|| {
            let mut registrar =
                Registrar::<Sibling>::inherit(Base::registration(), |s: &Sibling| &s.base);
            registrar
                .interface("org.example.Sibling", |r| {
                    r.method("Ping", &[], &[], |_: &Sibling, _: Args| ())?;
                    Ok(())
                })
                .expect("valid sibling interface");
            registrar.finish()
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn path(path: &str) -> ObjectPath {
    ObjectPath::new(path).expect("valid test path")
}

pub fn call(at: &str, interface: &str, member: &str) -> Message {
    Message::method_call(path(at), interface, member)
        .with_serial(7)
        .with_sender(":1.42")
}

/// An interface descriptor with the given argument-less methods.
pub fn interface(name: &str, methods: &[&str]) -> Interface {
    methods.iter().fold(
        Interface::new(name).expect("valid interface name"),
        |iface, method| iface.with_method(Method::new(*method).expect("valid method name")),
    )
}

/// The remote view of the player interface.
pub fn remote_player() -> Interface {
    Interface::new(PLAYER)
        .expect("valid interface name")
        .with_method(Method::from_signatures("Volume", &[], &["u"]).expect("valid method"))
        .with_method(Method::from_signatures("SetVolume", &["u"], &[]).expect("valid method"))
        .with_method(Method::from_signatures("Status", &[], &["s", "u"]).expect("valid method"))
        .with_signal(Signal::from_signatures("Stopped", &["u"]).expect("valid signal"))
}
