mod common;

use busk::{
    Dispatch, DispatchError, ExportedObject, Message, MessageType, ObjectServer, Value, error_name,
    server::INTROSPECTABLE, testing::RecordingConnection,
};
use common::{BASE, Base, PLAYER, Player, call, path};
use std::sync::Arc;

fn server() -> (ObjectServer, RecordingConnection) {
    let connection = RecordingConnection::new();
    let mut server = ObjectServer::new(Arc::new(connection.clone()));
    server
        .export(ExportedObject::new(path("/org/example/player"), Player::new(2)))
        .unwrap();
    server
        .export(ExportedObject::new(
            path("/org/example/base"),
            Base {
                name: "base".into(),
            },
        ))
        .unwrap();
    (server, connection)
}

#[test]
fn test_routes_by_path() {
    let (server, connection) = server();

    server
        .process(&call("/org/example/player", PLAYER, "Volume"))
        .unwrap();
    server
        .process(&call("/org/example/base", BASE, "Name"))
        .unwrap();

    let replies = connection.take();
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0].params(), [Value::UInt32(2)]);
    assert_eq!(replies[1].params(), [Value::from("base")]);
}

#[test]
fn test_unknown_object_reply() {
    let (server, connection) = server();
    server
        .process(&call("/org/example/ghost", PLAYER, "Volume"))
        .unwrap();

    let reply = connection.last().unwrap();
    assert_eq!(reply.error_name(), Some(error_name::UNKNOWN_OBJECT));
    assert_eq!(
        reply.error_text(),
        Some("Object \"/org/example/ghost\" doesn't exist")
    );
    assert_eq!(reply.reply_serial(), Some(7));
}

#[test]
fn test_introspect_lists_interfaces_and_children() {
    let (server, connection) = server();

    server
        .process(&call("/org/example/player", INTROSPECTABLE, "Introspect"))
        .unwrap();
    let reply = connection.last().unwrap();
    assert_eq!(reply.message_type(), MessageType::MethodReturn);
    assert_eq!(reply.signature(), "s");

    let document = reply.params()[0].as_str().unwrap().to_owned();
    assert!(document.contains("<node name=\"/org/example/player\">"));
    assert!(document.contains(&format!("<interface name=\"{INTROSPECTABLE}\">")));
    assert!(document.contains(&format!("<interface name=\"{PLAYER}\">")));
    assert!(document.contains("<method name=\"Volume\">"));
    assert!(document.contains("<signal name=\"Stopped\">"));

    let parent = server.introspect(&path("/org/example")).unwrap();
    assert!(parent.contains("<node name=\"base\"/>"));
    assert!(parent.contains("<node name=\"player\"/>"));
    assert!(!parent.contains(PLAYER));

    let root = server.introspect(&path("/")).unwrap();
    assert!(root.contains("<node name=\"org\"/>"));
}

#[test]
fn test_introspect_unknown_path_is_unknown_object() {
    let (server, connection) = server();
    assert!(server.introspect(&path("/elsewhere")).is_none());

    server
        .process(&call("/elsewhere", INTROSPECTABLE, "Introspect"))
        .unwrap();
    assert_eq!(
        connection.last().unwrap().error_name(),
        Some(error_name::UNKNOWN_OBJECT)
    );
}

#[test]
fn test_export_twice_is_rejected() {
    let (mut server, _) = server();
    let err = server
        .export(ExportedObject::new(path("/org/example/player"), Player::new(0)))
        .unwrap_err();
    assert!(matches!(err, DispatchError::AlreadyExported(_)));
}

#[test]
fn test_unexport_removes_object() {
    let (mut server, connection) = server();
    assert!(server.unexport(&path("/org/example/player")).is_some());
    assert!(server.get(&path("/org/example/player")).is_none());

    server
        .process(&call("/org/example/player", PLAYER, "Volume"))
        .unwrap();
    assert_eq!(
        connection.last().unwrap().error_name(),
        Some(error_name::UNKNOWN_OBJECT)
    );
}

#[test]
fn test_exported_objects_reply_through_server_connection() {
    let (server, connection) = server();
    let object = server.get(&path("/org/example/base")).unwrap();
    assert!(object.connection().is_some());

    object.dispatch(&call("/org/example/base", BASE, "Name")).unwrap();
    assert_eq!(connection.count(), 1);
}

#[test]
fn test_signals_are_not_routed() {
    let (server, connection) = server();
    let signal = Message::signal(path("/org/example/player"), PLAYER, "Stopped");
    server.process(&signal).unwrap();
    assert_eq!(connection.count(), 0);
}

#[test]
fn test_exported_object_emits_through_server_connection() {
    let (server, connection) = server();
    server
        .emit(
            &path("/org/example/player"),
            PLAYER,
            "Stopped",
            vec![Value::UInt32(11)],
        )
        .unwrap();

    let signal = connection.last().unwrap();
    assert_eq!(signal.message_type(), MessageType::Signal);
    assert_eq!(signal.path().map(|p| p.as_str()), Some("/org/example/player"));
    assert_eq!(signal.interface(), Some(PLAYER));
    assert_eq!(signal.member(), Some("Stopped"));
    assert_eq!(signal.params(), [Value::UInt32(11)]);

    // The same object is reachable through the trait object as well.
    let object = server.get(&path("/org/example/player")).unwrap();
    object.emit(PLAYER, "Stopped", vec![Value::UInt32(12)]).unwrap();
    assert_eq!(connection.count(), 2);
}

#[test]
fn test_emit_from_unknown_path_is_not_exported() {
    let (server, connection) = server();
    let err = server
        .emit(&path("/org/example/ghost"), PLAYER, "Stopped", vec![Value::UInt32(1)])
        .unwrap_err();
    assert!(matches!(err, DispatchError::NotExported(ref p) if p == "/org/example/ghost"));

    assert!(matches!(
        server.emit(&path("/org/example/base"), PLAYER, "Stopped", vec![Value::UInt32(1)]),
        Err(DispatchError::UnknownSignal { .. })
    ));
    assert_eq!(connection.count(), 0);
}
