//! End-to-end client behavior over the loopback transport.

use std::cell::RefCell;

use relaywire_client::{
    Client, ClientConfig, ClientError, DiagnosticSink, NoopSink, SendStatus,
};
use relaywire_protocol::{Envelope, MessageKind, Payload, RecordKind, UpdateRecord};
use relaywire_transport::{
    LoopbackEvent, LoopbackRemote, LoopbackTransport, ProxySnapshot, TransportError,
    WireMode,
};

/// Records every echo it receives.
#[derive(Default)]
struct RecordingSink {
    echoes: RefCell<Vec<(String, String)>>,
}

impl DiagnosticSink for RecordingSink {
    fn echo(&self, label: &str, text: &str) {
        self.echoes.borrow_mut().push((label.to_owned(), text.to_owned()));
    }
}

fn noop_client() -> (Client<LoopbackTransport, NoopSink>, LoopbackRemote) {
    let (transport, remote) = LoopbackTransport::new();
    (Client::with_sink(transport, NoopSink), remote)
}

fn connect_proxy(events: &[LoopbackEvent]) -> Option<ProxySnapshot> {
    events.iter().find_map(|event| match event {
        LoopbackEvent::Connected { proxy, .. } => Some(proxy.clone()),
        _ => None,
    })?
}

// =========================================================================
// Proxy parameters
// =========================================================================

#[test]
fn test_proxy_auth_bound_then_reset_connects_without_proxy() {
    let (mut client, mut remote) = noop_client();
    client.set_proxy("10.0.0.5", 1080).unwrap();

    let err = client.set_proxy_auth(&"u".repeat(300), "pw").unwrap_err();
    assert!(matches!(err, ClientError::CredentialTooLong { len: 300, .. }));

    client.set_proxy_auth(&"u".repeat(10), "pw").unwrap();
    client.reset_proxy();

    client.connect("1.2.3.4", 17091, WireMode::Legacy).unwrap();
    assert_eq!(connect_proxy(&remote.drain()), None);
}

#[test]
fn test_connect_passes_proxy_and_credentials_together() {
    let (mut client, mut remote) = noop_client();
    client.set_proxy("10.0.0.5", 1080).unwrap();
    client.set_proxy_auth("alice", "hunter2").unwrap();

    client.connect("1.2.3.4", 17091, WireMode::New).unwrap();

    let proxy = connect_proxy(&remote.drain()).expect("connect should carry proxy");
    assert_eq!(proxy.host, "10.0.0.5");
    assert_eq!(proxy.port, 1080);
    assert_eq!(proxy.username.as_deref(), Some(&b"alice"[..]));
    assert_eq!(proxy.password.as_deref(), Some(&b"hunter2"[..]));
}

#[test]
fn test_reset_proxy_is_idempotent() {
    let (mut client, _remote) = noop_client();
    client.reset_proxy();
    client.set_proxy("10.0.0.5", 1080).unwrap();
    client.reset_proxy();
    client.reset_proxy();
    assert!(!client.proxy().is_configured());
}

#[test]
fn test_with_config_applies_proxy_section() {
    let config = ClientConfig::from_json(
        r#"{"proxy":{"host":"10.0.0.9","port":9050,"auth":{"username":"u","password":"p"}}}"#,
    )
    .unwrap();
    let (transport, mut remote) = LoopbackTransport::new();
    let mut client = Client::with_config(transport, NoopSink, config).unwrap();

    client.connect("1.2.3.4", 17091, WireMode::Legacy).unwrap();

    let proxy = connect_proxy(&remote.drain()).unwrap();
    assert_eq!(proxy.host, "10.0.0.9");
    assert_eq!(proxy.username.as_deref(), Some(&b"u"[..]));
}

#[test]
fn test_with_config_oversized_proxy_password_fails() {
    let mut config = ClientConfig::default();
    config.proxy = Some(relaywire_client::ProxyConfig {
        host: "10.0.0.9".into(),
        port: 9050,
        auth: Some(relaywire_client::ProxyAuthConfig {
            username: "u".into(),
            password: "p".repeat(256),
        }),
    });
    let (transport, _remote) = LoopbackTransport::new();
    let err = Client::with_config(transport, NoopSink, config).unwrap_err();
    assert!(matches!(
        err,
        ClientError::CredentialTooLong { field: "proxy password", .. }
    ));
}

#[test]
fn test_with_config_moves_proxy_section_into_store() {
    let config = ClientConfig::from_json(
        r#"{"proxy":{"host":"10.0.0.9","port":9050,"auth":{"username":"alice","password":"hunter2"}}}"#,
    )
    .unwrap();
    let (transport, _remote) = LoopbackTransport::new();
    let mut client = Client::with_config(transport, NoopSink, config).unwrap();

    assert!(client.config().proxy.is_none());
    assert!(client.proxy().has_auth());

    client.reset_proxy();

    assert!(client.proxy().proxy_target().is_none());
    assert!(client.config().proxy.is_none());
    assert!(!format!("{client:?}").contains("hunter2"));
}

#[test]
fn test_set_proxy_auth_replacement_drops_previous_pair() {
    let (mut client, mut remote) = noop_client();
    client.set_proxy("10.0.0.5", 1080).unwrap();
    client.set_proxy_auth("alice", "hunter2").unwrap();
    client.set_proxy_auth("bob", "swordfish").unwrap();

    let auth = client.proxy().proxy_target().unwrap().auth.unwrap();
    assert_eq!(auth.username, b"bob");
    assert_eq!(auth.password, b"swordfish");

    client.connect("1.2.3.4", 17091, WireMode::Legacy).unwrap();
    let proxy = connect_proxy(&remote.drain()).unwrap();
    assert_eq!(proxy.username.as_deref(), Some(&b"bob"[..]));
    assert_eq!(proxy.password.as_deref(), Some(&b"swordfish"[..]));
}

#[test]
fn test_set_proxy_new_endpoint_drops_credentials_before_connect() {
    let (mut client, mut remote) = noop_client();
    client.set_proxy("10.0.0.5", 1080).unwrap();
    client.set_proxy_auth("alice", "hunter2").unwrap();
    client.set_proxy("10.0.0.6", 1080).unwrap();

    client.connect("1.2.3.4", 17091, WireMode::Legacy).unwrap();

    let proxy = connect_proxy(&remote.drain()).unwrap();
    assert_eq!(proxy.host, "10.0.0.6");
    assert_eq!(proxy.username, None);
    assert_eq!(proxy.password, None);
}

// =========================================================================
// Connect / disconnect
// =========================================================================

#[test]
fn test_connect_creates_host_with_requested_mode() {
    let (mut client, mut remote) = noop_client();
    client.connect("1.2.3.4", 17091, WireMode::New).unwrap();

    let events = remote.drain();
    let LoopbackEvent::HostCreated(settings) = &events[0] else {
        panic!("expected HostCreated first, got {:?}", events[0]);
    };
    assert_eq!(settings.wire_mode, WireMode::New);
    assert_eq!(settings.channel_count, 2);
    assert!(settings.checksum);
    assert!(settings.range_coder);
    assert_eq!(client.wire_mode(), Some(WireMode::New));
    assert!(client.is_connected());
}

#[test]
fn test_wire_mode_constant_while_connected() {
    let (mut client, _remote) = noop_client();
    client.connect("1.2.3.4", 17091, WireMode::New).unwrap();

    client.send_generic_text("hello");
    client.set_proxy("10.0.0.5", 1080).unwrap();
    client.send_game_message("action|input");

    assert_eq!(client.wire_mode(), Some(WireMode::New));
}

#[test]
fn test_connect_again_switches_mode_through_disconnect() {
    let (mut client, mut remote) = noop_client();
    client.connect("1.2.3.4", 17091, WireMode::New).unwrap();
    remote.drain();

    client.connect("1.2.3.4", 17091, WireMode::Legacy).unwrap();

    let events = remote.drain();
    assert!(events.iter().any(|e| matches!(e, LoopbackEvent::HostDestroyed)));
    assert_eq!(client.wire_mode(), Some(WireMode::Legacy));
}

#[test]
fn test_connect_host_creation_failure_returns_connect_failed() {
    let (mut client, _remote) = noop_client();
    client.transport_mut().fail_host_creation(true);

    let err = client.connect("1.2.3.4", 17091, WireMode::Legacy).unwrap_err();
    assert!(matches!(
        err,
        ClientError::ConnectFailed {
            source: TransportError::HostCreation(_),
            ..
        }
    ));
    assert!(!client.is_connected());
}

#[test]
fn test_connect_peer_failure_returns_connect_failed_and_releases_host() {
    let (mut client, mut remote) = noop_client();
    client.transport_mut().fail_connect(true);

    let err = client.connect("1.2.3.4", 17091, WireMode::Legacy).unwrap_err();
    assert!(matches!(
        err,
        ClientError::ConnectFailed {
            source: TransportError::PeerAllocation(_),
            ..
        }
    ));
    assert_eq!(client.wire_mode(), None);
    assert_eq!(remote.drain().last(), Some(&LoopbackEvent::HostDestroyed));
}

#[test]
fn test_disconnect_frames_disconnect_record_as_game_packet() {
    let (mut client, mut remote) = noop_client();
    client.connect("1.2.3.4", 17091, WireMode::Legacy).unwrap();
    remote.drain();

    client.disconnect();

    let sent = remote.drain_packets();
    assert_eq!(sent.len(), 1);
    let envelope = Envelope::parse(&sent[0]).unwrap();
    assert_eq!(envelope.kind, MessageKind::GamePacket);
    let Payload::Record(record) = envelope.payload else {
        panic!("expected record payload");
    };
    assert_eq!(record.kind, RecordKind::Disconnect);
    assert_eq!(record.kind.to_byte(), 26);
    assert!(!client.is_connected());
    assert_eq!(client.wire_mode(), None);
}

#[test]
fn test_disconnect_without_connection_is_noop() {
    let (mut client, mut remote) = noop_client();
    client.disconnect();
    client.disconnect();
    assert!(remote.drain().is_empty());
}

#[test]
fn test_reconnect_reuses_last_target() {
    let (mut client, mut remote) = noop_client();
    client.connect("1.2.3.4", 17091, WireMode::New).unwrap();
    client.disconnect();
    remote.drain();

    client.reconnect().unwrap();

    let events = remote.drain();
    let LoopbackEvent::HostCreated(settings) = &events[0] else {
        panic!("expected HostCreated first");
    };
    assert_eq!(settings.wire_mode, WireMode::New);
    assert!(events.iter().any(|e| matches!(
        e,
        LoopbackEvent::Connected { address, .. } if address.to_string() == "1.2.3.4:17091"
    )));
}

#[test]
fn test_reconnect_before_connect_returns_no_previous_target() {
    let (mut client, _remote) = noop_client();
    assert!(matches!(
        client.reconnect(),
        Err(ClientError::NoPreviousTarget)
    ));
}

#[test]
fn test_drop_disconnects() {
    let (mut client, mut remote) = noop_client();
    client.connect("1.2.3.4", 17091, WireMode::Legacy).unwrap();
    remote.drain();

    drop(client);

    let events = remote.drain();
    let sent = events
        .iter()
        .filter(|e| matches!(e, LoopbackEvent::Packet { .. }))
        .count();
    assert_eq!(sent, 1);
    assert_eq!(events.last(), Some(&LoopbackEvent::HostDestroyed));
}

// =========================================================================
// Sending
// =========================================================================

#[test]
fn test_send_without_connection_returns_not_connected() {
    let (mut client, mut remote) = noop_client();
    assert_eq!(client.send_generic_text("hi"), SendStatus::NotConnected);
    assert_eq!(
        client.send_game_packet(&UpdateRecord::new(RecordKind::State)),
        SendStatus::NotConnected
    );
    assert!(remote.drain().is_empty());
}

#[test]
fn test_send_generic_text_frames_kind_then_text() {
    let (mut client, mut remote) = noop_client();
    client.connect("1.2.3.4", 17091, WireMode::Legacy).unwrap();
    remote.drain();

    assert_eq!(client.send_generic_text("hello"), SendStatus::Queued);

    let sent = remote.drain_packets();
    let mut expected = 2u32.to_le_bytes().to_vec();
    expected.extend_from_slice(b"hello");
    assert_eq!(sent, vec![expected]);
}

#[test]
fn test_send_game_packet_record_with_extra_data() {
    let (mut client, mut remote) = noop_client();
    client.connect("1.2.3.4", 17091, WireMode::Legacy).unwrap();
    remote.drain();

    let mut record = UpdateRecord::new(RecordKind::CallFunction)
        .with_extra_data(vec![1, 2, 3])
        .unwrap();
    record.net_id = -1;
    client.send_game_packet(&record);

    let sent = remote.drain_packets();
    assert_eq!(sent[0].len(), 4 + 60 + 3);
    let envelope = Envelope::parse(&sent[0]).unwrap();
    assert_eq!(envelope.payload, Payload::Record(record));
}

#[test]
fn test_sink_echo_matches_build_profile_and_bytes_are_unchanged() {
    let sink = RecordingSink::default();
    let (transport, mut remote) = LoopbackTransport::new();
    let mut client = Client::with_sink(transport, &sink);
    client.connect("1.2.3.4", 17091, WireMode::Legacy).unwrap();
    remote.drain();

    client.send_game_message("action|quit");
    let with_sink = remote.drain_packets();

    let (mut plain, mut plain_remote) = noop_client();
    plain.connect("1.2.3.4", 17091, WireMode::Legacy).unwrap();
    plain_remote.drain();
    plain.send_game_message("action|quit");
    assert_eq!(with_sink, plain_remote.drain_packets());

    drop(client);
    let echoes = sink.echoes.borrow();
    if cfg!(debug_assertions) {
        assert_eq!(
            echoes[0],
            ("SendGameMessage".to_owned(), "action|quit".to_owned())
        );
    } else {
        assert!(echoes.is_empty());
    }
}

#[test]
fn test_flush_on_send_disabled_skips_flush() {
    let config = ClientConfig {
        flush_on_send: false,
        ..ClientConfig::default()
    };
    let (transport, mut remote) = LoopbackTransport::new();
    let mut client = Client::with_config(transport, NoopSink, config).unwrap();
    client.connect("1.2.3.4", 17091, WireMode::Legacy).unwrap();
    remote.drain();

    client.send_generic_text("x");

    let events = remote.drain();
    assert!(!events.iter().any(|e| matches!(e, LoopbackEvent::Flushed)));
}
