use super::*;
use serde_json::json;

const OPEN: &str = r#"0{"sid":"lv_VI97HAXpY6yYWAAAC","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;

#[test]
fn decode_open_frame_reads_handshake() {
    let frame = decode_frame(OPEN).expect("open frame");
    let Frame::Open(handshake) = frame else {
        panic!("expected open frame, got {frame:?}");
    };
    assert_eq!(handshake.sid, "lv_VI97HAXpY6yYWAAAC");
    assert_eq!(handshake.ping_interval, 25_000);
    assert_eq!(handshake.ping_timeout, 20_000);
    assert_eq!(handshake.max_payload, Some(1_000_000));
    assert!(handshake.upgrades.is_empty());
}

#[test]
fn decode_open_frame_tolerates_missing_optional_fields() {
    let frame = decode_frame(r#"0{"sid":"s","pingInterval":1,"pingTimeout":2}"#).expect("open frame");
    assert!(matches!(frame, Frame::Open(Handshake { max_payload: None, .. })));
}

#[test]
fn decode_heartbeat_frames() {
    assert_eq!(decode_frame("2").expect("ping"), Frame::Ping(None));
    assert_eq!(decode_frame("3").expect("pong"), Frame::Pong(None));
    assert_eq!(decode_frame("2probe").expect("probe"), Frame::Ping(Some("probe".to_owned())));
    assert_eq!(decode_frame("1").expect("close"), Frame::Close);
    assert_eq!(decode_frame("6").expect("noop"), Frame::Noop);
}

#[test]
fn encode_heartbeat_frames() {
    assert_eq!(encode_frame(&Frame::Pong(None)), "3");
    assert_eq!(encode_frame(&Frame::Pong(Some("probe".to_owned()))), "3probe");
    assert_eq!(encode_frame(&Frame::Close), "1");
}

#[test]
fn decode_frame_rejects_empty_text() {
    assert!(matches!(decode_frame(""), Err(CodecError::Empty)));
}

#[test]
fn decode_frame_rejects_unknown_type() {
    assert!(matches!(decode_frame("9"), Err(CodecError::UnknownFrameType('9'))));
}

#[test]
fn decode_event_message_splits_name_and_args() {
    let frame = decode_frame(r#"42["message",{"username":"bob","text":"hi","timestamp":1}]"#).expect("event");
    let Frame::Message(packet) = frame else {
        panic!("expected message frame");
    };
    assert_eq!(packet.kind, PacketKind::Event);
    assert_eq!(packet.namespace, DEFAULT_NAMESPACE);
    assert_eq!(packet.ack_id, None);

    let (name, args) = packet.event_parts().expect("event parts");
    assert_eq!(name, "message");
    assert_eq!(args, &[json!({"username": "bob", "text": "hi", "timestamp": 1})]);
}

#[test]
fn decode_packet_reads_namespace_and_ack_id() {
    let packet = decode_packet(r#"2/chat,17["join","alice"]"#).expect("packet");
    assert_eq!(packet.namespace, "/chat");
    assert_eq!(packet.ack_id, Some(17));
    assert_eq!(packet.event_parts().expect("parts").0, "join");
}

#[test]
fn decode_packet_reads_bare_namespace_connect() {
    let packet = decode_packet("0/admin").expect("packet");
    assert_eq!(packet.kind, PacketKind::Connect);
    assert_eq!(packet.namespace, "/admin");
    assert_eq!(packet.data, None);
}

#[test]
fn decode_connect_packet_with_sid_payload() {
    let packet = decode_packet(r#"0{"sid":"abc"}"#).expect("packet");
    assert_eq!(packet.kind, PacketKind::Connect);
    assert_eq!(packet.data, Some(json!({"sid": "abc"})));
}

#[test]
fn decode_connect_error_packet() {
    let packet = decode_packet(r#"4{"message":"Not authorized"}"#).expect("packet");
    assert_eq!(packet.kind, PacketKind::ConnectError);
}

#[test]
fn decode_packet_rejects_binary_events() {
    let err = decode_packet(r#"51-["upload",{"_placeholder":true,"num":0}]"#).expect_err("binary");
    assert!(matches!(err, CodecError::BinaryUnsupported));
}

#[test]
fn decode_packet_rejects_unknown_type() {
    let err = decode_packet("8").expect_err("unknown");
    assert!(matches!(err, CodecError::UnknownPacketType('8')));
}

#[test]
fn decode_packet_rejects_overflowing_ack_id() {
    let err = decode_packet(r#"299999999999999999999999["x"]"#).expect_err("overflow");
    assert!(matches!(err, CodecError::InvalidAckId(_)));
}

#[test]
fn decode_packet_rejects_bad_json() {
    let err = decode_packet(r#"2["message",{"#).expect_err("json");
    assert!(matches!(err, CodecError::InvalidJson(_)));
}

#[test]
fn decode_event_rejects_non_array_payload() {
    let err = decode_packet(r#"2{"event":"message"}"#).expect_err("object payload");
    assert!(matches!(err, CodecError::MalformedEvent(_)));
}

#[test]
fn decode_event_rejects_empty_array() {
    let err = decode_packet("2[]").expect_err("empty array");
    assert!(matches!(err, CodecError::MalformedEvent("payload is empty")));
}

#[test]
fn decode_event_rejects_non_string_name() {
    let err = decode_packet("2[42]").expect_err("numeric name");
    assert!(matches!(err, CodecError::MalformedEvent("event name is not a string")));
}

#[test]
fn event_parts_rejects_non_event_packet() {
    let err = Packet::connect().event_parts().expect_err("connect is not an event");
    assert!(matches!(err, CodecError::MalformedEvent("not an event packet")));
}

#[test]
fn encode_event_on_default_namespace_omits_namespace() {
    let packet = Packet::event("join", vec![json!("alice")]);
    assert_eq!(encode_frame(&Frame::Message(packet)), r#"42["join","alice"]"#);
}

#[test]
fn encode_packet_includes_custom_namespace_and_ack() {
    let packet = Packet {
        kind: PacketKind::Event,
        namespace: "/chat".to_owned(),
        ack_id: Some(3),
        data: Some(json!(["message", "hi"])),
    };
    assert_eq!(encode_packet(&packet), r#"2/chat,3["message","hi"]"#);
}

#[test]
fn encode_connect_and_disconnect() {
    assert_eq!(encode_frame(&Frame::Message(Packet::connect())), "40");
    assert_eq!(encode_frame(&Frame::Message(Packet::disconnect())), "41");
}

#[test]
fn encoded_event_decodes_to_same_packet() {
    let packet = Packet::event("message", vec![json!("multi\nline \"quoted\" text")]);
    let decoded = decode_frame(&encode_frame(&Frame::Message(packet.clone()))).expect("decode");
    assert_eq!(decoded, Frame::Message(packet));
}

#[test]
fn encode_open_frame_uses_camel_case_keys() {
    let handshake = Handshake {
        sid: "s".to_owned(),
        upgrades: Vec::new(),
        ping_interval: 10,
        ping_timeout: 20,
        max_payload: None,
    };
    let text = encode_frame(&Frame::Open(handshake.clone()));
    assert!(text.starts_with('0'));
    assert!(text.contains("\"pingInterval\":10"));
    assert_eq!(decode_frame(&text).expect("decode"), Frame::Open(handshake));
}
