use super::*;
use std::collections::HashMap;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn from_lookup_defaults_when_nothing_set() {
    let cfg = ClientConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(cfg, ClientConfig::default());
    assert_eq!(cfg.url, DEFAULT_URL);
    assert_eq!(cfg.reconnect.max_attempts, None);
    assert!(cfg.rejoin_on_reconnect);
}

#[test]
fn from_lookup_parses_overrides() {
    let cfg = ClientConfig::from_lookup(lookup(&[
        ("UNICHAT_URL", "https://chat.example.test/"),
        ("UNICHAT_RECONNECT_INITIAL_MS", "250"),
        ("UNICHAT_RECONNECT_MAX_MS", "4000"),
        ("UNICHAT_MAX_RECONNECT_ATTEMPTS", "5"),
        ("UNICHAT_EVENT_BUFFER", "16"),
        ("UNICHAT_REJOIN_ON_RECONNECT", "false"),
    ]))
    .unwrap();

    assert_eq!(cfg.url, "https://chat.example.test");
    assert_eq!(cfg.reconnect, ReconnectPolicy { initial_ms: 250, max_ms: 4000, max_attempts: Some(5) });
    assert_eq!(cfg.event_buffer, 16);
    assert!(!cfg.rejoin_on_reconnect);
}

#[test]
fn from_lookup_blank_url_falls_back_to_default() {
    let cfg = ClientConfig::from_lookup(lookup(&[("UNICHAT_URL", "   ")])).unwrap();
    assert_eq!(cfg.url, DEFAULT_URL);
}

#[test]
fn from_lookup_rejects_non_numeric_delay() {
    let err = ClientConfig::from_lookup(lookup(&[("UNICHAT_RECONNECT_INITIAL_MS", "soon")])).unwrap_err();
    assert!(matches!(err, ClientError::Config(msg) if msg.contains("UNICHAT_RECONNECT_INITIAL_MS")));
}

#[test]
fn from_lookup_rejects_inverted_delays() {
    let err = ClientConfig::from_lookup(lookup(&[
        ("UNICHAT_RECONNECT_INITIAL_MS", "5000"),
        ("UNICHAT_RECONNECT_MAX_MS", "100"),
    ]))
    .unwrap_err();
    assert!(matches!(err, ClientError::Config(_)));
}

#[test]
fn from_lookup_rejects_bad_boolean() {
    let err = ClientConfig::from_lookup(lookup(&[("UNICHAT_REJOIN_ON_RECONNECT", "maybe")])).unwrap_err();
    assert!(matches!(err, ClientError::Config(_)));
}

#[test]
fn event_buffer_is_clamped_to_one() {
    let cfg = ClientConfig::from_lookup(lookup(&[("UNICHAT_EVENT_BUFFER", "0")])).unwrap();
    assert_eq!(cfg.event_buffer, 1);
}

#[test]
fn reconnect_delay_doubles_until_capped() {
    let policy = ReconnectPolicy { initial_ms: 1000, max_ms: 10_000, max_attempts: None };
    assert_eq!(policy.delay(1), Duration::from_millis(1000));
    assert_eq!(policy.delay(2), Duration::from_millis(2000));
    assert_eq!(policy.delay(3), Duration::from_millis(4000));
    assert_eq!(policy.delay(4), Duration::from_millis(8000));
    assert_eq!(policy.delay(5), Duration::from_millis(10_000));
    assert_eq!(policy.delay(500), Duration::from_millis(10_000));
}

#[test]
fn reconnect_policy_limits_attempts() {
    let unlimited = ReconnectPolicy::default();
    assert!(unlimited.allows(u32::MAX));

    let limited = ReconnectPolicy { max_attempts: Some(2), ..ReconnectPolicy::default() };
    assert!(limited.allows(1));
    assert!(limited.allows(2));
    assert!(!limited.allows(3));
}

#[test]
fn with_url_overrides_endpoint() {
    let cfg = ClientConfig::default().with_url("http://10.0.0.2:3001");
    assert_eq!(cfg.url, "http://10.0.0.2:3001");
}
