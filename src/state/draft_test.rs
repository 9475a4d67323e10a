use super::*;

#[test]
fn message_text_is_trimmed() {
    assert_eq!(MessageText::parse("  hi there  ").expect("text").as_str(), "hi there");
}

#[test]
fn blank_message_text_is_rejected() {
    assert!(matches!(MessageText::parse(""), Err(ClientError::EmptyMessage)));
    assert!(matches!(MessageText::parse(" \n\t "), Err(ClientError::EmptyMessage)));
}

#[test]
fn long_message_text_is_cut_to_limit() {
    let text = MessageText::parse(&"x".repeat(800)).expect("text");
    assert_eq!(text.as_str().chars().count(), MAX_MESSAGE_CHARS);
}

#[test]
fn draft_set_truncates() {
    let mut draft = Draft::default();
    draft.set(&"y".repeat(600));
    assert_eq!(draft.as_str().chars().count(), MAX_MESSAGE_CHARS);
}

#[test]
fn draft_push_str_stops_at_limit() {
    let mut draft = Draft::default();
    draft.set(&"a".repeat(498));
    draft.push_str("bcdef");
    assert_eq!(draft.as_str().chars().count(), MAX_MESSAGE_CHARS);
    assert!(draft.as_str().ends_with("abc"));

    draft.push_str("more");
    assert!(draft.as_str().ends_with("abc"));
}

#[test]
fn draft_blank_and_clear() {
    let mut draft = Draft::default();
    assert!(draft.is_blank());
    draft.set("   ");
    assert!(draft.is_blank());
    draft.set("hello");
    assert!(!draft.is_blank());
    draft.clear();
    assert_eq!(draft.as_str(), "");
}

#[test]
fn prepare_keeps_draft_contents() {
    let mut draft = Draft::default();
    draft.set("  hello ");
    let text = draft.prepare().expect("prepared");
    assert_eq!(text.into_string(), "hello");
    assert_eq!(draft.as_str(), "  hello ");
}
