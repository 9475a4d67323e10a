use super::*;

#[test]
fn username_is_trimmed() {
    let name = Username::parse("  alice \n").expect("valid name");
    assert_eq!(name.as_str(), "alice");
    assert_eq!(name.to_string(), "alice");
}

#[test]
fn blank_username_is_rejected() {
    assert!(matches!(Username::parse(""), Err(ClientError::EmptyUsername)));
    assert!(matches!(Username::parse("   \t"), Err(ClientError::EmptyUsername)));
}

#[test]
fn long_username_is_cut_to_twenty_chars() {
    let name = Username::parse("abcdefghijklmnopqrstuvwxyz").expect("valid name");
    assert_eq!(name.as_str(), "abcdefghijklmnopqrst");
    assert_eq!(name.as_str().chars().count(), MAX_USERNAME_CHARS);
}

#[test]
fn username_cut_counts_characters_not_bytes() {
    let name = Username::parse(&"é".repeat(25)).expect("valid name");
    assert_eq!(name.as_str().chars().count(), 20);
}

#[test]
fn username_cut_drops_exposed_trailing_space() {
    let name = Username::parse("nineteen characters xyz").expect("valid name");
    assert_eq!(name.as_str(), "nineteen characters");
}

#[test]
fn session_starts_unjoined() {
    let session = Session::default();
    assert_eq!(session.phase(), SessionPhase::Unjoined);
    assert!(!session.is_joined());
    assert!(session.username().is_none());
}

#[test]
fn begin_join_moves_to_pending() {
    let mut session = Session::default();
    session.begin_join(Username::parse("alice").expect("name")).expect("join");
    assert_eq!(session.phase(), SessionPhase::Pending);
    assert!(session.is_joined());
    assert!(!session.is_confirmed());
    assert_eq!(session.username().map(Username::as_str), Some("alice"));
}

#[test]
fn second_join_is_rejected_and_keeps_name() {
    let mut session = Session::default();
    session.begin_join(Username::parse("alice").expect("name")).expect("join");
    let err = session.begin_join(Username::parse("mallory").expect("name")).expect_err("rejoin");
    assert!(matches!(err, ClientError::AlreadyJoined(name) if name == "alice"));
    assert_eq!(session.username().map(Username::as_str), Some("alice"));
}

#[test]
fn confirm_only_moves_pending_forward() {
    let mut session = Session::default();
    assert!(!session.confirm());
    assert_eq!(session.phase(), SessionPhase::Unjoined);

    session.begin_join(Username::parse("alice").expect("name")).expect("join");
    assert!(session.confirm());
    assert!(session.is_confirmed());
    assert!(!session.confirm());
}
