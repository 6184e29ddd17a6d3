use super::*;

#[test]
fn test_defaults_apply_when_unset_or_zero() {
    let timeouts = Timeouts {
        connect_timeout: Some(0),
        read_timeout: None,
    };
    assert_eq!(timeouts.connect_timeout(), DEFAULT_CONNECT_TIMEOUT_SECONDS);
    assert_eq!(timeouts.read_timeout(), DEFAULT_READ_TIMEOUT_SECONDS);
}

#[test]
fn test_merge_takes_incoming_values() {
    let mut base = Timeouts {
        connect_timeout: Some(5),
        read_timeout: Some(10),
    };
    base.merge(&Timeouts {
        connect_timeout: None,
        read_timeout: Some(90),
    });
    assert_eq!(base.connect_timeout(), 5);
    assert_eq!(base.read_timeout(), 90);
}
