use fieldlog_core::model::timestamp::validate_timestamp;
use fieldlog_core::model::validation::validate_name;
use fieldlog_core::{is_valid_name, Timestamp, ValidationError, MAX_TIMESTAMP, NO_TIMESTAMP};

#[test]
fn rejects_bad_names() {
    for name in ["", "A", "7", "CON", "con.txt", "Foo ", "Foo.", ".foo", " Foo", "a/b", "x:y"] {
        assert!(!is_valid_name(name), "{name:?} should be rejected");
    }
}

#[test]
fn accepts_reasonable_names() {
    for name in ["Site-1 (North)", "Müggelsee", "Bottle #3", "A&B's [x]", "Lake 2.1"] {
        assert!(is_valid_name(name), "{name:?} should be accepted");
    }
}

#[test]
fn validate_name_reports_the_name() {
    let err = validate_name("COM1").unwrap_err();
    assert_eq!(err, ValidationError::InvalidName("COM1".to_string()));
    assert!(err.to_string().starts_with("Invalid name"));
}

#[test]
fn timestamp_rules() {
    assert_eq!(NO_TIMESTAMP, NO_TIMESTAMP);
    assert!(!Timestamp::from_millis(0).is_valid_and_set());
    assert!(!Timestamp::from_millis(MAX_TIMESTAMP).is_valid_and_set());
    assert!(!Timestamp::from_millis(MAX_TIMESTAMP + 1).is_valid_and_set());
    assert!(Timestamp::from_millis(1_700_000_000_000).is_valid_and_set());
    assert_eq!(
        validate_timestamp(Timestamp::from_millis(MAX_TIMESTAMP)).unwrap_err(),
        ValidationError::InvalidTimestamp(Timestamp::from_millis(MAX_TIMESTAMP))
    );
}
