use energidataservice::error::EdsError;

#[test]
fn error_constructors_group_1() {
    assert!(matches!(EdsError::config("x"), EdsError::Config { .. }));
    assert!(matches!(
        EdsError::validation("f", "m"),
        EdsError::Validation { .. }
    ));
    assert!(matches!(EdsError::template("x"), EdsError::Template { .. }));
    assert!(matches!(EdsError::currency("x"), EdsError::Currency { .. }));
}

#[test]
fn error_constructors_group_2() {
    assert!(matches!(EdsError::network("x"), EdsError::Network { .. }));
    assert!(matches!(EdsError::api("x"), EdsError::Api { .. }));
    assert!(matches!(EdsError::io("x"), EdsError::Io { .. }));
    assert!(matches!(EdsError::generic("x"), EdsError::Generic { .. }));
}

#[test]
fn conversions_from_library_errors() {
    let yaml = serde_yaml::from_str::<Vec<u32>>("[unclosed").unwrap_err();
    assert!(matches!(EdsError::from(yaml), EdsError::Serialization { .. }));

    let json = serde_json::from_str::<Vec<u32>>("{").unwrap_err();
    assert!(matches!(EdsError::from(json), EdsError::Serialization { .. }));

    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    assert!(matches!(EdsError::from(io), EdsError::Io { .. }));
}

#[test]
fn display_messages() {
    let s = format!("{}", EdsError::validation("pricetype", "bad"));
    assert!(s.contains("Validation error"));
    assert!(s.contains("pricetype"));
    assert!(format!("{}", EdsError::template("x")).contains("Template error"));
}
