use gridfeed::error::GridFeedError;

#[test]
fn error_constructors_group_1() {
    assert!(matches!(
        GridFeedError::config("x"),
        GridFeedError::Config { .. }
    ));
    assert!(matches!(
        GridFeedError::validation("f", "m"),
        GridFeedError::Validation { .. }
    ));
    assert!(matches!(
        GridFeedError::serialization("x"),
        GridFeedError::Serialization { .. }
    ));
}

#[test]
fn error_constructors_group_2() {
    assert!(matches!(GridFeedError::io("x"), GridFeedError::Io { .. }));
}

#[test]
fn conversions_keep_their_category() {
    let io: GridFeedError = std::io::Error::other("disk").into();
    assert!(matches!(io, GridFeedError::Io { .. }));

    let json: GridFeedError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(json, GridFeedError::Serialization { .. }));

    let date: GridFeedError = chrono::DateTime::parse_from_rfc3339("yesterday")
        .unwrap_err()
        .into();
    assert!(matches!(
        date,
        GridFeedError::Validation { ref field, .. } if field == "datetime"
    ));
}

#[test]
fn display_messages() {
    let e = GridFeedError::validation("field", "bad");
    let s = format!("{}", e);
    assert!(s.contains("Validation error"));
    assert!(s.contains("field - bad"));
}
