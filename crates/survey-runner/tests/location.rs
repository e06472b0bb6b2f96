use serde_json::json;

use survey_runner::{Location, LocationParseError};

#[test]
fn url_for_plain_location() {
    let location = Location::new("default-section", "name-block");
    assert_eq!(location.url(), "/questionnaire/default-section/name-block/");
    assert_eq!(location.to_string(), location.url());
}

#[test]
fn url_for_list_item_location() {
    let location = Location::for_list_item("personal-details-section", "proxy", "people", "abc123");
    assert_eq!(
        location.url(),
        "/questionnaire/personal-details-section/people/abc123/proxy/"
    );
}

#[test]
fn parses_both_url_forms() {
    let plain: Location = "/questionnaire/default-section/name-block/"
        .parse()
        .expect("plain url");
    assert_eq!(plain, Location::new("default-section", "name-block"));

    let item: Location = "/questionnaire/personal-details-section/people/abc123/proxy"
        .parse()
        .expect("list item url");
    assert_eq!(item.list_name(), Some("people"));
    assert_eq!(item.list_item_id(), Some("abc123"));
    assert_eq!(item.block_id(), "proxy");
}

#[test]
fn segments_are_percent_encoded() {
    let location = Location::new("section one", "block/2");
    assert_eq!(location.url(), "/questionnaire/section%20one/block%2F2/");
    let parsed: Location = location.url().parse().expect("encoded url");
    assert_eq!(parsed, location);
}

#[test]
fn rejects_malformed_urls() {
    assert!(matches!(
        "/survey/default-section/name-block/".parse::<Location>(),
        Err(LocationParseError::MissingPrefix(_))
    ));
    assert!(matches!(
        "/questionnaire/default-section/".parse::<Location>(),
        Err(LocationParseError::SegmentCount { count: 1, .. })
    ));
    assert!(matches!(
        "/questionnaire/default-section/people/name-block/".parse::<Location>(),
        Err(LocationParseError::SegmentCount { count: 3, .. })
    ));
    assert!(matches!(
        "/questionnaire//name-block/".parse::<Location>(),
        Err(LocationParseError::EmptySegment(_))
    ));
    assert!(matches!(
        "/questionnaire/default-section/%FF/".parse::<Location>(),
        Err(LocationParseError::InvalidEncoding(_))
    ));
}

#[test]
fn empty_ids_do_not_round_trip() {
    let location = Location::new("", "name-block");
    assert_eq!(location.url(), "/questionnaire//name-block/");
    assert!(matches!(
        location.url().parse::<Location>(),
        Err(LocationParseError::EmptySegment(_))
    ));
}

#[test]
fn serializes_as_object_without_empty_list_fields() {
    let plain = serde_json::to_value(Location::new("default-section", "name-block"))
        .expect("serialize");
    assert_eq!(
        plain,
        json!({ "section_id": "default-section", "block_id": "name-block" })
    );

    let item: Location = serde_json::from_value(json!({
        "section_id": "personal-details-section",
        "block_id": "proxy",
        "list_name": "people",
        "list_item_id": "abc123"
    }))
    .expect("deserialize");
    assert_eq!(
        item,
        Location::for_list_item("personal-details-section", "proxy", "people", "abc123")
    );
}
