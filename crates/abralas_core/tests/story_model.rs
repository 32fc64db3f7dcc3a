use abralas_core::model::feed::{decode_feed, encode_feed};
use abralas_core::{seed_story, Story, StoryValidationError, ANONYMOUS_NAME, SEED_STORY_ID};
use chrono::{DateTime, Utc};

fn at(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap()
}

#[test]
fn submitted_story_sets_defaults() {
    let story = Story::submitted("1700000000000", None, Some("olá"), at(1_700_000_000_000)).unwrap();

    assert_eq!(story.name, ANONYMOUS_NAME);
    assert_eq!(story.email.as_deref(), Some("anon@abralas.com"));
    assert_eq!(story.energy, 0);
    assert_eq!(story.issued_at_ms(), Some(1_700_000_000_000));
}

#[test]
fn submitted_story_requires_content_and_id() {
    assert_eq!(
        Story::submitted("1", Some("x"), None, at(0)).unwrap_err(),
        StoryValidationError::EmptyContent
    );
    assert_eq!(
        Story::submitted(" ", Some("x"), Some("body"), at(0)).unwrap_err(),
        StoryValidationError::EmptyId
    );
}

#[test]
fn story_serializes_with_feed_wire_fields() {
    let story = Story::submitted("1700000000123", Some("Ana"), Some("relato"), at(1_700_000_000_123))
        .unwrap();

    let json = serde_json::to_value(&story).unwrap();
    assert_eq!(json["id"], "1700000000123");
    assert_eq!(json["name"], "Ana");
    assert_eq!(json["email"], "anon@abralas.com");
    assert_eq!(json["content"], "relato");
    assert_eq!(json["date"], "2023-11-14T22:13:20.123Z");
    assert_eq!(json["energy"], 0);
}

#[test]
fn seed_story_omits_email() {
    let json = serde_json::to_value(seed_story()).unwrap();
    assert_eq!(json["id"], SEED_STORY_ID);
    assert!(json.get("email").is_none());
}

#[test]
fn whole_second_dates_keep_millisecond_fraction() {
    let json = serde_json::to_value(seed_story()).unwrap();
    assert_eq!(json["date"], "2025-01-01T00:00:00.000Z");

    let story = Story::submitted("1", None, Some("x"), at(1_700_000_000_000)).unwrap();
    let json = serde_json::to_value(&story).unwrap();
    assert_eq!(json["date"], "2023-11-14T22:13:20.000Z");
}

#[test]
fn decode_accepts_offset_dates() {
    let raw = r#"[{"id":"1","name":"a","content":"b","date":"2023-11-14T19:13:20.000-03:00"}]"#;
    let feed = decode_feed(raw).unwrap();
    assert_eq!(feed[0].date, at(1_700_000_000_000));
}

#[test]
fn decode_accepts_browser_written_feed_without_energy() {
    let raw = r#"[
        {"id":"1718000000000","name":"Anônimo","email":"anon@abralas.com","content":"antigo","date":"2024-06-10T06:13:20.000Z"},
        {"id":"init-1","name":"Sistema","content":"O Grimório está aberto.","date":"2024-06-01T00:00:00.000Z","energy":3}
    ]"#;

    let feed = decode_feed(raw).unwrap();
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0].energy, 0);
    assert_eq!(feed[0].date, at(1_718_000_000_000));
    assert_eq!(feed[1].energy, 3);
    assert_eq!(feed[1].email, None);
}

#[test]
fn encoded_feed_preserves_order() {
    let feed = vec![
        Story::submitted("2", None, Some("b"), at(2)).unwrap(),
        Story::submitted("1", None, Some("a"), at(1)).unwrap(),
        seed_story(),
    ];
    let decoded = decode_feed(&encode_feed(&feed).unwrap()).unwrap();
    let ids: Vec<_> = decoded.iter().map(|story| story.id.as_str()).collect();
    assert_eq!(ids, ["2", "1", SEED_STORY_ID]);
}
