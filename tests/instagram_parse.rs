// tests/instagram_parse.rs
use creator_watch::platform::instagram::{parse_latest_story, parse_profile};

#[test]
fn profile_yields_user_id_and_latest_post() {
    let body = include_str!("fixtures/instagram_profile.json");
    let feed = parse_profile(body, "tedtalks").unwrap();

    assert_eq!(feed.user_id, "8312467291");
    let post = feed.latest_post.unwrap();
    assert_eq!(post.id, "3412598761234567890");
    assert_eq!(post.title, "Behind the scenes at the studio");
    assert_eq!(post.url, "https://www.instagram.com/p/C9xYzAbCdEf/");
}

#[test]
fn captionless_post_falls_back_to_handle() {
    let body = include_str!("fixtures/instagram_profile_no_caption.json");
    let feed = parse_profile(body, "tedtalks").unwrap();

    let post = feed.latest_post.unwrap();
    assert_eq!(post.title, "@tedtalks");
}

#[test]
fn latest_story_uses_pk_from_composite_id() {
    let body = include_str!("fixtures/instagram_reels.json");
    let story = parse_latest_story(body, "tedtalks").unwrap().unwrap();

    assert_eq!(story.id, "3412601234567890123");
    assert_eq!(
        story.url,
        "https://www.instagram.com/stories/tedtalks/3412601234567890123/"
    );
}

#[test]
fn no_active_story_is_none() {
    let body = include_str!("fixtures/instagram_reels_empty.json");
    assert!(parse_latest_story(body, "tedtalks").unwrap().is_none());
}

#[test]
fn missing_user_is_an_error() {
    let err = parse_profile(r#"{"data":{"user":null},"status":"ok"}"#, "tedtalks")
        .unwrap_err()
        .to_string();
    assert!(err.contains("tedtalks"));
}
