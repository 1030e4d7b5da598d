// tests/youtube_parse.rs
use creator_watch::platform::youtube::{
    parse_latest_upload, parse_live_search, parse_video_duration,
};

#[test]
fn live_search_yields_session_ref() {
    let body = include_str!("fixtures/youtube_search_live.json");
    let live = parse_live_search(body).unwrap().unwrap();

    assert_eq!(live.id, "a1B2c3D4e5F");
    // entities in API titles are decoded before display
    assert_eq!(live.title, "Friday night Q&A stream");
    assert_eq!(live.url, "https://www.youtube.com/watch?v=a1B2c3D4e5F");
}

#[test]
fn empty_search_means_not_live() {
    let body = include_str!("fixtures/youtube_search_empty.json");
    assert!(parse_live_search(body).unwrap().is_none());
}

#[test]
fn latest_upload_is_parsed() {
    let body = include_str!("fixtures/youtube_search_latest.json");
    let upload = parse_latest_upload(body).unwrap().unwrap();

    assert_eq!(upload.id, "zZ9y8X7w6V5");
    assert_eq!(upload.title, "How we built the summer tour set");
}

#[test]
fn durations_classify_shorts() {
    let short = include_str!("fixtures/youtube_videos_short.json");
    let long = include_str!("fixtures/youtube_videos_long.json");

    assert_eq!(parse_video_duration(short).unwrap(), Some(45));
    assert_eq!(parse_video_duration(long).unwrap(), Some(853));
}

#[test]
fn garbage_body_is_an_error() {
    assert!(parse_live_search("<html>rate limited</html>").is_err());
    assert!(parse_video_duration("").is_err());
}
