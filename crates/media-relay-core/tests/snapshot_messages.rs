use insta::assert_snapshot;
use media_relay_core::media::MediaInfo;
use media_relay_core::messages::usage_text;
use serde_json::json;

#[test]
fn test_usage_text_snapshot() {
    assert_snapshot!(usage_text(), @r"
    🎬 Send me a link from YouTube, Facebook, Instagram, etc.
    🟣 To get MP3 only, start your message with `audio` or `mp3`.
    ");
}

#[test]
fn test_media_summary_snapshot() {
    let info = MediaInfo::from_json(json!({
        "title": "Rick Astley - Never Gonna Give You Up (Official Music Video)",
        "duration": 212,
        "ext": "mp4"
    }));
    assert_snapshot!(info.summary_html(), @r"
    📌 <b>Title:</b> Rick Astley - Never Gonna Give You Up (Official Music Video)
    ⏱️ <b>Duration:</b> 3:32
    ");
}
