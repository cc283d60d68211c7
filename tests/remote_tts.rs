//! ElevenLabs and gTTS clients against a local mock server.

use mockito::Matcher;
use std::path::PathBuf;
use voice_assistant::tts::{
    drain, ElevenLabsClient, GttsClient, Normalizer, SpeechClient, SpeechPipeline, SynthesisResult,
    DEFAULT_VOICE_ID,
};
use voice_assistant::{Error, NoopPlayer};

fn temp_path(ext: &str) -> PathBuf {
    std::env::temp_dir().join(format!("remote-{}.{}", uuid::Uuid::new_v4(), ext))
}

fn eleven(url: String) -> ElevenLabsClient {
    ElevenLabsClient::builder()
        .api_key("el-test")
        .base_url(url)
        .voice_id("voice1")
        .build()
        .unwrap()
}

#[test]
fn convert_posts_text_and_writes_body() {
    let mut server = mockito::Server::new();
    let m = server
        .mock("POST", "/v1/text-to-speech/voice1")
        .match_header("xi-api-key", "el-test")
        .match_query(Matcher::UrlEncoded("output_format".into(), "mp3_44100_128".into()))
        .match_body(Matcher::PartialJson(serde_json::json!({
            "text": "hello",
            "model_id": "eleven_multilingual_v2"
        })))
        .with_status(200)
        .with_header("content-type", "audio/mpeg")
        .with_body(b"ID3\x04audio".as_slice())
        .create();

    let client = eleven(server.url());
    let out = temp_path("mp3");
    let file = SpeechPipeline::new(Normalizer::new(NoopPlayer))
        .run(&client, &client.request("hello"), &out)
        .unwrap();

    m.assert();
    assert_eq!(file.bytes_written, 9);
    assert_eq!(std::fs::read(&out).unwrap(), b"ID3\x04audio");
    std::fs::remove_file(out).ok();
}

#[test]
fn stream_endpoint_drains_whole_body() {
    let body: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
    let mut server = mockito::Server::new();
    let _m = server
        .mock("POST", "/v1/text-to-speech/voice1/stream")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(body.clone())
        .create();

    let client = eleven(server.url());
    let stream = client.entry_point("stream").unwrap();
    let request = client.request("a longer answer");
    let result = stream(voice_assistant::tts::CallArgs::Full(&request)).unwrap();

    let chunks = match result {
        SynthesisResult::ChunkStream(chunks) => chunks,
        other => panic!("expected a chunk stream, got {other:?}"),
    };
    assert_eq!(drain(chunks).unwrap().to_vec(), body);
}

#[test]
fn rejected_key_is_a_remote_error() {
    let mut server = mockito::Server::new();
    let _m = server
        .mock("POST", "/v1/text-to-speech/voice1")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"detail":{"status":"invalid_api_key"}}"#)
        .create();

    let client = eleven(server.url());
    let err = client.convert(&client.request("hello")).unwrap_err();
    match err {
        Error::Remote { status, message } => {
            assert_eq!(status, 401);
            assert!(message.contains("invalid_api_key"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn voice_is_discovered_from_listing() {
    let mut server = mockito::Server::new();
    let _m = server
        .mock("GET", "/v1/voices")
        .with_status(200)
        .with_body(r#"{"voices":[{"voice_id":"abc123","name":"Rachel"},{"voice_id":"zzz"}]}"#)
        .create();

    let client = ElevenLabsClient::builder()
        .api_key("el-test")
        .base_url(server.url())
        .build()
        .unwrap();
    assert_eq!(client.resolve_voice_id(), "abc123");
}

#[test]
fn voice_listing_failure_uses_default() {
    let mut server = mockito::Server::new();
    let _m = server.mock("GET", "/v1/voices").with_status(500).create();

    let client = ElevenLabsClient::builder()
        .api_key("el-test")
        .base_url(server.url())
        .build()
        .unwrap();
    assert_eq!(client.resolve_voice_id(), DEFAULT_VOICE_ID);
}

#[test]
fn gtts_is_reached_through_speak_and_saves_itself() {
    let mut server = mockito::Server::new();
    let m = server
        .mock("GET", "/translate_tts")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "hello world".into()),
            Matcher::UrlEncoded("tl".into(), "en".into()),
            Matcher::UrlEncoded("client".into(), "tw-ob".into()),
        ]))
        .with_status(200)
        .with_body(b"\xff\xf3gtts".as_slice())
        .create();

    let client = GttsClient::with_base_url(&server.url(), "en", 5).unwrap();
    let out = temp_path("mp3");
    let file = SpeechPipeline::new(Normalizer::new(NoopPlayer))
        .run(&client, &voice_assistant::SpeechRequest::new("hello world"), &out)
        .unwrap();

    m.assert();
    assert_eq!(file.bytes_written, 6);
    assert_eq!(std::fs::read(&out).unwrap(), b"\xff\xf3gtts");
    std::fs::remove_file(out).ok();
}

#[test]
fn gtts_failure_is_not_fetched_twice() {
    let mut server = mockito::Server::new();
    let m = server
        .mock("GET", "/translate_tts")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("upstream")
        .expect(1)
        .create();

    let client = GttsClient::with_base_url(&server.url(), "en", 5).unwrap();
    let out = temp_path("mp3");
    let err = SpeechPipeline::new(Normalizer::new(NoopPlayer))
        .run(&client, &voice_assistant::SpeechRequest::new("hello"), &out)
        .unwrap_err();

    m.assert();
    match err {
        Error::UnsupportedResponseShape { type_name } => assert_eq!(type_name, "gtts::GttsAudio"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!out.exists());
}

#[test]
fn gtts_slow_speech_fetches_each_part() {
    let mut server = mockito::Server::new();
    let m = server
        .mock("GET", "/translate_tts")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("ttsspeed".into(), "0.3".into()),
            Matcher::UrlEncoded("total".into(), "2".into()),
        ]))
        .with_status(200)
        .with_body(b"ab".as_slice())
        .expect(2)
        .create();

    let client = GttsClient::with_base_url(&server.url(), "en", 5).unwrap().slow(true);
    let text = format!("{} {}", "a".repeat(60), "b".repeat(60));
    let audio = client.speak(&text).unwrap();
    assert_eq!(audio.parts().len(), 2);

    let out = temp_path("mp3");
    voice_assistant::tts::resolve(SynthesisResult::FileSaver(Box::new(audio)), &out).unwrap();

    m.assert();
    assert_eq!(std::fs::read(&out).unwrap(), b"abab");
    std::fs::remove_file(out).ok();
}
