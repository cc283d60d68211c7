#![cfg(all(feature = "stt", feature = "vision"))]

use mockito::Matcher;
use std::path::PathBuf;
use voice_assistant::{Assistant, AssistantConfig, AssistantInputs};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("flow-{}-{}", uuid::Uuid::new_v4(), name))
}

fn config_for(url: &str, out: &PathBuf) -> AssistantConfig {
    let mut config = AssistantConfig::from_yaml_str(&format!(
        r#"
groq_base_url: "{url}"
elevenlabs_base_url: "{url}"
gtts_base_url: "{url}"
voice_id: "v9"
autoplay: false
timeout_secs: 5
"#
    ))
    .unwrap();
    config.output_path = out.clone();
    config.groq_api_key = Some("gsk-test".into());
    config.elevenlabs_api_key = Some("el-test".into());
    config
}

#[test]
fn voice_question_becomes_spoken_answer() {
    let mut server = mockito::Server::new();
    let stt = server
        .mock("POST", "/v1/audio/transcriptions")
        .match_header("authorization", "Bearer gsk-test")
        .with_status(200)
        .with_body(r#"{"text":"My skin itches."}"#)
        .create();
    let chat = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::Regex("My skin itches.".into()))
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":"Try an unscented moisturizer."}}]}"#)
        .create();
    let speech = server
        .mock("POST", "/v1/text-to-speech/v9")
        .match_query(Matcher::Any)
        .match_header("xi-api-key", "el-test")
        .with_status(200)
        .with_body(b"ID3answer".as_slice())
        .create();

    let question = temp_path("question.mp3");
    std::fs::write(&question, b"fake recording").unwrap();
    let out = temp_path("final.mp3");

    let assistant = Assistant::from_config(&config_for(&server.url(), &out)).unwrap();
    let reply = assistant.process(&AssistantInputs {
        audio: Some(question.clone()),
        image: None,
    });

    stt.assert();
    chat.assert();
    speech.assert();
    assert_eq!(reply.transcript, "My skin itches.");
    assert_eq!(reply.answer, "Try an unscented moisturizer.");
    assert_eq!(reply.audio.map(|a| a.path), Some(out.clone()));
    assert_eq!(std::fs::read(&out).unwrap(), b"ID3answer");

    std::fs::remove_file(question).ok();
    std::fs::remove_file(out).ok();
}

#[test]
fn transcription_failure_stops_before_the_model() {
    let mut server = mockito::Server::new();
    let _stt = server
        .mock("POST", "/v1/audio/transcriptions")
        .with_status(500)
        .with_body("whisper down")
        .create();
    let chat = server.mock("POST", "/v1/chat/completions").expect(0).create();

    let question = temp_path("question.wav");
    std::fs::write(&question, b"RIFF").unwrap();
    let out = temp_path("final.mp3");

    let assistant = Assistant::from_config(&config_for(&server.url(), &out)).unwrap();
    let reply = assistant.process(&AssistantInputs {
        audio: Some(question.clone()),
        image: None,
    });

    chat.assert();
    assert!(reply.answer.starts_with("Error transcribing audio: "), "{}", reply.answer);
    assert!(reply.audio.is_none());
    assert!(!out.exists());
    std::fs::remove_file(question).ok();
}

#[test]
fn model_failure_is_spoken_back() {
    let mut server = mockito::Server::new();
    let _chat = server
        .mock("POST", "/v1/chat/completions")
        .with_status(429)
        .with_body("rate limited")
        .create();
    let _speech = server
        .mock("POST", "/v1/text-to-speech/v9")
        .match_query(Matcher::Any)
        .match_body(Matcher::Regex("Error running model".into()))
        .with_status(200)
        .with_body(b"ID3err".as_slice())
        .create();

    let image = temp_path("rash.jpg");
    std::fs::write(&image, b"\xff\xd8\xff").unwrap();
    let out = temp_path("final.mp3");

    let assistant = Assistant::from_config(&config_for(&server.url(), &out)).unwrap();
    let reply = assistant.process(&AssistantInputs {
        audio: None,
        image: Some(image.clone()),
    });

    assert!(reply.answer.starts_with("Error running model: "), "{}", reply.answer);
    assert!(reply.answer.contains("429"));
    assert!(reply.audio.is_some());
    std::fs::remove_file(image).ok();
    std::fs::remove_file(out).ok();
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let mut config = AssistantConfig::default();
    config.timeout_secs = 0;
    config.autoplay = false;
    assert!(Assistant::from_config(&config).is_err());
}
