//! Vision-language chat client.

use super::types::{ContentPart, EncodedImage, Message, MessageContent};
use crate::config;
use crate::transport::{Auth, HttpTransport};
use crate::{Error, ErrorContext, Result};
use serde::Deserialize;
use tracing::info;

pub struct VisionClient {
    transport: HttpTransport,
    model: String,
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl VisionClient {
    pub fn builder() -> VisionClientBuilder {
        VisionClientBuilder::new()
    }

    /// Ask `query` about an optional image; returns the first choice's text.
    pub fn analyze(&self, query: &str, image: Option<&EncodedImage>) -> Result<String> {
        let mut parts = vec![ContentPart::text(query)];
        if let Some(image) = image {
            parts.push(ContentPart::image(image));
        }
        let messages = vec![Message::user(MessageContent::Parts(parts))];
        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });

        info!(model = %self.model, with_image = image.is_some(), "querying vision model");
        let completion: ChatCompletion = self
            .transport
            .post_json("/v1/chat/completions", &[], &body)?
            .json()?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                Error::validation_with_context(
                    "chat completion had no content",
                    ErrorContext::new()
                        .with_field_path("choices[0].message.content")
                        .with_source("vision"),
                )
            })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

pub struct VisionClientBuilder {
    model: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: u64,
}

impl VisionClientBuilder {
    pub fn new() -> Self {
        Self {
            model: None,
            api_key: None,
            base_url: None,
            timeout_secs: 60,
        }
    }
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn build(self) -> Result<VisionClient> {
        let model = self
            .model
            .ok_or_else(|| Error::configuration("Model must be specified"))?;
        let api_key = self
            .api_key
            .or_else(|| config::lookup_api_key(config::GROQ))
            .ok_or_else(|| {
                Error::configuration_with_context(
                    "API key required",
                    ErrorContext::new().with_field_path("GROQ_API_KEY").with_source("vision"),
                )
            })?;
        let base_url = self
            .base_url
            .unwrap_or_else(|| "https://api.groq.com/openai".to_string());
        Ok(VisionClient {
            transport: HttpTransport::new(&base_url, Auth::Bearer(api_key), self.timeout_secs)?,
            model,
        })
    }
}

impl Default for VisionClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: String) -> VisionClient {
        VisionClient::builder()
            .model("meta-llama/llama-4-scout-17b-16e-instruct")
            .api_key("test-key")
            .base_url(url)
            .build()
            .unwrap()
    }

    #[test]
    fn returns_first_choice_content() {
        let mut server = mockito::Server::new();
        let m = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(mockito::Matcher::Regex("data:image/png;base64,".into()))
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Looks like mild acne."}}]}"#)
            .create();

        let image = EncodedImage::from_bytes(b"\x89PNG", "image/png");
        let answer = client(server.url()).analyze("What is wrong?", Some(&image)).unwrap();
        assert_eq!(answer, "Looks like mild acne.");
        m.assert();
    }

    #[test]
    fn empty_choices_is_an_error() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create();
        let err = client(server.url()).analyze("hi", None).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }
}
