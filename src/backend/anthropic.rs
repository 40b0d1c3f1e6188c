//! Anthropic messages backend.

use async_trait::async_trait;
use base64::Engine as _;
use serde::Deserialize;

use super::{build_http_client, TokenUsage, VisionBackend, VisionResponse};
use crate::config::Configuration;
use crate::error::{BackendError, ConfigError};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const PROVIDER: &str = "anthropic";

pub struct AnthropicBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: Option<String>,
    max_tokens: u32,
}

impl AnthropicBackend {
    pub fn from_configuration(config: &Configuration) -> Result<Self, ConfigError> {
        let api_key = config
            .resolve_api_key("ANTHROPIC_API_KEY")
            .ok_or(ConfigError::MissingApiKey(PROVIDER))?;
        Ok(Self {
            client: build_http_client(config.request_timeout_secs)?,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            max_tokens: config.max_tokens,
        })
    }

    fn endpoint(&self) -> &str {
        self.base_url.as_deref().unwrap_or(ANTHROPIC_API_URL)
    }

    fn image_block(png: &[u8]) -> serde_json::Value {
        let encoded = base64::engine::general_purpose::STANDARD.encode(png);
        serde_json::json!({
            "type": "image",
            "source": {
                "type": "base64",
                "media_type": "image/png",
                "data": encoded,
            }
        })
    }

    fn build_request_body(
        &self,
        images: &[&[u8]],
        prompt: &str,
        temperature: f32,
    ) -> serde_json::Value {
        let mut content: Vec<serde_json::Value> =
            images.iter().map(|image| Self::image_block(image)).collect();
        content.push(serde_json::json!({ "type": "text", "text": prompt }));
        serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": temperature,
            "messages": [{ "role": "user", "content": content }],
        })
    }

    async fn send(
        &self,
        images: &[&[u8]],
        prompt: &str,
        temperature: f32,
    ) -> Result<VisionResponse, BackendError> {
        let body = self.build_request_body(images, prompt, temperature);
        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                provider: PROVIDER,
                status: status.as_u16(),
                message,
            });
        }

        let parsed: MessagesResponse = response.json().await?;
        let text: String = parsed
            .content
            .iter()
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("");
        if text.is_empty() {
            return Err(BackendError::EmptyResponse { provider: PROVIDER });
        }
        let usage = TokenUsage {
            input_tokens: parsed.usage.input_tokens,
            output_tokens: parsed.usage.output_tokens,
        };
        Ok(VisionResponse { text, usage })
    }
}

#[async_trait]
impl VisionBackend for AnthropicBackend {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn temperature_range(&self) -> (f32, f32) {
        // Anthropic's sampler tops out at 1.0, so the schedule takes the upper band.
        (0.4, 1.0)
    }

    async fn analyze_single(
        &self,
        image: &[u8],
        prompt: &str,
        temperature: f32,
    ) -> Result<VisionResponse, BackendError> {
        self.send(&[image], prompt, temperature).await
    }

    async fn analyze_pair(
        &self,
        image_a: &[u8],
        image_b: &[u8],
        prompt: &str,
        temperature: f32,
    ) -> Result<VisionResponse, BackendError> {
        self.send(&[image_a, image_b], prompt, temperature).await
    }
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: MessagesUsage,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct MessagesUsage {
    input_tokens: u64,
    output_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> AnthropicBackend {
        let configuration = Configuration {
            backend: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key: Some("sk-ant-test".to_string()),
            ..Configuration::default()
        };
        AnthropicBackend::from_configuration(&configuration).unwrap()
    }

    #[test]
    fn request_body_puts_images_before_text() {
        let body = backend().build_request_body(&[&[9, 9], &[8]], "look here", 0.7);
        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["type"], "image");
        assert_eq!(content[0]["source"]["media_type"], "image/png");
        assert_eq!(content[1]["type"], "image");
        assert_eq!(content[2]["type"], "text");
        assert_eq!(content[2]["text"], "look here");
        assert_eq!(body["model"], "claude-sonnet-4-20250514");
    }

    #[test]
    fn response_text_concatenates_blocks() {
        let raw = serde_json::json!({
            "content": [
                { "type": "text", "text": "{\"cells\":" },
                { "type": "text", "text": " [\"A1\"]}" }
            ],
            "usage": { "input_tokens": 40, "output_tokens": 9 }
        });
        let parsed: MessagesResponse = serde_json::from_value(raw).unwrap();
        let text: String = parsed
            .content
            .iter()
            .filter_map(|block| block.text.as_deref())
            .collect();
        assert_eq!(text, "{\"cells\": [\"A1\"]}");
        assert_eq!(parsed.usage.input_tokens, 40);
    }
}
