//! OpenAI-compatible chat-completions backend.

use async_trait::async_trait;
use base64::Engine as _;
use serde::Deserialize;

use super::{build_http_client, TokenUsage, VisionBackend, VisionResponse};
use crate::config::Configuration;
use crate::error::{BackendError, ConfigError};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const PROVIDER: &str = "openai";

pub struct OpenAiBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: Option<String>,
    max_tokens: u32,
}

impl OpenAiBackend {
    pub fn from_configuration(config: &Configuration) -> Result<Self, ConfigError> {
        let api_key = config
            .resolve_api_key("OPENAI_API_KEY")
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
        self.base_url.as_deref().unwrap_or(OPENAI_API_URL)
    }

    fn image_part(png: &[u8]) -> serde_json::Value {
        let encoded = base64::engine::general_purpose::STANDARD.encode(png);
        serde_json::json!({
            "type": "image_url",
            "image_url": { "url": format!("data:image/png;base64,{encoded}") }
        })
    }

    fn build_request_body(
        &self,
        images: &[&[u8]],
        prompt: &str,
        temperature: f32,
    ) -> serde_json::Value {
        let mut content = vec![serde_json::json!({ "type": "text", "text": prompt })];
        for image in images {
            content.push(Self::image_part(image));
        }
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
            .bearer_auth(&self.api_key)
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

        let parsed: ChatResponse = response.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(BackendError::EmptyResponse { provider: PROVIDER })?;
        let usage = parsed
            .usage
            .map(|usage| TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            })
            .unwrap_or_default();
        Ok(VisionResponse { text, usage })
    }
}

#[async_trait]
impl VisionBackend for OpenAiBackend {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn temperature_range(&self) -> (f32, f32) {
        (0.2, 0.8)
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
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}
