//! Vision backend capability.
//!
//! The analysis core is written against [`VisionBackend`]: submit one or two
//! PNG images plus a prompt at a given temperature, get raw text and token
//! usage back. The backend does no validation of the text; callers decide
//! what shape they expect. Selection happens once at construction and the
//! handle is shared read-only across passes.

pub mod anthropic;
pub mod openai;
pub mod pricing;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Configuration;
use crate::error::{BackendError, ConfigError};

/// Token usage reported by one backend call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Raw text response from one vision call.
#[derive(Debug, Clone)]
pub struct VisionResponse {
    pub text: String,
    pub usage: TokenUsage,
}

#[async_trait]
pub trait VisionBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn model(&self) -> &str;

    /// Sampling range the consensus temperature schedule spreads across.
    fn temperature_range(&self) -> (f32, f32);

    async fn analyze_single(
        &self,
        image: &[u8],
        prompt: &str,
        temperature: f32,
    ) -> Result<VisionResponse, BackendError>;

    async fn analyze_pair(
        &self,
        image_a: &[u8],
        image_b: &[u8],
        prompt: &str,
        temperature: f32,
    ) -> Result<VisionResponse, BackendError>;
}

/// Build the configured backend. Fails before any network call.
pub fn build_backend(config: &Configuration) -> Result<Arc<dyn VisionBackend>, ConfigError> {
    match config.backend.as_str() {
        "openai" => Ok(Arc::new(openai::OpenAiBackend::from_configuration(config)?)),
        "anthropic" => Ok(Arc::new(anthropic::AnthropicBackend::from_configuration(
            config,
        )?)),
        other => Err(ConfigError::UnknownBackend(other.to_string())),
    }
}

pub(crate) fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}

#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// One call as the scripted backend saw it.
    #[derive(Debug, Clone)]
    pub struct RecordedCall {
        pub prompt: String,
        pub temperature: f32,
        pub image_count: usize,
    }

    /// Backend double that replays scripted responses and records every call.
    pub struct ScriptedBackend {
        model: String,
        responses: Mutex<VecDeque<Result<VisionResponse, BackendError>>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl ScriptedBackend {
        pub fn new(model: &str) -> Self {
            Self {
                model: model.to_string(),
                responses: Mutex::new(VecDeque::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn push_text(&self, text: &str, input_tokens: u64, output_tokens: u64) {
            self.responses
                .lock()
                .unwrap()
                .push_back(Ok(VisionResponse {
                    text: text.to_string(),
                    usage: TokenUsage {
                        input_tokens,
                        output_tokens,
                    },
                }));
        }

        pub fn push_failure(&self, message: &str) {
            self.responses
                .lock()
                .unwrap()
                .push_back(Err(BackendError::Api {
                    provider: "scripted",
                    status: 500,
                    message: message.to_string(),
                }));
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }

        fn next(
            &self,
            prompt: &str,
            temperature: f32,
            image_count: usize,
        ) -> Result<VisionResponse, BackendError> {
            self.calls.lock().unwrap().push(RecordedCall {
                prompt: prompt.to_string(),
                temperature,
                image_count,
            });
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("scripted responses exhausted")
        }
    }

    #[async_trait]
    impl VisionBackend for ScriptedBackend {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn model(&self) -> &str {
            &self.model
        }

        fn temperature_range(&self) -> (f32, f32) {
            (0.2, 0.8)
        }

        async fn analyze_single(
            &self,
            _image: &[u8],
            prompt: &str,
            temperature: f32,
        ) -> Result<VisionResponse, BackendError> {
            self.next(prompt, temperature, 1)
        }

        async fn analyze_pair(
            &self,
            _image_a: &[u8],
            _image_b: &[u8],
            prompt: &str,
            temperature: f32,
        ) -> Result<VisionResponse, BackendError> {
            self.next(prompt, temperature, 2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_backend_is_rejected_at_construction() {
        let configuration = Configuration {
            backend: "llava".to_string(),
            ..Configuration::default()
        };
        assert!(matches!(
            build_backend(&configuration),
            Err(ConfigError::UnknownBackend(name)) if name == "llava"
        ));
    }

    #[test]
    fn missing_key_is_rejected_at_construction() {
        let configuration = Configuration {
            backend: "anthropic".to_string(),
            api_key: None,
            ..Configuration::default()
        };
        // The conventional env var may be set in a developer shell; only
        // assert when the environment cannot satisfy the lookup.
        if std::env::var("ANTHROPIC_API_KEY").is_err() {
            assert!(matches!(
                build_backend(&configuration),
                Err(ConfigError::MissingApiKey("anthropic"))
            ));
        }
    }
}
