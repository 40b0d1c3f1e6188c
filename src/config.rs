use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Process configuration: defaults, then an optional `gridsight.toml`,
/// then `GRIDSIGHT_*` environment overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Backend family: "openai" or "anthropic".
    pub backend: String,
    pub model: String,
    /// Explicit key; falls back to the family's conventional env var.
    pub api_key: Option<String>,
    /// Override for the backend endpoint (proxies, compatible servers).
    pub base_url: Option<String>,
    pub num_passes: usize,
    pub contiguous_regions: bool,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    /// Approximate cell edge in pixels when deriving the grid from image size.
    pub target_cell_px: u32,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            backend: "openai".to_string(),
            model: "gpt-4o".to_string(),
            api_key: None,
            base_url: None,
            num_passes: 4,
            contiguous_regions: false,
            max_tokens: 2048,
            request_timeout_secs: 120,
            target_cell_px: 64,
        }
    }
}

impl Configuration {
    pub fn load() -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(config::File::with_name("gridsight").required(false))
            .add_source(config::Environment::with_prefix("GRIDSIGHT"))
            .build()?;
        let configuration: Self = settings.try_deserialize()?;
        configuration.validate()?;
        Ok(configuration)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_passes < 1 {
            return Err(ConfigError::InvalidPassCount(self.num_passes));
        }
        Ok(())
    }

    /// Configured key, or the conventional env var for the backend family.
    pub fn resolve_api_key(&self, env_var: &str) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(env_var).ok())
    }
}
