use anyhow::Result;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub llm: LLMConfig,
    pub routing: RoutingConfig,
    pub catalog: CatalogConfig,
    pub system: SystemConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    pub model: String,
    /// Root of an OpenAI-compatible API, without the `/chat/completions` suffix
    pub base_url: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Ask the model to classify questions before falling back to heuristics
    pub use_classifier: bool,
    /// Upper bound for every classifier, generation and catalog call
    pub collaborator_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub database_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    pub channel_buffer_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MAX_TOKENS: u32 = 512;
const DEFAULT_TEMPERATURE: f32 = 0.3;
const DEFAULT_TIMEOUT_MS: u64 = 20_000;
const DEFAULT_DATABASE_PATH: &str = "pagila.db";
const DEFAULT_CHANNEL_BUFFER: usize = 64;

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config_env = env::var("CONFIG_ENV").unwrap_or_else(|_| "default".to_string());

        let config = Config::builder()
            .set_default("llm.model", DEFAULT_MODEL)?
            .set_default("llm.base_url", DEFAULT_BASE_URL)?
            .set_default("llm.max_tokens", DEFAULT_MAX_TOKENS as u64)?
            .set_default("llm.temperature", DEFAULT_TEMPERATURE as f64)?
            .set_default("routing.use_classifier", true)?
            .set_default("routing.collaborator_timeout_ms", DEFAULT_TIMEOUT_MS)?
            .set_default("catalog.database_path", DEFAULT_DATABASE_PATH)?
            .set_default("system.channel_buffer_size", DEFAULT_CHANNEL_BUFFER as u64)?
            .set_default("logging.level", "info")?
            .add_source(File::with_name(&format!("config/{}", config_env)).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    pub fn api_key() -> Result<String> {
        env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))
    }

    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.routing.collaborator_timeout_ms)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm: LLMConfig {
                model: DEFAULT_MODEL.to_string(),
                base_url: DEFAULT_BASE_URL.to_string(),
                max_tokens: DEFAULT_MAX_TOKENS,
                temperature: DEFAULT_TEMPERATURE,
            },
            routing: RoutingConfig {
                use_classifier: true,
                collaborator_timeout_ms: DEFAULT_TIMEOUT_MS,
            },
            catalog: CatalogConfig {
                database_path: DEFAULT_DATABASE_PATH.to_string(),
            },
            system: SystemConfig {
                channel_buffer_size: DEFAULT_CHANNEL_BUFFER,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}
