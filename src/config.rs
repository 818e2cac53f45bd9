use std::time::Duration;

use thiserror::Error;

/// Default OpenAI-compatible API base url
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Default embedding model
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
/// Default chat model for answer rephrasing
const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
/// Default grounding threshold on the cosine-distance scale [0, 2].
/// Tuned for text-embedding-3-small; a different embedding model
/// needs its own threshold.
const DEFAULT_DISTANCE_THRESHOLD: f32 = 0.3;
/// Default directory holding the FAQ source and the vector store
const DEFAULT_DATA_DIR: &str = "data";
/// Default timeout for embedding and chat requests in seconds
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone, Debug)]
pub struct Config {
    /// API key for the OpenAI-compatible backend
    pub api_key: String,

    /// Base url of the OpenAI-compatible backend, without a trailing slash
    pub base_url: String,

    /// Model used to embed FAQ questions and user questions
    pub embedding_model: String,

    /// Model used to rephrase retrieved answers
    pub chat_model: String,

    /// Maximum cosine distance at which a match is still grounded
    pub distance_threshold: f32,

    /// Directory holding the FAQ source and the persisted store
    pub data_dir: String,

    /// Timeout applied to each embedding and chat request
    pub http_timeout: Duration,
}

impl Config {
    /// Read the configuration from the environment, failing fast on
    /// missing or unparsable values. Nothing else in the crate touches
    /// env vars.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingVar("OPENAI_API_KEY"))?;

        let base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let embedding_model = std::env::var("FAQBOT_EMBEDDING_MODEL")
            .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string());

        let chat_model =
            std::env::var("FAQBOT_CHAT_MODEL").unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string());

        let distance_threshold = match std::env::var("FAQBOT_DISTANCE_THRESHOLD") {
            Ok(raw) => {
                let value = raw
                    .parse::<f32>()
                    .map_err(|err| ConfigError::InvalidVar {
                        name: "FAQBOT_DISTANCE_THRESHOLD",
                        value: raw.clone(),
                        reason: err.to_string(),
                    })?;
                if !(0.0..=2.0).contains(&value) {
                    return Err(ConfigError::InvalidVar {
                        name: "FAQBOT_DISTANCE_THRESHOLD",
                        value: raw,
                        reason: "must be between 0.0 and 2.0".to_string(),
                    });
                }
                value
            }
            Err(_) => DEFAULT_DISTANCE_THRESHOLD,
        };

        let data_dir =
            std::env::var("FAQBOT_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());

        let http_timeout = match std::env::var("FAQBOT_HTTP_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs = raw
                    .parse::<u64>()
                    .map_err(|err| ConfigError::InvalidVar {
                        name: "FAQBOT_HTTP_TIMEOUT_SECS",
                        value: raw.clone(),
                        reason: err.to_string(),
                    })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidVar {
                        name: "FAQBOT_HTTP_TIMEOUT_SECS",
                        value: raw,
                        reason: "must be greater than 0".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Config {
            api_key,
            base_url,
            embedding_model,
            chat_model,
            distance_threshold,
            data_dir,
            http_timeout,
        })
    }
}
