//! Embedding client for the OpenAI-compatible embeddings endpoint.
//!
//! The rest of the crate treats embedding as a black box behind the
//! [`Embedder`] trait: text in, fixed-length vector out. The persisted
//! store records which model produced its vectors via [`Embedder::fingerprint`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{api_error_message, ServiceError};
use crate::config::Config;

const SERVICE: &str = "embeddings";

/// Turns text into a fixed-length vector. Implementations must produce
/// the same dimensionality for every call.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError>;

    /// Name of the underlying embedding model.
    fn model_name(&self) -> &str;

    /// SHA256 of the model name, stored in the collection header so a
    /// store built by one model is never queried with another.
    fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.model_name().as_bytes());
        hasher.finalize().into()
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

pub struct OpenAiEmbeddings {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl OpenAiEmbeddings {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.embedding_model.clone(),
            timeout: config.http_timeout,
        }
    }
}

impl Embedder for OpenAiEmbeddings {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: text,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .map_err(|source| ServiceError::Transport {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|source| ServiceError::Transport {
                service: SERVICE,
                source,
            })?;

        if !status.is_success() {
            return Err(ServiceError::Api {
                service: SERVICE,
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        parse_embedding_response(&body)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Extract the single embedding vector from a successful response body.
fn parse_embedding_response(body: &str) -> Result<Vec<f32>, ServiceError> {
    let parsed: EmbeddingResponse =
        serde_json::from_str(body).map_err(|err| ServiceError::Malformed {
            service: SERVICE,
            reason: err.to_string(),
        })?;

    let embedding = parsed
        .data
        .into_iter()
        .next()
        .map(|data| data.embedding)
        .ok_or_else(|| ServiceError::Malformed {
            service: SERVICE,
            reason: "response contained no embeddings".to_string(),
        })?;

    if embedding.is_empty() {
        return Err(ServiceError::Malformed {
            service: SERVICE,
            reason: "response contained an empty embedding".to_string(),
        });
    }

    Ok(embedding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_embedding_payload() {
        let body = r#"{
            "object": "list",
            "data": [{"object": "embedding", "index": 0, "embedding": [0.1, -0.2, 0.3]}],
            "model": "text-embedding-3-small",
            "usage": {"prompt_tokens": 4, "total_tokens": 4}
        }"#;
        let embedding = parse_embedding_response(body).unwrap();
        assert_eq!(embedding, vec![0.1, -0.2, 0.3]);
    }

    #[test]
    fn empty_data_is_malformed() {
        let err = parse_embedding_response(r#"{"data": []}"#).unwrap_err();
        assert!(matches!(err, ServiceError::Malformed { .. }));
    }

    #[test]
    fn empty_vector_is_malformed() {
        let err = parse_embedding_response(r#"{"data": [{"embedding": []}]}"#).unwrap_err();
        assert!(matches!(err, ServiceError::Malformed { .. }));
    }

    #[test]
    fn invalid_json_is_malformed() {
        assert!(parse_embedding_response("not json").is_err());
    }

    #[test]
    fn fingerprint_tracks_model_name() {
        struct Named(&'static str);
        impl Embedder for Named {
            fn embed(&self, _text: &str) -> Result<Vec<f32>, ServiceError> {
                unreachable!()
            }
            fn model_name(&self) -> &str {
                self.0
            }
        }

        assert_eq!(Named("model-a").fingerprint(), Named("model-a").fingerprint());
        assert_ne!(Named("model-a").fingerprint(), Named("model-b").fingerprint());
    }
}
