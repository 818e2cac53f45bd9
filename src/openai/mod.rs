pub mod chat;
pub mod embeddings;

pub use chat::{Generator, OpenAiChat};
pub use embeddings::{Embedder, OpenAiEmbeddings};

use serde::Deserialize;
use thiserror::Error;

/// Failure of an embedding or chat request. Always a hard error for the
/// caller; never turned into a fallback reply.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        source: reqwest::Error,
    },

    #[error("{service} API error ({status}): {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("{service} returned a malformed response: {reason}")]
    Malformed {
        service: &'static str,
        reason: String,
    },
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Extract the human-readable message from an OpenAI-style error body,
/// falling back to the raw body when it isn't the usual envelope.
pub(crate) fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body.trim().to_string(),
    }
}
