//! Chat client for the OpenAI-compatible chat completions endpoint.
//!
//! The generator never answers from its own knowledge. Every request
//! supplies the retrieved FAQ answer as the only source of fact and the
//! user's question for tone; temperature is pinned to 0.0.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{api_error_message, ServiceError};
use crate::config::Config;

const SERVICE: &str = "chat";

const SYSTEM_PROMPT: &str = "You are a customer support assistant for TechShop.";

/// Rephrases a retrieved FAQ answer in the user's direction. Only ever
/// called on the grounded path.
pub trait Generator: Send + Sync {
    fn rephrase(&self, question: &str, faq_answer: &str) -> Result<String, ServiceError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    // content is null for some model families mid-reasoning
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiChat {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl OpenAiChat {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.chat_model.clone(),
            timeout: config.http_timeout,
        }
    }
}

impl Generator for OpenAiChat {
    fn rephrase(&self, question: &str, faq_answer: &str) -> Result<String, ServiceError> {
        let prompt = grounded_prompt(question, faq_answer);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
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

        parse_chat_response(&body)
    }
}

/// The grounding contract: the FAQ answer is the sole source of fact,
/// the question sets tone only, and inventing details is forbidden.
fn grounded_prompt(question: &str, faq_answer: &str) -> String {
    format!(
        "Here is an answer from our FAQ knowledge base:\n{faq_answer}\n\n\
         A user asked:\n{question}\n\n\
         Using only the information from the FAQ answer above, reply in a \
         friendly and concise manner. Do not make up or change any details, \
         numbers, or names."
    )
}

/// Extract the reply text from a successful response body, trimmed of
/// surrounding whitespace.
fn parse_chat_response(body: &str) -> Result<String, ServiceError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|err| ServiceError::Malformed {
            service: SERVICE,
            reason: err.to_string(),
        })?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ServiceError::Malformed {
            service: SERVICE,
            reason: "response contained no message content".to_string(),
        })?;

    Ok(content.trim().to_string())
}
