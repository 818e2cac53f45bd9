//! Crate-level integration tests with fake service backends.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::openai::{Embedder, Generator, ServiceError};

mod rebuild;

/// Deterministic embedder: a fixed vocabulary of text -> vector, plus a
/// far-away default for anything unknown. No network involved.
pub struct FakeEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    unknown: Vec<f32>,
    calls: Arc<AtomicUsize>,
}

impl FakeEmbedder {
    pub fn new(pairs: &[(&str, Vec<f32>)], unknown: Vec<f32>) -> Self {
        Self {
            vectors: pairs
                .iter()
                .map(|(text, vector)| (text.to_string(), vector.clone()))
                .collect(),
            unknown,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl Embedder for FakeEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.unknown.clone()))
    }

    fn model_name(&self) -> &str {
        "fake-embedder"
    }
}

/// Embedder that always fails, for error-propagation tests.
pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>, ServiceError> {
        Err(ServiceError::Api {
            service: "embeddings",
            status: 503,
            message: "embedding backend down".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "failing-embedder"
    }
}

/// Generator that wraps the grounded answer in a fixed template, so
/// tests can check both that it ran and that the matched answer's facts
/// reached it.
pub struct FakeGenerator {
    calls: Arc<AtomicUsize>,
}

impl FakeGenerator {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl Generator for FakeGenerator {
    fn rephrase(&self, _question: &str, faq_answer: &str) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("Happy to help! {faq_answer}"))
    }
}

/// Generator that always fails, for error-propagation tests.
pub struct FailingGenerator;

impl Generator for FailingGenerator {
    fn rephrase(&self, _question: &str, _faq_answer: &str) -> Result<String, ServiceError> {
        Err(ServiceError::Api {
            service: "chat",
            status: 500,
            message: "chat backend down".to_string(),
        })
    }
}
