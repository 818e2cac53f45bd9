//! The question-answering pipeline.
//!
//! One-way flow per question: embed the question, find the nearest FAQ,
//! decide whether the match is close enough to answer from, then either
//! rephrase the matched answer or return the fixed fallback. Service
//! failures propagate as errors; only "no relevant FAQ" produces the
//! fallback. Nothing is retained between questions.

use crate::openai::{Embedder, Generator, ServiceError};
use crate::store::{FaqStore, ScoredEntry, StoreError};

/// Reply used whenever no FAQ is judged relevant enough.
pub const FALLBACK_MESSAGE: &str = "I'm sorry, I couldn't find an answer to your question in our FAQs. Please contact our support team at support@techshop.com for further assistance.";

/// How many neighbors to retrieve; answering only ever uses the closest.
const TOP_K: usize = 1;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Outcome of the grounding decision for one question.
#[derive(Debug, Clone, PartialEq)]
pub enum Grounding {
    /// The nearest FAQ is close enough; its answer is the sole factual
    /// basis for the reply.
    Grounded { answer: String },
    /// No FAQ is relevant enough.
    Ungrounded,
}

/// Decide whether a retrieved neighbor grounds an answer.
///
/// Grounded iff a neighbor exists and its distance does not exceed the
/// threshold; equality counts as grounded.
pub fn decide(neighbor: Option<&ScoredEntry>, threshold: f32) -> Grounding {
    match neighbor {
        Some(scored) if scored.distance <= threshold => Grounding::Grounded {
            answer: scored.entry.answer.clone(),
        },
        _ => Grounding::Ungrounded,
    }
}

pub struct Pipeline {
    embedder: Box<dyn Embedder>,
    generator: Box<dyn Generator>,
    store: FaqStore,
    threshold: f32,
}

impl Pipeline {
    pub fn new(
        embedder: Box<dyn Embedder>,
        generator: Box<dyn Generator>,
        store: FaqStore,
        threshold: f32,
    ) -> Self {
        Self {
            embedder,
            generator,
            store,
            threshold,
        }
    }

    /// Embed `question` and fetch its single nearest FAQ, if any.
    ///
    /// The question text is embedded as-is; even a whitespace-only
    /// question goes to the embedding service unmodified.
    fn retrieve(&self, question: &str) -> Result<Option<ScoredEntry>, PipelineError> {
        let embedding = self.embedder.embed(question)?;
        let mut results = self.store.query(&embedding, TOP_K)?;
        Ok(if results.is_empty() {
            None
        } else {
            Some(results.remove(0))
        })
    }

    /// Answer one question. Returns either a grounded rephrasing of the
    /// best-matching FAQ answer or the fixed fallback message.
    pub fn ask(&self, question: &str) -> Result<String, PipelineError> {
        let neighbor = self.retrieve(question)?;

        if let Some(scored) = &neighbor {
            log::debug!(
                "nearest faq id={} distance={:.4} threshold={:.4}",
                scored.entry.id,
                scored.distance,
                self.threshold
            );
        } else {
            log::debug!("store returned no neighbors");
        }

        match decide(neighbor.as_ref(), self.threshold) {
            Grounding::Grounded { answer } => {
                let reply = self.generator.rephrase(question, &answer)?;
                Ok(reply)
            }
            Grounding::Ungrounded => Ok(FALLBACK_MESSAGE.to_string()),
        }
    }
}
