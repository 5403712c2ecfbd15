//! Answer generation with a hosted LLM
//!
//! A single request per question; there is no retry, a failed call fails the
//! turn.

use async_trait::async_trait;

use crate::Result;

/// Sampling temperature for every request. Answers should be reproducible.
pub const TEMPERATURE: f32 = 0.0;

/// Trait for language-model backends
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate an answer for a fully assembled prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;
}

mod groq;

pub use groq::*;
