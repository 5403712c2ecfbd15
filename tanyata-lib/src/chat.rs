//! Question answering over the index, and the session's chat log
//!
//! Every question is answered on its own; earlier turns are kept for
//! display only and never reach retrieval or generation.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::embed::Embedder;
use crate::generate::Generator;
use crate::prompt::PromptTemplate;
use crate::search::Retriever;
use crate::store::{SearchResult, VectorStore};
use crate::Result;

/// Retrieved context and the prompt built from it.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub sources: Vec<SearchResult>,
    pub prompt: String,
}

/// A generated answer.
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<SearchResult>,
    /// Retrieval plus generation
    pub elapsed: Duration,
}

/// Retrieval-augmented assistant. Built once per process and reused for
/// every turn.
pub struct Assistant<E: Embedder, S: VectorStore, G: Generator> {
    retriever: Retriever<E, S>,
    template: PromptTemplate,
    generator: G,
    top_k: usize,
}

impl<E: Embedder, S: VectorStore, G: Generator> Assistant<E, S, G> {
    pub fn new(
        retriever: Retriever<E, S>,
        template: PromptTemplate,
        generator: G,
        top_k: usize,
    ) -> Self {
        Self {
            retriever,
            template,
            generator,
            top_k,
        }
    }

    #[must_use]
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    #[must_use]
    pub fn retriever(&self) -> &Retriever<E, S> {
        &self.retriever
    }

    #[must_use]
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Retrieve context for `question` and assemble the prompt.
    pub fn prepare(&mut self, question: &str) -> Result<Prepared> {
        let sources = self.retriever.retrieve(question, self.top_k)?;
        let prompt = self.template.render(&sources, question);
        Ok(Prepared { sources, prompt })
    }

    /// Answer `question` from the indexed document.
    pub async fn ask(&mut self, question: &str) -> Result<Answer> {
        let started = Instant::now();
        let Prepared { sources, prompt } = self.prepare(question)?;

        tracing::info!(
            sources = sources.len(),
            prompt_chars = prompt.chars().count(),
            model = self.generator.model_name(),
            "asking model"
        );
        let text = self.generator.generate(&prompt).await?;

        Ok(Answer {
            text,
            sources,
            elapsed: started.elapsed(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Assistant => f.write_str("assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

/// Append-only log of one interactive session.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    turns: Vec<ChatTurn>,
}

impl ChatSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: Role, text: impl Into<String>) -> &ChatTurn {
        self.turns.push(ChatTurn {
            role,
            text: text.into(),
        });
        &self.turns[self.turns.len() - 1]
    }

    #[must_use]
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
