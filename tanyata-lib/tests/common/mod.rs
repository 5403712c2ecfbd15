#![allow(dead_code)]

use std::fmt::Write as _;
use std::sync::Mutex;

use async_trait::async_trait;
use tanyata_lib::embed::{Embedder, Embedding};
use tanyata_lib::generate::Generator;
use tanyata_lib::{Error, Result};

/// Word-count embedder over a fixed vocabulary. Deterministic and offline.
pub struct VocabEmbedder {
    name: String,
}

pub const VOCAB: [&str; 8] = [
    "penelitian",
    "ini",
    "membahas",
    "deteksi",
    "emosi",
    "sampel",
    "laboratorium",
    "metode",
];

impl VocabEmbedder {
    pub fn new() -> Self {
        Self::named("vocab-v1")
    }

    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl Embedder for VocabEmbedder {
    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|t| vocab_vector(t)).collect())
    }

    fn embed_query(&mut self, text: &str) -> Result<Embedding> {
        Ok(vocab_vector(text))
    }

    fn dimension(&self) -> usize {
        VOCAB.len()
    }

    fn model_name(&self) -> &str {
        &self.name
    }

    fn normalized(&self) -> bool {
        false
    }
}

fn vocab_vector(text: &str) -> Embedding {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    VOCAB
        .iter()
        .map(|v| words.iter().filter(|w| *w == v).count() as f32)
        .collect()
}

/// Returns a canned answer and remembers every prompt it was sent.
pub struct RecordingGenerator {
    answer: String,
    prompts: Mutex<Vec<String>>,
}

impl RecordingGenerator {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for RecordingGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.answer.clone())
    }

    fn model_name(&self) -> &str {
        "recording"
    }
}

/// Always fails like an exhausted quota.
pub struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(Error::Generation {
            status: Some(429),
            message: "quota exceeded".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

pub const TARGET_LINE: &str = "Penelitian ini membahas deteksi emosi";

/// A small thesis-like text with one target line among many unrelated ones.
pub fn thesis_text() -> String {
    let mut text = String::from("BAB 1 PENDAHULUAN\n\nLatar belakang masalah diuraikan pada bagian pertama.\n---\n");
    let _ = writeln!(text, "{TARGET_LINE} pada teks media sosial berbahasa Indonesia.");
    text.push_str("---\n");
    for i in 1..=30 {
        let _ = writeln!(
            text,
            "Bagian {i}: pengumpulan sampel dilakukan di laboratorium nomor {i}."
        );
    }
    text
}
