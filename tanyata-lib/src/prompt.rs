//! Prompt assembly
//!
//! Wraps retrieved chunks and the user's question in a fixed instruction
//! that restricts the model to the given context.

use crate::store::SearchResult;

pub const DEFAULT_LANGUAGE: &str = "Bahasa Indonesia";
pub const DEFAULT_FALLBACK: &str =
    "Maaf, saya tidak dapat menemukan informasi tersebut di dalam dokumen.";

/// Separates chunk texts inside the context section.
const CONTEXT_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    language: String,
    fallback: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE, DEFAULT_FALLBACK)
    }
}

impl PromptTemplate {
    pub fn new(language: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            fallback: fallback.into(),
        }
    }

    #[must_use]
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Render the full instruction for `question`, with `results` in rank order.
    #[must_use]
    pub fn render(&self, results: &[SearchResult], question: &str) -> String {
        let context = results
            .iter()
            .map(|r| r.chunk.content.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR);

        format!(
            "Anda adalah asisten AI yang ahli dalam menjawab pertanyaan\n\
             berdasarkan sebuah Tugas Akhir (TA) penelitian.\n\
             \n\
             Tugas Anda adalah menjawab pertanyaan pengguna HANYA\n\
             berdasarkan konteks yang diberikan di bawah ini.\n\
             \n\
             Jika informasi tidak ada dalam konteks, jawab dengan sopan:\n\
             \"{fallback}\"\n\
             \n\
             Jangan berspekulasi atau menambahkan informasi dari luar konteks.\n\
             Jawab dalam {language} yang baik dan jelas.\n\
             \n\
             KONTEKS:\n\
             {context}\n\
             \n\
             PERTANYAAN:\n\
             {question}\n\
             \n\
             JAWABAN:\n",
            fallback = self.fallback,
            language = self.language,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{Chunk, ChunkMetadata};

    fn result(id: &str, content: &str, score: f32) -> SearchResult {
        SearchResult {
            chunk: Chunk {
                id: id.to_string(),
                content: content.to_string(),
                metadata: ChunkMetadata::default(),
            },
            score,
        }
    }

    #[test]
    fn test_contains_every_chunk_in_rank_order() {
        let results = vec![
            result("1", "Bab 1 membahas latar belakang.", 0.9),
            result("2", "Bab 3 menjelaskan metode CNN.", 0.7),
            result("3", "Lampiran berisi kode sumber.", 0.1),
        ];
        let prompt = PromptTemplate::default().render(&results, "Apa metode yang digunakan?");

        let positions: Vec<usize> = results
            .iter()
            .map(|r| prompt.find(&r.chunk.content).expect("chunk text missing"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_question_appears_exactly_once() {
        let question = "Siapa pembimbing tugas akhir ini?";
        let results = vec![result("1", "Penelitian ini membahas deteksi emosi", 0.5)];
        let prompt = PromptTemplate::default().render(&results, question);

        assert_eq!(prompt.matches(question).count(), 1);
        let question_at = prompt.find(question).unwrap();
        assert!(prompt.find("PERTANYAAN:").unwrap() < question_at);
        assert!(prompt.find("KONTEKS:").unwrap() < question_at);
    }

    #[test]
    fn test_fallback_sentence_always_present() {
        let prompt = PromptTemplate::default().render(&[], "Berapa harga emas hari ini?");
        assert!(prompt.contains(DEFAULT_FALLBACK));
        assert!(prompt.contains("HANYA"));
        assert!(prompt.ends_with("JAWABAN:\n"));
    }

    #[test]
    fn test_custom_language_and_fallback() {
        let template = PromptTemplate::new("English", "Sorry, the document does not say.");
        let prompt = template.render(&[], "What is this about?");

        assert!(prompt.contains("Jawab dalam English yang baik dan jelas."));
        assert!(prompt.contains("\"Sorry, the document does not say.\""));
        assert_eq!(template.fallback(), "Sorry, the document does not say.");
    }
}
