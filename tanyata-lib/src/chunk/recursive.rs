use std::ops::Range;

use crate::chunk::{generate_id, Chunk, ChunkMetadata, Chunker};
use crate::{Error, Result};

/// Separator priority used for the thesis text: section rules first, then
/// paragraphs, lines, words and finally single characters.
pub const DEFAULT_SEPARATORS: [&str; 5] = ["---", "\n\n", "\n", " ", ""];

/// Recursive separator chunker
///
/// Splits on the first separator present in the text, merges neighbouring
/// pieces up to the size bound and recurses into oversized pieces with the
/// remaining separators. An empty separator splits between characters.
///
/// Sizes are measured in characters. Every chunk after the first starts
/// with the `overlap` characters that precede its body in the source, so
/// chunk bodies are budgeted at `chunk_size - overlap`. A body that could
/// not be split down to that budget gets a shorter prefix, or none when it
/// alone exceeds `chunk_size`.
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    overlap: usize,
    separators: Vec<String>,
}

impl RecursiveChunker {
    pub fn new(chunk_size: usize, overlap: usize, separators: Vec<String>) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Chunking("chunk size must be positive".to_string()));
        }
        if overlap >= chunk_size {
            return Err(Error::Chunking(format!(
                "overlap ({overlap}) must be smaller than chunk size ({chunk_size})"
            )));
        }
        if separators.is_empty() {
            return Err(Error::Chunking("separator list is empty".to_string()));
        }

        Ok(Self {
            chunk_size,
            overlap,
            separators,
        })
    }

    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[must_use]
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    #[must_use]
    pub fn separators(&self) -> &[String] {
        &self.separators
    }

    fn budget(&self) -> usize {
        self.chunk_size - self.overlap
    }

    /// Contiguous, non-overlapping byte ranges covering `text`.
    fn bodies(&self, text: &str) -> Vec<Range<usize>> {
        let mut out = Vec::new();
        self.split_into(text, 0..text.len(), &self.separators, &mut out);
        out
    }

    fn split_into(
        &self,
        text: &str,
        range: Range<usize>,
        separators: &[String],
        out: &mut Vec<Range<usize>>,
    ) {
        let piece = &text[range.clone()];
        let Some(idx) = separators
            .iter()
            .position(|s| s.is_empty() || piece.contains(s.as_str()))
        else {
            // nothing left to split on
            out.push(range);
            return;
        };
        let lower = &separators[idx + 1..];
        let budget = self.budget();

        // pending merge: byte range and its length in chars
        let mut pending: Option<(Range<usize>, usize)> = None;

        for part in split_keep_start(piece, &separators[idx]) {
            let part = range.start + part.start..range.start + part.end;
            let len = text[part.clone()].chars().count();

            if len <= budget {
                if let Some((merged, merged_len)) = pending.as_mut() {
                    if *merged_len + len <= budget {
                        merged.end = part.end;
                        *merged_len += len;
                        continue;
                    }
                }
                if let Some((merged, _)) = pending.replace((part, len)) {
                    out.push(merged);
                }
                continue;
            }

            if let Some((merged, _)) = pending.take() {
                out.push(merged);
            }
            if lower.is_empty() {
                tracing::debug!(chars = len, "emitting oversized piece");
                out.push(part);
            } else {
                self.split_into(text, part, lower, out);
            }
        }

        if let Some((merged, _)) = pending {
            out.push(merged);
        }
    }
}

impl Chunker for RecursiveChunker {
    fn name(&self) -> &str {
        "recursive"
    }

    fn chunk(&self, content: &str, mut metadata: ChunkMetadata) -> Vec<Chunk> {
        if content.is_empty() {
            return Vec::new();
        }

        let bodies = self.bodies(content);
        let total = bodies.len();
        metadata.total_chunks = Some(total);

        let mut chunks = Vec::with_capacity(total);
        // char offset of the current body within `content`
        let mut body_start = 0;
        for (position, body) in bodies.into_iter().enumerate() {
            let body_len = content[body.clone()].chars().count();
            // never let the prefix push a chunk past the size bound
            let allowed = self.overlap.min(self.chunk_size.saturating_sub(body_len));
            let from = back_chars(content, body.start, allowed);
            let overlap = content[from..body.start].chars().count();
            let text = &content[from..body.end];

            let mut m = metadata.clone();
            m.position = position;
            m.start = body_start - overlap;
            m.overlap = overlap;

            chunks.push(Chunk {
                id: generate_id(m.source_id.as_deref(), position, text),
                content: text.to_string(),
                metadata: m,
            });

            body_start += body_len;
        }

        tracing::debug!(chunks = total, strategy = self.name(), "chunked document");
        chunks
    }
}

/// Split `text` at every occurrence of `separator`, keeping the separator at
/// the start of the following piece. Ranges are byte offsets into `text`.
fn split_keep_start(text: &str, separator: &str) -> Vec<Range<usize>> {
    if text.is_empty() {
        return Vec::new();
    }
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| i..i + c.len_utf8())
            .collect();
    }

    let mut cuts: Vec<usize> = text
        .match_indices(separator)
        .map(|(i, _)| i)
        .filter(|&i| i != 0)
        .collect();
    cuts.push(text.len());

    let mut start = 0;
    cuts.into_iter()
        .map(|end| {
            let r = start..end;
            start = end;
            r
        })
        .collect()
}

/// Byte index `n` characters before byte index `end` (clamped at 0).
fn back_chars(text: &str, end: usize, n: usize) -> usize {
    if n == 0 {
        return end;
    }
    text[..end]
        .char_indices()
        .rev()
        .take(n)
        .last()
        .map_or(end, |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn meta() -> ChunkMetadata {
        ChunkMetadata::default()
    }

    fn seps(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    fn contents(chunks: &[Chunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.content.as_str()).collect()
    }

    #[test]
    fn test_rejects_bad_geometry() {
        assert!(RecursiveChunker::new(0, 0, seps(&[""])).is_err());
        assert!(RecursiveChunker::new(10, 10, seps(&[""])).is_err());
        assert!(RecursiveChunker::new(10, 2, Vec::new()).is_err());
        assert!(RecursiveChunker::new(10, 9, seps(&[""])).is_ok());
    }

    #[test]
    fn test_falls_back_to_lower_separator() {
        let chunker = RecursiveChunker::new(10, 0, seps(&["\n\n", " ", ""])).unwrap();
        let chunks = chunker.chunk("aaaa bbbb\n\ncccc dddd", meta());

        assert_eq!(contents(&chunks), ["aaaa bbbb", "\n\ncccc", " dddd"]);
    }

    #[test]
    fn test_prefers_section_rule() {
        let chunker = RecursiveChunker::new(20, 0, seps(&["---", "\n", ""])).unwrap();
        let chunks = chunker.chunk("Bab 1\nPendahuluan---Bab 2\nMetode", meta());

        assert_eq!(contents(&chunks), ["Bab 1\nPendahuluan", "---Bab 2\nMetode"]);
    }

    #[test]
    fn test_overlap_repeats_preceding_text() {
        let chunker = RecursiveChunker::new(10, 3, seps(&[" ", ""])).unwrap();
        let chunks = chunker.chunk("one two three four", meta());

        assert_eq!(contents(&chunks), ["one two", "two three", "ree four"]);
        assert_eq!(chunks[0].metadata.overlap, 0);
        assert_eq!(chunks[1].metadata.overlap, 3);
        assert_eq!(chunks[1].metadata.start, 4);
        assert_eq!(chunks[2].metadata.start, 10);
    }

    #[test]
    fn test_character_fallback() {
        let chunker = RecursiveChunker::new(4, 1, seps(&[""])).unwrap();
        let chunks = chunker.chunk("abcdefg", meta());

        assert_eq!(contents(&chunks), ["abc", "cdef", "fg"]);
    }

    #[test]
    fn test_unsplittable_piece_is_emitted_oversized() {
        let chunker = RecursiveChunker::new(5, 0, seps(&[" "])).unwrap();
        let chunks = chunker.chunk("tiny enormousword", meta());

        assert_eq!(contents(&chunks), ["tiny", " enormousword"]);
    }

    #[test]
    fn test_prefix_shrinks_for_unsplit_body() {
        let chunker = RecursiveChunker::new(10, 3, seps(&[" "])).unwrap();
        let chunks = chunker.chunk("ab aaaaaaaaa", meta());

        assert_eq!(contents(&chunks), ["ab", " aaaaaaaaa"]);
        assert_eq!(chunks[1].metadata.overlap, 0);

        let chunks = chunker.chunk("ab aaaaaaaa", meta());
        assert_eq!(contents(&chunks), ["ab", "b aaaaaaaa"]);
        assert_eq!(chunks[1].metadata.overlap, 1);
        assert_eq!(chunks[1].metadata.start, 1);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let chunker = RecursiveChunker::new(3, 1, seps(&[""])).unwrap();
        let chunks = chunker.chunk("äöüß", meta());

        assert_eq!(contents(&chunks), ["äö", "öüß"]);
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunker = RecursiveChunker::new(1000, 200, seps(&DEFAULT_SEPARATORS)).unwrap();
        let chunks = chunker.chunk("Penelitian ini membahas deteksi emosi", meta());

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].metadata.total_chunks, Some(1));
    }

    #[test]
    fn test_empty_content() {
        let chunker = RecursiveChunker::new(10, 2, seps(&DEFAULT_SEPARATORS)).unwrap();
        assert!(chunker.chunk("", meta()).is_empty());
    }

    #[test]
    fn test_metadata_and_ids() {
        let chunker = RecursiveChunker::new(4, 0, seps(&[""])).unwrap();
        let base = ChunkMetadata {
            source_id: Some("ta.txt".to_string()),
            ..meta()
        };
        let chunks = chunker.chunk("aaaaaaaa", base);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, chunks[1].content);
        assert_ne!(chunks[0].id, chunks[1].id);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.metadata.position, i);
            assert_eq!(chunk.metadata.total_chunks, Some(2));
            assert_eq!(chunk.metadata.source_id.as_deref(), Some("ta.txt"));
        }
    }

    fn tail(s: &str, n: usize) -> String {
        let len = s.chars().count();
        s.chars().skip(len.saturating_sub(n)).collect()
    }

    fn head(s: &str, n: usize) -> String {
        s.chars().take(n).collect()
    }

    proptest! {
        #[test]
        fn prop_chunks_respect_size(text in "[ab é\n-]{0,300}", size in 2usize..40, overlap_seed in 0usize..40) {
            let overlap = overlap_seed % size;
            let chunker = RecursiveChunker::new(size, overlap, seps(&DEFAULT_SEPARATORS)).unwrap();

            for chunk in chunker.chunk(&text, meta()) {
                prop_assert!(chunk.content.chars().count() <= size);
                prop_assert!(chunk.metadata.overlap <= overlap);
            }
        }

        #[test]
        fn prop_neighbours_share_overlap(text in "[ab é\n-]{0,300}", size in 2usize..40, overlap_seed in 0usize..40) {
            let overlap = overlap_seed % size;
            let chunker = RecursiveChunker::new(size, overlap, seps(&DEFAULT_SEPARATORS)).unwrap();
            let chunks = chunker.chunk(&text, meta());

            for pair in chunks.windows(2) {
                let shared = pair[1].metadata.overlap;
                prop_assert_eq!(tail(&pair[0].content, shared), head(&pair[1].content, shared));
                if shared < overlap {
                    // the overlap ran into the start of the document, or the
                    // chunk is already at the size bound
                    prop_assert!(
                        pair[1].metadata.start == 0 || pair[1].content.chars().count() >= size
                    );
                }
            }
        }

        #[test]
        fn prop_size_without_char_fallback(
            text in "[ab é\n-]{0,300}",
            size in 2usize..40,
            overlap_seed in 0usize..40,
            list in prop::sample::subsequence(vec!["-", "\n", " "], 1..=3),
        ) {
            let overlap = overlap_seed % size;
            let chunker = RecursiveChunker::new(size, overlap, seps(&list)).unwrap();
            let chunks = chunker.chunk(&text, meta());

            for chunk in &chunks {
                if chunk.content.chars().count() > size {
                    // only a piece no separator could split, with no prefix
                    prop_assert_eq!(chunk.metadata.overlap, 0);
                }
            }
            let rebuilt: String = chunks.iter().map(Chunk::body).collect();
            prop_assert_eq!(rebuilt, text);
        }

        #[test]
        fn prop_bodies_reconstruct_text(text in "[ab é\n-]{0,300}", size in 2usize..40, overlap_seed in 0usize..40) {
            let overlap = overlap_seed % size;
            let chunker = RecursiveChunker::new(size, overlap, seps(&DEFAULT_SEPARATORS)).unwrap();
            let chunks = chunker.chunk(&text, meta());

            let rebuilt: String = chunks.iter().map(Chunk::body).collect();
            prop_assert_eq!(rebuilt, text);
        }
    }
}
