//! Recursive character splitter
//!
//! Splits on the most meaningful boundary that keeps pieces under the
//! target size (paragraph, line, sentence, clause, word, then raw
//! characters), then packs pieces into chunks, carrying up to `overlap`
//! characters of trailing pieces into the next chunk.

use std::collections::VecDeque;

const SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", ", ", " "];

#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

impl TextChunker {
    /// Sizes are in characters; `chunk_overlap` must be below `chunk_size`
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    /// Split text into trimmed, non-empty chunks of at most `chunk_size` chars
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let pieces = self.split_pieces(text, 0);
        self.merge(pieces)
    }

    fn split_pieces(&self, text: &str, level: usize) -> Vec<String> {
        if char_len(text) <= self.chunk_size {
            return vec![text.to_string()];
        }

        let Some(separator) = SEPARATORS.get(level) else {
            return self.hard_split(text);
        };

        let parts: Vec<&str> = text.split_inclusive(separator).collect();
        if parts.len() <= 1 {
            return self.split_pieces(text, level + 1);
        }

        parts
            .into_iter()
            .flat_map(|part| {
                if char_len(part) <= self.chunk_size {
                    vec![part.to_string()]
                } else {
                    self.split_pieces(part, level + 1)
                }
            })
            .collect()
    }

    fn hard_split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        chars
            .chunks(self.chunk_size)
            .map(|window| window.iter().collect())
            .collect()
    }

    fn merge(&self, pieces: Vec<String>) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<String> = VecDeque::new();
        let mut window_len = 0;

        for piece in pieces {
            let len = char_len(&piece);

            if window_len + len > self.chunk_size && !window.is_empty() {
                Self::emit(&mut chunks, &window);

                // keep at most `overlap` chars, and leave room for the new piece
                while window_len > self.chunk_overlap || window_len + len > self.chunk_size {
                    match window.pop_front() {
                        Some(front) => window_len -= char_len(&front),
                        None => break,
                    }
                }
            }

            window_len += len;
            window.push_back(piece);
        }

        if !window.is_empty() {
            Self::emit(&mut chunks, &window);
        }

        chunks
    }

    fn emit(chunks: &mut Vec<String>, window: &VecDeque<String>) {
        let text: String = window.iter().map(String::as_str).collect();
        let text = text.trim();
        if !text.is_empty() && chunks.last().map(String::as_str) != Some(text) {
            chunks.push(text.to_string());
        }
    }
}
