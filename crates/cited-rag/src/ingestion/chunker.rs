//! Text chunking with sentence-aware boundaries and positional tracking

use crate::config::ChunkingConfig;
use crate::types::Chunk;

/// Break markers searched for near a window end. The boundary lands right
/// after the marker.
const TERMINATORS: [&[char]; 4] = [&['.', ' '], &['?', ' '], &['!', ' '], &['\n']];

/// Per-call overrides for chunk size and overlap
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkingOptions {
    /// Target chunk size in characters
    pub chunk_size: Option<usize>,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: Option<usize>,
}

/// Text chunker with configurable size and overlap
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Target chunk size in characters
    chunk_size: usize,
    /// Overlap between chunks
    overlap: usize,
    /// Characters before a window end searched for a sentence break
    boundary_window: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::from_config(&ChunkingConfig::default())
    }
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            overlap,
            boundary_window: 100,
        }
    }

    /// Create from configuration
    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self {
            boundary_window: config.boundary_window,
            ..Self::new(config.chunk_size, config.chunk_overlap)
        }
    }

    /// Copy of this chunker with per-call overrides applied
    pub fn with_options(&self, options: ChunkingOptions) -> Self {
        Self {
            chunk_size: options.chunk_size.unwrap_or(self.chunk_size).max(1),
            overlap: options.chunk_overlap.unwrap_or(self.overlap),
            boundary_window: self.boundary_window,
        }
    }

    /// Collapse whitespace runs (CRLF included) to single spaces and trim
    pub fn normalize(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Split text into overlapping chunks.
    ///
    /// Offsets are character positions in the normalized text. Chunk IDs
    /// depend only on `source` and the ordinal.
    pub fn chunk(&self, text: &str, source: &str, title: &str) -> Vec<Chunk> {
        let normalized = Self::normalize(text);
        let chars: Vec<char> = normalized.chars().collect();
        let len = chars.len();

        if len == 0 {
            return Vec::new();
        }

        if len <= self.chunk_size {
            return vec![Chunk::new(source, title, normalized, 0, len, 0)];
        }

        let mut chunks = Vec::new();
        let mut current = 0usize;
        let mut ordinal = 0u32;

        while current < len {
            let mut end = (current + self.chunk_size).min(len);

            if end < len {
                end = self.adjust_to_sentence_break(&chars, current, end);
            }

            let content: String = chars[current..end].iter().collect();
            let content = content.trim();

            if !content.is_empty() {
                chunks.push(Chunk::new(
                    source,
                    title,
                    content.to_string(),
                    current,
                    end,
                    ordinal,
                ));
                ordinal += 1;
            }

            // Equivalent to stopping once `end - overlap >= len - overlap`
            if end >= len {
                break;
            }

            let next = end.saturating_sub(self.overlap);
            current = if next > current { next } else { end };
        }

        tracing::debug!(
            source = source,
            chars = len,
            chunks = chunks.len(),
            "Chunked document"
        );

        chunks
    }

    /// Move `end` to just after the rightmost terminator in the trailing
    /// window, or keep it when there is none.
    fn adjust_to_sentence_break(&self, chars: &[char], current: usize, end: usize) -> usize {
        let window_start = end.saturating_sub(self.boundary_window).max(current);
        let window = &chars[window_start..end];

        let best = TERMINATORS
            .iter()
            .filter_map(|marker| {
                rfind(window, marker).map(|pos| window_start + pos + marker.len())
            })
            .max();

        match best {
            Some(adjusted) if adjusted > current => adjusted,
            _ => end,
        }
    }
}

/// Rightmost start position of `needle` fully inside `haystack`
fn rfind(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    (0..=haystack.len() - needle.len())
        .rev()
        .find(|&i| &haystack[i..i + needle.len()] == needle)
}

/// Chunk `text` with the default size (1000) and overlap (150), applying any overrides
pub fn chunk_text(text: &str, source: &str, title: &str, options: ChunkingOptions) -> Vec<Chunk> {
    TextChunker::default().with_options(options).chunk(text, source, title)
}
