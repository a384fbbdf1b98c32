//! Fixed-size chunking strategy with overlap.
//!
//! Each page is windowed on its own so every chunk maps to exactly one
//! source page. Sizes count characters, not bytes.

use pdfchat_core::{Chunk, ChunkConfig, Chunker, ConfigError, PageBlock};
use tracing::debug;

/// Fixed-size chunker with configurable overlap.
pub struct FixedSizeChunker;

impl FixedSizeChunker {
    /// Create a new fixed-size chunker.
    pub fn new() -> Self {
        Self
    }
}

impl Default for FixedSizeChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunker for FixedSizeChunker {
    fn name(&self) -> &str {
        "fixed_size"
    }

    fn split(&self, blocks: &[PageBlock], config: &ChunkConfig) -> Result<Vec<Chunk>, ConfigError> {
        config.validate()?;

        let mut chunks = Vec::new();
        for block in blocks {
            for text in windows(&block.text, config) {
                chunks.push(Chunk {
                    source_page: block.page_number,
                    text,
                    sequence_index: chunks.len() as u32,
                });
            }
        }

        debug!(
            "Split {} pages into {} chunks (size {}, overlap {})",
            blocks.len(),
            chunks.len(),
            config.chunk_size,
            config.overlap
        );
        Ok(chunks)
    }
}

/// Slide a `chunk_size` window over `text` in steps of `chunk_size - overlap`.
///
/// The window that reaches the end of the text is the last one. Expects a
/// validated config.
fn windows(text: &str, config: &ChunkConfig) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    let step = config.step();

    let mut out = Vec::new();
    let mut start = 0;
    while start < total {
        let end = (start + config.chunk_size).min(total);
        out.push(chars[start..end].iter().collect());
        if end == total {
            break;
        }
        start += step;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(number: u32, text: &str) -> PageBlock {
        PageBlock::new(number, text)
    }

    /// Text where every character is distinguishable by position.
    fn numbered_text(len: usize) -> String {
        (0..len)
            .map(|i| char::from(b'a' + (i % 26) as u8))
            .collect()
    }

    #[test]
    fn test_split_empty_page() {
        let chunker = FixedSizeChunker::new();
        let chunks = chunker
            .split(&[page(1, "")], &ChunkConfig::default())
            .unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_split_short_pages_one_chunk_each() {
        let chunker = FixedSizeChunker::new();
        let blocks = vec![
            page(1, "Alpha content."),
            page(2, "Beta content."),
            page(3, "Gamma content."),
        ];

        let chunks = chunker.split(&blocks, &ChunkConfig::default()).unwrap();

        assert_eq!(chunks.len(), 3);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.source_page, i as u32 + 1);
            assert_eq!(chunk.sequence_index, i as u32);
            assert_eq!(chunk.text, blocks[i].text);
        }
    }

    #[test]
    fn test_split_exact_overlap() {
        let chunker = FixedSizeChunker::new();
        let text = numbered_text(2600);
        let chunks = chunker
            .split(&[page(1, &text)], &ChunkConfig::default())
            .unwrap();

        // Windows start at 0, 800, 1600; the third reaches the end
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, text[0..1000]);
        assert_eq!(chunks[1].text, text[800..1800]);
        assert_eq!(chunks[2].text, text[1600..2600]);

        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].text.chars().collect();
            let next: Vec<char> = pair[1].text.chars().collect();
            assert_eq!(prev[prev.len() - 200..], next[..200]);
        }
    }

    #[test]
    fn test_split_short_remainder() {
        let chunker = FixedSizeChunker::new();
        let text = numbered_text(1001);
        let chunks = chunker
            .split(&[page(1, &text)], &ChunkConfig::default())
            .unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text.chars().count(), 1000);
        assert_eq!(chunks[1].text, text[800..]);
        assert_eq!(chunks[1].text.chars().count(), 201);
    }

    #[test]
    fn test_split_exactly_chunk_size() {
        let chunker = FixedSizeChunker::new();
        let text = numbered_text(1000);
        let chunks = chunker
            .split(&[page(1, &text)], &ChunkConfig::default())
            .unwrap();
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_split_never_exceeds_chunk_size() {
        let chunker = FixedSizeChunker::new();
        let blocks = vec![page(1, &numbered_text(5432)), page(2, &numbered_text(999))];
        let chunks = chunker.split(&blocks, &ChunkConfig::default()).unwrap();

        assert!(chunks.iter().all(|c| c.text.chars().count() <= 1000));
        assert!(chunks.iter().any(|c| c.source_page == 2));
    }

    #[test]
    fn test_split_does_not_merge_pages() {
        let chunker = FixedSizeChunker::new();
        let config = ChunkConfig::new(10, 2).unwrap();
        let blocks = vec![page(1, "aaaaaaaaaaaa"), page(2, "bbbb")];

        let chunks = chunker.split(&blocks, &config).unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "aaaaaaaaaa");
        assert_eq!(chunks[1].text, "aaaa");
        assert_eq!(chunks[2].text, "bbbb");
        assert_eq!(chunks[2].source_page, 2);
        assert_eq!(chunks[2].sequence_index, 2);
    }

    #[test]
    fn test_split_counts_characters_not_bytes() {
        let chunker = FixedSizeChunker::new();
        let config = ChunkConfig::new(4, 1).unwrap();
        let text = "世界世界世界世";

        let chunks = chunker.split(&[page(1, text)], &config).unwrap();

        assert_eq!(chunks[0].text, "世界世界");
        assert_eq!(chunks[1].text, "界世界世");
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn test_split_is_deterministic() {
        let chunker = FixedSizeChunker::new();
        let blocks = vec![page(1, &numbered_text(3500)), page(2, "tail")];
        let config = ChunkConfig::default();

        let first = chunker.split(&blocks, &config).unwrap();
        let second = chunker.split(&blocks, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_split_rejects_overlap_not_below_size() {
        let chunker = FixedSizeChunker::new();
        let config = ChunkConfig {
            chunk_size: 100,
            overlap: 150,
        };

        let err = chunker.split(&[page(1, "text")], &config).unwrap_err();
        assert_eq!(
            err,
            ConfigError::OverlapTooLarge {
                chunk_size: 100,
                overlap: 150
            }
        );
    }

    #[test]
    fn test_split_rejects_config_even_without_pages() {
        let chunker = FixedSizeChunker::new();
        let config = ChunkConfig {
            chunk_size: 0,
            overlap: 0,
        };
        assert!(chunker.split(&[], &config).is_err());
    }

    #[test]
    fn test_chunker_name() {
        assert_eq!(FixedSizeChunker::default().name(), "fixed_size");
    }
}
