//! Table-aware text chunking with fixed overlap

use crate::config::ChunkingConfig;
use crate::error::Result;
use crate::types::{Chunk, Metadata};

/// Splits document text into bounded, overlapping chunks
///
/// Cut points prefer sentence boundaries near the size limit and never land
/// inside a markdown table: a chunk that would end among `|`-prefixed rows is
/// extended to the end of the table, past the size limit if necessary.
pub struct TextChunker {
    max_chunk_size: usize,
    overlap: usize,
}

/// Half-width of the window searched for a sentence delimiter around a cut
const DELIMITER_WINDOW: usize = 50;

impl TextChunker {
    /// Create a new chunker; fails unless `overlap < max_chunk_size`
    pub fn new(config: &ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            max_chunk_size: config.max_chunk_size,
            overlap: config.overlap,
        })
    }

    /// Split `text` into ordered chunks, cloning `metadata` into each
    pub fn chunk(&self, text: &str, metadata: &Metadata) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }
        if text.len() <= self.max_chunk_size {
            return vec![Chunk::new(text.to_string(), metadata.clone())];
        }

        let len = text.len();
        let mut chunks = Vec::new();
        let mut start = 0usize;

        while start < len {
            let tentative = start + self.max_chunk_size;

            if tentative >= len {
                chunks.push(Chunk::new(text[start..].to_string(), metadata.clone()));
                let next = snap_to_boundary(text, tentative - self.overlap);
                if next <= start {
                    break;
                }
                start = next;
                continue;
            }

            let end = self.cut_point(text, start, tentative);
            chunks.push(Chunk::new(text[start..end].to_string(), metadata.clone()));

            let mut next = snap_to_boundary(text, end.saturating_sub(self.overlap));
            // A window cut can land before start + overlap on tiny chunk
            // sizes; never move backwards.
            if next <= start {
                next = end;
            }
            start = next;
        }

        tracing::debug!("Split {} bytes into {} chunks", len, chunks.len());
        chunks
    }

    /// Choose the end of the chunk starting at `start` with tentative end
    /// `tentative` (`start < tentative < text.len()`)
    fn cut_point(&self, text: &str, start: usize, tentative: usize) -> usize {
        let bytes = text.as_bytes();
        let len = bytes.len();

        // Table rule: a newline-pipe anywhere in the window means rows are
        // in flight. Walk forward line by line until one does not begin
        // with a pipe; the chunk ends at that newline.
        if contains_table_marker(&bytes[start..tentative]) {
            let mut pos = tentative;
            while let Some(nl) = find_byte(bytes, b'\n', pos) {
                if nl + 1 >= len || bytes[nl + 1] != b'|' {
                    return nl;
                }
                pos = nl + 1;
            }
            // Document ends inside the table.
            return snap_to_boundary(text, tentative);
        }

        let window_start = tentative.saturating_sub(DELIMITER_WINDOW).max(start);
        let window_end = (tentative + DELIMITER_WINDOW).min(len);
        let window = &bytes[window_start..window_end];
        let period = find_byte(window, b'.', 0).map(|i| window_start + i);
        let newline = find_byte(window, b'\n', 0).map(|i| window_start + i);

        match (period, newline) {
            (Some(p), Some(n)) if p < n => p + 1,
            (Some(p), None) => p + 1,
            (_, Some(n)) => n + 1,
            (None, None) => snap_to_boundary(text, tentative),
        }
    }
}

fn find_byte(bytes: &[u8], byte: u8, from: usize) -> Option<usize> {
    bytes[from..].iter().position(|&b| b == byte).map(|i| from + i)
}

fn contains_table_marker(window: &[u8]) -> bool {
    window.windows(2).any(|pair| pair == b"\n|")
}

fn snap_to_boundary(text: &str, mut pos: usize) -> usize {
    while pos > 0 && !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(max_chunk_size: usize, overlap: usize) -> TextChunker {
        TextChunker::new(&ChunkingConfig {
            max_chunk_size,
            overlap,
        })
        .unwrap()
    }

    fn meta() -> Metadata {
        let mut m = Metadata::new();
        m.insert("source".to_string(), serde_json::json!("doc.md"));
        m
    }

    #[test]
    fn short_text_yields_one_chunk() {
        let chunks = chunker(1000, 100).chunk("a short document", &meta());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "a short document");
        assert_eq!(chunks[0].metadata["source"], serde_json::json!("doc.md"));
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunker(1000, 100).chunk("", &meta()).is_empty());
    }

    #[test]
    fn invalid_overlap_is_rejected() {
        let config = ChunkingConfig {
            max_chunk_size: 100,
            overlap: 100,
        };
        assert!(TextChunker::new(&config).is_err());
    }

    #[test]
    fn hard_cuts_overlap_exactly_and_reconstruct() {
        // 2500 bytes with no delimiters anywhere: every cut is a hard cut.
        let text = "a".repeat(2500);
        let chunks = chunker(1000, 100).chunk(&text, &meta());

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text.len(), 1000);
        assert_eq!(chunks[1].text.len(), 1000);
        assert_eq!(chunks[2].text.len(), 700);

        // Each chunk after the first begins 100 bytes before the previous
        // chunk's end.
        assert_eq!(chunks[0].text[900..], chunks[1].text[..100]);
        assert_eq!(chunks[1].text[900..], chunks[2].text[..100]);

        // Concatenating with overlap removed reconstructs the input.
        let mut rebuilt = chunks[0].text.clone();
        for chunk in &chunks[1..] {
            rebuilt.push_str(&chunk.text[100..]);
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn cut_prefers_period_in_window() {
        let mut text = "a".repeat(970);
        text.push_str(". ");
        text.push_str(&"b".repeat(228));
        let chunks = chunker(1000, 100).chunk(&text, &meta());

        assert!(chunks[0].text.ends_with('.'));
        assert_eq!(chunks[0].text.len(), 971);
        assert!(chunks[1].text.starts_with(&chunks[0].text[871..]));
    }

    #[test]
    fn cut_falls_back_to_newline() {
        let mut text = "a".repeat(980);
        text.push('\n');
        text.push_str(&"b".repeat(520));
        let chunks = chunker(1000, 100).chunk(&text, &meta());

        assert!(chunks[0].text.ends_with('\n'));
        assert_eq!(chunks[0].text.len(), 981);
    }

    #[test]
    fn earlier_period_wins_over_later_newline() {
        let mut text = "a".repeat(960);
        text.push('.');
        text.push_str(&"a".repeat(29));
        text.push('\n');
        text.push_str(&"b".repeat(600));
        let chunks = chunker(1000, 100).chunk(&text, &meta());

        assert!(chunks[0].text.ends_with('.'));
        assert_eq!(chunks[0].text.len(), 961);
    }

    #[test]
    fn chunk_never_ends_inside_a_table() {
        // Table rows from byte 940 to 1330, first plain line after 1330.
        let mut text = "x".repeat(940);
        for _ in 0..26 {
            text.push_str("\n| row | data |");
        }
        text.push_str("\nafter the table ");
        text.push_str(&"y".repeat(800));

        let chunks = chunker(1000, 100).chunk(&text, &meta());

        // The first chunk is extended past the limit to cover the table.
        assert_eq!(chunks[0].text.len(), 1330);
        assert!(chunks[0].text.ends_with("| row | data |"));

        // Every row sits wholly inside the first chunk.
        let rows_in_first = chunks[0].text.matches("| row | data |").count();
        assert_eq!(rows_in_first, 26);
    }

    #[test]
    fn table_spanning_the_cut_point_pushes_the_boundary_past_it() {
        // A table occupying roughly bytes 950..1200 with the limit at 1000.
        let mut text = "a".repeat(949);
        text.push('\n');
        for _ in 0..15 {
            text.push_str("| c1 | c2 |\n");
        }
        text.push_str("plain paragraph follows here ");
        text.push_str(&"b".repeat(700));

        let chunks = chunker(1000, 100).chunk(&text, &meta());
        let table_end = 950 + 15 * 12;
        assert!(chunks[0].text.len() >= table_end - 1);
        assert!(chunks[0].text.ends_with("| c1 | c2 |"));
        assert_eq!(chunks[0].text.matches("| c1 | c2 |").count(), 15);
    }

    #[test]
    fn multibyte_text_never_splits_a_character() {
        // 3-byte characters ensure hard cuts land mid-character without
        // boundary snapping.
        let text = "\u{65e5}".repeat(900);
        let chunks = chunker(1000, 100).chunk(&text, &meta());
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.chars().all(|c| c == '\u{65e5}'));
        }
    }

    #[test]
    fn metadata_is_cloned_into_every_chunk() {
        let text = "a".repeat(2500);
        let chunks = chunker(1000, 100).chunk(&text, &meta());
        for chunk in &chunks {
            assert_eq!(chunk.metadata["source"], serde_json::json!("doc.md"));
        }
    }
}
