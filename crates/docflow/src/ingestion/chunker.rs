//! Character-window text chunking with offset tracking

use crate::types::Chunk;

/// Splits text into overlapping character windows, cutting at whitespace
/// where possible so words stay intact.
///
/// Offsets index characters of the trimmed input. By default `offset_end`
/// records the window bound (`start + max_chars`) rather than the emitted
/// text end; `with_exact_end_offsets` switches to emitted spans.
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Window size in characters
    max_chars: usize,
    /// Overlap between consecutive chunks
    overlap: usize,
    /// Record emitted span ends instead of window bounds
    exact_end_offsets: bool,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(max_chars: usize, overlap: usize) -> Self {
        Self {
            max_chars,
            overlap,
            exact_end_offsets: false,
        }
    }

    /// Record the emitted text end as `offset_end` instead of the window bound
    pub fn with_exact_end_offsets(mut self, exact: bool) -> Self {
        self.exact_end_offsets = exact;
        self
    }

    /// Split `text` into ordered, overlapping chunks.
    ///
    /// - Whitespace-only input yields no chunks.
    /// - Input at or under `max_chars` yields exactly one chunk covering the
    ///   whole trimmed text.
    /// - Longer input is windowed left to right; each window is cut back to
    ///   its last interior whitespace when one exists strictly after the
    ///   window start. The cursor rewinds by `overlap` unless that would
    ///   stall it, so every iteration makes progress.
    ///
    /// Pure function over strings and integers; deterministic for identical
    /// inputs.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = trimmed.chars().collect();
        let text_len = chars.len();

        if text_len <= self.max_chars {
            return vec![Chunk {
                text: trimmed.to_string(),
                offset_start: 0,
                offset_end: text_len,
            }];
        }

        let mut chunks = Vec::new();
        let mut start = 0usize;

        while start < text_len {
            let end = start + self.max_chars;

            if end >= text_len {
                chunks.push(Chunk {
                    text: chars[start..text_len].iter().collect(),
                    offset_start: start,
                    offset_end: if self.exact_end_offsets { text_len } else { end },
                });
                break;
            }

            // Cut at the last whitespace inside the window so words stay
            // intact; a hit at the window start does not count.
            let split_at = match last_whitespace(&chars, start, end) {
                Some(pos) if pos > start => pos,
                _ => end,
            };

            chunks.push(Chunk {
                text: chars[start..split_at].iter().collect(),
                offset_start: start,
                offset_end: if self.exact_end_offsets { split_at } else { end },
            });

            // Rewind by the overlap unless that would stall the cursor.
            start = match split_at.checked_sub(self.overlap) {
                Some(next) if next > start => next,
                _ => split_at,
            };
        }

        chunks
    }
}

/// Index of the last whitespace character in `chars[start..end)`, if any
fn last_whitespace(chars: &[char], start: usize, end: usize) -> Option<usize> {
    chars[start..end]
        .iter()
        .rposition(|c| c.is_whitespace())
        .map(|pos| start + pos)
}
