//! Overlapping fixed-size window chunker.
//!
//! Splits a document into character windows for embedding. Stateless over an
//! immutable string — the iterator can be restarted by calling
//! [`chunk_windows`] again.

/// Iterate overlapping windows of `size` characters, stepping
/// `size - overlap` characters each time.
///
/// Yields `(char_offset, window)` pairs. The last window may be shorter than
/// `size`. If `overlap >= size` the step falls back to 1 so the iterator
/// always makes forward progress. Empty text yields nothing.
pub fn chunk_windows(text: &str, size: usize, overlap: usize) -> ChunkWindows<'_> {
    let step = if size > overlap { size - overlap } else { 1 };
    ChunkWindows {
        text,
        size: size.max(1),
        step,
        char_pos: 0,
        byte_pos: 0,
    }
}

/// Iterator returned by [`chunk_windows`].
pub struct ChunkWindows<'a> {
    text: &'a str,
    size: usize,
    step: usize,
    char_pos: usize,
    byte_pos: usize,
}

impl<'a> Iterator for ChunkWindows<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        if self.byte_pos >= self.text.len() {
            return None;
        }
        let rest = &self.text[self.byte_pos..];
        let window_end = byte_index_at_char(rest, self.size);
        let item = (self.char_pos, &rest[..window_end]);

        let advance = byte_index_at_char(rest, self.step);
        self.byte_pos += advance;
        self.char_pos += self.step;
        Some(item)
    }
}

/// Byte index of the `n`-th character of `s`, or `s.len()` if `s` has fewer
/// than `n` characters.
fn byte_index_at_char(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len())
}
