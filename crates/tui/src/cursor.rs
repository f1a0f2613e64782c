//! Byte-offset cursor with word-boundary navigation.
//!
//! Positions are byte offsets into the prompt text; the buffer lowercases to
//! ASCII before anything reaches here, so offsets and character boundaries
//! coincide.

#[derive(Clone, Copy, Debug, Default)]
pub struct Cursor {
    position: usize,
}

impl Cursor {
    pub fn position(&self) -> usize {
        self.position
    }

    /// Steps one character left, stopping at the start.
    pub fn move_left(&mut self, text: &str) -> usize {
        if text.is_empty() || self.position == 0 {
            return 0;
        }
        self.position -= 1;
        self.position
    }

    /// Steps one character right, stopping at the end.
    pub fn move_right(&mut self, text: &str) -> usize {
        if text.is_empty() || self.position >= text.len() {
            self.position = text.len();
            return self.position;
        }
        self.position += 1;
        self.position
    }

    /// Jumps to the start of the previous word: trailing spaces are skipped,
    /// then the position lands one past the previous space (or at 0).
    pub fn move_word_left(&mut self, text: &str) -> usize {
        if text.is_empty() || self.position == 0 {
            return 0;
        }

        let bytes = text.as_bytes();
        let mut position = self.position.min(text.len());
        while position > 0 && bytes[position - 1] == b' ' {
            position -= 1;
        }
        self.position = text[..position].rfind(' ').map_or(0, |i| i + 1);
        self.position
    }

    /// Jumps past the current word: leading spaces are skipped, then the
    /// position lands on the next space (or at the end).
    pub fn move_word_right(&mut self, text: &str) -> usize {
        if text.is_empty() || self.position >= text.len() {
            self.position = text.len();
            return self.position;
        }

        let bytes = text.as_bytes();
        let mut position = self.position;
        while position < text.len() && bytes[position] == b' ' {
            position += 1;
        }
        self.position = text[position..].find(' ').map_or(text.len(), |i| position + i);
        self.position
    }

    pub fn move_end(&mut self, text: &str) {
        self.position = text.len();
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }
}
