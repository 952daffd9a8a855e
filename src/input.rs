/// Single-line text field with a character cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    cursor: usize, // in chars, not bytes
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

impl TextInput {
    pub fn with_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.value, self.cursor);
        self.value.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.char_count();
    }

    /// Take the current value, leaving the field empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.value)
    }

    /// Visible window of `width` chars that keeps the cursor on screen.
    /// Returns the text and the cursor column within it.
    pub fn visible(&self, width: usize) -> (String, usize) {
        let scroll_offset = if width == 0 || self.cursor < width {
            0
        } else {
            self.cursor - width + 1
        };
        let text = self.value.chars().skip(scroll_offset).take(width).collect();
        (text, self.cursor - scroll_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_multibyte_text() {
        let mut input = TextInput::default();
        for c in "héllo".chars() {
            input.insert(c);
        }
        input.left();
        input.left();
        input.left();
        input.backspace();
        assert_eq!(input.value(), "hllo");
        assert_eq!(input.cursor(), 1);

        input.delete();
        assert_eq!(input.value(), "hlo");
        input.end();
        input.insert('!');
        assert_eq!(input.value(), "hlo!");
    }

    #[test]
    fn take_clears_field() {
        let mut input = TextInput::with_value("hoodie");
        assert_eq!(input.take(), "hoodie");
        assert_eq!(input.value(), "");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn visible_window_follows_cursor() {
        let input = TextInput::with_value("abcdefghij");
        let (text, col) = input.visible(4);
        assert_eq!(text, "hij");
        assert_eq!(col, 3);

        let mut input = input;
        input.home();
        let (text, col) = input.visible(4);
        assert_eq!(text, "abcd");
        assert_eq!(col, 0);
    }

    #[test]
    fn blank_detection() {
        assert!(TextInput::with_value(" \t ").is_blank());
        assert!(!TextInput::with_value(" a ").is_blank());
    }
}
