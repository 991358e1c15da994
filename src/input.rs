use unicode_width::UnicodeWidthStr;

/// A single-line text input with a char-indexed cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    value: String,
    cursor: usize,
}

impl TextField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        let mut field = Self::new();
        field.set(value);
        field
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let at = self.byte_index(self.cursor - 1);
        self.value.remove(at);
        self.cursor -= 1;
    }

    pub fn delete(&mut self) {
        if self.cursor >= self.value.chars().count() {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.value.remove(at);
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    /// Display column of the cursor, accounting for wide characters.
    pub fn cursor_column(&self) -> usize {
        let at = self.byte_index(self.cursor);
        UnicodeWidthStr::width(&self.value[..at])
    }

    /// Start of the visible window so the cursor stays inside `width` columns.
    pub fn scroll_offset(&self, width: usize) -> usize {
        let column = self.cursor_column();
        if width == 0 || column < width {
            0
        } else {
            column + 1 - width
        }
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_backspace() {
        let mut field = TextField::new();
        for c in "Hi!".chars() {
            field.insert(c);
        }
        assert_eq!(field.value(), "Hi!");
        field.backspace();
        assert_eq!(field.value(), "Hi");
        assert_eq!(field.cursor(), 2);
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut field = TextField::with_value("ab");
        field.move_home();
        field.backspace();
        assert_eq!(field.value(), "ab");
    }

    #[test]
    fn test_insert_mid_string() {
        let mut field = TextField::with_value("lanch");
        field.move_home();
        field.move_right();
        field.move_right();
        field.insert('u');
        assert_eq!(field.value(), "launch");
        assert_eq!(field.cursor(), 3);
    }

    #[test]
    fn test_multibyte_editing() {
        let mut field = TextField::with_value("café");
        field.backspace();
        assert_eq!(field.value(), "caf");
        field.insert('é');
        field.move_left();
        field.delete();
        assert_eq!(field.value(), "caf");
    }

    #[test]
    fn test_cursor_bounds() {
        let mut field = TextField::with_value("ab");
        field.move_right();
        assert_eq!(field.cursor(), 2);
        field.move_home();
        field.move_left();
        assert_eq!(field.cursor(), 0);
    }

    #[test]
    fn test_cursor_column_wide_chars() {
        let field = TextField::with_value("日本");
        assert_eq!(field.cursor_column(), 4);
    }

    #[test]
    fn test_scroll_offset() {
        let field = TextField::with_value("0123456789");
        assert_eq!(field.scroll_offset(20), 0);
        assert_eq!(field.scroll_offset(5), 6);
    }

    #[test]
    fn test_blank() {
        assert!(TextField::with_value("   ").is_blank());
        assert!(!TextField::with_value(" a ").is_blank());
    }
}
