use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const MAX_INPUT_LEN: usize = 96;
const MASK_CHAR: char = '•';

/// Single-line editable text with a cursor, counted in characters.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    value: String,
    cursor: usize,
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

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// The value with every character replaced by a bullet.
    pub fn masked(&self) -> String {
        std::iter::repeat(MASK_CHAR)
            .take(self.value.chars().count())
            .collect()
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn set(&mut self, value: impl Into<String>) {
        *self = Self::with_value(value);
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(idx, _)| idx)
            .unwrap_or(self.value.len())
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let next = self.cursor as isize + delta;
        self.cursor = next.clamp(0, self.len() as isize) as usize;
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.len();
    }

    pub fn insert(&mut self, ch: char) {
        if self.len() >= MAX_INPUT_LEN || ch.is_control() {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.value.insert(at, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.value.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.len() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    /// Apply an editing key. Returns `true` when the value changed.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let before = self.value.len();
        match key.code {
            KeyCode::Left => self.move_cursor(-1),
            KeyCode::Right => self.move_cursor(1),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Char(ch)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                self.insert(ch)
            }
            _ => return false,
        }
        self.value.len() != before
    }
}

/// Cursor and scroll offset over a list of `len` rows shown `height` at a
/// time.
#[derive(Debug, Clone)]
pub struct ListCursor {
    cursor: usize,
    offset: usize,
    height: usize,
}

impl Default for ListCursor {
    fn default() -> Self {
        Self {
            cursor: 0,
            offset: 0,
            height: 1,
        }
    }
}

impl ListCursor {
    pub fn selected(&self) -> usize {
        self.cursor
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.offset = 0;
    }

    /// Record the visible row count and re-clamp.
    pub fn set_height(&mut self, height: usize, len: usize) {
        self.height = height.max(1);
        self.clamp(len);
    }

    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.reset();
            return;
        }
        if self.cursor >= len {
            self.cursor = len - 1;
        }
        self.ensure_visible(len);
    }

    pub fn move_by(&mut self, delta: isize, len: usize) {
        if len == 0 {
            return;
        }
        let next = (self.cursor as isize + delta).clamp(0, len as isize - 1);
        self.cursor = next as usize;
        self.ensure_visible(len);
    }

    pub fn move_to(&mut self, index: usize, len: usize) {
        if len == 0 {
            return;
        }
        self.cursor = index.min(len - 1);
        self.ensure_visible(len);
    }

    pub fn move_to_end(&mut self, len: usize) {
        self.move_to(len.saturating_sub(1), len);
    }

    pub fn page_down(&mut self, len: usize) {
        self.move_by(self.height.min(len) as isize, len);
    }

    pub fn page_up(&mut self, len: usize) {
        self.move_by(-(self.height.min(len) as isize), len);
    }

    /// Index range of the rows currently on screen.
    pub fn visible(&self, len: usize) -> std::ops::Range<usize> {
        let start = self.offset.min(len);
        start..(start + self.height).min(len)
    }

    /// Shared list navigation keys. Returns `true` when the key was used.
    pub fn handle_key(&mut self, key: &KeyEvent, len: usize) -> bool {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_by(1, len),
            KeyCode::Char('k') | KeyCode::Up => self.move_by(-1, len),
            KeyCode::Char('g') | KeyCode::Home => self.move_to(0, len),
            KeyCode::Char('G') | KeyCode::End => self.move_to_end(len),
            KeyCode::PageDown => self.page_down(len),
            KeyCode::PageUp => self.page_up(len),
            _ => return false,
        }
        true
    }

    fn ensure_visible(&mut self, len: usize) {
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + self.height {
            self.offset = self.cursor + 1 - self.height;
        }
        self.offset = self.offset.min(len.saturating_sub(self.height));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn edits_at_cursor() {
        let mut input = TextInput::with_value("₱2000");
        input.move_home();
        input.move_cursor(1);
        input.insert('1');
        assert_eq!(input.value(), "₱12000");
        input.backspace();
        input.delete();
        assert_eq!(input.value(), "₱000");
        assert_eq!(input.masked(), "••••");
        assert!(input.handle_key(&key(KeyCode::Char('9'))));
        assert!(!input.handle_key(&key(KeyCode::Left)));
        assert_eq!(input.value(), "₱9000");
    }

    #[test]
    fn backspace_at_start_is_noop() {
        let mut input = TextInput::default();
        input.backspace();
        input.delete();
        assert!(input.is_empty());
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn list_cursor_scrolls_with_selection() {
        let mut list = ListCursor::default();
        list.set_height(3, 10);
        list.move_by(4, 10);
        assert_eq!(list.selected(), 4);
        assert_eq!(list.visible(10), 2..5);

        list.move_to_end(10);
        assert_eq!(list.visible(10), 7..10);

        list.clamp(2);
        assert_eq!(list.selected(), 1);
        assert_eq!(list.visible(2), 0..2);

        list.move_by(5, 0);
        list.clamp(0);
        assert_eq!(list.selected(), 0);
    }
}
