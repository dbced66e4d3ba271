use crossterm::event::{KeyCode, KeyModifiers};
use unicode_width::UnicodeWidthStr;

/// Search input state for the TUI.
///
/// `cursor_pos` is a byte offset that always sits on a char boundary.
pub struct SearchInput {
    pub query: String,
    pub cursor_pos: usize,
    pub focused: bool,
}

impl Default for SearchInput {
    fn default() -> Self {
        Self {
            query: String::new(),
            cursor_pos: 0,
            focused: true,
        }
    }
}

impl SearchInput {
    pub fn insert_char(&mut self, c: char) {
        self.query.insert(self.cursor_pos, c);
        self.cursor_pos += c.len_utf8();
    }

    /// Append at the end, moving the cursor there
    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.cursor_pos = self.query.len();
    }

    pub fn backspace(&mut self) -> bool {
        if self.cursor_pos == 0 {
            return false;
        }
        let prev = self.prev_boundary();
        self.query.drain(prev..self.cursor_pos);
        self.cursor_pos = prev;
        true
    }

    pub fn delete(&mut self) -> bool {
        if self.cursor_pos >= self.query.len() {
            return false;
        }
        self.query.remove(self.cursor_pos);
        true
    }

    pub fn move_left(&mut self) {
        self.cursor_pos = self.prev_boundary();
    }

    pub fn move_right(&mut self) {
        if self.cursor_pos < self.query.len() {
            self.cursor_pos = self.query[self.cursor_pos..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor_pos + i)
                .unwrap_or(self.query.len());
        }
    }

    pub fn clear(&mut self) -> bool {
        if self.query.is_empty() {
            return false;
        }
        self.query.clear();
        self.cursor_pos = 0;
        true
    }

    /// Display columns between the start of the text and the cursor
    pub fn cursor_column(&self) -> usize {
        self.query[..self.cursor_pos].width()
    }

    /// Apply an editing key. Returns true if the text changed.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        match code {
            KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => self.clear(),
            KeyCode::Char(_) if modifiers.contains(KeyModifiers::CONTROL) => false,
            KeyCode::Char(c) => {
                self.insert_char(c);
                true
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => {
                self.move_left();
                false
            }
            KeyCode::Right => {
                self.move_right();
                false
            }
            KeyCode::Home => {
                self.cursor_pos = 0;
                false
            }
            KeyCode::End => {
                self.cursor_pos = self.query.len();
                false
            }
            _ => false,
        }
    }

    fn prev_boundary(&self) -> usize {
        self.query[..self.cursor_pos]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> SearchInput {
        let mut input = SearchInput::default();
        for c in text.chars() {
            input.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
        input
    }

    #[test]
    fn typing_appends_and_moves_cursor() {
        let input = typed("amélie");
        assert_eq!(input.query, "amélie");
        assert_eq!(input.cursor_pos, input.query.len());
        assert_eq!(input.cursor_column(), 6);
    }

    #[test]
    fn editing_respects_char_boundaries() {
        let mut input = typed("café");
        assert!(input.handle_key(KeyCode::Backspace, KeyModifiers::NONE));
        assert_eq!(input.query, "caf");

        input.handle_key(KeyCode::Home, KeyModifiers::NONE);
        input.handle_key(KeyCode::Right, KeyModifiers::NONE);
        assert!(input.handle_key(KeyCode::Char('h'), KeyModifiers::NONE));
        assert_eq!(input.query, "chaf");

        input.handle_key(KeyCode::End, KeyModifiers::NONE);
        input.handle_key(KeyCode::Left, KeyModifiers::NONE);
        assert!(input.handle_key(KeyCode::Delete, KeyModifiers::NONE));
        assert_eq!(input.query, "cha");
    }

    #[test]
    fn cursor_movement_does_not_change_text() {
        let mut input = typed("up");
        assert!(!input.handle_key(KeyCode::Left, KeyModifiers::NONE));
        assert!(!input.handle_key(KeyCode::Home, KeyModifiers::NONE));
        assert!(!input.handle_key(KeyCode::Backspace, KeyModifiers::NONE));
        assert_eq!(input.query, "up");
    }

    #[test]
    fn ctrl_u_clears_and_other_ctrl_chars_are_ignored() {
        let mut input = typed("jaws");
        assert!(!input.handle_key(KeyCode::Char('a'), KeyModifiers::CONTROL));
        assert_eq!(input.query, "jaws");
        assert!(input.handle_key(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert!(input.query.is_empty());
        assert_eq!(input.cursor_pos, 0);
        assert!(!input.clear());
    }
}
