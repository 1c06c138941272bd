use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};

/// Single line text editor backing the search box.
#[derive(Default)]
pub struct Inputter {
    current_input: String,
    curser_pos: usize, // In chars, not bytes
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct InputResult {
    pub input: String,
    pub curser_pos: usize,
}

impl Inputter {
    pub fn read(&mut self, key: event::KeyEvent) -> InputResult {
        match (key.code, key.modifiers) {
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Left, _) => self.left(),
            (KeyCode::Right, _) => self.right(),
            (KeyCode::Home, _) => self.home(),
            (KeyCode::End, _) => self.end(),
            (kc, km) => self.key(kc, km),
        }
    }

    pub fn set(&mut self, s: &str) {
        self.current_input = s.to_string();
        self.curser_pos = s.chars().count();
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            input: self.current_input.clone(),
            curser_pos: self.curser_pos,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.current_input.is_empty()
    }

    pub fn clear(&mut self) {
        self.current_input.clear();
        self.curser_pos = 0;
    }

    fn backspace(&mut self) -> InputResult {
        if self.curser_pos > 0 {
            self.curser_pos -= 1;
            let pos = self.getbytepos();
            self.current_input.remove(pos);
        }
        self.get()
    }

    fn delete(&mut self) -> InputResult {
        if self.curser_pos < self.char_len() {
            let pos = self.getbytepos();
            self.current_input.remove(pos);
        }
        self.get()
    }

    fn left(&mut self) -> InputResult {
        self.curser_pos = self.curser_pos.saturating_sub(1);
        self.get()
    }

    fn right(&mut self) -> InputResult {
        if self.curser_pos < self.char_len() {
            self.curser_pos += 1;
        }
        self.get()
    }

    fn home(&mut self) -> InputResult {
        self.curser_pos = 0;
        self.get()
    }

    fn end(&mut self) -> InputResult {
        self.curser_pos = self.char_len();
        self.get()
    }

    fn key(&mut self, code: KeyCode, modifier: KeyModifiers) -> InputResult {
        if modifier.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return self.get();
        }
        if let Some(chr) = code.as_char() {
            self.current_input.insert(self.getbytepos(), chr);
            self.curser_pos += 1;
        }
        self.get()
    }

    fn char_len(&self) -> usize {
        self.current_input.chars().count()
    }

    fn getbytepos(&self) -> usize {
        self.current_input
            .char_indices()
            .nth(self.curser_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyEvent;

    fn type_str(inputter: &mut Inputter, s: &str) -> InputResult {
        let mut last = inputter.get();
        for c in s.chars() {
            last = inputter.read(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
        last
    }

    fn press(inputter: &mut Inputter, code: KeyCode) -> InputResult {
        inputter.read(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_typing() {
        let mut inputter = Inputter::default();
        let result = type_str(&mut inputter, "João");
        assert_eq!(result.input, "João");
        assert_eq!(result.curser_pos, 4);
    }

    #[test]
    fn test_shifted_characters() {
        let mut inputter = Inputter::default();
        let result = inputter.read(KeyEvent::new(KeyCode::Char('M'), KeyModifiers::SHIFT));
        assert_eq!(result.input, "M");
    }

    #[test]
    fn test_backspace_in_the_middle() {
        let mut inputter = Inputter::default();
        type_str(&mut inputter, "Mãria");
        press(&mut inputter, KeyCode::Left);
        press(&mut inputter, KeyCode::Left);
        let result = press(&mut inputter, KeyCode::Backspace);
        assert_eq!(result.input, "Mãia");
        assert_eq!(result.curser_pos, 2);
    }

    #[test]
    fn test_delete_and_insert() {
        let mut inputter = Inputter::default();
        type_str(&mut inputter, "Ana");
        press(&mut inputter, KeyCode::Home);
        press(&mut inputter, KeyCode::Delete);
        let result = type_str(&mut inputter, "I");
        assert_eq!(result.input, "Ina");
        assert_eq!(result.curser_pos, 1);
        let result = press(&mut inputter, KeyCode::End);
        assert_eq!(result.curser_pos, 3);
    }

    #[test]
    fn test_cursor_bounds() {
        let mut inputter = Inputter::default();
        assert_eq!(press(&mut inputter, KeyCode::Backspace).input, "");
        assert_eq!(press(&mut inputter, KeyCode::Left).curser_pos, 0);
        type_str(&mut inputter, "ab");
        assert_eq!(press(&mut inputter, KeyCode::Right).curser_pos, 2);
        assert_eq!(press(&mut inputter, KeyCode::Delete).input, "ab");
    }

    #[test]
    fn test_set_moves_cursor_to_end() {
        let mut inputter = Inputter::default();
        inputter.set("Conceição");
        assert_eq!(inputter.get().curser_pos, 9);
        inputter.clear();
        assert!(inputter.is_empty());
        assert_eq!(inputter.get().curser_pos, 0);
    }

    #[test]
    fn test_control_chords_are_ignored() {
        let mut inputter = Inputter::default();
        let result = inputter.read(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(result.input, "");
    }
}
