//! The command prompt widget.
//!
//! Owns the suggestion buffer and a cursor, routes key events into them, and
//! renders the typed text with the current suggestion ghosted after it.
//! Listener wiring (the autocompleter, mode observers) happens on the buffer
//! before it is handed over; the widget itself reads buffer state directly at
//! render time.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use husky_engine::SuggestBuff;
use husky_types::BufferKind;

use crate::cursor::Cursor;

const DEFAULT_SPACER: u16 = 4;

/// Style knobs for the prompt line.
#[derive(Clone, Debug)]
pub struct PromptTheme {
    pub text: Style,
    pub ghost: Style,
    pub border: Style,
}

impl Default for PromptTheme {
    fn default() -> Self {
        Self {
            text: Style::default(),
            ghost: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::DIM),
            border: Style::default().fg(Color::Cyan),
        }
    }
}

/// Captures the user's free-form command input.
pub struct Prompt {
    buff: SuggestBuff,
    cursor: Cursor,
    theme: PromptTheme,
    no_icons: bool,
    spacer: u16,
}

impl Prompt {
    pub fn new(buff: SuggestBuff, no_icons: bool) -> Self {
        let spacer = if no_icons { DEFAULT_SPACER - 1 } else { DEFAULT_SPACER };
        Self {
            buff,
            cursor: Cursor::default(),
            theme: PromptTheme::default(),
            no_icons,
            spacer,
        }
    }

    pub fn set_theme(&mut self, theme: PromptTheme) {
        self.theme = theme;
    }

    /// The underlying buffer, for listener wiring.
    pub fn buff_mut(&mut self) -> &mut SuggestBuff {
        &mut self.buff
    }

    pub fn in_cmd_mode(&self) -> bool {
        self.buff.is_active()
    }

    /// Brings the prompt up; the buffer's activation listeners trigger an
    /// index refresh.
    pub fn activate(&mut self) {
        self.buff.set_active(true);
        self.buff.notify();
        self.cursor.move_end(&self.buff.text());
    }

    pub fn deactivate(&mut self) {
        self.buff.clear_text(true);
        self.buff.set_active(false);
        self.cursor.reset();
    }

    /// Routes a key event into the buffer. Returns the committed command when
    /// the event completed the input.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<String> {
        match key.code {
            KeyCode::Backspace | KeyCode::Delete => self.erase(key.modifiers),

            KeyCode::Char('u') | KeyCode::Char('w')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                self.buff.clear_text(true);
                self.cursor.reset();
            }

            KeyCode::Char(c)
                if (key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT)
                    && is_valid_input_rune(c) =>
            {
                if self.cursor.position() < self.buff.text().len() {
                    self.buff.insert(c, self.cursor.position());
                } else {
                    self.buff.add(c);
                }
                self.cursor.move_right(&self.buff.text());
            }

            KeyCode::Esc => {
                self.deactivate();
            }

            KeyCode::Enter => {
                let text = self.buff.text();
                self.buff.set_text(&text, "");
                self.buff.set_active(false);
                self.cursor.reset();
                if !text.is_empty() {
                    return Some(text);
                }
            }

            KeyCode::Up => {
                self.buff.next_suggestion();
            }

            KeyCode::Down => {
                self.buff.prev_suggestion();
            }

            KeyCode::Tab => {
                self.accept_suggestion();
            }

            KeyCode::Right => {
                if !self.accept_suggestion() {
                    if key.modifiers.contains(KeyModifiers::CONTROL) {
                        self.cursor.move_word_right(&self.buff.text());
                    } else {
                        self.cursor.move_right(&self.buff.text());
                    }
                }
            }

            KeyCode::Left => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    self.cursor.move_word_left(&self.buff.text());
                } else {
                    self.cursor.move_left(&self.buff.text());
                }
            }

            KeyCode::Home => self.cursor.reset(),

            KeyCode::End => self.cursor.move_end(&self.buff.text()),

            _ => {}
        }
        None
    }

    /// Replaces the input with the ring's current entry.
    fn accept_suggestion(&mut self) -> bool {
        let Some(suggestion) = self.buff.current_suggestion().map(str::to_string) else {
            return false;
        };
        self.buff.set_text(&suggestion, "");
        self.buff.clear_suggestions();
        self.cursor.move_end(&suggestion);
        true
    }

    /// Deletes one character before the cursor, or the previous word with
    /// Alt held.
    fn erase(&mut self, modifiers: KeyModifiers) {
        if self.cursor.position() == 0 {
            return;
        }
        let text = self.buff.text();
        let end = self.cursor.position() - 1;
        let start = if modifiers.contains(KeyModifiers::ALT) {
            self.cursor.move_word_left(&text)
        } else {
            self.cursor.move_left(&text)
        };
        self.buff.delete_range(start, end);
    }

    fn prefixes(&self) -> (char, char) {
        let (icon, prefix) = match self.buff.kind() {
            BufferKind::Command => ('🐕', '>'),
            BufferKind::Filter => ('🔎', '/'),
        };
        if self.no_icons {
            (' ', prefix)
        } else {
            (icon, prefix)
        }
    }

    /// Draws the prompt line inside `area` and parks the terminal cursor at
    /// the edit position. Inactive prompts draw nothing.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.buff.is_active() {
            return;
        }

        let text = self.buff.text();
        let (icon, prefix) = self.prefixes();

        let mut spans = vec![
            Span::raw(format!("{icon}{prefix} ")),
            Span::styled(text.clone(), self.theme.text.add_modifier(Modifier::BOLD)),
        ];
        // Ghost the part of the current suggestion the user has not typed yet.
        if let Some(suggestion) = self.buff.current_suggestion() {
            if let Some(rest) = suggestion.strip_prefix(text.as_str()) {
                spans.push(Span::styled(rest.to_string(), self.theme.ghost));
            }
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border);
        let inner = block.inner(area);
        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);

        let x = inner.x + self.spacer + self.cursor.position() as u16;
        frame.set_cursor_position((x.min(inner.right().saturating_sub(1)), inner.y));
    }
}

/// Filters control characters and other non-printables that terminals leak
/// through escape sequences (cursor position reports and the like).
fn is_valid_input_rune(r: char) -> bool {
    !r.is_control() && (r.is_ascii_graphic() || r == ' ' || !r.is_ascii())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt_with(suggestions: Vec<String>) -> Prompt {
        let mut buff = SuggestBuff::new(BufferKind::Command);
        buff.set_suggestion_fn(Box::new(move |_, _| suggestions.clone()));
        let mut prompt = Prompt::new(buff, false);
        prompt.activate();
        prompt
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(prompt: &mut Prompt, text: &str) {
        for c in text.chars() {
            prompt.handle_key_event(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn typing_reaches_the_buffer() {
        let mut prompt = prompt_with(vec![]);
        type_text(&mut prompt, "pod fred");
        assert_eq!(prompt.buff_mut().text(), "pod fred");
    }

    #[test]
    fn backspace_erases_one_character() {
        let mut prompt = prompt_with(vec![]);
        type_text(&mut prompt, "pod");
        prompt.handle_key_event(key(KeyCode::Backspace));
        assert_eq!(prompt.buff_mut().text(), "po");
    }

    #[test]
    fn alt_backspace_erases_a_word() {
        let mut prompt = prompt_with(vec![]);
        type_text(&mut prompt, "pod fred");
        prompt.handle_key_event(KeyEvent::new(KeyCode::Backspace, KeyModifiers::ALT));
        assert_eq!(prompt.buff_mut().text(), "pod ");
    }

    #[test]
    fn tab_accepts_the_current_suggestion() {
        let mut prompt = prompt_with(vec!["alias1".into(), "alias2".into()]);
        type_text(&mut prompt, "a");
        prompt.handle_key_event(key(KeyCode::Tab));
        assert_eq!(prompt.buff_mut().text(), "alias1");
        assert!(prompt.buff_mut().suggestions().is_empty());
    }

    #[test]
    fn up_cycles_the_ring_before_accepting() {
        let mut prompt = prompt_with(vec!["alias1".into(), "alias2".into()]);
        type_text(&mut prompt, "a");
        prompt.handle_key_event(key(KeyCode::Up));
        prompt.handle_key_event(key(KeyCode::Tab));
        assert_eq!(prompt.buff_mut().text(), "alias2");
    }

    #[test]
    fn enter_commits_and_deactivates() {
        let mut prompt = prompt_with(vec![]);
        type_text(&mut prompt, "pod");
        let committed = prompt.handle_key_event(key(KeyCode::Enter));
        assert_eq!(committed.as_deref(), Some("pod"));
        assert!(!prompt.in_cmd_mode());
    }

    #[test]
    fn escape_clears_and_deactivates() {
        let mut prompt = prompt_with(vec![]);
        type_text(&mut prompt, "pod");
        prompt.handle_key_event(key(KeyCode::Esc));
        assert_eq!(prompt.buff_mut().text(), "");
        assert!(!prompt.in_cmd_mode());
    }

    #[test]
    fn control_characters_are_filtered() {
        let mut prompt = prompt_with(vec![]);
        prompt.handle_key_event(key(KeyCode::Char('\u{7}')));
        assert_eq!(prompt.buff_mut().text(), "");
    }
}
