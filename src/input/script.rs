use std::{collections::VecDeque, fs, io, path::Path};

use bracket_terminal::prelude::VirtualKeyCode;
use tracing::warn;

use super::{
    InputEvent, Modifiers,
    keys::letter_key,
};

/// Input events replayed from a text script before live input.
///
/// Every non-whitespace character is one key press (`>` is shift+period);
/// `<name>` tokens name special keys and `S-`, `C-`, `A-` prefixes add
/// modifiers to the token that follows. `#` starts a comment.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    events: VecDeque<InputEvent>,
}

impl ScriptedInput {
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::parse(&fs::read_to_string(path)?))
    }

    pub fn parse(text: &str) -> Self {
        let mut events = VecDeque::new();
        for line in text.lines() {
            let line = line.split('#').next().unwrap_or_default();
            parse_line(line, &mut events);
        }
        Self { events }
    }

    pub fn next_event(&mut self) -> Option<InputEvent> {
        self.events.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Iterator for ScriptedInput {
    type Item = InputEvent;

    fn next(&mut self) -> Option<InputEvent> {
        self.next_event()
    }
}

fn parse_line(line: &str, events: &mut VecDeque<InputEvent>) {
    let chars: Vec<char> = line.chars().collect();
    let mut mods = Modifiers::empty();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if chars.get(i + 1) == Some(&'-') {
            let prefix = match c {
                'S' => Some(Modifiers::SHIFT),
                'C' => Some(Modifiers::CONTROL),
                'A' => Some(Modifiers::ALT),
                _ => None,
            };
            if let Some(prefix) = prefix {
                mods |= prefix;
                i += 2;
                continue;
            }
        }

        if c == '<' {
            if let Some(len) = chars[i..].iter().position(|c| *c == '>') {
                let name: String = chars[i + 1..i + len].iter().collect();
                match named_event(&name, mods) {
                    Some(event) => events.push_back(event),
                    None => warn!(token = %name, "unknown script token"),
                }
                mods = Modifiers::empty();
                i += len + 1;
                continue;
            }
        }

        match char_event(c, mods) {
            Some(event) => events.push_back(event),
            None => warn!(key = %c, "unknown key in script"),
        }
        mods = Modifiers::empty();
        i += 1;
    }
}

fn named_event(name: &str, mods: Modifiers) -> Option<InputEvent> {
    let key = match name {
        "up" => VirtualKeyCode::Up,
        "down" => VirtualKeyCode::Down,
        "left" => VirtualKeyCode::Left,
        "right" => VirtualKeyCode::Right,
        "enter" => VirtualKeyCode::Return,
        "esc" => VirtualKeyCode::Escape,
        "pgup" => VirtualKeyCode::PageUp,
        "pgdn" => VirtualKeyCode::PageDown,
        "home" => VirtualKeyCode::Home,
        "end" => VirtualKeyCode::End,
        "quit" => return Some(InputEvent::Quit),
        _ => return None,
    };
    Some(InputEvent::key_with(key, mods))
}

fn char_event(c: char, mods: Modifiers) -> Option<InputEvent> {
    let (key, extra) = match c {
        '.' => (VirtualKeyCode::Period, Modifiers::empty()),
        '>' => (VirtualKeyCode::Period, Modifiers::SHIFT),
        '/' => (VirtualKeyCode::Slash, Modifiers::empty()),
        c if c.is_ascii_uppercase() => (letter_key(c)?, Modifiers::SHIFT),
        c => (letter_key(c)?, Modifiers::empty()),
    };
    Some(InputEvent::key_with(key, mods | extra))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keys_names_and_modifiers() {
        let mut script = ScriptedInput::parse("# walk then descend\nhj>\nS-<down> <enter>\n");

        assert_eq!(script.next_event(), Some(InputEvent::key(VirtualKeyCode::H)));
        assert_eq!(script.next_event(), Some(InputEvent::key(VirtualKeyCode::J)));
        assert_eq!(
            script.next_event(),
            Some(InputEvent::key_with(VirtualKeyCode::Period, Modifiers::SHIFT))
        );
        assert_eq!(
            script.next_event(),
            Some(InputEvent::key_with(VirtualKeyCode::Down, Modifiers::SHIFT))
        );
        assert_eq!(script.next_event(), Some(InputEvent::key(VirtualKeyCode::Return)));
        assert!(script.is_empty());
    }

    #[test]
    fn unknown_tokens_are_skipped() {
        let script = ScriptedInput::parse("?<nope>g");
        assert_eq!(
            script.collect::<Vec<_>>(),
            vec![InputEvent::key(VirtualKeyCode::G)]
        );
    }

    #[test]
    fn reads_scripts_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moves.txt");
        fs::write(&path, "C-A-<left>\n<quit>\n").unwrap();

        let events: Vec<_> = ScriptedInput::from_file(&path).unwrap().collect();
        assert_eq!(
            events,
            vec![
                InputEvent::key_with(VirtualKeyCode::Left, Modifiers::CONTROL | Modifiers::ALT),
                InputEvent::Quit,
            ]
        );
    }
}
