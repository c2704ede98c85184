use serde::{Deserialize, Serialize};

/// Semantic color of a log line. Resolved to RGB by the render palette.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorTag {
    White,
    PlayerAttack,
    EnemyAttack,
    PlayerDie,
    EnemyDie,
    Invalid,
    Impossible,
    Error,
    Welcome,
    HealthRecovered,
    StatusEffect,
    Descend,
    NeedsTarget,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub text: String,
    pub color: ColorTag,
    pub count: u32,
}

impl LogEntry {
    /// Text as displayed, with the repeat suffix once a message has stacked.
    pub fn full_text(&self) -> String {
        if self.count > 1 {
            format!("{} (x{})", self.text, self.count)
        } else {
            self.text.clone()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLog {
    entries: Vec<LogEntry>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<S: Into<String>>(&mut self, text: S, color: ColorTag) {
        let text = text.into();
        if let Some(last) = self.entries.last_mut() {
            if last.text == text && last.color == color {
                last.count += 1;
                return;
            }
        }
        self.entries.push(LogEntry {
            text,
            color,
            count: 1,
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lays out `entries` into at most `height` lines of `width` columns.
    ///
    /// The newest entry sits on the last line; older entries are pushed up
    /// and cut off once the region is full. Lines come back top to bottom.
    pub fn layout(entries: &[LogEntry], width: usize, height: usize) -> Vec<(String, ColorTag)> {
        let mut lines = Vec::new();
        if width == 0 || height == 0 {
            return lines;
        }
        'entries: for entry in entries.iter().rev() {
            for line in wrap(&entry.full_text(), width).into_iter().rev() {
                lines.push((line, entry.color));
                if lines.len() == height {
                    break 'entries;
                }
            }
        }
        lines.reverse();
        lines
    }
}

/// Greedy word wrap. Words longer than `width` are split hard.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let current_len = current.chars().count();
        if current_len > 0 && current_len + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
