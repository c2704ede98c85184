use bracket_terminal::prelude::VirtualKeyCode::{self, *};

/// A history-view cursor command.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Scroll {
    By(i32),
    First,
    Last,
}

/// Static key tables shared by every mode.
#[derive(Debug)]
pub struct Bindings {
    pub moves: &'static [(VirtualKeyCode, (i32, i32))],
    pub wait: &'static [VirtualKeyCode],
    pub confirm: &'static [VirtualKeyCode],
    pub history: &'static [(VirtualKeyCode, Scroll)],
    pub modifier_keys: &'static [VirtualKeyCode],
}

pub static BINDINGS: Bindings = Bindings {
    moves: &[
        // Arrow keys and the navigation block.
        (Up, (0, -1)),
        (Down, (0, 1)),
        (Left, (-1, 0)),
        (Right, (1, 0)),
        (Home, (-1, -1)),
        (End, (-1, 1)),
        (PageUp, (1, -1)),
        (PageDown, (1, 1)),
        // Numpad.
        (Numpad1, (-1, 1)),
        (Numpad2, (0, 1)),
        (Numpad3, (1, 1)),
        (Numpad4, (-1, 0)),
        (Numpad6, (1, 0)),
        (Numpad7, (-1, -1)),
        (Numpad8, (0, -1)),
        (Numpad9, (1, -1)),
        // Vi keys.
        (H, (-1, 0)),
        (J, (0, 1)),
        (K, (0, -1)),
        (L, (1, 0)),
        (Y, (-1, -1)),
        (U, (1, -1)),
        (B, (-1, 1)),
        (N, (1, 1)),
    ],
    wait: &[Period, Numpad5],
    confirm: &[Return, NumpadEnter],
    history: &[
        (Up, Scroll::By(-1)),
        (Down, Scroll::By(1)),
        (PageUp, Scroll::By(-10)),
        (PageDown, Scroll::By(10)),
        (Home, Scroll::First),
        (End, Scroll::Last),
    ],
    modifier_keys: &[LShift, RShift, LControl, RControl, LAlt, RAlt],
};

const LETTERS: [VirtualKeyCode; 26] = [
    A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
];

impl Bindings {
    pub fn move_delta(&self, key: VirtualKeyCode) -> Option<(i32, i32)> {
        self.moves
            .iter()
            .find(|(bound, _)| *bound == key)
            .map(|(_, delta)| *delta)
    }

    pub fn is_wait(&self, key: VirtualKeyCode) -> bool {
        self.wait.contains(&key)
    }

    pub fn is_confirm(&self, key: VirtualKeyCode) -> bool {
        self.confirm.contains(&key)
    }

    pub fn scroll(&self, key: VirtualKeyCode) -> Option<Scroll> {
        self.history
            .iter()
            .find(|(bound, _)| *bound == key)
            .map(|(_, scroll)| *scroll)
    }

    pub fn is_modifier_key(&self, key: VirtualKeyCode) -> bool {
        self.modifier_keys.contains(&key)
    }
}

/// `A` is 0, `Z` is 25.
pub fn letter_index(key: VirtualKeyCode) -> Option<usize> {
    LETTERS.iter().position(|letter| *letter == key)
}

pub fn letter_key(c: char) -> Option<VirtualKeyCode> {
    let c = c.to_ascii_lowercase();
    c.is_ascii_lowercase()
        .then(|| LETTERS[(c as u8 - b'a') as usize])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_alias_family_covers_eight_directions() {
        let families: [[VirtualKeyCode; 8]; 3] = [
            [Up, Down, Left, Right, Home, End, PageUp, PageDown],
            [Numpad8, Numpad2, Numpad4, Numpad6, Numpad7, Numpad1, Numpad9, Numpad3],
            [K, J, H, L, Y, B, U, N],
        ];
        for family in families {
            let deltas: Vec<_> = family
                .iter()
                .map(|key| BINDINGS.move_delta(*key))
                .collect();
            assert_eq!(
                deltas,
                vec![
                    Some((0, -1)),
                    Some((0, 1)),
                    Some((-1, 0)),
                    Some((1, 0)),
                    Some((-1, -1)),
                    Some((-1, 1)),
                    Some((1, -1)),
                    Some((1, 1)),
                ]
            );
        }
    }

    #[test]
    fn letters_map_to_slots() {
        assert_eq!(letter_index(A), Some(0));
        assert_eq!(letter_index(Z), Some(25));
        assert_eq!(letter_index(Return), None);
        assert_eq!(letter_key('f'), Some(F));
        assert_eq!(letter_key('?'), None);
    }
}
