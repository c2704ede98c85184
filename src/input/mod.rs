pub mod keys;
pub mod script;

use bitflags::bitflags;
use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::{BTerm, VirtualKeyCode};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b001;
        const CONTROL = 0b010;
        const ALT = 0b100;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// One raw input event, already converted to map tiles where relevant.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown { key: VirtualKeyCode, mods: Modifiers },
    MouseMove { tile: Point },
    MouseDown { button: MouseButton, tile: Point },
    Quit,
}

impl InputEvent {
    pub fn key(key: VirtualKeyCode) -> Self {
        Self::KeyDown {
            key,
            mods: Modifiers::empty(),
        }
    }

    pub fn key_with(key: VirtualKeyCode, mods: Modifiers) -> Self {
        Self::KeyDown { key, mods }
    }
}

/// Turns the console's per-frame input state into discrete events.
#[derive(Default)]
pub struct InputPoller {
    last_mouse: Option<Point>,
}

impl InputPoller {
    pub fn poll(&mut self, ctx: &BTerm) -> Vec<InputEvent> {
        let mut events = Vec::new();

        let (mx, my) = ctx.mouse_pos();
        let tile = Point::new(mx, my);
        if self.last_mouse != Some(tile) {
            self.last_mouse = Some(tile);
            events.push(InputEvent::MouseMove { tile });
        }

        if let Some(key) = ctx.key {
            let mut mods = Modifiers::empty();
            mods.set(Modifiers::SHIFT, ctx.shift);
            mods.set(Modifiers::CONTROL, ctx.control);
            mods.set(Modifiers::ALT, ctx.alt);
            events.push(InputEvent::KeyDown { key, mods });
        }

        if ctx.left_click {
            events.push(InputEvent::MouseDown {
                button: MouseButton::Left,
                tile,
            });
        }

        if ctx.quitting {
            events.push(InputEvent::Quit);
        }
        events
    }
}
