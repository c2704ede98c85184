use bracket_terminal::prelude::VirtualKeyCode;

use super::{InventoryPurpose, Mode, Step, ask, handle_action, history, track_mouse};
use crate::{
    action::{Action, TargetPurpose},
    config::GameConfig,
    engine::Engine,
    input::{InputEvent, Modifiers},
};

pub(super) fn handle(mut engine: Box<Engine>, event: &InputEvent, config: &GameConfig) -> Step {
    let (key, mods) = match *event {
        InputEvent::Quit => return Step::Quit(Some(engine)),
        InputEvent::MouseMove { tile } => {
            track_mouse(&mut engine, tile);
            return Step::Continue(Mode::InPlay(engine));
        }
        InputEvent::MouseDown { .. } => return Step::Continue(Mode::InPlay(engine)),
        InputEvent::KeyDown { key, mods } => (key, mods),
    };

    if let Some(action) = action_for(key, mods, config) {
        return Step::Continue(handle_action(engine, action, Mode::InPlay));
    }

    let next = match key {
        VirtualKeyCode::Escape => return Step::Quit(Some(engine)),
        VirtualKeyCode::I => Mode::Inventory {
            engine,
            purpose: InventoryPurpose::Activate,
        },
        VirtualKeyCode::D => Mode::Inventory {
            engine,
            purpose: InventoryPurpose::Drop,
        },
        VirtualKeyCode::Slash => ask::begin_targeting(engine, TargetPurpose::Look),
        VirtualKeyCode::V => history::open(engine),
        _ => Mode::InPlay(engine),
    };
    Step::Continue(next)
}

fn action_for(key: VirtualKeyCode, mods: Modifiers, config: &GameConfig) -> Option<Action> {
    if key == VirtualKeyCode::Period && mods.contains(Modifiers::SHIFT) {
        return Some(Action::DescendStairs);
    }
    if let Some((dx, dy)) = config.bindings.move_delta(key) {
        return Some(Action::Move { dx, dy });
    }
    if config.bindings.is_wait(key) {
        return Some(Action::Wait);
    }
    (key == VirtualKeyCode::G).then_some(Action::PickUp)
}
