//! Prompts that wait for one answer: inventory selection and targeting.
//! Anything that is not an answer drops back to play.
use bracket_geometry::prelude::Point;

use super::{InventoryPurpose, Mode, Step, handle_action, report_fault, track_mouse};
use crate::{
    action::{Action, Activation, TargetPurpose},
    config::GameConfig,
    engine::Engine,
    input::{InputEvent, Modifiers, MouseButton, keys::letter_index},
    log::ColorTag,
};

pub(super) fn inventory(
    mut engine: Box<Engine>,
    purpose: InventoryPurpose,
    event: &InputEvent,
    config: &GameConfig,
) -> Step {
    let stay = |engine| Mode::Inventory { engine, purpose };
    let next = match *event {
        InputEvent::Quit => return Step::Quit(Some(engine)),
        InputEvent::MouseMove { tile } => {
            track_mouse(&mut engine, tile);
            stay(engine)
        }
        InputEvent::MouseDown { .. } => Mode::InPlay(engine),
        InputEvent::KeyDown { key, .. } if config.bindings.is_modifier_key(key) => stay(engine),
        InputEvent::KeyDown { key, .. } => match letter_index(key) {
            Some(slot) => select_slot(engine, purpose, slot),
            None => Mode::InPlay(engine),
        },
    };
    Step::Continue(next)
}

fn select_slot(mut engine: Box<Engine>, purpose: InventoryPurpose, slot: usize) -> Mode {
    let stay = move |engine| Mode::Inventory { engine, purpose };
    let inventory = match engine.inventory() {
        Ok(inventory) => inventory,
        Err(err) => {
            report_fault(&mut engine, &err);
            return stay(engine);
        }
    };
    let Some(item) = inventory.items.get(slot) else {
        engine.log.add("Invalid entry", ColorTag::Invalid);
        return stay(engine);
    };

    match purpose {
        InventoryPurpose::Activate => match item.activation() {
            Activation::Act(action) => handle_action(engine, action, stay),
            Activation::Target(target) => {
                engine
                    .log
                    .add("Select a target location.", ColorTag::NeedsTarget);
                begin_targeting(engine, target)
            }
        },
        InventoryPurpose::Drop => handle_action(engine, Action::Drop { item: item.id }, stay),
    }
}

/// Enters targeting with the cursor on the player.
pub(super) fn begin_targeting(mut engine: Box<Engine>, purpose: TargetPurpose) -> Mode {
    match engine.player_point() {
        Ok(point) => {
            engine.cursor = point;
            Mode::SelectTarget { engine, purpose }
        }
        Err(err) => {
            report_fault(&mut engine, &err);
            Mode::InPlay(engine)
        }
    }
}

pub(super) fn select_target(
    mut engine: Box<Engine>,
    purpose: TargetPurpose,
    event: &InputEvent,
    config: &GameConfig,
) -> Step {
    let stay = |engine| Mode::SelectTarget { engine, purpose };
    let next = match *event {
        InputEvent::Quit => return Step::Quit(Some(engine)),
        InputEvent::MouseMove { tile } => {
            track_mouse(&mut engine, tile);
            stay(engine)
        }
        InputEvent::MouseDown {
            button: MouseButton::Left,
            tile,
        } if engine.map.in_bounds(tile) => confirm(engine, purpose, tile),
        InputEvent::MouseDown { .. } => Mode::InPlay(engine),
        InputEvent::KeyDown { key, .. } if config.bindings.is_modifier_key(key) => stay(engine),
        InputEvent::KeyDown { key, .. } if config.bindings.is_confirm(key) => {
            let tile = engine.cursor;
            confirm(engine, purpose, tile)
        }
        InputEvent::KeyDown { key, mods } => match config.bindings.move_delta(key) {
            Some((dx, dy)) => {
                let step = multiplier(mods);
                let moved = Point::new(engine.cursor.x + dx * step, engine.cursor.y + dy * step);
                engine.cursor = engine.map.clamp(moved);
                stay(engine)
            }
            None => Mode::InPlay(engine),
        },
    };
    Step::Continue(next)
}

fn multiplier(mods: Modifiers) -> i32 {
    let mut step = 1;
    if mods.contains(Modifiers::SHIFT) {
        step *= 5;
    }
    if mods.contains(Modifiers::CONTROL) {
        step *= 10;
    }
    if mods.contains(Modifiers::ALT) {
        step *= 20;
    }
    step
}

fn confirm(engine: Box<Engine>, purpose: TargetPurpose, tile: Point) -> Mode {
    let Some(item) = purpose.item() else {
        return Mode::InPlay(engine);
    };
    let carried = engine
        .inventory()
        .is_ok_and(|inventory| inventory.position_of(item).is_some());
    if !carried {
        return Mode::InPlay(engine);
    }

    let action = Action::UseItem {
        item,
        target: Some(tile),
    };
    handle_action(engine, action, |engine| Mode::SelectTarget { engine, purpose })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_multiply() {
        assert_eq!(multiplier(Modifiers::empty()), 1);
        assert_eq!(multiplier(Modifiers::SHIFT), 5);
        assert_eq!(multiplier(Modifiers::SHIFT | Modifiers::CONTROL), 50);
        assert_eq!(multiplier(Modifiers::all()), 1000);
    }
}
