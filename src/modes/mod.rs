//! The input mode state machine. Exactly one mode is active; every mode
//! except the main menu owns the live engine.
mod ask;
mod history;
mod menu;
mod play;

use bracket_geometry::prelude::Point;
use tracing::{debug, error, info};

use crate::{
    action::{Action, ActionOutcome, TargetPurpose},
    config::GameConfig,
    engine::Engine,
    error::EngineError,
    input::InputEvent,
    log::ColorTag,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InventoryPurpose {
    Activate,
    Drop,
}

pub enum Mode {
    MainMenu,
    InPlay(Box<Engine>),
    SelectTarget {
        engine: Box<Engine>,
        purpose: TargetPurpose,
    },
    Inventory {
        engine: Box<Engine>,
        purpose: InventoryPurpose,
    },
    History {
        engine: Box<Engine>,
        cursor: usize,
    },
    Popup {
        parent: Box<Mode>,
        text: String,
    },
    GameOver(Box<Engine>),
}

/// What handling one event leaves behind.
pub enum Step {
    Continue(Mode),
    /// Leave the loop; an engine here is saved on the way out.
    Quit(Option<Box<Engine>>),
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::MainMenu => "main-menu",
            Mode::InPlay(_) => "in-play",
            Mode::SelectTarget { .. } => "select-target",
            Mode::Inventory { .. } => "inventory",
            Mode::History { .. } => "history",
            Mode::Popup { .. } => "popup",
            Mode::GameOver(_) => "game-over",
        }
    }

    pub fn engine(&self) -> Option<&Engine> {
        match self {
            Mode::MainMenu => None,
            Mode::InPlay(engine)
            | Mode::GameOver(engine)
            | Mode::SelectTarget { engine, .. }
            | Mode::Inventory { engine, .. }
            | Mode::History { engine, .. } => Some(engine),
            Mode::Popup { parent, .. } => parent.engine(),
        }
    }

    pub fn handle(self, event: &InputEvent, config: &GameConfig) -> Step {
        let from = self.name();
        let step = match self {
            Mode::MainMenu => menu::main_menu(event, config),
            Mode::InPlay(engine) => play::handle(engine, event, config),
            Mode::SelectTarget { engine, purpose } => {
                ask::select_target(engine, purpose, event, config)
            }
            Mode::Inventory { engine, purpose } => ask::inventory(engine, purpose, event, config),
            Mode::History { engine, cursor } => history::handle(engine, cursor, event, config),
            Mode::Popup { parent, text } => menu::popup(parent, text, event, config),
            Mode::GameOver(engine) => menu::game_over(engine, event, config),
        };

        match &step {
            Step::Continue(next) if next.name() != from => {
                debug!(from, to = next.name(), "mode transition");
            }
            Step::Quit(engine) => debug!(from, save = engine.is_some(), "quit requested"),
            Step::Continue(_) => {}
        }
        step
    }
}

/// Points the engine cursor at the hovered tile when it lies on the map.
fn track_mouse(engine: &mut Engine, tile: Point) {
    if engine.map.in_bounds(tile) {
        engine.cursor = tile;
    }
}

/// Runs `action` as a full turn. An advanced turn returns to play (or game
/// over); a rejection or fault is logged and `stay` rebuilds the current mode.
fn handle_action(
    mut engine: Box<Engine>,
    action: Action,
    stay: impl FnOnce(Box<Engine>) -> Mode,
) -> Mode {
    match engine.resolve_turn(action) {
        Ok(ActionOutcome::Advanced) if engine.is_player_alive() => Mode::InPlay(engine),
        Ok(ActionOutcome::Advanced) => {
            info!(turn = engine.turn, depth = engine.depth, "player died");
            Mode::GameOver(engine)
        }
        Ok(ActionOutcome::Rejected(reason)) => {
            engine.log.add(reason, ColorTag::Impossible);
            stay(engine)
        }
        Err(err) => {
            report_fault(&mut engine, &err);
            stay(engine)
        }
    }
}

fn report_fault(engine: &mut Engine, err: &EngineError) {
    error!(%err, "engine fault");
    engine.log.add(err.to_string(), ColorTag::Error);
}
