use bracket_terminal::prelude::VirtualKeyCode;
use tracing::warn;

use super::{Mode, Step, track_mouse};
use crate::{
    config::GameConfig,
    engine::Engine,
    input::InputEvent,
    save::{self, SaveError},
};

pub(super) fn main_menu(event: &InputEvent, config: &GameConfig) -> Step {
    let key = match *event {
        InputEvent::Quit => return Step::Quit(None),
        InputEvent::KeyDown { key, .. } => key,
        _ => return Step::Continue(Mode::MainMenu),
    };

    let next = match key {
        VirtualKeyCode::Q | VirtualKeyCode::Escape => return Step::Quit(None),
        VirtualKeyCode::N => Mode::InPlay(Box::new(Engine::new_game(config))),
        VirtualKeyCode::C => match save::load_from_file(&config.save_path) {
            Ok(engine) => Mode::InPlay(Box::new(engine)),
            Err(SaveError::NotFound(_)) => popup_over(Mode::MainMenu, "No saved games to load."),
            Err(err) => popup_over(Mode::MainMenu, format!("Failed to load save:\n{err}")),
        },
        _ => Mode::MainMenu,
    };
    Step::Continue(next)
}

fn popup_over(parent: Mode, text: impl Into<String>) -> Mode {
    Mode::Popup {
        parent: Box::new(parent),
        text: text.into(),
    }
}

pub(super) fn popup(
    parent: Box<Mode>,
    text: String,
    event: &InputEvent,
    config: &GameConfig,
) -> Step {
    match event {
        InputEvent::Quit => (*parent).handle(event, config),
        InputEvent::KeyDown { .. } => Step::Continue(*parent),
        _ => Step::Continue(Mode::Popup { parent, text }),
    }
}

pub(super) fn game_over(mut engine: Box<Engine>, event: &InputEvent, config: &GameConfig) -> Step {
    match *event {
        InputEvent::Quit
        | InputEvent::KeyDown {
            key: VirtualKeyCode::Escape,
            ..
        } => {
            if let Err(err) = save::delete_save(&config.save_path) {
                warn!(%err, "could not delete the save of a finished game");
            }
            Step::Quit(None)
        }
        InputEvent::MouseMove { tile } => {
            track_mouse(&mut engine, tile);
            Step::Continue(Mode::GameOver(engine))
        }
        _ => Step::Continue(Mode::GameOver(engine)),
    }
}
