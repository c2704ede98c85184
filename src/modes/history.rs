use super::{Mode, Step, track_mouse};
use crate::{
    config::GameConfig,
    engine::Engine,
    input::{InputEvent, keys::Scroll},
};

/// Opens the log viewer on the most recent entry.
pub(super) fn open(engine: Box<Engine>) -> Mode {
    let cursor = engine.log.len().saturating_sub(1);
    Mode::History { engine, cursor }
}

pub(super) fn handle(
    mut engine: Box<Engine>,
    cursor: usize,
    event: &InputEvent,
    config: &GameConfig,
) -> Step {
    let next = match *event {
        InputEvent::Quit => return Step::Quit(Some(engine)),
        InputEvent::MouseMove { tile } => {
            track_mouse(&mut engine, tile);
            Mode::History { engine, cursor }
        }
        InputEvent::MouseDown { .. } => Mode::History { engine, cursor },
        InputEvent::KeyDown { key, .. } => match config.bindings.scroll(key) {
            Some(scroll) => {
                let cursor = scrolled(cursor, scroll, engine.log.len());
                Mode::History { engine, cursor }
            }
            None => Mode::InPlay(engine),
        },
    };
    Step::Continue(next)
}

/// Moving past an end from that end wraps around; any other jump clamps.
fn scrolled(cursor: usize, scroll: Scroll, total: usize) -> usize {
    let last = total.saturating_sub(1);
    match scroll {
        Scroll::First => 0,
        Scroll::Last => last,
        Scroll::By(step) if step < 0 && cursor == 0 => last,
        Scroll::By(step) if step > 0 && cursor == last => 0,
        Scroll::By(step) => cursor.saturating_add_signed(step as isize).min(last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_only_from_the_edges() {
        assert_eq!(scrolled(0, Scroll::By(-1), 20), 19);
        assert_eq!(scrolled(19, Scroll::By(1), 20), 0);
        assert_eq!(scrolled(5, Scroll::By(-10), 20), 0);
        assert_eq!(scrolled(15, Scroll::By(10), 20), 19);
        assert_eq!(scrolled(7, Scroll::By(1), 20), 8);
        assert_eq!(scrolled(0, Scroll::By(1), 0), 0);
    }
}
