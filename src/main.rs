mod action;
mod ai;
mod config;
mod data;
mod ecs;
mod engine;
mod error;
mod input;
mod log;
mod map;
mod modes;
mod render;
mod save;

use std::{io, path::Path};

use bracket_terminal::prelude::*;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use config::GameConfig;
use input::{InputEvent, InputPoller, script::ScriptedInput};
use modes::{Mode, Step};

struct ArchiveState {
    mode: Option<Mode>,
    config: GameConfig,
    poller: InputPoller,
    script: Option<ScriptedInput>,
}

impl ArchiveState {
    fn new(config: GameConfig) -> Self {
        let script = config.script.as_ref().and_then(|path| {
            ScriptedInput::from_file(path)
                .inspect_err(|err| warn!(%err, path = %path.display(), "ignoring input script"))
                .ok()
        });
        Self {
            mode: Some(Mode::MainMenu),
            config,
            poller: InputPoller::default(),
            script,
        }
    }

    /// Scripted events are replayed one per tick before live input is read.
    fn next_events(&mut self, ctx: &BTerm) -> Vec<InputEvent> {
        if let Some(event) = self.script.as_mut().and_then(ScriptedInput::next_event) {
            return vec![event];
        }
        self.poller.poll(ctx)
    }

    fn finish(&mut self, ctx: &mut BTerm, engine: Option<Box<engine::Engine>>) {
        if let Some(engine) = engine {
            if let Err(err) = save::save_to_file(&engine, &self.config.save_path) {
                error!(%err, "failed to save on exit");
            }
        }
        info!("exiting");
        ctx.quit();
    }
}

impl GameState for ArchiveState {
    fn tick(&mut self, ctx: &mut BTerm) {
        for event in self.next_events(ctx) {
            let Some(mode) = self.mode.take() else {
                return;
            };
            match mode.handle(&event, &self.config) {
                Step::Continue(next) => self.mode = Some(next),
                Step::Quit(engine) => {
                    self.finish(ctx, engine);
                    return;
                }
            }
        }

        if let Some(mode) = &self.mode {
            render::render(mode, ctx);
        }
    }
}

fn init_logging(dir: &Path) -> io::Result<WorkerGuard> {
    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::never(dir, "desolate-archive.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    // The console owns the terminal, so logs only go to the file.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();
    Ok(guard)
}

fn main() -> BError {
    let config = GameConfig::from_env();
    let _guard = init_logging(&config.log_dir)?;
    info!(save = %config.save_path.display(), "starting");

    let context = BTermBuilder::simple(config.screen_width, config.screen_height)?
        .with_title("Desolate Archive")
        .build()?;
    main_loop(context, ArchiveState::new(config))
}
