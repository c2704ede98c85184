//! Game constants, overridable from the environment.
use std::{env, path::PathBuf};

use chrono::Utc;

use crate::{
    input::keys::{BINDINGS, Bindings},
    map::generation::GenerationParams,
};

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub screen_width: i32,
    pub screen_height: i32,
    pub map_width: i32,
    pub map_height: i32,
    pub max_rooms: usize,
    pub room_min_size: i32,
    pub room_max_size: i32,
    pub max_monsters_per_room: i32,
    pub max_items_per_room: i32,
    pub fov_radius: i32,
    pub save_path: PathBuf,
    pub log_dir: PathBuf,
    /// Fixed world seed; a clock-derived one is used when absent.
    pub seed: Option<u64>,
    /// Input script replayed before live input.
    pub script: Option<PathBuf>,
    pub bindings: &'static Bindings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen_width: 80,
            screen_height: 50,
            map_width: 80,
            map_height: 43,
            max_rooms: 30,
            room_min_size: 6,
            room_max_size: 10,
            max_monsters_per_room: 2,
            max_items_per_room: 2,
            fov_radius: 8,
            save_path: PathBuf::from("savegame.sav"),
            log_dir: PathBuf::from("."),
            seed: None,
            script: None,
            bindings: &BINDINGS,
        }
    }
}

impl GameConfig {
    /// Environment variables:
    /// - `DESOLATE_SAVE_PATH` - save file location (default: `savegame.sav`)
    /// - `DESOLATE_LOG_DIR` - directory for `desolate-archive.log` (default: `.`)
    /// - `DESOLATE_SEED` - fixed world seed
    /// - `DESOLATE_SCRIPT` - input script to replay
    /// - `DESOLATE_FOV_RADIUS` - sight radius in tiles (default: 8)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(path) = read_env::<PathBuf>("DESOLATE_SAVE_PATH") {
            config.save_path = path;
        }
        if let Some(dir) = read_env::<PathBuf>("DESOLATE_LOG_DIR") {
            config.log_dir = dir;
        }
        config.seed = read_env::<u64>("DESOLATE_SEED");
        config.script = read_env::<PathBuf>("DESOLATE_SCRIPT");
        if let Some(radius) = read_env::<i32>("DESOLATE_FOV_RADIUS") {
            config.fov_radius = radius.max(1);
        }

        config
    }

    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            map_width: self.map_width,
            map_height: self.map_height,
            max_rooms: self.max_rooms,
            room_min_size: self.room_min_size,
            room_max_size: self.room_max_size,
            max_monsters_per_room: self.max_monsters_per_room,
            max_items_per_room: self.max_items_per_room,
        }
    }

    pub fn clock_seed() -> u64 {
        Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
