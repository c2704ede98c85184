//! Compressed snapshots of a whole session.
use std::{
    fs::{self, OpenOptions},
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use bracket_geometry::prelude::Point;
use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    ecs::{EcsWorld, EntitySnapshot},
    engine::Engine,
    log::MessageLog,
    map::{GameMap, Position, generation::GenerationParams},
};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("no save file at {}", .0.display())]
    NotFound(PathBuf),

    #[error("save file is corrupt: {0}")]
    Corrupt(String),

    #[error("save file i/o failed: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, SaveError>;

#[derive(Serialize, Deserialize)]
struct SaveFile {
    version: u32,
    turn: u64,
    depth: u32,
    seed: u64,
    next_item_id: u32,
    fov_radius: i32,
    generation: GenerationParams,
    cursor: Position,
    map: GameMap,
    log: MessageLog,
    entities: Vec<EntitySnapshot>,
}

pub fn save(engine: &Engine) -> Result<Vec<u8>> {
    let file = SaveFile {
        version: FORMAT_VERSION,
        turn: engine.turn,
        depth: engine.depth,
        seed: engine.seed,
        next_item_id: engine.next_item_id,
        fov_radius: engine.fov_radius,
        generation: engine.generation.clone(),
        cursor: Position::from(engine.cursor),
        map: engine.map.clone(),
        log: engine.log.clone(),
        entities: engine.ecs.snapshot(),
    };
    let json = serde_json::to_vec(&file).map_err(|err| SaveError::Corrupt(err.to_string()))?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    Ok(encoder.finish()?)
}

pub fn load(bytes: &[u8]) -> Result<Engine> {
    let mut json = Vec::new();
    GzDecoder::new(bytes)
        .read_to_end(&mut json)
        .map_err(|err| SaveError::Corrupt(err.to_string()))?;
    let file: SaveFile =
        serde_json::from_slice(&json).map_err(|err| SaveError::Corrupt(err.to_string()))?;
    if file.version != FORMAT_VERSION {
        return Err(SaveError::Corrupt(format!(
            "unsupported format version {}",
            file.version
        )));
    }

    if !file.map.is_consistent() {
        return Err(SaveError::Corrupt(format!(
            "map layers do not match {}x{}",
            file.map.width, file.map.height
        )));
    }

    let ecs =
        EcsWorld::from_snapshot(file.entities).map_err(|err| SaveError::Corrupt(err.to_string()))?;
    let player = ecs
        .player_point()
        .map_err(|err| SaveError::Corrupt(err.to_string()))?;
    if !file.map.in_bounds(player) {
        return Err(SaveError::Corrupt(format!(
            "player at ({}, {}) is off the map",
            player.x, player.y
        )));
    }

    let cursor = file.map.clamp(Point::from(file.cursor));
    Ok(Engine {
        ecs,
        map: file.map,
        log: file.log,
        cursor,
        turn: file.turn,
        depth: file.depth,
        seed: file.seed,
        next_item_id: file.next_item_id,
        fov_radius: file.fov_radius,
        generation: file.generation,
    })
}

/// Writes the snapshot next to `path` and renames it into place.
pub fn save_to_file(engine: &Engine, path: &Path) -> Result<()> {
    let bytes = save(engine)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let base = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("savegame.sav");
    let tmp_path = dir.join(format!(".{base}.tmp-{}", std::process::id()));
    {
        let mut tmp = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;
        tmp.write_all(&bytes)?;
        tmp.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;

    info!(path = %path.display(), turn = engine.turn, "game saved");
    Ok(())
}

pub fn load_from_file(path: &Path) -> Result<Engine> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(SaveError::NotFound(path.to_path_buf()));
        }
        Err(err) => return Err(err.into()),
    };
    let engine = load(&bytes).inspect_err(|err| warn!(%err, "rejected save file"))?;
    info!(path = %path.display(), turn = engine.turn, "game loaded");
    Ok(engine)
}

pub fn delete_save(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            info!(path = %path.display(), "save deleted");
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        action::{Action, ActionOutcome},
        data::{items::HEALTH_POTION, monsters::ORC},
        engine::tests::{arena, give},
    };

    #[test]
    fn snapshot_restores_the_session() {
        let mut engine = arena();
        give(&mut engine, &HEALTH_POTION);
        engine.ecs.spawn_monster(&ORC, Point::new(25, 18));
        engine.log.add("Hit!", crate::log::ColorTag::EnemyAttack);
        engine.log.add("Hit!", crate::log::ColorTag::EnemyAttack);
        engine.resolve_turn(Action::Move { dx: 1, dy: 0 }).unwrap();

        let restored = load(&save(&engine).unwrap()).unwrap();

        assert_eq!(restored.player_point().unwrap(), Point::new(11, 10));
        assert_eq!(restored.inventory().unwrap(), engine.inventory().unwrap());
        assert_eq!(restored.log, engine.log);
        assert_eq!(restored.map, engine.map);
        assert_eq!(restored.turn, 1);
        assert_eq!(restored.ecs.snapshot(), engine.ecs.snapshot());
    }

    #[test]
    fn restored_sessions_play_out_identically() {
        let mut engine = arena();
        engine.ecs.spawn_monster(&ORC, Point::new(14, 10));
        engine.ecs.spawn_monster(&ORC, Point::new(14, 12));
        let mut restored = load(&save(&engine).unwrap()).unwrap();

        for _ in 0..3 {
            let a = engine.resolve_turn(Action::Wait).unwrap();
            let b = restored.resolve_turn(Action::Wait).unwrap();
            assert_eq!(a, ActionOutcome::Advanced);
            assert_eq!(a, b);
        }
        assert_eq!(restored.ecs.snapshot(), engine.ecs.snapshot());
        assert_eq!(restored.log, engine.log);
    }

    /// Decodes a save, lets `edit` change the raw JSON, and encodes it again.
    fn tampered(engine: &Engine, edit: impl FnOnce(&mut serde_json::Value)) -> Vec<u8> {
        let mut json = Vec::new();
        GzDecoder::new(save(engine).unwrap().as_slice())
            .read_to_end(&mut json)
            .unwrap();
        let mut value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        edit(&mut value);

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(&serde_json::to_vec(&value).unwrap())
            .unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn short_map_layers_are_corrupt() {
        let engine = arena();
        let bytes = tampered(&engine, |value| {
            value["map"]["tiles"] = serde_json::json!(["Floor"]);
            value["map"]["visible"] = serde_json::json!([true]);
        });

        assert!(matches!(load(&bytes), Err(SaveError::Corrupt(_))));
    }

    #[test]
    fn player_off_the_map_is_corrupt() {
        let engine = arena();
        let bytes = tampered(&engine, |value| {
            value["entities"][0]["position"] = serde_json::json!({ "x": 500, "y": 500 });
        });

        assert!(matches!(load(&bytes), Err(SaveError::Corrupt(_))));
    }

    #[test]
    fn unknown_versions_are_corrupt() {
        let engine = arena();
        let bytes = tampered(&engine, |value| value["version"] = serde_json::json!(99));

        assert!(matches!(load(&bytes), Err(SaveError::Corrupt(_))));
    }

    #[test]
    fn garbage_is_corrupt() {
        assert!(matches!(load(b"not a save"), Err(SaveError::Corrupt(_))));
    }

    #[test]
    fn file_round_trip_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("savegame.sav");
        assert!(matches!(load_from_file(&path), Err(SaveError::NotFound(_))));

        let engine = arena();
        save_to_file(&engine, &path).unwrap();
        let restored = load_from_file(&path).unwrap();
        assert_eq!(restored.player_point().unwrap(), Point::new(10, 10));

        delete_save(&path).unwrap();
        assert!(!path.exists());
        delete_save(&path).unwrap();
    }
}
