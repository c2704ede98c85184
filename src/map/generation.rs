use bracket_geometry::prelude::{Point, Rect};
use bracket_random::prelude::RandomNumberGenerator;
use serde::{Deserialize, Serialize};

use super::{GameMap, Position, TileKind};
use crate::data::{
    ITEM_SPAWNS, MONSTER_SPAWNS, items::ItemTemplate, monsters::MonsterTemplate,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub map_width: i32,
    pub map_height: i32,
    pub max_rooms: usize,
    pub room_min_size: i32,
    pub room_max_size: i32,
    pub max_monsters_per_room: i32,
    pub max_items_per_room: i32,
}

#[derive(Copy, Clone, Debug)]
pub enum SpawnKind {
    Monster(&'static MonsterTemplate),
    Item(&'static ItemTemplate),
}

#[derive(Copy, Clone, Debug)]
pub struct Spawn {
    pub point: Point,
    pub kind: SpawnKind,
}

/// A freshly carved floor: the map, where the player starts, and what to
/// populate it with, in placement order.
#[derive(Clone, Debug)]
pub struct Dungeon {
    pub map: GameMap,
    pub player_start: Point,
    pub spawns: Vec<Spawn>,
}

fn corridor_path(start: Point, end: Point, horizontal_first: bool) -> Vec<Point> {
    let mut path = Vec::new();
    let mut cursor = start;
    path.push(cursor);

    let step_x = |cursor: &mut Point, path: &mut Vec<Point>| {
        while cursor.x != end.x {
            cursor.x += if end.x > cursor.x { 1 } else { -1 };
            path.push(*cursor);
        }
    };
    let step_y = |cursor: &mut Point, path: &mut Vec<Point>| {
        while cursor.y != end.y {
            cursor.y += if end.y > cursor.y { 1 } else { -1 };
            path.push(*cursor);
        }
    };

    if horizontal_first {
        step_x(&mut cursor, &mut path);
        step_y(&mut cursor, &mut path);
    } else {
        step_y(&mut cursor, &mut path);
        step_x(&mut cursor, &mut path);
    }

    path
}

fn carve_room(map: &mut GameMap, room: &Rect) {
    for y in room.y1 + 1..room.y2 {
        for x in room.x1 + 1..room.x2 {
            map.set_tile(Point::new(x, y), TileKind::Floor);
        }
    }
}

fn random_inner_point(room: &Rect, rng: &mut RandomNumberGenerator) -> Point {
    Point::new(
        rng.range(room.x1 + 1, room.x2),
        rng.range(room.y1 + 1, room.y2),
    )
}

fn is_occupied(point: Point, spawns: &[Spawn]) -> bool {
    spawns.iter().any(|spawn| spawn.point == point)
}

fn place_entities(
    room: &Rect,
    params: &GenerationParams,
    player_start: Point,
    spawns: &mut Vec<Spawn>,
    rng: &mut RandomNumberGenerator,
) {
    let monsters = rng.range(0, params.max_monsters_per_room + 1);
    let items = rng.range(0, params.max_items_per_room + 1);

    for _ in 0..monsters {
        let point = random_inner_point(room, rng);
        if point == player_start || is_occupied(point, spawns) {
            continue;
        }
        let template = MONSTER_SPAWNS.pick(rng.range(0, 100) as u32);
        spawns.push(Spawn {
            point,
            kind: SpawnKind::Monster(template),
        });
    }

    for _ in 0..items {
        let point = random_inner_point(room, rng);
        if point == player_start || is_occupied(point, spawns) {
            continue;
        }
        let template = ITEM_SPAWNS.pick(rng.range(0, 100) as u32);
        spawns.push(Spawn {
            point,
            kind: SpawnKind::Item(template),
        });
    }
}

/// Carves rooms joined by L-shaped corridors, puts the down stairs in the
/// last room, and scatters monsters and items through every room.
pub fn generate(params: &GenerationParams, rng: &mut RandomNumberGenerator) -> Dungeon {
    let width = params.map_width;
    let height = params.map_height;
    let mut map = GameMap::new(width, height);
    let mut rooms: Vec<Rect> = Vec::new();
    let mut spawns = Vec::new();
    let mut player_start = Point::new(width / 2, height / 2);

    for _ in 0..params.max_rooms {
        let room_w = rng.range(params.room_min_size, params.room_max_size + 1);
        let room_h = rng.range(params.room_min_size, params.room_max_size + 1);
        if room_w < 3 || room_h < 3 || room_w >= width || room_h >= height {
            continue;
        }

        let room_x = rng.range(0, width - room_w);
        let room_y = rng.range(0, height - room_h);
        let candidate = Rect::with_size(room_x, room_y, room_w, room_h);

        if rooms.iter().any(|room| room.intersect(&candidate)) {
            continue;
        }

        carve_room(&mut map, &candidate);

        let center = candidate.center();
        match rooms.last().map(|room| room.center()) {
            None => player_start = center,
            Some(prev_center) => {
                let horizontal_first = rng.range(0, 2) == 0;
                for point in corridor_path(prev_center, center, horizontal_first) {
                    if map.tile(point) == Some(TileKind::Wall) {
                        map.set_tile(point, TileKind::Floor);
                    }
                }
            }
        }

        place_entities(&candidate, params, player_start, &mut spawns, rng);
        rooms.push(candidate);
    }

    if rooms.is_empty() {
        let fallback = Rect::with_size(0, 0, (width - 1).max(2), (height - 1).max(2));
        carve_room(&mut map, &fallback);
        player_start = fallback.center();
        rooms.push(fallback);
    }

    let stairs = rooms.last().map(|room| room.center()).unwrap_or(player_start);
    map.set_tile(stairs, TileKind::DownStairs);
    map.down_stairs = Position::from(stairs);

    Dungeon {
        map,
        player_start,
        spawns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> GenerationParams {
        GenerationParams {
            map_width: 80,
            map_height: 43,
            max_rooms: 30,
            room_min_size: 6,
            room_max_size: 10,
            max_monsters_per_room: 2,
            max_items_per_room: 2,
        }
    }

    #[test]
    fn player_starts_on_floor_and_stairs_exist() {
        let mut rng = RandomNumberGenerator::seeded(7);
        let dungeon = generate(&params(), &mut rng);

        assert!(dungeon.map.is_walkable(dungeon.player_start));
        let stairs = Point::from(dungeon.map.down_stairs);
        assert_eq!(dungeon.map.tile(stairs), Some(TileKind::DownStairs));
    }

    #[test]
    fn spawns_land_on_distinct_walkable_tiles() {
        let mut rng = RandomNumberGenerator::seeded(11);
        let dungeon = generate(&params(), &mut rng);

        for (idx, spawn) in dungeon.spawns.iter().enumerate() {
            assert!(dungeon.map.is_walkable(spawn.point));
            assert_ne!(spawn.point, dungeon.player_start);
            assert!(
                dungeon.spawns[idx + 1..]
                    .iter()
                    .all(|other| other.point != spawn.point)
            );
        }
    }

    #[test]
    fn same_seed_same_dungeon() {
        let a = generate(&params(), &mut RandomNumberGenerator::seeded(3));
        let b = generate(&params(), &mut RandomNumberGenerator::seeded(3));
        assert_eq!(a.map, b.map);
        assert_eq!(a.player_start, b.player_start);
        assert_eq!(a.spawns.len(), b.spawns.len());
    }

    #[test]
    fn corridor_reaches_its_end() {
        let path = corridor_path(Point::new(1, 1), Point::new(4, 3), false);
        assert_eq!(path.first(), Some(&Point::new(1, 1)));
        assert_eq!(path.last(), Some(&Point::new(4, 3)));
        assert_eq!(path[1], Point::new(1, 2));
    }
}
