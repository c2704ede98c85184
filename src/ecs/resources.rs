use bracket_geometry::prelude::Point;

use crate::{log::ColorTag, map::GameMap};

/// Read-only view of the current floor handed to the monster systems.
#[derive(Clone)]
pub struct MovementContext {
    pub player_point: Point,
    pub width: i32,
    pub height: i32,
    walkable: Vec<bool>,
    blocks_sight: Vec<bool>,
    visible: Vec<bool>,
}

impl MovementContext {
    pub fn from_map(map: &GameMap, player_point: Point) -> Self {
        let mut walkable = Vec::with_capacity((map.width * map.height) as usize);
        let mut blocks_sight = Vec::with_capacity(walkable.capacity());
        let mut visible = Vec::with_capacity(walkable.capacity());
        for y in 0..map.height {
            for x in 0..map.width {
                let point = Point::new(x, y);
                walkable.push(map.is_walkable(point));
                blocks_sight.push(map.tile(point).is_none_or(|tile| tile.blocks_sight()));
                visible.push(map.is_visible(point));
            }
        }

        Self {
            player_point,
            width: map.width,
            height: map.height,
            walkable,
            blocks_sight,
            visible,
        }
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    pub fn index_of(&self, point: Point) -> Option<usize> {
        if self.in_bounds(point) {
            Some((point.y * self.width + point.x) as usize)
        } else {
            None
        }
    }

    pub fn is_walkable(&self, point: Point) -> bool {
        self.index_of(point)
            .and_then(|idx| self.walkable.get(idx).copied())
            .unwrap_or(false)
    }

    pub fn blocks_sight(&self, point: Point) -> bool {
        self.index_of(point)
            .and_then(|idx| self.blocks_sight.get(idx).copied())
            .unwrap_or(true)
    }

    pub fn is_visible(&self, point: Point) -> bool {
        self.index_of(point)
            .and_then(|idx| self.visible.get(idx).copied())
            .unwrap_or(false)
    }
}

/// Messages produced inside systems, drained into the message log after
/// each dispatch.
#[derive(Default)]
pub struct CombatLog {
    pub entries: Vec<(String, ColorTag)>,
}

impl CombatLog {
    pub fn push<S: Into<String>>(&mut self, entry: S, color: ColorTag) {
        self.entries.push((entry.into(), color));
    }
}
