pub mod generation;

use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::{Algorithm2D, BaseMap, field_of_view};
use serde::{Deserialize, Serialize};

/// Tile coordinate that survives a save. Converts freely to and from `Point`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<Point> for Position {
    fn from(point: Point) -> Self {
        Self::new(point.x, point.y)
    }
}

impl From<Position> for Point {
    fn from(pos: Position) -> Self {
        Point::new(pos.x, pos.y)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    Wall,
    Floor,
    DownStairs,
}

impl TileKind {
    pub fn blocks_move(self) -> bool {
        matches!(self, TileKind::Wall)
    }

    pub fn blocks_sight(self) -> bool {
        matches!(self, TileKind::Wall)
    }

    pub fn glyph(self) -> char {
        match self {
            TileKind::Wall => '#',
            TileKind::Floor => '.',
            TileKind::DownStairs => '>',
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMap {
    pub width: i32,
    pub height: i32,
    tiles: Vec<TileKind>,
    visible: Vec<bool>,
    explored: Vec<bool>,
    pub down_stairs: Position,
}

impl GameMap {
    /// A map of solid wall, nothing seen yet.
    pub fn new(width: i32, height: i32) -> Self {
        let size = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            tiles: vec![TileKind::Wall; size],
            visible: vec![false; size],
            explored: vec![false; size],
            down_stairs: Position::default(),
        }
    }

    fn idx(&self, point: Point) -> Option<usize> {
        if self.in_bounds(point) {
            Some((point.y * self.width + point.x) as usize)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    /// Clamps a point into the map rectangle.
    pub fn clamp(&self, point: Point) -> Point {
        Point::new(
            point.x.clamp(0, (self.width - 1).max(0)),
            point.y.clamp(0, (self.height - 1).max(0)),
        )
    }

    pub fn tile(&self, point: Point) -> Option<TileKind> {
        self.idx(point).map(|idx| self.tiles[idx])
    }

    pub fn set_tile(&mut self, point: Point, tile: TileKind) {
        if let Some(idx) = self.idx(point) {
            self.tiles[idx] = tile;
        }
    }

    pub fn is_walkable(&self, point: Point) -> bool {
        self.tile(point).is_some_and(|tile| !tile.blocks_move())
    }

    pub fn is_visible(&self, point: Point) -> bool {
        self.idx(point).is_some_and(|idx| self.visible[idx])
    }

    pub fn is_explored(&self, point: Point) -> bool {
        self.idx(point).is_some_and(|idx| self.explored[idx])
    }

    /// Every per-tile layer holds exactly `width * height` cells.
    pub fn is_consistent(&self) -> bool {
        if self.width <= 0 || self.height <= 0 {
            return false;
        }
        let size = (self.width * self.height) as usize;
        [self.tiles.len(), self.visible.len(), self.explored.len()]
            .iter()
            .all(|len| *len == size)
    }

    /// Recomputes what is visible from `origin`. Anything visible now stays
    /// explored for good.
    pub fn update_fov(&mut self, origin: Point, radius: i32) {
        let visible: Vec<Point> = field_of_view(origin, radius, &*self)
            .into_iter()
            .filter(|point| self.in_bounds(*point))
            .collect();
        self.visible.iter_mut().for_each(|seen| *seen = false);
        for point in visible {
            if let Some(idx) = self.idx(point) {
                self.visible[idx] = true;
                self.explored[idx] = true;
            }
        }
    }
}

impl BaseMap for GameMap {
    fn is_opaque(&self, idx: usize) -> bool {
        self.tiles.get(idx).is_none_or(|tile| tile.blocks_sight())
    }
}

impl Algorithm2D for GameMap {
    fn dimensions(&self) -> Point {
        Point::new(self.width, self.height)
    }

    fn in_bounds(&self, point: Point) -> bool {
        GameMap::in_bounds(self, point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_room() -> GameMap {
        let mut map = GameMap::new(10, 10);
        for y in 1..9 {
            for x in 1..9 {
                map.set_tile(Point::new(x, y), TileKind::Floor);
            }
        }
        map
    }

    #[test]
    fn walls_block_and_floors_do_not() {
        let map = open_room();
        assert!(!map.is_walkable(Point::new(0, 0)));
        assert!(map.is_walkable(Point::new(4, 4)));
        assert!(!map.is_walkable(Point::new(-1, 4)));
        assert!(!map.is_walkable(Point::new(4, 10)));
    }

    #[test]
    fn layers_must_match_the_dimensions() {
        let mut map = open_room();
        assert!(map.is_consistent());

        map.visible.truncate(1);
        assert!(!map.is_consistent());
        assert!(!GameMap::new(0, 5).is_consistent());
    }

    #[test]
    fn clamp_keeps_points_inside() {
        let map = GameMap::new(80, 43);
        assert_eq!(map.clamp(Point::new(-5, 100)), Point::new(0, 42));
        assert_eq!(map.clamp(Point::new(79, 0)), Point::new(79, 0));
    }

    #[test]
    fn explored_tiles_outlive_visibility() {
        let mut map = open_room();
        map.update_fov(Point::new(2, 2), 3);
        assert!(map.is_visible(Point::new(2, 2)));
        assert!(map.is_explored(Point::new(4, 2)));
        assert!(!map.is_visible(Point::new(8, 8)));

        map.update_fov(Point::new(8, 8), 1);
        assert!(!map.is_visible(Point::new(2, 2)));
        assert!(map.is_explored(Point::new(2, 2)));
        assert!(map.is_visible(Point::new(8, 8)));
    }
}
