use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::{Algorithm2D, BaseMap, a_star_search};
use bracket_random::prelude::RandomNumberGenerator;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::ecs::resources::MovementContext;

/// Extra path cost for stepping through a tile another creature stands on.
const CROWD_COST: f32 = 10.0;

pub const DIRECTIONS: [Point; 8] = [
    Point { x: -1, y: -1 },
    Point { x: 0, y: -1 },
    Point { x: 1, y: -1 },
    Point { x: -1, y: 0 },
    Point { x: 1, y: 0 },
    Point { x: -1, y: 1 },
    Point { x: 0, y: 1 },
    Point { x: 1, y: 1 },
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonsterAi {
    Hostile,
    Confused { turns_remaining: i32 },
}

/// What a monster wants to do this turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Step by this delta, attacking whatever blocks the destination.
    Bump(Point),
    Wait,
}

pub fn chebyshev(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

/// A hostile monster only acts while the player can see it: it swings when
/// adjacent and otherwise follows the shortest path toward the player.
pub fn hostile_intent(me: Point, ctx: &MovementContext, blocked: &[bool]) -> Intent {
    if !ctx.is_visible(me) {
        return Intent::Wait;
    }
    let target = ctx.player_point;
    if chebyshev(me, target) <= 1 {
        return Intent::Bump(Point::new(target.x - me.x, target.y - me.y));
    }

    let grid = PathGrid { ctx, blocked };
    let path = a_star_search(
        grid.point2d_to_index(me),
        grid.point2d_to_index(target),
        &grid,
    );
    if !path.success || path.steps.len() < 2 {
        return Intent::Wait;
    }
    let next = grid.index_to_point2d(path.steps[1]);
    if grid.is_blocked(next) {
        return Intent::Wait;
    }
    Intent::Bump(Point::new(next.x - me.x, next.y - me.y))
}

pub fn confused_intent(rng: &mut RandomNumberGenerator) -> Intent {
    let idx = rng.range(0, DIRECTIONS.len() as i32) as usize;
    Intent::Bump(DIRECTIONS[idx])
}

struct PathGrid<'a> {
    ctx: &'a MovementContext,
    blocked: &'a [bool],
}

impl PathGrid<'_> {
    fn is_blocked(&self, point: Point) -> bool {
        self.ctx
            .index_of(point)
            .and_then(|idx| self.blocked.get(idx).copied())
            .unwrap_or(true)
    }
}

impl BaseMap for PathGrid<'_> {
    fn is_opaque(&self, idx: usize) -> bool {
        let point = self.index_to_point2d(idx);
        self.ctx.blocks_sight(point)
    }

    fn get_available_exits(&self, idx: usize) -> SmallVec<[(usize, f32); 10]> {
        let mut exits = SmallVec::new();
        let point = self.index_to_point2d(idx);
        for dir in DIRECTIONS {
            let dest = Point::new(point.x + dir.x, point.y + dir.y);
            if !self.ctx.is_walkable(dest) {
                continue;
            }
            let cost = if self.is_blocked(dest) {
                1.0 + CROWD_COST
            } else {
                1.0
            };
            exits.push((self.point2d_to_index(dest), cost));
        }
        exits
    }

    fn get_pathing_distance(&self, idx1: usize, idx2: usize) -> f32 {
        chebyshev(self.index_to_point2d(idx1), self.index_to_point2d(idx2)) as f32
    }
}

impl Algorithm2D for PathGrid<'_> {
    fn dimensions(&self) -> Point {
        Point::new(self.ctx.width, self.ctx.height)
    }

    fn in_bounds(&self, point: Point) -> bool {
        self.ctx.in_bounds(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{GameMap, TileKind};

    fn corridor_map() -> GameMap {
        let mut map = GameMap::new(12, 5);
        for x in 1..11 {
            map.set_tile(Point::new(x, 2), TileKind::Floor);
        }
        map
    }

    fn context(map: &mut GameMap, player: Point) -> MovementContext {
        map.update_fov(player, 8);
        MovementContext::from_map(map, player)
    }

    #[test]
    fn adjacent_monster_attacks() {
        let mut map = corridor_map();
        let ctx = context(&mut map, Point::new(5, 2));
        let blocked = vec![false; 60];

        assert_eq!(
            hostile_intent(Point::new(6, 2), &ctx, &blocked),
            Intent::Bump(Point::new(-1, 0))
        );
    }

    #[test]
    fn visible_monster_walks_toward_player() {
        let mut map = corridor_map();
        let ctx = context(&mut map, Point::new(2, 2));
        let blocked = vec![false; 60];

        assert_eq!(
            hostile_intent(Point::new(7, 2), &ctx, &blocked),
            Intent::Bump(Point::new(-1, 0))
        );
    }

    #[test]
    fn unseen_monster_waits() {
        let mut map = GameMap::new(30, 5);
        for x in 1..29 {
            map.set_tile(Point::new(x, 2), TileKind::Floor);
        }
        let ctx = context(&mut map, Point::new(1, 2));
        let blocked = vec![false; 150];

        assert!(!ctx.is_visible(Point::new(20, 2)));
        assert_eq!(hostile_intent(Point::new(20, 2), &ctx, &blocked), Intent::Wait);
    }

    #[test]
    fn blocked_next_step_means_waiting() {
        let mut map = corridor_map();
        let ctx = context(&mut map, Point::new(2, 2));
        let mut blocked = vec![false; 60];
        blocked[2 * 12 + 6] = true;

        assert_eq!(hostile_intent(Point::new(7, 2), &ctx, &blocked), Intent::Wait);
    }

    #[test]
    fn confused_steps_are_single_tiles() {
        let mut rng = RandomNumberGenerator::seeded(1);
        for _ in 0..20 {
            match confused_intent(&mut rng) {
                Intent::Bump(delta) => assert_eq!(chebyshev(delta, Point::new(0, 0)), 1),
                Intent::Wait => panic!("confused monsters always stumble"),
            }
        }
    }
}
