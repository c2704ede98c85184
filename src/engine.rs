use bracket_geometry::prelude::{DistanceAlg, Point};
use bracket_random::prelude::RandomNumberGenerator;
use tracing::{debug, info};

use crate::{
    action::{Action, ActionOutcome, ItemId},
    ai::MonsterAi,
    config::GameConfig,
    data::{
        items::{Consumable, Item},
        monsters::PLAYER,
    },
    ecs::{EcsWorld, components::Inventory, resources::MovementContext},
    error::Result,
    log::{ColorTag, MessageLog},
    map::{
        GameMap,
        generation::{Dungeon, GenerationParams, SpawnKind, generate},
    },
};

const WELCOME: &str = "Hello and welcome, adventurer, to yet another dungeon!";

/// Owns one game session: the entity world, the current floor, the message
/// log and the look/target cursor.
pub struct Engine {
    pub(crate) ecs: EcsWorld,
    pub map: GameMap,
    pub log: MessageLog,
    pub cursor: Point,
    pub turn: u64,
    pub depth: u32,
    pub(crate) seed: u64,
    pub(crate) next_item_id: u32,
    pub(crate) fov_radius: i32,
    pub(crate) generation: GenerationParams,
}

impl Engine {
    pub fn new_game(config: &GameConfig) -> Self {
        let seed = config.seed.unwrap_or_else(GameConfig::clock_seed);
        let generation = config.generation_params();
        let dungeon = generate(&generation, &mut floor_rng(seed, 1));
        let mut engine = Self::from_dungeon(dungeon, seed, config.fov_radius, generation);
        engine.log.add(WELCOME, ColorTag::Welcome);
        info!(seed, "started a new game");
        engine
    }

    /// Builds a depth-one session on an already generated floor.
    pub fn from_dungeon(
        dungeon: Dungeon,
        seed: u64,
        fov_radius: i32,
        generation: GenerationParams,
    ) -> Self {
        let mut engine = Self {
            ecs: EcsWorld::new(dungeon.player_start, &PLAYER),
            map: GameMap::new(0, 0),
            log: MessageLog::new(),
            cursor: dungeon.player_start,
            turn: 0,
            depth: 1,
            seed,
            next_item_id: 0,
            fov_radius,
            generation,
        };
        engine.populate(dungeon);
        engine.refresh_fov(engine.cursor);
        engine
    }

    fn populate(&mut self, dungeon: Dungeon) {
        self.map = dungeon.map;
        for spawn in dungeon.spawns {
            match spawn.kind {
                SpawnKind::Monster(template) => {
                    self.ecs.spawn_monster(template, spawn.point);
                }
                SpawnKind::Item(template) => {
                    let item = Item::from_template(self.allocate_item_id(), template);
                    self.ecs.spawn_item(item, spawn.point);
                }
            }
        }
    }

    pub(crate) fn allocate_item_id(&mut self) -> ItemId {
        let id = ItemId(self.next_item_id);
        self.next_item_id += 1;
        id
    }

    pub fn player_point(&self) -> Result<Point> {
        self.ecs.player_point()
    }

    pub fn is_player_alive(&self) -> bool {
        self.ecs.is_player_alive()
    }

    pub fn inventory(&self) -> Result<Inventory> {
        self.ecs.inventory()
    }

    pub fn ecs(&self) -> &EcsWorld {
        &self.ecs
    }

    /// Names of what sits under the cursor, if the player can see that tile.
    pub fn names_at_cursor(&self) -> String {
        if !self.map.is_visible(self.cursor) {
            return String::new();
        }
        self.ecs.names_at(self.cursor).join(", ")
    }

    /// Performs `action` and, when it took the player's turn, lets every
    /// monster act and recomputes what the player sees.
    pub fn resolve_turn(&mut self, action: Action) -> Result<ActionOutcome> {
        let outcome = self.perform(action)?;
        if outcome.is_advanced() {
            self.handle_enemy_turns()?;
            self.update_fov()?;
            self.turn += 1;
            debug!(turn = self.turn, ?action, "turn resolved");
        }
        Ok(outcome)
    }

    /// Validates and applies a player action. A rejected action leaves the
    /// world exactly as it was.
    pub fn perform(&mut self, action: Action) -> Result<ActionOutcome> {
        match action {
            Action::Move { dx, dy } => self.bump(dx, dy),
            Action::Wait => Ok(ActionOutcome::Advanced),
            Action::PickUp => self.pick_up(),
            Action::Drop { item } => self.drop_item(item),
            Action::UseItem { item, target } => self.use_item(item, target),
            Action::DescendStairs => self.descend(),
        }
    }

    pub fn handle_enemy_turns(&mut self) -> Result<()> {
        let context = MovementContext::from_map(&self.map, self.player_point()?);
        let rng = RandomNumberGenerator::seeded(self.seed ^ self.turn.wrapping_mul(TURN_MIX));
        for (text, color) in self.ecs.run_monsters(context, rng) {
            self.log.add(text, color);
        }
        self.reap();
        Ok(())
    }

    pub fn update_fov(&mut self) -> Result<()> {
        let origin = self.player_point()?;
        self.refresh_fov(origin);
        Ok(())
    }

    fn refresh_fov(&mut self, origin: Point) {
        self.map.update_fov(origin, self.fov_radius);
    }

    fn reap(&mut self) {
        for (text, color) in self.ecs.reap_dead() {
            self.log.add(text, color);
        }
    }

    fn bump(&mut self, dx: i32, dy: i32) -> Result<ActionOutcome> {
        let origin = self.player_point()?;
        let dest = Point::new(origin.x + dx, origin.y + dy);
        if !self.map.in_bounds(dest) {
            return Ok(ActionOutcome::rejected("That way is blocked."));
        }

        let player = self.ecs.player_entity();
        if let Some(target) = self.ecs.blocker_at(dest).filter(|target| *target != player) {
            if let Some(report) = self.ecs.player_melee(target) {
                self.log.add(report.text, report.color);
                self.reap();
                return Ok(ActionOutcome::Advanced);
            }
            return Ok(ActionOutcome::rejected("That way is blocked."));
        }

        if !self.map.is_walkable(dest) {
            return Ok(ActionOutcome::rejected("That way is blocked."));
        }
        self.ecs.set_player_point(dest)?;
        Ok(ActionOutcome::Advanced)
    }

    fn pick_up(&mut self) -> Result<ActionOutcome> {
        let here = self.player_point()?;
        let Some(entity) = self.ecs.ground_items_at(here).into_iter().next() else {
            return Ok(ActionOutcome::rejected("There is nothing here to pick up."));
        };
        if self.inventory()?.is_full() {
            return Ok(ActionOutcome::rejected("Your inventory is full."));
        }
        let Some(item) = self.ecs.take_ground_item(entity) else {
            return Ok(ActionOutcome::rejected("There is nothing here to pick up."));
        };

        self.log
            .add(format!("You picked up the {}!", item.name), ColorTag::White);
        self.ecs.with_inventory(|inventory| inventory.items.push(item))?;
        Ok(ActionOutcome::Advanced)
    }

    fn drop_item(&mut self, id: ItemId) -> Result<ActionOutcome> {
        let here = self.player_point()?;
        let removed = self.ecs.with_inventory(|inventory| {
            inventory
                .position_of(id)
                .map(|idx| inventory.items.remove(idx))
        })?;
        let Some(item) = removed else {
            return Ok(ActionOutcome::rejected("That item is not in your inventory."));
        };

        self.log
            .add(format!("You dropped the {}.", item.name), ColorTag::White);
        self.ecs.spawn_item(item, here);
        Ok(ActionOutcome::Advanced)
    }

    fn use_item(&mut self, id: ItemId, target: Option<Point>) -> Result<ActionOutcome> {
        let inventory = self.inventory()?;
        let Some(item) = inventory.position_of(id).map(|idx| inventory.items[idx].clone()) else {
            return Ok(ActionOutcome::rejected("That item is not in your inventory."));
        };

        let outcome = match item.consumable {
            Consumable::Healing { amount } => self.drink(&item, amount)?,
            Consumable::Lightning { damage, max_range } => {
                self.lightning(damage, max_range)?
            }
            Consumable::Confusion { turns } => self.confuse(target, turns)?,
            Consumable::Fireball { damage, radius } => self.fireball(target, damage, radius),
        };

        if outcome.is_advanced() {
            self.ecs.with_inventory(|inventory| {
                if let Some(idx) = inventory.position_of(id) {
                    inventory.items.remove(idx);
                }
            })?;
            self.reap();
        }
        Ok(outcome)
    }

    fn drink(&mut self, item: &Item, amount: i32) -> Result<ActionOutcome> {
        let stats = self.ecs.player_stats()?;
        if stats.hp >= stats.max_hp {
            return Ok(ActionOutcome::rejected("Your health is already full."));
        }
        let recovered = self.ecs.with_player_stats(|stats| stats.heal(amount))?;
        self.log.add(
            format!("You consume the {}, and recover {recovered} HP!", item.name),
            ColorTag::HealthRecovered,
        );
        Ok(ActionOutcome::Advanced)
    }

    fn lightning(&mut self, damage: i32, max_range: i32) -> Result<ActionOutcome> {
        let origin = self.player_point()?;
        let mut closest = None;
        let mut closest_distance = max_range as f32 + 1.0;
        for (entity, point) in self.ecs.living_monsters() {
            if !self.map.is_visible(point) {
                continue;
            }
            let distance = DistanceAlg::Pythagoras.distance2d(origin, point);
            if distance < closest_distance {
                closest = Some(entity);
                closest_distance = distance;
            }
        }

        let Some(target) = closest else {
            return Ok(ActionOutcome::rejected("No enemy is close enough to strike."));
        };
        self.log.add(
            format!(
                "A lightning bolt strikes the {} with a loud thunder, for {damage} damage!",
                self.ecs.name_of(target)
            ),
            ColorTag::White,
        );
        self.ecs.damage(target, damage);
        Ok(ActionOutcome::Advanced)
    }

    fn confuse(&mut self, target: Option<Point>, turns: i32) -> Result<ActionOutcome> {
        let Some(target) = target else {
            return Ok(ActionOutcome::rejected("You must select a target."));
        };
        if !self.map.is_visible(target) {
            return Ok(ActionOutcome::rejected(
                "You cannot target an area that you cannot see.",
            ));
        }
        if target == self.player_point()? {
            return Ok(ActionOutcome::rejected("You cannot confuse yourself!"));
        }
        let Some(victim) = self.ecs.monster_at(target) else {
            return Ok(ActionOutcome::rejected("You must select an enemy to target."));
        };

        self.log.add(
            format!(
                "The eyes of the {} look vacant, as it starts to stumble around!",
                self.ecs.name_of(victim)
            ),
            ColorTag::StatusEffect,
        );
        self.ecs.set_ai(
            victim,
            MonsterAi::Confused {
                turns_remaining: turns,
            },
        );
        Ok(ActionOutcome::Advanced)
    }

    fn fireball(&mut self, target: Option<Point>, damage: i32, radius: i32) -> ActionOutcome {
        let Some(target) = target else {
            return ActionOutcome::rejected("You must select a target.");
        };
        if !self.map.is_visible(target) {
            return ActionOutcome::rejected("You cannot target an area that you cannot see.");
        }

        let caught: Vec<_> = self
            .ecs
            .living_actors()
            .into_iter()
            .filter(|(_, point)| {
                DistanceAlg::Pythagoras.distance2d(target, *point) <= radius as f32
            })
            .collect();
        if caught.is_empty() {
            return ActionOutcome::rejected("There are no targets in the radius.");
        }

        for (entity, _) in caught {
            self.log.add(
                format!(
                    "The {} is engulfed in a fiery explosion, taking {damage} damage!",
                    self.ecs.name_of(entity)
                ),
                ColorTag::White,
            );
            self.ecs.damage(entity, damage);
        }
        ActionOutcome::Advanced
    }

    fn descend(&mut self) -> Result<ActionOutcome> {
        let here = self.player_point()?;
        if Point::from(self.map.down_stairs) != here {
            return Ok(ActionOutcome::rejected("There are no stairs here."));
        }

        self.depth += 1;
        let dungeon = generate(&self.generation, &mut floor_rng(self.seed, self.depth));
        self.ecs.clear_floor();
        self.ecs.set_player_point(dungeon.player_start)?;
        self.cursor = dungeon.player_start;
        self.populate(dungeon);
        self.log.add("You descend the staircase.", ColorTag::Descend);
        info!(depth = self.depth, "descended");
        Ok(ActionOutcome::Advanced)
    }
}

const TURN_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

fn floor_rng(seed: u64, depth: u32) -> RandomNumberGenerator {
    RandomNumberGenerator::seeded(seed.wrapping_add(u64::from(depth).wrapping_mul(TURN_MIX)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        data::{
            items::{CONFUSION_SCROLL, FIREBALL_SCROLL, HEALTH_POTION, LIGHTNING_SCROLL, ItemTemplate},
            monsters::{ORC, TROLL},
        },
        map::{Position, TileKind},
    };

    pub(crate) fn params() -> GenerationParams {
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

    /// An 80x43 map with one open room spanning (1,1)..=(30,20), the player
    /// at (10,10), stairs at (20,10) and nothing else.
    pub(crate) fn arena() -> Engine {
        let mut map = GameMap::new(80, 43);
        for y in 1..=20 {
            for x in 1..=30 {
                map.set_tile(Point::new(x, y), TileKind::Floor);
            }
        }
        map.set_tile(Point::new(20, 10), TileKind::DownStairs);
        map.down_stairs = Position::new(20, 10);
        let dungeon = Dungeon {
            map,
            player_start: Point::new(10, 10),
            spawns: Vec::new(),
        };
        Engine::from_dungeon(dungeon, 42, 8, params())
    }

    pub(crate) fn give(engine: &mut Engine, template: &ItemTemplate) -> ItemId {
        let item = Item::from_template(engine.allocate_item_id(), template);
        let id = item.id;
        engine
            .ecs
            .with_inventory(|inventory| inventory.items.push(item))
            .unwrap();
        id
    }

    #[test]
    fn moving_into_a_wall_is_rejected_without_side_effects() {
        let mut engine = arena();
        engine.ecs.set_player_point(Point::new(1, 1)).unwrap();
        let log_len = engine.log.len();

        let outcome = engine.resolve_turn(Action::Move { dx: -1, dy: 0 }).unwrap();

        assert_eq!(outcome, ActionOutcome::rejected("That way is blocked."));
        assert_eq!(engine.turn, 0);
        assert_eq!(engine.player_point().unwrap(), Point::new(1, 1));
        assert_eq!(engine.log.len(), log_len);
    }

    #[test]
    fn moving_onto_floor_advances_the_turn() {
        let mut engine = arena();
        let outcome = engine.resolve_turn(Action::Move { dx: 1, dy: 1 }).unwrap();

        assert_eq!(outcome, ActionOutcome::Advanced);
        assert_eq!(engine.turn, 1);
        assert_eq!(engine.player_point().unwrap(), Point::new(11, 11));
        assert!(engine.map.is_visible(Point::new(11, 11)));
    }

    #[test]
    fn bumping_a_monster_attacks_it() {
        let mut engine = arena();
        let orc = engine.ecs.spawn_monster(&ORC, Point::new(11, 10));

        engine.resolve_turn(Action::Move { dx: 1, dy: 0 }).unwrap();

        assert_eq!(engine.player_point().unwrap(), Point::new(10, 10));
        assert!(
            engine
                .log
                .entries()
                .iter()
                .any(|entry| entry.text == "Player attacks Orc for 5 hit points.")
        );
        assert_eq!(engine.ecs.monster_at(Point::new(11, 10)), Some(orc));
    }

    #[test]
    fn killing_a_monster_leaves_a_corpse() {
        let mut engine = arena();
        engine.ecs.spawn_monster(&ORC, Point::new(11, 10));

        engine.resolve_turn(Action::Move { dx: 1, dy: 0 }).unwrap();
        engine.resolve_turn(Action::Move { dx: 1, dy: 0 }).unwrap();

        assert!(engine.log.entries().iter().any(|entry| entry.text == "Orc is dead!"));
        assert_eq!(engine.ecs.monster_at(Point::new(11, 10)), None);
        engine.resolve_turn(Action::Move { dx: 1, dy: 0 }).unwrap();
        assert_eq!(engine.player_point().unwrap(), Point::new(11, 10));
    }

    #[test]
    fn monsters_in_view_close_in_and_attack() {
        let mut engine = arena();
        engine.ecs.spawn_monster(&TROLL, Point::new(13, 10));
        let player = Point::new(10, 10);
        let distance =
            |engine: &Engine| crate::ai::chebyshev(engine.ecs.living_monsters()[0].1, player);
        assert_eq!(distance(&engine), 3);

        engine.resolve_turn(Action::Wait).unwrap();
        assert_eq!(distance(&engine), 2);

        engine.resolve_turn(Action::Wait).unwrap();
        engine.resolve_turn(Action::Wait).unwrap();
        let stats = engine.ecs.player_stats().unwrap();
        assert!(stats.hp < stats.max_hp);
    }

    #[test]
    fn pick_up_and_drop_round_trip() {
        let mut engine = arena();
        let potion = Item::from_template(engine.allocate_item_id(), &HEALTH_POTION);
        let id = potion.id;
        engine.ecs.spawn_item(potion, Point::new(10, 10));

        assert!(engine.resolve_turn(Action::PickUp).unwrap().is_advanced());
        assert_eq!(engine.inventory().unwrap().items.len(), 1);
        assert!(engine.ecs.ground_items_at(Point::new(10, 10)).is_empty());

        assert_eq!(
            engine.resolve_turn(Action::PickUp).unwrap(),
            ActionOutcome::rejected("There is nothing here to pick up.")
        );

        assert!(engine.resolve_turn(Action::Drop { item: id }).unwrap().is_advanced());
        assert!(engine.inventory().unwrap().items.is_empty());
        assert_eq!(engine.ecs.ground_items_at(Point::new(10, 10)).len(), 1);

        assert_eq!(
            engine.resolve_turn(Action::Drop { item: id }).unwrap(),
            ActionOutcome::rejected("That item is not in your inventory.")
        );
    }

    #[test]
    fn healing_at_full_health_is_rejected_and_keeps_the_potion() {
        let mut engine = arena();
        let id = give(&mut engine, &HEALTH_POTION);

        let outcome = engine
            .resolve_turn(Action::UseItem {
                item: id,
                target: None,
            })
            .unwrap();

        assert_eq!(outcome, ActionOutcome::rejected("Your health is already full."));
        assert_eq!(engine.inventory().unwrap().items.len(), 1);
        assert_eq!(engine.turn, 0);
    }

    #[test]
    fn healing_consumes_the_potion() {
        let mut engine = arena();
        let id = give(&mut engine, &HEALTH_POTION);
        engine.ecs.with_player_stats(|stats| stats.hp = 10).unwrap();

        let outcome = engine
            .resolve_turn(Action::UseItem {
                item: id,
                target: None,
            })
            .unwrap();

        assert!(outcome.is_advanced());
        assert_eq!(engine.ecs.player_stats().unwrap().hp, 14);
        assert!(engine.inventory().unwrap().items.is_empty());
    }

    #[test]
    fn lightning_needs_a_visible_enemy_in_range() {
        let mut engine = arena();
        let id = give(&mut engine, &LIGHTNING_SCROLL);

        assert_eq!(
            engine
                .perform(Action::UseItem {
                    item: id,
                    target: None
                })
                .unwrap(),
            ActionOutcome::rejected("No enemy is close enough to strike.")
        );

        engine.ecs.spawn_monster(&TROLL, Point::new(13, 10));
        engine.update_fov().unwrap();
        assert!(
            engine
                .perform(Action::UseItem {
                    item: id,
                    target: None
                })
                .unwrap()
                .is_advanced()
        );
        assert_eq!(engine.ecs.monster_at(Point::new(13, 10)), None);
    }

    #[test]
    fn confusion_validates_its_target() {
        let mut engine = arena();
        let id = give(&mut engine, &CONFUSION_SCROLL);
        let use_at = |target: Point| Action::UseItem {
            item: id,
            target: Some(target),
        };

        assert_eq!(
            engine.perform(use_at(Point::new(10, 10))).unwrap(),
            ActionOutcome::rejected("You cannot confuse yourself!")
        );
        assert_eq!(
            engine.perform(use_at(Point::new(12, 10))).unwrap(),
            ActionOutcome::rejected("You must select an enemy to target.")
        );
        assert_eq!(
            engine.perform(use_at(Point::new(60, 30))).unwrap(),
            ActionOutcome::rejected("You cannot target an area that you cannot see.")
        );

        let orc = engine.ecs.spawn_monster(&ORC, Point::new(12, 10));
        assert!(engine.perform(use_at(Point::new(12, 10))).unwrap().is_advanced());
        let snapshot = engine.ecs.snapshot();
        let confused = &snapshot[orc.id() as usize];
        assert_eq!(
            confused.ai.as_ref().map(|ai| ai.behavior),
            Some(MonsterAi::Confused { turns_remaining: 10 })
        );
    }

    #[test]
    fn fireball_hits_everything_in_the_radius() {
        let mut engine = arena();
        let id = give(&mut engine, &FIREBALL_SCROLL);
        engine.ecs.spawn_monster(&ORC, Point::new(15, 10));
        engine.ecs.spawn_monster(&ORC, Point::new(16, 11));

        let outcome = engine
            .perform(Action::UseItem {
                item: id,
                target: Some(Point::new(15, 10)),
            })
            .unwrap();

        assert!(outcome.is_advanced());
        assert!(engine.ecs.living_monsters().is_empty());
        assert_eq!(engine.ecs.player_stats().unwrap().hp, 30);
    }

    #[test]
    fn descending_requires_stairs_and_builds_a_new_floor() {
        let mut engine = arena();
        assert_eq!(
            engine.perform(Action::DescendStairs).unwrap(),
            ActionOutcome::rejected("There are no stairs here.")
        );

        engine.ecs.set_player_point(Point::new(20, 10)).unwrap();
        assert!(engine.resolve_turn(Action::DescendStairs).unwrap().is_advanced());
        assert_eq!(engine.depth, 2);
        let here = engine.player_point().unwrap();
        assert!(engine.map.is_walkable(here));
        assert!(engine.map.is_visible(here));
    }
}
