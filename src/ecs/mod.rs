pub mod components;
pub mod resources;
pub mod systems;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use serde::{Deserialize, Serialize};
use specs::prelude::{
    Builder, Dispatcher, DispatcherBuilder, Entity, Join, World as SpecsWorld, WorldExt,
};

use crate::{
    ai::MonsterAi,
    data::{items::Item, monsters::MonsterTemplate},
    error::{EngineError, Result},
    log::ColorTag,
    map::Position,
};

use self::{
    components::{
        Ai, BlocksTile, CombatStats, GroundItem, Inventory, Name, PlayerTag, RenderOrder,
        Renderable,
    },
    resources::{CombatLog, MovementContext},
    systems::{AttackReport, MonsterTurnSystem, melee},
};

const CORPSE_COLOR: (u8, u8, u8) = (191, 0, 0);

/// Every component an entity can carry, flattened for saving.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub player: bool,
    pub position: Option<Position>,
    pub renderable: Option<Renderable>,
    pub name: Option<Name>,
    pub stats: Option<CombatStats>,
    pub ai: Option<Ai>,
    pub blocks_tile: bool,
    pub ground_item: Option<GroundItem>,
    pub inventory: Option<Inventory>,
}

pub struct EcsWorld {
    specs_world: SpecsWorld,
    dispatcher: Dispatcher<'static, 'static>,
    player: Entity,
}

impl EcsWorld {
    pub fn new(spawn: Point, template: &MonsterTemplate) -> Self {
        let mut specs_world = Self::fresh_world();
        let player = specs_world
            .create_entity()
            .with(Position::from(spawn))
            .with(Renderable {
                glyph: template.glyph,
                color: template.color,
                order: RenderOrder::Actor,
            })
            .with(Name {
                name: template.name.to_string(),
            })
            .with(CombatStats::new(template.hp, template.power, template.defense))
            .with(BlocksTile)
            .with(Inventory::default())
            .with(PlayerTag)
            .build();

        Self::assemble(specs_world, player)
    }

    fn fresh_world() -> SpecsWorld {
        let mut specs_world = SpecsWorld::new();
        Self::register_components(&mut specs_world);
        specs_world.insert(CombatLog::default());
        specs_world
    }

    fn assemble(specs_world: SpecsWorld, player: Entity) -> Self {
        let dispatcher = DispatcherBuilder::new()
            .with(MonsterTurnSystem, "monster_turns", &[])
            .build();

        Self {
            specs_world,
            dispatcher,
            player,
        }
    }

    fn register_components(world: &mut SpecsWorld) {
        world.register::<Position>();
        world.register::<Renderable>();
        world.register::<Name>();
        world.register::<CombatStats>();
        world.register::<BlocksTile>();
        world.register::<Ai>();
        world.register::<GroundItem>();
        world.register::<Inventory>();
        world.register::<PlayerTag>();
    }

    pub fn spawn_monster(&mut self, template: &MonsterTemplate, point: Point) -> Entity {
        self.specs_world
            .create_entity()
            .with(Position::from(point))
            .with(Renderable {
                glyph: template.glyph,
                color: template.color,
                order: RenderOrder::Actor,
            })
            .with(Name {
                name: template.name.to_string(),
            })
            .with(CombatStats::new(template.hp, template.power, template.defense))
            .with(BlocksTile)
            .with(Ai {
                behavior: MonsterAi::Hostile,
            })
            .build()
    }

    pub fn spawn_item(&mut self, item: Item, point: Point) -> Entity {
        self.specs_world
            .create_entity()
            .with(Position::from(point))
            .with(Renderable {
                glyph: item.glyph,
                color: item.color,
                order: RenderOrder::Item,
            })
            .with(Name {
                name: item.name.clone(),
            })
            .with(GroundItem { item })
            .build()
    }

    pub fn player_entity(&self) -> Entity {
        self.player
    }

    pub fn player_point(&self) -> Result<Point> {
        let positions = self.specs_world.read_component::<Position>();
        positions
            .get(self.player)
            .map(|pos| Point::from(*pos))
            .ok_or(EngineError::PlayerMissing)
    }

    pub fn set_player_point(&mut self, point: Point) -> Result<()> {
        let mut positions = self.specs_world.write_component::<Position>();
        let pos = positions
            .get_mut(self.player)
            .ok_or(EngineError::PlayerMissing)?;
        *pos = Position::from(point);
        Ok(())
    }

    pub fn player_stats(&self) -> Result<CombatStats> {
        let stats = self.specs_world.read_component::<CombatStats>();
        stats.get(self.player).cloned().ok_or(self.missing("CombatStats"))
    }

    pub fn is_player_alive(&self) -> bool {
        self.player_stats().is_ok_and(|stats| stats.is_alive())
    }

    pub fn with_player_stats<R>(&mut self, f: impl FnOnce(&mut CombatStats) -> R) -> Result<R> {
        let missing = self.missing("CombatStats");
        let mut stats = self.specs_world.write_component::<CombatStats>();
        stats.get_mut(self.player).map(f).ok_or(missing)
    }

    pub fn inventory(&self) -> Result<Inventory> {
        let inventories = self.specs_world.read_component::<Inventory>();
        inventories
            .get(self.player)
            .cloned()
            .ok_or(self.missing("Inventory"))
    }

    pub fn with_inventory<R>(&mut self, f: impl FnOnce(&mut Inventory) -> R) -> Result<R> {
        let missing = self.missing("Inventory");
        let mut inventories = self.specs_world.write_component::<Inventory>();
        inventories.get_mut(self.player).map(f).ok_or(missing)
    }

    fn missing(&self, component: &'static str) -> EngineError {
        EngineError::MissingComponent {
            component,
            entity: self.player.id(),
        }
    }

    /// The living blocking entity on `point`, player included.
    pub fn blocker_at(&self, point: Point) -> Option<Entity> {
        let entities = self.specs_world.entities();
        let positions = self.specs_world.read_component::<Position>();
        let blockers = self.specs_world.read_component::<BlocksTile>();
        let stats = self.specs_world.read_component::<CombatStats>();
        (&entities, &positions, &blockers)
            .join()
            .find(|(entity, pos, _)| {
                Point::from(**pos) == point && stats.get(*entity).is_none_or(CombatStats::is_alive)
            })
            .map(|(entity, _, _)| entity)
    }

    /// A living monster (an entity with a brain) on `point`.
    pub fn monster_at(&self, point: Point) -> Option<Entity> {
        self.living_monsters()
            .into_iter()
            .find(|(_, pos)| *pos == point)
            .map(|(entity, _)| entity)
    }

    pub fn living_monsters(&self) -> Vec<(Entity, Point)> {
        let entities = self.specs_world.entities();
        let positions = self.specs_world.read_component::<Position>();
        let ais = self.specs_world.read_component::<Ai>();
        let stats = self.specs_world.read_component::<CombatStats>();
        (&entities, &positions, &ais, &stats)
            .join()
            .filter(|(_, _, _, stat)| stat.is_alive())
            .map(|(entity, pos, _, _)| (entity, Point::from(*pos)))
            .collect()
    }

    /// Every living entity with combat stats, player included.
    pub fn living_actors(&self) -> Vec<(Entity, Point)> {
        let entities = self.specs_world.entities();
        let positions = self.specs_world.read_component::<Position>();
        let stats = self.specs_world.read_component::<CombatStats>();
        (&entities, &positions, &stats)
            .join()
            .filter(|(_, _, stat)| stat.is_alive())
            .map(|(entity, pos, _)| (entity, Point::from(*pos)))
            .collect()
    }

    /// Items lying on `point`, lowest item id first.
    pub fn ground_items_at(&self, point: Point) -> Vec<Entity> {
        let entities = self.specs_world.entities();
        let positions = self.specs_world.read_component::<Position>();
        let items = self.specs_world.read_component::<GroundItem>();
        let mut found: Vec<(u32, Entity)> = (&entities, &positions, &items)
            .join()
            .filter(|(_, pos, _)| Point::from(**pos) == point)
            .map(|(entity, _, ground)| (ground.item.id.0, entity))
            .collect();
        found.sort_by_key(|(id, _)| *id);
        found.into_iter().map(|(_, entity)| entity).collect()
    }

    /// Lifts an item off the floor, deleting its entity.
    pub fn take_ground_item(&mut self, entity: Entity) -> Option<Item> {
        let item = {
            let mut items = self.specs_world.write_component::<GroundItem>();
            items.remove(entity)?.item
        };
        let _ = self.specs_world.entities().delete(entity);
        self.specs_world.maintain();
        Some(item)
    }

    pub fn name_of(&self, entity: Entity) -> String {
        let names = self.specs_world.read_component::<Name>();
        systems::name_of(&names, entity)
    }

    /// Names of everything drawn on `point`, top layer first.
    pub fn names_at(&self, point: Point) -> Vec<String> {
        let positions = self.specs_world.read_component::<Position>();
        let names = self.specs_world.read_component::<Name>();
        let renderables = self.specs_world.read_component::<Renderable>();
        let mut found: Vec<(RenderOrder, String)> = (&positions, &names, &renderables)
            .join()
            .filter(|(pos, _, _)| Point::from(**pos) == point)
            .map(|(_, name, render)| (render.order, name.name.clone()))
            .collect();
        found.sort_by(|a, b| b.0.cmp(&a.0));
        found.into_iter().map(|(_, name)| name).collect()
    }

    pub fn player_melee(&mut self, target: Entity) -> Option<AttackReport> {
        let mut stats = self.specs_world.write_component::<CombatStats>();
        let names = self.specs_world.read_component::<Name>();
        melee(self.player, target, self.player, &mut stats, &names)
    }

    /// Applies raw damage, ignoring defense. Returns true if it was lethal.
    pub fn damage(&mut self, entity: Entity, amount: i32) -> bool {
        let mut stats = self.specs_world.write_component::<CombatStats>();
        match stats.get_mut(entity) {
            Some(stat) => {
                stat.take_damage(amount);
                !stat.is_alive()
            }
            None => false,
        }
    }

    pub fn set_ai(&mut self, entity: Entity, behavior: MonsterAi) {
        let mut ais = self.specs_world.write_component::<Ai>();
        if let Some(ai) = ais.get_mut(entity) {
            ai.behavior = behavior;
        }
    }

    /// Runs every monster's turn against `context` and returns what they
    /// reported, in order.
    pub fn run_monsters(
        &mut self,
        context: MovementContext,
        rng: RandomNumberGenerator,
    ) -> Vec<(String, ColorTag)> {
        self.specs_world.insert(context);
        self.specs_world.insert(rng);
        self.dispatcher.dispatch(&mut self.specs_world);
        self.specs_world.maintain();
        let mut log = self.specs_world.write_resource::<CombatLog>();
        std::mem::take(&mut log.entries)
    }

    /// Turns every entity that dropped to zero hit points into a corpse.
    pub fn reap_dead(&mut self) -> Vec<(String, ColorTag)> {
        let mut messages = Vec::new();
        let entities = self.specs_world.entities();
        let stats = self.specs_world.read_component::<CombatStats>();
        let mut blockers = self.specs_world.write_component::<BlocksTile>();
        let mut ais = self.specs_world.write_component::<Ai>();
        let mut renderables = self.specs_world.write_component::<Renderable>();
        let mut names = self.specs_world.write_component::<Name>();

        let dead: Vec<Entity> = (&entities, &stats, &blockers)
            .join()
            .filter(|(_, stat, _)| !stat.is_alive())
            .map(|(entity, _, _)| entity)
            .collect();

        for entity in dead {
            blockers.remove(entity);
            ais.remove(entity);
            if let Some(render) = renderables.get_mut(entity) {
                render.glyph = '%';
                render.color = CORPSE_COLOR;
                render.order = RenderOrder::Corpse;
            }
            if entity == self.player {
                messages.push(("You died!".to_string(), ColorTag::PlayerDie));
                continue;
            }
            if let Some(name) = names.get_mut(entity) {
                messages.push((format!("{} is dead!", name.name), ColorTag::EnemyDie));
                name.name = format!("remains of {}", name.name);
            }
        }

        messages
    }

    /// Removes everything but the player, ready for a new floor.
    pub fn clear_floor(&mut self) {
        {
            let entities = self.specs_world.entities();
            for entity in (&entities).join() {
                if entity != self.player {
                    let _ = entities.delete(entity);
                }
            }
        }
        self.specs_world.maintain();
    }

    /// Visits drawable entities bottom layer first.
    pub fn each_renderable<F>(&self, mut f: F)
    where
        F: FnMut(Point, &Renderable),
    {
        let positions = self.specs_world.read_component::<Position>();
        let renderables = self.specs_world.read_component::<Renderable>();
        let mut drawn: Vec<(Point, &Renderable)> = (&positions, &renderables)
            .join()
            .map(|(pos, render)| (Point::from(*pos), render))
            .collect();
        drawn.sort_by_key(|(_, render)| render.order);
        for (point, render) in drawn {
            f(point, render);
        }
    }

    pub fn snapshot(&self) -> Vec<EntitySnapshot> {
        let entities = self.specs_world.entities();
        let positions = self.specs_world.read_component::<Position>();
        let renderables = self.specs_world.read_component::<Renderable>();
        let names = self.specs_world.read_component::<Name>();
        let stats = self.specs_world.read_component::<CombatStats>();
        let ais = self.specs_world.read_component::<Ai>();
        let blockers = self.specs_world.read_component::<BlocksTile>();
        let items = self.specs_world.read_component::<GroundItem>();
        let inventories = self.specs_world.read_component::<Inventory>();

        (&entities)
            .join()
            .map(|entity| EntitySnapshot {
                player: entity == self.player,
                position: positions.get(entity).copied(),
                renderable: renderables.get(entity).cloned(),
                name: names.get(entity).cloned(),
                stats: stats.get(entity).cloned(),
                ai: ais.get(entity).cloned(),
                blocks_tile: blockers.contains(entity),
                ground_item: items.get(entity).cloned(),
                inventory: inventories.get(entity).cloned(),
            })
            .collect()
    }

    /// Rebuilds a world from `snapshot`, creating entities in the same order
    /// so monsters keep their turn order.
    pub fn from_snapshot(snapshot: Vec<EntitySnapshot>) -> Result<Self> {
        let mut specs_world = Self::fresh_world();
        let mut player = None;

        for saved in snapshot {
            let mut builder = specs_world.create_entity();
            if let Some(position) = saved.position {
                builder = builder.with(position);
            }
            if let Some(renderable) = saved.renderable {
                builder = builder.with(renderable);
            }
            if let Some(name) = saved.name {
                builder = builder.with(name);
            }
            if let Some(stats) = saved.stats {
                builder = builder.with(stats);
            }
            if let Some(ai) = saved.ai {
                builder = builder.with(ai);
            }
            if saved.blocks_tile {
                builder = builder.with(BlocksTile);
            }
            if let Some(item) = saved.ground_item {
                builder = builder.with(item);
            }
            if let Some(inventory) = saved.inventory {
                builder = builder.with(inventory);
            }
            if saved.player {
                builder = builder.with(PlayerTag);
            }
            let entity = builder.build();
            if saved.player {
                player = Some(entity);
            }
        }

        let player = player.ok_or(EngineError::PlayerMissing)?;
        Ok(Self::assemble(specs_world, player))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        items::{HEALTH_POTION, Item},
        monsters::{ORC, PLAYER},
    };
    use crate::action::ItemId;

    #[test]
    fn corpses_stop_blocking() {
        let mut ecs = EcsWorld::new(Point::new(1, 1), &PLAYER);
        let orc = ecs.spawn_monster(&ORC, Point::new(2, 1));
        assert_eq!(ecs.blocker_at(Point::new(2, 1)), Some(orc));

        assert!(ecs.damage(orc, 100));
        let messages = ecs.reap_dead();

        assert_eq!(messages, vec![("Orc is dead!".to_string(), ColorTag::EnemyDie)]);
        assert_eq!(ecs.blocker_at(Point::new(2, 1)), None);
        assert_eq!(ecs.monster_at(Point::new(2, 1)), None);
        assert_eq!(ecs.names_at(Point::new(2, 1)), vec!["remains of Orc".to_string()]);
        assert!(ecs.reap_dead().is_empty());
    }

    #[test]
    fn snapshot_rebuild_keeps_order_and_player() {
        let mut ecs = EcsWorld::new(Point::new(1, 1), &PLAYER);
        ecs.spawn_monster(&ORC, Point::new(3, 3));
        ecs.spawn_item(Item::from_template(ItemId(1), &HEALTH_POTION), Point::new(4, 4));
        ecs.spawn_monster(&ORC, Point::new(5, 5));

        let snapshot = ecs.snapshot();
        let rebuilt = EcsWorld::from_snapshot(snapshot.clone()).unwrap();

        assert_eq!(rebuilt.snapshot(), snapshot);
        assert_eq!(rebuilt.player_point().unwrap(), Point::new(1, 1));
        assert_eq!(
            rebuilt
                .living_monsters()
                .into_iter()
                .map(|(_, point)| point)
                .collect::<Vec<_>>(),
            vec![Point::new(3, 3), Point::new(5, 5)]
        );
    }

    #[test]
    fn stacked_items_come_out_by_id() {
        let mut ecs = EcsWorld::new(Point::new(1, 1), &PLAYER);
        let spot = Point::new(4, 4);
        ecs.spawn_item(Item::from_template(ItemId(5), &HEALTH_POTION), spot);
        let older = ecs.spawn_item(Item::from_template(ItemId(2), &HEALTH_POTION), spot);

        let stack = ecs.ground_items_at(spot);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack[0], older);

        let rebuilt = EcsWorld::from_snapshot(ecs.snapshot()).unwrap();
        let first = rebuilt.ground_items_at(spot)[0];
        let items = rebuilt.specs_world.read_component::<GroundItem>();
        assert_eq!(items.get(first).map(|ground| ground.item.id), Some(ItemId(2)));
    }

    #[test]
    fn snapshot_without_player_is_rejected() {
        assert!(matches!(
            EcsWorld::from_snapshot(Vec::new()),
            Err(EngineError::PlayerMissing)
        ));
    }

    #[test]
    fn clear_floor_keeps_only_the_player() {
        let mut ecs = EcsWorld::new(Point::new(1, 1), &PLAYER);
        ecs.spawn_monster(&ORC, Point::new(3, 3));
        ecs.clear_floor();

        assert_eq!(ecs.snapshot().len(), 1);
        assert!(ecs.snapshot()[0].player);
    }
}
