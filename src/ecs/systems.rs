use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use specs::prelude::*;

use super::{
    components::{Ai, BlocksTile, CombatStats, Name, PlayerTag},
    resources::{CombatLog, MovementContext},
};
use crate::{
    ai::{Intent, MonsterAi, confused_intent, hostile_intent},
    log::ColorTag,
    map::Position,
};

pub struct AttackReport {
    pub text: String,
    pub color: ColorTag,
}

pub fn name_of(names: &ReadStorage<Name>, entity: Entity) -> String {
    names
        .get(entity)
        .map(|name| name.name.clone())
        .unwrap_or_else(|| "something".to_string())
}

/// One melee swing. Returns `None` when either side has no combat stats.
pub fn melee(
    attacker: Entity,
    target: Entity,
    player: Entity,
    stats: &mut WriteStorage<CombatStats>,
    names: &ReadStorage<Name>,
) -> Option<AttackReport> {
    let power = stats.get(attacker)?.power;
    let target_stats = stats.get_mut(target)?;
    let damage = power - target_stats.defense;

    let description = format!(
        "{} attacks {}",
        name_of(names, attacker),
        name_of(names, target)
    );
    let color = if attacker == player {
        ColorTag::PlayerAttack
    } else {
        ColorTag::EnemyAttack
    };

    let text = if damage > 0 {
        target_stats.take_damage(damage);
        format!("{description} for {damage} hit points.")
    } else {
        format!("{description} but does no damage.")
    };

    Some(AttackReport { text, color })
}

/// Runs every living monster's turn, one after another in entity order.
/// Later monsters see the positions earlier ones moved to.
#[derive(Default)]
pub struct MonsterTurnSystem;

impl<'a> System<'a> for MonsterTurnSystem {
    type SystemData = (
        Entities<'a>,
        WriteStorage<'a, Position>,
        WriteStorage<'a, Ai>,
        WriteStorage<'a, CombatStats>,
        ReadStorage<'a, BlocksTile>,
        ReadStorage<'a, Name>,
        ReadStorage<'a, PlayerTag>,
        ReadExpect<'a, MovementContext>,
        WriteExpect<'a, RandomNumberGenerator>,
        WriteExpect<'a, CombatLog>,
    );

    fn run(
        &mut self,
        (
            entities,
            mut positions,
            mut ais,
            mut stats,
            blockers,
            names,
            players,
            movement,
            mut rng,
            mut combat_log,
        ): Self::SystemData,
    ) {
        let Some(player) = (&entities, &players).join().map(|(entity, _)| entity).next() else {
            return;
        };
        let actors: Vec<Entity> = (&entities, &ais).join().map(|(entity, _)| entity).collect();

        for entity in actors {
            if !stats.get(player).is_some_and(CombatStats::is_alive) {
                break;
            }
            if !stats.get(entity).is_some_and(CombatStats::is_alive) {
                continue;
            }
            let (Some(pos), Some(ai)) = (positions.get(entity).copied(), ais.get_mut(entity)) else {
                continue;
            };
            let me = Point::from(pos);

            let intent = match ai.behavior {
                MonsterAi::Hostile => {
                    let blocked = blocked_tiles(
                        &movement,
                        &entities,
                        &positions,
                        &blockers,
                        &stats,
                        &[entity, player],
                    );
                    hostile_intent(me, &movement, &blocked)
                }
                MonsterAi::Confused { turns_remaining } if turns_remaining <= 0 => {
                    ai.behavior = MonsterAi::Hostile;
                    combat_log.push(
                        format!("The {} is no longer confused.", name_of(&names, entity)),
                        ColorTag::White,
                    );
                    Intent::Wait
                }
                MonsterAi::Confused { turns_remaining } => {
                    ai.behavior = MonsterAi::Confused {
                        turns_remaining: turns_remaining - 1,
                    };
                    confused_intent(&mut rng)
                }
            };

            let Intent::Bump(delta) = intent else {
                continue;
            };
            let target = Point::new(me.x + delta.x, me.y + delta.y);
            let victim = blocker_at(target, &entities, &positions, &blockers, &stats)
                .filter(|victim| *victim != entity);

            if let Some(victim) = victim {
                if let Some(report) = melee(entity, victim, player, &mut stats, &names) {
                    combat_log.push(report.text, report.color);
                }
            } else if movement.is_walkable(target) {
                if let Some(pos) = positions.get_mut(entity) {
                    *pos = Position::from(target);
                }
            }
        }
    }
}

/// A living (or stat-less) blocking entity standing on `point`.
fn blocker_at(
    point: Point,
    entities: &Entities,
    positions: &WriteStorage<Position>,
    blockers: &ReadStorage<BlocksTile>,
    stats: &WriteStorage<CombatStats>,
) -> Option<Entity> {
    (entities, positions, blockers)
        .join()
        .find(|(entity, pos, _)| {
            Point::from(**pos) == point && stats.get(*entity).is_none_or(CombatStats::is_alive)
        })
        .map(|(entity, _, _)| entity)
}

fn blocked_tiles(
    movement: &MovementContext,
    entities: &Entities,
    positions: &WriteStorage<Position>,
    blockers: &ReadStorage<BlocksTile>,
    stats: &WriteStorage<CombatStats>,
    ignore: &[Entity],
) -> Vec<bool> {
    let mut blocked = vec![false; (movement.width * movement.height).max(0) as usize];
    for (entity, pos, _) in (entities, positions, blockers).join() {
        if ignore.contains(&entity) || !stats.get(entity).is_none_or(CombatStats::is_alive) {
            continue;
        }
        if let Some(idx) = movement.index_of(Point::from(*pos)) {
            blocked[idx] = true;
        }
    }
    blocked
}
