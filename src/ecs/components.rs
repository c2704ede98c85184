use serde::{Deserialize, Serialize};
use specs::prelude::{Component, NullStorage, VecStorage};

use crate::{
    action::ItemId,
    ai::MonsterAi,
    data::{Tint, items::Item},
    map::Position,
};

impl Component for Position {
    type Storage = VecStorage<Self>;
}

/// Draw layer; higher orders are drawn on top.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RenderOrder {
    Corpse,
    Item,
    Actor,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Renderable {
    pub glyph: char,
    pub color: Tint,
    pub order: RenderOrder,
}

impl Component for Renderable {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    pub name: String,
}

impl Component for Name {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    pub max_hp: i32,
    pub hp: i32,
    pub power: i32,
    pub defense: i32,
}

impl CombatStats {
    pub fn new(hp: i32, power: i32, defense: i32) -> Self {
        Self {
            max_hp: hp,
            hp,
            power,
            defense,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Heals up to `amount`, returning what was actually recovered.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp + amount).min(self.max_hp);
        self.hp - before
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount).max(0);
    }
}

impl Component for CombatStats {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlocksTile;

impl Component for BlocksTile {
    type Storage = NullStorage<Self>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ai {
    pub behavior: MonsterAi,
}

impl Component for Ai {
    type Storage = VecStorage<Self>;
}

/// An item lying on the floor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundItem {
    pub item: Item,
}

impl Component for GroundItem {
    type Storage = VecStorage<Self>;
}

pub const INVENTORY_CAPACITY: usize = 26;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub items: Vec<Item>,
}

impl Inventory {
    pub fn is_full(&self) -> bool {
        self.items.len() >= INVENTORY_CAPACITY
    }

    pub fn position_of(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}

impl Component for Inventory {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTag;

impl Component for PlayerTag {
    type Storage = NullStorage<Self>;
}
