pub mod items;
pub mod monsters;

use self::{items::ItemTemplate, monsters::MonsterTemplate};

/// Foreground color stored on entities and items, kept as plain bytes so it
/// serializes without the terminal's color type.
pub type Tint = (u8, u8, u8);

/// Weighted spawn table. Weights are percentages and sum to 100.
pub struct SpawnTable<T: 'static> {
    pub entries: &'static [(u32, &'static T)],
}

impl<T> SpawnTable<T> {
    /// Picks the entry covering `roll`, where `roll` is in `0..100`.
    pub fn pick(&self, roll: u32) -> &'static T {
        let mut ceiling = 0;
        for (weight, entry) in self.entries {
            ceiling += weight;
            if roll < ceiling {
                return entry;
            }
        }
        self.entries[self.entries.len() - 1].1
    }
}

pub static MONSTER_SPAWNS: SpawnTable<MonsterTemplate> = SpawnTable {
    entries: &[(80, &monsters::ORC), (20, &monsters::TROLL)],
};

pub static ITEM_SPAWNS: SpawnTable<ItemTemplate> = SpawnTable {
    entries: &[
        (70, &items::HEALTH_POTION),
        (10, &items::CONFUSION_SCROLL),
        (10, &items::LIGHTNING_SCROLL),
        (10, &items::FIREBALL_SCROLL),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_tables_cover_every_roll() {
        assert_eq!(MONSTER_SPAWNS.pick(0).name, "Orc");
        assert_eq!(MONSTER_SPAWNS.pick(79).name, "Orc");
        assert_eq!(MONSTER_SPAWNS.pick(80).name, "Troll");
        assert_eq!(MONSTER_SPAWNS.pick(99).name, "Troll");

        assert_eq!(ITEM_SPAWNS.pick(69).name, "Health Potion");
        assert_eq!(ITEM_SPAWNS.pick(70).name, "Confusion Scroll");
        assert_eq!(ITEM_SPAWNS.pick(85).name, "Lightning Scroll");
        assert_eq!(ITEM_SPAWNS.pick(99).name, "Fireball Scroll");
    }
}
