use serde::{Deserialize, Serialize};

use super::Tint;
use crate::action::{Action, Activation, ItemId, TargetPurpose};

#[derive(Clone, Debug)]
pub struct ItemTemplate {
    pub name: &'static str,
    pub glyph: char,
    pub color: Tint,
    pub consumable: Consumable,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Consumable {
    Healing { amount: i32 },
    Lightning { damage: i32, max_range: i32 },
    Confusion { turns: i32 },
    Fireball { damage: i32, radius: i32 },
}

pub static HEALTH_POTION: ItemTemplate = ItemTemplate {
    name: "Health Potion",
    glyph: '!',
    color: (127, 0, 255),
    consumable: Consumable::Healing { amount: 4 },
};

pub static LIGHTNING_SCROLL: ItemTemplate = ItemTemplate {
    name: "Lightning Scroll",
    glyph: '~',
    color: (255, 255, 0),
    consumable: Consumable::Lightning {
        damage: 20,
        max_range: 5,
    },
};

pub static CONFUSION_SCROLL: ItemTemplate = ItemTemplate {
    name: "Confusion Scroll",
    glyph: '~',
    color: (207, 63, 255),
    consumable: Consumable::Confusion { turns: 10 },
};

pub static FIREBALL_SCROLL: ItemTemplate = ItemTemplate {
    name: "Fireball Scroll",
    glyph: '~',
    color: (255, 0, 0),
    consumable: Consumable::Fireball {
        damage: 12,
        radius: 3,
    },
};

/// A concrete item, either lying on the floor or carried in an inventory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub glyph: char,
    pub color: Tint,
    pub consumable: Consumable,
}

impl Item {
    pub fn from_template(id: ItemId, template: &ItemTemplate) -> Self {
        Self {
            id,
            name: template.name.to_string(),
            glyph: template.glyph,
            color: template.color,
            consumable: template.consumable,
        }
    }

    /// What selecting this item from the inventory leads to: either an
    /// action that can be submitted right away, or a targeting prompt whose
    /// confirmation produces the action later.
    pub fn activation(&self) -> Activation {
        match self.consumable {
            Consumable::Healing { .. } | Consumable::Lightning { .. } => {
                Activation::Act(Action::UseItem {
                    item: self.id,
                    target: None,
                })
            }
            Consumable::Confusion { .. } => {
                Activation::Target(TargetPurpose::Single { item: self.id })
            }
            Consumable::Fireball { radius, .. } => Activation::Target(TargetPurpose::Area {
                item: self.id,
                radius,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instant_items_act_and_targeted_items_ask() {
        let potion = Item::from_template(ItemId(1), &HEALTH_POTION);
        assert_eq!(
            potion.activation(),
            Activation::Act(Action::UseItem {
                item: ItemId(1),
                target: None
            })
        );

        let fireball = Item::from_template(ItemId(2), &FIREBALL_SCROLL);
        assert_eq!(
            fireball.activation(),
            Activation::Target(TargetPurpose::Area {
                item: ItemId(2),
                radius: 3
            })
        );

        let confusion = Item::from_template(ItemId(3), &CONFUSION_SCROLL);
        assert_eq!(
            confusion.activation(),
            Activation::Target(TargetPurpose::Single { item: ItemId(3) })
        );
    }
}
