use bracket_geometry::prelude::Point;
use serde::{Deserialize, Serialize};

/// Identity of an item, unique for the lifetime of a game and kept in saves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u32);

/// Something the player attempts. Always performed by the player entity.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Step in a direction, or attack whatever blocks that tile.
    Move { dx: i32, dy: i32 },
    Wait,
    PickUp,
    Drop { item: ItemId },
    UseItem { item: ItemId, target: Option<Point> },
    DescendStairs,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action was applied and consumed the player's turn.
    Advanced,
    /// Nothing changed; the reason is shown to the player.
    Rejected(String),
}

impl ActionOutcome {
    pub fn rejected<S: Into<String>>(reason: S) -> Self {
        ActionOutcome::Rejected(reason.into())
    }

    pub fn is_advanced(&self) -> bool {
        matches!(self, ActionOutcome::Advanced)
    }
}

/// What the targeting cursor is for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TargetPurpose {
    Look,
    Single { item: ItemId },
    Area { item: ItemId, radius: i32 },
}

impl TargetPurpose {
    /// The item whose use is waiting on a tile, if any.
    pub fn item(&self) -> Option<ItemId> {
        match self {
            TargetPurpose::Look => None,
            TargetPurpose::Single { item } | TargetPurpose::Area { item, .. } => Some(*item),
        }
    }
}

/// Result of activating an item from the inventory.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Activation {
    Act(Action),
    Target(TargetPurpose),
}
