use super::Tint;

#[derive(Clone, Debug)]
pub struct MonsterTemplate {
    pub name: &'static str,
    pub glyph: char,
    pub color: Tint,
    pub hp: i32,
    pub power: i32,
    pub defense: i32,
}

pub static ORC: MonsterTemplate = MonsterTemplate {
    name: "Orc",
    glyph: 'o',
    color: (63, 127, 63),
    hp: 10,
    power: 3,
    defense: 0,
};

pub static TROLL: MonsterTemplate = MonsterTemplate {
    name: "Troll",
    glyph: 'T',
    color: (0, 127, 0),
    hp: 16,
    power: 4,
    defense: 1,
};

/// Stats the player starts with.
pub static PLAYER: MonsterTemplate = MonsterTemplate {
    name: "Player",
    glyph: '@',
    color: (255, 255, 255),
    hp: 30,
    power: 5,
    defense: 2,
};
