use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::*;

use crate::{
    action::TargetPurpose,
    data::Tint,
    engine::Engine,
    log::{ColorTag, MessageLog},
    map::{GameMap, TileKind},
    modes::{InventoryPurpose, Mode},
};

const HUD_TOP: i32 = 44;
const LOG_X: i32 = 21;
const LOG_WIDTH: usize = 40;
const LOG_HEIGHT: usize = 5;

const BAR_FILLED: (u8, u8, u8) = (0x00, 0x60, 0x00);
const BAR_EMPTY: (u8, u8, u8) = (0x40, 0x10, 0x10);
const MENU_TITLE: (u8, u8, u8) = (255, 255, 63);

pub fn palette(tag: ColorTag) -> RGB {
    let (r, g, b) = match tag {
        ColorTag::White => (0xFF, 0xFF, 0xFF),
        ColorTag::PlayerAttack => (0xE0, 0xE0, 0xE0),
        ColorTag::EnemyAttack => (0xFF, 0xC0, 0xC0),
        ColorTag::PlayerDie => (0xFF, 0x30, 0x30),
        ColorTag::EnemyDie => (0xFF, 0xA0, 0x30),
        ColorTag::Invalid => (0xFF, 0xFF, 0x00),
        ColorTag::Impossible => (0x80, 0x80, 0x80),
        ColorTag::Error => (0xFF, 0x40, 0x40),
        ColorTag::Welcome => (0x20, 0xA0, 0xFF),
        ColorTag::HealthRecovered => (0x00, 0xFF, 0x00),
        ColorTag::StatusEffect => (0x3F, 0xFF, 0x3F),
        ColorTag::Descend => (0x9F, 0x3F, 0xFF),
        ColorTag::NeedsTarget => (0x3F, 0xFF, 0xFF),
    };
    RGB::from_u8(r, g, b)
}

fn tint((r, g, b): Tint) -> RGB {
    RGB::from_u8(r, g, b)
}

/// Fades a color toward black; used to push a parent mode behind a popup.
fn shade(color: RGB, dim: bool) -> RGB {
    if dim {
        RGB::from_f32(color.r * 0.4, color.g * 0.4, color.b * 0.4)
    } else {
        color
    }
}

pub fn render(mode: &Mode, ctx: &mut BTerm) {
    ctx.cls();
    draw_mode(mode, ctx, false);
}

fn draw_mode(mode: &Mode, ctx: &mut BTerm, dim: bool) {
    match mode {
        Mode::MainMenu => draw_main_menu(ctx, dim),
        Mode::InPlay(engine) => draw_play(ctx, engine, dim),
        Mode::SelectTarget { engine, purpose } => {
            draw_play(ctx, engine, dim);
            draw_target(ctx, engine, *purpose);
        }
        Mode::Inventory { engine, purpose } => {
            draw_play(ctx, engine, dim);
            draw_inventory(ctx, engine, *purpose);
        }
        Mode::History { engine, cursor } => {
            draw_play(ctx, engine, dim);
            draw_history(ctx, &engine.log, *cursor);
        }
        Mode::Popup { parent, text } => {
            draw_mode(parent, ctx, true);
            draw_popup(ctx, text);
        }
        Mode::GameOver(engine) => {
            draw_play(ctx, engine, dim);
            ctx.print_color_centered(
                HUD_TOP - 2,
                palette(ColorTag::PlayerDie),
                RGB::named(BLACK),
                "You died. Press Esc to leave.",
            );
        }
    }
}

fn draw_play(ctx: &mut BTerm, engine: &Engine, dim: bool) {
    draw_map(ctx, &engine.map, dim);
    engine.ecs().each_renderable(|point, render| {
        if engine.map.is_visible(point) {
            ctx.set(
                point.x,
                point.y,
                shade(tint(render.color), dim),
                RGB::named(BLACK),
                to_cp437(render.glyph),
            );
        }
    });

    if let Ok(stats) = engine.ecs().player_stats() {
        ctx.draw_bar_horizontal(
            0,
            HUD_TOP + 1,
            20,
            stats.hp,
            stats.max_hp,
            shade(tint(BAR_FILLED), dim),
            shade(tint(BAR_EMPTY), dim),
        );
        ctx.print_color(
            1,
            HUD_TOP + 1,
            shade(RGB::named(WHITE), dim),
            RGB::from_u8(BAR_FILLED.0, BAR_FILLED.1, BAR_FILLED.2),
            format!("HP: {}/{}", stats.hp, stats.max_hp),
        );
    }
    ctx.print_color(
        0,
        HUD_TOP + 3,
        shade(RGB::named(WHITE), dim),
        RGB::named(BLACK),
        format!("Dungeon level: {}", engine.depth),
    );
    ctx.print_color(
        LOG_X,
        HUD_TOP,
        shade(RGB::named(WHITE), dim),
        RGB::named(BLACK),
        engine.names_at_cursor(),
    );

    let lines = MessageLog::layout(engine.log.entries(), LOG_WIDTH, LOG_HEIGHT);
    for (row, (text, tag)) in lines.iter().enumerate() {
        ctx.print_color(
            LOG_X,
            HUD_TOP + 1 + row as i32,
            shade(palette(*tag), dim),
            RGB::named(BLACK),
            text,
        );
    }
}

pub fn draw_map(ctx: &mut BTerm, map: &GameMap, dim: bool) {
    for y in 0..map.height {
        for x in 0..map.width {
            let point = Point::new(x, y);
            let Some(tile) = map.tile(point) else {
                continue;
            };
            let (fg, bg) = if map.is_visible(point) {
                tile_colors(tile, true)
            } else if map.is_explored(point) {
                tile_colors(tile, false)
            } else {
                continue;
            };
            ctx.set(x, y, shade(fg, dim), shade(bg, dim), to_cp437(tile.glyph()));
        }
    }
}

fn tile_colors(tile: TileKind, lit: bool) -> (RGB, RGB) {
    let (fg, bg) = match (tile, lit) {
        (TileKind::Wall, true) => ((130, 110, 50), (130, 110, 50)),
        (TileKind::Wall, false) => ((0, 0, 100), (0, 0, 100)),
        (TileKind::Floor, true) => ((200, 180, 50), (200, 180, 50)),
        (TileKind::Floor, false) => ((50, 50, 150), (50, 50, 150)),
        (TileKind::DownStairs, true) => ((255, 255, 255), (200, 180, 50)),
        (TileKind::DownStairs, false) => ((0, 0, 100), (50, 50, 150)),
    };
    (tint(fg), tint(bg))
}

fn draw_target(ctx: &mut BTerm, engine: &Engine, purpose: TargetPurpose) {
    let cursor = engine.cursor;
    ctx.set_bg(cursor.x, cursor.y, RGB::named(WHITE));

    if let TargetPurpose::Area { radius, .. } = purpose {
        ctx.draw_hollow_box(
            cursor.x - radius - 1,
            cursor.y - radius - 1,
            radius * 2 + 2,
            radius * 2 + 2,
            RGB::named(RED),
            RGB::named(BLACK),
        );
    }
}

fn draw_inventory(ctx: &mut BTerm, engine: &Engine, purpose: InventoryPurpose) {
    let title = match purpose {
        InventoryPurpose::Activate => "Select an item to use",
        InventoryPurpose::Drop => "Select an item to drop",
    };
    let items: Vec<String> = engine
        .inventory()
        .map(|inventory| {
            inventory
                .items
                .iter()
                .zip('a'..='z')
                .map(|(item, letter)| format!("({letter}) {}", item.name))
                .collect()
        })
        .unwrap_or_default();

    let x = match engine.player_point() {
        Ok(point) if point.x <= 30 => 40,
        _ => 0,
    };
    let width = title.len() as i32 + 4;
    let height = items.len().max(1) as i32 + 1;

    ctx.draw_box(x, 0, width, height, RGB::named(WHITE), RGB::named(BLACK));
    ctx.print_color(x + 1, 0, RGB::named(BLACK), RGB::named(WHITE), title);
    if items.is_empty() {
        ctx.print(x + 1, 1, "(Empty)");
    }
    for (row, line) in items.iter().enumerate() {
        ctx.print(x + 1, 1 + row as i32, line);
    }
}

fn draw_history(ctx: &mut BTerm, log: &MessageLog, cursor: usize) {
    let (width, height) = ctx.get_char_size();
    let (width, height) = (width as i32 - 6, height as i32 - 6);
    ctx.draw_box(3, 3, width, height, RGB::named(WHITE), RGB::named(BLACK));
    ctx.print_color_centered(3, RGB::named(WHITE), RGB::named(BLACK), "┤Message history├");

    let shown = &log.entries()[..(cursor + 1).min(log.len())];
    let lines = MessageLog::layout(shown, (width - 1).max(1) as usize, (height - 1).max(1) as usize);
    for (row, (text, tag)) in lines.iter().enumerate() {
        ctx.print_color(4, 4 + row as i32, palette(*tag), RGB::named(BLACK), text);
    }
}

fn draw_popup(ctx: &mut BTerm, text: &str) {
    let (_, height) = ctx.get_char_size();
    let lines: Vec<&str> = text.lines().collect();
    let top = height as i32 / 2 - lines.len() as i32 / 2;
    for (row, line) in lines.iter().enumerate() {
        ctx.print_color_centered(top + row as i32, RGB::named(WHITE), RGB::named(BLACK), line);
    }
}

fn draw_main_menu(ctx: &mut BTerm, dim: bool) {
    let (_, height) = ctx.get_char_size();
    let middle = height as i32 / 2;
    ctx.print_color_centered(
        middle - 4,
        shade(tint(MENU_TITLE), dim),
        RGB::named(BLACK),
        "DESOLATE ARCHIVE",
    );
    for (row, entry) in ["[N] Play a new game", "[C] Continue last game", "[Q] Quit"]
        .iter()
        .enumerate()
    {
        ctx.print_color_centered(
            middle - 2 + row as i32,
            shade(RGB::named(WHITE), dim),
            RGB::named(BLACK),
            entry,
        );
    }
}
