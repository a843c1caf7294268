/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The 800 x 600 world is drawn on a 40 x 30 grid of 20 px cells, each
/// cell two terminal columns wide. Hit flashes live here, not in the
/// simulation, and keep fading while the game is paused.

use std::io::{self, BufWriter, Write};
use std::ops::Range;

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{Enemy, EnemyKind, ItemKind, PLAYER_SIZE};
use crate::domain::map::Edge;
use crate::domain::physics::{LEVEL_HEIGHT, LEVEL_WIDTH};
use crate::sim::event::GameEvent;
use crate::sim::world::{Phase, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// gaps between rows match on terminals that paint them separately.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer: differs from any real cell.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Layout ──

/// World pixels per grid cell.
const CELL_PX: f32 = 20.0;
/// Terminal columns per grid cell.
const CELL_W: usize = 2;
const GRID_W: usize = (LEVEL_WIDTH / CELL_PX) as usize;
const GRID_H: usize = (LEVEL_HEIGHT / CELL_PX) as usize;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
const MSG_ROW: usize = MAP_ROW + GRID_H + 1;
const HELP_ROW: usize = MSG_ROW + 1;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const ACCENT: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const GOOD: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const BAD: Color = Color::Rgb { r: 255, g: 60, b: 60 };

const HIT_FLASH_FRAMES: u32 = 6;
const KILL_FLASH_FRAMES: u32 = 14;
const HURT_FRAMES: u32 = 10;

/// Parse `#rgb` or `#rrggbb`.
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.strip_prefix('#')?;
    let channel = |h: &str| u8::from_str_radix(h, 16).ok();
    match hex.len() {
        6 => Some(Color::Rgb {
            r: channel(&hex[0..2])?,
            g: channel(&hex[2..4])?,
            b: channel(&hex[4..6])?,
        }),
        3 => {
            let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
            Some(Color::Rgb { r: short(0)?, g: short(1)?, b: short(2)? })
        }
        _ => None,
    }
}

fn color_or(s: &str, fallback: Color) -> Color {
    parse_hex_color(s).unwrap_or(fallback)
}

/// Darken toward black by `amount` (0 = unchanged, 1 = black).
fn darken(c: Color, amount: f32) -> Color {
    match c {
        Color::Rgb { r, g, b } => {
            let k = 1.0 - amount.clamp(0.0, 1.0);
            Color::Rgb {
                r: (r as f32 * k) as u8,
                g: (g as f32 * k) as u8,
                b: (b as f32 * k) as u8,
            }
        }
        other => other,
    }
}

/// Grid cells covered by a span of world pixels, clipped to `limit`.
fn cell_span(pos: f32, len: f32, limit: usize) -> Range<usize> {
    let start = (pos / CELL_PX).floor().max(0.0) as usize;
    let end = ((pos + len) / CELL_PX).ceil().max(0.0) as usize;
    start.min(limit)..end.min(limit)
}

/// Grid cell holding a world point, if it is on screen.
fn cell_at(x: f32, y: f32) -> Option<(usize, usize)> {
    if x < 0.0 || y < 0.0 { return None; }
    let (gx, gy) = ((x / CELL_PX) as usize, (y / CELL_PX) as usize);
    (gx < GRID_W && gy < GRID_H).then_some((gx, gy))
}

// ── Cosmetic effects ──

#[derive(Clone, Copy, Debug)]
struct Flash {
    x: f32,
    y: f32,
    frames: u32,
    kill: bool,
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    last_paused: bool,
    flashes: Vec<Flash>,
    hurt_frames: u32,
    frame: u64,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            last_paused: false,
            flashes: vec![],
            hurt_frames: 0,
            frame: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 36));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Turn step events into flashes. Never touches the world.
    pub fn note_events(&mut self, events: &[GameEvent]) {
        for event in events {
            match *event {
                GameEvent::EnemyHit { x, y } => {
                    self.flashes.push(Flash { x, y, frames: HIT_FLASH_FRAMES, kill: false });
                }
                GameEvent::EnemyKilled { x, y, .. } => {
                    self.flashes.push(Flash { x, y, frames: KILL_FLASH_FRAMES, kill: true });
                }
                GameEvent::PlayerHurt { .. } => self.hurt_frames = HURT_FRAMES,
                GameEvent::MapChanged { .. } => self.flashes.clear(),
                _ => {}
            }
        }
    }

    /// Advance cosmetic timers by one frame. Runs whether or not the game ticks.
    fn age_effects(&mut self) {
        for f in &mut self.flashes {
            f.frames = f.frames.saturating_sub(1);
        }
        self.flashes.retain(|f| f.frames > 0);
        self.hurt_frames = self.hurt_frames.saturating_sub(1);
    }

    pub fn render(&mut self, world: &WorldState, now_ms: u64) -> io::Result<()> {
        self.frame = self.frame.wrapping_add(1);

        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 36));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Phase or pause change → clean repaint
        if self.last_phase != Some(world.phase) || self.last_paused != world.paused {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
            self.last_paused = world.paused;
        }

        self.front.clear();
        match world.phase {
            Phase::Title => self.compose_title(world),
            Phase::Playing => {
                self.compose_game(world, now_ms);
                if world.paused {
                    self.compose_pause_overlay();
                }
            }
            Phase::GameOver => {
                self.compose_game(world, now_ms);
                self.compose_game_over(world);
            }
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        self.age_effects();
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        // Cursor position after the last print, if known
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    /// Paint one grid cell (two terminal columns).
    fn put_cell(&mut self, gx: usize, gy: usize, glyph: [char; 2], fg: Color, bg: Color) {
        let col = gx * CELL_W;
        let row = MAP_ROW + gy;
        self.front.set(col, row, Cell::new(glyph[0], fg, bg));
        self.front.set(col + 1, row, Cell::new(glyph[1], fg, bg));
    }

    /// Recolor a grid cell's glyph, keeping whatever background is there.
    fn put_glyph(&mut self, gx: usize, gy: usize, glyph: [char; 2], fg: Color) {
        let col = gx * CELL_W;
        let row = MAP_ROW + gy;
        let bg = self.front.get(col, row).bg;
        self.front.set(col, row, Cell::new(glyph[0], fg, bg));
        self.front.set(col + 1, row, Cell::new(glyph[1], fg, bg));
    }

    fn compose_game(&mut self, w: &WorldState, now_ms: u64) {
        let map = w.current_map();
        let bg = color_or(&map.background, Cell::BASE_BG);

        // ── HUD row ──
        let hud_bg = if self.hurt_frames > 0 { darken(BAD, 0.4) } else { HUD_BG };
        let hp = w.player.health.max(0);
        let bar_len = 10;
        let filled = (w.health_ratio() * bar_len as f32).ceil() as usize;
        let bar: String = (0..bar_len).map(|i| if i < filled { '█' } else { '░' }).collect();
        let exit = |edge: Edge, mark: char| if map.connection(edge).is_some() { mark } else { '·' };
        let exits: String = [
            exit(Edge::Left, '◀'), exit(Edge::Top, '▲'),
            exit(Edge::Bottom, '▼'), exit(Edge::Right, '▶'),
        ].iter().collect();
        let hud = format!(
            " {:<16} HP {} {:>3}  Score:{:<7} Exits {} ",
            map.name, bar, hp, w.score, exits,
        );
        self.front.fill_row(HUD_ROW, hud_bg);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, hud_bg);

        // ── Background ──
        for gy in 0..GRID_H {
            for gx in 0..GRID_W {
                self.put_cell(gx, gy, [' ', ' '], Color::White, bg);
            }
        }

        // ── Platforms (ladders on top so they stay visible) ──
        for p in map.platforms.iter().filter(|p| !p.is_ladder()) {
            let c = color_or(&p.color, Color::Grey);
            for gy in cell_span(p.y, p.height, GRID_H) {
                for gx in cell_span(p.x, p.width, GRID_W) {
                    self.put_cell(gx, gy, [' ', ' '], Color::White, c);
                }
            }
        }
        for p in map.ladders() {
            let c = color_or(&p.color, Color::DarkYellow);
            for gy in cell_span(p.y, p.height, GRID_H) {
                for gx in cell_span(p.x, p.width, GRID_W) {
                    self.put_glyph(gx, gy, ['H', 'H'], c);
                }
            }
        }

        // ── Items ──
        for item in map.items.iter().filter(|i| !i.collected) {
            let (glyph, fg) = match item.kind {
                ItemKind::Coin => (['$', ' '], ACCENT),
                ItemKind::Other => (['*', ' '], Color::Cyan),
            };
            let r = item.rect();
            if let Some((gx, gy)) = cell_at(r.center_x(), r.center_y()) {
                self.put_glyph(gx, gy, glyph, fg);
            }
        }

        // ── Enemies ──
        for e in map.living_enemies() {
            self.compose_enemy(e);
        }

        // ── Projectiles ──
        for p in &w.projectiles {
            let r = p.rect();
            if let Some((gx, gy)) = cell_at(r.center_x(), r.center_y()) {
                self.put_glyph(gx, gy, ['-', '-'], Color::White);
            }
        }

        // ── Flashes ──
        for f in self.flashes.clone() {
            if let Some((gx, gy)) = cell_at(f.x, f.y) {
                let fg = if f.kill { ACCENT } else { Color::White };
                let glyph = if f.kill && f.frames % 4 < 2 { ['*', '*'] } else { ['+', ' '] };
                self.put_glyph(gx, gy, glyph, fg);
            }
        }

        // ── Player (blinks while invincible) ──
        let invincible = w.last_damage_ms
            .is_some_and(|t| now_ms.saturating_sub(t) < w.tuning.invincibility_ms);
        if !invincible || self.frame % 6 < 3 {
            let p = &w.player;
            for gy in cell_span(p.y, PLAYER_SIZE, GRID_H) {
                for gx in cell_span(p.x, PLAYER_SIZE, GRID_W) {
                    self.put_cell(gx, gy, ['@', '@'], Color::Black, GOOD);
                }
            }
        }

        // ── Message bar ──
        if !w.message.is_empty() {
            // Map banner carries the description along
            let msg = if w.message == map.name && !map.description.is_empty() {
                format!(" ◈ {} · {} ", w.message, map.description)
            } else {
                format!(" ◈ {} ", w.message)
            };
            self.front.fill_row(MSG_ROW, MSG_BG);
            self.front.put_str(0, MSG_ROW, &msg, Color::Black, MSG_BG);
        }

        let help = " ←→/AD Move  ↑/W Jump/Climb  ↓/S Climb  Space/X Fire  Esc Pause";
        self.front.put_str(0, HELP_ROW, help, Color::DarkGrey, Color::Reset);
    }

    fn compose_enemy(&mut self, e: &Enemy) {
        let base = color_or(&e.color, BAD);
        // Lose up to half the brightness as health drops
        let missing = 1.0 - e.health.max(0) as f32 / e.max_health.max(1) as f32;
        let c = darken(base, missing * 0.5);
        let glyph = match (e.kind, e.chasing) {
            (_, true) => ['!', '!'],
            (EnemyKind::Basic, _) => ['o', 'o'],
            (EnemyKind::Armored, _) => ['#', '#'],
            (EnemyKind::Boss, _) => ['W', 'W'],
        };
        for gy in cell_span(e.y, e.height, GRID_H) {
            for gx in cell_span(e.x, e.width, GRID_W) {
                self.put_cell(gx, gy, glyph, Color::Black, c);
            }
        }
    }

    fn compose_title(&mut self, w: &WorldState) {
        let title = [
            r"  _            _            _                            _ ",
            r" | | ___  __| | __ _  ___| |__   ___  _   _ _ __   __| |",
            r" | |/ _ \/ _` |/ _` |/ _ \ '_ \ / _ \| | | | '_ \ / _` |",
            r" | |  __/ (_| | (_| |  __/ |_) | (_) | |_| | | | | (_| |",
            r" |_|\___|\__,_|\__, |\___|_.__/ \___/ \__,_|_| |_|\__,_|",
            r"               |___/                                     ",
        ];
        for (i, line) in title.iter().enumerate() {
            self.front.put_str(2, 2 + i, line, ACCENT, Color::Reset);
        }

        let maps = format!("{} linked maps", w.maps.len());
        self.front.put_str(8, 10, &maps, Color::DarkGrey, Color::Reset);

        self.front.put_str(8, 12, "ENTER   Start", GOOD, Color::Reset);
        self.front.put_str(8, 13, "  Q     Quit", Color::White, Color::Reset);

        let help = [
            "Controls",
            "  ←→ / A D      Walk",
            "  ↑ / W         Jump, climb ladders",
            "  ↓ / S         Climb down",
            "  Space / X     Fire",
            "  Esc           Pause",
        ];
        for (i, line) in help.iter().enumerate() {
            let color = if i == 0 { ACCENT } else { Color::White };
            self.front.put_str(8, 16 + i, line, color, Color::Reset);
        }
    }

    fn compose_game_over(&mut self, w: &WorldState) {
        let box_art = [
            "╔════════════════════════════════╗",
            "║           GAME  OVER           ║",
            "╠════════════════════════════════╣",
            "║                                ║",
            "║  ENTER  Play again             ║",
            "║    Q    Quit                   ║",
            "╚════════════════════════════════╝",
        ];
        let x = (GRID_W * CELL_W).saturating_sub(box_art[0].chars().count()) / 2;
        let y = MAP_ROW + 8;
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(x, y + i, l, BAD, Cell::BASE_BG);
        }
        let score = format!("Final score: {}", w.score);
        self.front.put_str(x + 3, y + 3, &score, Color::White, Cell::BASE_BG);
    }

    fn compose_pause_overlay(&mut self) {
        let dim = Color::Rgb { r: 40, g: 40, b: 40 };
        let box_w = 28;
        let box_h = 7;
        let box_x = (GRID_W * CELL_W - box_w) / 2;
        let box_y = MAP_ROW + (GRID_H - box_h) / 2;

        for y in box_y..box_y + box_h {
            for x in box_x..box_x + box_w {
                self.front.set(x, y, Cell::new(' ', Color::White, dim));
            }
        }
        let blink = (self.frame / 30) % 2 == 0;
        let label = if blink { "▶  PAUSED  ◀" } else { "   PAUSED   " };
        self.front.put_str(box_x + 8, box_y + 1, label, ACCENT, dim);
        self.front.put_str(box_x + 3, box_y + 3, "Esc  Resume", Color::Rgb { r: 100, g: 200, b: 255 }, dim);
        self.front.put_str(box_x + 3, box_y + 4, " Q   Quit", Color::Rgb { r: 100, g: 200, b: 255 }, dim);
    }
}
