/// Rendering layer — all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// game state.  No game logic is performed; this module only scales the
/// playfield onto the terminal grid and translates sprites into terminal
/// commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use platformer::compute::{hud, sprites};
use platformer::entities::{
    AnimationKind, GameState, GameStatus, Hud, Rect, Sprite, SpriteKind, Tint,
};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HEALTH_FULL: Color = Color::Green;
const C_HEALTH_EMPTY: Color = Color::Red;
const C_HINT: Color = Color::DarkGrey;

const HEALTH_BAR_CELLS: u32 = 20;

fn color_of(tint: Tint) -> Color {
    match tint {
        Tint::Blue => Color::Blue,
        Tint::Red => Color::Red,
        Tint::Green => Color::Green,
        Tint::Yellow => Color::Yellow,
        Tint::Pink => Color::Magenta,
    }
}

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Maps playfield units onto the terminal cells inside the border.
///
/// Row 0 is the HUD, row 1 and row `rows - 2` are the border, the last row
/// holds the controls hint.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    field_w: f32,
    field_h: f32,
}

impl Viewport {
    pub fn new(cols: u16, rows: u16, state: &GameState) -> Self {
        Viewport { cols, rows, field_w: state.config.width, field_h: state.config.height }
    }

    fn inner_cols(&self) -> u16 {
        self.cols.saturating_sub(2).max(1)
    }

    fn inner_rows(&self) -> u16 {
        self.rows.saturating_sub(4).max(1)
    }

    fn col(&self, x: f32) -> i32 {
        1 + (x / self.field_w * self.inner_cols() as f32).floor() as i32
    }

    fn row(&self, y: f32) -> i32 {
        2 + (y / self.field_h * self.inner_rows() as f32).floor() as i32
    }

    /// Cell span covered by `rect`, clipped to the inner area. Every
    /// visible rect covers at least one cell.
    fn cells(&self, rect: &Rect) -> Option<(u16, u16, u16, u16)> {
        let (min_c, max_c) = (1, self.inner_cols() as i32);
        let (min_r, max_r) = (2, 1 + self.inner_rows() as i32);

        let c0 = self.col(rect.left()).max(min_c);
        let c1 = (self.col(rect.right()) - 1).max(self.col(rect.left())).min(max_c);
        let r0 = self.row(rect.top()).max(min_r);
        let r1 = (self.row(rect.bottom()) - 1).max(self.row(rect.top())).min(max_r);
        if c0 > c1 || r0 > r1 {
            return None;
        }
        Some((c0 as u16, r0 as u16, c1 as u16, r1 as u16))
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, state: &GameState, view: &Viewport) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, view)?;
    draw_hud(out, &hud(state), view)?;

    if state.status == GameStatus::GameOver {
        draw_game_over(out, state, view)?;
    } else {
        for sprite in &sprites(state) {
            draw_sprite(out, sprite, state, view)?;
        }
    }

    draw_controls_hint(out, view)?;

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let w = view.cols as usize;
    let h = view.rows;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, hud: &Hud, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score:{:>6}", hud.score)))?;

    // Health bar — right side
    let filled = (hud.health * HEALTH_BAR_CELLS / hud.max_health.max(1)).min(HEALTH_BAR_CELLS);
    let label = format!(" {:>3}", hud.health);
    let total = 7 + HEALTH_BAR_CELLS as u16 + 2 + label.chars().count() as u16;
    let rx = view.cols.saturating_sub(total + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Health ["))?;
    out.queue(style::SetForegroundColor(C_HEALTH_FULL))?;
    out.queue(Print("█".repeat(filled as usize)))?;
    out.queue(style::SetForegroundColor(C_HEALTH_EMPTY))?;
    out.queue(Print("░".repeat((HEALTH_BAR_CELLS - filled) as usize)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(format!("]{}", label)))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

/// Glyph used to fill a sprite's cells.
///
/// The player alternates glyphs with its animation frame and shows which
/// way it faces on its leading edge.
fn glyph(sprite: &Sprite, state: &GameState) -> &'static str {
    match sprite.kind {
        SpriteKind::Platform => "▀",
        SpriteKind::Coin => "●",
        SpriteKind::Powerup => "♥",
        SpriteKind::Enemy => "▓",
        SpriteKind::Player => match (state.player.animation.kind, sprite.frame % 2) {
            (AnimationKind::Jump, _) => "▲",
            (_, 0) => "█",
            _ => "▉",
        },
    }
}

fn draw_sprite<W: Write>(
    out: &mut W,
    sprite: &Sprite,
    state: &GameState,
    view: &Viewport,
) -> std::io::Result<()> {
    let Some((c0, r0, c1, r1)) = view.cells(&sprite.rect) else {
        return Ok(());
    };
    let fill = glyph(sprite, state);
    let width = (c1 - c0 + 1) as usize;

    out.queue(style::SetForegroundColor(color_of(sprite.tint)))?;
    for row in r0..=r1 {
        out.queue(cursor::MoveTo(c0, row))?;
        out.queue(Print(fill.repeat(width)))?;
    }

    // Eyes on the top row point the way the player faces
    if sprite.kind == SpriteKind::Player {
        let (col, eye) = if sprite.flipped { (c0, "◂") } else { (c1, "▸") };
        out.queue(cursor::MoveTo(col, r0))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print(eye))?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → : Move   SPACE : Jump   Q : Quit"))?;
    Ok(())
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(
    out: &mut W,
    state: &GameState,
    view: &Viewport,
) -> std::io::Result<()> {
    let score_line = format!("Final Score: {:>6}", state.player.score);
    let hint = "R - Play Again  Q - Quit";

    let lines: [(&str, Color); 5] = [
        ("╔════════════════════╗", Color::Red),
        ("║    GAME  OVER      ║", Color::Red),
        ("╚════════════════════╝", Color::Red),
        (score_line.as_str(), Color::White),
        (hint, Color::White),
    ];

    let cx = view.cols / 2;
    let start_row = (view.rows / 2).saturating_sub(lines.len() as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }

    Ok(())
}
