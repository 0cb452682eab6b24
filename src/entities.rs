/// All game entity types and their per-frame movement rules.
///
/// Coordinates are playfield units with the origin at the top-left and y
/// growing downward.

use crate::config::Config;
use crate::spawner::SpawnTimer;

pub const PLAYER_WIDTH: f32 = 32.0;
pub const PLAYER_HEIGHT: f32 = 64.0;
pub const ENEMY_SIZE: f32 = 32.0;
pub const COIN_SIZE: f32 = 16.0;
pub const POWERUP_SIZE: f32 = 20.0;
pub const PLATFORM_HEIGHT: f32 = 20.0;

const IDLE_FRAMES: usize = 2;
const RUN_FRAMES: usize = 4;
const POWERUP_PHASE_STEP: f32 = 0.1;
const POWERUP_BOUNCE: f32 = 2.0;

// ── Geometry ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    /// A rect of the given size whose centre is `(cx, cy)`.
    pub fn centered(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Rect { x: cx - w / 2.0, y: cy - h / 2.0, w, h }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Strict overlap: rects that merely share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

// ── Player ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Facing {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnimationKind {
    Idle,
    Run,
    Jump,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    pub kind: AnimationKind,
    pub frame: usize,
    pub last_update_ms: u64,
}

impl Animation {
    fn advance(&mut self, now_ms: u64, frame_ms: u64, airborne: bool, moving: bool) {
        if now_ms.saturating_sub(self.last_update_ms) <= frame_ms {
            return;
        }
        self.last_update_ms = now_ms;
        let kind = if airborne {
            AnimationKind::Jump
        } else if moving {
            AnimationKind::Run
        } else {
            AnimationKind::Idle
        };
        let frames = match kind {
            AnimationKind::Idle => IDLE_FRAMES,
            AnimationKind::Run => RUN_FRAMES,
            AnimationKind::Jump => 1,
        };
        self.frame = if kind == self.kind { (self.frame + 1) % frames } else { 0 };
        self.kind = kind;
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub rect: Rect,
    pub vx: f32,
    pub vy: f32,
    pub on_ground: bool,
    pub jumping: bool,
    pub facing: Facing,
    pub health: u32,
    pub score: u32,
    pub animation: Animation,
}

impl Player {
    pub fn new(config: &Config) -> Self {
        Player {
            rect: Rect::centered(
                config.width / 4.0,
                config.height / 2.0,
                PLAYER_WIDTH,
                PLAYER_HEIGHT,
            ),
            vx: 0.0,
            vy: 0.0,
            on_ground: false,
            jumping: false,
            facing: Facing::Right,
            health: config.max_health,
            score: 0,
            animation: Animation { kind: AnimationKind::Idle, frame: 0, last_update_ms: 0 },
        }
    }

    /// Gravity, movement and playfield clamping for one frame.
    ///
    /// `on_ground` is cleared here and only set again by the floor clamp or
    /// by landing on a platform during collision resolution.
    pub fn update(&mut self, config: &Config) {
        self.vy += config.gravity;
        self.on_ground = false;

        self.rect.x += self.vx;
        self.rect.y += self.vy;

        if self.rect.left() < 0.0 {
            self.rect.x = 0.0;
        }
        if self.rect.right() > config.width {
            self.rect.x = config.width - self.rect.w;
        }
        if self.rect.top() < 0.0 {
            self.rect.y = 0.0;
            self.vy = self.vy.max(0.0);
        }
        if self.rect.bottom() > config.height {
            self.rect.y = config.height - self.rect.h;
            self.land();
        }
    }

    /// Pick the animation frame. Must run after collisions so that standing
    /// on a platform counts as grounded.
    pub fn animate(&mut self, config: &Config, now_ms: u64) {
        let airborne = !self.on_ground;
        let moving = self.vx.abs() > 0.0;
        self.animation.advance(now_ms, config.animation_frame_ms, airborne, moving);
    }

    /// Come to rest on a surface.
    pub fn land(&mut self) {
        self.on_ground = true;
        self.vy = 0.0;
        self.jumping = false;
    }

    /// Returns `true` if the jump was taken.
    pub fn jump(&mut self, config: &Config) -> bool {
        if !self.on_ground || self.jumping {
            return false;
        }
        self.vy = config.jump_power;
        self.on_ground = false;
        self.jumping = true;
        true
    }

    /// Set horizontal velocity from held keys. Right wins when both are held.
    pub fn steer(&mut self, left: bool, right: bool, config: &Config) {
        self.vx = 0.0;
        if left {
            self.vx = -config.player_speed;
            self.facing = Facing::Left;
        }
        if right {
            self.vx = config.player_speed;
            self.facing = Facing::Right;
        }
    }

    pub fn heal(&mut self, amount: u32, max_health: u32) {
        self.health = self.health.saturating_add(amount).min(max_health);
    }

    pub fn damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }
}

// ── Enemy ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Enemy {
    pub rect: Rect,
    /// +1 moving right, -1 moving left.
    pub direction: f32,
    pub speed: f32,
}

impl Enemy {
    pub fn new(x: f32, y: f32, speed: f32) -> Self {
        Enemy { rect: Rect::new(x, y, ENEMY_SIZE, ENEMY_SIZE), direction: 1.0, speed }
    }

    /// Patrol: step sideways, turning back toward the playfield when the
    /// rect pokes out of `[0, width]`.
    pub fn update(&mut self, width: f32) {
        self.rect.x += self.speed * self.direction;
        if self.rect.right() > width {
            self.direction = -1.0;
        } else if self.rect.left() < 0.0 {
            self.direction = 1.0;
        }
    }
}

// ── Platform ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Oscillation {
    pub origin_x: f32,
    pub direction: f32,
    pub speed: f32,
    pub range: f32,
}

#[derive(Clone, Debug)]
pub struct Platform {
    pub rect: Rect,
    /// `None` for static platforms.
    pub oscillation: Option<Oscillation>,
}

impl Platform {
    pub fn fixed(x: f32, y: f32, w: f32) -> Self {
        Platform { rect: Rect::new(x, y, w, PLATFORM_HEIGHT), oscillation: None }
    }

    pub fn moving(x: f32, y: f32, w: f32, speed: f32, range: f32) -> Self {
        Platform {
            rect: Rect::new(x, y, w, PLATFORM_HEIGHT),
            oscillation: Some(Oscillation { origin_x: x, direction: 1.0, speed, range }),
        }
    }

    pub fn is_moving(&self) -> bool {
        self.oscillation.is_some()
    }

    pub fn update(&mut self) {
        if let Some(osc) = self.oscillation.as_mut() {
            self.rect.x += osc.speed * osc.direction;
            if (self.rect.x - osc.origin_x).abs() > osc.range {
                osc.direction = -osc.direction;
            }
        }
    }
}

// ── Collectibles ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Coin {
    pub rect: Rect,
    pub value: u32,
}

impl Coin {
    pub fn new(cx: f32, cy: f32, value: u32) -> Self {
        Coin { rect: Rect::centered(cx, cy, COIN_SIZE, COIN_SIZE), value }
    }
}

#[derive(Clone, Debug)]
pub struct Powerup {
    pub rect: Rect,
    /// Bounce phase in radians, advanced every frame.
    pub phase: f32,
}

impl Powerup {
    pub fn new(cx: f32, cy: f32) -> Self {
        Powerup { rect: Rect::centered(cx, cy, POWERUP_SIZE, POWERUP_SIZE), phase: 0.0 }
    }

    pub fn update(&mut self) {
        self.phase += POWERUP_PHASE_STEP;
        self.rect.y += POWERUP_BOUNCE * self.phase.sin();
    }
}

// ── Render hand-off ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpriteKind {
    Player,
    Enemy,
    Platform,
    Coin,
    Powerup,
}

/// Palette shared with the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tint {
    Blue,
    Red,
    Green,
    Yellow,
    Pink,
}

/// One entity as the renderer needs to see it.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    pub kind: SpriteKind,
    pub rect: Rect,
    pub tint: Tint,
    /// Animation frame; always 0 for non-animated entities.
    pub frame: usize,
    pub flipped: bool,
}

/// Values shown in the heads-up display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hud {
    pub score: u32,
    pub health: u32,
    pub max_health: u32,
}

// ── Master game state ────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum GameStatus {
    Playing,
    GameOver,
}

/// The entire session. Owned by the frame loop and mutated only by the
/// functions in `compute`.
#[derive(Clone, Debug)]
pub struct GameState {
    pub config: Config,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub platforms: Vec<Platform>,
    pub coins: Vec<Coin>,
    pub powerups: Vec<Powerup>,
    pub status: GameStatus,
    /// Platform count chosen before the session; kept across restarts.
    pub num_platforms: usize,
    /// Simulated milliseconds since setup.
    pub clock_ms: u64,
    pub spawner: SpawnTimer,
    pub frame: u64,
}
