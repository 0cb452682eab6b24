/// Session lifecycle and the per-frame simulation step.
///
/// The frame loop owns one `GameState` and drives it through these
/// functions: `apply_input` then `tick` every frame, `restart` on request
/// once the game is over. Randomness is injected so tests can seed it.

use rand::Rng;

use crate::collision::{resolve_all, Collisions};
use crate::config::Config;
use crate::entities::{
    AnimationKind, Facing, GameState, GameStatus, Hud, Player, Rect, Sprite, SpriteKind, Tint,
};
use crate::spawner::{build_platforms, initial_enemies, spawn_coin, SpawnTimer};

/// Player intent for a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Left arrow held.
    pub left: bool,
    /// Right arrow held.
    pub right: bool,
    /// Jump key went down this frame.
    pub jump: bool,
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// Set up a fresh session: player, level layout and starting enemies.
pub fn init_state(config: Config, num_platforms: usize, rng: &mut impl Rng) -> GameState {
    let num_platforms = config.clamp_platforms(num_platforms);
    let platforms = build_platforms(&config, num_platforms, rng);
    let enemies = initial_enemies(&config, rng);
    log::info!(
        "Session set up: {} platforms ({} moving), {} enemies",
        platforms.len(),
        platforms.iter().filter(|p| p.is_moving()).count(),
        enemies.len()
    );
    GameState {
        player: Player::new(&config),
        enemies,
        platforms,
        coins: Vec::new(),
        powerups: Vec::new(),
        status: GameStatus::Playing,
        num_platforms,
        clock_ms: 0,
        spawner: SpawnTimer::default(),
        frame: 0,
        config,
    }
}

/// Rebuild the session in place, keeping the config and platform count.
pub fn reset(state: &mut GameState, rng: &mut impl Rng) {
    let config = state.config.clone();
    *state = init_state(config, state.num_platforms, rng);
}

/// Start over after a game over. Does nothing while still playing.
pub fn restart(state: &mut GameState, rng: &mut impl Rng) -> bool {
    if state.status != GameStatus::GameOver {
        return false;
    }
    log::info!("Restarting (previous score {})", state.player.score);
    reset(state, rng);
    true
}

// ── Input ────────────────────────────────────────────────────────────────────

pub fn apply_input(state: &mut GameState, input: &FrameInput) {
    if state.status != GameStatus::Playing {
        return;
    }
    state.player.steer(input.left, input.right, &state.config);
    if input.jump {
        state.player.jump(&state.config);
    }
}

// ── Per-frame step ───────────────────────────────────────────────────────────

/// Advance the simulation by one frame of `dt_ms` milliseconds.
///
/// Order: spawn, move every entity, resolve collisions, check for game
/// over. A finished session is left untouched.
pub fn tick(state: &mut GameState, dt_ms: u64, rng: &mut impl Rng) -> Collisions {
    if state.status != GameStatus::Playing {
        return Collisions::default();
    }
    state.clock_ms += dt_ms;
    state.frame += 1;

    // ── 1. Spawn ─────────────────────────────────────────────────────────────
    spawn_coin(state, rng);

    // ── 2. Move ──────────────────────────────────────────────────────────────
    let width = state.config.width;
    state.player.update(&state.config);
    for platform in &mut state.platforms {
        platform.update();
    }
    for enemy in &mut state.enemies {
        enemy.update(width);
    }
    for powerup in &mut state.powerups {
        powerup.update();
    }

    // ── 3. Collide ───────────────────────────────────────────────────────────
    let collisions = resolve_all(state, rng);
    state.player.animate(&state.config, state.clock_ms);

    // ── 4. Terminal check ────────────────────────────────────────────────────
    if state.player.health == 0 {
        state.status = GameStatus::GameOver;
    }
    if state.status == GameStatus::GameOver {
        log::info!(
            "Game over at frame {} with score {}",
            state.frame,
            state.player.score
        );
    }
    collisions
}

// ── Render hand-off ──────────────────────────────────────────────────────────

pub fn hud(state: &GameState) -> Hud {
    Hud {
        score: state.player.score,
        health: state.player.health,
        max_health: state.config.max_health,
    }
}

/// Everything the renderer should draw this frame, back to front.
pub fn sprites(state: &GameState) -> Vec<Sprite> {
    let plain = |kind: SpriteKind, rect: Rect, tint: Tint| Sprite {
        kind,
        rect,
        tint,
        frame: 0,
        flipped: false,
    };

    let mut out = Vec::with_capacity(
        1 + state.platforms.len() + state.coins.len() + state.powerups.len() + state.enemies.len(),
    );
    out.extend(state.platforms.iter().map(|p| plain(SpriteKind::Platform, p.rect, Tint::Green)));
    out.extend(state.coins.iter().map(|c| plain(SpriteKind::Coin, c.rect, Tint::Yellow)));
    out.extend(state.powerups.iter().map(|p| plain(SpriteKind::Powerup, p.rect, Tint::Pink)));
    out.extend(state.enemies.iter().map(|e| plain(SpriteKind::Enemy, e.rect, Tint::Red)));

    let player = &state.player;
    let tint = match player.animation.kind {
        AnimationKind::Jump => Tint::Red,
        AnimationKind::Idle | AnimationKind::Run => Tint::Blue,
    };
    out.push(Sprite {
        kind: SpriteKind::Player,
        rect: player.rect,
        tint,
        frame: player.animation.frame,
        flipped: player.facing == Facing::Left,
    });
    out
}
