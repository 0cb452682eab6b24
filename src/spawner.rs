/// Creation of new entities: the level layout at setup, coins and power-ups
/// on a timer, and extra enemies as the score climbs.
///
/// All randomness comes through the injected `rng`.

use rand::Rng;

use crate::config::Config;
use crate::entities::{Coin, Enemy, GameState, Platform, Powerup, COIN_SIZE, ENEMY_SIZE};

const PLATFORM_MIN_WIDTH: u32 = 80;
const PLATFORM_MAX_WIDTH: u32 = 150;
/// Gap between the floor and the lowest platform's top.
const PLATFORM_FLOOR_GAP: f32 = 40.0;
/// Vertical room left free above the highest platform.
const PLATFORM_HEADROOM: f32 = 200.0;
/// Distance from the floor to the top of the enemy lane.
const ENEMY_LANE_OFFSET: f32 = 80.0;
/// Coins never spawn closer than this to the floor.
const COIN_FLOOR_MARGIN: f32 = 100.0;

/// Timing state for the coin spawner; lives on the session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpawnTimer {
    pub last_coin_ms: u64,
}

/// What a single `spawn_coin` call produced.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Spawned {
    pub coin: bool,
    pub powerup: bool,
}

// ── Level layout ─────────────────────────────────────────────────────────────

/// Lay out `count` platforms stacked upward from just above the floor.
/// The bottom platform never moves; every other one moves with even odds.
pub fn build_platforms(config: &Config, count: usize, rng: &mut impl Rng) -> Vec<Platform> {
    let count = config.clamp_platforms(count);
    let base_y = config.height - PLATFORM_FLOOR_GAP;
    let spacing = ((config.height - PLATFORM_HEADROOM) / count as f32).floor();

    (0..count)
        .map(|i| {
            let w = rng.gen_range(PLATFORM_MIN_WIDTH..=PLATFORM_MAX_WIDTH) as f32;
            let max_x = (config.width - w).max(0.0) as u32;
            let x = rng.gen_range(0..=max_x) as f32;
            let y = base_y - i as f32 * spacing;
            let moving = i > 0 && rng.gen_bool(0.5);
            if moving {
                Platform::moving(x, y, w, config.platform_speed, config.platform_range)
            } else {
                Platform::fixed(x, y, w)
            }
        })
        .collect()
}

/// Top edge of the lane enemies patrol along.
pub fn enemy_lane_y(config: &Config) -> f32 {
    config.height - ENEMY_LANE_OFFSET
}

fn random_enemy(config: &Config, rng: &mut impl Rng) -> Enemy {
    let max_x = (config.width - ENEMY_SIZE).max(0.0) as u32;
    let x = rng.gen_range(0..=max_x) as f32;
    Enemy::new(x, enemy_lane_y(config), config.enemy_speed)
}

pub fn initial_enemies(config: &Config, rng: &mut impl Rng) -> Vec<Enemy> {
    (0..config.initial_enemies).map(|_| random_enemy(config, rng)).collect()
}

// ── Timed spawns ─────────────────────────────────────────────────────────────

/// Drop a coin once `coin_spawn_ms` has elapsed since the previous one,
/// sometimes with a health power-up beside it.
pub fn spawn_coin(state: &mut GameState, rng: &mut impl Rng) -> Spawned {
    let config = &state.config;
    if state.clock_ms.saturating_sub(state.spawner.last_coin_ms) <= config.coin_spawn_ms {
        return Spawned::default();
    }
    state.spawner.last_coin_ms = state.clock_ms;

    let half = COIN_SIZE / 2.0;
    let x = rng.gen_range(half..=(config.width - half).max(half));
    let y_min = config.height / 2.0;
    let y_max = (config.height - COIN_FLOOR_MARGIN).max(y_min);
    let y = rng.gen_range(y_min..=y_max);
    state.coins.push(Coin::new(x, y, config.coin_value));
    log::debug!("Coin spawned at ({:.0}, {:.0})", x, y);

    let powerup = rng.gen_bool(config.powerup_chance);
    if powerup {
        let px = x + config.powerup_offset_x;
        state.powerups.push(Powerup::new(px, y));
        log::debug!("Power-up spawned at ({:.0}, {:.0})", px, y);
    }

    Spawned { coin: true, powerup }
}

// ── Score-driven spawns ──────────────────────────────────────────────────────

/// True when going from `before` to `after` crosses a multiple of `interval`.
pub fn crosses_score_interval(before: u32, after: u32, interval: u32) -> bool {
    interval > 0 && after / interval > before / interval
}

/// Add one enemy unless the cap is reached. Returns whether one was added.
pub fn spawn_enemy(state: &mut GameState, rng: &mut impl Rng) -> bool {
    if state.enemies.len() >= state.config.max_enemies {
        log::debug!("Enemy cap ({}) reached, not spawning", state.config.max_enemies);
        return false;
    }
    let enemy = random_enemy(&state.config, rng);
    log::info!(
        "Enemy spawned at x={:.0} (score {}, {} enemies)",
        enemy.rect.x,
        state.player.score,
        state.enemies.len() + 1
    );
    state.enemies.push(enemy);
    true
}
