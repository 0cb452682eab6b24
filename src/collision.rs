/// Player-versus-world collision tests and their effects.
///
/// Every test is an axis-aligned overlap between the player's rect and the
/// other entity's rect; resolution depends on the entity category.

use rand::Rng;

use crate::entities::{GameState, GameStatus, Platform, Rect};
use crate::spawner::{crosses_score_interval, spawn_enemy};

/// Outcome of one full resolver pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Collisions {
    pub landed: bool,
    pub coins: u32,
    pub powerups: usize,
    pub enemy_hit: bool,
}

/// The overlapping platform with the lowest bottom edge; the first one wins
/// among equal bottoms.
pub fn lowest_overlapping<'a>(player: &Rect, platforms: &'a [Platform]) -> Option<&'a Platform> {
    platforms
        .iter()
        .filter(|p| p.rect.intersects(player))
        .fold(None, |lowest: Option<&Platform>, p| match lowest {
            Some(l) if p.rect.bottom() <= l.rect.bottom() => Some(l),
            _ => Some(p),
        })
}

/// Land a falling player on the lowest platform they overlap.
pub fn resolve_platforms(state: &mut GameState) -> bool {
    if state.player.vy <= 0.0 {
        return false;
    }
    let Some(top) = lowest_overlapping(&state.player.rect, &state.platforms).map(|p| p.rect.top())
    else {
        return false;
    };
    let player = &mut state.player;
    player.rect.y = top - player.rect.h;
    player.land();
    true
}

/// Collect every coin the player touches. Each coin that pushes the score
/// over a multiple of the score interval brings in another enemy.
pub fn collect_coins(state: &mut GameState, rng: &mut impl Rng) -> u32 {
    let player_rect = state.player.rect;
    let (hit, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut state.coins)
        .into_iter()
        .partition(|c| c.rect.intersects(&player_rect));
    state.coins = kept;

    let interval = state.config.enemy_spawn_score_interval;
    let mut gained = 0;
    for coin in &hit {
        let before = state.player.score;
        state.player.score = before.saturating_add(coin.value);
        gained += coin.value;
        if crosses_score_interval(before, state.player.score, interval) {
            spawn_enemy(state, rng);
        }
    }
    gained
}

/// Consume every power-up the player touches, healing up to the cap.
pub fn collect_powerups(state: &mut GameState) -> usize {
    let player_rect = state.player.rect;
    let before = state.powerups.len();
    state.powerups.retain(|p| !p.rect.intersects(&player_rect));
    let collected = before - state.powerups.len();

    let (heal, max) = (state.config.powerup_heal, state.config.max_health);
    for _ in 0..collected {
        state.player.heal(heal, max);
    }
    collected
}

/// Touching any number of enemies costs `enemy_damage` once per frame.
/// Health reaching zero ends the session.
pub fn resolve_enemies(state: &mut GameState) -> bool {
    let player_rect = state.player.rect;
    if !state.enemies.iter().any(|e| e.rect.intersects(&player_rect)) {
        return false;
    }
    state.player.damage(state.config.enemy_damage);
    if state.player.health == 0 {
        state.status = GameStatus::GameOver;
    }
    true
}

/// Platforms, then coins, then power-ups, then enemies.
pub fn resolve_all(state: &mut GameState, rng: &mut impl Rng) -> Collisions {
    let landed = resolve_platforms(state);
    let coins = collect_coins(state, rng);
    let powerups = collect_powerups(state);
    let enemy_hit = resolve_enemies(state);
    Collisions { landed, coins, powerups, enemy_hit }
}
