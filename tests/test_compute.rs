use platformer::collision::*;
use platformer::compute::*;
use platformer::config::Config;
use platformer::entities::*;
use platformer::spawner::*;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// A session with an empty level and the player hanging in mid-air.
fn make_state() -> GameState {
    let mut s = init_state(Config::default(), 5, &mut seeded_rng());
    s.enemies.clear();
    s.platforms.clear();
    s.player.rect = Rect::new(300.0, 200.0, PLAYER_WIDTH, PLAYER_HEIGHT);
    s
}

fn player_center(s: &GameState) -> (f32, f32) {
    let r = s.player.rect;
    (r.x + r.w / 2.0, r.y + r.h / 2.0)
}

// ── init_state ────────────────────────────────────────────────────────────────

#[test]
fn init_state_fresh_player() {
    let s = init_state(Config::default(), 5, &mut seeded_rng());
    assert_eq!(s.player.health, 100);
    assert_eq!(s.player.score, 0);
    assert_eq!(s.status, GameStatus::Playing);
    assert_eq!(s.frame, 0);
    assert_eq!(s.clock_ms, 0);
    // Centred at (width / 4, height / 2)
    assert_eq!(s.player.rect.x, 275.0 - 16.0);
    assert_eq!(s.player.rect.y, 360.0 - 32.0);
}

#[test]
fn init_state_populates_level() {
    let s = init_state(Config::default(), 5, &mut seeded_rng());
    assert_eq!(s.num_platforms, 5);
    assert_eq!(s.platforms.len(), 5);
    assert_eq!(s.enemies.len(), 3);
    assert!(s.coins.is_empty());
    assert!(s.powerups.is_empty());
}

#[test]
fn init_state_clamps_platform_count() {
    let s = init_state(Config::default(), 0, &mut seeded_rng());
    assert_eq!(s.num_platforms, 1);
    assert_eq!(s.platforms.len(), 1);

    let s = init_state(Config::default(), 99, &mut seeded_rng());
    assert_eq!(s.num_platforms, 15);
    assert_eq!(s.platforms.len(), 15);
}

#[test]
fn platform_layout_is_evenly_spaced() {
    let s = init_state(Config::default(), 5, &mut seeded_rng());
    // spacing = (720 - 200) / 5 = 104, first platform at 720 - 40
    let ys: Vec<f32> = s.platforms.iter().map(|p| p.rect.y).collect();
    assert_eq!(ys, vec![680.0, 576.0, 472.0, 368.0, 264.0]);
    for p in &s.platforms {
        assert!((80.0..=150.0).contains(&p.rect.w));
        assert!(p.rect.x >= 0.0 && p.rect.right() <= 1100.0);
        assert_eq!(p.rect.h, PLATFORM_HEIGHT);
    }
    assert!(!s.platforms[0].is_moving());
}

#[test]
fn initial_enemies_patrol_the_lane() {
    let s = init_state(Config::default(), 5, &mut seeded_rng());
    for e in &s.enemies {
        assert_eq!(e.rect.y, 640.0);
        assert!(e.rect.x >= 0.0 && e.rect.right() <= 1100.0);
    }
}

// ── Platform landing ──────────────────────────────────────────────────────────

#[test]
fn falling_player_lands_on_platform() {
    let mut s = make_state();
    s.platforms.push(Platform::fixed(100.0, 400.0, 120.0));
    s.player.rect = Rect::new(120.0, 400.0 - 64.0 + 5.0, PLAYER_WIDTH, PLAYER_HEIGHT);
    s.player.vy = 3.0;
    s.player.jumping = true;

    assert!(resolve_platforms(&mut s));
    assert_eq!(s.player.rect.bottom(), 400.0);
    assert_eq!(s.player.vy, 0.0);
    assert!(s.player.on_ground);
    assert!(!s.player.jumping);
}

#[test]
fn rising_player_passes_through_platform() {
    let mut s = make_state();
    s.platforms.push(Platform::fixed(100.0, 400.0, 120.0));
    s.player.rect = Rect::new(120.0, 400.0 - 64.0 + 5.0, PLAYER_WIDTH, PLAYER_HEIGHT);
    s.player.vy = -5.0;

    assert!(!resolve_platforms(&mut s));
    assert_eq!(s.player.rect.y, 341.0);
    assert_eq!(s.player.vy, -5.0);
    assert!(!s.player.on_ground);
}

#[test]
fn landing_picks_lowest_overlapping_platform() {
    let mut s = make_state();
    s.platforms.push(Platform::fixed(100.0, 400.0, 120.0)); // bottom 420
    s.platforms.push(Platform::fixed(100.0, 410.0, 120.0)); // bottom 430
    s.player.rect = Rect::new(120.0, 415.0 - 64.0, PLAYER_WIDTH, PLAYER_HEIGHT);
    s.player.vy = 2.0;

    assert!(resolve_platforms(&mut s));
    assert_eq!(s.player.rect.bottom(), 410.0);
}

#[test]
fn landing_tie_goes_to_first_platform() {
    let platforms = vec![
        Platform::fixed(100.0, 400.0, 120.0),
        Platform::fixed(140.0, 400.0, 120.0),
    ];
    let player = Rect::new(150.0, 350.0, PLAYER_WIDTH, PLAYER_HEIGHT);
    let lowest = lowest_overlapping(&player, &platforms).unwrap();
    assert!(std::ptr::eq(lowest, &platforms[0]));
}

#[test]
fn no_overlap_no_landing() {
    let mut s = make_state();
    s.platforms.push(Platform::fixed(800.0, 400.0, 120.0));
    s.player.vy = 5.0;
    assert!(!resolve_platforms(&mut s));
    assert_eq!(s.player.vy, 5.0);
}

// ── Coins ─────────────────────────────────────────────────────────────────────

#[test]
fn coin_collected_exactly_once() {
    let mut s = make_state();
    let (cx, cy) = player_center(&s);
    s.coins.push(Coin::new(cx, cy, 10));
    s.coins.push(Coin::new(900.0, 500.0, 10)); // out of reach

    assert_eq!(collect_coins(&mut s, &mut seeded_rng()), 10);
    assert_eq!(s.player.score, 10);
    assert_eq!(s.coins.len(), 1);

    assert_eq!(collect_coins(&mut s, &mut seeded_rng()), 0);
    assert_eq!(s.player.score, 10);
}

#[test]
fn crossing_score_interval_spawns_one_enemy() {
    let mut s = make_state();
    s.player.score = 495;
    let (cx, cy) = player_center(&s);
    s.coins.push(Coin::new(cx, cy, 10));

    collect_coins(&mut s, &mut seeded_rng());
    assert_eq!(s.player.score, 505);
    assert_eq!(s.enemies.len(), 1);
}

#[test]
fn score_within_interval_spawns_nothing() {
    let mut s = make_state();
    s.player.score = 10;
    let (cx, cy) = player_center(&s);
    s.coins.push(Coin::new(cx, cy, 10));

    collect_coins(&mut s, &mut seeded_rng());
    assert_eq!(s.player.score, 20);
    assert!(s.enemies.is_empty());
}

#[test]
fn enemy_spawn_respects_cap() {
    let mut s = make_state();
    for i in 0..10 {
        s.enemies.push(Enemy::new(i as f32 * 50.0, 640.0, 2.0));
    }
    s.player.score = 495;
    let (cx, cy) = player_center(&s);
    s.coins.push(Coin::new(cx, cy, 10));

    collect_coins(&mut s, &mut seeded_rng());
    assert_eq!(s.player.score, 505);
    assert_eq!(s.enemies.len(), 10);
}

#[test]
fn score_interval_boundaries() {
    assert!(crosses_score_interval(495, 505, 500));
    assert!(crosses_score_interval(490, 500, 500));
    assert!(!crosses_score_interval(500, 510, 500));
    assert!(!crosses_score_interval(10, 20, 500));
    assert!(!crosses_score_interval(10, 20, 0));
}

// ── Power-ups ─────────────────────────────────────────────────────────────────

#[test]
fn powerup_heals_up_to_cap() {
    let mut s = make_state();
    s.player.health = 70;
    let (cx, cy) = player_center(&s);
    s.powerups.push(Powerup::new(cx, cy));

    assert_eq!(collect_powerups(&mut s), 1);
    assert_eq!(s.player.health, 100);
    assert!(s.powerups.is_empty());
}

#[test]
fn powerup_heals_partially_below_cap() {
    let mut s = make_state();
    s.player.health = 40;
    let (cx, cy) = player_center(&s);
    s.powerups.push(Powerup::new(cx, cy));

    collect_powerups(&mut s);
    assert_eq!(s.player.health, 70);
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[test]
fn enemy_contact_can_end_the_game() {
    let mut s = make_state();
    s.player.health = 10;
    s.enemies.push(Enemy::new(s.player.rect.x, s.player.rect.y + 10.0, 2.0));

    assert!(resolve_enemies(&mut s));
    assert_eq!(s.player.health, 0);
    assert_eq!(s.status, GameStatus::GameOver);
}

#[test]
fn several_enemies_damage_once_per_frame() {
    let mut s = make_state();
    s.player.health = 50;
    s.enemies.push(Enemy::new(s.player.rect.x, s.player.rect.y, 2.0));
    s.enemies.push(Enemy::new(s.player.rect.x + 4.0, s.player.rect.y + 20.0, 2.0));

    resolve_enemies(&mut s);
    assert_eq!(s.player.health, 40);
    assert_eq!(s.status, GameStatus::Playing);
}

#[test]
fn enemy_far_away_does_no_harm() {
    let mut s = make_state();
    s.enemies.push(Enemy::new(900.0, 640.0, 2.0));
    assert!(!resolve_enemies(&mut s));
    assert_eq!(s.player.health, 100);
}

// ── Spawner ───────────────────────────────────────────────────────────────────

#[test]
fn coin_waits_for_spawn_interval() {
    let mut s = make_state();
    s.clock_ms = 3000;
    assert_eq!(spawn_coin(&mut s, &mut seeded_rng()), Spawned::default());
    assert!(s.coins.is_empty());

    s.clock_ms = 3001;
    assert!(spawn_coin(&mut s, &mut seeded_rng()).coin);
    assert_eq!(s.coins.len(), 1);
    assert_eq!(s.spawner.last_coin_ms, 3001);

    // Timer restarted
    s.clock_ms = 4000;
    assert!(!spawn_coin(&mut s, &mut seeded_rng()).coin);
    assert_eq!(s.coins.len(), 1);
}

#[test]
fn coins_spawn_in_lower_half() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    for i in 1..=50 {
        s.clock_ms = i * 3001;
        spawn_coin(&mut s, &mut rng);
    }
    assert_eq!(s.coins.len(), 50);
    for c in &s.coins {
        let cy = c.rect.y + c.rect.h / 2.0;
        assert!((360.0..=620.0).contains(&cy));
        assert!(c.rect.x >= 0.0 && c.rect.right() <= 1100.0);
        assert_eq!(c.value, 10);
    }
}

#[test]
fn powerup_rides_along_with_coin() {
    let config = Config { powerup_chance: 1.0, ..Config::default() };
    let mut s = init_state(config, 5, &mut seeded_rng());
    s.clock_ms = 3001;

    let spawned = spawn_coin(&mut s, &mut seeded_rng());
    assert!(spawned.coin && spawned.powerup);
    let coin = &s.coins[0].rect;
    let powerup = &s.powerups[0].rect;
    let dx = (powerup.x + powerup.w / 2.0) - (coin.x + coin.w / 2.0);
    let dy = (powerup.y + powerup.h / 2.0) - (coin.y + coin.h / 2.0);
    assert!((dx - 40.0).abs() < 1e-3);
    assert!(dy.abs() < 1e-3);
}

#[test]
fn powerup_never_spawns_at_zero_chance() {
    let config = Config { powerup_chance: 0.0, ..Config::default() };
    let mut s = init_state(config, 5, &mut seeded_rng());
    let mut rng = seeded_rng();
    for i in 1..=30 {
        s.clock_ms = i * 3001;
        spawn_coin(&mut s, &mut rng);
    }
    assert_eq!(s.coins.len(), 30);
    assert!(s.powerups.is_empty());
}

// ── Input ─────────────────────────────────────────────────────────────────────

#[test]
fn jump_from_ground() {
    let mut s = make_state();
    s.player.on_ground = true;
    apply_input(&mut s, &FrameInput { jump: true, ..Default::default() });
    assert_eq!(s.player.vy, -16.0);
    assert!(s.player.jumping);
    assert!(!s.player.on_ground);
}

#[test]
fn no_jump_in_mid_air() {
    let mut s = make_state();
    s.player.vy = 3.0;
    apply_input(&mut s, &FrameInput { jump: true, ..Default::default() });
    assert_eq!(s.player.vy, 3.0);
    assert!(!s.player.jumping);
}

#[test]
fn steering_sets_velocity_and_facing() {
    let mut s = make_state();
    apply_input(&mut s, &FrameInput { left: true, ..Default::default() });
    assert_eq!(s.player.vx, -8.0);
    assert_eq!(s.player.facing, Facing::Left);

    apply_input(&mut s, &FrameInput { left: true, right: true, jump: false });
    assert_eq!(s.player.vx, 8.0);
    assert_eq!(s.player.facing, Facing::Right);

    apply_input(&mut s, &FrameInput::default());
    assert_eq!(s.player.vx, 0.0);
    assert_eq!(s.player.facing, Facing::Right);
}

#[test]
fn input_ignored_after_game_over() {
    let mut s = make_state();
    s.status = GameStatus::GameOver;
    apply_input(&mut s, &FrameInput { left: true, ..Default::default() });
    assert_eq!(s.player.vx, 0.0);
}

// ── tick ──────────────────────────────────────────────────────────────────────

#[test]
fn tick_advances_clock_and_frame() {
    let mut s = make_state();
    tick(&mut s, 16, &mut seeded_rng());
    tick(&mut s, 16, &mut seeded_rng());
    assert_eq!(s.frame, 2);
    assert_eq!(s.clock_ms, 32);
}

#[test]
fn tick_applies_gravity() {
    let mut s = make_state();
    tick(&mut s, 16, &mut seeded_rng());
    assert!((s.player.vy - 0.8).abs() < 1e-6);
    assert!((s.player.rect.y - 200.8).abs() < 1e-4);
    assert!(!s.player.on_ground);
}

#[test]
fn tick_lands_on_floor() {
    let mut s = make_state();
    s.player.rect.y = 720.0 - 64.0 - 0.5;
    s.player.jumping = true;
    tick(&mut s, 16, &mut seeded_rng());
    assert_eq!(s.player.rect.bottom(), 720.0);
    assert_eq!(s.player.vy, 0.0);
    assert!(s.player.on_ground);
    assert!(!s.player.jumping);
}

#[test]
fn tick_lands_on_platform() {
    let mut s = make_state();
    s.platforms.push(Platform::fixed(250.0, 400.0, 150.0));
    s.player.rect.y = 400.0 - 64.0 - 1.0;
    s.player.vy = 4.0;
    tick(&mut s, 16, &mut seeded_rng());
    assert_eq!(s.player.rect.bottom(), 400.0);
    assert!(s.player.on_ground);

    // And stays there
    tick(&mut s, 16, &mut seeded_rng());
    assert_eq!(s.player.rect.bottom(), 400.0);
    assert!(s.player.on_ground);
}

#[test]
fn standing_on_platform_animates_idle() {
    let mut s = make_state();
    s.platforms.push(Platform::fixed(250.0, 400.0, 150.0));
    s.player.rect.y = 400.0 - 64.0;
    let mut rng = seeded_rng();
    for _ in 0..30 {
        tick(&mut s, 16, &mut rng);
    }
    assert!(s.clock_ms > 100);
    assert!(s.player.on_ground);
    assert_eq!(s.player.animation.kind, AnimationKind::Idle);

    // Walking along the platform runs rather than jumps
    apply_input(&mut s, &FrameInput { left: false, right: true, jump: false });
    for _ in 0..10 {
        tick(&mut s, 16, &mut rng);
    }
    assert!(s.player.on_ground);
    assert_eq!(s.player.animation.kind, AnimationKind::Run);
}

#[test]
fn tick_collects_coin_and_spawns_enemy() {
    let mut s = make_state();
    s.player.score = 495;
    let (cx, cy) = player_center(&s);
    s.coins.push(Coin::new(cx, cy, 10));

    let hits = tick(&mut s, 16, &mut seeded_rng());
    assert_eq!(hits.coins, 10);
    assert_eq!(s.player.score, 505);
    assert_eq!(s.enemies.len(), 1);
    assert!(s.coins.is_empty());
}

#[test]
fn tick_enemy_hit_ends_game() {
    let mut s = make_state();
    s.player.health = 10;
    s.enemies.push(Enemy::new(s.player.rect.x, s.player.rect.y + 10.0, 2.0));

    let hits = tick(&mut s, 16, &mut seeded_rng());
    assert!(hits.enemy_hit);
    assert_eq!(s.player.health, 0);
    assert_eq!(s.status, GameStatus::GameOver);
}

#[test]
fn tick_is_inert_after_game_over() {
    let mut s = make_state();
    s.status = GameStatus::GameOver;
    let before_y = s.player.rect.y;
    tick(&mut s, 16, &mut seeded_rng());
    assert_eq!(s.frame, 0);
    assert_eq!(s.clock_ms, 0);
    assert_eq!(s.player.rect.y, before_y);
}

#[test]
fn invariants_hold_over_long_random_play() {
    let mut s = init_state(Config::default(), 8, &mut seeded_rng());
    let mut sim_rng = StdRng::seed_from_u64(7);
    let mut input_rng = StdRng::seed_from_u64(99);
    let mut last_score = 0;

    for _ in 0..5000 {
        let input = FrameInput {
            left: input_rng.gen_bool(0.3),
            right: input_rng.gen_bool(0.3),
            jump: input_rng.gen_bool(0.05),
        };
        apply_input(&mut s, &input);
        tick(&mut s, 16, &mut sim_rng);

        let p = &s.player;
        assert!(p.health <= 100);
        assert!(p.score >= last_score);
        last_score = p.score;
        assert!(p.rect.left() >= 0.0 && p.rect.right() <= 1100.0);
        assert!(p.rect.top() >= 0.0 && p.rect.bottom() <= 720.0);
        assert!(s.enemies.len() <= 10);
        assert!(s.platforms.len() <= 15);

        if s.status == GameStatus::GameOver {
            assert_eq!(p.health, 0);
            break;
        }
    }
}

// ── Session lifecycle ─────────────────────────────────────────────────────────

#[test]
fn restart_only_from_game_over() {
    let mut s = make_state();
    s.player.score = 120;
    assert!(!restart(&mut s, &mut seeded_rng()));
    assert_eq!(s.player.score, 120);
}

#[test]
fn restart_rebuilds_session() {
    let mut s = init_state(Config::default(), 7, &mut seeded_rng());
    for _ in 0..300 {
        tick(&mut s, 16, &mut seeded_rng());
    }
    s.player.score = 300;
    s.player.health = 0;
    s.status = GameStatus::GameOver;

    assert!(restart(&mut s, &mut seeded_rng()));
    assert_eq!(s.status, GameStatus::Playing);
    assert_eq!(s.player.health, 100);
    assert_eq!(s.player.score, 0);
    assert_eq!(s.num_platforms, 7);
    assert_eq!(s.platforms.len(), 7);
    assert_eq!(s.enemies.len(), 3);
    assert!(s.coins.is_empty());
    assert_eq!(s.clock_ms, 0);
    assert_eq!(s.spawner, SpawnTimer::default());
}

#[test]
fn reset_keeps_custom_config() {
    let config = Config { initial_enemies: 1, coin_value: 25, ..Config::default() };
    let mut s = init_state(config, 4, &mut seeded_rng());
    reset(&mut s, &mut seeded_rng());
    assert_eq!(s.enemies.len(), 1);
    assert_eq!(s.config.coin_value, 25);
    assert_eq!(s.num_platforms, 4);
}

// ── Render hand-off ───────────────────────────────────────────────────────────

#[test]
fn hud_reports_score_and_health() {
    let mut s = make_state();
    s.player.score = 40;
    s.player.health = 60;
    assert_eq!(hud(&s), Hud { score: 40, health: 60, max_health: 100 });
}

#[test]
fn sprites_cover_every_entity_player_last() {
    let mut s = init_state(Config::default(), 5, &mut seeded_rng());
    s.coins.push(Coin::new(500.0, 500.0, 10));
    s.powerups.push(Powerup::new(540.0, 500.0));

    let all = sprites(&s);
    assert_eq!(all.len(), 5 + 1 + 1 + 3 + 1);
    let last = all.last().unwrap();
    assert_eq!(last.kind, SpriteKind::Player);
    assert_eq!(last.rect, s.player.rect);
    assert!(!last.flipped);
    assert_eq!(all.iter().filter(|sp| sp.kind == SpriteKind::Platform).count(), 5);
    assert!(all
        .iter()
        .filter(|sp| sp.kind == SpriteKind::Coin)
        .all(|sp| sp.tint == Tint::Yellow));
}
