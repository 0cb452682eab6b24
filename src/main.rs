mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use platformer::compute::{apply_input, init_state, restart, tick, FrameInput};
use platformer::config::{parse_platform_count, Config};
use platformer::entities::{GameState, GameStatus};

use display::Viewport;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 8 frames (≈133 ms at
/// 60 FPS) is always refreshed before expiry.
const HOLD_WINDOW: u64 = 8;

/// Longest input accepted at the platform-count prompt.
const PROMPT_MAX_LEN: usize = 6;

#[derive(Debug, Parser)]
#[command(name = "platformer", about = "Jump between platforms, grab coins, dodge enemies")]
struct Args {
    /// Number of platforms; skips the start-up prompt when given.
    #[arg(long, value_name = "COUNT")]
    platforms: Option<String>,
    /// JSON file overriding any of the default tuning values.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Seed for level layout and spawns.
    #[arg(long)]
    seed: Option<u64>,
    /// Where log output goes. Defaults to platformer.log in the temp dir.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

// ── Logging ───────────────────────────────────────────────────────────────────

/// Log to a file: the terminal is busy with the alternate screen.
fn init_logging(path: Option<PathBuf>) -> Result<()> {
    let path = path.unwrap_or_else(|| std::env::temp_dir().join("platformer.log"));
    let file = File::create(&path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

// ── Platform-count prompt ─────────────────────────────────────────────────────

/// `None` when the user quits from the prompt.
fn prompt_platform_count<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: &Config,
) -> std::io::Result<Option<usize>> {
    let mut text = String::new();

    loop {
        out.queue(terminal::Clear(terminal::ClearType::All))?;
        let (width, height) = terminal::size()?;
        let cx = width / 2;
        let cy = height / 2;

        let title = "PLATFORMER";
        out.queue(cursor::MoveTo(
            cx.saturating_sub(title.chars().count() as u16 / 2),
            cy.saturating_sub(4),
        ))?;
        out.queue(style::SetForegroundColor(Color::Cyan))?;
        out.queue(Print(title))?;

        let question = format!("Enter number of platforms (max {}):", config.max_platforms);
        let left = cx.saturating_sub(question.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(left, cy.saturating_sub(2)))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print(&question))?;

        out.queue(cursor::MoveTo(left, cy))?;
        out.queue(style::SetForegroundColor(Color::Blue))?;
        out.queue(Print(format!("[ {:<width$} ]", text, width = PROMPT_MAX_LEN)))?;

        out.queue(cursor::MoveTo(left, cy + 2))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print("ENTER : Start   ESC : Quit"))?;

        out.queue(style::ResetColor)?;
        out.flush()?;

        // Block until the next key
        let (code, kind, modifiers) = match rx.recv() {
            Ok(Event::Key(KeyEvent { code, kind, modifiers, .. })) => (code, kind, modifiers),
            Ok(_) => continue,
            Err(_) => return Ok(None), // input thread gone
        };
        if kind == KeyEventKind::Release {
            continue;
        }
        match code {
            KeyCode::Enter => return Ok(Some(parse_platform_count(&text, config))),
            KeyCode::Esc => return Ok(None),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Ok(None),
            KeyCode::Backspace => {
                text.pop();
            }
            KeyCode::Char(c) if text.len() < PROMPT_MAX_LEN => text.push(c),
            _ => {}
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Runs until the player quits.
///
/// Input model: instead of acting on each key event individually, we maintain
/// a `key_frame` map that records the frame number of the last press/repeat
/// event for every key.  Left/right movement follows whichever arrows are
/// still "fresh" (within `HOLD_WINDOW` frames); jump fires only on a fresh
/// press of Space, never on its auto-repeat.
///
/// Works on two classes of terminal:
/// * **Keyboard-enhancement capable** (Ghostty, kitty, etc.): proper
///   `Press` / `Repeat` / `Release` events → keys are removed on release.
/// * **Classic terminals**: only `Press` events (OS key-repeat shows as
///   repeated `Press`).  Keys expire naturally after `HOLD_WINDOW` frames of
///   silence.
fn game_loop<W: Write>(
    out: &mut W,
    state: &mut GameState,
    rx: &mpsc::Receiver<Event>,
    rng: &mut StdRng,
) -> std::io::Result<()> {
    let frame_ms = state.config.frame_ms();
    let frame_len = Duration::from_millis(frame_ms);

    // Maps each held key → the frame it was last seen (press or repeat).
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;
        let mut input = FrameInput::default();

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    // Classic terminals report auto-repeat as Press too.
                    let repeat = is_held(&key_frame, &code, frame);
                    key_frame.insert(code, frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(());
                        }
                        KeyCode::Char(' ') | KeyCode::Up if !repeat => input.jump = true,
                        KeyCode::Char('r') | KeyCode::Char('R')
                            if state.status == GameStatus::GameOver =>
                        {
                            restart(state, rng);
                            key_frame.clear();
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        // ── Simulate ──────────────────────────────────────────────────────────
        input.left = is_held(&key_frame, &KeyCode::Left, frame)
            || is_held(&key_frame, &KeyCode::Char('a'), frame);
        input.right = is_held(&key_frame, &KeyCode::Right, frame)
            || is_held(&key_frame, &KeyCode::Char('d'), frame);

        apply_input(state, &input);
        tick(state, frame_ms, rng);

        let (cols, rows) = terminal::size()?;
        display::render(out, state, &Viewport::new(cols, rows, state))?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_len {
            thread::sleep(frame_len - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.clone())?;

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    log::info!("Starting (seed {:?})", args.seed);

    let mut out = BufWriter::new(stdout());

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut out, &rx, config, args.platforms.as_deref(), &mut rng);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result?;
    log::info!("Exited cleanly");
    Ok(())
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: Config,
    platforms: Option<&str>,
    rng: &mut StdRng,
) -> std::io::Result<()> {
    let num_platforms = match platforms {
        Some(text) => parse_platform_count(text, &config),
        None => match prompt_platform_count(out, rx, &config)? {
            Some(n) => n,
            None => return Ok(()),
        },
    };
    log::info!("Playing with {} platforms", num_platforms);

    let mut state = init_state(config, num_platforms, rng);
    game_loop(out, &mut state, rx, rng)
}
