/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossterm::event::{
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use sim::event::GameEvent;
use sim::level::load_or_fallback;
use sim::step;
use sim::world::{Phase, WorldState};
use ui::gamepad::GamepadState;
use ui::input::{InputState, KEYS_CONFIRM, KEYS_FIRE, KEYS_PAUSE, KEYS_QUIT, KEYS_UP};
use ui::renderer::Renderer;
use ui::sound::{Sfx, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();
    init_logging(&config);
    for notice in &config.notices {
        warn!("{notice}");
    }

    let maps = load_or_fallback(&config.maps_file);
    info!(maps = maps.len(), file = %config.maps_file.display(), "maps ready");
    let mut world = WorldState::new(maps, config.tuning);

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    // Key release reporting, where the terminal supports it
    let enhanced = matches!(terminal::supports_keyboard_enhancement(), Ok(true))
        && execute!(
            io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        ).is_ok();
    info!(key_release = enhanced, "keyboard ready");

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config, enhanced);

    if enhanced {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    info!(score = world.score, "session over");
    println!();
    println!("Thanks for playing Ledgebound!");
    println!("Final Score: {}", world.score);
}

/// The renderer owns the terminal, so logs go to a file.
/// `RUST_LOG` overrides the default `info` filter.
fn init_logging(config: &GameConfig) {
    let file = match OpenOptions::new().create(true).append(true).open(&config.log_file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Logging disabled ({}): {e}", config.log_file.display());
            return;
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();
}

/// Edge presses seen between ticks. Frames run faster than ticks, so a
/// press that lands on a non-tick frame would otherwise be lost.
#[derive(Default)]
struct Latched {
    jump: bool,
    fire: bool,
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
    key_release: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = key_release;
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    info!(gamepad = gp.connected, sound = sound.is_some(), "input ready");
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.tick_rate_ms);

    let mut latched = Latched::default();

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_meta(world, &kb, &gp) {
            break;
        }

        let live = world.phase == Phase::Playing && !world.paused;
        if live {
            latched.jump |= kb.any_pressed(KEYS_UP) || gp.jump_pressed();
            latched.fire |= kb.any_pressed(KEYS_FIRE) || gp.fire_pressed();
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
            if live {
                let mut input = kb.frame_input();
                gp.merge_into(&mut input);
                input.jump |= std::mem::take(&mut latched.jump);
                input.fire |= std::mem::take(&mut latched.fire);

                let events = step::step(world, input, session_ms(world, config));
                process_sound_events(sound, &events);
                renderer.note_events(&events);
            }
        }

        renderer.render(world, session_ms(world, config))?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Session clock in ms. Advances with simulation ticks only, so pausing
/// does not eat into invincibility windows.
fn session_ms(world: &WorldState, config: &GameConfig) -> u64 {
    world.tick * config.tick_rate_ms
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let Some(sfx) = sound else { return };
    for event in events {
        if let Some(effect) = Sfx::for_event(event) {
            sfx.play(effect);
        }
    }
}

/// Phase changes and quit handling. Returns true to leave the loop.
fn handle_meta(world: &mut WorldState, kb: &InputState, gp: &GamepadState) -> bool {
    let confirm = kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed();
    let cancel = kb.any_pressed(KEYS_PAUSE) || gp.cancel_pressed();
    let quit = kb.any_pressed(KEYS_QUIT);

    match world.phase {
        Phase::Title => {
            if quit {
                return true;
            }
            if confirm {
                info!("game started");
                world.start();
            }
        }
        Phase::Playing => {
            if cancel {
                world.paused = !world.paused;
                info!(paused = world.paused, "pause toggled");
            } else if world.paused && quit {
                return true;
            }
        }
        Phase::GameOver => {
            if quit {
                return true;
            }
            if confirm {
                info!(score = world.score, "restart");
                world.restart();
            }
        }
    }
    false
}
