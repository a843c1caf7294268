/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::physics::Motion;

const APP_DIR: &str = "ledgebound";

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub tuning: Tuning,
    pub gamepad: GamepadConfig,
    pub tick_rate_ms: u64,
    pub maps_file: PathBuf,
    pub log_file: PathBuf,
    /// Problems found while loading, reported once logging is up.
    pub notices: Vec<String>,
}

/// Gameplay constants the simulation reads every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tuning {
    pub gravity: f32,
    pub jump_force: f32,
    pub player_speed: f32,
    pub projectile_speed: f32,
    pub projectile_damage: i32,
    pub invincibility_ms: u64,
    pub knockback: f32,
}

impl Tuning {
    pub fn motion(&self) -> Motion {
        Motion { gravity: self.gravity, jump_force: self.jump_force, speed: self.player_speed }
    }
}

impl Default for Tuning {
    fn default() -> Self {
        TomlConfig::default().tuning()
    }
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub fire: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    combat: TomlCombat,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_jump_force")]
    jump_force: f32,
    #[serde(default = "default_player_speed")]
    player_speed: f32,
}

#[derive(Deserialize, Debug)]
struct TomlCombat {
    #[serde(default = "default_projectile_speed")]
    projectile_speed: f32,
    #[serde(default = "default_projectile_damage")]
    projectile_damage: i32,
    #[serde(default = "default_invincibility")]
    invincibility_ms: u64,
    #[serde(default = "default_knockback")]
    knockback: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_jump")]
    jump: Vec<String>,
    #[serde(default = "default_fire")]
    fire: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_maps_file")]
    maps_file: String,
    #[serde(default = "default_log_file")]
    log_file: String,
}

// ── Defaults ──

fn default_gravity() -> f32 { 0.5 }
fn default_jump_force() -> f32 { -12.0 }
fn default_player_speed() -> f32 { 5.0 }
fn default_projectile_speed() -> f32 { 10.0 }
fn default_projectile_damage() -> i32 { 20 }
fn default_invincibility() -> u64 { 1000 }
fn default_knockback() -> f32 { 50.0 }

fn default_jump() -> Vec<String> { vec!["A".into(), "B".into()] }
fn default_fire() -> Vec<String> { vec!["X".into(), "Y".into(), "R1".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }

fn default_tick_rate() -> u64 { 16 }    // ~60 ticks/s, one per display refresh
fn default_maps_file() -> String { "maps.json".into() }
fn default_log_file() -> String { "ledgebound.log".into() }

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            gravity: default_gravity(),
            jump_force: default_jump_force(),
            player_speed: default_player_speed(),
        }
    }
}

impl Default for TomlCombat {
    fn default() -> Self {
        TomlCombat {
            projectile_speed: default_projectile_speed(),
            projectile_damage: default_projectile_damage(),
            invincibility_ms: default_invincibility(),
            knockback: default_knockback(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_jump(),
            fire: default_fire(),
            confirm: default_confirm(),
            cancel: default_cancel(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            tick_rate_ms: default_tick_rate(),
            maps_file: default_maps_file(),
            log_file: default_log_file(),
        }
    }
}

impl TomlConfig {
    fn tuning(&self) -> Tuning {
        Tuning {
            gravity: self.physics.gravity,
            jump_force: self.physics.jump_force,
            player_speed: self.physics.player_speed,
            projectile_speed: self.combat.projectile_speed,
            projectile_damage: self.combat.projectile_damage,
            invincibility_ms: self.combat.invincibility_ms,
            knockback: self.combat.knockback,
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: exe directory, CWD, `~/.local/share/ledgebound`,
    /// `/usr/share/ledgebound`. Missing file or keys fall back to defaults.
    pub fn load() -> Self {
        Self::load_from(&candidate_dirs())
    }

    pub fn load_from(search_dirs: &[PathBuf]) -> Self {
        let mut notices = vec![];
        let toml_cfg = load_toml(search_dirs, &mut notices);

        let maps_file = resolve_file(search_dirs, &toml_cfg.general.maps_file);
        let log_file = PathBuf::from(&toml_cfg.general.log_file);

        GameConfig {
            tuning: toml_cfg.tuning(),
            gamepad: GamepadConfig {
                jump: toml_cfg.gamepad.jump,
                fire: toml_cfg.gamepad.fire,
                confirm: toml_cfg.gamepad.confirm,
                cancel: toml_cfg.gamepad.cancel,
            },
            tick_rate_ms: toml_cfg.general.tick_rate_ms.max(1),
            maps_file,
            log_file,
            notices,
        }
    }
}

/// Absolute paths are taken as-is; relative ones are looked up in the
/// search dirs and default to CWD-relative when nothing exists yet.
fn resolve_file(search_dirs: &[PathBuf], name: &str) -> PathBuf {
    let path = Path::new(name);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    search_dirs.iter()
        .map(|d| d.join(name))
        .find(|p| p.is_file())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.contains(&cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share").join(APP_DIR);
        if xdg.is_dir() && !dirs.contains(&xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share").join(APP_DIR);
    if sys.is_dir() && !dirs.contains(&sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// First `config.toml` found wins. A broken file means defaults, not a crash.
fn load_toml(search_dirs: &[PathBuf], notices: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    notices.push(format!("{}: parse error, using defaults: {e}", path.display()));
                    return TomlConfig::default();
                }
            },
            Err(e) => notices.push(format!("could not read {}: {e}", path.display())),
        }
    }
    TomlConfig::default()
}
