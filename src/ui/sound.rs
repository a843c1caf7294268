/// Sound engine: procedural 8-bit style sound effects via rodio.
///
/// All sounds are synthesized into in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

use crate::sim::event::GameEvent;

/// One effect per kind of game event worth hearing.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sfx {
    Jump,
    Shot,
    Hit,
    Kill,
    Coin,
    Hurt,
    Die,
    MapChange,
}

impl Sfx {
    pub const ALL: [Sfx; 8] = [
        Sfx::Jump, Sfx::Shot, Sfx::Hit, Sfx::Kill,
        Sfx::Coin, Sfx::Hurt, Sfx::Die, Sfx::MapChange,
    ];

    pub fn for_event(event: &GameEvent) -> Option<Sfx> {
        match event {
            GameEvent::Jumped => Some(Sfx::Jump),
            GameEvent::ProjectileFired => Some(Sfx::Shot),
            GameEvent::EnemyHit { .. } => Some(Sfx::Hit),
            GameEvent::EnemyKilled { .. } => Some(Sfx::Kill),
            GameEvent::CoinCollected { .. } | GameEvent::ItemCollected => Some(Sfx::Coin),
            GameEvent::PlayerHurt { .. } => Some(Sfx::Hurt),
            GameEvent::PlayerKilled => Some(Sfx::Die),
            GameEvent::MapChanged { .. } => Some(Sfx::MapChange),
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Synthesis: every effect is notes, a sweep, or both
// ════════════════════════════════════════════════════════════

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
mod synth {
    use std::f32::consts::TAU;

    use super::Sfx;

    pub const SAMPLE_RATE: u32 = 22050;

    fn sample_count(duration: f32) -> usize {
        (SAMPLE_RATE as f32 * duration) as usize
    }

    /// A run of notes. `harmonics` are (multiple, weight) pairs on top of the fundamental.
    fn notes(freqs: &[f32], note_dur: f32, harmonics: &[(f32, f32)], volume: f32) -> Vec<f32> {
        let n = sample_count(note_dur);
        let mut samples = Vec::with_capacity(n * freqs.len());
        for &freq in freqs {
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let mut wave = (t * freq * TAU).sin();
                for &(mult, weight) in harmonics {
                    wave += (t * freq * mult * TAU).sin() * weight;
                }
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Linear pitch sweep with optional LCG noise mixed in.
    fn sweep(from: f32, to: f32, duration: f32, noise: f32, volume: f32) -> Vec<f32> {
        let n = sample_count(duration);
        let mut rng: u32 = 12345;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = from + (to - from) * t;
                phase += freq / SAMPLE_RATE as f32 * TAU;
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let white = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let env = (1.0 - t).powf(0.7);
                (phase.sin() * (1.0 - noise) + white * noise) * env * volume
            })
            .collect()
    }

    pub fn render(sfx: Sfx) -> Vec<f32> {
        match sfx {
            Sfx::Jump => sweep(300.0, 700.0, 0.10, 0.0, 0.25),
            Sfx::Shot => sweep(1400.0, 500.0, 0.06, 0.3, 0.2),
            Sfx::Hit => sweep(400.0, 150.0, 0.08, 0.6, 0.3),
            Sfx::Kill => {
                let mut s = sweep(600.0, 80.0, 0.12, 0.7, 0.3);
                s.extend(notes(&[784.0, 1047.0], 0.05, &[(2.0, 0.3)], 0.2));
                s
            }
            Sfx::Coin => notes(&[1047.0, 1319.0, 1568.0], 0.045, &[(3.0, 0.4)], 0.2),
            Sfx::Hurt => sweep(250.0, 120.0, 0.15, 0.4, 0.35),
            Sfx::Die => notes(&[440.0, 370.0, 311.0, 261.0], 0.12, &[], 0.3),
            Sfx::MapChange => notes(&[523.0, 659.0, 784.0], 0.06, &[(2.0, 0.3), (3.0, 0.1)], 0.2),
        }
    }

    /// Wrap mono f32 samples into a 16-bit PCM WAV buffer.
    pub fn make_wav(samples: &[f32]) -> Vec<u8> {
        let channels: u16 = 1;
        let bits: u16 = 16;
        let byte_rate = SAMPLE_RATE * channels as u32 * bits as u32 / 8;
        let block_align = channels * bits / 8;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};
    use tracing::debug;

    use super::{synth, Sfx};

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        buffers: Vec<(Sfx, Arc<Vec<u8>>)>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    debug!(error = %e, "no audio output, sound disabled");
                    return None;
                }
            };
            let buffers = Sfx::ALL.iter()
                .map(|&sfx| (sfx, Arc::new(synth::make_wav(&synth::render(sfx)))))
                .collect();
            Some(SoundEngine { _stream: stream, handle, buffers })
        }

        pub fn play(&self, sfx: Sfx) {
            let Some((_, buf)) = self.buffers.iter().find(|(s, _)| *s == sfx) else { return };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _sfx: Sfx) {}
}
