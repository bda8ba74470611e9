//! Sound effects and background music
//!
//! All tones are synthesized at startup; there are no asset files. Every
//! failure path is soft: if no output device exists the player runs
//! silently, and a cue that fails to play is dropped.

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};

const SAMPLE_RATE: u32 = 44_100;

const MUSIC_VOLUME: f32 = 0.3;
const EAT_NORMAL_VOLUME: f32 = 0.6;
const EAT_SPECIAL_VOLUME: f32 = 0.8;
const GAME_OVER_VOLUME: f32 = 1.0;

/// Discrete audio events emitted by the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    AteNormal,
    AteSpecial,
    GameOver,
}

struct Output {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

/// Plays cues and the looping background music
///
/// `new(true)` or a missing output device yields a player whose methods
/// are all no-ops.
pub struct AudioPlayer {
    output: Option<Output>,
    music: Option<Sink>,
    music_on: bool,
}

impl AudioPlayer {
    pub fn new(muted: bool) -> Self {
        let output = if muted {
            None
        } else {
            OutputStream::try_default()
                .ok()
                .map(|(stream, handle)| Output {
                    _stream: stream,
                    handle,
                })
        };
        Self {
            output,
            music: None,
            music_on: false,
        }
    }

    /// Fire-and-forget playback of one cue
    pub fn play(&self, cue: Cue) {
        let Some(output) = &self.output else { return };
        let (samples, volume) = match cue {
            Cue::AteNormal => (eat_normal_samples(), EAT_NORMAL_VOLUME),
            Cue::AteSpecial => (eat_special_samples(), EAT_SPECIAL_VOLUME),
            Cue::GameOver => (game_over_samples(), GAME_OVER_VOLUME),
        };
        if let Ok(sink) = Sink::try_new(&output.handle) {
            sink.set_volume(volume);
            sink.append(SamplesBuffer::new(1, SAMPLE_RATE, samples));
            sink.detach();
        }
    }

    pub fn music_enabled(&self) -> bool {
        self.music_on
    }

    /// Flip the music preference, starting or stopping playback now
    pub fn toggle_music(&mut self) {
        if self.music_on {
            self.music_on = false;
            self.stop_music();
        } else {
            self.music_on = true;
            self.start_music();
        }
    }

    /// Begin looping music if the preference is on and nothing plays yet
    pub fn start_music(&mut self) {
        if !self.music_on || self.music.is_some() {
            return;
        }
        let Some(output) = &self.output else { return };
        if let Ok(sink) = Sink::try_new(&output.handle) {
            sink.set_volume(MUSIC_VOLUME);
            sink.append(SamplesBuffer::new(1, SAMPLE_RATE, music_loop_samples()).repeat_infinite());
            self.music = Some(sink);
        }
    }

    /// Stop playback without changing the music preference
    pub fn stop_music(&mut self) {
        if let Some(sink) = self.music.take() {
            sink.stop();
        }
    }
}

/// A sine tone with a linear fade-out
fn sine_burst(freq: f32, duration: f32, amplitude: f32) -> Vec<f32> {
    let count = (SAMPLE_RATE as f32 * duration) as usize;
    (0..count)
        .map(|n| {
            let t = n as f32 / SAMPLE_RATE as f32;
            let fade = 1.0 - t / duration;
            (std::f32::consts::TAU * freq * t).sin() * amplitude * fade
        })
        .collect()
}

/// A sine sweep from `start_hz` to `end_hz`, phase-continuous
fn sweep_burst(start_hz: f32, end_hz: f32, duration: f32, amplitude: f32) -> Vec<f32> {
    let count = (SAMPLE_RATE as f32 * duration) as usize;
    let mut phase = 0.0f32;
    (0..count)
        .map(|n| {
            let t = n as f32 / count as f32;
            let freq = start_hz + (end_hz - start_hz) * t;
            phase += std::f32::consts::TAU * freq / SAMPLE_RATE as f32;
            phase.sin() * amplitude * (1.0 - t)
        })
        .collect()
}

fn eat_normal_samples() -> Vec<f32> {
    sine_burst(880.0, 0.08, 0.3)
}

fn eat_special_samples() -> Vec<f32> {
    let mut samples = sine_burst(660.0, 0.09, 0.3);
    samples.extend(sine_burst(990.0, 0.12, 0.3));
    samples
}

fn game_over_samples() -> Vec<f32> {
    sweep_burst(220.0, 70.0, 0.4, 0.35)
}

fn music_loop_samples() -> Vec<f32> {
    // C major arpeggio, two octaves up and back down
    const NOTES: [f32; 6] = [261.63, 329.63, 392.0, 523.25, 392.0, 329.63];
    let mut samples = Vec::new();
    for freq in NOTES {
        samples.extend(sine_burst(freq, 0.22, 0.2));
    }
    samples
}
