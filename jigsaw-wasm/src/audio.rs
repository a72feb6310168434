//! Synthesised cue sounds.

use jigsaw_core::Feedback;
use wasm_bindgen::JsValue;
use web_sys::{AudioContext, OscillatorType};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wave {
    Sine,
    Triangle,
    Square,
}

impl From<Wave> for OscillatorType {
    fn from(w: Wave) -> Self {
        match w {
            Wave::Sine => OscillatorType::Sine,
            Wave::Triangle => OscillatorType::Triangle,
            Wave::Square => OscillatorType::Square,
        }
    }
}

/// Pitch change within a tone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Glide {
    None,
    /// Jump to `freq` at `at` seconds after the tone starts.
    Step { at: f64, freq: f32 },
    /// Exponential slide to `freq`, arriving when the tone stops.
    Ramp { freq: f32 },
}

/// One oscillator note, times in seconds relative to when the cue fires.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    pub wave: Wave,
    pub start: f64,
    pub stop: f64,
    pub freq: f32,
    pub glide: Glide,
    pub gain: f32,
    /// Fade the gain to this level by `stop`.
    pub fade_to: Option<f32>,
}

const WIN_ARPEGGIO: [f32; 4] = [523.0, 659.0, 783.0, 1046.0];

pub fn tones(feedback: Feedback) -> Vec<Tone> {
    match feedback {
        Feedback::Pick => vec![Tone {
            wave: Wave::Sine,
            start: 0.0,
            stop: 0.1,
            freq: 600.0,
            glide: Glide::Ramp { freq: 900.0 },
            gain: 0.08,
            fade_to: None,
        }],
        Feedback::Success => vec![Tone {
            wave: Wave::Triangle,
            start: 0.0,
            stop: 0.25,
            freq: 523.25,
            glide: Glide::Step {
                at: 0.1,
                freq: 659.25,
            },
            gain: 0.1,
            fade_to: None,
        }],
        Feedback::Error => vec![Tone {
            wave: Wave::Square,
            start: 0.0,
            stop: 0.2,
            freq: 100.0,
            glide: Glide::None,
            gain: 0.1,
            fade_to: None,
        }],
        Feedback::Win => WIN_ARPEGGIO
            .iter()
            .enumerate()
            .map(|(i, &freq)| {
                let start = i as f64 * 0.1;
                Tone {
                    wave: Wave::Sine,
                    start,
                    stop: start + 0.6,
                    freq,
                    glide: Glide::None,
                    gain: 0.1,
                    fade_to: Some(0.01),
                }
            })
            .collect(),
    }
}

fn schedule(ctx: &AudioContext, tone: &Tone, now: f64) -> Result<(), JsValue> {
    let osc = ctx.create_oscillator()?;
    let gain = ctx.create_gain()?;
    osc.connect_with_audio_node(&gain)?;
    gain.connect_with_audio_node(&ctx.destination())?;
    osc.set_type(tone.wave.into());

    let (start, stop) = (now + tone.start, now + tone.stop);
    let freq = osc.frequency();
    freq.set_value_at_time(tone.freq, start)?;
    match tone.glide {
        Glide::None => {}
        Glide::Step { at, freq: f } => {
            freq.set_value_at_time(f, start + at)?;
        }
        Glide::Ramp { freq: f } => {
            freq.exponential_ramp_to_value_at_time(f, stop)?;
        }
    }

    gain.gain().set_value_at_time(tone.gain, start)?;
    if let Some(level) = tone.fade_to {
        gain.gain().exponential_ramp_to_value_at_time(level, stop)?;
    }

    osc.start_with_when(start)?;
    osc.stop_with_when(stop)?;
    Ok(())
}

pub fn play(ctx: &AudioContext, feedback: Feedback) -> Result<(), JsValue> {
    let now = ctx.current_time();
    for tone in tones(feedback) {
        schedule(ctx, &tone, now)?;
    }
    Ok(())
}
