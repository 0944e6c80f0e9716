use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use log::debug;

use crate::atomic::AtomicF32;
use crate::config::FALLBACK_SAMPLE_RATE;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
    Sawtooth,
}

impl Waveform {
    pub fn label(&self) -> &'static str {
        match self {
            Waveform::Sine => "SINE",
            Waveform::Triangle => "TRI",
            Waveform::Square => "SQUARE",
            Waveform::Sawtooth => "SAW",
        }
    }

    /// Evaluates one cycle of the shape at `phase` in `[0, 1)`.
    pub fn sample(&self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (phase * std::f32::consts::TAU).sin(),
            Waveform::Triangle => 4.0 * (phase - 0.5).abs() - 1.0,
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
        }
    }

    fn to_raw(self) -> u8 {
        match self {
            Waveform::Sine => 0,
            Waveform::Triangle => 1,
            Waveform::Square => 2,
            Waveform::Sawtooth => 3,
        }
    }

    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Waveform::Sine,
            1 => Waveform::Triangle,
            2 => Waveform::Square,
            _ => Waveform::Sawtooth,
        }
    }
}

pub fn db_to_gain(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// Oscillator settings written by the control thread and read by the audio
/// callback. Every setter replaces a single word; invalid values are dropped
/// and the previous value stays in effect.
#[derive(Debug)]
pub struct OscillatorParams {
    waveform: AtomicU8,
    frequency: AtomicF32,
    amplitude: AtomicF32,
    sample_rate: AtomicF32,
}

impl OscillatorParams {
    pub fn new(waveform: Waveform, frequency: f32, amplitude: f32) -> Self {
        let params = Self {
            waveform: AtomicU8::new(waveform.to_raw()),
            frequency: AtomicF32::new(440.0),
            amplitude: AtomicF32::new(1.0),
            sample_rate: AtomicF32::new(FALLBACK_SAMPLE_RATE),
        };
        params.set_frequency(frequency);
        params.set_amplitude(amplitude);
        params
    }

    pub fn set_frequency(&self, hz: f32) -> bool {
        if !hz.is_finite() || hz <= 0.0 {
            debug!("rejected oscillator frequency {hz}");
            return false;
        }
        self.frequency.store(hz);
        true
    }

    /// Linear gain applied to every rendered sample.
    pub fn set_amplitude(&self, gain: f32) -> bool {
        if !gain.is_finite() || gain < 0.0 {
            debug!("rejected oscillator amplitude {gain}");
            return false;
        }
        self.amplitude.store(gain);
        true
    }

    pub fn set_amplitude_db(&self, db: f32) -> bool {
        if !db.is_finite() {
            debug!("rejected oscillator amplitude {db} dB");
            return false;
        }
        self.set_amplitude(db_to_gain(db))
    }

    pub fn set_waveform(&self, waveform: Waveform) {
        self.waveform.store(waveform.to_raw(), Ordering::Relaxed);
    }

    pub fn set_sample_rate(&self, hz: f32) -> bool {
        if !hz.is_finite() || hz <= 0.0 {
            debug!("rejected sample rate {hz}");
            return false;
        }
        self.sample_rate.store(hz);
        true
    }

    pub fn frequency(&self) -> f32 {
        self.frequency.load()
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude.load()
    }

    pub fn waveform(&self) -> Waveform {
        Waveform::from_raw(self.waveform.load(Ordering::Relaxed))
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate.load()
    }
}

/// Render-side oscillator. Owns the running phase; everything else is read
/// from the shared params on each sample.
pub struct Oscillator {
    params: Arc<OscillatorParams>,
    phase: f32,
}

impl Oscillator {
    pub fn new(params: Arc<OscillatorParams>) -> Self {
        Self { params, phase: 0.0 }
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn next_sample(&mut self) -> f32 {
        let frequency = self.params.frequency();
        let sample_rate = self.params.sample_rate();
        let value = self.params.waveform().sample(self.phase) * self.params.amplitude();
        self.phase = (self.phase + frequency / sample_rate).fract();
        value
    }

    /// Fills `out` with consecutive samples, one phase step per slot.
    pub fn render(&mut self, out: &mut [f32]) {
        for slot in out.iter_mut() {
            *slot = self.next_sample();
        }
    }
}
