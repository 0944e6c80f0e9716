use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::atomic::AtomicF32;
use crate::config::VoiceConfig;
use crate::effects::{SendChain, SendProcessor};
use crate::oscillator::{Oscillator, OscillatorParams};

/// The two synthesizer slots. The treble voice carries the upper note of
/// each pitch pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VoiceId {
    Treble,
    Bass,
}

impl VoiceId {
    pub const ALL: [VoiceId; 2] = [VoiceId::Treble, VoiceId::Bass];

    pub fn index(self) -> usize {
        match self {
            VoiceId::Treble => 0,
            VoiceId::Bass => 1,
        }
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceId::Treble => write!(f, "treble"),
            VoiceId::Bass => write!(f, "bass"),
        }
    }
}

/// Control-thread handle to a voice. Cloning shares the same parameters.
#[derive(Clone)]
pub struct VoiceControl {
    id: VoiceId,
    oscillator: Arc<OscillatorParams>,
    level: Arc<AtomicF32>,
    target: Arc<AtomicF32>,
    sends: SendChain,
}

impl VoiceControl {
    pub fn new(id: VoiceId, config: &VoiceConfig) -> Self {
        let oscillator = OscillatorParams::new(config.waveform, 220.0, 1.0);
        oscillator.set_amplitude_db(config.amplitude_db);
        Self {
            id,
            oscillator: Arc::new(oscillator),
            level: Arc::new(AtomicF32::new(0.0)),
            target: Arc::new(AtomicF32::new(0.0)),
            sends: config.sends,
        }
    }

    pub fn id(&self) -> VoiceId {
        self.id
    }

    pub fn oscillator(&self) -> &OscillatorParams {
        &self.oscillator
    }

    pub fn set_frequency(&self, hz: f32) -> bool {
        self.oscillator.set_frequency(hz)
    }

    /// Post-oscillator gain, clamped to `[0, 1]`. Leaves the oscillator
    /// untouched.
    pub fn set_volume(&self, level: f32) -> bool {
        if level.is_nan() {
            debug!("rejected {} volume {level}", self.id);
            return false;
        }
        self.level.store(level.clamp(0.0, 1.0));
        true
    }

    pub fn volume(&self) -> f32 {
        self.level.load()
    }

    pub fn set_target_level(&self, level: f32) {
        if !level.is_nan() {
            self.target.store(level.clamp(0.0, 1.0));
        }
    }

    pub fn target_level(&self) -> f32 {
        self.target.load()
    }

    /// Builds the render half of this voice for a stream at `sample_rate`.
    pub fn build_voice(&self, sample_rate: f32) -> Voice {
        Voice {
            oscillator: Oscillator::new(self.oscillator.clone()),
            level: self.level.clone(),
            sends: SendProcessor::new(self.sends, sample_rate),
        }
    }
}

/// Render half of a voice: oscillator, gain, then its send chain.
pub struct Voice {
    oscillator: Oscillator,
    level: Arc<AtomicF32>,
    sends: SendProcessor,
}

impl Voice {
    pub fn next_sample(&mut self) -> f32 {
        let dry = self.oscillator.next_sample() * self.level.load();
        self.sends.process(dry)
    }

    pub fn render(&mut self, out: &mut [f32]) {
        for slot in out.iter_mut() {
            *slot = self.next_sample();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SynthConfig;

    #[test]
    fn volume_is_clamped() {
        let voice = VoiceControl::new(VoiceId::Treble, &SynthConfig::default().treble);
        assert!(voice.set_volume(1.7));
        assert_eq!(voice.volume(), 1.0);
        assert!(voice.set_volume(-0.2));
        assert_eq!(voice.volume(), 0.0);
        assert!(!voice.set_volume(f32::NAN));
        assert_eq!(voice.volume(), 0.0);
    }

    #[test]
    fn volume_does_not_touch_oscillator() {
        let voice = VoiceControl::new(VoiceId::Bass, &SynthConfig::default().bass);
        let amplitude = voice.oscillator().amplitude();
        voice.set_volume(0.4);
        assert_eq!(voice.oscillator().amplitude(), amplitude);
    }

    #[test]
    fn silent_voice_renders_silence() {
        let voice = VoiceControl::new(VoiceId::Treble, &SynthConfig::default().treble);
        voice.oscillator().set_sample_rate(8_000.0);
        let mut render = voice.build_voice(8_000.0);
        let mut out = vec![1.0; 256];
        render.render(&mut out);
        assert!(out.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn render_half_follows_control_writes() {
        let voice = VoiceControl::new(VoiceId::Treble, &SynthConfig::default().treble);
        voice.oscillator().set_sample_rate(8_000.0);
        let mut render = voice.build_voice(8_000.0);
        voice.set_volume(1.0);
        let mut out = vec![0.0; 8_000];
        render.render(&mut out);
        assert!(out.iter().any(|s| s.abs() > 0.0));
    }
}
