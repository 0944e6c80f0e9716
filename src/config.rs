//! Compiled-in tuning for the installation.

use crate::effects::{DelaySend, ReverbPreset, ReverbSend, SendChain};
use crate::oscillator::Waveform;

pub const TICK_RATE_HZ: f32 = 60.0;
pub const FALLBACK_SAMPLE_RATE: f32 = 44_100.0;

const FADE_INCREMENT: f32 = 0.01;
const EMISSIVE_INCREMENT: f32 = 0.1;
const MIN_EMISSIVE_INTENSITY: f32 = 1.0;
const MAX_EMISSIVE_INTENSITY: f32 = 10.0;
const BOB_INCREMENT: f32 = 0.001;
const MAX_BOB_OFFSET: f32 = 0.1;

const TREBLE_AMPLITUDE_DB: f32 = -5.0;
const BASS_AMPLITUDE_DB: f32 = -7.0;
const MASTER_LEVEL: f32 = 0.5;

/// Bounds and per-tick increments of every automated parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationConfig {
    pub tick_rate_hz: f32,
    pub fade_increment: f32,
    pub emissive_increment: f32,
    pub min_emissive: f32,
    pub max_emissive: f32,
    pub bob_increment: f32,
    pub bob_amplitude: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: TICK_RATE_HZ,
            fade_increment: FADE_INCREMENT,
            emissive_increment: EMISSIVE_INCREMENT,
            min_emissive: MIN_EMISSIVE_INTENSITY,
            max_emissive: MAX_EMISSIVE_INTENSITY,
            bob_increment: BOB_INCREMENT,
            bob_amplitude: MAX_BOB_OFFSET,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiceConfig {
    pub waveform: Waveform,
    pub amplitude_db: f32,
    pub sends: SendChain,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SynthConfig {
    pub treble: VoiceConfig,
    pub bass: VoiceConfig,
    pub master_level: f32,
}

impl Default for SynthConfig {
    fn default() -> Self {
        let hall = ReverbSend {
            preset: ReverbPreset::MediumHall,
            mix: 1.0,
        };
        Self {
            treble: VoiceConfig {
                waveform: Waveform::Triangle,
                amplitude_db: TREBLE_AMPLITUDE_DB,
                sends: SendChain {
                    delay: DelaySend {
                        time_secs: 0.5,
                        feedback: -0.25,
                        mix: 1.0,
                    },
                    reverb: hall,
                },
            },
            bass: VoiceConfig {
                waveform: Waveform::Triangle,
                amplitude_db: BASS_AMPLITUDE_DB,
                sends: SendChain {
                    delay: DelaySend {
                        time_secs: 0.5,
                        feedback: -0.25,
                        mix: 0.5,
                    },
                    reverb: hall,
                },
            },
            master_level: MASTER_LEVEL,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SessionConfig {
    pub animation: AnimationConfig,
    pub synth: SynthConfig,
    /// Fixed seed for pitch and tint picks; `None` seeds from entropy.
    pub seed: Option<u64>,
}
