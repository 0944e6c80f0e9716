use rand::Rng;
use rand::seq::SliceRandom;

/// Perfect fourth above the bass note.
pub const TREBLE_RATIO: f32 = 1.3348;

/// C major across two octaves, in Hz.
pub const C_MAJOR_TWO_OCTAVES: [f32; 14] = [
    65.4, 73.42, 82.41, 87.31, 98.0, 110.0, 123.47, 130.81, 146.83, 164.81, 174.61, 196.0, 220.0,
    246.94,
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PitchPair {
    pub bass: f32,
    pub treble: f32,
}

/// Fixed pitch table the generator draws from.
#[derive(Clone, Copy, Debug)]
pub struct Scale {
    pitches: &'static [f32],
}

impl Scale {
    pub fn c_major() -> Self {
        Self {
            pitches: &C_MAJOR_TWO_OCTAVES,
        }
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::c_major()
    }
}

/// Picks notes from a fixed scale. Holds no memory of earlier picks.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoteEventGenerator {
    scale: Scale,
}

impl NoteEventGenerator {
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        self.scale
            .pitches
            .choose(rng)
            .copied()
            .unwrap_or(C_MAJOR_TWO_OCTAVES[0])
    }

    pub fn derive_pair(&self, pitch: f32) -> PitchPair {
        PitchPair {
            bass: pitch,
            treble: pitch * TREBLE_RATIO,
        }
    }

    pub fn next_pair<R: Rng + ?Sized>(&self, rng: &mut R) -> PitchPair {
        self.derive_pair(self.pick(rng))
    }
}
