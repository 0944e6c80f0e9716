use rand::Rng;
use rand::seq::SliceRandom;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tint {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

const fn tint(r: u8, g: u8, b: u8) -> Tint {
    Tint { r, g, b }
}

/// Blues, teals and a few violets.
pub const TINTS: [Tint; 13] = [
    tint(60, 199, 212),
    tint(35, 78, 182),
    tint(84, 184, 193),
    tint(24, 140, 191),
    tint(76, 155, 160),
    tint(102, 185, 199),
    tint(28, 156, 161),
    tint(21, 149, 167),
    tint(20, 137, 200),
    tint(19, 127, 184),
    tint(118, 29, 132),
    tint(170, 32, 125),
    tint(97, 72, 149),
];

pub fn random_tint<R: Rng + ?Sized>(rng: &mut R) -> Tint {
    TINTS.choose(rng).copied().unwrap_or(TINTS[1])
}

impl Tint {
    /// Channels in `[0, 1]`.
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}
