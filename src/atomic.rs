use std::sync::atomic::{AtomicU32, Ordering};

/// An `f32` shared between the control thread and the audio callback.
///
/// Stores the float's bit pattern so loads and stores are single-word and
/// never tear.
#[derive(Debug, Default)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_exact_bit_patterns() {
        let value = AtomicF32::new(0.25);
        assert_eq!(value.load(), 0.25);
        value.store(-0.0);
        assert!(value.load().is_sign_negative());
        value.store(246.94);
        assert_eq!(value.load(), 246.94);
    }
}
