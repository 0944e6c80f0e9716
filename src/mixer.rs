/// Summing point where every voice's send chain meets the output.
pub struct MixBus {
    pub master: f32,
}

impl MixBus {
    pub fn new(master: f32) -> Self {
        Self {
            master: master.clamp(0.0, 1.0),
        }
    }

    pub fn mix(&self, inputs: &[f32]) -> f32 {
        inputs.iter().sum::<f32>() * self.master
    }
}
