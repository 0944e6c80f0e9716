use freeverb::Freeverb;

const MAX_DELAY_SECS: f32 = 2.0;
const MAX_FEEDBACK: f32 = 0.95;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DelaySend {
    pub time_secs: f32,
    /// Signed feedback gain; negative values invert each repeat.
    pub feedback: f32,
    /// Wet/dry balance, 0.0 fully dry to 1.0 fully wet.
    pub mix: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReverbPreset {
    SmallRoom,
    MediumHall,
    LargeHall,
    Cathedral,
}

impl ReverbPreset {
    /// Room size, damping and stereo width fed to the reverb.
    fn room(self) -> (f64, f64, f64) {
        match self {
            ReverbPreset::SmallRoom => (0.35, 0.6, 0.6),
            ReverbPreset::MediumHall => (0.7, 0.45, 0.9),
            ReverbPreset::LargeHall => (0.85, 0.35, 1.0),
            ReverbPreset::Cathedral => (0.95, 0.25, 1.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReverbSend {
    pub preset: ReverbPreset,
    pub mix: f32,
}

/// Per-voice insert chain: delay into reverb.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SendChain {
    pub delay: DelaySend,
    pub reverb: ReverbSend,
}

pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
    delay_samples: usize,
    feedback: f32,
    mix: f32,
}

impl DelayLine {
    pub fn new(send: DelaySend, sample_rate: f32) -> Self {
        let time = send.time_secs.clamp(0.0, MAX_DELAY_SECS);
        let delay_samples = ((time * sample_rate).round() as usize).max(1);
        Self {
            buffer: vec![0.0; delay_samples],
            write_pos: 0,
            delay_samples,
            feedback: send.feedback.clamp(-MAX_FEEDBACK, MAX_FEEDBACK),
            mix: send.mix.clamp(0.0, 1.0),
        }
    }

    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.write_pos];
        self.buffer[self.write_pos] = input + delayed * self.feedback;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
        input * (1.0 - self.mix) + delayed * self.mix
    }
}

/// Render-side state of a [`SendChain`]. All buffers are allocated here so
/// `process` never allocates.
pub struct SendProcessor {
    delay: DelayLine,
    reverb: Freeverb,
    reverb_mix: f32,
}

impl SendProcessor {
    pub fn new(chain: SendChain, sample_rate: f32) -> Self {
        let (room_size, dampening, width) = chain.reverb.preset.room();
        let mut reverb = Freeverb::new(sample_rate.max(1.0) as usize);
        reverb.set_room_size(room_size);
        reverb.set_dampening(dampening);
        reverb.set_width(width);
        reverb.set_wet(1.0);
        reverb.set_dry(0.0);
        Self {
            delay: DelayLine::new(chain.delay, sample_rate),
            reverb,
            reverb_mix: chain.reverb.mix.clamp(0.0, 1.0),
        }
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.delay.process(input);
        let (left, right) = self.reverb.tick((delayed as f64, delayed as f64));
        let wet = (0.5 * (left + right)) as f32;
        delayed * (1.0 - self.reverb_mix) + wet * self.reverb_mix
    }
}
