/// Most ticks a single frame may produce. Time beyond it is dropped so a
/// long stall does not fast-forward every animation.
const MAX_CATCH_UP: u32 = 4;

/// Turns variable frame times into whole control ticks of a fixed period.
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    period: f32,
    accumulated: f32,
}

impl FrameClock {
    pub fn new(rate_hz: f32) -> Self {
        Self {
            period: 1.0 / rate_hz.max(1.0),
            accumulated: 0.0,
        }
    }

    pub fn advance(&mut self, dt: f32) -> u32 {
        if !dt.is_finite() || dt <= 0.0 {
            return 0;
        }
        self.accumulated += dt;
        let mut due = 0;
        while self.accumulated >= self.period && due < MAX_CATCH_UP {
            self.accumulated -= self.period;
            due += 1;
        }
        if due == MAX_CATCH_UP {
            self.accumulated = self.accumulated.min(self.period);
        }
        due
    }
}
