use crate::modules::physics::STEP_SECONDS;

/// Most physics steps run for a single frame. A long stall is dropped
/// instead of being replayed.
pub const MAX_STEPS_PER_FRAME: usize = 5;

/// Fixed-step accumulator between the frame clock and the physics clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Runner {
    step: f32,
    accumulator: f32,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(STEP_SECONDS)
    }
}

impl Runner {
    pub fn new(step: f32) -> Self {
        Self { step, accumulator: 0.0 }
    }

    /// Feed one frame's elapsed time, get back how many steps to run.
    pub fn advance(&mut self, frame_seconds: f32) -> usize {
        if !frame_seconds.is_finite() || frame_seconds <= 0.0 {
            return 0;
        }
        self.accumulator += frame_seconds;
        let due = (self.accumulator / self.step).floor() as usize;
        let steps = due.min(MAX_STEPS_PER_FRAME);
        if due > MAX_STEPS_PER_FRAME {
            self.accumulator = 0.0;
        } else {
            self.accumulator -= steps as f32 * self.step;
        }
        steps
    }
}
