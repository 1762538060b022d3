//! Scripted input for driving a client without a keyboard.

use shared::{InputFrame, InputProvider};

/// Produces trigger and reload pulses on a fixed tick schedule, walking
/// forward the whole time.
#[derive(Debug, Clone)]
pub struct ScriptedInput {
    tick: u64,
    /// Ticks between trigger pulls; 0 never fires.
    fire_every: u32,
    /// Ticks between reload presses; 0 never reloads.
    reload_every: u32,
    forward: f32,
}

impl ScriptedInput {
    pub fn new(fire_every: u32, reload_every: u32) -> Self {
        Self {
            tick: 0,
            fire_every,
            reload_every,
            forward: 0.0,
        }
    }

    pub fn with_forward(mut self, forward: f32) -> Self {
        self.forward = forward.clamp(-1.0, 1.0);
        self
    }

    fn pulse(&self, every: u32) -> bool {
        every > 0 && self.tick % u64::from(every) == 0
    }
}

impl Default for ScriptedInput {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl InputProvider for ScriptedInput {
    fn poll(&mut self) -> InputFrame {
        self.tick += 1;
        InputFrame {
            fire: self.pulse(self.fire_every),
            reload: self.pulse(self.reload_every),
            move_x: 0.0,
            move_z: self.forward,
            jump: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fire_schedule() {
        let mut input = ScriptedInput::new(3, 0);
        let fired: Vec<bool> = (0..6).map(|_| input.poll().fire).collect();
        assert_eq!(fired, vec![false, false, true, false, false, true]);
    }

    #[test]
    fn test_zero_never_pulses() {
        let mut input = ScriptedInput::default().with_forward(2.0);
        for _ in 0..10 {
            let frame = input.poll();
            assert!(!frame.fire);
            assert!(!frame.reload);
            assert_eq!(frame.move_z, 1.0);
        }
    }
}
