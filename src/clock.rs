//! Frame clock
//!
//! Produces the bounded delta time every per-frame update is scaled by.
//! A stall (breakpoint, window drag) must never hand the simulation a
//! multi-second step, so every measurement goes through [`cap_dt`].

use std::time::{Duration, Instant};

use crate::consts::{MAX_FRAME_DT, TARGET_FPS};

/// Clamp a raw elapsed time into `[0, max_dt]`. NaN and negative values become 0.
#[inline]
pub fn cap_dt(raw: f32, max_dt: f32) -> f32 {
    if raw.is_nan() || raw <= 0.0 {
        0.0
    } else {
        raw.min(max_dt.max(0.0))
    }
}

/// Source of per-frame delta time
pub trait Clock {
    /// Elapsed seconds since the previous call, already capped
    fn tick(&mut self) -> f32;
}

/// Wall-clock stepper with optional frame pacing
#[derive(Debug)]
pub struct FrameClock {
    last: Instant,
    max_dt: f32,
    frame_budget: Option<Duration>,
}

impl FrameClock {
    /// Clock that paces to `target_fps` (0 disables pacing)
    pub fn new(target_fps: u32, max_dt: f32) -> Self {
        let frame_budget = (target_fps > 0).then(|| Duration::from_secs_f64(1.0 / target_fps as f64));
        Self {
            last: Instant::now(),
            max_dt,
            frame_budget,
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(TARGET_FPS, MAX_FRAME_DT)
    }
}

impl Clock for FrameClock {
    fn tick(&mut self) -> f32 {
        if let Some(budget) = self.frame_budget {
            let spent = self.last.elapsed();
            if spent < budget {
                std::thread::sleep(budget - spent);
            }
        }
        let now = Instant::now();
        let raw = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        cap_dt(raw, self.max_dt)
    }
}

/// Deterministic clock returning the same step every frame
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    dt: f32,
}

impl FixedClock {
    pub fn new(dt: f32, max_dt: f32) -> Self {
        Self {
            dt: cap_dt(dt, max_dt),
        }
    }
}

impl Clock for FixedClock {
    fn tick(&mut self) -> f32 {
        self.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_dt_bounds_stalls() {
        assert_eq!(cap_dt(2.5, 0.1), 0.1);
        assert_eq!(cap_dt(0.016, 0.1), 0.016);
    }

    #[test]
    fn cap_dt_rejects_degenerate_values() {
        assert_eq!(cap_dt(-1.0, 0.1), 0.0);
        assert_eq!(cap_dt(f32::NAN, 0.1), 0.0);
        assert_eq!(cap_dt(0.0, 0.1), 0.0);
    }

    #[test]
    fn fixed_clock_is_capped_once() {
        let mut clock = FixedClock::new(0.5, MAX_FRAME_DT);
        assert_eq!(clock.tick(), MAX_FRAME_DT);
        assert_eq!(clock.tick(), MAX_FRAME_DT);
    }

    #[test]
    fn frame_clock_never_exceeds_cap() {
        let mut clock = FrameClock::new(0, 0.05);
        std::thread::sleep(Duration::from_millis(60));
        let dt = clock.tick();
        assert!(dt <= 0.05);
        assert!(dt >= 0.0);
    }
}
