use std::time::{Duration, Instant};

/// Shortest delta reported for a frame.
const MIN_DT: Duration = Duration::from_micros(100);
/// Longest delta reported for a frame; longer gaps (debugger, drag-resize) are cut.
const MAX_DT: Duration = Duration::from_millis(250);

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped to `MIN_DT..=MAX_DT`.
    pub dt: f32,
    /// Seconds since the clock started. Never clamped, so orbits follow wall time.
    pub elapsed: f32,
    /// Number of ticks before this one.
    pub frame: u64,
}

/// One clock per render loop; `tick` once per frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frame: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(start: Instant) -> Self {
        Self { start, last: start, frame: 0 }
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    pub(crate) fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now.saturating_duration_since(self.last).clamp(MIN_DT, MAX_DT);
        self.last = now;

        let time = FrameTime {
            dt: dt.as_secs_f32(),
            elapsed: now.saturating_duration_since(self.start).as_secs_f32(),
            frame: self.frame,
        };
        self.frame += 1;
        time
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> (FrameClock, Instant) {
        let start = Instant::now();
        (FrameClock::starting_at(start), start)
    }

    #[test]
    fn stall_is_cut_to_max_dt_but_elapsed_keeps_wall_time() {
        let (mut clock, start) = clock();
        let t = clock.tick_at(start + Duration::from_secs(5));
        assert!((t.dt - 0.25).abs() < 1e-6);
        assert!((t.elapsed - 5.0).abs() < 1e-3);
    }

    #[test]
    fn repeated_instant_reports_min_dt() {
        let (mut clock, start) = clock();
        clock.tick_at(start + Duration::from_millis(16));
        let t = clock.tick_at(start + Duration::from_millis(16));
        assert!((t.dt - 0.0001).abs() < 1e-7);
    }

    #[test]
    fn frames_count_from_zero() {
        let (mut clock, start) = clock();
        let frames: Vec<u64> = (1..=3)
            .map(|i| clock.tick_at(start + Duration::from_millis(16 * i)).frame)
            .collect();
        assert_eq!(frames, [0, 1, 2]);
    }

    #[test]
    fn normal_frame_passes_through() {
        let (mut clock, start) = clock();
        let t = clock.tick_at(start + Duration::from_millis(16));
        assert!((t.dt - 0.016).abs() < 1e-6);
    }
}
