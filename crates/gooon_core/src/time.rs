use std::time::{Duration, Instant};

const FPS_SAMPLE_COUNT: usize = 60;
pub const LOGICAL_TICKS_PER_SECOND: u64 = 60;

/// Derives a 60 Hz logical clock from wall-clock time.
///
/// Hosts deliver draw ticks at whatever cadence the display runs. The logical
/// tick only depends on elapsed time since `origin`, so a faster display just
/// produces skipped frames (`begin_frame` returns false).
pub struct FrameClock {
    origin: Instant,
    last_tick: Option<u64>,
    last_instant: Option<Instant>,
    pub frame_count: u64,
    pub real_dt: f64,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
}

impl FrameClock {
    pub fn new(origin: Instant) -> Self {
        Self {
            origin,
            last_tick: None,
            last_instant: None,
            frame_count: 0,
            real_dt: 0.0,
            fps_samples: [1.0 / 60.0; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 60.0,
        }
    }

    pub fn logical_tick(&self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.origin);
        (elapsed.as_nanos() * LOGICAL_TICKS_PER_SECOND as u128 / 1_000_000_000) as u64
    }

    /// Returns true when `now` lands on a logical tick that has not been
    /// rendered yet.
    pub fn begin_frame(&mut self, now: Instant) -> bool {
        let tick = self.logical_tick(now);
        if self.last_tick == Some(tick) {
            return false;
        }
        self.last_tick = Some(tick);

        self.real_dt = self
            .last_instant
            .map(|prev| now.saturating_duration_since(prev).as_secs_f64())
            .unwrap_or(0.0);
        self.last_instant = Some(now);
        self.frame_count += 1;

        if self.real_dt > 0.0 {
            self.fps_samples[self.fps_sample_index] = self.real_dt;
            self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
            let avg_dt: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
            self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
        }
        if self.frame_count % LOGICAL_TICKS_PER_SECOND == 0 {
            log::debug!("frame {} ({:.1} fps)", self.frame_count, self.smoothed_fps);
        }
        true
    }

    pub fn last_tick(&self) -> Option<u64> {
        self.last_tick
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_tick_runs_at_sixty_hertz() {
        let origin = Instant::now();
        let clock = FrameClock::new(origin);
        assert_eq!(clock.logical_tick(origin), 0);
        assert_eq!(clock.logical_tick(origin + Duration::from_millis(16)), 0);
        assert_eq!(clock.logical_tick(origin + Duration::from_millis(17)), 1);
        assert_eq!(clock.logical_tick(origin + Duration::from_secs(1)), 60);
    }

    #[test]
    fn same_tick_is_skipped() {
        let origin = Instant::now();
        let mut clock = FrameClock::new(origin);
        assert!(clock.begin_frame(origin));
        assert!(!clock.begin_frame(origin + Duration::from_millis(5)));
        assert!(clock.begin_frame(origin + Duration::from_millis(20)));
        assert_eq!(clock.frame_count, 2);
        assert_eq!(clock.last_tick(), Some(1));
    }

    #[test]
    fn fast_display_does_not_speed_up_logical_clock() {
        let origin = Instant::now();
        let mut clock = FrameClock::new(origin);
        // 240 Hz display for one second.
        let rendered = (0..240)
            .filter(|i| clock.begin_frame(origin + Duration::from_micros(i * 4_167)))
            .count();
        assert!(rendered <= 61, "rendered {rendered} frames");
        assert!(rendered >= 59, "rendered {rendered} frames");
    }

    #[test]
    fn instants_before_origin_clamp_to_zero() {
        let origin = Instant::now() + Duration::from_secs(1);
        let clock = FrameClock::new(origin);
        assert_eq!(clock.logical_tick(Instant::now()), 0);
        assert_eq!(clock.elapsed(Instant::now()), Duration::ZERO);
    }
}
