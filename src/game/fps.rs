use std::time::{Duration, Instant};

use winit::dpi::PhysicalSize;

/// Counts presented frames and reports a per-second rate once per interval.
#[derive(Debug, Clone)]
pub struct FrameCounter {
    interval: Duration,
    frames: u32,
    window_start: Option<Instant>,
}

impl FrameCounter {
    pub fn new(interval: Duration) -> Self {
        FrameCounter {
            interval,
            frames: 0,
            window_start: None,
        }
    }

    pub fn frame(&mut self) {
        self.frames += 1;
    }

    /// Returns the frame rate when a full interval has passed since the last report.
    ///
    /// The first call only opens the measurement window and discards frames
    /// counted before it.
    pub fn poll(&mut self, now: Instant) -> Option<u32> {
        let Some(start) = self.window_start else {
            self.window_start = Some(now);
            self.frames = 0;
            return None;
        };

        if now.saturating_duration_since(start) < self.interval {
            return None;
        }

        let per_second = 1.0 / self.interval.as_secs_f32();
        let fps = (self.frames as f32 * per_second).round() as u32;

        self.frames = 0;
        self.window_start = Some(now);
        Some(fps)
    }
}

pub fn window_title(prefix: &str, fps: u32, size: PhysicalSize<u32>) -> String {
    format!(
        "{}: {} Frames Per Second @ {} x {}",
        prefix, fps, size.width, size.height
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_poll_only_starts_measuring() {
        let mut counter = FrameCounter::new(Duration::from_millis(250));
        let start = Instant::now();
        counter.frame();
        counter.frame();
        assert_eq!(counter.poll(start), None);

        counter.frame();
        assert_eq!(counter.poll(start + Duration::from_millis(250)), Some(4));
    }

    #[test]
    fn reports_frames_scaled_to_one_second() {
        let mut counter = FrameCounter::new(Duration::from_millis(250));
        let start = Instant::now();
        counter.poll(start);

        for _ in 0..15 {
            counter.frame();
        }
        assert_eq!(counter.poll(start + Duration::from_millis(250)), Some(60));
    }

    #[test]
    fn no_report_before_interval_elapses() {
        let mut counter = FrameCounter::new(Duration::from_millis(250));
        let start = Instant::now();
        counter.poll(start);
        counter.frame();
        assert_eq!(counter.poll(start + Duration::from_millis(100)), None);
    }

    #[test]
    fn count_resets_after_each_report() {
        let mut counter = FrameCounter::new(Duration::from_millis(250));
        let start = Instant::now();
        counter.poll(start);

        for _ in 0..10 {
            counter.frame();
        }
        let first = start + Duration::from_millis(250);
        assert_eq!(counter.poll(first), Some(40));

        counter.frame();
        assert_eq!(counter.poll(first + Duration::from_millis(250)), Some(4));
    }

    #[test]
    fn title_includes_rate_and_size() {
        let title = window_title("tess example", 240, PhysicalSize::new(800, 600));
        assert_eq!(title, "tess example: 240 Frames Per Second @ 800 x 600");
    }
}
