//! Frame timing: wall-clock sampling, per-frame delta and rolling statistics.
//!
//! `FrameTimer` never reads the clock itself. The loop samples a `Clock` and
//! feeds the timestamp in, which keeps the statistics deterministic under a
//! synthetic clock in tests.

use std::time::Instant;

/// Window over which the rolling averages are computed, in seconds.
pub const STATS_REFRESH_INTERVAL: f64 = 1.0;

/// Monotonic clock reporting seconds since it was started.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::start()
    }
}

/// Rolling averages published once per refresh interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub avg_frame_time_ms: f64,
    pub avg_fps: f64,
}

/// Whole-run totals, reported when the loop exits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub seconds: f64,
}

impl RunSummary {
    pub fn avg_fps(&self) -> f64 {
        if self.seconds > 0.0 {
            self.frames as f64 / self.seconds
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct FrameTimer {
    /// Timestamp of the current frame, seconds since the clock started.
    pub time_cur: f64,
    /// Seconds between the previous and the current frame.
    pub time_delta: f64,
    /// Latest rolling averages; `None` until the first interval has elapsed.
    pub stats: Option<FrameStats>,

    start_time: f64,
    last_refresh: f64,
    frames_since_refresh: u32,
    frames_total: u64,
}

impl FrameTimer {
    pub fn new(now: f64) -> Self {
        Self {
            time_cur: now,
            time_delta: 0.0,
            stats: None,
            start_time: now,
            last_refresh: now,
            frames_since_refresh: 0,
            frames_total: 0,
        }
    }

    /// Advances to `now`. Returns fresh statistics when a refresh interval
    /// has elapsed since the previous report.
    pub fn begin_frame(&mut self, now: f64) -> Option<FrameStats> {
        self.time_delta = (now - self.time_cur).max(0.0);
        self.time_cur = now;

        let elapsed = self.time_cur - self.last_refresh;
        if elapsed < STATS_REFRESH_INTERVAL || self.frames_since_refresh == 0 {
            return None;
        }

        let frames = self.frames_since_refresh as f64;
        let stats = FrameStats {
            avg_frame_time_ms: 1000.0 * elapsed / frames,
            avg_fps: frames / elapsed,
        };
        self.last_refresh = self.time_cur;
        self.frames_total += u64::from(self.frames_since_refresh);
        self.frames_since_refresh = 0;
        self.stats = Some(stats);
        Some(stats)
    }

    /// Counts one rendered frame.
    pub fn end_frame(&mut self) {
        self.frames_since_refresh += 1;
    }

    /// Seconds since the timer was created, as of the current frame.
    pub fn run_time(&self) -> f64 {
        self.time_cur - self.start_time
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            frames: self.frames_total + u64::from(self.frames_since_refresh),
            seconds: self.run_time(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drives `timer` at `rate` frames per second for frame indices
    /// `first..=last`, returning every report produced.
    fn run_at_rate(timer: &mut FrameTimer, rate: u32, first: u32, last: u32) -> Vec<FrameStats> {
        let mut reports = Vec::new();
        for k in first..=last {
            let t = k as f64 / rate as f64;
            if let Some(stats) = timer.begin_frame(t) {
                reports.push(stats);
            }
            timer.end_frame();
        }
        reports
    }

    #[test]
    fn delta_tracks_successive_timestamps() {
        let mut timer = FrameTimer::new(0.0);
        timer.begin_frame(0.25);
        assert!((timer.time_delta - 0.25).abs() < 1e-12);
        timer.begin_frame(0.5);
        assert!((timer.time_delta - 0.25).abs() < 1e-12);
        assert!((timer.time_cur - 0.5).abs() < 1e-12);
    }

    #[test]
    fn no_stats_before_first_interval() {
        let mut timer = FrameTimer::new(0.0);
        let reports = run_at_rate(&mut timer, 60, 0, 59);
        assert!(reports.is_empty());
        assert!(timer.stats.is_none());
    }

    #[test]
    fn fixed_rate_reports_that_rate() {
        for rate in [30u32, 60, 144] {
            let mut timer = FrameTimer::new(0.0);
            let reports = run_at_rate(&mut timer, rate, 0, rate);
            assert_eq!(reports.len(), 1, "rate {rate}");
            let stats = reports[0];
            assert!((stats.avg_fps - rate as f64).abs() <= 1.0, "rate {rate}: {stats:?}");
            let expected_ms = 1000.0 / rate as f64;
            assert!((stats.avg_frame_time_ms - expected_ms).abs() < 0.5);
        }
    }

    #[test]
    fn counters_reset_after_report() {
        let mut timer = FrameTimer::new(0.0);
        let first = run_at_rate(&mut timer, 60, 0, 60);
        assert_eq!(first.len(), 1);
        // Half a second later nothing new is reported.
        let mid = run_at_rate(&mut timer, 60, 61, 90);
        assert!(mid.is_empty());
        // The next full second produces exactly one more report.
        let second = run_at_rate(&mut timer, 60, 91, 120);
        assert_eq!(second.len(), 1);
        assert!((second[0].avg_fps - 60.0).abs() <= 1.0);
    }

    #[test]
    fn stall_without_frames_does_not_divide_by_zero() {
        let mut timer = FrameTimer::new(0.0);
        assert!(timer.begin_frame(5.0).is_none());
        timer.end_frame();
        let stats = timer.begin_frame(6.0).expect("one frame over the interval");
        assert!(stats.avg_fps.is_finite());
    }

    #[test]
    fn summary_counts_every_frame() {
        let mut timer = FrameTimer::new(0.0);
        run_at_rate(&mut timer, 50, 0, 124);
        let summary = timer.summary();
        assert_eq!(summary.frames, 125);
        assert!((summary.seconds - 124.0 / 50.0).abs() < 1e-9);
        assert!((summary.avg_fps() - 125.0 / (124.0 / 50.0)).abs() < 1e-6);
    }

    #[test]
    fn empty_run_summary_has_zero_fps() {
        let timer = FrameTimer::new(3.0);
        assert_eq!(timer.summary().frames, 0);
        assert_eq!(timer.summary().avg_fps(), 0.0);
    }

    #[test]
    fn clock_is_monotonic() {
        let clock = Clock::start();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
        assert!(a >= 0.0);
    }
}
