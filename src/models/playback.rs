// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Playback timing.
//!
//! egui repaints on demand, so the periodic frame timer is modelled as a
//! clock that the UI polls every update and that reports how long to sleep
//! until the next tick.

use std::time::{Duration, Instant};

/// Tick interval for a frame rate.
pub fn interval_for(fps: f64) -> Option<Duration> {
    if fps.is_finite() && fps > 0.0 {
        Some(Duration::from_micros((1e6 / fps).round() as u64))
    } else {
        None
    }
}

/// Periodic frame-advance timer.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    interval: Duration,
    next_tick: Option<Instant>,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(40),
            next_tick: None,
        }
    }
}

impl PlaybackClock {
    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    pub fn start(&mut self, now: Instant) {
        self.next_tick = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.next_tick = None;
    }

    /// Change the tick rate. Returns `false` (and keeps the old rate) for a
    /// non-positive frame rate.
    pub fn set_fps(&mut self, fps: f64) -> bool {
        match interval_for(fps) {
            Some(interval) => {
                self.interval = interval;
                true
            }
            None => false,
        }
    }

    /// Returns `true` once per elapsed interval.
    ///
    /// A clock that fell more than one interval behind restarts from `now`
    /// instead of firing a burst of catch-up ticks.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(next) = self.next_tick else {
            return false;
        };
        if now < next {
            return false;
        }
        let following = next + self.interval;
        self.next_tick = Some(if following <= now {
            now + self.interval
        } else {
            following
        });
        true
    }

    /// Time left before the next tick, if running.
    pub fn until_next(&self, now: Instant) -> Option<Duration> {
        self.next_tick
            .map(|next| next.saturating_duration_since(now))
    }
}

/// Measures the achieved frame rate between composed frames.
#[derive(Debug, Clone, Default)]
pub struct FpsMeter {
    last: Option<Instant>,
    fps: Option<f64>,
}

impl FpsMeter {
    /// Record a composed frame.
    pub fn mark(&mut self, now: Instant) {
        if let Some(last) = self.last {
            let elapsed = now.saturating_duration_since(last).as_secs_f64();
            self.fps = if elapsed > 0.0 { Some(1.0 / elapsed) } else { None };
        }
        self.last = Some(now);
    }

    pub fn label(&self) -> String {
        match self.fps {
            Some(fps) => format!("FPS: {:.2}", fps),
            None => "FPS: -".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_for_fps() {
        assert_eq!(interval_for(25.0), Some(Duration::from_millis(40)));
        assert_eq!(interval_for(0.0), None);
        assert_eq!(interval_for(-3.0), None);
    }

    #[test]
    fn test_clock_ticks_once_per_interval() {
        let mut clock = PlaybackClock::default();
        assert!(clock.set_fps(10.0));
        let t0 = Instant::now();
        clock.start(t0);

        assert!(!clock.poll(t0 + Duration::from_millis(50)));
        assert!(clock.poll(t0 + Duration::from_millis(100)));
        assert!(!clock.poll(t0 + Duration::from_millis(150)));
        assert!(clock.poll(t0 + Duration::from_millis(200)));
    }

    #[test]
    fn test_clock_skips_backlog() {
        let mut clock = PlaybackClock::default();
        clock.set_fps(10.0);
        let t0 = Instant::now();
        clock.start(t0);

        let late = t0 + Duration::from_millis(1000);
        assert!(clock.poll(late));
        assert!(!clock.poll(late));
        assert_eq!(clock.until_next(late), Some(Duration::from_millis(100)));
    }

    #[test]
    fn test_stopped_clock_never_ticks() {
        let mut clock = PlaybackClock::default();
        let t0 = Instant::now();
        clock.start(t0);
        clock.stop();
        assert!(!clock.is_running());
        assert!(!clock.poll(t0 + Duration::from_secs(10)));
        assert_eq!(clock.until_next(t0), None);
    }

    #[test]
    fn test_invalid_fps_keeps_interval() {
        let mut clock = PlaybackClock::default();
        clock.set_fps(50.0);
        assert!(!clock.set_fps(0.0));
        let t0 = Instant::now();
        clock.start(t0);
        assert_eq!(clock.until_next(t0), Some(Duration::from_millis(20)));
    }

    #[test]
    fn test_fps_meter_label() {
        let mut meter = FpsMeter::default();
        assert_eq!(meter.label(), "FPS: -");
        let t0 = Instant::now();
        meter.mark(t0);
        meter.mark(t0 + Duration::from_millis(40));
        assert_eq!(meter.label(), "FPS: 25.00");
    }
}
