//! Live edge bookkeeping
//!
//! A live stream played through a media element only knows about what it has
//! buffered. The clock extrapolates the live edge from the last `progress`
//! event and remembers how far behind the edge the viewer chose to be.

use serde::Serialize;

/// Per-player live timing state. All timestamps are wall-clock milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveClock {
    last_progress_ms: f64,
    /// Seconds behind the live edge, never positive
    live_offset: f64,
    paused_at_ms: Option<f64>,
}

impl LiveClock {
    pub fn new(now_ms: f64) -> Self {
        Self {
            last_progress_ms: now_ms,
            live_offset: 0.0,
            paused_at_ms: None,
        }
    }

    pub fn on_progress(&mut self, now_ms: f64) {
        self.last_progress_ms = now_ms;
    }

    pub fn on_pause(&mut self, now_ms: f64) {
        self.paused_at_ms = Some(now_ms);
    }

    pub fn last_progress_ms(&self) -> f64 {
        self.last_progress_ms
    }

    pub fn live_offset(&self) -> f64 {
        self.live_offset
    }

    pub fn paused_at_ms(&self) -> Option<f64> {
        self.paused_at_ms
    }

    /// Estimated live edge: buffered end advanced by the time since the last
    /// buffer update, shifted by the chosen offset
    pub fn edge(&self, buffered_end: f64, now_ms: f64) -> f64 {
        let elapsed = (now_ms - self.last_progress_ms) * 0.001;
        buffered_end + elapsed - self.live_offset
    }

    /// Offset for a seek to `requested` given the current `duration`,
    /// clamped to the live edge
    pub fn offset_for(requested: f64, duration: f64) -> f64 {
        (requested - duration).min(0.0)
    }

    pub fn set_live_offset(&mut self, offset: f64) {
        self.live_offset = offset.min(0.0);
    }

    /// Paused for longer than `threshold_ms`?
    pub fn pause_is_stale(&self, paused: bool, now_ms: f64, threshold_ms: f64) -> bool {
        match self.paused_at_ms {
            Some(at) => paused && now_ms - at > threshold_ms,
            None => false,
        }
    }
}

/// `h:mm:ss` or `mm:ss` for a position in seconds
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "--:--".to_string();
    }
    let total = seconds.max(0.0).floor() as u64;
    let (h, m, s) = (total / 3600, (total / 60) % 60, total % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

/// Seconds behind live rounded to one decimal, as shown in the host log
pub fn format_offset(offset: f64) -> String {
    // +0.0 folds negative zero
    let behind = (offset * -10.0).round() / 10.0 + 0.0;
    behind.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_advances_with_wall_clock() {
        let clock = LiveClock::new(1_000.0);
        assert_eq!(clock.edge(30.0, 1_000.0), 30.0);
        assert_eq!(clock.edge(30.0, 3_500.0), 32.5);
    }

    #[test]
    fn test_seek_offset_clamps_to_live_edge() {
        assert_eq!(LiveClock::offset_for(20.0, 30.0), -10.0);
        assert_eq!(LiveClock::offset_for(50.0, 30.0), 0.0);
        // NaN compares false, so min() keeps the clamp
        assert_eq!(LiveClock::offset_for(f64::NAN, 30.0), 0.0);

        let mut clock = LiveClock::new(0.0);
        assert_eq!(clock.edge(30.0, 0.0), 30.0);
        clock.set_live_offset(-10.0);
        assert_eq!(clock.live_offset(), -10.0);
        assert_eq!(clock.edge(30.0, 0.0), 40.0);
    }

    #[test]
    fn test_pause_staleness() {
        let mut clock = LiveClock::new(0.0);
        assert!(!clock.pause_is_stale(true, 10_000.0, 5000.0));
        clock.on_pause(1_000.0);
        assert!(!clock.pause_is_stale(true, 6_000.0, 5000.0));
        assert!(clock.pause_is_stale(true, 6_001.0, 5000.0));
        assert!(!clock.pause_is_stale(false, 60_000.0, 5000.0));
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(75.9), "01:15");
        assert_eq!(format_time(3_725.0), "1:02:05");
        assert_eq!(format_time(f64::NAN), "--:--");
    }

    #[test]
    fn test_format_offset() {
        assert_eq!(format_offset(0.0), "0");
        assert_eq!(format_offset(-12.34), "12.3");
        assert_eq!(format_offset(-5.0), "5");
    }
}
