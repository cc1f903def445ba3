//! Compatibility shim between the host player and the media element
//!
//! The shim decides which element properties get intercepted and what the
//! intercepted accessors answer. It never touches the element's buffers; it
//! only reinterprets what the element reports through offset transforms:
//!
//! - live streams report an extrapolated live edge as `duration` and turn
//!   `currentTime` writes into source reloads with a start offset
//! - live MP4 additionally shifts every time readout by the stream start
//! - on-demand streams without a finite native duration fall back to the
//!   longest track in the manifest
//! - MP3 sources refuse to seek

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    config::ShimConfig,
    live::{format_offset, format_time, LiveClock},
    logger::Logger,
    source_url::with_start_offset,
    SourceDescriptor, StreamInfo,
};

/// Element properties the shim can take over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Property {
    Duration,
    CurrentTime,
    Buffered,
    Play,
}

impl Property {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "duration" => Some(Property::Duration),
            "currentTime" => Some(Property::CurrentTime),
            "buffered" => Some(Property::Buffered),
            "play" => Some(Property::Play),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Property::Duration => "duration",
            Property::CurrentTime => "currentTime",
            Property::Buffered => "buffered",
            Property::Play => "play",
        }
    }
}

/// How time readouts are reinterpreted
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TimelineMode {
    /// Readouts pass through untouched
    Native,
    /// Live edge extrapolation; `stream_start` (seconds) is set for live MP4
    Live { stream_start: Option<f64> },
    /// On-demand with a manifest-derived duration fallback (seconds)
    DurationFallback { duration: f64 },
}

/// The enumerated set of intercepted accessors
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterceptPlan {
    pub getters: Vec<Property>,
    pub setters: Vec<Property>,
    pub reject_seek: bool,
    pub mode: TimelineMode,
}

impl InterceptPlan {
    /// `native_duration_finite` is the element's duration readout at build time
    pub fn new(
        source: &SourceDescriptor,
        info: &StreamInfo,
        native_duration_finite: bool,
        config: &ShimConfig,
    ) -> Self {
        let mime = source.parsed_mime();
        let mut plan = Self {
            getters: Vec::new(),
            setters: Vec::new(),
            reject_seek: false,
            mode: TimelineMode::Native,
        };

        if mime.is_mp3() && config.block_mp3_seek {
            plan.setters.push(Property::CurrentTime);
            plan.reject_seek = true;
        }

        if info.is_live() {
            // Live seeking replaces the MP3 restriction
            plan.reject_seek = false;
            if !plan.setters.contains(&Property::CurrentTime) {
                plan.setters.push(Property::CurrentTime);
            }
            plan.getters.push(Property::Duration);
            plan.getters.push(Property::Play);
            let stream_start = if source.mime == crate::mime::MP4_VIDEO {
                plan.getters.push(Property::CurrentTime);
                plan.getters.push(Property::Buffered);
                Some(info.lastms * 0.001)
            } else {
                None
            };
            plan.mode = TimelineMode::Live { stream_start };
        } else if !native_duration_finite {
            plan.getters.push(Property::Duration);
            plan.mode = TimelineMode::DurationFallback {
                duration: info.max_track_lastms() * 0.001,
            };
        }

        plan
    }

    pub fn intercepts_get(&self, property: Property) -> bool {
        self.getters.contains(&property)
    }

    pub fn intercepts_set(&self, property: Property) -> bool {
        self.setters.contains(&property)
    }

    pub fn is_live(&self) -> bool {
        matches!(self.mode, TimelineMode::Live { .. })
    }
}

/// Read-only view of the native element's time readouts
pub trait MediaReadout {
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
    fn paused(&self) -> bool;
    fn buffered_len(&self) -> u32;
    fn buffered_start(&self, index: u32) -> f64;
    fn buffered_end(&self, index: u32) -> f64;

    /// End of the last buffered range, zero when nothing is buffered
    fn buffered_tail(&self) -> f64 {
        match self.buffered_len() {
            0 => 0.0,
            n => self.buffered_end(n - 1),
        }
    }
}

/// What a `currentTime` write turns into
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SeekOutcome {
    /// Refused; the position is unchanged
    Rejected,
    /// Write through to the element
    Passthrough,
    /// Load the source again from `url`
    Reload { url: String, offset: f64 },
}

/// Per-player shim state
#[derive(Debug, Clone)]
pub struct PlaybackShim {
    plan: InterceptPlan,
    clock: LiveClock,
    source_url: String,
    config: ShimConfig,
}

impl PlaybackShim {
    pub fn new(
        source: &SourceDescriptor,
        info: &StreamInfo,
        native_duration_finite: bool,
        config: ShimConfig,
        now_ms: f64,
    ) -> Self {
        let plan = InterceptPlan::new(source, info, native_duration_finite, &config);
        debug!(
            getters = ?plan.getters,
            setters = ?plan.setters,
            mode = ?plan.mode,
            "Intercept plan built"
        );
        Self {
            plan,
            clock: LiveClock::new(now_ms),
            source_url: source.url.clone(),
            config,
        }
    }

    pub fn plan(&self) -> &InterceptPlan {
        &self.plan
    }

    pub fn clock(&self) -> &LiveClock {
        &self.clock
    }

    pub fn intercepts_get(&self, property: Property) -> bool {
        self.plan.intercepts_get(property)
    }

    pub fn intercepts_set(&self, property: Property) -> bool {
        self.plan.intercepts_set(property)
    }

    pub fn on_progress(&mut self, now_ms: f64) {
        self.clock.on_progress(now_ms);
    }

    pub fn on_pause(&mut self, now_ms: f64) {
        self.clock.on_pause(now_ms);
    }

    /// Offset applied to live MP4 time readouts
    fn stream_shift(&self) -> Option<f64> {
        match self.plan.mode {
            TimelineMode::Live {
                stream_start: Some(start),
            } => Some(start - self.clock.live_offset()),
            _ => None,
        }
    }

    pub fn duration(&self, media: &dyn MediaReadout, now_ms: f64) -> f64 {
        match self.plan.mode {
            TimelineMode::Native => media.duration(),
            TimelineMode::Live { .. } => {
                let edge = self.clock.edge(media.buffered_tail(), now_ms);
                edge + self.stream_shift().unwrap_or(0.0)
            }
            TimelineMode::DurationFallback { duration } => {
                let native = media.duration();
                if native.is_finite() {
                    native
                } else {
                    duration
                }
            }
        }
    }

    pub fn current_time(&self, media: &dyn MediaReadout) -> f64 {
        media.current_time() + self.stream_shift().unwrap_or(0.0)
    }

    pub fn buffered_start(&self, media: &dyn MediaReadout, index: u32) -> f64 {
        media.buffered_start(index) + self.stream_shift().unwrap_or(0.0)
    }

    pub fn buffered_end(&self, media: &dyn MediaReadout, index: u32) -> f64 {
        media.buffered_end(index) + self.stream_shift().unwrap_or(0.0)
    }

    /// Handle a `currentTime` write of `requested` seconds
    pub fn seek(
        &mut self,
        requested: f64,
        media: &dyn MediaReadout,
        now_ms: f64,
        logger: &dyn Logger,
    ) -> SeekOutcome {
        if self.plan.reject_seek {
            logger.log("Seek attempted, but the media server does not currently support seeking in MP3.");
            return SeekOutcome::Rejected;
        }
        if !self.plan.is_live() || !self.plan.intercepts_set(Property::CurrentTime) {
            return SeekOutcome::Passthrough;
        }

        let duration = self.duration(media, now_ms);
        let offset = LiveClock::offset_for(requested, duration);
        logger.log(&format!(
            "Seeking to {} ({}s from live)",
            format_time(requested),
            format_offset(offset)
        ));

        // The offset only sticks once there is a URL to reload
        match with_start_offset(&self.source_url, &self.config.start_offset_param, offset) {
            Ok(url) => {
                info!(requested, offset, url = %url, "Live seek");
                self.clock.set_live_offset(offset);
                SeekOutcome::Reload { url, offset }
            }
            Err(e) => {
                warn!(error = %e, url = %self.source_url, "Cannot build live seek URL");
                logger.log(&format!("Could not seek: {}", e));
                SeekOutcome::Rejected
            }
        }
    }

    /// Should the source be reloaded before resuming playback?
    pub fn before_play(&self, media: &dyn MediaReadout, now_ms: f64, logger: &dyn Logger) -> bool {
        if !self.plan.intercepts_get(Property::Play) {
            return false;
        }
        let stale = self
            .clock
            .pause_is_stale(media.paused(), now_ms, self.config.stale_pause_ms);
        if stale {
            logger.log("Reloading source..");
        }
        stale
    }
}
