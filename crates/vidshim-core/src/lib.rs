//! VidShim Core - HTML5 media element backend logic
//!
//! This crate holds every decision the HTML5 playback backend makes, with no
//! browser dependency so it runs the same on the host and in WASM:
//! - Capability probing (MIME table, codec strings, `canPlayType` queries)
//! - Element plans (attributes, properties, nested source, subtitles)
//! - Intercept plans for the compatibility proxy
//! - Live timeline translation (edge extrapolation, start offsets, stale pauses)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       VidShim Core                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐       │
//! │  │   MIME +     │  │  Capability  │  │   Element    │       │
//! │  │   Codecs     │─►│    Probe     │  │    Plan      │       │
//! │  └──────────────┘  └──────┬───────┘  └──────────────┘       │
//! │                           │                                 │
//! │                    ┌──────┴──────┐   ┌──────────────┐       │
//! │                    │  Platform   │   │  Playback    │       │
//! │                    │   seams     │   │  Shim + Live │       │
//! │                    └─────────────┘   │    Clock     │       │
//! │                                      └──────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod types;
pub mod mime;
pub mod codec;
pub mod config;
pub mod logger;
pub mod platform;
pub mod source_url;
pub mod probe;
pub mod element;
pub mod live;
pub mod shim;

pub use error::{Error, Result};
pub use types::*;
pub use mime::{is_mime_supported, Mime, SUPPORTED_MIMES};
pub use codec::{codec_string, distinct_codecs};
pub use config::ShimConfig;
pub use logger::{Logger, MemoryLogger, TracingLogger};
pub use platform::{MediaCapabilities, PageEnvironment, StaticCapabilities, StaticEnvironment};
pub use probe::{CapabilityProbe, ProbePlan};
pub use element::{replace_subtitle, source_changed, ElementPlan, TrackElementPlan, TrackList};
pub use live::LiveClock;
pub use shim::{InterceptPlan, MediaReadout, PlaybackShim, Property, SeekOutcome, TimelineMode};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Display name of the backend, as listed by the host
pub const BACKEND_NAME: &str = "HTML5 video player";

/// The host's own control skin drives this backend
pub const HOST_CONTROLS: bool = true;

/// Selection priority when registered after `registered` other backends
pub fn priority(registered: usize) -> usize {
    registered + 1
}

/// Log library initialization
pub fn init() {
    tracing::info!(version = VERSION, "VidShim Core initialized");
}
