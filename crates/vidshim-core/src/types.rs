//! Core types for VidShim
//!
//! These mirror the JSON documents the host player hands to a backend:
//! the chosen source, the user options bag and the stream info document
//! published by the media server.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{mime::Mime, Result};

fn default_simul_tracks() -> usize {
    1
}

/// A playable source as offered by the media server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Namespaced MIME, e.g. `html5/video/mp4`
    #[serde(rename = "type")]
    pub mime: String,
    /// Playable URL
    pub url: String,
    /// How many tracks the source can carry at once
    #[serde(default = "default_simul_tracks")]
    pub simul_tracks: usize,
}

impl SourceDescriptor {
    pub fn new(mime: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            mime: mime.into(),
            url: url.into(),
            simul_tracks: default_simul_tracks(),
        }
    }

    /// Builder-style override of the simultaneous track limit
    pub fn with_simul_tracks(mut self, simul_tracks: usize) -> Self {
        self.simul_tracks = simul_tracks;
        self
    }

    /// Parsed view of the namespaced MIME
    pub fn parsed_mime(&self) -> Mime<'_> {
        Mime::parse(&self.mime)
    }
}

/// One track entry of the stream metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    /// Track category (`video`, `audio`, `meta`, ...)
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Codec family name as reported by the server (`H264`, `AAC`, ...)
    #[serde(default)]
    pub codec: String,
    /// Codec initialization data; each UTF-16 unit is one raw byte
    #[serde(default)]
    pub init: String,
    /// Timestamp of the last known frame, in milliseconds
    #[serde(default)]
    pub lastms: f64,
}

impl TrackDescriptor {
    pub fn new(kind: impl Into<String>, codec: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            codec: codec.into(),
            ..Default::default()
        }
    }

    pub fn with_init(mut self, init: impl Into<String>) -> Self {
        self.init = init.into();
        self
    }

    pub fn with_lastms(mut self, lastms: f64) -> Self {
        self.lastms = lastms;
        self
    }

    /// Metadata tracks never reach the media element
    pub fn is_meta(&self) -> bool {
        self.kind == "meta"
    }
}

/// Track manifest of a stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamMeta {
    #[serde(default)]
    pub tracks: BTreeMap<String, TrackDescriptor>,
}

/// Stream info document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    /// `live` for live streams, anything else is on-demand
    #[serde(rename = "type", default)]
    pub stream_type: String,
    /// Stream start offset in milliseconds
    #[serde(default)]
    pub lastms: f64,
    #[serde(default)]
    pub meta: StreamMeta,
}

impl StreamInfo {
    /// Parse a stream info JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn live() -> Self {
        Self {
            stream_type: "live".to_string(),
            ..Default::default()
        }
    }

    pub fn on_demand() -> Self {
        Self {
            stream_type: "vod".to_string(),
            ..Default::default()
        }
    }

    pub fn with_track(mut self, id: impl Into<String>, track: TrackDescriptor) -> Self {
        self.meta.tracks.insert(id.into(), track);
        self
    }

    pub fn with_lastms(mut self, lastms: f64) -> Self {
        self.lastms = lastms;
        self
    }

    pub fn is_live(&self) -> bool {
        self.stream_type == "live"
    }

    /// Tracks that can be handed to the media element
    pub fn media_tracks(&self) -> impl Iterator<Item = &TrackDescriptor> {
        self.meta.tracks.values().filter(|t| !t.is_meta())
    }

    /// Largest `lastms` over every track, in milliseconds
    pub fn max_track_lastms(&self) -> f64 {
        self.meta
            .tracks
            .values()
            .fold(0.0, |acc: f64, t| acc.max(t.lastms))
    }
}

/// Value of an attribute-style option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Flag(bool),
    Text(String),
}

impl OptionValue {
    /// Attribute value to apply, `None` when the option is falsy
    pub fn attribute_value(&self) -> Option<&str> {
        match self {
            OptionValue::Flag(true) => Some(""),
            OptionValue::Flag(false) => None,
            OptionValue::Text(s) if s.is_empty() => None,
            OptionValue::Text(s) => Some(s),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawControls {
    Flag(bool),
    Style(String),
}

/// Which layer draws the playback controls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawControls", into = "RawControls")]
pub enum ControlStyle {
    /// No controls requested
    #[default]
    None,
    /// Native browser controls
    Stock,
    /// Controls drawn by the host UI layer
    External(String),
}

impl From<RawControls> for ControlStyle {
    fn from(raw: RawControls) -> Self {
        match raw {
            RawControls::Flag(false) => ControlStyle::None,
            RawControls::Flag(true) => ControlStyle::External("true".to_string()),
            RawControls::Style(s) if s == "stock" => ControlStyle::Stock,
            RawControls::Style(s) if s.is_empty() => ControlStyle::None,
            RawControls::Style(s) => ControlStyle::External(s),
        }
    }
}

impl From<ControlStyle> for RawControls {
    fn from(style: ControlStyle) -> Self {
        match style {
            ControlStyle::None => RawControls::Flag(false),
            ControlStyle::Stock => RawControls::Style("stock".to_string()),
            ControlStyle::External(s) => RawControls::Style(s),
        }
    }
}

/// Player options bag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerOptions {
    #[serde(default)]
    pub autoplay: Option<OptionValue>,
    #[serde(rename = "loop", default)]
    pub loop_playback: Option<OptionValue>,
    #[serde(default)]
    pub poster: Option<OptionValue>,
    #[serde(default)]
    pub muted: bool,
    #[serde(default)]
    pub controls: ControlStyle,
}

impl PlayerOptions {
    /// Options that map onto element attributes, in application order
    pub fn attribute_options(&self) -> [(&'static str, Option<&OptionValue>); 3] {
        [
            ("autoplay", self.autoplay.as_ref()),
            ("loop", self.loop_playback.as_ref()),
            ("poster", self.poster.as_ref()),
        ]
    }
}

/// Subtitle track offered by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    pub label: String,
    pub lang: String,
    pub src: String,
}

/// Player size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Inline style values for width and height
    pub fn css(&self) -> (String, String) {
        (format!("{}px", self.width), format!("{}px", self.height))
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
