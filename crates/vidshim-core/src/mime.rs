//! Namespaced MIME handling
//!
//! The host tags every source with a backend namespace in front of the real
//! media MIME (`html5/video/mp4`). The media element only ever sees the part
//! after the namespace.

/// Namespaced MIMEs this backend can take
pub const SUPPORTED_MIMES: &[&str] = &[
    "html5/application/vnd.apple.mpegurl",
    "html5/application/vnd.apple.mpegurl;version=7",
    "html5/video/mp4",
    "html5/video/ogg",
    "html5/video/webm",
    "html5/audio/mp3",
    "html5/audio/webm",
    "html5/audio/ogg",
    "html5/audio/wav",
];

/// Native HLS, skipped on old Android
pub const NATIVE_HLS: &str = "html5/application/vnd.apple.mpegurl";

/// MP3 audio, which cannot seek
pub const MP3_AUDIO: &str = "html5/audio/mp3";

/// Progressive MP4
pub const MP4_VIDEO: &str = "html5/video/mp4";

/// Container MIME that gets per-codec probing
pub const MP4_CONTAINER: &str = "video/mp4";

/// Pure membership test against [`SUPPORTED_MIMES`]
pub fn is_mime_supported(mime: &str) -> bool {
    SUPPORTED_MIMES.contains(&mime)
}

/// A namespaced MIME split into its namespace and media part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mime<'a> {
    full: &'a str,
    namespace: &'a str,
    media: &'a str,
}

impl<'a> Mime<'a> {
    pub fn parse(full: &'a str) -> Self {
        let (namespace, media) = full.split_once('/').unwrap_or((full, ""));
        Self {
            full,
            namespace,
            media,
        }
    }

    /// The full namespaced string
    pub fn full(&self) -> &'a str {
        self.full
    }

    pub fn namespace(&self) -> &'a str {
        self.namespace
    }

    /// MIME as understood by the media element
    pub fn media(&self) -> &'a str {
        self.media
    }

    pub fn is_mp4(&self) -> bool {
        self.media == MP4_CONTAINER
    }

    pub fn is_mp3(&self) -> bool {
        self.full == MP3_AUDIO
    }

    pub fn is_native_hls(&self) -> bool {
        self.full == NATIVE_HLS
    }
}

impl std::fmt::Display for Mime<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.full)
    }
}
