//! Codec parameter strings (RFC 6381 style) derived from track metadata

use tracing::debug;

use crate::TrackDescriptor;

/// Byte offsets of the avcC record used for `avc1.PPCCLL`
const AVC_OFFSETS: &[usize] = &[1, 2, 3];

/// Byte offsets of the hvcC record used for the `hev1.` suffix
const HEVC_OFFSETS: &[usize] = &[1, 6, 7, 8, 9, 10, 11, 12];

/// Hex pair written for an init byte past the end of the record
const MISSING_BYTE: &str = "aN";

/// Codec string for a single track
pub fn codec_string(track: &TrackDescriptor) -> String {
    match track.codec.as_str() {
        "AAC" => "mp4a.40.2".to_string(),
        "MP3" => "mp3".to_string(),
        "AC3" => "ec-3".to_string(),
        "H264" => format!("avc1.{}", init_hex(track, AVC_OFFSETS)),
        "HEVC" => format!("hev1.{}", init_hex(track, HEVC_OFFSETS)),
        other => other.to_lowercase(),
    }
}

/// Deduplicated codec strings of every non-meta track, first occurrence wins
pub fn distinct_codecs<'a>(tracks: impl IntoIterator<Item = &'a TrackDescriptor>) -> Vec<String> {
    let mut codecs: Vec<String> = Vec::new();
    for track in tracks.into_iter().filter(|t| !t.is_meta()) {
        let codec = codec_string(track);
        if !codecs.contains(&codec) {
            codecs.push(codec);
        }
    }
    codecs
}

/// HEVC codec strings cannot be handed to non-MP4 containers
pub fn is_hevc(codec: &str) -> bool {
    codec.starts_with("hev1")
}

/// `canPlayType` query for a container plus codec list
pub fn codecs_query(container: &str, codecs: &[impl AsRef<str>]) -> String {
    let joined = codecs
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<_>>()
        .join(",");
    format!("{};codecs=\"{}\"", container, joined)
}

/// Low byte of each UTF-16 unit at `offsets`; a short record still yields a
/// (browser-unplayable) string so the track keeps counting
fn init_hex(track: &TrackDescriptor, offsets: &[usize]) -> String {
    let units: Vec<u16> = track.init.encode_utf16().collect();
    if let Some(&needed) = offsets.last().filter(|&&i| i >= units.len()) {
        debug!(codec = %track.codec, needed, len = units.len(), "Track init data too short");
    }
    offsets
        .iter()
        .map(|&i| match units.get(i) {
            Some(unit) => format!("{:02x}", unit & 0xff),
            None => MISSING_BYTE.to_string(),
        })
        .collect()
}
