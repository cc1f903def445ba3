//! Integration tests for VidShim Core

use std::cell::RefCell;
use std::rc::Rc;

use vidshim_core::{
    is_mime_supported, replace_subtitle, CapabilityProbe, ElementPlan, Logger, MediaReadout,
    MemoryLogger, OptionValue, PlaybackShim, PlayerOptions, Result, SeekOutcome, ShimConfig,
    SourceDescriptor, StaticCapabilities, StaticEnvironment, StreamInfo, SubtitleTrack,
    TrackDescriptor, TrackElementPlan, TrackList, SUPPORTED_MIMES,
};

fn avc_init() -> String {
    ['\u{1}', '\u{64}', '\u{0}', '\u{1f}'].iter().collect()
}

fn hevc_init() -> String {
    (0u8..16).map(|b| b as char).collect()
}

fn tracks(info: StreamInfo, tracks: Vec<TrackDescriptor>) -> StreamInfo {
    tracks
        .into_iter()
        .enumerate()
        .fold(info, |info, (i, t)| info.with_track(format!("track{}", i), t))
}

struct Media {
    current_time: f64,
    paused: bool,
    ranges: Vec<(f64, f64)>,
}

impl MediaReadout for Media {
    fn current_time(&self) -> f64 {
        self.current_time
    }
    fn duration(&self) -> f64 {
        f64::INFINITY
    }
    fn paused(&self) -> bool {
        self.paused
    }
    fn buffered_len(&self) -> u32 {
        self.ranges.len() as u32
    }
    fn buffered_start(&self, index: u32) -> f64 {
        self.ranges[index as usize].0
    }
    fn buffered_end(&self, index: u32) -> f64 {
        self.ranges[index as usize].1
    }
}

// =============================================================================
// MIME Table Tests
// =============================================================================

#[test]
fn test_mime_membership() {
    for mime in SUPPORTED_MIMES {
        assert!(is_mime_supported(mime));
    }
    for mime in ["html5/video/x-matroska", "html5/video/MP4", "flash/7", "webrtc"] {
        assert!(!is_mime_supported(mime));
    }
}

// =============================================================================
// Capability Probe Tests
// =============================================================================

#[test]
fn test_mp4_many_codecs_counts_individual_answers() {
    let info = tracks(
        StreamInfo::on_demand(),
        vec![
            TrackDescriptor::new("video", "H264").with_init(avc_init()),
            TrackDescriptor::new("audio", "AAC"),
            TrackDescriptor::new("audio", "AC3"),
        ],
    );
    let env = StaticEnvironment::default();
    let logger = MemoryLogger::new();
    let config = ShimConfig::default();
    let source = SourceDescriptor::new("html5/video/mp4", "https://media.example/a.mp4").with_simul_tracks(2);

    // Two of three codecs playable, two required
    let caps = StaticCapabilities::new([
        "video/mp4;codecs=\"avc1.64001f\"",
        "video/mp4;codecs=\"mp4a.40.2\"",
    ]);
    let probe = CapabilityProbe::new(&caps, &env, &logger, &config);
    assert!(probe.is_browser_supported("html5/video/mp4", &source, &info));

    // Only one playable
    let caps = StaticCapabilities::new(["video/mp4;codecs=\"mp4a.40.2\""]);
    let probe = CapabilityProbe::new(&caps, &env, &logger, &config);
    assert!(!probe.is_browser_supported("html5/video/mp4", &source, &info));
}

#[test]
fn test_mp4_few_codecs_uses_joined_query() {
    let info = tracks(
        StreamInfo::on_demand(),
        vec![
            TrackDescriptor::new("video", "H264").with_init(avc_init()),
            TrackDescriptor::new("audio", "AAC"),
            TrackDescriptor::new("meta", "JSON"),
        ],
    );
    let env = StaticEnvironment::default();
    let logger = MemoryLogger::new();
    let config = ShimConfig::default();
    let source = SourceDescriptor::new("html5/video/mp4", "https://media.example/a.mp4").with_simul_tracks(2);

    let caps = StaticCapabilities::new(["video/mp4;codecs=\"avc1.64001f,mp4a.40.2\""]);
    let probe = CapabilityProbe::new(&caps, &env, &logger, &config);
    assert!(probe.is_browser_supported("html5/video/mp4", &source, &info));

    // Individually playable is not enough for the joined query
    let caps = StaticCapabilities::new([
        "video/mp4;codecs=\"avc1.64001f\"",
        "video/mp4;codecs=\"mp4a.40.2\"",
    ]);
    let probe = CapabilityProbe::new(&caps, &env, &logger, &config);
    assert!(!probe.is_browser_supported("html5/video/mp4", &source, &info));
}

#[test]
fn test_non_mp4_excludes_hevc_before_count() {
    let info = tracks(
        StreamInfo::on_demand(),
        vec![
            TrackDescriptor::new("video", "HEVC").with_init(hevc_init()),
            TrackDescriptor::new("audio", "opus"),
        ],
    );
    let env = StaticEnvironment::default();
    let logger = MemoryLogger::new();
    let config = ShimConfig::default();
    let caps = StaticCapabilities::new(["video/webm"]);
    let probe = CapabilityProbe::new(&caps, &env, &logger, &config);

    let source = SourceDescriptor::new("html5/video/webm", "https://media.example/a.webm").with_simul_tracks(2);
    assert!(!probe.is_browser_supported("html5/video/webm", &source, &info));

    let source = source.with_simul_tracks(1);
    assert!(probe.is_browser_supported("html5/video/webm", &source, &info));
}

#[test]
fn test_short_init_webm_answers_from_container() {
    let info = tracks(
        StreamInfo::on_demand(),
        vec![
            TrackDescriptor::new("video", "H264").with_init("\u{1}"),
            TrackDescriptor::new("audio", "opus"),
        ],
    );
    let env = StaticEnvironment::default();
    let logger = MemoryLogger::new();
    let config = ShimConfig::default();
    let caps = StaticCapabilities::new(["video/webm"]);
    let probe = CapabilityProbe::new(&caps, &env, &logger, &config);

    let source = SourceDescriptor::new("html5/video/webm", "https://media.example/a.webm").with_simul_tracks(2);
    assert!(probe.is_browser_supported("html5/video/webm", &source, &info));
}

#[test]
fn test_protocol_mismatch() {
    let info = tracks(StreamInfo::on_demand(), vec![TrackDescriptor::new("audio", "opus")]);
    let caps = StaticCapabilities::new(["audio/ogg"]);
    let logger = MemoryLogger::new();
    let config = ShimConfig::default();
    let http = SourceDescriptor::new("html5/audio/ogg", "http://media.example/a.ogg");
    let https = SourceDescriptor::new("html5/audio/ogg", "https://media.example/a.ogg");

    let env = StaticEnvironment::new("https:", "");
    let probe = CapabilityProbe::new(&caps, &env, &logger, &config);
    assert!(!probe.is_browser_supported("html5/audio/ogg", &http, &info));
    assert!(logger.contains("HTTP/HTTPS mismatch"));
    assert!(probe.is_browser_supported("html5/audio/ogg", &https, &info));

    let env = StaticEnvironment::new("file:", "");
    let probe = CapabilityProbe::new(&caps, &env, &logger, &config);
    assert!(probe.is_browser_supported("html5/audio/ogg", &http, &info));
    assert!(logger.contains("file://"));
    assert!(!probe.is_browser_supported("html5/audio/ogg", &https, &info));
}

#[test]
fn test_native_hls_skipped_on_old_android() {
    let info = tracks(StreamInfo::live(), vec![TrackDescriptor::new("audio", "AAC")]);
    let caps = StaticCapabilities::new(["application/vnd.apple.mpegurl"]);
    let logger = MemoryLogger::new();
    let config = ShimConfig::default();
    let source = SourceDescriptor::new("html5/application/vnd.apple.mpegurl", "https://media.example/a.m3u8");

    let old = StaticEnvironment::new("https:", "Mozilla/5.0 (Linux; Android 6.0.1; Nexus 5)");
    let probe = CapabilityProbe::new(&caps, &old, &logger, &config);
    assert!(!probe.is_browser_supported("html5/application/vnd.apple.mpegurl", &source, &info));

    let new = StaticEnvironment::new("https:", "Mozilla/5.0 (Linux; Android 9; Pixel 3)");
    let probe = CapabilityProbe::new(&caps, &new, &logger, &config);
    assert!(probe.is_browser_supported("html5/application/vnd.apple.mpegurl", &source, &info));
}

// =============================================================================
// Element Builder Tests
// =============================================================================

#[test]
fn test_live_element_never_loops() {
    let options = PlayerOptions {
        loop_playback: Some(OptionValue::Flag(true)),
        ..Default::default()
    };
    let source = SourceDescriptor::new("html5/video/webm", "https://media.example/live.webm");
    let plan = ElementPlan::new(&source, &options, &StreamInfo::live());
    assert!(plan.has_attribute("loop"));
    assert!(plan.disable_loop);
}

#[derive(Default)]
struct Tracks(Vec<TrackElementPlan>);

impl TrackList for Tracks {
    fn track_count(&self) -> u32 {
        self.0.len() as u32
    }
    fn remove_track(&mut self, index: u32) -> Result<()> {
        self.0.remove(index as usize);
        Ok(())
    }
    fn append_track(&mut self, plan: &TrackElementPlan) -> Result<()> {
        self.0.push(plan.clone());
        Ok(())
    }
}

#[test]
fn test_clearing_subtitles_removes_every_track() {
    let track = SubtitleTrack {
        label: "English".into(),
        lang: "en".into(),
        src: "https://media.example/en.vtt".into(),
    };
    let existing = TrackElementPlan::for_subtitle(Some(&track)).unwrap();
    let mut list = Tracks(vec![existing.clone(), existing]);

    replace_subtitle(&mut list, None).unwrap();
    assert_eq!(list.track_count(), 0);

    replace_subtitle(&mut list, Some(&track)).unwrap();
    assert_eq!(list.track_count(), 1);
    assert_eq!(list.0[0].kind, "subtitles");
}

// =============================================================================
// Playback Shim Tests
// =============================================================================

#[test]
fn test_mp3_seek_never_moves() {
    let source = SourceDescriptor::new("html5/audio/mp3", "https://media.example/a.mp3");
    let mut shim = PlaybackShim::new(&source, &StreamInfo::on_demand(), true, ShimConfig::default(), 0.0);
    let media = Media {
        current_time: 3.0,
        paused: false,
        ranges: vec![],
    };
    let logger = MemoryLogger::new();
    for target in [0.0, 3.0, 100.0] {
        assert_eq!(shim.seek(target, &media, 0.0, &logger), SeekOutcome::Rejected);
    }
    assert_eq!(shim.current_time(&media), 3.0);
    assert_eq!(logger.lines().len(), 3);
}

#[test]
fn test_live_mp4_seek_to_duration_rejoins_edge() {
    let source = SourceDescriptor::new("html5/video/mp4", "https://media.example/live.mp4");
    let info = StreamInfo::live().with_lastms(30_000.0);
    let mut shim = PlaybackShim::new(&source, &info, false, ShimConfig::default(), 0.0);
    let media = Media {
        current_time: 9.0,
        paused: false,
        ranges: vec![(0.0, 10.0)],
    };
    let logger = MemoryLogger::new();

    let duration = shim.duration(&media, 1_000.0);
    assert_eq!(
        shim.seek(duration, &media, 1_000.0, &logger),
        SeekOutcome::Reload {
            url: "https://media.example/live.mp4".to_string(),
            offset: 0.0
        }
    );

    let duration = shim.duration(&media, 1_000.0);
    match shim.seek(duration - 15.0, &media, 1_000.0, &logger) {
        SeekOutcome::Reload { url, offset } => {
            assert_eq!(offset, -15.0);
            assert_eq!(url, "https://media.example/live.mp4?startunix=-15");
        }
        other => panic!("unexpected seek outcome: {:?}", other),
    }
}

#[test]
fn test_stale_pause_forces_reload() {
    let source = SourceDescriptor::new("html5/video/webm", "https://media.example/live.webm");
    let mut shim = PlaybackShim::new(&source, &StreamInfo::live(), false, ShimConfig::default(), 0.0);
    let media = Media {
        current_time: 0.0,
        paused: true,
        ranges: vec![],
    };
    let logger = MemoryLogger::new();

    shim.on_pause(10_000.0);
    assert!(!shim.before_play(&media, 15_000.0, &logger));
    assert!(shim.before_play(&media, 15_001.0, &logger));
    assert!(logger.contains("Reloading source"));
}

#[test]
fn test_live_seek_without_reload_url_changes_nothing() {
    let source = SourceDescriptor::new("html5/video/mp4", "/live.mp4");
    let info = StreamInfo::live().with_lastms(30_000.0);
    let mut shim = PlaybackShim::new(&source, &info, false, ShimConfig::default(), 0.0);
    let media = Media {
        current_time: 9.0,
        paused: false,
        ranges: vec![(0.0, 10.0)],
    };
    let logger = MemoryLogger::new();

    let duration = shim.duration(&media, 1_000.0);
    let current = shim.current_time(&media);
    assert_eq!(shim.seek(duration - 15.0, &media, 1_000.0, &logger), SeekOutcome::Rejected);
    assert_eq!(shim.duration(&media, 1_000.0), duration);
    assert_eq!(shim.current_time(&media), current);
}

/// Host log sink that reads the shared shim whenever it is called
struct ReadingHost {
    shim: Rc<RefCell<PlaybackShim>>,
    readable: RefCell<Vec<bool>>,
}

impl Logger for ReadingHost {
    fn log(&self, _message: &str) {
        self.readable.borrow_mut().push(self.shim.try_borrow().is_ok());
    }
}

#[test]
fn test_host_log_can_read_shim_after_seek() {
    let source = SourceDescriptor::new("html5/video/webm", "https://media.example/live.webm");
    let shim = Rc::new(RefCell::new(PlaybackShim::new(
        &source,
        &StreamInfo::live(),
        false,
        ShimConfig::default(),
        0.0,
    )));
    let host = ReadingHost {
        shim: shim.clone(),
        readable: RefCell::new(Vec::new()),
    };
    let media = Media {
        current_time: 0.0,
        paused: false,
        ranges: vec![(0.0, 10.0)],
    };

    let pending = MemoryLogger::new();
    let outcome = shim.borrow_mut().seek(5.0, &media, 0.0, &pending);
    pending.flush_into(&host);

    assert!(matches!(outcome, SeekOutcome::Reload { .. }));
    assert_eq!(*host.readable.borrow(), vec![true]);
    assert_eq!(shim.borrow().clock().live_offset(), -5.0);
}
