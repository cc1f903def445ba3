//! Declarative description of the media element to build

use serde::Serialize;

use crate::{ControlStyle, PlayerOptions, Result, SourceDescriptor, StreamInfo, SubtitleTrack};

/// Everything needed to construct the `<video>` element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementPlan {
    /// Attributes in application order; an empty value means presence-only
    pub attributes: Vec<(String, String)>,
    /// Set as a property, not an attribute
    pub muted: bool,
    /// Clear the `loop` property after attributes are applied
    pub disable_loop: bool,
    /// URL of the nested `<source>`
    pub source_src: String,
    /// Real MIME of the nested `<source>`
    pub source_type: String,
}

impl ElementPlan {
    pub fn new(source: &SourceDescriptor, options: &PlayerOptions, info: &StreamInfo) -> Self {
        let mut attributes = vec![
            ("crossorigin".to_string(), "anonymous".to_string()),
            ("playsinline".to_string(), String::new()),
        ];

        for (name, value) in options.attribute_options() {
            if let Some(value) = value.and_then(|v| v.attribute_value()) {
                attributes.push((name.to_string(), value.to_string()));
            }
        }

        if options.controls == ControlStyle::Stock {
            attributes.push(("controls".to_string(), String::new()));
        }

        Self {
            attributes,
            muted: options.muted,
            disable_loop: info.is_live(),
            source_src: source.url.clone(),
            source_type: source.parsed_mime().media().to_string(),
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|(n, _)| n == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// The `<track>` element `setSubtitle` adds after clearing existing ones
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackElementPlan {
    pub kind: &'static str,
    pub label: String,
    pub srclang: String,
    pub src: String,
    pub default: bool,
}

impl TrackElementPlan {
    /// `None` clears subtitles without adding a replacement
    pub fn for_subtitle(track: Option<&SubtitleTrack>) -> Option<Self> {
        track.map(|t| Self {
            kind: "subtitles",
            label: t.label.clone(),
            srclang: t.lang.clone(),
            src: t.src.clone(),
            default: true,
        })
    }
}

/// The `<track>` children of a media element
pub trait TrackList {
    fn track_count(&self) -> u32;
    fn remove_track(&mut self, index: u32) -> Result<()>;
    fn append_track(&mut self, plan: &TrackElementPlan) -> Result<()>;
}

/// Drop every existing `<track>`, last first, then add `track` if given
pub fn replace_subtitle(list: &mut dyn TrackList, track: Option<&SubtitleTrack>) -> Result<()> {
    for index in (0..list.track_count()).rev() {
        list.remove_track(index)?;
    }
    if let Some(plan) = TrackElementPlan::for_subtitle(track) {
        list.append_track(&plan)?;
    }
    Ok(())
}

/// `setSource` only reloads when the URL actually changes
pub fn source_changed(current: &str, requested: &str) -> bool {
    current != requested
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OptionValue;

    #[test]
    fn test_base_attributes() {
        let source = SourceDescriptor::new("html5/video/webm", "https://x/a.webm");
        let plan = ElementPlan::new(&source, &PlayerOptions::default(), &StreamInfo::on_demand());
        assert_eq!(plan.attribute("crossorigin"), Some("anonymous"));
        assert_eq!(plan.attribute("playsinline"), Some(""));
        assert_eq!(plan.source_type, "video/webm");
        assert_eq!(plan.source_src, "https://x/a.webm");
        assert!(!plan.has_attribute("controls"));
        assert!(!plan.muted);
        assert!(!plan.disable_loop);
    }

    #[test]
    fn test_option_attributes() {
        let options = PlayerOptions {
            autoplay: Some(OptionValue::Flag(true)),
            loop_playback: Some(OptionValue::Flag(false)),
            poster: Some(OptionValue::Text("https://x/poster.jpg".into())),
            muted: true,
            controls: ControlStyle::Stock,
        };
        let source = SourceDescriptor::new("html5/video/mp4", "https://x/a.mp4");
        let plan = ElementPlan::new(&source, &options, &StreamInfo::live());
        assert_eq!(plan.attribute("autoplay"), Some(""));
        assert!(!plan.has_attribute("loop"));
        assert_eq!(plan.attribute("poster"), Some("https://x/poster.jpg"));
        assert_eq!(plan.attribute("controls"), Some(""));
        assert!(plan.muted);
        assert!(plan.disable_loop);
    }

    #[test]
    fn test_external_controls_left_alone() {
        let options = PlayerOptions {
            controls: ControlStyle::External("skin".into()),
            ..Default::default()
        };
        let source = SourceDescriptor::new("html5/video/mp4", "https://x/a.mp4");
        let plan = ElementPlan::new(&source, &options, &StreamInfo::on_demand());
        assert!(!plan.has_attribute("controls"));
    }

    #[test]
    fn test_subtitle_plan() {
        assert_eq!(TrackElementPlan::for_subtitle(None), None);
        let track = SubtitleTrack {
            label: "English".into(),
            lang: "en".into(),
            src: "https://x/en.vtt".into(),
        };
        let plan = TrackElementPlan::for_subtitle(Some(&track)).unwrap();
        assert_eq!(plan.kind, "subtitles");
        assert_eq!(plan.srclang, "en");
        assert!(plan.default);
    }

    #[derive(Default)]
    struct FakeTracks {
        tracks: Vec<TrackElementPlan>,
        removed: Vec<u32>,
    }

    impl TrackList for FakeTracks {
        fn track_count(&self) -> u32 {
            self.tracks.len() as u32
        }
        fn remove_track(&mut self, index: u32) -> Result<()> {
            self.tracks.remove(index as usize);
            self.removed.push(index);
            Ok(())
        }
        fn append_track(&mut self, plan: &TrackElementPlan) -> Result<()> {
            self.tracks.push(plan.clone());
            Ok(())
        }
    }

    #[test]
    fn test_replace_subtitle_swaps_tracks() {
        let english = SubtitleTrack {
            label: "English".into(),
            lang: "en".into(),
            src: "https://x/en.vtt".into(),
        };
        let german = SubtitleTrack {
            label: "Deutsch".into(),
            lang: "de".into(),
            src: "https://x/de.vtt".into(),
        };
        let mut list = FakeTracks::default();
        replace_subtitle(&mut list, Some(&english)).unwrap();
        replace_subtitle(&mut list, Some(&german)).unwrap();
        assert_eq!(list.tracks.len(), 1);
        assert_eq!(list.tracks[0].srclang, "de");
        assert_eq!(list.removed, vec![0]);
    }

    #[test]
    fn test_source_changed() {
        assert!(!source_changed("https://x/a.mp4", "https://x/a.mp4"));
        assert!(source_changed("https://x/a.mp4", "https://x/a.mp4?startunix=-5"));
    }
}
