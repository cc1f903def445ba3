//! Runtime seams: what the page looks like and what the media stack can play

use crate::Result;

/// Answers `canPlayType`-style queries
pub trait MediaCapabilities {
    /// `"probably"`, `"maybe"` or an empty string for "no"
    fn can_play_type(&self, query: &str) -> Result<String>;
}

/// Facts about the hosting page
pub trait PageEnvironment {
    /// Protocol of the page, with the trailing colon (`https:`)
    fn page_protocol(&self) -> String;

    fn user_agent(&self) -> String;

    /// Android release the page runs on, if any
    fn android_version(&self) -> Option<f64> {
        android_version(&self.user_agent())
    }
}

/// Capability oracle backed by a fixed list of playable query strings.
///
/// Queries are matched exactly; a bare container MIME is also playable
/// when any listed query starts with it.
#[derive(Debug, Clone, Default)]
pub struct StaticCapabilities {
    playable: Vec<String>,
}

impl StaticCapabilities {
    pub fn new<I, S>(playable: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            playable: playable.into_iter().map(Into::into).collect(),
        }
    }
}

impl MediaCapabilities for StaticCapabilities {
    fn can_play_type(&self, query: &str) -> Result<String> {
        let bare = !query.contains(';');
        let hit = self.playable.iter().any(|p| {
            p == query || (bare && p.split(';').next() == Some(query))
        });
        Ok(if hit { "maybe".to_string() } else { String::new() })
    }
}

/// Page environment with fixed values
#[derive(Debug, Clone)]
pub struct StaticEnvironment {
    pub protocol: String,
    pub user_agent: String,
}

impl StaticEnvironment {
    pub fn new(protocol: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            user_agent: user_agent.into(),
        }
    }
}

impl Default for StaticEnvironment {
    fn default() -> Self {
        Self::new("https:", "Mozilla/5.0 (X11; Linux x86_64)")
    }
}

impl PageEnvironment for StaticEnvironment {
    fn page_protocol(&self) -> String {
        self.protocol.clone()
    }

    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }
}

/// Extract `major.minor` from an `Android X.Y` user agent token
pub fn android_version(user_agent: &str) -> Option<f64> {
    let idx = user_agent.find("Android")?;
    let rest = user_agent[idx + "Android".len()..].trim_start();
    let mut seen_dot = false;
    let end = rest
        .char_indices()
        .find(|&(_, c)| {
            if c == '.' && !seen_dot {
                seen_dot = true;
                false
            } else {
                !c.is_ascii_digit()
            }
        })
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    rest[..end].trim_end_matches('.').parse().ok()
}
