//! Capability probe
//!
//! Decides whether the current browser can play a source through a plain
//! media element. Every query goes through a [`MediaCapabilities`] oracle so
//! the same decision runs in the browser, in tests and in CLI dry-runs.
//!
//! The probe never fails: configuration problems answer `false` (with a
//! line in the host log) and errors raised while querying are swallowed,
//! leaving whatever answer was obtained before the error.

use tracing::{debug, warn};

use crate::{
    codec::{codecs_query, distinct_codecs, is_hevc},
    config::ShimConfig,
    logger::Logger,
    mime::{self, Mime},
    platform::{MediaCapabilities, PageEnvironment},
    source_url::protocol_of,
    Result, SourceDescriptor, StreamInfo,
};

/// The queries a probe issues and how their answers combine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbePlan {
    /// Each codec asked on its own; at least `required` must be playable
    AtLeast { queries: Vec<String>, required: usize },
    /// One query decides
    Single(String),
    /// Too few tracks are left once unplayable codecs are dropped
    TooFewTracks { remaining: usize, required: usize },
}

impl ProbePlan {
    /// Build the plan for a namespaced MIME and a track manifest
    pub fn build(mime: &Mime<'_>, source: &SourceDescriptor, info: &StreamInfo) -> Self {
        let container = mime.media();
        let mut codecs = distinct_codecs(info.media_tracks());

        if mime.is_mp4() {
            if codecs.is_empty() {
                return ProbePlan::Single(container.to_string());
            }
            if codecs.len() > source.simul_tracks {
                let queries = codecs
                    .iter()
                    .map(|c| codecs_query(container, std::slice::from_ref(c)))
                    .collect();
                return ProbePlan::AtLeast {
                    queries,
                    required: source.simul_tracks,
                };
            }
            return ProbePlan::Single(codecs_query(container, &codecs));
        }

        codecs.retain(|c| !is_hevc(c));
        if codecs.len() < source.simul_tracks {
            return ProbePlan::TooFewTracks {
                remaining: codecs.len(),
                required: source.simul_tracks,
            };
        }
        ProbePlan::Single(container.to_string())
    }

    /// Every query string this plan will hand to the oracle
    pub fn queries(&self) -> Vec<&str> {
        match self {
            ProbePlan::AtLeast { queries, .. } => queries.iter().map(String::as_str).collect(),
            ProbePlan::Single(q) => vec![q.as_str()],
            ProbePlan::TooFewTracks { .. } => Vec::new(),
        }
    }
}

/// Browser support check for the HTML5 backend
pub struct CapabilityProbe<'a> {
    caps: &'a dyn MediaCapabilities,
    env: &'a dyn PageEnvironment,
    logger: &'a dyn Logger,
    config: &'a ShimConfig,
}

impl<'a> CapabilityProbe<'a> {
    pub fn new(
        caps: &'a dyn MediaCapabilities,
        env: &'a dyn PageEnvironment,
        logger: &'a dyn Logger,
        config: &'a ShimConfig,
    ) -> Self {
        Self {
            caps,
            env,
            logger,
            config,
        }
    }

    /// Pure membership test against the supported MIME list
    pub fn is_mime_supported(&self, mime: &str) -> bool {
        mime::is_mime_supported(mime)
    }

    /// Can this browser play `source` when offered as `mime`?
    pub fn is_browser_supported(
        &self,
        mime: &str,
        source: &SourceDescriptor,
        info: &StreamInfo,
    ) -> bool {
        if !self.protocol_allowed(&source.url) {
            return false;
        }

        let parsed = Mime::parse(mime);
        if parsed.is_native_hls() {
            if let Some(version) = self.env.android_version() {
                if version < self.config.native_hls_min_android {
                    self.logger.log("Skipping native HLS as a library player will do better");
                    return false;
                }
            }
        }

        let mut answer = String::new();
        let plan = ProbePlan::build(&parsed, source, info);

        match self.evaluate(&plan, &mut answer) {
            Ok(supported) => {
                debug!(mime, supported, "Capability probe finished");
                supported
            }
            Err(e) => {
                warn!(mime, error = %e, code = e.error_code(), "Capability probe aborted");
                !answer.is_empty()
            }
        }
    }

    fn protocol_allowed(&self, url: &str) -> bool {
        let page = self.env.page_protocol();
        let source = match protocol_of(url) {
            Ok(p) => p,
            Err(e) => {
                debug!(url, error = %e, "Source URL has no protocol");
                self.logger.log("HTTP/HTTPS mismatch for this source");
                return false;
            }
        };
        if page == source {
            return true;
        }
        if page == "file:" && source == "http:" {
            self.logger
                .log("This page was loaded over file://, the player might not behave as intended.");
            return true;
        }
        self.logger.log("HTTP/HTTPS mismatch for this source");
        false
    }

    fn evaluate(&self, plan: &ProbePlan, answer: &mut String) -> Result<bool> {
        match plan {
            ProbePlan::AtLeast { queries, required } => {
                let mut playable = 0;
                for query in queries {
                    if !self.query(query, answer)?.is_empty() {
                        playable += 1;
                    }
                }
                debug!(playable, required, "Codecs probed one by one");
                Ok(playable >= *required)
            }
            ProbePlan::Single(query) => Ok(!self.query(query, answer)?.is_empty()),
            ProbePlan::TooFewTracks { remaining, required } => {
                debug!(remaining, required, "Not enough playable tracks");
                Ok(false)
            }
        }
    }

    /// Ask the oracle, remembering the last positive answer
    fn query(&self, query: &str, answer: &mut String) -> Result<String> {
        let result = self.caps.can_play_type(query)?;
        if !result.is_empty() {
            answer.clone_from(&result);
        }
        Ok(result)
    }
}
