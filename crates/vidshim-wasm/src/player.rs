//! HTML5 player construction
//!
//! Builds the `<video>` element from the core's [`ElementPlan`], wires up the
//! live clock listeners and, when the runtime has `Proxy`, hands the host an
//! intercepting proxy instead of the bare element.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Function, Object, Reflect};
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlSourceElement, HtmlTrackElement, HtmlVideoElement};

use vidshim_core::{
    replace_subtitle, Dimensions, ElementPlan, Error, PlaybackShim, PlayerOptions,
    Result as ShimResult, ShimConfig, SourceDescriptor, StreamInfo, SubtitleTrack,
    TrackElementPlan, TrackList,
};

use crate::browser::{create_video, document, dom_error, now_ms, supports_interception};
use crate::host_log::HostLogger;
use crate::proxy::{self, publish_clock, swap_source, ShimContext};
use crate::{parse_config, to_js_error};

/// What the host passes to `build`
#[derive(Debug, Deserialize)]
struct BuildRequest {
    source: SourceDescriptor,
    #[serde(default)]
    options: PlayerOptions,
    #[serde(default)]
    info: StreamInfo,
}

/// A built HTML5 player
#[wasm_bindgen]
pub struct Html5Player {
    video: HtmlVideoElement,
    source: HtmlSourceElement,
    api: JsValue,
    shim: Rc<RefCell<PlaybackShim>>,
}

#[wasm_bindgen]
impl Html5Player {
    /// Build the element for `request` (`{source, options, info}`)
    #[wasm_bindgen(constructor)]
    pub fn new(request: JsValue, log: Option<Function>, config: JsValue) -> Result<Html5Player, JsValue> {
        let request: BuildRequest = serde_wasm_bindgen::from_value(request)?;
        let config = parse_config(config)?;
        let logger = Rc::new(HostLogger::new(log));
        Self::build(request, config, logger).map_err(to_js_error)
    }

    /// The handle the host should drive: a proxy when available, else the element
    #[wasm_bindgen(getter)]
    pub fn api(&self) -> JsValue {
        self.api.clone()
    }

    /// The bare video element
    #[wasm_bindgen(getter)]
    pub fn element(&self) -> HtmlVideoElement {
        self.video.clone()
    }

    #[wasm_bindgen(getter, js_name = liveOffset)]
    pub fn live_offset(&self) -> f64 {
        self.shim.borrow().clock().live_offset()
    }

    /// Swap the source URL and reload, unless it is unchanged
    #[wasm_bindgen(js_name = setSource)]
    pub fn set_source(&self, url: &str) {
        swap_source(&self.video, &self.source, url);
    }

    /// Replace all subtitle tracks with `track`, or clear them for `null`
    #[wasm_bindgen(js_name = setSubtitle)]
    pub fn set_subtitle(&self, track: JsValue) -> Result<(), JsValue> {
        let track = parse_subtitle(track)?;
        replace_subtitle(&mut VideoTracks(&self.video), track.as_ref()).map_err(to_js_error)
    }

    /// Set the element's pixel size (`{width, height}`)
    #[wasm_bindgen(js_name = setSize)]
    pub fn set_size(&self, size: JsValue) -> Result<(), JsValue> {
        let size: Dimensions = serde_wasm_bindgen::from_value(size)?;
        apply_size(&self.video, size).map_err(to_js_error)
    }

    /// Install the handle on a host player object as `player.api` and
    /// `player.setSize`
    pub fn attach(&self, player: &Object) -> Result<(), JsValue> {
        Reflect::set(player, &"api".into(), &self.api)?;
        Reflect::set(player, &"setSize".into(), &size_fn(&self.video))?;
        Ok(())
    }
}

impl Html5Player {
    fn build(request: BuildRequest, config: ShimConfig, logger: Rc<HostLogger>) -> ShimResult<Self> {
        let BuildRequest {
            source,
            options,
            info,
        } = request;

        let document = document()?;
        let plan = ElementPlan::new(&source, &options, &info);
        let (video, source_el) = create_element(&document, &plan)?;

        let shim = Rc::new(RefCell::new(PlaybackShim::new(
            &source,
            &info,
            video.duration().is_finite(),
            config,
            now_ms(),
        )));

        let api = if supports_interception() {
            let ctx = ShimContext {
                video: video.clone(),
                source: source_el.clone(),
                shim: shim.clone(),
                logger,
            };
            if ctx.shim.borrow().plan().is_live() {
                listen_live_clock(&ctx)?;
            }
            proxy::wrap(&ctx).map_err(dom_error("Failed to build proxy"))?
        } else {
            web_sys::console::warn_1(&"[VidShim] Proxy unavailable, exposing the bare element".into());
            video.clone().into()
        };

        install_methods(&video, &source_el)?;

        Ok(Self {
            video,
            source: source_el,
            api,
            shim,
        })
    }
}

/// Build a player and call `on_ready` with the element
#[wasm_bindgen]
pub fn build(
    request: JsValue,
    log: Option<Function>,
    config: JsValue,
    on_ready: &Function,
) -> Result<Html5Player, JsValue> {
    let player = Html5Player::new(request, log, config)?;
    on_ready.call1(&JsValue::NULL, &player.video)?;
    Ok(player)
}

fn create_element(
    document: &Document,
    plan: &ElementPlan,
) -> ShimResult<(HtmlVideoElement, HtmlSourceElement)> {
    let video = create_video(document)?;
    for (name, value) in &plan.attributes {
        video
            .set_attribute(name, value)
            .map_err(dom_error("Failed to set attribute"))?;
    }

    let source: HtmlSourceElement = document
        .create_element("source")
        .map_err(dom_error("Failed to create source element"))?
        .dyn_into()
        .map_err(|_| Error::Dom("Element is not a source".to_string()))?;
    source.set_src(&plan.source_src);
    source.set_type(&plan.source_type);
    video
        .append_child(&source)
        .map_err(dom_error("Failed to append source"))?;

    if plan.muted {
        video.set_muted(true);
    }
    if plan.disable_loop {
        video.set_loop(false);
    }
    Ok((video, source))
}

/// Track `progress` and `pause` for the live clock
fn listen_live_clock(ctx: &ShimContext) -> ShimResult<()> {
    let on_progress = {
        let ctx = ctx.clone();
        Closure::<dyn Fn()>::new(move || {
            ctx.shim.borrow_mut().on_progress(now_ms());
            ctx.publish_clock();
        })
    };
    let on_pause = {
        let ctx = ctx.clone();
        Closure::<dyn Fn()>::new(move || {
            ctx.shim.borrow_mut().on_pause(now_ms());
            ctx.publish_clock();
        })
    };

    for (event, callback) in [("progress", on_progress), ("pause", on_pause)] {
        ctx.video
            .add_event_listener_with_callback(event, callback.into_js_value().unchecked_ref())
            .map_err(dom_error("Failed to add listener"))?;
    }
    publish_clock(&ctx.video, ctx.shim.borrow().clock());
    Ok(())
}

/// Put `setSource`, `setSubtitle` and `setSize` on the element itself so
/// they are reachable through the proxy as well
fn install_methods(video: &HtmlVideoElement, source: &HtmlSourceElement) -> ShimResult<()> {
    let set_source = {
        let (video, source) = (video.clone(), source.clone());
        Closure::<dyn Fn(String)>::new(move |url: String| swap_source(&video, &source, &url))
    };
    let set_subtitle = {
        let video = video.clone();
        Closure::<dyn Fn(JsValue) -> Result<(), JsValue>>::new(move |track: JsValue| {
            let track = parse_subtitle(track)?;
            replace_subtitle(&mut VideoTracks(&video), track.as_ref()).map_err(to_js_error)
        })
    };

    let methods = [
        ("setSource", set_source.into_js_value()),
        ("setSubtitle", set_subtitle.into_js_value()),
        ("setSize", size_fn(video)),
    ];
    for (name, method) in methods {
        Reflect::set(video, &name.into(), &method).map_err(dom_error("Failed to install method"))?;
    }
    Ok(())
}

fn size_fn(video: &HtmlVideoElement) -> JsValue {
    let video = video.clone();
    Closure::<dyn Fn(JsValue) -> Result<(), JsValue>>::new(move |size: JsValue| {
        let size: Dimensions = serde_wasm_bindgen::from_value(size)?;
        apply_size(&video, size).map_err(to_js_error)
    })
    .into_js_value()
}

fn parse_subtitle(track: JsValue) -> Result<Option<SubtitleTrack>, JsValue> {
    if track.is_null() || track.is_undefined() {
        return Ok(None);
    }
    Ok(Some(serde_wasm_bindgen::from_value(track)?))
}

/// The `<track>` children of the video element
struct VideoTracks<'a>(&'a HtmlVideoElement);

impl TrackList for VideoTracks<'_> {
    fn track_count(&self) -> u32 {
        self.0.get_elements_by_tag_name("track").length()
    }

    fn remove_track(&mut self, index: u32) -> ShimResult<()> {
        if let Some(old) = self.0.get_elements_by_tag_name("track").item(index) {
            self.0
                .remove_child(&old)
                .map_err(dom_error("Failed to remove track"))?;
        }
        Ok(())
    }

    fn append_track(&mut self, plan: &TrackElementPlan) -> ShimResult<()> {
        let element: HtmlTrackElement = document()?
            .create_element("track")
            .map_err(dom_error("Failed to create track element"))?
            .dyn_into()
            .map_err(|_| Error::Dom("Element is not a track".to_string()))?;
        self.0
            .append_child(&element)
            .map_err(dom_error("Failed to append track"))?;
        element.set_kind(plan.kind);
        element.set_label(&plan.label);
        element.set_srclang(&plan.srclang);
        element.set_src(&plan.src);
        if plan.default {
            element
                .set_attribute("default", "")
                .map_err(dom_error("Failed to mark default track"))?;
        }
        Ok(())
    }
}

fn apply_size(video: &HtmlVideoElement, size: Dimensions) -> ShimResult<()> {
    let (width, height) = size.css();
    let style = video.style();
    style
        .set_property("width", &width)
        .map_err(dom_error("Failed to set width"))?;
    style
        .set_property("height", &height)
        .map_err(dom_error("Failed to set height"))?;
    Ok(())
}
