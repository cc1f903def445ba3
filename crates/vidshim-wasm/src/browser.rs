//! Browser-backed implementations of the core seams

use js_sys::{Date, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, Document, HtmlVideoElement};

use vidshim_core::{Error, MediaCapabilities, MediaReadout, PageEnvironment, Result};

/// Wall clock in milliseconds
pub fn now_ms() -> f64 {
    Date::now()
}

pub fn document() -> Result<Document> {
    window()
        .and_then(|w| w.document())
        .ok_or_else(|| Error::Dom("No document available".to_string()))
}

/// Wrap a JS exception as a DOM error
pub fn dom_error(context: &'static str) -> impl Fn(JsValue) -> Error {
    move |e| Error::Dom(format!("{}: {:?}", context, e))
}

pub fn create_video(document: &Document) -> Result<HtmlVideoElement> {
    document
        .create_element("video")
        .map_err(dom_error("Failed to create video element"))?
        .dyn_into()
        .map_err(|_| Error::Dom("Element is not a video".to_string()))
}

/// Does the runtime offer `Proxy` and `Reflect`?
pub fn supports_interception() -> bool {
    let global = js_sys::global();
    ["Proxy", "Reflect"]
        .iter()
        .all(|name| Reflect::has(&global, &JsValue::from_str(name)).unwrap_or(false))
}

/// `canPlayType` on a scratch video element
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserCapabilities;

impl MediaCapabilities for BrowserCapabilities {
    fn can_play_type(&self, query: &str) -> Result<String> {
        let video = create_video(&document()?)?;
        Ok(video.can_play_type(query))
    }
}

/// Location and navigator of the current window
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserEnvironment;

impl PageEnvironment for BrowserEnvironment {
    fn page_protocol(&self) -> String {
        window()
            .and_then(|w| w.location().protocol().ok())
            .unwrap_or_default()
    }

    fn user_agent(&self) -> String {
        window()
            .and_then(|w| w.navigator().user_agent().ok())
            .unwrap_or_default()
    }
}

/// Native time readouts of a video element
pub struct VideoReadout<'a>(pub &'a HtmlVideoElement);

impl MediaReadout for VideoReadout<'_> {
    fn current_time(&self) -> f64 {
        self.0.current_time()
    }

    fn duration(&self) -> f64 {
        self.0.duration()
    }

    fn paused(&self) -> bool {
        self.0.paused()
    }

    fn buffered_len(&self) -> u32 {
        self.0.buffered().length()
    }

    fn buffered_start(&self, index: u32) -> f64 {
        self.0.buffered().start(index).unwrap_or(f64::NAN)
    }

    fn buffered_end(&self, index: u32) -> f64 {
        self.0.buffered().end(index).unwrap_or(f64::NAN)
    }
}
