//! VidShim WASM - HTML5 video backend for browser players
//!
//! Lets a generic player front-end drive a native `<video>` element:
//! - Capability probing through `canPlayType`
//! - Element construction from a source description and options bag
//! - A `Proxy` that normalizes live timing, seeking and MP3 limits
//!
//! ## Integration
//!
//! ```javascript
//! import init, { isBrowserSupported, build } from '@vidshim/wasm';
//!
//! await init();
//! if (isBrowserSupported(mime, source, info, (m) => player.log(m))) {
//!   const html5 = build({ source, options, info }, (m) => player.log(m), undefined, onReady);
//!   html5.attach(player);
//! }
//! ```

use js_sys::{Array, Function};
use wasm_bindgen::prelude::*;

mod browser;
mod host_log;
mod player;
mod proxy;

pub use browser::{BrowserCapabilities, BrowserEnvironment, VideoReadout};
pub use host_log::HostLogger;
pub use player::{build, Html5Player};

use vidshim_core::{CapabilityProbe, ShimConfig, SourceDescriptor, StreamInfo, SUPPORTED_MIMES};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"[VidShim WASM] Initialized".into());
}

/// Library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Backend display name
#[wasm_bindgen]
pub fn name() -> String {
    vidshim_core::BACKEND_NAME.to_string()
}

/// Whether the host's control skin should drive this backend
#[wasm_bindgen(js_name = mistControls)]
pub fn host_controls() -> bool {
    vidshim_core::HOST_CONTROLS
}

/// Selection priority given how many backends the host already registered
#[wasm_bindgen]
pub fn priority(registered: usize) -> usize {
    vidshim_core::priority(registered)
}

/// Namespaced MIMEs this backend handles
#[wasm_bindgen]
pub fn mimes() -> Array {
    SUPPORTED_MIMES.iter().map(|m| JsValue::from_str(m)).collect()
}

#[wasm_bindgen(js_name = isMimeSupported)]
pub fn is_mime_supported(mime: &str) -> bool {
    vidshim_core::is_mime_supported(mime)
}

/// Can this browser play `source` (`{type, url, simul_tracks}`) for the
/// stream described by `info`? Never throws.
#[wasm_bindgen(js_name = isBrowserSupported)]
pub fn is_browser_supported(
    mime: &str,
    source: JsValue,
    info: JsValue,
    log: Option<Function>,
    config: JsValue,
) -> bool {
    let logger = HostLogger::new(log);
    let parsed = serde_wasm_bindgen::from_value::<SourceDescriptor>(source).and_then(|source| {
        serde_wasm_bindgen::from_value::<StreamInfo>(info).map(|info| (source, info))
    });
    let (source, info) = match parsed {
        Ok(v) => v,
        Err(e) => {
            web_sys::console::warn_2(&"[VidShim] Unreadable source or stream info:".into(), &e.into());
            return false;
        }
    };
    let config = match parse_config(config) {
        Ok(c) => c,
        Err(e) => {
            web_sys::console::warn_2(&"[VidShim] Bad config, using defaults:".into(), &e);
            ShimConfig::default()
        }
    };

    let caps = BrowserCapabilities;
    let env = BrowserEnvironment;
    CapabilityProbe::new(&caps, &env, &logger, &config).is_browser_supported(mime, &source, &info)
}

/// `undefined`/`null` means defaults
pub(crate) fn parse_config(config: JsValue) -> Result<ShimConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(ShimConfig::default());
    }
    let config: ShimConfig = serde_wasm_bindgen::from_value(config)?;
    config.validate().map_err(to_js_error)?;
    Ok(config)
}

pub(crate) fn to_js_error(e: vidshim_core::Error) -> JsValue {
    js_sys::Error::new(&format!("[{}] {}", e.error_code(), e)).into()
}
