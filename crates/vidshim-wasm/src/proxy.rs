//! Transparent `Proxy` around the video element
//!
//! Only the accessors listed in the shim's intercept plan are rerouted.
//! Everything else reads and writes straight through to the element, with
//! methods bound to it so `api.pause()` keeps working.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Function, Object, Proxy, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlSourceElement, HtmlVideoElement};

use vidshim_core::{source_changed, LiveClock, MemoryLogger, PlaybackShim, Property, SeekOutcome};

use crate::browser::{now_ms, VideoReadout};
use crate::host_log::HostLogger;

/// Shared state captured by every trap and wrapper
#[derive(Clone)]
pub(crate) struct ShimContext {
    pub video: HtmlVideoElement,
    pub source: HtmlSourceElement,
    pub shim: Rc<RefCell<PlaybackShim>>,
    pub logger: Rc<HostLogger>,
}

impl ShimContext {
    /// Copy the live clock onto the element so the host can read it
    pub fn publish_clock(&self) {
        publish_clock(&self.video, self.shim.borrow().clock());
    }
}

pub(crate) fn publish_clock(video: &HtmlVideoElement, clock: &LiveClock) {
    let _ = Reflect::set(video, &"liveOffset".into(), &clock.live_offset().into());
    let _ = Reflect::set(
        video,
        &"lastProgress".into(),
        &js_sys::Date::new(&clock.last_progress_ms().into()),
    );
    let paused_at = match clock.paused_at_ms() {
        Some(ms) => js_sys::Date::new(&ms.into()).into(),
        None => JsValue::UNDEFINED,
    };
    let _ = Reflect::set(video, &"pausedAt".into(), &paused_at);
}

/// Point the nested `<source>` at `url` and reload, unless nothing changed
pub(crate) fn swap_source(video: &HtmlVideoElement, source: &HtmlSourceElement, url: &str) {
    if source_changed(&source.src(), url) {
        source.set_src(url);
        video.load();
    }
}

struct BufferedView {
    start: Function,
    end: Function,
}

impl BufferedView {
    fn new(ctx: &ShimContext) -> Self {
        let start = {
            let ctx = ctx.clone();
            Closure::<dyn Fn(u32) -> f64>::new(move |index: u32| {
                ctx.shim.borrow().buffered_start(&VideoReadout(&ctx.video), index)
            })
        };
        let end = {
            let ctx = ctx.clone();
            Closure::<dyn Fn(u32) -> f64>::new(move |index: u32| {
                ctx.shim.borrow().buffered_end(&VideoReadout(&ctx.video), index)
            })
        };
        Self {
            start: start.into_js_value().unchecked_into(),
            end: end.into_js_value().unchecked_into(),
        }
    }

    /// A `TimeRanges` lookalike with shifted bounds
    fn snapshot(&self, length: u32) -> JsValue {
        let view = Object::new();
        let _ = Reflect::set(&view, &"length".into(), &length.into());
        let _ = Reflect::set(&view, &"start".into(), &self.start);
        let _ = Reflect::set(&view, &"end".into(), &self.end);
        view.into()
    }
}

/// `play` replacement that reloads after a stale pause
fn play_wrapper(ctx: &ShimContext) -> Function {
    let ctx = ctx.clone();
    let play = Closure::<dyn Fn() -> Result<JsValue, JsValue>>::new(move || {
        let pending = MemoryLogger::new();
        let reload = ctx
            .shim
            .borrow()
            .before_play(&VideoReadout(&ctx.video), now_ms(), &pending);
        pending.flush_into(&*ctx.logger);
        if reload {
            ctx.video.load();
        }
        ctx.video.play().map(JsValue::from)
    });
    play.into_js_value().unchecked_into()
}

fn get_trap(
    ctx: &ShimContext,
    target: &JsValue,
    prop: &JsValue,
    play: &Function,
    buffered: &BufferedView,
) -> JsValue {
    if let Some(property) = prop.as_string().as_deref().and_then(Property::from_name) {
        // Already borrowed means a trap further up the stack is mid-update;
        // answer from the element
        if let Ok(shim) = ctx.shim.try_borrow() {
            if shim.intercepts_get(property) {
                let media = VideoReadout(&ctx.video);
                return match property {
                    Property::Duration => shim.duration(&media, now_ms()).into(),
                    Property::CurrentTime => shim.current_time(&media).into(),
                    Property::Buffered => buffered.snapshot(ctx.video.buffered().length()),
                    Property::Play => play.clone().into(),
                };
            }
        }
    }

    let value = Reflect::get(target, prop).unwrap_or(JsValue::UNDEFINED);
    match value.dyn_ref::<Function>() {
        Some(method) => method.bind(target).into(),
        None => value,
    }
}

fn set_trap(ctx: &ShimContext, target: &JsValue, prop: &JsValue, value: &JsValue) -> bool {
    let seeking = prop.as_string().as_deref() == Some(Property::CurrentTime.name())
        && ctx
            .shim
            .try_borrow()
            .map(|shim| shim.intercepts_set(Property::CurrentTime))
            .unwrap_or(false);
    if !seeking {
        return Reflect::set(target, prop, value).unwrap_or(false);
    }

    let requested = value.as_f64().unwrap_or(f64::NAN);
    // Host log callbacks may read the proxy again, so they run after the
    // mutable borrow is gone
    let pending = MemoryLogger::new();
    let outcome = match ctx.shim.try_borrow_mut() {
        Ok(mut shim) => shim.seek(requested, &VideoReadout(&ctx.video), now_ms(), &pending),
        Err(_) => return false,
    };
    pending.flush_into(&*ctx.logger);
    match outcome {
        SeekOutcome::Rejected => false,
        SeekOutcome::Passthrough => Reflect::set(target, prop, value).unwrap_or(false),
        SeekOutcome::Reload { url, .. } => {
            ctx.publish_clock();
            swap_source(&ctx.video, &ctx.source, &url);
            true
        }
    }
}

/// Wrap the element in a proxy driven by the shim
pub(crate) fn wrap(ctx: &ShimContext) -> Result<JsValue, JsValue> {
    let play = play_wrapper(ctx);
    let buffered = BufferedView::new(ctx);

    let get = {
        let ctx = ctx.clone();
        Closure::<dyn Fn(JsValue, JsValue, JsValue) -> JsValue>::new(
            move |target: JsValue, prop: JsValue, _receiver: JsValue| {
                get_trap(&ctx, &target, &prop, &play, &buffered)
            },
        )
    };
    let set = {
        let ctx = ctx.clone();
        Closure::<dyn Fn(JsValue, JsValue, JsValue, JsValue) -> bool>::new(
            move |target: JsValue, prop: JsValue, value: JsValue, _receiver: JsValue| {
                set_trap(&ctx, &target, &prop, &value)
            },
        )
    };

    let handler = Object::new();
    Reflect::set(&handler, &"get".into(), &get.into_js_value())?;
    Reflect::set(&handler, &"set".into(), &set.into_js_value())?;
    Ok(Proxy::new(&ctx.video, &handler).into())
}
