//! Browser bridge for trace-engine.
//!
//! wasm-bindgen cannot export the session directly, so a single
//! [`TraceRunner`] lives in a `thread_local!` and every export borrows it.
//! JavaScript reads the overlay vertices and packed events straight out of
//! wasm memory through the pointer/length accessors.

pub mod runner;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use trace_engine::{CompletionEffect, PointerEvent, StarBurst, TraceConfig};
use wasm_bindgen::prelude::*;

pub use runner::TraceRunner;

thread_local! {
    static RUNNER: RefCell<Option<TraceRunner>> = const { RefCell::new(None) };
}

/// Run `f` against the runner. `None` (with a warning) before `trace_init`.
fn with_runner<R>(f: impl FnOnce(&mut TraceRunner) -> R) -> Option<R> {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        match borrow.as_mut() {
            Some(runner) => Some(f(runner)),
            None => {
                log::warn!("trace_init() has not been called");
                None
            }
        }
    })
}

/// Completion effect implemented in JavaScript: `play(onDone)`.
struct JsEffect {
    play: js_sys::Function,
    playing: Rc<Cell<bool>>,
}

/// End of one JS effect run. Shared by the `onDone` callback and the
/// failure path; only the first `finish` reports back.
#[derive(Clone)]
struct EffectRun {
    playing: Rc<Cell<bool>>,
    on_done: Rc<RefCell<Option<Box<dyn FnOnce()>>>>,
}

impl EffectRun {
    fn start(playing: &Rc<Cell<bool>>, on_done: Box<dyn FnOnce()>) -> Self {
        playing.set(true);
        Self {
            playing: Rc::clone(playing),
            on_done: Rc::new(RefCell::new(Some(on_done))),
        }
    }

    fn finish(&self) {
        self.playing.set(false);
        let on_done = self.on_done.borrow_mut().take();
        if let Some(on_done) = on_done {
            on_done();
        }
    }
}

impl CompletionEffect for JsEffect {
    fn play(&mut self, on_done: Box<dyn FnOnce()>) {
        let run = EffectRun::start(&self.playing, on_done);
        let callback = {
            let run = run.clone();
            Closure::once_into_js(move || run.finish())
        };
        if let Err(e) = self.play.call1(&JsValue::NULL, &callback) {
            log::warn!("completion effect threw, finishing without it: {e:?}");
            run.finish();
        }
    }

    fn is_playing(&self) -> bool {
        self.playing.get()
    }
}

/// Create the session. `config_json` is an optional, possibly partial,
/// `TraceConfig` object; malformed JSON falls back to defaults.
#[wasm_bindgen]
pub fn trace_init(config_json: Option<String>) {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let config = match config_json.as_deref().map(TraceConfig::from_json) {
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            log::warn!("Ignoring tracing config: {e}");
            TraceConfig::default()
        }
        None => TraceConfig::default(),
    };

    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(TraceRunner::new(config));
    });
    log::info!("trace-web: initialized");
}

#[wasm_bindgen]
pub fn trace_set_geometry(width: f32, height: f32, dpr: f32) {
    with_runner(|r| r.set_geometry(width, height, dpr));
}

#[wasm_bindgen]
pub fn trace_set_target(text: &str) {
    with_runner(|r| r.set_target(text));
}

/// Use a TrueType/OpenType font for the guide. Returns false if it didn't parse.
#[wasm_bindgen]
pub fn trace_set_font(bytes: &[u8]) -> bool {
    with_runner(|r| r.set_font(bytes)).unwrap_or(false)
}

/// Replace the built-in star burst with `play(onDone)` from JavaScript.
/// Passing `undefined` restores the built-in effect.
#[wasm_bindgen]
pub fn trace_set_effect(play: Option<js_sys::Function>) {
    with_runner(|r| {
        let effect: Box<dyn CompletionEffect> = match play {
            Some(play) => Box::new(JsEffect {
                play,
                playing: Rc::new(Cell::new(false)),
            }),
            None => Box::new(StarBurst::new()),
        };
        r.session_mut().set_effect(effect);
    });
}

#[wasm_bindgen]
pub fn trace_pointer_down(x: f32, y: f32) {
    with_runner(|r| r.push_input(PointerEvent::down(x, y)));
}

#[wasm_bindgen]
pub fn trace_pointer_move(x: f32, y: f32) {
    with_runner(|r| r.push_input(PointerEvent::moved(x, y)));
}

#[wasm_bindgen]
pub fn trace_pointer_up(x: f32, y: f32) {
    with_runner(|r| r.push_input(PointerEvent::up(x, y)));
}

/// Leaving the surface ends the stroke like a lift.
#[wasm_bindgen]
pub fn trace_pointer_leave(x: f32, y: f32) {
    with_runner(|r| r.push_input(PointerEvent::up(x, y)));
}

#[wasm_bindgen]
pub fn trace_clear() {
    with_runner(|r| r.clear());
}

#[wasm_bindgen]
pub fn trace_advance() {
    with_runner(|r| r.advance());
}

/// Drive the session with the host's frame timestamp (ms).
#[wasm_bindgen]
pub fn trace_tick(now_ms: f64) {
    with_runner(|r| r.tick(now_ms));
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn trace_is_complete() -> bool {
    with_runner(|r| r.is_complete()).unwrap_or(false)
}

#[wasm_bindgen]
pub fn trace_coverage() -> f32 {
    with_runner(|r| r.coverage_ratio()).unwrap_or(0.0)
}

#[cfg(feature = "vectors")]
#[wasm_bindgen]
pub fn get_vector_vertices_ptr() -> *const f32 {
    with_runner(|r| r.vector_vertices_ptr()).unwrap_or(std::ptr::null())
}

#[cfg(feature = "vectors")]
#[wasm_bindgen]
pub fn get_vector_vertex_count() -> u32 {
    with_runner(|r| r.vector_vertex_count()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_events_ptr() -> *const f32 {
    with_runner(|r| r.events_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_events_len() -> u32 {
    with_runner(|r| r.events_len()).unwrap_or(0)
}
