// Copyright 2026 the Modeloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Full-viewport page that cycles between looping video modes.
//!
//! Every few seconds (uniformly random between the configured bounds) the
//! page picks another mode, starts it at the current clip's timestamp, and
//! cross-fades picture and sound. Audio stays muted until the visitor
//! presses the unmute button once.
//!
//! Build with: `wasm-pack build --target web demos/web_modes`
//! Then serve the page with the clips under `/videos/`.

#![no_std]
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

extern crate alloc;

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::string::ToString as _;
use core::cell::{OnceCell, RefCell};

use modeloop_backend_web::{ConsoleSink, MathRandom, VideoDeck, WebTimers};
use modeloop_core::backend::TimerKind;
use modeloop_core::config::{ConfigError, SwitchConfig};
use modeloop_core::mode::{Mode, ModeIndex, ModeTable};
use modeloop_core::scheduler::ModeScheduler;
use modeloop_core::trace::Tracer;
use modeloop_core::unmute::UnmuteGate;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Event, HtmlButtonElement, HtmlElement, PageTransitionEvent, Window};

static MODES: [Mode; 6] = [
    Mode::new("/videos/base.mp4", "Mode 1"),
    Mode::new("/videos/noir.mp4", "Mode 2"),
    Mode::new("/videos/depths.mp4", "Mode 3"),
    Mode::new("/videos/crimson.mp4", "Mode 4"),
    Mode::new("/videos/fade.mp4", "Mode 5"),
    Mode::new("/videos/altered.mp4", "Mode 6"),
];

const CONFIG: SwitchConfig = SwitchConfig::web();

const UNMUTE_LABEL: &str = "\u{1f507} Click to unmute";

struct App {
    scheduler: ModeScheduler<MathRandom>,
    deck: VideoDeck,
    timers: WebTimers,
    sink: ConsoleSink,
    gate: UnmuteGate,
    modes: ModeTable,
    label: HtmlElement,
    labeled: Option<ModeIndex>,
    unmute_button: Option<HtmlButtonElement>,
}

impl App {
    fn start(&mut self) {
        let Self {
            scheduler,
            deck,
            timers,
            sink,
            ..
        } = self;
        scheduler.start(deck, timers, &mut Tracer::new(sink));
        self.sync_label();
    }

    fn stop(&mut self) {
        self.scheduler.stop(&mut self.timers);
    }

    fn on_timer(&mut self, kind: TimerKind) {
        let Self {
            scheduler,
            deck,
            timers,
            sink,
            ..
        } = self;
        scheduler.on_timer(kind, deck, timers, &mut Tracer::new(sink));
        self.sync_label();
    }

    fn on_play_settled(&mut self, clip: ModeIndex, started: bool) {
        let Self {
            scheduler,
            deck,
            timers,
            sink,
            ..
        } = self;
        scheduler.on_play_settled(clip, started, deck, timers, &mut Tracer::new(sink));
        self.sync_label();
    }

    fn unmute(&mut self) {
        let Self {
            scheduler,
            deck,
            timers,
            sink,
            gate,
            unmute_button,
            ..
        } = self;
        if gate.press(scheduler, deck, timers, &mut Tracer::new(sink))
            && let Some(button) = unmute_button.take()
        {
            button.remove();
        }
    }

    /// Shows the visible mode's name once per flip.
    fn sync_label(&mut self) {
        let current = self.scheduler.current();
        if self.labeled != Some(current) {
            self.label.set_text_content(Some(self.modes.name_of(current)));
            self.labeled = Some(current);
        }
    }
}

/// Late-bound handle to the app for callbacks created before it exists.
type AppSlot = Rc<OnceCell<Weak<RefCell<App>>>>;

fn with_app(slot: &AppSlot, f: impl FnOnce(&mut App)) {
    if let Some(app) = slot.get().and_then(Weak::upgrade) {
        f(&mut app.borrow_mut());
    }
}

/// Entry point for the mode-cycling page.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;

    let modes = ModeTable::new(&MODES).map_err(config_error)?;
    let scheduler = ModeScheduler::new(CONFIG, &modes, MathRandom).map_err(config_error)?;
    let slot = AppSlot::default();

    let stage = element(&document, "main")?;
    style(
        &stage,
        "position: fixed; inset: 0; margin: 0; overflow: hidden; background: #000;",
    )?;

    let settle_slot = Rc::clone(&slot);
    let deck = VideoDeck::new(
        &document,
        &modes,
        CONFIG.fade,
        move |clip, result: Result<(), JsValue>| {
            with_app(&settle_slot, |app| app.on_play_settled(clip, result.is_ok()));
        },
    )?;
    for video in deck.videos() {
        stage.append_child(video)?;
    }

    let label = element(&document, "div")?;
    style(
        &label,
        "position: absolute; left: 24px; bottom: 24px; color: #fff; font: 14px system-ui, sans-serif; pointer-events: none;",
    )?;
    stage.append_child(&label)?;

    let button: HtmlButtonElement = document.create_element("button")?.unchecked_into();
    button.set_text_content(Some(UNMUTE_LABEL));
    style(
        &button,
        "position: absolute; right: 24px; bottom: 24px; padding: 8px 16px; cursor: pointer;",
    )?;
    stage.append_child(&button)?;
    body.append_child(&stage)?;

    let timer_slot = Rc::clone(&slot);
    let timers = WebTimers::new(move |kind| with_app(&timer_slot, |app| app.on_timer(kind)));

    let app = Rc::new(RefCell::new(App {
        scheduler,
        deck,
        timers,
        sink: ConsoleSink::new(modes),
        gate: UnmuteGate::new(),
        modes,
        label,
        labeled: None,
        unmute_button: Some(button.clone()),
    }));
    slot.set(Rc::downgrade(&app))
        .map_err(|_| JsValue::from_str("app already bound"))?;

    bind_controls(&window, &button, &slot)?;
    app.borrow_mut().start();

    // The page owns the app for its whole lifetime.
    core::mem::forget(app);
    Ok(())
}

fn bind_controls(
    window: &Window,
    button: &HtmlButtonElement,
    slot: &AppSlot,
) -> Result<(), JsValue> {
    let unmute_slot = Rc::clone(slot);
    let unmute_cb = Closure::wrap(Box::new(move |_event: Event| {
        with_app(&unmute_slot, App::unmute);
    }) as Box<dyn FnMut(_)>);
    button.add_event_listener_with_callback("click", unmute_cb.as_ref().unchecked_ref())?;
    unmute_cb.forget();

    let hide_slot = Rc::clone(slot);
    let hide_cb = Closure::wrap(Box::new(move |_event: Event| {
        with_app(&hide_slot, App::stop);
    }) as Box<dyn FnMut(_)>);
    window.add_event_listener_with_callback("pagehide", hide_cb.as_ref().unchecked_ref())?;
    hide_cb.forget();

    // Restored from the back/forward cache: the page never reloads, so
    // the stopped scheduler has to be started again.
    let show_slot = Rc::clone(slot);
    let show_cb = Closure::wrap(Box::new(move |event: PageTransitionEvent| {
        if event.persisted() {
            with_app(&show_slot, App::start);
        }
    }) as Box<dyn FnMut(_)>);
    window.add_event_listener_with_callback("pageshow", show_cb.as_ref().unchecked_ref())?;
    show_cb.forget();

    Ok(())
}

fn config_error(err: ConfigError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn element(doc: &Document, tag: &str) -> Result<HtmlElement, JsValue> {
    Ok(doc.create_element(tag)?.unchecked_into())
}

fn style(el: &web_sys::Element, css: &str) -> Result<(), JsValue> {
    el.set_attribute("style", css)
}
