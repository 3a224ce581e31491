// Copyright 2026 the Modeloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `<video>`-backed deck.

use alloc::format;
use alloc::rc::Rc;
use alloc::vec::Vec;

use modeloop_core::backend::Deck;
use modeloop_core::mode::{ModeIndex, ModeTable};
use modeloop_core::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Document, HtmlVideoElement};

type SettleFn = dyn Fn(ModeIndex, Result<(), JsValue>);

/// One `<video>` element per mode.
///
/// Elements are created detached; the host appends [`videos`](Self::videos)
/// to its stage. Visibility is the inline `opacity`, transitioned over the
/// fade duration so the picture cross-fades alongside the audio ramp.
pub struct VideoDeck {
    videos: Vec<HtmlVideoElement>,
    on_settled: Rc<SettleFn>,
}

impl core::fmt::Debug for VideoDeck {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VideoDeck")
            .field("videos", &self.videos.len())
            .finish_non_exhaustive()
    }
}

impl VideoDeck {
    /// Creates a muted, looping, hidden `<video>` for every mode in `modes`.
    ///
    /// `on_settled` receives the outcome of every [`Deck::play`] request. It
    /// always runs from a microtask, never from inside `play` itself.
    ///
    /// # Errors
    ///
    /// Returns the DOM exception if an element cannot be created or styled.
    pub fn new(
        document: &Document,
        modes: &ModeTable,
        fade: Duration,
        on_settled: impl Fn(ModeIndex, Result<(), JsValue>) + 'static,
    ) -> Result<Self, JsValue> {
        let transition = format!("opacity {}ms ease-in-out", fade.as_millis_f64());
        let mut videos = Vec::with_capacity(modes.len());
        for (_, mode) in modes.iter() {
            let video: HtmlVideoElement = document.create_element("video")?.dyn_into()?;
            video.set_src(mode.source);
            video.set_loop(true);
            video.set_muted(true);
            video.set_preload("auto");
            video.set_attribute("playsinline", "")?;
            video.set_attribute("aria-label", mode.name)?;
            let style = video.style();
            style.set_property("position", "absolute")?;
            style.set_property("inset", "0")?;
            style.set_property("width", "100%")?;
            style.set_property("height", "100%")?;
            style.set_property("object-fit", "cover")?;
            style.set_property("opacity", "0")?;
            style.set_property("transition", &transition)?;
            videos.push(video);
        }
        Ok(Self {
            videos,
            on_settled: Rc::new(on_settled),
        })
    }

    /// The managed elements, in mode order.
    #[must_use]
    pub fn videos(&self) -> &[HtmlVideoElement] {
        &self.videos
    }

    fn video(&self, clip: ModeIndex) -> &HtmlVideoElement {
        &self.videos[clip.get()]
    }
}

impl Deck for VideoDeck {
    fn clip_count(&self) -> usize {
        self.videos.len()
    }

    fn current_time(&self, clip: ModeIndex) -> f64 {
        self.video(clip).current_time()
    }

    fn seek(&mut self, clip: ModeIndex, seconds: f64) {
        let video = self.video(clip);
        video.set_current_time(wrap_media_time(seconds, video.duration()));
    }

    fn set_muted(&mut self, clip: ModeIndex, muted: bool) {
        self.video(clip).set_muted(muted);
    }

    fn set_volume(&mut self, clip: ModeIndex, volume: f64) {
        self.video(clip).set_volume(volume.clamp(0.0, 1.0));
    }

    fn set_visible(&mut self, clip: ModeIndex, visible: bool) {
        let opacity = if visible { "1" } else { "0" };
        if let Err(err) = self.video(clip).style().set_property("opacity", opacity) {
            web_sys::console::error_1(&err);
        }
    }

    fn prepare(&mut self, clip: ModeIndex, seconds: f64) {
        let video = self.video(clip);
        video.set_preload("auto");
        video.set_current_time(wrap_media_time(seconds, video.duration()));
    }

    fn play(&mut self, clip: ModeIndex) {
        let pending: Result<js_sys::Promise, JsValue> = self.video(clip).play();
        let on_settled = Rc::clone(&self.on_settled);
        spawn_local(async move {
            let result = match pending {
                Ok(promise) => JsFuture::from(promise).await.map(drop),
                Err(err) => Err(err),
            };
            if let Err(err) = &result {
                web_sys::console::log_2(&JsValue::from_str("Autoplay prevented:"), err);
            }
            on_settled(clip, result);
        });
    }

    fn pause(&mut self, clip: ModeIndex) {
        if let Err(err) = self.video(clip).pause() {
            web_sys::console::error_1(&err);
        }
    }
}

/// Maps a media timestamp into `[0, duration)` for a looping clip.
///
/// Clips of different lengths share one timeline, so a hand-off timestamp
/// can lie past the end of the target clip. Unknown durations (`NaN` before
/// metadata loads, or infinite streams) pass the time through unchanged;
/// negative or non-finite times map to zero.
#[must_use]
pub fn wrap_media_time(seconds: f64, duration: f64) -> f64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0.0;
    }
    if !duration.is_finite() || duration <= 0.0 {
        return seconds;
    }
    seconds % duration
}
