//! Browser host: binds a [`LoopController`] to a canvas, DOM events and the
//! page's timers.

use std::{cell::RefCell, rc::Rc};

use anyhow::{Context, anyhow};
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::{JsCast, prelude::*};
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, MouseEvent};

use crate::{
    config::{Cadence, SessionConfig, SessionMode},
    controller::LoopController,
    fps::{FrameRateMeter, SystemClock},
    input::{Scale, SurfaceRect},
    sim::Universe,
};

type Controller = LoopController<Universe, CanvasRenderingContext2d>;

struct Host {
    controller: Controller,
    canvas: HtmlCanvasElement,
    play_button: Option<Element>,
}

impl Host {
    fn refresh_play_label(&self) {
        if let Some(button) = &self.play_button {
            let label = if self.controller.is_paused() { "▶" } else { "⏸" };
            button.set_text_content(Some(label));
        }
    }
}

/// A running visualization attached to a page.
#[wasm_bindgen]
pub struct WebSession {
    host: Rc<RefCell<Host>>,
    _listeners: Vec<Listener>,
}

/// Freeing the session from JS stops playback; the pending tick then ends
/// the timer loop, and the listeners detach as they drop.
impl Drop for WebSession {
    fn drop(&mut self) {
        match self.host.try_borrow_mut() {
            Ok(mut host) => host.controller.pause(),
            Err(_) => log::warn!("Session dropped while in use; tick loop left running"),
        }
        log::info!("Session unmounted");
    }
}

#[wasm_bindgen]
impl WebSession {
    /// Mount a `width` x `height` universe on the canvas `canvas_id` and
    /// start playing.
    ///
    /// `cells` seeds the grid with row-major cell bytes (`1` alive, anything
    /// else dead); without it the grid is filled at random. `mode` is
    /// `"explore"` or `"animate"`. `fps_id` names an element for the frame
    /// rate readout and `play_button_id` a play/pause control.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas_id: &str,
        width: u32,
        height: u32,
        mode: &str,
        cells: Option<Vec<u8>>,
        fps_id: Option<String>,
        play_button_id: Option<String>,
    ) -> Result<WebSession, JsValue> {
        Self::mount(
            canvas_id,
            width,
            height,
            mode,
            cells,
            fps_id.as_deref(),
            play_button_id.as_deref(),
        )
        .map_err(|e| {
            log::error!("Failed to mount session: {e:#}");
            JsValue::from_str(&format!("{e:#}"))
        })
    }

    /// Play/pause, as the page's control would.
    #[wasm_bindgen]
    pub fn toggle_playback(&self) {
        toggle_playback(&self.host);
    }

    /// The grid as text, one line per row.
    #[wasm_bindgen]
    pub fn render(&self) -> String {
        self.host.borrow().controller.engine().to_string()
    }

    #[wasm_bindgen]
    pub fn is_paused(&self) -> bool {
        self.host.borrow().controller.is_paused()
    }

    /// Delay between ticks; 0 means every animation frame.
    #[wasm_bindgen]
    pub fn set_cadence_ms(&self, ms: u32) {
        self.host
            .borrow_mut()
            .controller
            .set_cadence(Cadence::from_millis(ms as u64));
    }

    #[wasm_bindgen]
    pub fn set_steps_per_paint(&self, steps: u32) {
        self.host.borrow_mut().controller.set_steps_per_paint(steps);
    }

    #[wasm_bindgen]
    pub fn set_mode(&self, mode: &str) -> Result<(), JsValue> {
        let mode: SessionMode = mode
            .parse()
            .map_err(|e: anyhow::Error| JsValue::from_str(&e.to_string()))?;
        self.host.borrow_mut().controller.set_mode(mode);
        Ok(())
    }
}

impl WebSession {
    fn mount(
        canvas_id: &str,
        width: u32,
        height: u32,
        mode: &str,
        cells: Option<Vec<u8>>,
        fps_id: Option<&str>,
        play_button_id: Option<&str>,
    ) -> anyhow::Result<Self> {
        let document = web_sys::window()
            .context("no window")?
            .document()
            .context("no document")?;
        let canvas: HtmlCanvasElement = element(&document, canvas_id)?
            .dyn_into()
            .map_err(|_| anyhow!("`{canvas_id}` is not a canvas"))?;
        let context: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(js_error)?
            .context("canvas has no 2d context")?
            .dyn_into()
            .map_err(|_| anyhow!("2d context has an unexpected type"))?;

        let mode: SessionMode = mode.parse()?;
        let universe = Universe::pattern_or_random(cells, width, height)?;
        let mut controller = LoopController::new(universe, context, SessionConfig::for_mode(mode));
        if let Some(id) = fps_id {
            let readout = element(&document, id)?;
            controller = controller.with_meter(FrameRateMeter::new(SystemClock::new(), readout));
        }
        let play_button = play_button_id
            .map(|id| element(&document, id))
            .transpose()?;

        let host = Rc::new(RefCell::new(Host {
            controller,
            canvas: canvas.clone(),
            play_button: play_button.clone(),
        }));

        let mut listeners = vec![listen(&canvas, "click", {
            let host = Rc::clone(&host);
            move |event: MouseEvent| on_canvas_click(&host, &event)
        })?];
        if let Some(button) = &play_button {
            listeners.push(listen(button, "click", {
                let host = Rc::clone(&host);
                move |_: MouseEvent| toggle_playback(&host)
            })?);
        }

        let first = host.borrow_mut().controller.start();
        host.borrow().refresh_play_label();
        if let Some(cadence) = first {
            schedule(Rc::clone(&host), cadence);
        }
        log::info!("Session mounted on `{canvas_id}`");

        Ok(Self {
            host,
            _listeners: listeners,
        })
    }
}

fn element(document: &Document, id: &str) -> anyhow::Result<Element> {
    document
        .get_element_by_id(id)
        .with_context(|| format!("no element with id `{id}`"))
}

fn js_error(value: JsValue) -> anyhow::Error {
    anyhow!("{value:?}")
}

/// A DOM event listener, removed from its target when dropped.
struct Listener {
    target: Element,
    event: &'static str,
    closure: Closure<dyn FnMut(MouseEvent)>,
}

impl Drop for Listener {
    fn drop(&mut self) {
        if let Err(e) = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref())
        {
            log::warn!("Could not detach `{}` listener: {e:?}", self.event);
        }
    }
}

fn listen(
    target: &Element,
    event: &'static str,
    handler: impl FnMut(MouseEvent) + 'static,
) -> anyhow::Result<Listener> {
    let closure = Closure::<dyn FnMut(MouseEvent)>::new(handler);
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(js_error)?;
    Ok(Listener {
        target: target.clone(),
        event,
        closure,
    })
}

fn on_canvas_click(host: &Rc<RefCell<Host>>, event: &MouseEvent) {
    let mut host = host.borrow_mut();
    let bounds = host.canvas.get_bounding_client_rect();
    let rect = SurfaceRect::new(bounds.left(), bounds.top(), bounds.width(), bounds.height());
    let scale = Scale::between(host.canvas.width(), host.canvas.height(), &rect);
    match host.controller.handle_click(
        event.client_x() as f64,
        event.client_y() as f64,
        &rect,
        scale,
    ) {
        Ok(pos) => log::debug!("Click at ({}, {})", pos.row, pos.col),
        Err(e) => log::warn!("Click ignored: {e}"),
    }
}

fn toggle_playback(host: &Rc<RefCell<Host>>) {
    let next = host.borrow_mut().controller.toggle_playback();
    host.borrow().refresh_play_label();
    if let Some(cadence) = next {
        schedule(Rc::clone(host), cadence);
    }
}

/// Run one tick after `cadence`, then keep going for as long as the
/// controller asks for more.
fn schedule(host: Rc<RefCell<Host>>, cadence: Cadence) {
    spawn_local(async move {
        if let Err(e) = wait(cadence).await {
            log::error!("Could not schedule tick: {e:#}");
            return;
        }
        let next = host.borrow_mut().controller.tick();
        if let Some(next) = next {
            schedule(host, next);
        }
    });
}

async fn wait(cadence: Cadence) -> anyhow::Result<()> {
    match cadence {
        Cadence::Delay(delay) => {
            let ms = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
            TimeoutFuture::new(ms).await;
            Ok(())
        }
        Cadence::NextFrame => next_animation_frame().await,
    }
}

async fn next_animation_frame() -> anyhow::Result<()> {
    let window = web_sys::window().context("no window")?;
    let mut requested = Ok(0);
    let frame = js_sys::Promise::new(
        &mut |resolve: js_sys::Function, _reject: js_sys::Function| {
            requested = window.request_animation_frame(&resolve);
        },
    );
    requested.map_err(js_error)?;
    JsFuture::from(frame).await.map_err(js_error)?;
    Ok(())
}
