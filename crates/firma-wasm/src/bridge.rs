//! Canvas binding: DOM listeners → pad input, pad raster → canvas pixels.
//!
//! One `Binding` exists per bound canvas for the lifetime of the page. It is
//! registered in a thread-local table so binding the same element again
//! returns the existing binding instead of stacking a second set of
//! listeners.

use crate::dom::{self, ElementIndicator};
use firma_core::config::PadConfig;
use firma_core::input::{InputEvent, PointerSample, PointerSource};
use firma_pad::{Debouncer, Handled, Indicator, SignatureField, SignaturePad, Ticket};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, CanvasRenderingContext2d, Event, EventTarget, HtmlCanvasElement,
    HtmlElement, MouseEvent, Node, TouchEvent,
};

/// Marker attribute set on bound canvases.
const BOUND_ATTR: &str = "data-firma-bound";

const MOUSE_EVENTS: [&str; 4] = ["mousedown", "mousemove", "mouseup", "mouseleave"];
const TOUCH_EVENTS: [&str; 4] = ["touchstart", "touchmove", "touchend", "touchcancel"];

type Listener = Closure<dyn FnMut(Event)>;

pub(crate) type SharedBinding = Rc<RefCell<Binding>>;

thread_local! {
    static BOUND: RefCell<Vec<SharedBinding>> = const { RefCell::new(Vec::new()) };
}

pub(crate) struct Binding {
    pub(crate) canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    pub(crate) field: SignatureField,
    debouncer: Debouncer,
    /// Kept alive for as long as the binding exists.
    listeners: Vec<Listener>,
}

/// Bind a pad to `canvas`, or return the binding it already has.
pub(crate) fn bind(
    canvas: HtmlCanvasElement,
    error: Option<HtmlElement>,
    config: PadConfig,
) -> Result<SharedBinding, JsValue> {
    if let Some(existing) = find(&canvas) {
        log::debug!("canvas already bound; reusing existing pad");
        return Ok(existing);
    }

    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()?;

    let debouncer = Debouncer::new(config.debounce_ms);
    let pad = SignaturePad::new(dom::surface_box(&canvas), config);
    dom::sync_canvas_size(&canvas, pad.raster());
    let error = error.map(|el| Box::new(ElementIndicator(el)) as Box<dyn Indicator>);

    let binding = Rc::new(RefCell::new(Binding {
        canvas: canvas.clone(),
        ctx,
        field: SignatureField::new(pad, error),
        debouncer,
        listeners: Vec::new(),
    }));

    let listeners = install_listeners(&binding, &canvas)?;
    binding.borrow_mut().listeners = listeners;
    canvas.set_attribute(BOUND_ATTR, "")?;
    BOUND.with(|bound| bound.borrow_mut().push(binding.clone()));
    binding.borrow().redraw();
    log::info!("signature pad bound");
    Ok(binding)
}

fn find(canvas: &HtmlCanvasElement) -> Option<SharedBinding> {
    let node: &Node = canvas;
    BOUND.with(|bound| {
        bound
            .borrow()
            .iter()
            .find(|b| b.borrow().canvas.is_same_node(Some(node)))
            .cloned()
    })
}

// ─── Listeners ───────────────────────────────────────────────────────────

fn install_listeners(
    binding: &SharedBinding,
    canvas: &HtmlCanvasElement,
) -> Result<Vec<Listener>, JsValue> {
    let target: &EventTarget = canvas;
    let mut listeners = Vec::new();

    for kind in MOUSE_EVENTS {
        let listener = with_binding(binding, move |b, event| b.on_mouse(kind, &event));
        target.add_event_listener_with_callback(kind, listener.as_ref().unchecked_ref())?;
        listeners.push(listener);
    }

    // Non-passive so preventDefault can stop the page from scrolling.
    let opts = AddEventListenerOptions::new();
    opts.set_passive(false);
    for kind in TOUCH_EVENTS {
        let listener = with_binding(binding, move |b, event| b.on_touch(kind, &event));
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            listener.as_ref().unchecked_ref(),
            &opts,
        )?;
        listeners.push(listener);
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let weak = Rc::downgrade(binding);
    let listener = Listener::new(move |_event: Event| {
        if let Some(b) = weak.upgrade() {
            schedule_resize(&b);
        }
    });
    window.add_event_listener_with_callback("resize", listener.as_ref().unchecked_ref())?;
    listeners.push(listener);

    Ok(listeners)
}

/// Wrap a handler so it only holds a weak reference to the binding.
fn with_binding(
    binding: &SharedBinding,
    mut f: impl FnMut(&mut Binding, Event) + 'static,
) -> Listener {
    let weak: Weak<RefCell<Binding>> = Rc::downgrade(binding);
    Listener::new(move |event: Event| {
        let Some(b) = weak.upgrade() else {
            return;
        };
        match b.try_borrow_mut() {
            Ok(mut b) => f(&mut b, event),
            Err(_) => log::warn!("dropped {} during re-entrant dispatch", event.type_()),
        }
    })
}

fn schedule_resize(binding: &SharedBinding) {
    let (ticket, delay) = {
        let mut b = binding.borrow_mut();
        let ticket = b.debouncer.schedule(dom::now_ms());
        (ticket, b.debouncer.delay_ms())
    };
    let weak = Rc::downgrade(binding);
    let callback = Closure::once_into_js(move || {
        if let Some(b) = weak.upgrade() {
            b.borrow_mut().on_resize_timer(ticket);
        }
    });
    let armed = web_sys::window().map(|w| {
        w.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref::<js_sys::Function>(),
            delay as i32,
        )
    });
    if !matches!(armed, Some(Ok(_))) {
        log::error!("could not arm resize timer");
    }
}

// ─── Dispatch ────────────────────────────────────────────────────────────

impl Binding {
    /// Re-read the canvas position; scrolling moves it without a resize.
    fn sync_origin(&mut self) {
        let b = dom::surface_box(&self.canvas);
        self.field.pad_mut().reposition(b.left, b.top);
    }

    fn dispatch(&mut self, input: &InputEvent, event: &Event) -> Handled {
        let handled = self.field.pad_mut().handle(input);
        if handled.prevent_default() {
            event.prevent_default();
            self.redraw();
        }
        handled
    }

    fn on_mouse(&mut self, kind: &str, event: &Event) {
        let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        self.sync_origin();
        let sample = PointerSample::mouse(f64::from(mouse.client_x()), f64::from(mouse.client_y()));
        let input = match kind {
            "mousedown" => InputEvent::Down(sample),
            "mousemove" => InputEvent::Move(sample),
            "mouseup" => InputEvent::Up(PointerSource::Mouse),
            _ => InputEvent::Leave,
        };
        self.dispatch(&input, event);
    }

    fn on_touch(&mut self, kind: &str, event: &Event) {
        let Some(touch) = event.dyn_ref::<TouchEvent>() else {
            return;
        };
        self.sync_origin();
        let inputs: Vec<InputEvent> = match kind {
            "touchstart" => InputEvent::from_touch_start(&dom::touches(&touch.touches()))
                .into_iter()
                .collect(),
            "touchmove" => dom::touches(&touch.changed_touches())
                .iter()
                .map(|t| InputEvent::Move(t.sample()))
                .collect(),
            "touchend" => dom::touches(&touch.changed_touches())
                .iter()
                .map(|t| InputEvent::Up(PointerSource::Touch { id: t.id }))
                .collect(),
            _ => vec![InputEvent::Cancel],
        };
        for input in &inputs {
            self.dispatch(input, event);
        }
    }

    fn on_resize_timer(&mut self, ticket: Ticket) {
        if !self.debouncer.fire(ticket) {
            return;
        }
        self.resize_now();
    }

    /// Re-measure immediately, bypassing the debounce.
    pub(crate) fn resize_now(&mut self) {
        self.debouncer.cancel();
        let bounds = dom::surface_box(&self.canvas);
        if self.field.pad_mut().resize(bounds) {
            dom::sync_canvas_size(&self.canvas, self.field.pad().raster());
            self.redraw();
        }
    }

    pub(crate) fn redraw(&self) {
        if let Err(e) = dom::blit(&self.ctx, self.field.pad().raster()) {
            log::error!("canvas blit failed: {e:?}");
        }
    }
}
