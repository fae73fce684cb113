//! Leptos component drawing a diagram onto a canvas.
//!
//! The layout runs once per data change and again on every window resize. The
//! force layout additionally steps its simulation from a `requestAnimationFrame`
//! loop that stops as soon as the simulation settles or the surface is gone.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, Window};

use super::detail::{DetailOverlay, DetailValue};
use super::interaction::{
	ClickAction, HighlightState, HoverPolicy, PanState, ViewTransform, node_at, node_route,
};
use super::layout::{LayoutKind, Viewport};
use super::pipeline::{Diagram, DiagramData, DiagramSettings, render_diagram};
use super::render::{CanvasBackend, draw_scene};
use crate::error::{DiagramError, Result};

/// Simulated seconds per animation frame.
const FRAME_DT: f64 = 0.016;

/// Everything attached to one mounted canvas.
struct Surface {
	diagram: Diagram,
	backend: CanvasBackend,
	canvas: HtmlCanvasElement,
	transform: ViewTransform,
	pan: PanState,
	highlight: HighlightState,
	policy: HoverPolicy,
	/// Glyph under the pointer at mousedown, for click detection.
	pressed: Option<usize>,
}

impl Surface {
	fn redraw(&mut self) {
		let scene = self
			.highlight
			.styled(&self.diagram.scene, &self.diagram.theme, self.policy);
		draw_scene(&mut self.backend, &scene, &self.transform);
	}

	/// Lay out again at a new size. Pan and hover survive.
	fn relayout(&mut self, data: &DiagramData, viewport: Viewport, settings: &DiagramSettings) {
		let diagram = render_diagram(data, self.diagram.kind, viewport, settings, &self.backend);
		size_canvas(&self.canvas, diagram.scene.viewport);
		self.diagram = diagram;
		self.redraw();
	}

	fn pointer(&self, ev: &MouseEvent) -> (f64, f64) {
		let rect = self.canvas.get_bounding_client_rect();
		(
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		)
	}
}

type SharedSurface = Rc<RefCell<Option<Surface>>>;
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Window resize listener, removed when dropped.
struct ResizeSubscription {
	window: Window,
	callback: Closure<dyn FnMut()>,
}

impl ResizeSubscription {
	fn new(window: Window, callback: Closure<dyn FnMut()>) -> Self {
		if let Err(err) =
			window.add_event_listener_with_callback("resize", callback.as_ref().unchecked_ref())
		{
			warn!("soil-graph: could not listen for resize: {err:?}");
		}
		Self { window, callback }
	}
}

impl Drop for ResizeSubscription {
	fn drop(&mut self) {
		let _ = self
			.window
			.remove_event_listener_with_callback("resize", self.callback.as_ref().unchecked_ref());
	}
}

/// Owned by the component; dropping it marks the surface dead and detaches it
/// so any pending frame or resize callback finds nothing to draw on.
struct Teardown {
	surface: SharedSurface,
	alive: Rc<Cell<bool>>,
	resize: Option<ResizeSubscription>,
}

impl Drop for Teardown {
	fn drop(&mut self) {
		self.alive.set(false);
		self.resize = None;
		match self.surface.try_borrow_mut() {
			Ok(mut surface) => {
				surface.take();
			}
			Err(_) => warn!("soil-graph: surface busy at teardown, detaching on next frame"),
		}
		debug!("soil-graph: surface torn down");
	}
}

/// Schedule the animation loop unless it is already running.
fn start_animation(frame: &FrameCallback, running: &Cell<bool>) {
	if running.get() {
		return;
	}
	let Some(window) = web_sys::window() else {
		return;
	};
	if let Some(cb) = frame.borrow().as_ref() {
		running.set(
			window
				.request_animation_frame(cb.as_ref().unchecked_ref())
				.is_ok(),
		);
	}
}

fn canvas_backend(canvas: &HtmlCanvasElement) -> Result<CanvasBackend> {
	let ctx = canvas
		.get_context("2d")
		.map_err(|err| DiagramError::Canvas(format!("{err:?}")))?
		.ok_or_else(|| DiagramError::Canvas("no 2d context".to_string()))?
		.dyn_into::<CanvasRenderingContext2d>()
		.map_err(|_| DiagramError::Canvas("context is not 2d".to_string()))?;
	Ok(CanvasBackend::new(ctx))
}

fn surface_size(
	window: &Window,
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> Viewport {
	let inner = |v: std::result::Result<JsValue, JsValue>, fallback: f64| {
		v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
	};
	if fullscreen {
		return Viewport::new(
			inner(window.inner_width(), 800.0),
			inner(window.inner_height(), 600.0),
		);
	}
	let parent = canvas.parent_element();
	Viewport::new(
		width.unwrap_or_else(|| {
			parent
				.as_ref()
				.map(|p| p.client_width() as f64)
				.unwrap_or(800.0)
		}),
		height.unwrap_or_else(|| {
			parent
				.as_ref()
				.map(|p| p.client_height() as f64)
				.unwrap_or(600.0)
		}),
	)
}

/// The scene may be taller than the window after overflow correction.
fn size_canvas(canvas: &HtmlCanvasElement, viewport: Viewport) {
	canvas.set_width(viewport.width.max(0.0) as u32);
	canvas.set_height(viewport.height.max(0.0) as u32);
}

/// Renders `data` with the chosen layout on a canvas element.
///
/// Sizes itself to its parent container unless `fullscreen` is set or
/// explicit `width`/`height` are given. Hovering an output highlights its
/// links; clicking a node opens the detail panel or routes to `/node/{id}`,
/// depending on the layout.
#[component]
pub fn DiagramCanvas(
	#[prop(into)] data: Signal<DiagramData>,
	#[prop(optional)] layout: LayoutKind,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(optional)] settings: Option<DiagramSettings>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let settings = Rc::new(settings.unwrap_or_default());
	let selected = RwSignal::new(None::<DetailOverlay>);
	let navigate = use_navigate();

	let surface: SharedSurface = Rc::new(RefCell::new(None));
	let frame: FrameCallback = Rc::new(RefCell::new(None));
	let running = Rc::new(Cell::new(false));
	let alive = Rc::new(Cell::new(true));
	let teardown = StoredValue::new_local(Teardown {
		surface: surface.clone(),
		alive: alive.clone(),
		resize: None,
	});

	let (surface_anim, frame_inner, running_anim) = (surface.clone(), frame.clone(), running.clone());
	*frame.borrow_mut() = Some(Closure::new(move || {
		if !alive.get() {
			surface_anim.borrow_mut().take();
			running_anim.set(false);
			return;
		}
		let more = match surface_anim.borrow_mut().as_mut() {
			Some(s) => {
				let more = s.diagram.step(FRAME_DT);
				s.redraw();
				more
			}
			None => false,
		};
		if !more {
			running_anim.set(false);
			return;
		}
		let scheduled = match (web_sys::window(), frame_inner.borrow().as_ref()) {
			(Some(window), Some(cb)) => window
				.request_animation_frame(cb.as_ref().unchecked_ref())
				.is_ok(),
			_ => false,
		};
		running_anim.set(scheduled);
	}));

	let (surface_init, frame_init, running_init) = (surface.clone(), frame.clone(), running.clone());
	Effect::new(move |_| {
		let data = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let backend = match canvas_backend(&canvas) {
			Ok(backend) => backend,
			Err(err) => {
				warn!("soil-graph: {err}");
				return;
			}
		};

		let viewport = surface_size(&window, &canvas, fullscreen, width, height);
		let diagram = render_diagram(&data, layout, viewport, &settings, &backend);
		size_canvas(&canvas, diagram.scene.viewport);
		let mut s = Surface {
			diagram,
			backend,
			canvas,
			transform: ViewTransform::default(),
			pan: PanState::default(),
			highlight: HighlightState::default(),
			policy: HoverPolicy::for_layout(layout),
			pressed: None,
		};
		s.redraw();
		*surface_init.borrow_mut() = Some(s);
		selected.set(None);
		if layout.is_animated() {
			start_animation(&frame_init, &running_init);
		}

		if width.is_some() && height.is_some() && !fullscreen {
			return;
		}
		let weak = Rc::downgrade(&surface_init);
		let (frame_resize, running_resize, settings_resize) =
			(frame_init.clone(), running_init.clone(), settings.clone());
		let callback: Closure<dyn FnMut()> = Closure::new(move || {
			let (Some(surface), Some(window)) = (weak.upgrade(), web_sys::window()) else {
				return;
			};
			if let Some(s) = surface.borrow_mut().as_mut() {
				let viewport = surface_size(&window, &s.canvas, fullscreen, width, height);
				s.relayout(&data, viewport, &settings_resize);
			}
			if layout.is_animated() {
				start_animation(&frame_resize, &running_resize);
			}
		});
		// Replacing the subscription removes the previous listener.
		teardown.update_value(|t| t.resize = Some(ResizeSubscription::new(window, callback)));
	});

	let surface_md = surface.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some(s) = surface_md.borrow_mut().as_mut() {
			let (x, y) = s.pointer(&ev);
			s.pressed = node_at(&s.diagram.scene, &s.transform, x, y);
			if s.pressed.is_none() {
				s.pan.begin(x, y, &s.transform);
			}
		}
	};

	let surface_mm = surface.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some(s) = surface_mm.borrow_mut().as_mut() {
			let (x, y) = s.pointer(&ev);
			if s.pan.drag(x, y, &mut s.transform) {
				s.redraw();
				return;
			}
			let hit = node_at(&s.diagram.scene, &s.transform, x, y);
			let _ = web_sys::HtmlElement::style(&s.canvas)
				.set_property("cursor", if hit.is_some() { "pointer" } else { "grab" });
			let glyph = hit.and_then(|i| s.diagram.scene.nodes.get(i));
			if s.highlight.set_hover(glyph) {
				s.redraw();
			}
		}
	};

	let surface_mu = surface.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let mut clicked = None;
		if let Some(s) = surface_mu.borrow_mut().as_mut() {
			s.pan.end();
			let (x, y) = s.pointer(&ev);
			if let Some(pressed) = s.pressed.take() {
				if node_at(&s.diagram.scene, &s.transform, x, y) == Some(pressed) {
					clicked = s.diagram.scene.nodes.get(pressed).map(|glyph| {
						let overlay = glyph
							.node
							.and_then(|n| s.diagram.graph.nodes.get(n))
							.and_then(DetailOverlay::from_node);
						(glyph.id.clone(), overlay)
					});
				}
			}
		}
		// Act after the surface borrow ends: navigation re-renders.
		let Some((id, overlay)) = clicked else {
			return;
		};
		match (ClickAction::for_click(layout, overlay.is_some()), overlay) {
			(ClickAction::ShowDetail, Some(overlay)) => selected.set(Some(overlay)),
			(ClickAction::Navigate, _) => {
				if let Some(route) = node_route(&id) {
					navigate(&route, NavigateOptions::default());
				}
			}
			_ => {}
		}
	};

	let surface_ml = surface.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(s) = surface_ml.borrow_mut().as_mut() {
			s.pan.end();
			s.pressed = None;
			if s.highlight.clear() {
				s.redraw();
			}
		}
	};

	view! {
		<div class="diagram">
			<canvas
				node_ref=canvas_ref
				class="diagram-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				style="display: block; cursor: grab;"
			/>
			{move || {
				selected
					.get()
					.map(|overlay| {
						view! { <DetailPanel overlay=overlay on_close=move |_| selected.set(None) /> }
					})
			}}
		</div>
	}
}

fn detail_value(value: DetailValue) -> AnyView {
	match value {
		DetailValue::Text(text) => text.into_any(),
		DetailValue::Link(href) => view! { <a href=href target="_blank">"Link"</a> }.into_any(),
	}
}

/// Side panel with a record's title, image, badges and fields.
#[component]
pub fn DetailPanel(overlay: DetailOverlay, #[prop(into)] on_close: Callback<()>) -> impl IntoView {
	let DetailOverlay {
		title,
		image,
		rows,
		badges,
	} = overlay;
	let alt = title.clone();

	view! {
		<aside class="detail-panel">
			<button class="detail-close" on:click=move |_| on_close.run(())>
				"×"
			</button>
			<h2>{title}</h2>
			{image.map(|src| view! { <img class="detail-image" src=src alt=alt /> })}
			<ul class="detail-badges">
				{badges.into_iter().map(|badge| view! { <li class="badge">{badge}</li> }).collect_view()}
			</ul>
			<dl class="detail-rows">
				{rows
					.into_iter()
					.map(|row| view! {
						<dt>{row.label}</dt>
						<dd>{detail_value(row.value)}</dd>
					})
					.collect_view()}
			</dl>
		</aside>
	}
}
