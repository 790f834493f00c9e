use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::render;
use super::state::CanvasState;
use super::tooltip::{Tooltip, tooltip_html};
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::filter::Visibility;
use crate::interaction::Click;
use crate::model::{GraphDocument, TourStep};
use crate::scene::{Scene, ViewMode};

type SharedState = Rc<RefCell<Option<CanvasState>>>;
type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

const FRAME_SECONDS: f32 = 0.016;

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d> {
	canvas
		.get_context("2d")
		.map_err(|e| DashboardError::Browser(format!("{e:?}")))?
		.ok_or_else(|| DashboardError::Browser("2d context unavailable".to_string()))?
		.dyn_into()
		.map_err(|_| DashboardError::Browser("not a 2d context".to_string()))
}

/// Canvas size from its parent, falling back to the layout's world size.
fn canvas_size(canvas: &HtmlCanvasElement, world: (f64, f64)) -> (f64, f64) {
	let parent = canvas.parent_element();
	let w = parent.as_ref().map_or(0, |p| p.client_width());
	let h = parent.as_ref().map_or(0, |p| p.client_height());
	(
		if w > 0 { w as f64 } else { world.0 },
		if h > 0 { h as f64 } else { world.1 },
	)
}

fn local_position(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// Starts the frame loop once. It stops and frees itself when the state is
/// gone.
fn start_animation(state: Weak<RefCell<Option<CanvasState>>>, ctx: CanvasRenderingContext2d, animate: FrameCallback) {
	if animate.borrow().is_some() {
		return;
	}
	let animate_inner = animate.clone();
	*animate.borrow_mut() = Some(Closure::new(move || {
		let Some(state) = state.upgrade() else {
			debug!("canvas unmounted; stopping frame loop");
			let _ = animate_inner.borrow_mut().take();
			return;
		};
		if let Some(ref mut s) = *state.borrow_mut() {
			s.tick(FRAME_SECONDS);
			render::render(s, &ctx);
		}
		if let (Some(cb), Some(window)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	}));
	if let (Some(cb), Some(window)) = (animate.borrow().as_ref(), web_sys::window()) {
		let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
	}
}

/// Interactive canvas for every graph view.
///
/// The scene is rebuilt when `mode` or `render_epoch` changes; visibility
/// and tour highlights are applied to the live scene without re-laying
/// out.
#[component]
pub fn GraphCanvas(
	#[prop(into)] document: Signal<Option<Arc<GraphDocument>>>,
	#[prop(into)] mode: Signal<ViewMode>,
	#[prop(into)] render_epoch: Signal<u64>,
	#[prop(into)] visibility: Signal<Option<Visibility>>,
	#[prop(into)] pinned_step: Signal<Option<TourStep>>,
	#[prop(into)] central: Signal<Option<String>>,
	#[prop(into)] config: Signal<Arc<DashboardConfig>>,
	on_click: Callback<Click>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: FrameCallback = Rc::new(RefCell::new(None));
	let resize_cb: FrameCallback = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_init) = (state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		render_epoch.track();
		let mode = mode.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(doc) = document.get_untracked() else {
			*state_init.borrow_mut() = None;
			return;
		};
		let config = config.get_untracked();
		let central = central.get_untracked();
		let Some(scene) = Scene::build(mode, &doc, &config, central.as_deref()) else {
			*state_init.borrow_mut() = None;
			return;
		};
		let ctx = match context_2d(&canvas) {
			Ok(ctx) => ctx,
			Err(e) => {
				warn!("cannot draw {} view: {e}", mode.as_str());
				return;
			}
		};

		let world = scene.size(&config);
		let (w, h) = canvas_size(&canvas, world);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		let vis = visibility
			.get_untracked()
			.unwrap_or_else(|| Visibility::all(&doc));
		debug!(
			"building {} view: {} nodes, {} links",
			mode.as_str(),
			doc.nodes.len(),
			doc.links.len()
		);
		let mut next = CanvasState::new(doc, scene, world, vis, w, h);
		match Tooltip::mount(mode) {
			Ok(tooltip) => next.tooltip = Some(tooltip),
			Err(e) => warn!("tooltip disabled: {e}"),
		}
		*state_init.borrow_mut() = Some(next);

		if resize_init.borrow().is_none() {
			let state_resize = Rc::downgrade(&state_init);
			let canvas_resize = canvas.clone();
			let resize_inner = resize_init.clone();
			*resize_init.borrow_mut() = Some(Closure::new(move || {
				let Some(state) = state_resize.upgrade() else {
					// Unmounted: unregister and free the listener.
					if let Some(cb) = resize_inner.borrow_mut().take()
						&& let Some(window) = web_sys::window()
					{
						let _ = window
							.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
					}
					return;
				};
				if let Some(ref mut s) = *state.borrow_mut() {
					let (nw, nh) = canvas_size(&canvas_resize, (s.width, s.height));
					canvas_resize.set_width(nw as u32);
					canvas_resize.set_height(nh as u32);
					s.resize(nw, nh);
				}
			}));
			if let (Some(cb), Some(window)) = (resize_init.borrow().as_ref(), web_sys::window()) {
				let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		start_animation(Rc::downgrade(&state_init), ctx, animate_init.clone());
	});

	let state_vis = state.clone();
	Effect::new(move |_| {
		let vis = visibility.get();
		if let Some(ref mut s) = *state_vis.borrow_mut() {
			s.visibility = vis.unwrap_or_else(|| Visibility::all(&s.document));
		}
	});

	let state_tour = state.clone();
	Effect::new(move |_| {
		let step = pinned_step.get();
		if let Some(ref mut s) = *state_tour.borrow_mut() {
			match step {
				Some(step) => {
					let doc = s.document.clone();
					s.controller.show_tour_step(&doc, &step);
				}
				None => s.controller.clear_highlight(),
			}
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let (x, y) = local_position(&canvas, &ev);
		if let Some(ref mut s) = *state_md.borrow_mut() {
			let CanvasState {
				scene,
				controller,
				visibility,
				..
			} = s;
			controller.pointer_down(scene, visibility, x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let (x, y) = local_position(&canvas, &ev);
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			let CanvasState {
				document,
				scene,
				controller,
				visibility,
				tooltip,
				..
			} = s;
			controller.pointer_move(scene, document, visibility, x, y);
			let hovered = if controller.is_dragging() { None } else { controller.hovered };
			let cursor = if hovered.is_some() { "pointer" } else { "grab" };
			let _ = web_sys::HtmlElement::style(&canvas).set_property("cursor", cursor);
			if let Some(tooltip) = tooltip {
				match hovered {
					Some(hit) => tooltip.show(
						&tooltip_html(document, hit),
						ev.client_x() as f64,
						ev.client_y() as f64,
					),
					None => tooltip.hide(),
				}
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let (x, y) = local_position(&canvas, &ev);
		let click = match *state_mu.borrow_mut() {
			Some(ref mut s) => {
				let CanvasState {
					scene,
					controller,
					visibility,
					..
				} = s;
				controller.pointer_up(scene, visibility, x, y)
			}
			None => None,
		};
		if let Some(click) = click {
			on_click.run(click);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.controller.pointer_leave(&mut s.scene);
			if let Some(tooltip) = &s.tooltip {
				tooltip.hide();
			}
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let (x, y) = local_position(&canvas, &ev);
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.controller.wheel(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class=move || format!("graph-canvas graph-canvas-{}", mode.get().as_str())
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
