//! Pointer, zoom and tour handling shared by every canvas view. Mutates
//! view state only; the document is never touched.

mod highlight;
mod tour;
mod viewport;

pub use highlight::{Emphasis, Highlight, HighlightSet};
pub use tour::{CancelToken, LEAD_IN_MS, TourEnd, play_tour};
pub use viewport::{DragState, PanState, ViewTransform};

use crate::filter::Visibility;
use crate::model::{GraphDocument, TourStep};
use crate::scene::{Hit, Scene};

/// Pointer travel below which a press and release count as a click.
const CLICK_SLOP: f64 = 4.0;

/// What a completed click landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Click {
	Node(usize),
	Link(usize),
	Background,
}

/// View state of one mounted visualization.
#[derive(Clone, Debug, Default)]
pub struct InteractionController {
	pub view: ViewTransform,
	pub highlight: Highlight,
	pub hovered: Option<Hit>,
	pan: PanState,
	drag: DragState,
	pressed_at: Option<(f64, f64)>,
	zoom_extent: (f64, f64),
}

impl InteractionController {
	/// Fits `scene` into a `screen_w` x `screen_h` canvas.
	pub fn new(scene: &Scene, world: (f64, f64), screen_w: f64, screen_h: f64) -> Self {
		let (min_k, max_k) = scene.zoom_extent();
		let view = ViewTransform::fit(world.0, world.1, screen_w, screen_h);
		Self {
			view,
			zoom_extent: (min_k.min(view.k), max_k.max(view.k)),
			..Default::default()
		}
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.active()
	}

	pub fn pointer_down(&mut self, scene: &mut Scene, visibility: &Visibility, sx: f64, sy: f64) {
		self.pressed_at = Some((sx, sy));
		let p = self.view.screen_to_world(sx, sy);
		if let Some(Hit::Node(node)) = scene.hit(p, self.view.k, visibility)
			&& scene.is_draggable()
			&& let Some(start) = scene.node_position(node)
			&& scene.drag_start(node)
		{
			self.drag = DragState {
				node: Some(node),
				start_x: sx,
				start_y: sy,
				node_start: start,
			};
			return;
		}
		self.pan.begin(sx, sy, &self.view);
	}

	/// Drags, pans, or updates hover. Returns whether a redraw is needed.
	pub fn pointer_move(
		&mut self,
		scene: &mut Scene,
		doc: &GraphDocument,
		visibility: &Visibility,
		sx: f64,
		sy: f64,
	) -> bool {
		if let Some(node) = self.drag.node {
			scene.drag_to(node, self.drag.target(sx, sy, self.view.k));
			return true;
		}
		if self.pan.active {
			self.pan.update(sx, sy, &mut self.view);
			return true;
		}
		let hit = scene.hit(self.view.screen_to_world(sx, sy), self.view.k, visibility);
		if hit == self.hovered {
			return false;
		}
		self.hovered = hit;
		let focus = hit.map(|h| match h {
			Hit::Node(node) => HighlightSet::for_node(doc, node),
			Hit::Link(link) => HighlightSet::for_link_type(doc, doc.links[link].link_type),
		});
		self.highlight.hover(focus);
		true
	}

	/// Ends a drag or pan; reports a click when the pointer barely moved.
	pub fn pointer_up(&mut self, scene: &mut Scene, visibility: &Visibility, sx: f64, sy: f64) -> Option<Click> {
		if self.drag.active() {
			scene.drag_end();
		}
		self.drag = DragState::default();
		self.pan.active = false;

		let (px, py) = self.pressed_at.take()?;
		if (sx - px).hypot(sy - py) > CLICK_SLOP {
			return None;
		}
		let p = self.view.screen_to_world(sx, sy);
		Some(match scene.hit(p, self.view.k, visibility) {
			Some(Hit::Node(n)) => Click::Node(n),
			Some(Hit::Link(l)) => Click::Link(l),
			None => Click::Background,
		})
	}

	pub fn pointer_leave(&mut self, scene: &mut Scene) {
		if self.drag.active() {
			scene.drag_end();
		}
		self.drag = DragState::default();
		self.pan.active = false;
		self.pressed_at = None;
		self.hovered = None;
		self.highlight.hover(None);
	}

	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let (min_k, max_k) = self.zoom_extent;
		self.view.zoom_at(sx, sy, delta_y, min_k, max_k);
	}

	/// Advances the simulation and the highlight fade by one frame.
	pub fn tick(&mut self, scene: &mut Scene, dt: f32) {
		scene.tick(dt);
		self.highlight.tick(dt as f64);
	}

	/// Pins the highlight of one tour step.
	pub fn show_tour_step(&mut self, doc: &GraphDocument, step: &TourStep) {
		self.highlight.pin(HighlightSet::for_tour_step(doc, step));
	}

	/// Drops every dimmed/highlighted state.
	pub fn clear_highlight(&mut self) {
		self.hovered = None;
		self.highlight.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::DashboardConfig;
	use crate::scene::ViewMode;

	fn doc() -> GraphDocument {
		GraphDocument::from_json(
			r#"{
				"nodes": [{"id": "energy"}, {"id": "water"}, {"id": "agri"}],
				"links": [
					{"id": "l1", "source": "energy", "target": "water", "type": "synergy"},
					{"id": "l2", "source": "energy", "target": "agri", "type": "conflict"}
				]
			}"#,
		)
		.unwrap()
	}

	fn setup(mode: ViewMode) -> (GraphDocument, Scene, InteractionController) {
		let d = doc();
		let config = DashboardConfig::default();
		let scene = Scene::build(mode, &d, &config, Some("energy")).unwrap();
		let size = scene.size(&config);
		let ctl = InteractionController::new(&scene, size, size.0, size.1);
		(d, scene, ctl)
	}

	#[test]
	fn test_hover_node_then_leave() {
		let (d, mut scene, mut ctl) = setup(ViewMode::Radial);
		let vis = Visibility::all(&d);
		let (sx, sy) = ctl.view.world_to_screen(scene.node_position(1).unwrap());
		assert!(ctl.pointer_move(&mut scene, &d, &vis, sx, sy));
		assert_eq!(ctl.hovered, Some(Hit::Node(1)));
		assert_eq!(ctl.highlight.link(0), Emphasis::Highlighted);
		assert_eq!(ctl.highlight.link(1), Emphasis::Dimmed);
		assert!(!ctl.pointer_move(&mut scene, &d, &vis, sx, sy));
		ctl.pointer_leave(&mut scene);
		assert_eq!(ctl.hovered, None);
	}

	#[test]
	fn test_click_versus_pan() {
		let (d, mut scene, mut ctl) = setup(ViewMode::Radial);
		let vis = Visibility::all(&d);
		let (sx, sy) = ctl.view.world_to_screen(scene.node_position(2).unwrap());
		ctl.pointer_down(&mut scene, &vis, sx, sy);
		assert_eq!(ctl.pointer_up(&mut scene, &vis, sx + 1.0, sy), Some(Click::Node(2)));

		ctl.pointer_down(&mut scene, &vis, 5.0, 5.0);
		assert_eq!(ctl.pointer_up(&mut scene, &vis, 5.0, 5.0), Some(Click::Background));

		let before = ctl.view;
		ctl.pointer_down(&mut scene, &vis, 5.0, 5.0);
		ctl.pointer_move(&mut scene, &d, &vis, 65.0, 25.0);
		assert_eq!(ctl.pointer_up(&mut scene, &vis, 65.0, 25.0), None);
		assert_eq!(ctl.view.x, before.x + 60.0);
	}

	#[test]
	fn test_drag_pins_force_node() {
		let (d, mut scene, mut ctl) = setup(ViewMode::Force);
		let vis = Visibility::all(&d);
		let (sx, sy) = ctl.view.world_to_screen(scene.node_position(1).unwrap());
		ctl.pointer_down(&mut scene, &vis, sx, sy);
		assert!(ctl.is_dragging());
		ctl.pointer_move(&mut scene, &d, &vis, sx + 30.0, sy);
		for _ in 0..5 {
			ctl.tick(&mut scene, 0.016);
		}
		let held = scene.node_position(1).unwrap();
		let (hx, _) = ctl.view.world_to_screen(held);
		assert!((hx - (sx + 30.0)).abs() < 1e-6);
		ctl.pointer_up(&mut scene, &vis, sx + 30.0, sy);
		assert!(!ctl.is_dragging());
	}

	#[test]
	fn test_tour_step_pins_until_cleared() {
		let (d, mut scene, mut ctl) = setup(ViewMode::Radial);
		let vis = Visibility::all(&d);
		let step = TourStep {
			focus_nodes: vec!["agri".into()],
			highlight_edges: vec!["l2".into()],
			narration: String::new(),
			duration: None,
		};
		ctl.show_tour_step(&d, &step);
		let (sx, sy) = ctl.view.world_to_screen(scene.node_position(1).unwrap());
		ctl.pointer_move(&mut scene, &d, &vis, sx, sy);
		assert_eq!(ctl.highlight.link(1), Emphasis::Highlighted);
		assert_eq!(ctl.highlight.link(0), Emphasis::Dimmed);
		ctl.clear_highlight();
		assert_eq!(ctl.highlight.link(0), Emphasis::Normal);
	}

	#[test]
	fn test_wheel_respects_zoom_extent() {
		let (_, _, mut ctl) = setup(ViewMode::Radial);
		for _ in 0..100 {
			ctl.wheel(10.0, 10.0, -1.0);
		}
		assert_eq!(ctl.view.k, 2.0);
	}
}
