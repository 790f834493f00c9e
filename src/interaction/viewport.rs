use crate::layout::Point;

/// Screen = world * k + (x, y).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

impl ViewTransform {
	/// Scales a `world_w` x `world_h` layout to fit the screen, centered.
	pub fn fit(world_w: f64, world_h: f64, screen_w: f64, screen_h: f64) -> Self {
		if world_w <= 0.0 || world_h <= 0.0 {
			return Self::default();
		}
		let k = (screen_w / world_w).min(screen_h / world_h);
		Self {
			x: (screen_w - world_w * k) / 2.0,
			y: (screen_h - world_h * k) / 2.0,
			k,
		}
	}

	pub fn screen_to_world(&self, sx: f64, sy: f64) -> Point {
		Point::new((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	pub fn world_to_screen(&self, p: Point) -> (f64, f64) {
		(p.x * self.k + self.x, p.y * self.k + self.y)
	}

	/// Wheel zoom anchored at the pointer. `delta_y > 0` zooms out. The
	/// resulting scale stays within `[min_k, max_k]`.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, delta_y: f64, min_k: f64, max_k: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.k * factor).clamp(min_k, max_k);
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
	}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

impl PanState {
	pub fn begin(&mut self, sx: f64, sy: f64, transform: &ViewTransform) {
		*self = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: transform.x,
			transform_start_y: transform.y,
		};
	}

	pub fn update(&self, sx: f64, sy: f64, transform: &mut ViewTransform) {
		if self.active {
			transform.x = self.transform_start_x + (sx - self.start_x);
			transform.y = self.transform_start_y + (sy - self.start_y);
		}
	}
}

/// Held node, in document node positions.
#[derive(Clone, Copy, Debug, Default)]
pub struct DragState {
	pub node: Option<usize>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Point,
}

impl DragState {
	pub fn active(&self) -> bool {
		self.node.is_some()
	}

	/// World position of the held node for pointer `(sx, sy)`.
	pub fn target(&self, sx: f64, sy: f64, k: f64) -> Point {
		Point::new(
			self.node_start.x + (sx - self.start_x) / k,
			self.node_start.y + (sy - self.start_y) / k,
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_zoom_keeps_pointer_anchored_and_clamps() {
		let mut t = ViewTransform::default();
		let before = t.screen_to_world(200.0, 100.0);
		t.zoom_at(200.0, 100.0, -1.0, 0.5, 2.0);
		let after = t.screen_to_world(200.0, 100.0);
		assert!((before.x - after.x).abs() < 1e-9 && (before.y - after.y).abs() < 1e-9);
		for _ in 0..50 {
			t.zoom_at(0.0, 0.0, -1.0, 0.5, 2.0);
		}
		assert_eq!(t.k, 2.0);
		for _ in 0..50 {
			t.zoom_at(0.0, 0.0, 1.0, 0.5, 2.0);
		}
		assert_eq!(t.k, 0.5);
	}

	#[test]
	fn test_fit_centers_layout() {
		let t = ViewTransform::fit(1000.0, 800.0, 500.0, 600.0);
		assert_eq!(t.k, 0.5);
		assert_eq!(t.world_to_screen(Point::new(500.0, 400.0)), (250.0, 300.0));
	}

	#[test]
	fn test_pan_and_drag_offsets() {
		let mut t = ViewTransform { x: 10.0, y: 20.0, k: 2.0 };
		let mut pan = PanState::default();
		pan.begin(100.0, 100.0, &t);
		pan.update(130.0, 90.0, &mut t);
		assert_eq!((t.x, t.y), (40.0, 10.0));

		let drag = DragState {
			node: Some(3),
			start_x: 50.0,
			start_y: 50.0,
			node_start: Point::new(5.0, 5.0),
		};
		assert_eq!(drag.target(70.0, 40.0, 2.0), Point::new(15.0, 0.0));
	}
}
