use std::sync::Arc;

use crate::filter::Visibility;
use crate::interaction::InteractionController;
use crate::model::GraphDocument;
use crate::scene::Scene;

use super::tooltip::Tooltip;

/// Everything one mounted canvas needs between frames.
pub struct CanvasState {
	pub document: Arc<GraphDocument>,
	pub scene: Scene,
	pub controller: InteractionController,
	pub visibility: Visibility,
	pub tooltip: Option<Tooltip>,
	pub width: f64,
	pub height: f64,
	/// Seconds since mount, drives the dash animation of force links.
	pub flow_time: f64,
}

impl CanvasState {
	pub fn new(
		document: Arc<GraphDocument>,
		scene: Scene,
		world: (f64, f64),
		visibility: Visibility,
		width: f64,
		height: f64,
	) -> Self {
		let controller = InteractionController::new(&scene, world, width, height);
		Self {
			document,
			scene,
			controller,
			visibility,
			tooltip: None,
			width,
			height,
			flow_time: 0.0,
		}
	}

	pub fn tick(&mut self, dt: f32) {
		self.controller.tick(&mut self.scene, dt);
		self.flow_time += dt as f64;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}
