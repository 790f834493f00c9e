//! Force-directed layout.
//!
//! Charge repulsion and edge springs are integrated by `force_graph`; after
//! each integration step three passes run over the positions: links are
//! nudged toward their target length, the centroid is pulled to the
//! viewport center, and overlapping nodes are pushed apart. The whole step
//! is scaled by a cooling `alpha` that decays toward `alpha_target`; the
//! simulation stops once alpha falls below `alpha_min` or the iteration
//! budget runs out. Dragging raises `alpha_target` so neighbours readjust.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;
use serde::{Deserialize, Serialize};

use super::{Point, distance_to_segment};
use crate::model::{GraphDocument, GraphIndex};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForceConfig {
	pub width: f64,
	pub height: f64,
	/// Target length of every link.
	pub link_distance: f64,
	/// Magnitude of pairwise repulsion.
	pub charge_strength: f64,
	/// Minimum center-to-center separation.
	pub collision_radius: f64,
	pub central_radius: f64,
	pub node_radius: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	/// `alpha_target` while a node is held.
	pub drag_alpha_target: f64,
	pub max_iterations: usize,
	pub min_zoom: f64,
	pub max_zoom: f64,
}

impl Default for ForceConfig {
	fn default() -> Self {
		Self {
			width: 1200.0,
			height: 800.0,
			link_distance: 250.0,
			charge_strength: 800.0,
			collision_radius: 80.0,
			central_radius: 40.0,
			node_radius: 30.0,
			alpha_min: 0.001,
			alpha_decay: 1.0 - 0.001f64.powf(1.0 / 300.0),
			drag_alpha_target: 0.3,
			max_iterations: 300,
			min_zoom: 0.5,
			max_zoom: 3.0,
		}
	}
}

#[derive(Clone, Debug, Default)]
struct BodyInfo {
	doc_index: usize,
}

/// A straight link between two laid-out nodes.
#[derive(Clone, Copy, Debug)]
pub struct ForceLink {
	pub link: usize,
	pub source: usize,
	pub target: usize,
}

/// Running simulation for one view.
pub struct ForceLayoutEngine {
	graph: ForceGraph<BodyInfo, ()>,
	bodies: HashMap<usize, DefaultNodeIdx>,
	positions: Vec<Point>,
	radii: Vec<f64>,
	links: Vec<ForceLink>,
	config: ForceConfig,
	alpha: f64,
	alpha_target: f64,
	iterations: usize,
	running: bool,
	pinned: Option<usize>,
}

impl ForceLayoutEngine {
	pub fn new(doc: &GraphDocument, config: ForceConfig) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: config.charge_strength as f32,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});
		let index = GraphIndex::new(doc);
		let (cx, cy) = (config.width / 2.0, config.height / 2.0);
		let n = doc.nodes.len();
		let mut bodies = HashMap::with_capacity(n);
		let mut positions = Vec::with_capacity(n);
		let mut radii = Vec::with_capacity(n);

		for (i, node) in doc.nodes.iter().enumerate() {
			let angle = (i as f64) * 2.0 * PI / n as f64;
			let p = Point::new(cx + 100.0 * angle.cos(), cy + 100.0 * angle.sin());
			let idx = graph.add_node(NodeData {
				x: p.x as f32,
				y: p.y as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: BodyInfo { doc_index: i },
			});
			bodies.insert(i, idx);
			positions.push(p);
			radii.push(if node.is_central_node {
				config.central_radius
			} else {
				config.node_radius
			});
		}

		let mut links = Vec::new();
		for resolved in index.resolved_links() {
			if let (Some(&src), Some(&tgt)) =
				(bodies.get(&resolved.source), bodies.get(&resolved.target))
			{
				graph.add_edge(src, tgt, EdgeData::default());
				links.push(ForceLink {
					link: resolved.index,
					source: resolved.source,
					target: resolved.target,
				});
			}
		}

		Self {
			graph,
			bodies,
			positions,
			radii,
			links,
			config,
			alpha: 1.0,
			alpha_target: 0.0,
			iterations: 0,
			running: true,
			pinned: None,
		}
	}

	pub fn positions(&self) -> &[Point] {
		&self.positions
	}

	pub fn radius(&self, node: usize) -> f64 {
		self.radii[node]
	}

	pub fn links(&self) -> &[ForceLink] {
		&self.links
	}

	pub fn config(&self) -> &ForceConfig {
		&self.config
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	pub fn pinned(&self) -> Option<usize> {
		self.pinned
	}

	/// Advances the simulation by one frame. A no-op once cooled.
	pub fn tick(&mut self, dt: f32) {
		if !self.running {
			return;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		self.iterations += 1;

		self.graph.update(dt * self.alpha as f32);
		self.read_positions();

		let pinned = self.pinned;
		let links: Vec<(usize, usize)> = self.links.iter().map(|l| (l.source, l.target)).collect();
		apply_link_distance(
			&mut self.positions,
			&links,
			self.config.link_distance,
			self.alpha,
			pinned,
		);
		apply_centering(
			&mut self.positions,
			Point::new(self.config.width / 2.0, self.config.height / 2.0),
			pinned,
		);
		resolve_collisions(&mut self.positions, self.config.collision_radius, pinned);
		self.write_positions();

		let cooled = self.alpha < self.config.alpha_min && self.alpha_target == 0.0;
		let exhausted = self.iterations >= self.config.max_iterations && self.pinned.is_none();
		if cooled || exhausted {
			debug!("force layout settled after {} ticks", self.iterations);
			self.running = false;
		}
	}

	/// Runs ticks until the simulation stops, bounded by the iteration budget.
	pub fn settle(&mut self) {
		while self.running {
			self.tick(0.016);
		}
	}

	/// Takes exclusive ownership of `node`'s position and reheats.
	pub fn drag_start(&mut self, node: usize) {
		if node >= self.positions.len() {
			return;
		}
		self.pinned = Some(node);
		self.set_anchor(node, true);
		self.alpha_target = self.config.drag_alpha_target;
		self.alpha = self.alpha.max(self.config.drag_alpha_target);
		self.iterations = 0;
		self.running = true;
	}

	/// Moves the held node. Ignored for any node but the pinned one.
	pub fn drag_to(&mut self, node: usize, p: Point) {
		if self.pinned != Some(node) {
			return;
		}
		self.positions[node] = p;
		if let Some(&idx) = self.bodies.get(&node) {
			self.graph.visit_nodes_mut(|body| {
				if body.index() == idx {
					body.data.x = p.x as f32;
					body.data.y = p.y as f32;
				}
			});
		}
	}

	/// Releases the pin; the next tick treats the node as free.
	pub fn drag_end(&mut self) {
		if let Some(node) = self.pinned.take() {
			self.set_anchor(node, false);
		}
		self.alpha_target = 0.0;
	}

	/// Node whose disc contains `p`, topmost first.
	pub fn node_at(&self, p: Point) -> Option<usize> {
		(0..self.positions.len())
			.rev()
			.find(|&i| self.positions[i].distance(p) <= self.radii[i])
	}

	/// Link passing within `tolerance` of `p`, among those for which
	/// `visible` holds.
	pub fn link_at(&self, p: Point, tolerance: f64, visible: impl Fn(usize) -> bool) -> Option<usize> {
		self.links
			.iter()
			.filter(|l| visible(l.link))
			.find(|l| {
				distance_to_segment(p, self.positions[l.source], self.positions[l.target])
					<= tolerance
			})
			.map(|l| l.link)
	}

	fn set_anchor(&mut self, node: usize, anchored: bool) {
		if let Some(&idx) = self.bodies.get(&node) {
			self.graph.visit_nodes_mut(|body| {
				if body.index() == idx {
					body.data.is_anchor = anchored;
				}
			});
		}
	}

	fn read_positions(&mut self) {
		let positions = &mut self.positions;
		self.graph.visit_nodes(|body| {
			let i = body.data.user_data.doc_index;
			positions[i] = Point::new(body.x() as f64, body.y() as f64);
		});
	}

	fn write_positions(&mut self) {
		let positions = &self.positions;
		self.graph.visit_nodes_mut(|body| {
			let p = positions[body.data.user_data.doc_index];
			body.data.x = p.x as f32;
			body.data.y = p.y as f32;
		});
	}
}

/// Moves each link's endpoints toward `distance` apart, scaled by `alpha`.
pub fn apply_link_distance(
	positions: &mut [Point],
	links: &[(usize, usize)],
	distance: f64,
	alpha: f64,
	pinned: Option<usize>,
) {
	for &(s, t) in links {
		if s == t {
			continue;
		}
		let (a, b) = (positions[s], positions[t]);
		let (dx, dy) = (b.x - a.x, b.y - a.y);
		let len = dx.hypot(dy).max(1e-6);
		let k = (len - distance) / len * alpha * 0.5;
		let (mx, my) = (dx * k, dy * k);
		if pinned != Some(s) {
			positions[s].x += mx;
			positions[s].y += my;
		}
		if pinned != Some(t) {
			positions[t].x -= mx;
			positions[t].y -= my;
		}
	}
}

/// Translates free nodes so the centroid lands on `center`.
pub fn apply_centering(positions: &mut [Point], center: Point, pinned: Option<usize>) {
	if positions.is_empty() {
		return;
	}
	let n = positions.len() as f64;
	let (sx, sy) = positions
		.iter()
		.fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
	let (shift_x, shift_y) = (center.x - sx / n, center.y - sy / n);
	for (i, p) in positions.iter_mut().enumerate() {
		if pinned != Some(i) {
			p.x += shift_x;
			p.y += shift_y;
		}
	}
}

/// Pushes apart every pair closer than `min_separation`.
///
/// A pinned node never moves; its partner takes the whole correction.
pub fn resolve_collisions(positions: &mut [Point], min_separation: f64, pinned: Option<usize>) {
	let n = positions.len();
	for i in 0..n {
		for j in (i + 1)..n {
			let (a, b) = (positions[i], positions[j]);
			let (dx, dy) = (b.x - a.x, b.y - a.y);
			let dist = dx.hypot(dy);
			if dist >= min_separation {
				continue;
			}
			let (ux, uy) = if dist < 1e-6 {
				// Coincident: separate along a fixed per-pair direction.
				let angle = (i * 31 + j * 17) as f64;
				(angle.cos(), angle.sin())
			} else {
				(dx / dist, dy / dist)
			};
			let overlap = min_separation - dist;
			let (share_i, share_j) = match pinned {
				Some(p) if p == i => (0.0, 1.0),
				Some(p) if p == j => (1.0, 0.0),
				_ => (0.5, 0.5),
			};
			positions[i].x -= ux * overlap * share_i;
			positions[i].y -= uy * overlap * share_i;
			positions[j].x += ux * overlap * share_j;
			positions[j].y += uy * overlap * share_j;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn doc() -> GraphDocument {
		GraphDocument::from_json(
			r#"{
				"nodes": [
					{"id": "energy", "isCentralNode": true},
					{"id": "water"}, {"id": "agri"}, {"id": "transport"}
				],
				"links": [
					{"source": "energy", "target": "water", "value": 40},
					{"source": "energy", "target": "agri", "value": 20},
					{"source": "water", "target": "agri", "value": 10}
				]
			}"#,
		)
		.unwrap()
	}

	#[test]
	fn test_simulation_stops_within_budget() {
		let mut engine = ForceLayoutEngine::new(&doc(), ForceConfig::default());
		let mut ticks = 0;
		while engine.is_running() {
			engine.tick(0.016);
			ticks += 1;
			assert!(ticks <= 300, "simulation did not stop");
		}
		assert!(engine.positions().iter().all(|p| p.x.is_finite() && p.y.is_finite()));
	}

	#[test]
	fn test_pinned_node_holds_position() {
		let mut engine = ForceLayoutEngine::new(&doc(), ForceConfig::default());
		engine.drag_start(1);
		let held = Point::new(42.0, 17.0);
		engine.drag_to(1, held);
		for _ in 0..50 {
			engine.tick(0.016);
		}
		assert_eq!(engine.positions()[1], held);
		assert!(engine.is_running(), "held drag keeps the simulation warm");
	}

	#[test]
	fn test_drag_reheats_and_release_cools() {
		let mut engine = ForceLayoutEngine::new(&doc(), ForceConfig::default());
		engine.settle();
		assert!(!engine.is_running());

		engine.drag_start(2);
		assert!(engine.is_running());
		assert!(engine.alpha() >= 0.3);
		engine.drag_to(3, Point::new(0.0, 0.0));
		assert_eq!(engine.pinned(), Some(2));

		engine.drag_end();
		assert_eq!(engine.pinned(), None);
		engine.settle();
		assert!(!engine.is_running());
	}

	#[test]
	fn test_collision_separates_overlapping() {
		let mut positions = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
		resolve_collisions(&mut positions, 80.0, None);
		assert!((positions[0].distance(positions[1]) - 80.0).abs() < 1e-9);
		assert!((positions[0].x + positions[1].x - 10.0).abs() < 1e-9);
	}

	#[test]
	fn test_collision_respects_pin() {
		let mut positions = vec![Point::new(0.0, 0.0), Point::new(0.0, 0.0)];
		resolve_collisions(&mut positions, 50.0, Some(0));
		assert_eq!(positions[0], Point::new(0.0, 0.0));
		assert!((positions[1].distance(positions[0]) - 50.0).abs() < 1e-9);
	}

	#[test]
	fn test_centering_moves_centroid() {
		let mut positions = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
		apply_centering(&mut positions, Point::new(100.0, 50.0), None);
		assert_eq!(positions[0], Point::new(95.0, 50.0));
		assert_eq!(positions[1], Point::new(105.0, 50.0));
	}

	#[test]
	fn test_link_distance_pulls_toward_target() {
		let mut positions = vec![Point::new(0.0, 0.0), Point::new(400.0, 0.0)];
		apply_link_distance(&mut positions, &[(0, 1)], 250.0, 1.0, None);
		assert!((positions[0].distance(positions[1]) - 250.0).abs() < 1e-9);
	}

	#[test]
	fn test_hit_testing() {
		let engine = ForceLayoutEngine::new(&doc(), ForceConfig::default());
		let p = engine.positions()[0];
		assert_eq!(engine.node_at(p), Some(0));
		assert_eq!(engine.node_at(Point::new(-500.0, -500.0)), None);
	}
}
