//! One laid-out view of a document, whichever engine produced it.

use serde::{Deserialize, Serialize};

use crate::config::DashboardConfig;
use crate::filter::Visibility;
use crate::layout::Point;
use crate::layout::chord::ChordLayout;
use crate::layout::force::ForceLayoutEngine;
use crate::layout::radial::{RadialLayout, RadialOptions};
use crate::layout::sankey::SankeyLayout;
use crate::model::GraphDocument;

/// Which projection the dashboard shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
	#[default]
	Radial,
	Force,
	Chord,
	Sankey,
	Table,
}

impl ViewMode {
	pub const ALL: [ViewMode; 5] = [
		ViewMode::Radial,
		ViewMode::Force,
		ViewMode::Chord,
		ViewMode::Sankey,
		ViewMode::Table,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			ViewMode::Radial => "radial",
			ViewMode::Force => "force",
			ViewMode::Chord => "chord",
			ViewMode::Sankey => "sankey",
			ViewMode::Table => "table",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			ViewMode::Radial => "Radial",
			ViewMode::Force => "Network",
			ViewMode::Chord => "Chord",
			ViewMode::Sankey => "Flow",
			ViewMode::Table => "Table",
		}
	}

	pub fn parse(s: &str) -> Option<ViewMode> {
		ViewMode::ALL.into_iter().find(|m| m.as_str() == s)
	}
}

/// A pointer target in a scene, as a document position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
	Node(usize),
	Link(usize),
}

/// Link hit tolerance in screen pixels.
const LINK_TOLERANCE: f64 = 6.0;

pub enum Scene {
	Radial(RadialLayout),
	Force(ForceLayoutEngine),
	Chord(ChordLayout),
	Sankey(SankeyLayout),
}

impl Scene {
	/// Lays out `doc` for `mode`. `central` overrides the radial center.
	/// Returns `None` for the table view.
	pub fn build(
		mode: ViewMode,
		doc: &GraphDocument,
		config: &DashboardConfig,
		central: Option<&str>,
	) -> Option<Scene> {
		match mode {
			ViewMode::Radial => {
				let options = RadialOptions {
					central_node_id: central
						.map(str::to_string)
						.or_else(|| config.radial.central_node_id.clone()),
					..config.radial.clone()
				};
				Some(Scene::Radial(RadialLayout::new(doc, options)))
			}
			ViewMode::Force => Some(Scene::Force(ForceLayoutEngine::new(doc, config.force.clone()))),
			ViewMode::Chord => Some(Scene::Chord(ChordLayout::new(doc, &config.chord))),
			ViewMode::Sankey => Some(Scene::Sankey(SankeyLayout::for_root(doc, &config.sankey))),
			ViewMode::Table => None,
		}
	}

	/// Nominal layout size in world units.
	pub fn size(&self, config: &DashboardConfig) -> (f64, f64) {
		match self {
			Scene::Radial(r) => (r.options.width, r.options.height),
			Scene::Force(f) => (f.config().width, f.config().height),
			Scene::Chord(_) => (config.chord.width, config.chord.height),
			Scene::Sankey(_) => (config.sankey.width, config.sankey.height),
		}
	}

	/// Allowed zoom scale range.
	pub fn zoom_extent(&self) -> (f64, f64) {
		match self {
			Scene::Radial(r) => (r.options.min_zoom, r.options.max_zoom),
			Scene::Force(f) => (f.config().min_zoom, f.config().max_zoom),
			Scene::Chord(_) | Scene::Sankey(_) => (1.0, 1.0),
		}
	}

	pub fn is_draggable(&self) -> bool {
		matches!(self, Scene::Force(_))
	}

	/// Whether the scene still needs frames without user input.
	pub fn is_animating(&self) -> bool {
		match self {
			Scene::Force(f) => f.is_running(),
			_ => false,
		}
	}

	pub fn tick(&mut self, dt: f32) {
		if let Scene::Force(f) = self {
			f.tick(dt);
		}
	}

	pub fn node_position(&self, node: usize) -> Option<Point> {
		match self {
			Scene::Radial(r) => r.node(node).map(|n| n.position),
			Scene::Force(f) => f.positions().get(node).copied(),
			Scene::Chord(c) => c
				.groups
				.get(node)
				.map(|g| c.point_at(g.mid_angle(), c.outer_radius)),
			Scene::Sankey(s) => s
				.nodes
				.iter()
				.find(|n| n.node == node)
				.map(|n| Point::new(n.x0, (n.y0 + n.y1) / 2.0)),
		}
	}

	fn node_at(&self, p: Point) -> Option<usize> {
		match self {
			Scene::Radial(r) => r.node_at(p),
			Scene::Force(f) => f.node_at(p),
			Scene::Chord(c) => c.group_at(p),
			Scene::Sankey(s) => s.node_at(p),
		}
	}

	fn link_at(&self, p: Point, k: f64, visibility: &Visibility) -> Option<usize> {
		let tolerance = LINK_TOLERANCE / k;
		let visible = |i: usize| visibility.link(i);
		match self {
			Scene::Radial(r) => r.link_at(p, tolerance, visible),
			Scene::Force(f) => f.link_at(p, tolerance, visible),
			Scene::Chord(c) => c
				.chord_at(p)
				.and_then(|i| c.ribbon_link(&c.chords[i]))
				.filter(|&l| visible(l)),
			Scene::Sankey(s) => s.link_at(p).filter(|&l| visible(l)),
		}
	}

	/// Topmost visible node, else visible link, under world point `p`.
	pub fn hit(&self, p: Point, k: f64, visibility: &Visibility) -> Option<Hit> {
		if let Some(node) = self.node_at(p).filter(|&n| visibility.node(n)) {
			return Some(Hit::Node(node));
		}
		self.link_at(p, k, visibility).map(Hit::Link)
	}

	pub fn drag_start(&mut self, node: usize) -> bool {
		match self {
			Scene::Force(f) => {
				f.drag_start(node);
				f.pinned() == Some(node)
			}
			_ => false,
		}
	}

	pub fn drag_to(&mut self, node: usize, p: Point) {
		if let Scene::Force(f) = self {
			f.drag_to(node, p);
		}
	}

	pub fn drag_end(&mut self) {
		if let Scene::Force(f) = self {
			f.drag_end();
		}
	}
}
