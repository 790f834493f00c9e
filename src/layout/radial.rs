//! Radial layout: one central node at the viewport center, every other
//! connected node evenly spaced on a circle around it, links drawn as
//! circular arcs between node boundaries.
//!
//! Isolated nodes (no incident link) are left out of the layout unless
//! `include_isolated` is set.

use std::collections::{HashMap, HashSet};
use std::f64::consts::{PI, TAU};

use log::warn;
use serde::{Deserialize, Serialize};

use super::Point;
use crate::model::{GraphDocument, GraphIndex, LinkType};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RadialOptions {
	/// Central node id; detected from the document when absent.
	pub central_node_id: Option<String>,
	pub radius: f64,
	pub width: f64,
	pub height: f64,
	pub central_radius: f64,
	pub node_radius: f64,
	pub include_isolated: bool,
	pub min_zoom: f64,
	pub max_zoom: f64,
}

impl Default for RadialOptions {
	fn default() -> Self {
		Self {
			central_node_id: None,
			radius: 280.0,
			width: 1000.0,
			height: 800.0,
			central_radius: 45.0,
			node_radius: 35.0,
			include_isolated: false,
			min_zoom: 0.5,
			max_zoom: 2.0,
		}
	}
}

/// Picks the central node: the one flagged `isCentralNode`, otherwise the
/// most frequent link source (earliest seen wins ties).
pub fn detect_central_node(doc: &GraphDocument) -> Option<String> {
	if let Some(node) = doc.nodes.iter().find(|n| n.is_central_node) {
		return Some(node.id.clone());
	}
	let mut counts: Vec<(&str, usize)> = Vec::new();
	let mut seen: HashMap<&str, usize> = HashMap::new();
	for link in &doc.links {
		match seen.get(link.source.as_str()) {
			Some(&slot) => counts[slot].1 += 1,
			None => {
				seen.insert(&link.source, counts.len());
				counts.push((&link.source, 1));
			}
		}
	}
	let mut best: Option<(&str, usize)> = None;
	for (id, count) in counts {
		if best.is_none_or(|(_, c)| count > c) {
			best = Some((id, count));
		}
	}
	best.map(|(id, _)| id.to_string())
}

/// A node placed by the radial layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialNode {
	/// Position in `GraphDocument::nodes`.
	pub node: usize,
	pub position: Point,
	/// Angle on the ring; `None` for the central node.
	pub angle: Option<f64>,
	pub radius: f64,
}

/// A link routed as an SVG-style circular arc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialArc {
	/// Position in `GraphDocument::links`.
	pub link: usize,
	pub link_type: LinkType,
	pub start: Point,
	pub end: Point,
	/// Arc radius.
	pub dr: f64,
	/// SVG sweep flag: 0 when leaving the central node, 1 otherwise.
	pub sweep: u8,
	/// Index among links sharing the same ordered pair.
	pub parallel_index: usize,
	pub parallel_count: usize,
	pub dashed: bool,
	pub stroke_width: f64,
}

/// Circle center and angular span of an arc, for canvas drawing and hit tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcGeometry {
	pub center: Point,
	pub radius: f64,
	pub start_angle: f64,
	/// Signed sweep; positive runs clockwise on screen.
	pub delta: f64,
}

impl ArcGeometry {
	pub fn end_angle(&self) -> f64 {
		self.start_angle + self.delta
	}

	/// Whether `p` lies within `tolerance` of the arc.
	pub fn contains(&self, p: Point, tolerance: f64) -> bool {
		if (p.distance(self.center) - self.radius).abs() > tolerance {
			return false;
		}
		let angle = (p.y - self.center.y).atan2(p.x - self.center.x);
		let offset = if self.delta >= 0.0 {
			(angle - self.start_angle).rem_euclid(TAU)
		} else {
			(self.start_angle - angle).rem_euclid(TAU)
		};
		offset <= self.delta.abs()
	}

	/// Point at fraction `t` along the arc.
	pub fn point_at(&self, t: f64) -> Point {
		let a = self.start_angle + self.delta * t;
		Point::new(
			self.center.x + self.radius * a.cos(),
			self.center.y + self.radius * a.sin(),
		)
	}
}

impl RadialArc {
	/// Converts the endpoint form (small arc) to center form.
	pub fn geometry(&self) -> ArcGeometry {
		let (x1, y1, x2, y2) = (self.start.x, self.start.y, self.end.x, self.end.y);
		let (hx, hy) = ((x1 - x2) / 2.0, (y1 - y2) / 2.0);
		let half = hx.hypot(hy);
		let r = self.dr.abs().max(half);
		// Small arc: the center sits on the side selected by the sweep flag.
		let sign = if self.sweep == 0 { -1.0 } else { 1.0 };
		let coef = if half > 0.0 {
			sign * ((r * r - half * half).max(0.0) / (half * half)).sqrt()
		} else {
			0.0
		};
		let (cxp, cyp) = (coef * hy, -coef * hx);
		let center = Point::new(cxp + (x1 + x2) / 2.0, cyp + (y1 + y2) / 2.0);

		let start_angle = (hy - cyp).atan2(hx - cxp);
		let end_angle = (-hy - cyp).atan2(-hx - cxp);
		let mut delta = (end_angle - start_angle + PI).rem_euclid(TAU) - PI;
		if self.sweep == 0 && delta > 0.0 {
			delta -= TAU;
		} else if self.sweep == 1 && delta < 0.0 {
			delta += TAU;
		}
		ArcGeometry {
			center,
			radius: r,
			start_angle,
			delta,
		}
	}
}

#[derive(Clone, Debug)]
pub struct RadialLayout {
	pub central: Option<usize>,
	pub center: Point,
	pub nodes: Vec<RadialNode>,
	pub arcs: Vec<RadialArc>,
	pub options: RadialOptions,
}

impl RadialLayout {
	pub fn new(doc: &GraphDocument, mut options: RadialOptions) -> Self {
		let index = GraphIndex::new(doc);
		let central_id = options
			.central_node_id
			.clone()
			.or_else(|| detect_central_node(doc));
		let central = central_id.as_deref().and_then(|id| index.position(id));
		if let (Some(id), None) = (central_id.as_deref(), central) {
			warn!("central node `{id}` is not in the document; laying out without a center");
		}
		options.central_node_id = central.map(|i| doc.nodes[i].id.clone());

		let center = Point::new(options.width / 2.0, options.height / 2.0);
		let connected: HashSet<&str> = doc
			.links
			.iter()
			.flat_map(|l| [l.source.as_str(), l.target.as_str()])
			.collect();
		let peripheral: Vec<usize> = doc
			.nodes
			.iter()
			.enumerate()
			.filter(|(i, n)| {
				Some(*i) != central
					&& (options.include_isolated || connected.contains(n.id.as_str()))
			})
			.map(|(i, _)| i)
			.collect();

		let mut nodes = Vec::with_capacity(peripheral.len() + 1);
		if let Some(c) = central {
			nodes.push(RadialNode {
				node: c,
				position: center,
				angle: None,
				radius: options.central_radius,
			});
		}
		let k = peripheral.len();
		for (i, &node) in peripheral.iter().enumerate() {
			let angle = peripheral_angle(i, k);
			nodes.push(RadialNode {
				node,
				position: Point::new(
					center.x + options.radius * angle.cos(),
					center.y + options.radius * angle.sin(),
				),
				angle: Some(angle),
				radius: options.node_radius,
			});
		}

		let arcs = route_arcs(&index, &nodes, central);
		Self {
			central,
			center,
			nodes,
			arcs,
			options,
		}
	}

	/// Number of nodes on the ring.
	pub fn peripheral_count(&self) -> usize {
		self.nodes.iter().filter(|n| n.angle.is_some()).count()
	}

	/// Laid-out node for a document node position.
	pub fn node(&self, doc_index: usize) -> Option<&RadialNode> {
		self.nodes.iter().find(|n| n.node == doc_index)
	}

	/// Document node under `p`.
	pub fn node_at(&self, p: Point) -> Option<usize> {
		self.nodes
			.iter()
			.rev()
			.find(|n| n.position.distance(p) <= n.radius)
			.map(|n| n.node)
	}

	/// Document link whose arc passes within `tolerance` of `p`, among the
	/// arcs for which `visible` holds.
	pub fn link_at(&self, p: Point, tolerance: f64, visible: impl Fn(usize) -> bool) -> Option<usize> {
		self.arcs
			.iter()
			.filter(|a| visible(a.link))
			.find(|a| a.geometry().contains(p, tolerance))
			.map(|a| a.link)
	}
}

/// Ring angle of peripheral node `i` of `k`: first at the top, then clockwise.
pub fn peripheral_angle(i: usize, k: usize) -> f64 {
	-PI / 2.0 + (i as f64 / k as f64) * 2.0 * PI
}

fn route_arcs(index: &GraphIndex<'_>, nodes: &[RadialNode], central: Option<usize>) -> Vec<RadialArc> {
	let placed: HashMap<usize, &RadialNode> = nodes.iter().map(|n| (n.node, n)).collect();
	let resolved = index.resolved_links();

	let mut pair_totals: HashMap<(usize, usize), usize> = HashMap::new();
	for r in &resolved {
		*pair_totals.entry((r.source, r.target)).or_default() += 1;
	}
	let mut pair_seen: HashMap<(usize, usize), usize> = HashMap::new();

	let mut arcs = Vec::with_capacity(resolved.len());
	for r in resolved {
		let slot = pair_seen.entry((r.source, r.target)).or_default();
		let parallel_index = *slot;
		*slot += 1;
		let (Some(source), Some(target)) = (placed.get(&r.source), placed.get(&r.target)) else {
			continue;
		};
		let parallel_count = pair_totals[&(r.source, r.target)];

		let (dx, dy) = (target.position.x - source.position.x, target.position.y - source.position.y);
		let angle = dy.atan2(dx);
		let distance = dx.hypot(dy);
		let start = Point::new(
			source.position.x + source.radius * angle.cos(),
			source.position.y + source.radius * angle.sin(),
		);
		let end = Point::new(
			target.position.x - target.radius * angle.cos(),
			target.position.y - target.radius * angle.sin(),
		);

		arcs.push(RadialArc {
			link: r.index,
			link_type: r.link.link_type,
			start,
			end,
			dr: curvature_radius(distance, parallel_index, parallel_count),
			sweep: if Some(r.source) == central { 0 } else { 1 },
			parallel_index,
			parallel_count,
			dashed: r.link.link_type == LinkType::Indirect,
			stroke_width: (r.link.value / 12.0).max(2.0),
		});
	}
	arcs
}

/// Arc radius for link `index` of `count` parallel links spanning `distance`.
///
/// Parallel links spread symmetrically around `0.6 * distance` in steps of
/// `0.4 * distance`.
pub fn curvature_radius(distance: f64, index: usize, count: usize) -> f64 {
	if count > 1 {
		let offset = (index as f64 - (count as f64 - 1.0) / 2.0) * 0.4;
		distance * (0.6 + offset)
	} else {
		distance * 0.8
	}
}
