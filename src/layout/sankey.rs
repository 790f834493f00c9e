//! Horizontal flow layout over an acyclic link subset.
//!
//! The caller must hand in links that form a DAG. [`flow_edges`] gives the
//! usual subset: links leaving one root whose type is known to be acyclic.
//! Column assignment is justified (sinks in the last column); node order
//! inside a column is document order and crossings are not minimized.

use std::collections::HashMap;

use log::error;
use serde::{Deserialize, Serialize};

use super::Point;
use crate::model::{GraphDocument, GraphIndex, LinkType};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SankeyConfig {
	pub width: f64,
	pub height: f64,
	pub node_width: f64,
	pub node_padding: f64,
	pub margin_top: f64,
	pub margin_right: f64,
	pub margin_bottom: f64,
	pub margin_left: f64,
	/// Root node id; links must leave it to count as flow.
	pub root: String,
	/// Link types that are known to be acyclic.
	pub flow_types: Vec<LinkType>,
}

impl Default for SankeyConfig {
	fn default() -> Self {
		Self {
			width: 1200.0,
			height: 700.0,
			node_width: 20.0,
			node_padding: 15.0,
			margin_top: 20.0,
			margin_right: 150.0,
			margin_bottom: 20.0,
			margin_left: 150.0,
			root: "energy".to_string(),
			flow_types: vec![LinkType::Synergy, LinkType::Cascade],
		}
	}
}

/// Positions of links leaving `root` whose type is in `types`.
pub fn flow_edges(doc: &GraphDocument, root: &str, types: &[LinkType]) -> Vec<usize> {
	doc.links
		.iter()
		.enumerate()
		.filter(|(_, l)| l.source == root && types.contains(&l.link_type))
		.map(|(i, _)| i)
		.collect()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SankeyNode {
	/// Position in `GraphDocument::nodes`.
	pub node: usize,
	pub column: usize,
	pub value: f64,
	pub x0: f64,
	pub x1: f64,
	pub y0: f64,
	pub y1: f64,
}

impl SankeyNode {
	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.x0 && p.x <= self.x1 && p.y >= self.y0 && p.y <= self.y1
	}
}

/// A flow band. `y0` is the band's center on the source side, `y1` on the
/// target side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SankeyLink {
	/// Position in `GraphDocument::links`.
	pub link: usize,
	/// Index into `SankeyLayout::nodes`.
	pub source: usize,
	pub target: usize,
	pub value: f64,
	pub width: f64,
	pub x0: f64,
	pub x1: f64,
	pub y0: f64,
	pub y1: f64,
}

impl SankeyLink {
	/// Control points of the horizontal cubic band center line.
	pub fn curve(&self) -> [Point; 4] {
		let mid = (self.x0 + self.x1) / 2.0;
		[
			Point::new(self.x0, self.y0),
			Point::new(mid, self.y0),
			Point::new(mid, self.y1),
			Point::new(self.x1, self.y1),
		]
	}

	pub fn point_at(&self, t: f64) -> Point {
		let [p0, p1, p2, p3] = self.curve();
		let u = 1.0 - t;
		let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
		Point::new(
			a * p0.x + b * p1.x + c * p2.x + d * p3.x,
			a * p0.y + b * p1.y + c * p2.y + d * p3.y,
		)
	}

	/// Whether `p` falls inside the band, sampled along the curve.
	pub fn contains(&self, p: Point) -> bool {
		if p.x < self.x0.min(self.x1) || p.x > self.x0.max(self.x1) {
			return false;
		}
		let half = (self.width / 2.0).max(2.0);
		(0..=32).any(|i| {
			let c = self.point_at(i as f64 / 32.0);
			(c.x - p.x).abs() <= 4.0 && (c.y - p.y).abs() <= half
		})
	}
}

#[derive(Clone, Debug, Default)]
pub struct SankeyLayout {
	pub nodes: Vec<SankeyNode>,
	pub links: Vec<SankeyLink>,
	pub columns: usize,
}

impl SankeyLayout {
	/// Lays out the links at `link_positions`. Only nodes touched by one of
	/// them take part; links with unknown endpoints are dropped.
	pub fn new(doc: &GraphDocument, link_positions: &[usize], config: &SankeyConfig) -> Self {
		let index = GraphIndex::new(doc);
		let mut layout = SankeyLayout::default();
		let mut slot: HashMap<usize, usize> = HashMap::new();

		for resolved in index.resolved_links() {
			if !link_positions.contains(&resolved.index) {
				continue;
			}
			let mut node_slot = |doc_node: usize, nodes: &mut Vec<SankeyNode>| {
				*slot.entry(doc_node).or_insert_with(|| {
					nodes.push(SankeyNode {
						node: doc_node,
						column: 0,
						value: 0.0,
						x0: 0.0,
						x1: 0.0,
						y0: 0.0,
						y1: 0.0,
					});
					nodes.len() - 1
				})
			};
			let source = node_slot(resolved.source, &mut layout.nodes);
			let target = node_slot(resolved.target, &mut layout.nodes);
			layout.links.push(SankeyLink {
				link: resolved.index,
				source,
				target,
				value: resolved.link.value.max(0.0),
				width: 0.0,
				x0: 0.0,
				x1: 0.0,
				y0: 0.0,
				y1: 0.0,
			});
		}
		if layout.nodes.is_empty() {
			return layout;
		}

		layout.compute_values();
		layout.compute_columns();
		layout.compute_breadths(config);
		layout.compute_link_breadths();
		layout
	}

	/// Convenience: lays out [`flow_edges`] for the configured root and types.
	pub fn for_root(doc: &GraphDocument, config: &SankeyConfig) -> Self {
		let links = flow_edges(doc, &config.root, &config.flow_types);
		Self::new(doc, &links, config)
	}

	pub fn is_empty(&self) -> bool {
		self.links.is_empty()
	}

	pub fn node_at(&self, p: Point) -> Option<usize> {
		self.nodes.iter().find(|n| n.contains(p)).map(|n| n.node)
	}

	pub fn link_at(&self, p: Point) -> Option<usize> {
		self.links.iter().rev().find(|l| l.contains(p)).map(|l| l.link)
	}

	fn compute_values(&mut self) {
		let mut incoming = vec![0.0; self.nodes.len()];
		let mut outgoing = vec![0.0; self.nodes.len()];
		for link in &self.links {
			outgoing[link.source] += link.value;
			incoming[link.target] += link.value;
		}
		for (i, node) in self.nodes.iter_mut().enumerate() {
			node.value = f64::max(incoming[i], outgoing[i]);
		}
	}

	/// Depth by breadth-first relaxation, then sinks justified right.
	fn compute_columns(&mut self) {
		let n = self.nodes.len();
		let mut depth = vec![0usize; n];
		let mut current: Vec<usize> = (0..n).collect();
		let mut x = 0;
		while !current.is_empty() {
			if x > n {
				error!("sankey input contains a cycle; column assignment stopped");
				break;
			}
			let mut next = Vec::new();
			for &i in &current {
				depth[i] = x;
				for link in self.links.iter().filter(|l| l.source == i) {
					if !next.contains(&link.target) {
						next.push(link.target);
					}
				}
			}
			current = next;
			x += 1;
		}
		let columns = depth.iter().max().map_or(1, |d| d + 1);
		for (i, node) in self.nodes.iter_mut().enumerate() {
			let has_out = self.links.iter().any(|l| l.source == i);
			node.column = if has_out { depth[i] } else { columns - 1 };
		}
		self.columns = columns;
	}

	fn compute_breadths(&mut self, config: &SankeyConfig) {
		let (x0, x1) = (config.margin_left, config.width - config.margin_right);
		let (y0, y1) = (config.margin_top, config.height - config.margin_bottom);
		let py = config.node_padding;
		let kx = if self.columns > 1 {
			(x1 - x0 - config.node_width) / (self.columns - 1) as f64
		} else {
			0.0
		};

		let columns: Vec<Vec<usize>> = (0..self.columns)
			.map(|c| (0..self.nodes.len()).filter(|&i| self.nodes[i].column == c).collect())
			.collect();
		let ky = columns
			.iter()
			.filter(|c| !c.is_empty())
			.map(|c| {
				let total: f64 = c.iter().map(|&i| self.nodes[i].value).sum();
				let room = y1 - y0 - (c.len() as f64 - 1.0) * py;
				if total > 0.0 { room / total } else { f64::INFINITY }
			})
			.fold(f64::INFINITY, f64::min);
		let ky = if ky.is_finite() { ky } else { 0.0 };

		for column in &columns {
			let mut y = y0;
			for &i in column {
				let node = &mut self.nodes[i];
				node.x0 = x0 + node.column as f64 * kx;
				node.x1 = node.x0 + config.node_width;
				node.y0 = y;
				node.y1 = y + node.value * ky;
				y = node.y1 + py;
			}
			// Spread the leftover height evenly between nodes.
			let gap = (y1 - y + py) / (column.len() as f64 + 1.0);
			for (k, &i) in column.iter().enumerate() {
				let node = &mut self.nodes[i];
				node.y0 += gap * (k as f64 + 1.0);
				node.y1 += gap * (k as f64 + 1.0);
			}
		}
		for link in &mut self.links {
			link.width = link.value * ky;
		}
	}

	/// Stacks bands on each node side, ordered by the other end's position.
	fn compute_link_breadths(&mut self) {
		for i in 0..self.nodes.len() {
			let mut outgoing: Vec<usize> =
				(0..self.links.len()).filter(|&l| self.links[l].source == i).collect();
			outgoing.sort_by(|&a, &b| {
				let (ta, tb) = (self.links[a].target, self.links[b].target);
				self.nodes[ta].y0.total_cmp(&self.nodes[tb].y0)
			});
			let mut y = self.nodes[i].y0;
			for l in outgoing {
				let link = &mut self.links[l];
				link.x0 = self.nodes[i].x1;
				link.y0 = y + link.width / 2.0;
				y += link.width;
			}

			let mut incoming: Vec<usize> =
				(0..self.links.len()).filter(|&l| self.links[l].target == i).collect();
			incoming.sort_by(|&a, &b| {
				let (sa, sb) = (self.links[a].source, self.links[b].source);
				self.nodes[sa].y0.total_cmp(&self.nodes[sb].y0)
			});
			let mut y = self.nodes[i].y0;
			for l in incoming {
				let link = &mut self.links[l];
				link.x1 = self.nodes[i].x0;
				link.y1 = y + link.width / 2.0;
				y += link.width;
			}
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
					{"id": "energy"}, {"id": "water"}, {"id": "agri"},
					{"id": "health"}, {"id": "lonely"}
				],
				"links": [
					{"source": "energy", "target": "water", "type": "synergy", "value": 30},
					{"source": "energy", "target": "agri", "type": "cascade", "value": 10},
					{"source": "energy", "target": "health", "type": "conflict", "value": 50},
					{"source": "water", "target": "agri", "type": "synergy", "value": 5}
				]
			}"#,
		)
		.unwrap()
	}

	#[test]
	fn test_flow_edges_filter_root_and_type() {
		let d = doc();
		let edges = flow_edges(&d, "energy", &[LinkType::Synergy, LinkType::Cascade]);
		assert_eq!(edges, vec![0, 1]);
	}

	#[test]
	fn test_only_linked_nodes_laid_out() {
		let d = doc();
		let layout = SankeyLayout::for_root(&d, &SankeyConfig::default());
		let placed: Vec<usize> = layout.nodes.iter().map(|n| n.node).collect();
		assert_eq!(placed, vec![0, 1, 2]);
		assert_eq!(layout.columns, 2);
		assert_eq!(layout.nodes[0].value, 40.0);
		assert_eq!(layout.nodes[0].x0, 150.0);
		assert_eq!(layout.nodes[1].x1, 1200.0 - 150.0);
	}

	#[test]
	fn test_band_widths_proportional_to_value() {
		let d = doc();
		let layout = SankeyLayout::for_root(&d, &SankeyConfig::default());
		let (a, b) = (layout.links[0], layout.links[1]);
		assert!((a.width / b.width - 3.0).abs() < 1e-9);
		// Source side bands stack inside the root node.
		let root = layout.nodes[0];
		assert!((root.y1 - root.y0 - (a.width + b.width)).abs() < 1e-9);
		assert!(a.y0 < b.y0);
	}

	#[test]
	fn test_sinks_justified_to_last_column() {
		let d = doc();
		let config = SankeyConfig::default();
		let layout = SankeyLayout::new(&d, &[0, 1, 3], &config);
		assert_eq!(layout.columns, 3);
		let column = |doc_node: usize| {
			layout.nodes.iter().find(|n| n.node == doc_node).unwrap().column
		};
		assert_eq!(column(0), 0);
		assert_eq!(column(1), 1);
		assert_eq!(column(2), 2);
	}

	#[test]
	fn test_empty_selection() {
		let d = doc();
		let layout = SankeyLayout::new(&d, &[], &SankeyConfig::default());
		assert!(layout.is_empty());
		assert!(layout.nodes.is_empty());
	}

	#[test]
	fn test_hit_testing() {
		let d = doc();
		let layout = SankeyLayout::for_root(&d, &SankeyConfig::default());
		let root = layout.nodes[0];
		let inside = Point::new((root.x0 + root.x1) / 2.0, (root.y0 + root.y1) / 2.0);
		assert_eq!(layout.node_at(inside), Some(0));
		let band = layout.links[0];
		assert_eq!(layout.link_at(band.point_at(0.5)), Some(band.link));
	}
}
