//! Chord layout over an [`AdjacencyMatrix`].
//!
//! Angles are measured clockwise from 12 o'clock. Each node owns an outer
//! arc proportional to its row sum; each unordered pair with a non-zero
//! cell in either direction becomes one ribbon whose ends are sub-arcs of
//! the two groups.

use std::collections::BTreeMap;
use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use super::Point;
use super::matrix::AdjacencyMatrix;
use crate::model::GraphDocument;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChordConfig {
	pub width: f64,
	pub height: f64,
	/// Inner radius as a fraction of `min(width, height)`.
	pub inner_radius_ratio: f64,
	pub ring_thickness: f64,
	pub pad_angle: f64,
}

impl Default for ChordConfig {
	fn default() -> Self {
		Self {
			width: 800.0,
			height: 800.0,
			inner_radius_ratio: 0.35,
			ring_thickness: 20.0,
			pad_angle: 0.05,
		}
	}
}

/// Outer arc of one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChordGroup {
	pub index: usize,
	pub start_angle: f64,
	pub end_angle: f64,
	pub value: f64,
}

impl ChordGroup {
	pub fn mid_angle(&self) -> f64 {
		(self.start_angle + self.end_angle) / 2.0
	}
}

/// One end of a ribbon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChordEnd {
	pub index: usize,
	pub start_angle: f64,
	pub end_angle: f64,
	pub value: f64,
}

/// Ribbon between two groups. `source` is the end with the larger value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Chord {
	pub source: ChordEnd,
	pub target: ChordEnd,
}

#[derive(Clone, Debug)]
pub struct ChordLayout {
	pub matrix: AdjacencyMatrix,
	pub groups: Vec<ChordGroup>,
	pub chords: Vec<Chord>,
	pub center: Point,
	pub inner_radius: f64,
	pub outer_radius: f64,
}

impl ChordLayout {
	pub fn new(doc: &GraphDocument, config: &ChordConfig) -> Self {
		let matrix = AdjacencyMatrix::build(doc);
		let (groups, chords) = compute(&matrix, config.pad_angle);
		let inner_radius = config.width.min(config.height) * config.inner_radius_ratio;
		Self {
			matrix,
			groups,
			chords,
			center: Point::new(config.width / 2.0, config.height / 2.0),
			inner_radius,
			outer_radius: inner_radius + config.ring_thickness,
		}
	}

	/// Link that supplies the colour and tooltip of a ribbon: the link
	/// behind the larger end's cell.
	pub fn ribbon_link(&self, chord: &Chord) -> Option<usize> {
		self.matrix
			.owner(chord.source.index, chord.target.index)
			.or_else(|| self.matrix.owner(chord.target.index, chord.source.index))
	}

	/// Group whose outer ring contains `p`.
	pub fn group_at(&self, p: Point) -> Option<usize> {
		let r = p.distance(self.center);
		if r < self.inner_radius || r > self.outer_radius {
			return None;
		}
		let angle = self.angle_of(p);
		self.groups
			.iter()
			.find(|g| angle >= g.start_angle && angle < g.end_angle)
			.map(|g| g.index)
	}

	/// Ribbon with an end under `p`, testing just inside the inner radius.
	pub fn chord_at(&self, p: Point) -> Option<usize> {
		let r = p.distance(self.center);
		if r > self.inner_radius || r < self.inner_radius * 0.8 {
			return None;
		}
		let angle = self.angle_of(p);
		let inside = |end: &ChordEnd| angle >= end.start_angle && angle < end.end_angle;
		self.chords
			.iter()
			.position(|c| inside(&c.source) || inside(&c.target))
	}

	/// Clockwise-from-top angle of `p` around the center, in `[0, 2π)`.
	pub fn angle_of(&self, p: Point) -> f64 {
		let a = (p.y - self.center.y).atan2(p.x - self.center.x) + PI / 2.0;
		a.rem_euclid(TAU)
	}

	/// Point at clockwise-from-top `angle` on a circle of `radius`.
	pub fn point_at(&self, angle: f64, radius: f64) -> Point {
		let a = angle - PI / 2.0;
		Point::new(self.center.x + radius * a.cos(), self.center.y + radius * a.sin())
	}
}

/// Undirected chord computation with subgroups sorted by descending value.
fn compute(matrix: &AdjacencyMatrix, pad_angle: f64) -> (Vec<ChordGroup>, Vec<Chord>) {
	let n = matrix.len();
	let sums: Vec<f64> = (0..n).map(|i| matrix.row_sum(i)).collect();
	let total: f64 = sums.iter().sum();
	let k = if total > 0.0 {
		(TAU - pad_angle * n as f64).max(0.0) / total
	} else {
		0.0
	};
	let dx = if k > 0.0 { pad_angle } else { TAU / n.max(1) as f64 };

	let mut groups = Vec::with_capacity(n);
	// Keyed by (min, max) pair; filled from both sides.
	let mut halves: BTreeMap<(usize, usize), (Option<ChordEnd>, Option<ChordEnd>)> =
		BTreeMap::new();
	let mut x = 0.0;

	for i in 0..n {
		let x0 = x;
		let mut subgroups: Vec<usize> = (0..n)
			.filter(|&j| matrix.cell(i, j) != 0.0 || matrix.cell(j, i) != 0.0)
			.collect();
		subgroups.sort_by(|&a, &b| matrix.cell(i, b).total_cmp(&matrix.cell(i, a)));

		for j in subgroups {
			let value = matrix.cell(i, j);
			let end = ChordEnd {
				index: i,
				start_angle: x,
				end_angle: x + value * k,
				value,
			};
			x = end.end_angle;
			let entry = halves.entry((i.min(j), i.max(j))).or_default();
			if i < j {
				entry.0 = Some(end);
			} else {
				entry.1 = Some(end);
				if i == j {
					entry.0 = Some(end);
				}
			}
		}
		groups.push(ChordGroup {
			index: i,
			start_angle: x0,
			end_angle: x,
			value: sums[i],
		});
		x += dx;
	}

	let chords = halves
		.into_values()
		.filter_map(|pair| match pair {
			(Some(a), Some(b)) => Some(if a.value < b.value {
				Chord { source: b, target: a }
			} else {
				Chord { source: a, target: b }
			}),
			_ => None,
		})
		.collect();
	(groups, chords)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn layout() -> ChordLayout {
		let doc = GraphDocument::from_json(
			r#"{
				"nodes": [{"id": "a"}, {"id": "b"}, {"id": "c"}],
				"links": [
					{"source": "a", "target": "b", "value": 30},
					{"source": "b", "target": "a", "value": 10},
					{"source": "a", "target": "c", "value": 20}
				]
			}"#,
		)
		.unwrap();
		ChordLayout::new(&doc, &ChordConfig::default())
	}

	#[test]
	fn test_group_spans_proportional_to_row_sum() {
		let l = layout();
		let span = |g: &ChordGroup| g.end_angle - g.start_angle;
		assert_eq!(l.groups.len(), 3);
		assert!((span(&l.groups[0]) / span(&l.groups[1]) - 5.0).abs() < 1e-9);
		assert_eq!(span(&l.groups[2]), 0.0);
		let covered: f64 = l.groups.iter().map(span).sum();
		assert!((covered + 3.0 * 0.05 - TAU).abs() < 1e-9);
	}

	#[test]
	fn test_one_ribbon_per_pair_larger_end_is_source() {
		let l = layout();
		assert_eq!(l.chords.len(), 2);
		let ab = l
			.chords
			.iter()
			.find(|c| c.source.index + c.target.index == 1)
			.unwrap();
		assert_eq!(ab.source.index, 0);
		assert_eq!(ab.source.value, 30.0);
		assert_eq!(ab.target.value, 10.0);
		assert_eq!(l.ribbon_link(ab), Some(0));
	}

	#[test]
	fn test_subgroups_sorted_descending() {
		let l = layout();
		let a_ends: Vec<ChordEnd> = l
			.chords
			.iter()
			.flat_map(|c| [c.source, c.target])
			.filter(|e| e.index == 0)
			.collect();
		let first = a_ends.iter().min_by(|x, y| x.start_angle.total_cmp(&y.start_angle)).unwrap();
		assert_eq!(first.value, 30.0);
	}

	#[test]
	fn test_group_hit_testing() {
		let l = layout();
		let g = l.groups[0];
		let p = l.point_at(g.mid_angle(), l.inner_radius + 10.0);
		assert_eq!(l.group_at(p), Some(0));
		assert_eq!(l.group_at(l.center), None);
	}
}
