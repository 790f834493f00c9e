use std::collections::HashSet;

use crate::model::{GraphDocument, GraphIndex, LinkType, TourStep};

/// How an element is drawn relative to the current focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emphasis {
	Normal,
	Highlighted,
	Dimmed,
}

/// Nodes and links singled out by a hover or tour step, as document
/// positions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighlightSet {
	pub nodes: HashSet<usize>,
	pub links: HashSet<usize>,
}

impl HighlightSet {
	/// A node, every link touching it and the nodes at their other ends.
	pub fn for_node(doc: &GraphDocument, node: usize) -> Self {
		let index = GraphIndex::new(doc);
		let mut set = HighlightSet::default();
		set.nodes.insert(node);
		for l in index.resolved_links() {
			if l.source == node || l.target == node {
				set.links.insert(l.index);
				set.nodes.insert(l.source);
				set.nodes.insert(l.target);
			}
		}
		set
	}

	/// Every link of `link_type` and their endpoints.
	pub fn for_link_type(doc: &GraphDocument, link_type: LinkType) -> Self {
		let index = GraphIndex::new(doc);
		let mut set = HighlightSet::default();
		for l in index.resolved_links() {
			if l.link.link_type == link_type {
				set.links.insert(l.index);
				set.nodes.insert(l.source);
				set.nodes.insert(l.target);
			}
		}
		set
	}

	/// Focus nodes and highlighted links of a tour step. Unknown ids are
	/// skipped.
	pub fn for_tour_step(doc: &GraphDocument, step: &TourStep) -> Self {
		let index = GraphIndex::new(doc);
		HighlightSet {
			nodes: step.focus_nodes.iter().filter_map(|id| index.position(id)).collect(),
			links: step
				.highlight_edges
				.iter()
				.filter_map(|id| index.link_position(id))
				.collect(),
		}
	}
}

/// Current highlight with an eased fade in and out.
///
/// `t` runs from 0 (nothing dimmed) to 1 (fully dimmed). Hover focus fades
/// in after a short delay; clearing it fades out while the previous set
/// keeps being drawn. Pinned focus (tour steps) applies at full strength
/// and ignores hover changes until unpinned.
#[derive(Clone, Debug, Default)]
pub struct Highlight {
	current: Option<HighlightSet>,
	previous: Option<HighlightSet>,
	pub t: f64,
	delay_t: f64,
	pinned: bool,
}

impl Highlight {
	pub fn is_pinned(&self) -> bool {
		self.pinned
	}

	pub fn is_active(&self) -> bool {
		self.current.is_some() || self.previous.is_some()
	}

	/// Sets the hover focus. Ignored while pinned.
	pub fn hover(&mut self, focus: Option<HighlightSet>) {
		if self.pinned || self.current == focus {
			return;
		}
		let was_hovering = self.current.is_some();
		if was_hovering && focus.is_none() {
			self.previous = self.current.take();
		} else {
			self.previous = None;
		}
		if focus.is_some() && !was_hovering {
			self.delay_t = 0.0;
		}
		self.current = focus;
	}

	/// Pins a tour step's focus at full strength.
	pub fn pin(&mut self, focus: HighlightSet) {
		self.current = Some(focus);
		self.previous = None;
		self.pinned = true;
		self.t = 1.0;
	}

	/// Drops every highlight immediately.
	pub fn clear(&mut self) {
		*self = Highlight::default();
	}

	fn shown(&self) -> Option<&HighlightSet> {
		self.current.as_ref().or(self.previous.as_ref())
	}

	pub fn node(&self, node: usize) -> Emphasis {
		match self.shown() {
			None => Emphasis::Normal,
			Some(set) if set.nodes.contains(&node) => Emphasis::Highlighted,
			Some(_) => Emphasis::Dimmed,
		}
	}

	pub fn link(&self, link: usize) -> Emphasis {
		match self.shown() {
			None => Emphasis::Normal,
			Some(set) if set.links.contains(&link) => Emphasis::Highlighted,
			Some(_) => Emphasis::Dimmed,
		}
	}

	/// Opacity for an element with `emphasis`.
	pub fn alpha(&self, emphasis: Emphasis) -> f64 {
		match emphasis {
			Emphasis::Dimmed => 1.0 - 0.8 * self.t,
			Emphasis::Normal | Emphasis::Highlighted => 1.0,
		}
	}

	/// Advances the fade by `dt` seconds.
	pub fn tick(&mut self, dt: f64) {
		if self.pinned {
			return;
		}
		if self.current.is_some() {
			let delay = 0.08;
			self.delay_t = (self.delay_t + dt).min(delay);
			if self.delay_t >= delay {
				self.t += (1.0 - self.t) * (1.8 * dt).min(1.0);
			}
		} else {
			self.t -= self.t * (1.26 * dt).min(1.0);
			if self.t < 0.01 {
				self.t = 0.0;
				self.previous = None;
			}
		}
	}
}
