//! Visibility of nodes and links under a scenario and type/layer selection.

use std::collections::{BTreeSet, HashSet};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::model::{GraphDocument, GraphIndex, Layer, Link, LinkType, Node};

/// Narrows the visible link set without touching the document.
///
/// A link is visible when it is in the active scenario, its type is
/// selected, and both endpoints are visible. Empty type and layer sets mean
/// no restriction. `aggregate` links are never filtered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioFilter {
	/// Scenario name; `None` shows every link.
	pub scenario: Option<String>,
	pub types: BTreeSet<LinkType>,
	/// Layers whose nodes stay visible. Nodes without a layer always do.
	pub layers: BTreeSet<Layer>,
	pub show_indirect: bool,
}

impl Default for ScenarioFilter {
	fn default() -> Self {
		Self {
			scenario: None,
			types: BTreeSet::new(),
			layers: BTreeSet::new(),
			show_indirect: true,
		}
	}
}

/// Per-position visibility flags for one document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Visibility {
	pub nodes: Vec<bool>,
	pub links: Vec<bool>,
}

impl Visibility {
	/// Everything visible.
	pub fn all(doc: &GraphDocument) -> Self {
		Self {
			nodes: vec![true; doc.nodes.len()],
			links: vec![true; doc.links.len()],
		}
	}

	pub fn node(&self, i: usize) -> bool {
		self.nodes.get(i).copied().unwrap_or(false)
	}

	pub fn link(&self, i: usize) -> bool {
		self.links.get(i).copied().unwrap_or(false)
	}

	pub fn visible_link_count(&self) -> usize {
		self.links.iter().filter(|v| **v).count()
	}
}

impl ScenarioFilter {
	/// Selects a single link type, or all types with `None`.
	pub fn select_type(&mut self, link_type: Option<LinkType>) {
		self.types = link_type.into_iter().collect();
	}

	/// Selects a single layer, or all layers with `None`.
	pub fn select_layer(&mut self, layer: Option<Layer>) {
		self.layers = layer.into_iter().collect();
	}

	pub fn node_visible(&self, node: &Node) -> bool {
		match node.layer {
			None => true,
			Some(layer) => self.layers.is_empty() || self.layers.contains(&layer),
		}
	}

	fn link_passes(&self, link: &Link, active: Option<&HashSet<&str>>) -> bool {
		if link.link_type == LinkType::Aggregate {
			return true;
		}
		if !self.show_indirect && link.link_type == LinkType::Indirect {
			return false;
		}
		if active.is_some_and(|set| !set.contains(link.id.as_str())) {
			return false;
		}
		self.types.is_empty() || self.types.contains(&link.link_type)
	}

	fn active_edges<'d>(&self, doc: &'d GraphDocument) -> Option<HashSet<&'d str>> {
		let name = self.scenario.as_deref()?;
		match doc.scenarios.get(name) {
			Some(s) => Some(s.active_edges.iter().map(String::as_str).collect()),
			None => {
				if !doc.scenarios.is_empty() {
					warn!("scenario `{name}` not in document; showing every link");
				}
				None
			}
		}
	}

	/// Computes visibility for every node and link of `doc`. Links with an
	/// unknown endpoint are hidden.
	pub fn apply(&self, doc: &GraphDocument) -> Visibility {
		let index = GraphIndex::new(doc);
		let active = self.active_edges(doc);
		let nodes: Vec<bool> = doc.nodes.iter().map(|n| self.node_visible(n)).collect();
		let mut links = vec![false; doc.links.len()];
		for l in index.resolved_links() {
			let aggregate = l.link.link_type == LinkType::Aggregate;
			let endpoints = aggregate || (nodes[l.source] && nodes[l.target]);
			links[l.index] = endpoints && self.link_passes(l.link, active.as_ref());
		}
		Visibility { nodes, links }
	}
}
