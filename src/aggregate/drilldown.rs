use std::collections::HashSet;

use log::{debug, info};

use super::rollup::{sector_of_node_id, sector_rollup};
use crate::model::{GraphDocument, GraphIndex};

/// Level-2 subgraph for one sector.
///
/// Contains the sector's focus areas, every other focus area linked to one
/// of them, and all links among that combined set. `sector` may be the
/// sector name or its Level-1 node id.
pub fn focus_subgraph(doc: &GraphDocument, sector: &str) -> GraphDocument {
	let sector = sector_of_node_id(sector);
	let index = GraphIndex::new(doc);
	let links = index.resolved_links();

	let focus: HashSet<usize> = doc
		.nodes
		.iter()
		.enumerate()
		.filter(|(_, n)| n.level == 2 && n.sector.as_deref() == Some(sector))
		.map(|(i, _)| i)
		.collect();
	let mut members = focus.clone();
	for l in &links {
		if focus.contains(&l.source) || focus.contains(&l.target) {
			members.insert(l.source);
			members.insert(l.target);
		}
	}
	members.retain(|&i| doc.nodes[i].level == 2);

	let nodes = doc
		.nodes
		.iter()
		.enumerate()
		.filter(|(i, _)| members.contains(i))
		.map(|(_, n)| n.clone())
		.collect();
	let links = links
		.iter()
		.filter(|l| members.contains(&l.source) && members.contains(&l.target))
		.map(|l| l.link.clone())
		.collect();
	doc.with_elements(nodes, links)
}

/// Drill-down level of the explorer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DrillState {
	/// Sector overview.
	#[default]
	Level1,
	/// Focus areas of one sector.
	Level2 {
		/// Sector name, without the node id prefix.
		sector: String,
	},
}

/// Result of a drill-down request.
#[derive(Clone, Debug, PartialEq)]
pub enum DrillOutcome {
	/// Now in Level 2; carries the freshly built subgraph.
	Entered(GraphDocument),
	/// The sector has no focus areas; state is unchanged.
	NoData,
	/// A tour is playing; state is unchanged.
	Blocked,
	/// Not in Level 1; state is unchanged.
	Ignored,
}

impl DrillState {
	pub fn level(&self) -> u8 {
		match self {
			DrillState::Level1 => 1,
			DrillState::Level2 { .. } => 2,
		}
	}

	pub fn sector(&self) -> Option<&str> {
		match self {
			DrillState::Level1 => None,
			DrillState::Level2 { sector } => Some(sector),
		}
	}

	/// `Level1 -> Level2(sector)`. The subgraph is rebuilt from `doc` on
	/// every entry.
	pub fn drill_down(&mut self, doc: &GraphDocument, sector: &str, tour_active: bool) -> DrillOutcome {
		if tour_active {
			return DrillOutcome::Blocked;
		}
		if *self != DrillState::Level1 {
			return DrillOutcome::Ignored;
		}
		let sector = sector_of_node_id(sector);
		let sub = focus_subgraph(doc, sector);
		if sub.nodes.is_empty() {
			info!("no focus areas found for sector `{sector}`");
			return DrillOutcome::NoData;
		}
		debug!(
			"drilling down to `{sector}`: {} nodes, {} links",
			sub.nodes.len(),
			sub.links.len()
		);
		*self = DrillState::Level2 {
			sector: sector.to_string(),
		};
		DrillOutcome::Entered(sub)
	}

	/// `Level2 -> Level1` on background click. Returns whether it moved.
	pub fn back(&mut self, tour_active: bool) -> bool {
		if tour_active {
			return false;
		}
		self.reset()
	}

	/// Returns to Level 1 unconditionally. Returns whether it moved.
	pub fn reset(&mut self) -> bool {
		let moved = *self != DrillState::Level1;
		*self = DrillState::Level1;
		moved
	}

	/// Graph for the current level, rebuilt from `doc`.
	pub fn view(&self, doc: &GraphDocument) -> GraphDocument {
		match self {
			DrillState::Level1 => sector_rollup(doc),
			DrillState::Level2 { sector } => focus_subgraph(doc, sector),
		}
	}
}

/// One incident link in the node details panel.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeDetail {
	/// Position in the document's links.
	pub link: usize,
	pub outgoing: bool,
	pub other_label: String,
	pub description: String,
	/// Quantification text or `"Not quantified"`.
	pub quantification: String,
}

impl EdgeDetail {
	pub fn arrow(&self) -> &'static str {
		if self.outgoing { "→" } else { "←" }
	}
}

/// Content of the node details panel.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDetails {
	pub id: String,
	pub label: String,
	/// Capitalized layer name or `"N/A"`.
	pub layer: String,
	pub description: String,
	pub current_status: String,
	pub edges: Vec<EdgeDetail>,
}

/// Details for `node_id` over the links for which `visible` holds.
pub fn node_details(
	doc: &GraphDocument,
	node_id: &str,
	visible: impl Fn(usize) -> bool,
) -> Option<NodeDetails> {
	let index = GraphIndex::new(doc);
	let node = index.node(node_id)?;
	let edges = index
		.resolved_links()
		.into_iter()
		.filter(|l| visible(l.index))
		.filter(|l| l.link.source == node.id || l.link.target == node.id)
		.map(|l| {
			let outgoing = l.link.source == node.id;
			let other = if outgoing { l.target } else { l.source };
			let quantification = if l.link.quantification.is_empty() {
				"Not quantified".to_string()
			} else {
				l.link.quantification.clone()
			};
			EdgeDetail {
				link: l.index,
				outgoing,
				other_label: doc.nodes[other].display_label().to_string(),
				description: l.link.description.clone(),
				quantification,
			}
		})
		.collect();
	Some(NodeDetails {
		id: node.id.clone(),
		label: node.display_label().to_string(),
		layer: node.layer.map_or_else(|| "N/A".to_string(), |l| l.to_string()),
		description: node.description.clone(),
		current_status: node.current_status.clone(),
		edges,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn doc() -> GraphDocument {
		GraphDocument::from_json(
			r#"{
				"nodes": [
					{"id": "sector-energy", "label": "Energy", "level": 1},
					{"id": "sector-water", "label": "Water", "level": 1},
					{"id": "sector-transport", "label": "Transport", "level": 1},
					{"id": "solar-pumps", "label": "Solar Pumps", "sector": "energy", "level": 2, "layer": "technical"},
					{"id": "grid", "label": "Grid", "sector": "energy", "level": 2, "currentStatus": "Pilot"},
					{"id": "drip", "label": "Drip", "sector": "water", "level": 2},
					{"id": "canal", "label": "Canal", "sector": "water", "level": 2},
					{"id": "heat-plans", "sector": "health", "level": 2}
				],
				"edges": [
					{"id": "e1", "source": "solar-pumps", "target": "drip", "type": "synergy", "quantification": "30% less water"},
					{"id": "e2", "source": "drip", "target": "grid", "type": "conflict"},
					{"id": "e3", "source": "solar-pumps", "target": "grid", "type": "cascade"},
					{"id": "e4", "source": "heat-plans", "target": "canal", "type": "conditional"},
					{"id": "e5", "source": "drip", "target": "canal", "type": "synergy"},
					{"id": "e6", "source": "sector-energy", "target": "solar-pumps", "type": "shared"}
				]
			}"#,
		)
		.unwrap()
	}

	fn ids(doc: &GraphDocument) -> (Vec<String>, Vec<String>) {
		(
			doc.nodes.iter().map(|n| n.id.clone()).collect(),
			doc.links.iter().map(|l| l.id.clone()).collect(),
		)
	}

	#[test]
	fn test_focus_subgraph_keeps_cross_sector_neighbours() {
		let sub = focus_subgraph(&doc(), "sector-energy");
		let (nodes, links) = ids(&sub);
		assert_eq!(nodes, vec!["solar-pumps", "grid", "drip"]);
		assert_eq!(links, vec!["e1", "e2", "e3"]);
	}

	#[test]
	fn test_empty_sector_reports_no_data() {
		let mut state = DrillState::Level1;
		assert_eq!(state.drill_down(&doc(), "sector-transport", false), DrillOutcome::NoData);
		assert_eq!(state, DrillState::Level1);
	}

	#[test]
	fn test_round_trip_rebuilds_same_subgraph() {
		let d = doc();
		let mut state = DrillState::Level1;
		let DrillOutcome::Entered(first) = state.drill_down(&d, "sector-energy", false) else {
			panic!("expected to enter level 2");
		};
		assert_eq!(state.sector(), Some("energy"));
		assert!(state.back(false));
		assert_eq!(state.level(), 1);
		let DrillOutcome::Entered(second) = state.drill_down(&d, "sector-energy", false) else {
			panic!("expected to enter level 2");
		};
		assert_eq!(ids(&first), ids(&second));
		assert_eq!(ids(&state.view(&d)), ids(&first));
	}

	#[test]
	fn test_transitions_blocked_during_tour() {
		let d = doc();
		let mut state = DrillState::Level1;
		assert_eq!(state.drill_down(&d, "sector-energy", true), DrillOutcome::Blocked);
		assert!(matches!(state.drill_down(&d, "sector-energy", false), DrillOutcome::Entered(_)));
		assert!(!state.back(true));
		assert_eq!(state.level(), 2);
		assert_eq!(state.drill_down(&d, "sector-water", false), DrillOutcome::Ignored);
		assert!(state.reset());
		assert!(!state.reset());
	}

	#[test]
	fn test_node_details_directions() {
		let d = doc();
		let details = node_details(&d, "grid", |_| true).unwrap();
		assert_eq!(details.layer, "N/A");
		assert_eq!(details.current_status, "Pilot");
		assert_eq!(details.edges.len(), 2);
		assert!(details.edges.iter().all(|e| !e.outgoing));
		assert_eq!(details.edges[0].arrow(), "←");
		assert_eq!(details.edges[0].other_label, "Drip");
		assert_eq!(details.edges[0].quantification, "Not quantified");

		let pumps = node_details(&d, "solar-pumps", |i| i != 5).unwrap();
		assert_eq!(pumps.layer, "Technical");
		assert_eq!(pumps.edges.len(), 2);
		assert_eq!(pumps.edges[0].arrow(), "→");
		assert_eq!(pumps.edges[0].quantification, "30% less water");
		assert!(node_details(&d, "ghost", |_| true).is_none());
	}
}
