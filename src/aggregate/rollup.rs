use std::collections::{HashMap, HashSet};

use crate::model::{GraphDocument, GraphIndex, Layer, Link, LinkType, Node};

/// Id prefix of Level-1 sector nodes.
pub const SECTOR_PREFIX: &str = "sector-";

/// Level-1 node id for a sector name.
pub fn sector_node_id(sector: &str) -> String {
	format!("{SECTOR_PREFIX}{sector}")
}

/// Sector name behind a Level-1 node id.
pub fn sector_of_node_id(id: &str) -> &str {
	id.strip_prefix(SECTOR_PREFIX).unwrap_or(id)
}

/// Builds the Level-1 sector graph.
///
/// Nodes are the document's `level == 1` nodes, labelled with the number of
/// links touching any of their focus areas. Each pair of sectors gets one
/// `aggregate` link whose value counts the underlying links in either
/// direction; the first direction seen wins. Links inside one sector are
/// left out.
pub fn sector_rollup(doc: &GraphDocument) -> GraphDocument {
	let index = GraphIndex::new(doc);

	let nodes = doc
		.nodes
		.iter()
		.filter(|n| n.level == 1)
		.map(|node| {
			let name = sector_of_node_id(&node.id);
			let focus: HashSet<&str> = doc
				.nodes
				.iter()
				.filter(|n| n.level == 2 && n.sector.as_deref() == Some(name))
				.map(|n| n.id.as_str())
				.collect();
			let count = doc
				.links
				.iter()
				.filter(|l| focus.contains(l.source.as_str()) || focus.contains(l.target.as_str()))
				.count();
			Node {
				label: format!("{}\n({count} links)", node.display_label()),
				sector: Some(name.to_string()),
				..node.clone()
			}
		})
		.collect();

	let mut pairs: Vec<(String, String, usize)> = Vec::new();
	let mut slots: HashMap<(String, String), usize> = HashMap::new();
	for resolved in index.resolved_links() {
		let (Some(from), Some(to)) = (
			doc.nodes[resolved.source].sector.as_deref(),
			doc.nodes[resolved.target].sector.as_deref(),
		) else {
			continue;
		};
		if from == to {
			continue;
		}
		let (from, to) = (sector_node_id(from), sector_node_id(to));
		let reverse = (to.clone(), from.clone());
		if let Some(&slot) = slots.get(&reverse) {
			pairs[slot].2 += 1;
		} else {
			let slot = *slots.entry((from.clone(), to.clone())).or_insert_with(|| {
				pairs.push((from, to, 0));
				pairs.len() - 1
			});
			pairs[slot].2 += 1;
		}
	}

	let links = pairs
		.into_iter()
		.enumerate()
		.map(|(i, (source, target, count))| Link {
			id: format!("sector-edge-{i}"),
			source,
			target,
			link_type: LinkType::Aggregate,
			layer: Layer::Shared,
			value: count as f64,
			quantification: String::new(),
			citation: String::new(),
			description: format!("{count} cross-sector links"),
			strength: None,
			scenario: None,
		})
		.collect();

	doc.with_elements(nodes, links)
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
					{"id": "sector-health", "label": "Health", "level": 1},
					{"id": "solar-pumps", "sector": "energy", "level": 2, "layer": "technical"},
					{"id": "grid", "sector": "energy", "level": 2, "layer": "governance"},
					{"id": "drip", "sector": "water", "level": 2, "layer": "community"},
					{"id": "heat-plans", "sector": "health", "level": 2}
				],
				"edges": [
					{"id": "e1", "source": "solar-pumps", "target": "drip", "type": "synergy"},
					{"id": "e2", "source": "drip", "target": "grid", "type": "conflict"},
					{"id": "e3", "source": "solar-pumps", "target": "grid", "type": "cascade"},
					{"id": "e4", "source": "heat-plans", "target": "drip", "type": "conditional"},
					{"id": "e5", "source": "grid", "target": "ghost", "type": "synergy"}
				]
			}"#,
		)
		.unwrap()
	}

	#[test]
	fn test_reverse_links_merge_into_first_direction() {
		let rolled = sector_rollup(&doc());
		assert_eq!(rolled.links.len(), 2);
		let first = &rolled.links[0];
		assert_eq!(first.id, "sector-edge-0");
		assert_eq!((first.source.as_str(), first.target.as_str()), ("sector-energy", "sector-water"));
		assert_eq!(first.value, 2.0);
		assert_eq!(first.link_type, LinkType::Aggregate);
		let second = &rolled.links[1];
		assert_eq!((second.source.as_str(), second.target.as_str()), ("sector-health", "sector-water"));
		assert_eq!(second.value, 1.0);
	}

	#[test]
	fn test_same_sector_links_excluded() {
		let rolled = sector_rollup(&doc());
		assert!(rolled.links.iter().all(|l| l.source != l.target));
	}

	#[test]
	fn test_sector_labels_carry_connection_count() {
		let rolled = sector_rollup(&doc());
		assert_eq!(rolled.nodes.len(), 3);
		assert_eq!(rolled.nodes[0].label, "Energy\n(4 links)");
		assert_eq!(rolled.nodes[1].label, "Water\n(3 links)");
		assert_eq!(rolled.nodes[2].sector.as_deref(), Some("health"));
	}

	#[test]
	fn test_sector_ids() {
		assert_eq!(sector_node_id("energy"), "sector-energy");
		assert_eq!(sector_of_node_id("sector-energy"), "energy");
		assert_eq!(sector_of_node_id("energy"), "energy");
	}
}
