use std::collections::HashMap;

use log::warn;

use super::document::{GraphDocument, Link, Node};

/// A link whose endpoints both resolved to node positions.
#[derive(Clone, Copy, Debug)]
pub struct ResolvedLink<'a> {
	/// Position of the link in `GraphDocument::links`.
	pub index: usize,
	pub link: &'a Link,
	/// Position of the source node in `GraphDocument::nodes`.
	pub source: usize,
	/// Position of the target node in `GraphDocument::nodes`.
	pub target: usize,
}

/// Id to position lookup built once per document.
pub struct GraphIndex<'a> {
	doc: &'a GraphDocument,
	nodes: HashMap<&'a str, usize>,
	links: HashMap<&'a str, usize>,
}

impl<'a> GraphIndex<'a> {
	pub fn new(doc: &'a GraphDocument) -> Self {
		let mut nodes = HashMap::with_capacity(doc.nodes.len());
		for (i, node) in doc.nodes.iter().enumerate() {
			if nodes.insert(node.id.as_str(), i).is_some() {
				warn!("duplicate node id `{}`, keeping the last occurrence", node.id);
			}
		}
		let links = doc
			.links
			.iter()
			.enumerate()
			.map(|(i, l)| (l.id.as_str(), i))
			.collect();
		Self { doc, nodes, links }
	}

	pub fn document(&self) -> &'a GraphDocument {
		self.doc
	}

	pub fn position(&self, id: &str) -> Option<usize> {
		self.nodes.get(id).copied()
	}

	pub fn node(&self, id: &str) -> Option<&'a Node> {
		self.position(id).map(|i| &self.doc.nodes[i])
	}

	pub fn link_position(&self, id: &str) -> Option<usize> {
		self.links.get(id).copied()
	}

	/// Label for a node id, or the id itself when the node is unknown.
	pub fn label<'s>(&self, id: &'s str) -> &'s str
	where
		'a: 's,
	{
		self.node(id).map(Node::display_label).unwrap_or(id)
	}

	/// Links with both endpoints present, in document order.
	///
	/// Links referencing unknown node ids are dropped with a warning.
	pub fn resolved_links(&self) -> Vec<ResolvedLink<'a>> {
		self.doc
			.links
			.iter()
			.enumerate()
			.filter_map(|(index, link)| {
				match (self.position(&link.source), self.position(&link.target)) {
					(Some(source), Some(target)) => Some(ResolvedLink {
						index,
						link,
						source,
						target,
					}),
					_ => {
						warn!(
							"dropping link `{}`: {} -> {} references an unknown node",
							link.id, link.source, link.target
						);
						None
					}
				}
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_dangling_links_dropped() {
		let doc = GraphDocument::from_json(
			r#"{
				"nodes": [{"id": "a", "label": "A"}, {"id": "b"}],
				"links": [
					{"id": "ok", "source": "a", "target": "b"},
					{"id": "bad", "source": "a", "target": "ghost"}
				]
			}"#,
		)
		.unwrap();
		let index = GraphIndex::new(&doc);

		let resolved = index.resolved_links();
		assert_eq!(resolved.len(), 1);
		assert_eq!(resolved[0].link.id, "ok");
		assert_eq!((resolved[0].source, resolved[0].target), (0, 1));
		assert_eq!(index.label("a"), "A");
		assert_eq!(index.label("ghost"), "ghost");
		assert_eq!(index.link_position("bad"), Some(1));
	}
}
