use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Relationship kind carried by a link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
	/// Mutually reinforcing relationship.
	Synergy,
	/// Barrier or trade-off.
	Conflict,
	/// One change triggers another downstream.
	Cascade,
	/// Effect depends on a parallel intervention.
	Conditional,
	/// Second-order effect, hidden by default in the radial view.
	Indirect,
	/// Shared infrastructure or resource.
	Shared,
	/// Sector-to-sector rollup edge built by the aggregation engine.
	Aggregate,
	/// Any type string this build does not know.
	#[serde(other)]
	Other,
}

impl LinkType {
	/// Types shown in the legend, in legend order.
	pub const LEGEND: [LinkType; 5] = [
		LinkType::Synergy,
		LinkType::Conflict,
		LinkType::Cascade,
		LinkType::Conditional,
		LinkType::Indirect,
	];

	/// Lowercase wire name, also used as the colour-map key.
	pub fn as_str(self) -> &'static str {
		match self {
			LinkType::Synergy => "synergy",
			LinkType::Conflict => "conflict",
			LinkType::Cascade => "cascade",
			LinkType::Conditional => "conditional",
			LinkType::Indirect => "indirect",
			LinkType::Shared => "shared",
			LinkType::Aggregate => "aggregate",
			LinkType::Other => "other",
		}
	}

	/// Parses a wire name, mapping anything unknown to [`LinkType::Other`].
	pub fn parse(s: &str) -> LinkType {
		match s {
			"synergy" => LinkType::Synergy,
			"conflict" => LinkType::Conflict,
			"cascade" => LinkType::Cascade,
			"conditional" => LinkType::Conditional,
			"indirect" => LinkType::Indirect,
			"shared" => LinkType::Shared,
			"aggregate" => LinkType::Aggregate,
			_ => LinkType::Other,
		}
	}
}

impl fmt::Display for LinkType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&capitalize(self.as_str()))
	}
}

/// Cross-cutting classification of nodes and links.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
	/// Policy and institutions.
	Governance,
	/// Households and local actors.
	Community,
	/// Infrastructure and technology.
	Technical,
	/// Depends on another intervention.
	Conditional,
	/// Spans several layers. Only used on links.
	Shared,
	/// Any layer string this build does not know.
	#[serde(other)]
	Other,
}

impl Layer {
	/// Lowercase wire name, also used as the colour-map key.
	pub fn as_str(self) -> &'static str {
		match self {
			Layer::Governance => "governance",
			Layer::Community => "community",
			Layer::Technical => "technical",
			Layer::Conditional => "conditional",
			Layer::Shared => "shared",
			Layer::Other => "other",
		}
	}

	/// Parses a wire name, mapping anything unknown to [`Layer::Other`].
	pub fn parse(s: &str) -> Layer {
		match s {
			"governance" => Layer::Governance,
			"community" => Layer::Community,
			"technical" => Layer::Technical,
			"conditional" => Layer::Conditional,
			"shared" => Layer::Shared,
			_ => Layer::Other,
		}
	}
}

impl fmt::Display for Layer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&capitalize(self.as_str()))
	}
}

/// Whether a relationship is backed by numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
	/// Backed by a measured figure.
	Quantified,
	/// Argued but not measured; drawn dashed.
	Theoretical,
}

/// A sector or focus-area entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
	pub id: String,
	#[serde(default)]
	pub label: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub color: String,
	#[serde(default)]
	pub is_central_node: bool,
	#[serde(default)]
	pub sector: Option<String>,
	/// 1 for sector aggregates, 2 for focus areas.
	#[serde(default = "default_level")]
	pub level: u8,
	#[serde(default)]
	pub layer: Option<Layer>,
	#[serde(default)]
	pub current_status: String,
}

fn default_level() -> u8 {
	2
}

impl Node {
	/// Label to show, falling back to the id when the document left it empty.
	pub fn display_label(&self) -> &str {
		if self.label.is_empty() { &self.id } else { &self.label }
	}
}

/// A directed, typed, weighted relationship.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
	#[serde(default)]
	pub id: String,
	pub source: String,
	pub target: String,
	#[serde(rename = "type", default = "default_link_type")]
	pub link_type: LinkType,
	#[serde(default = "default_link_layer")]
	pub layer: Layer,
	#[serde(default)]
	pub value: f64,
	#[serde(default)]
	pub quantification: String,
	#[serde(default)]
	pub citation: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub strength: Option<Strength>,
	#[serde(default)]
	pub scenario: Option<String>,
}

fn default_link_type() -> LinkType {
	LinkType::Other
}

fn default_link_layer() -> Layer {
	Layer::Shared
}

impl Link {
	/// Whether the link is drawn dashed.
	pub fn is_dashed(&self) -> bool {
		matches!(self.link_type, LinkType::Indirect | LinkType::Shared)
			|| self.strength == Some(Strength::Theoretical)
	}
}

/// A named subset of links considered active.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
	#[serde(default)]
	pub active_edges: Vec<String>,
}

/// One timed step of a guided tour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourStep {
	#[serde(default)]
	pub focus_nodes: Vec<String>,
	#[serde(default)]
	pub highlight_edges: Vec<String>,
	#[serde(default)]
	pub narration: String,
	/// Milliseconds to hold the step.
	#[serde(default)]
	pub duration: Option<u32>,
}

/// Default hold time for a tour step without an explicit duration.
pub const DEFAULT_STEP_DURATION_MS: u32 = 4000;

impl TourStep {
	/// Hold time, defaulting when the document omits it.
	pub fn duration_ms(&self) -> u32 {
		self.duration.unwrap_or(DEFAULT_STEP_DURATION_MS)
	}
}

/// A guided sequence of highlight steps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tour {
	pub id: String,
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub steps: Vec<TourStep>,
}

/// The loaded relationship graph. Immutable once constructed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDocument {
	#[serde(default)]
	pub nodes: Vec<Node>,
	#[serde(default, alias = "edges")]
	pub links: Vec<Link>,
	#[serde(default)]
	pub type_colors: BTreeMap<String, String>,
	#[serde(default)]
	pub layer_colors: BTreeMap<String, String>,
	#[serde(default)]
	pub scenarios: BTreeMap<String, Scenario>,
	#[serde(default)]
	pub tours: Vec<Tour>,
}

const FALLBACK_COLOR: &str = "#6b7280";

impl GraphDocument {
	/// Parses a document and assigns positional ids to links that lack one.
	pub fn from_json(json: &str) -> Result<Self> {
		let doc: GraphDocument = serde_json::from_str(json)?;
		Ok(doc.with_link_ids())
	}

	fn with_link_ids(mut self) -> Self {
		for (i, link) in self.links.iter_mut().enumerate() {
			if link.id.is_empty() {
				link.id = format!("link-{i}");
			}
		}
		self
	}

	/// Colour for a link type, grey when the document has none.
	pub fn type_color(&self, link_type: LinkType) -> &str {
		self.type_colors
			.get(link_type.as_str())
			.map(String::as_str)
			.unwrap_or(FALLBACK_COLOR)
	}

	/// Colour for a layer, grey when the document has none.
	pub fn layer_color(&self, layer: Layer) -> &str {
		self.layer_colors
			.get(layer.as_str())
			.map(String::as_str)
			.unwrap_or(FALLBACK_COLOR)
	}

	/// Looks up a tour by id.
	pub fn tour(&self, id: &str) -> Option<&Tour> {
		self.tours.iter().find(|t| t.id == id)
	}

	/// Copies every field except nodes and links, for derived subgraphs.
	pub fn with_elements(&self, nodes: Vec<Node>, links: Vec<Link>) -> GraphDocument {
		GraphDocument {
			nodes,
			links,
			type_colors: self.type_colors.clone(),
			layer_colors: self.layer_colors.clone(),
			scenarios: self.scenarios.clone(),
			tours: self.tours.clone(),
		}
	}
}

/// Upper-cases the first character.
pub fn capitalize(s: &str) -> String {
	let mut chars = s.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_missing_optional_fields_default() {
		let doc = GraphDocument::from_json(
			r#"{
				"nodes": [{"id": "energy", "label": "Energy"}, {"id": "water"}],
				"links": [{"source": "energy", "target": "water", "type": "synergy", "layer": "governance"}]
			}"#,
		)
		.unwrap();

		assert_eq!(doc.nodes[1].description, "");
		assert_eq!(doc.nodes[1].display_label(), "water");
		assert_eq!(doc.nodes[0].level, 2);
		assert_eq!(doc.links[0].citation, "");
		assert_eq!(doc.links[0].value, 0.0);
		assert_eq!(doc.links[0].id, "link-0");
	}

	#[test]
	fn test_edges_alias_and_unknown_type() {
		let doc = GraphDocument::from_json(
			r#"{
				"nodes": [{"id": "a"}, {"id": "b"}],
				"edges": [{"id": "e1", "source": "a", "target": "b", "type": "feedback", "layer": "economic"}],
				"scenarios": {"current": {"activeEdges": ["e1"]}}
			}"#,
		)
		.unwrap();

		assert_eq!(doc.links.len(), 1);
		assert_eq!(doc.links[0].link_type, LinkType::Other);
		assert_eq!(doc.links[0].layer, Layer::Other);
		assert_eq!(doc.scenarios["current"].active_edges, vec!["e1"]);
	}

	#[test]
	fn test_color_fallback() {
		let mut doc = GraphDocument::default();
		doc.type_colors.insert("synergy".into(), "#10b981".into());
		assert_eq!(doc.type_color(LinkType::Synergy), "#10b981");
		assert_eq!(doc.type_color(LinkType::Conflict), FALLBACK_COLOR);
	}

	#[test]
	fn test_display_capitalizes() {
		assert_eq!(LinkType::Cascade.to_string(), "Cascade");
		assert_eq!(Layer::Governance.to_string(), "Governance");
	}
}
