//! Row-per-link table projection with sorting and filtering.

mod magnitude;

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use log::warn;
use serde::{Deserialize, Serialize};

pub use magnitude::{QUALITATIVE_MAGNITUDE, extract_magnitude, extract_unit};

use crate::model::{GraphDocument, GraphIndex, Layer, LinkType};

/// Where the magnitude column comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MagnitudeSource {
	/// The link's numeric `value`; empty citations read `"Thesis analysis"`.
	Value,
	/// Extracted from the quantification text, restricted to the links of
	/// `scenario` when given; empty citations read `"N/A"`.
	Quantification { scenario: Option<String> },
}

impl MagnitudeSource {
	fn citation_default(&self) -> &'static str {
		match self {
			MagnitudeSource::Value => "Thesis analysis",
			MagnitudeSource::Quantification { .. } => "N/A",
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableRow {
	/// Position in `GraphDocument::links`.
	pub link: usize,
	pub id: String,
	pub source: String,
	pub target: String,
	pub link_type: LinkType,
	pub layer: Layer,
	pub magnitude: f64,
	pub unit: &'static str,
	pub quantification: String,
	pub citation: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortColumn {
	Source,
	Target,
	Type,
	Layer,
	Magnitude,
	Quantification,
	Citation,
}

impl SortColumn {
	pub const ALL: [SortColumn; 7] = [
		SortColumn::Source,
		SortColumn::Target,
		SortColumn::Type,
		SortColumn::Layer,
		SortColumn::Magnitude,
		SortColumn::Quantification,
		SortColumn::Citation,
	];

	pub fn header(self) -> &'static str {
		match self {
			SortColumn::Source => "Source",
			SortColumn::Target => "Target",
			SortColumn::Type => "Type",
			SortColumn::Layer => "Layer",
			SortColumn::Magnitude => "Magnitude",
			SortColumn::Quantification => "Quantification",
			SortColumn::Citation => "Citation",
		}
	}

	fn compare(self, a: &TableRow, b: &TableRow) -> Ordering {
		match self {
			SortColumn::Source => a.source.cmp(&b.source),
			SortColumn::Target => a.target.cmp(&b.target),
			SortColumn::Type => a.link_type.as_str().cmp(b.link_type.as_str()),
			SortColumn::Layer => a.layer.as_str().cmp(b.layer.as_str()),
			SortColumn::Magnitude => numeric(a.magnitude).total_cmp(&numeric(b.magnitude)),
			SortColumn::Quantification => a.quantification.cmp(&b.quantification),
			SortColumn::Citation => a.citation.cmp(&b.citation),
		}
	}
}

fn numeric(v: f64) -> f64 {
	if v.is_nan() { 0.0 } else { v }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
	Asc,
	Desc,
}

impl SortDirection {
	pub fn arrow(self) -> &'static str {
		match self {
			SortDirection::Asc => "↑",
			SortDirection::Desc => "↓",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortState {
	pub column: SortColumn,
	pub direction: SortDirection,
}

impl Default for SortState {
	fn default() -> Self {
		Self {
			column: SortColumn::Magnitude,
			direction: SortDirection::Desc,
		}
	}
}

impl SortState {
	/// Header click: the active column flips, another column starts `desc`.
	pub fn toggle(&mut self, column: SortColumn) {
		if self.column == column {
			self.direction = match self.direction {
				SortDirection::Asc => SortDirection::Desc,
				SortDirection::Desc => SortDirection::Asc,
			};
		} else {
			self.column = column;
			self.direction = SortDirection::Desc;
		}
	}

	pub fn sort(&self, rows: &mut [&TableRow]) {
		rows.sort_by(|a, b| {
			let ord = self.column.compare(a, b);
			match self.direction {
				SortDirection::Asc => ord,
				SortDirection::Desc => ord.reverse(),
			}
		});
	}
}

/// Search text plus type and layer membership. Empty sets mean no
/// restriction; the three parts combine with AND.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableQuery {
	pub search: String,
	pub types: BTreeSet<LinkType>,
	pub layers: BTreeSet<Layer>,
}

impl TableQuery {
	pub fn matches(&self, row: &TableRow) -> bool {
		let needle = self.search.trim().to_lowercase();
		let search = needle.is_empty()
			|| row.source.to_lowercase().contains(&needle)
			|| row.target.to_lowercase().contains(&needle)
			|| row.quantification.to_lowercase().contains(&needle);
		let types = self.types.is_empty() || self.types.contains(&row.link_type);
		let layers = self.layers.is_empty() || self.layers.contains(&row.layer);
		search && types && layers
	}

	pub fn toggle_type(&mut self, link_type: LinkType) {
		if !self.types.remove(&link_type) {
			self.types.insert(link_type);
		}
	}

	pub fn toggle_layer(&mut self, layer: Layer) {
		if !self.layers.remove(&layer) {
			self.layers.insert(layer);
		}
	}
}

/// Flattened table over a document's links.
#[derive(Clone, Debug)]
pub struct TableProjection {
	rows: Vec<TableRow>,
	pub sort: SortState,
	pub query: TableQuery,
}

impl TableProjection {
	pub fn new(doc: &GraphDocument, source: MagnitudeSource) -> Self {
		let index = GraphIndex::new(doc);
		let scenario: Option<HashSet<&str>> = match &source {
			MagnitudeSource::Quantification { scenario: Some(name) } => match doc.scenarios.get(name) {
				Some(s) => Some(s.active_edges.iter().map(String::as_str).collect()),
				None => {
					warn!("scenario `{name}` not in document; table shows every link");
					None
				}
			},
			_ => None,
		};

		let rows = doc
			.links
			.iter()
			.enumerate()
			.filter(|(_, l)| scenario.as_ref().is_none_or(|s| s.contains(l.id.as_str())))
			.map(|(i, l)| {
				let (magnitude, unit) = match source {
					MagnitudeSource::Value => (l.value, ""),
					MagnitudeSource::Quantification { .. } => {
						(extract_magnitude(&l.quantification), extract_unit(&l.quantification))
					}
				};
				TableRow {
					link: i,
					id: l.id.clone(),
					source: index.label(&l.source).to_string(),
					target: index.label(&l.target).to_string(),
					link_type: l.link_type,
					layer: l.layer,
					magnitude,
					unit,
					quantification: l.quantification.clone(),
					citation: if l.citation.is_empty() {
						source.citation_default().to_string()
					} else {
						l.citation.clone()
					},
				}
			})
			.collect();
		Self {
			rows,
			sort: SortState::default(),
			query: TableQuery::default(),
		}
	}

	/// All rows in document order.
	pub fn rows(&self) -> &[TableRow] {
		&self.rows
	}

	/// Rows passing the query, in the current sort order.
	pub fn apply_filters(&self) -> Vec<&TableRow> {
		let mut rows: Vec<&TableRow> = self.rows.iter().filter(|r| self.query.matches(r)).collect();
		self.sort.sort(&mut rows);
		rows
	}

	pub fn toggle_sort(&mut self, column: SortColumn) {
		self.sort.toggle(column);
	}

	/// `"No results"` text when filters leave nothing, for the empty state.
	pub fn empty_message(&self) -> Option<&'static str> {
		if self.apply_filters().is_empty() {
			Some(if self.rows.is_empty() {
				"No data for this map"
			} else {
				"No results match the current filters"
			})
		} else {
			None
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
					{"id": "solar", "label": "Solar Pumps"},
					{"id": "drip", "label": "Drip Irrigation"},
					{"id": "grid", "label": "Grid"}
				],
				"edges": [
					{"id": "e1", "source": "solar", "target": "drip", "type": "synergy", "layer": "technical",
					 "value": 40, "quantification": "15% → 80%", "citation": "CEEW 2023"},
					{"id": "e2", "source": "drip", "target": "grid", "type": "conflict", "layer": "governance",
					 "value": 12, "quantification": "30-40% demand"},
					{"id": "e3", "source": "grid", "target": "solar", "type": "synergy", "layer": "community",
					 "value": 25, "quantification": "enables feeder separation"}
				],
				"scenarios": {"postShift": {"activeEdges": ["e1", "e3"]}}
			}"#,
		)
		.unwrap()
	}

	fn ids(rows: &[&TableRow]) -> Vec<String> {
		rows.iter().map(|r| r.id.clone()).collect()
	}

	#[test]
	fn test_default_query_returns_all_rows_sorted() {
		let table = TableProjection::new(&doc(), MagnitudeSource::Value);
		let rows = table.apply_filters();
		assert_eq!(ids(&rows), vec!["e1", "e3", "e2"]);
		assert_eq!(rows[0].source, "Solar Pumps");
		assert_eq!(rows[2].citation, "Thesis analysis");
		assert_eq!(table.empty_message(), None);
	}

	#[test]
	fn test_filters_compose_with_and() {
		let mut table = TableProjection::new(&doc(), MagnitudeSource::Value);
		table.query.toggle_type(LinkType::Synergy);
		assert_eq!(table.apply_filters().len(), 2);
		table.query.toggle_layer(Layer::Community);
		assert_eq!(ids(&table.apply_filters()), vec!["e3"]);
		table.query.search = "SOLAR".to_string();
		assert_eq!(ids(&table.apply_filters()), vec!["e3"]);
		table.query.search = "irrigation".to_string();
		assert!(table.apply_filters().is_empty());
		assert_eq!(table.empty_message(), Some("No results match the current filters"));

		table.query.toggle_type(LinkType::Synergy);
		table.query.toggle_layer(Layer::Community);
		assert_eq!(ids(&table.apply_filters()), vec!["e1", "e2"]);
	}

	#[test]
	fn test_sort_toggle() {
		let mut table = TableProjection::new(&doc(), MagnitudeSource::Value);
		table.toggle_sort(SortColumn::Magnitude);
		assert_eq!(table.sort.direction, SortDirection::Asc);
		assert_eq!(ids(&table.apply_filters()), vec!["e2", "e3", "e1"]);
		table.toggle_sort(SortColumn::Source);
		assert_eq!(table.sort.direction, SortDirection::Desc);
		assert_eq!(ids(&table.apply_filters()), vec!["e1", "e3", "e2"]);
	}

	#[test]
	fn test_quantification_variant() {
		let source = MagnitudeSource::Quantification {
			scenario: Some("postShift".to_string()),
		};
		let table = TableProjection::new(&doc(), source);
		let rows = table.apply_filters();
		assert_eq!(ids(&rows), vec!["e1", "e3"]);
		assert_eq!(rows[0].magnitude, 65.0);
		assert_eq!(rows[0].unit, "%");
		assert_eq!(rows[1].magnitude, 10.0);
		assert_eq!(rows[1].citation, "N/A");

		let unknown = MagnitudeSource::Quantification {
			scenario: Some("missing".to_string()),
		};
		assert_eq!(TableProjection::new(&doc(), unknown).rows().len(), 3);
	}
}
