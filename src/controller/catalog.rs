use std::collections::HashMap;
use std::sync::Arc;

use log::{error, info, warn};

use super::{Effect, Notice, TableIntent, TableState};
use crate::aggregate::{Summary, legend_summaries};
use crate::error::DashboardError;
use crate::filter::{ScenarioFilter, Visibility};
use crate::model::{Catalog, GraphDocument, LinkType, MapEntry, Priority};
use crate::scene::ViewMode;
use crate::table::{MagnitudeSource, TableProjection};

/// One entry of a selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
	pub value: String,
	pub label: String,
}

#[derive(Clone, Debug)]
pub enum CatalogIntent {
	Loaded(Catalog),
	SelectSector(String),
	/// `None` selects all priorities.
	SelectPriority(Option<Priority>),
	SelectMap(String),
	MapLoaded { map_id: String, document: GraphDocument },
	MapLoadFailed { map_id: String, reason: String },
	SetView(ViewMode),
	SetShowIndirect(bool),
	Table(TableIntent),
}

/// State of the map browser page.
#[derive(Clone, Debug, Default)]
pub struct CatalogState {
	pub catalog: Catalog,
	pub sector: Option<String>,
	pub priority: Option<Priority>,
	pub map_id: Option<String>,
	pub view: ViewMode,
	pub show_indirect: bool,
	pub document: Option<Arc<GraphDocument>>,
	pub legend: Vec<(LinkType, Summary)>,
	pub table: TableState,
	pub notice: Option<Notice>,
	pending: Option<String>,
	cache: HashMap<String, Arc<GraphDocument>>,
}

impl CatalogState {
	pub fn new(view: ViewMode, show_indirect: bool) -> Self {
		Self {
			view,
			show_indirect,
			..Default::default()
		}
	}

	pub fn dispatch(&mut self, intent: CatalogIntent) -> Vec<Effect> {
		match intent {
			CatalogIntent::Loaded(catalog) => {
				info!(
					"catalog loaded: {} sectors, {} maps",
					catalog.sectors.len(),
					catalog.maps.len()
				);
				let first = catalog.sectors.first().map(|s| s.id.clone());
				self.catalog = catalog;
				match first {
					Some(sector) => self.select_sector(sector),
					None => {
						warn!("catalog has no sectors");
						Vec::new()
					}
				}
			}
			CatalogIntent::SelectSector(sector) => self.select_sector(sector),
			CatalogIntent::SelectPriority(priority) => {
				self.priority = priority;
				self.load_first_visible()
			}
			CatalogIntent::SelectMap(map_id) => self.load_map(&map_id),
			CatalogIntent::MapLoaded { map_id, document } => {
				let document = Arc::new(document);
				self.cache.insert(map_id.clone(), document.clone());
				if self.pending.as_deref() == Some(map_id.as_str()) {
					self.pending = None;
					self.activate(map_id, document)
				} else {
					Vec::new()
				}
			}
			CatalogIntent::MapLoadFailed { map_id, reason } => {
				error!("failed to load map `{map_id}`: {reason}");
				if self.pending.as_deref() == Some(map_id.as_str()) {
					self.pending = None;
				}
				self.notice = Some(Notice::LoadFailed {
					what: map_id,
					reason,
				});
				Vec::new()
			}
			CatalogIntent::SetView(view) => {
				if self.view == view {
					return Vec::new();
				}
				self.view = view;
				vec![Effect::Render]
			}
			CatalogIntent::SetShowIndirect(show) => {
				self.show_indirect = show;
				vec![Effect::Restyle]
			}
			CatalogIntent::Table(intent) => {
				self.table.apply(intent);
				vec![Effect::Restyle]
			}
		}
	}

	fn select_sector(&mut self, sector: String) -> Vec<Effect> {
		self.sector = Some(sector);
		self.priority = None;
		self.load_first_visible()
	}

	/// Keeps the current map when it still matches the selectors, else
	/// loads the first one that does.
	fn load_first_visible(&mut self) -> Vec<Effect> {
		let maps = self.visible_maps();
		if let Some(current) = &self.map_id
			&& maps.iter().any(|m| &m.id == current)
		{
			return Vec::new();
		}
		let first = maps.first().map(|m| m.id.clone());
		match first {
			Some(id) => self.load_map(&id),
			None => Vec::new(),
		}
	}

	fn load_map(&mut self, map_id: &str) -> Vec<Effect> {
		let Some(entry) = self.catalog.map(map_id) else {
			let err = DashboardError::UnknownMap(map_id.to_string());
			warn!("{err}");
			self.notice = Some(Notice::LoadFailed {
				what: "map".to_string(),
				reason: err.to_string(),
			});
			return Vec::new();
		};
		if let Some(document) = self.cache.get(map_id).cloned() {
			return self.activate(map_id.to_string(), document);
		}
		let url = entry.data_file.clone();
		self.pending = Some(map_id.to_string());
		vec![Effect::FetchMap {
			map_id: map_id.to_string(),
			url,
		}]
	}

	fn activate(&mut self, map_id: String, document: Arc<GraphDocument>) -> Vec<Effect> {
		self.legend = legend_summaries(&document.links);
		self.document = Some(document);
		self.map_id = Some(map_id);
		self.pending = None;
		self.notice = None;
		vec![Effect::Render]
	}

	pub fn current_map(&self) -> Option<&MapEntry> {
		self.map_id.as_deref().and_then(|id| self.catalog.map(id))
	}

	/// Maps matching the sector and priority selectors.
	pub fn visible_maps(&self) -> Vec<&MapEntry> {
		match &self.sector {
			Some(sector) => self.catalog.maps_for(sector, self.priority),
			None => Vec::new(),
		}
	}

	pub fn sector_options(&self) -> Vec<SelectOption> {
		self.catalog
			.sectors
			.iter()
			.map(|s| {
				let count = self.catalog.maps_for(&s.id, None).len();
				SelectOption {
					value: s.id.clone(),
					label: format!("{} {} ({count} maps)", s.icon, s.name),
				}
			})
			.collect()
	}

	/// `all` first, then each priority that has at least one map.
	pub fn priority_options(&self) -> Vec<SelectOption> {
		let Some(sector) = &self.sector else {
			return Vec::new();
		};
		let all = self.catalog.maps_for(sector, None).len();
		let mut options = vec![SelectOption {
			value: "all".to_string(),
			label: format!("All Priorities ({all})"),
		}];
		for p in Priority::ALL {
			let count = self.catalog.maps_for(sector, Some(p)).len();
			if count > 0 {
				options.push(SelectOption {
					value: p.as_str().to_string(),
					label: format!("{} ({count})", p.label()),
				});
			}
		}
		options
	}

	pub fn map_options(&self) -> Vec<SelectOption> {
		self.visible_maps()
			.into_iter()
			.map(|m| SelectOption {
				value: m.id.clone(),
				label: format!(
					"{} {} - {} Direct, {} Indirect",
					m.emoji, m.title, m.stats.direct_relationships, m.stats.indirect_relationships
				),
			})
			.collect()
	}

	/// Legend rows: `(type, "(count)", "Avg: x.y")`.
	pub fn legend_rows(&self) -> Vec<(LinkType, String, String)> {
		self.legend
			.iter()
			.map(|(t, s)| (*t, format!("({})", s.count), format!("Avg: {}", s.mean_display())))
			.collect()
	}

	/// Radial center for the current map: its sector.
	pub fn central_node(&self) -> Option<&str> {
		self.current_map().map(|m| m.sector_id.as_str())
	}

	pub fn filter(&self) -> ScenarioFilter {
		ScenarioFilter {
			show_indirect: self.show_indirect,
			..Default::default()
		}
	}

	pub fn visibility(&self) -> Option<Visibility> {
		self.document.as_ref().map(|d| self.filter().apply(d))
	}

	/// Value-magnitude table of the current map with the current sort and
	/// filters.
	pub fn table(&self) -> Option<TableProjection> {
		let doc = self.document.as_ref()?;
		let mut table = TableProjection::new(doc, MagnitudeSource::Value);
		table.sort = self.table.sort;
		table.query = self.table.query.clone();
		Some(table)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn catalog() -> Catalog {
		Catalog::from_json(
			r#"{
				"sectors": [
					{"id": "energy", "name": "Energy", "icon": "⚡"},
					{"id": "water", "name": "Water", "icon": "💧"}
				],
				"maps": [
					{"id": "end-use", "sectorId": "energy", "title": "End-Use", "priority": "urgent",
					 "dataFile": "/data/end-use.json", "emoji": "🔌",
					 "stats": {"directRelationships": 12, "indirectRelationships": 4}},
					{"id": "storage", "sectorId": "energy", "title": "Storage", "priority": "high",
					 "dataFile": "/data/storage.json"},
					{"id": "drip", "sectorId": "water", "title": "Drip", "dataFile": "/data/drip.json"}
				]
			}"#,
		)
		.unwrap()
	}

	fn document() -> GraphDocument {
		GraphDocument::from_json(
			r#"{
				"nodes": [{"id": "energy"}, {"id": "water"}],
				"links": [
					{"source": "energy", "target": "water", "type": "synergy", "value": 40},
					{"source": "water", "target": "energy", "type": "indirect", "value": 5}
				]
			}"#,
		)
		.unwrap()
	}

	fn fetch_of(effects: &[Effect]) -> Option<(String, String)> {
		effects.iter().find_map(|e| match e {
			Effect::FetchMap { map_id, url } => Some((map_id.clone(), url.clone())),
			_ => None,
		})
	}

	#[test]
	fn test_load_selects_first_sector_and_fetches_first_map() {
		let mut state = CatalogState::new(ViewMode::Radial, false);
		let effects = state.dispatch(CatalogIntent::Loaded(catalog()));
		assert_eq!(state.sector.as_deref(), Some("energy"));
		assert_eq!(
			fetch_of(&effects),
			Some(("end-use".to_string(), "/data/end-use.json".to_string()))
		);
		assert!(state.document.is_none());

		let effects = state.dispatch(CatalogIntent::MapLoaded {
			map_id: "end-use".to_string(),
			document: document(),
		});
		assert!(matches!(effects.as_slice(), [Effect::Render]));
		assert_eq!(state.central_node(), Some("energy"));
		assert_eq!(state.legend_rows()[0].1, "(1)");
		assert_eq!(state.legend_rows()[0].2, "Avg: 40.0");
		assert_eq!(state.legend_rows()[1].2, "Avg: 0.0");
	}

	#[test]
	fn test_cache_hit_skips_fetch() {
		let mut state = CatalogState::new(ViewMode::Radial, false);
		state.dispatch(CatalogIntent::Loaded(catalog()));
		state.dispatch(CatalogIntent::MapLoaded {
			map_id: "end-use".to_string(),
			document: document(),
		});
		let effects = state.dispatch(CatalogIntent::SelectMap("storage".to_string()));
		assert!(fetch_of(&effects).is_some());
		let effects = state.dispatch(CatalogIntent::SelectMap("end-use".to_string()));
		assert!(fetch_of(&effects).is_none());
		assert_eq!(state.map_id.as_deref(), Some("end-use"));
	}

	#[test]
	fn test_selector_labels() {
		let mut state = CatalogState::new(ViewMode::Radial, false);
		state.dispatch(CatalogIntent::Loaded(catalog()));
		assert_eq!(state.sector_options()[0].label, "⚡ Energy (2 maps)");
		let priorities: Vec<String> = state.priority_options().into_iter().map(|o| o.label).collect();
		assert_eq!(priorities, vec!["All Priorities (2)", "🔴 Urgent (1)", "🟠 High (1)"]);
		assert_eq!(state.map_options()[0].label, "🔌 End-Use - 12 Direct, 4 Indirect");

		state.dispatch(CatalogIntent::SelectPriority(Some(Priority::High)));
		assert_eq!(state.map_options().len(), 1);
		assert_eq!(state.pending.as_deref(), Some("storage"));
	}

	#[test]
	fn test_sector_change_resets_priority() {
		let mut state = CatalogState::new(ViewMode::Radial, false);
		state.dispatch(CatalogIntent::Loaded(catalog()));
		state.dispatch(CatalogIntent::SelectPriority(Some(Priority::High)));
		let effects = state.dispatch(CatalogIntent::SelectSector("water".to_string()));
		assert_eq!(state.priority, None);
		assert_eq!(fetch_of(&effects).map(|f| f.0), Some("drip".to_string()));
	}

	#[test]
	fn test_failed_load_surfaces_notice() {
		let mut state = CatalogState::new(ViewMode::Radial, false);
		state.dispatch(CatalogIntent::Loaded(catalog()));
		state.dispatch(CatalogIntent::MapLoadFailed {
			map_id: "end-use".to_string(),
			reason: "404".to_string(),
		});
		assert!(matches!(state.notice, Some(Notice::LoadFailed { .. })));
		assert!(state.document.is_none());
	}

	#[test]
	fn test_indirect_toggle_and_table() {
		let mut state = CatalogState::new(ViewMode::Table, false);
		state.dispatch(CatalogIntent::Loaded(catalog()));
		state.dispatch(CatalogIntent::MapLoaded {
			map_id: "end-use".to_string(),
			document: document(),
		});
		assert_eq!(state.visibility().unwrap().links, vec![true, false]);
		state.dispatch(CatalogIntent::SetShowIndirect(true));
		assert_eq!(state.visibility().unwrap().links, vec![true, true]);

		state.dispatch(CatalogIntent::Table(TableIntent::ToggleType(LinkType::Indirect)));
		let table = state.table().unwrap();
		let rows = table.apply_filters();
		assert_eq!(rows.len(), 1);
		assert_eq!(rows[0].citation, "Thesis analysis");
	}
}
