use std::sync::Arc;

use log::{debug, error, info, warn};

use super::{Effect, Notice, TableIntent, TableState};
use crate::aggregate::{DrillOutcome, DrillState, NodeDetails, node_details, sector_of_node_id};
use crate::filter::{ScenarioFilter, Visibility};
use crate::interaction::CancelToken;
use crate::model::{GraphDocument, Layer, LinkType, capitalize};
use crate::scene::ViewMode;
use crate::table::{MagnitudeSource, TableProjection};

#[derive(Clone, Debug)]
pub enum ExplorerIntent {
	Loaded(GraphDocument),
	LoadFailed(String),
	/// Click on a node of the current graph, by position.
	ClickNode(usize),
	BackgroundClick,
	SetScenario(String),
	/// `None` shows all layers.
	SetLayer(Option<Layer>),
	/// `None` shows all link types.
	SetLinkType(Option<LinkType>),
	StartTour(String),
	/// Playback reached step `index` of the running tour.
	TourStep { tour_id: String, index: usize },
	/// Playback ran out of steps or saw the stop flag.
	TourEnded { tour_id: String },
	StopTour,
	SetView(ViewMode),
	Table(TableIntent),
}

#[derive(Clone, Debug)]
struct ActiveTour {
	id: String,
	token: CancelToken,
}

/// State of the multi-sector explorer page.
#[derive(Clone, Debug, Default)]
pub struct ExplorerState {
	pub document: Option<Arc<GraphDocument>>,
	/// Graph of the current drill level, rebuilt on every transition.
	pub graph: Option<Arc<GraphDocument>>,
	pub drill: DrillState,
	pub filter: ScenarioFilter,
	/// `Force` for the graph, `Table` for the quantification table.
	pub view: ViewMode,
	pub details: Option<NodeDetails>,
	pub narration: Option<String>,
	pub notice: Option<Notice>,
	pub table: TableState,
	/// Scenario the quantification table is restricted to.
	pub table_scenario: String,
	tour: Option<ActiveTour>,
}

impl ExplorerState {
	pub fn new(default_scenario: &str, table_scenario: &str) -> Self {
		Self {
			filter: ScenarioFilter {
				scenario: Some(default_scenario.to_string()),
				..Default::default()
			},
			view: ViewMode::Force,
			table_scenario: table_scenario.to_string(),
			..Default::default()
		}
	}

	pub fn tour_active(&self) -> bool {
		self.tour.is_some()
	}

	pub fn active_tour(&self) -> Option<&str> {
		self.tour.as_ref().map(|t| t.id.as_str())
	}

	pub fn dispatch(&mut self, intent: ExplorerIntent) -> Vec<Effect> {
		match intent {
			ExplorerIntent::Loaded(document) => {
				info!(
					"explorer document loaded: {} nodes, {} links",
					document.nodes.len(),
					document.links.len()
				);
				self.document = Some(Arc::new(document));
				self.drill = DrillState::Level1;
				self.rebuild();
				vec![Effect::Render]
			}
			ExplorerIntent::LoadFailed(reason) => {
				error!("failed to load explorer document: {reason}");
				self.notice = Some(Notice::LoadFailed {
					what: "systems map".to_string(),
					reason,
				});
				Vec::new()
			}
			ExplorerIntent::ClickNode(position) => self.click_node(position),
			ExplorerIntent::BackgroundClick => {
				if !self.drill.back(self.tour_active()) {
					return Vec::new();
				}
				self.rebuild();
				self.details = None;
				self.notice = None;
				vec![Effect::Render]
			}
			ExplorerIntent::SetScenario(scenario) => {
				self.filter.scenario = Some(scenario);
				self.restyle()
			}
			ExplorerIntent::SetLayer(layer) => {
				self.filter.select_layer(layer);
				self.restyle()
			}
			ExplorerIntent::SetLinkType(link_type) => {
				self.filter.select_type(link_type);
				self.restyle()
			}
			ExplorerIntent::StartTour(id) => self.start_tour(id),
			ExplorerIntent::TourStep { tour_id, index } => {
				if self.active_tour() != Some(tour_id.as_str()) {
					return Vec::new();
				}
				let Some(step) = self
					.document
					.as_ref()
					.and_then(|d| d.tour(&tour_id))
					.and_then(|t| t.steps.get(index))
				else {
					return Vec::new();
				};
				debug!("tour `{tour_id}` step {}", index + 1);
				self.narration = Some(step.narration.clone());
				vec![Effect::HighlightStep(step.clone())]
			}
			ExplorerIntent::TourEnded { tour_id } => {
				if self.active_tour() != Some(tour_id.as_str()) {
					return Vec::new();
				}
				self.stop_tour()
			}
			ExplorerIntent::StopTour => self.stop_tour(),
			ExplorerIntent::SetView(view) => {
				if self.view == view {
					return Vec::new();
				}
				self.view = view;
				vec![Effect::Render]
			}
			ExplorerIntent::Table(intent) => {
				self.table.apply(intent);
				vec![Effect::Restyle]
			}
		}
	}

	fn rebuild(&mut self) {
		self.graph = self.document.as_ref().map(|d| Arc::new(self.drill.view(d)));
	}

	fn click_node(&mut self, position: usize) -> Vec<Effect> {
		if self.tour_active() {
			return Vec::new();
		}
		let (Some(document), Some(graph)) = (self.document.clone(), self.graph.clone()) else {
			return Vec::new();
		};
		let Some(node) = graph.nodes.get(position) else {
			return Vec::new();
		};
		if node.level == 1 {
			match self.drill.drill_down(&document, &node.id, false) {
				DrillOutcome::Entered(sub) => {
					self.graph = Some(Arc::new(sub));
					self.details = None;
					self.notice = None;
					let mut effects = vec![Effect::Render];
					effects.extend(self.restyle());
					effects
				}
				DrillOutcome::NoData => {
					self.notice = Some(Notice::NoData {
						sector: sector_of_node_id(&node.id).to_string(),
					});
					Vec::new()
				}
				DrillOutcome::Blocked | DrillOutcome::Ignored => Vec::new(),
			}
		} else {
			let visibility = self.filter.apply(&graph);
			self.details = node_details(&graph, &node.id, |i| visibility.link(i));
			Vec::new()
		}
	}

	/// Re-evaluates visibility and the no-visible-edges notice.
	fn restyle(&mut self) -> Vec<Effect> {
		if self.drill.level() == 2
			&& let Some(visibility) = self.visibility()
		{
			let visible = visibility.visible_link_count();
			debug!("{visible} visible links under scenario {:?}", self.filter.scenario);
			if visible == 0 {
				self.notice = Some(Notice::NoVisibleEdges);
			} else if self.notice == Some(Notice::NoVisibleEdges) {
				self.notice = None;
			}
		}
		vec![Effect::Restyle]
	}

	fn start_tour(&mut self, id: String) -> Vec<Effect> {
		let Some(tour) = self.document.as_ref().and_then(|d| d.tour(&id)).cloned() else {
			warn!("tour `{id}` not found");
			self.notice = Some(Notice::UnknownTour(id));
			return Vec::new();
		};
		let mut effects = Vec::new();
		if let Some(previous) = self.tour.take() {
			previous.token.cancel();
		}
		let lead_in = self.drill.reset();
		if lead_in {
			self.rebuild();
			self.details = None;
			effects.push(Effect::Render);
		}
		let token = CancelToken::new();
		self.tour = Some(ActiveTour {
			id,
			token: token.clone(),
		});
		self.notice = None;
		effects.push(Effect::PlayTour {
			tour,
			lead_in,
			token,
		});
		effects
	}

	fn stop_tour(&mut self) -> Vec<Effect> {
		if let Some(tour) = self.tour.take() {
			tour.token.cancel();
			info!("tour `{}` stopped", tour.id);
		}
		self.narration = None;
		vec![Effect::ClearHighlight]
	}

	pub fn visibility(&self) -> Option<Visibility> {
		self.graph.as_ref().map(|g| self.filter.apply(g))
	}

	/// Heading for the current level.
	pub fn level_label(&self) -> String {
		match (&self.drill, &self.graph) {
			(DrillState::Level2 { sector }, Some(graph)) => format!(
				"Level 2: {} Focus Areas ({} connections)",
				capitalize(sector),
				graph.links.len()
			),
			(_, Some(graph)) => format!("Level 1: {} Sectors", graph.nodes.len()),
			(_, None) => "Loading...".to_string(),
		}
	}

	/// Quantification table restricted to the table scenario.
	pub fn table(&self) -> Option<TableProjection> {
		let doc = self.document.as_ref()?;
		let mut table = TableProjection::new(
			doc,
			MagnitudeSource::Quantification {
				scenario: Some(self.table_scenario.clone()),
			},
		);
		table.sort = self.table.sort;
		table.query = self.table.query.clone();
		Some(table)
	}
}
