use std::sync::Arc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::error;

use crate::browser::{fetch_text, load_config, sleep_ms};
use crate::components::{ButtonGroup, DetailsPanel, GraphCanvas, LinkTable, NoticeBanner, ViewSwitch};
use crate::config::DashboardConfig;
use crate::controller::{Effect, ExplorerIntent, ExplorerState, SelectOption, TableIntent};
use crate::interaction::{Click, TourEnd, play_tour};
use crate::model::{GraphDocument, Layer, LinkType, TourStep, capitalize};
use crate::scene::ViewMode;

const EXPLORER_VIEWS: &[ViewMode] = &[ViewMode::Force, ViewMode::Table];
const LAYERS: [Layer; 5] = [
	Layer::Governance,
	Layer::Community,
	Layer::Technical,
	Layer::Conditional,
	Layer::Shared,
];
const ALL: &str = "all";

/// `postShift` reads as `Post-Shift`.
fn scenario_label(name: &str) -> String {
	let mut words = vec![String::new()];
	for c in name.chars() {
		if c.is_uppercase()
			&& let Some(last) = words.last()
			&& !last.is_empty()
		{
			words.push(String::new());
		}
		if let Some(last) = words.last_mut() {
			last.push(c);
		}
	}
	words.iter().map(|w| capitalize(w)).collect::<Vec<_>>().join("-")
}

fn option(value: &str, label: impl Into<String>) -> SelectOption {
	SelectOption {
		value: value.to_string(),
		label: label.into(),
	}
}

#[derive(Clone, Copy)]
struct ExplorerPage {
	state: RwSignal<ExplorerState>,
	config: RwSignal<Arc<DashboardConfig>>,
	render_epoch: RwSignal<u64>,
	pinned_step: RwSignal<Option<TourStep>>,
}

impl ExplorerPage {
	fn dispatch(self, intent: ExplorerIntent) {
		let effects = self.state.try_update(|s| s.dispatch(intent)).unwrap_or_default();
		for effect in effects {
			self.run(effect);
		}
	}

	fn run(self, effect: Effect) {
		match effect {
			Effect::Render => self.render_epoch.update(|e| *e += 1),
			Effect::Restyle | Effect::FetchMap { .. } => {}
			Effect::PlayTour {
				tour,
				lead_in,
				token,
			} => spawn_local(async move {
				let tour_id = tour.id.clone();
				let end = play_tour(&tour, lead_in, &token, sleep_ms, |index, _| {
					self.dispatch(ExplorerIntent::TourStep {
						tour_id: tour_id.clone(),
						index,
					});
				})
				.await;
				if end == TourEnd::Completed {
					self.dispatch(ExplorerIntent::TourEnded { tour_id });
				}
			}),
			Effect::HighlightStep(step) => self.pinned_step.set(Some(step)),
			Effect::ClearHighlight => self.pinned_step.set(None),
		}
	}

	async fn load(self) {
		let config = load_config().await;
		let url = config.explorer_url.clone();
		self.state.update(|s| {
			s.filter.scenario = Some(config.default_scenario.clone());
			s.table_scenario = config.table_scenario.clone();
		});
		self.config.set(Arc::new(config));
		let intent = match fetch_text(&url).await.and_then(|t| GraphDocument::from_json(&t)) {
			Ok(document) => ExplorerIntent::Loaded(document),
			Err(e) => {
				error!("explorer document unavailable: {e}");
				ExplorerIntent::LoadFailed(e.to_string())
			}
		};
		self.dispatch(intent);
	}
}

/// Sector explorer: sectors overview, drill-down into focus areas, scenario
/// and layer filters, guided tours.
#[component]
pub fn Explorer() -> impl IntoView {
	let defaults = DashboardConfig::default();
	let page = ExplorerPage {
		state: RwSignal::new(ExplorerState::new(&defaults.default_scenario, &defaults.table_scenario)),
		config: RwSignal::new(Arc::new(defaults)),
		render_epoch: RwSignal::new(0),
		pinned_step: RwSignal::new(None),
	};
	spawn_local(page.load());

	let state = page.state;
	let graph = Signal::derive(move || state.with(|s| s.graph.clone()));
	let view_mode = Signal::derive(move || state.with(|s| s.view));
	let visibility = Memo::new(move |_| state.with(|s| s.visibility()));
	let table = Signal::derive(move || state.with(|s| s.table()));
	let notice = Signal::derive(move || state.with(|s| s.notice.clone()));
	let details = Signal::derive(move || state.with(|s| s.details.clone()));
	let narration = Signal::derive(move || state.with(|s| s.narration.clone()));
	let level = Signal::derive(move || state.with(|s| s.level_label()));
	let tour_active = Signal::derive(move || state.with(|s| s.tour_active()));

	let scenario_options = Signal::derive(move || {
		state.with(|s| {
			s.document
				.as_ref()
				.map(|d| d.scenarios.keys().map(|k| option(k, scenario_label(k))).collect())
				.unwrap_or_default()
		})
	});
	let scenario = Signal::derive(move || state.with(|s| s.filter.scenario.clone().unwrap_or_default()));
	let layer_options = Signal::stored(
		std::iter::once(option(ALL, "All Layers"))
			.chain(LAYERS.iter().map(|l| option(l.as_str(), l.to_string())))
			.collect::<Vec<_>>(),
	);
	let layer = Signal::derive(move || {
		state.with(|s| s.filter.layers.first().map_or(ALL, |l| l.as_str()).to_string())
	});
	let type_options = Signal::stored(
		std::iter::once(option(ALL, "All Types"))
			.chain(LinkType::LEGEND.iter().map(|t| option(t.as_str(), t.to_string())))
			.collect::<Vec<_>>(),
	);
	let link_type = Signal::derive(move || {
		state.with(|s| s.filter.types.first().map_or(ALL, |t| t.as_str()).to_string())
	});
	let tour_options = Signal::derive(move || {
		state.with(|s| {
			s.document
				.as_ref()
				.map(|d| d.tours.iter().map(|t| option(&t.id, t.title.clone())).collect())
				.unwrap_or_default()
		})
	});
	let current_tour = Signal::derive(move || state.with(|s| s.active_tour().unwrap_or_default().to_string()));

	let on_scenario = Callback::new(move |name: String| page.dispatch(ExplorerIntent::SetScenario(name)));
	let on_layer = Callback::new(move |value: String| {
		let layer = (value != ALL).then(|| Layer::parse(&value));
		page.dispatch(ExplorerIntent::SetLayer(layer));
	});
	let on_type = Callback::new(move |value: String| {
		let link_type = (value != ALL).then(|| LinkType::parse(&value));
		page.dispatch(ExplorerIntent::SetLinkType(link_type));
	});
	let on_tour = Callback::new(move |id: String| page.dispatch(ExplorerIntent::StartTour(id)));
	let on_view = Callback::new(move |mode: ViewMode| page.dispatch(ExplorerIntent::SetView(mode)));
	let on_table = Callback::new(move |intent: TableIntent| page.dispatch(ExplorerIntent::Table(intent)));
	let on_click = Callback::new(move |click: Click| match click {
		Click::Node(node) => page.dispatch(ExplorerIntent::ClickNode(node)),
		Click::Background => page.dispatch(ExplorerIntent::BackgroundClick),
		Click::Link(_) => {}
	});

	view! {
		<div class="dashboard explorer-page">
			<header class="dashboard-controls">
				<ViewSwitch modes=EXPLORER_VIEWS current=view_mode on_select=on_view />
				<ButtonGroup options=scenario_options active=scenario on_select=on_scenario class="scenario-filter" />
				<ButtonGroup options=layer_options active=layer on_select=on_layer class="layer-filter" />
				<ButtonGroup options=type_options active=link_type on_select=on_type class="type-filter" />
				<div class="tour-controls">
					<ButtonGroup options=tour_options active=current_tour on_select=on_tour class="tours" />
					<Show when=move || tour_active.get()>
						<button class="tour-stop" on:click=move |_| page.dispatch(ExplorerIntent::StopTour)>
							"Stop Tour"
						</button>
					</Show>
				</div>
			</header>
			<NoticeBanner notice=notice />
			<h2 class="level-label">{level}</h2>
			{move || narration.get().map(|text| view! { <p class="tour-narration">{text}</p> })}
			<main class="dashboard-main">
				<Show
					when=move || view_mode.get() != ViewMode::Table
					fallback=move || view! { <LinkTable table=table on_intent=on_table /> }
				>
					<div class="graph-container">
						<GraphCanvas
							document=graph
							mode=view_mode
							render_epoch=page.render_epoch
							visibility=visibility
							pinned_step=page.pinned_step
							central=Signal::stored(None::<String>)
							config=page.config
							on_click=on_click
						/>
					</div>
				</Show>
				<DetailsPanel details=details />
			</main>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_scenario_labels() {
		assert_eq!(scenario_label("postShift"), "Post-Shift");
		assert_eq!(scenario_label("current"), "Current");
	}
}
