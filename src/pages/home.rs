use std::sync::Arc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::error;

use crate::browser::{fetch_text, load_config};
use crate::components::{
	ButtonGroup, GraphCanvas, Legend, LinkTable, NoticeBanner, SelectControl, ViewSwitch,
};
use crate::config::DashboardConfig;
use crate::controller::{CatalogIntent, CatalogState, Effect, Notice, SelectOption, TableIntent};
use crate::interaction::Click;
use crate::model::{Catalog, GraphDocument, Priority};
use crate::scene::ViewMode;

/// Handles shared by every closure on the page.
#[derive(Clone, Copy)]
struct CatalogPage {
	state: RwSignal<CatalogState>,
	config: RwSignal<Arc<DashboardConfig>>,
	render_epoch: RwSignal<u64>,
}

impl CatalogPage {
	fn dispatch(self, intent: CatalogIntent) {
		let effects = self.state.try_update(|s| s.dispatch(intent)).unwrap_or_default();
		for effect in effects {
			self.run(effect);
		}
	}

	fn run(self, effect: Effect) {
		match effect {
			Effect::FetchMap { map_id, url } => spawn_local(async move {
				let intent = match fetch_text(&url).await.and_then(|t| GraphDocument::from_json(&t)) {
					Ok(document) => CatalogIntent::MapLoaded { map_id, document },
					Err(e) => CatalogIntent::MapLoadFailed {
						map_id,
						reason: e.to_string(),
					},
				};
				self.dispatch(intent);
			}),
			Effect::Render => self.render_epoch.update(|e| *e += 1),
			// Visibility and table rows are derived from the state signal.
			Effect::Restyle => {}
			Effect::PlayTour { .. } | Effect::HighlightStep(_) | Effect::ClearHighlight => {}
		}
	}

	async fn load(self) {
		let config = load_config().await;
		let url = config.catalog_url.clone();
		self.state.update(|s| {
			s.view = config.default_view;
			s.show_indirect = config.show_indirect;
		});
		self.config.set(Arc::new(config));
		match fetch_text(&url).await.and_then(|t| Catalog::from_json(&t)) {
			Ok(catalog) => self.dispatch(CatalogIntent::Loaded(catalog)),
			Err(e) => {
				error!("failed to load catalog: {e}");
				self.state.update(|s| {
					s.notice = Some(Notice::LoadFailed {
						what: "catalog".to_string(),
						reason: e.to_string(),
					});
				});
			}
		}
	}
}

/// Catalog page: pick a sector, priority and map, then explore it in one of
/// the views.
#[component]
pub fn Home() -> impl IntoView {
	let defaults = DashboardConfig::default();
	let page = CatalogPage {
		state: RwSignal::new(CatalogState::new(defaults.default_view, defaults.show_indirect)),
		config: RwSignal::new(Arc::new(defaults)),
		render_epoch: RwSignal::new(0),
	};
	spawn_local(page.load());

	let state = page.state;
	let document = Signal::derive(move || state.with(|s| s.document.clone()));
	let view_mode = Signal::derive(move || state.with(|s| s.view));
	let visibility = Memo::new(move |_| state.with(|s| s.visibility()));
	let central = Signal::derive(move || state.with(|s| s.central_node().map(str::to_string)));
	let table = Signal::derive(move || state.with(|s| s.table()));
	let notice = Signal::derive(move || state.with(|s| s.notice.clone()));
	let legend = Signal::derive(move || state.with(|s| s.legend_rows()));
	let title = Signal::derive(move || {
		state.with(|s| s.current_map().map(|m| format!("{} {}", m.emoji, m.title)).unwrap_or_default())
	});

	let sector_options = Signal::derive(move || state.with(|s| s.sector_options()));
	let priority_options = Signal::derive(move || state.with(|s| s.priority_options()));
	let map_options = Signal::derive(move || state.with(|s| s.map_options()));
	let sector = Signal::derive(move || state.with(|s| s.sector.clone().unwrap_or_default()));
	let priority = Signal::derive(move || {
		state.with(|s| s.priority.map_or("all", Priority::as_str).to_string())
	});
	let map_id = Signal::derive(move || state.with(|s| s.map_id.clone().unwrap_or_default()));
	let indirect = Signal::derive(move || if state.with(|s| s.show_indirect) { "show" } else { "hide" }.to_string());

	let on_sector = Callback::new(move |id: String| page.dispatch(CatalogIntent::SelectSector(id)));
	let on_priority = Callback::new(move |value: String| {
		let priority = Priority::ALL.into_iter().find(|p| p.as_str() == value);
		page.dispatch(CatalogIntent::SelectPriority(priority));
	});
	let on_map = Callback::new(move |id: String| page.dispatch(CatalogIntent::SelectMap(id)));
	let on_view = Callback::new(move |mode: ViewMode| page.dispatch(CatalogIntent::SetView(mode)));
	let on_indirect = Callback::new(move |value: String| {
		page.dispatch(CatalogIntent::SetShowIndirect(value == "show"));
	});
	let on_table = Callback::new(move |intent: TableIntent| page.dispatch(CatalogIntent::Table(intent)));
	// Catalog maps have no drill-down; clicks only drive hover and pan.
	let on_click = Callback::new(move |_: Click| {});

	let indirect_options = Signal::stored(vec![
		SelectOption {
			value: "hide".to_string(),
			label: "Direct only".to_string(),
		},
		SelectOption {
			value: "show".to_string(),
			label: "Show indirect".to_string(),
		},
	]);

	view! {
		<div class="dashboard catalog-page">
			<header class="dashboard-controls">
				<SelectControl label="Sector" options=sector_options selected=sector on_change=on_sector />
				<SelectControl label="Priority" options=priority_options selected=priority on_change=on_priority />
				<SelectControl label="Map" options=map_options selected=map_id on_change=on_map />
				<ViewSwitch modes=&ViewMode::ALL current=view_mode on_select=on_view />
				<ButtonGroup options=indirect_options active=indirect on_select=on_indirect class="indirect-toggle" />
			</header>
			<NoticeBanner notice=notice />
			<h2 class="map-title">{title}</h2>
			<main class="dashboard-main">
				<Show
					when=move || view_mode.get() != ViewMode::Table
					fallback=move || view! { <LinkTable table=table on_intent=on_table /> }
				>
					<div class="graph-container">
						<GraphCanvas
							document=document
							mode=view_mode
							render_epoch=page.render_epoch
							visibility=visibility
							pinned_step=Signal::stored(None)
							central=central
							config=page.config
							on_click=on_click
						/>
					</div>
				</Show>
				<Legend rows=legend document=document />
			</main>
		</div>
	}
}
