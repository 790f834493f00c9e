//! Page state as plain data, driven by intents.
//!
//! Each page owns one state value. UI handlers translate DOM events into an
//! intent, call `dispatch`, and carry out the returned effects (fetching,
//! re-laying out, restyling, starting playback). Nothing here touches the
//! DOM, so every transition is testable natively.

mod catalog;
mod explorer;

pub use catalog::{CatalogIntent, CatalogState, SelectOption};
pub use explorer::{ExplorerIntent, ExplorerState};

use crate::interaction::CancelToken;
use crate::model::{Layer, LinkType, Tour, TourStep, capitalize};
use crate::table::{SortColumn, SortState, TableQuery};

/// Work a page must do after a state transition.
#[derive(Clone, Debug)]
pub enum Effect {
	/// Fetch a map document and dispatch the result back.
	FetchMap { map_id: String, url: String },
	/// The graph changed; rebuild the scene.
	Render,
	/// Visibility changed; redraw without re-laying out.
	Restyle,
	/// Run the tour, dispatching a step intent at each boundary.
	PlayTour {
		tour: Tour,
		lead_in: bool,
		token: CancelToken,
	},
	/// Pin the highlight of a tour step.
	HighlightStep(TourStep),
	/// Drop every highlighted and dimmed state.
	ClearHighlight,
}

/// User-visible state for degraded cases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
	/// Drill-down into a sector without focus areas.
	NoData { sector: String },
	/// Filters left no link visible.
	NoVisibleEdges,
	/// A document could not be loaded.
	LoadFailed { what: String, reason: String },
	/// A tour id the document does not define.
	UnknownTour(String),
}

impl Notice {
	pub fn message(&self) -> String {
		match self {
			Notice::NoData { sector } => {
				format!("No focus areas found for {}.", capitalize(sector))
			}
			Notice::NoVisibleEdges => "No connections visible in this scenario. Try the Post-Shift \
				scenario to see synergies and cross-sectoral connections."
				.to_string(),
			Notice::LoadFailed { what, reason } => format!("Failed to load {what}: {reason}"),
			Notice::UnknownTour(id) => format!("Tour `{id}` is not available for this map."),
		}
	}
}

/// Sort and filter choices of a table view; rows are rebuilt from the
/// current document on demand.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableState {
	pub sort: SortState,
	pub query: TableQuery,
}

/// Table intents shared by both pages.
#[derive(Clone, Debug, PartialEq)]
pub enum TableIntent {
	SortBy(SortColumn),
	Search(String),
	ToggleType(LinkType),
	ToggleLayer(Layer),
}

impl TableState {
	pub fn apply(&mut self, intent: TableIntent) {
		match intent {
			TableIntent::SortBy(column) => self.sort.toggle(column),
			TableIntent::Search(text) => self.query.search = text,
			TableIntent::ToggleType(t) => self.query.toggle_type(t),
			TableIntent::ToggleLayer(l) => self.query.toggle_layer(l),
		}
	}
}
