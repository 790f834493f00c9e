//! Relationship-graph data model: documents, catalog, and id lookup.

mod catalog;
mod document;
mod index;

pub use catalog::{Catalog, MapEntry, MapStats, Priority, Sector};
pub use document::{
	DEFAULT_STEP_DURATION_MS, GraphDocument, Layer, Link, LinkType, Node, Scenario, Strength, Tour,
	TourStep, capitalize,
};
pub use index::{GraphIndex, ResolvedLink};
