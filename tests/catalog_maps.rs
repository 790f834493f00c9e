//! Catalog map fixtures through every projection.

use std::f64::consts::PI;

use climate_systems_map::aggregate::legend_summaries;
use climate_systems_map::config::DashboardConfig;
use climate_systems_map::controller::{CatalogIntent, CatalogState, Effect};
use climate_systems_map::layout::chord::{ChordConfig, ChordLayout};
use climate_systems_map::layout::matrix::AdjacencyMatrix;
use climate_systems_map::layout::radial::{RadialLayout, RadialOptions};
use climate_systems_map::layout::sankey::{SankeyConfig, SankeyLayout};
use climate_systems_map::model::{Catalog, GraphDocument, LinkType};
use climate_systems_map::scene::{Scene, ViewMode};
use climate_systems_map::table::{MagnitudeSource, TableProjection};

const CATALOG: &str = include_str!("fixtures/catalog.json");
const END_USE: &str = include_str!("fixtures/energy-end-use.json");

fn end_use() -> GraphDocument {
	GraphDocument::from_json(END_USE).unwrap()
}

#[test]
fn test_matrix_is_directed() {
	let doc = end_use();
	let m = AdjacencyMatrix::build(&doc);
	let linked = [(0, 1), (1, 2), (0, 2), (0, 3), (3, 4), (0, 4)];
	for i in 0..m.len() {
		for j in 0..m.len() {
			if !linked.contains(&(i, j)) {
				assert_eq!(m.cell(i, j), 0.0, "cell ({i}, {j})");
			}
		}
	}
	assert_eq!(m.cell(1, 0), 0.0);
	// Two energy -> water links: the later one wins.
	assert_eq!(m.cell(0, 1), 10.0);
}

#[test]
fn test_radial_places_connected_nodes_on_ring() {
	let doc = end_use();
	let layout = RadialLayout::new(&doc, RadialOptions::default());
	assert_eq!(layout.central, Some(0));
	assert_eq!(layout.peripheral_count(), 4);
	assert!(layout.node(5).is_none(), "isolated node is left out");

	for (i, doc_index) in [1, 2, 3, 4].into_iter().enumerate() {
		let angle = layout.node(doc_index).unwrap().angle.unwrap();
		let expected = -PI / 2.0 + (i as f64 / 4.0) * 2.0 * PI;
		assert!((angle - expected).abs() < 1e-12);
	}
}

#[test]
fn test_parallel_links_curve_apart() {
	let doc = end_use();
	let layout = RadialLayout::new(&doc, RadialOptions::default());
	let radii: Vec<f64> = layout
		.arcs
		.iter()
		.filter(|a| a.parallel_count == 2)
		.map(|a| a.dr)
		.collect();
	assert_eq!(radii.len(), 2);
	assert!((radii[0] - radii[1]).abs() > 1.0);

	let again = RadialLayout::new(&doc, RadialOptions::default());
	assert_eq!(again.arcs[0].dr, layout.arcs[0].dr);
	assert_eq!(again.arcs[1].dr, layout.arcs[1].dr);
}

#[test]
fn test_legend_means() {
	let doc = end_use();
	let legend = legend_summaries(&doc.links);
	let means: Vec<(LinkType, String)> = legend.iter().map(|(t, s)| (*t, s.mean_display())).collect();
	assert_eq!(
		means,
		vec![
			(LinkType::Synergy, "29.0".to_string()),
			(LinkType::Conflict, "10.0".to_string()),
			(LinkType::Cascade, "27.5".to_string()),
			(LinkType::Conditional, "12.0".to_string()),
			(LinkType::Indirect, "5.0".to_string()),
		]
	);

	let only_conflict = legend_summaries(&doc.links[1..2]);
	assert_eq!(only_conflict[0].1.count, 0);
	assert_eq!(only_conflict[0].1.mean_display(), "0.0");
}

#[test]
fn test_value_table_defaults_to_all_rows() {
	let doc = end_use();
	let table = TableProjection::new(&doc, MagnitudeSource::Value);
	let values: Vec<f64> = table.apply_filters().iter().map(|r| r.magnitude).collect();
	assert_eq!(values, vec![40.0, 30.0, 25.0, 18.0, 12.0, 10.0, 5.0]);
	assert!(table.empty_message().is_none());
}

#[test]
fn test_quantification_table_magnitudes() {
	let doc = end_use();
	let table = TableProjection::new(&doc, MagnitudeSource::Quantification { scenario: None });
	let by_id = |id: &str| table.rows().iter().find(|r| r.id == id).unwrap();
	assert_eq!(by_id("e-w-1").magnitude, 65.0);
	assert_eq!(by_id("e-w-2").magnitude, 35.0);
	assert_eq!(by_id("e-a").magnitude, 10.0);
	assert_eq!(by_id("h-b").magnitude, 0.0);
	assert_eq!(by_id("w-a").magnitude, 0.0);
	assert_eq!(by_id("e-b").magnitude, 120.0);
	assert_eq!(by_id("e-b").unit, "households");
	assert_eq!(by_id("e-w-1").citation, "CEA 2023");
	assert_eq!(by_id("e-h").citation, "N/A");
}

#[test]
fn test_sankey_follows_root_flows() {
	let doc = end_use();
	let layout = SankeyLayout::for_root(&doc, &SankeyConfig::default());
	let mut links: Vec<usize> = layout.links.iter().map(|l| l.link).collect();
	links.sort_unstable();
	assert_eq!(links, vec![0, 3, 6]);
	assert_eq!(layout.nodes.len(), 4);
	assert_eq!(layout.columns, 2);
}

#[test]
fn test_chord_skips_isolated_span() {
	let doc = end_use();
	let layout = ChordLayout::new(&doc, &ChordConfig::default());
	assert_eq!(layout.groups.len(), 6);
	let finance = layout.groups[5];
	assert_eq!(finance.end_angle - finance.start_angle, 0.0);
}

#[test]
fn test_every_graph_view_builds() {
	let doc = end_use();
	let config = DashboardConfig::default();
	for mode in [ViewMode::Radial, ViewMode::Force, ViewMode::Chord, ViewMode::Sankey] {
		let scene = Scene::build(mode, &doc, &config, Some("energy"));
		assert!(scene.is_some(), "{} view", mode.as_str());
	}
	assert!(Scene::build(ViewMode::Table, &doc, &config, None).is_none());
}

#[test]
fn test_catalog_browsing_flow() {
	let catalog = Catalog::from_json(CATALOG).unwrap();
	let mut state = CatalogState::new(ViewMode::Radial, false);
	let effects = state.dispatch(CatalogIntent::Loaded(catalog));
	let Some(Effect::FetchMap { map_id, url }) = effects.first() else {
		panic!("expected a fetch, got {effects:?}");
	};
	assert_eq!(map_id, "energy-end-use");
	assert_eq!(url, "/data/maps/energy-end-use.json");

	state.dispatch(CatalogIntent::MapLoaded {
		map_id: map_id.clone(),
		document: end_use(),
	});
	assert_eq!(state.central_node(), Some("energy"));
	let visible = state.visibility().unwrap();
	assert!(!visible.link(5), "indirect hidden by default");
	assert_eq!(visible.visible_link_count(), 6);

	state.dispatch(CatalogIntent::SelectSector("water".to_string()));
	assert_eq!(state.map_options().len(), 1);
	assert_eq!(state.map_options()[0].label, "🚿 Irrigation Efficiency - 0 Direct, 0 Indirect");
}
