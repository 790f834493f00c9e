//! Dashboard settings. Every field has a default so a partial JSON override
//! deserializes.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::layout::chord::ChordConfig;
use crate::layout::force::ForceConfig;
use crate::layout::radial::RadialOptions;
use crate::layout::sankey::SankeyConfig;
use crate::scene::ViewMode;

/// Where the optional override file is served from.
pub const CONFIG_URL: &str = "/data/dashboard-config.json";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardConfig {
	/// Catalog of sectors and maps.
	pub catalog_url: String,
	/// Multi-sector document for the sector explorer.
	pub explorer_url: String,
	/// Scenario applied when the explorer opens.
	pub default_scenario: String,
	/// Scenario the quantification table is restricted to.
	pub table_scenario: String,
	pub default_view: ViewMode,
	/// Whether `indirect` links start visible in the catalog views.
	pub show_indirect: bool,
	pub radial: RadialOptions,
	pub force: ForceConfig,
	pub sankey: SankeyConfig,
	pub chord: ChordConfig,
}

impl Default for DashboardConfig {
	fn default() -> Self {
		Self {
			catalog_url: "/data/systems-map.json".to_string(),
			explorer_url: "/data/systems-map-explorer.json".to_string(),
			default_scenario: "postShift".to_string(),
			table_scenario: "postShift".to_string(),
			default_view: ViewMode::Radial,
			show_indirect: false,
			radial: RadialOptions::default(),
			force: ForceConfig::default(),
			sankey: SankeyConfig::default(),
			chord: ChordConfig::default(),
		}
	}
}

impl DashboardConfig {
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_partial_override_keeps_defaults() {
		let config = DashboardConfig::from_json(
			r#"{"defaultView": "force", "radial": {"radius": 300}, "sankey": {"root": "water"}}"#,
		)
		.unwrap();
		assert_eq!(config.default_view, ViewMode::Force);
		assert_eq!(config.radial.radius, 300.0);
		assert_eq!(config.radial.central_radius, 45.0);
		assert_eq!(config.sankey.root, "water");
		assert_eq!(config.sankey.node_width, 20.0);
		assert_eq!(config.force.link_distance, 250.0);
		assert_eq!(config.default_scenario, "postShift");
	}

	#[test]
	fn test_malformed_config_is_an_error() {
		assert!(DashboardConfig::from_json("{\"radial\": 3}").is_err());
	}
}
