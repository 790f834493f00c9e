use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Urgency bucket of a catalog map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
	Urgent,
	High,
	Medium,
	Foundational,
	#[serde(other)]
	Other,
}

impl Priority {
	/// Priorities offered in the selector, in display order.
	pub const ALL: [Priority; 4] = [
		Priority::Urgent,
		Priority::High,
		Priority::Medium,
		Priority::Foundational,
	];

	/// Wire name.
	pub fn as_str(self) -> &'static str {
		match self {
			Priority::Urgent => "urgent",
			Priority::High => "high",
			Priority::Medium => "medium",
			Priority::Foundational => "foundational",
			Priority::Other => "other",
		}
	}

	/// Selector label prefix.
	pub fn label(self) -> &'static str {
		match self {
			Priority::Urgent => "🔴 Urgent",
			Priority::High => "🟠 High",
			Priority::Medium => "🟡 Medium",
			Priority::Foundational => "🟢 Foundational",
			Priority::Other => "Other",
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sector {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub icon: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapStats {
	#[serde(default)]
	pub direct_relationships: u32,
	#[serde(default)]
	pub indirect_relationships: u32,
}

/// One relationship map the dashboard can load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapEntry {
	pub id: String,
	pub sector_id: String,
	pub title: String,
	#[serde(default = "default_priority")]
	pub priority: Priority,
	pub data_file: String,
	#[serde(default)]
	pub emoji: String,
	#[serde(default)]
	pub stats: MapStats,
}

fn default_priority() -> Priority {
	Priority::Medium
}

/// Which document to load for a sector/priority selection. Read-only after load.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
	#[serde(default)]
	pub sectors: Vec<Sector>,
	#[serde(default)]
	pub maps: Vec<MapEntry>,
}

impl Catalog {
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}

	pub fn sector(&self, id: &str) -> Option<&Sector> {
		self.sectors.iter().find(|s| s.id == id)
	}

	pub fn map(&self, id: &str) -> Option<&MapEntry> {
		self.maps.iter().find(|m| m.id == id)
	}

	/// Maps of a sector, optionally narrowed to one priority, in catalog order.
	pub fn maps_for(&self, sector_id: &str, priority: Option<Priority>) -> Vec<&MapEntry> {
		self.maps
			.iter()
			.filter(|m| m.sector_id == sector_id)
			.filter(|m| priority.is_none_or(|p| m.priority == p))
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_maps_for_sector_and_priority() {
		let catalog = Catalog::from_json(
			r#"{
				"sectors": [{"id": "energy", "name": "Energy", "icon": "⚡"}],
				"maps": [
					{"id": "end-use", "sectorId": "energy", "title": "End-Use", "priority": "urgent", "dataFile": "/a.json"},
					{"id": "battery", "sectorId": "energy", "title": "Battery", "priority": "high", "dataFile": "/b.json"},
					{"id": "drip", "sectorId": "water", "title": "Drip", "priority": "urgent", "dataFile": "/c.json"}
				]
			}"#,
		)
		.unwrap();

		assert_eq!(catalog.maps_for("energy", None).len(), 2);
		let urgent = catalog.maps_for("energy", Some(Priority::Urgent));
		assert_eq!(urgent.len(), 1);
		assert_eq!(urgent[0].id, "end-use");
		assert_eq!(catalog.map("battery").unwrap().stats, MapStats::default());
	}
}
