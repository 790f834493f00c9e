use std::collections::BTreeMap;

use crate::model::{Layer, Link, LinkType};

/// Count and total of link values in one group.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Summary {
	pub count: usize,
	pub total: f64,
}

impl Summary {
	pub fn add(&mut self, value: f64) {
		self.count += 1;
		self.total += value;
	}

	/// Arithmetic mean; zero for an empty group.
	pub fn mean(&self) -> f64 {
		if self.count == 0 { 0.0 } else { self.total / self.count as f64 }
	}

	/// Mean with one decimal place, `"0.0"` for an empty group.
	pub fn mean_display(&self) -> String {
		format!("{:.1}", self.mean())
	}
}

/// Groups `links` by `key` and summarizes each group.
pub fn summarize<'a, K, I, F>(links: I, key: F) -> BTreeMap<K, Summary>
where
	K: Ord,
	I: IntoIterator<Item = &'a Link>,
	F: Fn(&Link) -> K,
{
	let mut groups: BTreeMap<K, Summary> = BTreeMap::new();
	for link in links {
		groups.entry(key(link)).or_default().add(link.value);
	}
	groups
}

/// Summaries for every legend type in legend order, including empty ones.
pub fn legend_summaries<'a, I>(links: I) -> Vec<(LinkType, Summary)>
where
	I: IntoIterator<Item = &'a Link>,
{
	let groups = summarize(links, |l| l.link_type);
	LinkType::LEGEND
		.iter()
		.map(|t| (*t, groups.get(t).copied().unwrap_or_default()))
		.collect()
}

/// Summaries per link layer.
pub fn layer_summaries<'a, I>(links: I) -> BTreeMap<Layer, Summary>
where
	I: IntoIterator<Item = &'a Link>,
{
	summarize(links, |l| l.layer)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::GraphDocument;

	fn doc() -> GraphDocument {
		GraphDocument::from_json(
			r#"{
				"nodes": [],
				"links": [
					{"source": "a", "target": "b", "type": "synergy", "layer": "technical", "value": 40},
					{"source": "a", "target": "c", "type": "synergy", "layer": "community", "value": 25},
					{"source": "b", "target": "c", "type": "conflict", "layer": "technical", "value": 33}
				]
			}"#,
		)
		.unwrap()
	}

	#[test]
	fn test_empty_group_mean_is_zero() {
		let d = doc();
		let stats = legend_summaries(&d.links);
		let cascade = stats.iter().find(|(t, _)| *t == LinkType::Cascade).unwrap().1;
		assert_eq!(cascade.count, 0);
		assert_eq!(cascade.mean_display(), "0.0");
		assert!(!cascade.mean().is_nan());
	}

	#[test]
	fn test_mean_one_decimal() {
		let d = doc();
		let stats = legend_summaries(&d.links);
		assert_eq!(stats.len(), 5);
		assert_eq!(stats[0].0, LinkType::Synergy);
		assert_eq!(stats[0].1.count, 2);
		assert_eq!(stats[0].1.mean_display(), "32.5");
		assert_eq!(stats[1].1.mean_display(), "33.0");
	}

	#[test]
	fn test_layer_summaries() {
		let d = doc();
		let layers = layer_summaries(&d.links);
		assert_eq!(layers[&Layer::Technical].count, 2);
		assert_eq!(layers[&Layer::Community].total, 25.0);
		assert!(!layers.contains_key(&Layer::Governance));
	}
}
