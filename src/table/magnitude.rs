//! Best-effort magnitude extraction from free-text quantification.
//!
//! This is a heuristic. Only the documented shapes are recognised; anything
//! else (`"2x increase"`, written-out numbers) yields 0.

use std::sync::LazyLock;

use regex::Regex;

/// `15% → 80%`, `15 → 80%`
static ARROW_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)%?\s*→\s*(\d+(?:\.\d+)?)%").unwrap());

/// `15-20%`
static RANGE_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*-\s*(\d+(?:\.\d+)?)%").unwrap());

/// `40%`
static PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)%").unwrap());

/// `50L households`, `100 cities`
static ABSOLUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(\d+)[LMK]?\s+(?:households|cities|stations|collectors)").unwrap()
});

/// Words that mark a relationship as real but unmeasured.
const QUALITATIVE_MARKERS: [&str; 4] = ["target", "potential", "enables", "visibility"];

/// Magnitude given to qualitative text so it stays visible when sorted.
pub const QUALITATIVE_MAGNITUDE: f64 = 10.0;

const UNITS: [&str; 4] = ["households", "cities", "stations", "collectors"];

fn number(caps: &regex::Captures<'_>, group: usize) -> Option<f64> {
	caps.get(group)?.as_str().parse().ok()
}

/// Extracts a scalar magnitude.
///
/// Patterns are tried in order: arrow transition (the delta), range (the
/// rounded mean of the bounds), plain percentage, absolute count with a
/// known unit, then qualitative markers. Unmatched text yields 0.
pub fn extract_magnitude(text: &str) -> f64 {
	if text.is_empty() {
		return 0.0;
	}
	if let Some(caps) = ARROW_RE.captures(text)
		&& let (Some(from), Some(to)) = (number(&caps, 1), number(&caps, 2))
	{
		return to - from;
	}
	if let Some(caps) = RANGE_RE.captures(text)
		&& let (Some(lo), Some(hi)) = (number(&caps, 1), number(&caps, 2))
	{
		return ((lo + hi) / 2.0).round();
	}
	if let Some(value) = PERCENT_RE.captures(text).and_then(|c| number(&c, 1)) {
		return value;
	}
	if let Some(value) = ABSOLUTE_RE.captures(text).and_then(|c| number(&c, 1)) {
		return value;
	}
	let lower = text.to_lowercase();
	if QUALITATIVE_MARKERS.iter().any(|m| lower.contains(m)) {
		return QUALITATIVE_MAGNITUDE;
	}
	0.0
}

/// Unit shown next to an extracted magnitude, or `""`.
pub fn extract_unit(text: &str) -> &'static str {
	if text.contains('%') {
		return "%";
	}
	UNITS.into_iter().find(|u| text.contains(u)).unwrap_or("")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_documented_shapes() {
		assert_eq!(extract_magnitude("15% → 80%"), 65.0);
		assert_eq!(extract_magnitude("15%→80%"), 65.0);
		assert_eq!(extract_magnitude("30-40%"), 35.0);
		assert_eq!(extract_magnitude("15-20% reduction"), 18.0);
		assert_eq!(extract_magnitude("40% less diesel use"), 40.0);
		assert_eq!(extract_magnitude("covers 50L households"), 50.0);
		assert_eq!(extract_magnitude("100 cities by 2030"), 100.0);
	}

	#[test]
	fn test_qualitative_and_unmatched() {
		assert_eq!(extract_magnitude("enables future monitoring"), 10.0);
		assert_eq!(extract_magnitude("National Target set"), 10.0);
		assert_eq!(extract_magnitude("no numbers here"), 0.0);
		assert_eq!(extract_magnitude("2x increase"), 0.0);
		assert_eq!(extract_magnitude(""), 0.0);
	}

	#[test]
	fn test_units() {
		assert_eq!(extract_unit("30-40%"), "%");
		assert_eq!(extract_unit("500 stations"), "stations");
		assert_eq!(extract_unit("enables monitoring"), "");
	}
}
