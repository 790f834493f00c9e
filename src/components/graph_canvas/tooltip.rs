//! Hover tooltip: one fixed-position element per mounted view, appended to
//! the document body and removed again on drop.

use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use crate::error::{DashboardError, Result};
use crate::model::GraphDocument;
use crate::scene::{Hit, ViewMode};
use crate::table::extract_magnitude;

/// Offset from the pointer, in CSS pixels.
const OFFSET: f64 = 12.0;

pub struct Tooltip {
	element: HtmlElement,
}

impl Tooltip {
	pub fn mount(view: ViewMode) -> Result<Self> {
		let document = web_sys::window()
			.and_then(|w| w.document())
			.ok_or_else(|| DashboardError::Browser("no document".to_string()))?;
		let body = document
			.body()
			.ok_or_else(|| DashboardError::MissingContainer("body".to_string()))?;
		let element: HtmlElement = document
			.create_element("div")
			.map_err(|e| DashboardError::Browser(format!("{e:?}")))?
			.dyn_into()
			.map_err(|_| DashboardError::Browser("tooltip is not an HtmlElement".to_string()))?;
		element.set_class_name(&format!("graph-tooltip graph-tooltip-{}", view.as_str()));
		let style = element.style();
		let _ = style.set_property("position", "fixed");
		let _ = style.set_property("pointer-events", "none");
		let _ = style.set_property("opacity", "0");
		body.append_child(&element)
			.map_err(|e| DashboardError::Browser(format!("{e:?}")))?;
		Ok(Self { element })
	}

	pub fn show(&self, html: &str, client_x: f64, client_y: f64) {
		self.element.set_inner_html(html);
		let style = self.element.style();
		let _ = style.set_property("left", &format!("{}px", client_x + OFFSET));
		let _ = style.set_property("top", &format!("{}px", client_y + OFFSET));
		let _ = style.set_property("opacity", "1");
	}

	pub fn hide(&self) {
		let _ = self.element.style().set_property("opacity", "0");
	}
}

impl Drop for Tooltip {
	fn drop(&mut self) {
		self.element.remove();
	}
}

fn escape(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#39;"),
			_ => out.push(c),
		}
	}
	out
}

/// Tooltip markup for a hovered node or link.
pub fn tooltip_html(doc: &GraphDocument, hit: Hit) -> String {
	match hit {
		Hit::Node(i) => {
			let node = &doc.nodes[i];
			let mut html = format!("<strong>{}</strong>", escape(node.display_label()));
			if !node.description.is_empty() {
				html.push_str(&format!("<div class=\"tooltip-description\">{}</div>", escape(&node.description)));
			}
			html
		}
		Hit::Link(i) => {
			let link = &doc.links[i];
			let label = |id: &str| {
				doc.nodes
					.iter()
					.find(|n| n.id == id)
					.map_or_else(|| id.to_string(), |n| n.display_label().to_string())
			};
			let mut html = format!(
				"<strong>{} → {}</strong>\
				<div class=\"tooltip-badges\">\
				<span class=\"badge\" style=\"background:{}\">{}</span>\
				<span class=\"badge\" style=\"background:{}\">{}</span></div>",
				escape(&label(&link.source)),
				escape(&label(&link.target)),
				escape(doc.type_color(link.link_type)),
				link.link_type,
				escape(doc.layer_color(link.layer)),
				link.layer,
			);
			if !link.quantification.is_empty() {
				html.push_str(&format!("<div>{}</div>", escape(&link.quantification)));
			}
			if !link.citation.is_empty() {
				html.push_str(&format!("<div class=\"tooltip-citation\">{}</div>", escape(&link.citation)));
			}
			let magnitude = if link.value != 0.0 {
				link.value
			} else {
				extract_magnitude(&link.quantification)
			};
			html.push_str(&format!("<div>Magnitude: {magnitude}</div>"));
			html
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn doc() -> GraphDocument {
		GraphDocument::from_json(
			r##"{
				"nodes": [
					{"id": "solar", "label": "Solar <Pumps>", "description": "Farm pumps"},
					{"id": "drip", "label": "Drip"}
				],
				"links": [
					{"source": "solar", "target": "drip", "type": "synergy", "layer": "technical",
					 "quantification": "30% less water", "citation": "CEEW 2021"}
				],
				"typeColors": {"synergy": "#2e7d32"}
			}"##,
		)
		.unwrap()
	}

	#[test]
	fn test_node_tooltip_escapes_label() {
		let html = tooltip_html(&doc(), Hit::Node(0));
		assert!(html.contains("Solar &lt;Pumps&gt;"));
		assert!(html.contains("Farm pumps"));
	}

	#[test]
	fn test_link_tooltip_sections() {
		let html = tooltip_html(&doc(), Hit::Link(0));
		assert!(html.contains("Solar &lt;Pumps&gt; → Drip"));
		assert!(html.contains("#2e7d32"));
		assert!(html.contains(">Synergy<"));
		assert!(html.contains(">Technical<"));
		assert!(html.contains("CEEW 2021"));
		assert!(html.contains("Magnitude: 30"));
	}
}
