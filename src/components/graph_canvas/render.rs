use std::f64::consts::{FRAC_PI_2, PI};

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::CanvasState;
use crate::interaction::Emphasis;
use crate::layout::Point;
use crate::layout::chord::ChordLayout;
use crate::layout::force::ForceLayoutEngine;
use crate::layout::radial::RadialLayout;
use crate::layout::sankey::SankeyLayout;
use crate::model::GraphDocument;
use crate::scene::Scene;

const BACKGROUND: &str = "#f8fafc";
const NODE_FALLBACK: &str = "#64748b";
const LABEL_COLOR: &str = "#1f2937";

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let view = state.controller.view;
	let _ = ctx.translate(view.x, view.y);
	let _ = ctx.scale(view.k, view.k);
	match &state.scene {
		Scene::Radial(layout) => draw_radial(state, layout, ctx),
		Scene::Force(engine) => draw_force(state, engine, ctx),
		Scene::Chord(layout) => draw_chord(state, layout, ctx),
		Scene::Sankey(layout) => draw_sankey(state, layout, ctx),
	}
	ctx.restore();
	if let Scene::Sankey(layout) = &state.scene
		&& layout.is_empty()
	{
		ctx.set_fill_style_str(LABEL_COLOR);
		ctx.set_font("14px sans-serif");
		ctx.set_text_align("center");
		let _ = ctx.fill_text("No flow data for this map", state.width / 2.0, state.height / 2.0);
	}
}

fn node_fill(doc: &GraphDocument, node: usize) -> &str {
	let node = &doc.nodes[node];
	if !node.color.is_empty() {
		&node.color
	} else if let Some(layer) = node.layer {
		doc.layer_color(layer)
	} else {
		NODE_FALLBACK
	}
}

fn set_dash(ctx: &CanvasRenderingContext2d, pattern: &[f64]) {
	let array = js_sys::Array::new();
	for v in pattern {
		array.push(&JsValue::from_f64(*v));
	}
	let _ = ctx.set_line_dash(&array);
}

/// Stroke width after emphasis, growing with the eased fade.
fn emphasized_width(base: f64, emphasis: Emphasis, t: f64) -> f64 {
	match emphasis {
		Emphasis::Highlighted => base * (1.0 + 0.3 * t),
		Emphasis::Dimmed => base * (1.0 - 0.3 * t),
		Emphasis::Normal => base,
	}
}

/// Draws a possibly multi-line label centered on `x`, first baseline at `y`.
fn draw_label(ctx: &CanvasRenderingContext2d, text: &str, x: f64, y: f64, size: f64) {
	ctx.set_font(&format!("{size}px sans-serif"));
	for (i, line) in text.lines().enumerate() {
		let _ = ctx.fill_text(line, x, y + i as f64 * size * 1.2);
	}
}

fn draw_node(state: &CanvasState, ctx: &CanvasRenderingContext2d, node: usize, p: Point, radius: f64) {
	let highlight = &state.controller.highlight;
	let emphasis = highlight.node(node);
	let t = ease_out_cubic(highlight.t);
	let k = state.controller.view.k;
	let radius = match emphasis {
		Emphasis::Highlighted => radius * (1.0 + 0.15 * t),
		_ => radius,
	};

	if emphasis == Emphasis::Highlighted
		&& t > 0.01
		&& let Ok(gradient) = ctx.create_radial_gradient(p.x, p.y, radius * 0.3, p.x, p.y, radius * (1.4 + 0.6 * t))
	{
		let alpha = 0.25 * t;
		let _ = gradient.add_color_stop(0.0, &format!("rgba(37, 99, 235, {alpha})"));
		let _ = gradient.add_color_stop(1.0, "rgba(37, 99, 235, 0)");
		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, radius * (1.4 + 0.6 * t), 0.0, 2.0 * PI);
		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
		ctx.fill();
	}

	ctx.set_global_alpha(highlight.alpha(emphasis));
	ctx.begin_path();
	let _ = ctx.arc(p.x, p.y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(node_fill(&state.document, node));
	ctx.fill();
	ctx.set_stroke_style_str("#ffffff");
	ctx.set_line_width(2.0 / k);
	ctx.stroke();

	ctx.set_fill_style_str(LABEL_COLOR);
	ctx.set_text_align("center");
	let label = state.document.nodes[node].display_label();
	draw_label(ctx, label, p.x, p.y + radius + 14.0 / k.max(0.5), 12.0 / k.max(0.5));
	ctx.set_global_alpha(1.0);
}

fn draw_radial(state: &CanvasState, layout: &RadialLayout, ctx: &CanvasRenderingContext2d) {
	let doc = &state.document;
	let highlight = &state.controller.highlight;
	let t = ease_out_cubic(highlight.t);

	for arc in &layout.arcs {
		if !state.visibility.link(arc.link) {
			continue;
		}
		let emphasis = highlight.link(arc.link);
		let geometry = arc.geometry();
		ctx.set_global_alpha(0.8 * highlight.alpha(emphasis));
		ctx.set_stroke_style_str(doc.type_color(arc.link_type));
		ctx.set_line_width(emphasized_width(arc.stroke_width, emphasis, t));
		set_dash(ctx, if arc.dashed { &[6.0, 4.0] } else { &[] });
		ctx.begin_path();
		let _ = ctx.arc_with_anticlockwise(
			geometry.center.x,
			geometry.center.y,
			geometry.radius,
			geometry.start_angle,
			geometry.end_angle(),
			geometry.delta < 0.0,
		);
		ctx.stroke();
	}
	set_dash(ctx, &[]);
	ctx.set_global_alpha(1.0);

	for node in &layout.nodes {
		if state.visibility.node(node.node) {
			draw_node(state, ctx, node.node, node.position, node.radius);
		}
	}
}

fn draw_force(state: &CanvasState, engine: &ForceLayoutEngine, ctx: &CanvasRenderingContext2d) {
	let doc = &state.document;
	let highlight = &state.controller.highlight;
	let t = ease_out_cubic(highlight.t);
	let k = state.controller.view.k;
	let positions = engine.positions();
	let (dash, gap, arrow_size) = (8.0 / k, 4.0 / k, 8.0 / k);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);

	for fl in engine.links() {
		if !state.visibility.link(fl.link) {
			continue;
		}
		let link = &doc.links[fl.link];
		let (from, to) = (positions[fl.source], positions[fl.target]);
		let (dx, dy) = (to.x - from.x, to.y - from.y);
		let dist = dx.hypot(dy);
		if dist < 0.001 {
			continue;
		}
		let (r1, r2) = (engine.radius(fl.source), engine.radius(fl.target));
		let (ux, uy) = (dx / dist, dy / dist);
		let emphasis = highlight.link(fl.link);
		let color = doc.type_color(link.link_type);

		ctx.set_global_alpha(0.8 * highlight.alpha(emphasis));
		ctx.set_stroke_style_str(color);
		ctx.set_line_width(emphasized_width((link.value / 12.0).max(2.0), emphasis, t));
		if link.is_dashed() {
			set_dash(ctx, &[dash, gap]);
			ctx.set_line_dash_offset(dash_offset);
		} else {
			set_dash(ctx, &[]);
		}
		ctx.begin_path();
		ctx.move_to(from.x + ux * r1, from.y + uy * r1);
		ctx.line_to(to.x - ux * (r2 + arrow_size), to.y - uy * (r2 + arrow_size));
		ctx.stroke();

		set_dash(ctx, &[]);
		ctx.set_fill_style_str(color);
		let (tip_x, tip_y) = (to.x - ux * r2, to.y - uy * r2);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
	set_dash(ctx, &[]);
	ctx.set_global_alpha(1.0);

	for (i, p) in positions.iter().enumerate() {
		if state.visibility.node(i) {
			draw_node(state, ctx, i, *p, engine.radius(i));
		}
	}
}

fn draw_chord(state: &CanvasState, layout: &ChordLayout, ctx: &CanvasRenderingContext2d) {
	let doc = &state.document;
	let highlight = &state.controller.highlight;
	let k = state.controller.view.k;
	let c = layout.center;
	let r = layout.inner_radius;

	for chord in &layout.chords {
		let link = layout.ribbon_link(chord);
		if link.is_some_and(|l| !state.visibility.link(l)) {
			continue;
		}
		let emphasis = link.map_or(Emphasis::Normal, |l| highlight.link(l));
		let color = link.map_or(NODE_FALLBACK, |l| doc.type_color(doc.links[l].link_type));
		let (s, e) = (chord.source, chord.target);
		let target_start = layout.point_at(e.start_angle, r);
		let source_start = layout.point_at(s.start_angle, r);

		ctx.set_global_alpha(0.6 * highlight.alpha(emphasis));
		ctx.set_fill_style_str(color);
		ctx.begin_path();
		let _ = ctx.arc(c.x, c.y, r, s.start_angle - FRAC_PI_2, s.end_angle - FRAC_PI_2);
		ctx.quadratic_curve_to(c.x, c.y, target_start.x, target_start.y);
		let _ = ctx.arc(c.x, c.y, r, e.start_angle - FRAC_PI_2, e.end_angle - FRAC_PI_2);
		ctx.quadratic_curve_to(c.x, c.y, source_start.x, source_start.y);
		ctx.close_path();
		ctx.fill();
	}

	for group in &layout.groups {
		if group.end_angle <= group.start_angle {
			continue;
		}
		let (a0, a1) = (group.start_angle - FRAC_PI_2, group.end_angle - FRAC_PI_2);
		ctx.set_global_alpha(highlight.alpha(highlight.node(group.index)));
		ctx.set_fill_style_str(node_fill(doc, group.index));
		ctx.begin_path();
		let _ = ctx.arc(c.x, c.y, layout.outer_radius, a0, a1);
		let _ = ctx.arc_with_anticlockwise(c.x, c.y, layout.inner_radius, a1, a0, true);
		ctx.close_path();
		ctx.fill();

		let mid = group.mid_angle();
		let p = layout.point_at(mid, layout.outer_radius + 10.0);
		ctx.set_fill_style_str(LABEL_COLOR);
		ctx.set_text_align(if mid > PI { "right" } else { "left" });
		draw_label(ctx, doc.nodes[group.index].display_label(), p.x, p.y, 12.0 / k.max(0.5));
	}
	ctx.set_global_alpha(1.0);
}

fn draw_sankey(state: &CanvasState, layout: &SankeyLayout, ctx: &CanvasRenderingContext2d) {
	let doc = &state.document;
	let highlight = &state.controller.highlight;
	let k = state.controller.view.k;

	for band in &layout.links {
		if !state.visibility.link(band.link) {
			continue;
		}
		let emphasis = highlight.link(band.link);
		let [p0, p1, p2, p3] = band.curve();
		ctx.set_global_alpha(0.4 * highlight.alpha(emphasis));
		ctx.set_stroke_style_str(doc.type_color(doc.links[band.link].link_type));
		ctx.set_line_width(band.width.max(1.0));
		ctx.begin_path();
		ctx.move_to(p0.x, p0.y);
		ctx.bezier_curve_to(p1.x, p1.y, p2.x, p2.y, p3.x, p3.y);
		ctx.stroke();
	}

	let last_column = layout.columns.saturating_sub(1);
	for node in &layout.nodes {
		ctx.set_global_alpha(highlight.alpha(highlight.node(node.node)));
		ctx.set_fill_style_str(node_fill(doc, node.node));
		ctx.fill_rect(node.x0, node.y0, node.x1 - node.x0, node.y1 - node.y0);

		let y = (node.y0 + node.y1) / 2.0 + 4.0;
		ctx.set_fill_style_str(LABEL_COLOR);
		let label = doc.nodes[node.node].display_label();
		if node.column == last_column && last_column > 0 {
			ctx.set_text_align("right");
			draw_label(ctx, label, node.x0 - 6.0, y, 12.0 / k.max(0.5));
		} else {
			ctx.set_text_align("left");
			draw_label(ctx, label, node.x1 + 6.0, y, 12.0 / k.max(0.5));
		}
	}
	ctx.set_global_alpha(1.0);
}
