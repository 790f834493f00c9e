//! Form controls and side panels shared by both pages.

use std::sync::Arc;

use leptos::prelude::*;

use crate::aggregate::NodeDetails;
use crate::controller::{Notice, SelectOption};
use crate::model::{GraphDocument, LinkType};
use crate::scene::ViewMode;

#[component]
pub fn SelectControl(
	label: &'static str,
	#[prop(into)] options: Signal<Vec<SelectOption>>,
	#[prop(into)] selected: Signal<String>,
	on_change: Callback<String>,
) -> impl IntoView {
	view! {
		<label class="select-control">
			<span>{label}</span>
			<select
				prop:value=move || selected.get()
				on:change=move |ev| on_change.run(event_target_value(&ev))
			>
				{move || {
					options
						.get()
						.into_iter()
						.map(|o| {
							let value = o.value.clone();
							view! {
								<option value=o.value selected=move || selected.get() == value>
									{o.label}
								</option>
							}
						})
						.collect_view()
				}}
			</select>
		</label>
	}
}

/// Row of toggle buttons; the active one carries the `active` class.
#[component]
pub fn ButtonGroup(
	#[prop(into)] options: Signal<Vec<SelectOption>>,
	#[prop(into)] active: Signal<String>,
	on_select: Callback<String>,
	#[prop(optional)] class: &'static str,
) -> impl IntoView {
	view! {
		<div class=format!("button-group {class}")>
			{move || {
				options
					.get()
					.into_iter()
					.map(|o| {
						let value = o.value.clone();
						let is_active = {
							let value = value.clone();
							move || active.get() == value
						};
						view! {
							<button
								class:active=is_active
								on:click=move |_| on_select.run(value.clone())
							>
								{o.label}
							</button>
						}
					})
					.collect_view()
			}}
		</div>
	}
}

#[component]
pub fn ViewSwitch(
	modes: &'static [ViewMode],
	#[prop(into)] current: Signal<ViewMode>,
	on_select: Callback<ViewMode>,
) -> impl IntoView {
	let options = Signal::derive(move || {
		modes
			.iter()
			.map(|m| SelectOption {
				value: m.as_str().to_string(),
				label: m.label().to_string(),
			})
			.collect::<Vec<_>>()
	});
	let active = Signal::derive(move || current.get().as_str().to_string());
	let on_mode = Callback::new(move |value: String| {
		if let Some(mode) = ViewMode::parse(&value) {
			on_select.run(mode);
		}
	});
	view! { <ButtonGroup options=options active=active on_select=on_mode class="view-switch" /> }
}

/// Per-type legend with link counts and mean values.
#[component]
pub fn Legend(
	#[prop(into)] rows: Signal<Vec<(LinkType, String, String)>>,
	#[prop(into)] document: Signal<Option<Arc<GraphDocument>>>,
) -> impl IntoView {
	view! {
		<ul class="legend">
			{move || {
				let doc = document.get();
				rows.get()
					.into_iter()
					.map(|(link_type, count, mean)| {
						let color = doc
							.as_ref()
							.map(|d| d.type_color(link_type).to_string())
							.unwrap_or_default();
						view! {
							<li class=format!("legend-item legend-{}", link_type.as_str())>
								<span class="legend-swatch" style=format!("background: {color}")></span>
								<span class="legend-label">{link_type.to_string()}</span>
								<span class="legend-count">{count}</span>
								<span class="legend-mean">{mean}</span>
							</li>
						}
					})
					.collect_view()
			}}
		</ul>
	}
}

#[component]
pub fn NoticeBanner(#[prop(into)] notice: Signal<Option<Notice>>) -> impl IntoView {
	move || {
		notice.get().map(|n| {
			let class = match n {
				Notice::LoadFailed { .. } => "notice notice-error",
				_ => "notice",
			};
			view! { <div class=class>{n.message()}</div> }
		})
	}
}

/// Selected node with its visible incident links.
#[component]
pub fn DetailsPanel(#[prop(into)] details: Signal<Option<NodeDetails>>) -> impl IntoView {
	move || {
		details.get().map(|d| {
			let status = (!d.current_status.is_empty())
				.then(|| view! { <p class="details-status">"Current status: " {d.current_status.clone()}</p> });
			let edges = if d.edges.is_empty() {
				view! { <p class="details-empty">"No visible connections."</p> }.into_any()
			} else {
				view! {
					<ul class="details-edges">
						{d
							.edges
							.iter()
							.map(|e| {
								view! {
									<li>
										<strong>{e.arrow()} " " {e.other_label.clone()}</strong>
										<p>{e.description.clone()}</p>
										<p class="details-quantification">{e.quantification.clone()}</p>
									</li>
								}
							})
							.collect_view()}
					</ul>
				}
					.into_any()
			};
			view! {
				<aside class="details-panel">
					<h3>{d.label.clone()}</h3>
					<p class="details-layer">"Layer: " {d.layer.clone()}</p>
					<p>{d.description.clone()}</p>
					{status}
					<h4>"Connections"</h4>
					{edges}
				</aside>
			}
		})
	}
}
