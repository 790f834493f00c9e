use leptos::prelude::*;

use crate::controller::TableIntent;
use crate::model::{Layer, LinkType};
use crate::table::{SortColumn, TableProjection};

/// Sortable, searchable table of links.
#[component]
pub fn LinkTable(
	#[prop(into)] table: Signal<Option<TableProjection>>,
	on_intent: Callback<TableIntent>,
) -> impl IntoView {
	let headers = move || {
		let sort = table.with(|t| t.as_ref().map(|t| t.sort));
		SortColumn::ALL
			.into_iter()
			.map(|column| {
				let arrow = sort
					.filter(|s| s.column == column)
					.map(|s| s.direction.arrow())
					.unwrap_or("");
				view! {
					<th class="sortable" on:click=move |_| on_intent.run(TableIntent::SortBy(column))>
						{column.header()} " " {arrow}
					</th>
				}
			})
			.collect_view()
	};

	let type_toggles = move || {
		let selected = table.with(|t| t.as_ref().map(|t| t.query.types.clone()).unwrap_or_default());
		LinkType::LEGEND
			.into_iter()
			.map(|link_type| {
				view! {
					<label class="table-toggle">
						<input
							type="checkbox"
							prop:checked=selected.contains(&link_type)
							on:change=move |_| on_intent.run(TableIntent::ToggleType(link_type))
						/>
						{link_type.to_string()}
					</label>
				}
			})
			.collect_view()
	};

	let layer_toggles = move || {
		let selected = table.with(|t| t.as_ref().map(|t| t.query.layers.clone()).unwrap_or_default());
		[Layer::Governance, Layer::Community, Layer::Technical, Layer::Conditional, Layer::Shared]
			.into_iter()
			.map(|layer| {
				view! {
					<label class="table-toggle">
						<input
							type="checkbox"
							prop:checked=selected.contains(&layer)
							on:change=move |_| on_intent.run(TableIntent::ToggleLayer(layer))
						/>
						{layer.to_string()}
					</label>
				}
			})
			.collect_view()
	};

	let body = move || {
		table.with(|t| {
			let Some(t) = t else {
				return view! { <tr><td colspan="7">"Loading..."</td></tr> }.into_any();
			};
			if let Some(message) = t.empty_message() {
				return view! { <tr><td colspan="7" class="table-empty">{message}</td></tr> }.into_any();
			}
			t.apply_filters()
				.into_iter()
				.map(|row| {
					let magnitude = if row.unit.is_empty() {
						format!("{}", row.magnitude)
					} else {
						format!("{} {}", row.magnitude, row.unit)
					};
					view! {
						<tr class=format!("row-{}", row.link_type.as_str())>
							<td>{row.source.clone()}</td>
							<td>{row.target.clone()}</td>
							<td>{row.link_type.to_string()}</td>
							<td>{row.layer.to_string()}</td>
							<td class="magnitude">{magnitude}</td>
							<td>{row.quantification.clone()}</td>
							<td class="citation">{row.citation.clone()}</td>
						</tr>
					}
				})
				.collect_view()
				.into_any()
		})
	};

	view! {
		<div class="link-table">
			<div class="table-filters">
				<input
					type="search"
					placeholder="Search source, target or quantification"
					on:input=move |ev| on_intent.run(TableIntent::Search(event_target_value(&ev)))
				/>
				<div class="table-types">{type_toggles}</div>
				<div class="table-layers">{layer_toggles}</div>
			</div>
			<table>
				<thead>
					<tr>{headers}</tr>
				</thead>
				<tbody>{body}</tbody>
			</table>
		</div>
	}
}
