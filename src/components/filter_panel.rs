use leptos::prelude::*;
use log::warn;

use crate::graph::{FilterGroup, FilterSelection, GraphPayload};

/// A filter group and the values it offers, in dataset order.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterOptions {
	pub group: FilterGroup,
	pub values: Vec<String>,
}

fn export_href(payload: &GraphPayload) -> Option<String> {
	match payload.encode() {
		Ok(text) => Some(format!(
			"data:application/json;charset=utf-8,{}",
			String::from(js_sys::encode_uri_component(&text))
		)),
		Err(err) => {
			warn!("cannot export graph: {err}");
			None
		}
	}
}

#[component]
fn FilterValue(group: String, value: String, selection: RwSignal<FilterSelection>) -> impl IntoView {
	let (g, v) = (group.clone(), value.clone());
	let checked = move || selection.with(|s| s.is_selected(&g, &v));
	let label = value.clone();

	view! {
		<label class="filter-option">
			<input
				type="checkbox"
				prop:checked=checked
				on:change=move |ev| {
					let on = event_target_checked(&ev);
					selection.update(|s| s.toggle(&group, &value, on));
				}
			/>
			{label}
		</label>
	}
}

/// One checkbox group per category plus clear and export controls.
#[component]
pub fn FilterPanel(
	options: Vec<FilterOptions>,
	selection: RwSignal<FilterSelection>,
	#[prop(into)] payload: Signal<GraphPayload>,
) -> impl IntoView {
	let groups = options
		.into_iter()
		.map(|FilterOptions { group, values }| {
			let FilterGroup { group, title } = group;
			let values = values
				.into_iter()
				.map(|value| view! { <FilterValue group=group.clone() value=value selection=selection /> })
				.collect_view();
			view! {
				<fieldset class="filter-group">
					<legend>{title}</legend>
					{values}
				</fieldset>
			}
		})
		.collect_view();

	let shown = move || payload.with(|p| p.details.len());

	view! {
		<aside class="filter-panel">
			{groups}
			<div class="filter-actions">
				<span class="filter-count">{shown} " shown"</span>
				<button
					disabled=move || selection.with(|s| !s.is_constrained())
					on:click=move |_| selection.update(FilterSelection::clear)
				>
					"Clear"
				</button>
				<a class="filter-export" download="graph.json" href=move || payload.with(export_href)>
					"Export"
				</a>
			</div>
		</aside>
	}
}
