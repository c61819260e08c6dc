use std::sync::Arc;

use leptos::prelude::*;

use crate::components::filter_panel::{FilterOptions, FilterPanel};
use crate::components::force_graph::ForceGraphCanvas;
use crate::graph::{
	CategoryRegistry, FilterSelection, Graph, GraphPayload, OrphanPolicy, load, visible_subgraph,
};

/// The bundled artists dataset.
const ARTISTS: &str = include_str!("../../data/artists.json");

fn filter_options(graph: &Graph, registry: &CategoryRegistry) -> Vec<FilterOptions> {
	registry
		.filter_groups()
		.into_iter()
		.map(|group| FilterOptions {
			values: graph.category_values(&group.group).to_vec(),
			group,
		})
		.collect()
}

/// Filter panel and canvas over one built graph.
#[component]
fn Explorer(graph: Arc<Graph>, options: Vec<FilterOptions>) -> impl IntoView {
	let selection = RwSignal::new(FilterSelection::new());
	// recomputed from scratch on every selection change
	let payload = Memo::new(move |_| {
		let subgraph = selection.with(|s| visible_subgraph(&graph, s, OrphanPolicy::Keep));
		GraphPayload::pack(&subgraph, graph.details())
	});

	view! {
		<div class="fullscreen-graph">
			<ForceGraphCanvas data=payload fullscreen=true />
			<div class="graph-overlay">
				<h1>"Artists Mapping"</h1>
				<p class="subtitle">
					"Click an artist for details. Drag nodes to reposition. Scroll to zoom."
				</p>
				<FilterPanel options=options selection=selection payload=payload />
			</div>
		</div>
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let registry = CategoryRegistry::default();
	let explorer = load(ARTISTS, &registry).map(|(graph, _)| {
		let options = filter_options(&graph, &registry);
		view! { <Explorer graph=Arc::new(graph) options=options /> }
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>{explorer}</ErrorBoundary>
	}
}
