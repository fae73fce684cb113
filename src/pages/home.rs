//! Landing page with the full-window diagram.

use leptos::prelude::*;

use crate::AppData;
use crate::components::diagram::DiagramCanvas;

/// Full-window diagram of the embedded dataset.
#[component]
pub fn Home() -> impl IntoView {
	let AppData { data, layout } = use_context::<AppData>().unwrap_or_default();
	let empty = data.is_empty();
	let data = Signal::derive(move || data.clone());

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
		}>

			<div class="fullscreen-graph">
				<DiagramCanvas data=data layout=layout fullscreen=true />
				<div class="graph-overlay">
					<h1>"Soil Sisters Materials"</h1>
					<Show
						when=move || !empty
						fallback=|| view! { <p class="subtitle">"No graph data on this page."</p> }
					>
						<p class="subtitle">"Hover an output to trace it. Drag the background to pan."</p>
					</Show>
				</div>
			</div>
		</ErrorBoundary>
	}
}
