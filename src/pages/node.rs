//! Per-node page at `/node/:name`.

use leptos::prelude::*;
use leptos_router::hooks::use_params_map;

use crate::AppData;
use crate::components::diagram::detail::DetailOverlay;
use crate::components::diagram::normalize::records_using_ingredient;
use crate::components::diagram::{DiagramCanvas, DiagramData, DiagramSettings, LayoutKind};

/// Outputs whose rows list `name` as an ingredient.
fn outputs_using(data: &DiagramData, name: &str) -> Vec<DetailOverlay> {
	match data {
		DiagramData::Sheets(payload) => records_using_ingredient(payload.records(), name)
			.into_iter()
			.map(DetailOverlay::from_record)
			.collect(),
		_ => Vec::new(),
	}
}

/// Ring diagram centred on one node, plus the outputs made from it.
#[component]
pub fn NodePage() -> impl IntoView {
	let params = use_params_map();
	let name = move || params.with(|p| p.get("name").unwrap_or_default());
	let AppData { data, .. } = use_context::<AppData>().unwrap_or_default();
	let outputs = {
		let data = data.clone();
		move || outputs_using(&data, &name())
	};

	view! {
		<div class="node-page">
			<header class="node-header">
				<a href="/">"← All materials"</a>
				<h1>{name}</h1>
			</header>
			{
				let data = data.clone();
				move || {
					let settings = DiagramSettings {
						ring: DiagramSettings::default().ring.with_center(name()),
						..DiagramSettings::default()
					};
					let data = data.clone();
					view! {
						<DiagramCanvas
							data=Signal::derive(move || data.clone())
							layout=LayoutKind::Ring
							width=Some(800.0)
							height=Some(600.0)
							settings=settings
						/>
					}
				}
			}
			<section class="node-outputs">
				<h2>"Used in"</h2>
				<ul>
					{move || {
						outputs()
							.into_iter()
							.map(|overlay| {
								view! {
									<li class="node-output">
										<strong>{overlay.title}</strong>
										{overlay
											.badges
											.into_iter()
											.map(|badge| view! { <span class="badge">{badge}</span> })
											.collect_view()}
									</li>
								}
							})
							.collect_view()
					}}
				</ul>
			</section>
		</div>
	}
}
