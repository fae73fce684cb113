//! soil-graph: interactive node-link diagrams of the Soil Sisters material dataset.
//!
//! The page embeds the dataset as JSON in `<script id="graph-data">`; the
//! optional `data-layout` attribute on that element picks the layout
//! (`columnar`, `radial`, `force` or `ring`).

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;
pub mod error;
mod pages;

pub use components::diagram::{
	DetailPanel, Diagram, DiagramCanvas, DiagramData, DiagramSettings, LayoutKind, Theme,
	render_diagram,
};
pub use error::DiagramError;

use crate::pages::home::Home;
use crate::pages::node::NodePage;
use crate::pages::not_found::NotFound;

const GRAPH_DATA_ID: &str = "graph-data";

/// Dataset and layout shared by every page.
#[derive(Clone, Debug, Default)]
pub struct AppData {
	pub data: DiagramData,
	pub layout: LayoutKind,
}

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("soil-graph: logging initialized");
}

/// Read the embedded payload and the requested layout.
pub fn load_graph_data() -> error::Result<AppData> {
	let missing = || DiagramError::MissingElement {
		id: GRAPH_DATA_ID.to_string(),
	};
	let window: Window = web_sys::window().ok_or_else(missing)?;
	let document = window.document().ok_or_else(missing)?;
	let element = document
		.get_element_by_id(GRAPH_DATA_ID)
		.ok_or_else(missing)?;

	let layout = match element.get_attribute("data-layout") {
		Some(name) => name.parse().unwrap_or_else(|err| {
			warn!("soil-graph: {err}, using the default layout");
			LayoutKind::default()
		}),
		None => LayoutKind::default(),
	};
	let script: HtmlScriptElement = element.dyn_into().map_err(|_| missing())?;
	let json_text = script.text().map_err(|_| missing())?;
	let data: DiagramData = serde_json::from_str(&json_text)?;
	info!(
		"soil-graph: loaded {} payload for the {layout} layout",
		match &data {
			DiagramData::Network(_) => "network",
			DiagramData::Sheets(_) => "sheets",
			DiagramData::Tree(_) => "tree",
			DiagramData::Empty => "empty",
		}
	);
	Ok(AppData { data, layout })
}

/// Router with the diagram at `/` and per-node pages at `/node/:name`.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let app_data = load_graph_data().unwrap_or_else(|err| {
		warn!("soil-graph: {err}");
		AppData::default()
	});
	provide_context(app_data);

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Soil Sisters Material Explorer" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
				<Route path=path!("/node/:name") view=NodePage />
			</Routes>
		</Router>
	}
}
