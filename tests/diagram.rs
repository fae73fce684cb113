use pretty_assertions::assert_eq;
use soil_graph::components::diagram::builder::GraphBuilder;
use soil_graph::components::diagram::detail::DetailOverlay;
use soil_graph::components::diagram::interaction::{
	ClickAction, HighlightState, HoverPolicy, ViewTransform, node_at,
};
use soil_graph::components::diagram::layout::{LayoutKind, Viewport};
use soil_graph::components::diagram::normalize::{Category, normalize};
use soil_graph::components::diagram::render::{MonospaceMeasure, RecordingBackend, draw_scene};
use soil_graph::components::diagram::types::{CategoryTree, NodeType, Payload};
use soil_graph::{DiagramData, DiagramSettings, render_diagram};

const MEASURE: MonospaceMeasure = MonospaceMeasure { char_width: 7.0 };

const ROPE_ROW: &str = r#"{"data":[{"sheetName":"Outputs","children":[{
	"Ingredient 1 Name": "Hemp",
	"Ingredient 1 #": "1",
	"Modifier Method 1": "Cutting",
	"Output Name": "Rope",
	"Output #": "9"
}]}]}"#;

const TEXTILE_NETWORK: &str = r#"{
	"nodes": [
		{"id": "Output-Textile", "type": "output"},
		{"id": "Output-Brick", "type": "output"},
		{"id": "Weaving", "type": "modifier"},
		{"id": "Pressing", "type": "modifier"},
		{"id": "Flax", "type": "ingredient"},
		{"id": "Clay", "type": "ingredient"}
	],
	"links": [
		{"source": "Output-Textile", "target": "Weaving", "type": "Output-Textile"},
		{"source": "Weaving", "target": "Flax", "type": "Output-Textile"},
		{"source": "Output-Brick", "target": "Pressing", "type": "Output-Brick"},
		{"source": "Pressing", "target": "Clay", "type": "Output-Brick"}
	]
}"#;

fn edge_names(graph: &soil_graph::components::diagram::types::Graph) -> Vec<(String, String)> {
	graph
		.links
		.iter()
		.map(|l| {
			(
				graph.node(&l.source).map(|n| n.id.clone()).unwrap_or_default(),
				graph.node(&l.target).map(|n| n.id.clone()).unwrap_or_default(),
			)
		})
		.collect()
}

#[test]
fn hemp_rope_row_becomes_a_two_link_chain() {
	let payload: Payload = serde_json::from_str(ROPE_ROW).unwrap();

	let root = normalize(payload.records());
	let sizes: Vec<(Category, usize)> = root.children.iter().map(|g| (g.category, g.children.len())).collect();
	assert_eq!(sizes, vec![
		(Category::Ingredients, 1),
		(Category::Modifiers, 1),
		(Category::Output, 1),
	]);
	assert_eq!(root.children[2].children[0].name, "Output - Rope");

	let tree = CategoryTree::from_records("Process", payload.records());
	let graph = GraphBuilder::default().build_tree(Some(&tree));
	let has = |id: &str, kind: NodeType| graph.nodes.iter().any(|n| n.id == id && n.kind == kind);
	assert!(has("Rope", NodeType::Output));
	assert!(has("Cutting", NodeType::Modifier));
	assert!(has("Hemp", NodeType::Ingredient));
	assert!(has("Mixing", NodeType::Modifier));
	assert_eq!(edge_names(&graph), vec![
		("Rope".to_string(), "Cutting".to_string()),
		("Cutting".to_string(), "Hemp".to_string()),
	]);
	assert!(graph.links.iter().all(|l| l.is_resolved()));
}

#[test]
fn hemp_rope_row_draws_in_every_layout() {
	let data: DiagramData = serde_json::from_str(ROPE_ROW).unwrap();
	let viewport = Viewport::new(900.0, 600.0);
	for kind in [LayoutKind::Columnar, LayoutKind::Radial, LayoutKind::Force, LayoutKind::Ring] {
		let diagram = render_diagram(&data, kind, viewport, &DiagramSettings::default(), &MEASURE);
		assert!(!diagram.scene.nodes.is_empty(), "{kind} drew nothing");
		let mut backend = RecordingBackend::default();
		draw_scene(&mut backend, &diagram.scene, &ViewTransform::default());
		assert!(backend.paths().count() > 0, "{kind} drew no links");
	}
}

#[test]
fn hovering_an_output_emphasises_exactly_its_links() {
	let data: DiagramData = serde_json::from_str(TEXTILE_NETWORK).unwrap();
	let diagram = render_diagram(
		&data,
		LayoutKind::Force,
		Viewport::new(800.0, 600.0),
		&DiagramSettings::default(),
		&MEASURE,
	);
	let theme = &diagram.theme;
	let policy = HoverPolicy::for_layout(diagram.kind);
	let textile = diagram
		.scene
		.nodes
		.iter()
		.find(|g| g.id == "Output-Textile")
		.unwrap();

	let mut highlight = HighlightState::default();
	assert!(highlight.set_hover(Some(textile)));
	let styled = highlight.styled(&diagram.scene, theme, policy);
	for link in &styled.links {
		let emphasised = link.style.color == theme.edge.highlight && link.style.width == theme.edge.highlight_width;
		assert_eq!(emphasised, link.group.as_deref() == Some("Output-Textile"));
	}
	assert_eq!(styled.links.iter().filter(|l| l.style.opacity == 0.0).count(), 2);

	assert!(highlight.clear());
	assert_eq!(*highlight.styled(&diagram.scene, theme, policy), diagram.scene);
}

#[test]
fn hovering_a_non_output_does_nothing() {
	let data: DiagramData = serde_json::from_str(TEXTILE_NETWORK).unwrap();
	let diagram = render_diagram(
		&data,
		LayoutKind::Ring,
		Viewport::new(800.0, 600.0),
		&DiagramSettings::default(),
		&MEASURE,
	);
	let weaving = diagram.scene.nodes.iter().find(|g| g.id == "Weaving").unwrap();
	let mut highlight = HighlightState::default();
	assert!(!highlight.set_hover(Some(weaving)));
	assert_eq!(highlight.hovered(), None);
}

#[test]
fn ring_scenes_repeat_for_a_seed() {
	let data: DiagramData = serde_json::from_str(TEXTILE_NETWORK).unwrap();
	let viewport = Viewport::new(800.0, 600.0);
	let settings = DiagramSettings::default();
	let first = render_diagram(&data, LayoutKind::Ring, viewport, &settings, &MEASURE);
	let second = render_diagram(&data, LayoutKind::Ring, viewport, &settings, &MEASURE);
	assert_eq!(first.scene, second.scene);

	let reseeded = DiagramSettings {
		seed: settings.seed + 1,
		..DiagramSettings::default()
	};
	let third = render_diagram(&data, LayoutKind::Ring, viewport, &reseeded, &MEASURE);
	let positions = |d: &soil_graph::Diagram| d.scene.nodes.iter().map(|g| (g.x, g.y)).collect::<Vec<_>>();
	assert_eq!(positions(&first), positions(&third));
}

#[test]
fn clicks_hit_the_glyph_under_the_pointer() {
	let data: DiagramData = serde_json::from_str(TEXTILE_NETWORK).unwrap();
	let diagram = render_diagram(
		&data,
		LayoutKind::Ring,
		Viewport::new(800.0, 600.0),
		&DiagramSettings::default(),
		&MEASURE,
	);
	let pan = ViewTransform { x: 40.0, y: -20.0 };
	for (i, glyph) in diagram.scene.nodes.iter().enumerate() {
		let hit = node_at(&diagram.scene, &pan, glyph.x + pan.x, glyph.y + pan.y);
		assert_eq!(hit.map(|h| diagram.scene.nodes[h].id.as_str()), Some(glyph.id.as_str()), "glyph {i}");
	}
}

#[test]
fn tall_columns_grow_the_surface() {
	let rows: Vec<String> = (0..40)
		.map(|i| format!(r#"{{"Ingredient 1 Name":"Fibre {i}","Modifier Method 1":"Cutting","Output Name":"Board {i}"}}"#))
		.collect();
	let json = format!(r#"{{"data":[{{"sheetName":"Outputs","children":[{}]}}]}}"#, rows.join(","));
	let data: DiagramData = serde_json::from_str(&json).unwrap();

	let diagram = render_diagram(
		&data,
		LayoutKind::Columnar,
		Viewport::new(900.0, 400.0),
		&DiagramSettings::default(),
		&MEASURE,
	);
	assert!(diagram.scene.viewport.height > 400.0);
	assert_eq!(diagram.scene.viewport.width, 900.0);
	let top = diagram.scene.nodes.iter().map(|g| g.y).fold(f64::INFINITY, f64::min);
	assert!(top >= 0.0);
}

const SHARED_HEMP: &str = r#"{"data":[{"sheetName":"Outputs","children":[
	{"Ingredient 1 Name": "Hemp", "Modifier Method 1": "Cutting", "Output Name": "Rope"},
	{"Ingredient 1 Name": "Hemp", "Modifier Method 1": "Soaking", "Output Name": "Paper"}
]}]}"#;

#[test]
fn rows_sharing_an_ingredient_draw_it_once() {
	let data: DiagramData = serde_json::from_str(SHARED_HEMP).unwrap();
	let diagram = render_diagram(
		&data,
		LayoutKind::Columnar,
		Viewport::new(900.0, 600.0),
		&DiagramSettings::default(),
		&MEASURE,
	);
	let hemp: Vec<_> = diagram.scene.nodes.iter().filter(|g| g.id == "Hemp").collect();
	assert_eq!(hemp.len(), 1);
	let graph = &diagram.graph;
	let into_hemp: Vec<String> = graph
		.links
		.iter()
		.filter(|l| graph.node(&l.target).is_some_and(|n| n.id == "Hemp"))
		.filter_map(|l| graph.node(&l.source).map(|n| n.id.clone()))
		.collect();
	assert_eq!(into_hemp, vec!["Cutting".to_string(), "Soaking".to_string()]);
}

#[test]
fn force_clicks_on_sheet_nodes_open_their_record() {
	let data: DiagramData = serde_json::from_str(ROPE_ROW).unwrap();
	let diagram = render_diagram(
		&data,
		LayoutKind::Force,
		Viewport::new(800.0, 600.0),
		&DiagramSettings::default(),
		&MEASURE,
	);
	let rope = diagram.graph.nodes.iter().find(|n| n.id == "Rope").unwrap();
	let overlay = DetailOverlay::from_node(rope).unwrap();
	assert_eq!(overlay.title, "Rope");
	assert_eq!(ClickAction::for_click(diagram.kind, true), ClickAction::ShowDetail);

	let network: DiagramData = serde_json::from_str(TEXTILE_NETWORK).unwrap();
	let diagram = render_diagram(
		&network,
		LayoutKind::Force,
		Viewport::new(800.0, 600.0),
		&DiagramSettings::default(),
		&MEASURE,
	);
	let textile = diagram.graph.nodes.iter().find(|n| n.id == "Output-Textile").unwrap();
	assert_eq!(DetailOverlay::from_node(textile), None);
	assert_eq!(ClickAction::for_click(diagram.kind, false), ClickAction::Navigate);
}
