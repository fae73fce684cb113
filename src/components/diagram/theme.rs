//! Visual theming for the diagrams.
//!
//! Colours are categorical: every node type has a fixed colour, and each
//! layout picks one of the preset themes below.

use super::layout::LayoutKind;
use super::types::NodeType;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Parses `#RRGGBB`, `#RRGGBBAA` and `rgb()`/`rgba()` notation.
	/// Anything else falls back to mid grey.
	pub fn parse(color_str: &str) -> Self {
		let hex = |s: &str| u8::from_str_radix(s, 16).unwrap_or(128);
		if color_str.starts_with('#') && (color_str.len() == 7 || color_str.len() == 9) {
			let alpha = if color_str.len() == 9 {
				hex(&color_str[7..9]) as f64 / 255.0
			} else {
				1.0
			};
			Color::rgba(
				hex(&color_str[1..3]),
				hex(&color_str[3..5]),
				hex(&color_str[5..7]),
				alpha,
			)
		} else if color_str.starts_with("rgb") {
			let nums: Vec<&str> = color_str
				.trim_start_matches("rgba(")
				.trim_start_matches("rgb(")
				.trim_end_matches(')')
				.split(',')
				.collect();
			let channel = |i: usize| {
				nums.get(i)
					.and_then(|s| s.trim().parse().ok())
					.unwrap_or(128)
			};
			let a = nums
				.get(3)
				.and_then(|s| s.trim().parse().ok())
				.unwrap_or(1.0);
			Color::rgba(channel(0), channel(1), channel(2), a)
		} else {
			Color::rgb(128, 128, 128)
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// One colour per node type.
#[derive(Clone, Debug)]
pub struct TypePalette {
	pub ingredient: Color,
	pub modifier: Color,
	pub fabrication: Color,
	pub output: Color,
	pub output_type: Color,
	pub bio_based: Color,
}

impl TypePalette {
	/// Soil tones used across the site.
	pub fn soil() -> Self {
		Self {
			ingredient: Color::rgb(0xae, 0xc3, 0xae), // Sage
			modifier: Color::rgb(0x94, 0x0b, 0x92),   // Plum
			fabrication: Color::rgb(0xff, 0xc4, 0x36), // Marigold
			output: Color::rgb(0xde, 0x8f, 0x5f),     // Terracotta
			output_type: Color::rgb(0x6c, 0x8e, 0xad),
			bio_based: Color::rgb(0x2e, 0x7d, 0x32),
		}
	}

	pub fn get(&self, kind: NodeType) -> Color {
		match kind {
			NodeType::Ingredient => self.ingredient,
			NodeType::Modifier => self.modifier,
			NodeType::Fabrication => self.fabrication,
			NodeType::Output => self.output,
			NodeType::OutputType => self.output_type,
			NodeType::BioBased => self.bio_based,
		}
	}
}

/// Node marker and label style.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Take marker and label colours from the palette instead of `fill`/`label`.
	pub color_by_type: bool,
	pub fill: Color,
	/// Fill for nodes with children (hierarchical layouts only).
	pub branch_fill: Color,
	pub label: Color,
	pub label_font: String,
	/// Outline drawn behind label text to keep it legible over links.
	pub label_halo: Option<Color>,
}

/// Link style, including the hover emphasis.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	pub color: Color,
	pub width: f64,
	pub opacity: f64,
	/// Tint each link with its source node's palette colour at this alpha.
	pub tint_alpha: Option<f64>,
	pub highlight: Color,
	pub highlight_width: f64,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub name: &'static str,
	pub background: Color,
	pub palette: TypePalette,
	pub node: NodeStyle,
	pub edge: EdgeStyle,
	/// Ring guide circles.
	pub guide: Color,
}

const TERRACOTTA: Color = Color::rgb(0xde, 0x8f, 0x5f);

impl Theme {
	/// Black on white, for the columnar tree.
	pub fn paper() -> Self {
		Self {
			name: "paper",
			background: Color::rgb(255, 255, 255),
			palette: TypePalette::soil(),
			node: NodeStyle {
				color_by_type: false,
				fill: Color::rgb(0, 0, 0),
				branch_fill: Color::rgb(0, 0, 0),
				label: Color::rgb(0, 0, 0),
				label_font: "12px sans-serif".to_string(),
				label_halo: None,
			},
			edge: EdgeStyle {
				color: Color::parse("#00000010"),
				width: 1.0,
				opacity: 1.0,
				tint_alpha: None,
				highlight: TERRACOTTA,
				highlight_width: 2.0,
			},
			guide: Color::rgba(0, 0, 0, 0.0),
		}
	}

	/// Grey branches, lighter leaves, haloed labels.
	pub fn radial() -> Self {
		Self {
			name: "radial",
			background: Color::rgb(255, 255, 255),
			palette: TypePalette::soil(),
			node: NodeStyle {
				color_by_type: false,
				fill: Color::parse("#999999"),
				branch_fill: Color::parse("#555555"),
				label: Color::rgb(34, 34, 34),
				label_font: "10px sans-serif".to_string(),
				label_halo: Some(Color::rgb(255, 255, 255)),
			},
			edge: EdgeStyle {
				color: Color::parse("#555555"),
				width: 1.5,
				opacity: 0.4,
				tint_alpha: None,
				highlight: TERRACOTTA,
				highlight_width: 2.0,
			},
			guide: Color::rgba(0, 0, 0, 0.0),
		}
	}

	/// Type-coloured nodes and links on a dark ground, for the network.
	pub fn soil() -> Self {
		Self {
			name: "soil",
			background: Color::rgb(22, 27, 34),
			palette: TypePalette::soil(),
			node: NodeStyle {
				color_by_type: true,
				fill: Color::parse("#aec3ae"),
				branch_fill: Color::parse("#aec3ae"),
				label: Color::parse("#aec3ae"),
				label_font: "bold 12px sans-serif".to_string(),
				label_halo: None,
			},
			edge: EdgeStyle {
				color: Color::parse("#aec3ae33"),
				width: 2.0,
				opacity: 1.0,
				tint_alpha: Some(0x33 as f64 / 255.0),
				highlight: TERRACOTTA,
				highlight_width: 3.0,
			},
			guide: Color::rgba(0, 0, 0, 0.0),
		}
	}

	/// Muted greys with terracotta hover emphasis, for the rings.
	pub fn ring() -> Self {
		Self {
			name: "ring",
			background: Color::rgb(22, 27, 34),
			palette: TypePalette::soil(),
			node: NodeStyle {
				color_by_type: false,
				fill: Color::parse("#bebebe75"),
				branch_fill: Color::parse("#bebebe75"),
				label: Color::parse("#bebebe75"),
				label_font: "bold 12px sans-serif".to_string(),
				label_halo: None,
			},
			edge: EdgeStyle {
				color: Color::parse("#bebebe15"),
				width: 1.0,
				opacity: 1.0,
				tint_alpha: None,
				highlight: TERRACOTTA,
				highlight_width: 1.5,
			},
			guide: Color::parse("#bebebe50"),
		}
	}

	pub fn for_layout(kind: LayoutKind) -> Self {
		match kind {
			LayoutKind::Columnar => Self::paper(),
			LayoutKind::Radial => Self::radial(),
			LayoutKind::Force => Self::soil(),
			LayoutKind::Ring => Self::ring(),
		}
	}

	pub fn node_fill(&self, kind: Option<NodeType>) -> Color {
		match kind {
			Some(kind) if self.node.color_by_type => self.palette.get(kind),
			_ => self.node.fill,
		}
	}

	pub fn label_color(&self, kind: Option<NodeType>) -> Color {
		match kind {
			Some(kind) if self.node.color_by_type => self.palette.get(kind),
			_ => self.node.label,
		}
	}

	/// Resting link colour; tinted by the source type when the theme asks for it.
	pub fn link_color(&self, source: Option<NodeType>) -> Color {
		match (self.edge.tint_alpha, source) {
			(Some(alpha), Some(kind)) => self.palette.get(kind).with_alpha(alpha),
			_ => self.edge.color,
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::soil()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_hex_with_alpha() {
		let c = Color::parse("#bebebe15");
		assert_eq!((c.r, c.g, c.b), (190, 190, 190));
		assert!((c.a - 21.0 / 255.0).abs() < 1e-9);
		assert_eq!(Color::parse("#DE8F5F"), Color::rgb(0xde, 0x8f, 0x5f));
	}

	#[test]
	fn parses_functional_notation() {
		assert_eq!(
			Color::parse("rgba(1, 2, 3, 0.5)"),
			Color::rgba(1, 2, 3, 0.5)
		);
		assert_eq!(Color::parse("teal"), Color::rgb(128, 128, 128));
	}

	#[test]
	fn css_output_drops_opaque_alpha() {
		assert_eq!(Color::rgb(222, 143, 95).to_css(), "#de8f5f");
		assert_eq!(Color::rgba(0, 0, 0, 0.5).to_css(), "rgba(0, 0, 0, 0.5)");
	}

	#[test]
	fn soil_links_take_source_colour() {
		let theme = Theme::soil();
		let c = theme.link_color(Some(NodeType::Output));
		assert_eq!((c.r, c.g, c.b), (0xde, 0x8f, 0x5f));
		assert!(c.a < 0.25);
		assert_eq!(Theme::ring().link_color(Some(NodeType::Output)), Theme::ring().edge.color);
	}
}
