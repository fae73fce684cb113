//! Node-link diagrams of the Soil Sisters material dataset.
//!
//! Rows from the spreadsheet API (or a pre-shaped tree, or a flat network) are
//! turned into a typed [`Graph`](types::Graph), laid out by one of four
//! layouts into a [`Scene`](layout::Scene), and drawn through a
//! [`RenderBackend`](render::RenderBackend):
//!
//! - columnar: outputs, modifiers and ingredients in type columns
//! - radial: tidy tree of the category groups around a circle
//! - force: physics simulation of the supply/demand network
//! - ring: concentric type rings around a centre node
//!
//! # Example
//!
//! ```ignore
//! use soil_graph::{DiagramCanvas, DiagramData, LayoutKind};
//!
//! let data: DiagramData = serde_json::from_str(payload)?;
//! view! { <DiagramCanvas data=data layout=LayoutKind::Ring fullscreen=true /> }
//! ```

pub mod builder;
mod component;
pub mod detail;
pub mod interaction;
pub mod layout;
pub mod normalize;
pub mod pipeline;
pub mod render;
pub mod theme;
pub mod types;

pub use component::{DetailPanel, DiagramCanvas};
pub use layout::LayoutKind;
pub use pipeline::{Diagram, DiagramData, DiagramSettings, render_diagram};
pub use theme::Theme;
