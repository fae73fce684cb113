//! Detail panel content for a clicked node.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::types::{Node, RawRecord, field};

const DIRECT_VIEW: &str = "https://drive.google.com/uc?export=view&id=";

static DRIVE_FILE_ID: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[-A-Za-z0-9_]{25,}").expect("valid drive id pattern"));

/// Fields never listed as rows.
const IGNORED: [&str; 5] = ["image", "Image", "name", "id", "No."];

/// Rewrite a Google Drive share link to a direct-view URL.
///
/// Other URLs are returned unchanged. A Drive link without a file id yields
/// an empty string, which callers treat as "no image".
pub fn drive_direct_link(link: &str) -> String {
	if !link.contains("drive.google.com") {
		return link.to_string();
	}
	match DRIVE_FILE_ID.find(link) {
		Some(id) => format!("{DIRECT_VIEW}{}", id.as_str()),
		None => String::new(),
	}
}

/// Absolute URL with a host, e.g. `https://…`. Plain words with a colon
/// (`"Note: soak"`) do not count.
pub fn is_url(value: &str) -> bool {
	Url::parse(value.trim()).is_ok_and(|url| url.has_host())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DetailValue {
	Text(String),
	/// Rendered as a "Link" anchor opening in a new tab.
	Link(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailRow {
	pub label: String,
	pub value: DetailValue,
}

/// Everything the detail panel shows for one record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DetailOverlay {
	pub title: String,
	pub image: Option<String>,
	pub rows: Vec<DetailRow>,
	/// Names of category fields set to `"TRUE"`.
	pub badges: Vec<String>,
}

fn is_flag(text: &str) -> bool {
	text == "TRUE" || text == "FALSE"
}

impl DetailOverlay {
	pub fn from_record(record: &RawRecord) -> Self {
		let title = field(record, "name")
			.or_else(|| field(record, "Output Name"))
			.map(ToString::to_string)
			.unwrap_or_default();
		let image = field(record, "image")
			.or_else(|| field(record, "Image"))
			.map(|v| drive_direct_link(&v.to_string()))
			.filter(|src| !src.is_empty());

		let mut rows = Vec::new();
		let mut badges = Vec::new();
		for (key, value) in record {
			if let Some(text) = value.as_text() {
				if text == "TRUE" {
					badges.push(key.trim().to_string());
				}
				if is_flag(text) {
					continue;
				}
			}
			if IGNORED.contains(&key.as_str()) {
				continue;
			}
			let text = value.to_string();
			if text.trim().is_empty() {
				continue;
			}
			rows.push(DetailRow {
				label: key.trim().to_string(),
				value: if is_url(&text) {
					DetailValue::Link(text)
				} else {
					DetailValue::Text(text)
				},
			});
		}

		Self {
			title,
			image,
			rows,
			badges,
		}
	}

	/// Overlay for a node that came from a spreadsheet row.
	pub fn from_node(node: &Node) -> Option<Self> {
		node.data.as_ref().map(Self::from_record)
	}
}
