//! Spreadsheet rows to category groups.
//!
//! Rows name their repeated fields positionally ("Ingredient 1 Name",
//! "Ingredient 2 Name", ...). Both shapes built here scan those fields from 1
//! upwards and stop at the first gap, so a row with ingredients 1 and 3 but no 2
//! yields a single ingredient.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use super::types::{
	CategoryTree, FieldValue, LeafName, OutputEntry, RawRecord, TreeGroup, TreeLeaf, field,
};

/// Literal column headers. Trailing spaces are part of the sheet schema.
pub mod columns {
	pub const FABRICATION: &str = "Fabrication Method ";
	pub const FABRICATION_ID: &str = "Fabrication Method ID#";
	pub const OUTPUT_NAME: &str = "Output Name";
	pub const OUTPUT_ID: &str = "Output #";
	pub const OUTPUT_TYPE: &str = "Output Type";
	pub const BIO_BASED: &str = "Bio Based";

	pub fn ingredient_name(i: usize) -> String {
		format!("Ingredient {i} Name")
	}

	pub fn ingredient_id(i: usize) -> String {
		format!("Ingredient {i} #")
	}

	pub fn modifier(i: usize) -> String {
		format!("Modifier Method {i}")
	}

	pub fn modifier_id(i: usize) -> String {
		format!("Modifier Method ID {i}#")
	}
}

/// Root name of the normalized hierarchy.
pub const ROOT_NAME: &str = "Process";

/// The four buckets rows are sorted into, in output order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
	Ingredients,
	Modifiers,
	Fabrication,
	Output,
}

impl Category {
	pub const ALL: [Category; 4] = [
		Category::Ingredients,
		Category::Modifiers,
		Category::Fabrication,
		Category::Output,
	];

	pub fn label(self) -> &'static str {
		match self {
			Category::Ingredients => "Ingredients",
			Category::Modifiers => "Modifiers",
			Category::Fabrication => "Fabrication",
			Category::Output => "Output",
		}
	}

	/// Prefix used on leaf names ("Ingredient - Hemp").
	fn leaf_prefix(self) -> &'static str {
		match self {
			Category::Ingredients => "Ingredient",
			Category::Modifiers => "Modifier",
			Category::Fabrication => "Fabrication",
			Category::Output => "Output",
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Leaf {
	pub name: String,
	pub id: Option<FieldValue>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CategoryGroup {
	pub category: Category,
	pub children: Vec<Leaf>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CategoryRoot {
	pub name: String,
	pub children: Vec<CategoryGroup>,
}

impl CategoryRoot {
	pub fn group(&self, category: Category) -> Option<&CategoryGroup> {
		self.children.iter().find(|g| g.category == category)
	}
}

/// Yields `(i, value)` for `key(1)`, `key(2)`, ... until the first absent field.
fn positional<'a, F>(record: &'a RawRecord, key: F) -> impl Iterator<Item = (usize, &'a FieldValue)> + 'a
where
	F: Fn(usize) -> String + 'a,
{
	(1..).map_while(move |i| field(record, &key(i)).map(|value| (i, value)))
}

/// Sort rows into at most four non-empty category groups.
pub fn normalize<'a, I>(records: I) -> CategoryRoot
where
	I: IntoIterator<Item = &'a RawRecord>,
{
	let mut buckets: [Vec<Leaf>; 4] = Default::default();
	let leaf = |category: Category, value: &FieldValue, id: Option<&FieldValue>| Leaf {
		name: format!("{} - {}", category.leaf_prefix(), value),
		id: id.cloned(),
	};

	for record in records {
		for (i, value) in positional(record, columns::ingredient_name) {
			let id = record.get(&columns::ingredient_id(i));
			buckets[0].push(leaf(Category::Ingredients, value, id));
		}
		for (i, value) in positional(record, columns::modifier) {
			let id = record.get(&columns::modifier_id(i));
			buckets[1].push(leaf(Category::Modifiers, value, id));
		}
		if let Some(value) = field(record, columns::FABRICATION) {
			let id = record.get(columns::FABRICATION_ID);
			buckets[2].push(leaf(Category::Fabrication, value, id));
		}
		if let Some(value) = field(record, columns::OUTPUT_NAME) {
			let id = record.get(columns::OUTPUT_ID);
			buckets[3].push(leaf(Category::Output, value, id));
		}
	}

	let children: Vec<CategoryGroup> = Category::ALL
		.into_iter()
		.zip(buckets)
		.filter(|(_, leaves)| !leaves.is_empty())
		.map(|(category, children)| CategoryGroup { category, children })
		.collect();
	debug!("soil-graph: normalized into {} category groups", children.len());

	CategoryRoot {
		name: ROOT_NAME.to_string(),
		children,
	}
}

impl CategoryRoot {
	/// Flatten a pre-shaped tree into display groups for the radial layout.
	pub fn from_tree(tree: &CategoryTree) -> Self {
		let category = |name: &str| match name {
			"Ingredients" => Some(Category::Ingredients),
			"Modifiers" => Some(Category::Modifiers),
			"Fabrication" | "Fabrication Methods" => Some(Category::Fabrication),
			"Output" | "Outputs" => Some(Category::Output),
			_ => None,
		};
		let children = tree
			.children
			.iter()
			.filter_map(|group| {
				let category = category(&group.name)?;
				let children: Vec<Leaf> = group
					.children
					.iter()
					.map(|leaf| Leaf {
						name: format!("{} - {}", category.leaf_prefix(), leaf.display_name()),
						id: None,
					})
					.collect();
				(!children.is_empty()).then_some(CategoryGroup { category, children })
			})
			.collect();
		Self {
			name: tree.name.to_string(),
			children,
		}
	}
}

impl CategoryTree {
	/// Build the builder's input shape straight from rows.
	///
	/// Groups are `Ingredients`, `Modifiers`, `Fabrication Methods` and `Outputs`;
	/// every output leaf carries its positional ingredient and modifier lists.
	pub fn from_records<'a, I>(name: &str, records: I) -> Self
	where
		I: IntoIterator<Item = &'a RawRecord>,
	{
		let mut ingredients = Vec::new();
		let mut modifiers = Vec::new();
		let mut fabrication = Vec::new();
		let mut outputs = Vec::new();

		for record in records {
			let row_ingredients: Vec<FieldValue> = positional(record, columns::ingredient_name)
				.map(|(_, v)| v.clone())
				.collect();
			let row_modifiers: Vec<FieldValue> = positional(record, columns::modifier)
				.map(|(_, v)| v.clone())
				.collect();

			for value in &row_ingredients {
				ingredients.push(TreeLeaf::value(value.clone(), Some(record.clone())));
			}
			for value in &row_modifiers {
				modifiers.push(TreeLeaf::value(value.clone(), None));
			}
			if let Some(value) = field(record, columns::FABRICATION) {
				fabrication.push(TreeLeaf::value(value.clone(), None));
			}
			if let Some(value) = field(record, columns::OUTPUT_NAME) {
				outputs.push(TreeLeaf {
					name: LeafName::Output(OutputEntry {
						output_name: value.clone(),
						ingredients: row_ingredients,
						modifiers: row_modifiers,
						output_type: field(record, columns::OUTPUT_TYPE).cloned(),
						bio_based: field(record, columns::BIO_BASED).cloned(),
					}),
					record: Some(record.clone()),
				});
			}
		}

		let children = [
			("Ingredients", ingredients),
			("Modifiers", modifiers),
			("Fabrication Methods", fabrication),
			("Outputs", outputs),
		]
		.into_iter()
		.filter(|(_, leaves)| !leaves.is_empty())
		.map(|(name, children)| TreeGroup {
			name: name.to_string(),
			children,
		})
		.collect();

		Self {
			name: FieldValue::from(name),
			children,
		}
	}
}

static INGREDIENT_NAME_KEY: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^Ingredient \d+ Name$").expect("valid ingredient key pattern"));

/// Rows that list `name` under any "Ingredient N Name" column.
pub fn records_using_ingredient<'a, I>(records: I, name: &str) -> Vec<&'a RawRecord>
where
	I: IntoIterator<Item = &'a RawRecord>,
{
	records
		.into_iter()
		.filter(|record| {
			record.iter().any(|(key, value)| {
				INGREDIENT_NAME_KEY.is_match(key) && value.to_string() == name
			})
		})
		.collect()
}
