//! Which columns of a row mean what.
//!
//! The registry is plain configuration: it is deserialisable so a deployment
//! can ship its own schema, and its [`Default`] describes the bundled artists
//! dataset.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::color::IDENTITY_GROUP;
use super::error::RegistryError;

/// Photo shown for records that do not provide one.
pub const DEFAULT_PHOTO: &str =
	"https://static.tildacdn.com/tild3532-6664-4163-b538-663866613835/hosq-design-NEW.png";

/// A multi-valued categorical column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryField {
	/// Column name in the source rows.
	pub column: String,
	/// Group tag of the value nodes, also the filter key.
	pub group: String,
	/// Human readable filter heading.
	pub title: String,
}

impl CategoryField {
	/// Category whose column and group share one name.
	pub fn new(name: &str, title: &str) -> Self {
		Self {
			column: name.into(),
			group: name.into(),
			title: title.into(),
		}
	}
}

/// A compound `region, subregion` column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationField {
	/// Column name in the source rows.
	pub column: String,
	/// Separator between region and subregion.
	pub delimiter: char,
	/// Group tag of region nodes.
	pub region_group: String,
	/// Group tag of subregion nodes.
	pub subregion_group: String,
	/// Filter heading for regions.
	pub region_title: String,
	/// Filter heading for subregions.
	pub subregion_title: String,
}

impl Default for LocationField {
	fn default() -> Self {
		Self {
			column: "city".into(),
			delimiter: ',',
			region_group: "region".into(),
			subregion_group: "subregion".into(),
			region_title: "Country".into(),
			subregion_title: "City".into(),
		}
	}
}

/// Columns that feed the detail card only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailColumns {
	/// Image reference column.
	pub photo: String,
	/// Telegram handle column.
	pub telegram: String,
	/// Email column.
	pub email: String,
}

impl Default for DetailColumns {
	fn default() -> Self {
		Self {
			photo: "photo".into(),
			telegram: "telegram".into(),
			email: "email".into(),
		}
	}
}

/// One filter control: a group and its heading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterGroup {
	/// Group tag the control constrains.
	pub group: String,
	/// Heading shown above the control.
	pub title: String,
}

/// Schema of the input rows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryRegistry {
	/// Column holding the identity key.
	pub identity_column: String,
	/// Multi-valued categorical columns, in filter order.
	pub categories: Vec<CategoryField>,
	/// Separator for multi-valued cells.
	pub delimiter: char,
	/// Optional compound location column.
	pub location: Option<LocationField>,
	/// Detail-only columns.
	pub details: DetailColumns,
	/// Substitute for a missing photo.
	pub default_photo: String,
}

impl Default for CategoryRegistry {
	fn default() -> Self {
		Self {
			identity_column: "name".into(),
			categories: vec![
				CategoryField::new("role", "Role"),
				CategoryField::new("field", "Field"),
			],
			delimiter: ',',
			location: Some(LocationField::default()),
			details: DetailColumns::default(),
			default_photo: DEFAULT_PHOTO.into(),
		}
	}
}

impl CategoryRegistry {
	/// Reject configurations that would produce colliding or ambiguous ids.
	pub fn validate(&self) -> Result<(), RegistryError> {
		if self.identity_column.trim().is_empty() {
			return Err(RegistryError::EmptyIdentityColumn);
		}

		let mut seen = HashSet::new();
		let mut check = |group: &str, column: &str| {
			if group == IDENTITY_GROUP {
				return Err(RegistryError::ReservedGroup(group.into()));
			}
			if group.contains("::") {
				return Err(RegistryError::SeparatorInGroup(group.into()));
			}
			if column.trim().is_empty() {
				return Err(RegistryError::EmptyColumn(group.into()));
			}
			if !seen.insert(group.to_owned()) {
				return Err(RegistryError::DuplicateGroup(group.into()));
			}
			Ok(())
		};

		for category in &self.categories {
			check(&category.group, &category.column)?;
		}
		if let Some(location) = &self.location {
			check(&location.region_group, &location.column)?;
			check(&location.subregion_group, &location.column)?;
		}
		Ok(())
	}

	/// Every filterable group, categories first, then region and subregion.
	pub fn filter_groups(&self) -> Vec<FilterGroup> {
		let mut groups: Vec<FilterGroup> = self
			.categories
			.iter()
			.map(|c| FilterGroup {
				group: c.group.clone(),
				title: c.title.clone(),
			})
			.collect();
		if let Some(location) = &self.location {
			groups.push(FilterGroup {
				group: location.region_group.clone(),
				title: location.region_title.clone(),
			});
			groups.push(FilterGroup {
				group: location.subregion_group.clone(),
				title: location.subregion_title.clone(),
			});
		}
		groups
	}

	/// Split a multi-valued cell into trimmed, non-empty tokens.
	pub fn split_cell<'a>(&self, cell: &'a str) -> impl Iterator<Item = &'a str> {
		cell.split(self.delimiter)
			.map(str::trim)
			.filter(|token| !token.is_empty())
	}
}
