//! Row -> record parsing.

use std::sync::LazyLock;

use regex::Regex;

use super::dataset::Row;
use super::error::RowError;
use super::model::DetailRecord;
use super::registry::{CategoryRegistry, LocationField};

/// Google Drive share links, capturing the file id.
static DRIVE_LINK: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^https?://drive\.google\.com/(?:file/d/([\w-]+)|(?:open|uc)\?(?:[^#]*&)?id=([\w-]+))")
		.expect("drive link pattern compiles")
});

/// Rewrite share links into something an `<img>` can load directly.
///
/// Blank references resolve to `default_photo`; unknown URLs pass through.
pub fn resolve_photo(raw: Option<&str>, default_photo: &str) -> String {
	let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
		return default_photo.into();
	};
	DRIVE_LINK
		.captures(raw)
		.and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
		.map(|id| format!("https://drive.google.com/thumbnail?id={}", id.as_str()))
		.unwrap_or_else(|| raw.into())
}

/// A well-formed compound location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
	/// Outer tier, e.g. country.
	pub region: String,
	/// Inner tier, e.g. city.
	pub subregion: String,
}

impl Location {
	/// Filter value of the subregion, qualified by its region so that
	/// same-named cities in different countries stay apart.
	pub fn subregion_key(&self) -> String {
		format!("{}/{}", self.region, self.subregion)
	}

	/// Parse `region<delim>subregion`. Blank cells are `Ok(None)`.
	pub fn parse(cell: &str, field: &LocationField) -> Result<Option<Self>, RowError> {
		if cell.trim().is_empty() {
			return Ok(None);
		}
		let parts: Vec<&str> = cell
			.split(field.delimiter)
			.map(str::trim)
			.filter(|part| !part.is_empty())
			.collect();
		match parts.as_slice() {
			[region, subregion] => Ok(Some(Self {
				region: (*region).into(),
				subregion: (*subregion).into(),
			})),
			_ => Err(RowError::MalformedLocation {
				value: cell.into(),
				parts: parts.len(),
			}),
		}
	}
}

/// Tokens of one category for one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryValues {
	/// Category group tag.
	pub group: String,
	/// Trimmed, non-empty tokens in cell order.
	pub values: Vec<String>,
}

/// A parsed source row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
	/// Trimmed identity key.
	pub name: String,
	/// One entry per configured category, possibly with no values.
	pub categories: Vec<CategoryValues>,
	/// Compound location when present and well formed.
	pub location: Option<Location>,
	/// Detail card content.
	pub detail: DetailRecord,
}

/// A record together with the fields that had to be dropped from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedRow {
	/// The usable part of the row.
	pub record: Record,
	/// Field-level problems; the record is still kept.
	pub skipped_fields: Vec<RowError>,
}

fn non_blank<'a>(row: &'a Row, column: &str) -> Option<&'a str> {
	row.get(column)
		.map(|s| s.trim())
		.filter(|s| !s.is_empty())
}

impl Record {
	/// Parse one row. Only a missing identity key rejects the whole row.
	pub fn from_row(row: &Row, registry: &CategoryRegistry) -> Result<ParsedRow, RowError> {
		let name = non_blank(row, &registry.identity_column).ok_or_else(|| {
			RowError::MissingIdentity {
				column: registry.identity_column.clone(),
			}
		})?;

		let categories = registry
			.categories
			.iter()
			.map(|category| CategoryValues {
				group: category.group.clone(),
				values: row
					.get(&category.column)
					.map(|cell| registry.split_cell(cell).map(String::from).collect())
					.unwrap_or_default(),
			})
			.collect();

		let mut skipped_fields = Vec::new();
		let cell = registry
			.location
			.as_ref()
			.and_then(|field| row.get(&field.column).map(|cell| (field, cell)));
		let location = match cell {
			Some((field, cell)) => match Location::parse(cell, field) {
				Ok(location) => location,
				Err(err) => {
					skipped_fields.push(err);
					None
				}
			},
			None => None,
		};

		let details = &registry.details;
		let detail = DetailRecord {
			name: name.into(),
			photo: resolve_photo(non_blank(row, &details.photo), &registry.default_photo),
			telegram: non_blank(row, &details.telegram).map(String::from),
			email: non_blank(row, &details.email).map(String::from),
		};

		Ok(ParsedRow {
			record: Record {
				name: name.into(),
				categories,
				location,
				detail,
			},
			skipped_fields,
		})
	}
}
