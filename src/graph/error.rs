//! Error types for the graph core.
//!
//! Only [`DatasetError`] is fatal to a build. Everything a single row can get
//! wrong is a [`RowError`], which the builder records and skips past.

use thiserror::Error;

/// The input document could not be turned into rows.
#[derive(Error, Debug)]
pub enum DatasetError {
	/// Not valid JSON at all.
	#[error("dataset is not valid JSON: {0}")]
	Json(#[from] serde_json::Error),

	/// Valid JSON, but not an array of objects.
	#[error("dataset must be an array of objects, found {0}")]
	Shape(&'static str),
}

/// The category registry is unusable.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
	/// The identity column name is blank.
	#[error("identity column must not be empty")]
	EmptyIdentityColumn,

	/// A category or location group is named after a reserved group.
	#[error("group name `{0}` is reserved")]
	ReservedGroup(String),

	/// Two categories (or a category and a location tier) share a group name.
	#[error("group name `{0}` is declared more than once")]
	DuplicateGroup(String),

	/// A category or location column has no name.
	#[error("column for group `{0}` must not be empty")]
	EmptyColumn(String),

	/// A group name contains the id separator and would produce ambiguous ids.
	#[error("group name `{0}` must not contain `::`")]
	SeparatorInGroup(String),
}

/// Why a row or one of its fields was skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
	/// The identity cell is missing or blank, so the whole row is dropped.
	#[error("row has no `{column}` value")]
	MissingIdentity {
		/// Configured identity column.
		column: String,
	},

	/// The location cell does not split into exactly two non-empty parts.
	#[error("location `{value}` has {parts} part(s), expected 2")]
	MalformedLocation {
		/// Raw cell content.
		value: String,
		/// Number of non-empty parts found.
		parts: usize,
	},
}

/// A transport payload could not be decoded.
#[derive(Error, Debug)]
pub enum PayloadError {
	/// The payload text is not a valid payload document.
	#[error("payload is not valid JSON: {0}")]
	Json(#[from] serde_json::Error),

	/// A link points at a node that is not part of the payload.
	#[error("link `{source_id}` -> `{target_id}` references a missing node")]
	DanglingLink {
		/// Link source id.
		source_id: String,
		/// Link target id.
		target_id: String,
	},

	/// A detail entry is keyed by a node that is not part of the payload.
	#[error("detail `{0}` has no matching node")]
	OrphanDetail(String),

	/// Two nodes in the payload share an id.
	#[error("node `{0}` appears more than once")]
	DuplicateNode(String),
}

/// The bundled dataset could not be loaded at all.
#[derive(Error, Debug)]
pub enum LoadError {
	/// The document is unreadable.
	#[error(transparent)]
	Dataset(#[from] DatasetError),

	/// The registry is invalid.
	#[error(transparent)]
	Registry(#[from] RegistryError),
}
