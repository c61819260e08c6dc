//! Turning a JSON document into rows.

use std::collections::BTreeMap;

use log::warn;
use serde_json::Value;

use super::error::DatasetError;

/// One source row: field name to raw cell text.
pub type Row = BTreeMap<String, String>;

fn kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}

fn cell(value: Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		Value::Null | Value::Array(_) | Value::Object(_) => None,
	}
}

/// Parse a JSON array of objects into rows.
///
/// Scalars are stringified, `null` and nested values are treated as absent.
/// Array items that are not objects are skipped with a warning.
pub fn parse_rows(json: &str) -> Result<Vec<Row>, DatasetError> {
	let value: Value = serde_json::from_str(json)?;
	let items = match value {
		Value::Array(items) => items,
		other => return Err(DatasetError::Shape(kind(&other))),
	};

	let mut rows: Vec<Row> = Vec::with_capacity(items.len());
	for (index, item) in items.into_iter().enumerate() {
		match item {
			Value::Object(fields) => rows.push(
				fields
					.into_iter()
					.filter_map(|(key, value)| cell(value).map(|v| (key, v)))
					.collect(),
			),
			other => warn!("dataset item {index} is {}, skipping", kind(&other)),
		}
	}
	Ok(rows)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_objects_and_stringifies_scalars() {
		let rows = parse_rows(r#"[{"name": "Ann", "age": 31, "active": true, "email": null}]"#)
			.unwrap();
		assert_eq!(rows.len(), 1);
		assert_eq!(rows[0]["name"], "Ann");
		assert_eq!(rows[0]["age"], "31");
		assert_eq!(rows[0]["active"], "true");
		assert!(!rows[0].contains_key("email"));
	}

	#[test]
	fn skips_non_object_items() {
		let rows = parse_rows(r#"[1, {"name": "Bo"}, "x"]"#).unwrap();
		assert_eq!(rows.len(), 1);
		assert_eq!(rows[0]["name"], "Bo");
	}

	#[test]
	fn rejects_non_array_document() {
		assert!(matches!(
			parse_rows(r#"{"name": "Ann"}"#),
			Err(DatasetError::Shape("an object"))
		));
	}

	#[test]
	fn rejects_invalid_json() {
		assert!(matches!(parse_rows("[{"), Err(DatasetError::Json(_))));
	}
}
