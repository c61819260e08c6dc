//! Canonical graph entities.

use serde::{Deserialize, Serialize};

use super::color::{IDENTITY_GROUP, color_for};

/// Build the id of a node from its group and value.
pub fn node_id(group: &str, value: &str) -> String {
	format!("{group}::{value}")
}

/// Id of the identity node for a record key.
pub fn identity_id(name: &str) -> String {
	node_id(IDENTITY_GROUP, name)
}

/// A graph vertex.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
	/// Globally unique `group::value` id.
	pub id: String,
	/// Display string.
	pub label: String,
	/// Category tag, or `identity`.
	pub group: String,
	/// Fill color derived from `group`.
	pub color: String,
}

impl Node {
	/// Create a node, deriving id and color from group and value.
	pub fn new(group: &str, value: &str) -> Self {
		Self {
			id: node_id(group, value),
			label: value.into(),
			group: group.into(),
			color: color_for(group).into(),
		}
	}

	/// Whether the node stands for a record rather than a category value.
	pub fn is_identity(&self) -> bool {
		self.group == IDENTITY_GROUP
	}

	/// Replace the display label, keeping id and color.
	pub fn with_label(mut self, label: &str) -> Self {
		self.label = label.into();
		self
	}
}

/// An association between two node ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
	/// First endpoint.
	pub source: String,
	/// Second endpoint.
	pub target: String,
}

impl Edge {
	/// Create an edge between two ids.
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
		}
	}

	/// Order-sensitive dedup key.
	pub fn key(&self) -> String {
		format!("{}___{}", self.source, self.target)
	}

	/// Whether `id` is one of the endpoints.
	pub fn touches(&self, id: &str) -> bool {
		self.source == id || self.target == id
	}
}

/// Presentation-only data for an identity node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
	/// Display name.
	pub name: String,
	/// Directly embeddable image URL.
	pub photo: String,
	/// Telegram handle.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub telegram: Option<String>,
	/// Contact email.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
}
