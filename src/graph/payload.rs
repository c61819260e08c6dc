//! Transport payload handed to the rendering layer.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::error::PayloadError;
use super::filter::Subgraph;
use super::model::{DetailRecord, Edge, Node};

/// Rendering-ready snapshot of the visible subgraph.
///
/// Only the details of visible identity nodes travel with it, so its size
/// follows the subgraph rather than the full dataset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphPayload {
	/// Visible nodes.
	pub nodes: Vec<Node>,
	/// Visible edges.
	pub links: Vec<Edge>,
	/// Detail records keyed by identity node id.
	pub details: IndexMap<String, DetailRecord>,
}

impl GraphPayload {
	/// Pack a subgraph together with the details of its identity nodes.
	pub fn pack(subgraph: &Subgraph, details: &IndexMap<String, DetailRecord>) -> Self {
		let details = subgraph
			.nodes
			.iter()
			.filter(|n| n.is_identity())
			.filter_map(|n| details.get(&n.id).map(|d| (n.id.clone(), d.clone())))
			.collect();
		Self {
			nodes: subgraph.nodes.clone(),
			links: subgraph.edges.clone(),
			details,
		}
	}

	/// Serialise to the JSON transport form.
	pub fn encode(&self) -> Result<String, PayloadError> {
		Ok(serde_json::to_string(self)?)
	}

	/// Parse the JSON transport form and check it is self-consistent.
	pub fn decode(text: &str) -> Result<Self, PayloadError> {
		let payload: Self = serde_json::from_str(text)?;
		payload.validate()?;
		Ok(payload)
	}

	/// Every link and detail must refer to a node of the payload, and node ids
	/// must be unique.
	pub fn validate(&self) -> Result<(), PayloadError> {
		let mut ids = HashSet::with_capacity(self.nodes.len());
		for node in &self.nodes {
			if !ids.insert(node.id.as_str()) {
				return Err(PayloadError::DuplicateNode(node.id.clone()));
			}
		}
		if let Some(link) = self
			.links
			.iter()
			.find(|l| !ids.contains(l.source.as_str()) || !ids.contains(l.target.as_str()))
		{
			return Err(PayloadError::DanglingLink {
				source_id: link.source.clone(),
				target_id: link.target.clone(),
			});
		}
		if let Some(id) = self.details.keys().find(|id| !ids.contains(id.as_str())) {
			return Err(PayloadError::OrphanDetail(id.clone()));
		}
		Ok(())
	}

	/// Look a node up by id.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Detail record of an identity node.
	pub fn detail(&self, id: &str) -> Option<&DetailRecord> {
		self.details.get(id)
	}
}
