use crate::graph::DetailRecord;

/// Per-node data carried inside the physics graph.
#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: String,
	pub label: String,
	pub color: String,
	pub is_identity: bool,
}

/// A detail card anchored near the pointer.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveDetail {
	pub node_id: String,
	pub detail: DetailRecord,
	pub x: f64,
	pub y: f64,
}

/// Outcome of a click on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub enum Activation {
	/// An identity node was activated; show its card.
	Detail(ActiveDetail),
	/// A value node was activated; highlight only.
	Selected(String),
	/// Empty space was clicked.
	Cleared,
}

impl Activation {
	/// The card to show, if any.
	pub fn into_detail(self) -> Option<ActiveDetail> {
		match self {
			Activation::Detail(detail) => Some(detail),
			Activation::Selected(_) | Activation::Cleared => None,
		}
	}
}
