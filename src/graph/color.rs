//! Fixed group -> color lookup.

/// Group tag carried by every identity node.
pub const IDENTITY_GROUP: &str = "identity";

/// Color for any group the lookup does not know.
pub const DEFAULT_NODE_COLOR: &str = "#7F7A7C";

/// Color of the activated node's incident edges.
pub const HIGHLIGHT_COLOR: &str = "#6A50FF";

/// Color of ordinary edges.
pub const EDGE_COLOR: &str = "#4C4646";

/// Resolve the fill color of a node from its group.
pub fn color_for(group: &str) -> &'static str {
	match group {
		IDENTITY_GROUP => "#4C4646",
		"region" | "subregion" => "#D3DAE8",
		"field" => "#EEC0E7",
		"role" => "#F4C07C",
		_ => DEFAULT_NODE_COLOR,
	}
}
