//! Selection -> visible subgraph.
//!
//! Filters gate identity nodes only. An identity is visible when, for every
//! group with a non-empty selection, it reaches at least one selected value of
//! that group (AND across groups, OR within a group). Value nodes are
//! reached directly or through one further value node, which is how an
//! identity reaches its region via its subregion.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use log::debug;

use super::builder::Graph;
use super::model::{Edge, Node, node_id};

/// Selected values per group. An empty or missing set means "no constraint".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterSelection {
	selected: BTreeMap<String, BTreeSet<String>>,
}

impl FilterSelection {
	/// Selection with no constraints.
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a value to a group's selection.
	pub fn select(&mut self, group: &str, value: &str) {
		self.selected
			.entry(group.to_owned())
			.or_default()
			.insert(value.to_owned());
	}

	/// Remove a value from a group's selection.
	pub fn deselect(&mut self, group: &str, value: &str) {
		if let Some(values) = self.selected.get_mut(group) {
			values.remove(value);
			if values.is_empty() {
				self.selected.remove(group);
			}
		}
	}

	/// Select or deselect depending on `on`.
	pub fn toggle(&mut self, group: &str, value: &str, on: bool) {
		if on {
			self.select(group, value);
		} else {
			self.deselect(group, value);
		}
	}

	/// Replace a group's whole selection.
	pub fn set<I, S>(&mut self, group: &str, values: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
		if values.is_empty() {
			self.selected.remove(group);
		} else {
			self.selected.insert(group.to_owned(), values);
		}
	}

	/// Drop every constraint.
	pub fn clear(&mut self) {
		self.selected.clear();
	}

	/// Whether `value` is selected in `group`.
	pub fn is_selected(&self, group: &str, value: &str) -> bool {
		self.selected
			.get(group)
			.is_some_and(|values| values.contains(value))
	}

	/// Selected values of one group.
	pub fn selected(&self, group: &str) -> impl Iterator<Item = &str> {
		self.selected
			.get(group)
			.into_iter()
			.flatten()
			.map(String::as_str)
	}

	/// Whether any group carries a constraint.
	pub fn is_constrained(&self) -> bool {
		self.selected.values().any(|values| !values.is_empty())
	}

	fn constraints(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
		self.selected
			.iter()
			.filter(|(_, values)| !values.is_empty())
			.map(|(group, values)| (group.as_str(), values))
	}
}

/// What to do with value nodes no visible identity reaches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrphanPolicy {
	/// Keep them on the canvas, possibly edgeless.
	#[default]
	Keep,
	/// Drop them together with their edges.
	Prune,
}

/// The part of the graph the renderer should show.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Subgraph {
	/// Visible nodes in graph order.
	pub nodes: Vec<Node>,
	/// Edges with both endpoints visible, in graph order.
	pub edges: Vec<Edge>,
}

impl Subgraph {
	/// Whether a node id is part of the subgraph.
	pub fn contains(&self, id: &str) -> bool {
		self.nodes.iter().any(|n| n.id == id)
	}

	/// Ids of the visible identity nodes.
	pub fn identity_ids(&self) -> Vec<&str> {
		self.nodes
			.iter()
			.filter(|n| n.is_identity())
			.map(|n| n.id.as_str())
			.collect()
	}
}

fn adjacency(graph: &Graph) -> HashMap<&str, Vec<&str>> {
	let mut adjacent: HashMap<&str, Vec<&str>> = HashMap::new();
	for edge in graph.edges() {
		adjacent.entry(&edge.source).or_default().push(&edge.target);
		adjacent.entry(&edge.target).or_default().push(&edge.source);
	}
	adjacent
}

fn reachable_values<'g>(
	graph: &'g Graph,
	adjacent: &HashMap<&'g str, Vec<&'g str>>,
	identity: &str,
) -> HashSet<&'g str> {
	let is_value = |id: &str| graph.node(id).is_some_and(|n| !n.is_identity());
	let mut reached = HashSet::new();
	for &first in adjacent.get(identity).into_iter().flatten() {
		if !is_value(first) {
			continue;
		}
		reached.insert(first);
		for &second in adjacent.get(first).into_iter().flatten() {
			if is_value(second) {
				reached.insert(second);
			}
		}
	}
	reached
}

/// Compute the visible subgraph for a selection. Pure; never mutates `graph`.
pub fn visible_subgraph(
	graph: &Graph,
	selection: &FilterSelection,
	policy: OrphanPolicy,
) -> Subgraph {
	let adjacent = adjacency(graph);
	let constraints: Vec<_> = selection.constraints().collect();

	let passes = |node: &Node| {
		if !node.is_identity() || constraints.is_empty() {
			return true;
		}
		let reached = reachable_values(graph, &adjacent, &node.id);
		constraints.iter().all(|(group, values)| {
			values
				.iter()
				.any(|value| reached.contains(node_id(group, value).as_str()))
		})
	};

	let mut visible: HashSet<&str> = graph
		.nodes()
		.filter(|&node| passes(node))
		.map(|node| node.id.as_str())
		.collect();

	if policy == OrphanPolicy::Prune {
		visible = reached_from_identities(graph, &adjacent, &visible);
	}

	let subgraph = Subgraph {
		nodes: graph
			.nodes()
			.filter(|n| visible.contains(n.id.as_str()))
			.cloned()
			.collect(),
		edges: graph
			.edges()
			.filter(|e| visible.contains(e.source.as_str()) && visible.contains(e.target.as_str()))
			.cloned()
			.collect(),
	};
	debug!(
		"visible subgraph: {}/{} nodes, {}/{} edges",
		subgraph.nodes.len(),
		graph.node_count(),
		subgraph.edges.len(),
		graph.edge_count()
	);
	subgraph
}

/// Visible identities plus every visible node connected to one of them.
fn reached_from_identities<'g>(
	graph: &'g Graph,
	adjacent: &HashMap<&'g str, Vec<&'g str>>,
	visible: &HashSet<&'g str>,
) -> HashSet<&'g str> {
	let mut kept: HashSet<&str> = graph
		.nodes()
		.filter(|n| n.is_identity() && visible.contains(n.id.as_str()))
		.map(|n| n.id.as_str())
		.collect();
	let mut queue: VecDeque<&str> = kept.iter().copied().collect();
	while let Some(id) = queue.pop_front() {
		for &next in adjacent.get(id).into_iter().flatten() {
			if visible.contains(next) && kept.insert(next) {
				queue.push_back(next);
			}
		}
	}
	kept
}
