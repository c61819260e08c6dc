//! Rows -> deduplicated node/edge sets.

use indexmap::IndexMap;
use log::{debug, info, warn};

use super::color::IDENTITY_GROUP;
use super::dataset::{Row, parse_rows};
use super::error::{LoadError, RegistryError, RowError};
use super::model::{DetailRecord, Edge, Node};
use super::record::Record;
use super::registry::CategoryRegistry;

/// The full graph of one dataset. Immutable once built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
	nodes: IndexMap<String, Node>,
	edges: IndexMap<String, Edge>,
	details: IndexMap<String, DetailRecord>,
	category_values: IndexMap<String, Vec<String>>,
}

impl Graph {
	/// Nodes in first-insertion order.
	pub fn nodes(&self) -> impl ExactSizeIterator<Item = &Node> {
		self.nodes.values()
	}

	/// Edges in first-insertion order.
	pub fn edges(&self) -> impl ExactSizeIterator<Item = &Edge> {
		self.edges.values()
	}

	/// Look a node up by id.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.get(id)
	}

	/// Number of nodes.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Number of edges.
	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	/// Detail records keyed by identity node id.
	pub fn details(&self) -> &IndexMap<String, DetailRecord> {
		&self.details
	}

	/// Detail record of one identity node.
	pub fn detail(&self, id: &str) -> Option<&DetailRecord> {
		self.details.get(id)
	}

	/// Distinct values seen for a group, in first-seen order.
	pub fn category_values(&self, group: &str) -> &[String] {
		self.category_values
			.get(group)
			.map(Vec::as_slice)
			.unwrap_or(&[])
	}
}

/// A row or field the builder skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildWarning {
	/// Zero-based index of the source row.
	pub row: usize,
	/// What was wrong with it.
	pub error: RowError,
}

/// Summary of one build.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
	/// Rows handed to the builder.
	pub rows: usize,
	/// Distinct records that made it into the graph.
	pub records: usize,
	/// Rows that replaced an earlier row with the same identity key.
	pub duplicates: usize,
	/// Skipped rows and fields.
	pub warnings: Vec<BuildWarning>,
}

/// Mutable state of a build in progress. The only writer of graph content.
pub struct BuildContext<'r> {
	registry: &'r CategoryRegistry,
	graph: Graph,
}

impl<'r> BuildContext<'r> {
	/// Start an empty build. Every filterable group gets an empty value set.
	pub fn new(registry: &'r CategoryRegistry) -> Self {
		let mut graph = Graph::default();
		for group in registry.filter_groups() {
			graph.category_values.insert(group.group, Vec::new());
		}
		Self { registry, graph }
	}

	/// Insert a node unless its id is taken. Returns whether it was new.
	pub fn add_node(&mut self, node: Node) -> bool {
		if self.graph.nodes.contains_key(&node.id) {
			return false;
		}
		self.graph.nodes.insert(node.id.clone(), node);
		true
	}

	/// Insert an edge unless its key is taken. Self-loops are dropped.
	pub fn add_edge(&mut self, source: &str, target: &str) -> bool {
		if source == target {
			debug!("dropping self-loop on {source}");
			return false;
		}
		let edge = Edge::new(source, target);
		let key = edge.key();
		if self.graph.edges.contains_key(&key) {
			return false;
		}
		self.graph.edges.insert(key, edge);
		true
	}

	/// Add a value node of `group` and link it from `from`. Returns the value node id.
	fn add_value(&mut self, from: &str, group: &str, value: &str, label: &str) -> String {
		let node = Node::new(group, value).with_label(label);
		let id = node.id.clone();
		if self.add_node(node) {
			self.graph
				.category_values
				.entry(group.to_owned())
				.or_default()
				.push(value.to_owned());
		}
		self.add_edge(from, &id);
		id
	}

	/// Add one record's identity node, value nodes, edges and detail.
	pub fn add_record(&mut self, record: &Record) {
		let identity = Node::new(IDENTITY_GROUP, &record.name);
		let id = identity.id.clone();
		self.add_node(identity);

		for category in &record.categories {
			for value in &category.values {
				self.add_value(&id, &category.group, value, value);
			}
		}

		let registry = self.registry;
		if let (Some(field), Some(location)) = (&registry.location, &record.location) {
			let subregion = self.add_value(
				&id,
				&field.subregion_group,
				&location.subregion_key(),
				&location.subregion,
			);
			self.add_value(
				&subregion,
				&field.region_group,
				&location.region,
				&location.region,
			);
		}

		self.graph.details.insert(id, record.detail.clone());
	}

	/// Freeze the build.
	pub fn finish(self) -> Graph {
		self.graph
	}
}

/// Build the full graph of a dataset.
///
/// Rows without an identity key and malformed fields are skipped and
/// reported. Duplicate identity keys collapse last-write-wins, keeping the
/// position of the first occurrence.
pub fn build(
	rows: &[Row],
	registry: &CategoryRegistry,
) -> Result<(Graph, BuildReport), RegistryError> {
	registry.validate()?;

	let mut report = BuildReport {
		rows: rows.len(),
		..Default::default()
	};
	let mut records: IndexMap<String, Record> = IndexMap::new();

	for (index, row) in rows.iter().enumerate() {
		match Record::from_row(row, registry) {
			Ok(parsed) => {
				for error in parsed.skipped_fields {
					warn!("row {index}: skipping field: {error}");
					report.warnings.push(BuildWarning { row: index, error });
				}
				let name = parsed.record.name.clone();
				if let Some(previous) = records.insert(name, parsed.record) {
					debug!("row {index}: `{}` replaces an earlier row", previous.name);
					report.duplicates += 1;
				}
			}
			Err(error) => {
				warn!("row {index}: skipping row: {error}");
				report.warnings.push(BuildWarning { row: index, error });
			}
		}
	}

	let mut ctx = BuildContext::new(registry);
	for record in records.values() {
		ctx.add_record(record);
	}
	let graph = ctx.finish();
	report.records = records.len();

	info!(
		"built graph: {} records, {} nodes, {} edges, {} warnings",
		report.records,
		graph.node_count(),
		graph.edge_count(),
		report.warnings.len()
	);
	debug_assert!(graph.details.keys().all(|id| graph.nodes.contains_key(id)));
	debug_assert_eq!(
		graph.details.len(),
		graph.nodes().filter(|n| n.is_identity()).count()
	);
	Ok((graph, report))
}

/// Parse a JSON dataset and build its graph in one go.
pub fn load(json: &str, registry: &CategoryRegistry) -> Result<(Graph, BuildReport), LoadError> {
	let rows = parse_rows(json)?;
	Ok(build(&rows, registry)?)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::registry::CategoryField;

	fn row(pairs: &[(&str, &str)]) -> Row {
		pairs
			.iter()
			.map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
			.collect()
	}

	fn ids(graph: &Graph) -> Vec<&str> {
		graph.nodes().map(|n| n.id.as_str()).collect()
	}

	#[test]
	fn builds_identity_value_and_location_nodes() {
		let rows = vec![row(&[
			("name", "Ann"),
			("role", "painter, curator"),
			("field", "video"),
			("city", "Georgia, Tbilisi"),
		])];
		let (graph, report) = build(&rows, &CategoryRegistry::default()).unwrap();

		assert_eq!(
			ids(&graph),
			vec![
				"identity::Ann",
				"role::painter",
				"role::curator",
				"field::video",
				"subregion::Georgia/Tbilisi",
				"region::Georgia",
			]
		);
		let edges: Vec<_> = graph.edges().map(Edge::key).collect();
		assert_eq!(
			edges,
			vec![
				"identity::Ann___role::painter",
				"identity::Ann___role::curator",
				"identity::Ann___field::video",
				"identity::Ann___subregion::Georgia/Tbilisi",
				"subregion::Georgia/Tbilisi___region::Georgia",
			]
		);
		assert_eq!(graph.category_values("role"), ["painter", "curator"]);
		assert_eq!(graph.category_values("region"), ["Georgia"]);
		assert_eq!(graph.category_values("subregion"), ["Georgia/Tbilisi"]);
		assert_eq!(graph.node("subregion::Georgia/Tbilisi").unwrap().label, "Tbilisi");
		assert_eq!(graph.detail("identity::Ann").unwrap().name, "Ann");
		assert_eq!(report.records, 1);
		assert!(report.warnings.is_empty());
	}

	#[test]
	fn shared_values_are_one_node() {
		let rows = vec![
			row(&[("name", "Ann"), ("role", "painter")]),
			row(&[("name", "Bo"), ("role", "painter, painter")]),
		];
		let (graph, _) = build(&rows, &CategoryRegistry::default()).unwrap();
		assert_eq!(graph.node_count(), 3);
		assert_eq!(graph.edge_count(), 2);
		assert_eq!(graph.category_values("role"), ["painter"]);
	}

	#[test]
	fn add_node_and_edge_are_idempotent() {
		let registry = CategoryRegistry::default();
		let mut ctx = BuildContext::new(&registry);
		assert!(ctx.add_node(Node::new("role", "x")));
		assert!(!ctx.add_node(Node::new("role", "x")));
		assert!(ctx.add_edge("a", "b"));
		assert!(!ctx.add_edge("a", "b"));
		assert!(ctx.add_edge("b", "a"));
		assert!(!ctx.add_edge("a", "a"));
		let graph = ctx.finish();
		assert_eq!(graph.node_count(), 1);
		assert_eq!(graph.edge_count(), 2);
	}

	#[test]
	fn bad_rows_and_fields_are_skipped() {
		let rows = vec![
			row(&[("role", "painter")]),
			row(&[("name", "Ann"), ("city", "Atlantis")]),
			row(&[("name", "Bo"), ("city", "")]),
		];
		let (graph, report) = build(&rows, &CategoryRegistry::default()).unwrap();
		assert_eq!(ids(&graph), vec!["identity::Ann", "identity::Bo"]);
		assert_eq!(graph.edge_count(), 0);
		assert_eq!(report.rows, 3);
		assert_eq!(report.records, 2);
		let rows_warned: Vec<_> = report.warnings.iter().map(|w| w.row).collect();
		assert_eq!(rows_warned, vec![0, 1]);
	}

	#[test]
	fn duplicate_identity_is_last_write_wins() {
		let rows = vec![
			row(&[("name", "Ann"), ("role", "painter"), ("email", "old@x")]),
			row(&[("name", "Bo"), ("role", "dj")]),
			row(&[("name", " Ann "), ("role", "curator"), ("email", "new@x")]),
		];
		let (graph, report) = build(&rows, &CategoryRegistry::default()).unwrap();
		assert_eq!(report.duplicates, 1);
		assert_eq!(report.records, 2);
		assert_eq!(
			ids(&graph),
			vec!["identity::Ann", "role::curator", "identity::Bo", "role::dj"]
		);
		assert_eq!(
			graph.detail("identity::Ann").unwrap().email.as_deref(),
			Some("new@x")
		);
	}

	#[test]
	fn building_twice_is_deterministic() {
		let rows = vec![
			row(&[("name", "Ann"), ("role", "a, b"), ("city", "X, Y")]),
			row(&[("name", "Bo"), ("field", "c"), ("city", "X, Z")]),
		];
		let registry = CategoryRegistry::default();
		assert_eq!(build(&rows, &registry), build(&rows, &registry));
	}

	#[test]
	fn invalid_registry_fails_the_build() {
		let registry = CategoryRegistry {
			categories: vec![CategoryField::new("identity", "Nope")],
			..Default::default()
		};
		assert_eq!(
			build(&[], &registry),
			Err(RegistryError::ReservedGroup("identity".into()))
		);
	}

	#[test]
	fn empty_groups_report_no_values() {
		let (graph, _) = build(&[], &CategoryRegistry::default()).unwrap();
		assert!(graph.category_values("role").is_empty());
		assert!(graph.category_values("unknown").is_empty());
	}

	#[test]
	fn load_parses_and_builds() {
		let json = r#"[{"name": "Ann", "role": "painter"}, {"role": "orphan"}]"#;
		let (graph, report) = load(json, &CategoryRegistry::default()).unwrap();
		assert_eq!(graph.node_count(), 2);
		assert_eq!(report.rows, 2);
		assert_eq!(report.warnings.len(), 1);

		assert!(matches!(
			load("{}", &CategoryRegistry::default()),
			Err(LoadError::Dataset(_))
		));
	}
}
