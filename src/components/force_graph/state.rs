use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use indexmap::IndexMap;
use log::debug;

use super::simulation::{
	Simulation, SimulationConfig, Stimulus, centering_shift, link_displacements,
};
use super::types::{ActiveDetail, Activation, NodeInfo};
use crate::graph::{DetailRecord, GraphPayload};

/// Seconds for the selection highlight to reach full strength.
const HIGHLIGHT_SECS: f64 = 0.2;
/// Radius of the circle new nodes are seeded on.
const SEED_RADIUS: f64 = 100.0;

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
	pub moved: bool,
}

/// The activated node and the nodes its edges lead to.
#[derive(Clone, Debug, Default)]
pub struct SelectionState {
	pub node: Option<DefaultNodeIdx>,
	pub node_id: Option<String>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
}

pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub selection: SelectionState,
	pub width: f64,
	pub height: f64,
	pub simulation: Simulation,
	details: IndexMap<String, DetailRecord>,
	id_to_idx: HashMap<String, DefaultNodeIdx>,
	edges: Vec<(DefaultNodeIdx, DefaultNodeIdx)>,
}

fn parameters(config: &SimulationConfig) -> SimulationParameters {
	SimulationParameters {
		force_charge: config.charge,
		// springs with a rest length are applied by `apply_links`
		force_spring: 0.0,
		force_max: config.force_max,
		node_speed: config.node_speed,
		damping_factor: config.damping,
	}
}

impl ForceGraphState {
	pub fn new(data: &GraphPayload, width: f64, height: f64) -> Self {
		Self::with_config(data, width, height, SimulationConfig::default())
	}

	pub fn with_config(
		data: &GraphPayload,
		width: f64,
		height: f64,
		config: SimulationConfig,
	) -> Self {
		let mut state = Self {
			graph: ForceGraph::new(parameters(&config)),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			selection: SelectionState::default(),
			width,
			height,
			simulation: Simulation::new(config),
			details: IndexMap::new(),
			id_to_idx: HashMap::new(),
			edges: Vec::new(),
		};
		state.load(data);
		state
	}

	/// Replace the visible subgraph and re-energise the layout.
	///
	/// Nodes that were already on screen keep their position; new ones are
	/// seeded on a circle around the viewport center. Returns whether the
	/// activated node is still present.
	pub fn load(&mut self, data: &GraphPayload) -> bool {
		let mut previous: HashMap<String, (f32, f32)> = HashMap::new();
		self.graph.visit_nodes(|node| {
			previous.insert(node.data.user_data.id.clone(), (node.x(), node.y()));
		});

		if let Some(idx) = self.drag.node_idx {
			self.set_anchor(idx, false);
		}
		self.drag = DragState::default();

		let mut graph = ForceGraph::new(parameters(&self.simulation.config));
		let mut id_to_idx = HashMap::with_capacity(data.nodes.len());
		let mut edges = Vec::with_capacity(data.links.len());
		let (cx, cy) = self.view_center();
		let fresh = data
			.nodes
			.iter()
			.filter(|n| !previous.contains_key(&n.id))
			.count()
			.max(1);
		let mut seeded = 0;

		for node in &data.nodes {
			if id_to_idx.contains_key(&node.id) {
				continue;
			}
			let (x, y) = match previous.get(&node.id) {
				Some(&pos) => pos,
				None => {
					let angle = (seeded as f64) * 2.0 * PI / fresh as f64;
					seeded += 1;
					(
						(cx + SEED_RADIUS * angle.cos()) as f32,
						(cy + SEED_RADIUS * angle.sin()) as f32,
					)
				}
			};
			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeInfo {
					id: node.id.clone(),
					label: node.label.clone(),
					color: node.color.clone(),
					is_identity: node.is_identity(),
				},
			});
			id_to_idx.insert(node.id.clone(), idx);
		}

		for link in &data.links {
			if let (Some(&src), Some(&tgt)) =
				(id_to_idx.get(&link.source), id_to_idx.get(&link.target))
			{
				graph.add_edge(src, tgt, EdgeData::default());
				edges.push((src, tgt));
			}
		}

		self.graph = graph;
		self.id_to_idx = id_to_idx;
		self.edges = edges;
		self.details = data.details.clone();

		let kept = self
			.selection
			.node_id
			.as_ref()
			.and_then(|id| self.id_to_idx.get(id).copied());
		match kept {
			Some(idx) => self.select(idx),
			None => self.selection = SelectionState::default(),
		}

		self.simulation.apply(Stimulus::Inject);
		debug!(
			"loaded {} nodes ({} new), {} edges",
			self.id_to_idx.len(),
			seeded,
			self.edges.len()
		);
		kept.is_some()
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// World point under the middle of the viewport.
	pub fn view_center(&self) -> (f64, f64) {
		self.screen_to_graph(self.width / 2.0, self.height / 2.0)
	}

	pub fn node_position(&self, idx: DefaultNodeIdx) -> Option<(f32, f32)> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some((node.x(), node.y()));
			}
		});
		found
	}

	fn node_info(&self, idx: DefaultNodeIdx) -> Option<NodeInfo> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some(node.data.user_data.clone());
			}
		});
		found
	}

	fn set_anchor(&mut self, idx: DefaultNodeIdx, anchored: bool) {
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.is_anchor = anchored;
			}
		});
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let hit_radius = self.simulation.config.hit_radius;
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// hit radius is in world-space, scales with zoom like nodes
			if (dx * dx + dy * dy).sqrt() < hit_radius {
				found = Some(node.index());
			}
		});
		found
	}

	/// Press: grab the node under the pointer, or start panning.
	pub fn pointer_down(&mut self, x: f64, y: f64) {
		if let Some(idx) = self.node_at_position(x, y) {
			let (nx, ny) = self.node_position(idx).unwrap_or_default();
			self.drag = DragState {
				active: true,
				node_idx: Some(idx),
				start_x: x,
				start_y: y,
				node_start_x: nx,
				node_start_y: ny,
				moved: false,
			};
			self.set_anchor(idx, true);
			self.simulation.apply(Stimulus::PointerDown);
		} else {
			self.pan = PanState {
				active: true,
				start_x: x,
				start_y: y,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
				moved: false,
			};
		}
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		let slop = self.simulation.config.click_slop;
		if self.drag.active {
			let Some(idx) = self.drag.node_idx else {
				return;
			};
			let (sx, sy) = (x - self.drag.start_x, y - self.drag.start_y);
			if sx.hypot(sy) > slop {
				self.drag.moved = true;
			}
			let (nx, ny) = (
				self.drag.node_start_x + (sx / self.transform.k) as f32,
				self.drag.node_start_y + (sy / self.transform.k) as f32,
			);
			self.graph.visit_nodes_mut(|node| {
				if node.index() == idx {
					node.data.x = nx;
					node.data.y = ny;
				}
			});
		} else if self.pan.active {
			let (sx, sy) = (x - self.pan.start_x, y - self.pan.start_y);
			if sx.hypot(sy) > slop {
				self.pan.moved = true;
			}
			self.transform.x = self.pan.transform_start_x + sx;
			self.transform.y = self.pan.transform_start_y + sy;
		}
	}

	/// Release: end the gesture. A release without travel is a click.
	pub fn pointer_up(&mut self, x: f64, y: f64) -> Option<Activation> {
		if self.drag.active {
			let (idx, moved) = (self.drag.node_idx, self.drag.moved);
			self.release_drag(Stimulus::PointerUp);
			return match (idx, moved) {
				(Some(idx), false) => Some(self.activate(idx, x, y)),
				_ => None,
			};
		}
		if self.pan.active {
			let moved = self.pan.moved;
			self.pan = PanState::default();
			if !moved {
				self.selection = SelectionState::default();
				return Some(Activation::Cleared);
			}
		}
		None
	}

	/// Pointer left the canvas: drop any gesture without activating anything.
	pub fn cancel(&mut self) {
		if self.drag.active {
			self.release_drag(Stimulus::PointerCancel);
		}
		self.pan = PanState::default();
	}

	fn release_drag(&mut self, stimulus: Stimulus) {
		if let Some(idx) = self.drag.node_idx {
			self.set_anchor(idx, false);
		}
		self.drag = DragState::default();
		self.simulation.apply(stimulus);
	}

	/// Zoom around a screen point.
	pub fn zoom(&mut self, x: f64, y: f64, zoom_in: bool) {
		let factor = if zoom_in { 1.1 } else { 0.9 };
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Make `idx` the activated node and resolve what to show for it.
	pub fn activate(&mut self, idx: DefaultNodeIdx, x: f64, y: f64) -> Activation {
		let Some(info) = self.node_info(idx) else {
			self.selection = SelectionState::default();
			return Activation::Cleared;
		};
		self.select(idx);
		match self.details.get(&info.id) {
			Some(detail) if info.is_identity => Activation::Detail(ActiveDetail {
				node_id: info.id,
				detail: detail.clone(),
				x,
				y,
			}),
			_ => Activation::Selected(info.id),
		}
	}

	fn select(&mut self, idx: DefaultNodeIdx) {
		if self.selection.node != Some(idx) {
			self.selection.highlight_t = 0.0;
		}
		self.selection.node = Some(idx);
		self.selection.node_id = self.node_info(idx).map(|info| info.id);
		self.selection.neighbors = self
			.edges
			.iter()
			.filter_map(|&(src, tgt)| {
				if src == idx {
					Some(tgt)
				} else if tgt == idx {
					Some(src)
				} else {
					None
				}
			})
			.collect();
	}

	pub fn is_selected(&self, idx: DefaultNodeIdx) -> bool {
		self.selection.node == Some(idx)
	}

	/// Whether `idx` shares an edge with the activated node.
	pub fn is_neighbor(&self, idx: DefaultNodeIdx) -> bool {
		self.selection.neighbors.contains(&idx)
	}

	pub fn is_highlighted_edge(&self, a: DefaultNodeIdx, b: DefaultNodeIdx) -> bool {
		self.is_selected(a) || self.is_selected(b)
	}

	/// One animation frame: ease the highlight, then integrate unless idle.
	pub fn tick(&mut self, dt: f32) {
		if self.selection.node.is_some() {
			self.selection.highlight_t =
				(self.selection.highlight_t + dt as f64 / HIGHLIGHT_SECS).min(1.0);
		}

		let Some(alpha) = self.simulation.step() else {
			return;
		};
		self.graph.update(dt * alpha.min(1.0));
		self.apply_links(alpha);
		self.apply_centering();
	}

	fn apply_links(&mut self, alpha: f32) {
		let mut positions = HashMap::with_capacity(self.id_to_idx.len());
		self.graph.visit_nodes(|node| {
			positions.insert(node.index(), (node.x(), node.y()));
		});
		let config = &self.simulation.config;
		let moves = link_displacements(
			&positions,
			&self.edges,
			self.drag.node_idx,
			config.link_distance,
			config.link_strength,
			alpha,
		);
		self.graph.visit_nodes_mut(|node| {
			if let Some(&(dx, dy)) = moves.get(&node.index()) {
				node.data.x += dx;
				node.data.y += dy;
			}
		});
	}

	fn apply_centering(&mut self) {
		let mut points = Vec::with_capacity(self.id_to_idx.len());
		self.graph.visit_nodes(|node| points.push((node.x(), node.y())));
		let (cx, cy) = self.view_center();
		let (sx, sy) = centering_shift(
			points,
			(cx as f32, cy as f32),
			self.simulation.config.center_strength,
		);
		self.graph.visit_nodes_mut(|node| {
			if !node.data.is_anchor {
				node.data.x += sx;
				node.data.y += sy;
			}
		});
	}

	/// Follow a viewport resize, keeping the world point at the center fixed.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.transform.x += (width - self.width) / 2.0;
		self.transform.y += (height - self.height) / 2.0;
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
impl ForceGraphState {
	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(
			gx * self.transform.k + self.transform.x,
			gy * self.transform.k + self.transform.y,
		)
	}

	pub fn node_index(&self, id: &str) -> Option<DefaultNodeIdx> {
		self.id_to_idx.get(id).copied()
	}

	pub fn node_count(&self) -> usize {
		self.id_to_idx.len()
	}

	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	pub fn is_pinned(&self, idx: DefaultNodeIdx) -> bool {
		let mut pinned = false;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				pinned = node.data.is_anchor;
			}
		});
		pinned
	}

	pub fn is_running(&self) -> bool {
		self.simulation.phase() != super::simulation::Phase::Idle
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::simulation::Phase;
	use crate::graph::{
		CategoryRegistry, FilterSelection, GraphPayload, OrphanPolicy, Row, build,
		visible_subgraph,
	};

	fn row(pairs: &[(&str, &str)]) -> Row {
		pairs
			.iter()
			.map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
			.collect()
	}

	fn payload(selection: &FilterSelection) -> GraphPayload {
		let rows = vec![
			row(&[("name", "A"), ("role", "x"), ("email", "a@example.org")]),
			row(&[("name", "B"), ("role", "x, y"), ("telegram", "@b")]),
			row(&[("name", "C"), ("role", "y")]),
		];
		let (graph, _) = build(&rows, &CategoryRegistry::default()).unwrap();
		let sub = visible_subgraph(&graph, selection, OrphanPolicy::Keep);
		GraphPayload::pack(&sub, graph.details())
	}

	fn screen_pos(state: &ForceGraphState, id: &str) -> (f64, f64) {
		let idx = state.node_index(id).unwrap();
		let (x, y) = state.node_position(idx).unwrap();
		state.graph_to_screen(x as f64, y as f64)
	}

	fn click(state: &mut ForceGraphState, (x, y): (f64, f64)) -> Option<Activation> {
		state.pointer_down(x, y);
		state.pointer_up(x, y)
	}

	#[test]
	fn load_injects_nodes_and_starts_simulating() {
		let state = ForceGraphState::new(&payload(&FilterSelection::new()), 800.0, 600.0);
		assert_eq!(state.node_count(), 5);
		assert_eq!(state.edge_count(), 4);
		assert_eq!(state.simulation.phase(), Phase::Simulating);
		assert_eq!(state.view_center(), (0.0, 0.0));
	}

	#[test]
	fn reload_keeps_surviving_positions() {
		let mut state = ForceGraphState::new(&payload(&FilterSelection::new()), 800.0, 600.0);
		for _ in 0..20 {
			state.tick(0.016);
		}
		let before = state.node_position(state.node_index("identity::A").unwrap());

		let mut selection = FilterSelection::new();
		selection.select("role", "x");
		state.load(&payload(&selection));
		assert!(state.node_index("identity::C").is_none());
		assert_eq!(
			state.node_position(state.node_index("identity::A").unwrap()),
			before
		);
		assert_eq!(state.simulation.phase(), Phase::Simulating);
		assert!((state.simulation.alpha() - 1.0).abs() < f32::EPSILON);
	}

	#[test]
	fn clicking_identity_shows_its_detail() {
		let mut state = ForceGraphState::new(&payload(&FilterSelection::new()), 800.0, 600.0);
		let pos = screen_pos(&state, "identity::A");
		let Some(Activation::Detail(card)) = click(&mut state, pos) else {
			panic!("expected a detail card");
		};
		assert_eq!(card.node_id, "identity::A");
		assert_eq!(card.detail.email.as_deref(), Some("a@example.org"));
		assert_eq!((card.x, card.y), pos);
		let idx = state.node_index("identity::A").unwrap();
		assert!(state.is_selected(idx));
		let role_x = state.node_index("role::x").unwrap();
		assert!(state.is_highlighted_edge(idx, role_x));
		assert!(state.is_neighbor(role_x));
		assert!(!state.is_neighbor(state.node_index("role::y").unwrap()));
	}

	#[test]
	fn activating_another_node_replaces_the_detail() {
		let mut state = ForceGraphState::new(&payload(&FilterSelection::new()), 800.0, 600.0);
		let (a_pos, b_pos) = (
			screen_pos(&state, "identity::A"),
			screen_pos(&state, "identity::B"),
		);
		let first = click(&mut state, a_pos)
			.and_then(Activation::into_detail)
			.unwrap();
		let second = click(&mut state, b_pos)
			.and_then(Activation::into_detail)
			.unwrap();
		assert_eq!(first.detail.email.as_deref(), Some("a@example.org"));
		assert_eq!(second.detail.name, "B");
		assert_eq!(second.detail.email, None);
		assert_eq!(second.detail.telegram.as_deref(), Some("@b"));

		let a = state.node_index("identity::A").unwrap();
		let b = state.node_index("identity::B").unwrap();
		let role_x = state.node_index("role::x").unwrap();
		assert!(!state.is_selected(a));
		assert!(state.is_selected(b));
		assert!(state.is_highlighted_edge(b, role_x));
	}

	#[test]
	fn clicking_value_node_highlights_without_card() {
		let mut state = ForceGraphState::new(&payload(&FilterSelection::new()), 800.0, 600.0);
		let pos = screen_pos(&state, "role::y");
		let hit = click(&mut state, pos);
		assert_eq!(hit, Some(Activation::Selected("role::y".into())));
	}

	#[test]
	fn clicking_empty_space_clears() {
		let mut state = ForceGraphState::new(&payload(&FilterSelection::new()), 800.0, 600.0);
		let pos = screen_pos(&state, "identity::A");
		click(&mut state, pos);
		assert_eq!(click(&mut state, (5.0, 5.0)), Some(Activation::Cleared));
		assert!(state.selection.node.is_none());
	}

	#[test]
	fn drag_pins_then_releases() {
		let mut state = ForceGraphState::new(&payload(&FilterSelection::new()), 800.0, 600.0);
		let (x, y) = screen_pos(&state, "identity::C");
		let idx = state.node_index("identity::C").unwrap();

		state.pointer_down(x, y);
		assert_eq!(state.simulation.phase(), Phase::Dragging);
		assert!(state.is_pinned(idx));
		state.pointer_move(x + 50.0, y);
		let pinned_at = state.node_position(idx).unwrap();
		for _ in 0..30 {
			state.tick(0.016);
		}
		assert_eq!(state.node_position(idx), Some(pinned_at));

		assert_eq!(state.pointer_up(x + 50.0, y), None);
		assert!(!state.is_pinned(idx));
		assert_eq!(state.simulation.phase(), Phase::Simulating);
		assert!(state.selection.node.is_none());
	}

	#[test]
	fn reload_during_drag_releases_the_pin() {
		let data = payload(&FilterSelection::new());
		let mut state = ForceGraphState::new(&data, 800.0, 600.0);
		let (x, y) = screen_pos(&state, "identity::C");
		state.pointer_down(x, y);
		assert_eq!(state.simulation.phase(), Phase::Dragging);

		state.load(&data);
		let idx = state.node_index("identity::C").unwrap();
		assert!(!state.is_pinned(idx));
		assert!(!state.drag.active);
		assert_eq!(state.drag.node_idx, None);
		assert_eq!(state.simulation.phase(), Phase::Simulating);
		assert_eq!(state.pointer_up(x, y), None);
		assert_eq!(state.simulation.phase(), Phase::Simulating);
	}

	#[test]
	fn cancel_releases_the_pin() {
		let mut state = ForceGraphState::new(&payload(&FilterSelection::new()), 800.0, 600.0);
		let (x, y) = screen_pos(&state, "identity::B");
		let idx = state.node_index("identity::B").unwrap();
		state.pointer_down(x, y);
		state.cancel();
		assert!(!state.is_pinned(idx));
		assert!(!state.drag.active);
		assert_eq!(state.simulation.phase(), Phase::Simulating);
	}

	#[test]
	fn filter_change_drops_vanished_selection() {
		let mut state = ForceGraphState::new(&payload(&FilterSelection::new()), 800.0, 600.0);
		let pos = screen_pos(&state, "identity::C");
		click(&mut state, pos);
		let mut selection = FilterSelection::new();
		selection.select("role", "x");
		assert!(!state.load(&payload(&selection)));
		assert!(state.selection.node.is_none());

		let pos = screen_pos(&state, "identity::A");
		click(&mut state, pos);
		assert!(state.load(&payload(&FilterSelection::new())));
		assert_eq!(state.selection.node_id.as_deref(), Some("identity::A"));
	}

	#[test]
	fn layout_settles_and_stops() {
		let mut state = ForceGraphState::new(&payload(&FilterSelection::new()), 800.0, 600.0);
		let mut ticks = 0;
		while state.is_running() {
			state.tick(0.016);
			ticks += 1;
			assert!(ticks < 1000, "layout never settled");
		}
		let idx = state.node_index("identity::A").unwrap();
		let settled = state.node_position(idx);
		state.tick(0.016);
		assert_eq!(state.node_position(idx), settled);
	}

	#[test]
	fn empty_payload_is_a_valid_canvas() {
		let mut state = ForceGraphState::new(&GraphPayload::default(), 800.0, 600.0);
		assert_eq!(state.node_count(), 0);
		state.tick(0.016);
		assert_eq!(click(&mut state, (400.0, 300.0)), Some(Activation::Cleared));
	}

	#[test]
	fn resize_keeps_the_center_fixed() {
		let mut state = ForceGraphState::new(&GraphPayload::default(), 800.0, 600.0);
		let center = state.view_center();
		state.resize(1024.0, 768.0);
		assert_eq!(state.view_center(), center);
	}

	#[test]
	fn zoom_keeps_the_point_under_the_cursor() {
		let mut state = ForceGraphState::new(&GraphPayload::default(), 800.0, 600.0);
		let before = state.screen_to_graph(100.0, 100.0);
		state.zoom(100.0, 100.0, true);
		let after = state.screen_to_graph(100.0, 100.0);
		assert!((before.0 - after.0).abs() < 1e-9 && (before.1 - after.1).abs() < 1e-9);
		assert!(state.transform.k > 1.0);
	}
}
