//! Layout phases, alpha energy and the forces `force_graph` does not provide.
//!
//! `force_graph` integrates charge repulsion with damping. Rest-length springs
//! along edges and the pull toward the viewport center are applied here as
//! positional passes scaled by the current energy, the same way d3 does it.

use std::collections::HashMap;
use std::hash::Hash;

/// Where the layout is in its life cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
	/// At rest, positions frozen until perturbed.
	#[default]
	Idle,
	/// Integrating toward equilibrium.
	Simulating,
	/// One node pinned to the pointer.
	Dragging,
}

/// Inputs that move the layout between phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stimulus {
	/// New nodes or edges were loaded.
	Inject,
	/// Pointer pressed over a node.
	PointerDown,
	/// Pointer released.
	PointerUp,
	/// Pointer left the canvas mid-gesture.
	PointerCancel,
	/// Energy fell below the threshold.
	Cooled,
}

/// The phase transition table.
pub fn transition(phase: Phase, stimulus: Stimulus) -> Phase {
	use Phase::*;
	use Stimulus::*;

	match (phase, stimulus) {
		(_, Inject) => Simulating,
		(_, PointerDown) => Dragging,
		(Dragging, PointerUp | PointerCancel) => Simulating,
		(Simulating, Cooled) => Idle,
		(phase, _) => phase,
	}
}

/// Tunables of the layout.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
	/// Energy after new data is injected.
	pub restart_alpha: f32,
	/// Below this the layout goes idle.
	pub alpha_min: f32,
	/// Fraction of the gap to the target closed each tick.
	pub alpha_decay: f32,
	/// Energy target while a node is dragged.
	pub drag_alpha_target: f32,
	/// Rest length of edge springs.
	pub link_distance: f32,
	/// Stiffness of edge springs.
	pub link_strength: f32,
	/// Fraction of the centroid offset corrected each tick.
	pub center_strength: f32,
	/// Pairwise repulsion, handed to `force_graph`.
	pub charge: f32,
	/// Velocity retained per step, handed to `force_graph`.
	pub damping: f32,
	/// Upper bound on a single force, handed to `force_graph`.
	pub force_max: f32,
	/// Integration speed, handed to `force_graph`.
	pub node_speed: f32,
	/// Drawn node radius in world units.
	pub node_radius: f64,
	/// Grab radius in world units.
	pub hit_radius: f64,
	/// Pointer travel in pixels below which a press counts as a click.
	pub click_slop: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		let alpha_min = 0.001_f32;
		Self {
			restart_alpha: 1.0,
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			drag_alpha_target: 0.3,
			link_distance: 100.0,
			link_strength: 0.5,
			center_strength: 0.1,
			charge: 300.0,
			damping: 0.9,
			force_max: 100.0,
			node_speed: 3000.0,
			node_radius: 10.0,
			hit_radius: 12.0,
			click_slop: 4.0,
		}
	}
}

/// Phase plus the alpha energy that drives it.
#[derive(Clone, Debug)]
pub struct Simulation {
	/// Tunables.
	pub config: SimulationConfig,
	phase: Phase,
	alpha: f32,
	alpha_target: f32,
}

impl Simulation {
	/// An idle simulation with no energy.
	pub fn new(config: SimulationConfig) -> Self {
		Self {
			config,
			phase: Phase::Idle,
			alpha: 0.0,
			alpha_target: 0.0,
		}
	}

	/// Current phase.
	pub fn phase(&self) -> Phase {
		self.phase
	}

	/// Current energy.
	pub fn alpha(&self) -> f32 {
		self.alpha
	}

	/// Feed a stimulus through the transition table and adjust the energy.
	pub fn apply(&mut self, stimulus: Stimulus) -> Phase {
		let next = transition(self.phase, stimulus);
		match stimulus {
			Stimulus::Inject => {
				self.alpha = self.config.restart_alpha;
				self.alpha_target = 0.0;
			}
			Stimulus::PointerDown => self.alpha_target = self.config.drag_alpha_target,
			Stimulus::PointerUp | Stimulus::PointerCancel => self.alpha_target = 0.0,
			Stimulus::Cooled => {}
		}
		if next != self.phase {
			log::debug!("layout {:?} -> {:?} on {:?}", self.phase, next, stimulus);
		}
		self.phase = next;
		next
	}

	/// Advance the energy by one tick. Returns the alpha to integrate with,
	/// or `None` when the layout is (or just went) idle.
	pub fn step(&mut self) -> Option<f32> {
		if self.phase == Phase::Idle {
			return None;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		if self.phase == Phase::Simulating && self.alpha < self.config.alpha_min {
			self.apply(Stimulus::Cooled);
			return None;
		}
		Some(self.alpha)
	}
}

/// Position updates that pull every edge toward `rest` length.
///
/// Each endpoint takes half the correction; a pinned endpoint takes none.
pub fn link_displacements<K>(
	positions: &HashMap<K, (f32, f32)>,
	edges: &[(K, K)],
	pinned: Option<K>,
	rest: f32,
	strength: f32,
	alpha: f32,
) -> HashMap<K, (f32, f32)>
where
	K: Copy + Eq + Hash,
{
	let mut moves: HashMap<K, (f32, f32)> = HashMap::new();
	for &(a, b) in edges {
		let (Some(&(ax, ay)), Some(&(bx, by))) = (positions.get(&a), positions.get(&b)) else {
			continue;
		};
		let (dx, dy) = (bx - ax, by - ay);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < f32::EPSILON {
			continue;
		}
		let k = (dist - rest) / dist * strength * alpha * 0.5;
		let (mx, my) = (dx * k, dy * k);
		if pinned != Some(a) {
			let entry = moves.entry(a).or_default();
			entry.0 += mx;
			entry.1 += my;
		}
		if pinned != Some(b) {
			let entry = moves.entry(b).or_default();
			entry.0 -= mx;
			entry.1 -= my;
		}
	}
	moves
}

/// Translation that moves the centroid of `positions` toward `center`.
pub fn centering_shift<I>(positions: I, center: (f32, f32), strength: f32) -> (f32, f32)
where
	I: IntoIterator<Item = (f32, f32)>,
{
	let (mut sx, mut sy, mut n) = (0.0_f32, 0.0_f32, 0usize);
	for (x, y) in positions {
		sx += x;
		sy += y;
		n += 1;
	}
	if n == 0 {
		return (0.0, 0.0);
	}
	let (mx, my) = (sx / n as f32, sy / n as f32);
	((center.0 - mx) * strength, (center.1 - my) * strength)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn transition_table() {
		use Phase::*;
		use Stimulus::*;

		assert_eq!(transition(Idle, Inject), Simulating);
		assert_eq!(transition(Idle, PointerDown), Dragging);
		assert_eq!(transition(Simulating, PointerDown), Dragging);
		assert_eq!(transition(Dragging, PointerUp), Simulating);
		assert_eq!(transition(Dragging, PointerCancel), Simulating);
		assert_eq!(transition(Dragging, Inject), Simulating);
		assert_eq!(transition(Simulating, Cooled), Idle);
		assert_eq!(transition(Dragging, Cooled), Dragging);
		assert_eq!(transition(Idle, PointerUp), Idle);
		assert_eq!(transition(Idle, Cooled), Idle);
	}

	#[test]
	fn energy_cools_to_idle() {
		let mut sim = Simulation::new(SimulationConfig::default());
		assert_eq!(sim.step(), None);

		sim.apply(Stimulus::Inject);
		assert_eq!(sim.phase(), Phase::Simulating);
		let first = sim.step().unwrap();
		assert!(first < 1.0);

		let mut ticks = 1;
		while sim.step().is_some() {
			ticks += 1;
			assert!(ticks < 1000, "never cooled");
		}
		assert_eq!(sim.phase(), Phase::Idle);
		assert!(ticks > 250 && ticks < 320, "cooled after {ticks} ticks");
		assert_eq!(sim.step(), None);
	}

	#[test]
	fn dragging_keeps_energy_up() {
		let mut sim = Simulation::new(SimulationConfig::default());
		sim.apply(Stimulus::PointerDown);
		assert_eq!(sim.phase(), Phase::Dragging);
		let mut alpha = 0.0;
		for _ in 0..500 {
			alpha = sim.step().unwrap();
		}
		assert!((alpha - 0.3).abs() < 0.01);

		sim.apply(Stimulus::PointerUp);
		assert_eq!(sim.phase(), Phase::Simulating);
		let mut ticks = 0;
		while sim.step().is_some() {
			ticks += 1;
			assert!(ticks < 1000);
		}
		assert_eq!(sim.phase(), Phase::Idle);
	}

	#[test]
	fn links_relax_toward_rest_length() {
		let positions = HashMap::from([(0, (0.0, 0.0)), (1, (200.0, 0.0))]);
		let moves = link_displacements(&positions, &[(0, 1)], None, 100.0, 1.0, 1.0);
		assert_eq!(moves[&0], (50.0, 0.0));
		assert_eq!(moves[&1], (-50.0, 0.0));

		let close = HashMap::from([(0, (0.0, 0.0)), (1, (50.0, 0.0))]);
		let moves = link_displacements(&close, &[(0, 1)], None, 100.0, 1.0, 1.0);
		assert!(moves[&0].0 < 0.0 && moves[&1].0 > 0.0);
	}

	#[test]
	fn pinned_endpoint_does_not_move() {
		let positions = HashMap::from([(0, (0.0, 0.0)), (1, (200.0, 0.0))]);
		let moves = link_displacements(&positions, &[(0, 1)], Some(0), 100.0, 1.0, 1.0);
		assert!(!moves.contains_key(&0));
		assert_eq!(moves[&1], (-50.0, 0.0));
	}

	#[test]
	fn centering_targets_the_centroid() {
		let shift = centering_shift([(10.0, 10.0), (30.0, 10.0)], (0.0, 0.0), 1.0);
		assert_eq!(shift, (-20.0, -10.0));
		assert_eq!(centering_shift(Vec::new(), (5.0, 5.0), 1.0), (0.0, 0.0));
	}
}
