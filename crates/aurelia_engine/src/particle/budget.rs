//! Admission control for particle spawning.

use std::collections::HashMap;

use super::node::Particle;

/// Soft cap on live particles sharing one image identity.
pub const IMAGE_PARTICLE_CAP: usize = 200;

/// Tracks how many particles are alive, globally and per image identity.
///
/// Emitters consult the budget before spawning and silently drop spawns past
/// the caps; this protects frame time against runaway effects without
/// surfacing an error anywhere. The budget is an explicit object handed to
/// whoever spawns or removes particles, not process-wide state.
#[derive(Debug, Default)]
pub struct ParticleBudget {
	live: usize,
	by_image: HashMap<String, usize>,
}

impl ParticleBudget {
	/// Creates an empty budget.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of live particles charged against the budget.
	pub fn live(&self) -> usize {
		self.live
	}

	/// Live particles charged against one image identity.
	pub fn image_count(&self, name: &str) -> usize {
		self.by_image.get(name).copied().unwrap_or(0)
	}

	/// Charges one particle, optionally against an image identity.
	pub fn charge(&mut self, image_name: Option<&str>) {
		self.live += 1;
		if let Some(name) = image_name {
			*self.by_image.entry(name.to_string()).or_insert(0) += 1;
		}
	}

	/// Releases a removed particle and its whole child tree.
	pub fn release(&mut self, particle: &Particle) {
		self.live = self.live.saturating_sub(1);
		if let Some(name) = particle.image_name() {
			if let Some(count) = self.by_image.get_mut(name) {
				*count = count.saturating_sub(1);
			}
		}
		for child in particle.children() {
			self.release(child);
		}
	}
}
