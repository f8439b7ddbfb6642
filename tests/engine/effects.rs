//! Effect documents driven through the particle engine.

use aurelia_rs::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

const FOUNTAIN: &str = r#"{
	"particles": [{
		"lifetime": 50,
		"emitters": [{
			"power": {"min": 2.0, "max": 4.0},
			"vertical-angle": {"min": 60.0, "max": 90.0},
			"gravity": {"value": 0.2},
			"lifetime": {"min": 10, "max": 20},
			"output": {"min": 2, "max": 3}
		}]
	}]
}"#;

const FLOOD: &str = r#"{
	"particles": [{
		"lifetime": 40,
		"emitters": [{
			"lifetime": {"min": 5, "max": 5},
			"output": {"min": 20, "max": 20}
		}]
	}]
}"#;

struct Sim {
	effects: EffectRegistry,
	images: ImageRegistry,
	rng: SmallRng,
	engine: ParticleEngine,
}

impl Sim {
	fn new(name: &str, document: &str, settings: EngineSettings) -> Self {
		let mut effects = EffectRegistry::new();
		effects.load_str(name, document).expect("valid effect document");
		Self {
			effects,
			images: ImageRegistry::new(),
			rng: SmallRng::seed_from_u64(7),
			engine: ParticleEngine::new(settings),
		}
	}

	fn spawn(&mut self, name: &str) -> usize {
		self.engine
			.add_effect(&self.effects, &mut self.images, &mut self.rng, name, 0.0, 0.0, 0)
			.expect("effect is registered")
	}

	fn tick(&mut self) {
		self.engine.update(&self.effects, &mut self.images, &mut self.rng);
	}
}

#[test]
fn fountain_spawns_and_drains() {
	let mut sim = Sim::new("fountain", FOUNTAIN, EngineSettings::default());
	assert_eq!(sim.spawn("fountain"), 1);

	let mut peak = 0;
	for _ in 0..200 {
		sim.tick();
		peak = peak.max(sim.engine.live_count());
	}
	assert!(peak > 1, "emitter never produced output");
	assert_eq!(sim.engine.live_count(), 0, "effect should drain completely");
}

#[test]
fn global_budget_bounds_live_particles() {
	let settings = EngineSettings {
		particle_max_count: 10,
		..EngineSettings::default()
	};
	let mut sim = Sim::new("flood", FLOOD, settings);
	assert_eq!(sim.spawn("flood"), 1);

	for _ in 0..60 {
		sim.tick();
		assert!(
			sim.engine.live_count() <= 10,
			"admission control exceeded the budget"
		);
	}
}

#[test]
fn unknown_effect_is_an_error() {
	let mut sim = Sim::new("fountain", FOUNTAIN, EngineSettings::default());
	let result = sim.engine.add_effect(
		&sim.effects,
		&mut sim.images,
		&mut sim.rng,
		"no-such-effect",
		0.0,
		0.0,
		0,
	);
	assert!(matches!(result, Err(EngineError::UnknownEffect { .. })));
}

#[test]
fn disabled_effects_spawn_nothing() {
	let settings = EngineSettings {
		particle_effects: false,
		..EngineSettings::default()
	};
	let mut sim = Sim::new("fountain", FOUNTAIN, settings);
	assert_eq!(sim.spawn("fountain"), 0);
	assert_eq!(sim.engine.live_count(), 0);
}
