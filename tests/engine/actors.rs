//! Actors correlated with sprites, effects, and the tick loop.

use std::sync::Arc;

use aurelia_rs::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

const SPARK: &str = r#"{"particles": [{"lifetime": 4}]}"#;

fn stand_def(images: &ImageRegistry) -> Arc<SpriteDef> {
	let mut seq = FrameSequence::new();
	seq.add_frame(images.placeholder(), 10, 0, 0, 100);
	seq.add_frame(images.placeholder(), 10, 0, 0, 100);
	let mut action = Action::new();
	action.set_animation(SpriteDirection::Down, Arc::new(seq));
	let mut def = SpriteDef::new();
	def.set_action("stand", action);
	Arc::new(def)
}

#[test]
fn a_walking_actor_keeps_its_effect_and_sprite_running() {
	let mut effects = EffectRegistry::new();
	effects.load_str("spark", SPARK).expect("valid effect document");
	let mut images = ImageRegistry::new();
	let mut rng = SmallRng::seed_from_u64(99);
	let mut engine = ParticleEngine::new(EngineSettings::default());
	let mut actors = ActorIndex::new();

	let hero = actors.create(ActorKind::Player, "Hero", 1, 1);
	{
		let actor = actors.get_mut(hero).expect("hero exists");
		actor
			.sprite_mut()
			.add_layer(SpriteLayer::animated(AnimationPlayer::new(stand_def(&images))));
		let spark = engine
			.spawn_attached(&effects, &mut images, &mut rng, "spark", 48.0, 48.0, 0)
			.expect("effect is registered");
		actor.attach_effects(spark);
	}
	assert_eq!(engine.live_count(), 1);

	// Walk one tile to the right; the spark is dragged along
	actors.get_mut(hero).expect("hero exists").set_tile_position(2, 1);
	let dragged = actors.get(hero).expect("hero exists").effects()[0].position();
	assert_eq!(dragged.x, 80.0);

	for time in [1u64, 12, 23, 34, 45, 56] {
		actors.tick(time, &mut engine, &effects, &mut images, &mut rng);
	}

	// The four-tick spark drained; the sprite keeps animating
	assert_eq!(engine.live_count(), 0);
	let actor = actors.get(hero).expect("hero exists");
	assert!(actor.effects().is_empty());

	// Drawing the actor rasterizes the placeholder frame
	let mut surface = SoftwareSurface::new(96, 96);
	actors.get_mut(hero).expect("hero exists").draw(&mut surface, 56);
	let lit = surface
		.image()
		.pixels()
		.filter(|px| px.0[3] > 0)
		.count();
	assert!(lit > 0, "nothing was drawn");
}

#[test]
fn nearest_monster_targeting_ignores_other_kinds() {
	let mut actors = ActorIndex::new();
	let hero = actors.create(ActorKind::Player, "Hero", 0, 0);
	actors.create(ActorKind::Npc, "Guide", 1, 0);
	let rat = actors.create(ActorKind::Monster, "Rat", 3, 0);

	let (px, py) = actors.get(hero).expect("hero exists").pixel();
	assert_eq!(actors.find_nearest(px, py, ActorKind::Monster, 0, None), Some(rat));
	assert_eq!(actors.find_nearest(px, py, ActorKind::Monster, 1, None), None);
}
