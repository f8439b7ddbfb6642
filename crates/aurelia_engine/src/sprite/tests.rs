//! Unit tests for composite sprites and the bitmap cache.

use std::sync::Arc;

use image::RgbaImage;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::animation::{Action, AnimationPlayer, FrameSequence, SpriteDef, SpriteDirection, actions};
use crate::render::testutil::RecordingTarget;
use crate::resource::{ImageData, ImageHandle};

use super::*;

fn test_image(id: u64) -> ImageHandle {
	Arc::new(ImageData {
		id,
		name: format!("img-{id}"),
		pixels: RgbaImage::new(4, 4),
	})
}

fn options() -> CompositeOptions {
	CompositeOptions {
		enable_delay: false,
		..CompositeOptions::default()
	}
}

fn static_stack(ids: &[u64]) -> CompositeSprite {
	let mut sprite = CompositeSprite::with_options(options());
	for &id in ids {
		sprite.add_layer(SpriteLayer::fixed(StaticSprite::new(test_image(id))));
	}
	sprite
}

fn rng() -> SmallRng {
	SmallRng::seed_from_u64(99)
}

#[test]
fn matching_key_tuple_reuses_cached_bitmap() {
	let mut sprite = static_stack(&[1, 2, 3, 4]);
	let mut target = RecordingTarget::default();

	sprite.draw(&mut target, 0, 0, 0);
	let first = sprite.image().cloned().expect("composite built");
	assert_eq!(sprite.cache_len(), 0);

	// Change one layer, composite again
	sprite.set_layer(3, Some(SpriteLayer::fixed(StaticSprite::new(test_image(10)))));
	sprite.draw(&mut target, 0, 0, 0);
	let second = sprite.image().cloned().expect("composite rebuilt");
	assert!(!Arc::ptr_eq(&first, &second));
	assert_eq!(sprite.cache_len(), 1);

	// Restore the original combination: the pooled bitmap must come back
	// without a re-render
	sprite.set_layer(3, Some(SpriteLayer::fixed(StaticSprite::new(test_image(4)))));
	sprite.draw(&mut target, 0, 0, 0);
	let third = sprite.image().cloned().expect("composite active");
	assert!(Arc::ptr_eq(&first, &third));
}

#[test]
fn different_layer_order_is_a_miss() {
	let mut sprite = static_stack(&[1, 2, 3, 4]);
	let mut target = RecordingTarget::default();

	sprite.draw(&mut target, 0, 0, 0);
	let first = sprite.image().cloned().expect("composite built");

	// Same images, swapped order
	sprite.set_layer(2, Some(SpriteLayer::fixed(StaticSprite::new(test_image(4)))));
	sprite.set_layer(3, Some(SpriteLayer::fixed(StaticSprite::new(test_image(3)))));
	sprite.draw(&mut target, 0, 0, 0);
	let second = sprite.image().cloned().expect("composite rebuilt");
	assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn different_layer_count_is_a_miss() {
	let mut sprite = static_stack(&[1, 2, 3, 4]);
	let mut target = RecordingTarget::default();
	sprite.draw(&mut target, 0, 0, 0);
	let four_layer_keys = sprite.current_keys();

	sprite.add_layer(SpriteLayer::fixed(StaticSprite::new(test_image(5))));
	sprite.draw(&mut target, 0, 0, 0);
	assert_eq!(sprite.current_keys().len(), 5);
	assert!(sprite.cache_contains(&four_layer_keys));
	assert_ne!(sprite.current_keys(), four_layer_keys);
}

#[test]
fn pool_is_bounded_and_evicts_in_batches() {
	let mut sprite = static_stack(&[1, 2, 3, 4]);
	let mut target = RecordingTarget::default();
	let mut tuples = Vec::new();

	// 11 distinct combinations = capacity + 1
	for round in 0..11u64 {
		sprite.set_layer(0, Some(SpriteLayer::fixed(StaticSprite::new(test_image(100 + round)))));
		tuples.push(sprite.current_keys());
		sprite.draw(&mut target, 0, 0, 0);
		assert!(sprite.cache_len() <= 10, "pool overflowed at round {round}");
	}
	assert_eq!(sprite.cache_len(), 10);

	// One more distinct combination crosses the threshold: the pool takes
	// the returned composite (11 entries) and sheds the oldest batch of 4
	sprite.set_layer(0, Some(SpriteLayer::fixed(StaticSprite::new(test_image(200)))));
	sprite.draw(&mut target, 0, 0, 0);
	assert_eq!(sprite.cache_len(), 7);

	for (round, tuple) in tuples.iter().enumerate() {
		let survived = sprite.cache_contains(tuple);
		assert_eq!(survived, round >= 4, "wrong survivor at round {round}");
	}
}

#[test]
fn few_layers_draw_directly() {
	let mut sprite = static_stack(&[1, 2, 3]);
	let mut target = RecordingTarget::default();
	sprite.draw(&mut target, 7, 9, 0);

	assert!(sprite.image().is_none());
	assert_eq!(target.calls.len(), 3);
	assert!(target.calls.iter().all(|call| call.x == 7 && call.y == 9));
}

#[test]
fn alpha_selects_the_draw_path() {
	let mut sprite = static_stack(&[1, 2, 3, 4]);
	let mut target = RecordingTarget::default();

	sprite.draw(&mut target, 0, 0, 0);
	assert_eq!(target.calls.len(), 1);
	assert_eq!(target.calls[0].alpha, 1.0);
	// Composite bitmaps are anonymous (id 0) and drawn at the derived offset
	assert_eq!(target.calls[0].image_id, 0);
	assert_eq!(target.calls[0].x, 16 - 50);
	assert_eq!(target.calls[0].y, 32 - 100);

	target.calls.clear();
	sprite.set_alpha(0.5);
	sprite.draw(&mut target, 0, 0, 0);
	assert_eq!(target.calls.len(), 1);
	assert_eq!(target.calls[0].alpha, 0.5);

	target.calls.clear();
	sprite.set_alpha(0.0);
	sprite.draw(&mut target, 0, 0, 0);
	assert!(target.calls.is_empty(), "fully transparent sprite drew {:?}", target.calls);
}

#[test]
fn alpha_fix_pushes_alpha_into_layers() {
	let mut sprite = CompositeSprite::with_options(CompositeOptions {
		enable_delay: false,
		alpha_fix: true,
		..CompositeOptions::default()
	});
	for id in 1..=4 {
		sprite.add_layer(SpriteLayer::fixed(StaticSprite::new(test_image(id))));
	}
	sprite.set_alpha(0.25);
	for slot in 0..4 {
		let layer = sprite.layer(slot).expect("layer present");
		match layer.kind() {
			LayerKind::Static(inner) => assert_eq!(inner.alpha, 0.25),
			LayerKind::Animated(_) => panic!("unexpected layer kind"),
		}
	}
}

#[test]
fn animated_layer_change_triggers_recomposite_and_wrap_hits_cache() {
	let image_a = test_image(21);
	let image_b = test_image(22);
	let mut seq = FrameSequence::new();
	seq.add_frame(image_a, 10, 0, 0, 100);
	seq.add_frame(image_b, 10, 0, 0, 100);
	let mut action = Action::new();
	action.set_animation(SpriteDirection::Down, Arc::new(seq));
	let mut def = SpriteDef::new();
	def.set_action(actions::STAND, action);
	let def = Arc::new(def);

	let mut sprite = static_stack(&[1, 2, 3]);
	sprite.add_layer(SpriteLayer::animated(AnimationPlayer::new(def)));

	let mut target = RecordingTarget::default();
	let mut rng = rng();

	sprite.update(1, &mut rng);
	sprite.draw(&mut target, 0, 0, 1);
	let frame0 = sprite.image().cloned().expect("composite built");

	assert!(sprite.update(12, &mut rng), "frame should have advanced");
	sprite.draw(&mut target, 0, 0, 12);
	let frame1 = sprite.image().cloned().expect("composite rebuilt");
	assert!(!Arc::ptr_eq(&frame0, &frame1));

	// Wrapping back to frame 0 reuses the first composite
	assert!(sprite.update(23, &mut rng));
	sprite.draw(&mut target, 0, 0, 23);
	let frame0_again = sprite.image().cloned().expect("composite active");
	assert!(Arc::ptr_eq(&frame0, &frame0_again));
}

#[test]
fn redraw_throttle_defers_recomposition() {
	let mut sprite = CompositeSprite::with_options(CompositeOptions::default());
	for id in 1..=4 {
		sprite.add_layer(SpriteLayer::fixed(StaticSprite::new(test_image(id))));
	}
	let mut target = RecordingTarget::default();

	sprite.draw(&mut target, 0, 0, 100);
	let first = sprite.image().cloned().expect("composite built");

	// A change arrives, but the next draw is within the delay window
	sprite.set_layer(0, Some(SpriteLayer::fixed(StaticSprite::new(test_image(9)))));
	sprite.draw(&mut target, 0, 0, 105);
	let still_first = sprite.image().cloned().expect("composite kept");
	assert!(Arc::ptr_eq(&first, &still_first));

	// Past the window the recomposite happens
	sprite.draw(&mut target, 0, 0, 120);
	let second = sprite.image().cloned().expect("composite rebuilt");
	assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn clear_drops_layers_and_cache() {
	let mut sprite = static_stack(&[1, 2, 3, 4]);
	let mut target = RecordingTarget::default();
	sprite.draw(&mut target, 0, 0, 0);
	sprite.set_layer(0, Some(SpriteLayer::fixed(StaticSprite::new(test_image(9)))));
	sprite.draw(&mut target, 0, 0, 0);
	assert_eq!(sprite.cache_len(), 1);

	sprite.clear();
	assert_eq!(sprite.layer_count(), 0);
	assert_eq!(sprite.cache_len(), 0);
	assert!(sprite.image().is_none());
}
