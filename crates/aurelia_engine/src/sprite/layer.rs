//! Layers of a composite sprite.

use rand::Rng;

use crate::animation::{AnimationPlayer, SpriteDirection};
use crate::render::DrawTarget;
use crate::resource::ImageHandle;

/// Content identity of a layer's currently visible frame.
///
/// Two layers with equal keys are guaranteed to render identically; the
/// composite cache compares ordered tuples of these. A layer that has
/// nothing resolvable to show reports its own instance identity instead, so
/// it only ever matches itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKey {
	/// A specific frame of a specific sequence.
	Frame {
		/// Address of the shared frame sequence.
		sequence: usize,
		/// Frame index within it.
		index: usize,
	},
	/// A static image, identified by its registry id.
	Image(u64),
	/// Fallback: the layer instance itself.
	Instance(u64),
}

/// A static, non-animated layer.
#[derive(Debug, Clone)]
pub struct StaticSprite {
	/// Image to draw.
	pub image: ImageHandle,
	/// Horizontal draw offset.
	pub offset_x: i32,
	/// Vertical draw offset.
	pub offset_y: i32,
	/// Opacity.
	pub alpha: f32,
}

impl StaticSprite {
	/// Creates a static layer with no offset.
	pub fn new(image: ImageHandle) -> Self {
		Self {
			image,
			offset_x: 0,
			offset_y: 0,
			alpha: 1.0,
		}
	}
}

/// One layer of a composite sprite: either a running animation player or a
/// static image, dispatched through a single surface.
#[derive(Debug)]
pub enum LayerKind {
	/// An animated layer.
	Animated(AnimationPlayer),
	/// A static image layer.
	Static(StaticSprite),
}

/// A composite layer plus the instance identity used for cache keys.
#[derive(Debug)]
pub struct SpriteLayer {
	kind: LayerKind,
	instance: u64,
}

impl SpriteLayer {
	/// Wraps an animation player.
	pub fn animated(player: AnimationPlayer) -> Self {
		Self {
			kind: LayerKind::Animated(player),
			instance: 0,
		}
	}

	/// Wraps a static image.
	pub fn fixed(sprite: StaticSprite) -> Self {
		Self {
			kind: LayerKind::Static(sprite),
			instance: 0,
		}
	}

	pub(crate) fn set_instance(&mut self, instance: u64) {
		self.instance = instance;
	}

	/// Advances the layer; returns whether its visible content changed.
	pub fn update<R: Rng>(&mut self, time: u64, rng: &mut R) -> bool {
		match &mut self.kind {
			LayerKind::Animated(player) => player.update(time, rng),
			LayerKind::Static(_) => false,
		}
	}

	/// Switches the layer to an action; static layers ignore this.
	pub fn play(&mut self, action: &str) -> bool {
		match &mut self.kind {
			LayerKind::Animated(player) => player.play(action),
			LayerKind::Static(_) => false,
		}
	}

	/// Changes the facing direction; static layers ignore this.
	pub fn set_direction(&mut self, direction: SpriteDirection) -> bool {
		match &mut self.kind {
			LayerKind::Animated(player) => player.set_direction(direction),
			LayerKind::Static(_) => false,
		}
	}

	/// Rewinds an animated layer.
	pub fn reset(&mut self) -> bool {
		match &mut self.kind {
			LayerKind::Animated(player) => player.reset(),
			LayerKind::Static(_) => false,
		}
	}

	/// Draws the layer at (`x`, `y`).
	pub fn draw(&self, target: &mut dyn DrawTarget, x: i32, y: i32) {
		match &self.kind {
			LayerKind::Animated(player) => player.draw(target, x, y),
			LayerKind::Static(sprite) => {
				let dx = x + sprite.offset_x;
				let dy = y + sprite.offset_y;
				if sprite.alpha >= 1.0 {
					target.draw_image(&sprite.image, dx, dy);
				} else if sprite.alpha > 0.0 {
					target.draw_image_alpha(&sprite.image, dx, dy, sprite.alpha);
				}
			}
		}
	}

	/// Content identity of the visible frame.
	pub fn key(&self) -> LayerKey {
		match &self.kind {
			LayerKind::Animated(player) => match player.frame_identity() {
				Some((sequence, index)) => LayerKey::Frame {
					sequence,
					index,
				},
				None => LayerKey::Instance(self.instance),
			},
			LayerKind::Static(sprite) => {
				if sprite.image.id == 0 {
					LayerKey::Instance(self.instance)
				} else {
					LayerKey::Image(sprite.image.id)
				}
			}
		}
	}

	/// Sets the layer's opacity.
	pub fn set_alpha(&mut self, alpha: f32) {
		match &mut self.kind {
			LayerKind::Animated(player) => player.set_alpha(alpha),
			LayerKind::Static(sprite) => sprite.alpha = alpha,
		}
	}

	/// Width of the visible content.
	pub fn width(&self) -> i32 {
		match &self.kind {
			LayerKind::Animated(player) => player.width(),
			LayerKind::Static(sprite) => sprite.image.width(),
		}
	}

	/// Height of the visible content.
	pub fn height(&self) -> i32 {
		match &self.kind {
			LayerKind::Animated(player) => player.height(),
			LayerKind::Static(sprite) => sprite.image.height(),
		}
	}

	/// Access to the wrapped kind.
	pub fn kind(&self) -> &LayerKind {
		&self.kind
	}

	/// Mutable access to the wrapped kind.
	pub fn kind_mut(&mut self) -> &mut LayerKind {
		&mut self.kind
	}
}
