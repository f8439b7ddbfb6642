//! The visual variants a particle can take.

use std::sync::Arc;

use glam::Vec3;

use crate::animation::{FrameSequence, SimplePlayer};
use crate::render::DrawTarget;
use crate::resource::ImageHandle;

/// Selects a frame from a sequence based on a movement heading.
///
/// Frame `i` covers an equal slice of the circle with frame 0 centered on
/// heading zero; rotational particles re-select every tick from their current
/// velocity, so a spark visually points where it flies.
#[derive(Debug, Clone)]
pub struct RotationPlayer {
	player: SimplePlayer,
}

impl RotationPlayer {
	/// Creates a rotation player over `sequence`.
	pub fn new(sequence: Arc<FrameSequence>) -> Self {
		Self {
			player: SimplePlayer::new(sequence),
		}
	}

	/// Re-selects the frame matching the heading of `velocity`.
	pub fn set_heading(&mut self, velocity: Vec3) {
		let size = self.player.len();
		if size == 0 {
			return;
		}
		// Heading measured like the original: atan2 of x over y
		let mut rad = velocity.x.atan2(velocity.y);
		if rad < 0.0 {
			rad += std::f32::consts::TAU;
		}
		let range = std::f32::consts::TAU / size as f32;
		let index = ((rad + range / 2.0) / range) as usize % size;
		self.player.set_frame(index);
	}

	/// The wrapped frame player.
	pub fn player(&self) -> &SimplePlayer {
		&self.player
	}
}

/// What a particle looks like.
///
/// A small closed set of variants dispatched in one place, instead of a
/// subclass per visual.
#[derive(Debug)]
pub enum ParticleKind {
	/// Invisible carrier, used purely for physics and child emitters.
	Plain,
	/// A single static image.
	Image(ImageHandle),
	/// A timed frame loop.
	Animated(SimplePlayer),
	/// A frame picked from the velocity's heading each tick.
	Rotational(RotationPlayer),
}

impl ParticleKind {
	/// Name of the image identity this kind charges against the per-image
	/// budget, if any.
	pub fn image_name(&self) -> Option<&str> {
		match self {
			Self::Image(image) => Some(&image.name),
			_ => None,
		}
	}

	/// Draws the kind centered on the screen position (`sx`, `sy`).
	pub fn draw(&self, target: &mut dyn DrawTarget, sx: i32, sy: i32, alpha: f32) {
		match self {
			Self::Plain => {}
			Self::Image(image) => {
				target.draw_image_alpha(
					image,
					sx - image.width() / 2,
					sy - image.height() / 2,
					alpha,
				);
			}
			Self::Animated(player) => Self::draw_frame(player, target, sx, sy, alpha),
			Self::Rotational(rotation) => {
				Self::draw_frame(rotation.player(), target, sx, sy, alpha);
			}
		}
	}

	fn draw_frame(player: &SimplePlayer, target: &mut dyn DrawTarget, sx: i32, sy: i32, alpha: f32) {
		let Some(frame) = player.frame() else {
			return;
		};
		let Some(image) = &frame.image else {
			return;
		};
		target.draw_image_alpha(
			image,
			sx - image.width() / 2 + frame.offset_x,
			sy - image.height() / 2 + frame.offset_y,
			alpha,
		);
	}
}
