//! The frame-advance state machine driving one animated sprite.

use std::sync::Arc;

use rand::Rng;

use crate::math::roll_percent;
use crate::render::DrawTarget;

use super::action::{Action, SpriteDef, SpriteDirection, actions};
use super::frame::{Frame, FrameControl};
use super::sequence::FrameSequence;

/// Plays the frame sequences of one sprite definition.
///
/// One player exists per visual instance; it owns the current frame pointer
/// and the timing accumulator, advancing through the active sequence as
/// absolute time is fed into [`update`](Self::update). Control frames
/// (labels, gotos, jumps, terminators) are processed immediately regardless
/// of elapsed time.
#[derive(Debug)]
pub struct AnimationPlayer {
	def: Option<Arc<SpriteDef>>,
	direction: SpriteDirection,
	action: Option<Arc<Action>>,
	sequence: Option<Arc<FrameSequence>>,
	frame_index: usize,
	frame_time: u32,
	last_time: u64,
	alpha: f32,
	terminated: bool,
}

impl AnimationPlayer {
	/// Creates a player for `def` and starts the stand action.
	pub fn new(def: Arc<SpriteDef>) -> Self {
		let mut player = Self {
			def: Some(def),
			direction: SpriteDirection::default(),
			action: None,
			sequence: None,
			frame_index: 0,
			frame_time: 0,
			last_time: 0,
			alpha: 1.0,
			terminated: false,
		};
		player.play(actions::STAND);
		player
	}

	/// Creates a player with no definition yet (pending load); it renders
	/// nothing and reports no changes until a definition arrives.
	pub fn pending() -> Self {
		Self {
			def: None,
			direction: SpriteDirection::default(),
			action: None,
			sequence: None,
			frame_index: 0,
			frame_time: 0,
			last_time: 0,
			alpha: 1.0,
			terminated: false,
		}
	}

	/// Attaches a definition to a pending player and starts the stand action.
	pub fn attach(&mut self, def: Arc<SpriteDef>) {
		self.def = Some(def);
		self.play(actions::STAND);
	}

	/// Rewinds to the first frame. Returns whether any state was discarded.
	pub fn reset(&mut self) -> bool {
		let ret = self.frame_index != 0 || self.frame_time != 0 || self.last_time != 0;
		self.frame_index = 0;
		self.frame_time = 0;
		self.last_time = 0;
		ret
	}

	/// Switches to the named action.
	///
	/// Returns true when the active sequence actually changed; keeping the
	/// same sequence (or resolving to an empty one) is not a switch.
	pub fn play(&mut self, name: &str) -> bool {
		let Some(def) = self.def.clone() else {
			return false;
		};
		let Some(action) = def.action(name) else {
			return false;
		};
		let action = action.clone();
		let animation = action.animation(self.direction).cloned();
		self.action = Some(action);

		if let Some(animation) = animation {
			let switches = self
				.sequence
				.as_ref()
				.is_none_or(|current| !Arc::ptr_eq(current, &animation));
			if switches && !animation.is_empty() {
				self.sequence = Some(animation);
				self.reset();
				return true;
			}
		}
		false
	}

	/// Changes the facing direction, re-resolving the sequence within the
	/// current action. Returns whether the direction changed.
	pub fn set_direction(&mut self, direction: SpriteDirection) -> bool {
		if self.direction == direction {
			return false;
		}
		self.direction = direction;

		let Some(action) = self.action.clone() else {
			return false;
		};
		if let Some(animation) = action.animation(direction) {
			let switches = self
				.sequence
				.as_ref()
				.is_none_or(|current| !Arc::ptr_eq(current, animation));
			if switches && !animation.is_empty() {
				self.sequence = Some(animation.clone());
				self.reset();
			}
		}
		true
	}

	/// Advances the player to the given absolute time (milliseconds).
	///
	/// Returns true when the visible frame or the active sequence changed,
	/// which is the signal composites use to schedule recomposition. The
	/// first call (and any call after the time source wrapped) only
	/// resynchronizes and returns false.
	pub fn update<R: Rng>(&mut self, time: u64, rng: &mut R) -> bool {
		// Avoid freaking out at the first frame or when the tick timer wraps
		if time < self.last_time || self.last_time == 0 {
			self.last_time = time;
		}

		if time <= self.last_time || self.sequence.is_none() {
			return false;
		}

		let dt = (time - self.last_time) as u32;
		self.last_time = time;

		let sequence_before = self.sequence.as_ref().map(Arc::as_ptr);
		let frame_before = self.frame_identity();

		if !self.advance(dt, rng) {
			// Sequence finished, fall back to the default action
			self.play(actions::STAND);
			self.terminated = true;
		}

		self.sequence.as_ref().map(Arc::as_ptr) != sequence_before
			|| self.frame_identity() != frame_before
	}

	/// Runs the advance loop. Returns false when the sequence ended for good
	/// (terminator fired or no usable frame remains).
	fn advance<R: Rng>(&mut self, dt: u32, rng: &mut R) -> bool {
		let Some(seq) = self.sequence.clone() else {
			return false;
		};
		let Some(mut frame) = seq.get(self.frame_index) else {
			return false;
		};
		if frame.is_terminator() {
			return false;
		}

		self.frame_time += dt;

		while (self.frame_time > frame.delay && frame.delay > 0)
			|| !matches!(frame.control, FrameControl::Animation | FrameControl::Pause)
			|| frame.is_terminator()
		{
			let mut fail = true;
			self.frame_time = self.frame_time.saturating_sub(frame.delay);
			self.frame_index += 1;
			if self.frame_index >= seq.len() {
				self.frame_index = 0;
			}
			frame = match seq.get(self.frame_index) {
				Some(next) => next,
				None => return false,
			};

			match &frame.control {
				FrameControl::Label(_) => fail = false,
				FrameControl::Goto(label) => {
					if roll_percent(rng, frame.chance) {
						if let Some(index) = seq.find_label(label) {
							self.frame_index = index;
							frame = match seq.get(index) {
								Some(next) => next,
								None => return false,
							};
						}
					}
					// A goto never blocks advancement, hit or miss
					fail = false;
				}
				FrameControl::Jump(action) => {
					if roll_percent(rng, frame.chance) {
						let action = action.clone();
						self.play(&action);
						return true;
					}
				}
				FrameControl::Animation if frame.image.is_none() => {
					// Terminator: chance 0 skips it and keeps looping
					if roll_percent(rng, frame.chance) {
						self.sequence = None;
						return false;
					}
				}
				_ => {
					if frame.chance >= 100 || roll_percent(rng, frame.chance) {
						fail = false;
					}
				}
			}

			if fail {
				// Force another advance instead of spinning on this frame
				self.frame_time = frame.delay + 1;
			}
		}
		true
	}

	/// Draws the current frame at (`x`, `y`) plus the frame offset.
	pub fn draw(&self, target: &mut dyn DrawTarget, x: i32, y: i32) {
		let Some(frame) = self.frame() else {
			return;
		};
		let Some(image) = &frame.image else {
			return;
		};
		if self.alpha >= 1.0 {
			target.draw_image(image, x + frame.offset_x, y + frame.offset_y);
		} else {
			target.draw_image_alpha(image, x + frame.offset_x, y + frame.offset_y, self.alpha);
		}
	}

	/// The currently displayed frame, if any.
	pub fn frame(&self) -> Option<&Frame> {
		self.sequence.as_ref().and_then(|seq| seq.get(self.frame_index))
	}

	/// Identity of the visible frame: sequence address plus frame index.
	///
	/// Two players reporting the same identity are guaranteed to render
	/// identically, which is what the composite cache keys on.
	pub fn frame_identity(&self) -> Option<(usize, usize)> {
		self.sequence
			.as_ref()
			.map(|seq| (Arc::as_ptr(seq) as usize, self.frame_index))
	}

	/// The active sequence, if any.
	pub fn sequence(&self) -> Option<&Arc<FrameSequence>> {
		self.sequence.as_ref()
	}

	/// Index of the current frame within the active sequence.
	pub fn frame_index(&self) -> usize {
		self.frame_index
	}

	/// Milliseconds accumulated against the current frame's delay.
	pub fn frame_time(&self) -> u32 {
		self.frame_time
	}

	/// Number of frames in the active sequence.
	pub fn frame_count(&self) -> usize {
		self.sequence.as_ref().map_or(0, |seq| seq.len())
	}

	/// Current facing direction.
	pub fn direction(&self) -> SpriteDirection {
		self.direction
	}

	/// Width of the current frame's image.
	pub fn width(&self) -> i32 {
		self.frame()
			.and_then(|frame| frame.image.as_ref())
			.map_or(0, |image| image.width())
	}

	/// Height of the current frame's image.
	pub fn height(&self) -> i32 {
		self.frame()
			.and_then(|frame| frame.image.as_ref())
			.map_or(0, |image| image.height())
	}

	/// Opacity applied when drawing.
	pub fn alpha(&self) -> f32 {
		self.alpha
	}

	/// Sets the drawing opacity.
	pub fn set_alpha(&mut self, alpha: f32) {
		self.alpha = alpha;
	}

	/// Consumes the one-shot "sequence ended" flag.
	///
	/// Set when a terminator fired and the player fell back to the stand
	/// action; owners of one-shot visuals use it to delete the sprite.
	pub fn take_terminated(&mut self) -> bool {
		std::mem::take(&mut self.terminated)
	}

	/// Peeks at the "sequence ended" flag without consuming it.
	pub fn is_terminated(&self) -> bool {
		self.terminated
	}
}
