//! Individual animation frames and their control directives.

use crate::resource::ImageHandle;

/// Control directive attached to a frame.
///
/// Most frames are plain [`Animation`](FrameControl::Animation) frames that
/// display an image for a delay; the remaining variants drive the player's
/// control flow:
///
/// - `Pause`: display nothing for the delay.
/// - `Label`: named no-op marker, target of `Goto`.
/// - `Goto`: jump to the matching label within the same sequence.
/// - `Jump`: switch the whole player to a different action.
///
/// `Goto` and `Jump` fire with the frame's percent chance; a failed roll
/// falls through to the next sequential frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameControl {
	/// Regular displayable frame (or the terminator when its image is absent).
	Animation,
	/// Invisible frame that still consumes its delay.
	Pause,
	/// Named marker frame, always passed over.
	Label(String),
	/// Jump to the label with the given name.
	Goto(String),
	/// Switch the player to the named action.
	Jump(String),
}

/// One frame of a [`FrameSequence`](super::FrameSequence).
#[derive(Debug, Clone)]
pub struct Frame {
	/// Image to display; `None` for pauses, markers, and the terminator.
	pub image: Option<ImageHandle>,
	/// Display time in milliseconds; 0 means the frame holds until a control
	/// directive moves the player elsewhere.
	pub delay: u32,
	/// Horizontal draw offset in pixels.
	pub offset_x: i32,
	/// Vertical draw offset in pixels.
	pub offset_y: i32,
	/// Percent chance (`0..=100`) that this frame's effect fires.
	pub chance: u8,
	/// Control directive.
	pub control: FrameControl,
}

impl Frame {
	/// A terminator is an `Animation` frame without an image: reaching it
	/// (and winning its chance roll) ends the sequence.
	pub fn is_terminator(&self) -> bool {
		self.image.is_none() && self.control == FrameControl::Animation
	}
}
