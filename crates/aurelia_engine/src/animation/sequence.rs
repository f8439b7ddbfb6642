//! Ordered frame sequences with named labels.

use crate::resource::ImageHandle;

use super::frame::{Frame, FrameControl};

/// An immutable, ordered sequence of frames.
///
/// Built once at load time, then shared (via `Arc`) across every player that
/// shows the same visual action. Control-flow frames reference labels within
/// the same sequence by name.
#[derive(Debug, Clone, Default)]
pub struct FrameSequence {
	frames: Vec<Frame>,
}

impl FrameSequence {
	/// Creates an empty sequence.
	pub fn new() -> Self {
		Self {
			frames: Vec::new(),
		}
	}

	/// Creates a sequence from already-built frames.
	pub fn from_frames(frames: Vec<Frame>) -> Self {
		Self {
			frames,
		}
	}

	/// Appends a displayable frame.
	pub fn add_frame(
		&mut self,
		image: ImageHandle,
		delay: u32,
		offset_x: i32,
		offset_y: i32,
		chance: u8,
	) {
		self.frames.push(Frame {
			image: Some(image),
			delay,
			offset_x,
			offset_y,
			chance,
			control: FrameControl::Animation,
		});
	}

	/// Appends an invisible pause frame.
	pub fn add_pause(&mut self, delay: u32, chance: u8) {
		self.frames.push(Frame {
			image: None,
			delay,
			offset_x: 0,
			offset_y: 0,
			chance,
			control: FrameControl::Pause,
		});
	}

	/// Appends a label marker.
	pub fn add_label(&mut self, name: &str) {
		self.frames.push(Frame {
			image: None,
			delay: 0,
			offset_x: 0,
			offset_y: 0,
			chance: 100,
			control: FrameControl::Label(name.to_string()),
		});
	}

	/// Appends a goto directive targeting `label`.
	pub fn add_goto(&mut self, label: &str, chance: u8) {
		self.frames.push(Frame {
			image: None,
			delay: 0,
			offset_x: 0,
			offset_y: 0,
			chance,
			control: FrameControl::Goto(label.to_string()),
		});
	}

	/// Appends a jump directive switching the player to `action`.
	pub fn add_jump(&mut self, action: &str, chance: u8) {
		self.frames.push(Frame {
			image: None,
			delay: 0,
			offset_x: 0,
			offset_y: 0,
			chance,
			control: FrameControl::Jump(action.to_string()),
		});
	}

	/// Appends a terminator frame ending the sequence with `chance`.
	pub fn add_terminator(&mut self, chance: u8) {
		self.frames.push(Frame {
			image: None,
			delay: 0,
			offset_x: 0,
			offset_y: 0,
			chance,
			control: FrameControl::Animation,
		});
	}

	/// Number of frames, markers included.
	pub fn len(&self) -> usize {
		self.frames.len()
	}

	/// Returns true when the sequence holds no frames.
	pub fn is_empty(&self) -> bool {
		self.frames.is_empty()
	}

	/// All frames in order.
	pub fn frames(&self) -> &[Frame] {
		&self.frames
	}

	/// Frame at `index`.
	pub fn get(&self, index: usize) -> Option<&Frame> {
		self.frames.get(index)
	}

	/// Index of the label frame named `name`, scanning front to back.
	pub fn find_label(&self, name: &str) -> Option<usize> {
		self.frames.iter().position(|frame| {
			matches!(&frame.control, FrameControl::Label(label) if label == name)
		})
	}
}
