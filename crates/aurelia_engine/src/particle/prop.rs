//! Randomized, time-modulated emitter properties.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Periodic modulation applied on top of a property's random range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeFunc {
	/// No modulation.
	#[default]
	None,
	/// `A · sin(2π · t / P)`.
	#[serde(alias = "sinewave")]
	Sine,
	/// Rising ramp from `−A` to `+A` over one period.
	#[serde(alias = "saw")]
	Sawtooth,
	/// `+A` at the period start, `−A` at the midpoint, back to `+A`.
	Triangle,
	/// `+A` for the first half of the period, `−A` for the second.
	Square,
}

/// A property evaluated per spawn: a uniform draw from `[min, max]` plus a
/// deterministic periodic term.
///
/// The dual random+periodic model is what makes effects shimmer and pulse;
/// both parts must match the original formulas exactly, the piecewise
/// triangle shape included.
#[derive(Debug, Clone)]
pub struct EmitterProp<T> {
	/// Lower bound of the random range.
	pub min: T,
	/// Upper bound of the random range.
	pub max: T,
	/// Selected modulation shape.
	pub change_func: ChangeFunc,
	/// Modulation amplitude.
	pub change_amplitude: f32,
	/// Modulation period in ticks (values below 1 behave as 1).
	pub change_period: i32,
	/// Tick offset added before evaluating the modulation.
	pub change_phase: i32,
}

/// Numeric types an [`EmitterProp`] can carry.
pub trait PropValue: Copy {
	/// Widens to `f32` for evaluation.
	fn to_f32(self) -> f32;
	/// Narrows back after evaluation (integers truncate).
	fn from_f32(value: f32) -> Self;
}

impl PropValue for f32 {
	fn to_f32(self) -> f32 {
		self
	}

	fn from_f32(value: f32) -> Self {
		value
	}
}

impl PropValue for i32 {
	fn to_f32(self) -> f32 {
		self as f32
	}

	fn from_f32(value: f32) -> Self {
		value as i32
	}
}

impl<T: PropValue> EmitterProp<T> {
	/// A property pinned to a single value.
	pub fn fixed(value: T) -> Self {
		Self::range(value, value)
	}

	/// A property drawn uniformly from `[min, max]`.
	pub fn range(min: T, max: T) -> Self {
		Self {
			min,
			max,
			change_func: ChangeFunc::None,
			change_amplitude: 0.0,
			change_period: 0,
			change_phase: 0,
		}
	}

	/// Replaces the random range.
	pub fn set(&mut self, min: T, max: T) {
		self.min = min;
		self.max = max;
	}

	/// Installs a modulation function.
	pub fn set_function(&mut self, func: ChangeFunc, amplitude: f32, period: i32, phase: i32) {
		self.change_func = func;
		self.change_amplitude = amplitude;
		self.change_period = period.max(1);
		self.change_phase = phase;
	}

	/// Evaluates the property at `tick`.
	pub fn value<R: Rng>(&self, tick: i32, rng: &mut R) -> T {
		let min = self.min.to_f32();
		let max = self.max.to_f32();
		let mut val = min + (max - min) * rng.random::<f32>();

		if self.change_func != ChangeFunc::None {
			let period = f32::max(self.change_period as f32, 1.0);
			let t = (tick + self.change_phase).rem_euclid(self.change_period.max(1)) as f32;
			let amplitude = self.change_amplitude;
			match self.change_func {
				ChangeFunc::Sine => {
					val += (std::f32::consts::TAU * t / period).sin() * amplitude;
				}
				ChangeFunc::Sawtooth => {
					val += amplitude * (t / period) * 2.0 - amplitude;
				}
				ChangeFunc::Triangle => {
					if t * 2.0 < period {
						val += amplitude - t / period * amplitude * 4.0;
					} else {
						val += amplitude * -3.0 + t / period * amplitude * 4.0;
					}
				}
				ChangeFunc::Square => {
					if t * 2.0 < period {
						val += amplitude;
					} else {
						val -= amplitude;
					}
				}
				ChangeFunc::None => {}
			}
		}

		T::from_f32(val)
	}
}
