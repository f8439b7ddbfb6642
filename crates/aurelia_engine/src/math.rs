//! Numeric helpers shared by the particle and map subsystems.
//!
//! The pseudo-3D projection used by the original renderer leaks into the
//! simulation math: particle y/z movement is foreshortened by `SIN45` and the
//! homing code squashes the x axis by the same factor before measuring
//! distance. These factors are part of the observable behavior and must not
//! be "corrected".

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Foreshortening factor of the isometric-like projection (sin 45°).
pub const SIN45: f32 = 0.707_106_78;

/// Degrees to radians.
pub const DEG_RAD_FACTOR: f32 = 0.017_453_293;

/// Strategy used to compute the inverse distance to a homing target.
///
/// The exact variant is the default; the fast variants trade accuracy for
/// speed and reproduce the original engine's approximations bit-for-bit in
/// shape (not necessarily in rounding).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhysicsMode {
	/// Exact `1 / sqrt(x² + y² + z²)`.
	#[default]
	Exact,
	/// Fast reciprocal square root approximation.
	FastSqrt,
	/// Fast linear approximation `2 / (|x| + |y| + |z|)`.
	FastLinear,
}

/// Fast inverse square root approximation.
pub fn fast_inv_sqrt(x: f32) -> f32 {
	let half = 0.5 * x;
	let mut y = f32::from_bits(0x5f37_5a86 - (x.to_bits() >> 1));
	y = y * (1.5 - half * y * y);
	y
}

/// Inverse length of `dist` computed with the selected strategy.
///
/// Returns 0.0 when the strategy cannot produce a usable value (zero-length
/// input for the linear approximation).
pub fn inv_hypot(mode: PhysicsMode, dist: Vec3) -> f32 {
	match mode {
		PhysicsMode::FastSqrt => {
			fast_inv_sqrt(dist.x * dist.x + dist.y * dist.y + dist.z * dist.z)
		}
		PhysicsMode::FastLinear => {
			if dist.x == 0.0 {
				return 0.0;
			}
			2.0 / (dist.x.abs() + dist.y.abs() + dist.z.abs())
		}
		PhysicsMode::Exact => {
			1.0 / (dist.x * dist.x + dist.y * dist.y + dist.z * dist.z).sqrt()
		}
	}
}

/// Rolls an integer-percent chance.
///
/// The whole engine expresses probabilities as integers in `0..=100`; 0 must
/// never fire (a naive `rng % 100 <= 0` would, about 1% of the time) and 100
/// must always fire. Every branching frame, jump, and terminator goes through
/// this single helper.
pub fn roll_percent<R: Rng>(rng: &mut R, chance: u8) -> bool {
	match chance {
		0 => false,
		c if c >= 100 => true,
		c => rng.random_range(0..100u8) < c,
	}
}
