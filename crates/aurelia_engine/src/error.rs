//! Error types for the engine core.

use thiserror::Error;

/// Errors that can occur while loading or driving engine resources.
#[derive(Debug, Error)]
pub enum EngineError {
	/// A sprite definition does not contain the requested action, even after
	/// walking the substitution chain.
	#[error("Unknown sprite action: {action}")]
	UnknownAction {
		/// Name of the action that could not be resolved
		action: String,
	},

	/// No effect with the given name has been registered.
	#[error("Unknown particle effect: {name}")]
	UnknownEffect {
		/// Name of the effect that could not be resolved
		name: String,
	},

	/// A declarative effect or sprite definition could not be used.
	#[error("Malformed definition for {name}: {message}")]
	MalformedDefinition {
		/// Name of the offending definition
		name: String,
		/// Human-readable description of the problem
		message: String,
	},

	/// An image file could not be decoded.
	#[error("Failed to load image {path}")]
	ImageLoad {
		/// Path of the image that failed to load
		path: String,
		/// Underlying decoder error
		source: image::ImageError,
	},

	/// A definition document could not be parsed.
	#[error(transparent)]
	Parse(#[from] serde_json::Error),

	/// IO error
	#[error(transparent)]
	Io(#[from] std::io::Error),
}
