//! Compound sprites: independently animated layers composited into one
//! cached bitmap.
//!
//! An actor's visual is a stack of layers (body, equipment, overlays). Each
//! layer exposes a content key identifying its visible frame; the composite
//! keys its bitmap cache on the ordered tuple of those keys, so revisiting a
//! recently shown combination skips the re-render entirely.

pub mod composite;
pub mod layer;

pub use self::composite::{CompositeOptions, CompositeSprite};
pub use self::layer::{LayerKey, LayerKind, SpriteLayer, StaticSprite};

#[cfg(test)]
mod tests;
