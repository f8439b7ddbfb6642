//! Image resources and the registry that loads them.
//!
//! Pixel data is held behind shared-ownership [`ImageHandle`]s; whoever keeps
//! a handle keeps the pixels alive, and dropping the last handle releases
//! them. This replaces the manual reference counting of the original
//! resource layer.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use log::warn;

use crate::error::EngineError;

/// Shared handle to immutable image data.
pub type ImageHandle = Arc<ImageData>;

/// Decoded image pixels plus the identity used by caches and budgets.
#[derive(Debug, Clone)]
pub struct ImageData {
	/// Stable numeric identity of this image within its registry.
	///
	/// Two handles with the same id are guaranteed to hold identical pixels.
	/// Anonymous images (composited offscreen buffers) use id 0 and never
	/// participate in identity comparisons.
	pub id: u64,
	/// Name the image was registered under (usually its path).
	pub name: String,
	/// RGBA pixel data.
	pub pixels: RgbaImage,
}

impl ImageData {
	/// Width in pixels.
	pub fn width(&self) -> i32 {
		self.pixels.width() as i32
	}

	/// Height in pixels.
	pub fn height(&self) -> i32 {
		self.pixels.height() as i32
	}
}

/// Loads and caches images by name, with a placeholder fallback.
///
/// A missing or undecodable image never fails the caller: it is logged once
/// and the registry hands out the "unknown" placeholder instead, so a broken
/// asset degrades a single visual rather than aborting a load.
pub struct ImageRegistry {
	images: HashMap<String, ImageHandle>,
	placeholder: ImageHandle,
	next_id: u64,
}

impl ImageRegistry {
	/// Side length of the generated placeholder image.
	const PLACEHOLDER_SIZE: u32 = 32;

	/// Creates an empty registry with a generated placeholder image.
	pub fn new() -> Self {
		let mut pixels = RgbaImage::new(Self::PLACEHOLDER_SIZE, Self::PLACEHOLDER_SIZE);
		for (x, y, px) in pixels.enumerate_pixels_mut() {
			// Magenta/black checkerboard, the classic "missing texture" look.
			*px = if (x / 8 + y / 8) % 2 == 0 {
				Rgba([255, 0, 255, 255])
			} else {
				Rgba([0, 0, 0, 255])
			};
		}
		Self {
			images: HashMap::new(),
			placeholder: Arc::new(ImageData {
				id: 1,
				name: "unknown".to_string(),
				pixels,
			}),
			next_id: 2,
		}
	}

	/// The shared "unknown image" placeholder.
	pub fn placeholder(&self) -> ImageHandle {
		self.placeholder.clone()
	}

	/// Registers raw pixels under a name and returns the handle.
	///
	/// Re-registering a name replaces the stored handle; outstanding handles
	/// to the old pixels stay valid.
	pub fn insert(&mut self, name: &str, pixels: RgbaImage) -> ImageHandle {
		let handle = Arc::new(ImageData {
			id: self.allocate_id(),
			name: name.to_string(),
			pixels,
		});
		self.images.insert(name.to_string(), handle.clone());
		handle
	}

	/// Returns the image registered under `name`, loading it from disk on
	/// first use. Falls back to the placeholder when the file is missing or
	/// undecodable.
	pub fn load(&mut self, name: &str) -> ImageHandle {
		if let Some(handle) = self.images.get(name) {
			return handle.clone();
		}
		match self.load_file(name) {
			Ok(handle) => handle,
			Err(err) => {
				warn!("using placeholder for image {name}: {err}");
				self.images.insert(name.to_string(), self.placeholder.clone());
				self.placeholder.clone()
			}
		}
	}

	/// Returns the image registered under `name` without touching the disk.
	pub fn get(&self, name: &str) -> Option<ImageHandle> {
		self.images.get(name).cloned()
	}

	fn load_file(&mut self, name: &str) -> Result<ImageHandle, EngineError> {
		let decoded = image::open(Path::new(name)).map_err(|source| EngineError::ImageLoad {
			path: name.to_string(),
			source,
		})?;
		Ok(self.insert(name, decoded.to_rgba8()))
	}

	fn allocate_id(&mut self) -> u64 {
		let id = self.next_id;
		self.next_id += 1;
		id
	}
}

impl Default for ImageRegistry {
	fn default() -> Self {
		Self::new()
	}
}

/// A fixed-size grid of tiles cut from one source image.
///
/// Declarative animation definitions reference frames by index into such a
/// grid; indices run left to right, top to bottom.
pub struct ImageSet {
	tiles: Vec<ImageHandle>,
	tile_width: i32,
	tile_height: i32,
}

impl ImageSet {
	/// Cuts `source` into `tile_width` × `tile_height` tiles.
	///
	/// Each tile becomes its own anonymous image sharing the source's name
	/// so budget accounting still groups them per asset.
	pub fn new(source: &ImageHandle, tile_width: u32, tile_height: u32) -> Self {
		let mut tiles = Vec::new();
		if tile_width > 0 && tile_height > 0 {
			let cols = source.pixels.width() / tile_width;
			let rows = source.pixels.height() / tile_height;
			for row in 0..rows {
				for col in 0..cols {
					let view = image::imageops::crop_imm(
						&source.pixels,
						col * tile_width,
						row * tile_height,
						tile_width,
						tile_height,
					);
					tiles.push(Arc::new(ImageData {
						id: 0,
						name: source.name.clone(),
						pixels: view.to_image(),
					}));
				}
			}
		}
		Self {
			tiles,
			tile_width: tile_width as i32,
			tile_height: tile_height as i32,
		}
	}

	/// Tile at `index`, if the grid has one.
	pub fn get(&self, index: usize) -> Option<ImageHandle> {
		self.tiles.get(index).cloned()
	}

	/// Number of tiles in the grid.
	pub fn len(&self) -> usize {
		self.tiles.len()
	}

	/// Returns true when the grid holds no tiles.
	pub fn is_empty(&self) -> bool {
		self.tiles.is_empty()
	}

	/// Width of a single tile.
	pub fn tile_width(&self) -> i32 {
		self.tile_width
	}

	/// Height of a single tile.
	pub fn tile_height(&self) -> i32 {
		self.tile_height
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_file_falls_back_to_placeholder() {
		let mut registry = ImageRegistry::new();
		let img = registry.load("definitely/not/a/real/file.png");
		assert_eq!(img.id, registry.placeholder().id);
	}

	#[test]
	fn insert_allocates_distinct_ids() {
		let mut registry = ImageRegistry::new();
		let a = registry.insert("a", RgbaImage::new(4, 4));
		let b = registry.insert("b", RgbaImage::new(4, 4));
		assert_ne!(a.id, b.id);
		assert_eq!(registry.get("a").map(|h| h.id), Some(a.id));
	}

	#[test]
	fn imageset_cuts_grid_in_reading_order() {
		let mut source = RgbaImage::new(4, 2);
		// Four 2x1 tiles would not tile evenly; use 2x2 over a 4x2 image.
		for (x, _, px) in source.enumerate_pixels_mut() {
			*px = Rgba([x as u8, 0, 0, 255]);
		}
		let handle = Arc::new(ImageData {
			id: 9,
			name: "grid".to_string(),
			pixels: source,
		});
		let set = ImageSet::new(&handle, 2, 2);
		assert_eq!(set.len(), 2);
		assert_eq!(set.get(0).map(|t| t.pixels.get_pixel(0, 0).0[0]), Some(0));
		assert_eq!(set.get(1).map(|t| t.pixels.get_pixel(0, 0).0[0]), Some(2));
		assert!(set.get(2).is_none());
	}
}
