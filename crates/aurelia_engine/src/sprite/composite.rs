//! Multi-layer sprite compositing with a bounded bitmap cache.

use std::collections::VecDeque;
use std::sync::Arc;

use log::debug;
use rand::Rng;

use crate::animation::SpriteDirection;
use crate::render::{DrawTarget, SoftwareSurface};
use crate::resource::{ImageData, ImageHandle};

use super::layer::{LayerKey, SpriteLayer};

/// Width of the offscreen compositing buffer.
const BUFFER_WIDTH: u32 = 100;
/// Height of the offscreen compositing buffer.
const BUFFER_HEIGHT: u32 = 100;
/// Maximum number of pooled composite bitmaps.
const CACHE_MAX_SIZE: usize = 10;
/// Entries evicted in one batch when the pool overflows.
const CACHE_CLEAN_PART: usize = CACHE_MAX_SIZE.div_ceil(3);
/// Compositing only pays off above this many layers.
const CACHE_LAYER_THRESHOLD: usize = 3;
/// Minimum milliseconds between recomposites when the throttle is on.
const REDRAW_DELAY_MS: u64 = 10;

/// Behavior switches of a composite sprite.
///
/// These mirror the renderer compatibility knobs of the original client;
/// tests flip them to pin down individual paths.
#[derive(Debug, Clone)]
pub struct CompositeOptions {
	/// Throttle recomposites to one per [`REDRAW_DELAY_MS`].
	pub enable_delay: bool,
	/// Master switch for compositing; off means every draw walks the layers.
	pub enable_caching: bool,
	/// Keep a pool of prior composites keyed by layer-hash tuples.
	pub enable_cache_pool: bool,
	/// Also produce the alpha-modulatable bitmap variant.
	pub enable_alpha_image: bool,
	/// Propagate composite alpha to each layer (backend workaround).
	pub alpha_fix: bool,
}

impl Default for CompositeOptions {
	fn default() -> Self {
		Self {
			enable_delay: true,
			enable_caching: true,
			enable_cache_pool: true,
			enable_alpha_image: true,
			alpha_fix: false,
		}
	}
}

/// One pooled composite: the layer-key tuple it was rendered from plus the
/// finished bitmaps.
#[derive(Debug)]
struct CacheEntry {
	keys: Vec<Option<LayerKey>>,
	image: Option<ImageHandle>,
	alpha_image: Option<ImageHandle>,
}

/// An ordered stack of sprite layers composited into one cached bitmap.
///
/// Layers keep animating individually; the composite only re-renders when a
/// layer reports a change, and even then it first looks for a pooled bitmap
/// whose ordered layer-key tuple matches the current one. Entries only match
/// when they store the same number of keys in the same order.
#[derive(Debug)]
pub struct CompositeSprite {
	layers: Vec<Option<SpriteLayer>>,
	cache: VecDeque<CacheEntry>,
	active: Option<CacheEntry>,
	offset_x: i32,
	offset_y: i32,
	alpha: f32,
	needs_redraw: bool,
	last_redraw_time: u64,
	next_instance: u64,
	tile_width: i32,
	tile_height: i32,
	options: CompositeOptions,
}

impl CompositeSprite {
	/// Creates an empty composite with default options and 32×32 tiles.
	pub fn new() -> Self {
		Self::with_options(CompositeOptions::default())
	}

	/// Creates an empty composite with explicit options.
	pub fn with_options(options: CompositeOptions) -> Self {
		Self {
			layers: Vec::new(),
			cache: VecDeque::new(),
			active: None,
			offset_x: 0,
			offset_y: 0,
			alpha: 1.0,
			needs_redraw: false,
			last_redraw_time: 0,
			next_instance: 1,
			tile_width: 32,
			tile_height: 32,
			options,
		}
	}

	/// Appends a layer on top of the stack.
	pub fn add_layer(&mut self, mut layer: SpriteLayer) {
		layer.set_instance(self.allocate_instance());
		self.layers.push(Some(layer));
		self.needs_redraw = true;
	}

	/// Replaces the layer in `slot` (which must exist).
	pub fn set_layer(&mut self, slot: usize, layer: Option<SpriteLayer>) {
		if slot >= self.layers.len() {
			return;
		}
		let layer = layer.map(|mut layer| {
			layer.set_instance(self.allocate_instance());
			layer
		});
		self.layers[slot] = layer;
		self.needs_redraw = true;
	}

	/// Removes the layer in `slot`, keeping the slot itself.
	pub fn remove_layer(&mut self, slot: usize) {
		let Some(entry) = self.layers.get_mut(slot) else {
			return;
		};
		if entry.is_none() {
			return;
		}
		*entry = None;
		self.needs_redraw = true;
	}

	/// Grows the layer list to at least `count` slots.
	pub fn ensure_size(&mut self, count: usize) {
		if self.layers.len() >= count {
			return;
		}
		self.layers.resize_with(count, || None);
	}

	/// Drops all layers and cached bitmaps.
	pub fn clear(&mut self) {
		if !self.layers.is_empty() {
			self.layers.clear();
		}
		self.needs_redraw = true;
		self.cache.clear();
		self.active = None;
	}

	/// Number of layer slots (occupied or not).
	pub fn layer_count(&self) -> usize {
		self.layers.len()
	}

	/// Layer in `slot`, if occupied.
	pub fn layer(&self, slot: usize) -> Option<&SpriteLayer> {
		self.layers.get(slot).and_then(Option::as_ref)
	}

	/// Mutable layer in `slot`, if occupied.
	pub fn layer_mut(&mut self, slot: usize) -> Option<&mut SpriteLayer> {
		self.needs_redraw = true;
		self.layers.get_mut(slot).and_then(Option::as_mut)
	}

	/// Layers drawn per frame: 1 when a composite bitmap stands in for the
	/// stack, the slot count otherwise.
	pub fn number_of_layers(&self) -> usize {
		if self.active.as_ref().is_some_and(|entry| entry.image.is_some()) {
			1
		} else {
			self.layers.len()
		}
	}

	/// Advances every layer. Returns whether anything visible changed; a
	/// change also schedules recomposition for the next draw.
	pub fn update<R: Rng>(&mut self, time: u64, rng: &mut R) -> bool {
		let mut changed = false;
		for layer in self.layers.iter_mut().flatten() {
			changed |= layer.update(time, rng);
		}
		self.needs_redraw |= changed;
		changed
	}

	/// Switches every layer to the named action.
	pub fn play(&mut self, action: &str) -> bool {
		let mut changed = false;
		for layer in self.layers.iter_mut().flatten() {
			changed |= layer.play(action);
		}
		self.needs_redraw |= changed;
		changed
	}

	/// Changes every layer's facing direction.
	pub fn set_direction(&mut self, direction: SpriteDirection) -> bool {
		let mut changed = false;
		for layer in self.layers.iter_mut().flatten() {
			changed |= layer.set_direction(direction);
		}
		self.needs_redraw |= changed;
		changed
	}

	/// Rewinds every layer.
	pub fn reset(&mut self) -> bool {
		let mut changed = false;
		for layer in self.layers.iter_mut().flatten() {
			changed |= layer.reset();
		}
		self.needs_redraw |= changed;
		changed
	}

	/// Sets the composite opacity.
	///
	/// With the `alpha_fix` option on and more than three layers, the value
	/// is pushed into each layer instead of being applied to the cached
	/// bitmap at draw time.
	pub fn set_alpha(&mut self, alpha: f32) {
		if alpha != self.alpha {
			if self.options.alpha_fix && self.layers.len() > CACHE_LAYER_THRESHOLD {
				for layer in self.layers.iter_mut().flatten() {
					layer.set_alpha(alpha);
				}
			}
			self.alpha = alpha;
		}
	}

	/// Current composite opacity.
	pub fn alpha(&self) -> f32 {
		self.alpha
	}

	/// Draws the composite at (`x`, `y`), recompositing first if a layer
	/// changed since the last draw.
	pub fn draw(&mut self, target: &mut dyn DrawTarget, x: i32, y: i32, time: u64) {
		if self.needs_redraw {
			self.update_images(time);
		}

		if self.layers.is_empty() {
			return;
		}

		let image = self.active.as_ref().and_then(|entry| entry.image.clone());
		let alpha_image = self.active.as_ref().and_then(|entry| entry.alpha_image.clone());

		if self.alpha == 1.0 && image.is_some() {
			if let Some(image) = image {
				target.draw_image(&image, x + self.offset_x, y + self.offset_y);
			}
		} else if self.alpha > 0.0 && alpha_image.is_some() {
			if let Some(image) = alpha_image {
				target.draw_image_alpha(&image, x + self.offset_x, y + self.offset_y, self.alpha);
			}
		} else {
			self.draw_layers(target, x, y);
		}
	}

	/// Draws every layer directly, bypassing the composite bitmap.
	pub fn draw_layers(&mut self, target: &mut dyn DrawTarget, x: i32, y: i32) {
		let alpha = self.alpha;
		for layer in self.layers.iter_mut().flatten() {
			layer.set_alpha(alpha);
			layer.draw(target, x, y);
		}
	}

	/// The active composite bitmap, if one is current.
	pub fn image(&self) -> Option<&ImageHandle> {
		self.active.as_ref().and_then(|entry| entry.image.as_ref())
	}

	/// The active alpha-variant bitmap, if one is current.
	pub fn alpha_image(&self) -> Option<&ImageHandle> {
		self.active.as_ref().and_then(|entry| entry.alpha_image.as_ref())
	}

	/// Draw offset applied to the composite bitmap.
	pub fn offset(&self) -> (i32, i32) {
		(self.offset_x, self.offset_y)
	}

	/// Number of pooled (non-active) cache entries.
	pub fn cache_len(&self) -> usize {
		self.cache.len()
	}

	/// Width reported by the first occupied layer.
	pub fn width(&self) -> i32 {
		self.layers
			.iter()
			.flatten()
			.next()
			.map_or(0, SpriteLayer::width)
	}

	/// Height reported by the first occupied layer.
	pub fn height(&self) -> i32 {
		self.layers
			.iter()
			.flatten()
			.next()
			.map_or(0, SpriteLayer::height)
	}

	fn allocate_instance(&mut self) -> u64 {
		let instance = self.next_instance;
		self.next_instance += 1;
		instance
	}

	fn layer_keys(&self) -> Vec<Option<LayerKey>> {
		self.layers
			.iter()
			.map(|layer| layer.as_ref().map(SpriteLayer::key))
			.collect()
	}

	pub(crate) fn cache_contains(&self, keys: &[Option<LayerKey>]) -> bool {
		self.cache.iter().any(|entry| entry.keys == keys)
	}

	pub(crate) fn current_keys(&self) -> Vec<Option<LayerKey>> {
		self.layer_keys()
	}

	fn update_images(&mut self, time: u64) {
		if self.options.enable_delay {
			if time.saturating_sub(self.last_redraw_time) < REDRAW_DELAY_MS {
				return;
			}
			self.last_redraw_time = time;
		}
		self.needs_redraw = false;

		if !self.options.enable_caching {
			return;
		}
		if self.layers.len() <= CACHE_LAYER_THRESHOLD {
			return;
		}

		if self.options.enable_cache_pool {
			if self.update_from_cache() {
				return;
			}
			self.redraw();
		} else {
			self.redraw();
		}
	}

	/// Returns the previously active composite to the pool (evicting the
	/// oldest batch when it overflows), then scans for a pooled entry whose
	/// key tuple matches the current layers. The first (most recent) match
	/// becomes active.
	fn update_from_cache(&mut self) -> bool {
		if let Some(previous) = self.active.take() {
			if previous.image.is_some() {
				self.cache.push_front(previous);
				if self.cache.len() > CACHE_MAX_SIZE {
					for _ in 0..CACHE_CLEAN_PART {
						if self.cache.pop_back().is_some() {
							debug!("evicted composite cache entry");
						}
					}
				}
			}
		}

		let keys = self.layer_keys();
		if let Some(pos) = self.cache.iter().position(|entry| entry.keys == keys) {
			if let Some(entry) = self.cache.remove(pos) {
				self.active = Some(entry);
				return true;
			}
		}
		false
	}

	/// Renders all layers into the offscreen buffer and makes the result the
	/// active cache entry.
	fn redraw(&mut self) {
		let mut surface = SoftwareSurface::new(BUFFER_WIDTH, BUFFER_HEIGHT);

		let tile_x = self.tile_width / 2;
		let tile_y = self.tile_height;
		let pos_x = BUFFER_WIDTH as i32 / 2 - tile_x;
		let pos_y = BUFFER_HEIGHT as i32 - tile_y;
		self.offset_x = tile_x - BUFFER_WIDTH as i32 / 2;
		self.offset_y = tile_y - BUFFER_HEIGHT as i32;

		for layer in self.layers.iter().flatten() {
			layer.draw(&mut surface, pos_x, pos_y);
		}

		let image: ImageHandle = Arc::new(ImageData {
			id: 0,
			name: "composite".to_string(),
			pixels: surface.into_image(),
		});
		let alpha_image = self.options.enable_alpha_image.then(|| image.clone());
		self.active = Some(CacheEntry {
			keys: self.layer_keys(),
			image: Some(image),
			alpha_image,
		});
	}
}

impl Default for CompositeSprite {
	fn default() -> Self {
		Self::new()
	}
}
